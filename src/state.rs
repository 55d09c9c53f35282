use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{
    category::CategoryService,
    error::{AppError, Result},
    recurrence::RecurrenceService,
    store::SharedStore,
    task::{TaskEvent, TaskService},
    timer::TimerRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub task_tx: broadcast::Sender<TaskEvent>,
    pub task_service: TaskService,
    pub category_service: CategoryService,
    pub recurrence_service: RecurrenceService,
    pub timers: TimerRegistry,
}

impl AppState {
    /// Wires repositories and services over one record store and starts the
    /// timer persister.
    pub fn new(config: Arc<Config>, store: SharedStore) -> Self {
        let (task_tx, _) = broadcast::channel(100);

        let category_service = CategoryService::new(store.clone());
        let recurrence_service = RecurrenceService::new(store.clone());
        let task_service = TaskService::new(
            store,
            category_service.clone(),
            recurrence_service.clone(),
        );
        let timers = TimerRegistry::spawn(task_service.clone(), task_tx.clone());

        Self {
            config,
            task_tx,
            task_service,
            category_service,
            recurrence_service,
            timers,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpStoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub public_key: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreConfig {
    Memory,
    Http(HttpStoreConfig),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store: StoreConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port
            .parse()
            .map_err(|_| AppError::Config(format!("PORT must be a number, got {port:?}")))?;

        let store = match var("RECORD_STORE_URL").filter(|url| !url.trim().is_empty()) {
            None => StoreConfig::Memory,
            Some(base_url) => {
                let required = |key: &str| {
                    var(key).ok_or_else(|| {
                        AppError::Config(format!("{key} must be set when RECORD_STORE_URL is"))
                    })
                };
                let timeout = var("RECORD_STORE_TIMEOUT_SECS").unwrap_or_else(|| "10".to_string());
                StoreConfig::Http(HttpStoreConfig {
                    base_url,
                    project_id: required("RECORD_STORE_PROJECT_ID")?,
                    public_key: required("RECORD_STORE_PUBLIC_KEY")?,
                    timeout_secs: timeout.parse().map_err(|_| {
                        AppError::Config(format!(
                            "RECORD_STORE_TIMEOUT_SECS must be a number, got {timeout:?}"
                        ))
                    })?,
                })
            }
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            store,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
