use validator::Validate;

use super::category_models::{Category, CreateCategoryRequest, NewCategoryRecord, UpdateCategoryRequest};
use super::category_repository::CategoryRepository;
use crate::{
    error::{AppError, FieldErrors, Result},
    store::SharedStore,
};

const DUPLICATE_NAME: &str = "A category with this name already exists";

#[derive(Clone)]
pub struct CategoryService {
    repo: CategoryRepository,
}

impl CategoryService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            repo: CategoryRepository::new(store),
        }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        Ok(self.repo.find_all().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    /// The id of the category with exactly this name, if any.
    pub async fn resolve_id(&self, name: &str) -> Result<Option<i64>> {
        if name.trim().is_empty() {
            return Ok(None);
        }
        Ok(self.repo.find_by_name(name).await?.map(|c| c.id))
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> Result<Category> {
        let mut errors = match request.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => e.into(),
        };
        let name = request.name.trim();
        if name.is_empty() {
            errors.insert("name", "Category name is required");
        } else if self.resolve_id(name).await?.is_some() {
            errors.insert("name", DUPLICATE_NAME);
        }
        errors.into_result()?;

        let category = self.repo.create(&NewCategoryRecord::from(&request)).await?;
        tracing::info!("Created category #{} {:?}", category.id, category.name);
        Ok(category)
    }

    pub async fn update(&self, id: i64, request: UpdateCategoryRequest) -> Result<Category> {
        if let Some(name) = request.name.as_set() {
            let mut errors = FieldErrors::new();
            let name = name.trim();
            if name.is_empty() {
                errors.insert("name", "Category name is required");
            } else if self.resolve_id(name).await?.is_some_and(|other| other != id) {
                errors.insert("name", DUPLICATE_NAME);
            }
            errors.into_result()?;
        }

        self.repo
            .update(id, request.into_record())
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".into()))
    }

    /// Tasks that referenced the category keep a dangling reference, which
    /// reads back as no category.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Category not found".into()));
        }
        tracing::info!("Deleted category #{}", id);
        Ok(())
    }
}
