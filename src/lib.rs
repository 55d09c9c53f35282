pub mod category;
pub mod dto;
pub mod error;
pub mod recurrence;
pub mod routes;
pub mod state;
pub mod store;
pub mod task;
pub mod timer;
