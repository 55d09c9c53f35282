pub mod category_handlers;
pub mod category_models;
pub mod category_repository;
pub mod category_service;
pub mod routes;

pub use category_models::{Category, CreateCategoryRequest, UpdateCategoryRequest};
pub use category_repository::CategoryRepository;
pub use category_service::CategoryService;
