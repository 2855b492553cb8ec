pub mod file_storage_service;
pub mod image_events;
pub mod inventory_service;
pub mod product_service;

pub use product_service::ProductService;
