pub mod entry_service;
pub mod export_import_service;
pub mod photo_service;

pub use export_import_service::*;
