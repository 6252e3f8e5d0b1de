pub mod compose_service;
pub mod export_service;

pub use compose_service::{ export_filename, ComposeRequest, ComposeService, ComposedImage };
pub use export_service::{ ExportArtifact, ExportRequest, ExportService };
