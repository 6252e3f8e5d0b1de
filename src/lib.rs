pub mod config;
pub mod enums;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod providers;
pub mod badge;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use enums::{ LinkType, OsVariant, PlatformId };
pub use error::{ AppError, Result };
pub use registry::{ describe, PlatformDescriptor };
pub use resolver::{ resolve, LinkPair };
pub use badge::{ BadgeRenderer, BadgeSpec, DefaultBadgeRenderer };
pub use providers::{ LocalQrSource, QrProfile, QrServerSource, QrSource };
pub use services::{ ComposeRequest, ComposeService, ComposedImage, ExportArtifact, ExportRequest, ExportService };
