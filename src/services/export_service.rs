use std::sync::Arc;

use crate::badge::BadgeSpec;
use crate::config::Config;
use crate::enums::{ LinkType, OsVariant, PlatformId };
use crate::error::Result;
use crate::providers::{ QrProfile, QrServerSource, QrSource };
use crate::resolver::{ self, LinkPair };
use crate::services::compose_service::{ export_filename, ComposeRequest, ComposeService, ComposedImage };

/// One fully specified export, as chosen by the caller.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub platform: PlatformId,
    pub handle: String,
    pub os: OsVariant,
    pub badge: BadgeSpec,
}

impl ExportRequest {
    pub fn new(platform: PlatformId, handle: impl Into<String>) -> Self {
        Self {
            platform,
            handle: handle.into(),
            os: OsVariant::default(),
            badge: BadgeSpec::None,
        }
    }

    pub fn with_os(mut self, os: OsVariant) -> Self {
        self.os = os;
        self
    }

    pub fn with_badge(mut self, badge: BadgeSpec) -> Self {
        self.badge = badge;
        self
    }

    pub fn links(&self) -> LinkPair {
        resolver::resolve(self.platform, &self.handle, self.os)
    }
}

/// A downloadable file.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub link_type: LinkType,
    pub uri: String,
    pub image: ComposedImage,
}

/// Resolves links and composes preview/export images for them.
#[derive(Clone)]
pub struct ExportService {
    composer: ComposeService,
    export_size_px: u32,
    preview_size_px: u32,
}

impl ExportService {
    pub fn new(composer: ComposeService, config: &Config) -> Self {
        Self {
            composer,
            export_size_px: config.export_size_px,
            preview_size_px: config.preview_size_px,
        }
    }

    /// Service wired to the public QR endpoint with the default badge renderer.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source: Arc<dyn QrSource> = Arc::new(QrServerSource::new(config)?);
        Ok(Self::new(ComposeService::with_default_badges(source), config))
    }

    /// Small on-screen image for one link.
    pub async fn preview(&self, request: &ExportRequest, link_type: LinkType) -> Result<ComposedImage> {
        let links = request.links();
        self.composer.compose(
            &ComposeRequest {
                uri: links.get(link_type).to_string(),
                platform: request.platform,
                badge: request.badge.clone(),
                profile: QrProfile::preview(self.preview_size_px),
            }
        ).await
    }

    /// Full-size downloadable image for one link.
    pub async fn export(&self, request: &ExportRequest, link_type: LinkType) -> Result<ExportArtifact> {
        let links = request.links();
        let uri = links.get(link_type).to_string();

        let compose_request = ComposeRequest {
            uri: uri.clone(),
            platform: request.platform,
            badge: request.badge.clone(),
            profile: QrProfile::export(self.export_size_px),
        };

        let image = self.composer.compose(&compose_request).await.map_err(|e| {
            tracing::warn!("Export of {} {} QR failed: {}", request.platform, link_type, e);
            e
        })?;

        Ok(ExportArtifact {
            filename: export_filename(request.platform, &request.handle, link_type),
            link_type,
            uri,
            image,
        })
    }

    /// Deep and web exports, run concurrently. Either failure fails both.
    pub async fn export_both(&self, request: &ExportRequest) -> Result<(ExportArtifact, ExportArtifact)> {
        tokio::try_join!(self.export(request, LinkType::Deep), self.export(request, LinkType::Web))
    }
}
