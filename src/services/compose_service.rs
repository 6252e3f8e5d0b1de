use std::io::Cursor;
use std::sync::Arc;

use image::{ imageops::{ self, FilterType }, DynamicImage, ImageFormat, Rgba, RgbaImage };

use crate::badge::{ BadgeGeometry, BadgeRenderer, BadgeSpec, DefaultBadgeRenderer };
use crate::enums::{ LinkType, PlatformId };
use crate::error::{ AppError, Result };
use crate::providers::{ QrProfile, QrSource };

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Everything one compose call needs. No state is read from anywhere else.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub uri: String,
    pub platform: PlatformId,
    pub badge: BadgeSpec,
    pub profile: QrProfile,
}

/// Flattened PNG produced by one compose call.
#[derive(Debug, Clone)]
pub struct ComposedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ComposedImage {
    pub const EXTENSION: &'static str = "png";
}

/// `<platform>_<handle>_<linkType>_qr.png`
pub fn export_filename(platform: PlatformId, handle: &str, link_type: LinkType) -> String {
    format!("{}_{}_{}_qr.{}", platform, handle, link_type, ComposedImage::EXTENSION)
}

/// Fetches a QR raster, overlays the badge and encodes the result.
/// Nothing is cached between calls.
#[derive(Clone)]
pub struct ComposeService {
    source: Arc<dyn QrSource>,
    badge_renderer: Arc<dyn BadgeRenderer>,
}

impl ComposeService {
    pub fn new(source: Arc<dyn QrSource>, badge_renderer: Arc<dyn BadgeRenderer>) -> Self {
        Self {
            source,
            badge_renderer,
        }
    }

    pub fn with_default_badges(source: Arc<dyn QrSource>) -> Self {
        Self::new(source, Arc::new(DefaultBadgeRenderer))
    }

    pub async fn compose(&self, request: &ComposeRequest) -> Result<ComposedImage> {
        let size = request.profile.size_px;
        if size == 0 {
            return Err(AppError::InvalidInput("QR size must be greater than 0".to_string()));
        }

        tracing::debug!(
            "Composing {} QR ({}px) via {} source",
            request.platform,
            size,
            self.source.name()
        );

        let qr = self.source.fetch_qr(&request.uri, &request.profile).await?;

        let badge = if request.badge.is_none() {
            None
        } else {
            let renderer = self.badge_renderer.clone();
            let spec = request.badge.clone();
            let side = BadgeGeometry::for_canvas(size).side;
            tokio::task
                ::spawn_blocking(move || renderer.render_badge(&spec, side)).await
                .map_err(|e| AppError::Internal(format!("Badge render task failed: {}", e)))??
        };

        let composed = tokio::task
            ::spawn_blocking(move || encode_png(composite(&qr, badge.as_ref(), size))).await
            .map_err(|e| AppError::Internal(format!("Encode task failed: {}", e)))??;

        tracing::info!("Composed {} QR: {} bytes", request.platform, composed.bytes.len());
        Ok(composed)
    }
}

/// White background, QR aspect-fit and centered, then the badge centered on top.
fn composite(qr: &DynamicImage, badge: Option<&RgbaImage>, size: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(size, size, WHITE);

    let (qr_w, qr_h) = (qr.width(), qr.height());
    let scale = f64::min((size as f64) / (qr_w as f64), (size as f64) / (qr_h as f64));
    let scaled_w = (((qr_w as f64) * scale).round() as u32).clamp(1, size);
    let scaled_h = (((qr_h as f64) * scale).round() as u32).clamp(1, size);

    let scaled = if (scaled_w, scaled_h) == (qr_w, qr_h) {
        qr.to_rgba8()
    } else {
        // nearest keeps module edges hard
        qr.resize_exact(scaled_w, scaled_h, FilterType::Nearest).to_rgba8()
    };
    imageops::overlay(
        &mut canvas,
        &scaled,
        ((size - scaled_w) / 2) as i64,
        ((size - scaled_h) / 2) as i64
    );

    if let Some(badge) = badge {
        let x = size.saturating_sub(badge.width()) / 2;
        let y = size.saturating_sub(badge.height()) / 2;
        imageops::overlay(&mut canvas, badge, x as i64, y as i64);
    }

    canvas
}

fn encode_png(canvas: RgbaImage) -> Result<ComposedImage> {
    let flattened = DynamicImage::ImageRgba8(canvas).to_rgb8();

    let mut bytes = Vec::new();
    flattened
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| AppError::Encode(e.to_string()))?;

    Ok(ComposedImage {
        bytes,
        width: flattened.width(),
        height: flattened.height(),
    })
}
