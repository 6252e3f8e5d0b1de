use async_trait::async_trait;
use image::DynamicImage;
use serde::{ Deserialize, Serialize };

use crate::error::{ AppError, Result };

/// Rendering parameters sent with every QR request. Background is always
/// white and error correction is always level H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrProfile {
    pub size_px: u32,
    /// Quiet zone width in modules.
    pub quiet_zone: u32,
    /// Extra margin in pixels.
    pub margin: u32,
}

impl QrProfile {
    pub const PREVIEW_QUIET_ZONE: u32 = 4;
    pub const PREVIEW_MARGIN: u32 = 2;
    pub const EXPORT_QUIET_ZONE: u32 = 2;
    pub const EXPORT_MARGIN: u32 = 0;

    /// Small canvas with a wide quiet zone, for on-screen display.
    pub fn preview(size_px: u32) -> Self {
        Self {
            size_px,
            quiet_zone: Self::PREVIEW_QUIET_ZONE,
            margin: Self::PREVIEW_MARGIN,
        }
    }

    /// Large canvas with minimal margin, for downloads.
    pub fn export(size_px: u32) -> Self {
        Self {
            size_px,
            quiet_zone: Self::EXPORT_QUIET_ZONE,
            margin: Self::EXPORT_MARGIN,
        }
    }
}

/// Anything that can turn a payload into a QR raster.
#[async_trait]
pub trait QrSource: Send + Sync {
    /// Render `payload` as a QR image. Failures are `SourceUnavailable`.
    async fn fetch_qr(&self, payload: &str, profile: &QrProfile) -> Result<DynamicImage>;

    /// Source name for logs
    fn name(&self) -> &str;
}

/// Decode raster bytes returned by a QR source.
pub fn decode_qr_image(bytes: &[u8]) -> Result<DynamicImage> {
    let image = image
        ::load_from_memory(bytes)
        .map_err(|e| AppError::SourceUnavailable(format!("Failed to decode QR image: {}", e)))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(AppError::SourceUnavailable("QR image is empty".to_string()));
    }

    Ok(image)
}
