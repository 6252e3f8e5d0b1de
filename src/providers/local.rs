use async_trait::async_trait;
use image::{ DynamicImage, GrayImage, Luma };
use qrcode::{ Color, EcLevel, QrCode };

use super::qr_source::{ QrProfile, QrSource };
use crate::error::{ AppError, Result };

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Renders QR codes in-process with the `qrcode` crate. Same profile
/// semantics as the HTTP source, no network access.
#[derive(Debug, Default, Clone)]
pub struct LocalQrSource;

impl LocalQrSource {
    pub fn new() -> Self {
        Self
    }

    pub fn render(payload: &str, profile: &QrProfile) -> Result<GrayImage> {
        let code = QrCode::with_error_correction_level(payload, EcLevel::H).map_err(|e|
            AppError::SourceUnavailable(format!("Failed to encode QR payload: {}", e))
        )?;

        let modules = code.width() as u32;
        let total_modules = modules + profile.quiet_zone * 2;
        let drawable = profile.size_px.saturating_sub(profile.margin * 2);
        let module_px = (drawable / total_modules).max(1);

        let code_px = total_modules * module_px;
        let side = profile.size_px.max(code_px + profile.margin * 2);
        let offset = (side - code_px) / 2 + profile.quiet_zone * module_px;

        let mut image = GrayImage::from_pixel(side, side, LIGHT);
        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let mx = (i as u32) % modules;
            let my = (i as u32) / modules;
            for dy in 0..module_px {
                for dx in 0..module_px {
                    image.put_pixel(offset + mx * module_px + dx, offset + my * module_px + dy, DARK);
                }
            }
        }

        Ok(image)
    }
}

#[async_trait]
impl QrSource for LocalQrSource {
    async fn fetch_qr(&self, payload: &str, profile: &QrProfile) -> Result<DynamicImage> {
        let payload = payload.to_string();
        let profile = *profile;
        let image = tokio::task
            ::spawn_blocking(move || Self::render(&payload, &profile)).await
            .map_err(|e| AppError::Internal(format!("QR render task failed: {}", e)))??;
        Ok(DynamicImage::ImageLuma8(image))
    }

    fn name(&self) -> &str {
        "local"
    }
}
