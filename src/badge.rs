//! Rounded-square badge drawn over the middle of a QR code.
//!
//! A badge is an opaque white rounded square with either the platform glyph
//! (tinted with its brand color) or a user-supplied logo inset by padding.

use std::path::Path;
use std::sync::Arc;

use image::{ imageops::{ self, FilterType }, Rgba, RgbaImage };
use resvg::{ tiny_skia, usvg };

use crate::enums::PlatformId;
use crate::error::{ AppError, Result };
use crate::registry::{ self, GLYPH_VIEWBOX };

/// Badge side as a fraction of the QR canvas side.
pub const BADGE_CANVAS_RATIO: f64 = 0.2;
/// Padding as a fraction of the logo side.
pub const BADGE_PADDING_RATIO: f64 = 0.1;
/// Corner radius as a fraction of the badge side.
pub const BADGE_CORNER_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeSpec {
    None,
    DefaultGlyph(PlatformId),
    /// Complete encoded image bytes (PNG, JPEG, ...).
    CustomImage(Arc<[u8]>),
}

impl BadgeSpec {
    pub fn custom(bytes: impl Into<Arc<[u8]>>) -> Self {
        BadgeSpec::CustomImage(bytes.into())
    }

    /// Read a logo file fully before it can be used as a badge.
    pub async fn custom_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        tracing::debug!("Loaded custom logo {} ({} bytes)", path.as_ref().display(), bytes.len());
        Ok(Self::custom(bytes))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, BadgeSpec::None)
    }
}

/// Pixel geometry of a badge of a given side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeGeometry {
    pub side: u32,
    pub padding: u32,
    pub logo: u32,
    pub corner_radius: u32,
}

impl BadgeGeometry {
    /// Geometry of the badge composited on a `canvas_px` square canvas.
    pub fn for_canvas(canvas_px: u32) -> Self {
        Self::for_side(((canvas_px as f64) * BADGE_CANVAS_RATIO).round() as u32)
    }

    /// side = logo + 2 * padding, padding = 10% of logo.
    pub fn for_side(side: u32) -> Self {
        let padding = ((side as f64) * BADGE_PADDING_RATIO / (1.0 + 2.0 * BADGE_PADDING_RATIO)).round() as u32;
        Self {
            side,
            padding,
            logo: side.saturating_sub(padding * 2),
            corner_radius: ((side as f64) * BADGE_CORNER_RATIO).round() as u32,
        }
    }

    /// Top-left offset that centers the badge on a `canvas_px` canvas.
    pub fn origin(&self, canvas_px: u32) -> u32 {
        canvas_px.saturating_sub(self.side) / 2
    }
}

pub trait BadgeRenderer: Send + Sync {
    /// Render `spec` as a `side x side` patch, or `None` for `BadgeSpec::None`.
    fn render_badge(&self, spec: &BadgeSpec, side: u32) -> Result<Option<RgbaImage>>;
}

#[derive(Debug, Default, Clone)]
pub struct DefaultBadgeRenderer;

impl BadgeRenderer for DefaultBadgeRenderer {
    fn render_badge(&self, spec: &BadgeSpec, side: u32) -> Result<Option<RgbaImage>> {
        let geometry = BadgeGeometry::for_side(side);
        let logo = match spec {
            BadgeSpec::None => {
                return Ok(None);
            }
            BadgeSpec::DefaultGlyph(platform) => rasterize_glyph(*platform, geometry.logo)?,
            BadgeSpec::CustomImage(bytes) => stretch_logo(bytes, geometry.logo)?,
        };

        let mut badge = rounded_backing(&geometry)?;
        imageops::overlay(&mut badge, &logo, geometry.padding as i64, geometry.padding as i64);
        Ok(Some(badge))
    }
}

/// Opaque white rounded square, transparent outside the corners.
fn rounded_backing(geometry: &BadgeGeometry) -> Result<RgbaImage> {
    let size = geometry.side as f32;
    let r = geometry.corner_radius as f32;

    let mut pixmap = tiny_skia::Pixmap
        ::new(geometry.side, geometry.side)
        .ok_or_else(|| AppError::BadgeDecodeFailed(format!("Invalid badge size: {}", geometry.side)))?;

    let mut pb = tiny_skia::PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(size - r, 0.0);
    pb.quad_to(size, 0.0, size, r);
    pb.line_to(size, size - r);
    pb.quad_to(size, size, size - r, size);
    pb.line_to(r, size);
    pb.quad_to(0.0, size, 0.0, size - r);
    pb.line_to(0.0, r);
    pb.quad_to(0.0, 0.0, r, 0.0);
    pb.close();
    let path = pb
        .finish()
        .ok_or_else(|| AppError::Internal("Failed to build badge backing path".to_string()))?;

    let mut paint = tiny_skia::Paint::default();
    paint.set_color_rgba8(255, 255, 255, 255);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, tiny_skia::FillRule::Winding, tiny_skia::Transform::identity(), None);

    Ok(pixmap_to_rgba(&pixmap))
}

fn rasterize_glyph(platform: PlatformId, logo_px: u32) -> Result<RgbaImage> {
    let descriptor = registry::describe(platform);
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {vb} {vb}"><path fill="{color}" d="{path}"/></svg>"#,
        size = logo_px,
        vb = GLYPH_VIEWBOX,
        color = descriptor.brand_color,
        path = descriptor.glyph_path
    );

    let tree = usvg::Tree
        ::from_str(&svg, &usvg::Options::default())
        .map_err(|e| AppError::BadgeDecodeFailed(format!("Invalid {} glyph: {}", platform, e)))?;

    let mut pixmap = tiny_skia::Pixmap
        ::new(logo_px, logo_px)
        .ok_or_else(|| AppError::BadgeDecodeFailed(format!("Invalid glyph size: {}", logo_px)))?;

    let svg_size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        (logo_px as f32) / svg_size.width(),
        (logo_px as f32) / svg_size.height()
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap_to_rgba(&pixmap))
}

/// Decode a custom logo and stretch it to `logo_px` square. Aspect ratio is not kept.
fn stretch_logo(bytes: &[u8], logo_px: u32) -> Result<RgbaImage> {
    let logo = image
        ::load_from_memory(bytes)
        .map_err(|e| AppError::BadgeDecodeFailed(format!("Failed to decode custom logo: {}", e)))?;

    Ok(logo.resize_exact(logo_px, logo_px, FilterType::Lanczos3).to_rgba8())
}

// tiny-skia stores premultiplied RGBA
fn pixmap_to_rgba(pixmap: &tiny_skia::Pixmap) -> RgbaImage {
    let mut out = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}
