use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── PlatformId ──────────────────────────────────────────────────────

/// Supported social platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Instagram,
    Facebook,
    Tiktok,
    X,
}

impl PlatformId {
    /// Canonical lowercase id, also used in export filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Instagram => "instagram",
            PlatformId::Facebook => "facebook",
            PlatformId::Tiktok => "tiktok",
            PlatformId::X => "x",
        }
    }

    /// Human-readable name for the platform picker.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformId::Instagram => "Instagram",
            PlatformId::Facebook => "Facebook",
            PlatformId::Tiktok => "Tiktok",
            PlatformId::X => "X",
        }
    }

    pub fn all() -> &'static [PlatformId] {
        &[PlatformId::Instagram, PlatformId::Facebook, PlatformId::Tiktok, PlatformId::X]
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "instagram" => Ok(PlatformId::Instagram),
            "facebook" => Ok(PlatformId::Facebook),
            "tiktok" => Ok(PlatformId::Tiktok),
            "x" | "twitter" => Ok(PlatformId::X),
            _ => Err(AppError::InvalidPlatform(format!(
                "Unsupported platform: {}. Supported: instagram, facebook, tiktok, x",
                s
            ))),
        }
    }
}

// ─── OsVariant ───────────────────────────────────────────────────────

/// Target mobile OS. Only changes the facebook deep link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsVariant {
    #[default]
    Android,
    Ios,
}

impl OsVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsVariant::Android => "android",
            OsVariant::Ios => "ios",
        }
    }
}

impl fmt::Display for OsVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsVariant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "android" => Ok(OsVariant::Android),
            "ios" | "iphone" => Ok(OsVariant::Ios),
            _ => Err(AppError::InvalidInput(format!("Invalid OS variant: {}. Supported: android, ios", s))),
        }
    }
}

// ─── LinkType ────────────────────────────────────────────────────────

/// Which half of a `LinkPair` a QR code encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Deep,
    Web,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Deep => "deep",
            LinkType::Web => "web",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deep" => Ok(LinkType::Deep),
            "web" => Ok(LinkType::Web),
            _ => Err(AppError::InvalidInput(format!("Invalid link type: {}. Supported: deep, web", s))),
        }
    }
}
