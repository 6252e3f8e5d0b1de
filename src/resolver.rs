//! Maps a platform handle to its app deep link and browser fallback link.
//!
//! The handle is used verbatim apart from each platform's `@` rule; no
//! percent-encoding happens here.

use serde::{ Deserialize, Serialize };

use crate::enums::{ LinkType, OsVariant, PlatformId };

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPair {
    pub deep_link: String,
    pub web_link: String,
}

impl LinkPair {
    pub fn get(&self, link_type: LinkType) -> &str {
        match link_type {
            LinkType::Deep => &self.deep_link,
            LinkType::Web => &self.web_link,
        }
    }
}

/// Build the link pair for a handle. Never fails.
pub fn resolve(platform: PlatformId, raw_handle: &str, os: OsVariant) -> LinkPair {
    match platform {
        PlatformId::Instagram =>
            LinkPair {
                deep_link: format!("instagram://user?username={}", raw_handle),
                web_link: format!("https://instagram.com/{}", raw_handle),
            },
        PlatformId::Facebook => {
            let segment = match os {
                OsVariant::Android => "page",
                OsVariant::Ios => "profile",
            };
            LinkPair {
                deep_link: format!("fb://{}/{}", segment, raw_handle),
                web_link: format!("https://facebook.com/{}", raw_handle),
            }
        }
        PlatformId::Tiktok => {
            let handle = with_at(raw_handle);
            LinkPair {
                deep_link: format!("tiktok://{}", handle),
                web_link: format!("https://tiktok.com/{}", handle),
            }
        }
        PlatformId::X => {
            let handle = raw_handle.replacen('@', "", 1);
            LinkPair {
                deep_link: format!("twitter://user?screen_name={}", handle),
                web_link: format!("https://x.com/{}", handle),
            }
        }
    }
}

fn with_at(handle: &str) -> String {
    if handle.starts_with('@') { handle.to_string() } else { format!("@{}", handle) }
}
