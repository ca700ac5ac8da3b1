//! Browser and device classification from a raw user-agent string.
//!
//! Rules are ordered and the first match wins. Edge and Opera UAs also contain
//! "Chrome" and "Safari", so they must be checked first.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static MOBILE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("Mobile|Android|iPhone").expect("invalid mobile pattern"));
static TABLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("Tablet|iPad").expect("invalid tablet pattern"));

/// Browser family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Browser {
    Edge,
    Opera,
    Chrome,
    Firefox,
    Safari,
    Other,
    Unknown,
}

impl Browser {
    pub fn classify(user_agent: Option<&str>) -> Self {
        let ua = match user_agent {
            Some(ua) if !ua.is_empty() => ua,
            _ => return Self::Unknown,
        };

        if ua.contains("Edg") {
            Self::Edge
        } else if ua.contains("OPR") || ua.contains("Opera") {
            Self::Opera
        } else if ua.contains("Chrome") {
            Self::Chrome
        } else if ua.contains("Firefox") {
            Self::Firefox
        } else if ua.contains("Safari") {
            Self::Safari
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Edge => "Edge",
            Self::Opera => "Opera",
            Self::Chrome => "Chrome",
            Self::Firefox => "Firefox",
            Self::Safari => "Safari",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }
}

/// Device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    Mobile,
    Tablet,
    Desktop,
    Unknown,
}

impl Device {
    pub fn classify(user_agent: Option<&str>) -> Self {
        match user_agent {
            None | Some("") => Self::Unknown,
            Some(ua) if MOBILE_PATTERN.is_match(ua) => Self::Mobile,
            Some(ua) if TABLET_PATTERN.is_match(ua) => Self::Tablet,
            Some(_) => Self::Desktop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "Mobile",
            Self::Tablet => "Tablet",
            Self::Desktop => "Desktop",
            Self::Unknown => "Unknown",
        }
    }
}
