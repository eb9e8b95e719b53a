//! Shared types used across the Lantern engine.
//!
//! This module defines common newtypes and enums that provide type safety
//! and clear domain modeling.

use crate::error::LanternError;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Newtype for hint identifiers with validation.
///
/// Hint IDs are lowercase alphanumeric with hyphens, 3-60 characters,
/// optionally namespaced with a single `/` (for example `compat/css`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HintId(String);

impl HintId {
    /// Create a new `HintId` from a string.
    ///
    /// # Errors
    /// Returns error if the ID doesn't match the required format.
    pub fn new(id: impl Into<String>) -> Result<Self, LanternError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate hint ID format: lowercase alphanumeric with hyphens,
    /// 3-60 chars, at most one `/` namespace separator.
    fn validate(id: &str) -> Result<(), LanternError> {
        static HINT_ID_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = HINT_ID_REGEX.get_or_init(|| {
            Regex::new(r"^[a-z0-9][a-z0-9-]*(/[a-z0-9][a-z0-9-]*)?$").expect("valid regex")
        });

        if id.len() < 3 || id.len() > 60 {
            return Err(LanternError::Validation(format!(
                "invalid hint ID: must be 3-60 characters, got {} characters",
                id.len()
            )));
        }

        if regex.is_match(id) {
            Ok(())
        } else {
            Err(LanternError::Validation(format!(
                "invalid hint ID: must be lowercase alphanumeric with hyphens, got '{id}'"
            )))
        }
    }
}

impl fmt::Display for HintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Newtype for scan identifiers.
///
/// Scan IDs are generated UUIDs (v4 format) identifying one engine cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(String);

impl ScanId {
    /// Create a new random `ScanId` using UUID v4.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classified content kind of a fetched resource.
///
/// The kind selects the `fetch::end::<kind>` topic segment and which parsers
/// react to the fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// HTML documents
    Html,
    /// CSS stylesheets
    Css,
    /// JavaScript sources
    Javascript,
    /// Generic JSON documents
    Json,
    /// Web app manifests
    Manifest,
    /// Raster and vector images
    Image,
    /// Web fonts
    Font,
    /// XML documents
    Xml,
    /// Plain text
    Text,
    /// Anything unclassified
    Unknown,
}

impl MediaKind {
    /// Topic segment used in `fetch::end::<kind>` and `parse::*::<kind>`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Javascript => "javascript",
            Self::Json => "json",
            Self::Manifest => "manifest",
            Self::Image => "image",
            Self::Font => "font",
            Self::Xml => "xml",
            Self::Text => "text",
            Self::Unknown => "unknown",
        }
    }

    /// Classify from a Content-Type header value (parameters ignored).
    #[must_use]
    pub fn from_content_type(value: &str) -> Self {
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match mime.as_str() {
            "text/html" | "application/xhtml+xml" => Self::Html,
            "text/css" => Self::Css,
            "text/javascript" | "application/javascript" | "application/x-javascript" => {
                Self::Javascript
            }
            "application/manifest+json" => Self::Manifest,
            "application/json" | "application/ld+json" => Self::Json,
            "text/xml" | "application/xml" | "image/svg+xml" => Self::Xml,
            "text/plain" => Self::Text,
            _ if mime.starts_with("image/") => Self::Image,
            _ if mime.starts_with("font/") || mime == "application/font-woff" => Self::Font,
            _ => Self::Unknown,
        }
    }

    /// Classify from a file path extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Unknown;
        };

        match ext.to_ascii_lowercase().as_str() {
            "html" | "htm" | "xhtml" => Self::Html,
            "css" => Self::Css,
            "js" | "mjs" | "cjs" => Self::Javascript,
            "webmanifest" => Self::Manifest,
            "json" => Self::Json,
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "avif" | "ico" | "svg" => Self::Image,
            "woff" | "woff2" | "ttf" | "otf" | "eot" => Self::Font,
            "xml" => Self::Xml,
            "txt" => Self::Text,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Problem categories, mirroring the areas hints report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Accessibility issues
    Accessibility,
    /// Cross-browser compatibility issues
    Compatibility,
    /// Development workflow issues
    Development,
    /// Performance issues
    Performance,
    /// Progressive web app issues
    Pwa,
    /// Security issues
    Security,
    /// Everything else
    Other,
}

impl Category {
    /// Get a human-readable display name for the category.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Accessibility => "Accessibility",
            Self::Compatibility => "Compatibility",
            Self::Development => "Development",
            Self::Performance => "Performance",
            Self::Pwa => "PWA",
            Self::Security => "Security",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Wrapper around `chrono::DateTime<Utc>` for consistent timestamp handling.
///
/// Provides serialization/deserialization and utility methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp representing the current moment.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Parse a timestamp from an RFC3339 string.
    pub fn from_rfc3339(s: &str) -> Result<Self, LanternError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| LanternError::Validation(format!("invalid timestamp: {e}")))
    }

    /// Format as RFC3339 string.
    #[must_use]
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }

    /// Get seconds since Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}
