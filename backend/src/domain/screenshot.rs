//! Screenshots, problem reports and per-factory display capabilities.

use chrono::{DateTime, Utc};

use super::Browser;

/// A rendered page uploaded by a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub id: i32,
    pub factory_id: i32,
    pub browser_id: i32,
    pub website_url: String,
    /// Profanity score of the screenshot's website.
    pub website_profanities: i32,
    pub width: i32,
    pub height: i32,
    pub created: DateTime<Utc>,
}

/// A screenshot paired with the browser that produced it.
///
/// `browser` is `None` when the browser has since been detached from the
/// factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentScreenshot {
    pub screenshot: Screenshot,
    pub browser: Option<Browser>,
}

/// A problem a visitor reported against a screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemReport {
    pub id: i32,
    pub screenshot_id: i32,
    pub code: i32,
    pub message: String,
    pub reported: DateTime<Utc>,
}

/// Screen resolution a factory can render at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

/// Colour depth in bits per pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColorDepth {
    pub bits_per_pixel: i32,
}
