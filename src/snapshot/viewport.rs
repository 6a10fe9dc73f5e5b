use serde::{Deserialize, Serialize};

use crate::snapshot::snapshot_model::LayoutBox;

/// Tags that never produce content, whatever their geometry.
pub const EXCLUDED_TAGS: [&str; 12] = [
    "html", "head", "title", "meta", "iframe", "body", "script", "style", "path", "svg", "br",
    "::marker",
];

pub fn is_excluded_tag(tag: &str) -> bool {
    EXCLUDED_TAGS.contains(&tag)
}

/// Window metrics reported by the browser alongside a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportMetrics {
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub platform: String,
}

fn default_ratio() -> f64 {
    1.0
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width: 1280.0,
            height: 1080.0,
            device_pixel_ratio: 1.0,
            platform: String::new(),
        }
    }
}

impl ViewportMetrics {
    /// Device pixel ratio with the macOS headless quirk corrected: that
    /// platform reports 1 while rendering at 2.
    pub fn effective_pixel_ratio(&self) -> f64 {
        let platform = self.platform.to_lowercase();
        let is_mac = platform == "darwin" || platform == "macos";

        if is_mac && self.device_pixel_ratio == 1.0 {
            2.0
        } else if self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        }
    }
}

/// Visible page region in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportBox {
    pub left: f64,
    pub upper: f64,
    pub right: f64,
    pub lower: f64,
    pub pixel_ratio: f64,
}

impl ViewportBox {
    pub fn from_metrics(metrics: &ViewportMetrics) -> Self {
        ViewportBox {
            left: metrics.scroll_x,
            upper: metrics.scroll_y,
            right: metrics.scroll_x + metrics.width,
            lower: metrics.scroll_y + metrics.height,
            pixel_ratio: metrics.effective_pixel_ratio(),
        }
    }

    /// Scale a device-pixel layout box down to CSS pixels.
    pub fn scale(&self, layout: LayoutBox) -> LayoutBox {
        LayoutBox {
            x: layout.x / self.pixel_ratio,
            y: layout.y / self.pixel_ratio,
            width: layout.width / self.pixel_ratio,
            height: layout.height / self.pixel_ratio,
        }
    }

    /// Partial intersection test on an already scaled box.
    pub fn intersects(&self, scaled: &LayoutBox) -> bool {
        let right = scaled.x + scaled.width;
        let lower = scaled.y + scaled.height;

        scaled.x < self.right && right >= self.left && scaled.y < self.lower && lower >= self.upper
    }
}

/// Result of placing one node against the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    ExcludedTag,
    NotRendered,
    OutsideViewport,
    Visible(LayoutBox),
}

/// Decide whether a node shows up on screen. The returned box is in CSS pixels.
pub fn place(tag: &str, layout: Option<LayoutBox>, viewport: &ViewportBox) -> Placement {
    let Some(layout) = layout else {
        return Placement::NotRendered;
    };

    if is_excluded_tag(tag) {
        return Placement::ExcludedTag;
    }

    let scaled = viewport.scale(layout);
    if viewport.intersects(&scaled) {
        Placement::Visible(scaled)
    } else {
        Placement::OutsideViewport
    }
}
