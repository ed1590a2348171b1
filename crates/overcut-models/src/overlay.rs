//! Overlay definitions and validation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default text color when an overlay sets none.
pub const DEFAULT_FONT_COLOR: &str = "white";
/// Default font size in points.
pub const DEFAULT_FONT_SIZE: u32 = 36;
/// Default background box color (half-transparent black).
pub const DEFAULT_BOX_COLOR: &str = "black@0.5";
/// Default background box border width in pixels.
pub const DEFAULT_BOX_BORDERW: u32 = 5;

/// Kind of element composited onto the base video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Literal text drawn over the frame
    Text,
    /// Still image sourced from the asset store
    Image,
    /// Secondary clip sourced from the asset store
    Video,
    /// Unrecognized kind; the graph compiler skips these
    Unknown,
}

// Unrecognized wire values fold into `Unknown` instead of failing the
// whole submission; the exhaustiveness gap is intentional for now.
impl<'de> Deserialize<'de> for OverlayKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "text" => OverlayKind::Text,
            "image" => OverlayKind::Image,
            "video" => OverlayKind::Video,
            _ => OverlayKind::Unknown,
        })
    }
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverlayKind::Text => "text",
            OverlayKind::Image => "image",
            OverlayKind::Video => "video",
            OverlayKind::Unknown => "unknown",
        }
    }

    /// Whether this kind pulls its content from the asset store.
    pub fn is_asset(&self) -> bool {
        matches!(self, OverlayKind::Image | OverlayKind::Video)
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validation failure for a single overlay, naming the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayValidationError {
    #[error("`{field}` must be within [0, 1], got {value}")]
    PositionOutOfRange { field: &'static str, value: f64 },

    #[error("`{field}` must be a non-negative number of seconds, got {value}")]
    InvalidTime { field: &'static str, value: f64 },

    #[error("`end_time` ({end}) must be greater than `start_time` ({start})")]
    EmptyTimeWindow { start: f64, end: f64 },

    #[error("`content` must reference an asset for {kind} overlays")]
    MissingAssetReference { kind: OverlayKind },
}

/// One compositing instruction: a text caption, still image or
/// secondary clip shown over the base video for a bounded time window.
///
/// Overlays are validated when the owning job is created, never
/// mid-render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Overlay {
    /// Overlay kind (wire name `type`)
    #[serde(rename = "type")]
    pub kind: OverlayKind,

    /// Literal text for text overlays, asset reference otherwise
    pub content: String,

    /// Horizontal position as a fraction of frame width, in [0, 1]
    pub x: f64,

    /// Vertical position as a fraction of frame height, in [0, 1]
    pub y: f64,

    /// Start of the visibility window, seconds from stream start
    pub start_time: f64,

    /// End of the visibility window, seconds from stream start
    pub end_time: f64,

    /// Text color, e.g. "white", "yellow", "#ffcc00"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Font size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,

    /// Background box behind the text (wire name `box`)
    #[serde(rename = "box", default, skip_serializing_if = "Option::is_none")]
    pub box_enabled: Option<bool>,

    /// Background box color, e.g. "black@0.5"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_color: Option<String>,

    /// Background box border width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_borderw: Option<u32>,
}

/// Text styling with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle<'a> {
    pub color: &'a str,
    pub font_size: u32,
    pub box_enabled: bool,
    pub box_color: &'a str,
    pub box_borderw: u32,
}

impl Overlay {
    /// Create a text overlay with default styling.
    pub fn text(
        content: impl Into<String>,
        x: f64,
        y: f64,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self::new(OverlayKind::Text, content, x, y, start_time, end_time)
    }

    /// Create an image overlay referencing an asset.
    pub fn image(
        reference: impl Into<String>,
        x: f64,
        y: f64,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self::new(OverlayKind::Image, reference, x, y, start_time, end_time)
    }

    /// Create a video overlay referencing an asset.
    pub fn video(
        reference: impl Into<String>,
        x: f64,
        y: f64,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self::new(OverlayKind::Video, reference, x, y, start_time, end_time)
    }

    fn new(
        kind: OverlayKind,
        content: impl Into<String>,
        x: f64,
        y: f64,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            kind,
            content: content.into(),
            x,
            y,
            start_time,
            end_time,
            color: None,
            font_size: None,
            box_enabled: None,
            box_color: None,
            box_borderw: None,
        }
    }

    /// Check field-level invariants, naming the first offending field.
    pub fn validate(&self) -> Result<(), OverlayValidationError> {
        for (field, value) in [("x", self.x), ("y", self.y)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(OverlayValidationError::PositionOutOfRange { field, value });
            }
        }

        for (field, value) in [("start_time", self.start_time), ("end_time", self.end_time)] {
            if !value.is_finite() || value < 0.0 {
                return Err(OverlayValidationError::InvalidTime { field, value });
            }
        }

        if self.end_time <= self.start_time {
            return Err(OverlayValidationError::EmptyTimeWindow {
                start: self.start_time,
                end: self.end_time,
            });
        }

        if self.kind.is_asset() && self.content.trim().is_empty() {
            return Err(OverlayValidationError::MissingAssetReference { kind: self.kind });
        }

        Ok(())
    }

    /// Text styling with defaults filled in: white 36pt text on a
    /// half-transparent black box with a 5px border.
    pub fn text_style(&self) -> TextStyle<'_> {
        TextStyle {
            color: self.color.as_deref().unwrap_or(DEFAULT_FONT_COLOR),
            font_size: self.font_size.unwrap_or(DEFAULT_FONT_SIZE),
            box_enabled: self.box_enabled.unwrap_or(true),
            box_color: self.box_color.as_deref().unwrap_or(DEFAULT_BOX_COLOR),
            box_borderw: self.box_borderw.unwrap_or(DEFAULT_BOX_BORDERW),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_overlay() {
        let overlay = Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0);
        assert!(overlay.validate().is_ok());
    }

    #[test]
    fn test_position_out_of_range_names_field() {
        let overlay = Overlay::text("Hi", 1.5, 0.1, 0.0, 3.0);
        assert_eq!(
            overlay.validate(),
            Err(OverlayValidationError::PositionOutOfRange {
                field: "x",
                value: 1.5
            })
        );

        let overlay = Overlay::text("Hi", 0.5, -0.2, 0.0, 3.0);
        assert_eq!(
            overlay.validate(),
            Err(OverlayValidationError::PositionOutOfRange {
                field: "y",
                value: -0.2
            })
        );
    }

    #[test]
    fn test_negative_time_rejected() {
        let overlay = Overlay::text("Hi", 0.5, 0.1, -1.0, 3.0);
        assert_eq!(
            overlay.validate(),
            Err(OverlayValidationError::InvalidTime {
                field: "start_time",
                value: -1.0
            })
        );
    }

    #[test]
    fn test_empty_time_window_rejected() {
        let overlay = Overlay::text("Hi", 0.5, 0.1, 3.0, 3.0);
        assert!(matches!(
            overlay.validate(),
            Err(OverlayValidationError::EmptyTimeWindow { .. })
        ));
    }

    #[test]
    fn test_asset_overlay_requires_reference() {
        let overlay = Overlay::image("  ", 0.5, 0.1, 0.0, 3.0);
        assert_eq!(
            overlay.validate(),
            Err(OverlayValidationError::MissingAssetReference {
                kind: OverlayKind::Image
            })
        );
    }

    #[test]
    fn test_text_style_defaults() {
        let overlay = Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0);
        let style = overlay.text_style();

        assert_eq!(style.color, "white");
        assert_eq!(style.font_size, 36);
        assert!(style.box_enabled);
        assert_eq!(style.box_color, "black@0.5");
        assert_eq!(style.box_borderw, 5);
    }

    #[test]
    fn test_text_style_overrides() {
        let mut overlay = Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0);
        overlay.color = Some("yellow".to_string());
        overlay.box_enabled = Some(false);

        let style = overlay.text_style();
        assert_eq!(style.color, "yellow");
        assert!(!style.box_enabled);
    }

    #[test]
    fn test_unknown_kind_deserializes() {
        let raw = r#"{"type":"sticker","content":"x","x":0.1,"y":0.1,"start_time":0,"end_time":1}"#;
        let overlay: Overlay = serde_json::from_str(raw).unwrap();
        assert_eq!(overlay.kind, OverlayKind::Unknown);
    }

    #[test]
    fn test_wire_field_names() {
        let mut overlay = Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0);
        overlay.box_enabled = Some(true);

        let json = serde_json::to_value(&overlay).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["box"], true);
    }
}
