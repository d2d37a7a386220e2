//! Shared types for the slurp filter pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `RgbaImage` so downstream crates can pass images around
/// without depending on `image` directly.
pub use image::RgbaImage;

/// A caller-supplied, untyped request for one named transformation.
///
/// On the wire this is `{"filter": "<name>", "params": {...}}`. The
/// `params` payload is kept opaque until the registry resolves the
/// name and decodes it into the matching parameter shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Filter name, matched case-insensitively against the registry.
    #[serde(rename = "filter")]
    pub name: String,

    /// Filter parameters. Absent and `null` are equivalent.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub params: serde_json::Value,
}

impl FilterSpec {
    /// Create a spec with a parameter payload.
    #[must_use]
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Create a spec for a filter that takes no parameters.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, serde_json::Value::Null)
    }
}

/// Resampling used by the rotate filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Nearest-neighbor: blocky, preserves exact pixel values.
    Nearest,
    /// Bilinear.
    Linear,
    /// Bicubic.
    #[default]
    Cubic,
}

impl Interpolation {
    /// Parse the wire name. Matching is exact (lowercase only).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "nearest" => Some(Self::Nearest),
            "linear" => Some(Self::Linear),
            "cubic" => Some(Self::Cubic),
            _ => None,
        }
    }

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        }
    }

    pub(crate) const fn to_imageproc(self) -> imageproc::geometric_transformations::Interpolation {
        use imageproc::geometric_transformations::Interpolation as Ip;
        match self {
            Self::Nearest => Ip::Nearest,
            Self::Linear => Ip::Bilinear,
            Self::Cubic => Ip::Bicubic,
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of a crop rectangle inside the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Center,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,
}

impl Anchor {
    /// Every anchor, in the order they are listed in error messages.
    pub const ALL: [Self; 9] = [
        Self::Center,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
        Self::TopLeft,
    ];

    /// Parse an anchor name, ignoring ASCII case.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.as_str().eq_ignore_ascii_case(name))
    }

    /// The wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Top => "top",
            Self::TopRight => "topright",
            Self::Right => "right",
            Self::BottomRight => "bottomright",
            Self::Bottom => "bottom",
            Self::BottomLeft => "bottomleft",
            Self::Left => "left",
            Self::TopLeft => "topleft",
        }
    }

    /// Top-left corner of an `inner`-sized rectangle placed inside an
    /// `outer`-sized one according to this anchor.
    ///
    /// `inner` must not exceed `outer` on either axis.
    #[must_use]
    pub const fn origin(self, outer: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
        let slack_x = outer.0 - inner.0;
        let slack_y = outer.1 - inner.1;
        let x = match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => 0,
            Self::Top | Self::Center | Self::Bottom => slack_x / 2,
            Self::TopRight | Self::Right | Self::BottomRight => slack_x,
        };
        let y = match self {
            Self::TopLeft | Self::Top | Self::TopRight => 0,
            Self::Left | Self::Center | Self::Right => slack_y / 2,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => slack_y,
        };
        (x, y)
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while resolving or applying filters.
///
/// The first three variants come from the registry and describe a bad
/// request. [`Render`](Self::Render) comes from the pipeline when valid
/// parameters cannot be applied to the actual image (for example a crop
/// rectangle outside the image bounds).
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// The filter name is not in the registry.
    #[error("unknown filter: {0}")]
    UnknownFilter(String),

    /// The params payload does not match the filter's parameter shape.
    #[error("malformed parameters for {filter}: {source}")]
    MalformedParams {
        filter: String,
        #[source]
        source: serde_json::Error,
    },

    /// The params decoded but break the filter's validation rule.
    #[error("invalid filter {filter}: {reason}")]
    InvalidParams { filter: String, reason: String },

    /// A validated operation could not be applied to the image.
    #[error("{filter} failed: {reason}")]
    Render {
        filter: &'static str,
        reason: String,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_spec_reads_wire_names() {
        let spec: FilterSpec =
            serde_json::from_str(r#"{"filter":"brightness","params":{"percentage":10}}"#)
                .unwrap();
        assert_eq!(spec.name, "brightness");
        assert_eq!(spec.params["percentage"], 10);
    }

    #[test]
    fn filter_spec_params_default_to_null() {
        let spec: FilterSpec = serde_json::from_str(r#"{"filter":"grayscale"}"#).unwrap();
        assert!(spec.params.is_null());
        assert_eq!(
            serde_json::to_string(&spec).unwrap(),
            r#"{"filter":"grayscale"}"#
        );
    }

    #[test]
    fn interpolation_default_is_cubic() {
        assert_eq!(Interpolation::default(), Interpolation::Cubic);
    }

    #[test]
    fn interpolation_parse_is_exact() {
        assert_eq!(Interpolation::parse("linear"), Some(Interpolation::Linear));
        assert_eq!(Interpolation::parse("Linear"), None);
        assert_eq!(Interpolation::parse(""), None);
    }

    #[test]
    fn anchor_parse_ignores_case() {
        assert_eq!(Anchor::parse("TopRight"), Some(Anchor::TopRight));
        assert_eq!(Anchor::parse("center"), Some(Anchor::Center));
        assert_eq!(Anchor::parse("middle"), None);
    }

    #[test]
    fn anchor_names_round_trip_through_parse() {
        for anchor in Anchor::ALL {
            assert_eq!(Anchor::parse(anchor.as_str()), Some(anchor));
        }
    }

    #[test]
    fn anchor_origin_places_rectangle() {
        let outer = (10, 8);
        let inner = (4, 2);
        assert_eq!(Anchor::TopLeft.origin(outer, inner), (0, 0));
        assert_eq!(Anchor::Center.origin(outer, inner), (3, 3));
        assert_eq!(Anchor::BottomRight.origin(outer, inner), (6, 6));
        assert_eq!(Anchor::Top.origin(outer, inner), (3, 0));
        assert_eq!(Anchor::Left.origin(outer, inner), (0, 3));
    }

    #[test]
    fn error_display_is_user_facing() {
        let err = FilterError::InvalidParams {
            filter: "gamma".to_string(),
            reason: "gamma must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid filter gamma: gamma must be greater than zero"
        );
        assert_eq!(
            FilterError::UnknownFilter("emboss".to_string()).to_string(),
            "unknown filter: emboss"
        );
    }
}
