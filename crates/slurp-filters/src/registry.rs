//! Name → [`FilterOperation`] resolution.
//!
//! Each registered filter has a decoder that turns the opaque JSON
//! `params` payload into a raw parameter struct and then validates it
//! into a typed operation. The set of names is closed; adding a filter
//! means adding one row to [`REGISTRY`].
//!
//! Integer parameters decode as `i64` so that negative values are
//! reported as invalid parameters rather than as malformed JSON.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::operation::{FilterOperation, Window};
use crate::types::{Anchor, FilterError, FilterSpec, Interpolation};

/// Why a payload was turned away, before the filter name is attached.
enum Rejection {
    Malformed(serde_json::Error),
    Invalid(String),
}

type Decoder = fn(&Value) -> Result<FilterOperation, Rejection>;

static REGISTRY: &[(&str, Decoder)] = &[
    ("resize", decode::<ResizeParams>),
    ("crop", decode::<CropParams>),
    ("croptosize", decode::<CropToSizeParams>),
    ("rotate", decode::<RotateParams>),
    ("brightness", decode::<BrightnessParams>),
    ("contrast", decode::<ContrastParams>),
    ("saturation", decode::<SaturationParams>),
    ("gamma", decode::<GammaParams>),
    ("gaussianblur", decode::<GaussianBlurParams>),
    ("unsharpmask", decode::<UnsharpMaskParams>),
    ("sigmoid", decode::<SigmoidParams>),
    ("pixelate", decode::<PixelateParams>),
    ("colorize", decode::<ColorizeParams>),
    ("sepia", decode::<SepiaParams>),
    ("mean", decode::<MeanParams>),
    ("median", decode::<MedianParams>),
    ("minimum", decode::<MinimumParams>),
    ("maximum", decode::<MaximumParams>),
    ("hue", decode::<HueParams>),
    ("colorbalance", decode::<ColorBalanceParams>),
    ("grayscale", grayscale),
    ("invert", invert),
    ("rotate180", rotate_180),
    ("scanify", scanify),
];

/// Names of every registered filter, in registration order.
pub fn filter_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Resolve one spec into a validated operation.
///
/// # Errors
///
/// - [`FilterError::UnknownFilter`] if the name is not registered.
/// - [`FilterError::MalformedParams`] if `params` does not decode into
///   the filter's parameter shape.
/// - [`FilterError::InvalidParams`] if a decoded value is out of range.
pub fn resolve(spec: &FilterSpec) -> Result<FilterOperation, FilterError> {
    let lowered = spec.name.to_ascii_lowercase();
    let Some(&(name, decoder)) = REGISTRY.iter().find(|(name, _)| *name == lowered) else {
        return Err(FilterError::UnknownFilter(spec.name.clone()));
    };

    decoder(&spec.params).map_err(|rejection| match rejection {
        Rejection::Malformed(source) => FilterError::MalformedParams {
            filter: name.to_owned(),
            source,
        },
        Rejection::Invalid(reason) => FilterError::InvalidParams {
            filter: name.to_owned(),
            reason,
        },
    })
}

/// Resolve a list of specs, stopping at the first failure.
///
/// # Errors
///
/// Returns the first error produced by [`resolve`].
pub fn resolve_all(specs: &[FilterSpec]) -> Result<Vec<FilterOperation>, FilterError> {
    specs.iter().map(resolve).collect()
}

// ──────────────────────────────────────────────────────────────────────
// Decoding
// ──────────────────────────────────────────────────────────────────────

/// Raw, unchecked parameter shape of one filter.
trait Params: DeserializeOwned {
    fn validate(self) -> Result<FilterOperation, String>;
}

fn decode<P: Params>(params: &Value) -> Result<FilterOperation, Rejection> {
    let raw = P::deserialize(params).map_err(Rejection::Malformed)?;
    raw.validate().map_err(Rejection::Invalid)
}

#[allow(clippy::unnecessary_wraps)]
fn grayscale(_: &Value) -> Result<FilterOperation, Rejection> {
    Ok(FilterOperation::Grayscale)
}

#[allow(clippy::unnecessary_wraps)]
fn invert(_: &Value) -> Result<FilterOperation, Rejection> {
    Ok(FilterOperation::Invert)
}

#[allow(clippy::unnecessary_wraps)]
fn rotate_180(_: &Value) -> Result<FilterOperation, Rejection> {
    Ok(FilterOperation::Rotate180)
}

#[allow(clippy::unnecessary_wraps)]
fn scanify(_: &Value) -> Result<FilterOperation, Rejection> {
    Ok(FilterOperation::Scanify)
}

// ──────────────────────────────────────────────────────────────────────
// Validation helpers
// ──────────────────────────────────────────────────────────────────────

fn finite(field: &str, value: f32) -> Result<f32, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{field} must be a finite number"))
    }
}

/// Inclusive range check. NaN fails `contains`.
fn between(field: &str, value: f32, min: f32, max: f32) -> Result<f32, String> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{field} must be between {min} and {max}, got {value}"))
    }
}

fn positive(field: &str, value: f32) -> Result<f32, String> {
    if finite(field, value)? > 0.0 {
        Ok(value)
    } else {
        Err(format!("{field} must be greater than zero, got {value}"))
    }
}

fn non_negative(field: &str, value: f32) -> Result<f32, String> {
    if finite(field, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(format!("{field} must not be negative, got {value}"))
    }
}

fn positive_int(field: &str, value: i64) -> Result<u32, String> {
    if value <= 0 {
        return Err(format!("{field} must be greater than zero, got {value}"));
    }
    to_u32(field, value)
}

fn non_negative_int(field: &str, value: i64) -> Result<u32, String> {
    if value < 0 {
        return Err(format!("{field} must not be negative, got {value}"));
    }
    to_u32(field, value)
}

fn to_u32(field: &str, value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{field} must be at most {}, got {value}", u32::MAX))
}

fn percentage(value: f32) -> Result<f32, String> {
    between("percentage", value, -100.0, 100.0)
}

// ──────────────────────────────────────────────────────────────────────
// Parameter shapes
// ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ResizeParams {
    width: i64,
    height: i64,
}

impl Params for ResizeParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Resize {
            width: positive_int("width", self.width)?,
            height: positive_int("height", self.height)?,
        })
    }
}

#[derive(Deserialize)]
struct CropParams {
    x: i64,
    y: i64,
    width: i64,
    height: i64,
}

impl Params for CropParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Crop {
            x: non_negative_int("x", self.x)?,
            y: non_negative_int("y", self.y)?,
            width: non_negative_int("width", self.width)?,
            height: non_negative_int("height", self.height)?,
        })
    }
}

#[derive(Deserialize)]
struct CropToSizeParams {
    width: i64,
    height: i64,
    anchor: String,
}

impl Params for CropToSizeParams {
    fn validate(self) -> Result<FilterOperation, String> {
        let width = positive_int("width", self.width)?;
        let height = positive_int("height", self.height)?;
        let anchor = Anchor::parse(&self.anchor).ok_or_else(|| {
            let names: Vec<&str> = Anchor::ALL.iter().map(|a| a.as_str()).collect();
            format!(
                "anchor must be one of {}, got {:?}",
                names.join(", "),
                self.anchor
            )
        })?;
        Ok(FilterOperation::CropToSize {
            width,
            height,
            anchor,
        })
    }
}

#[derive(Deserialize)]
struct RotateParams {
    angle: f32,
    #[serde(default)]
    interpolation: Option<String>,
}

impl Params for RotateParams {
    fn validate(self) -> Result<FilterOperation, String> {
        let angle = finite("angle", self.angle)?;
        let interpolation = match self.interpolation.as_deref() {
            None => Interpolation::default(),
            Some(name) => Interpolation::parse(name).ok_or_else(|| {
                format!("interpolation must be one of nearest, linear, cubic, got {name:?}")
            })?,
        };
        Ok(FilterOperation::Rotate {
            angle,
            interpolation,
        })
    }
}

#[derive(Deserialize)]
struct BrightnessParams {
    percentage: f32,
}

impl Params for BrightnessParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Brightness {
            percentage: percentage(self.percentage)?,
        })
    }
}

#[derive(Deserialize)]
struct ContrastParams {
    percentage: f32,
}

impl Params for ContrastParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Contrast {
            percentage: percentage(self.percentage)?,
        })
    }
}

#[derive(Deserialize)]
struct SaturationParams {
    percentage: f32,
}

impl Params for SaturationParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Saturation {
            percentage: percentage(self.percentage)?,
        })
    }
}

#[derive(Deserialize)]
struct GammaParams {
    gamma: f32,
}

impl Params for GammaParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Gamma {
            gamma: positive("gamma", self.gamma)?,
        })
    }
}

#[derive(Deserialize)]
struct GaussianBlurParams {
    sigma: f32,
}

impl Params for GaussianBlurParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::GaussianBlur {
            sigma: positive("sigma", self.sigma)?,
        })
    }
}

#[derive(Deserialize)]
struct UnsharpMaskParams {
    sigma: f32,
    amount: f32,
    threshold: f32,
}

impl Params for UnsharpMaskParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::UnsharpMask {
            sigma: positive("sigma", self.sigma)?,
            amount: non_negative("amount", self.amount)?,
            threshold: non_negative("threshold", self.threshold)?,
        })
    }
}

#[derive(Deserialize)]
struct SigmoidParams {
    contrast: f32,
    midpoint: f32,
}

impl Params for SigmoidParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Sigmoid {
            contrast: positive("contrast", self.contrast)?,
            midpoint: between("midpoint", self.midpoint, 0.0, 1.0)?,
        })
    }
}

#[derive(Deserialize)]
struct PixelateParams {
    size: i64,
}

impl Params for PixelateParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Pixelate {
            size: positive_int("size", self.size)?,
        })
    }
}

#[derive(Deserialize)]
struct ColorizeParams {
    hue: f32,
    saturation: f32,
    value: f32,
}

impl Params for ColorizeParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Colorize {
            hue: between("hue", self.hue, 0.0, 360.0)?,
            saturation: between("saturation", self.saturation, 0.0, 1.0)?,
            value: between("value", self.value, 0.0, 1.0)?,
        })
    }
}

#[derive(Deserialize)]
struct SepiaParams {
    percentage: f32,
}

impl Params for SepiaParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Sepia {
            percentage: between("percentage", self.percentage, 0.0, 100.0)?,
        })
    }
}

/// Shared shape of the four rank filters.
#[derive(Deserialize)]
struct WindowParams {
    radius: i64,
    #[serde(default)]
    alpha: bool,
}

impl WindowParams {
    fn window(self) -> Result<Window, String> {
        Ok(Window {
            radius: positive_int("radius", self.radius)?,
            alpha: self.alpha,
        })
    }
}

macro_rules! window_params {
    ($($params:ident => $variant:ident),* $(,)?) => {$(
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct $params(WindowParams);

        impl Params for $params {
            fn validate(self) -> Result<FilterOperation, String> {
                self.0.window().map(FilterOperation::$variant)
            }
        }
    )*};
}

window_params! {
    MeanParams => Mean,
    MedianParams => Median,
    MinimumParams => Minimum,
    MaximumParams => Maximum,
}

#[derive(Deserialize)]
struct HueParams {
    angle: f32,
}

impl Params for HueParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::Hue {
            angle: between("angle", self.angle, -360.0, 360.0)?,
        })
    }
}

#[derive(Deserialize)]
struct ColorBalanceParams {
    red: f32,
    green: f32,
    blue: f32,
}

impl Params for ColorBalanceParams {
    fn validate(self) -> Result<FilterOperation, String> {
        Ok(FilterOperation::ColorBalance {
            red: between("red", self.red, -1.0, 1.0)?,
            green: between("green", self.green, -1.0, 1.0)?,
            blue: between("blue", self.blue, -1.0, 1.0)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolve_json(name: &str, params: Value) -> Result<FilterOperation, FilterError> {
        resolve(&FilterSpec::new(name, params))
    }

    #[track_caller]
    fn accepts(name: &str, params: Value) {
        if let Err(e) = resolve_json(name, params.clone()) {
            panic!("{name} {params} should be accepted: {e}");
        }
    }

    #[track_caller]
    fn rejects(name: &str, params: Value) {
        match resolve_json(name, params.clone()) {
            Err(FilterError::InvalidParams { filter, .. }) => assert_eq!(filter, name),
            other => panic!("{name} {params} should be invalid, got {other:?}"),
        }
    }

    #[test]
    fn every_registered_name_is_unique() {
        let mut names: Vec<&str> = filter_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 24);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = resolve(&FilterSpec::named("emboss")).unwrap_err();
        assert!(matches!(err, FilterError::UnknownFilter(ref n) if n == "emboss"));
    }

    #[test]
    fn name_match_ignores_case() {
        assert_eq!(
            resolve(&FilterSpec::named("GrayScale")).unwrap(),
            FilterOperation::Grayscale
        );
        let op = resolve_json("GaussianBlur", json!({"sigma": 1.0})).unwrap();
        assert_eq!(op.name(), "gaussianblur");
    }

    #[test]
    fn parameterless_filters_ignore_payload() {
        for name in ["grayscale", "invert", "rotate180", "scanify"] {
            accepts(name, Value::Null);
            accepts(name, json!({"anything": 1}));
        }
    }

    #[test]
    fn missing_params_are_malformed() {
        let err = resolve(&FilterSpec::named("brightness")).unwrap_err();
        assert!(matches!(err, FilterError::MalformedParams { ref filter, .. } if filter == "brightness"));
    }

    #[test]
    fn wrong_types_are_malformed() {
        for (name, params) in [
            ("brightness", json!({"percentage": "ten"})),
            ("resize", json!({"width": 1.5, "height": 2})),
            ("resize", json!({"width": 10})),
            ("mean", json!({"radius": 1, "alpha": "yes"})),
            ("rotate", json!("ninety")),
        ] {
            let err = resolve_json(name, params).unwrap_err();
            assert!(
                matches!(err, FilterError::MalformedParams { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn resize_bounds() {
        accepts("resize", json!({"width": 1, "height": 1}));
        rejects("resize", json!({"width": 0, "height": 1}));
        rejects("resize", json!({"width": 1, "height": -1}));
        rejects("resize", json!({"width": 1, "height": 5_000_000_000_i64}));
    }

    #[test]
    fn crop_bounds() {
        accepts("crop", json!({"x": 0, "y": 0, "width": 0, "height": 0}));
        rejects("crop", json!({"x": -1, "y": 0, "width": 1, "height": 1}));
        rejects("crop", json!({"x": 0, "y": -1, "width": 1, "height": 1}));
        rejects("crop", json!({"x": 0, "y": 0, "width": -1, "height": 1}));
        rejects("crop", json!({"x": 0, "y": 0, "width": 1, "height": -1}));
    }

    #[test]
    fn crop_to_size_bounds_and_anchor() {
        accepts("croptosize", json!({"width": 1, "height": 1, "anchor": "center"}));
        accepts("croptosize", json!({"width": 1, "height": 1, "anchor": "TopLeft"}));
        rejects("croptosize", json!({"width": 0, "height": 1, "anchor": "center"}));
        rejects("croptosize", json!({"width": 1, "height": 0, "anchor": "center"}));
        rejects("croptosize", json!({"width": 1, "height": 1, "anchor": ""}));
        rejects("croptosize", json!({"width": 1, "height": 1, "anchor": "middle"}));

        let op = resolve_json(
            "croptosize",
            json!({"width": 3, "height": 2, "anchor": "bottomright"}),
        )
        .unwrap();
        assert_eq!(
            op,
            FilterOperation::CropToSize {
                width: 3,
                height: 2,
                anchor: Anchor::BottomRight,
            }
        );
    }

    #[test]
    fn rotate_interpolation() {
        let op = resolve_json("rotate", json!({"angle": 30})).unwrap();
        assert_eq!(
            op,
            FilterOperation::Rotate {
                angle: 30.0,
                interpolation: Interpolation::Cubic,
            }
        );
        for name in ["nearest", "linear", "cubic"] {
            accepts("rotate", json!({"angle": 10, "interpolation": name}));
        }
        rejects("rotate", json!({"angle": 10, "interpolation": "bilinear"}));
        rejects("rotate", json!({"angle": 10, "interpolation": "Cubic"}));
        rejects("rotate", json!({"angle": 10, "interpolation": ""}));
        rejects("rotate", json!({"angle": 1e39}));
    }

    #[test]
    fn percentage_filters_bounds() {
        for name in ["brightness", "contrast", "saturation"] {
            accepts(name, json!({"percentage": 100}));
            accepts(name, json!({"percentage": -100}));
            accepts(name, json!({"percentage": 0}));
            rejects(name, json!({"percentage": 100.1}));
            rejects(name, json!({"percentage": 101}));
            rejects(name, json!({"percentage": -100.1}));
            rejects(name, json!({"percentage": -101}));
        }
    }

    #[test]
    fn gamma_and_sigma_must_be_positive() {
        accepts("gamma", json!({"gamma": 0.01}));
        rejects("gamma", json!({"gamma": 0}));
        rejects("gamma", json!({"gamma": -1}));
        accepts("gaussianblur", json!({"sigma": 0.01}));
        rejects("gaussianblur", json!({"sigma": 0}));
        rejects("gaussianblur", json!({"sigma": 1e39}));
    }

    #[test]
    fn unsharp_mask_bounds() {
        accepts("unsharpmask", json!({"sigma": 1, "amount": 0, "threshold": 0}));
        rejects("unsharpmask", json!({"sigma": 0, "amount": 0, "threshold": 0}));
        rejects("unsharpmask", json!({"sigma": 1, "amount": -0.1, "threshold": 0}));
        rejects("unsharpmask", json!({"sigma": 1, "amount": 0, "threshold": -0.1}));
    }

    #[test]
    fn sigmoid_bounds() {
        accepts("sigmoid", json!({"contrast": 0.1, "midpoint": 0}));
        accepts("sigmoid", json!({"contrast": 10, "midpoint": 1}));
        rejects("sigmoid", json!({"contrast": 0, "midpoint": 0.5}));
        rejects("sigmoid", json!({"contrast": 1, "midpoint": -0.1}));
        rejects("sigmoid", json!({"contrast": 1, "midpoint": 1.1}));
    }

    #[test]
    fn pixelate_bounds() {
        accepts("pixelate", json!({"size": 1}));
        rejects("pixelate", json!({"size": 0}));
        rejects("pixelate", json!({"size": -3}));
    }

    #[test]
    fn colorize_bounds() {
        accepts("colorize", json!({"hue": 0, "saturation": 0, "value": 0}));
        accepts("colorize", json!({"hue": 360, "saturation": 1, "value": 1}));
        rejects("colorize", json!({"hue": 360.1, "saturation": 1, "value": 1}));
        rejects("colorize", json!({"hue": -0.1, "saturation": 1, "value": 1}));
        rejects("colorize", json!({"hue": 0, "saturation": 1.1, "value": 1}));
        rejects("colorize", json!({"hue": 0, "saturation": 1, "value": 1.1}));
        rejects("colorize", json!({"hue": 0, "saturation": 1, "value": -0.1}));
    }

    #[test]
    fn sepia_bounds() {
        accepts("sepia", json!({"percentage": 0}));
        accepts("sepia", json!({"percentage": 100}));
        rejects("sepia", json!({"percentage": -0.1}));
        rejects("sepia", json!({"percentage": 100.1}));
    }

    #[test]
    fn window_filter_bounds_and_alpha_default() {
        for name in ["mean", "median", "minimum", "maximum"] {
            accepts(name, json!({"radius": 1}));
            rejects(name, json!({"radius": 0}));
            rejects(name, json!({"radius": -1}));
        }
        assert_eq!(
            resolve_json("median", json!({"radius": 2})).unwrap(),
            FilterOperation::Median(Window {
                radius: 2,
                alpha: false,
            })
        );
        assert_eq!(
            resolve_json("maximum", json!({"radius": 1, "alpha": true})).unwrap(),
            FilterOperation::Maximum(Window {
                radius: 1,
                alpha: true,
            })
        );
    }

    #[test]
    fn hue_bounds() {
        accepts("hue", json!({"angle": 360}));
        accepts("hue", json!({"angle": -360}));
        rejects("hue", json!({"angle": 360.1}));
        rejects("hue", json!({"angle": -360.1}));
    }

    #[test]
    fn color_balance_bounds() {
        accepts("colorbalance", json!({"red": 1, "green": -1, "blue": 0}));
        rejects("colorbalance", json!({"red": 1.1, "green": 0, "blue": 0}));
        rejects("colorbalance", json!({"red": 0, "green": -1.1, "blue": 0}));
        rejects("colorbalance", json!({"red": 0, "green": 0, "blue": 1.01}));
    }

    #[test]
    fn invalid_params_message_names_field() {
        let err = resolve_json("brightness", json!({"percentage": 150})).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("brightness"), "{msg}");
        assert!(msg.contains("percentage must be between -100 and 100"), "{msg}");
    }

    #[test]
    fn resolve_all_stops_at_first_failure() {
        let specs = vec![
            FilterSpec::named("grayscale"),
            FilterSpec::named("nope"),
            FilterSpec::new("gamma", json!({"gamma": -1})),
        ];
        assert!(matches!(
            resolve_all(&specs),
            Err(FilterError::UnknownFilter(_))
        ));
        let ok = resolve_all(&[FilterSpec::named("invert"), FilterSpec::named("scanify")]).unwrap();
        assert_eq!(ok, vec![FilterOperation::Invert, FilterOperation::Scanify]);
    }
}
