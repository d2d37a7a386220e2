//! Fixed filter lists.

use serde_json::json;

use crate::types::FilterSpec;

/// Clean-up applied to a perspective-corrected document photo.
///
/// Grayscale, threshold, despeckle, then lift and sharpen the text.
#[must_use]
pub fn document_scan() -> Vec<FilterSpec> {
    vec![
        FilterSpec::named("grayscale"),
        FilterSpec::named("scanify"),
        FilterSpec::new("median", json!({"radius": 1, "alpha": false})),
        FilterSpec::new("brightness", json!({"percentage": 15})),
        FilterSpec::new("contrast", json!({"percentage": 60})),
        FilterSpec::new(
            "unsharpmask",
            json!({"sigma": 1.5, "amount": 1.0, "threshold": 0.5}),
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;

    #[test]
    fn document_scan_resolves() {
        let pipeline = Pipeline::from_specs(&document_scan()).unwrap();
        let names: Vec<&str> = pipeline.operations().iter().map(|op| op.name()).collect();
        assert_eq!(
            names,
            [
                "grayscale",
                "scanify",
                "median",
                "brightness",
                "contrast",
                "unsharpmask"
            ]
        );
    }

    #[test]
    fn document_scan_output_is_gray() {
        let img = crate::RgbaImage::from_fn(12, 12, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgba([(x * 20) as u8, 90, (y * 20) as u8, 255])
        });
        let out = Pipeline::from_specs(&document_scan())
            .unwrap()
            .apply(&img)
            .unwrap();
        assert_eq!(out.dimensions(), (12, 12));
        assert!(out.pixels().all(|p| p.0[0] == p.0[1] && p.0[1] == p.0[2]));
    }
}
