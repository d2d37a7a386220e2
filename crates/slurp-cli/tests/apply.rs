//! Run the `slurp` binary end to end.

#![allow(clippy::unwrap_used)]

use std::process::Command;

use slurp_filters::{ImageFormat, RgbaImage, codec};

fn slurp() -> Command {
    Command::new(env!("CARGO_BIN_EXE_slurp"))
}

#[test]
fn apply_writes_filtered_png() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    let output = dir.path().join("out.png");
    let raw: Vec<u8> = (0u8..64).flat_map(|i| [i * 3, 100, 200, 255]).collect();
    let source = RgbaImage::from_raw(8, 8, raw).unwrap();
    std::fs::write(&input, codec::encode(&source, ImageFormat::Png).unwrap()).unwrap();

    let status = slurp()
        .arg("apply")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .args(["--filters", r#"[{"filter":"invert"}]"#, "--check-determinism"])
        .status()
        .unwrap();
    assert!(status.success());

    let out = codec::decode(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(out, slurp_filters::tone::invert(&source));
}

#[test]
fn apply_rejects_invalid_filters() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.png");
    std::fs::write(
        &input,
        codec::encode(&RgbaImage::new(2, 2), ImageFormat::Png).unwrap(),
    )
    .unwrap();

    let status = slurp()
        .arg("apply")
        .arg(&input)
        .args(["-o", "unused.png"])
        .args(["--filters", r#"[{"filter":"gamma","params":{"gamma":0}}]"#])
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn filters_lists_catalogue() {
    let out = slurp().arg("filters").output().unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    assert!(text.lines().any(|l| l == "scanify"));
    assert_eq!(text.lines().count(), 24);
}
