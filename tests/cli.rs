//! CLI integration tests

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn region_blur(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("region-blur").unwrap();
    cmd.current_dir(dir);
    cmd
}

fn write_image(dir: &TempDir, name: &str, image: &RgbaImage) -> String {
    let path = dir.path().join(name);
    image.save(&path).unwrap();
    path.to_string_lossy().into_owned()
}

fn out_path(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().into_owned()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    region_blur(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("mosaic"));
}

#[test]
fn test_info_shows_version_and_defaults() {
    let dir = TempDir::new().unwrap();
    region_blur(dir.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "region-blur v",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("Max blur radius"))
        .stdout(predicate::str::contains("[render]"))
        .stdout(predicate::str::contains("max_blur_radius = 254"));
}

#[test]
fn test_blur_uniform_image() {
    let dir = TempDir::new().unwrap();
    let red = RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255]));
    let input = write_image(&dir, "red.png", &red);
    let output = out_path(&dir, "out/blurred.png");

    region_blur(dir.path())
        .args(["blur", "-i", input.as_str(), "-o", output.as_str(), "--radius", "3"])
        .assert()
        .success();

    let result = image::open(&output).unwrap().to_rgba8();
    assert!(result.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
}

#[test]
fn test_blur_rect_leaves_rest_untouched() {
    let dir = TempDir::new().unwrap();
    let source = RgbaImage::from_fn(20, 20, |x, _| {
        if x % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let input = write_image(&dir, "stripes.png", &source);
    let output = out_path(&dir, "blurred.png");

    region_blur(dir.path())
        .args(["blur", "-i", input.as_str(), "-o", output.as_str(), "-r", "2"])
        .args(["--rect", "0,0,10,20"])
        .assert()
        .success();

    let result = image::open(&output).unwrap().to_rgba8();
    for y in 0..20 {
        for x in 10..20 {
            assert_eq!(result.get_pixel(x, y), source.get_pixel(x, y));
        }
    }
    assert_ne!(result.get_pixel(4, 10), source.get_pixel(4, 10));
}

#[test]
fn test_blur_rejects_zero_radius() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &RgbaImage::new(4, 4));

    region_blur(dir.path())
        .args(["blur", "-i", input.as_str(), "-o", "out.png", "--radius", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("radius"));
}

#[test]
fn test_mosaic_checkerboard() {
    let dir = TempDir::new().unwrap();
    let source = RgbaImage::from_fn(4, 4, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    let input = write_image(&dir, "checker.png", &source);
    let output = out_path(&dir, "mosaic.png");

    region_blur(dir.path())
        .args(["mosaic", "-i", input.as_str(), "-o", output.as_str(), "--block", "4"])
        .assert()
        .success();

    let result = image::open(&output).unwrap().to_rgba8();
    assert!(result.pixels().all(|p| *p == Rgba([128, 128, 128, 255])));
}

#[test]
fn test_mosaic_rejects_zero_block() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &RgbaImage::new(4, 4));

    region_blur(dir.path())
        .args(["mosaic", "-i", input.as_str(), "-o", "out.png", "--block", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_input_exit_code() {
    let dir = TempDir::new().unwrap();
    region_blur(dir.path())
        .args(["blur", "-i", "missing.png", "-o", "out.png", "--radius", "4"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Image not found"));
}

#[test]
fn test_render_export_canvas() {
    let dir = TempDir::new().unwrap();
    let source = RgbaImage::from_pixel(40, 20, Rgba([10, 20, 30, 255]));
    let input = write_image(&dir, "in.png", &source);
    let regions = dir.path().join("regions.json");
    std::fs::write(
        &regions,
        r#"[{"center": {"x": 10, "y": 5}, "shape": {"type": "circle", "radius": 4},
             "effect": {"type": "blur", "amount": 2}}]"#,
    )
    .unwrap();
    let output = out_path(&dir, "export.png");

    region_blur(dir.path())
        .args([
            "render",
            "-i",
            input.as_str(),
            "-o",
            output.as_str(),
            "-r",
            regions.to_str().unwrap(),
            "--display-width",
            "20",
            "--display-height",
            "10",
            "--target",
            "export",
        ])
        .assert()
        .success();

    let result = image::open(&output).unwrap().to_rgba8();
    assert_eq!(result.dimensions(), (80, 40));
    assert!(result.pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
}

#[test]
fn test_render_rejects_zero_display() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &RgbaImage::new(4, 4));
    let regions = dir.path().join("regions.json");
    std::fs::write(&regions, "[]").unwrap();

    region_blur(dir.path())
        .args([
            "render",
            "-i",
            input.as_str(),
            "-o",
            "out.png",
            "-r",
            regions.to_str().unwrap(),
            "--display-width",
            "0",
            "--display-height",
            "10",
        ])
        .assert()
        .code(2);
}

#[test]
fn test_render_bad_config_is_invalid_args() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &RgbaImage::new(4, 4));
    let regions = dir.path().join("regions.json");
    std::fs::write(&regions, "[]").unwrap();
    let config = dir.path().join("bad.toml");
    std::fs::write(&config, "[render]\nmax_blur_radius = \"lots\"\n").unwrap();

    region_blur(dir.path())
        .args([
            "render",
            "-i",
            input.as_str(),
            "-o",
            "out.png",
            "-r",
            regions.to_str().unwrap(),
            "--display-width",
            "4",
            "--display-height",
            "4",
            "-c",
            config.to_str().unwrap(),
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Parse error"));
}

#[test]
fn test_render_invalid_regions_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_image(&dir, "in.png", &RgbaImage::new(4, 4));
    let regions = dir.path().join("regions.json");
    std::fs::write(&regions, "{not json").unwrap();

    region_blur(dir.path())
        .args([
            "render",
            "-i",
            input.as_str(),
            "-o",
            "out.png",
            "-r",
            regions.to_str().unwrap(),
            "--display-width",
            "4",
            "--display-height",
            "4",
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid regions"));
}
