//! Icon Resolver Integration Tests

use std::fs;

use coursetrack::icons::{fallback, AssetFormat, IconResolver, FALLBACK_COLOR, MAX_ICON_SIZE};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

const RED_SQUARE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
  <rect width="16" height="16" fill="#ff0000"/>
</svg>"##;

fn icon_dir() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("brands")).unwrap();
    fs::write(temp.path().join("brands").join("SiRust.svg"), RED_SQUARE).unwrap();
    fs::write(temp.path().join("broken.svg"), "<svg").unwrap();
    fs::write(temp.path().join("readme.txt"), "not an icon").unwrap();

    RgbaImage::from_pixel(4, 4, Rgba([0, 0, 255, 255]))
        .save(temp.path().join("blue.png"))
        .unwrap();
    temp
}

#[test]
fn test_load_indexes_image_files() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();

    assert_eq!(resolver.names(), vec!["blue", "brands/SiRust", "broken"]);
    assert_eq!(resolver.entry("brands/SiRust").unwrap().format, AssetFormat::Vector);
    assert_eq!(resolver.entry("blue").unwrap().format, AssetFormat::Raster);
    assert!(resolver.entry("readme").is_none());
}

#[test]
fn test_vector_icon_rendered_at_requested_size() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();

    let image = resolver.resolve("brands/SiRust", 50);
    assert_eq!(image.dimensions(), (50, 50));
    assert_eq!(*image.get_pixel(25, 25), Rgba([255, 0, 0, 255]));
}

#[test]
fn test_huge_size_is_clamped() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();

    let image = resolver.resolve("brands/SiRust", u32::MAX);
    assert_eq!(image.dimensions(), (MAX_ICON_SIZE, MAX_ICON_SIZE));
    assert_eq!(*image.get_pixel(10, 10), Rgba([255, 0, 0, 255]));

    let missing = resolver.resolve("SiMissing", u32::MAX);
    assert_eq!(missing.dimensions(), (MAX_ICON_SIZE, MAX_ICON_SIZE));
}

#[test]
fn test_raster_icon_resized() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();

    let image = resolver.resolve("blue", 32);
    assert_eq!(image.dimensions(), (32, 32));
    assert_eq!(*image.get_pixel(16, 16), Rgba([0, 0, 255, 255]));
}

#[test]
fn test_unusable_icons_fall_back() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();

    assert_eq!(resolver.resolve("broken", 20), fallback(20));
    assert_eq!(resolver.resolve("SiMissing", 20), fallback(20));
    assert!(fallback(3).pixels().all(|p| *p == FALLBACK_COLOR));
}

#[test]
fn test_invalid_assets_reported() {
    let temp = icon_dir();
    let resolver = IconResolver::load(temp.path()).unwrap();
    assert_eq!(resolver.report_invalid_assets(), vec!["broken".to_string()]);
}

#[test]
fn test_missing_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("none");

    assert!(IconResolver::load(&missing).is_err());
    assert!(IconResolver::load_or_empty(&missing).is_empty());
}
