//! Logical icon names to rasterized images.
//!
//! Icons are addressed by their path relative to the icon directory, without
//! extension and with `/` separators (`brands/SiRust`). `resolve` always
//! returns an image of the requested size: anything that cannot be found,
//! decoded or rendered is replaced by a solid fallback square.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use thiserror::Error;
use walkdir::WalkDir;

/// Fill color of the fallback image
pub const FALLBACK_COLOR: Rgba<u8> = Rgba([0xbd, 0xbd, 0xbd, 0xff]);

/// Largest edge length `resolve` renders; larger requests are clamped
pub const MAX_ICON_SIZE: u32 = 1024;

/// Errors while loading or rendering icons
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Icon directory not readable: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown icon: {0}")]
    Unknown(String),

    #[error("Invalid icon asset {path}: {reason}")]
    InvalidAsset { path: PathBuf, reason: String },
}

/// Encoding of an icon file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFormat {
    Vector,
    Raster,
}

impl AssetFormat {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(AssetFormat::Vector),
            "png" | "jpg" | "jpeg" | "gif" | "bmp" | "ico" | "webp" => Some(AssetFormat::Raster),
            _ => None,
        }
    }
}

/// A known icon file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    pub logical_name: String,
    pub asset_path: PathBuf,
    pub format: AssetFormat,
}

/// Index of the icon directory
#[derive(Debug, Clone, Default)]
pub struct IconResolver {
    entries: BTreeMap<String, IconEntry>,
}

impl IconResolver {
    /// Scan `icon_root` recursively for image files
    pub fn load(icon_root: &Path) -> Result<Self, IconError> {
        let meta = fs::metadata(icon_root)?;
        if !meta.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a directory", icon_root.display()),
            )
            .into());
        }

        let mut entries = BTreeMap::new();
        let walker = WalkDir::new(icon_root).min_depth(1).sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable icon entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(format) = AssetFormat::from_path(path) else {
                continue;
            };
            let relative = path.strip_prefix(icon_root).unwrap_or(path);
            let logical_name = logical_name(relative);

            if entries.contains_key(&logical_name) {
                tracing::warn!("Duplicate icon name {}, keeping the first asset", logical_name);
                continue;
            }

            entries.insert(
                logical_name.clone(),
                IconEntry {
                    logical_name,
                    asset_path: path.to_path_buf(),
                    format,
                },
            );
        }

        tracing::debug!(icons = entries.len(), "Icons indexed from {}", icon_root.display());
        Ok(Self { entries })
    }

    /// Load icons, or start with none if the directory is unusable
    pub fn load_or_empty(icon_root: &Path) -> Self {
        Self::load(icon_root).unwrap_or_else(|e| {
            tracing::warn!("No icons available from {}: {}", icon_root.display(), e);
            Self::default()
        })
    }

    /// All logical names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn entry(&self, logical_name: &str) -> Option<&IconEntry> {
        self.entries.get(logical_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rasterize an icon to `size × size`. Never fails.
    ///
    /// `size` is clamped to [`MAX_ICON_SIZE`].
    pub fn resolve(&self, logical_name: &str, size: u32) -> RgbaImage {
        let size = size.min(MAX_ICON_SIZE);
        match self.render(logical_name, size) {
            Ok(image) => image,
            Err(IconError::Unknown(name)) => {
                tracing::debug!("Unknown icon {}, using fallback", name);
                fallback(size)
            }
            Err(e) => {
                tracing::warn!("Using fallback icon: {}", e);
                fallback(size)
            }
        }
    }

    /// Logical names whose asset cannot be decoded
    pub fn report_invalid_assets(&self) -> Vec<String> {
        self.entries
            .values()
            .filter(|entry| validate(entry).is_err())
            .map(|entry| entry.logical_name.clone())
            .collect()
    }

    fn render(&self, logical_name: &str, size: u32) -> Result<RgbaImage, IconError> {
        let entry = self
            .entries
            .get(logical_name)
            .ok_or_else(|| IconError::Unknown(logical_name.to_string()))?;

        if size == 0 {
            return Ok(fallback(0));
        }

        match entry.format {
            AssetFormat::Vector => render_vector(&entry.asset_path, size),
            AssetFormat::Raster => render_raster(&entry.asset_path, size),
        }
    }
}

/// Deterministic solid square used in place of unusable icons.
/// `size` is clamped to [`MAX_ICON_SIZE`].
pub fn fallback(size: u32) -> RgbaImage {
    let size = size.min(MAX_ICON_SIZE);
    RgbaImage::from_pixel(size, size, FALLBACK_COLOR)
}

fn logical_name(relative: &Path) -> String {
    let stem = relative.with_extension("");
    stem.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn invalid(path: &Path, reason: impl ToString) -> IconError {
    IconError::InvalidAsset {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn parse_svg(path: &Path) -> Result<usvg::Tree, IconError> {
    let data = fs::read(path)?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).map_err(|e| invalid(path, e))?;

    let svg_size = tree.size();
    if svg_size.width() <= 0.0 || svg_size.height() <= 0.0 {
        return Err(invalid(path, "empty canvas"));
    }
    Ok(tree)
}

fn render_vector(path: &Path, size: u32) -> Result<RgbaImage, IconError> {
    let tree = parse_svg(path)?;
    let mut pixmap = Pixmap::new(size, size).ok_or_else(|| invalid(path, "cannot allocate canvas"))?;

    let svg_size = tree.size();
    let transform = Transform::from_scale(
        size as f32 / svg_size.width(),
        size as f32 / svg_size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(size, size, data).ok_or_else(|| invalid(path, "pixel buffer size mismatch"))
}

fn render_raster(path: &Path, size: u32) -> Result<RgbaImage, IconError> {
    let image = image::open(path).map_err(|e| invalid(path, e))?;
    Ok(image.resize_exact(size, size, FilterType::Lanczos3).to_rgba8())
}

fn validate(entry: &IconEntry) -> Result<(), IconError> {
    match entry.format {
        AssetFormat::Vector => parse_svg(&entry.asset_path).map(|_| ()),
        AssetFormat::Raster => image::open(&entry.asset_path)
            .map(|_| ())
            .map_err(|e| invalid(&entry.asset_path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_name_uses_forward_slashes() {
        assert_eq!(logical_name(Path::new("brands/SiRust.svg")), "brands/SiRust");
        assert_eq!(logical_name(Path::new("SiGo.png")), "SiGo");
        assert_eq!(logical_name(Path::new("a/b/c.d.svg")), "a/b/c.d");
    }

    #[test]
    fn test_asset_format_by_extension() {
        assert_eq!(AssetFormat::from_path(Path::new("x.SVG")), Some(AssetFormat::Vector));
        assert_eq!(AssetFormat::from_path(Path::new("x.jpeg")), Some(AssetFormat::Raster));
        assert_eq!(AssetFormat::from_path(Path::new("x.txt")), None);
        assert_eq!(AssetFormat::from_path(Path::new("x")), None);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let resolver = IconResolver::default();
        let image = resolver.resolve("nope", 24);
        assert_eq!(image.dimensions(), (24, 24));
        assert!(image.pixels().all(|p| *p == FALLBACK_COLOR));
        assert_eq!(resolver.resolve("nope", 0).dimensions(), (0, 0));
    }

    #[test]
    fn test_oversized_request_clamped() {
        let resolver = IconResolver::default();
        let image = resolver.resolve("nope", u32::MAX);
        assert_eq!(image.dimensions(), (MAX_ICON_SIZE, MAX_ICON_SIZE));
        assert_eq!(fallback(MAX_ICON_SIZE + 1).dimensions(), (MAX_ICON_SIZE, MAX_ICON_SIZE));
    }
}
