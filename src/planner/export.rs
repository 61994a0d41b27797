//! Map image export.
//!
//! An export is requested now and performed after the next frame has been
//! rendered: the UI registers the target path with [`ExportHook::request`],
//! asks the viewport for a screenshot, and consumes the registration with
//! [`ExportHook::take`] when the screenshot arrives.

use anyhow::{Context, Result};
use image::ImageEncoder;
use image::RgbaImage;
use image::codecs::png::PngEncoder;
use std::fs;
use std::path::{Path, PathBuf};

/// One-shot "after next render" export registration.
#[derive(Debug, Default)]
pub struct ExportHook {
    pending: Option<PathBuf>,
}

impl ExportHook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an export to `path`.
    ///
    /// # Returns
    ///
    /// `false` if an export is already pending; the earlier one is kept.
    pub fn request(&mut self, path: PathBuf) -> bool {
        if let Some(existing) = &self.pending {
            log::warn!("Export to {} already pending, ignoring {}", existing.display(), path.display());
            return false;
        }
        log::debug!("Export to {} registered", path.display());
        self.pending = Some(path);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the registration. Returns `None` on every call after the first.
    pub fn take(&mut self) -> Option<PathBuf> {
        self.pending.take()
    }
}

/// Default file name for an export started now.
pub fn default_export_file_name() -> String {
    format!("map_export_{}.png", chrono::Local::now().format("%Y%m%d_%H%M%S"))
}

/// Wrap raw RGBA8 pixels, row-major without padding.
pub fn rgba_image(width: u32, height: u32, pixels: Vec<u8>) -> Result<RgbaImage> {
    RgbaImage::from_raw(width, height, pixels).with_context(|| format!("Pixel buffer does not match a {}x{} RGBA image", width, height))
}

/// Encode `image` as PNG and write it to `path`.
///
/// The PNG is encoded in memory and written next to the target before being
/// renamed into place. On failure the staging file is removed, so neither a
/// truncated target nor a stray `.part` file is left behind.
pub fn write_png(path: &Path, image: &RgbaImage) -> Result<()> {
    let mut encoded = Vec::new();
    PngEncoder::new(&mut encoded)
        .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgba8)
        .context("Failed to encode PNG")?;

    let staging = path.with_extension("png.part");
    let written = fs::write(&staging, &encoded)
        .with_context(|| format!("Failed to write {}", staging.display()))
        .and_then(|()| fs::rename(&staging, path).with_context(|| format!("Failed to move export into place at {}", path.display())));
    if let Err(e) = written {
        fs::remove_file(&staging).ok();
        return Err(e);
    }

    log::info!("Exported {}x{} map image to {}", image.width(), image.height(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("beacon-planner-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn hook_is_one_shot() {
        let mut hook = ExportHook::new();
        assert!(!hook.is_pending());
        assert!(hook.request(PathBuf::from("a.png")));
        assert!(!hook.request(PathBuf::from("b.png")));
        assert!(hook.is_pending());
        assert_eq!(hook.take(), Some(PathBuf::from("a.png")));
        assert_eq!(hook.take(), None);
        assert!(hook.request(PathBuf::from("c.png")));
    }

    #[test]
    fn default_name_is_timestamped_png() {
        let name = default_export_file_name();
        assert!(name.starts_with("map_export_"));
        assert!(name.ends_with(".png"));
        // map_export_ + YYYYMMDD_HHMMSS + .png
        assert_eq!(name.len(), "map_export_".len() + 15 + ".png".len());
    }

    #[test]
    fn pixel_buffer_size_is_checked() {
        assert!(rgba_image(2, 2, vec![0; 16]).is_ok());
        assert!(rgba_image(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn writes_decodable_png_without_leftovers() {
        let dir = scratch_dir("png");
        let path = dir.join("map_export.png");
        let mut pixels = vec![0u8; 3 * 2 * 4];
        pixels[0..4].copy_from_slice(&[255, 0, 0, 255]);
        let image = rgba_image(3, 2, pixels).unwrap();

        write_png(&path, &image).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert!(!path.with_extension("png.part").exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn unwritable_target_reports_error() {
        let dir = scratch_dir("missing");
        let path = dir.join("no-such-dir").join("map.png");
        let image = rgba_image(1, 1, vec![0; 4]).unwrap();
        assert!(write_png(&path, &image).is_err());
        assert!(!path.exists());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn failed_rename_removes_staging_file() {
        let dir = scratch_dir("occupied");
        let path = dir.join("map.png");
        // A directory in the way makes the final rename fail after staging.
        fs::create_dir_all(path.join("inner")).unwrap();
        let image = rgba_image(1, 1, vec![0; 4]).unwrap();

        assert!(write_png(&path, &image).is_err());
        assert!(!path.with_extension("png.part").exists());
        assert!(path.is_dir());
        fs::remove_dir_all(&dir).ok();
    }
}
