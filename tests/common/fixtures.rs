//! Test fixtures and data factories

use image::{Rgb, RgbImage};
use pixelpuritan::core::classifier::encode_png;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A small solid-colour PNG
pub fn png_bytes(color: [u8; 3]) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(8, 8, Rgb(color))).unwrap()
}

/// A PNG whose red channel encodes the unsafe score for [`super::PixelClassifier`]
pub fn red_png(red: u8) -> Vec<u8> {
    png_bytes([red, 0, 0])
}

/// A temporary directory populated with image files
pub struct ImageTree {
    pub dir: TempDir,
}

impl ImageTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `bytes` to `relative`, creating parent directories
    pub fn add(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, bytes).unwrap();
        path
    }

    pub fn add_unsafe(&self, relative: &str) -> PathBuf {
        self.add(relative, &red_png(255))
    }

    pub fn add_safe(&self, relative: &str) -> PathBuf {
        self.add(relative, &red_png(0))
    }

    pub fn add_corrupt(&self, relative: &str) -> PathBuf {
        self.add(relative, b"\x89PNG\r\n\x1a\ntruncated")
    }
}

impl Default for ImageTree {
    fn default() -> Self {
        Self::new()
    }
}
