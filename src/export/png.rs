//! One PNG per page, numbered with a 1-based suffix.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::export::{ExportError, PNG_FILE_STEM};

pub fn write_pngs(pages: &[RgbImage], out_dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
    let mut files = Vec::with_capacity(pages.len());
    for (index, bitmap) in pages.iter().enumerate() {
        let path = out_dir.join(format!("{}_{}.png", PNG_FILE_STEM, index + 1));
        bitmap.save(&path)?;
        files.push(path);
    }
    Ok(files)
}
