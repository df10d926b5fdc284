//! Korean-capable font discovery for the raster backend. An explicit path
//! from the config file wins; otherwise common system install locations are
//! probed in order.

use std::fs;
use std::path::{Path, PathBuf};

use ab_glyph::FontVec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("font file not readable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("not a usable font file: {0}")]
    Invalid(PathBuf),
    #[error(
        "no Korean-capable font found; install Noto Sans CJK or NanumGothic, \
         or set font_path in the config file"
    )]
    NotFound,
}

/// Well-known locations for CJK-capable fonts, probed in order.
const CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/nanum/NanumGothic.ttf",
    "/usr/share/fonts/truetype/nanum/NanumGothicBold.ttf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-sans-cjk-fonts/NotoSansCJK-Regular.ttc",
    "/System/Library/Fonts/AppleSDGothicNeo.ttc",
    "C:\\Windows\\Fonts\\malgun.ttf",
];

pub fn load_font(override_path: Option<&Path>) -> Result<FontVec, FontError> {
    if let Some(path) = override_path {
        let bytes = fs::read(path).map_err(|source| FontError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        return parse_font(bytes, path);
    }

    for candidate in CANDIDATES {
        let path = Path::new(candidate);
        if let Ok(bytes) = fs::read(path)
            && let Ok(font) = parse_font(bytes, path)
        {
            return Ok(font);
        }
    }

    Err(FontError::NotFound)
}

fn parse_font(bytes: Vec<u8>, path: &Path) -> Result<FontVec, FontError> {
    // Index 0 covers both plain TTF/OTF and the first face of a collection.
    FontVec::try_from_vec_and_index(bytes, 0).map_err(|_| FontError::Invalid(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_override_path_is_unreadable_error() {
        let err = load_font(Some(Path::new("/nonexistent/font.ttf"))).unwrap_err();
        assert!(matches!(err, FontError::Unreadable { .. }));
    }

    #[test]
    fn test_garbage_file_is_invalid_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not a font").unwrap();
        let err = load_font(Some(file.path())).unwrap_err();
        assert!(matches!(err, FontError::Invalid(_)));
    }
}
