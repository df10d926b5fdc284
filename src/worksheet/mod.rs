pub mod layout;

use icu_normalizer::ComposingNormalizer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a dictation sentence in display units. One Korean
/// syllable block, Latin letter, space, or punctuation mark counts as one
/// unit — the same budget as the 11 cells of a grid row.
pub const MAX_UNITS: usize = 11;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SheetError {
    #[error("문장 \"{text}\"이(가) {MAX_UNITS}자를 초과합니다 ({units}자)")]
    TooLong { text: String, units: usize },
    #[error("sentence index {0} out of range")]
    BadIndex(usize),
}

/// Count display units. Input is NFC-normalized first so that decomposed
/// jamo sequences (e.g. pasted from macOS filenames) count as one syllable
/// block, matching what ends up in a grid cell.
pub fn display_units(text: &str) -> usize {
    let nfc = ComposingNormalizer::new_nfc();
    nfc.normalize(text).chars().count()
}

fn check_length(text: &str) -> Result<(), SheetError> {
    let units = display_units(text);
    if units > MAX_UNITS {
        return Err(SheetError::TooLong {
            text: text.to_string(),
            units,
        });
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// One boxed cell per display unit, 11 cells per row.
    Grid,
    /// Sentence written along a single ruled line.
    Underline,
}

impl LayoutKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "grid" => Some(LayoutKind::Grid),
            "underline" => Some(LayoutKind::Underline),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LayoutKind::Grid => LayoutKind::Underline,
            LayoutKind::Underline => LayoutKind::Grid,
        }
    }
}

/// Worksheet presentation options. Immutable during a render pass; changed
/// only through explicit user actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SheetOptions {
    pub kind: LayoutKind,
    pub practice_enabled: bool,
    pub practice_lines: usize,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            kind: LayoutKind::Grid,
            practice_enabled: true,
            practice_lines: 1,
        }
    }
}

impl SheetOptions {
    /// Display lines one sentence occupies on the page.
    pub fn lines_per_sentence(&self) -> usize {
        1 + if self.practice_enabled {
            self.practice_lines
        } else {
            0
        }
    }
}

/// The ordered sentence collection plus its presentation options. All
/// mutations go through these methods so the 11-unit limit is enforced at
/// every entry point.
#[derive(Clone, Debug, Default)]
pub struct Worksheet {
    sentences: Vec<String>,
    pub options: SheetOptions,
}

impl Worksheet {
    pub fn new(options: SheetOptions) -> Self {
        Self {
            sentences: Vec::new(),
            options,
        }
    }

    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Append one sentence. Leading/trailing whitespace is trimmed; an
    /// empty result is silently ignored.
    pub fn add(&mut self, text: &str) -> Result<(), SheetError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        check_length(text)?;
        self.sentences.push(text.to_string());
        Ok(())
    }

    /// Append every non-empty line of a block of text. If any line is over
    /// the limit, nothing is added (all-or-nothing, so a failed paste does
    /// not leave a half-applied batch).
    pub fn add_lines(&mut self, block: &str) -> Result<usize, SheetError> {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        for line in &lines {
            check_length(line)?;
        }
        let added = lines.len();
        self.sentences.extend(lines.iter().map(|l| l.to_string()));
        Ok(added)
    }

    pub fn edit(&mut self, index: usize, text: &str) -> Result<(), SheetError> {
        if index >= self.sentences.len() {
            return Err(SheetError::BadIndex(index));
        }
        check_length(text)?;
        self.sentences[index] = text.to_string();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<String, SheetError> {
        if index >= self.sentences.len() {
            return Err(SheetError::BadIndex(index));
        }
        Ok(self.sentences.remove(index))
    }

    /// Replace the whole collection (AI generation result). Inputs are
    /// assumed pre-filtered by the gateway; re-validate anyway so a buggy
    /// caller cannot smuggle over-length text past the invariant.
    pub fn replace_all(&mut self, sentences: Vec<String>) -> Result<(), SheetError> {
        for s in &sentences {
            check_length(s)?;
        }
        self.sentences = sentences;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.sentences.clear();
    }

    /// Sentence padded with blanks to exactly MAX_UNITS cells for grid
    /// rendering. Returns one char per cell.
    pub fn grid_cells(sentence: &str) -> Vec<char> {
        let nfc = ComposingNormalizer::new_nfc();
        let mut cells: Vec<char> = nfc.normalize(sentence).chars().collect();
        cells.truncate(MAX_UNITS);
        while cells.len() < MAX_UNITS {
            cells.push(' ');
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_units_korean() {
        assert_eq!(display_units("학교"), 2);
        assert_eq!(display_units("나는 학교에 가요"), 9);
    }

    #[test]
    fn test_display_units_nfc_composes_jamo() {
        // "한" written as decomposed jamo (U+1112 U+1161 U+11AB)
        let decomposed = "\u{1112}\u{1161}\u{11ab}";
        assert_eq!(display_units(decomposed), 1);
    }

    #[test]
    fn test_add_rejects_over_length() {
        let mut ws = Worksheet::default();
        let twelve = "가나다라마바사아자차카타";
        assert_eq!(display_units(twelve), 12);
        let err = ws.add(twelve).unwrap_err();
        assert!(matches!(err, SheetError::TooLong { units: 12, .. }));
        assert!(ws.is_empty(), "rejected input must not mutate the store");
    }

    #[test]
    fn test_add_trims_and_skips_empty() {
        let mut ws = Worksheet::default();
        ws.add("  학교  ").unwrap();
        ws.add("   ").unwrap();
        assert_eq!(ws.sentences(), &["학교".to_string()]);
    }

    #[test]
    fn test_add_lines_all_or_nothing() {
        let mut ws = Worksheet::default();
        ws.add("첫 문장").unwrap();
        let block = "도서관\n가나다라마바사아자차카타\n놀이터";
        assert!(ws.add_lines(block).is_err());
        assert_eq!(ws.len(), 1, "failed batch must add nothing");
    }

    #[test]
    fn test_add_lines_counts_added() {
        let mut ws = Worksheet::default();
        let added = ws.add_lines("학교\n\n도서관\n").unwrap();
        assert_eq!(added, 2);
        assert_eq!(ws.len(), 2);
    }

    #[test]
    fn test_edit_validates_and_rejects() {
        let mut ws = Worksheet::default();
        ws.add("학교").unwrap();
        assert!(ws.edit(0, "도서관").is_ok());
        assert!(ws.edit(0, "가나다라마바사아자차카타").is_err());
        assert_eq!(ws.sentences()[0], "도서관");
        assert!(matches!(ws.edit(5, "x"), Err(SheetError::BadIndex(5))));
    }

    #[test]
    fn test_grid_cells_pads_to_eleven() {
        let cells = Worksheet::grid_cells("학교");
        assert_eq!(cells.len(), MAX_UNITS);
        assert_eq!(cells[0], '학');
        assert_eq!(cells[1], '교');
        assert!(cells[2..].iter().all(|&c| c == ' '));
    }

    #[test]
    fn test_lines_per_sentence() {
        let mut opts = SheetOptions::default();
        assert_eq!(opts.lines_per_sentence(), 2);
        opts.practice_enabled = false;
        assert_eq!(opts.lines_per_sentence(), 1);
        opts.practice_enabled = true;
        opts.practice_lines = 3;
        assert_eq!(opts.lines_per_sentence(), 4);
    }
}
