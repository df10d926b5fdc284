//! Pagination math for the printable worksheet. Pure functions of the
//! sentence count and sheet options; the preview pane and the export
//! pipeline both derive their pages from here so they can never disagree.

use crate::worksheet::{LayoutKind, SheetOptions};

/// Total display lines available on one page, per layout kind. These are
/// print-layout tuning constants, not physical laws; both are overridable
/// in the config file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineBudgets {
    pub grid: usize,
    pub underline: usize,
}

impl Default for LineBudgets {
    fn default() -> Self {
        Self {
            grid: 15,
            underline: 10,
        }
    }
}

impl LineBudgets {
    pub fn for_kind(&self, kind: LayoutKind) -> usize {
        match kind {
            LayoutKind::Grid => self.grid,
            LayoutKind::Underline => self.underline,
        }
    }
}

/// How many sentences fit on one page. Never returns zero: even when the
/// practice-line count eats the whole budget, each page still makes
/// progress with one sentence.
pub fn sentences_per_page(options: &SheetOptions, budgets: &LineBudgets) -> usize {
    let budget = budgets.for_kind(options.kind);
    (budget / options.lines_per_sentence()).max(1)
}

/// Total page count. An empty collection still yields one (empty) page so
/// the preview is never blank.
pub fn total_pages(sentence_count: usize, per_page: usize) -> usize {
    sentence_count.div_ceil(per_page).max(1)
}

/// The slice of sentences shown on `page_number` (1-based), together with
/// its zero-based start index into the full collection. The start index is
/// what keeps ordinal numbering continuous across pages.
pub fn page_slice<'a>(
    sentences: &'a [String],
    page_number: usize,
    per_page: usize,
) -> (usize, &'a [String]) {
    let start = (page_number.saturating_sub(1)) * per_page;
    let start = start.min(sentences.len());
    let end = (start + per_page).min(sentences.len());
    (start, &sentences[start..end])
}

/// Clamp the current page into `1..=total`. Called after every mutation so
/// deleting sentences can never leave the preview pointing past the end.
pub fn clamp_page(current: usize, total: usize) -> usize {
    current.clamp(1, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worksheet::LayoutKind;

    fn opts(kind: LayoutKind, practice: bool, lines: usize) -> SheetOptions {
        SheetOptions {
            kind,
            practice_enabled: practice,
            practice_lines: lines,
        }
    }

    fn sentences(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("문장{i}")).collect()
    }

    #[test]
    fn test_per_page_grid_with_one_practice_line() {
        // budget 15, 2 lines per sentence -> 7
        let o = opts(LayoutKind::Grid, true, 1);
        assert_eq!(sentences_per_page(&o, &LineBudgets::default()), 7);
    }

    #[test]
    fn test_per_page_underline_without_practice() {
        let o = opts(LayoutKind::Underline, false, 5);
        assert_eq!(sentences_per_page(&o, &LineBudgets::default()), 10);
    }

    #[test]
    fn test_per_page_never_zero() {
        // 99 practice lines would starve the page without the floor
        let o = opts(LayoutKind::Grid, true, 99);
        assert_eq!(sentences_per_page(&o, &LineBudgets::default()), 1);
        let o = opts(LayoutKind::Underline, true, 99);
        assert_eq!(sentences_per_page(&o, &LineBudgets::default()), 1);
    }

    #[test]
    fn test_total_pages_empty_is_one() {
        assert_eq!(total_pages(0, 7), 1);
    }

    #[test]
    fn test_total_pages_23_by_7() {
        assert_eq!(total_pages(23, 7), 4);
    }

    #[test]
    fn test_page_slice_last_page_partial() {
        let all = sentences(23);
        let (start, slice) = page_slice(&all, 4, 7);
        assert_eq!(start, 21);
        assert_eq!(slice.len(), 2);
        // ordinals 22 and 23
        assert_eq!(start + 1, 22);
        assert_eq!(start + slice.len(), 23);
    }

    #[test]
    fn test_page_slice_out_of_range_is_empty() {
        let all = sentences(3);
        let (start, slice) = page_slice(&all, 9, 7);
        assert_eq!(start, 3);
        assert!(slice.is_empty());
    }

    #[test]
    fn test_slices_reassemble_store() {
        let all = sentences(23);
        let per_page = 7;
        let total = total_pages(all.len(), per_page);
        let mut rebuilt: Vec<String> = Vec::new();
        for page in 1..=total {
            let (_, slice) = page_slice(&all, page, per_page);
            rebuilt.extend_from_slice(slice);
        }
        assert_eq!(rebuilt, all);
    }

    #[test]
    fn test_slice_sum_matches_count_across_configs() {
        let budgets = LineBudgets::default();
        for count in [0usize, 1, 6, 7, 8, 23, 150] {
            let all = sentences(count);
            for kind in [LayoutKind::Grid, LayoutKind::Underline] {
                for lines in 0..6 {
                    let o = opts(kind, true, lines);
                    let per_page = sentences_per_page(&o, &budgets);
                    let total = total_pages(count, per_page);
                    let sum: usize = (1..=total)
                        .map(|p| page_slice(&all, p, per_page).1.len())
                        .sum();
                    assert_eq!(sum, count, "count={count} kind={kind:?} lines={lines}");
                }
            }
        }
    }

    #[test]
    fn test_three_sentences_fit_one_grid_page() {
        // 3 sentences, practice on, 1 line, grid
        let all = vec![
            "학교".to_string(),
            "도서관".to_string(),
            "놀이터".to_string(),
        ];
        let o = opts(LayoutKind::Grid, true, 1);
        let per_page = sentences_per_page(&o, &LineBudgets::default());
        assert_eq!(per_page, 7);
        assert_eq!(total_pages(all.len(), per_page), 1);
        let (start, slice) = page_slice(&all, 1, per_page);
        assert_eq!(start, 0);
        assert_eq!(slice.len(), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(4, 4), 4);
        assert_eq!(clamp_page(5, 4), 4);
        assert_eq!(clamp_page(0, 4), 1);
        assert_eq!(clamp_page(3, 1), 1);
    }
}
