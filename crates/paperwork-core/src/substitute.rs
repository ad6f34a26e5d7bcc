//! Placeholder substitution over a [`Document`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{Document, Paragraph};
use crate::placeholder::PlaceholderMap;

/// How tokens are matched against a paragraph's runs.
///
/// The two strategies trade formatting fidelity against robustness to
/// tokens that Word has split across several runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Replace tokens that sit wholly inside one run. Touched runs take the
    /// paragraph style's font; every other run keeps its formatting. A token
    /// split across runs is left as is.
    #[default]
    RunLocal,
    /// Match against the paragraph's joined text. On a match the whole result
    /// is written into the first run and the remaining runs are emptied, so
    /// the paragraph collapses to the first run's formatting.
    ParagraphJoined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub paragraphs_visited: usize,
    pub paragraphs_changed: usize,
}

/// Substitute every placeholder in `map` across the document body and all
/// table cells.
pub fn substitute<'a>(
    document: &'a mut Document,
    map: &PlaceholderMap,
    strategy: Strategy,
) -> &'a mut Document {
    substitute_with_report(document, map, strategy);
    document
}

pub fn substitute_with_report(
    document: &mut Document,
    map: &PlaceholderMap,
    strategy: Strategy,
) -> SubstitutionReport {
    let mut report = SubstitutionReport::default();

    for paragraph in document.paragraphs_mut() {
        apply(paragraph, map, strategy, &mut report);
    }

    for table in document.tables_mut() {
        for cell in table.cells_mut() {
            for paragraph in &mut cell.paragraphs {
                apply(paragraph, map, strategy, &mut report);
            }
        }
    }

    debug!(
        ?strategy,
        placeholders = map.len(),
        visited = report.paragraphs_visited,
        changed = report.paragraphs_changed,
        "substitution complete"
    );
    report
}

fn apply(
    paragraph: &mut Paragraph,
    map: &PlaceholderMap,
    strategy: Strategy,
    report: &mut SubstitutionReport,
) {
    report.paragraphs_visited += 1;
    let changed = match strategy {
        Strategy::RunLocal => replace_run_local(paragraph, map),
        Strategy::ParagraphJoined => replace_joined(paragraph, map),
    };
    if changed {
        report.paragraphs_changed += 1;
    }
}

fn replace_run_local(paragraph: &mut Paragraph, map: &PlaceholderMap) -> bool {
    let style_font = &paragraph.style.font;
    let mut changed = false;

    for run in &mut paragraph.runs {
        if let Some(replaced) = map.replace_in(&run.text) {
            run.text = replaced;
            run.format.font_name = style_font.font_name.clone();
            run.format.font_size = style_font.font_size;
            changed = true;
        }
    }

    changed
}

fn replace_joined(paragraph: &mut Paragraph, map: &PlaceholderMap) -> bool {
    // No runs means no text to match and no first run to write into.
    if paragraph.runs.is_empty() {
        return false;
    }

    let Some(replaced) = map.replace_in(&paragraph.text()) else {
        return false;
    };

    for run in &mut paragraph.runs {
        run.text.clear();
    }
    paragraph.runs[0].text = replaced;
    true
}
