use std::collections::HashMap;

use serde_json::Value;

use paperwork_core::model::RunFormat;

/// Style id a paragraph falls back to when it names none.
pub const DEFAULT_PARAGRAPH_STYLE: &str = "Normal";

/// Font settings declared by a template's style sheet.
///
/// Built from the template's `styles.xml` so that paragraphs can report the
/// font their style resolves to (style chain first, then document defaults).
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    styles: HashMap<String, StyleEntry>,
    defaults: RunFormat,
}

#[derive(Debug, Clone, Default)]
struct StyleEntry {
    based_on: Option<String>,
    font: RunFormat,
}

impl StyleSheet {
    pub fn from_docx(docx: &docx_rs::Docx) -> Self {
        match serde_json::to_value(&docx.styles) {
            Ok(value) => Self::from_json(&value),
            Err(e) => {
                tracing::warn!(error = %e, "could not inspect template styles, using defaults");
                Self::default()
            }
        }
    }

    /// Build from the JSON form of `docx_rs::Styles`.
    pub fn from_json(value: &Value) -> Self {
        let defaults = value
            .get("docDefaults")
            .and_then(|d| d.get("runPropertyDefault"))
            .and_then(|d| d.get("runProperty"))
            .map(run_format)
            .unwrap_or_default();

        let styles = value
            .get("styles")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|style| {
                let id = style.get("styleId")?.as_str()?.to_string();
                let entry = StyleEntry {
                    based_on: style.get("basedOn").and_then(string_val),
                    font: style.get("runProperty").map(run_format).unwrap_or_default(),
                };
                Some((id, entry))
            })
            .collect();

        Self { styles, defaults }
    }

    /// Resolve the font of paragraph style `id`, walking `basedOn` links and
    /// filling gaps from the document defaults.
    pub fn resolve(&self, id: Option<&str>) -> RunFormat {
        let mut resolved = RunFormat::default();
        let mut next = Some(id.unwrap_or(DEFAULT_PARAGRAPH_STYLE));
        let mut depth = 0;

        while let Some(style_id) = next {
            let Some(entry) = self.styles.get(style_id) else { break };
            merge_missing(&mut resolved, &entry.font);
            next = entry.based_on.as_deref();
            depth += 1;
            if depth > 16 {
                break;
            }
        }

        merge_missing(&mut resolved, &self.defaults);
        resolved
    }
}

fn merge_missing(target: &mut RunFormat, source: &RunFormat) {
    if target.font_name.is_none() {
        target.font_name = source.font_name.clone();
    }
    if target.font_size.is_none() {
        target.font_size = source.font_size;
    }
}

/// Read font name, size and emphasis from a serialized `RunProperty`.
pub(crate) fn run_format(value: &Value) -> RunFormat {
    let fonts = value.get("fonts");
    let font_name = ["ascii", "hiAnsi", "eastAsia", "cs"]
        .iter()
        .find_map(|key| fonts?.get(*key)?.as_str().map(str::to_string));

    RunFormat {
        font_name,
        font_size: value.get("sz").and_then(number_val).map(|n| n as usize),
        bold: value.get("bold").and_then(bool_val).unwrap_or(false),
        italic: value.get("italic").and_then(bool_val).unwrap_or(false),
        underline: value
            .get("underline")
            .and_then(string_val)
            .is_some_and(|u| u != "none"),
    }
}

// docx-rs serializes single-attribute elements either as the bare value or as
// `{ "val": ... }` depending on the element; accept both.

pub(crate) fn string_val(value: &Value) -> Option<String> {
    value
        .as_str()
        .or_else(|| value.get("val")?.as_str())
        .map(str::to_string)
}

fn number_val(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| value.get("val")?.as_u64())
}

fn bool_val(value: &Value) -> Option<bool> {
    value.as_bool().or_else(|| value.get("val")?.as_bool())
}
