//! Template fields and how raw input becomes placeholder text.

use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::placeholder::{PlaceholderMap, TokenStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    /// ISO `YYYY-MM-DD` input, rendered `DD-MM-YYYY`. Defaults to the
    /// document date when absent.
    Date,
    /// Whole percentage 0–100, rendered `<n>%`.
    Percent,
    /// Non-negative amount, rendered with two decimals.
    Money,
    /// Sum of the named money fields, rendered with two decimals.
    Total { of: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Overrides the template's token style for this field only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_style: Option<TokenStyle>,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            token_style: None,
            required: false,
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn tight(mut self) -> Self {
        self.token_style = Some(TokenStyle::Tight);
        self
    }
}

pub fn format_date(date: Date) -> String {
    format!("{:02}-{:02}-{:04}", date.day(), date.month(), date.year())
}

fn invalid(field: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

fn parse_money(field: &str, raw: &str) -> Result<f64, CoreError> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(field, format!("{raw:?} is not a number")))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(invalid(field, "amount must be a non-negative number"));
    }
    Ok(amount)
}

/// Render one field's raw input. `None` means the user left it blank.
pub fn render_field(
    spec: &FieldSpec,
    raw: Option<&str>,
    values: &BTreeMap<String, String>,
    document_date: Date,
) -> Result<String, CoreError> {
    let name = spec.name.as_str();
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());

    if spec.required && raw.is_none() && !matches!(spec.kind, FieldKind::Total { .. }) {
        return Err(invalid(name, "value is required"));
    }

    match &spec.kind {
        FieldKind::Text => Ok(raw.unwrap_or_default().to_string()),
        FieldKind::Date => match raw {
            Some(s) => {
                let date: Date = s
                    .parse()
                    .map_err(|e| invalid(name, format!("expected YYYY-MM-DD: {e}")))?;
                Ok(format_date(date))
            }
            None => Ok(format_date(document_date)),
        },
        FieldKind::Percent => {
            let pct: u8 = match raw {
                Some(s) => s
                    .parse()
                    .map_err(|_| invalid(name, format!("{s:?} is not a whole number")))?,
                None => 0,
            };
            if pct > 100 {
                return Err(invalid(name, "percentage must be between 0 and 100"));
            }
            Ok(format!("{pct}%"))
        }
        FieldKind::Money => {
            let amount = match raw {
                Some(s) => parse_money(name, s)?,
                None => 0.0,
            };
            Ok(format!("{amount:.2}"))
        }
        FieldKind::Total { of } => {
            let mut total = 0.0;
            for part in of {
                if let Some(s) = values.get(part).map(|s| s.trim()).filter(|s| !s.is_empty()) {
                    total += parse_money(part, s)?;
                }
            }
            Ok(format!("{total:.2}"))
        }
    }
}

/// Build the placeholder map for a template from raw user input.
///
/// Every declared field gets a token (blank fields render as their empty
/// form so no `<<...>>` markers survive in the output). Input naming a field
/// the template does not declare is rejected.
pub fn build_placeholder_map(
    fields: &[FieldSpec],
    token_style: TokenStyle,
    values: &BTreeMap<String, String>,
    document_date: Date,
) -> Result<PlaceholderMap, CoreError> {
    if let Some(unknown) = values
        .keys()
        .find(|k| !fields.iter().any(|f| &f.name == *k))
    {
        return Err(invalid(unknown, "template has no such field"));
    }

    let mut map = PlaceholderMap::new();
    for spec in fields {
        let rendered = render_field(
            spec,
            values.get(&spec.name).map(String::as_str),
            values,
            document_date,
        )?;
        let token = spec.token_style.unwrap_or(token_style).token(&spec.name)?;
        map.insert(token, rendered);
    }
    Ok(map)
}
