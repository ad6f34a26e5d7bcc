//! Placeholder tokens and the token → value map.
//!
//! Tokens are delimited by double angle brackets. Each template family uses a
//! fixed spelling, either tight (`<<Client Name>>`) or spaced
//! (`<< Client Name >>`); the engine matches the literal token and never
//! tries to normalise one into the other.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const OPEN: &str = "<<";
pub const CLOSE: &str = ">>";

/// Lexical convention used to spell a field name as a token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenStyle {
    /// `<<Name>>`
    #[default]
    Tight,
    /// `<< Name >>`
    Spaced,
}

impl TokenStyle {
    pub fn token(self, name: &str) -> Result<Placeholder, CoreError> {
        let raw = match self {
            TokenStyle::Tight => format!("{OPEN}{name}{CLOSE}"),
            TokenStyle::Spaced => format!("{OPEN} {name} {CLOSE}"),
        };
        Placeholder::new(raw)
    }
}

/// A validated placeholder token, stored exactly as it appears in templates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Placeholder(String);

impl Placeholder {
    pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
        let raw = raw.into();
        let Some(inner) = raw
            .strip_prefix(OPEN)
            .and_then(|rest| rest.strip_suffix(CLOSE))
        else {
            return Err(CoreError::InvalidPlaceholder(format!(
                "'{raw}' must be wrapped in {OPEN} and {CLOSE}"
            )));
        };
        if inner.trim().is_empty() {
            return Err(CoreError::InvalidPlaceholder(format!("'{raw}' has no name")));
        }
        if inner.contains(['\n', '\r']) || inner.contains(OPEN) || inner.contains(CLOSE) {
            return Err(CoreError::InvalidPlaceholder(format!(
                "'{raw}' contains a line break or nested delimiter"
            )));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Field name between the delimiters, without surrounding spaces.
    pub fn name(&self) -> &str {
        self.0[OPEN.len()..self.0.len() - CLOSE.len()].trim()
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Placeholder {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Placeholder::new(value)
    }
}

impl From<Placeholder> for String {
    fn from(value: Placeholder) -> Self {
        value.0
    }
}

/// Ordered map from placeholder token to replacement text.
///
/// Insertion order is kept for display and logging; matching does not depend
/// on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderMap {
    entries: Vec<(Placeholder, String)>,
}

impl PlaceholderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`. Replacing keeps the original
    /// position.
    pub fn insert(&mut self, key: Placeholder, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Validate `raw` as a token and insert it.
    pub fn insert_raw(
        &mut self,
        raw: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<&mut Self, CoreError> {
        let key = Placeholder::new(raw)?;
        Ok(self.insert(key, value))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Placeholder, &str)> {
        self.entries.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Replace every token found in `text` in a single left-to-right pass.
    ///
    /// At each `<<` the longest key that matches wins, so `<<Text12>>` is
    /// never consumed as `<<Text1>>` followed by `2>>`. Inserted values are
    /// not rescanned. Returns `None` when nothing matched.
    pub fn replace_in(&self, text: &str) -> Option<String> {
        if self.entries.is_empty() || !text.contains(OPEN) {
            return None;
        }

        let mut keys: Vec<&(Placeholder, String)> = self.entries.iter().collect();
        keys.sort_by(|a, b| b.0.as_str().len().cmp(&a.0.as_str().len()));

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut matched = false;

        while let Some(pos) = rest.find(OPEN) {
            out.push_str(&rest[..pos]);
            let candidate = &rest[pos..];
            match keys.iter().find(|(k, _)| candidate.starts_with(k.as_str())) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &candidate[key.as_str().len()..];
                    matched = true;
                }
                None => {
                    // Step past one '<' so "<<<Name>>" can still match at the next position.
                    out.push('<');
                    rest = &candidate[1..];
                }
            }
        }
        out.push_str(rest);

        matched.then_some(out)
    }
}

impl<'a> IntoIterator for &'a PlaceholderMap {
    type Item = (&'a Placeholder, &'a str);
    type IntoIter = Box<dyn Iterator<Item = (&'a Placeholder, &'a str)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
