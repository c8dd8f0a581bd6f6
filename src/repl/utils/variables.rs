//! File-scoped variables for `.http` sources.
//!
//! `@name=value` lines populate the table; `{{name}}` placeholders are
//! replaced eagerly, one line at a time, against whatever has been defined so
//! far in the file.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Variable names that are routed onto the next request instead of the table
pub const PRESCRIPT: &str = "prescript";
pub const POSTSCRIPT: &str = "postscript";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{([A-Za-z0-9_-]+)\}\}").expect("placeholder pattern is valid")
    })
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+$").expect("variable name pattern is valid")
    })
}

/// A placeholder referenced a variable that has not been defined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariable(pub String);

/// A parsed `@name=value` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

impl Assignment {
    /// Parse an assignment line. The value is everything after the first `=`,
    /// with trailing whitespace removed.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.strip_prefix('@')?;
        let (name, value) = rest.split_once('=')?;
        let name = name.trim();
        if !name_pattern().is_match(name) {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            value: value.trim_end().to_string(),
        })
    }

    pub fn is_prescript(&self) -> bool {
        self.name == PRESCRIPT
    }

    pub fn is_postscript(&self) -> bool {
        self.name == POSTSCRIPT
    }
}

#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    values: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every `{{name}}` in `line`. The first unresolved name is
    /// reported; nothing falls back to an empty string.
    pub fn substitute(&self, line: &str) -> Result<String, MissingVariable> {
        let pattern = placeholder_pattern();
        if !pattern.is_match(line) {
            return Ok(line.to_string());
        }

        let mut result = String::with_capacity(line.len());
        let mut last = 0;
        for captures in pattern.captures_iter(line) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = self
                .get(name.as_str())
                .ok_or_else(|| MissingVariable(name.as_str().to_string()))?;
            result.push_str(&line[last..whole.start()]);
            result.push_str(value);
            last = whole.end();
        }
        result.push_str(&line[last..]);

        Ok(result)
    }
}
