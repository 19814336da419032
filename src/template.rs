//! Template Record
//!
//! Holds the raw source of one template together with what the last
//! execution pass produced from it: the compiled output and the table that
//! maps output lines back to source lines.
//!
//! A record is mutated only by [`PageCompiler::execute`], which takes it by
//! `&mut`, so two passes can never write the same record at once.
//!
//! [`PageCompiler::execute`]: crate::compiler::PageCompiler::execute

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct BaseTemplate {
    /// Where the template came from (file path, route, ...). Informational.
    pub path: String,
    pub(crate) name: String,
    pub(crate) source: String,
    pub(crate) compiled_output: String,
    /// Index = 0-based output line, value = 1-based source line.
    /// `0` marks an output line with no recorded origin.
    pub(crate) line_map: Vec<usize>,
    pub(crate) created_at: DateTime<Utc>,
}

impl BaseTemplate {
    /// Create an anonymous template; the name is a fresh UUID.
    pub fn new(source: impl Into<String>) -> Self {
        Self::build(String::new(), None, source.into())
    }

    /// Create a template with an explicit name.
    pub fn named(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self::build(String::new(), Some(name.into()), source.into())
    }

    /// Create a template from a path plus optional name and source.
    ///
    /// With neither a name nor a source, the path itself is taken as the
    /// source text (inline templates are registered that way). Empty
    /// strings count as absent.
    pub fn from_path(path: impl Into<String>, name: Option<String>, source: Option<String>) -> Self {
        let path = path.into();
        let name = name.filter(|n| !n.is_empty());
        let source = match (&name, source.filter(|s| !s.is_empty())) {
            (_, Some(source)) => source,
            (None, None) => path.clone(),
            (Some(_), None) => String::new(),
        };
        Self::build(path, name, source)
    }

    fn build(path: String, name: Option<String>, source: String) -> Self {
        Self {
            path,
            name: name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            source,
            compiled_output: String::new(),
            line_map: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Replace the source. Output from a previous pass is left untouched
    /// until the next `execute`.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = source.into();
    }

    /// Drop the source text once it is no longer needed.
    pub fn finalize(&mut self) {
        self.source.clear();
    }

    pub fn compiled_output(&self) -> &str {
        &self.compiled_output
    }

    pub fn compiled_bytes(&self) -> &[u8] {
        self.compiled_output.as_bytes()
    }

    pub fn line_map(&self) -> &[usize] {
        &self.line_map
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Translate a 0-based output line back to the 1-based source line it
    /// was generated from, if one was recorded.
    pub fn source_line_for(&self, output_line: usize) -> Option<usize> {
        self.line_map
            .get(output_line)
            .copied()
            .filter(|&line| line > 0)
    }

    /// Serializable view of the record.
    pub fn snapshot(&self) -> TemplateSnapshot {
        TemplateSnapshot {
            name: self.name.clone(),
            source: self.source.clone(),
            compiled_output: self.compiled_output.clone(),
            line_map: self.line_map.clone(),
            created_at: self.created_at.timestamp_millis(),
        }
    }
}

/// Persisted shape of a [`BaseTemplate`], used for inspection and tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSnapshot {
    pub name: String,
    pub source: String,
    pub compiled_output: String,
    pub line_map: Vec<usize>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}
