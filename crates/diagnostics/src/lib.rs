//! Flat diagnostic records shared across the engine.
//!
//! Invariants:
//! - Recoverable conditions (malformed HTML/CSS, component render failures)
//!   are reported as records, never raised as panics or fatal errors.
//! - Records accumulate in order of detection; consumers must not assume any
//!   sort order beyond that.

use serde::Serialize;

/// Severity of a diagnostic record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Error,
    Warn,
    Debug,
}

/// Subsystem that produced the diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Build,
    Css,
    Runtime,
}

/// Source position, 1-based. `0` means "unknown".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    pub fn is_known(&self) -> bool {
        self.line != 0
    }
}

/// One diagnostic record.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub kind: Kind,
    pub header: String,
    pub message_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<Pos>,
}

impl Diagnostic {
    pub fn error(kind: Kind, header: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            kind,
            header: header.into(),
            message_text: message.into(),
            pos: None,
        }
    }

    pub fn warn(kind: Kind, header: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            kind,
            header: header.into(),
            message_text: message.into(),
            pos: None,
        }
    }

    pub fn debug(kind: Kind, header: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Debug,
            kind,
            header: header.into(),
            message_text: message.into(),
            pos: None,
        }
    }

    pub fn at(mut self, pos: Pos) -> Self {
        self.pos = Some(pos);
        self
    }
}

/// Ordered accumulator for diagnostics.
///
/// The engine threads one `Diagnostics` through a whole pipeline run; each
/// stage appends without inspecting earlier entries.
#[derive(Debug, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: Diagnostic) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Diagnostic> {
        self.records
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.level == Level::Error)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Diagnostics, Kind, Level, Pos};

    #[test]
    fn accumulation_preserves_order_and_levels() {
        let mut diags = Diagnostics::new();
        diags.push(Diagnostic::warn(Kind::Css, "css parse", "unexpected token"));
        diags.push(
            Diagnostic::error(Kind::Build, "invalid input", "expected html text").at(Pos::new(3, 7)),
        );
        assert_eq!(diags.len(), 2);
        assert!(diags.has_errors());
        assert_eq!(diags.records()[0].level, Level::Warn);
        assert_eq!(diags.records()[1].pos, Some(Pos::new(3, 7)));
    }

    #[test]
    fn serializes_to_stable_field_names() {
        let record = Diagnostic::error(Kind::Runtime, "hydrate timeout", "2 hosts pending");
        let json = serde_json::to_value(&record).expect("diagnostic serializes");
        assert_eq!(json["level"], "error");
        assert_eq!(json["kind"], "runtime");
        assert_eq!(json["header"], "hydrate timeout");
    }
}
