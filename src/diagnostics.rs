//! Diagnostics sink data model (§10.2, §7).
//!
//! The core never formats a diagnostic to a stream itself — that sink is
//! out of scope (§1, §6) — but it must produce a structured, renderable
//! value for every condition in §7's four error bands, in source order.

use crate::token::{Token, TokenSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A single source position, 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// The closed set of diagnostic kinds from §7, one band per doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    // --- Lexical (§7.2) ---
    DisabledCodeSection,
    InvalidInputChar(char),
    EofInBlockComment,
    NewlineInStringLiteral,
    EofInStringLiteral,
    InvalidEscapeSequence,
    EofInPragma,
    MissingStringDelimiter,
    MissingSuffix(char),
    MissingExponent,

    // --- Syntactic (§7.3) ---
    UnexpectedToken {
        found: Token,
        lexeme: Option<String>,
        expected_one: Option<Token>,
        expected_set: Option<TokenSet>,
    },
    DuplicateIdentInIdentList(String),
    TrailingSemicolon(TrailingSemicolonContext),
    EmptyFieldListSequence,
    EmptyStatementSequence,

    // --- Semantic (§7.4) ---
    DuplicateIdentInScope(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSemicolonContext {
    FieldListSequence,
    FormalParameterList,
    StatementSequence,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            DiagnosticKind::DisabledCodeSection => Severity::Warning,
            DiagnosticKind::TrailingSemicolon(_) => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub position: Position,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(
            f,
            "{}:{}: {}: {}",
            self.position.line,
            self.position.column,
            tag,
            describe(&self.kind)
        )
    }
}

fn describe(kind: &DiagnosticKind) -> String {
    match kind {
        DiagnosticKind::DisabledCodeSection => "disabled code section".to_string(),
        DiagnosticKind::InvalidInputChar(c) => format!("invalid input character {:?}", c),
        DiagnosticKind::EofInBlockComment => "end of file in block comment".to_string(),
        DiagnosticKind::NewlineInStringLiteral => "newline in string literal".to_string(),
        DiagnosticKind::EofInStringLiteral => "end of file in string literal".to_string(),
        DiagnosticKind::InvalidEscapeSequence => "invalid escape sequence".to_string(),
        DiagnosticKind::EofInPragma => "end of file in pragma".to_string(),
        DiagnosticKind::MissingStringDelimiter => "missing string delimiter".to_string(),
        DiagnosticKind::MissingSuffix(c) => format!("missing '{}' suffix", c),
        DiagnosticKind::MissingExponent => "missing exponent digits".to_string(),
        DiagnosticKind::UnexpectedToken {
            found,
            lexeme,
            expected_one,
            expected_set,
        } => {
            let found_desc = match lexeme {
                Some(l) => format!("{} {:?}", found.name(), l),
                None => found.name().to_string(),
            };
            let expected_desc = if let Some(one) = expected_one {
                format!("expected {}", one.name())
            } else if let Some(set) = expected_set {
                format!("expected {}", set.pretty_list())
            } else {
                "unexpected token".to_string()
            };
            format!("unexpected {}, {}", found_desc, expected_desc)
        }
        DiagnosticKind::DuplicateIdentInIdentList(id) => {
            format!("duplicate identifier '{}' in identifier list", id)
        }
        DiagnosticKind::TrailingSemicolon(ctx) => {
            let where_ = match ctx {
                TrailingSemicolonContext::FieldListSequence => "field list sequence",
                TrailingSemicolonContext::FormalParameterList => "formal parameter list",
                TrailingSemicolonContext::StatementSequence => "statement sequence",
            };
            format!("trailing semicolon after {}", where_)
        }
        DiagnosticKind::EmptyFieldListSequence => "empty field list sequence".to_string(),
        DiagnosticKind::EmptyStatementSequence => "empty statement sequence".to_string(),
        DiagnosticKind::DuplicateIdentInScope(id) => {
            format!("identifier '{}' already declared in this scope", id)
        }
    }
}

/// Accumulates diagnostics in source order and the running counters used
/// by `ParseStats` (§4.G).
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    warning_count: u32,
    error_count: u32,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: DiagnosticKind, position: Position) {
        let severity = kind.default_severity();
        self.push_with_severity(kind, severity, position);
    }

    /// Like [`Self::push`] but with an explicit severity, for diagnostics
    /// whose band depends on a dialect option (the `errant-semicolon`
    /// policy, §4.G) rather than being fixed by kind alone.
    pub fn push_with_severity(&mut self, kind: DiagnosticKind, severity: Severity, position: Position) {
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
        }
        self.entries.push(Diagnostic {
            kind,
            severity,
            position,
        });
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }
}

/// Render a one-line caret marker under `source_line` at `column` (1-based),
/// for CLI use. Kept minimal per §10.2 — the actual sink is out of scope.
pub fn caret_line(source_line: &str, column: u32) -> String {
    let pad = " ".repeat(column.saturating_sub(1) as usize);
    format!("{}\n{}^", source_line, pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_severity() {
        let mut d = Diagnostics::new();
        d.push(DiagnosticKind::EofInBlockComment, Position { line: 1, column: 1 });
        d.push(
            DiagnosticKind::TrailingSemicolon(TrailingSemicolonContext::StatementSequence),
            Position { line: 2, column: 1 },
        );
        assert_eq!(d.error_count(), 1);
        assert_eq!(d.warning_count(), 1);
    }

    #[test]
    fn caret_line_points_at_column() {
        let s = caret_line("CONST k = 1", 7);
        assert_eq!(s, "CONST k = 1\n      ^");
    }
}
