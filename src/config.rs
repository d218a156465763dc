//! Dialect configuration (§10.3).
//!
//! Rather than a global mutable option store, callers build a
//! [`DialectOptions`] value once and thread it explicitly through the
//! lexer, parser and identifier converter (Design Note 9).

/// The top-level selector `parse_file` takes: definition-module vs.
/// implementation-or-program-module (§4.G). The parser tells an
/// implementation module from a program module itself, from the
/// `IMPLEMENTATION`/`MODULE` lookahead, once it knows the source isn't a
/// definition module — that distinction isn't the caller's to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Definition,
    Module,
}

/// How a stray semicolon after a statement/field-list/formal-parameter
/// sequence is reported (§4.G, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrantSemicolon {
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectOptions {
    /// Selects the primary (enabled) vs. alternate FIRST/FOLLOW sets for
    /// FORMAL_TYPE, ATTRIBUTED_FORMAL_TYPE, FORMAL_PARAM_LIST,
    /// FORMAL_PARAMS, ATTRIB_FORMAL_PARAMS (§4.E).
    pub const_parameters: bool,
    /// Selects the primary vs. alternate set for TYPE_DECLARATION_TAIL (§4.E).
    pub variant_records: bool,
    pub errant_semicolon: ErrantSemicolon,
    /// Whether `&` and `~` are recognized as synonyms for AND/NOT (§4.D).
    pub lexer_synonyms: bool,
}

impl Default for DialectOptions {
    fn default() -> Self {
        Self::pim4()
    }
}

impl DialectOptions {
    pub fn pim2() -> Self {
        Self {
            const_parameters: false,
            variant_records: false,
            errant_semicolon: ErrantSemicolon::Error,
            lexer_synonyms: false,
        }
    }

    pub fn pim3() -> Self {
        Self {
            const_parameters: false,
            variant_records: true,
            errant_semicolon: ErrantSemicolon::Error,
            lexer_synonyms: true,
        }
    }

    pub fn pim4() -> Self {
        Self {
            const_parameters: true,
            variant_records: true,
            errant_semicolon: ErrantSemicolon::Warning,
            lexer_synonyms: true,
        }
    }
}

/// Lexical limits fixed at build time (§1: "Build-time configuration
/// (lexical limits) is treated as constants fixed at start").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerLimits {
    pub max_ident_length: usize,
    pub max_comment_nesting: u32,
}

impl Default for LexerLimits {
    fn default() -> Self {
        Self {
            max_ident_length: 64,
            max_comment_nesting: 10,
        }
    }
}
