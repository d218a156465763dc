//! Recursive-descent parser (component G).
//!
//! One routine per non-terminal in [`crate::grammar`], each following the
//! pre/body/postcondition contract of §4.G: the lookahead is expected (not
//! required) to lie in FIRST(p) on entry, the routine consumes tokens and
//! builds the corresponding AST node, and on return the lookahead lies in
//! FOLLOW(p) ∪ {EOF} — or panic-mode recovery has already run.
//!
//! Declarations insert themselves into the [`SymbolTable`] as they're
//! built; the AST is never pruned on a semantic error (§8 scenario 3), so
//! a duplicate-ident diagnostic and a fully formed `TYPEDEF` node coexist.

mod declarations;
mod expressions;
mod statements;
mod types;

use crate::ast::{Arena, NodeId, NodeKind};
use crate::config::{DialectOptions, ErrantSemicolon, LexerLimits, ModuleKind};
use crate::diagnostics::{Diagnostics, DiagnosticKind, Position, Severity, TrailingSemicolonContext};
use crate::grammar::{self, ResyncSet};
use crate::lexer::Lexer;
use crate::reader::{ReaderStatus, SourceReader};
use crate::strings::{hash_bytes, StringId, StringRepo};
use crate::symtab::{SymbolKind, SymbolTable};
use crate::token::{Token, TokenSet};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    Success,
    InvalidReference,
    InvalidSourceKind,
    AllocationFailed,
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseStatus::Success => "success",
            ParseStatus::InvalidReference => "invalid reference",
            ParseStatus::InvalidSourceKind => "invalid source kind",
            ParseStatus::AllocationFailed => "allocation failed",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for ParseStatus {}

/// Counts attached to the returned object, per §4.G and §7 ("callers use
/// error count to set their exit status").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub warnings: u32,
    pub errors: u32,
    pub lines: u32,
}

/// Everything a successful (or partially successful, per §8 scenario 3/4)
/// parse hands back to the caller.
pub struct ParseOutput {
    pub arena: Arena,
    pub strings: StringRepo,
    pub root: NodeId,
    pub symtab: SymbolTable,
    pub diagnostics: Diagnostics,
}

/// Top-level entry point: `parse_file(kind, path) → (ast, stats, status)` (§4.G).
pub fn parse_file<P: AsRef<Path>>(
    kind: ModuleKind,
    path: P,
    options: DialectOptions,
    limits: LexerLimits,
) -> (Option<ParseOutput>, ParseStats, ParseStatus) {
    let reader = match SourceReader::open(path) {
        Ok(r) => r,
        Err(ReaderStatus::AllocationFailed) => {
            return (None, ParseStats::default(), ParseStatus::AllocationFailed)
        }
        Err(_) => return (None, ParseStats::default(), ParseStatus::InvalidReference),
    };

    let mut strings = StringRepo::new(0);
    let mut diagnostics = Diagnostics::new();
    let lexer = Lexer::new(reader, &mut strings, &mut diagnostics, options, limits);
    let mut parser = Parser::new(lexer, options);

    if !parser.lookahead_matches_kind(kind) {
        return (None, ParseStats::default(), ParseStatus::InvalidSourceKind);
    }

    let root = parser.parse_module(kind);
    let lines = parser.lexer.total_lines();
    let (arena, symtab) = parser.into_parts();

    let stats = ParseStats {
        warnings: diagnostics.warning_count(),
        errors: diagnostics.error_count(),
        lines,
    };

    (
        Some(ParseOutput {
            arena,
            strings,
            root,
            symtab,
            diagnostics,
        }),
        stats,
        ParseStatus::Success,
    )
}

pub(crate) struct Parser<'a> {
    lexer: Lexer<'a>,
    arena: Arena,
    symtab: SymbolTable,
    options: DialectOptions,
}

impl<'a> Parser<'a> {
    fn new(mut lexer: Lexer<'a>, options: DialectOptions) -> Self {
        let anon = lexer
            .repo_mut()
            .get(b"")
            .expect("interning the empty string never exceeds the size limit");
        Self {
            lexer,
            arena: Arena::new(),
            symtab: SymbolTable::new(anon),
            options,
        }
    }

    /// Whether the lookahead token opens a compilation unit of the
    /// requested flavor. `Module` accepts either an `IMPLEMENTATION` or a
    /// bare `MODULE` opener — which of the two it actually is gets decided
    /// later, in `parse_module`, from this same lookahead.
    fn lookahead_matches_kind(&self, kind: ModuleKind) -> bool {
        match kind {
            ModuleKind::Definition => self.lexer.next_sym() == Token::Definition,
            ModuleKind::Module => matches!(
                self.lexer.next_sym(),
                Token::Implementation | Token::Module
            ),
        }
    }

    fn into_parts(self) -> (Arena, SymbolTable) {
        (self.arena, self.symtab)
    }

    // --- token-stream primitives -----------------------------------------

    fn current(&self) -> Token {
        self.lexer.next_sym()
    }

    fn position(&self) -> Position {
        Position {
            line: self.lexer.current_line(),
            column: self.lexer.current_column(),
        }
    }

    fn bump(&mut self) -> Token {
        self.lexer.read_sym().token
    }

    /// Clone of the current lookahead's lexeme text, if any.
    fn current_text(&mut self) -> Option<String> {
        let sid = self.lexer.current_lexeme()?;
        self.lexer.repo_mut().as_str(sid).ok().map(|s| s.to_string())
    }

    /// Interns text the parser itself synthesizes (qualidents, operator
    /// lexemes, array-index text) rather than copies straight from the
    /// lexer. These are always short, well within `MAX_STRING_LENGTH`.
    fn intern(&mut self, bytes: &[u8]) -> StringId {
        self.lexer
            .repo_mut()
            .get(bytes)
            .expect("parser-synthesized text is always within the size limit")
    }

    // --- diagnostics & recovery -------------------------------------------

    fn diag_at(&mut self, kind: DiagnosticKind, position: Position) {
        self.lexer.diagnostics_mut().push(kind, position);
    }

    fn unexpected_one(&mut self, expected: Token) {
        let found = self.current();
        let lexeme = self.current_text();
        let position = self.position();
        self.diag_at(
            DiagnosticKind::UnexpectedToken {
                found,
                lexeme,
                expected_one: Some(expected),
                expected_set: None,
            },
            position,
        );
    }

    fn unexpected_set(&mut self, expected: TokenSet) {
        let found = self.current();
        let lexeme = self.current_text();
        let position = self.position();
        self.diag_at(
            DiagnosticKind::UnexpectedToken {
                found,
                lexeme,
                expected_one: None,
                expected_set: Some(expected),
            },
            position,
        );
    }

    /// Panic-mode recovery: discard tokens until the lookahead is in the
    /// named resync set or EOF (§4.G step c).
    fn recover(&mut self, rs: ResyncSet) {
        let set = grammar::resync(rs);
        while self.current() != Token::Eof && !set.element(self.current()) {
            self.bump();
        }
    }

    /// Consume `tok` if it's the lookahead; otherwise report and recover.
    fn expect(&mut self, tok: Token, rs: ResyncSet) -> bool {
        if self.current() == tok {
            self.bump();
            true
        } else {
            self.unexpected_one(tok);
            self.recover(rs);
            false
        }
    }

    /// Like [`Self::expect`] but against a whole expected set, for
    /// productions whose FIRST/FOLLOW admits more than one token.
    fn expect_in(&mut self, set: &TokenSet, rs: ResyncSet) -> bool {
        if set.element(self.current()) {
            true
        } else {
            self.unexpected_set(set.clone());
            self.recover(rs);
            false
        }
    }

    /// Consume an identifier, returning its text and interned handle.
    /// On failure, reports and recovers, returning an empty placeholder.
    fn expect_ident(&mut self, rs: ResyncSet) -> (String, StringId) {
        if self.current() == Token::Ident {
            let text = self.current_text().unwrap_or_default();
            let sid = self.intern(text.as_bytes());
            self.bump();
            (text, sid)
        } else {
            self.unexpected_one(Token::Ident);
            self.recover(rs);
            (String::new(), self.intern(b""))
        }
    }

    fn errant_semicolon_severity(&self) -> Severity {
        match self.options.errant_semicolon {
            ErrantSemicolon::Warning => Severity::Warning,
            ErrantSemicolon::Error => Severity::Error,
        }
    }

    /// Reports a separator semicolon with nothing following it in `ctx`,
    /// at the dialect's configured severity (§4.G "semicolon policies", §7.3).
    fn report_trailing_semicolon(&mut self, ctx: TrailingSemicolonContext) {
        let position = self.position();
        let severity = self.errant_semicolon_severity();
        self.lexer
            .diagnostics_mut()
            .push_with_severity(DiagnosticKind::TrailingSemicolon(ctx), severity, position);
    }

    // --- AST construction helpers (never panic: validator violations are
    // implementation bugs, not input errors, so they degrade to EMPTY
    // rather than unwinding the whole parse) --------------------------------

    fn empty(&self) -> NodeId {
        self.arena.empty()
    }

    fn branch(&mut self, kind: NodeKind, children: &[NodeId]) -> NodeId {
        self.arena.new_branch(kind, children).unwrap_or_else(|_| self.arena.empty())
    }

    fn list_branch(&mut self, kind: NodeKind, children: &[NodeId]) -> NodeId {
        self.arena
            .new_list_branch(kind, children)
            .unwrap_or_else(|_| self.arena.empty())
    }

    fn terminal(&mut self, kind: NodeKind, value: StringId) -> NodeId {
        self.arena.new_terminal(kind, value).unwrap_or_else(|_| self.arena.empty())
    }

    fn terminal_list(&mut self, kind: NodeKind, values: &[StringId]) -> NodeId {
        self.arena
            .new_terminal_list(kind, values)
            .unwrap_or_else(|_| self.arena.empty())
    }

    fn ident_node(&mut self, sid: StringId) -> NodeId {
        self.terminal(NodeKind::Ident, sid)
    }

    /// The current lookahead's lexeme as an interned handle, falling back
    /// to the interned empty string when the lexer carries no lexeme
    /// (e.g. at EOF) — used by the productions that attach a terminal
    /// value directly from the lookahead.
    fn current_lexeme(&mut self) -> StringId {
        self.lexer.current_lexeme().unwrap_or_else(|| self.intern(b""))
    }

    /// Consumes the current literal token and stores its text as `kind`'s
    /// terminal value. Quoted string/char literals have their surrounding
    /// quote characters stripped (the lexer's lexeme span includes them,
    /// but §4.J's serializer forms and re-quotes the bare content);
    /// digit-prefixed char literals (`077C`) and numeric literals are
    /// stored verbatim.
    fn literal_text(&mut self, kind: NodeKind) -> NodeId {
        let raw = self.current_text().unwrap_or_default();
        self.bump();
        let text = match kind {
            NodeKind::QuotedLiteral => strip_quotes(&raw),
            NodeKind::CharLiteral if raw.starts_with(['\'', '"']) => strip_quotes(&raw),
            _ => raw,
        };
        let sid = self.intern(text.as_bytes());
        self.terminal(kind, sid)
    }

    // --- symbol table ------------------------------------------------------

    fn open_top_scope(&mut self, ident: StringId) {
        self.symtab = SymbolTable::new(ident);
    }

    fn open_scope(&mut self, ident: StringId) {
        self.symtab.open_scope(ident);
    }

    fn close_scope(&mut self, ident: StringId) {
        let _ = self.symtab.close_scope(ident);
    }

    /// Insert `ident` into the current scope; on collision, records the
    /// one semantic diagnostic this front end produces (§7.4, §8 scenario 3).
    fn declare(
        &mut self,
        ident: StringId,
        text: &str,
        kind: SymbolKind,
        type_id: Option<StringId>,
        definition: Option<NodeId>,
        position: Position,
    ) {
        let hash = hash_bytes(text.as_bytes());
        if self.symtab.insert(ident, hash, kind, type_id, definition).is_err() {
            self.diag_at(DiagnosticKind::DuplicateIdentInScope(text.to_string()), position);
        }
    }

    // --- module-level productions -------------------------------------------

    fn parse_module(&mut self, kind: ModuleKind) -> NodeId {
        match kind {
            ModuleKind::Definition => self.parse_definition_module(),
            ModuleKind::Module if self.current() == Token::Implementation => {
                self.parse_implementation_module()
            }
            ModuleKind::Module => self.parse_program_module(),
        }
    }

    fn parse_definition_module(&mut self) -> NodeId {
        self.expect(Token::Definition, ResyncSet::Module);
        self.expect(Token::Module, ResyncSet::Module);
        let (name_text, name_sid) = self.expect_ident(ResyncSet::Module);
        self.open_top_scope(name_sid);
        let name_node = self.ident_node(name_sid);
        self.expect(Token::Semicolon, ResyncSet::Module);

        let import = self.parse_import_list_opt();
        let deflist = self.parse_definition_list();

        self.expect(Token::End, ResyncSet::Module);
        self.expect_matching_end_name(&name_text);
        self.expect(Token::Period, ResyncSet::Module);

        self.branch(NodeKind::DefModule, &[name_node, import, deflist])
    }

    fn parse_implementation_module(&mut self) -> NodeId {
        self.expect(Token::Implementation, ResyncSet::Module);
        self.parse_body_module(NodeKind::ImpModule)
    }

    fn parse_program_module(&mut self) -> NodeId {
        self.parse_body_module(NodeKind::ProgModule)
    }

    fn parse_body_module(&mut self, kind: NodeKind) -> NodeId {
        self.expect(Token::Module, ResyncSet::Module);
        let (name_text, name_sid) = self.expect_ident(ResyncSet::Module);
        self.open_top_scope(name_sid);
        let name_node = self.ident_node(name_sid);
        self.expect(Token::Semicolon, ResyncSet::Module);

        let import = self.parse_import_list_opt();
        let deflist = self.parse_definition_list();

        let stmt_seq = if self.current() == Token::Begin {
            self.bump();
            self.parse_statement_sequence()
        } else {
            self.empty()
        };

        self.expect(Token::End, ResyncSet::Module);
        self.expect_matching_end_name(&name_text);
        self.expect(Token::Period, ResyncSet::Module);

        self.branch(kind, &[name_node, import, deflist, stmt_seq])
    }

    /// The trailing `END <name>` must repeat the module/procedure name;
    /// mismatch is reported as an ordinary unexpected-token.
    fn expect_matching_end_name(&mut self, expected: &str) {
        if self.current() == Token::Ident {
            let text = self.current_text().unwrap_or_default();
            self.bump();
            if text != expected {
                let position = self.position();
                self.diag_at(
                    DiagnosticKind::UnexpectedToken {
                        found: Token::Ident,
                        lexeme: Some(text),
                        expected_one: None,
                        expected_set: None,
                    },
                    position,
                );
            }
        } else {
            self.unexpected_one(Token::Ident);
            self.recover(ResyncSet::Module);
        }
    }

    fn parse_import_list_opt(&mut self) -> NodeId {
        let opts = self.options;
        if grammar::first(grammar::Production::ImportList, &opts).element(self.current()) {
            self.parse_import()
        } else {
            self.empty()
        }
    }

    /// `FROM Mod IMPORT a, b;` or `IMPORT a, b;`, the only two import
    /// forms this front end recognizes (a representative subset of the
    /// full import-list grammar, per `SPEC_FULL.md` §11).
    fn parse_import(&mut self) -> NodeId {
        let from = if self.current() == Token::From {
            self.bump();
            let (_, sid) = self.expect_ident(ResyncSet::Declaration);
            self.ident_node(sid)
        } else {
            self.empty()
        };

        self.expect(Token::Import, ResyncSet::Declaration);
        let names = self.parse_ident_list();
        self.expect(Token::Semicolon, ResyncSet::Declaration);

        self.branch(NodeKind::Import, &[from, names])
    }

    /// `ident {, ident}`, also used by VAR declarations and field lists.
    /// Duplicate names within the same list are reported but kept (§7.3).
    fn parse_ident_list(&mut self) -> NodeId {
        let mut seen: Vec<String> = Vec::new();
        let mut ids = Vec::new();
        loop {
            let (text, sid) = self.expect_ident(ResyncSet::Declaration);
            if !text.is_empty() {
                if seen.contains(&text) {
                    let position = self.position();
                    self.diag_at(DiagnosticKind::DuplicateIdentInIdentList(text.clone()), position);
                } else {
                    seen.push(text);
                }
                ids.push(sid);
            }
            if self.current() == Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.terminal_list(NodeKind::IdentList, &ids)
    }

    fn parse_definition_list(&mut self) -> NodeId {
        let opts = self.options;
        let mut decls = Vec::new();
        while grammar::first(grammar::Production::Declaration, &opts).element(self.current()) {
            decls.extend(self.parse_declaration());
        }
        if decls.is_empty() {
            self.empty()
        } else {
            self.list_branch(NodeKind::DefList, &decls)
        }
    }

    /// One keyword-introduced declaration section, which for CONST/TYPE/VAR
    /// yields zero or more sibling declarations and for PROCEDURE yields
    /// exactly one (§4.G, §2 "Declaration").
    fn parse_declaration(&mut self) -> Vec<NodeId> {
        match self.current() {
            Token::Const => self.parse_const_declaration(),
            Token::Type => self.parse_type_declaration(),
            Token::Var => self.parse_var_declaration(),
            Token::Procedure => vec![self.parse_procedure_declaration()],
            _ => {
                let set = grammar::first(grammar::Production::Declaration, &self.options);
                self.unexpected_set(set);
                self.recover(ResyncSet::Declaration);
                Vec::new()
            }
        }
    }
}

/// Strips one leading and one trailing character (the matching quote
/// pair the lexer leaves in a quoted literal's lexeme span).
fn strip_quotes(s: &str) -> String {
    if s.len() >= 2 {
        let mut chars = s.chars();
        chars.next();
        chars.next_back();
        chars.collect()
    } else {
        s.to_string()
    }
}
