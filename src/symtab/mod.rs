//! Scoped symbol table (component H).
//!
//! A stack of hash-bucket chains. Identifiers are compared by interned
//! handle equality, never by byte content, since two handles denoting the
//! same text are the same handle (`strings::StringRepo`'s invariant).

use crate::ast::NodeId;
use crate::strings::{hash_bytes, StringId};
use std::fmt;

const TOP_LEVEL_BUCKETS: usize = 97;
const INNER_BUCKETS: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Module,
    Const,
    Type,
    Var,
    Procedure,
    Field,
    ValueParam,
    VarParam,
    ConstParam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymtabError {
    IdentNotUnique,
    IdentNotFound,
    InvalidScope,
}

impl fmt::Display for SymtabError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SymtabError::IdentNotUnique => "identifier already declared in this scope",
            SymtabError::IdentNotFound => "identifier not found",
            SymtabError::InvalidScope => "no such scope on the stack",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for SymtabError {}

#[derive(Debug, Clone)]
struct Symbol {
    ident: StringId,
    kind: SymbolKind,
    type_id: Option<StringId>,
    definition: Option<NodeId>,
}

/// What [`SymbolTable::lookup`] hands back on a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub scope_index: usize,
    pub kind: SymbolKind,
    pub type_id: Option<StringId>,
    pub definition: Option<NodeId>,
}

struct Scope {
    ident: StringId,
    buckets: Vec<Vec<Symbol>>,
    symbol_count: usize,
}

impl Scope {
    fn new(ident: StringId, bucket_count: usize) -> Self {
        Self {
            ident,
            buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
            symbol_count: 0,
        }
    }

}

/// A stack of scopes, top-level at the bottom, with the usual
/// open/insert/lookup/close lifecycle (§4.H).
pub struct SymbolTable {
    scopes: Vec<Scope>,
}

impl SymbolTable {
    /// Construct a table and open the named top-level scope (97 buckets).
    pub fn new(top_ident: StringId) -> Self {
        Self {
            scopes: vec![Scope::new(top_ident, TOP_LEVEL_BUCKETS)],
        }
    }

    /// Push a new inner scope (17 buckets).
    pub fn open_scope(&mut self, ident: StringId) {
        self.scopes.push(Scope::new(ident, INNER_BUCKETS));
    }

    /// Insert into the current (top-of-stack) scope, keyed by the handle's
    /// hash (computed by the caller and passed as `ident_bytes` so the
    /// table never needs string-repo access). Pointer-equal handles in the
    /// same bucket are rejected as duplicates.
    pub fn insert(
        &mut self,
        ident: StringId,
        ident_hash: u64,
        kind: SymbolKind,
        type_id: Option<StringId>,
        definition: Option<NodeId>,
    ) -> Result<(), SymtabError> {
        let scope = self.scopes.last_mut().expect("at least one scope always open");
        let index = (ident_hash % scope.buckets.len() as u64) as usize;
        if scope.buckets[index].iter().any(|s| s.ident == ident) {
            return Err(SymtabError::IdentNotUnique);
        }
        scope.buckets[index].push(Symbol {
            ident,
            kind,
            type_id,
            definition,
        });
        scope.symbol_count += 1;
        Ok(())
    }

    /// Search the current scope, then ascend `previous` links, for `ident`.
    pub fn lookup(&self, ident: StringId, ident_hash: u64) -> Result<SymbolInfo, SymtabError> {
        for (depth, scope) in self.scopes.iter().enumerate().rev() {
            let index = (ident_hash % scope.buckets.len() as u64) as usize;
            if let Some(sym) = scope.buckets[index].iter().find(|s| s.ident == ident) {
                return Ok(SymbolInfo {
                    scope_index: depth,
                    kind: sym.kind,
                    type_id: sym.type_id,
                    definition: sym.definition,
                });
            }
        }
        Err(SymtabError::IdentNotFound)
    }

    /// Pop scopes from `current` down to and including the scope whose
    /// ident handle equals `ident`.
    pub fn close_scope(&mut self, ident: StringId) -> Result<(), SymtabError> {
        let pos = self.scopes.iter().rposition(|s| s.ident == ident).ok_or(SymtabError::InvalidScope)?;
        self.scopes.truncate(pos);
        Ok(())
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol_count(&self) -> usize {
        self.scopes.iter().map(|s| s.symbol_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringRepo;

    fn intern(repo: &mut StringRepo, s: &[u8]) -> (StringId, u64) {
        let id = repo.get(s).unwrap();
        (id, hash_bytes(s))
    }

    #[test]
    fn insert_and_lookup_round_trips() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        let (k, kh) = intern(&mut repo, b"k");
        table.insert(k, kh, SymbolKind::Const, None, None).unwrap();
        let info = table.lookup(k, kh).unwrap();
        assert_eq!(info.kind, SymbolKind::Const);
    }

    #[test]
    fn duplicate_insert_in_same_scope_is_rejected() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        let (t, th) = intern(&mut repo, b"T");
        table.insert(t, th, SymbolKind::Type, None, None).unwrap();
        let err = table.insert(t, th, SymbolKind::Type, None, None).unwrap_err();
        assert_eq!(err, SymtabError::IdentNotUnique);
    }

    #[test]
    fn shadowing_then_unshadowing_on_close() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        let (x, xh) = intern(&mut repo, b"x");
        table.insert(x, xh, SymbolKind::Const, None, None).unwrap();

        let (s2, _) = intern(&mut repo, b"P");
        table.open_scope(s2);
        table.insert(x, xh, SymbolKind::Var, None, None).unwrap();
        assert_eq!(table.lookup(x, xh).unwrap().kind, SymbolKind::Var);

        table.close_scope(s2).unwrap();
        assert_eq!(table.lookup(x, xh).unwrap().kind, SymbolKind::Const);
    }

    #[test]
    fn scope_count_tracks_stack_depth() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        assert_eq!(table.scope_count(), 1);
        let (inner, _) = intern(&mut repo, b"P");
        table.open_scope(inner);
        assert_eq!(table.scope_count(), 2);
        table.close_scope(inner).unwrap();
        assert_eq!(table.scope_count(), 1);
    }

    #[test]
    fn close_unknown_scope_is_an_error() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        let (bogus, _) = intern(&mut repo, b"Nope");
        assert_eq!(table.close_scope(bogus).unwrap_err(), SymtabError::InvalidScope);
    }

    #[test]
    fn lookup_missing_ident_is_an_error() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let table = SymbolTable::new(top);
        let (missing, mh) = intern(&mut repo, b"missing");
        assert_eq!(table.lookup(missing, mh).unwrap_err(), SymtabError::IdentNotFound);
    }

    #[test]
    fn symbol_count_sums_across_live_scopes() {
        let mut repo = StringRepo::new(0);
        let (top, _) = intern(&mut repo, b"M");
        let mut table = SymbolTable::new(top);
        let (a, ah) = intern(&mut repo, b"a");
        let (b, bh) = intern(&mut repo, b"b");
        table.insert(a, ah, SymbolKind::Const, None, None).unwrap();
        let (inner, _) = intern(&mut repo, b"P");
        table.open_scope(inner);
        table.insert(b, bh, SymbolKind::Var, None, None).unwrap();
        assert_eq!(table.symbol_count(), 2);
    }
}
