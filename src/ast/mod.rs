//! AST node model (component F).
//!
//! A tagged-union arena rather than a generic tree crate: every node kind
//! carries its arity and per-position subnode-type constraints so that
//! construction that would violate either fails before any node is
//! allocated (§3, §4.F). The parser is the only caller that constructs
//! nodes fed from untrusted input; validation here is what lets the parser
//! stay terse about what it trusts its own sub-productions to return.

use crate::strings::StringId;
use std::fmt;

/// Non-negative arity, or a variadic lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Fixed(k) => n == k,
            Arity::AtLeast(k) => n >= k,
        }
    }
}

/// The closed set of node kinds, grouped into the families named in §4.F.
/// `Empty` is the shared optional-child singleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Empty,
    Invalid,

    // --- definition-module family ---
    DefModule,
    ImpModule,
    ProgModule,
    Import,
    DefList,

    // --- declaration kinds ---
    ConstDef,
    TypeDef,
    VarDecl,
    ProcDecl,
    FormalParam,
    FormalParamList,

    // --- type-denoter kinds ---
    ArrayType,
    RecordType,
    FieldListSeq,
    FieldList,
    SetType,
    PointerType,
    EnumType,
    SubrangeType,
    ProcType,
    TypeName,

    // --- statement kinds ---
    Assignment,
    ProcCall,
    IfStmt,
    WhileStmt,
    RepeatStmt,
    ForStmt,
    LoopStmt,
    WithStmt,
    CaseStmt,
    CaseLabelList,
    ExitStmt,
    ReturnStmt,
    StmtSeq,

    // --- expression kinds ---
    BinaryExpr,
    UnaryExpr,
    SetExpr,
    Designator,
    ActualParams,

    // --- terminal / literal kinds ---
    Ident,
    QualIdent,
    IntLiteral,
    RealLiteral,
    CharLiteral,
    QuotedLiteral,
    IdentList,
    Filename,
    Options,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Empty => "EMPTY",
            NodeKind::Invalid => "INVALID",
            NodeKind::DefModule => "DEFMOD",
            NodeKind::ImpModule => "IMPMOD",
            NodeKind::ProgModule => "PROGMOD",
            NodeKind::Import => "IMPORT",
            NodeKind::DefList => "DEFLIST",
            NodeKind::ConstDef => "CONSTDEF",
            NodeKind::TypeDef => "TYPEDEF",
            NodeKind::VarDecl => "VARDECL",
            NodeKind::ProcDecl => "PROCDECL",
            NodeKind::FormalParam => "FORMALPARAM",
            NodeKind::FormalParamList => "FORMALPARAMLIST",
            NodeKind::ArrayType => "ARRAYTYPE",
            NodeKind::RecordType => "RECORDTYPE",
            NodeKind::FieldListSeq => "FIELDLISTSEQ",
            NodeKind::FieldList => "FIELDLIST",
            NodeKind::SetType => "SETTYPE",
            NodeKind::PointerType => "POINTERTYPE",
            NodeKind::EnumType => "ENUMTYPE",
            NodeKind::SubrangeType => "SUBRANGETYPE",
            NodeKind::ProcType => "PROCTYPE",
            NodeKind::TypeName => "TYPENAME",
            NodeKind::Assignment => "ASSIGN",
            NodeKind::ProcCall => "PROCCALL",
            NodeKind::IfStmt => "IFSTMT",
            NodeKind::WhileStmt => "WHILESTMT",
            NodeKind::RepeatStmt => "REPEATSTMT",
            NodeKind::ForStmt => "FORSTMT",
            NodeKind::LoopStmt => "LOOPSTMT",
            NodeKind::WithStmt => "WITHSTMT",
            NodeKind::CaseStmt => "CASESTMT",
            NodeKind::CaseLabelList => "CASELABELLIST",
            NodeKind::ExitStmt => "EXITSTMT",
            NodeKind::ReturnStmt => "RETURNSTMT",
            NodeKind::StmtSeq => "STMTSEQ",
            NodeKind::BinaryExpr => "BINEXPR",
            NodeKind::UnaryExpr => "UNEXPR",
            NodeKind::SetExpr => "SETEXPR",
            NodeKind::Designator => "DESIGNATOR",
            NodeKind::ActualParams => "ACTUALPARAMS",
            NodeKind::Ident => "IDENT",
            NodeKind::QualIdent => "QUALIDENT",
            NodeKind::IntLiteral => "INTVAL",
            NodeKind::RealLiteral => "REALVAL",
            NodeKind::CharLiteral => "CHARVAL",
            NodeKind::QuotedLiteral => "STRVAL",
            NodeKind::IdentList => "IDENTLIST",
            NodeKind::Filename => "FILENAME",
            NodeKind::Options => "OPTIONS",
        }
    }

    /// Is this a terminal kind (holds values, not child references)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            NodeKind::Ident
                | NodeKind::QualIdent
                | NodeKind::IntLiteral
                | NodeKind::RealLiteral
                | NodeKind::CharLiteral
                | NodeKind::QuotedLiteral
                | NodeKind::IdentList
                | NodeKind::Filename
                | NodeKind::Options
        )
    }

    /// Variadic ("≥ k") kinds, non-terminal or terminal, per §4.F. Every
    /// kind whose [`Arity`] is [`Arity::AtLeast`] is flagged here; the
    /// terminal subset (identlist, filename, options) also goes through
    /// `new_terminal_list` instead of `new_list_branch`.
    pub fn is_list(self) -> bool {
        matches!(self.arity(), Arity::AtLeast(_))
    }

    pub fn arity(self) -> Arity {
        use NodeKind::*;
        match self {
            Empty | Invalid => Arity::Fixed(0),
            DefModule => Arity::Fixed(3),
            ImpModule | ProgModule => Arity::Fixed(4),
            Import => Arity::Fixed(2),
            DefList => Arity::AtLeast(0),
            ConstDef => Arity::Fixed(2),
            TypeDef => Arity::Fixed(2),
            VarDecl => Arity::Fixed(2),
            ProcDecl => Arity::Fixed(4),
            FormalParam => Arity::Fixed(3),
            FormalParamList => Arity::AtLeast(0),
            ArrayType => Arity::Fixed(2),
            RecordType => Arity::Fixed(1),
            FieldListSeq => Arity::AtLeast(1),
            FieldList => Arity::Fixed(2),
            SetType => Arity::Fixed(1),
            PointerType => Arity::Fixed(1),
            EnumType => Arity::Fixed(1),
            SubrangeType => Arity::Fixed(2),
            ProcType => Arity::Fixed(1),
            TypeName => Arity::Fixed(1),
            Assignment => Arity::Fixed(2),
            ProcCall => Arity::Fixed(2),
            IfStmt => Arity::AtLeast(2),
            WhileStmt => Arity::Fixed(2),
            RepeatStmt => Arity::Fixed(2),
            ForStmt => Arity::AtLeast(4),
            LoopStmt => Arity::Fixed(1),
            WithStmt => Arity::Fixed(2),
            CaseStmt => Arity::AtLeast(2),
            CaseLabelList => Arity::AtLeast(1),
            ExitStmt => Arity::Fixed(0),
            ReturnStmt => Arity::Fixed(1),
            StmtSeq => Arity::AtLeast(0),
            BinaryExpr => Arity::Fixed(3),
            UnaryExpr => Arity::Fixed(2),
            SetExpr => Arity::AtLeast(0),
            Designator => Arity::AtLeast(1),
            ActualParams => Arity::AtLeast(0),
            Ident | QualIdent | IntLiteral | RealLiteral | CharLiteral | QuotedLiteral => {
                Arity::Fixed(1)
            }
            IdentList | Filename | Options => Arity::AtLeast(0),
        }
    }

    /// Per-position allowed child-kind set for non-terminals. `None` means
    /// "any non-terminal kind is accepted at this position" (used for the
    /// handful of positions — expression operands, statement bodies — whose
    /// precise kind set is determined dynamically by the parser rather than
    /// fixed at the node-kind level).
    fn allowed_child_kinds(self, position: usize) -> Option<&'static [NodeKind]> {
        use NodeKind::*;
        match (self, position) {
            (DefModule | ImpModule | ProgModule, 0) => Some(&[Ident]),
            (DefModule | ImpModule | ProgModule, 1) => Some(&[Empty, Import]),
            (DefModule | ImpModule | ProgModule, 2) => Some(&[Empty, DefList]),
            (ImpModule | ProgModule, 3) => Some(&[Empty, StmtSeq]),
            (Import, 0) => Some(&[Empty, Ident]),
            (Import, 1) => Some(&[IdentList]),
            (ConstDef, 0) => Some(&[Ident]),
            (TypeDef, 0) => Some(&[Ident]),
            (VarDecl, 0) => Some(&[IdentList]),
            (ProcDecl, 0) => Some(&[Ident]),
            (ProcDecl, 1) => Some(&[Empty, FormalParamList]),
            (ProcDecl, 2) => Some(&[Empty, DefList]),
            (ProcDecl, 3) => Some(&[Empty, StmtSeq]),
            (FormalParam, 0) => Some(&[IdentList]),
            (ArrayType, 0) => Some(&[IdentList]),
            (FieldList, 0) => Some(&[Empty, IdentList]),
            (SubrangeType, _) => Some(&[IntLiteral, CharLiteral, QualIdent]),
            (WhileStmt, 1) => Some(&[Empty, StmtSeq]),
            (RepeatStmt, 1) => Some(&[Empty, StmtSeq]),
            (LoopStmt, 0) => Some(&[Empty, StmtSeq]),
            (ExitStmt, _) => None,
            _ => None,
        }
    }
}

/// Either a subnode reference or an interned value, stored per-position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Child(NodeId),
    Value(StringId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

#[derive(Debug)]
struct StoredNode {
    kind: NodeKind,
    slots: Vec<Slot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstError {
    NotANonTerminal,
    NotATerminal,
    ArityMismatch,
    SubnodeKindRejected,
    InvalidReference,
    OutOfRange,
}

impl fmt::Display for AstError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AstError::NotANonTerminal => "kind is not a non-terminal",
            AstError::NotATerminal => "kind is not a terminal",
            AstError::ArityMismatch => "subnode count violates the kind's arity",
            AstError::SubnodeKindRejected => "subnode kind not allowed at this position",
            AstError::InvalidReference => "invalid node reference",
            AstError::OutOfRange => "position index out of range",
        };
        write!(f, "{}", msg)
    }
}

impl std::error::Error for AstError {}

/// Owning arena of AST nodes. One `Arena` per parse; nodes never outlive
/// their arena (§5: "an AST owns its child nodes transitively").
pub struct Arena {
    nodes: Vec<Option<StoredNode>>,
    empty: NodeId,
}

impl Arena {
    pub fn new() -> Self {
        let mut nodes = Vec::new();
        nodes.push(Some(StoredNode {
            kind: NodeKind::Empty,
            slots: Vec::new(),
        }));
        Self {
            nodes,
            empty: NodeId(0),
        }
    }

    /// The shared optional-child singleton.
    pub fn empty(&self) -> NodeId {
        self.empty
    }

    fn push(&mut self, kind: NodeKind, slots: Vec<Slot>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(StoredNode { kind, slots }));
        id
    }

    fn get(&self, id: NodeId) -> Result<&StoredNode, AstError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(AstError::InvalidReference)
    }

    fn validate_children(&self, kind: NodeKind, children: &[NodeId]) -> Result<(), AstError> {
        if kind.is_terminal() {
            return Err(AstError::NotANonTerminal);
        }
        if !kind.arity().accepts(children.len()) {
            return Err(AstError::ArityMismatch);
        }
        for (i, &child) in children.iter().enumerate() {
            if let Some(allowed) = kind.allowed_child_kinds(i) {
                let child_kind = self.get(child)?.kind;
                if !allowed.contains(&child_kind) {
                    return Err(AstError::SubnodeKindRejected);
                }
            }
        }
        Ok(())
    }

    /// Fixed-arity non-terminal construction.
    pub fn new_branch(&mut self, kind: NodeKind, children: &[NodeId]) -> Result<NodeId, AstError> {
        if matches!(kind.arity(), Arity::AtLeast(_)) {
            return Err(AstError::ArityMismatch);
        }
        self.validate_children(kind, children)?;
        let slots = children.iter().map(|&c| Slot::Child(c)).collect();
        Ok(self.push(kind, slots))
    }

    /// Variadic ("≥ k") non-terminal construction.
    pub fn new_list_branch(&mut self, kind: NodeKind, children: &[NodeId]) -> Result<NodeId, AstError> {
        if !kind.is_list() || kind.is_terminal() {
            return Err(AstError::NotANonTerminal);
        }
        self.validate_children(kind, children)?;
        let slots = children.iter().map(|&c| Slot::Child(c)).collect();
        Ok(self.push(kind, slots))
    }

    /// Single-value terminal construction.
    pub fn new_terminal(&mut self, kind: NodeKind, value: StringId) -> Result<NodeId, AstError> {
        if !kind.is_terminal() || kind.is_list() {
            return Err(AstError::NotATerminal);
        }
        if !kind.arity().accepts(1) {
            return Err(AstError::ArityMismatch);
        }
        Ok(self.push(kind, vec![Slot::Value(value)]))
    }

    /// Sequence-valued terminal construction (identlist, filename, options).
    pub fn new_terminal_list(&mut self, kind: NodeKind, values: &[StringId]) -> Result<NodeId, AstError> {
        if !kind.is_terminal() || !kind.is_list() {
            return Err(AstError::NotATerminal);
        }
        if !kind.arity().accepts(values.len()) {
            return Err(AstError::ArityMismatch);
        }
        let slots = values.iter().map(|&v| Slot::Value(v)).collect();
        Ok(self.push(kind, slots))
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, AstError> {
        Ok(self.get(id)?.kind)
    }

    pub fn subnode_count(&self, id: NodeId) -> Result<usize, AstError> {
        Ok(self.get(id)?.slots.len())
    }

    pub fn subnode(&self, id: NodeId, i: usize) -> Result<NodeId, AstError> {
        match self.get(id)?.slots.get(i) {
            Some(Slot::Child(c)) => Ok(*c),
            Some(Slot::Value(_)) => Err(AstError::NotANonTerminal),
            None => Err(AstError::OutOfRange),
        }
    }

    pub fn value(&self, id: NodeId, i: usize) -> Result<StringId, AstError> {
        match self.get(id)?.slots.get(i) {
            Some(Slot::Value(v)) => Ok(*v),
            Some(Slot::Child(_)) => Err(AstError::NotATerminal),
            None => Err(AstError::OutOfRange),
        }
    }

    /// Alias for `value(node, 0)`.
    pub fn value0(&self, id: NodeId) -> Result<StringId, AstError> {
        self.value(id, 0)
    }

    /// Replace a child reference, returning the previously stored one.
    pub fn replace_subnode(&mut self, id: NodeId, i: usize, new_child: NodeId) -> Result<NodeId, AstError> {
        let kind = self.kind(id)?;
        if let Some(allowed) = kind.allowed_child_kinds(i) {
            let new_kind = self.kind(new_child)?;
            if !allowed.contains(&new_kind) {
                return Err(AstError::SubnodeKindRejected);
            }
        }
        let node = self
            .nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(AstError::InvalidReference)?;
        match node.slots.get_mut(i) {
            Some(slot @ Slot::Child(_)) => {
                let old = match *slot {
                    Slot::Child(c) => c,
                    _ => unreachable!(),
                };
                *slot = Slot::Child(new_child);
                Ok(old)
            }
            Some(Slot::Value(_)) => Err(AstError::NotANonTerminal),
            None => Err(AstError::OutOfRange),
        }
    }

    /// Replace a terminal value, returning the previously stored one.
    pub fn replace_value(&mut self, id: NodeId, i: usize, new_value: StringId) -> Result<StringId, AstError> {
        let node = self
            .nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(AstError::InvalidReference)?;
        match node.slots.get_mut(i) {
            Some(slot @ Slot::Value(_)) => {
                let old = match *slot {
                    Slot::Value(v) => v,
                    _ => unreachable!(),
                };
                *slot = Slot::Value(new_value);
                Ok(old)
            }
            Some(Slot::Child(_)) => Err(AstError::NotATerminal),
            None => Err(AstError::OutOfRange),
        }
    }

    /// Deallocate a single node. The empty singleton is ignored. Callers
    /// are responsible for traversing and releasing owned children first.
    pub fn release(&mut self, id: NodeId) -> Result<(), AstError> {
        if id == self.empty {
            return Ok(());
        }
        let slot = self
            .nodes
            .get_mut(id.0 as usize)
            .ok_or(AstError::InvalidReference)?;
        if slot.is_none() {
            return Err(AstError::InvalidReference);
        }
        *slot = None;
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringRepo;

    #[test]
    fn empty_singleton_has_zero_arity() {
        let arena = Arena::new();
        assert_eq!(arena.kind(arena.empty()).unwrap(), NodeKind::Empty);
        assert_eq!(arena.subnode_count(arena.empty()).unwrap(), 0);
    }

    #[test]
    fn defmodule_requires_exactly_three_children() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let name = repo.get(b"M").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, name).unwrap();
        let empty = arena.empty();
        let ok = arena.new_branch(NodeKind::DefModule, &[ident, empty, empty]);
        assert!(ok.is_ok());
        let bad = arena.new_branch(NodeKind::DefModule, &[ident, empty]);
        assert_eq!(bad.unwrap_err(), AstError::ArityMismatch);
    }

    #[test]
    fn defmodule_rejects_non_ident_first_child() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let val = repo.get(b"42").unwrap();
        let not_ident = arena.new_terminal(NodeKind::IntLiteral, val).unwrap();
        let empty = arena.empty();
        let err = arena
            .new_branch(NodeKind::DefModule, &[not_ident, empty, empty])
            .unwrap_err();
        assert_eq!(err, AstError::SubnodeKindRejected);
    }

    #[test]
    fn list_branch_accepts_variadic_lengths() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let k = repo.get(b"k").unwrap();
        let v = repo.get(b"42").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, k).unwrap();
        let intval = arena.new_terminal(NodeKind::IntLiteral, v).unwrap();
        let constdef = arena.new_branch(NodeKind::ConstDef, &[ident, intval]).unwrap();
        let list0 = arena.new_list_branch(NodeKind::DefList, &[]).unwrap();
        let list1 = arena.new_list_branch(NodeKind::DefList, &[constdef]).unwrap();
        assert_eq!(arena.subnode_count(list0).unwrap(), 0);
        assert_eq!(arena.subnode_count(list1).unwrap(), 1);
    }

    #[test]
    fn terminal_list_holds_a_value_sequence() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let a = repo.get(b"a").unwrap();
        let b = repo.get(b"b").unwrap();
        let list = arena.new_terminal_list(NodeKind::IdentList, &[a, b]).unwrap();
        assert_eq!(arena.value(list, 0).unwrap(), a);
        assert_eq!(arena.value(list, 1).unwrap(), b);
    }

    #[test]
    fn replace_subnode_returns_previous_and_validates() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let k = repo.get(b"k").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, k).unwrap();
        let empty = arena.empty();
        let module = arena.new_branch(NodeKind::DefModule, &[ident, empty, empty]).unwrap();
        let j = repo.get(b"j").unwrap();
        let new_ident = arena.new_terminal(NodeKind::Ident, j).unwrap();
        let prev = arena.replace_subnode(module, 0, new_ident).unwrap();
        assert_eq!(prev, ident);
        assert_eq!(arena.subnode(module, 0).unwrap(), new_ident);
    }

    #[test]
    fn release_frees_node_but_empty_singleton_is_inert() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let k = repo.get(b"k").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, k).unwrap();
        let before = arena.count();
        arena.release(ident).unwrap();
        assert_eq!(arena.count(), before - 1);
        assert!(arena.release(arena.empty()).is_ok());
    }

    #[test]
    fn subnode_on_terminal_is_an_error() {
        let mut repo = StringRepo::new(0);
        let mut arena = Arena::new();
        let k = repo.get(b"k").unwrap();
        let ident = arena.new_terminal(NodeKind::Ident, k).unwrap();
        assert_eq!(arena.subnode(ident, 0).unwrap_err(), AstError::NotANonTerminal);
    }
}
