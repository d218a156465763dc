//! FIRST/FOLLOW/RESYNC oracle (component E).
//!
//! Covers module bodies, import lists, the four declaration forms, the
//! seven type-denoter forms, formal parameter lists, the eleven statement
//! forms, and the expression precedence chain (expression → simple
//! expression → term → factor → designator). This is the subset needed to
//! drive a parser over ordinary PIM modules, not the full grammar.

use crate::config::DialectOptions;
use crate::token::{Token, TokenSet};

/// One enumerant per covered non-terminal. `FormalParameters` and
/// `TypeDeclarationTail` are option-dependent (see [`first`]/[`follow`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Production {
    Module,
    ImportList,
    Declaration,
    ConstDeclaration,
    TypeDeclaration,
    TypeDeclarationTail,
    VarDeclaration,
    ProcedureDeclaration,
    ArrayType,
    RecordType,
    SetType,
    PointerType,
    EnumerationType,
    SubrangeType,
    ProcedureType,
    FormalParameterList,
    FormalParameters,
    Statement,
    StatementSequence,
    AssignmentOrCall,
    IfStatement,
    WhileStatement,
    RepeatStatement,
    ForStatement,
    LoopStatement,
    WithStatement,
    CaseStatement,
    ExitStatement,
    ReturnStatement,
    Expression,
    SimpleExpression,
    Term,
    Factor,
    Designator,
    Qualident,
    ActualParameters,
}

impl Production {
    pub fn name(self) -> &'static str {
        match self {
            Production::Module => "module",
            Production::ImportList => "import list",
            Production::Declaration => "declaration",
            Production::ConstDeclaration => "const declaration",
            Production::TypeDeclaration => "type declaration",
            Production::TypeDeclarationTail => "type declaration tail",
            Production::VarDeclaration => "var declaration",
            Production::ProcedureDeclaration => "procedure declaration",
            Production::ArrayType => "array type",
            Production::RecordType => "record type",
            Production::SetType => "set type",
            Production::PointerType => "pointer type",
            Production::EnumerationType => "enumeration type",
            Production::SubrangeType => "subrange type",
            Production::ProcedureType => "procedure type",
            Production::FormalParameterList => "formal parameter list",
            Production::FormalParameters => "formal parameters",
            Production::Statement => "statement",
            Production::StatementSequence => "statement sequence",
            Production::AssignmentOrCall => "assignment or procedure call",
            Production::IfStatement => "if statement",
            Production::WhileStatement => "while statement",
            Production::RepeatStatement => "repeat statement",
            Production::ForStatement => "for statement",
            Production::LoopStatement => "loop statement",
            Production::WithStatement => "with statement",
            Production::CaseStatement => "case statement",
            Production::ExitStatement => "exit statement",
            Production::ReturnStatement => "return statement",
            Production::Expression => "expression",
            Production::SimpleExpression => "simple expression",
            Production::Term => "term",
            Production::Factor => "factor",
            Production::Designator => "designator",
            Production::Qualident => "qualified identifier",
            Production::ActualParameters => "actual parameters",
        }
    }
}

/// FIRST(p), selecting the option-dependent alternate when the dialect
/// flag that gates `p` is disabled.
pub fn first(p: Production, options: &DialectOptions) -> TokenSet {
    use Token::*;
    match p {
        Production::Module => TokenSet::of(&[Definition, Implementation, Ident]),
        Production::ImportList => TokenSet::of(&[From, Import]),
        Production::Declaration => TokenSet::of(&[Const, Type, Var, Procedure]),
        Production::ConstDeclaration => TokenSet::of(&[Const]),
        Production::TypeDeclaration => TokenSet::of(&[Type]),
        Production::TypeDeclarationTail => {
            let mut toks = vec![
                Ident, Array, Record, Set, Pointer, LParen, LBracket, Procedure,
            ];
            if options.variant_records {
                // Variant (CASE-tagged) field lists are recognized as a
                // type-tail starting form in the primary set; PIM-2's
                // record types admit only plain field lists.
                toks.push(Case);
            }
            TokenSet::of(&toks)
        }
        Production::VarDeclaration => TokenSet::of(&[Var]),
        Production::ProcedureDeclaration => TokenSet::of(&[Procedure]),
        Production::ArrayType => TokenSet::of(&[Array]),
        Production::RecordType => TokenSet::of(&[Record]),
        Production::SetType => TokenSet::of(&[Set]),
        Production::PointerType => TokenSet::of(&[Pointer]),
        Production::EnumerationType => TokenSet::of(&[LParen]),
        Production::SubrangeType => TokenSet::of(&[LBracket]),
        Production::ProcedureType => TokenSet::of(&[Procedure]),
        Production::FormalParameterList => TokenSet::of(&[LParen]),
        Production::FormalParameters => {
            if options.const_parameters {
                TokenSet::of(&[Ident, Var, Const])
            } else {
                TokenSet::of(&[Ident, Var])
            }
        }
        Production::Statement => TokenSet::of(&[
            Ident, If, Case, While, Repeat, Loop, For, With, Exit, Return,
        ]),
        Production::StatementSequence => first(Production::Statement, options),
        Production::AssignmentOrCall => TokenSet::of(&[Ident]),
        Production::IfStatement => TokenSet::of(&[If]),
        Production::WhileStatement => TokenSet::of(&[While]),
        Production::RepeatStatement => TokenSet::of(&[Repeat]),
        Production::ForStatement => TokenSet::of(&[For]),
        Production::LoopStatement => TokenSet::of(&[Loop]),
        Production::WithStatement => TokenSet::of(&[With]),
        Production::CaseStatement => TokenSet::of(&[Case]),
        Production::ExitStatement => TokenSet::of(&[Exit]),
        Production::ReturnStatement => TokenSet::of(&[Return]),
        Production::Expression => first(Production::SimpleExpression, options),
        Production::SimpleExpression => {
            let mut toks = vec![Plus, Minus];
            toks.extend(first(Production::Term, options).iter());
            TokenSet::of(&toks)
        }
        Production::Term => first(Production::Factor, options),
        Production::Factor => TokenSet::of(&[
            IntegerLiteral,
            RealLiteral,
            StringLiteral,
            CharLiteral,
            Ident,
            LBrace,
            LParen,
            Not,
        ]),
        Production::Designator => TokenSet::of(&[Ident]),
        Production::Qualident => TokenSet::of(&[Ident]),
        Production::ActualParameters => TokenSet::of(&[LParen]),
    }
}

/// FOLLOW(p), again dialect-parameterized where `p` is option-dependent.
pub fn follow(p: Production, options: &DialectOptions) -> TokenSet {
    use Token::*;
    match p {
        Production::Module => TokenSet::of(&[Eof]),
        Production::ImportList => TokenSet::of(&[Const, Type, Var, Procedure, Begin, End]),
        Production::Declaration | Production::ConstDeclaration | Production::TypeDeclaration | Production::VarDeclaration => {
            TokenSet::of(&[Semicolon])
        }
        Production::TypeDeclarationTail => TokenSet::of(&[Semicolon]),
        Production::ProcedureDeclaration => TokenSet::of(&[Semicolon]),
        Production::ArrayType
        | Production::RecordType
        | Production::SetType
        | Production::PointerType
        | Production::EnumerationType
        | Production::SubrangeType
        | Production::ProcedureType => TokenSet::of(&[Semicolon, RParen, RBracket, End]),
        Production::FormalParameterList => TokenSet::of(&[Colon, Semicolon]),
        Production::FormalParameters => TokenSet::of(&[Semicolon, RParen]),
        Production::Statement => TokenSet::of(&[Semicolon, Else, Elsif, End, Until, Bar, Eof]),
        Production::StatementSequence => TokenSet::of(&[End, Else, Elsif, Until, Bar, Eof]),
        Production::AssignmentOrCall => follow(Production::Statement, options),
        Production::IfStatement
        | Production::WhileStatement
        | Production::RepeatStatement
        | Production::ForStatement
        | Production::LoopStatement
        | Production::WithStatement
        | Production::CaseStatement
        | Production::ExitStatement
        | Production::ReturnStatement => follow(Production::Statement, options),
        Production::Expression => TokenSet::of(&[
            RParen, RBracket, Comma, Then, Do, Of, Colon, DotDot, Semicolon, End, By, Eof,
        ]),
        Production::SimpleExpression => {
            let mut toks = vec![Equal, NotEqual, Less, Greater, LessEqual, GreaterEqual, In];
            toks.extend(follow(Production::Expression, options).iter());
            TokenSet::of(&toks)
        }
        Production::Term => {
            let mut toks = vec![Plus, Minus, Or];
            toks.extend(follow(Production::SimpleExpression, options).iter());
            TokenSet::of(&toks)
        }
        Production::Factor => {
            let mut toks = vec![Asterisk, Solidus, Div, Mod, And, Ampersand];
            toks.extend(follow(Production::Term, options).iter());
            TokenSet::of(&toks)
        }
        Production::Designator => {
            let mut toks = vec![Assign];
            toks.extend(follow(Production::Factor, options).iter());
            TokenSet::of(&toks)
        }
        Production::Qualident => follow(Production::Designator, options),
        Production::ActualParameters => follow(Production::Designator, options),
    }
}

/// A resync set, consulted only by the parser's panic-mode recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResyncSet {
    Module,
    Declaration,
    Type,
    FormalParameter,
    Statement,
}

impl ResyncSet {
    pub fn name(self) -> &'static str {
        match self {
            ResyncSet::Module => "module",
            ResyncSet::Declaration => "declaration",
            ResyncSet::Type => "type",
            ResyncSet::FormalParameter => "formal parameter",
            ResyncSet::Statement => "statement",
        }
    }
}

/// RESYNC(rs): the recovery set named `rs`.
pub fn resync(rs: ResyncSet) -> TokenSet {
    use Token::*;
    match rs {
        ResyncSet::Module => TokenSet::of(&[End, Eof]),
        ResyncSet::Declaration => TokenSet::of(&[Const, Type, Var, Procedure, Begin, End, Semicolon, Eof]),
        ResyncSet::Type => TokenSet::of(&[Semicolon, End, Eof]),
        ResyncSet::FormalParameter => TokenSet::of(&[RParen, Semicolon, Eof]),
        ResyncSet::Statement => TokenSet::of(&[Semicolon, End, Else, Elsif, Until, Eof]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn const_parameters_flag_selects_alternate_formal_parameters_first() {
        let with_const = DialectOptions::pim4();
        let without_const = DialectOptions::pim2();
        assert!(first(Production::FormalParameters, &with_const).element(Token::Const));
        assert!(!first(Production::FormalParameters, &without_const).element(Token::Const));
    }

    #[test]
    fn variant_records_flag_selects_alternate_type_declaration_tail_first() {
        let mut with_variants = DialectOptions::pim4();
        with_variants.variant_records = true;
        let mut without_variants = DialectOptions::pim4();
        without_variants.variant_records = false;
        assert!(first(Production::TypeDeclarationTail, &with_variants).element(Token::Case));
        assert!(!first(Production::TypeDeclarationTail, &without_variants).element(Token::Case));
    }

    #[test]
    fn statement_first_covers_all_eleven_forms() {
        let opts = DialectOptions::pim4();
        let set = first(Production::Statement, &opts);
        for t in [
            Token::Ident,
            Token::If,
            Token::Case,
            Token::While,
            Token::Repeat,
            Token::Loop,
            Token::For,
            Token::With,
            Token::Exit,
            Token::Return,
        ] {
            assert!(set.element(t), "missing {:?} from statement FIRST", t);
        }
    }

    #[test]
    fn expression_chain_first_sets_nest_correctly() {
        let opts = DialectOptions::pim4();
        let factor = first(Production::Factor, &opts);
        let term = first(Production::Term, &opts);
        let simple = first(Production::SimpleExpression, &opts);
        let expr = first(Production::Expression, &opts);
        assert!(factor.subset(&term));
        assert!(term.subset(&simple));
        assert_eq!(simple, expr);
        assert!(simple.element(Token::Plus));
        assert!(simple.element(Token::Minus));
    }

    #[test]
    fn resync_sets_always_admit_eof() {
        for rs in [
            ResyncSet::Module,
            ResyncSet::Declaration,
            ResyncSet::Type,
            ResyncSet::FormalParameter,
            ResyncSet::Statement,
        ] {
            assert!(resync(rs).element(Token::Eof));
        }
    }
}
