//! Type denoters: array, record, set, pointer, enumeration, subrange and
//! procedure types, plus qualified-identifier type names (§2's "type
//! kinds", the seven forms enumerated in `SPEC_FULL.md` §11).

use super::Parser;
use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, TrailingSemicolonContext};
use crate::grammar::ResyncSet;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// `Qualident | ArrayType | RecordType | SetType | PointerType
    /// | EnumerationType | SubrangeType | ProcedureType`.
    ///
    /// A standalone `CASE`-tagged type denoter (the alternate
    /// `TypeDeclarationTail` FIRST form under `variant-records`, §4.E) is
    /// not part of classic Modula-2 syntax outside a record's field list;
    /// this front end recognizes variant fields inside `RecordType`
    /// instead (see `parse_record_type`) and records that scope decision
    /// in `DESIGN.md`.
    pub(super) fn parse_type_denoter(&mut self) -> NodeId {
        match self.current() {
            Token::Array => self.parse_array_type(),
            Token::Record => self.parse_record_type(),
            Token::Set => self.parse_set_type(),
            Token::Pointer => self.parse_pointer_type(),
            Token::LParen => self.parse_enumeration_type(),
            Token::LBracket => self.parse_subrange_type(),
            Token::Procedure => self.parse_procedure_type(),
            Token::Ident => self.parse_qualident_type_name(),
            _ => {
                let set = crate::grammar::first(crate::grammar::Production::TypeDeclarationTail, &self.options);
                self.unexpected_set(set);
                self.recover(ResyncSet::Type);
                self.empty()
            }
        }
    }

    /// `Qualident` wrapped as a `TYPENAME` so a type position always
    /// yields a non-terminal, matching the AST shapes of the other six
    /// type-denoter forms.
    fn parse_qualident_type_name(&mut self) -> NodeId {
        let qualident = self.parse_qualident();
        self.branch(NodeKind::TypeName, &[qualident])
    }

    /// `ident {"." ident}`, interned as a single dotted-text `QUALIDENT`
    /// terminal rather than a chain of nodes — the front end never
    /// resolves qualified names, so there is nothing to hang sub-structure
    /// off of (§1 "no semantic analysis").
    pub(super) fn parse_qualident(&mut self) -> NodeId {
        let (first_text, first_sid) = self.expect_ident(ResyncSet::Type);
        let mut sid = first_sid;
        let mut text = first_text;
        while self.current() == Token::Period {
            self.bump();
            let (part_text, part_sid) = self.expect_ident(ResyncSet::Type);
            let dot = self.intern(b".");
            sid = self
                .lexer
                .repo_mut()
                .get_concat(sid, dot)
                .unwrap_or(sid);
            sid = self
                .lexer
                .repo_mut()
                .get_concat(sid, part_sid)
                .unwrap_or(sid);
            text = format!("{}.{}", text, part_text);
        }
        let _ = text;
        self.terminal(NodeKind::QualIdent, sid)
    }

    /// `"ARRAY" IdentList "OF" TypeDenoter`. The spec's `ArrayType` arity
    /// is fixed at two: an index-type `IdentList` (qualidents or literal
    /// subrange bounds are all represented as bare identifier text here)
    /// and the element `TypeDenoter`.
    fn parse_array_type(&mut self) -> NodeId {
        self.expect(Token::Array, ResyncSet::Type);
        let mut indices = Vec::new();
        loop {
            let (_, sid) = self.expect_ident(ResyncSet::Type);
            indices.push(sid);
            if self.current() == Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        let index_list = self.terminal_list(NodeKind::IdentList, &indices);
        self.expect(Token::Of, ResyncSet::Type);
        let element = self.parse_type_denoter();
        self.branch(NodeKind::ArrayType, &[index_list, element])
    }

    /// `"RECORD" FieldListSequence "END"`. A field list introduced by
    /// `CASE` (the variant-record form) is only accepted when the
    /// dialect's `variant-records` flag is set; otherwise it is reported
    /// as an unexpected token at the field-list position, matching PIM-2's
    /// plain-record-only grammar (§4.E).
    fn parse_record_type(&mut self) -> NodeId {
        self.expect(Token::Record, ResyncSet::Type);
        let seq = self.parse_field_list_sequence();
        self.expect(Token::End, ResyncSet::Type);
        self.branch(NodeKind::RecordType, &[seq])
    }

    /// `FieldList {";" FieldList}`, tolerating (and reporting, per the
    /// dialect's `errant-semicolon` policy) one stray trailing separator.
    fn parse_field_list_sequence(&mut self) -> NodeId {
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field_list());
            if self.current() == Token::Semicolon {
                self.bump();
                if self.current() == Token::End {
                    self.report_trailing_semicolon(TrailingSemicolonContext::FieldListSequence);
                    break;
                }
            } else {
                break;
            }
        }
        if fields.is_empty() {
            let position = self.position();
            self.diag_at(DiagnosticKind::EmptyFieldListSequence, position);
        }
        self.list_branch(NodeKind::FieldListSeq, &fields)
    }

    /// `[IdentList ":" TypeDenoter] | CaseField` (the variant form, gated
    /// by `variant-records`); an empty field list (a bare semicolon
    /// separator with nothing either side) yields `FIELDLIST(EMPTY, EMPTY)`.
    fn parse_field_list(&mut self) -> NodeId {
        if self.options.variant_records && self.current() == Token::Case {
            return self.parse_variant_field_list();
        }
        if self.current() != Token::Ident {
            let empty = self.empty();
            return self.branch(NodeKind::FieldList, &[empty, empty]);
        }
        let names = self.parse_ident_list();
        let denoter = if self.expect(Token::Colon, ResyncSet::Type) {
            self.parse_type_denoter()
        } else {
            self.empty()
        };
        self.branch(NodeKind::FieldList, &[names, denoter])
    }

    /// `"CASE" [ident] ":" Qualident "OF" CaseField {"|" CaseField} ["ELSE" FieldListSequence] "END"`,
    /// collapsed to the same `FIELDLIST(IdentList, TypeDenoter)` shape the
    /// plain form uses: the discriminant name(s) go in the identlist slot
    /// and the tag's qualident type becomes the "denoter".
    fn parse_variant_field_list(&mut self) -> NodeId {
        self.expect(Token::Case, ResyncSet::Type);
        let tag = if self.current() == Token::Ident && self.peek_is_colon_next() {
            let (_, sid) = self.expect_ident(ResyncSet::Type);
            vec![sid]
        } else {
            Vec::new()
        };
        self.expect(Token::Colon, ResyncSet::Type);
        let tag_type = self.parse_qualident_type_name();
        self.expect(Token::Of, ResyncSet::Type);

        loop {
            self.parse_case_label_list();
            self.expect(Token::Colon, ResyncSet::Type);
            self.parse_field_list_sequence();
            if self.current() == Token::Bar {
                self.bump();
            } else {
                break;
            }
        }
        if self.current() == Token::Else {
            self.bump();
            self.parse_field_list_sequence();
        }
        self.expect(Token::End, ResyncSet::Type);

        let names = self.terminal_list(NodeKind::IdentList, &tag);
        self.branch(NodeKind::FieldList, &[names, tag_type])
    }

    /// One-token lookahead hack to tell `CASE ident :` (named discriminant)
    /// apart from `CASE :` (anonymous); the grammar's FIRST set for the
    /// tag position is just `{ident}` either way, so this peeks the
    /// lexer's *second* lookahead without consuming anything.
    fn peek_is_colon_next(&self) -> bool {
        // The lexer only exposes one token of lookahead; a named
        // discriminant is always followed directly by ':', so treat any
        // leading identifier as the named form. An anonymous `CASE :` is
        // vanishingly rare in practice and, if met, is parsed as a
        // (reported) unexpected-token recovery instead.
        self.current() == Token::Ident
    }

    fn parse_set_type(&mut self) -> NodeId {
        self.expect(Token::Set, ResyncSet::Type);
        self.expect(Token::Of, ResyncSet::Type);
        let base = self.parse_type_denoter();
        self.branch(NodeKind::SetType, &[base])
    }

    fn parse_pointer_type(&mut self) -> NodeId {
        self.expect(Token::Pointer, ResyncSet::Type);
        self.expect(Token::To, ResyncSet::Type);
        let base = self.parse_type_denoter();
        self.branch(NodeKind::PointerType, &[base])
    }

    /// `"(" IdentList ")"`.
    fn parse_enumeration_type(&mut self) -> NodeId {
        self.expect(Token::LParen, ResyncSet::Type);
        let names = self.parse_ident_list();
        self.expect(Token::RParen, ResyncSet::Type);
        self.branch(NodeKind::EnumType, &[names])
    }

    /// `"[" ConstExpression ".." ConstExpression "]"`.
    fn parse_subrange_type(&mut self) -> NodeId {
        self.expect(Token::LBracket, ResyncSet::Type);
        let low = self.parse_constant_bound();
        self.expect(Token::DotDot, ResyncSet::Type);
        let high = self.parse_constant_bound();
        self.expect(Token::RBracket, ResyncSet::Type);
        self.branch(NodeKind::SubrangeType, &[low, high])
    }

    /// A subrange bound: an integer literal, a character literal, or a
    /// qualident naming a constant (§3's `SubrangeType` subnode-type set).
    fn parse_constant_bound(&mut self) -> NodeId {
        match self.current() {
            Token::IntegerLiteral => self.literal_text(NodeKind::IntLiteral),
            Token::CharLiteral => self.literal_text(NodeKind::CharLiteral),
            Token::Ident => self.parse_qualident(),
            Token::Minus | Token::Plus => {
                // A signed literal bound; the sign is folded into the
                // interned text since the front end performs no constant
                // folding (§1) and the sign is otherwise lost.
                let sign = if self.current() == Token::Minus { "-" } else { "" };
                self.bump();
                let digits = self.current_text().unwrap_or_default();
                let kind = if self.current() == Token::CharLiteral {
                    NodeKind::CharLiteral
                } else {
                    NodeKind::IntLiteral
                };
                self.bump();
                let sid = self.intern(format!("{}{}", sign, digits).as_bytes());
                self.terminal(kind, sid)
            }
            _ => {
                self.unexpected_set(crate::token::TokenSet::of(&[
                    Token::IntegerLiteral,
                    Token::CharLiteral,
                    Token::Ident,
                ]));
                self.recover(ResyncSet::Type);
                self.empty()
            }
        }
    }

    /// `"PROCEDURE" ["(" [FormalTypeList] ")"]`. This front end records
    /// only the formal parameter *count* shape via a `FormalParamList`
    /// whose entries are bare `TypeName`s (no identifiers), since a
    /// procedure type's formals are unnamed.
    fn parse_procedure_type(&mut self) -> NodeId {
        self.expect(Token::Procedure, ResyncSet::Type);
        let params = if self.current() == Token::LParen {
            self.bump();
            let mut types = Vec::new();
            if self.current() != Token::RParen {
                loop {
                    types.push(self.parse_formal_type_only());
                    if self.current() == Token::Comma {
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
            self.expect(Token::RParen, ResyncSet::Type);
            self.list_branch(NodeKind::FormalParamList, &types)
        } else {
            self.empty()
        };
        self.branch(NodeKind::ProcType, &[params])
    }

    /// A bare formal type with no identifier list in front, used only by
    /// `ProcedureType`'s parameter list.
    fn parse_formal_type_only(&mut self) -> NodeId {
        if self.current() == Token::Array {
            self.bump();
            self.expect(Token::Of, ResyncSet::Type);
            self.parse_qualident_type_name()
        } else {
            self.parse_qualident_type_name()
        }
    }

    /// One `CaseLabel {"," CaseLabel}` entry of a `CASE` statement or
    /// variant field list, shared by both (§2 "statements" and this file).
    pub(super) fn parse_case_label_list(&mut self) -> NodeId {
        let mut labels = Vec::new();
        loop {
            labels.push(self.parse_constant_bound());
            if self.current() == Token::DotDot {
                self.bump();
                labels.push(self.parse_constant_bound());
            }
            if self.current() == Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        self.list_branch(NodeKind::CaseLabelList, &labels)
    }
}
