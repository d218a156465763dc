//! CONST/TYPE/VAR/PROCEDURE declarations and formal parameter lists.

use super::Parser;
use crate::ast::NodeKind;
use crate::diagnostics::TrailingSemicolonContext;
use crate::grammar::ResyncSet;
use crate::symtab::SymbolKind;
use crate::token::Token;

impl<'a> Parser<'a> {
    /// `CONST {ident "=" ConstExpression ";"}`. Each item becomes its own
    /// `CONSTDEF` sibling in the enclosing declaration list.
    pub(super) fn parse_const_declaration(&mut self) -> Vec<crate::ast::NodeId> {
        self.expect(Token::Const, ResyncSet::Declaration);
        let mut out = Vec::new();
        while self.current() == Token::Ident {
            let position = self.position();
            let (text, sid) = self.expect_ident(ResyncSet::Declaration);
            let name = self.ident_node(sid);
            self.expect(Token::Equal, ResyncSet::Declaration);
            let value = self.parse_expression();
            self.expect(Token::Semicolon, ResyncSet::Declaration);
            let node = self.branch(NodeKind::ConstDef, &[name, value]);
            self.declare(sid, &text, SymbolKind::Const, None, Some(node), position);
            out.push(node);
        }
        out
    }

    /// `TYPE {ident "=" TypeDenoter ";"}`.
    pub(super) fn parse_type_declaration(&mut self) -> Vec<crate::ast::NodeId> {
        self.expect(Token::Type, ResyncSet::Declaration);
        let mut out = Vec::new();
        while self.current() == Token::Ident {
            let position = self.position();
            let (text, sid) = self.expect_ident(ResyncSet::Declaration);
            let name = self.ident_node(sid);
            self.expect(Token::Equal, ResyncSet::Declaration);
            let denoter = self.parse_type_denoter();
            self.expect(Token::Semicolon, ResyncSet::Declaration);
            let node = self.branch(NodeKind::TypeDef, &[name, denoter]);
            self.declare(sid, &text, SymbolKind::Type, None, Some(node), position);
            out.push(node);
        }
        out
    }

    /// `VAR {IdentList ":" TypeDenoter ";"}`.
    pub(super) fn parse_var_declaration(&mut self) -> Vec<crate::ast::NodeId> {
        self.expect(Token::Var, ResyncSet::Declaration);
        let mut out = Vec::new();
        while self.current() == Token::Ident {
            let start = self.position();
            let idents = self.parse_ident_list_with_positions();
            self.expect(Token::Colon, ResyncSet::Declaration);
            let denoter = self.parse_type_denoter();
            self.expect(Token::Semicolon, ResyncSet::Declaration);
            let list_node = self.terminal_list(NodeKind::IdentList, &idents.iter().map(|(_, _, sid)| *sid).collect::<Vec<_>>());
            let node = self.branch(NodeKind::VarDecl, &[list_node, denoter]);
            for (text, position, sid) in &idents {
                self.declare(*sid, text, SymbolKind::Var, None, Some(node), if idents.len() == 1 { *position } else { start });
            }
            out.push(node);
        }
        out
    }

    /// Like [`Parser::parse_ident_list`] but also returns each name's own
    /// source position, needed so VAR declarations can report a duplicate
    /// at the offending identifier rather than at the list's start.
    fn parse_ident_list_with_positions(&mut self) -> Vec<(String, crate::diagnostics::Position, crate::strings::StringId)> {
        let mut out = Vec::new();
        loop {
            let position = self.position();
            let (text, sid) = self.expect_ident(ResyncSet::Declaration);
            if !text.is_empty() {
                out.push((text, position, sid));
            }
            if self.current() == Token::Comma {
                self.bump();
            } else {
                break;
            }
        }
        out
    }

    /// `PROCEDURE ident [FormalParameterList] ";" DefList [BEGIN StmtSeq] END ident`.
    pub(super) fn parse_procedure_declaration(&mut self) -> crate::ast::NodeId {
        self.expect(Token::Procedure, ResyncSet::Declaration);
        let position = self.position();
        let (text, sid) = self.expect_ident(ResyncSet::Declaration);
        let name = self.ident_node(sid);

        let params = if self.current() == Token::LParen {
            self.parse_formal_parameter_list()
        } else {
            self.empty()
        };
        self.expect(Token::Semicolon, ResyncSet::Declaration);

        self.open_scope(sid);
        let body_decls = self.parse_definition_list();
        let body_stmts = if self.current() == Token::Begin {
            self.bump();
            self.parse_statement_sequence()
        } else {
            self.empty()
        };
        self.close_scope(sid);

        self.expect(Token::End, ResyncSet::Declaration);
        self.expect_matching_end_name(&text);
        self.expect(Token::Semicolon, ResyncSet::Declaration);

        let node = self.branch(NodeKind::ProcDecl, &[name, params, body_decls, body_stmts]);
        self.declare(sid, &text, SymbolKind::Procedure, None, Some(node), position);
        node
    }

    /// `"(" [FormalParameter {";" FormalParameter}] ")" [":" Qualident]`.
    pub(super) fn parse_formal_parameter_list(&mut self) -> crate::ast::NodeId {
        self.expect(Token::LParen, ResyncSet::FormalParameter);
        let mut params = Vec::new();
        if self.current() != Token::RParen {
            loop {
                params.push(self.parse_formal_parameter());
                if self.current() == Token::Semicolon {
                    self.bump();
                    if self.current() == Token::RParen {
                        self.report_trailing_semicolon(TrailingSemicolonContext::FormalParameterList);
                        break;
                    }
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, ResyncSet::FormalParameter);

        if self.current() == Token::Colon {
            self.bump();
            let (_, sid) = self.expect_ident(ResyncSet::Declaration);
            let qid = self.terminal(NodeKind::QualIdent, sid);
            let ret = self.branch(NodeKind::TypeName, &[qid]);
            params.push(ret);
        }

        self.list_branch(NodeKind::FormalParamList, &params)
    }

    /// `["VAR" | "CONST"] IdentList ":" FormalType`, the `CONST` mode
    /// gated by the `const-parameters` dialect flag (§4.E).
    fn parse_formal_parameter(&mut self) -> crate::ast::NodeId {
        let mode_text: &[u8] = if self.current() == Token::Var {
            self.bump();
            b"VAR"
        } else if self.options.const_parameters && self.current() == Token::Const {
            self.bump();
            b"CONST"
        } else {
            b""
        };
        let mode_sid = self.intern(mode_text);
        let mode_node = self.terminal_list(NodeKind::Options, &[mode_sid]);

        let idents = self.parse_ident_list();
        let ty = if self.expect(Token::Colon, ResyncSet::FormalParameter) {
            self.parse_formal_type()
        } else {
            self.empty()
        };
        self.branch(NodeKind::FormalParam, &[idents, mode_node, ty])
    }

    /// `"ARRAY" "OF" FormalType | TypeDenoter`, a formal parameter's type
    /// position, which additionally allows the open-array form.
    fn parse_formal_type(&mut self) -> crate::ast::NodeId {
        if self.current() == Token::Array {
            self.bump();
            self.expect(Token::Of, ResyncSet::FormalParameter);
            let element = self.parse_formal_type();
            let empty_indices = self.terminal_list(NodeKind::IdentList, &[]);
            self.branch(NodeKind::ArrayType, &[empty_indices, element])
        } else {
            self.parse_type_denoter()
        }
    }
}
