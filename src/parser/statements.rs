//! Statements: assignment/procedure-call, `IF`, `WHILE`, `REPEAT`, `FOR`,
//! `LOOP`, `WITH`, `CASE`, `EXIT`, `RETURN`, and the sequences that glue
//! them together (§11's eleven statement forms).

use super::Parser;
use crate::ast::{NodeId, NodeKind};
use crate::diagnostics::{DiagnosticKind, TrailingSemicolonContext};
use crate::grammar::{self, ResyncSet};
use crate::token::Token;

impl<'a> Parser<'a> {
    /// `Statement {";" Statement}`, tolerating one stray trailing
    /// separator per the dialect's `errant-semicolon` policy (§4.G).
    /// `StmtSeq` is reported as `EmptyStatementSequence` when nothing
    /// matched — the spec's `StmtSeq` arity is `≥ 0`, so the node is
    /// still built and returned, just flagged for an empty one (§7.3).
    pub(super) fn parse_statement_sequence(&mut self) -> NodeId {
        let mut stmts = Vec::new();
        loop {
            let opts = self.options;
            if !grammar::first(grammar::Production::Statement, &opts).element(self.current()) {
                break;
            }
            stmts.push(self.parse_statement());
            if self.current() == Token::Semicolon {
                self.bump();
                let follow = grammar::follow(grammar::Production::StatementSequence, &opts);
                if follow.element(self.current()) {
                    self.report_trailing_semicolon(TrailingSemicolonContext::StatementSequence);
                    break;
                }
            } else {
                break;
            }
        }
        if stmts.is_empty() {
            let position = self.position();
            self.diag_at(DiagnosticKind::EmptyStatementSequence, position);
        }
        self.list_branch(NodeKind::StmtSeq, &stmts)
    }

    pub(super) fn parse_statement(&mut self) -> NodeId {
        match self.current() {
            Token::Ident => self.parse_assignment_or_call(),
            Token::If => self.parse_if_statement(),
            Token::While => self.parse_while_statement(),
            Token::Repeat => self.parse_repeat_statement(),
            Token::For => self.parse_for_statement(),
            Token::Loop => self.parse_loop_statement(),
            Token::With => self.parse_with_statement(),
            Token::Case => self.parse_case_statement(),
            Token::Exit => self.parse_exit_statement(),
            Token::Return => self.parse_return_statement(),
            _ => {
                let set = grammar::first(grammar::Production::Statement, &self.options);
                self.unexpected_set(set);
                self.recover(ResyncSet::Statement);
                self.empty()
            }
        }
    }

    /// `Designator ":=" Expression | Designator [ActualParameters]`.
    fn parse_assignment_or_call(&mut self) -> NodeId {
        let designator = self.parse_designator();
        if self.current() == Token::Assign {
            self.bump();
            let rhs = self.parse_expression();
            self.branch(NodeKind::Assignment, &[designator, rhs])
        } else {
            let params = if self.current() == Token::LParen {
                self.parse_actual_parameters()
            } else {
                self.empty()
            };
            self.branch(NodeKind::ProcCall, &[designator, params])
        }
    }

    /// `"IF" Expr "THEN" StmtSeq {"ELSIF" Expr "THEN" StmtSeq} ["ELSE" StmtSeq] "END"`,
    /// flattened to `IFSTMT(cond, body, [cond, body]*, [elseBody])`.
    fn parse_if_statement(&mut self) -> NodeId {
        self.expect(Token::If, ResyncSet::Statement);
        let cond = self.parse_expression();
        self.expect(Token::Then, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        let mut parts = vec![cond, body];
        while self.current() == Token::Elsif {
            self.bump();
            let c = self.parse_expression();
            self.expect(Token::Then, ResyncSet::Statement);
            let b = self.parse_statement_sequence();
            parts.push(c);
            parts.push(b);
        }
        if self.current() == Token::Else {
            self.bump();
            let b = self.parse_statement_sequence();
            parts.push(b);
        }
        self.expect(Token::End, ResyncSet::Statement);
        self.list_branch(NodeKind::IfStmt, &parts)
    }

    fn parse_while_statement(&mut self) -> NodeId {
        self.expect(Token::While, ResyncSet::Statement);
        let cond = self.parse_expression();
        self.expect(Token::Do, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        self.expect(Token::End, ResyncSet::Statement);
        self.branch(NodeKind::WhileStmt, &[cond, body])
    }

    /// `"REPEAT" StmtSeq "UNTIL" Expr`, stored as `REPEATSTMT(cond, body)`
    /// — condition first — to match the validator's position-1 `StmtSeq`
    /// restriction even though the condition is read last from source.
    fn parse_repeat_statement(&mut self) -> NodeId {
        self.expect(Token::Repeat, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        self.expect(Token::Until, ResyncSet::Statement);
        let cond = self.parse_expression();
        self.branch(NodeKind::RepeatStmt, &[cond, body])
    }

    /// `"FOR" ident ":=" Expr "TO" Expr ["BY" ConstExpr] "DO" StmtSeq "END"`.
    fn parse_for_statement(&mut self) -> NodeId {
        self.expect(Token::For, ResyncSet::Statement);
        let (_, sid) = self.expect_ident(ResyncSet::Statement);
        let ident = self.ident_node(sid);
        self.expect(Token::Assign, ResyncSet::Statement);
        let from = self.parse_expression();
        self.expect(Token::To, ResyncSet::Statement);
        let to = self.parse_expression();
        let mut parts = vec![ident, from, to];
        if self.current() == Token::By {
            self.bump();
            parts.push(self.parse_constant_bound());
        }
        self.expect(Token::Do, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        parts.push(body);
        self.expect(Token::End, ResyncSet::Statement);
        self.list_branch(NodeKind::ForStmt, &parts)
    }

    fn parse_loop_statement(&mut self) -> NodeId {
        self.expect(Token::Loop, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        self.expect(Token::End, ResyncSet::Statement);
        self.branch(NodeKind::LoopStmt, &[body])
    }

    fn parse_with_statement(&mut self) -> NodeId {
        self.expect(Token::With, ResyncSet::Statement);
        let designator = self.parse_designator();
        self.expect(Token::Do, ResyncSet::Statement);
        let body = self.parse_statement_sequence();
        self.expect(Token::End, ResyncSet::Statement);
        self.branch(NodeKind::WithStmt, &[designator, body])
    }

    /// `"CASE" Expr "OF" CaseArm {"|" CaseArm} ["ELSE" StmtSeq] "END"`,
    /// flattened to `CASESTMT(selector, [labels, body]*, [elseBody])`.
    fn parse_case_statement(&mut self) -> NodeId {
        self.expect(Token::Case, ResyncSet::Statement);
        let selector = self.parse_expression();
        self.expect(Token::Of, ResyncSet::Statement);
        let mut parts = vec![selector];
        loop {
            let labels = self.parse_case_label_list();
            self.expect(Token::Colon, ResyncSet::Statement);
            let body = self.parse_statement_sequence();
            parts.push(labels);
            parts.push(body);
            if self.current() == Token::Bar {
                self.bump();
            } else {
                break;
            }
        }
        if self.current() == Token::Else {
            self.bump();
            parts.push(self.parse_statement_sequence());
        }
        self.expect(Token::End, ResyncSet::Statement);
        self.list_branch(NodeKind::CaseStmt, &parts)
    }

    fn parse_exit_statement(&mut self) -> NodeId {
        self.expect(Token::Exit, ResyncSet::Statement);
        self.branch(NodeKind::ExitStmt, &[])
    }

    /// `"RETURN" [Expression]`.
    fn parse_return_statement(&mut self) -> NodeId {
        self.expect(Token::Return, ResyncSet::Statement);
        let opts = self.options;
        let value = if grammar::first(grammar::Production::Expression, &opts).element(self.current()) {
            self.parse_expression()
        } else {
            self.empty()
        };
        self.branch(NodeKind::ReturnStmt, &[value])
    }
}
