//! The expression precedence chain: expression → simple expression → term
//! → factor → designator (§11's "full expression precedence chain").

use super::Parser;
use crate::ast::{NodeId, NodeKind};
use crate::grammar::{self, ResyncSet};
use crate::token::Token;

const RELATIONAL: &[Token] = &[
    Token::Equal,
    Token::NotEqual,
    Token::Less,
    Token::Greater,
    Token::LessEqual,
    Token::GreaterEqual,
    Token::In,
];

const ADDING: &[Token] = &[Token::Plus, Token::Minus, Token::Or];
const MULTIPLYING: &[Token] = &[
    Token::Asterisk,
    Token::Solidus,
    Token::Div,
    Token::Mod,
    Token::And,
    Token::Ampersand,
];

impl<'a> Parser<'a> {
    /// Intern the current lookahead's own lexeme as an operator's text,
    /// falling back to the token's canonical name for synonym tokens
    /// (`&`/`~`) whose lexeme would otherwise read oddly in a trace.
    fn operator_node(&mut self) -> NodeId {
        let text = self.current_text().unwrap_or_else(|| self.current().name().to_string());
        let sid = self.intern(text.as_bytes());
        self.bump();
        self.ident_node(sid)
    }

    /// `SimpleExpression [RelationalOp SimpleExpression]`.
    pub(super) fn parse_expression(&mut self) -> NodeId {
        let left = self.parse_simple_expression();
        if RELATIONAL.contains(&self.current()) {
            let op = self.operator_node();
            let right = self.parse_simple_expression();
            self.branch(NodeKind::BinaryExpr, &[left, op, right])
        } else {
            left
        }
    }

    /// `["+"|"-"] Term {("+"|"-"|"OR") Term}`.
    pub(super) fn parse_simple_expression(&mut self) -> NodeId {
        let mut left = if matches!(self.current(), Token::Plus | Token::Minus) {
            let op = self.operator_node();
            let operand = self.parse_term();
            self.branch(NodeKind::UnaryExpr, &[op, operand])
        } else {
            self.parse_term()
        };
        while ADDING.contains(&self.current()) {
            let op = self.operator_node();
            let right = self.parse_term();
            left = self.branch(NodeKind::BinaryExpr, &[left, op, right]);
        }
        left
    }

    /// `Factor {("*"|"/"|"DIV"|"MOD"|"AND"|"&") Factor}`.
    pub(super) fn parse_term(&mut self) -> NodeId {
        let mut left = self.parse_factor();
        while MULTIPLYING.contains(&self.current()) {
            let op = self.operator_node();
            let right = self.parse_factor();
            left = self.branch(NodeKind::BinaryExpr, &[left, op, right]);
        }
        left
    }

    /// `Number | string | Set | Designator [ActualParameters] | "(" Expression ")" | "NOT" Factor`.
    pub(super) fn parse_factor(&mut self) -> NodeId {
        match self.current() {
            Token::IntegerLiteral => self.literal_text(NodeKind::IntLiteral),
            Token::RealLiteral => self.literal_text(NodeKind::RealLiteral),
            Token::StringLiteral => self.literal_text(NodeKind::QuotedLiteral),
            Token::CharLiteral => self.literal_text(NodeKind::CharLiteral),
            Token::LParen => {
                self.bump();
                let inner = self.parse_expression();
                self.expect(Token::RParen, ResyncSet::Statement);
                inner
            }
            Token::LBrace => self.parse_set_expression(),
            Token::Not => {
                let op = self.operator_node();
                let operand = self.parse_factor();
                self.branch(NodeKind::UnaryExpr, &[op, operand])
            }
            Token::Ident => {
                let designator = self.parse_designator();
                if self.current() == Token::LParen {
                    let params = self.parse_actual_parameters();
                    self.list_branch(NodeKind::Designator, &[designator, params])
                } else {
                    designator
                }
            }
            _ => {
                let set = grammar::first(grammar::Production::Factor, &self.options);
                self.unexpected_set(set);
                self.recover(ResyncSet::Statement);
                self.empty()
            }
        }
    }

    /// `"{" [Element {"," Element}] "}"`, each `Element` being a single
    /// expression or a `lo ".." hi` range. Ranges are folded into a
    /// `BINEXPR(lo, ".." , hi)` rather than a `SUBRANGETYPE` node, since
    /// set-range bounds are general expressions here (unlike a type's
    /// subrange bounds, which `SUBRANGETYPE`'s validator restricts to
    /// literals and qualidents, §3).
    fn parse_set_expression(&mut self) -> NodeId {
        self.expect(Token::LBrace, ResyncSet::Statement);
        let mut elems = Vec::new();
        if self.current() != Token::RBrace {
            loop {
                let lo = self.parse_expression();
                let elem = if self.current() == Token::DotDot {
                    self.bump();
                    let hi = self.parse_expression();
                    let dotdot = self.intern(b"..");
                    let op = self.ident_node(dotdot);
                    self.branch(NodeKind::BinaryExpr, &[lo, op, hi])
                } else {
                    lo
                };
                elems.push(elem);
                if self.current() == Token::Comma {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RBrace, ResyncSet::Statement);
        self.list_branch(NodeKind::SetExpr, &elems)
    }

    /// `ident {"." ident | "[" ExpList "]" | "^"}`. Pure designator chain;
    /// callers that also need a trailing `ActualParameters` (function
    /// calls, procedure calls) append it themselves, since a bare
    /// designator and a call share no common suffix set.
    pub(super) fn parse_designator(&mut self) -> NodeId {
        let (_, sid) = self.expect_ident(ResyncSet::Statement);
        let mut parts = vec![self.ident_node(sid)];
        loop {
            match self.current() {
                Token::Period => {
                    self.bump();
                    let (_, field_sid) = self.expect_ident(ResyncSet::Statement);
                    parts.push(self.ident_node(field_sid));
                }
                Token::LBracket => {
                    self.bump();
                    let mut indices = vec![self.parse_expression()];
                    while self.current() == Token::Comma {
                        self.bump();
                        indices.push(self.parse_expression());
                    }
                    self.expect(Token::RBracket, ResyncSet::Statement);
                    parts.push(self.list_branch(NodeKind::ActualParams, &indices));
                }
                Token::Caret => {
                    self.bump();
                    let marker = self.intern(b"^");
                    parts.push(self.terminal(NodeKind::Ident, marker));
                }
                _ => break,
            }
        }
        self.list_branch(NodeKind::Designator, &parts)
    }

    /// `"(" [Expression {"," Expression}] ")"`.
    pub(super) fn parse_actual_parameters(&mut self) -> NodeId {
        self.expect(Token::LParen, ResyncSet::Statement);
        let mut args = Vec::new();
        if self.current() != Token::RParen {
            args.push(self.parse_expression());
            while self.current() == Token::Comma {
                self.bump();
                args.push(self.parse_expression());
            }
        }
        self.expect(Token::RParen, ResyncSet::Statement);
        self.list_branch(NodeKind::ActualParams, &args)
    }
}
