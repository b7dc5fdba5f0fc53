//! Parser: descida recursiva sobre os tokens do [`Lexer`].
//!
//! Produz uma árvore [`Expr`]. A precedência, da mais fraca para a mais forte:
//!
//! ```text
//! ?:  →  || or  →  && and  →  == !=  →  < <= > >= in contains startsWith endsWith matches
//!     →  + -  →  * / %  →  ! not -(unário)  →  .campo [índice] chamada()
//! ```

use std::collections::BTreeSet;

use super::lexer::{Lexer, Token, TokenKind};
use super::ExprError;
use crate::core::Value;

/// Aninhamento máximo de sub-expressões e operadores unários.
pub const MAX_DEPTH: usize = 128;

/// Funções embutidas aceitas em chamadas.
pub const BUILTINS: &[&str] = &["len", "lower", "upper", "string", "abs"];

/// Operadores unários.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Operadores binários.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Árvore sintática de uma expressão.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Value),
    Identifier(String),
    Member {
        target: Box<Expr>,
        field: String,
    },
    Index {
        target: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        function: String,
        args: Vec<Expr>,
    },
    List(Vec<Expr>),
}

impl Expr {
    /// Identificadores-raiz referenciados pela expressão (variáveis livres).
    ///
    /// Nomes de campo (`sale.price` → só `sale`) e nomes de função não contam.
    /// É esse conjunto que vira o `derived_from` de um fato inferido.
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_identifiers(&mut names);
        names
    }

    fn collect_identifiers(&self, names: &mut BTreeSet<String>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Identifier(name) => {
                names.insert(name.clone());
            }
            Expr::Member { target, .. } => target.collect_identifiers(names),
            Expr::Index { target, index } => {
                target.collect_identifiers(names);
                index.collect_identifiers(names);
            }
            Expr::Unary { operand, .. } => operand.collect_identifiers(names),
            Expr::Binary { left, right, .. } => {
                left.collect_identifiers(names);
                right.collect_identifiers(names);
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                condition.collect_identifiers(names);
                then.collect_identifiers(names);
                otherwise.collect_identifiers(names);
            }
            Expr::Call { args, .. } | Expr::List(args) => {
                for arg in args {
                    arg.collect_identifiers(names);
                }
            }
        }
    }
}

/// Parser de expressões.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Faz o parse de uma expressão completa. Sobras após a expressão são erro.
    pub fn parse(input: &str) -> Result<Expr, ExprError> {
        let tokens = Lexer::new(input).tokenize()?;
        let mut parser = Self {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.parse_conditional()?;
        if !parser.check(&TokenKind::Eof) {
            return Err(parser.unexpected("end of expression"));
        }
        Ok(expr)
    }

    fn parse_conditional(&mut self) -> Result<Expr, ExprError> {
        self.enter()?;
        let expr = self.parse_conditional_inner();
        self.depth -= 1;
        expr
    }

    fn parse_conditional_inner(&mut self) -> Result<Expr, ExprError> {
        let condition = self.parse_or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then = self.parse_conditional()?;
        self.expect(&TokenKind::Colon, "':'")?;
        let otherwise = self.parse_conditional()?;
        Ok(Expr::Conditional {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_and()?;
        while self.eat(&TokenKind::OrOr) || self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_equality()?;
        while self.eat(&TokenKind::AndAnd) || self.eat(&TokenKind::And) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                TokenKind::In => BinaryOp::In,
                TokenKind::Contains => BinaryOp::Contains,
                TokenKind::StartsWith => BinaryOp::StartsWith,
                TokenKind::EndsWith => BinaryOp::EndsWith,
                TokenKind::Matches => BinaryOp::Matches,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ExprError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        let op = match self.peek_kind() {
            TokenKind::Bang | TokenKind::Not => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => return self.parse_postfix(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary();
        self.depth -= 1;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand?),
        })
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot) {
                let field = match self.peek_kind().clone() {
                    TokenKind::Ident(name) => name,
                    _ => return Err(self.unexpected("field name")),
                };
                self.advance();
                expr = Expr::Member {
                    target: Box::new(expr),
                    field,
                };
            } else if self.eat(&TokenKind::OpenBracket) {
                let index = self.parse_conditional()?;
                self.expect(&TokenKind::CloseBracket, "']'")?;
                expr = Expr::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let token = self.peek_kind().clone();
        match token {
            TokenKind::Number(n) => {
                self.advance();
                Ok(Expr::Literal(Value::Number(n)))
            }
            TokenKind::Str(s) => {
                self.advance();
                Ok(Expr::Literal(Value::String(s)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Literal(Value::Bool(false)))
            }
            TokenKind::Nil => {
                self.advance();
                Ok(Expr::Literal(Value::Null))
            }
            TokenKind::Ident(name) => {
                let position = self.tokens[self.pos].position;
                self.advance();
                if !self.eat(&TokenKind::OpenParen) {
                    return Ok(Expr::Identifier(name));
                }
                if !BUILTINS.contains(&name.as_str()) {
                    return Err(ExprError::Syntax {
                        position,
                        message: format!("unknown function '{}'", name),
                    });
                }
                let args = self.parse_arguments(&TokenKind::CloseParen, "')'")?;
                Ok(Expr::Call {
                    function: name,
                    args,
                })
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_conditional()?;
                self.expect(&TokenKind::CloseParen, "')'")?;
                Ok(inner)
            }
            TokenKind::OpenBracket => {
                self.advance();
                let items = self.parse_arguments(&TokenKind::CloseBracket, "']'")?;
                Ok(Expr::List(items))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Lista separada por vírgulas até `close` (já consumido o delimitador de abertura).
    fn parse_arguments(&mut self, close: &TokenKind, label: &str) -> Result<Vec<Expr>, ExprError> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_conditional()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(&TokenKind::Comma, &format!("',' or {}", label))?;
        }
    }

    // ─── Helpers ─────────────────────────────────────────────

    fn enter(&mut self) -> Result<(), ExprError> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::Syntax {
                position: self.tokens[self.pos].position,
                message: format!("expression nested deeper than {} levels", MAX_DEPTH),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, label: &str) -> Result<(), ExprError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(label))
        }
    }

    fn unexpected(&self, expected: &str) -> ExprError {
        let token = &self.tokens[self.pos];
        ExprError::Syntax {
            position: token.position,
            message: format!("expected {}, found '{}'", expected, token.kind),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}
