//! Lexer: transforma o texto de uma expressão em tokens.
//!
//! Reconhece números, strings (aspas duplas ou simples), identificadores,
//! palavras-chave (`true`, `and`, `matches`, ...) e operadores.

use super::ExprError;

/// Token produzido pelo lexer.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Posição (em caracteres, 0-based) do início do token.
    pub position: usize,
}

/// Tipos de token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literais e nomes
    Number(f64),
    Str(String),
    Ident(String),

    // Palavras-chave
    True,
    False,
    Nil,
    And,
    Or,
    Not,
    In,
    Contains,
    StartsWith,
    EndsWith,
    Matches,

    // Operadores
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Question,
    Colon,

    // Estrutura
    Dot,
    Comma,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,

    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "\"{}\"", s),
            Self::Ident(name) => write!(f, "{}", name),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Nil => write!(f, "nil"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::In => write!(f, "in"),
            Self::Contains => write!(f, "contains"),
            Self::StartsWith => write!(f, "startsWith"),
            Self::EndsWith => write!(f, "endsWith"),
            Self::Matches => write!(f, "matches"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Bang => write!(f, "!"),
            Self::EqEq => write!(f, "=="),
            Self::NotEq => write!(f, "!="),
            Self::Lt => write!(f, "<"),
            Self::LtEq => write!(f, "<="),
            Self::Gt => write!(f, ">"),
            Self::GtEq => write!(f, ">="),
            Self::AndAnd => write!(f, "&&"),
            Self::OrOr => write!(f, "||"),
            Self::Question => write!(f, "?"),
            Self::Colon => write!(f, ":"),
            Self::Dot => write!(f, "."),
            Self::Comma => write!(f, ","),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::OpenBracket => write!(f, "["),
            Self::CloseBracket => write!(f, "]"),
            Self::Eof => write!(f, "end of input"),
        }
    }
}

/// Lexer de expressões.
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokeniza a entrada inteira, terminando sempre com [`TokenKind::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, ExprError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.input.len() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    position: self.pos,
                });
                break;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, ExprError> {
        let ch = self.input[self.pos];
        let position = self.pos;

        // Operadores de dois caracteres primeiro
        let two = match (ch, self.peek_at(1)) {
            ('=', Some('=')) => Some(TokenKind::EqEq),
            ('!', Some('=')) => Some(TokenKind::NotEq),
            ('<', Some('=')) => Some(TokenKind::LtEq),
            ('>', Some('=')) => Some(TokenKind::GtEq),
            ('&', Some('&')) => Some(TokenKind::AndAnd),
            ('|', Some('|')) => Some(TokenKind::OrOr),
            _ => None,
        };
        if let Some(kind) = two {
            self.pos += 2;
            return Ok(Token { kind, position });
        }

        let single = match ch {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Star),
            '/' => Some(TokenKind::Slash),
            '%' => Some(TokenKind::Percent),
            '!' => Some(TokenKind::Bang),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '?' => Some(TokenKind::Question),
            ':' => Some(TokenKind::Colon),
            '.' if !self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => Some(TokenKind::Dot),
            ',' => Some(TokenKind::Comma),
            '(' => Some(TokenKind::OpenParen),
            ')' => Some(TokenKind::CloseParen),
            '[' => Some(TokenKind::OpenBracket),
            ']' => Some(TokenKind::CloseBracket),
            _ => None,
        };
        if let Some(kind) = single {
            self.pos += 1;
            return Ok(Token { kind, position });
        }

        match ch {
            '"' | '\'' => self.read_string(ch),
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_alphabetic() || c == '_' => Ok(self.read_identifier_or_keyword()),
            _ => Err(ExprError::Syntax {
                position,
                message: format!("unexpected character '{}'", ch),
            }),
        }
    }

    fn read_string(&mut self, quote: char) -> Result<Token, ExprError> {
        let position = self.pos;
        self.pos += 1; // aspa de abertura

        let mut text = String::new();
        while self.pos < self.input.len() && self.input[self.pos] != quote {
            if self.input[self.pos] == '\\' {
                if let Some(escaped) = self.peek_at(1) {
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += 2;
                    continue;
                }
            }
            text.push(self.input[self.pos]);
            self.pos += 1;
        }

        if self.pos >= self.input.len() {
            return Err(ExprError::Syntax {
                position,
                message: "unterminated string literal".into(),
            });
        }

        self.pos += 1; // aspa de fechamento
        Ok(Token {
            kind: TokenKind::Str(text),
            position,
        })
    }

    fn read_number(&mut self) -> Result<Token, ExprError> {
        let position = self.pos;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_ascii_digit() || self.input[self.pos] == '.' || self.input[self.pos] == '_')
        {
            if self.input[self.pos] != '_' {
                text.push(self.input[self.pos]);
            }
            self.pos += 1;
        }

        text.parse::<f64>()
            .map(|n| Token {
                kind: TokenKind::Number(n),
                position,
            })
            .map_err(|_| ExprError::Syntax {
                position,
                message: format!("invalid number '{}'", text),
            })
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let position = self.pos;
        let mut text = String::new();

        while self.pos < self.input.len()
            && (self.input[self.pos].is_alphanumeric() || self.input[self.pos] == '_')
        {
            text.push(self.input[self.pos]);
            self.pos += 1;
        }

        let kind = match text.as_str() {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "nil" => TokenKind::Nil,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "in" => TokenKind::In,
            "contains" => TokenKind::Contains,
            "startsWith" => TokenKind::StartsWith,
            "endsWith" => TokenKind::EndsWith,
            "matches" => TokenKind::Matches,
            _ => TokenKind::Ident(text),
        };

        Token { kind, position }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.input.len() && self.input[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }
}
