//! 字句解析の結果であるトークンの種類を定義します。

use crate::span::Span;
use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TokenKind {
    // Symbols
    LeftParen,  // (
    RightParen, // )
    LeftBrace,  // {
    RightBrace, // }
    Comma,      // ,
    Dot,        // .
    Colon,      // :
    Semicolon,  // ;

    // Operators
    Minus,   // -
    Plus,    // +
    Star,    // *
    Slash,   // /
    Percent, // %

    // Comparison / Logical Operators
    Bang,         // !
    BangEqual,    // !=
    Equal,        // =
    EqualEqual,   // ==
    Greater,      // >
    GreaterEqual, // >=
    Less,         // <
    LessEqual,    // <=
    AndAnd,       // &&
    OrOr,         // ||

    // Identifier and Literals
    Identifier,
    String,
    Number,

    // Keywords
    Val,
    Var,
    Fun,
    If,
    Else,
    Do,
    While,
    Print,
    PrintLn,
    Return,
    Break,
    True,
    False,
    Null,

    Eof,
}

impl TokenKind {
    /// 文字列がキーワードに一致する場合、対応するTokenKindを返す
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "val" => Some(TokenKind::Val),
            "var" => Some(TokenKind::Var),
            "fun" => Some(TokenKind::Fun),
            "if" => Some(TokenKind::If),
            "else" => Some(TokenKind::Else),
            "do" => Some(TokenKind::Do),
            "while" => Some(TokenKind::While),
            "print" => Some(TokenKind::Print),
            "printLn" => Some(TokenKind::PrintLn),
            "return" => Some(TokenKind::Return),
            "break" => Some(TokenKind::Break),
            "true" => Some(TokenKind::True),
            "false" => Some(TokenKind::False),
            "null" => Some(TokenKind::Null),
            _ => None,
        }
    }

    /// 文や宣言の先頭になり得るトークンかどうか。パニックモード回復の同期点に使う。
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Val
                | TokenKind::Var
                | TokenKind::Fun
                | TokenKind::If
                | TokenKind::Do
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::PrintLn
        )
    }
}

/// リテラルトークンの値
#[derive(Debug, PartialEq, Clone)]
pub enum LiteralValue {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// 字句解析器が生成する1つのトークン。生成後は変更されない。
#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<LiteralValue>,
    pub span: Span,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        lexeme: impl Into<String>,
        literal: Option<LiteralValue>,
        span: Span,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{:?} {} {:?}", self.kind, self.lexeme, literal),
            None => write!(f, "{:?} {}", self.kind, self.lexeme),
        }
    }
}
