//! ソースコード文字列をトークンのシーケンスに変換する字句解析器(Lexer)。
//!
//! 不正な文字や閉じられていないリテラルに出会っても走査は中断せず、
//! 診断を記録してそのまま続行する。

use crate::error::Diagnostic;
use crate::span::Span;
use crate::token::{LiteralValue, Token, TokenKind};
use tracing::{debug, trace};

/// 字句解析の結果。診断があってもトークン列は常に`Eof`で終端される。
#[derive(Debug, Clone)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// 字句解析器
pub struct Lexer<'a> {
    source: &'a str,
    /// 現在の字句の開始位置 (バイトオフセット)
    start: usize,
    /// 次に読む文字の位置 (バイトオフセット)
    current: usize,
    line: usize,
    column: usize,
    start_span: Span,
    previous: Option<char>,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    /// 新しいLexerを生成する
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            start: 0,
            current: 0,
            line: 1,
            column: 1,
            start_span: Span::default(),
            previous: None,
            tokens: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// ソースコード全体をトークンに変換する
    pub fn tokenize_all(mut self) -> LexOutput {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_span = self.span();
            self.scan_token();
        }

        let eof_span = self.span();
        self.tokens
            .push(Token::new(TokenKind::Eof, "", None, eof_span));
        debug!(
            tokens = self.tokens.len(),
            diagnostics = self.diagnostics.len(),
            "lexing finished"
        );

        LexOutput {
            tokens: self.tokens,
            diagnostics: self.diagnostics,
        }
    }

    /// 次の1トークンを解析する
    fn scan_token(&mut self) {
        let Some(c) = self.next_char() else {
            return;
        };

        match c {
            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '{' => self.add_token(TokenKind::LeftBrace),
            '}' => self.add_token(TokenKind::RightBrace),
            ',' => self.add_token(TokenKind::Comma),
            '.' => self.add_token(TokenKind::Dot),
            '-' => self.add_token(TokenKind::Minus),
            '+' => self.add_token(TokenKind::Plus),
            '*' => self.add_token(TokenKind::Star),
            '%' => self.add_token(TokenKind::Percent),
            ':' => self.add_token(TokenKind::Colon),
            ';' => self.add_token(TokenKind::Semicolon),

            // 1文字 or 2文字の演算子 (最長一致)
            '!' => {
                let kind = if self.matches('=') {
                    TokenKind::BangEqual
                } else {
                    TokenKind::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.matches('=') {
                    TokenKind::EqualEqual
                } else {
                    TokenKind::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.matches('=') {
                    TokenKind::LessEqual
                } else {
                    TokenKind::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.matches('=') {
                    TokenKind::GreaterEqual
                } else {
                    TokenKind::Greater
                };
                self.add_token(kind);
            }
            '&' => {
                if self.matches('&') {
                    self.add_token(TokenKind::AndAnd);
                } else {
                    self.report("Unexpected character");
                }
            }
            '|' => {
                if self.matches('|') {
                    self.add_token(TokenKind::OrOr);
                } else {
                    self.report("Unexpected character");
                }
            }

            // コメントまたは除算
            '/' => {
                if self.matches('/') {
                    self.consume_line_comment();
                } else if self.matches('*') {
                    self.consume_block_comment();
                } else {
                    self.add_token(TokenKind::Slash);
                }
            }

            ' ' | '\r' | '\t' | '\n' => {}

            '"' => self.consume_string(),
            c if c.is_ascii_digit() => self.consume_number(),
            c if is_ident_start(c) => self.consume_identifier(),

            _ => self.report("Unexpected character"),
        }
    }

    // --- ヘルパー関数 ---

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.source[self.current..].chars().next()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.previous = Some(c);
        Some(c)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.current..].chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        self.source[self.current..].chars().nth(1)
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.next_char();
            true
        } else {
            false
        }
    }

    fn report(&mut self, message: &str) {
        self.diagnostics
            .push(Diagnostic::lexical(message, self.span()));
    }

    fn add_token(&mut self, kind: TokenKind) {
        self.add_literal_token(kind, None);
    }

    fn add_literal_token(&mut self, kind: TokenKind, literal: Option<LiteralValue>) {
        let lexeme = &self.source[self.start..self.current];
        trace!(?kind, lexeme, line = self.start_span.line, "token");
        self.tokens
            .push(Token::new(kind, lexeme, literal, self.start_span));
    }

    fn consume_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.next_char();
        }
    }

    /// `/* ... */` を読み飛ばす。コメントは入れ子にできる。
    fn consume_block_comment(&mut self) {
        let mut depth = 1usize;
        while depth > 0 {
            match (self.peek(), self.peek_next()) {
                (None, _) => {
                    self.report("Unterminated block comment.");
                    return;
                }
                (Some('/'), Some('*')) => {
                    self.next_char();
                    self.next_char();
                    depth += 1;
                }
                (Some('*'), Some('/')) => {
                    self.next_char();
                    self.next_char();
                    depth -= 1;
                }
                _ => {
                    self.next_char();
                }
            }
        }
    }

    /// 文字列リテラル。`\"` は文字列を閉じないが、エスケープの解釈はしない。
    fn consume_string(&mut self) {
        loop {
            match self.peek() {
                None => {
                    self.report("Unterminated string.");
                    return;
                }
                Some('"') if self.previous != Some('\\') => break,
                Some(_) => {
                    self.next_char();
                }
            }
        }

        self.next_char(); // 閉じる `"` を消費
        let value = self.source[self.start + 1..self.current - 1].to_string();
        self.add_literal_token(TokenKind::String, Some(LiteralValue::Str(value)));
    }

    fn consume_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
        }

        // 小数部は `.` の直後に数字が続く場合のみ
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.next_char();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.next_char();
            }
        }

        match self.source[self.start..self.current].parse::<f64>() {
            Ok(value) => {
                self.add_literal_token(TokenKind::Number, Some(LiteralValue::Number(value)))
            }
            Err(_) => self.report("Invalid number literal."),
        }
    }

    fn consume_identifier(&mut self) {
        while self.peek().is_some_and(is_ident_continue) {
            self.next_char();
        }

        let text = &self.source[self.start..self.current];
        match TokenKind::from_keyword(text) {
            Some(TokenKind::True) => {
                self.add_literal_token(TokenKind::True, Some(LiteralValue::Bool(true)))
            }
            Some(TokenKind::False) => {
                self.add_literal_token(TokenKind::False, Some(LiteralValue::Bool(false)))
            }
            Some(kind) => self.add_token(kind),
            None => self.add_token(TokenKind::Identifier),
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
