//! コンパイル処理中に発生するエラーと診断情報を定義します。

use crate::span::Span;
use crate::token::{Token, TokenKind};
use std::fmt;
use thiserror::Error;

/// 診断がどの段階で発生したか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
}

/// 診断メッセージ中の位置ヒント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// 字句解析エラー (ヒントなし)
    None,
    /// 入力の終端
    End,
    /// 特定の字句
    Lexeme(String),
}

impl Location {
    pub fn of(token: &Token) -> Self {
        if token.kind == TokenKind::Eof {
            Location::End
        } else {
            Location::Lexeme(token.lexeme.clone())
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::None => Ok(()),
            Location::End => write!(f, "at end"),
            Location::Lexeme(lexeme) => write!(f, "at '{}'", lexeme),
        }
    }
}

/// 行番号付きの診断情報。`(<line>) Error <hint>: <message>` の形式で表示される。
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub span: Span,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn lexical(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::Lexical,
            span,
            location: Location::None,
            message: message.into(),
        }
    }

    pub fn syntax(token: &Token, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Syntax,
            span: token.span,
            location: Location::of(token),
            message: message.into(),
        }
    }

    pub fn semantic(token: &Token, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Semantic,
            span: token.span,
            location: Location::of(token),
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) Error {}: {}",
            self.span.line, self.location, self.message
        )
    }
}

/// ライブラリ全体で発生しうるエラーの集約
#[derive(Debug, Error)]
pub enum LangError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Compile(#[from] CompileError),
}

/// 字句解析・構文解析で収集された診断の集まり
#[derive(Debug, Clone, Error)]
pub struct ParseError {
    pub diagnostics: Vec<Diagnostic>,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.diagnostics.is_empty() {
            return write!(f, "no diagnostics emitted");
        }
        for (idx, diagnostic) in self.diagnostics.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

impl ParseError {
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

/// コード生成を中断させる致命的なエラー (未知の型名など)
#[derive(Debug, Clone, Error)]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub location: Location,
    /// 中断までに報告済みだった診断
    pub reported: Vec<Diagnostic>,
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.reported {
            writeln!(f, "{}", diagnostic)?;
        }
        write!(f, "({}) Error {}: {}", self.span.line, self.location, self.message)
    }
}

impl CompileError {
    pub fn at(token: &Token, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: token.span,
            location: Location::of(token),
            reported: Vec::new(),
        }
    }

    pub fn with_reported(mut self, reported: Vec<Diagnostic>) -> Self {
        self.reported = reported;
        self
    }

    /// 他の診断と同じ経路で報告するための変換
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic {
            kind: DiagnosticKind::Semantic,
            span: self.span,
            location: self.location.clone(),
            message: self.message.clone(),
        }
    }

    /// 報告済みの診断と、このエラー自体の診断を発生順に並べたもの
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.reported.clone();
        all.push(self.to_diagnostic());
        all
    }
}
