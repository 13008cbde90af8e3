//! MicroKotlinトランスパイラのフロントエンドを提供するクレート。
//! 字句解析、構文解析、スコープ管理のパイプラインを管理します。

pub mod ast;
pub mod error;
pub mod scope;
pub mod span;
pub mod token;

mod lexer;
mod parser;
pub use lexer::LexOutput;
pub use parser::ParseOutput;

use crate::ast::Program;
use crate::error::{Diagnostic, LangError, ParseError};
use crate::token::Token;
use tracing::debug;

/// 字句解析と構文解析の結果を保持する構造体。
#[derive(Debug, Clone)]
pub struct ParsedModule {
    pub tokens: Vec<Token>,
    pub program: Program,
}

/// ソースコードを字句解析するヘルパー。不正な文字があっても走査は最後まで続く。
pub fn lex_source(source: &str) -> LexOutput {
    lexer::Lexer::new(source).tokenize_all()
}

/// トークン列を構文解析し、診断情報付きで結果を返す。
pub fn parse_tokens(tokens: &[Token]) -> ParseOutput {
    parser::Parser::new(tokens.to_vec()).parse_program()
}

/// 字句解析と構文解析の両方を行う。
/// どちらかの段階で診断が1つでも出た場合は、すべての診断をまとめて`Err`で返す。
pub fn parse_source(source: &str) -> Result<ParsedModule, LangError> {
    let lexed = lex_source(source);
    let parsed = parse_tokens(&lexed.tokens);

    let diagnostics: Vec<Diagnostic> = lexed
        .diagnostics
        .into_iter()
        .chain(parsed.diagnostics)
        .collect();
    if !diagnostics.is_empty() {
        debug!(count = diagnostics.len(), "front-end reported diagnostics");
        return Err(ParseError::from_diagnostics(diagnostics).into());
    }

    Ok(ParsedModule {
        tokens: lexed.tokens,
        program: parsed.program,
    })
}
