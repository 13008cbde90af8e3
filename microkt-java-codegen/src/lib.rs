//! MicroKotlinのASTを受け取り、Javaのソースコードを生成するコードジェネレーター。

use microkt_core::ast::Program;
use microkt_core::error::{CompileError, Diagnostic, LangError};
use microkt_core::parse_source;
use microkt_core::scope::{ScopeMark, ScopeTable};
use microkt_core::token::Token;
use tracing::debug;

mod code_generator;
pub mod naming;

/// 1段分のインデント
const INDENT: &str = "  ";

/// 生成結果。名前解決の診断があっても、出力テキストは最後まで生成される。
#[derive(Debug, Clone)]
pub struct Generated {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl Generated {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// MicroKotlinの型名をJavaの型名に変換する。
pub fn java_type(type_name: &str) -> Option<&'static str> {
    match type_name {
        "Int" => Some("int"),
        "Double" => Some("double"),
        "Boolean" => Some("boolean"),
        "String" => Some("String"),
        _ => None,
    }
}

/// Javaコード生成の状態を管理する構造体。
pub struct JavaGenerator {
    class_name: String,
    scopes: ScopeTable,
    diagnostics: Vec<Diagnostic>,
}

impl JavaGenerator {
    /// 新しいJavaGeneratorを生成する。`class_name`は出力するクラスの名前。
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            scopes: ScopeTable::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Programを受け取り、完全なJavaのソースを生成するメイン関数。
    /// 未知の型名に出会った場合は生成を中断し`Err`を返す。
    /// それまでに報告された診断は`CompileError::reported`に入る。
    pub fn generate(&mut self, program: &Program) -> Result<Generated, CompileError> {
        self.scopes = ScopeTable::new();
        self.diagnostics.clear();

        match self.emit_program(program) {
            Ok(code) => Ok(Generated {
                code,
                diagnostics: self.diagnostics.clone(),
            }),
            Err(err) => {
                debug!(
                    reported = self.diagnostics.len(),
                    "java generation aborted"
                );
                Err(err.with_reported(self.diagnostics.clone()))
            }
        }
    }

    fn emit_program(&mut self, program: &Program) -> Result<String, CompileError> {
        let mut out = String::new();
        out.push_str("import java.util.Scanner;\n\n");
        out.push_str(&format!("public class {} {{\n", self.class_name));

        for decl in &program.constants {
            let line = code_generator::generate_constant(self, decl)?;
            out.push_str(&format!("{INDENT}{line}\n"));
        }

        out.push_str(&format!(
            "\n{INDENT}public static void main(String[] args) {{\n"
        ));
        let body_indent = INDENT.repeat(2);
        out.push_str(&format!(
            "{body_indent}Scanner scanner = new Scanner(System.in);\n"
        ));

        // main の本体はモジュールスコープの内側の1つのスコープ
        let body = self.in_new_scope(|generator| {
            code_generator::generate_statements(generator, &program.statements)
        })?;
        for line in body {
            out.push_str(&format!("{body_indent}{line}\n"));
        }

        out.push_str(&format!("{body_indent}scanner.close();\n"));
        out.push_str(&format!("{INDENT}}}\n\n"));
        out.push_str("}\n");

        debug!(
            class = %self.class_name,
            bytes = out.len(),
            diagnostics = self.diagnostics.len(),
            "java generation finished"
        );

        Ok(out)
    }

    /// 現在の記号表。
    pub fn scopes(&self) -> &ScopeTable {
        &self.scopes
    }

    /// 新しいスコープで`f`を実行し、成否にかかわらず元のスコープに戻す。
    pub(crate) fn in_new_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let mark: ScopeMark = self.scopes.enter();
        let result = f(self);
        self.scopes.restore(mark);
        result
    }

    /// 宣言された型名をJavaの型名に変換する。変換できない場合は致命的エラー。
    pub(crate) fn map_type(&self, type_name: &Token) -> Result<&'static str, CompileError> {
        java_type(&type_name.lexeme).ok_or_else(|| {
            CompileError::at(
                type_name,
                format!("The type '{}' doesn't exist.", type_name.lexeme),
            )
        })
    }

    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

/// ソースコード文字列をJavaのソースに変換するヘルパー。
/// 字句・構文の診断があれば生成には進まず`Err`を返す。
pub fn transpile_source(source: &str, class_name: &str) -> Result<Generated, LangError> {
    let parsed = parse_source(source)?;
    let mut generator = JavaGenerator::new(class_name);
    Ok(generator.generate(&parsed.program)?)
}
