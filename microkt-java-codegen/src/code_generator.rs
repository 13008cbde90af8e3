//! ASTを深さ優先でたどり、Javaのテキストを生成するコードジェネレータ。
//! 式は1つの文字列、文は1行以上の行を返す。

use super::{JavaGenerator, INDENT};
use microkt_core::ast::{Expr, Stmt, ValDecl};
use microkt_core::error::CompileError;
use microkt_core::scope::Mutability;
use microkt_core::token::LiteralValue;
use tracing::trace;

/// モジュールレベルの定数を `private static final` フィールドとして生成する。
pub fn generate_constant(
    generator: &mut JavaGenerator,
    decl: &ValDecl,
) -> Result<String, CompileError> {
    let java_type = generator.map_type(&decl.declared_type)?;
    let value = generate_expr(generator, &decl.initializer)?;
    if let Err(diagnostic) =
        generator
            .scopes
            .define(&decl.name, Mutability::Constant, Some(value.clone()))
    {
        generator.report(diagnostic);
    }
    Ok(format!(
        "private static final {} {} = {};",
        java_type, decl.name.lexeme, value
    ))
}

pub fn generate_statements(
    generator: &mut JavaGenerator,
    statements: &[Stmt],
) -> Result<Vec<String>, CompileError> {
    let mut lines = Vec::new();
    for stmt in statements {
        lines.extend(generate_stmt(generator, stmt)?);
    }
    Ok(lines)
}

pub fn generate_stmt(
    generator: &mut JavaGenerator,
    stmt: &Stmt,
) -> Result<Vec<String>, CompileError> {
    match stmt {
        Stmt::Block(statements) => {
            trace!(statements = statements.len(), "block");
            let inner = generator
                .in_new_scope(|generator| generate_statements(generator, statements))?;
            let mut lines = Vec::with_capacity(inner.len() + 2);
            lines.push("{".to_string());
            lines.extend(inner.into_iter().map(|line| format!("{INDENT}{line}")));
            lines.push("}".to_string());
            Ok(lines)
        }
        Stmt::Expression(expr) => {
            let text = generate_expr(generator, expr)?;
            Ok(vec![format!("{};", text)])
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = generate_expr(generator, condition)?;
            let then_lines = generate_stmt(generator, then_branch)?;
            let mut lines = prefix_first(format!("if ({}) ", condition), then_lines);
            if let Some(else_branch) = else_branch {
                let else_lines = generate_stmt(generator, else_branch)?;
                lines = join_after_last(lines, " else ", else_lines);
            }
            Ok(lines)
        }
        Stmt::While { condition, body } => {
            let condition = generate_expr(generator, condition)?;
            let body = generate_stmt(generator, body)?;
            Ok(prefix_first(format!("while ({}) ", condition), body))
        }
        Stmt::DoWhile { condition, body } => {
            let body = generate_stmt(generator, body)?;
            let condition = generate_expr(generator, condition)?;
            let lines = prefix_first("do ".to_string(), body);
            Ok(join_after_last(
                lines,
                " ",
                vec![format!("while ({});", condition)],
            ))
        }
        Stmt::Print(expr) => {
            let text = generate_expr(generator, expr)?;
            Ok(vec![format!("System.out.print({});", text)])
        }
        Stmt::PrintLine(expr) => {
            let text = match expr {
                Some(expr) => generate_expr(generator, expr)?,
                None => String::new(),
            };
            Ok(vec![format!("System.out.println({});", text)])
        }
        Stmt::ValDecl(decl) => {
            let java_type = generator.map_type(&decl.declared_type)?;
            let value = generate_expr(generator, &decl.initializer)?;
            if let Err(diagnostic) =
                generator
                    .scopes
                    .define(&decl.name, Mutability::Constant, Some(value.clone()))
            {
                generator.report(diagnostic);
            }
            Ok(vec![format!(
                "final {} {} = {};",
                java_type, decl.name.lexeme, value
            )])
        }
        Stmt::VarDecl {
            name,
            declared_type,
            initializer,
        } => {
            let java_type = generator.map_type(declared_type)?;
            let value = match initializer {
                Some(initializer) => Some(generate_expr(generator, initializer)?),
                None => None,
            };
            if let Err(diagnostic) =
                generator
                    .scopes
                    .define(name, Mutability::Variable, value.clone())
            {
                generator.report(diagnostic);
            }
            let line = match value {
                Some(value) => format!("{} {} = {};", java_type, name.lexeme, value),
                None => format!("{} {};", java_type, name.lexeme),
            };
            Ok(vec![line])
        }
    }
}

pub fn generate_expr(generator: &mut JavaGenerator, expr: &Expr) -> Result<String, CompileError> {
    match expr {
        Expr::Assign { name, value } => {
            let value = generate_expr(generator, value)?;
            if let Err(diagnostic) = generator.scopes.assign(name, value.clone()) {
                generator.report(diagnostic);
            }
            Ok(format!("{} = {}", name.lexeme, value))
        }
        // 演算子の字句はJavaでも同じ意味を持つ。オペランドの型は検査しない。
        Expr::Binary {
            left,
            operator,
            right,
        }
        | Expr::Logical {
            left,
            operator,
            right,
        } => {
            let left = generate_expr(generator, left)?;
            let right = generate_expr(generator, right)?;
            Ok(format!("{} {} {}", left, operator.lexeme, right))
        }
        Expr::Unary { operator, operand } => {
            let operand = generate_expr(generator, operand)?;
            // `- -x` を `--x` (デクリメント) にしない
            if operand.starts_with(operator.lexeme.as_str()) {
                Ok(format!("{} {}", operator.lexeme, operand))
            } else {
                Ok(format!("{}{}", operator.lexeme, operand))
            }
        }
        Expr::Grouping(inner) => {
            let inner = generate_expr(generator, inner)?;
            Ok(format!("({})", inner))
        }
        Expr::Literal(value) => Ok(generate_literal(value)),
        Expr::Variable(name) => {
            if let Err(diagnostic) = generator.scopes.get(name) {
                generator.report(diagnostic);
            }
            Ok(name.lexeme.clone())
        }
        Expr::Read {
            function,
            declared_type,
        } => {
            if super::java_type(declared_type).is_none() {
                return Err(CompileError::at(
                    function,
                    format!("The type '{}' doesn't exist.", declared_type),
                ));
            }
            if declared_type == "String" {
                Ok("scanner.nextLine()".to_string())
            } else {
                Ok(format!("scanner.next{}()", declared_type))
            }
        }
    }
}

fn generate_literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Number(n) => format_number(*n),
        LiteralValue::Str(s) => {
            // Javaの文字列リテラルは改行を含められない
            let escaped = s.replace('\r', "\\r").replace('\n', "\\n");
            format!("\"{}\"", escaped)
        }
    }
}

/// 小数部が `.0` でJavaの `int` に収まる数値は整数の形で出力する。
/// 範囲外の値は `int` リテラルにするとコンパイルできないため `double` の形のまま。
fn format_number(value: f64) -> String {
    if value.is_infinite() {
        return "Double.POSITIVE_INFINITY".to_string();
    }
    let fits_int = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    if value.fract() == 0.0 && fits_int {
        return format!("{}", value as i32);
    }
    format!("{:?}", value)
}

/// `prefix` を最初の行の先頭に付ける
fn prefix_first(prefix: String, mut lines: Vec<String>) -> Vec<String> {
    match lines.first_mut() {
        Some(first) => first.insert_str(0, &prefix),
        None => lines.push(prefix.trim_end().to_string()),
    }
    lines
}

/// `lines` の最後の行に `separator` と `rest` の最初の行をつなげる
fn join_after_last(mut lines: Vec<String>, separator: &str, rest: Vec<String>) -> Vec<String> {
    let mut rest = rest.into_iter();
    if let (Some(last), Some(first)) = (lines.last_mut(), rest.next()) {
        last.push_str(separator);
        last.push_str(&first);
    }
    lines.extend(rest);
    lines
}
