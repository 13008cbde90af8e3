//! 入れ子のレキシカルスコープを管理する記号表。
//!
//! スコープは所有されたフレームのスタックとして表現する。先頭のフレームが
//! モジュールレベルのスコープで、ブロックに入るたびに1つ積まれる。
//! 名前の探索は内側から外側へ向かってのみ行う。

use crate::error::Diagnostic;
use crate::token::Token;
use std::collections::BTreeMap;
use tracing::trace;

/// 定数か変数か
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Constant,
    Variable,
}

/// 記号表の1エントリ
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub mutability: Mutability,
    /// 最後に分かっている値 (出力言語でのテキスト)
    pub value: Option<String>,
}

#[derive(Debug, Default)]
struct Scope {
    symbols: BTreeMap<String, Symbol>,
}

/// `enter`で得られ、`restore`で元のスコープに戻すための印
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark(usize);

#[derive(Debug)]
pub struct ScopeTable {
    frames: Vec<Scope>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTable {
    /// モジュールレベルのスコープだけを持つ記号表を作る
    pub fn new() -> Self {
        Self {
            frames: vec![Scope::default()],
        }
    }

    /// 現在のスコープの深さ (モジュールレベルが1)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// 現在のスコープを親とする新しいスコープに入る
    pub fn enter(&mut self) -> ScopeMark {
        let mark = ScopeMark(self.frames.len());
        self.frames.push(Scope::default());
        trace!(depth = self.frames.len(), "enter scope");
        mark
    }

    /// `enter`する前のスコープに戻す。エラー経路からも必ず呼ぶこと。
    pub fn restore(&mut self, mark: ScopeMark) {
        self.frames.truncate(mark.0.max(1));
        trace!(depth = self.frames.len(), "restore scope");
    }

    /// 現在のスコープに名前を定義する。外側のスコープの同名は隠される。
    pub fn define(
        &mut self,
        name: &Token,
        mutability: Mutability,
        value: Option<String>,
    ) -> Result<(), Diagnostic> {
        let current = self.current_mut();
        if current.symbols.contains_key(&name.lexeme) {
            return Err(Diagnostic::semantic(
                name,
                format!(
                    "A variable with the name '{}' already exists.",
                    name.lexeme
                ),
            ));
        }
        current.symbols.insert(
            name.lexeme.clone(),
            Symbol {
                name: name.lexeme.clone(),
                mutability,
                value,
            },
        );
        Ok(())
    }

    /// 内側から外側へ探索し、最初に見つかったエントリを返す
    pub fn get(&self, name: &Token) -> Result<&Symbol, Diagnostic> {
        self.lookup(&name.lexeme).ok_or_else(|| {
            Diagnostic::semantic(name, format!("Undefined variable '{}'.", name.lexeme))
        })
    }

    /// 名前を含む最も内側のスコープの値を書き換える。定数は書き換えない。
    pub fn assign(&mut self, name: &Token, value: String) -> Result<(), Diagnostic> {
        let symbol = self
            .frames
            .iter_mut()
            .rev()
            .find_map(|scope| scope.symbols.get_mut(&name.lexeme))
            .ok_or_else(|| {
                Diagnostic::semantic(name, format!("Undefined variable '{}'.", name.lexeme))
            })?;

        match symbol.mutability {
            Mutability::Variable => {
                symbol.value = Some(value);
                Ok(())
            }
            Mutability::Constant => Err(Diagnostic::semantic(
                name,
                format!(
                    "Cannot reassign a value to the constant '{}'.",
                    name.lexeme
                ),
            )),
        }
    }

    /// スコープの連鎖全体で名前が定義されているか
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// 診断を出さずに名前を探す
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.frames
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name))
    }

    fn current_mut(&mut self) -> &mut Scope {
        if self.frames.is_empty() {
            self.frames.push(Scope::default());
        }
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }
}
