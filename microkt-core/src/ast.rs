//! パーサーが生成する抽象構文木(AST)のデータ構造を定義します。
//! 構築後は変更されず、コード生成器から読み取り専用で参照されます。

use crate::token::{LiteralValue, Token};

/// 式
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    // 代入 (name = value)
    Assign {
        name: Token,
        value: Box<Expr>,
    },
    // 算術・比較・等価演算
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    // 短絡評価する && と ||
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Unary {
        operator: Token,
        operand: Box<Expr>,
    },
    Grouping(Box<Expr>),
    Literal(LiteralValue),
    Variable(Token),
    // コンソールからの読み込み (readInt() など)。`function`は呼び出し名のトークン
    Read {
        function: Token,
        declared_type: String,
    },
}

/// 文
#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    // 新しいスコープを導入する
    Block(Vec<Stmt>),
    Expression(Expr),
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    // 本体を少なくとも1回実行する
    DoWhile {
        condition: Expr,
        body: Box<Stmt>,
    },
    Print(Expr),
    // 引数なしの `printLn()` は改行のみ
    PrintLine(Option<Expr>),
    ValDecl(ValDecl),
    VarDecl {
        name: Token,
        declared_type: Token,
        initializer: Option<Expr>,
    },
}

/// 不変の定数宣言。初期化子は必須。
#[derive(Debug, PartialEq, Clone)]
pub struct ValDecl {
    pub name: Token,
    pub declared_type: Token,
    pub initializer: Expr,
}

/// コンパイル単位全体。モジュールレベルの定数と、`main` の本体からなる。
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub constants: Vec<ValDecl>,
    pub statements: Vec<Stmt>,
}
