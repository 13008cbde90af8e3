//! トークン列をAST(`Program`)に変換する再帰下降構文解析器。
//!
//! 文の途中で構文エラーが起きた場合は、その診断を記録したうえで
//! 文の境界まで読み飛ばし(パニックモード回復)、解析を続行する。

use crate::ast::{Expr, Program, Stmt, ValDecl};
use crate::error::Diagnostic;
use crate::token::{LiteralValue, Token, TokenKind};
use tracing::debug;

/// 回復可能な構文エラー。`Err`側の診断は、最も近い文の境界で記録される。
type ParseResult<T> = Result<T, Diagnostic>;

/// 構文解析の結果。診断がある場合でも、解析できた部分は`program`に残る。
#[derive(Debug, Clone)]
pub struct ParseOutput {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// コンソール読み込み関数名と、その宣言型
const READ_FUNCTIONS: [(&str, &str); 4] = [
    ("readInt", "Int"),
    ("readDouble", "Double"),
    ("readBoolean", "Boolean"),
    ("readString", "String"),
];

/// 構文解析器
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let span = tokens.last().map(|t| t.span).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", None, span));
        }
        Self {
            tokens,
            position: 0,
            diagnostics: Vec::new(),
        }
    }

    /// `program → val* mainFunction`
    pub fn parse_program(mut self) -> ParseOutput {
        let mut program = Program::default();

        while self.matches(TokenKind::Val) {
            match self.parse_val_declaration() {
                Ok(decl) => program.constants.push(decl),
                Err(diagnostic) => {
                    self.report(diagnostic);
                    self.synchronize();
                }
            }
        }

        match self.parse_main_function() {
            Ok(statements) => program.statements = statements,
            Err(diagnostic) => self.report(diagnostic),
        }

        debug!(
            constants = program.constants.len(),
            statements = program.statements.len(),
            diagnostics = self.diagnostics.len(),
            "parsing finished"
        );

        ParseOutput {
            program,
            diagnostics: self.diagnostics,
        }
    }

    /// `mainFunction → "fun" "main" "(" ")" block`
    fn parse_main_function(&mut self) -> ParseResult<Vec<Stmt>> {
        self.consume(TokenKind::Fun, "Expect 'fun' after constants.")?;
        let name = self.consume(TokenKind::Identifier, "Expect function name.")?;
        if name.lexeme != "main" {
            // 名前の誤りは致命的ではない
            self.report(Diagnostic::syntax(
                &name,
                "Expect the function name to be 'main'.",
            ));
        }
        self.consume(TokenKind::LeftParen, "Expect '(' after function name.")?;
        self.consume(TokenKind::RightParen, "Expect ')' before block.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before function body.")?;
        let statements = self.parse_block()?;

        if !self.is_at_end() {
            let trailing = self.peek().clone();
            self.report(Diagnostic::syntax(
                &trailing,
                "Expect end of file after 'main' function.",
            ));
        }
        Ok(statements)
    }

    /// `constant → "val" identifier ":" type "=" expression ";"`
    fn parse_val_declaration(&mut self) -> ParseResult<ValDecl> {
        let name = self.consume(TokenKind::Identifier, "Expect constant name.")?;
        self.consume(TokenKind::Colon, "Expect ':' after constant name.")?;
        let declared_type = self.consume(TokenKind::Identifier, "Expect constant type.")?;
        self.consume(TokenKind::Equal, "Expect '=' after constant type.")?;
        let initializer = self.parse_expression()?;
        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after constant declaration.",
        )?;

        Ok(ValDecl {
            name,
            declared_type,
            initializer,
        })
    }

    /// `declaration → varDecl | statement`
    /// 失敗した場合は診断を記録して同期し、`None`を返す。
    fn parse_declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(TokenKind::Var) {
            self.parse_var_declaration()
        } else {
            self.parse_statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(diagnostic) => {
                self.report(diagnostic);
                self.synchronize();
                None
            }
        }
    }

    /// `varDecl → "var" identifier ":" type ("=" expression)? ";"`
    fn parse_var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        self.consume(TokenKind::Colon, "Expect ':' after variable name.")?;
        let declared_type = self.consume(TokenKind::Identifier, "Expect variable type.")?;

        let initializer = if self.matches(TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.consume(
            TokenKind::Semicolon,
            "Expect ';' after variable declaration.",
        )?;
        Ok(Stmt::VarDecl {
            name,
            declared_type,
            initializer,
        })
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenKind::Do) {
            return self.parse_do_while();
        }
        if self.matches(TokenKind::If) {
            return self.parse_if();
        }
        if self.matches(TokenKind::Print) {
            return self.parse_print();
        }
        if self.matches(TokenKind::PrintLn) {
            return self.parse_print_line();
        }
        if self.matches(TokenKind::While) {
            return self.parse_while();
        }
        if self.matches(TokenKind::LeftBrace) {
            return Ok(Stmt::Block(self.parse_block()?));
        }
        self.parse_expression_statement()
    }

    /// `doWhileStmt → "do" statement "while" "(" expression ")" ";"`
    fn parse_do_while(&mut self) -> ParseResult<Stmt> {
        let body = self.parse_statement()?;
        self.consume(TokenKind::While, "Expect 'while' after block.")?;
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        self.consume(TokenKind::Semicolon, "Expect ';' after do-while.")?;

        Ok(Stmt::DoWhile {
            condition,
            body: Box::new(body),
        })
    }

    /// `ifStmt → "if" "(" expression ")" statement ("else" statement)?`
    fn parse_if(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `printStmt → "print" "(" expression ")" ";"`
    fn parse_print(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' before expression.")?;
        let value = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
        self.consume(TokenKind::Semicolon, "Expect ';' at end of line.")?;
        Ok(Stmt::Print(value))
    }

    /// `printLnStmt → "printLn" "(" expression? ")" ";"`
    fn parse_print_line(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' before expression.")?;
        let value = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
        self.consume(TokenKind::Semicolon, "Expect ';' at end of line.")?;
        Ok(Stmt::PrintLine(value))
    }

    /// `whileStmt → "while" "(" expression ")" statement`
    fn parse_while(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.parse_expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = self.parse_statement()?;

        Ok(Stmt::While {
            condition,
            body: Box::new(body),
        })
    }

    /// `{` の直後から `}` までを解析する
    fn parse_block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.parse_declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.parse_expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    // --- 式 (優先順位の低い順) ---

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    /// 右結合。左辺は変数参照のみ有効。
    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.parse_or()?;

        if self.matches(TokenKind::Equal) {
            let equals = self.previous().clone();
            let value = self.parse_assignment()?;

            if let Expr::Variable(name) = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }

            self.report(Diagnostic::syntax(&equals, "Invalid assignment target."));
            return Ok(value);
        }

        Ok(expr)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(&[TokenKind::OrOr], Self::parse_and, logical)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(&[TokenKind::AndAnd], Self::parse_equality, logical)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::parse_comparison,
            binary,
        )
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::parse_additive,
            binary,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(
            &[TokenKind::Minus, TokenKind::Plus],
            Self::parse_multiplicative,
            binary,
        )
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        self.parse_left_assoc(
            &[TokenKind::Slash, TokenKind::Star, TokenKind::Percent],
            Self::parse_unary,
            binary,
        )
    }

    /// 左結合の二項演算の共通処理
    fn parse_left_assoc(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
        build: fn(Expr, Token, Expr) -> Expr,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches_any(operators) {
            let operator = self.previous().clone();
            let right = operand(self)?;
            expr = build(expr, operator, right);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        if self.matches_any(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::False | TokenKind::True | TokenKind::Number | TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(token.literal.unwrap_or(LiteralValue::Null)))
            }
            TokenKind::Null => {
                self.advance();
                Ok(Expr::Literal(LiteralValue::Null))
            }
            TokenKind::Identifier => {
                self.advance();
                self.parse_identifier(token)
            }
            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
                Ok(Expr::Grouping(Box::new(expr)))
            }
            _ => match Self::missing_operand_level(token.kind) {
                Some(level) => {
                    // 左辺のない二項演算子: 1つだけ報告し、右辺は該当する優先順位で読み進める
                    self.advance();
                    self.report(Diagnostic::syntax(&token, "Missing left-hand operand."));
                    level(self)
                }
                None => Err(Diagnostic::syntax(&token, "Expect expression.")),
            },
        }
    }

    /// 識別子は変数参照か、`readInt()` などの読み込み式
    fn parse_identifier(&mut self, name: Token) -> ParseResult<Expr> {
        let read_type = READ_FUNCTIONS
            .iter()
            .find(|(function, _)| *function == name.lexeme)
            .map(|(_, declared_type)| *declared_type);

        match read_type {
            Some(declared_type) if self.check(TokenKind::LeftParen) => {
                self.advance();
                self.consume(TokenKind::RightParen, "Expect ')' after read call.")?;
                Ok(Expr::Read {
                    function: name,
                    declared_type: declared_type.to_string(),
                })
            }
            _ => Ok(Expr::Variable(name)),
        }
    }

    /// 左辺が欠けた演算子に対して、右辺を読むべき優先順位を返す
    fn missing_operand_level(kind: TokenKind) -> Option<fn(&mut Self) -> ParseResult<Expr>> {
        match kind {
            TokenKind::OrOr => Some(Self::parse_or),
            TokenKind::AndAnd => Some(Self::parse_and),
            TokenKind::BangEqual | TokenKind::EqualEqual => Some(Self::parse_equality),
            TokenKind::Greater
            | TokenKind::GreaterEqual
            | TokenKind::Less
            | TokenKind::LessEqual => Some(Self::parse_comparison),
            TokenKind::Plus => Some(Self::parse_additive),
            TokenKind::Slash | TokenKind::Star | TokenKind::Percent => {
                Some(Self::parse_multiplicative)
            }
            _ => None,
        }
    }

    /// 失敗したトークンを読み飛ばし、次の文の境界まで進める
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // --- パーサーヘルパー ---
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }
    fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }
    fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous().clone()
    }
    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }
    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
    fn matches_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|kind| self.matches(*kind))
    }

    fn consume(&mut self, expected: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(Diagnostic::syntax(self.peek(), message))
        }
    }
}

fn binary(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::Binary {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

fn logical(left: Expr, operator: Token, right: Expr) -> Expr {
    Expr::Logical {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}
