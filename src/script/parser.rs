//! Script parser
//!
//! Recursive descent over the token stream from [`super::lexer`].

use crate::repl::backend_trait::ScriptError;
use crate::repl::namespace::Value;

use super::ast::{BinOp, CmpOp, Expr, Stmt, UnaryOp};
use super::lexer::{Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "and", "del", "elif", "else", "False", "if", "in", "is", "None", "not", "or", "pass", "True",
];

/// Parse a whole token stream into statements
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Stmt>, ScriptError> {
    Parser::new(tokens).program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn peek_at(
        &self,
        offset: usize,
    ) -> &TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn at_op(
        &self,
        op: &str,
    ) -> bool {
        matches!(self.peek(), TokenKind::Op(o) if *o == op)
    }

    fn at_keyword(
        &self,
        keyword: &str,
    ) -> bool {
        matches!(self.peek(), TokenKind::Name(n) if n == keyword)
    }

    fn eat_op(
        &mut self,
        op: &str,
    ) -> bool {
        if self.at_op(op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(
        &mut self,
        keyword: &str,
    ) -> bool {
        if self.at_keyword(keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self) -> ScriptError {
        ScriptError::syntax(format!("invalid syntax (line {})", self.line()))
    }

    fn expect_op(
        &mut self,
        op: &str,
    ) -> Result<(), ScriptError> {
        if self.eat_op(op) {
            Ok(())
        } else {
            Err(ScriptError::syntax(format!(
                "expected '{}' but found {} (line {})",
                op,
                self.peek(),
                self.line()
            )))
        }
    }

    fn expect_end_of_statement(&mut self) -> Result<(), ScriptError> {
        match self.peek() {
            TokenKind::Newline => {
                self.pos += 1;
                Ok(())
            }
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            _ => Err(self.error()),
        }
    }

    fn program(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.pos += 1;
                }
                TokenKind::Indent => {
                    return Err(ScriptError::syntax(format!(
                        "unexpected indent (line {})",
                        self.line()
                    )))
                }
                _ => stmts.extend(self.statement()?),
            }
        }
        Ok(stmts)
    }

    fn statement(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        if self.at_keyword("if") {
            self.pos += 1;
            return Ok(vec![self.if_statement()?]);
        }
        let stmts = self.simple_statements()?;
        self.expect_end_of_statement()?;
        Ok(stmts)
    }

    fn simple_statements(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        let mut stmts = vec![self.simple_statement()?];
        while self.eat_op(";") {
            if matches!(self.peek(), TokenKind::Newline | TokenKind::Eof) {
                break;
            }
            stmts.push(self.simple_statement()?);
        }
        Ok(stmts)
    }

    fn simple_statement(&mut self) -> Result<Stmt, ScriptError> {
        if self.eat_keyword("pass") {
            return Ok(Stmt::Pass);
        }
        if self.eat_keyword("del") {
            let mut names = vec![self.identifier()?];
            while self.eat_op(",") {
                names.push(self.identifier()?);
            }
            return Ok(Stmt::Del(names));
        }

        let expr = self.expression()?;

        if self.at_op("=") {
            let mut targets = vec![self.target(expr)?];
            let mut value;
            loop {
                self.expect_op("=")?;
                value = self.expression()?;
                if self.at_op("=") {
                    targets.push(self.target(value)?);
                } else {
                    break;
                }
            }
            return Ok(Stmt::Assign(targets, value));
        }

        let aug = match self.peek() {
            TokenKind::Op("+=") => Some(BinOp::Add),
            TokenKind::Op("-=") => Some(BinOp::Sub),
            TokenKind::Op("*=") => Some(BinOp::Mul),
            TokenKind::Op("/=") => Some(BinOp::Div),
            TokenKind::Op("//=") => Some(BinOp::FloorDiv),
            TokenKind::Op("%=") => Some(BinOp::Mod),
            TokenKind::Op("**=") => Some(BinOp::Pow),
            _ => None,
        };
        if let Some(op) = aug {
            self.pos += 1;
            let target = self.target(expr)?;
            let value = self.expression()?;
            return Ok(Stmt::AugAssign(target, op, value));
        }

        Ok(Stmt::Expr(expr))
    }

    fn target(
        &self,
        expr: Expr,
    ) -> Result<String, ScriptError> {
        match expr {
            Expr::Name(name) => Ok(name),
            Expr::Literal(_) => Err(ScriptError::syntax(format!(
                "cannot assign to literal (line {})",
                self.line()
            ))),
            Expr::Call(..) => Err(ScriptError::syntax(format!(
                "cannot assign to function call (line {})",
                self.line()
            ))),
            _ => Err(ScriptError::syntax(format!(
                "cannot assign to expression (line {})",
                self.line()
            ))),
        }
    }

    fn identifier(&mut self) -> Result<String, ScriptError> {
        match self.peek().clone() {
            TokenKind::Name(name) if !KEYWORDS.contains(&name.as_str()) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.error()),
        }
    }

    /// After the `if` keyword
    fn if_statement(&mut self) -> Result<Stmt, ScriptError> {
        let mut branches = Vec::new();
        let condition = self.expression()?;
        self.expect_op(":")?;
        branches.push((condition, self.suite()?));

        let mut orelse = Vec::new();
        loop {
            if self.eat_keyword("elif") {
                let condition = self.expression()?;
                self.expect_op(":")?;
                branches.push((condition, self.suite()?));
            } else if self.eat_keyword("else") {
                self.expect_op(":")?;
                orelse = self.suite()?;
                break;
            } else {
                break;
            }
        }
        Ok(Stmt::If { branches, orelse })
    }

    fn suite(&mut self) -> Result<Vec<Stmt>, ScriptError> {
        if !matches!(self.peek(), TokenKind::Newline) {
            let stmts = self.simple_statements()?;
            self.expect_end_of_statement()?;
            return Ok(stmts);
        }
        self.pos += 1;
        if !matches!(self.peek(), TokenKind::Indent) {
            return Err(ScriptError::syntax(format!(
                "expected an indented block (line {})",
                self.line()
            )));
        }
        self.pos += 1;

        let mut stmts = Vec::new();
        loop {
            match self.peek() {
                TokenKind::Dedent => {
                    self.pos += 1;
                    break;
                }
                TokenKind::Eof => break,
                TokenKind::Newline => {
                    self.pos += 1;
                }
                _ => stmts.extend(self.statement()?),
            }
        }
        Ok(stmts)
    }

    fn expression(&mut self) -> Result<Expr, ScriptError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.not_expr()?;
        while self.eat_keyword("and") {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, ScriptError> {
        if self.eat_keyword("not") {
            let operand = self.not_expr()?;
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(operand)));
        }
        self.comparison()
    }

    fn comparison_op(&mut self) -> Option<CmpOp> {
        let next_is = |keyword: &str| matches!(self.peek_at(1), TokenKind::Name(n) if n == keyword);
        let (op, width) = match self.peek() {
            TokenKind::Op("==") => (CmpOp::Eq, 1),
            TokenKind::Op("!=") => (CmpOp::Ne, 1),
            TokenKind::Op("<") => (CmpOp::Lt, 1),
            TokenKind::Op("<=") => (CmpOp::Le, 1),
            TokenKind::Op(">") => (CmpOp::Gt, 1),
            TokenKind::Op(">=") => (CmpOp::Ge, 1),
            TokenKind::Name(n) if n == "in" => (CmpOp::In, 1),
            TokenKind::Name(n) if n == "not" && next_is("in") => (CmpOp::NotIn, 2),
            TokenKind::Name(n) if n == "is" && next_is("not") => (CmpOp::IsNot, 2),
            TokenKind::Name(n) if n == "is" => (CmpOp::Is, 1),
            _ => return None,
        };
        self.pos += width;
        Some(op)
    }

    fn comparison(&mut self) -> Result<Expr, ScriptError> {
        let left = self.arith()?;
        let mut rest = Vec::new();
        while let Some(op) = self.comparison_op() {
            rest.push((op, self.arith()?));
        }
        if rest.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare(Box::new(left), rest))
        }
    }

    fn arith(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op("+") => BinOp::Add,
                TokenKind::Op("-") => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, ScriptError> {
        let mut left = self.factor()?;
        loop {
            let op = match self.peek() {
                TokenKind::Op("*") => BinOp::Mul,
                TokenKind::Op("/") => BinOp::Div,
                TokenKind::Op("//") => BinOp::FloorDiv,
                TokenKind::Op("%") => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.factor()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, ScriptError> {
        let op = match self.peek() {
            TokenKind::Op("-") => Some(UnaryOp::Neg),
            TokenKind::Op("+") => Some(UnaryOp::Pos),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.factor()?;
            return Ok(Expr::Unary(op, Box::new(operand)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ScriptError> {
        let base = self.postfix()?;
        if self.eat_op("**") {
            let exponent = self.factor()?;
            return Ok(Expr::Binary(BinOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn postfix(&mut self) -> Result<Expr, ScriptError> {
        let mut expr = self.atom()?;
        loop {
            if self.eat_op(".") {
                let name = match self.advance() {
                    TokenKind::Name(name) => name,
                    _ => return Err(self.error()),
                };
                expr = Expr::Attr(Box::new(expr), name);
            } else if self.eat_op("(") {
                let args = self.expression_list(")")?;
                expr = Expr::Call(Box::new(expr), args);
            } else if self.eat_op("[") {
                let index = self.expression()?;
                self.expect_op("]")?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn expression_list(
        &mut self,
        close: &str,
    ) -> Result<Vec<Expr>, ScriptError> {
        let mut items = Vec::new();
        while !self.at_op(close) {
            items.push(self.expression()?);
            if !self.eat_op(",") {
                break;
            }
        }
        self.expect_op(close)?;
        Ok(items)
    }

    fn atom(&mut self) -> Result<Expr, ScriptError> {
        match self.advance() {
            TokenKind::Int(i) => Ok(Expr::Literal(Value::Int(i))),
            TokenKind::Float(f) => Ok(Expr::Literal(Value::Float(f))),
            TokenKind::Str(mut s) => {
                // adjacent literals concatenate
                while let TokenKind::Str(next) = self.peek() {
                    s.push_str(next);
                    self.pos += 1;
                }
                Ok(Expr::Literal(Value::Str(s)))
            }
            TokenKind::Name(name) => match name.as_str() {
                "True" => Ok(Expr::Literal(Value::Bool(true))),
                "False" => Ok(Expr::Literal(Value::Bool(false))),
                "None" => Ok(Expr::Literal(Value::None)),
                n if KEYWORDS.contains(&n) => {
                    self.pos -= 1;
                    Err(self.error())
                }
                _ => Ok(Expr::Name(name)),
            },
            TokenKind::Op("(") => {
                let expr = self.expression()?;
                self.expect_op(")")?;
                Ok(expr)
            }
            TokenKind::Op("[") => Ok(Expr::List(self.expression_list("]")?)),
            TokenKind::Eof => Err(ScriptError::syntax("unexpected EOF while parsing")),
            _ => {
                self.pos -= 1;
                Err(self.error())
            }
        }
    }
}
