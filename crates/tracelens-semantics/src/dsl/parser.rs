//! Recursive-descent parser for action bodies.
//!
//! Binary operators are parsed by precedence climbing; the conditional
//! operator sits below all of them and associates to the right. Parsing
//! stops at the first error.
//!
//! Nesting is bounded by [`MAX_NESTING`]. Every level of parentheses,
//! unary operators, blocks and every operator or postfix chained onto an
//! expression counts, so the tree handed to the interpreter is never deeper
//! than that.

use super::ast::{BinaryOp, Body, Expr, ExprKind, Span, Stmt, StmtKind, UnaryOp};
use super::diagnostics::CompileError;
use super::lexer::{Token, TokenKind, lex};

/// Functions callable without a receiver.
pub const BUILTINS: &[&str] = &["int", "float", "str", "len"];

/// Deepest nesting an action body may use.
pub const MAX_NESTING: u32 = 256;

type PResult<T> = Result<T, CompileError>;

pub fn parse(source: &str) -> PResult<Body> {
    let mut parser = Parser {
        source,
        tokens: lex(source),
        pos: 0,
        depth: 0,
    };
    parser.parse_body()
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    depth: u32,
}

impl Parser<'_> {
    fn peek(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.kind)
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.at(kind).then(|| self.bump())
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token> {
        match self.eat(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected(kind.describe())),
        }
    }

    /// Span of the next token, or an empty span at the end of input.
    fn next_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(token) => token.span.clone(),
            None => self.source.len()..self.source.len(),
        }
    }

    /// End of the last consumed token.
    fn last_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map_or(0, |i| self.tokens[i].span.end)
    }

    fn text(&self, span: &Span) -> &str {
        &self.source[span.clone()]
    }

    fn enter_nesting(&mut self) -> PResult<()> {
        if self.depth >= MAX_NESTING {
            return Err(CompileError::new(
                "action body is nested too deeply",
                self.next_span(),
            ));
        }
        self.depth += 1;
        Ok(())
    }

    fn exit_nesting(&mut self, levels: u32) {
        self.depth = self.depth.saturating_sub(levels);
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let span = self.next_span();
        let found = match self.peek() {
            None => "end of input".to_owned(),
            Some(TokenKind::Garbage) => format!("`{}`", self.text(&span)),
            Some(kind) => kind.describe().to_owned(),
        };
        CompileError::new(format!("expected {expected}, found {found}"), span)
    }

    fn parse_body(&mut self) -> PResult<Body> {
        if self.tokens.is_empty() {
            return Err(CompileError::new("empty action body", 0..self.source.len()));
        }

        let starts_statement = matches!(
            self.peek(),
            Some(TokenKind::Let | TokenKind::Return | TokenKind::If | TokenKind::Throw)
        );
        if !starts_statement {
            let expr = self.parse_expr()?;
            if self.peek().is_none() {
                return Ok(Body::Expr(expr));
            }
            self.pos = 0;
        }

        let mut stmts = Vec::new();
        while self.peek().is_some() {
            stmts.push(self.parse_stmt()?);
        }
        Ok(Body::Block(stmts))
    }

    fn parse_block(&mut self) -> PResult<Vec<Stmt>> {
        self.expect(TokenKind::BraceOpen)?;
        self.enter_nesting()?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::BraceClose) {
            if self.peek().is_none() {
                return Err(self.unexpected("`}`"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.bump();
        self.exit_nesting(1);
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        let start = self.next_span().start;
        let kind = match self.peek() {
            Some(TokenKind::Let) => {
                self.bump();
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(&name.span).to_owned();
                self.expect(TokenKind::Assign)?;
                let value = self.parse_expr()?;
                self.end_statement()?;
                StmtKind::Let { name, value }
            }
            Some(TokenKind::Return) => {
                self.bump();
                let value = if self.ends_statement() {
                    None
                } else {
                    Some(self.parse_expr()?)
                };
                self.end_statement()?;
                StmtKind::Return(value)
            }
            Some(TokenKind::If) => return self.parse_if(),
            Some(TokenKind::Throw) => {
                self.bump();
                let value = self.parse_expr()?;
                self.end_statement()?;
                StmtKind::Throw(value)
            }
            _ => {
                let expr = self.parse_expr()?;
                self.end_statement()?;
                StmtKind::Expr(expr)
            }
        };
        Ok(Stmt {
            kind,
            span: start..self.last_end(),
        })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.expect(TokenKind::If)?.span.start;
        self.enter_nesting()?;
        self.expect(TokenKind::ParenOpen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::ParenClose)?;
        let then = self.parse_block()?;
        let otherwise = if self.eat(TokenKind::Else).is_some() {
            if self.at(TokenKind::If) {
                Some(vec![self.parse_if()?])
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        self.exit_nesting(1);
        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then,
                otherwise,
            },
            span: start..self.last_end(),
        })
    }

    fn ends_statement(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(TokenKind::Semicolon | TokenKind::BraceClose)
        )
    }

    /// Semicolons may be left out before `}` and at the end of the body.
    fn end_statement(&mut self) -> PResult<()> {
        if self.eat(TokenKind::Semicolon).is_some() || self.ends_statement() {
            return Ok(());
        }
        Err(self.unexpected("`;`"))
    }

    fn parse_expr(&mut self) -> PResult<Expr> {
        self.enter_nesting()?;
        let expr = self.parse_conditional()?;
        self.exit_nesting(1);
        Ok(expr)
    }

    fn parse_conditional(&mut self) -> PResult<Expr> {
        let cond = self.parse_binary(0)?;
        if self.eat(TokenKind::Question).is_none() {
            return Ok(cond);
        }
        let then = self.parse_expr()?;
        self.expect(TokenKind::Colon)?;
        let otherwise = self.parse_expr()?;
        let span = cond.span.start..otherwise.span.end;
        Ok(Expr {
            kind: ExprKind::Conditional {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            },
            span,
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        let mut chained = 0;
        while let Some(op) = self.peek().and_then(binary_op) {
            let precedence = op.precedence();
            if precedence <= min_precedence {
                break;
            }
            self.bump();
            self.enter_nesting()?;
            chained += 1;
            let rhs = self.parse_binary(precedence)?;
            let span = lhs.span.start..rhs.span.end;
            lhs = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            };
        }
        self.exit_nesting(chained);
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => UnaryOp::Neg,
            Some(TokenKind::Bang) => UnaryOp::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.bump().span.start;
        self.enter_nesting()?;
        let operand = self.parse_unary()?;
        self.exit_nesting(1);
        let span = start..operand.span.end;
        Ok(Expr {
            kind: ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        })
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        let mut chained = 0;
        loop {
            let start = expr.span.start;
            if matches!(
                self.peek(),
                Some(TokenKind::Dot | TokenKind::BracketOpen)
            ) {
                self.enter_nesting()?;
                chained += 1;
            }
            if self.eat(TokenKind::Dot).is_some() {
                let name = self.expect(TokenKind::Ident)?;
                let name = self.text(&name.span).to_owned();
                let kind = if self.at(TokenKind::ParenOpen) {
                    ExprKind::Call {
                        target: Box::new(expr),
                        name,
                        args: self.parse_args()?,
                    }
                } else {
                    ExprKind::Member {
                        target: Box::new(expr),
                        name,
                    }
                };
                expr = self.finish(kind, start);
            } else if self.eat(TokenKind::BracketOpen).is_some() {
                let index = self.parse_expr()?;
                self.expect(TokenKind::BracketClose)?;
                let kind = ExprKind::Index {
                    target: Box::new(expr),
                    index: Box::new(index),
                };
                expr = self.finish(kind, start);
            } else {
                self.exit_nesting(chained);
                return Ok(expr);
            }
        }
    }

    fn finish(&self, kind: ExprKind, start: usize) -> Expr {
        Expr {
            kind,
            span: start..self.last_end(),
        }
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.parse_list(TokenKind::ParenOpen, TokenKind::ParenClose)
    }

    /// Comma-separated expressions between `open` and `close`. A trailing
    /// comma is allowed.
    fn parse_list(&mut self, open: TokenKind, close: TokenKind) -> PResult<Vec<Expr>> {
        self.expect(open)?;
        let mut items = Vec::new();
        while !self.at(close) {
            items.push(self.parse_expr()?);
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let span = self.next_span();
        let kind = match self.peek() {
            Some(TokenKind::Number) => {
                self.bump();
                let text = self.text(&span);
                let n = text
                    .parse::<f64>()
                    .map_err(|_| CompileError::new(format!("invalid number `{text}`"), span.clone()))?;
                ExprKind::Number(n)
            }
            Some(TokenKind::Str) => {
                self.bump();
                ExprKind::Str(unescape(self.text(&span), span.start)?)
            }
            Some(TokenKind::True) => {
                self.bump();
                ExprKind::Bool(true)
            }
            Some(TokenKind::False) => {
                self.bump();
                ExprKind::Bool(false)
            }
            Some(TokenKind::Null) => {
                self.bump();
                ExprKind::Null
            }
            Some(TokenKind::SelfKw) => {
                self.bump();
                ExprKind::SelfNode
            }
            Some(TokenKind::Ident) => {
                self.bump();
                let name = self.text(&span).to_owned();
                if self.at(TokenKind::ParenOpen) {
                    if !BUILTINS.contains(&name.as_str()) {
                        return Err(CompileError::new(format!("unknown function `{name}`"), span));
                    }
                    ExprKind::Builtin {
                        name,
                        args: self.parse_args()?,
                    }
                } else {
                    ExprKind::Var(name)
                }
            }
            Some(TokenKind::ParenOpen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::ParenClose)?;
                return Ok(Expr {
                    kind: inner.kind,
                    span: span.start..self.last_end(),
                });
            }
            Some(TokenKind::BracketOpen) => {
                ExprKind::List(self.parse_list(TokenKind::BracketOpen, TokenKind::BracketClose)?)
            }
            _ => return Err(self.unexpected("expression")),
        };
        Ok(self.finish(kind, span.start))
    }
}

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    let op = match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        _ => return None,
    };
    Some(op)
}

/// Decode a quoted string literal. `offset` is the literal's position in
/// the body, for error ranges.
fn unescape(literal: &str, offset: usize) -> PResult<String> {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            break;
        };
        let decoded = match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            '\\' | '"' | '\'' => escaped,
            other => {
                let start = offset + 1 + i;
                let end = start + 1 + other.len_utf8();
                return Err(CompileError::new(
                    format!("unknown escape sequence `\\{other}`"),
                    start..end,
                ));
            }
        };
        out.push(decoded);
    }
    Ok(out)
}
