//! Tree-walking interpreter for compiled action bodies.

use tracelens_core::{CstId, Trace};

use super::ast::{BinaryOp, Body, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use crate::action::{Action, ActionContext, ActionError, ActionResult};
use crate::evaluator::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::value::{Value, format_number};

type Eval<T> = Result<T, ActionError>;

/// A parsed action body, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledAction {
    params: Vec<String>,
    formals: Vec<String>,
    body: Body,
}

impl CompiledAction {
    pub(crate) fn new(params: Vec<String>, formals: Vec<String>, body: Body) -> Self {
        Self {
            params,
            formals,
            body,
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Body {
        &self.body
    }
}

impl Action for CompiledAction {
    fn call(&self, ctx: &mut ActionContext<'_>) -> ActionResult {
        let children = ctx.children();
        // Without parameters the body works on `self` alone.
        if !self.params.is_empty() && self.params.len() != children.len() {
            return Err(fail(format!(
                "action for `{}` takes {} parameter(s), but the node has {} child(ren)",
                ctx.ctor_name(),
                self.params.len(),
                children.len()
            )));
        }

        let mut vars = Vec::with_capacity(self.formals.len() + self.params.len());
        for formal in &self.formals {
            let value = ctx.arg(formal).cloned().unwrap_or_default();
            vars.push((formal.clone(), value));
        }
        for (param, &child) in self.params.iter().zip(children) {
            vars.push((param.clone(), Value::Node(child)));
        }

        let mut interp = Interp { ctx, vars };
        match &self.body {
            Body::Expr(expr) => interp.eval(expr),
            Body::Block(stmts) => match interp.exec_block(stmts)? {
                Flow::Return(value) => Ok(value),
                Flow::Next => Ok(Value::Null),
            },
        }
    }
}

enum Flow {
    Next,
    Return(Value),
}

struct Interp<'c, 'a> {
    ctx: &'c mut ActionContext<'a>,
    /// Innermost binding last.
    vars: Vec<(String, Value)>,
}

fn fail(message: impl Into<String>) -> ActionError {
    ActionError::raised(message)
}

impl<'a> Interp<'_, 'a> {
    fn trace(&self) -> &'a Trace {
        self.ctx.trace()
    }

    fn exec_block(&mut self, stmts: &[Stmt]) -> Eval<Flow> {
        let mark = self.vars.len();
        let mut flow = Flow::Next;
        for stmt in stmts {
            flow = self.exec(stmt)?;
            if matches!(flow, Flow::Return(_)) {
                break;
            }
        }
        self.vars.truncate(mark);
        Ok(flow)
    }

    fn exec(&mut self, stmt: &Stmt) -> Eval<Flow> {
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                let value = self.eval(value)?;
                self.vars.push((name.clone(), value));
            }
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Null,
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.is_truthy() {
                    return self.exec_block(then);
                }
                if let Some(otherwise) = otherwise {
                    return self.exec_block(otherwise);
                }
            }
            StmtKind::Throw(value) => {
                let value = self.eval(value)?;
                return Err(fail(value.to_text()));
            }
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
        }
        Ok(Flow::Next)
    }

    fn eval(&mut self, expr: &Expr) -> Eval<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_expr(expr))
    }

    fn eval_expr(&mut self, expr: &Expr) -> Eval<Value> {
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::String(s.clone())),
            ExprKind::List(items) => Ok(Value::List(self.eval_all(items)?)),
            ExprKind::Var(name) => self
                .vars
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .ok_or_else(|| fail(format!("unknown variable `{name}`"))),
            ExprKind::SelfNode => Ok(Value::Node(self.ctx.node())),
            ExprKind::Member { target, name } => {
                let target = self.eval(target)?;
                self.member(target, name)
            }
            ExprKind::Call { target, name, args } => {
                let target = self.eval(target)?;
                let args = self.eval_all(args)?;
                self.call_method(target, name, args)
            }
            ExprKind::Builtin { name, args } => {
                let args = self.eval_all(args)?;
                builtin(self.trace(), name, args)
            }
            ExprKind::Index { target, index } => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                self.index(target, &index)
            }
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                    UnaryOp::Neg => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        other => Err(fail(format!("cannot negate {}", other.type_name()))),
                    },
                }
            }
            ExprKind::Binary { op, lhs, rhs } => {
                let lhs = self.eval(lhs)?;
                match op {
                    BinaryOp::And if !lhs.is_truthy() => Ok(lhs),
                    BinaryOp::Or if lhs.is_truthy() => Ok(lhs),
                    BinaryOp::And | BinaryOp::Or => self.eval(rhs),
                    _ => {
                        let rhs = self.eval(rhs)?;
                        binary(*op, lhs, rhs)
                    }
                }
            }
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.is_truthy() {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    fn eval_all(&mut self, exprs: &[Expr]) -> Eval<Vec<Value>> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    fn member(&mut self, target: Value, name: &str) -> Eval<Value> {
        match target {
            Value::Node(id) => self.node_member(id, name),
            Value::List(items) if name == "length" => Ok(Value::from(items.len() as i64)),
            Value::String(s) if name == "length" => Ok(Value::from(s.chars().count() as i64)),
            other => Err(fail(format!(
                "cannot read `{name}` of {}",
                other.type_name()
            ))),
        }
    }

    fn node_member(&mut self, id: CstId, name: &str) -> Eval<Value> {
        if let Some(op) = self.ctx.semantics().operation(name) {
            if op.is_attribute() {
                return self.ctx.apply(id, name, Vec::new());
            }
            return Err(fail(format!(
                "operation `{name}` must be called, as in `x.{name}()`"
            )));
        }

        let trace = self.trace();
        let node = trace.cst(id);
        let value = match name {
            "source" => Value::from(trace.source_string(id)),
            "ctor" => Value::from(node.ctor_name()),
            "start" => Value::from(node.interval.start as i64),
            "end" => Value::from(node.interval.end as i64),
            "count" => Value::from(node.children.len() as i64),
            "children" => Value::List(node.children.iter().map(|&c| Value::Node(c)).collect()),
            _ => return Err(fail(format!("node has no member `{name}`"))),
        };
        Ok(value)
    }

    fn call_method(&mut self, target: Value, name: &str, args: Vec<Value>) -> Eval<Value> {
        match target {
            Value::Node(id) => {
                if self.ctx.semantics().operation(name).is_some() {
                    return self.ctx.apply(id, name, args);
                }
                if name == "child" {
                    let [index] = expect_args::<1>(name, args)?;
                    let children = &self.trace().cst(id).children;
                    let i = as_index(&index, children.len())?;
                    return Ok(Value::Node(children[i]));
                }
                Err(fail(format!("node has no method `{name}`")))
            }
            Value::List(items) if name == "join" => {
                let [separator] = expect_args::<1>(name, args)?;
                let Value::String(separator) = separator else {
                    return Err(fail(format!(
                        "`join` expects a string separator, got {}",
                        separator.type_name()
                    )));
                };
                let parts: Vec<String> = items.iter().map(Value::to_text).collect();
                Ok(Value::String(parts.join(&separator)))
            }
            other => Err(fail(format!(
                "{} has no method `{name}`",
                other.type_name()
            ))),
        }
    }

    fn index(&self, target: Value, index: &Value) -> Eval<Value> {
        match target {
            Value::List(mut items) => {
                let i = as_index(index, items.len())?;
                Ok(items.swap_remove(i))
            }
            Value::String(s) => {
                let count = s.chars().count();
                let i = as_index(index, count)?;
                Ok(s.chars().nth(i).map(Value::from).unwrap_or_default())
            }
            Value::Node(id) => {
                let children = &self.trace().cst(id).children;
                let i = as_index(index, children.len())?;
                Ok(Value::Node(children[i]))
            }
            other => Err(fail(format!("cannot index {}", other.type_name()))),
        }
    }
}

fn expect_args<const N: usize>(name: &str, args: Vec<Value>) -> Eval<[Value; N]> {
    let got = args.len();
    args.try_into()
        .map_err(|_| fail(format!("`{name}` expects {N} argument(s), got {got}")))
}

fn as_index(index: &Value, len: usize) -> Eval<usize> {
    let Value::Number(n) = index else {
        return Err(fail(format!(
            "index must be a number, got {}",
            index.type_name()
        )));
    };
    if n.fract() != 0.0 || *n < 0.0 || *n >= len as f64 {
        return Err(fail(format!(
            "index {} out of range for length {len}",
            format_number(*n)
        )));
    }
    Ok(*n as usize)
}

fn builtin(trace: &Trace, name: &str, args: Vec<Value>) -> Eval<Value> {
    let [value] = expect_args::<1>(name, args)?;
    match name {
        "str" => Ok(Value::String(value.to_text())),
        "int" => to_number(&value).map(|n| Value::Number(n.trunc())),
        "float" => to_number(&value).map(Value::Number),
        "len" => match value {
            Value::List(items) => Ok(Value::from(items.len() as i64)),
            Value::String(s) => Ok(Value::from(s.chars().count() as i64)),
            Value::Node(id) => Ok(Value::from(trace.cst(id).children.len() as i64)),
            other => Err(fail(format!("{} has no length", other.type_name()))),
        },
        _ => Err(fail(format!("unknown function `{name}`"))),
    }
}

fn to_number(value: &Value) -> Eval<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| fail(format!("cannot convert {value} to a number"))),
        other => Err(fail(format!(
            "cannot convert {} to a number",
            other.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Eval<Value> {
    let mismatch = |lhs: &Value, rhs: &Value| {
        fail(format!(
            "cannot apply `{}` to {} and {}",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ))
    };

    match op {
        BinaryOp::Eq => return Ok(Value::Bool(lhs == rhs)),
        BinaryOp::NotEq => return Ok(Value::Bool(lhs != rhs)),
        BinaryOp::Add => {
            return match (lhs, rhs) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::List(mut a), Value::List(b)) => {
                    a.extend(b);
                    Ok(Value::List(a))
                }
                (a @ Value::String(_), b) | (a, b @ Value::String(_)) => {
                    Ok(Value::String(a.to_text() + &b.to_text()))
                }
                (a, b) => Err(mismatch(&a, &b)),
            };
        }
        _ => {}
    }

    if let (Value::String(a), Value::String(b)) = (&lhs, &rhs) {
        let ordering = a.cmp(b);
        return match op {
            BinaryOp::Lt => Ok(Value::Bool(ordering.is_lt())),
            BinaryOp::LtEq => Ok(Value::Bool(ordering.is_le())),
            BinaryOp::Gt => Ok(Value::Bool(ordering.is_gt())),
            BinaryOp::GtEq => Ok(Value::Bool(ordering.is_ge())),
            _ => Err(mismatch(&lhs, &rhs)),
        };
    }

    let (Value::Number(a), Value::Number(b)) = (&lhs, &rhs) else {
        return Err(mismatch(&lhs, &rhs));
    };
    let (a, b) = (*a, *b);
    let value = match op {
        BinaryOp::Sub => Value::Number(a - b),
        BinaryOp::Mul => Value::Number(a * b),
        BinaryOp::Div | BinaryOp::Rem if b == 0.0 => return Err(fail("division by zero")),
        BinaryOp::Div => Value::Number(a / b),
        BinaryOp::Rem => Value::Number(a % b),
        BinaryOp::Lt => Value::Bool(a < b),
        BinaryOp::LtEq => Value::Bool(a <= b),
        BinaryOp::Gt => Value::Bool(a > b),
        BinaryOp::GtEq => Value::Bool(a >= b),
        BinaryOp::Add | BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            unreachable!("handled above")
        }
    };
    Ok(value)
}
