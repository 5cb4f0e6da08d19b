//! Tree-walking interpreter

use std::cmp::Ordering;

use crate::repl::backend_trait::ScriptError;
use crate::repl::namespace::{Namespace, Value};

use super::ast::{BinOp, CmpOp, Expr, Stmt, UnaryOp};

/// Built-in functions, sorted
pub const BUILTINS: &[&str] = &[
    "abs", "bool", "dir", "float", "int", "len", "max", "min", "print", "repr", "str",
];

type EvalResult<T> = Result<T, ScriptError>;

fn type_error(message: impl Into<String>) -> ScriptError {
    ScriptError::runtime("TypeError", message)
}

fn overflow() -> ScriptError {
    ScriptError::runtime("OverflowError", "integer overflow")
}

/// Executes statements against a namespace, collecting printed lines
pub struct Interpreter<'a> {
    namespace: &'a mut Namespace,
    output: Vec<String>,
    /// Echo the repr of expression statements
    echo: bool,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        namespace: &'a mut Namespace,
        echo: bool,
    ) -> Self {
        Self {
            namespace,
            output: Vec::new(),
            echo,
        }
    }

    /// Lines produced so far
    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    pub fn execute(
        &mut self,
        stmts: &[Stmt],
    ) -> EvalResult<()> {
        for stmt in stmts {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(
        &mut self,
        stmt: &Stmt,
    ) -> EvalResult<()> {
        match stmt {
            Stmt::Expr(expr) => {
                let value = self.eval(expr)?;
                if self.echo && value != Value::None {
                    self.output.push(value.repr());
                }
            }
            Stmt::Assign(targets, expr) => {
                let value = self.eval(expr)?;
                for target in targets {
                    self.namespace.insert(target.clone(), value.clone());
                }
            }
            Stmt::AugAssign(target, op, expr) => {
                let current = self.lookup(target)?;
                let rhs = self.eval(expr)?;
                let value = binary(*op, &current, &rhs)?;
                self.namespace.insert(target.clone(), value);
            }
            Stmt::Del(names) => {
                for name in names {
                    if self.namespace.remove(name).is_none() {
                        return Err(name_error(name));
                    }
                }
            }
            Stmt::Pass => {}
            Stmt::If { branches, orelse } => {
                for (condition, body) in branches {
                    if self.eval(condition)?.is_truthy() {
                        return self.execute(body);
                    }
                }
                self.execute(orelse)?;
            }
        }
        Ok(())
    }

    fn lookup(
        &self,
        name: &str,
    ) -> EvalResult<Value> {
        if let Some(value) = self.namespace.get(name) {
            return Ok(value.clone());
        }
        BUILTINS
            .iter()
            .find(|b| **b == name)
            .copied()
            .map(Value::Builtin)
            .ok_or_else(|| name_error(name))
    }

    fn eval(
        &mut self,
        expr: &Expr,
    ) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Name(name) => self.lookup(name),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::List(values))
            }
            Expr::Attr(target, name) => {
                let target = self.eval(target)?;
                target.attr(name).ok_or_else(|| attribute_error(&target, name))
            }
            Expr::Index(target, index) => {
                let target = self.eval(target)?;
                let index = self.eval(index)?;
                subscript(&target, &index)
            }
            Expr::Call(callee, args) => {
                let callee = self.eval(callee)?;
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<EvalResult<Vec<_>>>()?;
                match callee {
                    Value::Builtin(name) => self.call_builtin(name, args),
                    other => Err(type_error(format!(
                        "'{}' object is not callable",
                        other.type_name()
                    ))),
                }
            }
            Expr::Unary(op, operand) => {
                let value = self.eval(operand)?;
                unary(*op, &value)
            }
            Expr::Binary(op, left, right) => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary(*op, &left, &right)
            }
            Expr::Compare(first, rest) => {
                let mut left = self.eval(first)?;
                for (op, right) in rest {
                    let right = self.eval(right)?;
                    if !compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }
            Expr::And(left, right) => {
                let left = self.eval(left)?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
            Expr::Or(left, right) => {
                let left = self.eval(left)?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right)
            }
        }
    }

    fn call_builtin(
        &mut self,
        name: &'static str,
        args: Vec<Value>,
    ) -> EvalResult<Value> {
        match name {
            "print" => {
                let line = args
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                self.output.push(line);
                Ok(Value::None)
            }
            "dir" => match args.as_slice() {
                [] => {
                    let mut names: Vec<_> = self.namespace.names().map(str::to_string).collect();
                    names.sort();
                    Ok(string_list(names))
                }
                [value] => {
                    let mut names = value.attr_names();
                    names.sort();
                    Ok(string_list(names))
                }
                _ => Err(arity(name, "at most 1", args.len())),
            },
            "bool" => match args.as_slice() {
                [] => Ok(Value::Bool(false)),
                [value] => Ok(Value::Bool(value.is_truthy())),
                _ => Err(arity(name, "at most 1", args.len())),
            },
            "min" | "max" => min_max(name, args),
            _ => {
                let [value] = args.as_slice() else {
                    return Err(arity(name, "exactly one", args.len()));
                };
                match name {
                    "abs" => match value {
                        Value::Int(i) => i.checked_abs().map(Value::Int).ok_or_else(overflow),
                        Value::Bool(b) => Ok(Value::Int(*b as i64)),
                        Value::Float(f) => Ok(Value::Float(f.abs())),
                        other => Err(type_error(format!(
                            "bad operand type for abs(): '{}'",
                            other.type_name()
                        ))),
                    },
                    "len" => match value {
                        Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                        Value::List(items) => Ok(Value::Int(items.len() as i64)),
                        other => Err(type_error(format!(
                            "object of type '{}' has no len()",
                            other.type_name()
                        ))),
                    },
                    "str" => Ok(Value::Str(value.to_string())),
                    "repr" => Ok(Value::Str(value.repr())),
                    "int" => to_int(value),
                    "float" => to_float(value),
                    _ => Err(name_error(name)),
                }
            }
        }
    }
}

fn name_error(name: &str) -> ScriptError {
    ScriptError::runtime("NameError", format!("name '{}' is not defined", name))
}

fn attribute_error(
    target: &Value,
    name: &str,
) -> ScriptError {
    let message = match target {
        Value::Module(module) => {
            format!("module '{}' has no attribute '{}'", module.name(), name)
        }
        other => format!(
            "'{}' object has no attribute '{}'",
            other.type_name(),
            name
        ),
    };
    ScriptError::runtime("AttributeError", message)
}

fn arity(
    name: &str,
    expected: &str,
    given: usize,
) -> ScriptError {
    type_error(format!(
        "{}() takes {} argument ({} given)",
        name, expected, given
    ))
}

fn string_list(names: Vec<String>) -> Value {
    Value::List(names.into_iter().map(Value::Str).collect())
}

fn min_max(
    name: &str,
    args: Vec<Value>,
) -> EvalResult<Value> {
    let items = match args.len() {
        0 => {
            return Err(type_error(format!(
                "{} expected at least 1 argument, got 0",
                name
            )))
        }
        1 => match args.into_iter().next() {
            Some(Value::List(items)) => items,
            Some(other) => {
                return Err(type_error(format!(
                    "'{}' object is not iterable",
                    other.type_name()
                )))
            }
            None => Vec::new(),
        },
        _ => args,
    };

    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Err(ScriptError::runtime(
            "ValueError",
            format!("{}() arg is an empty sequence", name),
        ));
    };
    let wanted = if name == "max" {
        Ordering::Greater
    } else {
        Ordering::Less
    };
    for item in iter {
        if order(&item, &best, if name == "max" { ">" } else { "<" })? == wanted {
            best = item;
        }
    }
    Ok(best)
}

fn to_int(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) => {
            if f.is_nan() {
                Err(ScriptError::runtime(
                    "ValueError",
                    "cannot convert float NaN to integer",
                ))
            } else if f.is_infinite() {
                Err(ScriptError::runtime(
                    "OverflowError",
                    "cannot convert float infinity to integer",
                ))
            } else if f.abs() >= 9.223_372_036_854_775_807e18 {
                Err(overflow())
            } else {
                Ok(Value::Int(f.trunc() as i64))
            }
        }
        Value::Str(s) => s.trim().replace('_', "").parse().map(Value::Int).map_err(|_| {
            ScriptError::runtime(
                "ValueError",
                format!("invalid literal for int() with base 10: {}", value.repr()),
            )
        }),
        other => Err(type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => {
            let text = s.trim().to_ascii_lowercase();
            let parsed = match text.as_str() {
                "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
                "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => other.parse::<f64>(),
            };
            parsed.map(Value::Float).map_err(|_| {
                ScriptError::runtime(
                    "ValueError",
                    format!("could not convert string to float: {}", value.repr()),
                )
            })
        }
        other => Err(type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Numeric view of a value; bools count as ints
#[derive(Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

fn number(value: &Value) -> Option<Num> {
    match value {
        Value::Int(i) => Some(Num::Int(*i)),
        Value::Bool(b) => Some(Num::Int(*b as i64)),
        Value::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

impl Num {
    fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }
}

fn unary(
    op: UnaryOp,
    value: &Value,
) -> EvalResult<Value> {
    match (op, number(value)) {
        (UnaryOp::Not, _) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Some(Num::Int(i))) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        (UnaryOp::Neg, Some(Num::Float(f))) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Some(Num::Int(i))) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Some(Num::Float(f))) => Ok(Value::Float(f)),
        (op, None) => {
            let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
            Err(type_error(format!(
                "bad operand type for unary {}: '{}'",
                symbol,
                value.type_name()
            )))
        }
    }
}

fn unsupported(
    op: BinOp,
    left: &Value,
    right: &Value,
) -> ScriptError {
    type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

/// Largest sequence repetition will build (items, or bytes for strings)
pub const MAX_REPEAT_LEN: usize = 1 << 24;

/// Length of `len` repeated `count` times, or a `MemoryError` past the cap
fn repeat_len(
    len: usize,
    count: i64,
) -> EvalResult<usize> {
    if len == 0 || count <= 0 {
        return Ok(0);
    }
    usize::try_from(count)
        .ok()
        .and_then(|count| len.checked_mul(count))
        .filter(|total| *total <= MAX_REPEAT_LEN)
        .ok_or_else(|| ScriptError::runtime("MemoryError", "repeated sequence is too large"))
}

fn repeat<T: Clone>(
    items: &[T],
    count: i64,
) -> EvalResult<Vec<T>> {
    let total = repeat_len(items.len(), count)?;
    let mut out = Vec::with_capacity(total);
    while out.len() < total {
        out.extend_from_slice(items);
    }
    Ok(out)
}

fn binary(
    op: BinOp,
    left: &Value,
    right: &Value,
) -> EvalResult<Value> {
    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => return Ok(Value::Str(format!("{}{}", a, b))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            return Ok(Value::List(items));
        }
        (BinOp::Mul, Value::Str(s), Value::Int(n)) | (BinOp::Mul, Value::Int(n), Value::Str(s)) => {
            let total = repeat_len(s.len(), *n)?;
            return Ok(Value::Str(s.repeat(total / s.len().max(1))));
        }
        (BinOp::Mul, Value::List(items), Value::Int(n))
        | (BinOp::Mul, Value::Int(n), Value::List(items)) => {
            return Ok(Value::List(repeat(items, *n)?));
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (number(left), number(right)) else {
        return Err(unsupported(op, left, right));
    };

    match (a, b) {
        (Num::Int(a), Num::Int(b)) => int_binary(op, a, b),
        (a, b) => float_binary(op, a.as_f64(), b.as_f64()),
    }
}

fn int_binary(
    op: BinOp,
    a: i64,
    b: i64,
) -> EvalResult<Value> {
    let zero = |message: &str| ScriptError::runtime("ZeroDivisionError", message);
    let result = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(zero("division by zero"));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(zero("integer division or modulo by zero"));
            }
            a.checked_div(b).and_then(|q| {
                if (a % b != 0) && ((a < 0) != (b < 0)) {
                    q.checked_sub(1)
                } else {
                    Some(q)
                }
            })
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(zero("integer modulo by zero"));
            }
            a.checked_rem(b).map(|r| {
                if r != 0 && ((r < 0) != (b < 0)) {
                    r + b
                } else {
                    r
                }
            })
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(zero("0.0 cannot be raised to a negative power"));
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|exp| a.checked_pow(exp))
        }
    };
    result.map(Value::Int).ok_or_else(overflow)
}

fn float_binary(
    op: BinOp,
    a: f64,
    b: f64,
) -> EvalResult<Value> {
    let zero = |message: &str| -> EvalResult<Value> {
        Err(ScriptError::runtime("ZeroDivisionError", message))
    };
    let value = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return zero("float division by zero");
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return zero("float floor division by zero");
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return zero("float modulo");
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return zero("0.0 cannot be raised to a negative power");
            }
            a.powf(b)
        }
    };
    Ok(Value::Float(value))
}

fn subscript(
    target: &Value,
    index: &Value,
) -> EvalResult<Value> {
    let position = |len: usize, what: &str| -> EvalResult<usize> {
        let i = match index {
            Value::Int(i) => *i,
            Value::Bool(b) => *b as i64,
            other => {
                return Err(type_error(format!(
                    "{} indices must be integers, not {}",
                    what,
                    other.type_name()
                )))
            }
        };
        let resolved = if i < 0 { i + len as i64 } else { i };
        if resolved < 0 || resolved >= len as i64 {
            return Err(ScriptError::runtime(
                "IndexError",
                format!("{} index out of range", what),
            ));
        }
        Ok(resolved as usize)
    };

    match target {
        Value::List(items) => {
            let i = position(items.len(), "list")?;
            Ok(items[i].clone())
        }
        Value::Str(s) => {
            let chars: Vec<char> = s.chars().collect();
            let i = position(chars.len(), "string")?;
            Ok(Value::Str(chars[i].to_string()))
        }
        other => Err(type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

/// Ordering for `<`-style comparisons
fn order(
    left: &Value,
    right: &Value,
    symbol: &str,
) -> EvalResult<Ordering> {
    let unorderable = || {
        type_error(format!(
            "'{}' not supported between instances of '{}' and '{}'",
            symbol,
            left.type_name(),
            right.type_name()
        ))
    };
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return order(x, y, symbol);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => match (number(left), number(right)) {
            (Some(Num::Int(a)), Some(Num::Int(b))) => Ok(a.cmp(&b)),
            (Some(a), Some(b)) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .ok_or_else(unorderable),
            _ => Err(unorderable()),
        },
    }
}

fn compare(
    op: CmpOp,
    left: &Value,
    right: &Value,
) -> EvalResult<bool> {
    let symbol = op.symbol();
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::Ne => Ok(left != right),
        CmpOp::Lt => Ok(order(left, right, symbol)? == Ordering::Less),
        CmpOp::Le => Ok(order(left, right, symbol)? != Ordering::Greater),
        CmpOp::Gt => Ok(order(left, right, symbol)? == Ordering::Greater),
        CmpOp::Ge => Ok(order(left, right, symbol)? != Ordering::Less),
        CmpOp::In | CmpOp::NotIn => {
            let found = match right {
                Value::List(items) => items.contains(left),
                Value::Str(haystack) => match left {
                    Value::Str(needle) => haystack.contains(needle.as_str()),
                    other => {
                        return Err(type_error(format!(
                            "'in <string>' requires string as left operand, not {}",
                            other.type_name()
                        )))
                    }
                },
                other => {
                    return Err(type_error(format!(
                        "argument of type '{}' is not iterable",
                        other.type_name()
                    )))
                }
            };
            Ok(found == (op == CmpOp::In))
        }
        CmpOp::Is | CmpOp::IsNot => {
            let same = std::mem::discriminant(left) == std::mem::discriminant(right) && left == right;
            Ok(same == (op == CmpOp::Is))
        }
    }
}
