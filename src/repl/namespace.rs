//! Session namespace
//!
//! The identifier → value mapping shared by the loop engine, the evaluation
//! backend and (by snapshot) the completer.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::host::{HostModule, HostObject};

/// A value bound in the session namespace
#[derive(Clone)]
pub enum Value {
    /// The absent value
    None,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Built-in function of the evaluation backend, by name
    Builtin(&'static str),
    /// Live object owned jointly with the host
    Object(Arc<dyn HostObject>),
    /// Host module (attribute namespace)
    Module(Arc<dyn HostModule>),
}

impl Value {
    /// Name of the value's type as shown in error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::None => "NoneType".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Float(_) => "float".to_string(),
            Value::Str(_) => "str".to_string(),
            Value::List(_) => "list".to_string(),
            Value::Builtin(_) => "builtin_function_or_method".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
            Value::Module(_) => "module".to_string(),
        }
    }

    /// Truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Builtin(_) | Value::Object(_) | Value::Module(_) => true,
        }
    }

    /// Developer-facing representation (what an interactive echo prints)
    pub fn repr(&self) -> String {
        match self {
            Value::None => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::Str(s) => quote(s),
            Value::List(items) => {
                let inner = items.iter().map(Value::repr).collect::<Vec<_>>();
                format!("[{}]", inner.join(", "))
            }
            Value::Builtin(name) => format!("<built-in function {}>", name),
            Value::Object(obj) => obj.repr(),
            Value::Module(module) => format!("<module '{}'>", module.name()),
        }
    }

    /// Attribute lookup on objects and modules
    pub fn attr(
        &self,
        name: &str,
    ) -> Option<Value> {
        match self {
            Value::Object(obj) => obj.attr(name),
            Value::Module(module) => match name {
                "__version__" => Some(Value::Str(module.version().to_string())),
                "ARCH" => Some(Value::Str(module.arch().to_string())),
                _ => module
                    .exports()
                    .into_iter()
                    .find(|(export, _)| export == name)
                    .map(|(_, value)| value),
            },
            _ => None,
        }
    }

    /// Attribute names, for `dir(value)`
    pub fn attr_names(&self) -> Vec<String> {
        match self {
            Value::Object(obj) => obj.attr_names(),
            Value::Module(module) => {
                let mut names = vec!["ARCH".to_string(), "__version__".to_string()];
                names.extend(module.exports().into_iter().map(|(name, _)| name));
                names
            }
            _ => Vec::new(),
        }
    }
}

impl PartialEq for Value {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Module(a), Value::Module(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.repr()),
        }
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}inf", sign)
    } else {
        value.to_string()
    }
}

fn quote(s: &str) -> String {
    let delim = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

/// Session namespace
///
/// Insertion-ordered so `dir()` lists names in definition order.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    bindings: IndexMap<String, Value>,
}

impl Namespace {
    /// Create an empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binding
    pub fn get(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Bind (or rebind) a name, returning the previous value
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: Value,
    ) -> Option<Value> {
        self.bindings.insert(name.into(), value)
    }

    /// Remove a binding
    pub fn remove(
        &mut self,
        name: &str,
    ) -> Option<Value> {
        self.bindings.shift_remove(name)
    }

    /// Whether a name is bound
    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names in definition order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    /// Bindings in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Namespace {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            bindings: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
