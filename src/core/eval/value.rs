use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// What a [`Handle`] stands for. Decides which methods the host resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Bot,
    Context,
    Channel,
    User,
    Guild,
    Message,
}

impl HandleKind {
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Bot => "Bot",
            HandleKind::Context => "Context",
            HandleKind::Channel => "Channel",
            HandleKind::User => "User",
            HandleKind::Guild => "Guild",
            HandleKind::Message => "Message",
        }
    }
}

/// A capability object injected into the script environment.
///
/// Attributes are a snapshot taken when the session starts; everything else
/// accessed on a handle becomes a bound method resolved by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub kind: HandleKind,
    pub id: u64,
    pub label: String,
    pub attrs: BTreeMap<String, Value>,
}

impl Handle {
    pub fn new(kind: HandleKind, id: u64, label: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            label: label.into(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn into_value(self) -> Value {
        Value::Handle(Arc::new(self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
    Len,
    Str,
    Repr,
    Int,
    Float,
    Type,
    Abs,
    Min,
    Max,
    Sum,
    Exception(&'static str),
}

pub const EXCEPTION_KINDS: &[&str] = &[
    "Exception",
    "ValueError",
    "TypeError",
    "KeyError",
    "IndexError",
    "RuntimeError",
    "ZeroDivisionError",
    "NameError",
    "AttributeError",
];

impl Builtin {
    pub fn lookup(name: &str) -> Option<Builtin> {
        let builtin = match name {
            "print" => Builtin::Print,
            "len" => Builtin::Len,
            "str" => Builtin::Str,
            "repr" => Builtin::Repr,
            "int" => Builtin::Int,
            "float" => Builtin::Float,
            "type" => Builtin::Type,
            "abs" => Builtin::Abs,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "sum" => Builtin::Sum,
            other => {
                let kind = EXCEPTION_KINDS.iter().find(|kind| **kind == other)?;
                Builtin::Exception(*kind)
            }
        };
        Some(builtin)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Len => "len",
            Builtin::Str => "str",
            Builtin::Repr => "repr",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Type => "type",
            Builtin::Abs => "abs",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Exception(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Handle(Arc<Handle>),
    Builtin(Builtin),
    Method {
        receiver: Arc<Handle>,
        name: String,
    },
    Exception {
        kind: String,
        message: String,
    },
}

impl Value {
    /// Python truthiness: `None`, `False`, zero, and empty containers are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Handle(handle) => handle.kind.name(),
            Value::Builtin(Builtin::Exception(_)) => "type",
            Value::Builtin(_) => "builtin_function_or_method",
            Value::Method { .. } => "method",
            Value::Exception { kind, .. } => kind,
        }
    }

    /// Like Python's `repr()`; strings are quoted.
    pub fn repr(&self) -> String {
        match self {
            Value::Str(s) => quote(s),
            Value::Handle(handle) => format!(
                "<{} id={} name={}>",
                handle.kind.name(),
                handle.id,
                quote(&handle.label)
            ),
            Value::Exception { kind, message } => format!("{}({})", kind, quote(message)),
            other => other.to_string(),
        }
    }
}

fn quote(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\t', "\\t");
    format!("'{}'", escaped)
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "inf" } else { "-inf" }.to_string()
    } else {
        f.to_string()
    }
}

/// Like Python's `str()`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::repr).collect();
                write!(f, "[{}]", inner.join(", "))
            }
            Value::Handle(handle) => write!(f, "{}", handle.label),
            Value::Builtin(Builtin::Exception(kind)) => write!(f, "<class '{}'>", kind),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
            Value::Method { receiver, name } => {
                write!(f, "<bound method {}.{}>", receiver.kind.name(), name)
            }
            Value::Exception { message, .. } => write!(f, "{}", message),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Value::Int)
            .unwrap_or(Value::Float(value as f64))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::from(value as u64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::None)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::Int(5).is_truthy());
        assert!(Value::Str("a".into()).is_truthy());
        assert!(Handle::new(HandleKind::Bot, 1, "bot").into_value().is_truthy());
    }

    #[test]
    fn test_display_matches_python_str() {
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Str("a".into())]).to_string(),
            "[1, 'a']"
        );
        assert_eq!(Value::Str("plain".into()).to_string(), "plain");
    }

    #[test]
    fn test_repr_quotes_strings() {
        assert_eq!(Value::Str("it's".into()).repr(), "'it\\'s'");
        assert_eq!(
            Value::Exception {
                kind: "ValueError".into(),
                message: "x".into()
            }
            .repr(),
            "ValueError('x')"
        );
    }

    #[test]
    fn test_handle_display_uses_label() {
        let guild = Handle::new(HandleKind::Guild, 42, "Overwatch Fans")
            .with_attr("member_count", 10_i64)
            .into_value();
        assert_eq!(guild.to_string(), "Overwatch Fans");
        assert_eq!(guild.repr(), "<Guild id=42 name='Overwatch Fans'>");
    }

    #[test]
    fn test_builtin_lookup() {
        assert_eq!(Builtin::lookup("print"), Some(Builtin::Print));
        assert_eq!(
            Builtin::lookup("ValueError"),
            Some(Builtin::Exception("ValueError"))
        );
        assert_eq!(Builtin::lookup("exec"), None);
    }
}
