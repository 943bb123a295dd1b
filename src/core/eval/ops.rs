use super::ast::{BinaryOp, UnaryOp};
use super::fault::ScriptError;
use super::value::Value;

/// Upper bound on the length of a sequence built with `*`.
const MAX_SEQUENCE_LEN: usize = 1_000_000;

#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

fn number(value: &Value) -> Option<Number> {
    match value {
        Value::Int(i) => Some(Number::Int(*i)),
        Value::Bool(b) => Some(Number::Int(*b as i64)),
        Value::Float(f) => Some(Number::Float(*f)),
        _ => None,
    }
}

fn overflow() -> ScriptError {
    ScriptError::new("OverflowError", "integer overflow")
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> ScriptError {
    ScriptError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

pub fn unary(op: UnaryOp, value: Value) -> Result<Value, ScriptError> {
    if op == UnaryOp::Not {
        return Ok(Value::Bool(!value.is_truthy()));
    }

    let symbol = if op == UnaryOp::Neg { "-" } else { "+" };
    match (op, number(&value)) {
        (UnaryOp::Neg, Some(Number::Int(i))) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
        (UnaryOp::Neg, Some(Number::Float(f))) => Ok(Value::Float(-f)),
        (UnaryOp::Pos, Some(Number::Int(i))) => Ok(Value::Int(i)),
        (UnaryOp::Pos, Some(Number::Float(f))) => Ok(Value::Float(f)),
        _ => Err(ScriptError::type_error(format!(
            "bad operand type for unary {}: '{}'",
            symbol,
            value.type_name()
        ))),
    }
}

pub fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, ScriptError> {
    match op {
        BinaryOp::Eq => Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            compare(op, &left, &right).map(Value::Bool)
        }
        _ => arithmetic(op, left, right),
    }
}

pub fn values_equal(left: &Value, right: &Value) -> bool {
    if let (Some(a), Some(b)) = (number(left), number(right)) {
        return match (a, b) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (a, b) => a.as_f64() == b.as_f64(),
        };
    }

    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Handle(a), Value::Handle(b)) => a.kind == b.kind && a.id == b.id,
        _ => left == right,
    }
}

/// Ordering comparison for numbers and strings; `NaN` compares false.
pub fn compare(op: BinaryOp, left: &Value, right: &Value) -> Result<bool, ScriptError> {
    let ordering = match (number(left), number(right)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => Some(a.cmp(&b)),
        (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
        _ => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            _ => {
                return Err(ScriptError::type_error(format!(
                    "'{}' not supported between instances of '{}' and '{}'",
                    op.symbol(),
                    left.type_name(),
                    right.type_name()
                )))
            }
        },
    };

    let Some(ordering) = ordering else {
        return Ok(false);
    };

    Ok(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtEq => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtEq => ordering.is_ge(),
        _ => false,
    })
}

fn repeat_count(len: usize, times: i64) -> Result<usize, ScriptError> {
    let times = usize::try_from(times.max(0)).unwrap_or(usize::MAX);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_SEQUENCE_LEN => Ok(times),
        _ => Err(ScriptError::new("MemoryError", "repeated sequence is too large")),
    }
}

fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, ScriptError> {
    match (&left, &right) {
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = a.clone();
            items.extend(b.iter().cloned());
            return Ok(Value::List(items));
        }
        (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) if op == BinaryOp::Mul => {
            let times = repeat_count(s.len(), *n)?;
            return Ok(Value::Str(s.repeat(times)));
        }
        (Value::List(items), Value::Int(n)) | (Value::Int(n), Value::List(items))
            if op == BinaryOp::Mul =>
        {
            let times = repeat_count(items.len(), *n)?;
            let mut repeated = Vec::with_capacity(items.len() * times);
            for _ in 0..times {
                repeated.extend(items.iter().cloned());
            }
            return Ok(Value::List(repeated));
        }
        _ => {}
    }

    match (number(&left), number(&right)) {
        (Some(Number::Int(a)), Some(Number::Int(b))) => int_arithmetic(op, a, b),
        (Some(a), Some(b)) => float_arithmetic(op, a.as_f64(), b.as_f64()),
        _ => Err(unsupported(op, &left, &right)),
    }
}

fn int_arithmetic(op: BinaryOp, a: i64, b: i64) -> Result<Value, ScriptError> {
    let modulo_by_zero = || ScriptError::zero_division("integer division or modulo by zero");

    let value = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(ScriptError::zero_division("division by zero"));
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let quotient = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                quotient - 1
            } else {
                quotient
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(modulo_by_zero());
            }
            let remainder = a.checked_rem(b).ok_or_else(overflow)?;
            if remainder != 0 && ((remainder < 0) != (b < 0)) {
                remainder + b
            } else {
                remainder
            }
        }
        BinaryOp::Pow => {
            if b < 0 {
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            let exponent = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exponent).ok_or_else(overflow)?
        }
        _ => unreachable!("comparison operators are handled by binary()"),
    };

    Ok(Value::Int(value))
}

fn float_arithmetic(op: BinaryOp, a: f64, b: f64) -> Result<Value, ScriptError> {
    let value = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float division by zero"));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float floor division by zero"));
            }
            (a / b).floor()
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(ScriptError::zero_division("float modulo"));
            }
            a - b * (a / b).floor()
        }
        BinaryOp::Pow => a.powf(b),
        _ => unreachable!("comparison operators are handled by binary()"),
    };

    Ok(Value::Float(value))
}

pub fn index(target: &Value, index: &Value) -> Result<Value, ScriptError> {
    let position = |len: usize, what: &str| -> Result<usize, ScriptError> {
        let i = match index {
            Value::Int(i) => *i,
            Value::Bool(b) => *b as i64,
            other => {
                return Err(ScriptError::type_error(format!(
                    "{} indices must be integers, not {}",
                    what,
                    other.type_name()
                )))
            }
        };
        let len = len as i64;
        let resolved = if i < 0 { i + len } else { i };
        if resolved < 0 || resolved >= len {
            return Err(ScriptError::new(
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
        other => Err(ScriptError::type_error(format!(
            "'{}' object is not subscriptable",
            other.type_name()
        ))),
    }
}

pub fn attribute(target: Value, name: &str) -> Result<Value, ScriptError> {
    match target {
        Value::Handle(handle) => match handle.attrs.get(name) {
            Some(value) => Ok(value.clone()),
            None => Ok(Value::Method {
                receiver: handle.clone(),
                name: name.to_string(),
            }),
        },
        other => Err(ScriptError::attribute_error(format!(
            "'{}' object has no attribute '{}'",
            other.type_name(),
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eval::value::{Handle, HandleKind};

    #[test]
    fn test_python_floor_division_and_modulo() {
        assert_eq!(int_arithmetic(BinaryOp::FloorDiv, 7, 2).unwrap(), Value::Int(3));
        assert_eq!(int_arithmetic(BinaryOp::FloorDiv, -7, 2).unwrap(), Value::Int(-4));
        assert_eq!(int_arithmetic(BinaryOp::Mod, -7, 2).unwrap(), Value::Int(1));
        assert_eq!(int_arithmetic(BinaryOp::Mod, 7, -2).unwrap(), Value::Int(-1));
    }

    #[test]
    fn test_true_division_returns_float() {
        assert_eq!(
            binary(BinaryOp::Div, Value::Int(1), Value::Int(2)).unwrap(),
            Value::Float(0.5)
        );
    }

    #[test]
    fn test_division_by_zero() {
        let error = binary(BinaryOp::Div, Value::Int(1), Value::Int(0)).unwrap_err();
        assert_eq!(error.kind, "ZeroDivisionError");
        assert_eq!(error.message, "division by zero");
    }

    #[test]
    fn test_overflow_is_reported() {
        let error = binary(BinaryOp::Mul, Value::Int(i64::MAX), Value::Int(2)).unwrap_err();
        assert_eq!(error.kind, "OverflowError");
    }

    #[test]
    fn test_string_and_list_operators() {
        assert_eq!(
            binary(BinaryOp::Add, Value::Str("a".into()), Value::Str("b".into())).unwrap(),
            Value::Str("ab".into())
        );
        assert_eq!(
            binary(BinaryOp::Mul, Value::Int(3), Value::Str("ab".into())).unwrap(),
            Value::Str("ababab".into())
        );
        assert_eq!(
            binary(BinaryOp::Mul, Value::List(vec![Value::Int(1)]), Value::Int(2)).unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(1)])
        );
    }

    #[test]
    fn test_huge_repeat_is_refused() {
        let error = binary(BinaryOp::Mul, Value::Str("a".into()), Value::Int(i64::MAX)).unwrap_err();
        assert_eq!(error.kind, "MemoryError");
    }

    #[test]
    fn test_mixed_types_fail() {
        let error = binary(BinaryOp::Add, Value::Int(1), Value::Str("a".into())).unwrap_err();
        assert_eq!(error.kind, "TypeError");
        assert_eq!(
            error.message,
            "unsupported operand type(s) for +: 'int' and 'str'"
        );
    }

    #[test]
    fn test_equality_crosses_numeric_types() {
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(values_equal(&Value::Bool(true), &Value::Int(1)));
        assert!(!values_equal(&Value::Str("1".into()), &Value::Int(1)));
    }

    #[test]
    fn test_ordering() {
        assert!(compare(BinaryOp::Lt, &Value::Int(1), &Value::Float(1.5)).unwrap());
        assert!(compare(BinaryOp::GtEq, &Value::Str("b".into()), &Value::Str("a".into())).unwrap());
        assert!(!compare(BinaryOp::Lt, &Value::Float(f64::NAN), &Value::Int(1)).unwrap());
        assert!(compare(BinaryOp::Lt, &Value::None, &Value::Int(1)).is_err());
    }

    #[test]
    fn test_negative_indexing() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(index(&list, &Value::Int(-1)).unwrap(), Value::Int(2));
        let error = index(&list, &Value::Int(2)).unwrap_err();
        assert_eq!(error.kind, "IndexError");
        assert_eq!(index(&Value::Str("abc".into()), &Value::Int(1)).unwrap(), Value::Str("b".into()));
    }

    #[test]
    fn test_attribute_lookup_on_handle() {
        let guild = Handle::new(HandleKind::Guild, 1, "g")
            .with_attr("member_count", 3_i64)
            .into_value();
        assert_eq!(attribute(guild.clone(), "member_count").unwrap(), Value::Int(3));
        match attribute(guild, "leave").unwrap() {
            Value::Method { name, .. } => assert_eq!(name, "leave"),
            other => panic!("expected a bound method, got {:?}", other),
        }
        assert!(attribute(Value::Int(1), "real").is_err());
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(unary(UnaryOp::Neg, Value::Int(2)).unwrap(), Value::Int(-2));
        assert_eq!(unary(UnaryOp::Not, Value::Int(0)).unwrap(), Value::Bool(true));
        assert!(unary(UnaryOp::Neg, Value::Str("x".into())).is_err());
    }
}
