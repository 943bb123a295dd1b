use super::ast::BinaryOp;
use super::fault::ScriptError;
use super::ops;
use super::value::{Builtin, Value};

fn arity(builtin: Builtin, args: &[Value], count: usize) -> Result<(), ScriptError> {
    if args.len() == count {
        return Ok(());
    }
    Err(ScriptError::type_error(format!(
        "{}() takes exactly one argument ({} given)",
        builtin.name(),
        args.len()
    )))
}

/// Calls a builtin. `print` writes into `stdout`.
pub fn call(builtin: Builtin, args: Vec<Value>, stdout: &mut String) -> Result<Value, ScriptError> {
    match builtin {
        Builtin::Print => {
            let parts: Vec<String> = args.iter().map(Value::to_string).collect();
            stdout.push_str(&parts.join(" "));
            stdout.push('\n');
            Ok(Value::None)
        }
        Builtin::Str => match args.as_slice() {
            [] => Ok(Value::Str(String::new())),
            [value] => Ok(Value::Str(value.to_string())),
            _ => Err(ScriptError::type_error(format!(
                "str() takes at most 1 argument ({} given)",
                args.len()
            ))),
        },
        Builtin::Repr => {
            arity(builtin, &args, 1)?;
            Ok(Value::Str(args[0].repr()))
        }
        Builtin::Type => {
            arity(builtin, &args, 1)?;
            Ok(Value::Str(format!("<class '{}'>", args[0].type_name())))
        }
        Builtin::Len => {
            arity(builtin, &args, 1)?;
            len(&args[0])
        }
        Builtin::Int => {
            arity(builtin, &args, 1)?;
            to_int(&args[0])
        }
        Builtin::Float => {
            arity(builtin, &args, 1)?;
            to_float(&args[0])
        }
        Builtin::Abs => {
            arity(builtin, &args, 1)?;
            match &args[0] {
                Value::Int(i) => i
                    .checked_abs()
                    .map(Value::Int)
                    .ok_or_else(|| ScriptError::new("OverflowError", "integer overflow")),
                Value::Bool(b) => Ok(Value::Int(*b as i64)),
                Value::Float(f) => Ok(Value::Float(f.abs())),
                other => Err(ScriptError::type_error(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))),
            }
        }
        Builtin::Min => extreme(builtin, args, BinaryOp::Lt),
        Builtin::Max => extreme(builtin, args, BinaryOp::Gt),
        Builtin::Sum => sum(args),
        Builtin::Exception(kind) => {
            let message = match args.as_slice() {
                [] => String::new(),
                [single] => single.to_string(),
                many => {
                    let parts: Vec<String> = many.iter().map(Value::repr).collect();
                    format!("({})", parts.join(", "))
                }
            };
            Ok(Value::Exception {
                kind: kind.to_string(),
                message,
            })
        }
    }
}

fn len(value: &Value) -> Result<Value, ScriptError> {
    match value {
        Value::Str(s) => Ok(Value::from(s.chars().count())),
        Value::List(items) => Ok(Value::from(items.len())),
        other => Err(ScriptError::type_error(format!(
            "object of type '{}' has no len()",
            other.type_name()
        ))),
    }
}

fn to_int(value: &Value) -> Result<Value, ScriptError> {
    match value {
        Value::Int(i) => Ok(Value::Int(*i)),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(ScriptError::value_error(format!(
                    "cannot convert float {} to integer",
                    Value::Float(*f)
                )));
            }
            let truncated = f.trunc();
            // i64::MAX is not representable; 2^63 is the first value out of range.
            if truncated < i64::MIN as f64 || truncated >= -(i64::MIN as f64) {
                return Err(ScriptError::new(
                    "OverflowError",
                    format!("cannot convert float {} to integer", Value::Float(*f)),
                ));
            }
            Ok(Value::Int(truncated as i64))
        }
        Value::Str(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
            ScriptError::value_error(format!(
                "invalid literal for int() with base 10: {}",
                value.repr()
            ))
        }),
        other => Err(ScriptError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn to_float(value: &Value) -> Result<Value, ScriptError> {
    match value {
        Value::Int(i) => Ok(Value::Float(*i as f64)),
        Value::Bool(b) => Ok(Value::Float(*b as i64 as f64)),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Str(s) => s.trim().parse::<f64>().map(Value::Float).map_err(|_| {
            ScriptError::value_error(format!(
                "could not convert string to float: {}",
                value.repr()
            ))
        }),
        other => Err(ScriptError::type_error(format!(
            "float() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

/// `min`/`max` over either a single list argument or the arguments themselves.
fn extreme(builtin: Builtin, args: Vec<Value>, wins: BinaryOp) -> Result<Value, ScriptError> {
    let items = match args.len() {
        1 => match &args[0] {
            Value::List(items) => items.clone(),
            other => {
                return Err(ScriptError::type_error(format!(
                    "'{}' object is not iterable",
                    other.type_name()
                )))
            }
        },
        _ => args,
    };

    let mut iter = items.into_iter();
    let mut best = iter.next().ok_or_else(|| {
        ScriptError::value_error(format!("{}() arg is an empty sequence", builtin.name()))
    })?;
    for item in iter {
        if ops::compare(wins, &item, &best)? {
            best = item;
        }
    }
    Ok(best)
}

fn sum(args: Vec<Value>) -> Result<Value, ScriptError> {
    let (items, start) = match args.as_slice() {
        [Value::List(items)] => (items.clone(), Value::Int(0)),
        [Value::List(items), start] => (items.clone(), start.clone()),
        _ => {
            return Err(ScriptError::type_error(
                "sum() takes a list and an optional start value",
            ))
        }
    };
    if matches!(start, Value::Str(_)) {
        return Err(ScriptError::type_error(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }

    items
        .into_iter()
        .try_fold(start, |total, item| ops::binary(BinaryOp::Add, total, item))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(builtin: Builtin, args: Vec<Value>) -> Result<Value, ScriptError> {
        let mut stdout = String::new();
        call(builtin, args, &mut stdout)
    }

    #[test]
    fn test_print_joins_with_spaces() {
        let mut stdout = String::new();
        call(
            Builtin::Print,
            vec![Value::Int(1), Value::Str("a".into()), Value::None],
            &mut stdout,
        )
        .unwrap();
        call(Builtin::Print, vec![], &mut stdout).unwrap();
        assert_eq!(stdout, "1 a None\n\n");
    }

    #[test]
    fn test_len_counts_characters() {
        assert_eq!(run(Builtin::Len, vec![Value::Str("héllo".into())]).unwrap(), Value::Int(5));
        assert!(run(Builtin::Len, vec![Value::Int(1)]).is_err());
    }

    #[test]
    fn test_int_of_huge_float_overflows() {
        let err = run(Builtin::Int, vec![Value::Float(1e30)]).unwrap_err();
        assert_eq!(err.kind, "OverflowError");
        let err = run(Builtin::Int, vec![Value::Float(-1e19)]).unwrap_err();
        assert_eq!(err.kind, "OverflowError");
        assert_eq!(
            run(Builtin::Int, vec![Value::Float(-9.223372036854775808e18)]).unwrap(),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_int_conversion() {
        assert_eq!(run(Builtin::Int, vec![Value::Str(" 42 ".into())]).unwrap(), Value::Int(42));
        assert_eq!(run(Builtin::Int, vec![Value::Float(-2.7)]).unwrap(), Value::Int(-2));
        let error = run(Builtin::Int, vec![Value::Str("abc".into())]).unwrap_err();
        assert_eq!(error.kind, "ValueError");
        assert_eq!(error.message, "invalid literal for int() with base 10: 'abc'");
    }

    #[test]
    fn test_min_max() {
        let values = vec![Value::Int(3), Value::Int(1), Value::Int(2)];
        assert_eq!(run(Builtin::Min, values.clone()).unwrap(), Value::Int(1));
        assert_eq!(run(Builtin::Max, vec![Value::List(values)]).unwrap(), Value::Int(3));
        let error = run(Builtin::Max, vec![Value::List(vec![])]).unwrap_err();
        assert_eq!(error.message, "max() arg is an empty sequence");
    }

    #[test]
    fn test_sum() {
        let values = Value::List(vec![Value::Int(1), Value::Int(2), Value::Float(0.5)]);
        assert_eq!(run(Builtin::Sum, vec![values]).unwrap(), Value::Float(3.5));
    }

    #[test]
    fn test_exception_constructor() {
        assert_eq!(
            run(Builtin::Exception("ValueError"), vec![Value::Str("x".into())]).unwrap(),
            Value::Exception {
                kind: "ValueError".into(),
                message: "x".into()
            }
        );
        assert_eq!(
            run(Builtin::Exception("KeyError"), vec![]).unwrap(),
            Value::Exception {
                kind: "KeyError".into(),
                message: String::new()
            }
        );
    }

    #[test]
    fn test_type_and_repr() {
        assert_eq!(
            run(Builtin::Type, vec![Value::Int(1)]).unwrap(),
            Value::Str("<class 'int'>".into())
        );
        assert_eq!(
            run(Builtin::Repr, vec![Value::Str("a".into())]).unwrap(),
            Value::Str("'a'".into())
        );
    }
}
