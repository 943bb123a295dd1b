use async_trait::async_trait;

use super::fault::ScriptError;
use super::value::{Handle, Value};

/// Capability object through which a script reaches the outside world.
///
/// Every method call on a handle (`channel.send(...)`, `bot.invoke(...)`,
/// `bot.fetchval(...)`) ends up here. The interpreter itself has no other
/// way to cause side effects, so whoever builds the host decides exactly
/// what evaluated code may touch.
#[async_trait]
pub trait ScriptHost: Send + Sync {
    async fn call(
        &self,
        receiver: &Handle,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, ScriptError>;
}

/// Fails with `AttributeError` for `receiver.method`, the way an unknown
/// method is reported.
pub fn no_such_method(receiver: &Handle, method: &str) -> ScriptError {
    ScriptError::attribute_error(format!(
        "'{}' object has no attribute '{}'",
        receiver.kind.name(),
        method
    ))
}

/// Checks the argument count of a host method.
pub fn expect_args(method: &str, args: &[Value], count: usize) -> Result<(), ScriptError> {
    if args.len() == count {
        Ok(())
    } else {
        Err(ScriptError::type_error(format!(
            "{}() takes {} positional argument{} but {} were given",
            method,
            count,
            if count == 1 { "" } else { "s" },
            args.len()
        )))
    }
}

/// Extracts a string argument; anything else is a `TypeError`.
pub fn str_arg<'v>(method: &str, value: &'v Value) -> Result<&'v str, ScriptError> {
    match value {
        Value::Str(s) => Ok(s),
        other => Err(ScriptError::type_error(format!(
            "{}() argument must be str, not {}",
            method,
            other.type_name()
        ))),
    }
}

/// Extracts an integer argument (`True`/`False` count as `1`/`0`).
pub fn int_arg(method: &str, value: &Value) -> Result<i64, ScriptError> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Bool(b) => Ok(*b as i64),
        other => Err(ScriptError::type_error(format!(
            "{}() argument must be int, not {}",
            method,
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eval::value::HandleKind;

    #[test]
    fn test_no_such_method_message() {
        let handle = Handle::new(HandleKind::Channel, 1, "#general");
        let error = no_such_method(&handle, "explode");
        assert_eq!(error.kind, "AttributeError");
        assert_eq!(error.message, "'Channel' object has no attribute 'explode'");
    }

    #[test]
    fn test_expect_args() {
        assert!(expect_args("send", &[Value::None], 1).is_ok());
        let error = expect_args("send", &[], 1).unwrap_err();
        assert_eq!(
            error.message,
            "send() takes 1 positional argument but 0 were given"
        );
    }

    #[test]
    fn test_typed_arguments() {
        assert_eq!(str_arg("send", &Value::Str("hi".into())).unwrap(), "hi");
        assert!(str_arg("send", &Value::Int(1)).is_err());
        assert_eq!(int_arg("guild", &Value::Int(7)).unwrap(), 7);
        assert_eq!(int_arg("guild", &Value::Bool(true)).unwrap(), 1);
    }
}
