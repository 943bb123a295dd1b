use std::collections::HashMap;

use async_recursion::async_recursion;

use super::ast::{Expr, Program, StmtKind};
use super::builtins;
use super::fault::{Frame, RuntimeFault, ScriptError};
use super::host::ScriptHost;
use super::ops;
use super::value::{Builtin, Value};

enum Flow {
    Next,
    Return(Value),
}

/// Runs one compiled program against a scope.
///
/// `print` output goes into the borrowed `stdout` buffer, which belongs to
/// the session; nothing process-wide is redirected.
pub struct Interpreter<'a> {
    host: &'a dyn ScriptHost,
    scope: HashMap<String, Value>,
    stdout: &'a mut String,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        host: &'a dyn ScriptHost,
        scope: HashMap<String, Value>,
        stdout: &'a mut String,
    ) -> Self {
        Self {
            host,
            scope,
            stdout,
        }
    }

    /// Executes every statement; the value of the first `return` wins,
    /// falling off the end returns `None`.
    pub async fn run(&mut self, program: &Program) -> Result<Value, RuntimeFault> {
        for stmt in &program.statements {
            match self.exec(&stmt.kind).await {
                Ok(Flow::Next) => {}
                Ok(Flow::Return(value)) => return Ok(value),
                Err(error) => {
                    return Err(RuntimeFault {
                        error,
                        frame: Some(Frame {
                            line: stmt.line,
                            source: program.source_line(stmt.line).to_string(),
                        }),
                    })
                }
            }
        }
        Ok(Value::None)
    }

    async fn exec(&mut self, stmt: &StmtKind) -> Result<Flow, ScriptError> {
        match stmt {
            StmtKind::Pass => Ok(Flow::Next),
            StmtKind::Expr(expr) => {
                self.eval(expr).await?;
                Ok(Flow::Next)
            }
            StmtKind::Assign(name, expr) => {
                let value = self.eval(expr).await?;
                self.scope.insert(name.clone(), value);
                Ok(Flow::Next)
            }
            StmtKind::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval(expr).await?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Raise(expr) => {
                let raised = self.eval(expr).await?;
                Err(match raised {
                    Value::Exception { kind, message } => ScriptError::new(kind, message),
                    Value::Builtin(Builtin::Exception(kind)) => ScriptError::new(kind, ""),
                    _ => ScriptError::type_error("exceptions must derive from BaseException"),
                })
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, ScriptError> {
        if let Some(value) = self.scope.get(name) {
            return Ok(value.clone());
        }
        Builtin::lookup(name)
            .map(Value::Builtin)
            .ok_or_else(|| ScriptError::new("NameError", format!("name '{}' is not defined", name)))
    }

    #[async_recursion]
    async fn eval(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::None => Ok(Value::None),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(i) => Ok(Value::Int(*i)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item).await?);
                }
                Ok(Value::List(values))
            }
            Expr::Name(name) => self.lookup(name),
            Expr::Unary(op, operand) => {
                let value = self.eval(operand).await?;
                ops::unary(*op, value)
            }
            Expr::Binary(left, op, right) => {
                let left = self.eval(left).await?;
                let right = self.eval(right).await?;
                ops::binary(*op, left, right)
            }
            Expr::And(left, right) => {
                let left = self.eval(left).await?;
                if !left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right).await
            }
            Expr::Or(left, right) => {
                let left = self.eval(left).await?;
                if left.is_truthy() {
                    return Ok(left);
                }
                self.eval(right).await
            }
            Expr::Attribute(target, name) => {
                let target = self.eval(target).await?;
                ops::attribute(target, name)
            }
            Expr::Index(target, index) => {
                let target = self.eval(target).await?;
                let index = self.eval(index).await?;
                ops::index(&target, &index)
            }
            // Host calls are awaited when they are made, so `await` only
            // has to evaluate its operand.
            Expr::Await(inner) => self.eval(inner).await,
            Expr::Call(callee, args) => {
                let callee = self.eval(callee).await?;
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg).await?);
                }
                self.call(callee, values).await
            }
        }
    }

    async fn call(&mut self, callee: Value, args: Vec<Value>) -> Result<Value, ScriptError> {
        match callee {
            Value::Builtin(builtin) => builtins::call(builtin, args, &mut *self.stdout),
            Value::Method { receiver, name } => self.host.call(&receiver, &name, args).await,
            other => Err(ScriptError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::eval::host::{expect_args, no_such_method, str_arg};
    use crate::core::eval::parser::parse_program;
    use crate::core::eval::value::{Handle, HandleKind};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ScriptHost for RecordingHost {
        async fn call(
            &self,
            receiver: &Handle,
            method: &str,
            args: Vec<Value>,
        ) -> Result<Value, ScriptError> {
            match (receiver.kind, method) {
                (HandleKind::Channel, "send") => {
                    expect_args(method, &args, 1)?;
                    let text = str_arg(method, &args[0])?;
                    self.sent.lock().unwrap().push(text.to_string());
                    Ok(Value::Int(99))
                }
                _ => Err(no_such_method(receiver, method)),
            }
        }
    }

    async fn run_source(
        source: &str,
        host: &RecordingHost,
        scope: HashMap<String, Value>,
    ) -> (Result<Value, RuntimeFault>, String) {
        let program = parse_program(source).unwrap();
        let mut stdout = String::new();
        let result = {
            let mut interpreter = Interpreter::new(host, scope, &mut stdout);
            interpreter.run(&program).await
        };
        (result, stdout)
    }

    #[tokio::test]
    async fn test_print_and_return() {
        let host = RecordingHost::default();
        let (result, stdout) =
            run_source("x = 2\nprint(x * 21)\nreturn x + 1", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::Int(3));
        assert_eq!(stdout, "42\n");
    }

    #[tokio::test]
    async fn test_no_return_yields_none() {
        let host = RecordingHost::default();
        let (result, _) = run_source("pass", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::None);
    }

    #[tokio::test]
    async fn test_statements_after_return_do_not_run() {
        let host = RecordingHost::default();
        let (result, stdout) =
            run_source("return 1\nprint('unreachable')", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::Int(1));
        assert!(stdout.is_empty());
    }

    #[tokio::test]
    async fn test_short_circuit() {
        let host = RecordingHost::default();
        let (result, _) =
            run_source("return 0 and undefined_name", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::Int(0));
        let (result, _) = run_source("return 'a' or undefined_name", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::Str("a".into()));
    }

    #[tokio::test]
    async fn test_fault_keeps_output_and_line() {
        let host = RecordingHost::default();
        let (result, stdout) = run_source(
            "print('before')\nraise ValueError('x')\nprint('after')",
            &host,
            HashMap::new(),
        )
        .await;
        let fault = result.unwrap_err();
        assert_eq!(fault.kind(), "ValueError");
        assert_eq!(fault.message(), "x");
        let frame = fault.frame.unwrap();
        assert_eq!(frame.line, 2);
        assert_eq!(frame.source, "raise ValueError('x')");
        assert_eq!(stdout, "before\n");
    }

    #[tokio::test]
    async fn test_unknown_name() {
        let host = RecordingHost::default();
        let (result, _) = run_source("print(nope)", &host, HashMap::new()).await;
        let fault = result.unwrap_err();
        assert_eq!(fault.kind(), "NameError");
        assert_eq!(fault.message(), "name 'nope' is not defined");
    }

    #[tokio::test]
    async fn test_raising_a_non_exception() {
        let host = RecordingHost::default();
        let (result, _) = run_source("raise 5", &host, HashMap::new()).await;
        assert_eq!(result.unwrap_err().kind(), "TypeError");
    }

    #[tokio::test]
    async fn test_raise_bare_exception_class() {
        let host = RecordingHost::default();
        let (result, _) = run_source("raise KeyError", &host, HashMap::new()).await;
        let fault = result.unwrap_err();
        assert_eq!(fault.kind(), "KeyError");
        assert_eq!(fault.message(), "");
    }

    #[tokio::test]
    async fn test_host_methods_and_attributes() {
        let host = RecordingHost::default();
        let channel = Handle::new(HandleKind::Channel, 7, "#general")
            .with_attr("name", "general")
            .into_value();
        let mut scope = HashMap::new();
        scope.insert("channel".to_string(), channel);

        let (result, _) = run_source(
            "id = await channel.send('hello ' + channel.name)\nreturn id",
            &host,
            scope,
        )
        .await;
        assert_eq!(result.unwrap(), Value::Int(99));
        assert_eq!(*host.sent.lock().unwrap(), vec!["hello general".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_host_method_is_attribute_error() {
        let host = RecordingHost::default();
        let mut scope = HashMap::new();
        scope.insert(
            "channel".to_string(),
            Handle::new(HandleKind::Channel, 7, "#general").into_value(),
        );
        let (result, _) = run_source("channel.explode()", &host, scope).await;
        assert_eq!(result.unwrap_err().kind(), "AttributeError");
    }

    #[tokio::test]
    async fn test_calling_a_non_callable() {
        let host = RecordingHost::default();
        let (result, _) = run_source("x = 1\nx()", &host, HashMap::new()).await;
        let fault = result.unwrap_err();
        assert_eq!(fault.kind(), "TypeError");
        assert_eq!(fault.message(), "'int' object is not callable");
    }

    #[tokio::test]
    async fn test_builtins_can_be_shadowed() {
        let host = RecordingHost::default();
        let (result, _) = run_source("len = 3\nreturn len", &host, HashMap::new()).await;
        assert_eq!(result.unwrap(), Value::Int(3));
    }
}
