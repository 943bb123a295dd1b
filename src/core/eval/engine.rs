use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, warn};

use super::fault::{CompileFault, RuntimeFault, ScriptError};
use super::host::ScriptHost;
use super::interpreter::Interpreter;
use super::normalize::normalize;
use super::parser::parse_program;
use super::value::{Handle, Value};

/// Single-slot store for the last non-empty result, exposed to scripts as `_`.
///
/// Locked only to read at session start and to write at session end, so the
/// last writer wins.
#[derive(Debug, Default)]
pub struct ResultSlot {
    inner: Mutex<Option<Value>>,
}

impl ResultSlot {
    pub fn get(&self) -> Option<Value> {
        match self.inner.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn set(&self, value: Value) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = Some(value),
            Err(poisoned) => *poisoned.into_inner() = Some(value),
        }
    }
}

/// Names bound in a session before the program runs.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.bindings.insert(name.to_string(), value.into());
        self
    }

    /// The fixed bindings of an `exc` invocation. `guild` is `None` in DMs.
    pub fn for_invocation(
        bot: Handle,
        ctx: Handle,
        channel: Handle,
        author: Handle,
        guild: Option<Handle>,
        message: Handle,
    ) -> Self {
        Self::new()
            .bind("bot", bot.into_value())
            .bind("ctx", ctx.into_value())
            .bind("channel", channel.into_value())
            .bind("author", author.into_value())
            .bind("guild", guild.map(Handle::into_value))
            .bind("message", message.into_value())
    }
}

/// How one evaluation session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed { stdout: String, value: Value },
    CompileFault(CompileFault),
    RuntimeFault { stdout: String, fault: RuntimeFault },
}

/// What the invoker sees: an optional success marker and an optional body.
///
/// `text` is plain; the caller decides how to fence it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub marker: bool,
    pub text: Option<String>,
}

impl Outcome {
    pub fn is_fault(&self) -> bool {
        !matches!(self, Outcome::Completed { .. })
    }

    pub fn reply(&self) -> Reply {
        match self {
            Outcome::CompileFault(fault) => Reply {
                marker: false,
                text: Some(format!("{}: {}", fault.kind, fault.message)),
            },
            Outcome::RuntimeFault { stdout, fault } => Reply {
                marker: false,
                text: Some(format!("{}{}", stdout, fault.trace())),
            },
            Outcome::Completed { stdout, value } if value.is_truthy() => Reply {
                marker: true,
                text: Some(format!("{}{}", stdout, value)),
            },
            Outcome::Completed { stdout, .. } => Reply {
                marker: true,
                text: (!stdout.is_empty()).then(|| stdout.clone()),
            },
        }
    }
}

/// Evaluates owner-supplied scripts.
///
/// One engine lives for the whole process; each call to [`EvalEngine::evaluate`]
/// is an independent session sharing only the result slot.
pub struct EvalEngine {
    last_result: ResultSlot,
    timeout: Duration,
}

impl EvalEngine {
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_result: ResultSlot::default(),
            timeout,
        }
    }

    pub fn last_result(&self) -> Option<Value> {
        self.last_result.get()
    }

    pub async fn evaluate(
        &self,
        payload: &str,
        environment: Environment,
        host: &dyn ScriptHost,
    ) -> Outcome {
        let body = normalize(payload);
        let program = match parse_program(&body) {
            Ok(program) => program,
            Err(fault) => {
                debug!(line = fault.line, "Script failed to compile: {}", fault.message);
                return Outcome::CompileFault(fault);
            }
        };

        let mut scope = environment.bindings;
        scope.insert("_".to_string(), self.last_result.get().unwrap_or_default());

        let mut stdout = String::new();
        let result = {
            let mut interpreter = Interpreter::new(host, scope, &mut stdout);
            tokio::time::timeout(self.timeout, interpreter.run(&program)).await
        };

        match result {
            Ok(Ok(value)) => {
                if value.is_truthy() {
                    self.last_result.set(value.clone());
                }
                Outcome::Completed { stdout, value }
            }
            Ok(Err(fault)) => Outcome::RuntimeFault { stdout, fault },
            Err(_) => {
                warn!(timeout_secs = self.timeout.as_secs_f64(), "Script timed out");
                Outcome::RuntimeFault {
                    stdout,
                    fault: RuntimeFault {
                        error: ScriptError::new(
                            "TimeoutError",
                            format!(
                                "evaluation exceeded {} seconds",
                                self.timeout.as_secs_f64()
                            ),
                        ),
                        frame: None,
                    },
                }
            }
        }
    }
}
