use std::fmt;

/// The source did not compile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{kind}: {message} (line {line})")]
pub struct CompileFault {
    pub kind: &'static str,
    pub message: String,
    pub line: usize,
}

impl CompileFault {
    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self {
            kind: "SyntaxError",
            message: message.into(),
            line,
        }
    }
}

/// An error raised while a script is running, before it is pinned to a line.
///
/// Builtins, the interpreter and [`super::ScriptHost`] implementations all
/// raise this; the interpreter attaches the failing statement afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub kind: String,
    pub message: String,
}

impl ScriptError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new("TypeError", message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new("ValueError", message)
    }

    pub fn attribute_error(message: impl Into<String>) -> Self {
        Self::new("AttributeError", message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new("ZeroDivisionError", message)
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Location of the statement that raised.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub line: usize,
    pub source: String,
}

/// A fault raised while the compiled program was running.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeFault {
    pub error: ScriptError,
    pub frame: Option<Frame>,
}

impl RuntimeFault {
    pub fn kind(&self) -> &str {
        &self.error.kind
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    /// Full trace: header, the failing frame (if any), then `Kind: message`.
    pub fn trace(&self) -> String {
        let mut out = String::from("Traceback (most recent call last):\n");
        if let Some(frame) = &self.frame {
            out.push_str(&format!("  line {}, in exc\n", frame.line));
            out.push_str(&format!("    {}\n", frame.source.trim()));
        }
        out.push_str(&self.error.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_with_frame() {
        let fault = RuntimeFault {
            error: ScriptError::value_error("x"),
            frame: Some(Frame {
                line: 2,
                source: "    raise ValueError(\"x\")".to_string(),
            }),
        };
        assert_eq!(
            fault.trace(),
            "Traceback (most recent call last):\n  line 2, in exc\n    raise ValueError(\"x\")\nValueError: x"
        );
    }

    #[test]
    fn test_empty_message_prints_kind_only() {
        let error = ScriptError::new("KeyError", "");
        assert_eq!(error.to_string(), "KeyError");
    }

    #[test]
    fn test_compile_fault_display() {
        let fault = CompileFault::syntax("invalid syntax", 3);
        assert_eq!(fault.to_string(), "SyntaxError: invalid syntax (line 3)");
    }
}
