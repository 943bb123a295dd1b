pub mod ast;
pub mod builtins;
pub mod engine;
pub mod fault;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod normalize;
pub mod ops;
pub mod parser;
pub mod value;

pub use engine::{Environment, EvalEngine, Outcome, Reply, ResultSlot};
pub use fault::{CompileFault, RuntimeFault, ScriptError};
pub use host::ScriptHost;
pub use value::{Handle, HandleKind, Value};
