//! AST-to-IR lowering core for the talus compiler front end.
//!
//! Turns a parsed module (`talus_ast`) into `talus_ir`, resolving types
//! through `talus_types::ModuleEnv` along the way. The pieces compose as:
//! `function` builds each top-level function, delegating expression and
//! statement lowering to `expr`/`stmt`; `interface` synthesizes vtable
//! structs; `trampoline` backs partial application; `scope` and `context`
//! are the shared machinery (defer replay, lexical scoping, loop targets)
//! everything above is built on.

pub mod context;
pub mod expr;
pub mod function;
pub mod interface;
pub mod scope;
pub mod stmt;
pub mod trampoline;

pub use context::{LoopTargets, LoweringContext};
pub use function::lower_function;
pub use scope::DeferredStmt;
pub use trampoline::{bind_first_arg, BoundClosure};
