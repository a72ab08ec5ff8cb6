//! Type resolution and module symbol environment for the talus lowering
//! core.

pub mod env;
pub mod resolve;

pub use env::{EnumMeta, FunctionSignature, InterfaceMeta, InterfaceMethodMeta, ModuleEnv, StructureMeta};
pub use resolve::{reject_variadic_in_return, reject_variadic_in_type_switch, resolve};
