//! Minimal typed SSA IR surface the lowering core builds against.
//!
//! This crate plays the role of a native codegen backend's seam: basic
//! blocks, an instruction builder, and a type system that the
//! lowering subsystem is a client of, not an owner of. `talus-lower`
//! depends on nothing here but the `Builder` trait and the `Type`/`Value`
//! vocabulary; `RecordingBuilder` is a reference implementation used only
//! in tests, standing in for whatever real backend a driver would wire up.

pub mod builder;
pub mod function;
pub mod instr;
pub mod module;
pub mod recording;
pub mod types;
pub mod value;

pub use builder::Builder;
pub use function::{Function, Param};
pub use instr::{CastKind, CmpPred, FloatBinOp, FnAttr, Instruction, IntBinOp, ParamAttr};
pub use module::Module;
pub use recording::RecordingBuilder;
pub use types::{basic_type, is_variable_length_array, FloatKind, Type};
pub use value::{BlockId, Value};
