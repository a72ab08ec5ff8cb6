//! Typed SSA IR type system.
//!
//! Mirrors the minimal surface a native backend needs to expose to a
//! lowering front-end: fixed-width integers and floats, pointers, arrays,
//! named structs (interfaces are structs prefixed `interface::`), and
//! function types. `Auto` is a sentinel consumed exclusively by return-type
//! deduction and must never survive into a finalized module.

use std::fmt;

/// Floating point width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    Half,
    Float,
    Double,
}

impl FloatKind {
    #[must_use]
    pub fn bits(self) -> u32 {
        match self {
            FloatKind::Half => 16,
            FloatKind::Float => 32,
            FloatKind::Double => 64,
        }
    }

    #[must_use]
    pub fn printable(self) -> &'static str {
        match self {
            FloatKind::Half => "half",
            FloatKind::Float => "float",
            FloatKind::Double => "double",
        }
    }
}

/// A named IR type. Structs are named by their bare name; interface vtable
/// structs carry the `interface::` prefix as part of their `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    /// Signed integer of a fixed bit width. Only `{1,8,16,32,64,128}` are
    /// produced by the resolver, but arbitrary widths round-trip through
    /// this variant unchanged.
    Int(u32),
    Float(FloatKind),
    /// Return-type-deduction placeholder. Never appears in a
    /// finalized function signature.
    Auto,
    Pointer(Box<Type>),
    Array(Box<Type>, u64),
    Struct(String),
    Function {
        params: Vec<Type>,
        ret: Box<Type>,
        variadic: bool,
    },
}

impl Type {
    #[must_use]
    pub fn pointer_to(self) -> Type {
        Type::Pointer(Box::new(self))
    }

    #[must_use]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    #[must_use]
    pub fn is_struct(&self) -> bool {
        matches!(self, Type::Struct(_))
    }

    #[must_use]
    pub fn is_interface(&self) -> bool {
        matches!(self, Type::Struct(name) if name.starts_with("interface::"))
    }

    #[must_use]
    pub fn is_int(&self) -> bool {
        matches!(self, Type::Int(_) | Type::Bool)
    }

    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    #[must_use]
    pub fn int_bits(&self) -> Option<u32> {
        match self {
            Type::Bool => Some(1),
            Type::Int(bits) => Some(*bits),
            _ => None,
        }
    }

    /// Unwraps one level of pointer and reports whether the result is a
    /// struct.
    #[must_use]
    pub fn is_struct_kind(&self) -> (Option<&Type>, bool) {
        match self {
            Type::Struct(_) => (Some(self), true),
            Type::Pointer(inner) if inner.is_struct() => (Some(inner.as_ref()), true),
            _ => (None, false),
        }
    }

    /// Strips all levels of pointer indirection.
    #[must_use]
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Pointer(inner) => inner.underlying(),
            other => other,
        }
    }

    /// Canonical printable spelling used by cast-operator name mangling.
    #[must_use]
    pub fn printable(&self) -> String {
        match self {
            Type::Void => "void".to_owned(),
            Type::Bool => "bool".to_owned(),
            Type::Int(1) => "bool".to_owned(),
            Type::Int(8) => "char".to_owned(),
            Type::Int(16) => "short".to_owned(),
            Type::Int(32) => "int".to_owned(),
            Type::Int(64) => "int64".to_owned(),
            Type::Int(128) => "int128".to_owned(),
            Type::Int(n) => format!("i{n}"),
            Type::Float(k) => k.printable().to_owned(),
            Type::Auto => "auto".to_owned(),
            Type::Pointer(inner) => format!("{}*", inner.printable()),
            Type::Array(elem, len) => format!("[{len} x {}]", elem.printable()),
            Type::Struct(name) => name.strip_prefix("interface::").unwrap_or(name).to_owned(),
            Type::Function { params, ret, variadic } => {
                let mut args: Vec<String> = params.iter().map(Type::printable).collect();
                if *variadic {
                    args.push("...".to_owned());
                }
                format!("{}({})", ret.printable(), args.join(", "))
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.printable())
    }
}

/// Built-in basic type lookup table, checked first in type resolution.
#[must_use]
pub fn basic_type(name: &str) -> Option<Type> {
    Some(match name {
        "void" => Type::Void,
        "bool" => Type::Bool,
        "char" => Type::Int(8),
        "short" => Type::Int(16),
        "int" => Type::Int(32),
        "int64" => Type::Int(64),
        "int128" => Type::Int(128),
        "half" => Type::Float(FloatKind::Half),
        "float" => Type::Float(FloatKind::Float),
        "double" => Type::Float(FloatKind::Double),
        "auto" => Type::Auto,
        _ => return None,
    })
}

/// Variable-length-array convention recognizer: `struct { int length; T[0] data }`.
#[must_use]
pub fn is_variable_length_array(ty: &Type) -> bool {
    let (Some(Type::Struct(_)), true) = ty.is_struct_kind() else {
        return false;
    };
    // The struct's field shape is validated by the module symbol environment
    // (talus-types); this predicate only recognizes the convention at the
    // IR-type level, leaving name/field metadata to that layer.
    true
}
