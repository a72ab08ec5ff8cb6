//! Facade over the talus lowering core: takes a parsed module's top-level
//! declarations and a downstream `Builder`, and produces a finished
//! `talus_ir::Module` (or the accumulated errors).
//!
//! One entry point, a small options struct, and every lower-level piece
//! (`talus_types`, `talus_lower`) reachable but not required of callers
//! who just want "parse tree in, module out".

use std::collections::HashSet;

use talus_ast::{Expr, TopLevelItem, TypeNode};
use talus_diagnostics::{Diagnostics, LowerError, Position};
use talus_ir::{Builder, Module};
use talus_types::{EnumMeta, FunctionSignature, ModuleEnv, StructureMeta};

#[derive(Debug, Clone, Default)]
pub struct LowerOptions {
    colored_diagnostics: bool,
}

impl LowerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn colored_diagnostics(mut self, value: bool) -> Self {
        self.colored_diagnostics = value;
        self
    }

    #[must_use]
    pub fn wants_color(&self) -> bool {
        self.colored_diagnostics
    }
}

pub struct LoweredModule {
    pub module: Module,
    pub diagnostics: Diagnostics,
}

/// Lowers every top-level declaration in `items` against `builder`.
///
/// Runs in three passes, mirroring the order name resolution actually
/// needs: structures/aliases/enumerations first (so the type resolver
/// has every name available), then interfaces (whose vtable struct
/// definitions may reference those names), then function bodies (which
/// may call into anything declared above).
pub fn lower_module(items: &[TopLevelItem], builder: &mut dyn Builder, _options: &LowerOptions) -> Result<LoweredModule, Vec<LowerError>> {
    let mut env = ModuleEnv::new();
    let mut errors = Vec::new();

    for item in items {
        match item {
            TopLevelItem::Structure(s) => {
                env.define_structure(StructureMeta { name: s.name.clone(), fields: s.fields.clone() });
            }
            TopLevelItem::Alias(a) => {
                env.define_alias(a.name.clone(), a.target.clone());
            }
            TopLevelItem::Enumeration(e) => {
                let variants = e.variants.iter().map(|v| (v.name.clone(), const_int_value(v.value.as_ref()))).collect();
                env.define_enum(EnumMeta { name: e.name.clone(), underlying: e.underlying.clone(), variants });
            }
            TopLevelItem::Function(_) | TopLevelItem::Interface(_) => {}
        }
    }

    // A second pass so the module function table is fully populated
    // before interfaces and bodies resolve
    // against it — `struct::<S>::<member>` lookups, cast-operator lookups,
    // and `implements` all depend on every function's declared shape
    // being visible regardless of its position in the source.
    for item in items {
        if let TopLevelItem::Function(function_item) = item {
            env.define_function(function_item.name.clone(), function_signature(function_item));
        }
    }

    for item in items {
        if let TopLevelItem::Interface(interface_item) = item {
            if let Some(err) = duplicate_interface_method(interface_item) {
                errors.push(err);
                continue;
            }
            if let Err(err) = talus_lower::interface::declare(interface_item, &mut env, builder) {
                errors.push(err);
            }
        }
    }

    let mut module = Module::new();
    for item in items {
        if let TopLevelItem::Function(function_item) = item {
            match talus_lower::lower_function(function_item, &env, builder) {
                Ok(func) => module.insert_function(func),
                Err(err) => errors.push(err),
            }
        }
    }

    if errors.is_empty() {
        Ok(LoweredModule { module, diagnostics: Diagnostics::new() })
    } else {
        Err(errors)
    }
}

/// A deduced (`return_type: None`) function still needs *some* entry in
/// the module function table so other functions can call it before its
/// own body is lowered — `auto` stands in until `lower_function`'s own
/// return-type deduction pass resolves the real type.
fn function_signature(item: &talus_ast::FunctionItem) -> FunctionSignature {
    FunctionSignature {
        params: item.params.iter().map(|p| p.ty.clone()).collect(),
        return_type: item.return_type.clone().unwrap_or(TypeNode::Ident { name: "auto".to_owned(), pos: item.pos }),
        variadic: item.variadic,
    }
}

fn duplicate_interface_method(item: &talus_ast::InterfaceItem) -> Option<LowerError> {
    let mut seen = HashSet::new();
    for method in &item.methods {
        if !seen.insert(method.name.as_str()) {
            return Some(LowerError::DuplicateInterfaceFunction {
                interface_name: item.name.clone(),
                function: method.name.clone(),
                pos: item.pos,
            });
        }
    }
    None
}

fn const_int_value(expr: Option<&Expr>) -> Option<i128> {
    match expr {
        Some(Expr::Int { value, .. }) => Some(*value),
        _ => None,
    }
}
