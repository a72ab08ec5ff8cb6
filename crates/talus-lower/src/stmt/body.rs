//! Block/scope lowering: pushing and popping lexical scopes, replaying
//! defers on the way out.

use talus_ast::Stmt;
use talus_diagnostics::LowerResult;
use talus_ir::Builder;
use talus_types::ModuleEnv;

use crate::context::LoweringContext;

/// Lowers a list of statements as a fresh lexical scope: pushes a scope,
/// lowers each statement in order, then (if control didn't already leave
/// through a terminator) replays this scope's own defers before falling
/// through to whatever follows.
pub fn lower_block(stmts: &[Stmt], ctx: &mut LoweringContext, env: &ModuleEnv, builder: &mut dyn Builder) -> LowerResult<()> {
    ctx.push_scope();
    for stmt in stmts {
        if builder.is_terminated(builder.current_block()) {
            break;
        }
        super::lower_stmt(stmt, ctx, env, builder)?;
    }
    let (deferred, trampolines) = ctx.pop_scope();
    if !builder.is_terminated(builder.current_block()) {
        for stmt in deferred {
            super::lower_stmt(&stmt.0, ctx, env, builder)?;
        }
        for buf in trampolines {
            builder.trampoline_free(buf);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use talus_diagnostics::Position;
    use talus_ir::{RecordingBuilder, Type};

    #[test]
    fn empty_block_lowers_without_error() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        assert!(lower_block(&[], &mut ctx, &env, &mut builder).is_ok());
    }

    #[test]
    fn block_stops_lowering_after_terminator() {
        let mut builder = RecordingBuilder::new();
        let mut ctx = LoweringContext::new();
        let env = ModuleEnv::new();
        builder.start_function("f", vec![], false, Type::Void);
        let stmts = vec![
            Stmt::Return { value: None, pos: Position::default() },
            Stmt::Break { pos: Position::default() },
        ];
        assert!(lower_block(&stmts, &mut ctx, &env, &mut builder).is_ok());
    }
}
