//! Expression AST — the "Expression"/"Factor" node family.

use talus_diagnostics::Position;

use crate::ty::TypeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    LogicalAnd,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident { name: String, pos: Position },

    Int { value: i128, pos: Position },
    Float { value: f64, pos: Position },
    Bool { value: bool, pos: Position },
    Character { value: char, pos: Position },
    String { value: String, pos: Position },
    NullPtr { pos: Position },

    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr>, pos: Position },
    Unary { op: UnOp, operand: Box<Expr>, pos: Position },

    /// `*expr` — pointer dereference.
    Deref { operand: Box<Expr>, pos: Position },
    /// `&expr` — address-of. Lowering this is a hard error: its intended
    /// semantics (alias, smart pointer, or ownership-transferring move)
    /// are undecided, so it stays a hard error rather than a guess.
    Reference { operand: Box<Expr>, pos: Position },

    /// `a[i]` subscript.
    Element { base: Box<Expr>, index: Box<Expr>, pos: Position },
    /// `a.b` field access.
    StructMember { base: Box<Expr>, member: String, pos: Position },
    /// `Type::member` — scope resolution, e.g. enum variant access.
    ScopeRes { scope: String, member: String, pos: Position },

    /// `new T(args)`.
    NewExpr { ty: TypeNode, args: Vec<Expr>, pos: Position },
    SizeOf { ty: TypeNode, pos: Position },
    AlignOf { ty: TypeNode, pos: Position },
    /// `cast<T>(expr)`.
    Cast { ty: TypeNode, operand: Box<Expr>, pos: Position },

    /// `f(args)`, where `args` may itself contain an `Expansion`.
    Call { callee: Box<Expr>, args: Vec<Expr>, pos: Position },
    /// `append(list, value)`.
    Append { list: Box<Expr>, value: Box<Expr>, pos: Position },
    /// `len(expr)`.
    Len { operand: Box<Expr>, pos: Position },
    /// `<-chan` receive-as-expression.
    Receive { channel: Box<Expr>, pos: Position },

    /// `...expr` inside an argument list: splice a tuple/array's elements
    /// as individual call arguments.
    Expansion { operand: Box<Expr>, pos: Position },
    /// `expr...` a bound range/repeat operator distinct from `Expansion`
    /// (kept as its own variant per the original source's separate
    /// `ExpandOp` node).
    ExpandOp { operand: Box<Expr>, pos: Position },

    /// `++expr` / `--expr`.
    PreOp { op: IncDecOp, operand: Box<Expr>, pos: Position },
    /// `expr++` / `expr--`.
    PostOp { op: IncDecOp, operand: Box<Expr>, pos: Position },

    /// `lo..hi` range literal.
    Range { lo: Box<Expr>, hi: Box<Expr>, pos: Position },
    /// `{ field: value, ... }` aggregate initializer.
    Initializer { fields: Vec<(Option<String>, Expr)>, pos: Position },
    /// `[expr for x in iter if cond]`.
    ListComprehension {
        element: Box<Expr>,
        binder: String,
        iterable: Box<Expr>,
        condition: Option<Box<Expr>>,
        pos: Position,
    },
    /// `|params| -> ret { body }` — lowers through the trampoline binder
    /// when it captures its environment.
    Closure { params: Vec<String>, param_types: Vec<TypeNode>, ret: Option<TypeNode>, body: Vec<crate::stmt::Stmt>, pos: Position },

    /// Parenthesized sub-expression, kept distinct so diagnostics can
    /// point at the outer span when useful.
    Expression { inner: Box<Expr>, pos: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl Expr {
    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Expr::Ident { pos, .. }
            | Expr::Int { pos, .. }
            | Expr::Float { pos, .. }
            | Expr::Bool { pos, .. }
            | Expr::Character { pos, .. }
            | Expr::String { pos, .. }
            | Expr::NullPtr { pos }
            | Expr::Binary { pos, .. }
            | Expr::Unary { pos, .. }
            | Expr::Deref { pos, .. }
            | Expr::Reference { pos, .. }
            | Expr::Element { pos, .. }
            | Expr::StructMember { pos, .. }
            | Expr::ScopeRes { pos, .. }
            | Expr::NewExpr { pos, .. }
            | Expr::SizeOf { pos, .. }
            | Expr::AlignOf { pos, .. }
            | Expr::Cast { pos, .. }
            | Expr::Call { pos, .. }
            | Expr::Append { pos, .. }
            | Expr::Len { pos, .. }
            | Expr::Receive { pos, .. }
            | Expr::Expansion { pos, .. }
            | Expr::ExpandOp { pos, .. }
            | Expr::PreOp { pos, .. }
            | Expr::PostOp { pos, .. }
            | Expr::Range { pos, .. }
            | Expr::Initializer { pos, .. }
            | Expr::ListComprehension { pos, .. }
            | Expr::Closure { pos, .. }
            | Expr::Expression { pos, .. } => *pos,
        }
    }

    /// True for the `...expr` expansion marker the original source treats
    /// as a sentinel during call-argument checking.
    #[must_use]
    pub fn is_expansion(&self) -> bool {
        matches!(self, Expr::Expansion { .. })
    }

    /// True for the `::expansion` partial-application sentinel (glossary
    /// "Expansion sentinel"). The original source recognizes it by the
    /// emitted value's *name*, not its AST shape — there's no dedicated
    /// parse-tree node for it, it parses as an ordinary identifier whose
    /// text happens to be `::expansion` (the same trick the discard sink
    /// `_` uses for identifier resolution).
    #[must_use]
    pub fn is_partial_application_sentinel(&self) -> bool {
        matches!(self, Expr::Ident { name, .. } if name == "::expansion")
    }
}
