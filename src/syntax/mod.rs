//! Syntax trees handed over by the external parser.
//!
//! The parser itself is not part of this crate. It must produce
//! [`SourceTree`]s in this vocabulary so the symbol index can classify
//! nodes and rules can rewrite them.

mod nodes;
mod walk;

pub use nodes::{
    ArrayItem, ClassConst, ClassLike, ClassLikeKind, Expr, Function, Member, Method, Property,
    SourceTree, Stmt,
};
pub use walk::{ClassScope, NodeRef, TypeContext};
