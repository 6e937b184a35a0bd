//! Semantic layer over parsed trees.
//!
//! - [`names`] - name comparison helpers used by rules and the index
//! - [`SymbolIndex`] - project-wide declarations and usages
//! - [`Capabilities`] - type inference and introspection supplied by the host

mod const_fetch;
mod external;
mod index;
pub mod names;
mod statics;
mod symbols;

pub use external::{
    Capabilities, ExternalSymbolInfo, NoExternalSymbols, NoSubtypes, NoTypeResolver,
    SubtypeCheck, TypeResolver,
};
pub use index::{IndexStats, SymbolIndex};
pub use names::HasName;
pub use symbols::{
    ClassLikeDecl, ConstFetchSite, ConstantDecl, DeclKind, Declaration, FunctionDecl, MethodDecl,
    PendingConstFetch, Usage,
};
