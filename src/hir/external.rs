//! Capabilities the symbol index borrows from the outside world.
//!
//! The index knows declarations, not types. Whatever needs type inference,
//! a subtype relation, or introspection of types that were never parsed
//! goes through these traits. Implementations receive the index as a
//! parameter when they need it, so neither side owns the other.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use super::index::SymbolIndex;
use crate::syntax::{Expr, TypeContext};

/// Infers the possible types of an expression.
pub trait TypeResolver: Send + Sync {
    /// Candidate type names for `expr`, in the resolver's own order.
    ///
    /// An empty result means the type is unknown. Several names mean a
    /// union type.
    fn resolve_types(&self, expr: &Expr, ctx: &TypeContext, index: &SymbolIndex)
    -> Vec<SmolStr>;
}

/// Answers `candidate is-a target`, reflexively and transitively.
pub trait SubtypeCheck: Send + Sync {
    fn is_subtype_of(&self, candidate: &str, target: &str) -> bool;
}

/// Introspection of types that exist but were not parsed in this run.
pub trait ExternalSymbolInfo: Send + Sync {
    /// Is the type loadable (vendor code, runtime built-ins)?
    fn type_exists(&self, type_name: &str) -> bool;

    /// The raw documentation comment of the type.
    fn doc_comment(&self, type_name: &str) -> Option<String>;

    /// Static flag of a real method on the type, `None` if the type has no
    /// such method.
    fn reflected_is_static(&self, type_name: &str, method: &str) -> Option<bool>;
}

/// Resolver that knows nothing. Only `$this` receivers resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTypeResolver;

impl TypeResolver for NoTypeResolver {
    fn resolve_types(&self, _: &Expr, _: &TypeContext, _: &SymbolIndex) -> Vec<SmolStr> {
        Vec::new()
    }
}

/// Subtype relation where a type is only a subtype of itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSubtypes;

impl SubtypeCheck for NoSubtypes {
    fn is_subtype_of(&self, candidate: &str, target: &str) -> bool {
        candidate.eq_ignore_ascii_case(target)
    }
}

/// No external types exist.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExternalSymbols;

impl ExternalSymbolInfo for NoExternalSymbols {
    fn type_exists(&self, _: &str) -> bool {
        false
    }

    fn doc_comment(&self, _: &str) -> Option<String> {
        None
    }

    fn reflected_is_static(&self, _: &str, _: &str) -> Option<bool> {
        None
    }
}

/// The bundle of capabilities bound to an index.
#[derive(Clone)]
pub struct Capabilities {
    pub types: Arc<dyn TypeResolver>,
    pub subtypes: Arc<dyn SubtypeCheck>,
    pub external: Arc<dyn ExternalSymbolInfo>,
}

impl Capabilities {
    /// Null capabilities: nothing is inferred, nothing is a subtype, nothing is external.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the type resolver.
    pub fn with_type_resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.types = Arc::new(resolver);
        self
    }

    /// Replace the subtype relation.
    pub fn with_subtype_check(mut self, check: impl SubtypeCheck + 'static) -> Self {
        self.subtypes = Arc::new(check);
        self
    }

    /// Replace the introspection of external types.
    pub fn with_external_symbols(mut self, info: impl ExternalSymbolInfo + 'static) -> Self {
        self.external = Arc::new(info);
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            types: Arc::new(NoTypeResolver),
            subtypes: Arc::new(NoSubtypes),
            external: Arc::new(NoExternalSymbols),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
