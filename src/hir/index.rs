//! Symbol index: declarations and usages across the whole project.
//!
//! # Lifecycle
//!
//! 1. **Collection** - phase 1 walks every parsed tree in file order and
//!    files each declaration and usage ([`SymbolIndex::collect_tree`])
//! 2. **Queries** - rules ask structural questions while rewriting
//!    (inheritance lookup, call sites, instantiations)
//! 3. **Lazy resolution** - class constant fetches are resolved on first
//!    query, once the whole index exists (see `const_fetch.rs`)
//!
//! ## Key Data Structures
//!
//! - One insertion-ordered table per class-like kind plus one for functions
//! - [`MemberKey`] tables for methods, constants and call sites
//! - Pending and resolved constant fetches behind locks, so lazy resolution
//!   works through `&SymbolIndex`
//!
//! Re-declaring a type overwrites the previous entry together with its
//! members; the first declaration keeps its position in declaration order.
//! Type, method and function names are case-insensitive, constant names are
//! not.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use smol_str::SmolStr;

use super::external::{Capabilities, ExternalSymbolInfo, SubtypeCheck, TypeResolver};
use super::names;
use super::symbols::{
    ClassLikeDecl, ConstFetchSite, ConstantDecl, DeclKind, Declaration, FunctionDecl, MemberKey,
    MethodDecl, PendingConstFetch, Usage,
};
use crate::base::{FileId, Interner, Name};
use crate::syntax::{
    ClassConst, ClassLike, ClassLikeKind, Expr, Function, Method, NodeRef, SourceTree, TypeContext,
};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Counts of everything the index holds, for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub classes: usize,
    pub interfaces: usize,
    pub traits: usize,
    pub functions: usize,
    pub methods: usize,
    pub constants: usize,
    pub call_sites: usize,
    pub instantiations: usize,
    pub pending_const_fetches: usize,
}

/// An index of declarations and usages across all files of a run.
///
/// Construct with [`SymbolIndex::new`], then bind the external capabilities
/// with [`SymbolIndex::bind`] before collecting. Capabilities receive the
/// index as a parameter, so the index never forms an ownership cycle with
/// its type resolver.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    interner: Interner,
    caps: Capabilities,
    /// Class-like tables are keyed by the lowercased type name.
    classes: FxIndexMap<Name, ClassLikeDecl>,
    interfaces: FxIndexMap<Name, ClassLikeDecl>,
    traits: FxIndexMap<Name, ClassLikeDecl>,
    /// Keyed by the lowercased function name.
    functions: FxIndexMap<Name, FunctionDecl>,
    /// Keyed by (lowercased owner, lowercased method name).
    methods: FxHashMap<MemberKey, MethodDecl>,
    /// Keyed by (lowercased owner, constant name); constant names are case-sensitive.
    constants: FxHashMap<MemberKey, ConstantDecl>,
    /// Calls and callable references, keyed by (receiver type, lowercased method).
    calls: FxIndexMap<MemberKey, Vec<Usage>>,
    instantiations: FxHashMap<Name, Vec<Usage>>,
    /// Fetches waiting for lazy resolution.
    pub(super) pending_fetches: Mutex<Vec<PendingConstFetch>>,
    /// (declaring type, constant) -> fetch sites, in resolution order.
    pub(super) const_fetches: RwLock<FxHashMap<MemberKey, IndexSet<ConstFetchSite>>>,
    /// Held across draining and filing, so readers never see a half-filed map.
    pub(super) resolution: ReentrantMutex<()>,
    next_order: u32,
}

impl SymbolIndex {
    /// Create a new empty index with no capabilities bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the external capabilities. Second step of the two-phase setup.
    pub fn bind(&mut self, caps: Capabilities) {
        self.caps = caps;
    }

    /// Builder variant of [`SymbolIndex::bind`].
    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.bind(caps);
        self
    }

    /// The bound type inference capability.
    pub fn type_resolver(&self) -> &Arc<dyn TypeResolver> {
        &self.caps.types
    }

    /// The bound subtype relation.
    pub fn subtype_check(&self) -> &Arc<dyn SubtypeCheck> {
        &self.caps.subtypes
    }

    /// The bound introspection of types outside the project.
    pub fn external_symbols(&self) -> &Arc<dyn ExternalSymbolInfo> {
        &self.caps.external
    }

    // ========================================================================
    // COLLECTION
    // ========================================================================

    /// Collect every declaration and usage of a tree.
    ///
    /// Anything previously collected from the same file is dropped first, so
    /// collecting a file twice leaves the index as if it was collected once.
    pub fn collect_tree(&mut self, tree: &SourceTree) {
        self.remove_file(tree.file);
        let file = tree.file;
        tree.walk(&mut |node, ctx| self.collect(file, node, ctx));
    }

    /// Classify one node and file it. Non-collectable nodes are ignored.
    pub fn collect(&mut self, file: FileId, node: NodeRef<'_>, ctx: &TypeContext) {
        match node {
            NodeRef::ClassLike(class) => self.collect_class_like(file, class),
            NodeRef::Function(function) => self.collect_function(file, function),
            NodeRef::Method(method) => {
                if let Some(owner) = ctx.class_name() {
                    self.collect_method(file, owner, method);
                }
            }
            NodeRef::Constant(constant) => {
                if let Some(owner) = ctx.class_name() {
                    self.collect_constant(file, owner, constant);
                }
            }
            NodeRef::Expr(expr) => self.collect_expr(file, expr, ctx),
            NodeRef::TraitUse(_) => {}
        }
    }

    fn collect_class_like(&mut self, file: FileId, class: &ClassLike) {
        let Some(name) = class.name.as_deref() else {
            tracing::trace!("skipping anonymous class in {}", file);
            return;
        };
        let key = self.intern_type(name);
        let order = match self.table(class.kind).get(&key).map(|existing| existing.order) {
            Some(order) => {
                // The new declaration brings its own members.
                self.methods.retain(|member, _| member.owner != key);
                self.constants.retain(|member, _| member.owner != key);
                order
            }
            None => {
                self.next_order += 1;
                self.next_order - 1
            }
        };
        let decl = ClassLikeDecl {
            kind: class.kind,
            name: SmolStr::new(name),
            parent: class.parent.clone(),
            interfaces: class.interfaces.clone(),
            node: class.clone(),
            file,
            order,
        };
        self.table_mut(class.kind).insert(key, decl);

        // Members are filed up front so call sites in earlier method bodies
        // can already see methods declared further down.
        for method in class.methods() {
            self.collect_method(file, name, method);
        }
        for constant in class.constants() {
            self.collect_constant(file, name, constant);
        }
    }

    fn collect_function(&mut self, file: FileId, function: &Function) {
        let key = self.interner.intern(&function.name.to_ascii_lowercase());
        self.functions.insert(
            key,
            FunctionDecl {
                name: function.name.clone(),
                node: function.clone(),
                file,
            },
        );
    }

    fn collect_method(&mut self, file: FileId, owner: &str, method: &Method) {
        let key = self.intern_method_key(owner, &method.name);
        self.methods.insert(
            key,
            MethodDecl {
                owner: SmolStr::new(owner),
                name: method.name.clone(),
                is_static: method.is_static,
                node: method.clone(),
                file,
            },
        );
    }

    fn collect_constant(&mut self, file: FileId, owner: &str, constant: &ClassConst) {
        let key = self.intern_constant_key(owner, &constant.name);
        self.constants.insert(
            key,
            ConstantDecl {
                owner: SmolStr::new(owner),
                name: constant.name.clone(),
                value: constant.value.clone(),
                file,
            },
        );
    }

    fn collect_expr(&mut self, file: FileId, expr: &Expr, ctx: &TypeContext) {
        match expr {
            Expr::New { class, .. } => {
                let Some(type_name) = self.class_reference(class, ctx) else {
                    return;
                };
                let key = self.intern_type(&type_name);
                self.instantiations
                    .entry(key)
                    .or_default()
                    .push(Usage::Instantiation {
                        type_name,
                        file,
                        caller: ctx.clone(),
                    });
            }
            Expr::MethodCall { receiver, name, .. } => {
                let Some(method) = names::get_name(&**name) else {
                    return;
                };
                let receiver_types = self.receiver_types(receiver, ctx);
                let usage = Usage::InstanceCall {
                    method: SmolStr::new(method),
                    receiver_types: receiver_types.clone(),
                    file,
                    caller: ctx.clone(),
                };
                self.file_call(&receiver_types, method, usage);
            }
            Expr::StaticCall { class, name, .. } => {
                let Some(method) = names::get_name(&**name) else {
                    return;
                };
                let receiver_types = self.static_receiver_types(class, ctx);
                let usage = Usage::StaticCall {
                    method: SmolStr::new(method),
                    receiver_types: receiver_types.clone(),
                    file,
                    caller: ctx.clone(),
                };
                self.file_call(&receiver_types, method, usage);
            }
            Expr::Array(_) => {
                if let Some((type_name, method)) = self.callable_reference(expr, ctx) {
                    let usage = Usage::CallableReference {
                        type_name: type_name.clone(),
                        method: method.clone(),
                        file,
                        caller: ctx.clone(),
                    };
                    self.file_call(&[type_name], &method, usage);
                }
            }
            Expr::ClassConstFetch { class, name } => {
                self.pending_fetches.get_mut().push(PendingConstFetch {
                    class: (**class).clone(),
                    constant: (**name).clone(),
                    file,
                    caller: ctx.clone(),
                });
            }
            _ => {}
        }
    }

    /// File a call usage under every candidate receiver type.
    fn file_call(&mut self, receiver_types: &[SmolStr], method: &str, usage: Usage) {
        if receiver_types.is_empty() {
            tracing::trace!("dropping call to '{}' with unresolvable receiver", method);
            return;
        }
        for type_name in receiver_types {
            let key = self.intern_method_key(type_name, method);
            self.calls.entry(key).or_default().push(usage.clone());
        }
    }

    /// Drop every declaration and usage contributed by `file`.
    pub fn remove_file(&mut self, file: FileId) {
        self.classes.retain(|_, decl| decl.file != file);
        self.interfaces.retain(|_, decl| decl.file != file);
        self.traits.retain(|_, decl| decl.file != file);
        self.functions.retain(|_, decl| decl.file != file);
        self.methods.retain(|_, decl| decl.file != file);
        self.constants.retain(|_, decl| decl.file != file);
        self.calls.retain(|_, usages| {
            usages.retain(|usage| usage.file() != file);
            !usages.is_empty()
        });
        self.instantiations.retain(|_, usages| {
            usages.retain(|usage| usage.file() != file);
            !usages.is_empty()
        });
        self.pending_fetches
            .get_mut()
            .retain(|fetch| fetch.file != file);
        self.const_fetches.get_mut().retain(|_, sites| {
            sites.retain(|site| site.file != file);
            !sites.is_empty()
        });
    }

    // ========================================================================
    // RECEIVER CLASSIFICATION
    // ========================================================================

    /// Candidate types of an instance-call receiver.
    ///
    /// `$this` inside a named type resolves to that type without inference.
    /// Everything else goes to the type resolver.
    pub(super) fn receiver_types(&self, receiver: &Expr, ctx: &TypeContext) -> Vec<SmolStr> {
        if receiver.is_this() {
            return ctx
                .class_name()
                .map(|name| vec![SmolStr::new(name)])
                .unwrap_or_default();
        }
        dedup(self.caps.types.resolve_types(receiver, ctx, self))
    }

    /// Candidate types of a static-call or constant-fetch qualifier.
    pub(super) fn static_receiver_types(&self, class: &Expr, ctx: &TypeContext) -> Vec<SmolStr> {
        if let Expr::Name(_) = class {
            return self.class_reference(class, ctx).into_iter().collect();
        }
        dedup(self.caps.types.resolve_types(class, ctx, self))
    }

    /// Resolve a literal class reference: `self`, `static`, `parent` or a name.
    fn class_reference(&self, class: &Expr, ctx: &TypeContext) -> Option<SmolStr> {
        let name = match class {
            Expr::Name(name) => name,
            _ => return None,
        };
        if names::is_names(name, &["self", "static"]) {
            ctx.class_name().map(SmolStr::new)
        } else if names::is_name(name, "parent") {
            ctx.parent_name().map(SmolStr::new)
        } else {
            Some(name.clone())
        }
    }

    /// Recognize `[receiver, 'method']` callables.
    ///
    /// The receiver must be `$this`, `self`, `static` or the enclosing type's
    /// own name (bare, as a string, or as `X::class`); the method must be a
    /// string literal naming a method that exists on the enclosing type.
    pub fn callable_reference(&self, expr: &Expr, ctx: &TypeContext) -> Option<(SmolStr, SmolStr)> {
        let Expr::Array(items) = expr else {
            return None;
        };
        let [receiver, method] = items.as_slice() else {
            return None;
        };
        if receiver.key.is_some() || method.key.is_some() {
            return None;
        }
        let Expr::String(method_name) = &method.value else {
            return None;
        };
        let class_name = ctx.class_name()?;
        if !is_self_reference(&receiver.value, class_name) {
            return None;
        }
        self.find_method(class_name, method_name)?;
        Some((SmolStr::new(class_name), method_name.clone()))
    }

    // ========================================================================
    // DECLARATION QUERIES
    // ========================================================================

    /// Direct lookup by kind and qualified name.
    ///
    /// Methods and constants are addressed as `Owner::member`.
    pub fn find_declaration(&self, kind: DeclKind, name: &str) -> Option<Declaration<'_>> {
        match kind {
            DeclKind::Class | DeclKind::Interface | DeclKind::Trait => {
                let table = self.table(kind.class_like_kind()?);
                let key = self.type_key(name)?;
                table.get(&key).map(Declaration::ClassLike)
            }
            DeclKind::Function => self.find_function(name).map(Declaration::Function),
            DeclKind::Method => {
                let (owner, member) = name.rsplit_once("::")?;
                let key = self.method_key(owner, member)?;
                self.methods.get(&key).map(Declaration::Method)
            }
            DeclKind::Constant => {
                let (owner, member) = name.rsplit_once("::")?;
                let key = self.constant_key(owner, member)?;
                self.constants.get(&key).map(Declaration::Constant)
            }
        }
    }

    /// The class declared as `name`.
    pub fn find_class(&self, name: &str) -> Option<&ClassLikeDecl> {
        self.find_in(ClassLikeKind::Class, name)
    }

    /// The interface declared as `name`.
    pub fn find_interface(&self, name: &str) -> Option<&ClassLikeDecl> {
        self.find_in(ClassLikeKind::Interface, name)
    }

    /// The trait declared as `name`.
    pub fn find_trait(&self, name: &str) -> Option<&ClassLikeDecl> {
        self.find_in(ClassLikeKind::Trait, name)
    }

    /// Function names are case-insensitive.
    pub fn find_function(&self, name: &str) -> Option<&FunctionDecl> {
        let key = self.interner.find(&name.to_ascii_lowercase())?;
        self.functions.get(&key)
    }

    /// Resolve a `FuncCall` to the called function.
    pub fn find_function_by_call(&self, call: &Expr) -> Option<&FunctionDecl> {
        let Expr::FuncCall { name, .. } = call else {
            return None;
        };
        self.find_function(names::get_name(&**name)?)
    }

    /// Look up a method on `type_name`, then up the parent chain.
    ///
    /// Only the linear parent chain is walked, never interfaces or traits.
    pub fn find_method(&self, type_name: &str, method: &str) -> Option<&MethodDecl> {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = type_name;
        loop {
            if let Some(decl) = self
                .method_key(current, method)
                .and_then(|key| self.methods.get(&key))
            {
                return Some(decl);
            }
            if !visited.insert(current) {
                tracing::debug!("parent cycle while looking up '{}' on '{}'", method, type_name);
                return None;
            }
            current = self.find_class(current)?.parent.as_deref()?;
        }
    }

    /// Resolve a method or static call to the called method.
    pub fn find_method_by_call(&self, call: &Expr, ctx: &TypeContext) -> Option<&MethodDecl> {
        let (candidates, name) = match call {
            Expr::MethodCall { receiver, name, .. } => (self.receiver_types(receiver, ctx), name),
            Expr::StaticCall { class, name, .. } => (self.static_receiver_types(class, ctx), name),
            _ => return None,
        };
        let method = names::get_name(&**name)?;
        candidates
            .iter()
            .find_map(|type_name| self.find_method(type_name, method))
    }

    /// Classes that are subtypes of `type_name`, excluding `type_name` itself.
    pub fn find_children_of_class(&self, type_name: &str) -> Vec<&ClassLikeDecl> {
        self.subtypes_in(&self.classes, type_name)
    }

    /// Interfaces that extend `interface`, excluding `interface` itself.
    pub fn find_implementers_of_interface(&self, interface: &str) -> Vec<&ClassLikeDecl> {
        self.subtypes_in(&self.interfaces, interface)
    }

    /// Does any indexed class extend `type_name`?
    pub fn has_class_children(&self, type_name: &str) -> bool {
        !self.find_children_of_class(type_name).is_empty()
    }

    fn subtypes_in<'a>(
        &self,
        table: &'a FxIndexMap<Name, ClassLikeDecl>,
        target: &str,
    ) -> Vec<&'a ClassLikeDecl> {
        table
            .values()
            .filter(|decl| !decl.name.eq_ignore_ascii_case(target))
            .filter(|decl| self.caps.subtypes.is_subtype_of(&decl.name, target))
            .collect()
    }

    /// Traits pulled in by the trait-use statements of `type_name`.
    ///
    /// Names that do not resolve to an indexed trait are skipped.
    pub fn find_used_traits_in_class(&self, type_name: &str) -> Vec<&ClassLikeDecl> {
        let Some(class) = self.find_class(type_name) else {
            return Vec::new();
        };
        class
            .node
            .used_traits()
            .filter_map(|name| self.find_trait(name))
            .collect()
    }

    /// First class in declaration order whose last name segment is `short_name`.
    pub fn find_by_short_name(&self, short_name: &str) -> Option<&ClassLikeDecl> {
        self.classes
            .values()
            .find(|decl| names::short_name(&decl.name) == short_name)
    }

    /// Direct lookup of a constant declared on `type_name`.
    ///
    /// # Panics
    /// Panics if `constant` looks like a qualified name. Callers must pass
    /// the bare constant name.
    pub fn find_class_constant(&self, type_name: &str, constant: &str) -> Option<&ConstantDecl> {
        assert!(
            !names::looks_qualified(constant),
            "invariant violation: constant name '{constant}' passed to find_class_constant is qualified"
        );
        let key = self.constant_key(type_name, constant)?;
        self.constants.get(&key)
    }

    /// Look up a constant on `type_name`, then up the parent chain.
    pub fn find_constant_in_chain(&self, type_name: &str, constant: &str) -> Option<&ConstantDecl> {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = type_name;
        loop {
            if let Some(decl) = self.find_class_constant(current, constant) {
                return Some(decl);
            }
            if !visited.insert(current) {
                return None;
            }
            current = self.find_class(current)?.parent.as_deref()?;
        }
    }

    /// Resolve a `ClassConstFetch` to the declared constant.
    pub fn find_class_constant_by_fetch(&self, fetch: &Expr, ctx: &TypeContext) -> Option<&ConstantDecl> {
        let Expr::ClassConstFetch { class, name } = fetch else {
            return None;
        };
        let constant = names::get_name(&**name)?;
        self.static_receiver_types(class, ctx)
            .iter()
            .find_map(|type_name| self.find_constant_in_chain(type_name, constant))
    }

    // ========================================================================
    // USAGE QUERIES
    // ========================================================================

    /// All calls and callable references that target `method` declared in
    /// the type described by `ctx`. Methods of anonymous types have none.
    pub fn find_class_method_calls(&self, method: &Method, ctx: &TypeContext) -> Vec<Usage> {
        match ctx.class_name() {
            Some(owner) => self.find_method_calls(owner, &method.name).to_vec(),
            None => Vec::new(),
        }
    }

    /// Call usages recorded under (`type_name`, `method`).
    pub fn find_method_calls(&self, type_name: &str, method: &str) -> &[Usage] {
        self.method_key(type_name, method)
            .and_then(|key| self.calls.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every call usage on `type_name`, grouped by method in first-seen order.
    pub fn find_method_calls_on_class(&self, type_name: &str) -> IndexMap<SmolStr, Vec<Usage>> {
        let Some(owner) = self.type_key(type_name) else {
            return IndexMap::new();
        };
        self.calls
            .iter()
            .filter(|(key, _)| key.owner == owner)
            .map(|(key, usages)| (self.interner.resolve(key.member), usages.clone()))
            .collect()
    }

    /// Every `new type_name` in the project.
    pub fn find_new_nodes_by_class(&self, type_name: &str) -> &[Usage] {
        self.type_key(type_name)
            .and_then(|key| self.instantiations.get(&key))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ========================================================================
    // ITERATION
    // ========================================================================

    /// Classes in declaration order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassLikeDecl> {
        self.classes.values()
    }

    /// Interfaces in declaration order.
    pub fn interfaces(&self) -> impl Iterator<Item = &ClassLikeDecl> {
        self.interfaces.values()
    }

    /// Traits in declaration order.
    pub fn traits(&self) -> impl Iterator<Item = &ClassLikeDecl> {
        self.traits.values()
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.values()
    }

    /// Table sizes, for logging.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            classes: self.classes.len(),
            interfaces: self.interfaces.len(),
            traits: self.traits.len(),
            functions: self.functions.len(),
            methods: self.methods.len(),
            constants: self.constants.len(),
            call_sites: self.calls.values().map(Vec::len).sum(),
            instantiations: self.instantiations.values().map(Vec::len).sum(),
            pending_const_fetches: self.pending_fetches.lock().len(),
        }
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    fn table(&self, kind: ClassLikeKind) -> &FxIndexMap<Name, ClassLikeDecl> {
        match kind {
            ClassLikeKind::Class => &self.classes,
            ClassLikeKind::Interface => &self.interfaces,
            ClassLikeKind::Trait => &self.traits,
        }
    }

    fn table_mut(&mut self, kind: ClassLikeKind) -> &mut FxIndexMap<Name, ClassLikeDecl> {
        match kind {
            ClassLikeKind::Class => &mut self.classes,
            ClassLikeKind::Interface => &mut self.interfaces,
            ClassLikeKind::Trait => &mut self.traits,
        }
    }

    fn find_in(&self, kind: ClassLikeKind, name: &str) -> Option<&ClassLikeDecl> {
        let key = self.type_key(name)?;
        self.table(kind).get(&key)
    }

    /// Any class-like named `name`, classes first.
    pub(super) fn find_class_like(&self, name: &str) -> Option<&ClassLikeDecl> {
        let key = self.type_key(name)?;
        self.classes
            .get(&key)
            .or_else(|| self.interfaces.get(&key))
            .or_else(|| self.traits.get(&key))
    }

    /// Type names are case-insensitive, like method and function names.
    fn intern_type(&self, name: &str) -> Name {
        self.interner.intern(&name.to_ascii_lowercase())
    }

    fn type_key(&self, name: &str) -> Option<Name> {
        self.interner.find(&name.to_ascii_lowercase())
    }

    fn intern_method_key(&self, owner: &str, method: &str) -> MemberKey {
        MemberKey {
            owner: self.intern_type(owner),
            member: self.interner.intern(&method.to_ascii_lowercase()),
        }
    }

    fn method_key(&self, owner: &str, method: &str) -> Option<MemberKey> {
        Some(MemberKey {
            owner: self.type_key(owner)?,
            member: self.interner.find(&method.to_ascii_lowercase())?,
        })
    }

    /// Key of an already interned (owner, constant) pair.
    pub(super) fn constant_key(&self, owner: &str, constant: &str) -> Option<MemberKey> {
        Some(MemberKey {
            owner: self.type_key(owner)?,
            member: self.interner.find(constant)?,
        })
    }

    /// Key of (owner, constant), interning both.
    pub(super) fn intern_constant_key(&self, owner: &str, constant: &str) -> MemberKey {
        MemberKey {
            owner: self.intern_type(owner),
            member: self.interner.intern(constant),
        }
    }
}

/// Is `receiver` a reference to the enclosing type `class_name`?
fn is_self_reference(receiver: &Expr, class_name: &str) -> bool {
    match receiver {
        Expr::Variable(_) => receiver.is_this(),
        Expr::Name(name) | Expr::String(name) => {
            names::is_names(name, &["self", "static"]) || names::is_name(name, class_name)
        }
        Expr::ClassConstFetch { class, name } => {
            names::is_name(&**name, "class") && is_self_reference(class, class_name)
        }
        _ => false,
    }
}

/// Drop repeated candidates, keeping first-seen order.
fn dedup(candidates: Vec<SmolStr>) -> Vec<SmolStr> {
    let mut seen = IndexSet::with_capacity(candidates.len());
    for candidate in candidates {
        seen.insert(candidate);
    }
    seen.into_iter().collect()
}
