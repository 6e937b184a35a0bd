//! Declarations and usages recorded by the symbol index.

use smol_str::SmolStr;

use crate::base::{FileId, Name};
use crate::syntax::{ClassLike, ClassLikeKind, Expr, Function, Member, Method, TypeContext};

/// The kind of an indexed declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeclKind {
    Class,
    Interface,
    Trait,
    Function,
    Method,
    Constant,
}

impl DeclKind {
    /// The declaration kind of a class-like.
    pub fn of_class_like(kind: ClassLikeKind) -> Self {
        match kind {
            ClassLikeKind::Class => DeclKind::Class,
            ClassLikeKind::Interface => DeclKind::Interface,
            ClassLikeKind::Trait => DeclKind::Trait,
        }
    }

    /// The class-like flavour, for the three type kinds.
    pub fn class_like_kind(self) -> Option<ClassLikeKind> {
        match self {
            DeclKind::Class => Some(ClassLikeKind::Class),
            DeclKind::Interface => Some(ClassLikeKind::Interface),
            DeclKind::Trait => Some(ClassLikeKind::Trait),
            DeclKind::Function | DeclKind::Method | DeclKind::Constant => None,
        }
    }

    /// Lowercase label for messages.
    pub fn display(&self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Interface => "interface",
            DeclKind::Trait => "trait",
            DeclKind::Function => "function",
            DeclKind::Method => "method",
            DeclKind::Constant => "constant",
        }
    }
}

/// An indexed class, interface or trait.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLikeDecl {
    pub kind: ClassLikeKind,
    /// Fully qualified name.
    pub name: SmolStr,
    pub parent: Option<SmolStr>,
    pub interfaces: Vec<SmolStr>,
    /// The declaring node, member statements included.
    pub node: ClassLike,
    pub file: FileId,
    /// Position in declaration order across all class-likes of the run.
    /// Kept when a later file redeclares the type.
    pub order: u32,
}

impl ClassLikeDecl {
    /// Does this type declare the constant among its own statements?
    pub fn declares_constant(&self, constant: &str) -> bool {
        self.node.constants().any(|c| c.name == constant)
    }

    /// Does this type declare the method among its own statements?
    pub fn declares_method(&self, method: &str) -> bool {
        self.node
            .methods()
            .any(|m| m.name.eq_ignore_ascii_case(method))
    }

    /// Member statements of the declaration, in source order.
    pub fn members(&self) -> &[Member] {
        &self.node.members
    }
}

/// An indexed free function.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: SmolStr,
    pub node: Function,
    pub file: FileId,
}

/// An indexed method, owned by exactly one named type.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub owner: SmolStr,
    pub name: SmolStr,
    pub is_static: bool,
    pub node: Method,
    pub file: FileId,
}

/// An indexed class constant, owned by exactly one named type.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDecl {
    pub owner: SmolStr,
    pub name: SmolStr,
    pub value: Expr,
    pub file: FileId,
}

/// A borrowed view over any indexed declaration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Declaration<'a> {
    ClassLike(&'a ClassLikeDecl),
    Function(&'a FunctionDecl),
    Method(&'a MethodDecl),
    Constant(&'a ConstantDecl),
}

impl Declaration<'_> {
    /// The kind of declaration this is.
    pub fn kind(&self) -> DeclKind {
        match self {
            Declaration::ClassLike(decl) => DeclKind::of_class_like(decl.kind),
            Declaration::Function(_) => DeclKind::Function,
            Declaration::Method(_) => DeclKind::Method,
            Declaration::Constant(_) => DeclKind::Constant,
        }
    }

    /// Qualified name; members are written `Owner::member`.
    pub fn qualified_name(&self) -> String {
        match self {
            Declaration::ClassLike(decl) => decl.name.to_string(),
            Declaration::Function(decl) => decl.name.to_string(),
            Declaration::Method(decl) => format!("{}::{}", decl.owner, decl.name),
            Declaration::Constant(decl) => format!("{}::{}", decl.owner, decl.name),
        }
    }

    pub fn file(&self) -> FileId {
        match self {
            Declaration::ClassLike(decl) => decl.file,
            Declaration::Function(decl) => decl.file,
            Declaration::Method(decl) => decl.file,
            Declaration::Constant(decl) => decl.file,
        }
    }
}

/// A reference site recorded while walking trees.
#[derive(Clone, Debug, PartialEq)]
pub enum Usage {
    /// `new Type`.
    Instantiation {
        type_name: SmolStr,
        file: FileId,
        caller: TypeContext,
    },
    /// `Type::method()`, `self::method()`, `parent::method()`.
    StaticCall {
        method: SmolStr,
        receiver_types: Vec<SmolStr>,
        file: FileId,
        caller: TypeContext,
    },
    /// `$receiver->method()`.
    InstanceCall {
        method: SmolStr,
        receiver_types: Vec<SmolStr>,
        file: FileId,
        caller: TypeContext,
    },
    /// `[$this, 'method']` and friends.
    CallableReference {
        type_name: SmolStr,
        method: SmolStr,
        file: FileId,
        caller: TypeContext,
    },
}

impl Usage {
    pub fn file(&self) -> FileId {
        match self {
            Usage::Instantiation { file, .. }
            | Usage::StaticCall { file, .. }
            | Usage::InstanceCall { file, .. }
            | Usage::CallableReference { file, .. } => *file,
        }
    }

    /// Where the usage sits.
    pub fn caller(&self) -> &TypeContext {
        match self {
            Usage::Instantiation { caller, .. }
            | Usage::StaticCall { caller, .. }
            | Usage::InstanceCall { caller, .. }
            | Usage::CallableReference { caller, .. } => caller,
        }
    }

    /// The called method, for calls and callable references.
    pub fn method(&self) -> Option<&str> {
        match self {
            Usage::StaticCall { method, .. }
            | Usage::InstanceCall { method, .. }
            | Usage::CallableReference { method, .. } => Some(method),
            Usage::Instantiation { .. } => None,
        }
    }

    /// Is this a `[receiver, 'method']` callable?
    pub fn is_callable_reference(&self) -> bool {
        matches!(self, Usage::CallableReference { .. })
    }
}

/// A class constant fetch waiting for lazy resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingConstFetch {
    /// The qualifier: a name, `self`/`static`/`parent`, or an expression.
    pub class: Expr,
    /// The constant name node; only plain names resolve.
    pub constant: Expr,
    pub file: FileId,
    pub caller: TypeContext,
}

/// Where a resolved constant fetch happened.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ConstFetchSite {
    /// The enclosing named type, `None` for fetches outside any type.
    pub fetcher: Option<SmolStr>,
    pub file: FileId,
}

/// Table key for members: (owning type, member name).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MemberKey {
    pub owner: Name,
    pub member: Name,
}
