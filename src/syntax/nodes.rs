//! Tree node types produced by the external parser.
//!
//! The vocabulary is deliberately small: just the declarations and
//! expressions the symbol index classifies, plus enough statements for
//! rules to have something to rewrite. Qualified names use `\` as the
//! namespace separator.

use smol_str::SmolStr;

use crate::base::FileId;

/// A parsed source file.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceTree {
    /// The file this tree was parsed from.
    pub file: FileId,
    /// Top-level statements in source order.
    pub stmts: Vec<Stmt>,
}

impl SourceTree {
    pub fn new(file: FileId, stmts: Vec<Stmt>) -> Self {
        Self { file, stmts }
    }
}

/// A statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    ClassLike(ClassLike),
    Function(Function),
    Expr(Expr),
    Return(Option<Expr>),
    Block(Vec<Stmt>),
}

/// The flavour of a class-like declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassLikeKind {
    Class,
    Interface,
    Trait,
}

/// A class, interface or trait declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLike {
    pub kind: ClassLikeKind,
    /// Fully qualified name; `None` for anonymous classes.
    pub name: Option<SmolStr>,
    /// Parent class (`extends`) for classes.
    pub parent: Option<SmolStr>,
    /// Implemented interfaces for classes, extended interfaces for
    /// interfaces.
    pub interfaces: Vec<SmolStr>,
    /// Member statements in source order.
    pub members: Vec<Member>,
    /// The raw documentation comment, if any.
    pub doc_comment: Option<String>,
}

impl ClassLike {
    fn named(kind: ClassLikeKind, name: &str) -> Self {
        Self {
            kind,
            name: Some(SmolStr::new(name)),
            parent: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            doc_comment: None,
        }
    }

    pub fn class(name: &str) -> Self {
        Self::named(ClassLikeKind::Class, name)
    }

    pub fn interface(name: &str) -> Self {
        Self::named(ClassLikeKind::Interface, name)
    }

    pub fn trait_(name: &str) -> Self {
        Self::named(ClassLikeKind::Trait, name)
    }

    /// An anonymous class (`new class { ... }`).
    pub fn anonymous() -> Self {
        Self {
            name: None,
            ..Self::named(ClassLikeKind::Class, "")
        }
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(SmolStr::new(parent));
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(SmolStr::new(interface));
        self
    }

    pub fn with_member(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc_comment = Some(doc.into());
        self
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_none()
    }

    /// Methods declared directly on this class-like.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    /// Constants declared directly on this class-like.
    pub fn constants(&self) -> impl Iterator<Item = &ClassConst> {
        self.members.iter().filter_map(|member| match member {
            Member::Constant(constant) => Some(constant),
            _ => None,
        })
    }

    /// Names from every trait-use statement, in source order.
    pub fn used_traits(&self) -> impl Iterator<Item = &SmolStr> {
        self.members
            .iter()
            .flat_map(|member| -> &[SmolStr] {
                match member {
                    Member::TraitUse(names) => names,
                    _ => &[],
                }
            })
    }
}

/// A member statement of a class-like.
#[derive(Clone, Debug, PartialEq)]
pub enum Member {
    Method(Method),
    Constant(ClassConst),
    TraitUse(Vec<SmolStr>),
    Property(Property),
}

impl From<Method> for Member {
    fn from(method: Method) -> Self {
        Member::Method(method)
    }
}

impl From<ClassConst> for Member {
    fn from(constant: ClassConst) -> Self {
        Member::Constant(constant)
    }
}

impl From<Property> for Member {
    fn from(property: Property) -> Self {
        Member::Property(property)
    }
}

/// A method declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Method {
    pub name: SmolStr,
    pub is_static: bool,
    pub body: Vec<Stmt>,
}

impl Method {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            is_static: false,
            body: Vec::new(),
        }
    }

    pub fn new_static(name: &str) -> Self {
        Self {
            is_static: true,
            ..Self::new(name)
        }
    }

    pub fn with_body(mut self, body: Vec<Stmt>) -> Self {
        self.body = body;
        self
    }
}

/// A class constant declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassConst {
    pub name: SmolStr,
    pub value: Expr,
}

impl ClassConst {
    pub fn new(name: &str, value: Expr) -> Self {
        Self {
            name: SmolStr::new(name),
            value,
        }
    }
}

/// A property declaration. Not indexed; kept so rules can see and edit it.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    pub name: SmolStr,
    pub is_static: bool,
    pub default: Option<Expr>,
}

/// A free function declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: SmolStr,
    pub body: Vec<Stmt>,
}

impl Function {
    pub fn new(name: &str, body: Vec<Stmt>) -> Self {
        Self {
            name: SmolStr::new(name),
            body,
        }
    }
}

/// One item of an array literal.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

impl ArrayItem {
    pub fn value(value: Expr) -> Self {
        Self { key: None, value }
    }
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// `$name`; the current instance is `Variable("this")`.
    Variable(SmolStr),
    /// A bare identifier: class names, function names, `self`, `static`,
    /// `parent`, method and constant identifiers.
    Name(SmolStr),
    String(SmolStr),
    Int(i64),
    Array(Vec<ArrayItem>),
    New {
        class: Box<Expr>,
        args: Vec<Expr>,
    },
    AnonymousClass {
        class: Box<ClassLike>,
        args: Vec<Expr>,
    },
    MethodCall {
        receiver: Box<Expr>,
        name: Box<Expr>,
        args: Vec<Expr>,
    },
    StaticCall {
        class: Box<Expr>,
        name: Box<Expr>,
        args: Vec<Expr>,
    },
    FuncCall {
        name: Box<Expr>,
        args: Vec<Expr>,
    },
    ClassConstFetch {
        class: Box<Expr>,
        name: Box<Expr>,
    },
    PropertyFetch {
        receiver: Box<Expr>,
        name: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn this() -> Self {
        Expr::Variable(SmolStr::new_static("this"))
    }

    pub fn var(name: &str) -> Self {
        Expr::Variable(SmolStr::new(name))
    }

    pub fn name(name: &str) -> Self {
        Expr::Name(SmolStr::new(name))
    }

    pub fn string(value: &str) -> Self {
        Expr::String(SmolStr::new(value))
    }

    pub fn array(values: Vec<Expr>) -> Self {
        Expr::Array(values.into_iter().map(ArrayItem::value).collect())
    }

    pub fn new_instance(class: &str) -> Self {
        Expr::New {
            class: Box::new(Expr::name(class)),
            args: Vec::new(),
        }
    }

    pub fn method_call(receiver: Expr, method: &str) -> Self {
        Expr::MethodCall {
            receiver: Box::new(receiver),
            name: Box::new(Expr::name(method)),
            args: Vec::new(),
        }
    }

    pub fn static_call(class: &str, method: &str) -> Self {
        Expr::StaticCall {
            class: Box::new(Expr::name(class)),
            name: Box::new(Expr::name(method)),
            args: Vec::new(),
        }
    }

    pub fn func_call(function: &str) -> Self {
        Expr::FuncCall {
            name: Box::new(Expr::name(function)),
            args: Vec::new(),
        }
    }

    pub fn const_fetch(class: Expr, constant: &str) -> Self {
        Expr::ClassConstFetch {
            class: Box::new(class),
            name: Box::new(Expr::name(constant)),
        }
    }

    /// Is this the current-instance variable?
    pub fn is_this(&self) -> bool {
        matches!(self, Expr::Variable(name) if name == "this")
    }

    /// Shorthand for wrapping an expression into a statement.
    pub fn into_stmt(self) -> Stmt {
        Stmt::Expr(self)
    }
}
