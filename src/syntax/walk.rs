//! Depth-first traversal with the enclosing type context.

use smol_str::SmolStr;

use super::nodes::{ClassConst, ClassLike, Expr, Function, Member, Method, SourceTree, Stmt};

/// The class-like a node sits in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ClassScope {
    /// Top level or inside a free function.
    #[default]
    Global,
    /// Inside a named class-like.
    Named {
        name: SmolStr,
        parent: Option<SmolStr>,
    },
    /// Inside an anonymous class.
    Anonymous { parent: Option<SmolStr> },
}

/// Where a node lives: enclosing class-like and enclosing method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeContext {
    pub scope: ClassScope,
    pub method: Option<SmolStr>,
}

impl TypeContext {
    pub fn global() -> Self {
        Self::default()
    }

    /// Context of a named class-like.
    pub fn in_class(name: &str, parent: Option<&str>) -> Self {
        Self {
            scope: ClassScope::Named {
                name: SmolStr::new(name),
                parent: parent.map(SmolStr::new),
            },
            method: None,
        }
    }

    /// The same context, narrowed to a method body.
    pub fn in_method(&self, method: &str) -> Self {
        Self {
            scope: self.scope.clone(),
            method: Some(SmolStr::new(method)),
        }
    }

    /// Name of the enclosing named class-like.
    pub fn class_name(&self) -> Option<&str> {
        match &self.scope {
            ClassScope::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Parent of the enclosing class-like, named or anonymous.
    pub fn parent_name(&self) -> Option<&str> {
        match &self.scope {
            ClassScope::Named { parent, .. } | ClassScope::Anonymous { parent } => {
                parent.as_deref()
            }
            ClassScope::Global => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self.scope, ClassScope::Anonymous { .. })
    }

    fn for_class_like(class: &ClassLike) -> Self {
        let parent = class.parent.clone();
        let scope = match &class.name {
            Some(name) => ClassScope::Named {
                name: name.clone(),
                parent,
            },
            None => ClassScope::Anonymous { parent },
        };
        Self {
            scope,
            method: None,
        }
    }
}

/// A borrowed view of any node the walker visits.
#[derive(Clone, Copy, Debug)]
pub enum NodeRef<'a> {
    ClassLike(&'a ClassLike),
    Function(&'a Function),
    Method(&'a Method),
    Constant(&'a ClassConst),
    TraitUse(&'a [SmolStr]),
    Expr(&'a Expr),
}

impl SourceTree {
    /// Visit every node in pre-order together with its type context.
    ///
    /// A class-like is visited in the context that contains it; its members
    /// are visited in its own context. Anonymous classes open an anonymous
    /// context.
    pub fn walk<'a>(&'a self, visitor: &mut impl FnMut(NodeRef<'a>, &TypeContext)) {
        let ctx = TypeContext::global();
        for stmt in &self.stmts {
            walk_stmt(stmt, &ctx, visitor);
        }
    }

    /// Collected variant of [`SourceTree::walk`].
    pub fn nodes_with_context(&self) -> Vec<(NodeRef<'_>, TypeContext)> {
        let mut nodes = Vec::new();
        self.walk(&mut |node, ctx| nodes.push((node, ctx.clone())));
        nodes
    }

    /// Apply `f` to every expression, innermost expressions first.
    ///
    /// This is the hook rules use to rewrite trees in place.
    pub fn for_each_expr_mut(&mut self, f: &mut impl FnMut(&mut Expr)) {
        for stmt in &mut self.stmts {
            stmt_exprs_mut(stmt, f);
        }
    }
}

fn walk_stmt<'a>(
    stmt: &'a Stmt,
    ctx: &TypeContext,
    visitor: &mut impl FnMut(NodeRef<'a>, &TypeContext),
) {
    match stmt {
        Stmt::ClassLike(class) => walk_class_like(class, ctx, visitor),
        Stmt::Function(function) => {
            visitor(NodeRef::Function(function), ctx);
            let body_ctx = TypeContext {
                scope: ctx.scope.clone(),
                method: None,
            };
            for stmt in &function.body {
                walk_stmt(stmt, &body_ctx, visitor);
            }
        }
        Stmt::Expr(expr) | Stmt::Return(Some(expr)) => walk_expr(expr, ctx, visitor),
        Stmt::Return(None) => {}
        Stmt::Block(stmts) => {
            for stmt in stmts {
                walk_stmt(stmt, ctx, visitor);
            }
        }
    }
}

fn walk_class_like<'a>(
    class: &'a ClassLike,
    outer: &TypeContext,
    visitor: &mut impl FnMut(NodeRef<'a>, &TypeContext),
) {
    visitor(NodeRef::ClassLike(class), outer);
    let ctx = TypeContext::for_class_like(class);
    for member in &class.members {
        match member {
            Member::Method(method) => {
                visitor(NodeRef::Method(method), &ctx);
                let body_ctx = ctx.in_method(&method.name);
                for stmt in &method.body {
                    walk_stmt(stmt, &body_ctx, visitor);
                }
            }
            Member::Constant(constant) => {
                visitor(NodeRef::Constant(constant), &ctx);
                walk_expr(&constant.value, &ctx, visitor);
            }
            Member::TraitUse(names) => visitor(NodeRef::TraitUse(names), &ctx),
            Member::Property(property) => {
                if let Some(default) = &property.default {
                    walk_expr(default, &ctx, visitor);
                }
            }
        }
    }
}

fn walk_expr<'a>(
    expr: &'a Expr,
    ctx: &TypeContext,
    visitor: &mut impl FnMut(NodeRef<'a>, &TypeContext),
) {
    visitor(NodeRef::Expr(expr), ctx);
    match expr {
        Expr::Variable(_) | Expr::Name(_) | Expr::String(_) | Expr::Int(_) => {}
        Expr::Array(items) => {
            for item in items {
                if let Some(key) = &item.key {
                    walk_expr(key, ctx, visitor);
                }
                walk_expr(&item.value, ctx, visitor);
            }
        }
        Expr::New { class, args } => {
            walk_expr(class, ctx, visitor);
            walk_exprs(args, ctx, visitor);
        }
        Expr::AnonymousClass { class, args } => {
            walk_exprs(args, ctx, visitor);
            walk_class_like(class, ctx, visitor);
        }
        Expr::MethodCall {
            receiver,
            name,
            args,
        } => {
            walk_expr(receiver, ctx, visitor);
            walk_expr(name, ctx, visitor);
            walk_exprs(args, ctx, visitor);
        }
        Expr::StaticCall { class, name, args } => {
            walk_expr(class, ctx, visitor);
            walk_expr(name, ctx, visitor);
            walk_exprs(args, ctx, visitor);
        }
        Expr::FuncCall { name, args } => {
            walk_expr(name, ctx, visitor);
            walk_exprs(args, ctx, visitor);
        }
        Expr::ClassConstFetch { class, name } => {
            walk_expr(class, ctx, visitor);
            walk_expr(name, ctx, visitor);
        }
        Expr::PropertyFetch { receiver, name } => {
            walk_expr(receiver, ctx, visitor);
            walk_expr(name, ctx, visitor);
        }
        Expr::Assign { target, value } => {
            walk_expr(target, ctx, visitor);
            walk_expr(value, ctx, visitor);
        }
    }
}

fn walk_exprs<'a>(
    exprs: &'a [Expr],
    ctx: &TypeContext,
    visitor: &mut impl FnMut(NodeRef<'a>, &TypeContext),
) {
    for expr in exprs {
        walk_expr(expr, ctx, visitor);
    }
}

fn stmt_exprs_mut(stmt: &mut Stmt, f: &mut impl FnMut(&mut Expr)) {
    match stmt {
        Stmt::ClassLike(class) => class_exprs_mut(class, f),
        Stmt::Function(function) => {
            for stmt in &mut function.body {
                stmt_exprs_mut(stmt, f);
            }
        }
        Stmt::Expr(expr) | Stmt::Return(Some(expr)) => expr_mut(expr, f),
        Stmt::Return(None) => {}
        Stmt::Block(stmts) => {
            for stmt in stmts {
                stmt_exprs_mut(stmt, f);
            }
        }
    }
}

fn class_exprs_mut(class: &mut ClassLike, f: &mut impl FnMut(&mut Expr)) {
    for member in &mut class.members {
        match member {
            Member::Method(method) => {
                for stmt in &mut method.body {
                    stmt_exprs_mut(stmt, f);
                }
            }
            Member::Constant(constant) => expr_mut(&mut constant.value, f),
            Member::Property(property) => {
                if let Some(default) = &mut property.default {
                    expr_mut(default, f);
                }
            }
            Member::TraitUse(_) => {}
        }
    }
}

fn expr_mut(expr: &mut Expr, f: &mut impl FnMut(&mut Expr)) {
    match expr {
        Expr::Variable(_) | Expr::Name(_) | Expr::String(_) | Expr::Int(_) => {}
        Expr::Array(items) => {
            for item in items {
                if let Some(key) = &mut item.key {
                    expr_mut(key, f);
                }
                expr_mut(&mut item.value, f);
            }
        }
        Expr::New { class, args } => {
            expr_mut(class, f);
            args.iter_mut().for_each(|arg| expr_mut(arg, f));
        }
        Expr::AnonymousClass { class, args } => {
            args.iter_mut().for_each(|arg| expr_mut(arg, f));
            class_exprs_mut(class, f);
        }
        Expr::MethodCall {
            receiver,
            name,
            args,
        } => {
            expr_mut(receiver, f);
            expr_mut(name, f);
            args.iter_mut().for_each(|arg| expr_mut(arg, f));
        }
        Expr::StaticCall { class, name, args } => {
            expr_mut(class, f);
            expr_mut(name, f);
            args.iter_mut().for_each(|arg| expr_mut(arg, f));
        }
        Expr::FuncCall { name, args } => {
            expr_mut(name, f);
            args.iter_mut().for_each(|arg| expr_mut(arg, f));
        }
        Expr::ClassConstFetch { class, name } | Expr::PropertyFetch {
            receiver: class,
            name,
        } => {
            expr_mut(class, f);
            expr_mut(name, f);
        }
        Expr::Assign { target, value } => {
            expr_mut(target, f);
            expr_mut(value, f);
        }
    }
    f(expr);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;

    fn tree() -> SourceTree {
        let class = ClassLike::class("App\\Foo").extends("App\\Base").with_member(
            Method::new("run").with_body(vec![
                Expr::method_call(Expr::this(), "helper").into_stmt(),
                Expr::AnonymousClass {
                    class: Box::new(
                        ClassLike::anonymous()
                            .with_member(Method::new("inner").with_body(vec![
                                Expr::func_call("strlen").into_stmt(),
                            ])),
                    ),
                    args: Vec::new(),
                }
                .into_stmt(),
            ]),
        );
        SourceTree::new(FileId::new(0), vec![Stmt::ClassLike(class)])
    }

    #[test]
    fn test_walk_tracks_enclosing_class_and_method() {
        let tree = tree();
        let nodes = tree.nodes_with_context();

        let call_ctx = nodes
            .iter()
            .find_map(|(node, ctx)| match node {
                NodeRef::Expr(Expr::MethodCall { .. }) => Some(ctx.clone()),
                _ => None,
            })
            .expect("method call visited");

        assert_eq!(call_ctx.class_name(), Some("App\\Foo"));
        assert_eq!(call_ctx.parent_name(), Some("App\\Base"));
        assert_eq!(call_ctx.method.as_deref(), Some("run"));
    }

    #[test]
    fn test_walk_opens_anonymous_scope() {
        let tree = tree();
        let nodes = tree.nodes_with_context();

        let inner_ctx = nodes
            .iter()
            .find_map(|(node, ctx)| match node {
                NodeRef::Expr(Expr::FuncCall { .. }) => Some(ctx.clone()),
                _ => None,
            })
            .expect("function call visited");

        assert!(inner_ctx.is_anonymous());
        assert_eq!(inner_ctx.class_name(), None);
    }

    #[test]
    fn test_for_each_expr_mut_rewrites_in_place() {
        let mut tree = tree();
        tree.for_each_expr_mut(&mut |expr| {
            if let Expr::Name(name) = expr {
                if name == "helper" {
                    *name = SmolStr::new("assist");
                }
            }
        });

        let renamed = tree.nodes_with_context().iter().any(|(node, _)| {
            matches!(node, NodeRef::Expr(Expr::Name(name)) if name == "assist")
        });
        assert!(renamed);
    }
}
