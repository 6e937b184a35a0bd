//! A tiny line-based language for exercising the pipeline end to end.
//!
//! ```text
//! class B extends A
//!     const X = 1
//!     static method make
//!         new B
//!         A::X
//!         $this->run()
//!         A::boot()
//!     end
//! end
//! ```
//!
//! `@missing Name` fails with a dependency error, `@broken` with a generic
//! parse error.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rewrite::project::{Parser, Printer, ProcessError, Rule, RuleContext};
use rewrite::syntax::{ClassConst, ClassLike, Expr, Member, Method, SourceTree, Stmt, TypeContext};
use rewrite::FileId;
use smol_str::SmolStr;

enum Frame {
    Class(ClassLike),
    Method(Method),
}

pub struct MiniParser;

impl Parser for MiniParser {
    fn parse(&self, path: &Path, content: &str) -> Result<SourceTree, ProcessError> {
        let error = |line: usize, message: &str| {
            ProcessError::failed(format!("{}:{}: {}", path.display(), line + 1, message))
        };

        let mut stmts = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        for (n, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix("@missing ") {
                return Err(ProcessError::dependency(format!("class {name} not found")));
            }
            if line == "@broken" {
                return Err(error(n, "syntax error"));
            }

            if let Some(rest) = line.strip_prefix("class ") {
                let mut parts = rest.split_whitespace();
                let name = parts.next().ok_or_else(|| error(n, "class without name"))?;
                let mut class = ClassLike::class(name);
                if parts.next() == Some("extends") {
                    let parent = parts.next().ok_or_else(|| error(n, "extends without parent"))?;
                    class = class.extends(parent);
                }
                stack.push(Frame::Class(class));
            } else if line == "end" {
                match stack.pop() {
                    Some(Frame::Method(method)) => match stack.last_mut() {
                        Some(Frame::Class(class)) => class.members.push(Member::Method(method)),
                        _ => return Err(error(n, "method outside class")),
                    },
                    Some(Frame::Class(class)) => stmts.push(Stmt::ClassLike(class)),
                    None => return Err(error(n, "unmatched end")),
                }
            } else if let Some(rest) = line.strip_prefix("const ") {
                let (name, value) = rest
                    .split_once(" = ")
                    .ok_or_else(|| error(n, "malformed constant"))?;
                let value: i64 = value.parse().map_err(|_| error(n, "non-integer constant"))?;
                match stack.last_mut() {
                    Some(Frame::Class(class)) => {
                        class.members.push(ClassConst::new(name, Expr::Int(value)).into())
                    }
                    _ => return Err(error(n, "constant outside class")),
                }
            } else if let Some(name) = line.strip_prefix("static method ") {
                stack.push(Frame::Method(Method::new_static(name)));
            } else if let Some(name) = line.strip_prefix("method ") {
                stack.push(Frame::Method(Method::new(name)));
            } else {
                let stmt = parse_expr(line).into_stmt();
                match stack.last_mut() {
                    Some(Frame::Method(method)) => method.body.push(stmt),
                    Some(Frame::Class(_)) => return Err(error(n, "statement in class body")),
                    None => stmts.push(stmt),
                }
            }
        }

        if !stack.is_empty() {
            return Err(ProcessError::failed(format!("{}: unclosed block", path.display())));
        }
        Ok(SourceTree::new(FileId::new(0), stmts))
    }
}

fn parse_expr(line: &str) -> Expr {
    if let Some(class) = line.strip_prefix("new ") {
        return Expr::new_instance(class);
    }
    if let Some(call) = line.strip_prefix("$this->") {
        return Expr::method_call(Expr::this(), call.trim_end_matches("()"));
    }
    if let Some((class, member)) = line.split_once("::") {
        return match member.strip_suffix("()") {
            Some(method) => Expr::static_call(class, method),
            None => Expr::const_fetch(Expr::name(class), member),
        };
    }
    Expr::name(line)
}

pub struct MiniPrinter;

impl Printer for MiniPrinter {
    fn render(&self, tree: &SourceTree) -> Result<String, ProcessError> {
        let mut out = String::new();
        for stmt in &tree.stmts {
            render_stmt(stmt, 0, &mut out)?;
        }
        Ok(out)
    }
}

fn render_stmt(stmt: &Stmt, depth: usize, out: &mut String) -> Result<(), ProcessError> {
    let indent = "    ".repeat(depth);
    match stmt {
        Stmt::ClassLike(class) => {
            let name = class
                .name
                .as_deref()
                .ok_or_else(|| ProcessError::failed("anonymous class"))?;
            out.push_str(&format!("{indent}class {name}"));
            if let Some(parent) = &class.parent {
                out.push_str(&format!(" extends {parent}"));
            }
            out.push('\n');
            for member in &class.members {
                render_member(member, depth + 1, out)?;
            }
            out.push_str(&format!("{indent}end\n"));
        }
        Stmt::Expr(expr) => out.push_str(&format!("{indent}{}\n", render_expr(expr)?)),
        _ => return Err(ProcessError::failed("unsupported statement")),
    }
    Ok(())
}

fn render_member(member: &Member, depth: usize, out: &mut String) -> Result<(), ProcessError> {
    let indent = "    ".repeat(depth);
    match member {
        Member::Constant(constant) => match &constant.value {
            Expr::Int(value) => out.push_str(&format!("{indent}const {} = {value}\n", constant.name)),
            _ => return Err(ProcessError::failed("non-integer constant")),
        },
        Member::Method(method) => {
            let keyword = if method.is_static { "static method" } else { "method" };
            out.push_str(&format!("{indent}{keyword} {}\n", method.name));
            for stmt in &method.body {
                render_stmt(stmt, depth + 1, out)?;
            }
            out.push_str(&format!("{indent}end\n"));
        }
        _ => return Err(ProcessError::failed("unsupported member")),
    }
    Ok(())
}

fn name(expr: &Expr) -> Result<String, ProcessError> {
    match expr {
        Expr::Name(name) => Ok(name.to_string()),
        _ => Err(ProcessError::failed("dynamic name")),
    }
}

fn render_expr(expr: &Expr) -> Result<String, ProcessError> {
    match expr {
        Expr::Name(n) => Ok(n.to_string()),
        Expr::New { class, .. } => Ok(format!("new {}", name(class)?)),
        Expr::MethodCall { receiver, name: method, .. } if receiver.is_this() => {
            Ok(format!("$this->{}()", name(method)?))
        }
        Expr::StaticCall { class, name: method, .. } => {
            Ok(format!("{}::{}()", name(class)?, name(method)?))
        }
        Expr::ClassConstFetch { class, name: constant } => {
            Ok(format!("{}::{}", name(class)?, name(constant)?))
        }
        _ => Err(ProcessError::failed("unsupported expression")),
    }
}

/// Parse a source snippet, panicking on failure.
pub fn parse(file: u32, content: &str) -> SourceTree {
    let mut tree = MiniParser
        .parse(Path::new("snippet.mini"), content)
        .expect("snippet parses");
    tree.file = FileId::new(file);
    tree
}

// ============================================================================
// RULES
// ============================================================================

/// Renames a class everywhere: declarations, parents and bare names.
pub struct RenameClass {
    pub from: &'static str,
    pub to: &'static str,
}

impl Rule for RenameClass {
    fn id(&self) -> &str {
        "rename-class"
    }

    fn refactor(&self, tree: &mut SourceTree, _: &mut RuleContext<'_>) -> Result<bool, ProcessError> {
        let mut changed = false;
        for stmt in &mut tree.stmts {
            if let Stmt::ClassLike(class) = stmt {
                for slot in [&mut class.name, &mut class.parent] {
                    if slot.as_deref() == Some(self.from) {
                        *slot = Some(SmolStr::new(self.to));
                        changed = true;
                    }
                }
            }
        }
        tree.for_each_expr_mut(&mut |expr| {
            if let Expr::Name(name) = expr {
                if name == self.from {
                    *name = SmolStr::new(self.to);
                    changed = true;
                }
            }
        });
        Ok(changed)
    }
}

/// Rewrites `Sub::X` to the type that declares `X`.
pub struct QualifyConstants;

impl Rule for QualifyConstants {
    fn id(&self) -> &str {
        "qualify-constants"
    }

    fn refactor(&self, tree: &mut SourceTree, ctx: &mut RuleContext<'_>) -> Result<bool, ProcessError> {
        let index = ctx.index();
        let mut changed = false;
        tree.for_each_expr_mut(&mut |expr| {
            let owner = index
                .find_class_constant_by_fetch(expr, &TypeContext::global())
                .map(|decl| decl.owner.clone());
            if let (Some(owner), Expr::ClassConstFetch { class, .. }) = (owner, expr) {
                if !matches!(&**class, Expr::Name(name) if *name == owner) {
                    **class = Expr::Name(owner);
                    changed = true;
                }
            }
        });
        Ok(changed)
    }
}

/// Queues file operations from marker statements: `obsolete` removes the
/// file, `relocate` moves it under `moved/`, `spawn` adds a sibling file.
pub struct FileOps;

impl Rule for FileOps {
    fn id(&self) -> &str {
        "file-ops"
    }

    fn refactor(&self, tree: &mut SourceTree, ctx: &mut RuleContext<'_>) -> Result<bool, ProcessError> {
        let markers: Vec<SmolStr> = tree
            .stmts
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expr(Expr::Name(name)) => Some(name.clone()),
                _ => None,
            })
            .collect();

        for marker in markers {
            match marker.as_str() {
                "obsolete" => ctx.remove_file(),
                "relocate" => {
                    let to = PathBuf::from("moved").join(ctx.path().file_name().unwrap_or_default());
                    ctx.move_file(to);
                }
                "spawn" => ctx.add_file(ctx.path().with_extension("spawned"), "spawned\n"),
                _ => {}
            }
        }
        // File operations alone do not change the tree.
        Ok(false)
    }
}

/// Fails on every file containing the bare name `explode`.
pub struct Explode;

impl Rule for Explode {
    fn id(&self) -> &str {
        "explode"
    }

    fn refactor(&self, tree: &mut SourceTree, _: &mut RuleContext<'_>) -> Result<bool, ProcessError> {
        let explodes = tree
            .stmts
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Expr(Expr::Name(name)) if name == "explode"));
        if explodes {
            Err(ProcessError::failed("rule exploded"))
        } else {
            Ok(false)
        }
    }
}
