//! Name comparison over name-denoting nodes.
//!
//! Identifiers of the rewritten language are case-insensitive for types,
//! functions and methods, so the default comparisons here ignore ASCII
//! case. Every function is pure; a node that does not denote a simple name
//! (a dynamic expression, an anonymous class) simply never matches.

use indexmap::IndexMap;
use smol_str::SmolStr;

use crate::syntax::{ClassConst, ClassLike, Expr, Function, Method};

/// A node that may denote a simple name.
pub trait HasName {
    /// The plain name, or `None` if the node is not a simple name.
    fn name_str(&self) -> Option<&str>;
}

impl HasName for Expr {
    fn name_str(&self) -> Option<&str> {
        match self {
            Expr::Name(name) | Expr::Variable(name) => Some(name),
            _ => None,
        }
    }
}

impl HasName for ClassLike {
    fn name_str(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl HasName for Method {
    fn name_str(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl HasName for Function {
    fn name_str(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl HasName for ClassConst {
    fn name_str(&self) -> Option<&str> {
        Some(&self.name)
    }
}

impl HasName for str {
    fn name_str(&self) -> Option<&str> {
        Some(self)
    }
}

impl HasName for SmolStr {
    fn name_str(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

/// Plain name of a node.
pub fn get_name<N: HasName + ?Sized>(node: &N) -> Option<&str> {
    node.name_str()
}

/// Case-insensitive name equality.
pub fn is_name<N: HasName + ?Sized>(node: &N, name: &str) -> bool {
    node.name_str()
        .is_some_and(|own| own.eq_ignore_ascii_case(name))
}

/// Case-sensitive name equality.
pub fn is_name_exact<N: HasName + ?Sized>(node: &N, name: &str) -> bool {
    node.name_str() == Some(name)
}

/// Case-insensitive membership in a set of names.
pub fn is_names<N, S>(node: &N, names: &[S]) -> bool
where
    N: HasName + ?Sized,
    S: AsRef<str>,
{
    names.iter().any(|name| is_name(node, name.as_ref()))
}

/// Case-insensitive lookup against a name → value mapping.
///
/// The first entry in map order whose key matches wins.
pub fn match_name<'m, N, V>(node: &N, map: &'m IndexMap<SmolStr, V>) -> Option<&'m V>
where
    N: HasName + ?Sized,
{
    let own = node.name_str()?;
    map.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(own))
        .map(|(_, value)| value)
}

/// Last segment of a `\`-separated qualified name.
///
/// "App\\Model\\User" -> "User"
pub fn short_name(qualified: &str) -> &str {
    qualified
        .rsplit('\\')
        .next()
        .unwrap_or(qualified)
}

/// Does this name carry a namespace or class qualifier?
pub fn looks_qualified(name: &str) -> bool {
    name.contains('\\') || name.contains("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_expression_has_no_name() {
        let call = Expr::method_call(Expr::this(), "run");
        assert_eq!(get_name(&call), None);
        assert!(!is_name(&call, "run"));
    }

    #[test]
    fn test_is_name_ignores_case() {
        let node = Expr::name("DateTime");
        assert!(is_name(&node, "datetime"));
        assert!(!is_name_exact(&node, "datetime"));
        assert!(is_name_exact(&node, "DateTime"));
    }

    #[test]
    fn test_is_names() {
        let node = Expr::name("Static");
        assert!(is_names(&node, &["self", "static"]));
        assert!(!is_names(&node, &["parent"]));
        assert!(!is_names::<_, &str>(&node, &[]));
    }

    #[test]
    fn test_match_name_first_match_wins() {
        let mut map = IndexMap::new();
        map.insert(SmolStr::new("FOO"), 1);
        map.insert(SmolStr::new("foo"), 2);

        assert_eq!(match_name(&Expr::name("Foo"), &map), Some(&1));
        assert_eq!(match_name(&Expr::name("foo"), &map), Some(&1));
        assert_eq!(match_name(&Expr::string("foo"), &map), None);
    }

    #[test]
    fn test_anonymous_class_has_no_name() {
        assert_eq!(get_name(&ClassLike::anonymous()), None);
        assert_eq!(get_name(&ClassLike::class("A\\B")), Some("A\\B"));
    }

    #[test]
    fn test_short_name_and_qualification() {
        assert_eq!(short_name("App\\Model\\User"), "User");
        assert_eq!(short_name("User"), "User");
        assert!(looks_qualified("App\\User"));
        assert!(looks_qualified("User::NAME"));
        assert!(!looks_qualified("NAME"));
    }
}
