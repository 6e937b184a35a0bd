//! Static-ness of methods, including methods that exist only on paper.
//!
//! Magic methods documented with `@method static name()` never show up as
//! declarations, so the answer falls back from the index to documentation
//! and finally to external introspection.

use once_cell::sync::Lazy;
use regex::Regex;

use super::index::SymbolIndex;

impl SymbolIndex {
    /// Is `method` on `type_name` static?
    ///
    /// 1. An indexed declaration (own or inherited) answers with its flag.
    /// 2. Otherwise a `@method static` annotation in the type's doc comment
    ///    makes it static. Indexed types use their own comment; types known
    ///    only externally use [`ExternalSymbolInfo::doc_comment`].
    /// 3. Otherwise the externally reflected flag, if any.
    ///
    /// Anything else is not static.
    ///
    /// [`ExternalSymbolInfo::doc_comment`]: super::ExternalSymbolInfo::doc_comment
    pub fn is_static_method(&self, method: &str, type_name: &str) -> bool {
        if let Some(decl) = self.find_method(type_name, method) {
            return decl.is_static;
        }

        if let Some(doc) = self.doc_comment_of(type_name) {
            if documents_static_method(&doc, method) {
                tracing::trace!("'{}::{}' is a documented static method", type_name, method);
                return true;
            }
        }

        self.external_symbols()
            .reflected_is_static(type_name, method)
            .unwrap_or(false)
    }

    fn doc_comment_of(&self, type_name: &str) -> Option<String> {
        match self.find_class_like(type_name) {
            Some(decl) => decl.node.doc_comment.clone(),
            None if self.external_symbols().type_exists(type_name) => {
                self.external_symbols().doc_comment(type_name)
            }
            None => None,
        }
    }
}

/// `@method static [ReturnType] name(` on a single line; captures `name`.
static STATIC_METHOD_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@method[ \t]+static[ \t]+(?:[^\s(]+[ \t]+)?(\w+)[ \t]*\(")
        .expect("static method tag pattern is valid")
});

/// Does a doc comment declare `method` as a static magic method?
///
/// Only the method-name position counts: a return type or a parameter
/// spelled like `method` does not.
fn documents_static_method(doc: &str, method: &str) -> bool {
    STATIC_METHOD_TAG
        .captures_iter(doc)
        .filter_map(|caps| caps.get(1))
        .any(|name| name.as_str().eq_ignore_ascii_case(method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use crate::hir::external::{Capabilities, ExternalSymbolInfo};
    use crate::syntax::{ClassLike, Method, SourceTree, Stmt};

    struct Vendor;

    impl ExternalSymbolInfo for Vendor {
        fn type_exists(&self, type_name: &str) -> bool {
            matches!(type_name, "Facade" | "Reflected")
        }

        fn doc_comment(&self, type_name: &str) -> Option<String> {
            (type_name == "Facade").then(|| {
                "/**\n * @method static Builder query(string $column)\n * @method int count()\n */".to_string()
            })
        }

        fn reflected_is_static(&self, type_name: &str, method: &str) -> Option<bool> {
            (type_name == "Reflected" && method == "create").then_some(true)
        }
    }

    fn index() -> SymbolIndex {
        let mut index =
            SymbolIndex::new().with_capabilities(Capabilities::new().with_external_symbols(Vendor));
        let misleading = ClassLike::class("Model")
            .with_doc("/** @method static void save() */")
            .with_member(Method::new("save"))
            .with_member(Method::new_static("boot"));
        index.collect_tree(&SourceTree::new(
            FileId::new(0),
            vec![
                Stmt::ClassLike(misleading),
                Stmt::ClassLike(ClassLike::class("User").extends("Model")),
            ],
        ));
        index
    }

    #[test]
    fn test_declared_flag_beats_doc_comment() {
        let index = index();
        assert!(!index.is_static_method("save", "Model"));
        assert!(index.is_static_method("boot", "Model"));
        assert!(index.is_static_method("BOOT", "User"));
    }

    #[test]
    fn test_documented_static_method_on_external_type() {
        let index = index();
        assert!(index.is_static_method("query", "Facade"));
        assert!(!index.is_static_method("count", "Facade"));
        assert!(!index.is_static_method("que", "Facade"));
    }

    #[test]
    fn test_reflection_is_last_resort() {
        let index = index();
        assert!(index.is_static_method("create", "Reflected"));
        assert!(!index.is_static_method("create", "Unknown"));
    }

    #[test]
    fn test_annotation_must_sit_on_one_line() {
        assert!(documents_static_method("@method static self make(array $a)", "make"));
        assert!(!documents_static_method("@method static\nmake()", "make"));
        assert!(!documents_static_method("@method self make()", "make"));
    }

    #[test]
    fn test_only_the_method_name_position_matches() {
        let doc = "/**\n * @method static Builder where(string $column)\n */";
        assert!(documents_static_method(doc, "where"));
        assert!(documents_static_method(doc, "WHERE"));
        assert!(!documents_static_method(doc, "column"));
        assert!(!documents_static_method(doc, "Builder"));
        assert!(!documents_static_method(doc, "string"));
    }

    #[test]
    fn test_return_type_and_parameter_names_are_not_static_methods() {
        let index = index();
        assert!(index.is_static_method("query", "Facade"));
        assert!(!index.is_static_method("Builder", "Facade"));
        assert!(!index.is_static_method("column", "Facade"));
    }
}
