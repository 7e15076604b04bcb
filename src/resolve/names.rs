//! Type name resolution
//!
//! Schemas reference types by fully-qualified schema-package names, but
//! generated code must reference them by target-language namespace. This
//! module rewrites a referenced type's qualified name into the form usable
//! from the file currently being generated: same-file references stay
//! package-relative, cross-file references get the owning file's namespace
//! substituted for its package.
//!
//! The effective namespace is computed on demand with a fallback chain
//! (caller hook, explicit per-file option, set-wide default); the graph is
//! never mutated.

use crate::graph::{FieldNode, FileId, FileNode, FileSet, TypeRef};
use crate::GeneratorError;
use tracing::warn;

/// Caller-supplied namespace override, keyed by the owning file
///
/// Takes priority over the file's explicit namespace option and the
/// set-wide default. Returning `None` falls through to the next source.
pub trait NamespaceHook {
    /// Namespace to use for types owned by `file`, if overridden
    fn namespace_for(&self, file: &FileNode) -> Option<String>;
}

/// Package and effective namespace of the file owning `target`
///
/// The package is always returned with a leading separator (an empty
/// package becomes just the separator). The namespace is empty for
/// same-file references; for cross-file references it is resolved via the
/// hook, then the file's explicit option, then the set default. When no
/// source is available the reference stays ambiguous: a warning is emitted
/// and the empty namespace yields a package-relative name downstream.
pub fn package_and_namespace(
    set: &FileSet,
    target: TypeRef,
    generating: FileId,
    hook: Option<&dyn NamespaceHook>,
) -> Result<(String, String), GeneratorError> {
    let owner = set.owning_file(target)?;
    let file = set.file(owner);

    let mut package = file.package.clone();
    if !package.starts_with('.') {
        package.insert(0, '.');
    }

    let mut namespace = String::new();
    if owner != generating {
        let resolved = hook
            .and_then(|h| h.namespace_for(file))
            .or_else(|| file.namespace.clone())
            .or_else(|| set.default_namespace().map(str::to_owned));
        match resolved {
            Some(ns) => namespace = ns,
            None => warn!(
                file = %file.path,
                type_name = %set.full_name(target),
                "cross-file reference has no namespace source; emitting package-relative name"
            ),
        }
    }
    Ok((package, namespace))
}

/// Resolve the name of a field's referenced type for use in `generating`
///
/// The target's qualified name has its package prefix replaced by the
/// owning file's effective namespace; leading separators are stripped from
/// the result. Depends only on the acyclic ancestor chain and the owning
/// file's metadata, so re-resolution from the same file is stable.
pub fn resolve_type_name(
    set: &FileSet,
    field: &FieldNode,
    generating: FileId,
    hook: Option<&dyn NamespaceHook>,
) -> Result<String, GeneratorError> {
    let target = field.resolved_type.ok_or_else(|| {
        GeneratorError::MalformedGraph(format!(
            "field '{}' has no resolved type link",
            field.name
        ))
    })?;
    let (package, namespace) = package_and_namespace(set, target, generating, hook)?;
    let full = set.full_name(target);

    let rewritten = if package == "." {
        full.to_string()
    } else {
        match full
            .strip_prefix(package.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('.'))
        {
            Some(rest) => format!("{}{}", namespace, rest),
            // Prefix mismatch means the graph lied about ownership; keep
            // the qualified name rather than corrupting it.
            None => full.to_string(),
        }
    };
    Ok(rewritten
        .strip_prefix('.')
        .unwrap_or(&rewritten)
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FieldKind, Label, ParentLink};

    struct FixedHook(&'static str);

    impl NamespaceHook for FixedHook {
        fn namespace_for(&self, _file: &FileNode) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn two_file_set() -> (FileSet, FileId, FileId, TypeRef) {
        let mut set = FileSet::new();
        let file_a = set.add_file("a.proto", "pkg.a");
        let widget = set.add_message(ParentLink::File(file_a), "Widget");
        let file_b = set.add_file("b.proto", "pkg.b");
        let _holder = set.add_message(ParentLink::File(file_b), "Holder");
        (set, file_a, file_b, TypeRef::Message(widget))
    }

    fn field_for(target: TypeRef) -> FieldNode {
        FieldNode::new("widget", 1, FieldKind::Message, Label::Optional)
            .with_resolved_type(target)
    }

    #[test]
    fn test_same_file_reference_is_package_relative() {
        let (set, file_a, _, widget) = two_file_set();
        let field = field_for(widget);
        let name = resolve_type_name(&set, &field, file_a, None).unwrap();
        assert_eq!(name, "Widget");
    }

    #[test]
    fn test_same_file_nested_reference() {
        let mut set = FileSet::new();
        let file = set.add_file("a.proto", "pkg.a");
        let outer = set.add_message(ParentLink::File(file), "Outer");
        let inner = set.add_message(ParentLink::Message(outer), "Inner");
        let field = field_for(TypeRef::Message(inner));
        let name = resolve_type_name(&set, &field, file, None).unwrap();
        assert_eq!(name, "Outer.Inner");
    }

    #[test]
    fn test_cross_file_uses_explicit_namespace_option() {
        let (mut set, file_a, file_b, widget) = two_file_set();
        set.set_file_namespace(file_a, "Com.Example");
        let field = field_for(widget);
        let name = resolve_type_name(&set, &field, file_b, None).unwrap();
        assert_eq!(name, "Com.Example.Widget");
    }

    #[test]
    fn test_cross_file_falls_back_to_default_namespace() {
        let (mut set, _, file_b, widget) = two_file_set();
        set.set_default_namespace("Gen.Default");
        let field = field_for(widget);
        let name = resolve_type_name(&set, &field, file_b, None).unwrap();
        assert_eq!(name, "Gen.Default.Widget");
    }

    #[test]
    fn test_hook_takes_priority_over_file_option() {
        let (mut set, file_a, file_b, widget) = two_file_set();
        set.set_file_namespace(file_a, "Com.Example");
        set.set_default_namespace("Gen.Default");
        let field = field_for(widget);
        let hook = FixedHook("Hooked.Ns");
        let name = resolve_type_name(&set, &field, file_b, Some(&hook)).unwrap();
        assert_eq!(name, "Hooked.Ns.Widget");
    }

    #[test]
    fn test_cross_file_without_namespace_source_stays_relative() {
        let (set, _, file_b, widget) = two_file_set();
        let field = field_for(widget);
        let name = resolve_type_name(&set, &field, file_b, None).unwrap();
        assert_eq!(name, "Widget");
    }

    #[test]
    fn test_empty_package_reference() {
        let mut set = FileSet::new();
        let file = set.add_file("root.proto", "");
        let msg = set.add_message(ParentLink::File(file), "Root");
        let field = field_for(TypeRef::Message(msg));
        let name = resolve_type_name(&set, &field, file, None).unwrap();
        assert_eq!(name, "Root");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let (mut set, file_a, file_b, widget) = two_file_set();
        set.set_file_namespace(file_a, "Com.Example");
        let field = field_for(widget);
        let first = resolve_type_name(&set, &field, file_b, None).unwrap();
        let second = resolve_type_name(&set, &field, file_b, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolved_link_is_an_error() {
        let (set, file_a, _, _) = two_file_set();
        let field = FieldNode::new("broken", 1, FieldKind::Message, Label::Optional);
        assert!(matches!(
            resolve_type_name(&set, &field, file_a, None),
            Err(GeneratorError::MalformedGraph(_))
        ));
    }
}
