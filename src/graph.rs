//! Arena-backed descriptor graph
//!
//! The [`FileSet`] owns every node of the parsed schema; files, messages,
//! and enums are addressed through lightweight index handles. Children hold
//! a non-owning [`ParentLink`] back to their syntactic parent, which keeps
//! upward traversal cheap without introducing ownership cycles.
//!
//! The graph is built once by the descriptor-parser collaborator (see
//! [`crate::descriptor`]) and is read-only for the whole generation pass.

use crate::GeneratorError;

/// Handle to a [`FileNode`] inside a [`FileSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

/// Handle to a [`MessageNode`] inside a [`FileSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(usize);

/// Handle to an [`EnumNode`] inside a [`FileSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumId(usize);

/// Non-owning back-reference to a node's syntactic parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// Declared at file scope
    File(FileId),
    /// Nested inside another message
    Message(MessageId),
}

/// Resolved link from a field to the message or enum it references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef {
    /// The field references a message type
    Message(MessageId),
    /// The field references an enum type
    Enum(EnumId),
}

/// Declared scalar or composite kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 64-bit IEEE float (8-byte fixed on the wire)
    Double,
    /// 32-bit IEEE float (4-byte fixed on the wire)
    Float,
    /// Varint-encoded signed 32-bit integer
    Int32,
    /// Varint-encoded signed 64-bit integer
    Int64,
    /// Varint-encoded unsigned 32-bit integer
    Uint32,
    /// Varint-encoded unsigned 64-bit integer
    Uint64,
    /// ZigZag varint-encoded signed 32-bit integer
    Sint32,
    /// ZigZag varint-encoded signed 64-bit integer
    Sint64,
    /// 4-byte fixed unsigned integer
    Fixed32,
    /// 8-byte fixed unsigned integer
    Fixed64,
    /// 4-byte fixed signed integer
    Sfixed32,
    /// 8-byte fixed signed integer
    Sfixed64,
    /// Varint-encoded boolean
    Bool,
    /// Length-delimited UTF-8 string
    String,
    /// Length-delimited byte sequence
    Bytes,
    /// Length-delimited embedded message
    Message,
    /// Varint-encoded enum value
    Enum,
}

/// Repetition label of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Singular field
    Optional,
    /// Required field (proto2)
    Required,
    /// Repeated field
    Repeated,
}

/// A schema source file and its top-level declarations
#[derive(Debug)]
pub struct FileNode {
    /// Source path of the file (e.g. `demo/widgets.proto`)
    pub path: String,
    /// Declared package, dot-separated; empty denotes the root package
    pub package: String,
    /// Explicit per-file target namespace option, if any
    pub namespace: Option<String>,
    /// Top-level messages, in declaration order
    pub messages: Vec<MessageId>,
    /// Top-level enums, in declaration order
    pub enums: Vec<EnumId>,
}

/// A message declaration
#[derive(Debug)]
pub struct MessageNode {
    /// Simple name
    pub name: String,
    /// Fully-qualified name with a leading separator (e.g. `.pkg.Outer.Inner`)
    pub full_name: String,
    /// Syntactic parent
    pub parent: ParentLink,
    /// Fields, in declaration order
    pub fields: Vec<FieldNode>,
    /// Oneof declarations, in declaration order
    pub oneofs: Vec<OneofDecl>,
    /// Nested messages, in declaration order
    pub nested_messages: Vec<MessageId>,
    /// Nested enums, in declaration order
    pub nested_enums: Vec<EnumId>,
}

/// A single field of a message
#[derive(Debug)]
pub struct FieldNode {
    /// Field name
    pub name: String,
    /// Field number, positive and unique within the message
    pub number: i32,
    /// Declared kind
    pub kind: FieldKind,
    /// Repetition label
    pub label: Label,
    /// Resolved link to the referenced type, for message/enum kinds
    pub resolved_type: Option<TypeRef>,
    /// Index into the enclosing message's oneof declarations, if a member
    pub oneof_index: Option<i32>,
}

impl FieldNode {
    /// Create a field with no resolved type link and no oneof membership
    pub fn new(name: impl Into<String>, number: i32, kind: FieldKind, label: Label) -> Self {
        FieldNode {
            name: name.into(),
            number,
            kind,
            label,
            resolved_type: None,
            oneof_index: None,
        }
    }

    /// Attach a resolved type link
    pub fn with_resolved_type(mut self, target: TypeRef) -> Self {
        self.resolved_type = Some(target);
        self
    }

    /// Mark the field as a member of the oneof at `index`
    pub fn with_oneof_index(mut self, index: i32) -> Self {
        self.oneof_index = Some(index);
        self
    }

    /// Whether the field is repeated
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Whether the field is required (proto2)
    pub fn is_required(&self) -> bool {
        self.label == Label::Required
    }

    /// Whether the field is singular
    pub fn is_optional(&self) -> bool {
        self.label == Label::Optional
    }
}

/// A oneof declaration within a message
#[derive(Debug)]
pub struct OneofDecl {
    /// Oneof name
    pub name: String,
}

/// An enum declaration
#[derive(Debug)]
pub struct EnumNode {
    /// Simple name
    pub name: String,
    /// Fully-qualified name with a leading separator
    pub full_name: String,
    /// Syntactic parent
    pub parent: ParentLink,
    /// Enum values, in declaration order
    pub values: Vec<EnumValue>,
}

/// A single value of an enum
#[derive(Debug)]
pub struct EnumValue {
    /// Value name
    pub name: String,
    /// Numeric value
    pub number: i32,
}

/// The full collection of interlinked files forming one generation unit
///
/// Owns every node; handles returned by the `add_*` builder methods stay
/// valid for the lifetime of the set. Nodes are immutable once the graph
/// is handed to the generator.
#[derive(Debug, Default)]
pub struct FileSet {
    files: Vec<FileNode>,
    messages: Vec<MessageNode>,
    enums: Vec<EnumNode>,
    default_namespace: Option<String>,
}

impl FileSet {
    /// Create an empty set
    pub fn new() -> Self {
        FileSet::default()
    }

    /// Set the set-wide default namespace used as the last fallback for
    /// cross-file references
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// The set-wide default namespace, if configured
    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Add a file with the given source path and package
    pub fn add_file(&mut self, path: impl Into<String>, package: impl Into<String>) -> FileId {
        let id = FileId(self.files.len());
        self.files.push(FileNode {
            path: path.into(),
            package: package.into(),
            namespace: None,
            messages: Vec::new(),
            enums: Vec::new(),
        });
        id
    }

    /// Set the explicit per-file namespace option
    pub fn set_file_namespace(&mut self, file: FileId, namespace: impl Into<String>) {
        self.files[file.0].namespace = Some(namespace.into());
    }

    /// Add a message under the given parent, computing its qualified name
    pub fn add_message(&mut self, parent: ParentLink, name: &str) -> MessageId {
        let full_name = format!("{}.{}", self.parent_full_name(parent), name);
        let id = MessageId(self.messages.len());
        self.messages.push(MessageNode {
            name: name.to_string(),
            full_name,
            parent,
            fields: Vec::new(),
            oneofs: Vec::new(),
            nested_messages: Vec::new(),
            nested_enums: Vec::new(),
        });
        match parent {
            ParentLink::File(f) => self.files[f.0].messages.push(id),
            ParentLink::Message(m) => self.messages[m.0].nested_messages.push(id),
        }
        id
    }

    /// Add an enum under the given parent, computing its qualified name
    pub fn add_enum(&mut self, parent: ParentLink, name: &str) -> EnumId {
        let full_name = format!("{}.{}", self.parent_full_name(parent), name);
        let id = EnumId(self.enums.len());
        self.enums.push(EnumNode {
            name: name.to_string(),
            full_name,
            parent,
            values: Vec::new(),
        });
        match parent {
            ParentLink::File(f) => self.files[f.0].enums.push(id),
            ParentLink::Message(m) => self.messages[m.0].nested_enums.push(id),
        }
        id
    }

    /// Append a field to a message, returning its index within the message
    pub fn add_field(&mut self, message: MessageId, field: FieldNode) -> usize {
        let fields = &mut self.messages[message.0].fields;
        fields.push(field);
        fields.len() - 1
    }

    /// Attach a resolved type link to an already-added field
    pub fn set_field_resolved_type(
        &mut self,
        message: MessageId,
        field_index: usize,
        target: TypeRef,
    ) {
        self.messages[message.0].fields[field_index].resolved_type = Some(target);
    }

    /// Append a oneof declaration to a message
    pub fn add_oneof(&mut self, message: MessageId, name: &str) {
        self.messages[message.0].oneofs.push(OneofDecl {
            name: name.to_string(),
        });
    }

    /// Append a value to an enum
    pub fn add_enum_value(&mut self, target: EnumId, name: &str, number: i32) {
        self.enums[target.0].values.push(EnumValue {
            name: name.to_string(),
            number,
        });
    }

    /// Look up a file node
    pub fn file(&self, id: FileId) -> &FileNode {
        &self.files[id.0]
    }

    /// Look up a message node
    pub fn message(&self, id: MessageId) -> &MessageNode {
        &self.messages[id.0]
    }

    /// Look up an enum node
    pub fn enum_node(&self, id: EnumId) -> &EnumNode {
        &self.enums[id.0]
    }

    /// Iterate over all files in registration order
    pub fn files(&self) -> impl Iterator<Item = (FileId, &FileNode)> {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    /// Fully-qualified name of a referenced type
    pub fn full_name(&self, target: TypeRef) -> &str {
        match target {
            TypeRef::Message(id) => &self.messages[id.0].full_name,
            TypeRef::Enum(id) => &self.enums[id.0].full_name,
        }
    }

    /// Syntactic parent of a referenced type
    pub fn type_parent(&self, target: TypeRef) -> ParentLink {
        match target {
            TypeRef::Message(id) => self.messages[id.0].parent,
            TypeRef::Enum(id) => self.enums[id.0].parent,
        }
    }

    /// Qualified-name prefix contributed by a parent: the parent message's
    /// full name, or the leading-separator package for file scope (empty
    /// package contributes nothing, so root-scope names become `.Name`)
    pub fn parent_full_name(&self, parent: ParentLink) -> String {
        match parent {
            ParentLink::Message(id) => self.messages[id.0].full_name.clone(),
            ParentLink::File(id) => {
                let package = &self.files[id.0].package;
                if package.is_empty() {
                    String::new()
                } else {
                    format!(".{}", package)
                }
            }
        }
    }

    /// Walk the parent chain upward to the file owning a type
    ///
    /// Fails fast on a chain that does not terminate, which indicates a
    /// malformed graph rather than looping silently.
    pub fn owning_file(&self, target: TypeRef) -> Result<FileId, GeneratorError> {
        let mut current = self.type_parent(target);
        let mut steps = 0usize;
        let limit = self.messages.len() + 1;
        loop {
            match current {
                ParentLink::File(id) => return Ok(id),
                ParentLink::Message(id) => {
                    steps += 1;
                    if steps > limit {
                        return Err(GeneratorError::MalformedGraph(format!(
                            "parent chain of '{}' does not terminate at a file",
                            self.full_name(target)
                        )));
                    }
                    current = self.messages[id.0].parent;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_names() {
        let mut set = FileSet::new();
        let file = set.add_file("demo/widgets.proto", "demo.widgets");
        let outer = set.add_message(ParentLink::File(file), "Widget");
        let inner = set.add_message(ParentLink::Message(outer), "Part");
        let color = set.add_enum(ParentLink::Message(outer), "Color");

        assert_eq!(set.message(outer).full_name, ".demo.widgets.Widget");
        assert_eq!(set.message(inner).full_name, ".demo.widgets.Widget.Part");
        assert_eq!(set.enum_node(color).full_name, ".demo.widgets.Widget.Color");
    }

    #[test]
    fn test_empty_package_names() {
        let mut set = FileSet::new();
        let file = set.add_file("root.proto", "");
        let msg = set.add_message(ParentLink::File(file), "Root");
        assert_eq!(set.message(msg).full_name, ".Root");
    }

    #[test]
    fn test_owning_file_walks_nesting() {
        let mut set = FileSet::new();
        let file = set.add_file("a.proto", "a");
        let outer = set.add_message(ParentLink::File(file), "Outer");
        let mid = set.add_message(ParentLink::Message(outer), "Mid");
        let inner = set.add_enum(ParentLink::Message(mid), "Deep");

        assert_eq!(set.owning_file(TypeRef::Enum(inner)).unwrap(), file);
        assert_eq!(set.owning_file(TypeRef::Message(outer)).unwrap(), file);
    }

    #[test]
    fn test_children_registered_in_order() {
        let mut set = FileSet::new();
        let file = set.add_file("a.proto", "a");
        let first = set.add_message(ParentLink::File(file), "First");
        let second = set.add_message(ParentLink::File(file), "Second");
        assert_eq!(set.file(file).messages, vec![first, second]);
    }
}
