//! Bridge from serialized protobuf descriptors to the arena graph
//!
//! Converts a `prost_types::FileDescriptorSet` (or its raw bytes) into a
//! [`FileSet`], computing fully-qualified names and resolving field type
//! references across the whole set in a second pass. Per-file namespace
//! options are taken from `csharp_namespace`.
//!
//! Schema text parsing stays upstream; this module only restructures the
//! already-parsed descriptors into the graph the resolution layer reads.

use crate::graph::{FieldKind, FieldNode, FileSet, Label, MessageId, ParentLink, TypeRef};
use crate::GeneratorError;
use prost::Message;
use prost_types::field_descriptor_proto::{Label as ProtoLabel, Type as ProtoType};
use prost_types::{DescriptorProto, EnumDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use std::collections::HashMap;

/// A field whose type reference still needs resolving after all types are
/// registered
struct PendingLink {
    message: MessageId,
    field_index: usize,
    type_name: String,
}

/// Decode a serialized `FileDescriptorSet` and build the graph
pub fn from_bytes(
    bytes: &[u8],
    default_namespace: Option<&str>,
) -> Result<FileSet, GeneratorError> {
    let fds = FileDescriptorSet::decode(bytes)?;
    from_file_descriptor_set(&fds, default_namespace)
}

/// Build the graph from an in-memory `FileDescriptorSet`
///
/// `default_namespace` becomes the set-wide fallback used for cross-file
/// references into files that carry no explicit namespace option.
pub fn from_file_descriptor_set(
    fds: &FileDescriptorSet,
    default_namespace: Option<&str>,
) -> Result<FileSet, GeneratorError> {
    let mut set = FileSet::new();
    if let Some(namespace) = default_namespace {
        set.set_default_namespace(namespace);
    }

    let mut registry: HashMap<String, TypeRef> = HashMap::new();
    let mut pending: Vec<PendingLink> = Vec::new();

    for file in &fds.file {
        add_file(&mut set, &mut registry, &mut pending, file)?;
    }

    for link in pending {
        let target = registry.get(&link.type_name).copied().ok_or_else(|| {
            GeneratorError::MalformedGraph(format!(
                "field '{}' references unknown type '{}'",
                set.message(link.message).fields[link.field_index].name,
                link.type_name
            ))
        })?;
        set.set_field_resolved_type(link.message, link.field_index, target);
    }

    Ok(set)
}

fn add_file(
    set: &mut FileSet,
    registry: &mut HashMap<String, TypeRef>,
    pending: &mut Vec<PendingLink>,
    file: &FileDescriptorProto,
) -> Result<(), GeneratorError> {
    let id = set.add_file(file.name(), file.package());
    if let Some(options) = &file.options {
        let namespace = options.csharp_namespace();
        if !namespace.is_empty() {
            set.set_file_namespace(id, namespace);
        }
    }
    for message in &file.message_type {
        add_message(set, registry, pending, ParentLink::File(id), message)?;
    }
    for enumeration in &file.enum_type {
        add_enum(set, registry, ParentLink::File(id), enumeration);
    }
    Ok(())
}

fn add_message(
    set: &mut FileSet,
    registry: &mut HashMap<String, TypeRef>,
    pending: &mut Vec<PendingLink>,
    parent: ParentLink,
    proto: &DescriptorProto,
) -> Result<(), GeneratorError> {
    let id = set.add_message(parent, proto.name());
    registry.insert(set.message(id).full_name.clone(), TypeRef::Message(id));

    for oneof in &proto.oneof_decl {
        set.add_oneof(id, oneof.name());
    }

    for field in &proto.field {
        let kind = field_kind(field.r#type())?;
        let mut node = FieldNode::new(field.name(), field.number(), kind, field_label(field.label()));
        if let Some(index) = field.oneof_index {
            node = node.with_oneof_index(index);
        }
        let field_index = set.add_field(id, node);

        if matches!(kind, FieldKind::Message | FieldKind::Enum) {
            let type_name = field.type_name();
            if type_name.is_empty() {
                return Err(GeneratorError::MalformedGraph(format!(
                    "field '{}' of '{}' has a composite kind but no type name",
                    field.name(),
                    set.message(id).full_name
                )));
            }
            pending.push(PendingLink {
                message: id,
                field_index,
                type_name: type_name.to_string(),
            });
        }
    }

    for nested in &proto.nested_type {
        add_message(set, registry, pending, ParentLink::Message(id), nested)?;
    }
    for enumeration in &proto.enum_type {
        add_enum(set, registry, ParentLink::Message(id), enumeration);
    }
    Ok(())
}

fn add_enum(
    set: &mut FileSet,
    registry: &mut HashMap<String, TypeRef>,
    parent: ParentLink,
    proto: &EnumDescriptorProto,
) {
    let id = set.add_enum(parent, proto.name());
    registry.insert(set.enum_node(id).full_name.clone(), TypeRef::Enum(id));
    for value in &proto.value {
        set.add_enum_value(id, value.name(), value.number());
    }
}

fn field_label(label: ProtoLabel) -> Label {
    match label {
        ProtoLabel::Required => Label::Required,
        ProtoLabel::Repeated => Label::Repeated,
        ProtoLabel::Optional => Label::Optional,
    }
}

fn field_kind(proto_type: ProtoType) -> Result<FieldKind, GeneratorError> {
    Ok(match proto_type {
        ProtoType::Double => FieldKind::Double,
        ProtoType::Float => FieldKind::Float,
        ProtoType::Int32 => FieldKind::Int32,
        ProtoType::Int64 => FieldKind::Int64,
        ProtoType::Uint32 => FieldKind::Uint32,
        ProtoType::Uint64 => FieldKind::Uint64,
        ProtoType::Sint32 => FieldKind::Sint32,
        ProtoType::Sint64 => FieldKind::Sint64,
        ProtoType::Fixed32 => FieldKind::Fixed32,
        ProtoType::Fixed64 => FieldKind::Fixed64,
        ProtoType::Sfixed32 => FieldKind::Sfixed32,
        ProtoType::Sfixed64 => FieldKind::Sfixed64,
        ProtoType::Bool => FieldKind::Bool,
        ProtoType::String => FieldKind::String,
        ProtoType::Bytes => FieldKind::Bytes,
        ProtoType::Message => FieldKind::Message,
        ProtoType::Enum => FieldKind::Enum,
        ProtoType::Group => {
            return Err(GeneratorError::UnknownFieldType(
                "group fields are not supported".to_string(),
            ))
        }
    })
}
