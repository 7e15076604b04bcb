//! Structural classification of messages
//!
//! Two detectors that need message-level context rather than a single field
//! in isolation: synthesized map-entry types (recognized by an upstream
//! naming convention on the qualified name) and oneof field grouping.

use crate::graph::{FieldNode, FileSet, MessageId, MessageNode, TypeRef};
use crate::GeneratorError;

/// Naming convention for synthesized map-entry types
///
/// A message is a map entry when its qualified name begins with its
/// parent's qualified name followed by `.{marker}` and its simple name ends
/// with `suffix`. This is a convention of the upstream parser's map
/// synthesis, not a schema-language rule, so it is kept configurable.
#[derive(Debug, Clone)]
pub struct MapEntryConvention {
    /// Segment the entry name must begin with, right after the parent name
    pub marker: String,
    /// Suffix the entry's simple name must end with
    pub suffix: String,
}

impl Default for MapEntryConvention {
    fn default() -> Self {
        MapEntryConvention {
            marker: "Map".to_string(),
            suffix: "Entry".to_string(),
        }
    }
}

impl MapEntryConvention {
    /// Whether a message matches the convention
    pub fn matches(&self, set: &FileSet, message: MessageId) -> bool {
        let node = set.message(message);
        let prefix = format!("{}.{}", set.parent_full_name(node.parent), self.marker);
        node.full_name.starts_with(&prefix) && node.name.ends_with(&self.suffix)
    }
}

/// Whether a message is a synthesized map-entry type
pub fn is_map_entry(set: &FileSet, message: MessageId, convention: &MapEntryConvention) -> bool {
    convention.matches(set, message)
}

/// Whether a field references a synthesized map-entry type
pub fn is_map_field(set: &FileSet, field: &FieldNode, convention: &MapEntryConvention) -> bool {
    match field.resolved_type {
        Some(TypeRef::Message(target)) => convention.matches(set, target),
        _ => false,
    }
}

/// Key and value fields of the map-entry type referenced by `field`
///
/// The entry's first declared field is the key and its second the value.
/// An entry type without both is a malformed graph.
pub fn map_entry_fields<'a>(
    set: &'a FileSet,
    field: &FieldNode,
) -> Result<(&'a FieldNode, &'a FieldNode), GeneratorError> {
    let target = match field.resolved_type {
        Some(TypeRef::Message(target)) => target,
        _ => {
            return Err(GeneratorError::MalformedGraph(format!(
                "field '{}' does not reference a message type",
                field.name
            )))
        }
    };
    let entry = set.message(target);
    match entry.fields.as_slice() {
        [key, value, ..] => Ok((key, value)),
        _ => Err(GeneratorError::MalformedGraph(format!(
            "map entry '{}' does not declare key and value fields",
            entry.full_name
        ))),
    }
}

/// A oneof and the fields belonging to it, in declaration order
#[derive(Debug)]
pub struct OneofGroup<'a> {
    /// Name of the oneof declaration
    pub name: &'a str,
    /// Member fields, in field declaration order
    pub fields: Vec<&'a FieldNode>,
}

/// Partition a message's fields by oneof membership
///
/// Groups follow oneof declaration order; fields keep declaration order
/// within each group. Fields without a membership index appear in no group.
/// A membership index outside the declared range fails fast.
pub fn oneof_groups(message: &MessageNode) -> Result<Vec<OneofGroup<'_>>, GeneratorError> {
    let mut groups: Vec<OneofGroup> = message
        .oneofs
        .iter()
        .map(|decl| OneofGroup {
            name: decl.name.as_str(),
            fields: Vec::new(),
        })
        .collect();
    for field in &message.fields {
        if let Some(index) = field.oneof_index {
            let slot = usize::try_from(index)
                .ok()
                .and_then(|i| groups.get_mut(i))
                .ok_or_else(|| {
                    GeneratorError::MalformedGraph(format!(
                        "field '{}' references oneof index {} but '{}' declares {} oneofs",
                        field.name,
                        index,
                        message.name,
                        message.oneofs.len()
                    ))
                })?;
            slot.fields.push(field);
        }
    }
    Ok(groups)
}
