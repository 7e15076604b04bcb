//! Model binding and generation orchestration
//!
//! For each unit of generation (file, message, enum, whole set) the
//! [`Generator`] builds a short-lived model wrapping the relevant graph
//! node plus the precomputed facts the external renderer may need. The
//! renderer decides *what* to render; the models guarantee every fact is
//! reachable through a stable, side-effect-free read interface, including
//! recursive generation of nested declarations.
//!
//! Generation is a single-threaded tree walk. Any failure aborts the whole
//! pass; partial output is never returned.

use crate::graph::{
    EnumId, EnumNode, FieldNode, FileId, FileNode, FileSet, MessageId, MessageNode, TypeRef,
};
use crate::indent::reindent;
use crate::options::Config;
use crate::resolve::classify::{self, OneofGroup};
use crate::resolve::names::{self, NamespaceHook};
use crate::resolve::tag;
use crate::GeneratorError;
use heck::{ToLowerCamelCase, ToUpperCamelCase};
use std::path::Path;
use tracing::debug;

/// One produced output: a relative path and its generated text
#[derive(Debug)]
pub struct CodeFile {
    /// Output path relative to the generation root
    pub path: String,
    /// Generated file content
    pub content: String,
}

/// The external template-rendering collaborator
///
/// Implementations interpolate a model into output text. They may only
/// consume the descriptor graph through the model passed to them. Errors
/// are reported as plain text; the generator attaches the failing unit's
/// identity before surfacing them.
pub trait Renderer {
    /// Whether per-file templates are available (file, type, and enum)
    fn has_file_template(&self) -> bool;

    /// Render one schema file
    fn render_file(&self, model: &FileModel<'_>) -> Result<String, String>;

    /// Render one message type
    fn render_type(&self, model: &TypeModel<'_>) -> Result<String, String>;

    /// Render one enum
    fn render_enum(&self, model: &EnumModel<'_>) -> Result<String, String>;

    /// Render one whole-set template
    fn render_global(&self, template_file: &str, model: &GlobalModel<'_>) -> Result<String, String>;
}

/// Uppercase the first camel segment boundary of an identifier
pub fn to_upper_camel(value: &str) -> String {
    value.to_upper_camel_case()
}

/// Lowercase-first camel form of an identifier
pub fn to_lower_camel(value: &str) -> String {
    value.to_lower_camel_case()
}

/// Drives a full generation pass over one descriptor graph
pub struct Generator<'a> {
    set: &'a FileSet,
    renderer: &'a dyn Renderer,
    config: &'a Config,
    namespace_hook: Option<&'a dyn NamespaceHook>,
}

impl<'a> Generator<'a> {
    /// Create a generator over `set` using `renderer` and `config`
    pub fn new(set: &'a FileSet, renderer: &'a dyn Renderer, config: &'a Config) -> Self {
        Generator {
            set,
            renderer,
            config,
            namespace_hook: None,
        }
    }

    /// Thread a caller-supplied namespace override through name resolution
    pub fn with_namespace_hook(mut self, hook: &'a dyn NamespaceHook) -> Self {
        self.namespace_hook = Some(hook);
        self
    }

    /// Run the pass: one output per qualifying file plus one per
    /// configured global template
    ///
    /// A file qualifies when it declares at least one message or enum and
    /// its package does not start with the configured ignore prefix.
    pub fn run(&self) -> Result<Vec<CodeFile>, GeneratorError> {
        let per_file = self.renderer.has_file_template();
        if !per_file && self.config.global_codegen.is_empty() {
            return Err(GeneratorError::InvalidConfig(
                "no usable template set; provide 'template_path' templates or 'global_codegen'"
                    .to_string(),
            ));
        }

        let mut outputs = Vec::new();
        if per_file {
            for (id, file) in self.set.files() {
                if !self.qualifies(file) {
                    debug!(file = %file.path, "skipping non-qualifying file");
                    continue;
                }
                debug!(file = %file.path, "generating");
                let model = FileModel {
                    generator: self,
                    file_id: id,
                    file,
                };
                let content = self.renderer.render_file(&model).map_err(|message| {
                    GeneratorError::Render {
                        file: file.path.clone(),
                        unit: "file".to_string(),
                        message,
                    }
                })?;
                outputs.push(CodeFile {
                    path: output_path(&file.path, &self.config.file_extension),
                    content,
                });
            }
        }

        for template in &self.config.global_codegen {
            debug!(template = %template.template_file, output = %template.output_name, "generating global output");
            let model = GlobalModel { generator: self };
            let content = self
                .renderer
                .render_global(&template.template_file, &model)
                .map_err(|message| GeneratorError::Render {
                    file: template.template_file.clone(),
                    unit: format!("global output '{}'", template.output_name),
                    message,
                })?;
            outputs.push(CodeFile {
                path: template.output_name.clone(),
                content,
            });
        }
        Ok(outputs)
    }

    fn qualifies(&self, file: &FileNode) -> bool {
        if file.messages.is_empty() && file.enums.is_empty() {
            return false;
        }
        match &self.config.ignore_package {
            Some(prefix) => !file.package.starts_with(prefix.as_str()),
            None => true,
        }
    }

    /// Render a message and indent its output by `embed_depth` units
    fn generate_type(&self, id: MessageId, embed_depth: usize) -> Result<String, GeneratorError> {
        let message = self.set.message(id);
        let file_id = self.set.owning_file(TypeRef::Message(id))?;
        let model = TypeModel {
            generator: self,
            message_id: id,
            message,
            file_id,
            depth: embed_depth,
        };
        let rendered = self
            .renderer
            .render_type(&model)
            .map_err(|message_text| GeneratorError::Render {
                file: self.set.file(file_id).path.clone(),
                unit: format!("type '{}'", message.full_name),
                message: message_text,
            })?;
        Ok(reindent(&rendered, embed_depth))
    }

    /// Render an enum and indent its output by `embed_depth` units
    fn generate_enum(&self, id: EnumId, embed_depth: usize) -> Result<String, GeneratorError> {
        let node = self.set.enum_node(id);
        let file_id = self.set.owning_file(TypeRef::Enum(id))?;
        let model = EnumModel {
            enum_id: id,
            enum_node: node,
            depth: embed_depth,
        };
        let rendered = self
            .renderer
            .render_enum(&model)
            .map_err(|message| GeneratorError::Render {
                file: self.set.file(file_id).path.clone(),
                unit: format!("enum '{}'", node.full_name),
                message,
            })?;
        Ok(reindent(&rendered, embed_depth))
    }
}

/// Per-file output path: directory and file stem of the source path with
/// the configured extension appended
fn output_path(input: &str, extension: &str) -> String {
    let path = Path::new(input);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            format!("{}/{}{}", dir.to_string_lossy(), stem, extension)
        }
        _ => format!("{}{}", stem, extension),
    }
}

/// Model for rendering one schema file
pub struct FileModel<'a> {
    generator: &'a Generator<'a>,
    /// Handle of the file being rendered
    pub file_id: FileId,
    /// The file node itself
    pub file: &'a FileNode,
}

impl<'a> FileModel<'a> {
    /// Top-level messages of the file, in declaration order
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &'a MessageNode)> + 'a {
        let set = self.generator.set;
        self.file.messages.iter().map(move |&id| (id, set.message(id)))
    }

    /// Top-level enums of the file, in declaration order
    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &'a EnumNode)> + 'a {
        let set = self.generator.set;
        self.file.enums.iter().map(move |&id| (id, set.enum_node(id)))
    }

    /// Recursively render a top-level message
    pub fn generate_type(&self, id: MessageId) -> Result<String, GeneratorError> {
        self.generator.generate_type(id, 0)
    }

    /// Recursively render a top-level enum
    pub fn generate_enum(&self, id: EnumId) -> Result<String, GeneratorError> {
        self.generator.generate_enum(id, 0)
    }
}

/// Model for rendering one message type
pub struct TypeModel<'a> {
    generator: &'a Generator<'a>,
    /// Handle of the message being rendered
    pub message_id: MessageId,
    /// The message node itself
    pub message: &'a MessageNode,
    /// File owning the message; name resolution is relative to it
    pub file_id: FileId,
    /// Nesting depth of this type within its file's output
    pub depth: usize,
}

impl<'a> TypeModel<'a> {
    /// Nested messages, in declaration order
    pub fn nested_messages(&self) -> impl Iterator<Item = (MessageId, &'a MessageNode)> + 'a {
        let set = self.generator.set;
        self.message
            .nested_messages
            .iter()
            .map(move |&id| (id, set.message(id)))
    }

    /// Nested enums, in declaration order
    pub fn nested_enums(&self) -> impl Iterator<Item = (EnumId, &'a EnumNode)> + 'a {
        let set = self.generator.set;
        self.message
            .nested_enums
            .iter()
            .map(move |&id| (id, set.enum_node(id)))
    }

    /// Render a nested message, indented one level for embedding
    pub fn generate_type(&self, id: MessageId) -> Result<String, GeneratorError> {
        self.generator.generate_type(id, 1)
    }

    /// Render a nested enum, indented one level for embedding
    pub fn generate_enum(&self, id: EnumId) -> Result<String, GeneratorError> {
        self.generator.generate_enum(id, 1)
    }

    /// Wire tag of a field, formatted for textual embedding
    pub fn make_tag(&self, field: &FieldNode, pack: bool) -> Result<String, GeneratorError> {
        tag::make_tag(field.number, field.kind, field.is_repeated(), pack).map(|t| t.to_string())
    }

    /// Name of a field's referenced type, usable in this file's context
    pub fn message_type_name(&self, field: &FieldNode) -> Result<String, GeneratorError> {
        names::resolve_type_name(
            self.generator.set,
            field,
            self.file_id,
            self.generator.namespace_hook,
        )
    }

    /// Whether a nested message is a synthesized map-entry type
    pub fn is_map_entry(&self, id: MessageId) -> bool {
        classify::is_map_entry(
            self.generator.set,
            id,
            &self.generator.config.map_entry_convention,
        )
    }

    /// Whether a field references a synthesized map-entry type
    pub fn is_map_field(&self, field: &FieldNode) -> bool {
        classify::is_map_field(
            self.generator.set,
            field,
            &self.generator.config.map_entry_convention,
        )
    }

    /// Key field of the map entry referenced by `field`
    pub fn map_key_field(&self, field: &FieldNode) -> Result<&'a FieldNode, GeneratorError> {
        classify::map_entry_fields(self.generator.set, field).map(|(key, _)| key)
    }

    /// Value field of the map entry referenced by `field`
    pub fn map_value_field(&self, field: &FieldNode) -> Result<&'a FieldNode, GeneratorError> {
        classify::map_entry_fields(self.generator.set, field).map(|(_, value)| value)
    }

    /// The message's fields partitioned by oneof membership
    pub fn oneof_groups(&self) -> Result<Vec<OneofGroup<'a>>, GeneratorError> {
        classify::oneof_groups(self.message)
    }
}

/// Model for rendering one enum
pub struct EnumModel<'a> {
    /// Handle of the enum being rendered
    pub enum_id: EnumId,
    /// The enum node itself
    pub enum_node: &'a EnumNode,
    /// Nesting depth of this enum within its file's output
    pub depth: usize,
}

/// Model for rendering a whole-set (cross-file aggregate) template
pub struct GlobalModel<'a> {
    generator: &'a Generator<'a>,
}

impl<'a> GlobalModel<'a> {
    /// All files of the set, in registration order
    pub fn files(&self) -> impl Iterator<Item = (FileId, &'a FileNode)> + 'a {
        self.generator.set.files()
    }

    /// Messages declared at the top level of a file
    pub fn messages_of(
        &self,
        file: &'a FileNode,
    ) -> impl Iterator<Item = (MessageId, &'a MessageNode)> + 'a {
        let set = self.generator.set;
        file.messages.iter().map(move |&id| (id, set.message(id)))
    }

    /// Enums declared at the top level of a file
    pub fn enums_of(
        &self,
        file: &'a FileNode,
    ) -> impl Iterator<Item = (EnumId, &'a EnumNode)> + 'a {
        let set = self.generator.set;
        file.enums.iter().map(move |&id| (id, set.enum_node(id)))
    }

    /// Render a message at top level (no embedding indent)
    pub fn generate_type(&self, id: MessageId) -> Result<String, GeneratorError> {
        self.generator.generate_type(id, 0)
    }

    /// Render an enum at top level (no embedding indent)
    pub fn generate_enum(&self, id: EnumId) -> Result<String, GeneratorError> {
        self.generator.generate_enum(id, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_keeps_directory() {
        assert_eq!(output_path("demo/widgets.proto", ".g.cs"), "demo/widgets.g.cs");
        assert_eq!(output_path("widgets.proto", ".g.cs"), "widgets.g.cs");
        assert_eq!(output_path("a/b/c.proto", ""), "a/b/c");
    }

    #[test]
    fn test_camel_helpers() {
        assert_eq!(to_upper_camel("field_name"), "FieldName");
        assert_eq!(to_lower_camel("FieldName"), "fieldName");
        assert_eq!(to_upper_camel(""), "");
    }
}
