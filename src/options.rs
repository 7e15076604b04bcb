//! Generator configuration
//!
//! Parses the option map handed over by the invoking tool. Recognized
//! keys: `template_path` (directory of named template fragments),
//! `file_extension` (output-file suffix), `ignore_package` (package prefix
//! to skip), and `global_codegen` (comma-separated
//! `outputName:templateFile` pairs for whole-set templates).

use crate::resolve::classify::MapEntryConvention;
use crate::GeneratorError;
use std::collections::HashMap;
use std::path::PathBuf;

/// Option key for the template directory
pub const TEMPLATE_PATH: &str = "template_path";
/// Option key for the output-file suffix
pub const FILE_EXTENSION: &str = "file_extension";
/// Option key for the ignored package prefix
pub const IGNORE_PACKAGE: &str = "ignore_package";
/// Option key for whole-set template configuration
pub const GLOBAL_CODEGEN: &str = "global_codegen";

/// One whole-set template: rendered once over the full file set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalTemplate {
    /// Relative path of the produced output file
    pub output_name: String,
    /// Template fragment name passed to the renderer
    pub template_file: String,
}

/// Parsed generator configuration
#[derive(Debug, Default)]
pub struct Config {
    /// Directory containing the renderer's template fragments
    pub template_path: Option<PathBuf>,
    /// Suffix appended to each per-file output (e.g. `.g.cs`)
    pub file_extension: String,
    /// Package prefix whose files are skipped entirely
    pub ignore_package: Option<String>,
    /// Whole-set templates, in configuration order
    pub global_codegen: Vec<GlobalTemplate>,
    /// Naming convention for synthesized map-entry types
    pub map_entry_convention: MapEntryConvention,
}

impl Config {
    /// Parse a configuration from the invoking tool's option map
    ///
    /// Unrecognized keys are ignored; a malformed `global_codegen` entry is
    /// a configuration error.
    pub fn from_options(options: &HashMap<String, String>) -> Result<Self, GeneratorError> {
        let mut config = Config::default();
        if let Some(path) = options.get(TEMPLATE_PATH) {
            config.template_path = Some(PathBuf::from(path));
        }
        if let Some(extension) = options.get(FILE_EXTENSION) {
            config.file_extension = extension.clone();
        }
        if let Some(prefix) = options.get(IGNORE_PACKAGE) {
            config.ignore_package = Some(prefix.clone());
        }
        if let Some(spec) = options.get(GLOBAL_CODEGEN) {
            for entry in spec.split(',') {
                let entry = entry.trim();
                if entry.is_empty() {
                    continue;
                }
                let (output_name, template_file) = entry.split_once(':').ok_or_else(|| {
                    GeneratorError::InvalidConfig(format!(
                        "global_codegen entry '{}' is not of the form 'outputName:templateFile'",
                        entry
                    ))
                })?;
                config.global_codegen.push(GlobalTemplate {
                    output_name: output_name.trim().to_string(),
                    template_file: template_file.trim().to_string(),
                });
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_all_options() {
        let config = Config::from_options(&options(&[
            (TEMPLATE_PATH, "templates"),
            (FILE_EXTENSION, ".g.cs"),
            (IGNORE_PACKAGE, "google.protobuf"),
            (GLOBAL_CODEGEN, "registry.cs:registry.tmpl, index.cs:index.tmpl"),
        ]))
        .unwrap();

        assert_eq!(config.template_path, Some(PathBuf::from("templates")));
        assert_eq!(config.file_extension, ".g.cs");
        assert_eq!(config.ignore_package.as_deref(), Some("google.protobuf"));
        assert_eq!(
            config.global_codegen,
            vec![
                GlobalTemplate {
                    output_name: "registry.cs".to_string(),
                    template_file: "registry.tmpl".to_string(),
                },
                GlobalTemplate {
                    output_name: "index.cs".to_string(),
                    template_file: "index.tmpl".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_options(&HashMap::new()).unwrap();
        assert!(config.template_path.is_none());
        assert!(config.file_extension.is_empty());
        assert!(config.ignore_package.is_none());
        assert!(config.global_codegen.is_empty());
    }

    #[test]
    fn test_malformed_global_codegen_entry() {
        let result = Config::from_options(&options(&[(GLOBAL_CODEGEN, "no-separator")]));
        assert!(matches!(result, Err(GeneratorError::InvalidConfig(_))));
    }
}
