use serde::Deserialize;

/// Analyzer configuration, deserialized from the client's
/// `initialization_options` / `workspace/didChangeConfiguration` payload.
/// Unknown keys are ignored; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerSettings {
    /// Publish analyzer diagnostics as warnings instead of errors
    pub suppress_analyzer_errors: bool,
    /// Type names constructable from string literals, in lookup order
    pub builtin_string_types: Vec<String>,
    /// Generic array type used for `T[]`
    pub builtin_array_type: String,
    /// Include every `.as` file under the predefined root in every file
    pub implicit_mutual_inclusion: bool,
    /// Mirror enum members into the enum's parent scope
    pub hoist_enum_parent_scope: bool,
    /// Require the `property` attribute for accessor synthesis
    pub explicit_property_accessor: bool,
    pub formatter: FormatterSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatterSettings {
    pub max_blank_lines: u32,
    pub indent_spaces: u32,
    pub use_tab_indent: bool,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            suppress_analyzer_errors: true,
            builtin_string_types: vec![
                "string".to_string(),
                "string_t".to_string(),
                "String".to_string(),
            ],
            builtin_array_type: "array".to_string(),
            implicit_mutual_inclusion: false,
            hoist_enum_parent_scope: false,
            explicit_property_accessor: true,
            formatter: FormatterSettings::default(),
        }
    }
}

impl Default for FormatterSettings {
    fn default() -> Self {
        Self {
            max_blank_lines: 1,
            indent_spaces: 4,
            use_tab_indent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let settings: AnalyzerSettings = serde_json::from_str("{}").unwrap();
        assert!(settings.suppress_analyzer_errors);
        assert_eq!(settings.builtin_array_type, "array");
        assert!(!settings.implicit_mutual_inclusion);
        assert!(settings.explicit_property_accessor);
        assert_eq!(settings.formatter.max_blank_lines, 1);
        assert_eq!(settings.formatter.indent_spaces, 4);
    }

    #[test]
    fn test_camel_case_keys() {
        let settings: AnalyzerSettings = serde_json::from_str(
            r#"{"explicitPropertyAccessor": false, "builtinArrayType": "list",
                "formatter": {"useTabIndent": true}}"#,
        )
        .unwrap();
        assert!(!settings.explicit_property_accessor);
        assert_eq!(settings.builtin_array_type, "list");
        assert!(settings.formatter.use_tab_indent);
    }
}
