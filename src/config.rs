//! Data-source configuration: which downstream root fields this crate
//! forwards upstream, and how their arguments get translated.
//!
//! Grounded on the JSON shapes `graphql_datasource.go` assumes: a
//! `plan.DataSourceConfiguration` keyed by `(TypeName, FieldName)` whose
//! `Attributes` carry a `url` and an `arguments` blob deserialised into
//! [`ArgumentsConfig`] (the Go `ArgumentsConfig`/`FieldConfig`/`Argument`
//! structs, same file, lines 292-311). `serde` is the teacher's own
//! deserialisation crate (`FederationSchema` and friends derive `Deserialize`
//! throughout `schema/subgraph_metadata.rs`).

use serde::Deserialize;

/// One entry in the root-field-to-upstream-fetch mapping table.
///
/// A downstream field matches this entry when the field's enclosing type is
/// `type_name` and the field itself is `field_name`; see
/// [`crate::visitor::Visitor::is_root_field`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub type_name: String,
    pub field_name: String,
    pub attributes: DataSourceAttributes,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceAttributes {
    pub url: String,
    #[serde(default)]
    pub arguments: Option<ArgumentsConfig>,
}

/// `arguments` JSON attached to a [`DataSourceConfig`], scoped per downstream
/// field name (there may be more than one root field sharing one upstream
/// URL, each with its own argument list).
#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentsConfig {
    pub fields: Vec<FieldArgumentsConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldArgumentsConfig {
    pub field_name: String,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    pub source: ArgumentSource,
    #[serde(default)]
    pub source_path: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArgumentSource {
    FieldArgument,
    ObjectField,
}

/// A single-segment rename of a downstream field name to the name it should
/// carry on the upstream operation (§4.3 "buildUpstreamOperation" /
/// `EnclosingTypeDefinition`+`FieldMappings` lookup in `addField`).
///
/// `path` mirrors the Go side's `[]string`, but this crate only implements
/// the single-element case the original uses (`len(Path) == 1`); a
/// multi-segment path has no defined behavior here, same as upstream.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub type_name: String,
    pub field_name: String,
    pub path: Vec<String>,
}

impl FieldMapping {
    /// The single-segment upstream name this mapping renames to, if it
    /// actually is single-segment; longer paths are skipped rather than
    /// guessed at (see SPEC_FULL.md §9).
    pub fn upstream_name(&self) -> Option<&str> {
        match self.path.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }
}

/// Full configuration handed to the planner: the root-field mapping table
/// plus the field-rename table, both loaded once per plan.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    #[serde(default)]
    pub data_sources: Vec<DataSourceConfig>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
}

impl PlannerConfig {
    pub fn find_data_source(&self, type_name: &str, field_name: &str) -> Option<&DataSourceConfig> {
        self.data_sources
            .iter()
            .find(|c| c.type_name == type_name && c.field_name == field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_a_data_source_with_field_arguments() {
        let json = r#"
        {
            "dataSources": [
                {
                    "typeName": "Query",
                    "fieldName": "user",
                    "attributes": {
                        "url": "http://upstream/graphql",
                        "arguments": {
                            "fields": [
                                {
                                    "fieldName": "user",
                                    "arguments": [
                                        { "name": "id", "source": "fieldArgument", "sourcePath": [] }
                                    ]
                                }
                            ]
                        }
                    }
                }
            ],
            "fieldMappings": [
                { "typeName": "Query", "fieldName": "me", "path": ["user"] }
            ]
        }
        "#;
        let config: PlannerConfig = serde_json::from_str(json).unwrap();
        let ds = config.find_data_source("Query", "user").unwrap();
        assert_eq!(ds.attributes.url, "http://upstream/graphql");
        let args = ds.attributes.arguments.as_ref().unwrap();
        assert_eq!(args.fields[0].arguments[0].source, ArgumentSource::FieldArgument);
        assert_eq!(config.field_mappings[0].upstream_name(), Some("user"));
    }
}
