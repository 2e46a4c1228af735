//! Shapes of declaration files.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::path::{Method, ParamLocation};
use crate::schema::FieldType;

/// Content of a schema file: type identifier to declaration.
pub(crate) type SchemaFile = IndexMap<String, SchemaEntry>;

/// Content of a path file: file identifier to declaration.
pub(crate) type PathFile = IndexMap<String, PathEntry>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SchemaEntry {
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) fields: IndexMap<String, FieldEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FieldEntry {
    #[serde(rename = "type")]
    pub(crate) field_type: Option<FieldType>,
    #[serde(rename = "ref")]
    pub(crate) reference: Option<String>,
    #[serde(default)]
    pub(crate) required: bool,
    pub(crate) description: Option<String>,
    pub(crate) format: Option<String>,
    #[serde(rename = "enum")]
    pub(crate) enum_values: Option<Vec<Value>>,
    pub(crate) example: Option<Value>,
    pub(crate) default: Option<Value>,
    pub(crate) items: Option<Value>,
    pub(crate) properties: Option<Value>,
    pub(crate) required_props: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PathEntry {
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) params: Vec<ParamEntry>,
    pub(crate) summary: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) security: Vec<IndexMap<String, Vec<String>>>,
    #[serde(default)]
    pub(crate) operations: IndexMap<Method, OperationEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OperationEntry {
    pub(crate) summary: Option<String>,
    pub(crate) operation_id: Option<String>,
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) params: Vec<ParamEntry>,
    pub(crate) request: Option<RequestEntry>,
    #[serde(default)]
    pub(crate) responses: Vec<ResponseEntry>,
    #[serde(default)]
    pub(crate) examples: Vec<Option<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ParamEntry {
    pub(crate) name: String,
    #[serde(rename = "in")]
    pub(crate) location: ParamLocation,
    #[serde(rename = "type")]
    pub(crate) type_name: String,
    pub(crate) format: Option<String>,
    pub(crate) required: Option<bool>,
    pub(crate) description: Option<String>,
    pub(crate) default: Option<Value>,
    pub(crate) example: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RequestEntry {
    pub(crate) schema: Value,
    pub(crate) content_type: Option<String>,
    #[serde(default)]
    pub(crate) required: bool,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ResponseEntry {
    pub(crate) status: Status,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default)]
    pub(crate) content: IndexMap<String, Value>,
}

/// A status code, written as a number or as a string such as `default`.
#[derive(Debug, Deserialize, derive_more::Display)]
#[serde(untagged)]
pub(crate) enum Status {
    Code(u16),
    Text(String),
}
