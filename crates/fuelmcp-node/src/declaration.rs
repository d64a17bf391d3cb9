//! Node declaration types.
//!
//! A [`NodeDeclaration`] is the static contract a workflow host reads to
//! render the node, wire its ports, and look up runtime values by input name.

use std::collections::HashSet;

use semver::Version;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{AsRefStr, Display, IntoStaticStr};

use crate::{Error, Result};

/// Semantic type tag of an input or output port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FieldType {
    /// Free text.
    String,
    /// Numeric value.
    Number,
    /// Boolean flag.
    Boolean,
    /// Arbitrary structured JSON.
    Json,
}

/// Declared input port of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputField {
    /// Display label.
    pub label: String,
    /// Identifier key used to look up runtime values.
    pub name: String,
    /// Semantic type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Example text shown in an empty field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Value used when the host supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Whether the host may invoke the node without a value.
    #[serde(default)]
    pub optional: bool,
}

impl InputField {
    /// Creates a new required input field.
    pub fn new(label: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            field_type,
            placeholder: None,
            default: None,
            optional: false,
        }
    }

    /// Sets the placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the default value.
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Returns the default value as a string, if it is one.
    pub fn default_str(&self) -> Option<&str> {
        self.default.as_ref().and_then(Value::as_str)
    }
}

/// Declared output port of a node. The type is advisory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputField {
    /// Display label.
    pub label: String,
    /// Identifier key of the produced value.
    pub name: String,
    /// Semantic type tag.
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl OutputField {
    /// Creates a new output field.
    pub fn new(label: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            label: label.into(),
            name: name.into(),
            field_type,
        }
    }
}

/// Static descriptive record of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDeclaration {
    /// Display label.
    pub label: String,
    /// Internal name.
    pub name: String,
    /// Internal type identifier.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Palette category.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Icon glyph.
    pub icon: String,
    /// Node author.
    pub author: String,
    /// Node version.
    pub version: Version,
    /// Ordered input ports.
    pub inputs: Vec<InputField>,
    /// Ordered output ports.
    pub outputs: Vec<OutputField>,
}

impl NodeDeclaration {
    /// Creates a declaration with no ports.
    pub fn new(label: impl Into<String>, name: impl Into<String>, version: Version) -> Self {
        let name = name.into();
        Self {
            label: label.into(),
            node_type: name.clone(),
            name,
            category: String::new(),
            description: String::new(),
            icon: String::new(),
            author: String::new(),
            version,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Sets the palette category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the icon glyph.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    /// Sets the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Appends an input port.
    pub fn with_input(mut self, input: InputField) -> Self {
        self.inputs.push(input);
        self
    }

    /// Appends an output port.
    pub fn with_output(mut self, output: OutputField) -> Self {
        self.outputs.push(output);
        self
    }

    /// Looks up an input port by name.
    pub fn input(&self, name: &str) -> Option<&InputField> {
        self.inputs.iter().find(|input| input.name == name)
    }

    /// Looks up an output port by name.
    pub fn output(&self, name: &str) -> Option<&OutputField> {
        self.outputs.iter().find(|output| output.name == name)
    }

    /// Checks that input and output names are unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.inputs.iter().find(|i| !seen.insert(i.name.as_str())) {
            return Err(Error::validation(format!("duplicate input name: {}", dup.name)));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = self.outputs.iter().find(|o| !seen.insert(o.name.as_str())) {
            return Err(Error::validation(format!("duplicate output name: {}", dup.name)));
        }

        Ok(())
    }

    /// Renders the declaration as an OpenAI function-calling tool schema.
    pub fn tool_schema(&self) -> Value {
        let mut properties = Map::new();
        for input in &self.inputs {
            let description = match &input.placeholder {
                Some(placeholder) => format!("{} ({placeholder})", input.label),
                None => input.label.clone(),
            };

            let mut property = json!({
                "type": json_schema_type(input.field_type),
                "description": description,
            });
            if let Some(default) = &input.default {
                property["default"] = default.clone();
            }

            properties.insert(input.name.clone(), property);
        }

        let required: Vec<&str> = self
            .inputs
            .iter()
            .filter(|input| !input.optional)
            .map(|input| input.name.as_str())
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        })
    }
}

fn json_schema_type(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => "string",
        FieldType::Number => "number",
        FieldType::Boolean => "boolean",
        FieldType::Json => "object",
    }
}
