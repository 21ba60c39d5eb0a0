//! Command help parsing
//!
//! This module turns command help into a typed reference model:
//! - Structured help object graphs from several producer schema versions
//! - Raw text dumps with canonical section headers
//! - Example bodies split into code and remarks

mod parser;
mod provider;
mod raw;
mod schema;

pub use parser::{HelpContentParser, HelpInput};
pub use provider::HelpProvider;
pub use raw::{RawSections, Section};

use crate::example::Segmented;
use serde::{Deserialize, Serialize};

/// Reference model of one command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandHelpModel {
    pub name: String,
    pub synopsis: String,
    pub description: String,
    /// Usage forms, in display order
    pub syntax: Vec<SyntaxSet>,
    /// Full parameter catalogue, in declaration order
    pub parameters: Vec<ParameterHelp>,
    pub examples: Vec<ExampleHelp>,
    pub inputs: Vec<TypeHelp>,
    pub outputs: Vec<TypeHelp>,
    pub notes: String,
    pub related_links: Vec<RelatedLink>,
}

impl CommandHelpModel {
    /// A model carrying only a command name
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Look up a catalogue parameter by name (case-insensitive)
    pub fn parameter(&self, name: &str) -> Option<&ParameterHelp> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Whether nothing besides the name was found
    pub fn is_name_only(&self) -> bool {
        self.synopsis.is_empty()
            && self.description.is_empty()
            && self.syntax.is_empty()
            && self.parameters.is_empty()
            && self.examples.is_empty()
            && self.inputs.is_empty()
            && self.outputs.is_empty()
            && self.notes.is_empty()
            && self.related_links.is_empty()
    }
}

/// One usage form of a command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxSet {
    pub name: String,
    /// Parameters in usage order; names are unique within the set
    pub parameters: Vec<ParameterHelp>,
}

impl SyntaxSet {
    /// Create a set, dropping repeated parameter names (first wins)
    pub fn new(name: &str, parameters: Vec<ParameterHelp>) -> Self {
        let mut unique: Vec<ParameterHelp> = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            if !unique
                .iter()
                .any(|p| p.name.eq_ignore_ascii_case(&parameter.name))
            {
                unique.push(parameter);
            }
        }
        Self {
            name: name.to_string(),
            parameters: unique,
        }
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Documentation of one parameter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterHelp {
    pub name: String,
    pub type_name: String,
    pub description: String,
    /// Position as written by the producer ("0", "named", ...)
    pub position: Option<String>,
    /// `None` when the producer did not say
    pub required: Option<bool>,
    pub pipeline_input: String,
    pub supports_wildcards: Option<bool>,
    pub default_value: Option<String>,
    pub aliases: Vec<String>,
}

impl ParameterHelp {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Fill fields this entry lacks from a catalogue entry of the same parameter
    pub fn enriched_from(mut self, catalogue: &ParameterHelp) -> Self {
        if self.type_name.is_empty() {
            self.type_name = catalogue.type_name.clone();
        }
        if self.description.is_empty() {
            self.description = catalogue.description.clone();
        }
        if self.position.is_none() {
            self.position = catalogue.position.clone();
        }
        if self.required.is_none() {
            self.required = catalogue.required;
        }
        if self.pipeline_input.is_empty() {
            self.pipeline_input = catalogue.pipeline_input.clone();
        }
        if self.supports_wildcards.is_none() {
            self.supports_wildcards = catalogue.supports_wildcards;
        }
        if self.default_value.is_none() {
            self.default_value = catalogue.default_value.clone();
        }
        if self.aliases.is_empty() {
            self.aliases = catalogue.aliases.clone();
        }
        self
    }
}

/// A usage example
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleHelp {
    pub title: String,
    pub code: String,
    pub remarks: String,
    /// Which segmentation rule produced code and remarks
    pub mode: String,
}

impl ExampleHelp {
    pub fn from_segmented(title: &str, segmented: Segmented) -> Self {
        Self {
            title: title.to_string(),
            code: segmented.code,
            remarks: segmented.remarks,
            mode: segmented.mode,
        }
    }

    pub fn code_line_count(&self) -> usize {
        self.code.lines().count()
    }

    pub fn remarks_line_count(&self) -> usize {
        self.remarks.lines().count()
    }
}

/// An input or output type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeHelp {
    pub name: String,
    pub description: String,
}

/// A related link; `uri` is absent for plain references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLink {
    pub text: String,
    pub uri: Option<String>,
}

/// Parse a tri-state boolean as producers write it ("true", "False", ...)
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Split an alias list; "None" and blanks mean no aliases
pub(crate) fn parse_aliases(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("none"))
        .map(str::to_string)
        .collect()
}
