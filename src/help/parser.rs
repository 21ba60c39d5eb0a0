//! Help content parser

use super::raw::{self, RawSections, Section};
use super::{schema, CommandHelpModel, ExampleHelp};
use crate::example::ExampleSegmenter;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Help content for one command, in whichever forms were captured
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HelpInput {
    /// Structured help object graph
    pub structured: Option<Value>,
    /// Raw text dump
    pub raw: Option<String>,
    /// Command name to fall back on
    pub name_hint: Option<String>,
}

impl HelpInput {
    pub fn structured(value: Value) -> Self {
        Self {
            structured: Some(value),
            ..Default::default()
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            raw: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_raw(mut self, text: impl Into<String>) -> Self {
        self.raw = Some(text.into());
        self
    }

    pub fn with_name_hint(mut self, name: impl Into<String>) -> Self {
        self.name_hint = Some(name.into());
        self
    }

    fn hint(&self) -> Option<&str> {
        self.name_hint
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
    }
}

/// Builds a [`CommandHelpModel`] from structured or raw help
pub struct HelpContentParser {
    /// Chain for structured examples, where code and remarks are mostly separated
    structured_examples: ExampleSegmenter,
    /// Chain for raw examples, which need the narrative-tail scan
    raw_examples: ExampleSegmenter,
}

impl HelpContentParser {
    pub fn new() -> Self {
        Self {
            structured_examples: ExampleSegmenter::new(),
            raw_examples: ExampleSegmenter::strict(),
        }
    }

    /// Parse help content
    ///
    /// Structured input is tried first. Raw text is used when there is no
    /// structured input or it yielded no name. Returns a name-only model
    /// when only the hint is usable and `None` when nothing is.
    pub fn parse(&self, input: &HelpInput) -> Option<CommandHelpModel> {
        let sections = input.raw.as_deref().map(RawSections::parse);

        if let Some(value) = input.structured.as_ref().filter(|v| v.is_object()) {
            if let Some(model) = self.parse_structured(value, sections.as_ref()) {
                return Some(model);
            }
            tracing::debug!("Structured help carried no name, trying raw text");
        }

        if let Some(sections) = sections.as_ref().filter(|s| !s.is_empty()) {
            if let Some(model) = self.parse_raw(sections, input.hint()) {
                return Some(model);
            }
        }

        input.hint().map(CommandHelpModel::named)
    }

    fn parse_structured(&self, value: &Value, raw: Option<&RawSections>) -> Option<CommandHelpModel> {
        let name = schema::name(value)?;
        let parameters = schema::parameters(value);
        let syntax = schema::syntax(value, &parameters);

        let examples = match raw.and_then(|r| r.non_empty(Section::Examples)) {
            Some(text) => self.raw_examples(text),
            None => self.structured_examples(value),
        };

        Some(CommandHelpModel {
            name,
            synopsis: schema::synopsis(value).unwrap_or_default(),
            description: schema::description(value).unwrap_or_default(),
            syntax,
            parameters,
            examples,
            inputs: schema::inputs(value),
            outputs: schema::outputs(value),
            notes: schema::notes(value).unwrap_or_default(),
            related_links: schema::related_links(value),
        })
    }

    fn structured_examples(&self, value: &Value) -> Vec<ExampleHelp> {
        schema::examples(value)
            .into_iter()
            .enumerate()
            .map(|(index, example)| {
                let segmented = self.structured_examples.classify(&example.body);
                let title = clean_title(&example.title, index + 1);
                let mut help = ExampleHelp::from_segmented(&title, segmented);
                if !example.remarks.is_empty() {
                    help.remarks = if help.remarks.is_empty() {
                        example.remarks
                    } else {
                        format!("{}\n\n{}", help.remarks, example.remarks)
                    };
                }
                help
            })
            .collect()
    }

    fn raw_examples(&self, text: &str) -> Vec<ExampleHelp> {
        raw::split_examples(text)
            .into_iter()
            .map(|(title, body)| ExampleHelp::from_segmented(&title, self.raw_examples.classify(&body)))
            .collect()
    }

    fn parse_raw(&self, sections: &RawSections, hint: Option<&str>) -> Option<CommandHelpModel> {
        let text = |section: Section| sections.get(section).map(raw::paragraph).unwrap_or_default();

        let declared = sections
            .get(Section::Name)
            .map(raw::paragraph)
            .and_then(|n| n.lines().next().map(str::to_string))
            .filter(|n| !n.is_empty());

        // Without a NAME section, invocations are recognised by their shape
        let syntax_text = sections.get(Section::Syntax).unwrap_or_default();
        let syntax = raw::parse_syntax(syntax_text, declared.as_deref().unwrap_or_default());

        let name = declared
            .or_else(|| {
                syntax_text
                    .lines()
                    .find_map(|l| l.split_whitespace().next())
                    .map(str::to_string)
            })
            .or_else(|| hint.map(str::to_string))?;

        Some(CommandHelpModel {
            name,
            synopsis: text(Section::Synopsis),
            description: text(Section::Description),
            syntax,
            parameters: sections
                .get(Section::Parameters)
                .map(raw::parse_parameters)
                .unwrap_or_default(),
            examples: sections
                .get(Section::Examples)
                .map(|e| self.raw_examples(e))
                .unwrap_or_default(),
            inputs: sections
                .get(Section::Inputs)
                .map(raw::parse_types)
                .unwrap_or_default(),
            outputs: sections
                .get(Section::Outputs)
                .map(raw::parse_types)
                .unwrap_or_default(),
            notes: text(Section::Notes),
            related_links: sections
                .get(Section::RelatedLinks)
                .map(raw::parse_links)
                .unwrap_or_default(),
        })
    }
}

impl Default for HelpContentParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip decoration and the marker word from a structured example title
fn clean_title(title: &str, ordinal: usize) -> String {
    if let Some(rest) = raw::example_marker(title) {
        return raw::example_title(rest, ordinal);
    }
    let trimmed = title.trim().trim_matches('-').trim();
    if trimmed.is_empty() {
        format!("Example {}", ordinal)
    } else {
        trimmed.to_string()
    }
}
