//! Field probes over structured help object graphs
//!
//! Producers disagree on shape: the MAML-derived object nests most fields
//! under `details` and wraps paragraphs in `{ "Text": ... }`, while newer
//! exporters emit a flat camel- or lower-case object. Each field is read by
//! a chain of probes, one per shape, ending in a loose fallback.

use super::{parse_aliases, parse_flag, ParameterHelp, RelatedLink, SyntaxSet, TypeHelp};
use serde_json::Value;

type Probe<T> = fn(&Value) -> Option<T>;

/// First probe that produces a value
fn first_of<T>(value: &Value, probes: &[Probe<T>]) -> Option<T> {
    probes.iter().find_map(|probe| probe(value))
}

/// Case-insensitive object member lookup
pub(crate) fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let object = value.as_object()?;
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Follow a chain of member names
fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| get(current, key))
}

/// Readable text of a node: strings, paragraph arrays and `{Text}` wrappers
pub(crate) fn text_of(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(text_of)
            .collect::<Vec<_>>()
            .join("\n\n"),
        Value::Object(_) => return ["Text", "#text", "value", "content"]
            .iter()
            .find_map(|key| get(value, key).and_then(text_of)),
        Value::Null => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Treat a single object as a one-element collection
pub(crate) fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    }
}

/// Items of the first collection found: nested paths may hold a single
/// object, flat members only count when they are arrays
fn collection<'a>(value: &'a Value, nested: &[&[&str]], flat: &[&str]) -> Vec<&'a Value> {
    nested
        .iter()
        .find_map(|keys| path(value, keys))
        .or_else(|| {
            flat.iter()
                .find_map(|key| get(value, key).filter(|v| v.is_array()))
        })
        .map(|v| as_list(Some(v)))
        .unwrap_or_default()
}

fn text_at(value: &Value, keys: &[&str]) -> Option<String> {
    path(value, keys).and_then(text_of)
}

fn flag_at(value: &Value, keys: &[&str]) -> Option<bool> {
    match path(value, keys)? {
        Value::Bool(b) => Some(*b),
        other => text_of(other).and_then(|t| parse_flag(&t)),
    }
}

/// First top-level member whose name mentions `word` and carries text
fn loose_text(value: &Value, word: &str) -> Option<String> {
    value
        .as_object()?
        .iter()
        .filter(|(k, _)| k.to_lowercase().contains(word))
        .find_map(|(_, v)| text_of(v))
}

// ---- scalar fields ----

pub(crate) fn name(value: &Value) -> Option<String> {
    first_of(
        value,
        &[
            |v| text_at(v, &["details", "name"]),
            |v| text_at(v, &["name"]),
            |v| text_at(v, &["commandName"]),
        ],
    )
}

pub(crate) fn synopsis(value: &Value) -> Option<String> {
    first_of(
        value,
        &[
            |v| text_at(v, &["synopsis"]),
            |v| text_at(v, &["details", "description"]),
            |v| text_at(v, &["summary"]),
            |v| loose_text(v, "synopsis"),
        ],
    )
}

pub(crate) fn description(value: &Value) -> Option<String> {
    first_of(
        value,
        &[
            |v| text_at(v, &["description"]),
            |v| text_at(v, &["details", "detailedDescription"]),
            |v| loose_text(v, "description"),
        ],
    )
}

pub(crate) fn notes(value: &Value) -> Option<String> {
    first_of(
        value,
        &[
            |v| {
                let alerts: Vec<String> = as_list(path(v, &["alertSet", "alert"]))
                    .into_iter()
                    .filter_map(text_of)
                    .collect();
                (!alerts.is_empty()).then(|| alerts.join("\n\n"))
            },
            |v| text_at(v, &["notes"]),
            |v| loose_text(v, "note"),
        ],
    )
}

// ---- parameters and syntax ----

fn type_name(value: &Value) -> String {
    first_of(
        value,
        &[
            |v| text_at(v, &["type", "name"]),
            |v| text_at(v, &["typeName"]),
            |v| text_at(v, &["type"]),
            |v| text_at(v, &["parameterValue"]),
        ],
    )
    .unwrap_or_default()
}

fn aliases(value: &Value) -> Vec<String> {
    match get(value, "aliases") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(text_of)
            .flat_map(|a| parse_aliases(&a))
            .collect(),
        Some(other) => text_of(other).map(|a| parse_aliases(&a)).unwrap_or_default(),
        None => Vec::new(),
    }
}

/// One parameter object in any schema
pub(crate) fn parameter(value: &Value) -> Option<ParameterHelp> {
    let name = text_at(value, &["name"])?;
    Some(ParameterHelp {
        name: name.trim_start_matches('-').to_string(),
        type_name: type_name(value),
        description: text_at(value, &["description"]).unwrap_or_default(),
        position: text_at(value, &["position"]),
        required: flag_at(value, &["required"]).or_else(|| flag_at(value, &["isMandatory"])),
        pipeline_input: first_of(
            value,
            &[
                |v| text_at(v, &["pipelineInput"]),
                |v| text_at(v, &["acceptPipelineInput"]),
            ],
        )
        .unwrap_or_default(),
        supports_wildcards: flag_at(value, &["globbing"])
            .or_else(|| flag_at(value, &["supportsWildcards"])),
        default_value: text_at(value, &["defaultValue"])
            .filter(|d| !d.eq_ignore_ascii_case("none")),
        aliases: aliases(value),
    })
}

/// Detailed parameter catalogue in declaration order
pub(crate) fn parameters(value: &Value) -> Vec<ParameterHelp> {
    collection(value, &[&["parameters", "parameter"]], &["parameters"])
        .into_iter()
        .filter_map(parameter)
        .collect()
}

fn set_name(item: &Value, index: usize, total: usize) -> String {
    first_of(
        item,
        &[
            |v| text_at(v, &["parameterSetName"]),
            |v| text_at(v, &["setName"]),
        ],
    )
    .unwrap_or_else(|| default_set_name(index, total))
}

/// "Default" for a lone set, "Set N" otherwise
pub(crate) fn default_set_name(index: usize, total: usize) -> String {
    if total <= 1 {
        "Default".to_string()
    } else {
        format!("Set {}", index + 1)
    }
}

/// Syntax sets, enriched from the parameter catalogue by name
pub(crate) fn syntax(value: &Value, catalogue: &[ParameterHelp]) -> Vec<SyntaxSet> {
    let items = collection(
        value,
        &[&["syntax", "syntaxItem"]],
        &["syntax", "parameterSets"],
    );

    let total = items.len();
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let parameters = collection(item, &[&["parameter"], &["parameters"]], &[])
                .into_iter()
            .filter_map(parameter)
            .map(|p| match catalogue.iter().find(|c| c.name.eq_ignore_ascii_case(&p.name)) {
                Some(entry) => p.enriched_from(entry),
                None => p,
            })
            .collect();
            SyntaxSet::new(&set_name(item, index, total), parameters)
        })
        .collect()
}

// ---- examples, types and links ----

/// A structured example before segmentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StructuredExample {
    pub title: String,
    /// Prompt introduction joined with the code
    pub body: String,
    /// Remarks the producer already separated out
    pub remarks: String,
}

pub(crate) fn examples(value: &Value) -> Vec<StructuredExample> {
    collection(value, &[&["examples", "example"]], &["examples"])
        .into_iter()
        .map(|item| {
            let introduction = text_at(item, &["introduction"]).unwrap_or_default();
            let code = text_at(item, &["code"]).unwrap_or_default();
            let body = if introduction.is_empty() {
                code
            } else if introduction.ends_with('>') {
                format!("{} {}", introduction, code)
            } else {
                format!("{}\n{}", introduction, code)
            };
            StructuredExample {
                title: text_at(item, &["title"]).unwrap_or_default(),
                body,
                remarks: text_at(item, &["remarks"]).unwrap_or_default(),
            }
        })
        .collect()
}

fn type_entries(items: Vec<&Value>) -> Vec<TypeHelp> {
    items
        .into_iter()
        .filter_map(|item| {
            let name = match item {
                Value::String(_) => text_of(item),
                _ => text_at(item, &["type", "name"]).or_else(|| text_at(item, &["name"])),
            }?;
            Some(TypeHelp {
                name,
                description: text_at(item, &["description"]).unwrap_or_default(),
            })
        })
        .collect()
}

pub(crate) fn inputs(value: &Value) -> Vec<TypeHelp> {
    type_entries(collection(value, &[&["inputTypes", "inputType"]], &["inputs"]))
}

pub(crate) fn outputs(value: &Value) -> Vec<TypeHelp> {
    type_entries(collection(value, &[&["returnValues", "returnValue"]], &["outputs"]))
}

pub(crate) fn related_links(value: &Value) -> Vec<RelatedLink> {
    collection(
        value,
        &[&["relatedLinks", "navigationLink"]],
        &["relatedLinks", "links"],
    )
    .into_iter()
        .filter_map(|item| {
            let uri = text_at(item, &["uri"]).or_else(|| text_at(item, &["url"]));
            let text = match item {
                Value::String(_) => text_of(item),
                _ => text_at(item, &["linkText"]).or_else(|| text_at(item, &["text"])),
            };
            match (text, uri) {
                (Some(text), uri) => Some(RelatedLink { text, uri }),
                (None, Some(uri)) => Some(RelatedLink {
                    text: uri.clone(),
                    uri: Some(uri),
                }),
                (None, None) => None,
            }
        })
        .collect()
}
