//! Raw help text dumps
//!
//! A dump is a sequence of sections introduced by canonical header lines.
//! Headers match by exact, case-insensitive, trimmed line equality, and a
//! section runs until the next recognized header of any type. A dashed
//! example banner outside EXAMPLES also opens the examples section, since
//! full help output lists its examples without that header.

use super::schema::default_set_name;
use super::{parse_aliases, parse_flag, ParameterHelp, RelatedLink, SyntaxSet, TypeHelp};
use crate::example::lines::starts_with_command;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Canonical section of a help dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Name,
    Synopsis,
    Syntax,
    Description,
    Parameters,
    Examples,
    Inputs,
    Outputs,
    Notes,
    RelatedLinks,
}

impl Section {
    pub const ALL: [Section; 10] = [
        Section::Name,
        Section::Synopsis,
        Section::Syntax,
        Section::Description,
        Section::Parameters,
        Section::Examples,
        Section::Inputs,
        Section::Outputs,
        Section::Notes,
        Section::RelatedLinks,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Section::Name => "NAME",
            Section::Synopsis => "SYNOPSIS",
            Section::Syntax => "SYNTAX",
            Section::Description => "DESCRIPTION",
            Section::Parameters => "PARAMETERS",
            Section::Examples => "EXAMPLES",
            Section::Inputs => "INPUTS",
            Section::Outputs => "OUTPUTS",
            Section::Notes => "NOTES",
            Section::RelatedLinks => "RELATED LINKS",
        }
    }

    /// The section a line introduces, if it is a header line
    pub fn from_header(line: &str) -> Option<Section> {
        let line = line.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.header().eq_ignore_ascii_case(line))
    }
}

/// Section bodies of one dump
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSections {
    sections: BTreeMap<Section, String>,
}

impl RawSections {
    /// Split a dump into sections; text before the first header is dropped
    pub fn parse(text: &str) -> Self {
        let mut sections: BTreeMap<Section, Vec<&str>> = BTreeMap::new();
        let mut current: Option<Section> = None;

        for line in text.lines() {
            if let Some(section) = Section::from_header(line) {
                current = Some(section);
                sections.entry(section).or_default();
                continue;
            }
            if current != Some(Section::Examples) && example_banner(line) {
                current = Some(Section::Examples);
            }
            if let Some(section) = current {
                sections.entry(section).or_default().push(line);
            }
        }

        Self {
            sections: sections
                .into_iter()
                .map(|(section, lines)| (section, lines.join("\n")))
                .collect(),
        }
    }

    /// Body of a section; `None` when the header never appeared
    pub fn get(&self, section: Section) -> Option<&str> {
        self.sections.get(&section).map(String::as_str)
    }

    /// Body of a section when it carries any text
    pub fn non_empty(&self, section: Section) -> Option<&str> {
        self.get(section).filter(|body| !body.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> impl Iterator<Item = Section> + '_ {
        self.sections.keys().copied()
    }
}

/// Remove the indentation common to all non-blank lines
pub(crate) fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let lines: Vec<&str> = text
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                l.get(indent..).unwrap_or_else(|| l.trim_start())
            }
        })
        .map(str::trim_end)
        .collect();
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |e| e + 1);
    lines[start..end].join("\n")
}

/// Paragraph text: lines trimmed, runs of blank lines collapsed to one
pub(crate) fn paragraph(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && out.last().is_none_or(|l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

// ---- syntax ----

static SYNTAX_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[|\]|<[^>]*>|-[A-Za-z][\w]*|[^\s\[\]<>]+").expect("valid regex")
});

/// One set per invocation line; continuation lines join the current set
pub(crate) fn parse_syntax(text: &str, command: &str) -> Vec<SyntaxSet> {
    let mut invocations: Vec<String> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let first = line.split_whitespace().next().unwrap_or("");
        let starts_invocation = if command.is_empty() {
            starts_with_command(line)
        } else {
            first.eq_ignore_ascii_case(command)
        };

        if starts_invocation {
            invocations.push(line.to_string());
        } else if let Some(current) = invocations.last_mut() {
            current.push(' ');
            current.push_str(line);
        }
    }

    let total = invocations.len();
    invocations
        .iter()
        .enumerate()
        .map(|(index, line)| SyntaxSet::new(&default_set_name(index, total), syntax_parameters(line)))
        .collect()
}

/// Parameters of one invocation line, in usage order
fn syntax_parameters(line: &str) -> Vec<ParameterHelp> {
    let tokens: Vec<&str> = SYNTAX_TOKEN.find_iter(line).map(|m| m.as_str()).collect();
    let mut parameters = Vec::new();
    let mut depth: i32 = 0;
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        match token {
            "[" => depth += 1,
            "]" => depth = (depth - 1).max(0),
            t if t.starts_with('-') && t.len() > 1 => {
                // `[-Name] <Type>`: the brackets only make the name positional
                let positional = i > 0
                    && tokens[i - 1] == "["
                    && tokens.get(i + 1).copied() == Some("]")
                    && tokens.get(i + 2).is_some_and(|v| is_type_token(v));
                let effective = if positional { depth - 1 } else { depth };

                let mut parameter = ParameterHelp::named(&t[1..]);
                parameter.required = Some(effective == 0);

                let mut next = i + 1;
                if positional {
                    next += 1;
                    depth -= 1;
                }
                if let Some(value) = tokens.get(next).filter(|v| is_type_token(v)) {
                    parameter.type_name = value[1..value.len() - 1].trim().to_string();
                    next += 1;
                }
                parameters.push(parameter);
                i = next;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    parameters
}

fn is_type_token(token: &str) -> bool {
    token.starts_with('<')
        && token.ends_with('>')
        && !token.eq_ignore_ascii_case("<CommonParameters>")
}

// ---- parameters ----

/// `-Name <Type>` headed blocks with labelled attribute lines
pub(crate) fn parse_parameters(text: &str) -> Vec<ParameterHelp> {
    let mut parameters: Vec<ParameterHelp> = Vec::new();
    let mut description: Vec<&str> = Vec::new();

    let flush = |parameter: Option<&mut ParameterHelp>, description: &mut Vec<&str>| {
        if let Some(parameter) = parameter {
            parameter.description = paragraph(&description.join("\n"));
        }
        description.clear();
    };

    for line in text.lines() {
        let t = line.trim();

        if let Some(header) = parameter_header(t) {
            flush(parameters.last_mut(), &mut description);
            parameters.push(header);
            continue;
        }

        let Some(current) = parameters.last_mut() else {
            continue;
        };

        match attribute(t) {
            Some((label, value)) => apply_attribute(current, label, value),
            None => description.push(t),
        }
    }
    flush(parameters.last_mut(), &mut description);

    parameters
}

fn parameter_header(line: &str) -> Option<ParameterHelp> {
    let rest = line.strip_prefix('-')?;
    let mut parts = rest.splitn(2, char::is_whitespace);
    let name = parts.next()?;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let remainder = parts.next().unwrap_or("").trim();
    let remainder = remainder
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(remainder);
    if !remainder.is_empty() && !(remainder.starts_with('<') && remainder.ends_with('>')) {
        return None;
    }

    let mut parameter = ParameterHelp::named(name);
    if remainder.len() > 2 {
        parameter.type_name = remainder[1..remainder.len() - 1].trim().to_string();
    }
    Some(parameter)
}

const ATTRIBUTE_LABELS: &[&str] = &[
    "required?",
    "position?",
    "default value",
    "accept pipeline input?",
    "accept wildcard characters?",
    "aliases",
];

/// `Label   value` lines; the label is matched case-insensitively
fn attribute(line: &str) -> Option<(&'static str, &str)> {
    ATTRIBUTE_LABELS.iter().find_map(|label| {
        let head = line.get(..label.len())?;
        let rest = &line[label.len()..];
        let delimited = rest
            .chars()
            .next()
            .is_none_or(|c| c.is_whitespace() || c == ':');
        (head.eq_ignore_ascii_case(label) && delimited)
            .then(|| (*label, rest.trim_start_matches(':').trim()))
    })
}

fn apply_attribute(parameter: &mut ParameterHelp, label: &str, value: &str) {
    match label {
        "required?" => parameter.required = parse_flag(value),
        "position?" => parameter.position = Some(value.to_string()).filter(|v| !v.is_empty()),
        "default value" => {
            parameter.default_value =
                Some(value.to_string()).filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("none"))
        }
        "accept pipeline input?" => parameter.pipeline_input = value.to_string(),
        "accept wildcard characters?" => parameter.supports_wildcards = parse_flag(value),
        "aliases" => parameter.aliases = parse_aliases(value),
        _ => {}
    }
}

// ---- examples ----

/// Marker line: `EXAMPLE` after trimming and stripping leading dashes,
/// followed by a non-letter or the end of the line
pub(crate) fn example_marker(line: &str) -> Option<&str> {
    let t = line.trim().trim_start_matches('-').trim_start();
    let head = t.get(..7)?;
    if !head.eq_ignore_ascii_case("example") {
        return None;
    }
    let rest = &t[7..];
    match rest.chars().next() {
        Some(c) if c.is_alphabetic() => None,
        _ => Some(rest),
    }
}

/// Marker line decorated with leading dashes, as full help output prints it
fn example_banner(line: &str) -> bool {
    line.trim_start().starts_with('-') && example_marker(line).is_some()
}

/// Title from the text following the marker word
pub(crate) fn example_title(rest: &str, ordinal: usize) -> String {
    let title = rest
        .trim()
        .trim_end_matches('-')
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit())
        .trim_start_matches([':', '.', '-'])
        .trim();
    if title.is_empty() {
        format!("Example {}", ordinal)
    } else {
        title.to_string()
    }
}

/// Example title and body pairs; a section without markers is one example
pub(crate) fn split_examples(text: &str) -> Vec<(String, String)> {
    let mut examples: Vec<(String, Vec<&str>)> = Vec::new();
    let mut preamble: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(rest) = example_marker(line) {
            examples.push((example_title(rest, examples.len() + 1), Vec::new()));
            continue;
        }
        match examples.last_mut() {
            Some((_, body)) => body.push(line),
            None => preamble.push(line),
        }
    }

    if examples.is_empty() {
        let body = dedent(&preamble.join("\n"));
        if body.is_empty() {
            return Vec::new();
        }
        return vec![("Example 1".to_string(), body)];
    }

    examples
        .into_iter()
        .map(|(title, body)| (title, dedent(&body.join("\n"))))
        .collect()
}

// ---- inputs, outputs, links ----

/// Blank-line separated blocks; the first line names the type
pub(crate) fn parse_types(text: &str) -> Vec<TypeHelp> {
    let mut types = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    let mut flush = |block: &mut Vec<&str>| {
        if let Some((name, rest)) = block.split_first() {
            types.push(TypeHelp {
                name: name.to_string(),
                description: paragraph(&rest.join("\n")),
            });
        }
        block.clear();
    };

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            flush(&mut block);
        } else {
            block.push(line);
        }
    }
    flush(&mut block);

    types
}

fn is_url(text: &str) -> bool {
    let lower = text.to_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// One link per line; a trailing URL is split from its label
pub(crate) fn parse_links(text: &str) -> Vec<RelatedLink> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|line| {
            if is_url(line) {
                return RelatedLink {
                    text: line.to_string(),
                    uri: Some(line.to_string()),
                };
            }
            match line.rsplit_once(char::is_whitespace) {
                Some((label, uri)) if is_url(uri) => RelatedLink {
                    text: label.trim().trim_end_matches(':').trim().to_string(),
                    uri: Some(uri.to_string()),
                },
                _ => RelatedLink {
                    text: line.to_string(),
                    uri: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_match_exact_lines_only() {
        assert_eq!(Section::from_header("  related links "), Some(Section::RelatedLinks));
        assert_eq!(Section::from_header("Synopsis"), Some(Section::Synopsis));
        assert_eq!(Section::from_header("SYNOPSIS:"), None);
        assert_eq!(Section::from_header("The NAME of it"), None);
    }

    #[test]
    fn test_section_ends_at_next_header() {
        let sections = RawSections::parse("NAME\n    Get-Thing\n\nSYNOPSIS\n    Gets it.\nNOTES\n");
        assert_eq!(sections.get(Section::Name).map(paragraph).as_deref(), Some("Get-Thing"));
        assert_eq!(sections.get(Section::Synopsis).map(paragraph).as_deref(), Some("Gets it."));
        assert_eq!(sections.get(Section::Notes), Some(""));
        assert!(sections.non_empty(Section::Notes).is_none());
        assert!(sections.get(Section::Examples).is_none());
    }

    #[test]
    fn test_dashed_banner_opens_examples() {
        let text = "NOTES\n    Use with care.\n\n    ------------ Example 1: Get the current directory ------------\n\n    Get-Item .\n\nRELATED LINKS\n    Get-ChildItem\n";
        let sections = RawSections::parse(text);
        assert_eq!(sections.get(Section::Notes).map(paragraph).as_deref(), Some("Use with care."));

        let examples = split_examples(sections.get(Section::Examples).unwrap());
        assert_eq!(examples, vec![("Get the current directory".to_string(), "Get-Item .".to_string())]);
        assert_eq!(sections.get(Section::RelatedLinks).map(paragraph).as_deref(), Some("Get-ChildItem"));
    }

    #[test]
    fn test_undecorated_example_line_stays_in_section() {
        let sections = RawSections::parse("DESCRIPTION\n    Example: pass a path.\n");
        assert_eq!(
            sections.get(Section::Description).map(paragraph).as_deref(),
            Some("Example: pass a path.")
        );
        assert!(sections.get(Section::Examples).is_none());
    }

    #[test]
    fn test_syntax_sets_and_required() {
        let text = "    Get-Thing [-Path] <String[]> [-Filter <String>] -Mode <Int32> [-Force]\n    [<CommonParameters>]\n\n    Get-Thing [[-Id] <Int32>] [-Force] [-Force]";
        let sets = parse_syntax(text, "Get-Thing");
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].name, "Set 1");
        assert_eq!(sets[0].parameter_names(), vec!["Path", "Filter", "Mode", "Force"]);

        let required: Vec<Option<bool>> = sets[0].parameters.iter().map(|p| p.required).collect();
        assert_eq!(required, vec![Some(true), Some(false), Some(true), Some(false)]);
        assert_eq!(sets[0].parameters[0].type_name, "String[]");
        assert_eq!(sets[0].parameters[3].type_name, "");

        assert_eq!(sets[1].parameter_names(), vec!["Id", "Force"]);
        assert_eq!(sets[1].parameters[0].required, Some(false));
    }

    #[test]
    fn test_syntax_without_command_name() {
        let sets = parse_syntax("Foo-Bar [-X]", "");
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "Default");
        assert_eq!(sets[0].parameter_names(), vec!["X"]);
    }

    #[test]
    fn test_parameter_blocks() {
        let text = "    -Path <String[]>\n        Where to look.\n        More detail.\n\n        Required?                    true\n        Position?                    0\n        Default value                None\n        Accept pipeline input?       True (ByValue)\n        Accept wildcard characters?  false\n        Aliases                      PSPath, LP\n\n    -Force [<SwitchParameter>]\n        Overwrite.\n\n        Required?                    false\n";
        let parameters = parse_parameters(text);
        assert_eq!(parameters.len(), 2);

        let path = &parameters[0];
        assert_eq!(path.name, "Path");
        assert_eq!(path.type_name, "String[]");
        assert_eq!(path.description, "Where to look.\nMore detail.");
        assert_eq!(path.required, Some(true));
        assert_eq!(path.position.as_deref(), Some("0"));
        assert_eq!(path.default_value, None);
        assert_eq!(path.pipeline_input, "True (ByValue)");
        assert_eq!(path.supports_wildcards, Some(false));
        assert_eq!(path.aliases, vec!["PSPath", "LP"]);

        let force = &parameters[1];
        assert_eq!(force.type_name, "SwitchParameter");
        assert_eq!(force.description, "Overwrite.");
        assert_eq!(force.required, Some(false));
        assert_eq!(force.position, None);
    }

    #[test]
    fn test_example_markers() {
        assert!(example_marker("-------------------------- EXAMPLE 1 --------------------------").is_some());
        assert!(example_marker("Example").is_some());
        assert!(example_marker("Example 2: Get a thing").is_some());
        assert!(example_marker("Examples of usage").is_none());
        assert!(example_marker("An example follows").is_none());
    }

    #[test]
    fn test_split_examples_titles() {
        let text = "    --- EXAMPLE 1 ---\n\n    PS> Get-Thing\n\n    Example 2: Filter by name\n    Get-Thing -Name x\n";
        let examples = split_examples(text);
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0], ("Example 1".to_string(), "PS> Get-Thing".to_string()));
        assert_eq!(examples[1].0, "Filter by name");
        assert_eq!(examples[1].1, "Get-Thing -Name x");

        let unmarked = split_examples("    Get-Thing\n");
        assert_eq!(unmarked, vec![("Example 1".to_string(), "Get-Thing".to_string())]);
        assert!(split_examples("\n  \n").is_empty());
    }

    #[test]
    fn test_types_and_links() {
        let types = parse_types("    System.String\n        A path.\n\n    System.Int32\n");
        assert_eq!(types.len(), 2);
        assert_eq!(types[0].description, "A path.");
        assert_eq!(types[1].name, "System.Int32");

        let links = parse_links("    Online Version: https://example.org/get-thing\n    Set-Thing\n    https://example.org\n");
        assert_eq!(links[0].text, "Online Version");
        assert_eq!(links[0].uri.as_deref(), Some("https://example.org/get-thing"));
        assert_eq!(links[1].uri, None);
        assert_eq!(links[2].uri.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_dedent_keeps_relative_indent() {
        assert_eq!(dedent("    a {\n        b\n    }\n"), "a {\n    b\n}");
    }
}
