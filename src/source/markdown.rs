//! Markdown helpers for titling supplemental documents

use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};

/// Text of the first top-level heading, falling back to the first heading of any level
pub fn first_heading(content: &str) -> Option<String> {
    let mut in_heading = false;
    let mut heading_level = HeadingLevel::H1;
    let mut heading_text = String::new();
    let mut fallback: Option<String> = None;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                in_heading = true;
                heading_level = level;
                heading_text.clear();
            }
            Event::End(TagEnd::Heading(_)) => {
                in_heading = false;
                let text = heading_text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                if heading_level == HeadingLevel::H1 {
                    return Some(text);
                }
                if fallback.is_none() {
                    fallback = Some(text);
                }
            }
            Event::Text(text) if in_heading => {
                heading_text.push_str(&text);
            }
            Event::Code(code) if in_heading => {
                heading_text.push_str(&code);
            }
            _ => {}
        }
    }

    fallback
}

/// Title for a document file: its first heading for markdown, else the file stem
pub fn document_title(file_name: &str, content: &str) -> String {
    let is_markdown = file_name
        .rsplit_once('.')
        .map(|(_, ext)| matches!(ext.to_lowercase().as_str(), "md" | "markdown" | "mdx"))
        .unwrap_or(false);

    if is_markdown {
        if let Some(heading) = first_heading(content) {
            return heading;
        }
    }

    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(file_name)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_heading_prefers_h1() {
        let content = "## Overview\n\ntext\n\n# Getting `started`\n";
        assert_eq!(first_heading(content).as_deref(), Some("Getting started"));
    }

    #[test]
    fn test_first_heading_falls_back_to_any_level() {
        let content = "intro\n\n### Details\n";
        assert_eq!(first_heading(content).as_deref(), Some("Details"));
        assert_eq!(first_heading("no headings"), None);
    }

    #[test]
    fn test_document_title() {
        assert_eq!(document_title("guide.md", "# User Guide\n"), "User Guide");
        assert_eq!(document_title("guide.md", "plain"), "guide");
        assert_eq!(document_title("Install.ps1", "# not markdown"), "Install");
        assert_eq!(document_title(".profile", ""), ".profile");
    }
}
