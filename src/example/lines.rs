//! Line-level markers used to tell example code from narrative

/// Keywords that open a block or statement
const BLOCK_KEYWORDS: &[&str] = &[
    "begin", "catch", "class", "do", "else", "elseif", "end", "enum", "filter", "finally", "for",
    "foreach", "function", "if", "param", "process", "return", "switch", "throw", "trap", "try",
    "until", "while", "workflow",
];

/// Interactive prompt (`PS>`, `PS C:\>`) or drive path (`C:\`)
pub fn is_prompt_line(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("PS>") || t.starts_with("PS ") || is_drive_path(t)
}

/// `X:\` at the start of the text
pub fn is_drive_path(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(d), Some(':'), Some('\\')) if d.is_ascii_alphabetic()
    )
}

/// Comment or block-comment delimiter at the start of the line
pub fn is_comment(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('#') || t.starts_with("<#") || t.starts_with("//")
}

/// Starts with a variable sigil
pub fn starts_with_variable(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('$') || t.starts_with("@{") || t.starts_with("@(")
}

/// Starts with a parameter-name token such as `-Path` or `-Force:$true`
///
/// Mode columns of directory listings (`-a---`) are not parameter names.
pub fn starts_with_flag(line: &str) -> bool {
    let token = line.split_whitespace().next().unwrap_or("");
    let Some(name) = token.strip_prefix('-') else {
        return false;
    };
    let name = name.split(':').next().unwrap_or("");
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `name = value`, `name += value` and friends
pub fn is_assignment(line: &str) -> bool {
    let t = line.trim();
    let Some(eq) = t.find('=') else {
        return false;
    };
    let before = &t[..eq];
    let after = &t[eq + 1..];
    if after.starts_with('=') || before.is_empty() {
        return false;
    }
    let target = before
        .trim_end()
        .trim_end_matches(&['+', '-', '*', '/', '%'][..])
        .trim_end();
    !target.is_empty()
        && !target.contains(char::is_whitespace)
        && target
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '$' | '_' | '.' | '[' | ']' | ':' | '"' | '\''))
}

/// Starts with a lowercase block-opening keyword followed by a delimiter
pub fn starts_with_keyword(line: &str) -> bool {
    let t = line.trim_start();
    let word: String = t.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if !BLOCK_KEYWORDS.contains(&word.as_str()) {
        return false;
    }
    match t[word.len()..].chars().next() {
        None => true,
        Some(c) => c == '(' || c == '{' || c.is_whitespace(),
    }
}

/// Verb-Noun command invocation such as `Get-Item`
pub fn starts_with_command(line: &str) -> bool {
    let t = line.trim_start();
    let token = t.split_whitespace().next().unwrap_or("");
    let Some((verb, noun)) = token.split_once('-') else {
        return false;
    };
    let mut verb_chars = verb.chars();
    verb_chars.next().is_some_and(|c| c.is_ascii_uppercase())
        && verb_chars.all(|c| c.is_ascii_alphabetic())
        && noun.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && noun
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

/// Closing delimiter of a block, call or here-string
pub fn is_closing(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with('}')
        || t.starts_with(')')
        || t.starts_with("\"@")
        || t.starts_with("'@")
        || t.starts_with("#>")
}

/// Structural code: pipelines, blocks, script invocations, continuations
fn is_code_construct(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|')
        || t.starts_with('{')
        || t.starts_with('(')
        || t.starts_with('&')
        || t.starts_with(".\\")
        || t.starts_with("./")
        || t.ends_with('{')
        || t.ends_with('`')
        || t.ends_with('|')
}

/// Line matches any code marker: prompt, path, comment or code construct
pub fn is_code_marker(line: &str) -> bool {
    is_prompt_line(line) || is_comment(line) || looks_like_code(line) || is_code_construct(line)
}

/// Line "looks like code" for the narrative-tail boundary scan
pub fn looks_like_code(line: &str) -> bool {
    starts_with_variable(line)
        || starts_with_flag(line)
        || is_assignment(line)
        || starts_with_keyword(line)
        || is_comment(line)
        || is_closing(line)
        || starts_with_command(line)
}

/// Line reads like a sentence of narrative text
pub fn looks_like_prose(line: &str) -> bool {
    let t = line.trim();
    if t.is_empty() || looks_like_code(line) || is_prompt_line(line) || is_code_construct(line) {
        return false;
    }
    t.chars().next().is_some_and(|c| c.is_alphabetic()) && t.split_whitespace().count() >= 3
}

/// Nesting state of the code seen so far
#[derive(Debug, Default, Clone)]
pub struct DepthTracker {
    braces: i32,
    parens: i32,
    in_single: bool,
    in_double: bool,
    here_string: Option<char>,
    block_comment: bool,
}

impl DepthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the depth across several lines
    pub fn of_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tracker = Self::new();
        for line in lines {
            tracker.feed(line);
        }
        tracker
    }

    /// Track the depth across example lines, skipping narrative lines
    /// between statements
    pub fn of_example_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tracker = Self::new();
        for line in lines {
            tracker.feed_example_line(line);
        }
        tracker
    }

    /// Advance over one example line; prose outside strings and comments
    /// carries no code structure
    pub fn feed_example_line(&mut self, line: &str) {
        let in_text =
            self.here_string.is_some() || self.block_comment || self.in_single || self.in_double;
        if !in_text && looks_like_prose(line) {
            return;
        }
        self.feed(line);
    }

    /// Whether every opened construct has been closed
    pub fn is_balanced(&self) -> bool {
        self.braces == 0
            && self.parens == 0
            && !self.in_single
            && !self.in_double
            && self.here_string.is_none()
            && !self.block_comment
    }

    /// Advance over one line
    pub fn feed(&mut self, line: &str) {
        if let Some(quote) = self.here_string {
            let t = line.trim_start();
            if t.starts_with(quote) && t[quote.len_utf8()..].starts_with('@') {
                self.here_string = None;
            }
            return;
        }

        let chars: Vec<char> = line.trim_end().chars().collect();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let next = chars.get(i + 1).copied();

            if self.block_comment {
                if c == '#' && next == Some('>') {
                    self.block_comment = false;
                    i += 2;
                    continue;
                }
                i += 1;
                continue;
            }

            if self.in_single {
                if c == '\'' {
                    self.in_single = false;
                }
                i += 1;
                continue;
            }

            if self.in_double {
                match c {
                    '`' => i += 2,
                    '"' => {
                        self.in_double = false;
                        i += 1;
                    }
                    _ => i += 1,
                }
                continue;
            }

            match c {
                '`' => {
                    i += 2;
                    continue;
                }
                '<' if next == Some('#') => {
                    self.block_comment = true;
                    i += 2;
                    continue;
                }
                '#' => break,
                '@' if matches!(next, Some('"') | Some('\'')) && i + 2 == chars.len() => {
                    self.here_string = next;
                    break;
                }
                '\'' => self.in_single = true,
                '"' => self.in_double = true,
                '{' => self.braces += 1,
                '}' => self.braces -= 1,
                '(' => self.parens += 1,
                ')' => self.parens -= 1,
                _ => {}
            }
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_markers() {
        assert!(is_prompt_line("PS> Get-Item ."));
        assert!(is_prompt_line("  PS C:\\> Get-Item ."));
        assert!(is_prompt_line("C:\\Windows\\System32"));
        assert!(!is_prompt_line("PSReadLine is loaded"));
        assert!(!is_prompt_line("Name: value"));
    }

    #[test]
    fn test_code_looking_lines() {
        assert!(looks_like_code("$x = 1"));
        assert!(looks_like_code("    -Path C:\\temp"));
        assert!(looks_like_code("count += 1"));
        assert!(looks_like_code("foreach ($i in $items) {"));
        assert!(looks_like_code("# comment"));
        assert!(looks_like_code("}"));
        assert!(looks_like_code("Get-ChildItem -Recurse"));
        assert!(!looks_like_code("This command lists items."));
        assert!(!looks_like_code("If you want more, see below."));
        assert!(!looks_like_code("- a bullet point"));
        assert!(!looks_like_code("a == b is a comparison"));
    }

    #[test]
    fn test_flag_needs_parameter_name() {
        assert!(starts_with_flag("-Force:$true"));
        assert!(starts_with_flag("  -Path_2 x"));
        assert!(!starts_with_flag("-a---          1/1/2024  10:00 AM    12 file.txt"));
        assert!(!starts_with_flag("------   ----"));
        assert!(!starts_with_flag("- a bullet point"));
    }

    #[test]
    fn test_keyword_needs_delimiter() {
        assert!(starts_with_keyword("if ($x) {"));
        assert!(starts_with_keyword("try{"));
        assert!(!starts_with_keyword("iffy results"));
        assert!(!starts_with_keyword("Ending soon"));
    }

    #[test]
    fn test_prose_detection() {
        assert!(looks_like_prose("This example lists the names."));
        assert!(!looks_like_prose("Get-Thing -Name x"));
        assert!(!looks_like_prose("Done."));
        assert!(!looks_like_prose(""));
    }

    #[test]
    fn test_depth_tracker_braces_and_quotes() {
        let open = DepthTracker::of_lines(["Get-Thing | ForEach-Object {", "    $_.Name"]);
        assert!(!open.is_balanced());

        let closed = DepthTracker::of_lines(["Get-Thing | ForEach-Object {", "    $_.Name", "}"]);
        assert!(closed.is_balanced());

        let quoted = DepthTracker::of_lines(["$s = 'a { b'", "Write-Host \"x ( `\" y\""]);
        assert!(quoted.is_balanced());

        let commented = DepthTracker::of_lines(["$x = 1 # don't {"]);
        assert!(commented.is_balanced());
    }

    #[test]
    fn test_example_lines_ignore_prose_apostrophes() {
        let lines = ["$a = Get-Thing", "It's fine to run this twice.", "$b = $a.Count"];
        assert!(!DepthTracker::of_lines(lines).is_balanced());
        assert!(DepthTracker::of_example_lines(lines).is_balanced());

        // Inside an open here-string every line is text
        let lines = ["$text = @'", "It's part of the text.", "'@"];
        assert!(DepthTracker::of_example_lines(lines).is_balanced());
        assert!(!DepthTracker::of_example_lines(lines[..2].iter().copied()).is_balanced());
    }

    #[test]
    fn test_depth_tracker_here_strings_and_block_comments() {
        let mut tracker = DepthTracker::new();
        tracker.feed("$text = @\"");
        tracker.feed("Some { unbalanced text.");
        assert!(!tracker.is_balanced());
        tracker.feed("\"@");
        assert!(tracker.is_balanced());

        let mut tracker = DepthTracker::new();
        tracker.feed("<# start");
        tracker.feed("still { comment");
        assert!(!tracker.is_balanced());
        tracker.feed("#>");
        assert!(tracker.is_balanced());
    }
}
