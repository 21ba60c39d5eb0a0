//! Segmentation strategies

use super::lines::{is_code_marker, is_prompt_line, looks_like_code, looks_like_prose, DepthTracker};
use super::{join_trimmed, mode, Segmented};

/// One rule for splitting an example body
pub trait SegmentStrategy: Send + Sync {
    /// Strategy name
    fn name(&self) -> &str;

    /// A definite segmentation, or `None` for "no opinion"
    fn segment(&self, lines: &[&str]) -> Option<Segmented>;
}

/// Interactive prompts mark the code; everything else is remarks
pub struct PromptPriority;

impl SegmentStrategy for PromptPriority {
    fn name(&self) -> &str {
        mode::PROMPT_PRIORITY
    }

    fn segment(&self, lines: &[&str]) -> Option<Segmented> {
        if !lines.iter().any(|l| is_prompt_line(l)) {
            return None;
        }

        let (code, remarks): (Vec<&str>, Vec<&str>) =
            lines.iter().copied().partition(|l| is_code_marker(l));

        Some(Segmented::new(
            join_trimmed(&code),
            join_trimmed(&remarks),
            mode::PROMPT_PRIORITY,
        ))
    }
}

/// Splits off trailing narrative after the last complete code statement
pub struct NarrativeTail;

impl SegmentStrategy for NarrativeTail {
    fn name(&self) -> &str {
        mode::NARRATIVE_TAIL
    }

    fn segment(&self, lines: &[&str]) -> Option<Segmented> {
        let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
        if !looks_like_prose(lines[last]) {
            return None;
        }

        for boundary in (0..last).rev() {
            if !looks_like_code(lines[boundary]) {
                continue;
            }

            let depth = DepthTracker::of_example_lines(lines[..=boundary].iter().copied());
            if !depth.is_balanced() {
                tracing::trace!("Rejecting example boundary at line {}", boundary + 1);
                continue;
            }

            let remarks = join_trimmed(&lines[boundary + 1..]);
            if remarks.is_empty() {
                return None;
            }
            return Some(Segmented::new(
                join_trimmed(&lines[..=boundary]),
                remarks,
                mode::NARRATIVE_TAIL,
            ));
        }

        None
    }
}

/// The conservative default: everything is code
pub struct WholeBlock;

impl SegmentStrategy for WholeBlock {
    fn name(&self) -> &str {
        mode::WHOLE_BLOCK
    }

    fn segment(&self, lines: &[&str]) -> Option<Segmented> {
        Some(Segmented::new(join_trimmed(lines), "", mode::WHOLE_BLOCK))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn test_prompt_priority_has_no_opinion_without_prompt() {
        assert!(PromptPriority.segment(&split("$x = 1\nWrite-Output $x")).is_none());
    }

    #[test]
    fn test_prompt_priority_keeps_continuations_and_comments() {
        let lines = split("PS> Get-Item `\n    -Path C:\\temp\n# the item\nMode  Name\nd---- temp");
        let result = PromptPriority.segment(&lines).unwrap();
        assert_eq!(result.code, "PS> Get-Item `\n    -Path C:\\temp\n# the item");
        assert_eq!(result.remarks, "Mode  Name\nd---- temp");
    }

    #[test]
    fn test_prompt_priority_keeps_listing_rows_together() {
        let lines = split("PS C:\\> Get-ChildItem\n\nMode                 LastWriteTime         Length Name\n----                 -------------         ------ ----\n-a---           1/1/2024 10:00 AM             12 file.txt");
        let result = PromptPriority.segment(&lines).unwrap();
        assert_eq!(result.code, "PS C:\\> Get-ChildItem");
        assert!(result.remarks.starts_with("Mode"));
        assert!(result.remarks.ends_with("file.txt"));
    }

    #[test]
    fn test_prompt_priority_trims_partition_edges() {
        // Each partition keeps its lines in order but drops blank lines at its edges
        let lines = split("\nPS> Get-Thing\n\nfirst result\n\nsecond result\n\n");
        let result = PromptPriority.segment(&lines).unwrap();
        assert_eq!(result.code, "PS> Get-Thing");
        assert_eq!(result.remarks, "first result\n\nsecond result");
    }

    #[test]
    fn test_narrative_tail_ignores_apostrophes_in_prose() {
        let lines = split("$a = Get-Thing\nIt's fine to run this twice.\n$b = $a.Count\nThis prints how many things exist.");
        let result = NarrativeTail.segment(&lines).unwrap();
        assert_eq!(result.code, "$a = Get-Thing\nIt's fine to run this twice.\n$b = $a.Count");
        assert_eq!(result.remarks, "This prints how many things exist.");
    }

    #[test]
    fn test_narrative_tail_needs_prose_ending() {
        assert!(NarrativeTail.segment(&split("$x = 1\nGet-Thing")).is_none());
        assert!(NarrativeTail.segment(&split("Some words here only")).is_none());
    }

    #[test]
    fn test_narrative_tail_rejects_open_here_string() {
        let lines = split("$text = @\"\nfirst line of the text.\nsecond line of the text.");
        assert!(NarrativeTail.segment(&lines).is_none());
    }

    #[test]
    fn test_narrative_tail_skips_unbalanced_boundary() {
        let lines = split(
            "$items = Get-Thing\nforeach ($i in $items) {\n    $i.Name\n}\nThe loop prints each name.",
        );
        let result = NarrativeTail.segment(&lines).unwrap();
        assert_eq!(
            result.code,
            "$items = Get-Thing\nforeach ($i in $items) {\n    $i.Name\n}"
        );
        assert_eq!(result.remarks, "The loop prints each name.");

        // Without the closing brace every boundary inside the block is rejected
        let lines = split(
            "$items = Get-Thing\nforeach ($i in $items) {\n    $i.Name\nThe loop prints each name.",
        );
        let result = NarrativeTail.segment(&lines).unwrap();
        assert_eq!(result.code, "$items = Get-Thing");
        assert_eq!(
            result.remarks,
            "foreach ($i in $items) {\n    $i.Name\nThe loop prints each name."
        );
    }

    #[test]
    fn test_whole_block_trims_blank_edges() {
        let result = WholeBlock.segment(&split("\n\n$x = 1\n\n")).unwrap();
        assert_eq!(result.code, "$x = 1");
        assert_eq!(result.remarks, "");
    }
}
