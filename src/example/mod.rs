//! Example segmentation
//!
//! Splits the raw body of a usage example into the code a reader would run
//! and the narrative that explains it. Segmentation is an ordered list of
//! strategies; the first one with an opinion wins.

pub mod lines;
mod strategy;

pub use strategy::{NarrativeTail, PromptPriority, SegmentStrategy, WholeBlock};

use serde::{Deserialize, Serialize};

/// Which rule produced a segmentation
pub mod mode {
    pub const EMPTY: &str = "empty";
    pub const PROMPT_PRIORITY: &str = "prompt-priority";
    pub const NARRATIVE_TAIL: &str = "narrative-tail";
    pub const WHOLE_BLOCK: &str = "whole-block";
}

/// An example body split into code and remarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segmented {
    pub code: String,
    pub remarks: String,
    /// Diagnostic tag naming the rule that fired
    pub mode: String,
}

impl Segmented {
    pub fn new(code: impl Into<String>, remarks: impl Into<String>, mode: &str) -> Self {
        Self {
            code: code.into(),
            remarks: remarks.into(),
            mode: mode.to_string(),
        }
    }

    pub fn empty() -> Self {
        Self::new("", "", mode::EMPTY)
    }
}

/// Classifies example bodies into code and remarks
pub struct ExampleSegmenter {
    strategies: Vec<Box<dyn SegmentStrategy>>,
}

impl ExampleSegmenter {
    /// Prompt priority, then whole block
    pub fn new() -> Self {
        Self {
            strategies: vec![Box::new(PromptPriority), Box::new(WholeBlock)],
        }
    }

    /// Prompt priority, then the narrative-tail boundary scan, then whole block
    pub fn strict() -> Self {
        Self {
            strategies: vec![
                Box::new(PromptPriority),
                Box::new(NarrativeTail),
                Box::new(WholeBlock),
            ],
        }
    }

    /// Build a segmenter from an explicit strategy list
    pub fn with_strategies(strategies: Vec<Box<dyn SegmentStrategy>>) -> Self {
        Self { strategies }
    }

    /// Names of the strategies, in evaluation order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Split a raw example body
    pub fn classify(&self, text: &str) -> Segmented {
        if text.trim().is_empty() {
            return Segmented::empty();
        }

        let text = text.replace("\r\n", "\n");
        let lines: Vec<&str> = text.lines().collect();

        for strategy in &self.strategies {
            if let Some(segmented) = strategy.segment(&lines) {
                tracing::trace!("Example segmented by {}", segmented.mode);
                return segmented;
            }
        }

        // Every chain ends in a strategy with an opinion; this covers custom chains
        WholeBlock.segment(&lines).unwrap_or_else(Segmented::empty)
    }
}

impl Default for ExampleSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// Join lines, dropping blank lines at either end
pub(crate) fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());
    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let segmenter = ExampleSegmenter::new();
        assert_eq!(segmenter.classify(""), Segmented::empty());
        assert_eq!(segmenter.classify("  \n\t\n").mode, mode::EMPTY);
    }

    #[test]
    fn test_no_signal_keeps_whole_block() {
        let segmenter = ExampleSegmenter::new();
        let result = segmenter.classify("$x = 1\n$y = 2");
        assert_eq!(result.code, "$x = 1\n$y = 2");
        assert_eq!(result.remarks, "");
        assert_eq!(result.mode, mode::WHOLE_BLOCK);
    }

    #[test]
    fn test_prompt_priority_partitions_in_order() {
        let text = "PS C:\\> Get-Service -Name win*\n\nStatus   Name\n------   ----\nRunning  WinRM\n\nPS> $s = Get-Service WinRM\nThis example gets services.";
        let result = ExampleSegmenter::new().classify(text);

        assert_eq!(result.mode, mode::PROMPT_PRIORITY);
        assert_eq!(
            result.code,
            "PS C:\\> Get-Service -Name win*\nPS> $s = Get-Service WinRM"
        );
        assert_eq!(
            result.remarks,
            "Status   Name\n------   ----\nRunning  WinRM\n\nThis example gets services."
        );
    }

    #[test]
    fn test_prompt_priority_wins_over_narrative_tail() {
        let text = "PS> Get-Thing\nThis gets the thing for you.";
        let result = ExampleSegmenter::strict().classify(text);
        assert_eq!(result.mode, mode::PROMPT_PRIORITY);
        assert_eq!(result.code, "PS> Get-Thing");
        assert_eq!(result.remarks, "This gets the thing for you.");
    }

    #[test]
    fn test_strict_splits_narrative_tail() {
        let text = "Get-Thing | ForEach-Object {\n    $_.Name\n}\n\nThis lists the names of every thing.\n";
        let result = ExampleSegmenter::strict().classify(text);
        assert_eq!(result.mode, mode::NARRATIVE_TAIL);
        assert_eq!(result.code, "Get-Thing | ForEach-Object {\n    $_.Name\n}");
        assert_eq!(result.remarks, "This lists the names of every thing.");

        // The default chain never invents a split
        let result = ExampleSegmenter::new().classify(text);
        assert_eq!(result.mode, mode::WHOLE_BLOCK);
        assert!(result.remarks.is_empty());
    }

    #[test]
    fn test_custom_chain_without_opinion_falls_back() {
        let segmenter = ExampleSegmenter::with_strategies(vec![Box::new(NarrativeTail)]);
        assert_eq!(segmenter.strategy_names(), vec!["narrative-tail"]);
        let result = segmenter.classify("$a = 1");
        assert_eq!(result.mode, mode::WHOLE_BLOCK);
        assert_eq!(result.code, "$a = 1");
    }

    #[test]
    fn test_crlf_input() {
        let result = ExampleSegmenter::new().classify("PS> dir\r\nlisting here\r\n");
        assert_eq!(result.code, "PS> dir");
        assert_eq!(result.remarks, "listing here");
    }
}
