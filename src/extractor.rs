use regex::Regex;

use crate::queue::CommandItem;

/// Parses fenced ```execute blocks out of free-form model responses.
///
/// The wire format is a fenced code block whose opening tag is `execute`,
/// optionally followed by a `#feedback` marker:
///
/// ````text
/// ```execute #feedback
/// ls -la
/// ```
/// ````
///
/// Blocks are returned in order of appearance. Prose around and between
/// blocks is ignored; a response with no blocks yields an empty vec.
pub struct CommandExtractor {
    pattern: Regex,
}

impl CommandExtractor {
    pub fn new() -> Self {
        // DOTALL so command bodies may span lines; non-greedy body so
        // adjacent blocks are never merged.
        let pattern = Regex::new(r"(?s)```execute(\s+#feedback)?\s*(.*?)\s*```")
            .expect("command block pattern is valid");
        Self { pattern }
    }

    /// Extract all command blocks from `text`, preserving order.
    /// Pure text-to-data transform; nothing is executed here.
    pub fn extract(&self, text: &str) -> Vec<CommandItem> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let requires_feedback = caps.get(1).is_some();
                let command = caps.get(2)?.as_str().trim();
                if command.is_empty() {
                    return None;
                }
                Some(CommandItem::new(command, requires_feedback))
            })
            .collect()
    }
}

impl Default for CommandExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_yields_nothing() {
        let extractor = CommandExtractor::new();
        assert!(extractor.extract("Just an explanation, no commands.").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_ordinary_code_blocks_are_ignored() {
        let extractor = CommandExtractor::new();
        let text = "Try this:\n```bash\nls -la\n```\nor nothing at all.";
        assert!(extractor.extract(text).is_empty());
    }

    #[test]
    fn test_single_block() {
        let extractor = CommandExtractor::new();
        let commands = extractor.extract("run: ```execute\nls -la\n```");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].text, "ls -la");
        assert!(!commands[0].requires_feedback);
    }

    #[test]
    fn test_feedback_marker_sets_flag() {
        let extractor = CommandExtractor::new();
        let commands = extractor.extract("```execute #feedback\ndf -h\n```");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].text, "df -h");
        assert!(commands[0].requires_feedback);
    }

    #[test]
    fn test_feedback_flag_round_trips_across_blocks() {
        let extractor = CommandExtractor::new();
        let text = "```execute\necho one\n```\n```execute #feedback\necho two\n```\n```execute\necho three\n```";
        let commands = extractor.extract(text);

        let flags: Vec<bool> = commands.iter().map(|c| c.requires_feedback).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn test_multiple_blocks_preserve_order() {
        let extractor = CommandExtractor::new();
        let text = "First:\n```execute\npwd\n```\nThen check space:\n```execute #feedback\ndu -sh .\n```\nDone.";
        let commands = extractor.extract(text);

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].text, "pwd");
        assert_eq!(commands[1].text, "du -sh .");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        let extractor = CommandExtractor::new();
        let commands = extractor.extract("```execute\n\n   uname -a   \n\n```");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].text, "uname -a");
    }

    #[test]
    fn test_multiline_command_body_is_kept_whole() {
        let extractor = CommandExtractor::new();
        let commands = extractor.extract("```execute\nfor f in *.log; do\n  wc -l \"$f\"\ndone\n```");

        assert_eq!(commands.len(), 1);
        assert!(commands[0].text.starts_with("for f in *.log"));
        assert!(commands[0].text.ends_with("done"));
    }

    #[test]
    fn test_empty_block_yields_nothing() {
        let extractor = CommandExtractor::new();
        assert!(extractor.extract("```execute\n\n```").is_empty());
    }

    #[test]
    fn test_unterminated_block_is_not_a_command() {
        let extractor = CommandExtractor::new();
        assert!(extractor.extract("```execute\nrm -rf /tmp/scratch").is_empty());
    }
}
