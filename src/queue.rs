use serde::{Deserialize, Serialize};

/// A single executable command extracted from a model response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandItem {
    /// The shell command text, trimmed of surrounding whitespace
    pub text: String,
    /// Whether the command's output should be sent back to the model
    pub requires_feedback: bool,
}

impl CommandItem {
    pub fn new(text: impl Into<String>, requires_feedback: bool) -> Self {
        Self {
            text: text.into(),
            requires_feedback,
        }
    }
}

/// Ordered queue of pending commands with a single live cursor.
///
/// Items before the cursor are resolved (executed or skipped), items at or
/// after it are pending. New commands discovered through feedback rounds are
/// spliced in directly after the cursor, so they run before the rest of the
/// original plan while never revisiting resolved positions.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    items: Vec<CommandItem>,
    cursor: usize,
}

impl CommandQueue {
    /// Seed the queue from an initial extraction, cursor at the front
    pub fn new(items: Vec<CommandItem>) -> Self {
        Self { items, cursor: 0 }
    }

    /// The item at the cursor, if any work remains
    pub fn current(&self) -> Option<&CommandItem> {
        self.items.get(self.cursor)
    }

    /// Resolve the current item and move on. The cursor only ever moves
    /// forward, which is what makes the processing loop finite.
    pub fn advance(&mut self) {
        if self.cursor < self.items.len() {
            self.cursor += 1;
        }
    }

    /// Insert newly extracted commands immediately after the cursor,
    /// shifting later items right and preserving relative order on both
    /// sides. Equivalent to `items[..=cursor] + new + items[cursor+1..]`.
    pub fn splice_after_cursor(&mut self, new_items: Vec<CommandItem>) {
        let at = (self.cursor + 1).min(self.items.len());
        self.items.splice(at..at, new_items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resolved/total progress, one-based position of the current item
    pub fn position(&self) -> (usize, usize) {
        (self.cursor, self.items.len())
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.items.len()
    }

    #[cfg(test)]
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|item| item.text.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(text: &str) -> CommandItem {
        CommandItem::new(text, false)
    }

    #[test]
    fn test_empty_queue_is_exhausted() {
        let queue = CommandQueue::new(Vec::new());
        assert!(queue.is_empty());
        assert!(queue.is_exhausted());
        assert!(queue.current().is_none());
    }

    #[test]
    fn test_advance_resolves_in_order() {
        let mut queue = CommandQueue::new(vec![item("a"), item("b")]);

        assert_eq!(queue.current().unwrap().text, "a");
        queue.advance();
        assert_eq!(queue.current().unwrap().text, "b");
        queue.advance();
        assert!(queue.is_exhausted());
    }

    #[test]
    fn test_splice_inserts_directly_after_cursor() {
        // [A, B, C] with cursor at A, feedback yields [X, Y]
        let mut queue = CommandQueue::new(vec![item("A"), item("B"), item("C")]);
        queue.splice_after_cursor(vec![item("X"), item("Y")]);

        assert_eq!(queue.texts(), vec!["A", "X", "Y", "B", "C"]);
        assert_eq!(queue.current().unwrap().text, "A");

        queue.advance();
        assert_eq!(queue.current().unwrap().text, "X");
    }

    #[test]
    fn test_splice_at_last_item_appends() {
        let mut queue = CommandQueue::new(vec![item("A")]);
        queue.splice_after_cursor(vec![item("X")]);
        assert_eq!(queue.texts(), vec!["A", "X"]);
    }

    #[test]
    fn test_splice_empty_is_noop() {
        let mut queue = CommandQueue::new(vec![item("A"), item("B")]);
        queue.splice_after_cursor(Vec::new());
        assert_eq!(queue.texts(), vec!["A", "B"]);
    }

    #[test]
    fn test_cursor_is_monotonic_under_splicing() {
        let mut queue = CommandQueue::new(vec![item("A"), item("B")]);
        let mut last = 0;

        while let Some(current) = queue.current().cloned() {
            let (position, _) = queue.position();
            assert!(position >= last);
            last = position;

            // One round of feedback growth while processing "A"
            if current.text == "A" {
                queue.splice_after_cursor(vec![item("A1")]);
            }
            queue.advance();
        }

        assert_eq!(queue.position(), (3, 3));
    }

    #[test]
    fn test_advance_past_end_stays_put() {
        let mut queue = CommandQueue::new(vec![item("A")]);
        queue.advance();
        queue.advance();
        assert_eq!(queue.position(), (1, 1));
    }
}
