//! Append-only display buffer with a line-based scroll model.
//!
//! The buffer mirrors a text area: text only ever grows at the end, and the
//! viewport shows `viewport_rows` lines starting at `scroll_offset`. Every
//! append forces the viewport back to the bottom.

/// How much text the buffer keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Retention {
    /// Keep everything. The buffer never shrinks.
    #[default]
    Unbounded,
    /// Keep at most this many bytes, discarding whole lines from the front
    /// when possible.
    MaxBytes(usize),
}

/// Default number of visible rows.
pub const DEFAULT_VIEWPORT_ROWS: usize = 20;

/// Accumulated log text plus its scroll position.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    text: String,
    /// Count of '\n' in `text`, kept incrementally.
    newlines: usize,
    viewport_rows: usize,
    scroll_offset: usize,
    retention: Retention,
    discarded_bytes: usize,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT_ROWS)
    }
}

impl DisplayBuffer {
    /// Create an empty, unbounded buffer showing `viewport_rows` lines.
    pub fn new(viewport_rows: usize) -> Self {
        Self {
            text: String::new(),
            newlines: 0,
            viewport_rows: viewport_rows.max(1),
            scroll_offset: 0,
            retention: Retention::Unbounded,
            discarded_bytes: 0,
        }
    }

    /// Use a different retention policy.
    #[must_use]
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Append `data` verbatim, then scroll to the bottom.
    pub fn append(&mut self, data: &str) {
        self.text.push_str(data);
        self.newlines += data.bytes().filter(|&b| b == b'\n').count();
        self.enforce_retention();
        self.scroll_to_bottom();
    }

    /// Full accumulated text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the accumulated text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes dropped from the front by the retention policy.
    pub const fn discarded_bytes(&self) -> usize {
        self.discarded_bytes
    }

    /// Number of display lines. A trailing newline does not open a new line.
    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else if self.text.ends_with('\n') {
            self.newlines
        } else {
            self.newlines + 1
        }
    }

    pub const fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Resize the viewport, keeping the bottom pinned if it was.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        let was_at_bottom = self.is_at_bottom();
        self.viewport_rows = rows.max(1);
        if was_at_bottom {
            self.scroll_to_bottom();
        } else {
            self.scroll_offset = self.scroll_offset.min(self.max_scroll_offset());
        }
    }

    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Largest valid scroll offset: the first line of the last full page.
    pub fn max_scroll_offset(&self) -> usize {
        self.line_count().saturating_sub(self.viewport_rows)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_offset == self.max_scroll_offset()
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_scroll_offset();
    }

    /// Scroll towards older content by `lines`.
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Scroll towards newer content by `lines`, stopping at the bottom.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = (self.scroll_offset + lines).min(self.max_scroll_offset());
    }

    /// Lines currently inside the viewport.
    pub fn visible_lines(&self) -> Vec<&str> {
        self.text
            .lines()
            .skip(self.scroll_offset)
            .take(self.viewport_rows)
            .collect()
    }

    fn enforce_retention(&mut self) {
        let Retention::MaxBytes(limit) = self.retention else {
            return;
        };
        if self.text.len() <= limit {
            return;
        }

        let mut cut = self.text.len() - limit;
        while !self.text.is_char_boundary(cut) {
            cut += 1;
        }
        // Prefer dropping whole lines.
        if let Some(pos) = self.text[cut..].find('\n') {
            let line_end = cut + pos + 1;
            if line_end < self.text.len() {
                cut = line_end;
            }
        }

        self.newlines -= self.text[..cut].bytes().filter(|&b| b == b'\n').count();
        self.text.drain(..cut);
        self.discarded_bytes += cut;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_concatenates_in_order() {
        let mut buffer = DisplayBuffer::new(10);
        buffer.append("build started\n");
        buffer.append("build finished\n");
        assert_eq!(buffer.text(), "build started\nbuild finished\n");
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_empty_buffer() {
        let buffer = DisplayBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.line_count(), 0);
        assert_eq!(buffer.scroll_offset(), 0);
        assert!(buffer.visible_lines().is_empty());
    }

    #[test]
    fn test_append_scrolls_to_bottom_after_user_scrolls_up() {
        let mut buffer = DisplayBuffer::new(3);
        for i in 0..10 {
            buffer.append(&format!("line {i}\n"));
        }
        assert_eq!(buffer.scroll_offset(), 7);

        buffer.scroll_up(5);
        assert_eq!(buffer.scroll_offset(), 2);
        assert!(!buffer.is_at_bottom());

        buffer.append("line 10\n");
        assert_eq!(buffer.scroll_offset(), buffer.max_scroll_offset());
        assert_eq!(buffer.visible_lines(), vec!["line 8", "line 9", "line 10"]);
    }

    #[test]
    fn test_partial_lines_join() {
        let mut buffer = DisplayBuffer::new(5);
        buffer.append("abc");
        buffer.append("def\nghi");
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.visible_lines(), vec!["abcdef", "ghi"]);
    }

    #[test]
    fn test_scroll_down_stops_at_bottom() {
        let mut buffer = DisplayBuffer::new(2);
        buffer.append("a\nb\nc\nd\n");
        buffer.scroll_up(10);
        assert_eq!(buffer.scroll_offset(), 0);
        buffer.scroll_down(100);
        assert!(buffer.is_at_bottom());
    }

    #[test]
    fn test_max_bytes_retention_drops_whole_lines() {
        let mut buffer = DisplayBuffer::new(5).with_retention(Retention::MaxBytes(12));
        buffer.append("first\n");
        buffer.append("second\n");
        buffer.append("third\n");
        assert_eq!(buffer.text(), "third\n");
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.discarded_bytes(), 13);
    }

    #[test]
    fn test_max_bytes_retention_respects_char_boundaries() {
        let mut buffer = DisplayBuffer::new(5).with_retention(Retention::MaxBytes(3));
        buffer.append("ééé");
        assert!(buffer.len() <= 4);
        assert!(buffer.text().chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_resize_keeps_bottom_pinned() {
        let mut buffer = DisplayBuffer::new(2);
        buffer.append("a\nb\nc\nd\n");
        buffer.set_viewport_rows(3);
        assert!(buffer.is_at_bottom());
        assert_eq!(buffer.visible_lines(), vec!["b", "c", "d"]);
    }
}
