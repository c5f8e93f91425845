//! Terminal output for the CLI.
//!
//! Keep this module format-only: no domain logic.

use std::io::{self, Write};

use logcast_core::{ConnectionStatus, DisplayBuffer, Renderer};
use logcast_runtime::ScriptInfo;
use tracing::debug;

/// Renderer that echoes every appended chunk to a writer.
///
/// Chunks are written as-is: payloads already carry their own newlines.
pub struct StreamRenderer<W> {
    out: W,
}

/// Renderer for the process's standard output.
pub type StdoutRenderer = StreamRenderer<io::Stdout>;

impl StdoutRenderer {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> StreamRenderer<W> {
    pub const fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> Renderer for StreamRenderer<W> {
    fn render(&mut self, appended: &str, _buffer: &DisplayBuffer) {
        if let Err(e) = self
            .out
            .write_all(appended.as_bytes())
            .and_then(|()| self.out.flush())
        {
            debug!(error = %e, "failed to echo log output");
        }
    }
}

/// One-word label for the connectivity indicator.
pub const fn status_label(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "● connected",
        ConnectionStatus::Disconnected => "○ disconnected",
    }
}

/// Truncates a string to a maximum length, adding "..." if needed.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Render the script table as lines (header, separator, one row per script).
pub fn script_table(scripts: &[ScriptInfo]) -> Vec<String> {
    let mut lines = vec![format!("{:<24} Path", "Name"), "-".repeat(60)];
    lines.extend(
        scripts
            .iter()
            .map(|s| format!("{:<24} {}", truncate_string(&s.name, 23), s.path.display())),
    );
    lines
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_renderer_writes_chunks_verbatim() {
        let writer = SharedWriter::default();
        let mut renderer = StreamRenderer::new(writer.clone());
        let buffer = DisplayBuffer::default();

        renderer.render("partial", &buffer);
        renderer.render(" line\n", &buffer);

        assert_eq!(&*writer.0.lock().unwrap(), b"partial line\n");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("main", 10), "main");
        assert_eq!(truncate_string("nightly_export", 8), "night...");
    }

    #[test]
    fn test_script_table_rows() {
        let scripts = vec![ScriptInfo {
            name: "main".to_string(),
            path: PathBuf::from("scripts/main.py"),
        }];
        let lines = script_table(&scripts);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Name"));
        assert!(lines[2].starts_with("main "));
        assert!(lines[2].ends_with("scripts/main.py"));
    }

    #[test]
    fn test_status_label() {
        assert!(status_label(ConnectionStatus::Connected).ends_with("connected"));
        assert!(status_label(ConnectionStatus::Disconnected).ends_with("disconnected"));
    }
}
