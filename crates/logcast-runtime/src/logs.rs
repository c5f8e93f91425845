//! Log history and broadcast.
//!
//! Every captured line is stored in a bounded ring buffer (so late joiners
//! can fetch recent history) and broadcast to all live subscribers.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use logcast_core::{ChannelError, Envelope, LogLine, LogSource, ScriptStatus};
use tokio::sync::broadcast;
use tracing::debug;

/// Maximum number of log lines kept in history by default.
pub const DEFAULT_HISTORY_LINES: usize = 5000;

/// Broadcast channel capacity. Slow subscribers lag past this.
const CHANNEL_CAPACITY: usize = 1024;

/// Message fanned out to hub subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubMessage {
    Line(LogLine),
    Status(ScriptStatus),
}

impl HubMessage {
    /// Channel envelope for this message.
    pub fn to_envelope(&self) -> Result<Envelope, ChannelError> {
        match self {
            Self::Line(line) => Ok(line.to_envelope()),
            Self::Status(status) => status.to_envelope(),
        }
    }
}

/// Ring buffer of recent lines.
#[derive(Debug)]
struct LogHistory {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl LogHistory {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_LINES)),
            capacity,
        }
    }

    /// Add a line, removing the oldest if at capacity.
    fn push(&mut self, line: LogLine) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

/// Shared log history and fan-out.
#[derive(Debug)]
pub struct LogHub {
    history: RwLock<LogHistory>,
    sender: broadcast::Sender<HubMessage>,
}

impl Default for LogHub {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LINES)
    }
}

impl LogHub {
    /// Create a hub keeping at most `history_lines` lines. Zero disables history.
    pub fn new(history_lines: usize) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            history: RwLock::new(LogHistory::new(history_lines)),
            sender,
        }
    }

    /// Record a line and broadcast it.
    ///
    /// Having no subscribers is not an error.
    pub fn push(&self, source: LogSource, line: impl Into<String>) -> LogLine {
        let entry = LogLine::new(source, line);

        // Broadcast while holding the write lock so `subscribe_with_history`
        // sees each line exactly once.
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        history.push(entry.clone());
        let _ = self.sender.send(HubMessage::Line(entry.clone()));

        entry
    }

    /// Record a logcast-generated line.
    pub fn system(&self, line: impl Into<String>) -> LogLine {
        self.push(LogSource::System, line)
    }

    /// Broadcast a script status change. Statuses are not kept in history.
    pub fn announce(&self, status: ScriptStatus) {
        debug!(script = %status.script, state = ?status.state, "script status");
        let _ = self.sender.send(HubMessage::Status(status));
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<LogLine> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        history.lines.iter().cloned().collect()
    }

    /// Drop all history. Live subscribers are unaffected.
    pub fn clear(&self) {
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        history.lines.clear();
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubMessage> {
        self.sender.subscribe()
    }

    /// Subscribe and snapshot history atomically.
    ///
    /// Every line is either in the returned history or delivered through the
    /// receiver, never both.
    pub fn subscribe_with_history(&self) -> (Vec<LogLine>, broadcast::Receiver<HubMessage>) {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        let receiver = self.sender.subscribe();
        (history.lines.iter().cloned().collect(), receiver)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Maximum number of lines kept in history.
    pub fn capacity(&self) -> usize {
        self.history
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_evicts_oldest() {
        let hub = LogHub::new(3);
        for i in 0..5 {
            hub.push(LogSource::Stdout, format!("line {i}"));
        }
        let lines: Vec<String> = hub.history().into_iter().map(|l| l.line).collect();
        assert_eq!(lines, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let hub = LogHub::new(0);
        hub.system("hello");
        assert!(hub.history().is_empty());
    }

    #[test]
    fn test_push_without_subscribers() {
        let hub = LogHub::default();
        assert_eq!(hub.subscriber_count(), 0);
        hub.system("nobody listening");
        assert_eq!(hub.history().len(), 1);
    }

    #[tokio::test]
    async fn test_subscriber_receives_lines_and_status() {
        let hub = LogHub::default();
        let mut receiver = hub.subscribe();

        hub.push(LogSource::Stderr, "warning");
        hub.announce(ScriptStatus::started("main"));

        match receiver.recv().await.unwrap() {
            HubMessage::Line(line) => {
                assert_eq!(line.line, "warning");
                assert_eq!(line.source, LogSource::Stderr);
            }
            other => panic!("Unexpected message: {other:?}"),
        }
        assert_eq!(
            receiver.recv().await.unwrap(),
            HubMessage::Status(ScriptStatus::started("main"))
        );
    }

    #[tokio::test]
    async fn test_subscribe_with_history_splits_cleanly() {
        let hub = LogHub::default();
        hub.system("before");
        let (history, mut receiver) = hub.subscribe_with_history();
        hub.system("after");

        assert_eq!(history.len(), 1);
        assert_eq!(history[0].line, "before");
        match receiver.recv().await.unwrap() {
            HubMessage::Line(line) => assert_eq!(line.line, "after"),
            other => panic!("Unexpected message: {other:?}"),
        }
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_clear_empties_history() {
        let hub = LogHub::default();
        hub.system("one");
        hub.clear();
        assert!(hub.history().is_empty());
    }

    #[test]
    fn test_status_envelope() {
        let msg = HubMessage::Status(ScriptStatus::succeeded("main"));
        let env = msg.to_envelope().unwrap();
        assert_eq!(env.event, logcast_core::SCRIPT_STATUS);
    }
}
