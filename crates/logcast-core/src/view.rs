//! Log sink view.
//!
//! Subscribes to `log_update` and appends every payload to a
//! [`DisplayBuffer`], keeping the newest content in view.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use crate::buffer::DisplayBuffer;
use crate::events::{EventSource, Handler, LOG_UPDATE, LogUpdate, Subscription};

/// Observer notified after each append.
///
/// The terminal client uses this to echo appended text to stdout.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send {
    /// Called with the chunk that was just appended and the buffer after
    /// the append (already scrolled to the bottom).
    fn render(&mut self, appended: &str, buffer: &DisplayBuffer);
}

/// Subscription state of the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unsubscribed,
    Subscribed,
}

type SharedRenderer = Arc<Mutex<Box<dyn Renderer>>>;

/// Append-only log display bound to one event source.
pub struct LogSinkView {
    buffer: Arc<Mutex<DisplayBuffer>>,
    renderer: Option<SharedRenderer>,
    subscription: Option<Subscription>,
}

impl Default for LogSinkView {
    fn default() -> Self {
        Self::new(DisplayBuffer::default())
    }
}

impl LogSinkView {
    pub fn new(buffer: DisplayBuffer) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(buffer)),
            renderer: None,
            subscription: None,
        }
    }

    /// Attach a renderer. Must be called before [`LogSinkView::attach`].
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(Mutex::new(Box::new(renderer))));
        self
    }

    /// Subscribe to `log_update` on `source`.
    ///
    /// Attaching an already subscribed view is a no-op.
    pub fn attach<S: EventSource + ?Sized>(&mut self, source: &S) {
        if self.subscription.is_some() {
            debug!("log view already subscribed");
            return;
        }
        self.subscription = Some(source.on(LOG_UPDATE, self.handler()));
    }

    pub const fn state(&self) -> ViewState {
        if self.subscription.is_some() {
            ViewState::Subscribed
        } else {
            ViewState::Unsubscribed
        }
    }

    /// Copy of the accumulated text.
    pub fn text(&self) -> String {
        self.lock_buffer().text().to_string()
    }

    /// Run `f` against the buffer.
    pub fn with_buffer<R>(&self, f: impl FnOnce(&DisplayBuffer) -> R) -> R {
        f(&self.lock_buffer())
    }

    /// Scroll back through history. The next append jumps to the bottom again.
    pub fn scroll_up(&self, lines: usize) {
        self.lock_buffer().scroll_up(lines);
    }

    /// Shared handle to the buffer for hosts that render on another task.
    pub fn buffer(&self) -> Arc<Mutex<DisplayBuffer>> {
        Arc::clone(&self.buffer)
    }

    fn lock_buffer(&self) -> std::sync::MutexGuard<'_, DisplayBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handler(&self) -> Handler {
        let buffer = Arc::clone(&self.buffer);
        let renderer = self.renderer.clone();

        Arc::new(move |payload| {
            let update = match LogUpdate::from_payload(payload) {
                Ok(update) => update,
                Err(e) => {
                    warn!(error = %e, %payload, "ignoring malformed log_update payload");
                    return;
                }
            };

            let mut buffer = buffer.lock().unwrap_or_else(PoisonError::into_inner);
            buffer.append(&update.data);

            if let Some(renderer) = &renderer {
                renderer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .render(&update.data, &buffer);
            }
        })
    }
}

impl std::fmt::Debug for LogSinkView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSinkView")
            .field("state", &self.state())
            .field("bytes", &self.lock_buffer().len())
            .finish_non_exhaustive()
    }
}
