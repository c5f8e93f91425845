//! Async stream log readers (non-UTF8-safe).
//!
//! Scripts can emit non-UTF8 bytes on stdout/stderr. `BufReader::lines()`
//! would end the reader task on the first invalid byte, so lines are read as
//! bytes and decoded lossily instead.

use std::sync::Arc;

use logcast_core::LogSource;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::logs::LogHub;

/// Forward every line of `stream` into `hub` until EOF.
///
/// The returned task resolves to the number of lines forwarded.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    source: LogSource,
    script: String,
    hub: Arc<LogHub>,
) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        let mut forwarded = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let line = String::from_utf8_lossy(&buf).into_owned();
                    debug!(%script, stream = source.as_str(), "{}", line);
                    hub.push(source, line);
                    forwarded += 1;
                }
                Err(e) => {
                    debug!(%script, stream = source.as_str(), error = %e, "log stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(%script, stream = source.as_str(), forwarded, "log stream reader task exiting");
        forwarded
    })
}
