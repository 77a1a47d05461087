//! Async stream line readers (non-UTF8-safe).
//!
//! Agents and the tools they drive can emit non-UTF8 bytes on stdout/stderr.
//! `BufReader::lines()` would end the reader on the first invalid byte, so
//! lines are read as bytes and decoded lossily.

use std::sync::Arc;

use ralph_core::StreamKind;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::observers::ObserverRegistry;

/// Strip one trailing `\n` (and a preceding `\r`) from `buf`.
pub(crate) fn trim_line_ending(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
}

/// Spawn a task forwarding every line of `stream` to the observers.
///
/// The task ends silently on EOF or a read error (the stream closing is the
/// normal end of a reader), or when `cancel` fires.
pub(crate) fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    project: String,
    stream_kind: StreamKind,
    observers: Arc<ObserverRegistry>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            let read = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                read = reader.read_until(b'\n', &mut buf) => read,
            };

            match read {
                Ok(0) => break, // EOF
                Ok(_) => {
                    trim_line_ending(&mut buf);
                    let line = String::from_utf8_lossy(&buf);
                    debug!(project = %project, stream = %stream_kind, "{}", line);
                    observers.emit_output(&project, stream_kind, &line);
                }
                Err(e) => {
                    debug!(project = %project, stream = %stream_kind, error = %e, "stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(project = %project, stream = %stream_kind, "stream reader task exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line_ending() {
        let mut crlf = b"hello\r\n".to_vec();
        trim_line_ending(&mut crlf);
        assert_eq!(crlf, b"hello");

        let mut partial = b"no newline".to_vec();
        trim_line_ending(&mut partial);
        assert_eq!(partial, b"no newline");

        let mut bare_cr = b"keep\r".to_vec();
        trim_line_ending(&mut bare_cr);
        assert_eq!(bare_cr, b"keep\r");
    }

    #[tokio::test]
    async fn test_reader_forwards_lossy_lines() {
        use std::sync::Mutex;

        struct Collect(Mutex<Vec<String>>);
        impl ralph_core::ProcessObserver for Collect {
            fn on_output(&self, _project: &str, _stream: StreamKind, line: &str) -> anyhow::Result<()> {
                self.0.lock().unwrap().push(line.to_string());
                Ok(())
            }
        }

        let collect = Arc::new(Collect(Mutex::new(Vec::new())));
        let registry = Arc::new(ObserverRegistry::new());
        registry.register(collect.clone());

        let input: &[u8] = b"first\nsec\xffond\r\nlast";
        let handle = spawn_stream_reader(
            input,
            "alpha".to_string(),
            StreamKind::Stdout,
            registry,
            CancellationToken::new(),
        );
        handle.await.unwrap();

        let lines = collect.0.lock().unwrap().clone();
        assert_eq!(lines, vec!["first", "sec\u{fffd}ond", "last"]);
    }
}
