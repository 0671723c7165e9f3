use std::borrow::Cow;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, info, warn};

/// How child process output is mirrored into the log.
#[derive(Debug, Clone, Copy)]
pub struct OutputLogConfig {
    /// Max line length before truncation.
    pub max_line_length: usize,
    /// Log stdout at INFO level (false = DEBUG).
    pub stdout_info: bool,
    /// Log stderr at WARN level (false = DEBUG).
    pub stderr_warn: bool,
}

impl Default for OutputLogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            stdout_info: true,
            stderr_warn: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stream {
    Stdout,
    Stderr,
}

/// Read `reader` line by line until EOF and log every non-empty line.
pub(crate) async fn forward_lines<R>(
    reader: Option<R>,
    stream: Stream,
    cfg: OutputLogConfig,
    program: &str,
) where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };
    let mut segments = BufReader::new(reader).split(b'\n');
    loop {
        match segments.next_segment().await {
            Ok(Some(raw)) => {
                let text = String::from_utf8_lossy(&raw);
                let text = text.trim_end_matches('\r');
                if text.is_empty() {
                    continue;
                }
                let line = truncate(text, cfg.max_line_length);
                match stream {
                    Stream::Stdout if cfg.stdout_info => info!(program, "{line}"),
                    Stream::Stderr if cfg.stderr_warn => warn!(program, "{line}"),
                    _ => debug!(program, stream = ?stream, "{line}"),
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(program, stream = ?stream, error = %e, "output stream closed");
                break;
            }
        }
    }
}

fn truncate(line: &str, max: usize) -> Cow<'_, str> {
    if line.len() <= max {
        return Cow::Borrowed(line);
    }
    let mut end = max;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", &line[..end]))
}
