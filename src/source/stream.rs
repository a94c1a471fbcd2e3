//! Time-bounded capture of text lines from a channel.

use super::cancel::Cancellation;
use super::channel::Channel;
use super::lines::LineAssembler;
use crate::utils::error::SourceError;
use log::{debug, warn};
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::{Duration, Instant};

const READ_BUFFER_SIZE: usize = 4096;

/// Lazy sequence of lines read from a channel until a deadline passes
/// or the cancellation token fires.
///
/// Each item is either a decoded line or a read error. Read errors do not
/// end the sequence. The channel is owned by the stream and released when
/// the stream is dropped.
pub struct CaptureStream<C: Channel> {
    channel: C,
    assembler: LineAssembler,
    ready: VecDeque<String>,
    buffer: Vec<u8>,
    started: Instant,
    /// `None` when the window is too long to represent; only cancellation ends it
    deadline: Option<Instant>,
    poll_interval: Duration,
    cancel: Cancellation,
    finished: bool,
    interrupted: bool,
}

impl<C: Channel> CaptureStream<C> {
    /// Start the capture window now
    pub fn new(channel: C, duration: Duration, poll_interval: Duration, cancel: Cancellation) -> Self {
        let started = Instant::now();
        Self {
            channel,
            assembler: LineAssembler::new(),
            ready: VecDeque::new(),
            buffer: vec![0; READ_BUFFER_SIZE],
            started,
            deadline: started.checked_add(duration),
            poll_interval,
            cancel,
            finished: false,
            interrupted: false,
        }
    }

    /// Time since the window opened
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the capture ended because of cancellation
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(tail) = self.assembler.finish() {
            self.ready.push_back(tail);
        }
    }

    /// Read whatever is waiting; `Ok(false)` means nothing was available
    fn poll(&mut self) -> Result<bool, SourceError> {
        let available = self.channel.bytes_available()?;
        if available == 0 {
            return Ok(false);
        }

        let want = available.min(self.buffer.len());
        let read = match self.channel.read(&mut self.buffer[..want]) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => 0,
            Err(e) => return Err(e.into()),
        };

        if read == 0 {
            return Ok(false);
        }

        let lines = self.assembler.push(&self.buffer[..read]);
        self.ready.extend(lines);
        Ok(true)
    }
}

impl<C: Channel> Iterator for CaptureStream<C> {
    type Item = Result<String, SourceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }

            if self.finished {
                return None;
            }

            if self.cancel.is_cancelled() {
                self.interrupted = true;
                self.finish();
                continue;
            }

            if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                self.finish();
                continue;
            }

            match self.poll() {
                Ok(true) => {}
                Ok(false) => thread::sleep(self.poll_interval),
                Err(e) => {
                    thread::sleep(self.poll_interval);
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Result of one capture window
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    /// Every line read, in arrival order
    pub lines: Vec<String>,

    /// Wall time from connection to end of capture
    pub elapsed: Duration,

    /// True if the window was cut short by cancellation
    pub interrupted: bool,
}

/// Capture lines from `channel` for `duration`, echoing each one to `echo`
///
/// **Public** - main entry point for a live capture
///
/// Read errors are logged and skipped. The channel is dropped before
/// this function returns, on every path.
pub fn capture_lines<C, W>(
    channel: C,
    duration: Duration,
    poll_interval: Duration,
    cancel: &Cancellation,
    echo: &mut W,
) -> CaptureOutcome
where
    C: Channel,
    W: Write,
{
    let mut stream = CaptureStream::new(channel, duration, poll_interval, cancel.clone());
    let mut lines = Vec::new();

    for item in stream.by_ref() {
        match item {
            Ok(line) => {
                if let Err(e) = writeln!(echo, "{}", line) {
                    debug!("Echo failed: {}", e);
                }
                lines.push(line);
            }
            Err(e) => warn!("[Read error: {}]", e),
        }
    }

    let outcome = CaptureOutcome {
        lines,
        elapsed: stream.elapsed(),
        interrupted: stream.interrupted(),
    };
    drop(stream);

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// In-memory channel replaying scripted chunks, optionally cancelling
    /// once the script runs out.
    struct ScriptedChannel {
        chunks: VecDeque<io::Result<Vec<u8>>>,
        current: Vec<u8>,
        cancel_when_drained: Option<Cancellation>,
        released: Arc<AtomicBool>,
    }

    impl ScriptedChannel {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into_iter().collect(),
                current: Vec::new(),
                cancel_when_drained: None,
                released: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl Read for ScriptedChannel {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = buf.len().min(self.current.len());
            buf[..n].copy_from_slice(&self.current[..n]);
            self.current.drain(..n);
            Ok(n)
        }
    }

    impl Channel for ScriptedChannel {
        fn bytes_available(&mut self) -> io::Result<usize> {
            if self.current.is_empty() {
                match self.chunks.pop_front() {
                    Some(Ok(chunk)) => self.current = chunk,
                    Some(Err(e)) => return Err(e),
                    None => {
                        if let Some(cancel) = &self.cancel_when_drained {
                            cancel.cancel();
                        }
                    }
                }
            }
            Ok(self.current.len())
        }
    }

    impl Drop for ScriptedChannel {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn chunk(text: &str) -> io::Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }

    const POLL: Duration = Duration::from_millis(1);

    #[test]
    fn test_capture_echoes_and_retains_lines() {
        let channel = ScriptedChannel::new(vec![
            chunk("[IPS] 2074192 instructions/sec (2.07 MIPS)\n"),
            chunk("WiFi conn"),
            chunk("ected\n"),
        ]);
        let released = Arc::clone(&channel.released);
        let mut echo = Vec::new();

        let outcome = capture_lines(
            channel,
            Duration::from_millis(50),
            POLL,
            &Cancellation::new(),
            &mut echo,
        );

        assert_eq!(
            outcome.lines,
            vec!["[IPS] 2074192 instructions/sec (2.07 MIPS)", "WiFi connected"]
        );
        assert_eq!(
            String::from_utf8(echo).unwrap(),
            "[IPS] 2074192 instructions/sec (2.07 MIPS)\nWiFi connected\n"
        );
        assert!(!outcome.interrupted);
        assert!(outcome.elapsed >= Duration::from_millis(50));
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_read_error_does_not_end_capture() {
        let channel = ScriptedChannel::new(vec![
            chunk("first\n"),
            Err(io::Error::new(io::ErrorKind::Other, "framing error")),
            chunk("second\n"),
        ]);
        let mut echo = Vec::new();

        let outcome = capture_lines(
            channel,
            Duration::from_millis(50),
            POLL,
            &Cancellation::new(),
            &mut echo,
        );

        assert_eq!(outcome.lines, vec!["first", "second"]);
    }

    #[test]
    fn test_cancellation_ends_capture_early() {
        let cancel = Cancellation::new();
        let mut channel = ScriptedChannel::new(vec![chunk("line one\npartial")]);
        channel.cancel_when_drained = Some(cancel.clone());
        let released = Arc::clone(&channel.released);
        let mut echo = Vec::new();

        let outcome = capture_lines(channel, Duration::from_secs(60), POLL, &cancel, &mut echo);

        assert!(outcome.interrupted);
        assert!(outcome.elapsed < Duration::from_secs(10));
        assert_eq!(outcome.lines, vec!["line one", "partial"]);
        assert!(released.load(Ordering::SeqCst));
    }

    #[test]
    fn test_unbounded_duration_runs_until_cancelled() {
        let cancel = Cancellation::new();
        let mut channel = ScriptedChannel::new(vec![chunk("still running\n")]);
        channel.cancel_when_drained = Some(cancel.clone());
        let mut echo = Vec::new();

        let outcome = capture_lines(
            channel,
            Duration::from_secs(u64::MAX),
            POLL,
            &cancel,
            &mut echo,
        );

        assert!(outcome.interrupted);
        assert_eq!(outcome.lines, vec!["still running"]);
    }

    #[test]
    fn test_stream_is_lazy_iterator() {
        let channel = ScriptedChannel::new(vec![chunk("a\nb\n")]);
        let mut stream =
            CaptureStream::new(channel, Duration::from_millis(20), POLL, Cancellation::new());

        assert_eq!(stream.next().unwrap().unwrap(), "a");
        assert_eq!(stream.next().unwrap().unwrap(), "b");
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }
}
