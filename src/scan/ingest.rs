use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use thiserror::Error;

use crate::scan::sample_log::SampleLog;

const TOKEN_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug, PartialEq)]
#[error("not a number: {token:?}")]
pub struct TokenError {
    pub token: String,
}

pub fn parse_sample(token: &str) -> Result<f32, TokenError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| TokenError {
            token: token.to_string(),
        })
}

pub enum IngestCommand {
    Stop,
}

#[derive(Default)]
pub struct IngestStats {
    pub accepted: AtomicU64,
    pub rejected: AtomicU64,
}

/// Background producer appending parsed samples to a [`SampleLog`].
///
/// The blocking source is drained on its own detached reader thread; the
/// ingest thread only waits on channels, so it can always be stopped and
/// joined.
pub struct IngestWorker {
    tx_cmd: Sender<IngestCommand>,
    stats: Arc<IngestStats>,
    finished: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl IngestWorker {
    pub fn spawn<S>(source: S, samples: SampleLog, echo: bool) -> Self
    where
        S: Iterator<Item = String> + Send + 'static,
    {
        let (tx_cmd, rx_cmd) = channel::unbounded::<IngestCommand>();
        let (tx_tokens, rx_tokens) = channel::bounded::<String>(TOKEN_CHANNEL_CAPACITY);
        let stats = Arc::new(IngestStats::default());
        let finished = Arc::new(AtomicBool::new(false));

        // Detached: it may sit in a blocking read until the process exits.
        if let Err(e) = thread::Builder::new()
            .name("scan-reader".into())
            .spawn(move || reader_thread(source, tx_tokens))
        {
            log::error!("failed to spawn reader thread: {e}");
        }

        let stats_clone = Arc::clone(&stats);
        let finished_clone = Arc::clone(&finished);

        let thread_handle = thread::Builder::new()
            .name("scan-ingest".into())
            .spawn(move || {
                ingest_thread(rx_cmd, rx_tokens, samples, echo, &stats_clone);
                finished_clone.store(true, Ordering::Release);
            });

        let thread_handle = match thread_handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("failed to spawn ingest thread: {e}");
                finished.store(true, Ordering::Release);
                None
            }
        };

        Self {
            tx_cmd,
            stats,
            finished,
            thread_handle,
        }
    }

    pub fn stop(&self) {
        let _ = self.tx_cmd.send(IngestCommand::Stop);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn accepted(&self) -> u64 {
        self.stats.accepted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.stats.rejected.load(Ordering::Relaxed)
    }
}

impl Drop for IngestWorker {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(IngestCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

fn reader_thread<S>(source: S, tx_tokens: Sender<String>)
where
    S: Iterator<Item = String>,
{
    for token in source {
        if tx_tokens.send(token).is_err() {
            return;
        }
    }
    log::debug!("input source exhausted");
}

fn ingest_thread(
    rx_cmd: Receiver<IngestCommand>,
    rx_tokens: Receiver<String>,
    samples: SampleLog,
    echo: bool,
    stats: &IngestStats,
) {
    loop {
        crossbeam::select! {
            recv(rx_cmd) -> cmd => match cmd {
                Ok(IngestCommand::Stop) | Err(_) => {
                    log::debug!("ingest stopped");
                    return;
                }
            },
            recv(rx_tokens) -> token => {
                let Ok(token) = token else {
                    log::info!(
                        "input exhausted after {} samples",
                        stats.accepted.load(Ordering::Relaxed)
                    );
                    return;
                };

                match parse_sample(&token) {
                    Ok(value) => {
                        samples.append(value);
                        stats.accepted.fetch_add(1, Ordering::Relaxed);
                        if echo {
                            log::info!("[New Value] {value}");
                        } else {
                            log::trace!("[New Value] {value}");
                        }
                    }
                    Err(e) => {
                        stats.rejected.fetch_add(1, Ordering::Relaxed);
                        log::warn!("skipping input token: {e}");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::source::TokenSource;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn wait_until_finished(worker: &IngestWorker) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !worker.is_finished() {
            assert!(Instant::now() < deadline, "ingest did not finish");
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_sample("2.0"), Ok(2.0));
        assert_eq!(parse_sample("-3"), Ok(-3.0));
        assert_eq!(parse_sample("1e2"), Ok(100.0));
        assert!(parse_sample("abc").is_err());
        assert!(parse_sample("1.0.0").is_err());
        assert!(parse_sample("NaN").is_err());
        assert!(parse_sample("inf").is_err());
    }

    #[test]
    fn appends_valid_and_skips_malformed() {
        let log = SampleLog::new();
        let source = TokenSource::new(Cursor::new("1.0 bogus 2.0\n3.5 ?? 4\n"));
        let worker = IngestWorker::spawn(source, log.clone(), false);

        wait_until_finished(&worker);

        assert_eq!(log.snapshot(), vec![1.0, 2.0, 3.5, 4.0]);
        assert_eq!(worker.accepted(), 4);
        assert_eq!(worker.rejected(), 2);
        assert!(log.is_dirty());
    }

    #[test]
    fn exhausted_source_appends_nothing_more() {
        let log = SampleLog::new();
        let worker = IngestWorker::spawn(TokenSource::new(Cursor::new("")), log.clone(), false);
        wait_until_finished(&worker);
        assert!(log.is_empty());
        assert!(!log.is_dirty());
    }

    #[test]
    fn stop_joins_while_source_blocks() {
        let log = SampleLog::new();
        // Never yields; stands in for a blocked stdin read.
        let source = std::iter::from_fn(|| {
            thread::sleep(Duration::from_secs(3600));
            None::<String>
        });
        let worker = IngestWorker::spawn(source, log.clone(), false);
        assert!(!worker.is_finished());

        worker.stop();
        wait_until_finished(&worker);
        drop(worker);
        assert!(log.is_empty());
    }
}
