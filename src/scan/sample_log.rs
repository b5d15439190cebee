use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct LogState {
    samples: Vec<f32>,
    dirty: bool,
}

/// Append-only sample history shared between the ingest thread and the
/// render thread.
///
/// Every access goes through one mutex: `append` pushes and raises the dirty
/// flag in the same critical section, and readers only ever copy out a
/// completed prefix.
#[derive(Clone, Default)]
pub struct SampleLog {
    state: Arc<Mutex<LogState>>,
}

impl SampleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, value: f32) {
        let mut state = self.state.lock();
        state.samples.push(value);
        state.dirty = true;
    }

    /// Copies the samples out and clears the dirty flag, or returns `None` if
    /// nothing was appended since the last call.
    ///
    /// An append racing with the caller's rebuild sets the flag again, so the
    /// next call picks up the newer prefix.
    pub fn take_snapshot(&self) -> Option<Vec<f32>> {
        let mut state = self.state.lock();
        if !state.dirty {
            return None;
        }
        state.dirty = false;
        Some(state.samples.clone())
    }

    pub fn snapshot(&self) -> Vec<f32> {
        self.state.lock().samples.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clean_and_empty() {
        let log = SampleLog::new();
        assert!(log.is_empty());
        assert!(!log.is_dirty());
        assert_eq!(log.take_snapshot(), None);
    }

    #[test]
    fn append_marks_dirty_and_snapshot_clears() {
        let log = SampleLog::new();
        log.append(1.5);
        log.append(2.5);
        assert!(log.is_dirty());

        assert_eq!(log.take_snapshot(), Some(vec![1.5, 2.5]));
        assert!(!log.is_dirty());
        assert_eq!(log.take_snapshot(), None);

        log.append(3.0);
        assert_eq!(log.take_snapshot(), Some(vec![1.5, 2.5, 3.0]));
    }

    #[test]
    fn plain_snapshot_leaves_flag_alone() {
        let log = SampleLog::new();
        log.append(4.0);
        assert_eq!(log.snapshot(), vec![4.0]);
        assert!(log.is_dirty());
    }

    #[test]
    fn clones_share_state() {
        let log = SampleLog::new();
        let producer = log.clone();
        producer.append(7.0);
        assert_eq!(log.len(), 1);
        assert!(log.is_dirty());
    }
}
