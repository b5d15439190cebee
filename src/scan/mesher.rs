use crate::scan::projector::project;
use crate::scan::sample_log::SampleLog;
use crate::scan::triangulator::{WallVertex, triangulate};

/// Receiver of a freshly triangulated wall mesh. Each call replaces whatever
/// was published before.
pub trait MeshSink {
    fn publish(&mut self, vertices: &[WallVertex]);
}

/// Rebuilds the wall mesh from a [`SampleLog`] whenever it has grown.
pub struct ScanMesher {
    log: SampleLog,
    height: f32,
    published_samples: usize,
    rebuilds: u64,
}

impl ScanMesher {
    pub fn new(log: SampleLog, height: f32) -> Self {
        Self {
            log,
            height,
            published_samples: 0,
            rebuilds: 0,
        }
    }

    pub fn rebuild(samples: &[f32], height: f32) -> Vec<WallVertex> {
        triangulate(&project(samples), height)
    }

    /// Runs one regeneration pass if new samples arrived. The log lock is
    /// held only for the snapshot copy.
    pub fn update<S: MeshSink + ?Sized>(&mut self, sink: &mut S) -> bool {
        let Some(samples) = self.log.take_snapshot() else {
            return false;
        };

        log::debug!("Regenerating mesh from {} samples", samples.len());

        let vertices = Self::rebuild(&samples, self.height);
        sink.publish(&vertices);

        self.published_samples = samples.len();
        self.rebuilds += 1;

        log::debug!(
            "Done regenerating mesh: {} vertices, {} triangles",
            vertices.len(),
            vertices.len() / 3
        );

        true
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn published_samples(&self) -> usize {
        self.published_samples
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds
    }
}
