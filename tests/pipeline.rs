use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use approx::assert_abs_diff_eq;
use glam::Vec3;

use scanview::config::DEFAULT_WALL_HEIGHT;
use scanview::scan::{
    IngestWorker, MeshSink, SampleLog, ScanMesher, TokenSource, WallVertex, project, triangulate,
};

#[derive(Default)]
struct RecordingSink {
    vertices: Vec<WallVertex>,
    publishes: usize,
}

impl RecordingSink {
    fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

impl MeshSink for RecordingSink {
    fn publish(&mut self, vertices: &[WallVertex]) {
        self.vertices.clear();
        self.vertices.extend_from_slice(vertices);
        self.publishes += 1;
    }
}

fn wait_for(worker: &IngestWorker) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !worker.is_finished() {
        assert!(Instant::now() < deadline, "ingest did not finish");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn three_samples_publish_a_triangular_prism() {
    let log = SampleLog::new();
    let worker = IngestWorker::spawn(TokenSource::new(Cursor::new("2.0 2.0 2.0")), log.clone(), false);
    wait_for(&worker);

    let mut mesher = ScanMesher::new(log, DEFAULT_WALL_HEIGHT);
    let mut sink = RecordingSink::default();
    assert!(mesher.update(&mut sink));

    assert_eq!(sink.vertices.len(), 18);
    assert_eq!(sink.triangle_count(), 6);

    for v in &sink.vertices {
        let p = Vec3::from_array(v.position);
        assert_abs_diff_eq!(Vec3::new(p.x, 0.0, p.z).length(), 2.0, epsilon = 1e-5);
        assert!(p.y == 0.0 || p.y == DEFAULT_WALL_HEIGHT);
    }
}

#[test]
fn vertex_count_is_six_per_sample() {
    for n in [0usize, 1, 2, 3, 7, 64, 1000] {
        let samples: Vec<f32> = (0..n).map(|i| 1.0 + (i % 13) as f32).collect();
        assert_eq!(triangulate(&project(&samples), 10.0).len(), 6 * n, "n = {n}");
    }
}

#[test]
fn regeneration_without_new_samples_is_identical() {
    let log = SampleLog::new();
    for v in [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.6] {
        log.append(v);
    }

    let first = ScanMesher::rebuild(&log.snapshot(), 10.0);
    let second = ScanMesher::rebuild(&log.snapshot(), 10.0);
    assert_eq!(
        bytemuck::cast_slice::<WallVertex, u8>(&first),
        bytemuck::cast_slice::<WallVertex, u8>(&second)
    );

    let mut mesher = ScanMesher::new(log, 10.0);
    let mut sink = RecordingSink::default();
    assert!(mesher.update(&mut sink));
    assert!(!mesher.update(&mut sink));
    assert_eq!(sink.publishes, 1);
    assert_eq!(sink.vertices, first);
}

#[test]
fn empty_and_single_sample_logs_render_without_error() {
    let log = SampleLog::new();
    let mut mesher = ScanMesher::new(log.clone(), 10.0);
    let mut sink = RecordingSink::default();

    assert!(!mesher.update(&mut sink));
    assert!(sink.vertices.is_empty());

    log.append(5.0);
    assert!(mesher.update(&mut sink));
    assert_eq!(sink.vertices.len(), 6);
    assert!(sink.vertices.iter().all(|v| v.normal.iter().all(|c| c.is_finite())));
}

#[test]
fn snapshots_never_observe_a_torn_append() {
    const APPENDS: usize = 20_000;

    let log = SampleLog::new();
    let producer_log = log.clone();
    let done = Arc::new(AtomicBool::new(false));
    let producer_done = Arc::clone(&done);

    // Sample i has value i, so any valid prefix is exactly 0..len.
    let producer = thread::spawn(move || {
        for i in 0..APPENDS {
            producer_log.append(i as f32);
        }
        producer_done.store(true, Ordering::Release);
    });

    let mut last_len = 0;
    let mut snapshots = 0;
    loop {
        let finished = done.load(Ordering::Acquire);
        let snapshot = log.snapshot();

        assert!(snapshot.len() >= last_len, "log shrank");
        assert!(snapshot.len() <= APPENDS);
        for (i, &v) in snapshot.iter().enumerate() {
            assert_eq!(v, i as f32);
        }
        last_len = snapshot.len();
        snapshots += 1;

        if finished {
            break;
        }
    }

    producer.join().unwrap();
    assert_eq!(last_len, APPENDS);
    assert!(snapshots > 0);
}

#[test]
fn mesher_keeps_up_with_concurrent_ingest() {
    let input: String = (0..2_000).map(|i| format!("{}.5\n", i % 50 + 1)).collect();

    let log = SampleLog::new();
    let worker = IngestWorker::spawn(TokenSource::new(Cursor::new(input)), log.clone(), false);
    let mut mesher = ScanMesher::new(log.clone(), 10.0);
    let mut sink = RecordingSink::default();

    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let finished = worker.is_finished();
        if mesher.update(&mut sink) {
            assert_eq!(sink.vertices.len(), 6 * mesher.published_samples());
        }
        if finished && !log.is_dirty() {
            break;
        }
        assert!(Instant::now() < deadline, "ingest did not finish");
    }

    assert_eq!(worker.accepted(), 2_000);
    assert_eq!(mesher.published_samples(), 2_000);
    assert_eq!(sink.vertices.len(), 12_000);
    assert!(sink.publishes >= 1);
}
