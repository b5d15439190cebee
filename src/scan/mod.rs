pub mod ingest;
pub mod mesher;
pub mod projector;
pub mod sample_log;
pub mod source;
pub mod triangulator;

pub use ingest::IngestWorker;
pub use mesher::{MeshSink, ScanMesher};
pub use projector::project;
pub use sample_log::SampleLog;
pub use source::{ArtificialSource, TokenSource};
pub use triangulator::{WallVertex, triangulate};
