pub mod camera;
pub mod gpu;
pub mod walls;

pub use camera::Camera;
pub use gpu::GpuState;
