use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to create window: {0}")]
    WindowCreation(#[from] winit::error::OsError),

    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create render surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to open graphics device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("shader compilation failed:\n{0}")]
    ShaderCompile(String),

    #[error("pipeline link failed:\n{0}")]
    ProgramLink(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Config {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
