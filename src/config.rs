use glam::Vec3;

use crate::error::{Result, ScanError};

pub const DEFAULT_WALL_HEIGHT: f32 = 10.0;

pub const ENV_WALL_HEIGHT: &str = "SCAN_WALL_HEIGHT";
pub const ENV_ARTIFICIAL_INPUT: &str = "SCAN_ARTIFICIAL_INPUT";
pub const ENV_ECHO: &str = "SCAN_ECHO";
pub const ENV_VSYNC: &str = "SCAN_VSYNC";

#[derive(Clone, Debug, PartialEq)]
pub struct ScanConfig {
    pub wall_height: f32,

    pub window_title: String,
    pub window_size: (u32, u32),
    pub vsync: bool,

    /// Feed the built-in synthetic ramp instead of reading stdin.
    pub artificial_input: bool,
    pub echo_samples: bool,

    pub camera_position: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            wall_height: DEFAULT_WALL_HEIGHT,

            window_title: "Scan".to_string(),
            window_size: (512, 512),
            vsync: true,

            artificial_input: false,
            echo_samples: true,

            camera_position: Vec3::new(0.0, 3.0, 0.0),
            fov_degrees: 90.0,
            near: 0.1,
            far: 100.0,
            move_speed: 3.0,
            mouse_sensitivity: 0.004,
        }
    }
}

impl ScanConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults, overridden by whatever `lookup` returns
    /// for the `SCAN_*` keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_WALL_HEIGHT) {
            config.wall_height = parse_height(&raw)?;
        }
        if let Some(raw) = lookup(ENV_ARTIFICIAL_INPUT) {
            config.artificial_input = parse_bool(ENV_ARTIFICIAL_INPUT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_ECHO) {
            config.echo_samples = parse_bool(ENV_ECHO, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VSYNC) {
            config.vsync = parse_bool(ENV_VSYNC, &raw)?;
        }

        Ok(config)
    }
}

fn parse_height(raw: &str) -> Result<f32> {
    let invalid = |reason| ScanError::Config {
        key: ENV_WALL_HEIGHT,
        value: raw.to_string(),
        reason,
    };

    let height: f32 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("not a number"))?;

    if !height.is_finite() || height <= 0.0 {
        return Err(invalid("must be a finite positive number"));
    }

    Ok(height)
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ScanError::Config {
            key,
            value: raw.to_string(),
            reason: "expected a boolean",
        }),
    }
}
