use glam::Vec2;
use std::f32::consts::TAU;

/// Places sample `i` of `n` at angle `TAU * i / n`, with the sample value as
/// radius.
///
/// Angles depend on the current count, so every point shifts slightly each
/// time a sample is appended.
pub fn project(samples: &[f32]) -> Vec<Vec2> {
    let count = samples.len() as f32;

    samples
        .iter()
        .enumerate()
        .map(|(i, &radius)| {
            let angle = i as f32 / count * TAU;
            Vec2::from_angle(angle).rotate(Vec2::X) * radius
        })
        .collect()
}
