use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

pub const VERTICES_PER_SEGMENT: usize = 6;

/// One interleaved vertex record: `position.xyz, normal.xyz`.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WallVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl WallVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
        }
    }
}

fn base(point: Vec2) -> Vec3 {
    Vec3::new(point.x, 0.0, point.y)
}

/// Extrudes the closed ring of `points` into vertical wall quads of the given
/// height, two triangles per point.
///
/// Segment `i` spans `points[i]` and the point before it, with index 0 paired
/// against the last point. Ring coordinates map to the horizontal x/z plane.
pub fn triangulate(points: &[Vec2], height: f32) -> Vec<WallVertex> {
    let n = points.len();
    let mut vertices = Vec::with_capacity(n * VERTICES_PER_SEGMENT);
    let lift = Vec3::Y * height;

    for i in 0..n {
        let prev = (i + n - 1) % n;

        let base_i = base(points[i]);
        let base_prev = base(points[prev]);
        let top_i = base_i + lift;
        let top_prev = base_prev + lift;

        // Matches the counter-clockwise winding of both triangles; zero for a
        // degenerate segment (a single point paired with itself).
        let normal = (base_prev - base_i)
            .cross(top_prev - base_i)
            .normalize_or_zero();

        vertices.extend([
            WallVertex::new(base_i, normal),
            WallVertex::new(base_prev, normal),
            WallVertex::new(top_i, normal),
            WallVertex::new(base_prev, normal),
            WallVertex::new(top_prev, normal),
            WallVertex::new(top_i, normal),
        ]);
    }

    vertices
}
