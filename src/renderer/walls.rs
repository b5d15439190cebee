use scanview::scan::{MeshSink, WallVertex};

use crate::renderer::gpu::GpuState;

const INITIAL_CAPACITY: usize = 6 * 1024;

/// GPU-side copy of the wall mesh. Every upload replaces the whole buffer;
/// it is reallocated when a mesh outgrows it.
pub struct WallBuffers {
    buffer: wgpu::Buffer,
    capacity: usize,
    vertex_count: usize,
}

impl WallBuffers {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: Self::create_buffer(device, INITIAL_CAPACITY),
            capacity: INITIAL_CAPACITY,
            vertex_count: 0,
        }
    }

    fn create_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wall Vertex Buffer"),
            size: (capacity * std::mem::size_of::<WallVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, vertices: &[WallVertex]) {
        if vertices.len() > self.capacity {
            let capacity = vertices.len().next_power_of_two();
            log::debug!("growing wall buffer to {capacity} vertices");
            self.buffer = Self::create_buffer(device, capacity);
            self.capacity = capacity;
        }

        if !vertices.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(vertices));
        }
        self.vertex_count = vertices.len();
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count as u32
    }

    pub fn triangle_count(&self) -> u32 {
        (self.vertex_count / 3) as u32
    }
}

impl MeshSink for GpuState {
    fn publish(&mut self, vertices: &[WallVertex]) {
        self.wall_buffers.upload(&self.device, &self.queue, vertices);
    }
}

pub fn wall_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<WallVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    }
}
