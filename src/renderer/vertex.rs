//! Vertex types for 2D rendering
//!
//! Positions are in screen pixels (origin top-left, y down) until the
//! pipeline maps them to clip space.

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.53, 0.81, 0.92, 1.0];
    pub const CLOUD: [f32; 4] = [1.0, 1.0, 1.0, 0.85];
    pub const PIPE: [f32; 4] = [0.2, 0.7, 0.25, 1.0];
    pub const PIPE_CAP: [f32; 4] = [0.15, 0.55, 0.2, 1.0];
    pub const DRONE_BODY: [f32; 4] = [0.25, 0.27, 0.32, 1.0];
    pub const DRONE_ARM: [f32; 4] = [0.15, 0.15, 0.18, 1.0];
    pub const ROTOR: [f32; 4] = [0.8, 0.85, 0.9, 0.7];
    pub const CAMERA: [f32; 4] = [0.1, 0.6, 0.95, 1.0];
    /// Body tint after a crash
    pub const WRECK: [f32; 4] = [0.75, 0.25, 0.2, 1.0];
}
