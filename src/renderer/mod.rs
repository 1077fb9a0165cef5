//! WebGPU rendering module
//!
//! The scene is rebuilt from `GameState` every accepted frame as a flat
//! triangle list and drawn in a single pass.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::{RenderState, screen_to_ndc};
pub use shapes::build_scene;
pub use vertex::Vertex;
