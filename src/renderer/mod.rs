//! WebGPU rendering module
//!
//! Bikes, trails and explosions are drawn as flat, alpha-blended triangles
//! built on the CPU each frame from entity attributes.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
