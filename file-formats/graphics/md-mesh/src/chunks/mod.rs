//! Record types stored in the sections of an MD mesh file

pub mod bone;
pub mod node;
pub mod vertex;

pub use bone::Bone;
pub use node::Node;
pub use vertex::{AttributeFormat, Vertex, VertexAttribute};
