//! Built-in plain operations.
//!
//! Each operation takes its type id from the registry's
//! [`StandardOperations`](crate::pipeline::StandardOperations), so all
//! instances of one kind share a node in every pipeline.

pub mod colour_multiplier;
pub mod light_matrix;
pub mod planar_light;
pub mod transform;
pub mod uv_transform;

pub use colour_multiplier::ColourMultiplier;
pub use light_matrix::LightMatrixBrightness;
pub use planar_light::PlanarLightModel;
pub use transform::VertexTransform;
pub use uv_transform::{SpriteRegion, SpriteUvTransform};
