/// Soft Engine - CPU software rasterizer with triangle-mesh character physics
/// Render and physics share only the scene data model
pub mod camera;
pub mod config;
pub mod error;
pub mod math;
pub mod perf;
pub mod physics;
pub mod rendering;
pub mod scene;

pub use camera::{Camera, FlyCamera, FollowCamera};
pub use config::{EngineConfig, PhysicsConfig, RenderConfig};
pub use error::{ConfigError, Error, MeshError, Result};
pub use perf::{CounterSnapshot, FunctionCounters, FUNCTION_COUNTERS};
pub use physics::{CharacterController, CharacterState, Collider, MoveIntent, SpatialHashXZ};
pub use rendering::{DepthBuffer, Framebuffer, Immediate, PixelSink, Renderer, Rgba8, ViewProjection};
pub use scene::{Material, Mesh, PointLight, Primitive, Scene, Texture, TextureSampler};
