/// Triangle-mesh collision and character physics over static geometry
pub mod character;
pub mod collider;
pub mod geometry;
pub mod spatial_hash;

pub use character::{CharacterController, CharacterState, MoveIntent, StepReport};
pub use collider::Collider;
pub use geometry::{closest_point_on_triangle, ray_triangle, sphere_contact, CollisionTriangle, Contact};
pub use spatial_hash::{SpatialHashXZ, XzBounds};
