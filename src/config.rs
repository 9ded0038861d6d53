/// Engine configuration parameters
/// Loaded from TOML; every field has a default so partial files are valid.
use crate::error::ConfigError;
use crate::rendering::Rgba8;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Render configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Global backface culling switch. Primitives can still opt out individually.
    pub backface_culling: bool,
    /// RGBA clear color
    pub clear_color: [u8; 4],
    /// Scene ambient term, applied by `Scene::with_config`
    pub ambient: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            backface_culling: true,
            clear_color: [0, 0, 0, 255],
            ambient: 0.15,
        }
    }
}

impl RenderConfig {
    #[inline]
    pub fn clear_rgba(&self) -> Rgba8 {
        let [r, g, b, a] = self.clear_color;
        Rgba8::new(r, g, b, a)
    }
}

/// Character physics parameters (units are world units and seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (units / s^2)
    pub gravity: f32,
    /// Base horizontal speed
    pub walk_speed: f32,
    /// Horizontal speed multiplier while sprinting
    pub sprint_multiplier: f32,
    /// Vertical speed set by a jump
    pub jump_speed: f32,
    /// Upper clamp on a single tick's dt
    pub max_dt: f32,
    /// Upper bound on substeps per tick
    pub max_substeps: u32,
    /// Max distance a substep may travel, as a fraction of the radius
    pub substep_radius_fraction: f32,
    /// Floor for the per-substep travel limit
    pub min_substep_distance: f32,
    /// Gauss-Seidel penetration passes per substep
    pub resolve_iterations: u32,
    /// Minimum contact normal Y that counts as ground (cos 60°)
    pub ground_normal_min_y: f32,
    /// Spatial hash cell size in the XZ plane
    pub cell_size: f32,
    /// Half-extent of the XZ column searched by downward raycasts
    pub raycast_query_radius: f32,
    /// Collision sphere radius
    pub character_radius: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            walk_speed: 4.5,
            sprint_multiplier: 2.0,
            jump_speed: 7.0,
            max_dt: 0.10,
            max_substeps: 8,
            substep_radius_fraction: 0.5,
            min_substep_distance: 0.05,
            resolve_iterations: 2,
            ground_normal_min_y: 0.5,
            cell_size: 2.0,
            raycast_query_radius: 4.0,
            character_radius: 0.35,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub render: RenderConfig,
    pub physics: PhysicsConfig,
}

impl EngineConfig {
    /// Parse configuration from a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::debug!("loaded engine config from {}", path.display());
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
