/// Error types for scene construction and configuration loading.
/// Rendering and physics hot paths are infallible; everything that can
/// fail is detected once, when a mesh or config is built.
use thiserror::Error;

/// Structural problems in mesh data, caught at build time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    #[error("triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh has {uvs} uv coordinates for {positions} positions")]
    UvCountMismatch { uvs: usize, positions: usize },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
