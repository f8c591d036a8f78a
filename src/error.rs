use std::path::PathBuf;

use thiserror::Error;

/// Startup precondition and frame invariant violations.
///
/// None of these are recoverable inside a frame: they are checked once when the
/// engine is built, except `RayEscaped`, which stops the frame loop.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("viewport must be at least 1x1, got {width}x{height}")]
    InvalidViewport { width: usize, height: usize },
    #[error("map has no cells")]
    EmptyMap,
    #[error("map column {column} has {actual} cells, expected {expected}")]
    RaggedMap {
        column: usize,
        expected: usize,
        actual: usize,
    },
    #[error("map border is open at ({x}, {y}); every border cell must be a wall")]
    OpenBorder { x: usize, y: usize },
    #[error("camera direction must not be (0, 0)")]
    DegenerateDirection,
    #[error("camera {field} has a non-finite component")]
    NonFiniteCamera { field: &'static str },
    #[error("camera plane must not be (0, 0)")]
    DegeneratePlane,
    #[error("camera plane is not perpendicular to the direction (dot product {dot})")]
    NonPerpendicularPlane { dot: f64 },
    #[error("field of view must be finite and strictly between 0 and 180 degrees, got {fov}")]
    InvalidFov { fov: f64 },
    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("spawn position ({x}, {y}) is not inside a passable cell")]
    SpawnBlocked { x: f64, y: f64 },
    #[error("ray for column {column} left the map at cell ({x}, {y})")]
    RayEscaped { column: usize, x: i32, y: i32 },
    #[error("failed to read map {path}")]
    MapIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map {path}")]
    MapFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
