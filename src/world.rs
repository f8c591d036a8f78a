use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;

/// Fixed-size tile grid. Code 0 is open floor, any other code is a wall.
///
/// Cells are stored column-major so `cell(x, y)` reads `columns[x][y]`.
pub struct World {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

/// Starting camera placement carried by a map file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct Spawn {
    pub pos: [f64; 2],
    pub dir: [f64; 2],
    pub plane: [f64; 2],
}

impl Default for Spawn {
    fn default() -> Self {
        Self {
            pos: [22.0, 12.0],
            dir: [-1.0, 0.0],
            plane: [0.0, 0.66],
        }
    }
}

#[derive(Deserialize)]
struct MapFile {
    columns: Vec<Vec<u8>>,
    #[serde(default)]
    spawn: Option<Spawn>,
}

const DEMO: [[u8; 24]; 24] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 2, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 3, 0, 0, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 2, 0, 2, 2, 0, 0, 0, 0, 3, 0, 3, 0, 3, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 2, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 0, 0, 0, 0, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 4, 4, 4, 4, 4, 4, 4, 4, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

impl World {
    /// Builds a grid from `columns[x][y]`. Every column must have the same length.
    pub fn from_columns(columns: Vec<Vec<u8>>) -> Result<Self, EngineError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyMap);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (column, col) in columns.into_iter().enumerate() {
            if col.len() != height {
                return Err(EngineError::RaggedMap {
                    column,
                    expected: height,
                    actual: col.len(),
                });
            }
            cells.extend(col);
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// The built-in 24x24 level.
    pub fn demo() -> Self {
        Self {
            width: DEMO.len(),
            height: DEMO[0].len(),
            cells: DEMO.iter().flatten().copied().collect(),
        }
    }

    /// Reads a JSON map file, returning the grid and its spawn (or the default one).
    pub fn load(path: &Path) -> Result<(Self, Spawn), EngineError> {
        let text = fs::read_to_string(path).map_err(|source| EngineError::MapIo {
            path: path.to_path_buf(),
            source,
        })?;
        let file: MapFile =
            serde_json::from_str(&text).map_err(|source| EngineError::MapFormat {
                path: path.to_path_buf(),
                source,
            })?;
        let world = Self::from_columns(file.columns)?;
        Ok((world, file.spawn.unwrap_or_default()))
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell code at `(x, y)`, or `None` outside the grid.
    #[inline]
    pub fn cell(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.cells[x as usize * self.height + y as usize])
    }

    /// Open floor inside the grid. Anything outside blocks movement.
    #[inline]
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) == Some(0)
    }

    /// Rays rely on a solid outer ring to terminate; check it once at startup.
    pub fn check_closed_border(&self) -> Result<(), EngineError> {
        let (w, h) = (self.width, self.height);
        let border = (0..w)
            .flat_map(|x| [(x, 0), (x, h - 1)])
            .chain((0..h).flat_map(|y| [(0, y), (w - 1, y)]));

        for (x, y) in border {
            if self.cells[x * h + y] == 0 {
                return Err(EngineError::OpenBorder { x, y });
            }
        }
        Ok(())
    }
}
