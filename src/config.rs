use std::{fs, io::ErrorKind, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Cell, Millis};

// Keeps the bordered field addressable with terminal coordinates
pub(crate) const MAX_COLUMNS: i32 = 1000;
pub(crate) const MAX_ROWS: i32 = 1000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

/// Dimensions, pacing and colors shared by the snake, the food and the controller.
///
/// Field dimensions are in logical units; every entity position is a multiple of `cell_size`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub field_width: i32,
    pub field_height: i32,
    pub cell_size: i32,
    pub initial_length: usize,
    pub move_interval_ms: Millis,
    pub frame_budget_ms: Millis,
    pub snake_color: Rgb,
    pub food_color: Rgb,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            field_width: 640,
            field_height: 480,
            cell_size: 20,
            initial_length: 3,
            move_interval_ms: 150,
            frame_budget_ms: 16,
            snake_color: Rgb::new(0, 255, 0),
            food_color: Rgb::new(255, 0, 0),
        }
    }
}

impl GameConfig {
    /// Reads a YAML config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        let config = match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content)?,
            Err(err) if err.kind() == ErrorKind::NotFound => GameConfig::default(),
            Err(err) => return Err(format!("Failed to read config file {}: {}", path.display(), err)),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        serde_yaml_ng::from_str(content).map_err(|e| format!("Failed to deserialize config: {}", e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size <= 0 {
            return Err("Cell size must be positive".to_string());
        }
        if self.field_width <= 0 || self.field_width % self.cell_size != 0 {
            return Err("Field width must be a positive multiple of the cell size".to_string());
        }
        if self.field_height <= 0 || self.field_height % self.cell_size != 0 {
            return Err("Field height must be a positive multiple of the cell size".to_string());
        }
        if self.columns() > MAX_COLUMNS || self.rows() > MAX_ROWS {
            return Err(format!(
                "Field is {}x{} cells, at most {}x{} are supported",
                self.columns(), self.rows(), MAX_COLUMNS, MAX_ROWS
            ));
        }
        if self.initial_length >= (self.columns() * self.rows()) as usize {
            return Err("Initial snake length must leave at least one free cell for food".to_string());
        }
        if self.initial_length == 0 || self.initial_length > (self.columns() / 2 + 1) as usize {
            return Err(format!(
                "Initial snake length must be between 1 and {}",
                self.columns() / 2 + 1
            ));
        }
        if self.move_interval_ms == 0 {
            return Err("Move interval must be at least 1ms".to_string());
        }
        Ok(())
    }

    pub fn columns(&self) -> i32 {
        self.field_width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.field_height / self.cell_size
    }

    /// The centre cell, where a fresh snake puts its head.
    pub fn start_head(&self) -> Cell {
        (self.columns() / 2 * self.cell_size, self.rows() / 2 * self.cell_size)
    }

    pub fn contains(&self, (x, y): Cell) -> bool {
        x >= 0 && x < self.field_width && y >= 0 && y < self.field_height
    }
}
