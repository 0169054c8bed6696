use rand::Rng;

use crate::config::GameConfig;
use crate::Cell;

/// A single food item. It knows nothing about the snake, so callers re-roll
/// with `respawn` until the cell is free.
pub struct Food {
    pos: Cell,
    size: i32,
    columns: i32,
    rows: i32,
}

impl Food {
    pub fn new<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let mut food = Food {
            pos: (0, 0),
            size: config.cell_size,
            columns: config.columns(),
            rows: config.rows(),
        };

        food.respawn(rng);
        food
    }

    pub fn pos(&self) -> Cell {
        self.pos
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    #[cfg(test)]
    pub fn set_pos(&mut self, pos: Cell) {
        self.pos = pos;
    }

    /// Moves to a uniformly random cell of the field.
    pub fn respawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.pos = (
            rng.gen_range(0..self.columns) * self.size,
            rng.gen_range(0..self.rows) * self.size,
        );
    }
}
