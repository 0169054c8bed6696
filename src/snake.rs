use std::collections::VecDeque;

use crate::config::GameConfig;
use crate::{Cell, Millis};
use Direction::*;
use MoveResult::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Right,
    Up,
    Left,
    Down,
}

impl Direction {
    pub fn is_opposite(self, other: Direction) -> bool {
        matches!((self, other), (Up, Down) | (Down, Up) | (Right, Left) | (Left, Right))
    }

    /// Offset of one cell of edge `size` in this direction. Screen y grows downwards.
    pub fn offset(self, size: i32) -> (i32, i32) {
        match self {
            Right => (size, 0),
            Up => (0, -size),
            Left => (-size, 0),
            Down => (0, size),
        }
    }
}

/// One occupied cell, tagged with the direction the snake was heading when it was created.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub pos: Cell,
    pub direction: Direction,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MoveResult {
    Moved { new_head: Cell, old_tail: Cell },
    Waiting,
}

pub struct Snake {
    segments: VecDeque<Segment>,
    direction: Direction,
    direction_locked: bool,
    last_move: Millis,
    move_interval: Millis,
    size: i32,
    start_head: Cell,
    initial_length: usize,
    field_width: i32,
    field_height: i32,
}

impl Snake {
    pub fn new(config: &GameConfig, now: Millis) -> Self {
        let mut snake = Snake {
            segments: VecDeque::with_capacity(config.initial_length),
            direction: Right,
            direction_locked: false,
            last_move: now,
            move_interval: config.move_interval_ms,
            size: config.cell_size,
            start_head: config.start_head(),
            initial_length: config.initial_length,
            field_width: config.field_width,
            field_height: config.field_height,
        };

        snake.reset();
        snake
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.segments.iter().map(|s| s.pos)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn head(&self) -> Cell {
        // Never empty: built with at least one segment and move() pushes before it pops
        self.segments[0].pos
    }

    #[cfg(test)]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn cell_size(&self) -> i32 {
        self.size
    }

    /// Queues a turn for the next move. Reversals, and any second turn before the
    /// next move, are ignored.
    pub fn change_direction(&mut self, new_direction: Direction) {
        if self.direction_locked || new_direction.is_opposite(self.direction) {
            return;
        }

        self.direction = new_direction;
        self.direction_locked = true;
    }

    pub fn move_step(&mut self, now: Millis) -> MoveResult {
        if now.saturating_sub(self.last_move) < self.move_interval {
            return Waiting;
        }

        let (dx, dy) = self.direction.offset(self.size);
        let (x, y) = self.head();
        let new_head = (x + dx, y + dy);

        self.segments.push_front(Segment { pos: new_head, direction: self.direction });
        let old_tail = self.segments.pop_back().map_or(new_head, |s| s.pos);

        self.direction_locked = false;
        self.last_move = now;

        Moved { new_head, old_tail }
    }

    /// Appends a segment on the cell the current tail came from.
    pub fn grow(&mut self) {
        let mut tail = self.segments[self.segments.len() - 1];
        let (dx, dy) = tail.direction.offset(self.size);
        tail.pos = (tail.pos.0 - dx, tail.pos.1 - dy);
        self.segments.push_back(tail);
    }

    /// Whether any segment from `start` onwards sits on `cell`.
    pub fn check_unit_collision(&self, cell: Cell, start: usize) -> bool {
        self.segments.iter().skip(start).any(|s| s.pos == cell)
    }

    pub fn check_side_collision(&self) -> bool {
        let (x, y) = self.head();
        x < 0 || x >= self.field_width || y < 0 || y >= self.field_height
    }

    pub fn reset(&mut self) {
        self.segments.clear();
        self.direction = Right;

        let (dx, dy) = Right.offset(self.size);
        let (x, y) = self.start_head;
        for i in 0..self.initial_length as i32 {
            self.segments.push_back(Segment { pos: (x - dx * i, y - dy * i), direction: Right });
        }
    }
}
