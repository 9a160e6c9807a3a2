use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Horizontal spacing between flat columns.
const COLUMN_SPACING: f32 = 1.1;
/// Half-width factor that centers the flat columns.
const COLUMN_SPREAD: f32 = 1.8;
/// Vertical distance of the paired rows from the center line.
const ROW_HEIGHT: f32 = 1.6;
/// X offset of the paired rows.
const PAIRED_OFFSET: f32 = 3.5;
/// X offset of the strip the ring tiles settle into (ring-local frame).
const STRIP_OFFSET: f32 = 0.1;
/// Y of the strip the ring tiles settle into (ring-local frame).
const STRIP_Y: f32 = -0.8;

/// Row of the flat layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    Upper,
    Lower,
    /// Middle row occupied by the ring tiles once the carousel unfolds.
    Strip,
}

/// The two arrangements a tile can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrangementKind {
    Circular,
    /// Flat columns; the index passed alongside is the column.
    FlatPaired(Row),
}

/// Target position and Euler XYZ rotation of a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub rotation: Vec3,
}

/// Pure mapping from (index, arrangement) to a placement for a fixed tile
/// count and ring radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrangement {
    count: usize,
    radius: f32,
}

impl Arrangement {
    pub fn new(count: usize, radius: f32) -> Self {
        Self {
            count: count.max(1),
            radius,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn target(&self, index: usize, kind: ArrangementKind) -> Placement {
        match kind {
            ArrangementKind::Circular => self.circular(index),
            ArrangementKind::FlatPaired(row) => self.flat(index, row),
        }
    }

    /// Point on the ring, facing consistently around it.
    fn circular(&self, index: usize) -> Placement {
        let angle = index as f32 / self.count as f32 * TAU;
        Placement {
            position: Vec3::new(angle.sin() * self.radius, 0.0, angle.cos() * self.radius),
            rotation: Vec3::new(0.0, PI + angle, 0.0),
        }
    }

    fn flat(&self, column: usize, row: Row) -> Placement {
        let base_x = column as f32 * COLUMN_SPACING - (self.count as f32 / 2.0) * COLUMN_SPREAD;
        let (offset, y) = match row {
            Row::Upper => (PAIRED_OFFSET, ROW_HEIGHT),
            Row::Lower => (PAIRED_OFFSET, -ROW_HEIGHT),
            Row::Strip => (STRIP_OFFSET, STRIP_Y),
        };
        Placement {
            position: Vec3::new(base_x + offset, y, 0.0),
            rotation: Vec3::ZERO,
        }
    }
}
