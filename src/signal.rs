//! The signal board.
//!
//! A board is a grid of independent weighted draws. It is cosmetic: it has
//! no relationship to any real game outcome, and the only guarantees are
//! per-cell independence and the declared weights.

use rand::Rng;
use serde::Serialize;
use strum::AsRefStr;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;

/// Classification weights out of 100. Risky takes the remainder.
const SAFE_WEIGHT: u32 = 60;
const MEDIUM_WEIGHT: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CellRisk {
    Safe,
    Medium,
    Risky,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignalCell {
    pub row: usize,
    pub col: usize,
    pub risk: CellRisk,
}

/// Generate a `rows` x `cols` board of independent weighted draws.
pub fn generate_grid(rows: usize, cols: usize) -> Vec<Vec<SignalCell>> {
    let mut rng = rand::thread_rng();
    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| SignalCell {
                    row,
                    col,
                    risk: classify(rng.gen_range(0..100)),
                })
                .collect()
        })
        .collect()
}

fn classify(roll: u32) -> CellRisk {
    if roll < SAFE_WEIGHT {
        CellRisk::Safe
    } else if roll < SAFE_WEIGHT + MEDIUM_WEIGHT {
        CellRisk::Medium
    } else {
        CellRisk::Risky
    }
}
