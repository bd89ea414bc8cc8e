//! Trap, freeze and magic tile placement.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::GenerationError;
use crate::grid::{Pos, TileKind, TileMap};

/// Hazard sampling gives up after `cells * HAZARD_ATTEMPT_FACTOR` draws.
pub const HAZARD_ATTEMPT_FACTOR: usize = 10;

/// Drops one `kind` tile on a uniformly drawn empty cell other than the start
/// and exit.
pub fn place_hazard(
    map: &mut TileMap,
    kind: TileKind,
    rng: &mut impl Rng,
) -> Result<Pos, GenerationError> {
    let size = map.size();
    let cap = size * size * HAZARD_ATTEMPT_FACTOR;
    for _ in 0..cap {
        let pos = Pos::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if pos == map.start() || pos == map.exit() || !map.is_empty_at(pos) {
            continue;
        }
        map.set(pos, kind);
        return Ok(pos);
    }
    Err(GenerationError::HazardPlacement {
        kind,
        attempts: cap,
    })
}

pub fn place_trap(map: &mut TileMap, rng: &mut impl Rng) -> Result<Pos, GenerationError> {
    place_hazard(map, TileKind::Trap, rng)
}

pub fn place_freeze(map: &mut TileMap, rng: &mut impl Rng) -> Result<Pos, GenerationError> {
    place_hazard(map, TileKind::Freeze, rng)
}

pub fn place_magic(map: &mut TileMap, rng: &mut impl Rng) -> Result<Pos, GenerationError> {
    place_hazard(map, TileKind::Magic, rng)
}

/// Campaign-wide one-shot gate for the magic tile.
#[derive(Clone, Debug)]
pub struct MagicGate {
    window: RangeInclusive<u32>,
    placed: bool,
}

impl MagicGate {
    pub fn new(window: RangeInclusive<u32>) -> Self {
        Self {
            window,
            placed: false,
        }
    }

    pub fn placed(&self) -> bool {
        self.placed
    }

    /// Rolls a target level from the window and reports whether `level` wins
    /// the draw. The roll happens on every call, open gate or not.
    pub fn roll(&self, level: u32, rng: &mut impl Rng) -> bool {
        let target = rng.gen_range(self.window.clone());
        !self.placed && self.window.contains(&level) && level == target
    }

    /// Closes the gate for the rest of the campaign.
    pub fn mark_placed(&mut self) {
        self.placed = true;
    }
}
