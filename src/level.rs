use std::time::Instant;

use rand::Rng;

use crate::error::GenerationError;
use crate::grid::{Pos, Tile, TileKind, TileMap};
use crate::hazards::{self, MagicGate};
use crate::maze;

/// A level build is retried from scratch this many times before giving up.
pub const MAX_LEVEL_BUILDS: usize = 8;

/// Everything that belongs to the level currently on screen. A new level
/// replaces the whole value.
#[derive(Clone, Debug)]
pub struct LevelState {
    pub number: u32,
    pub epoch: u64,
    pub map: TileMap,
    pub player: Pos,
    pub trap_visible: bool,
    pub trap: Option<Pos>,
    pub freeze: Option<Pos>,
    pub magic: Option<Pos>,
    pub started_at: Instant,
}

impl LevelState {
    /// Generates level `number`, retrying the whole build if a hazard cannot
    /// be placed.
    pub fn generate(
        number: u32,
        epoch: u64,
        gate: &mut MagicGate,
        rng: &mut impl Rng,
        now: Instant,
    ) -> Result<Self, GenerationError> {
        let mut last = None;
        for build in 1..=MAX_LEVEL_BUILDS {
            match Self::build(number, epoch, gate, rng, now) {
                Ok(level) => return Ok(level),
                Err(err @ GenerationError::HazardPlacement { .. }) => {
                    tracing::warn!(level = number, build, error = %err, "retrying level build");
                    last = Some(err);
                }
                Err(err) => return Err(err),
            }
        }
        Err(GenerationError::Exhausted {
            level: number,
            builds: MAX_LEVEL_BUILDS,
            last: Box::new(last.unwrap_or(GenerationError::NoPath { grid_size: 0 })),
        })
    }

    fn build(
        number: u32,
        epoch: u64,
        gate: &mut MagicGate,
        rng: &mut impl Rng,
        now: Instant,
    ) -> Result<Self, GenerationError> {
        let mut map = maze::generate(number, rng)?;
        let trap = hazards::place_trap(&mut map, rng)?;
        let freeze = hazards::place_freeze(&mut map, rng)?;
        let magic = if gate.roll(number, rng) {
            Some(hazards::place_magic(&mut map, rng)?)
        } else {
            None
        };
        if magic.is_some() {
            gate.mark_placed();
        }

        Ok(Self {
            number,
            epoch,
            map,
            player: Pos::new(0, 0),
            trap_visible: true,
            trap: Some(trap),
            freeze: Some(freeze),
            magic,
            started_at: now,
        })
    }

    pub fn grid_size(&self) -> usize {
        self.map.size()
    }

    pub fn exit(&self) -> Pos {
        self.map.exit()
    }

    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        let size = self.grid_size() as isize;
        (0..size).contains(&x) && (0..size).contains(&y)
    }

    /// Walls always block and the freeze tile turns solid while the player is
    /// frozen. The trap is never solid: it only bites while visible, so a trap
    /// sitting on the carved path cannot cut the maze.
    pub fn is_blocked(&self, pos: Pos, frozen: bool) -> bool {
        match self.map.get(pos) {
            Some(TileKind::Wall) => true,
            Some(TileKind::Freeze) => frozen,
            _ => false,
        }
    }

    pub fn trap_nearby(&self) -> bool {
        match self.trap {
            Some(trap) => self.trap_visible && self.player.chebyshev(trap) <= 1,
            None => false,
        }
    }

    pub fn on_visible_trap(&self) -> bool {
        self.trap_visible && self.trap == Some(self.player)
    }

    pub fn on_freeze(&self) -> bool {
        self.freeze == Some(self.player)
    }

    pub fn on_magic(&self) -> bool {
        self.magic == Some(self.player)
    }

    pub fn on_exit(&self) -> bool {
        self.player == self.exit()
    }

    pub fn elapsed(&self, now: Instant) -> f64 {
        now.saturating_duration_since(self.started_at).as_secs_f64()
    }

    pub fn tiles(&self) -> Vec<Tile> {
        self.map.tiles().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::time::Duration;

    fn level(seed: u64) -> LevelState {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut gate = MagicGate::new(16..=20);
        LevelState::generate(1, 1, &mut gate, &mut rng, Instant::now()).unwrap()
    }

    #[test]
    fn fresh_level_starts_player_at_origin_with_one_of_each_hazard() {
        let level = level(4);
        assert_eq!(level.player, Pos::new(0, 0));
        assert_eq!(level.grid_size(), 8);
        assert!(level.trap_visible);
        assert_eq!(level.map.count(TileKind::Trap), 1);
        assert_eq!(level.map.count(TileKind::Freeze), 1);
        assert_eq!(level.map.count(TileKind::Exit), 1);
        assert_eq!(level.map.count(TileKind::Magic), 0);
        assert_eq!(level.trap, level.map.find(TileKind::Trap));
        assert_eq!(level.freeze, level.map.find(TileKind::Freeze));
    }

    #[test]
    fn only_walls_and_frozen_freeze_tile_block() {
        let mut level = level(8);
        let trap = level.trap.unwrap();
        let freeze = level.freeze.unwrap();

        assert!(!level.is_blocked(trap, false));
        level.trap_visible = false;
        assert!(!level.is_blocked(trap, false));
        assert!(!level.is_blocked(trap, true));

        assert!(!level.is_blocked(freeze, false));
        assert!(level.is_blocked(freeze, true));

        assert!(!level.is_blocked(level.exit(), true));
    }

    #[test]
    fn bounds_follow_grid_size() {
        let level = level(3);
        let last = level.grid_size() as isize - 1;
        assert!(level.in_bounds(0, 0));
        assert!(level.in_bounds(last, last));
        assert!(!level.in_bounds(-1, 0));
        assert!(!level.in_bounds(0, last + 1));
    }

    #[test]
    fn trap_proximity_uses_chebyshev_distance() {
        let mut level = level(13);
        let trap = level.trap.unwrap();
        level.player = trap;
        assert!(level.trap_nearby());
        level.trap_visible = false;
        assert!(!level.trap_nearby());
        level.trap_visible = true;
        level.player = Pos::new(
            if trap.x >= 2 { trap.x - 2 } else { trap.x + 2 },
            trap.y,
        );
        assert!(!level.trap_nearby());
    }

    #[test]
    fn elapsed_measures_from_level_start() {
        let level = level(1);
        let later = level.started_at + Duration::from_millis(2500);
        assert!((level.elapsed(later) - 2.5).abs() < 1e-9);
    }
}
