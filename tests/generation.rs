use std::collections::VecDeque;
use std::time::Instant;

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use maze_quest::config::MAGIC_WINDOW;
use maze_quest::grid::{grid_size, wall_count, TileMap};
use maze_quest::hazards::MagicGate;
use maze_quest::level::LevelState;
use maze_quest::{Pos, TileKind};

fn exit_reachable(map: &TileMap) -> bool {
    let size = map.size();
    let mut seen = vec![false; size * size];
    let mut queue = VecDeque::from([map.start()]);
    seen[0] = true;
    while let Some(pos) = queue.pop_front() {
        if pos == map.exit() {
            return true;
        }
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let Some(next) = pos.offset(dx, dy, size) else {
                continue;
            };
            let idx = next.y * size + next.x;
            if !seen[idx] && map.get(next) != Some(TileKind::Wall) {
                seen[idx] = true;
                queue.push_back(next);
            }
        }
    }
    false
}

#[test]
fn grid_grows_every_third_level() {
    assert_eq!(grid_size(1), 8);
    assert_eq!(grid_size(2), 8);
    assert_eq!(grid_size(3), 9);
    assert_eq!(grid_size(9), 11);
    assert_eq!(grid_size(20), 14);
}

mod proptests {
    use super::*;

    proptest! {
        #[test]
        fn generated_levels_are_solvable(seed in 0u64..1000, number in 1u32..=20) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut gate = MagicGate::new(MAGIC_WINDOW);
            let level = LevelState::generate(number, 1, &mut gate, &mut rng, Instant::now()).unwrap();
            let size = grid_size(number);
            let map = &level.map;

            prop_assert_eq!(level.grid_size(), size);
            prop_assert_eq!(level.player, Pos::new(0, 0));
            prop_assert!(level.trap_visible);
            prop_assert!(exit_reachable(map));
            prop_assert!(map.count(TileKind::Wall) <= wall_count(number));
            prop_assert_eq!(map.count(TileKind::Exit), 1);
            prop_assert_eq!(map.find(TileKind::Exit), Some(Pos::new(size - 1, size - 1)));
            prop_assert_eq!(map.get(Pos::new(0, 0)), None);
        }

        #[test]
        fn hazards_sit_on_distinct_free_cells(seed in 0u64..1000, number in 1u32..=20) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut gate = MagicGate::new(MAGIC_WINDOW);
            let level = LevelState::generate(number, 1, &mut gate, &mut rng, Instant::now()).unwrap();
            let map = &level.map;

            let trap = level.trap.unwrap();
            let freeze = level.freeze.unwrap();
            prop_assert_ne!(trap, freeze);
            prop_assert_eq!(map.get(trap), Some(TileKind::Trap));
            prop_assert_eq!(map.get(freeze), Some(TileKind::Freeze));
            for pos in [Some(trap), Some(freeze), level.magic].into_iter().flatten() {
                prop_assert_ne!(pos, map.start());
                prop_assert_ne!(pos, map.exit());
            }
            if let Some(magic) = level.magic {
                prop_assert!(MAGIC_WINDOW.contains(&number));
                prop_assert!(gate.placed());
                prop_assert_eq!(map.get(magic), Some(TileKind::Magic));
                prop_assert_ne!(magic, trap);
                prop_assert_ne!(magic, freeze);
            } else {
                prop_assert!(!gate.placed());
            }
        }
    }
}
