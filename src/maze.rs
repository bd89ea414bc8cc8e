//! Guaranteed-solvable maze construction.
//!
//! A randomized depth-first search carves a start-to-exit path on the empty
//! grid first; walls are then scattered by rejection sampling anywhere off
//! that path, so the exit always stays reachable no matter how many walls
//! land.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::GenerationError;
use crate::grid::{grid_size, wall_count, Dir, Pos, TileKind, TileMap};

/// Wall sampling gives up after `wall_count * WALL_ATTEMPT_FACTOR` draws.
pub const WALL_ATTEMPT_FACTOR: usize = 10;

struct Frame {
    pos: Pos,
    dirs: [Dir; 4],
    next: usize,
}

fn shuffled_dirs(rng: &mut impl Rng) -> [Dir; 4] {
    let mut dirs = Dir::ALL;
    dirs.shuffle(rng);
    dirs
}

/// Finds a path from the top-left to the bottom-right corner of an empty
/// `size`x`size` grid.
///
/// The returned cells are the DFS stack at the moment the exit was reached,
/// start and exit included.
pub fn carve_path(size: usize, rng: &mut impl Rng) -> Result<Vec<Pos>, GenerationError> {
    if size == 0 {
        return Err(GenerationError::NoPath { grid_size: size });
    }
    let start = Pos::new(0, 0);
    let target = Pos::new(size - 1, size - 1);
    if start == target {
        return Ok(vec![start]);
    }

    let mut visited = vec![false; size * size];
    visited[0] = true;
    let mut stack = vec![Frame {
        pos: start,
        dirs: shuffled_dirs(rng),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            // dead end
            stack.pop();
            continue;
        }
        let (dx, dy) = frame.dirs[frame.next].delta();
        frame.next += 1;
        let Some(next) = frame.pos.offset(dx, dy, size) else {
            continue;
        };
        if visited[next.y * size + next.x] {
            continue;
        }
        if next == target {
            let mut path: Vec<Pos> = stack.iter().map(|f| f.pos).collect();
            path.push(next);
            return Ok(path);
        }
        visited[next.y * size + next.x] = true;
        stack.push(Frame {
            pos: next,
            dirs: shuffled_dirs(rng),
            next: 0,
        });
    }

    Err(GenerationError::NoPath { grid_size: size })
}

/// Scatters up to `wall_count(level)` walls off the path and returns how many
/// were placed. Falling short of the target once the attempt cap is hit is
/// not an error.
pub fn scatter_walls(map: &mut TileMap, path: &[Pos], level: u32, rng: &mut impl Rng) -> usize {
    let size = map.size();
    let target = wall_count(level);
    let cap = target * WALL_ATTEMPT_FACTOR;

    let mut on_path = vec![false; size * size];
    for p in path {
        on_path[p.y * size + p.x] = true;
    }

    let mut placed = 0;
    let mut attempts = 0;
    while placed < target && attempts < cap {
        attempts += 1;
        let pos = Pos::new(rng.gen_range(0..size), rng.gen_range(0..size));
        if pos == map.start() || pos == map.exit() || on_path[pos.y * size + pos.x] {
            continue;
        }
        if !map.is_empty_at(pos) {
            continue;
        }
        map.set(pos, TileKind::Wall);
        placed += 1;
    }

    if placed < target {
        tracing::debug!(level, placed, target, attempts, "wall placement under-filled");
    }
    placed
}

/// Builds the walls and exit for `level`. Hazards are layered on afterwards
/// by [`crate::hazards`].
pub fn generate(level: u32, rng: &mut impl Rng) -> Result<TileMap, GenerationError> {
    let size = grid_size(level);
    let path = carve_path(size, rng)?;
    let mut map = TileMap::new(size);
    scatter_walls(&mut map, &path, level, rng);
    let exit = map.exit();
    map.set(exit, TileKind::Exit);
    Ok(map)
}
