//! Grid primitives shared by the generator, the level state and the renderer.

pub const BASE_GRID_SIZE: usize = 8;
pub const MAX_GRID_SIZE: usize = 16;
pub const WALLS_PER_LEVEL: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance, so diagonal neighbours count as adjacent.
    pub fn chebyshev(self, other: Pos) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Applies a raw delta, returning `None` when the result leaves a
    /// `size`x`size` grid.
    pub fn offset(self, dx: isize, dy: isize, size: usize) -> Option<Pos> {
        let nx = self.x as isize + dx;
        let ny = self.y as isize + dy;
        if nx < 0 || ny < 0 {
            return None;
        }
        let (nx, ny) = (nx as usize, ny as usize);
        if nx >= size || ny >= size {
            return None;
        }
        Some(Pos { x: nx, y: ny })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub const ALL: [Dir; 4] = [Dir::Right, Dir::Down, Dir::Left, Dir::Up];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileKind {
    Wall,
    Exit,
    Trap,
    Freeze,
    Magic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub pos: Pos,
    pub kind: TileKind,
}

/// Side length of the square grid for a level.
pub fn grid_size(level: u32) -> usize {
    (BASE_GRID_SIZE + level as usize / 3).min(MAX_GRID_SIZE)
}

/// Nominal number of walls for a level before the attempt cap applies.
pub fn wall_count(level: u32) -> usize {
    level as usize * WALLS_PER_LEVEL
}

/// Occupancy grid holding at most one tile per cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    size: usize,
    cells: Vec<Option<TileKind>>,
}

impl TileMap {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn start(&self) -> Pos {
        Pos::new(0, 0)
    }

    pub fn exit(&self) -> Pos {
        Pos::new(self.size - 1, self.size - 1)
    }

    pub fn get(&self, pos: Pos) -> Option<TileKind> {
        if pos.x >= self.size || pos.y >= self.size {
            return None;
        }
        self.cells[pos.y * self.size + pos.x]
    }

    pub fn is_empty_at(&self, pos: Pos) -> bool {
        self.get(pos).is_none()
    }

    pub fn set(&mut self, pos: Pos, kind: TileKind) {
        let idx = pos.y * self.size + pos.x;
        self.cells[idx] = Some(kind);
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.cells.iter().filter(|c| **c == Some(kind)).count()
    }

    pub fn find(&self, kind: TileKind) -> Option<Pos> {
        self.tiles().find(|t| t.kind == kind).map(|t| t.pos)
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.map(|kind| Tile {
                pos: Pos::new(idx % self.size, idx / self.size),
                kind,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_grows_every_three_levels_and_caps() {
        assert_eq!(grid_size(1), 8);
        assert_eq!(grid_size(3), 9);
        assert_eq!(grid_size(9), 11);
        assert_eq!(grid_size(20), 14);
        assert_eq!(grid_size(24), 16);
        assert_eq!(grid_size(100), 16);
    }

    #[test]
    fn wall_target_scales_with_level() {
        assert_eq!(wall_count(1), 5);
        assert_eq!(wall_count(3), 15);
        assert_eq!(wall_count(20), 100);
    }

    #[test]
    fn offset_rejects_cells_outside_grid() {
        let origin = Pos::new(0, 0);
        assert_eq!(origin.offset(-1, 0, 8), None);
        assert_eq!(origin.offset(0, -1, 8), None);
        assert_eq!(Pos::new(7, 7).offset(1, 0, 8), None);
        assert_eq!(origin.offset(1, 0, 8), Some(Pos::new(1, 0)));
    }

    #[test]
    fn chebyshev_counts_diagonals_as_adjacent() {
        let p = Pos::new(3, 3);
        assert_eq!(p.chebyshev(Pos::new(4, 4)), 1);
        assert_eq!(p.chebyshev(Pos::new(2, 3)), 1);
        assert_eq!(p.chebyshev(Pos::new(5, 3)), 2);
        assert_eq!(p.chebyshev(p), 0);
    }

    #[test]
    fn tile_map_lists_tiles_in_row_order() {
        let mut map = TileMap::new(4);
        map.set(Pos::new(2, 1), TileKind::Wall);
        map.set(map.exit(), TileKind::Exit);
        let tiles: Vec<_> = map.tiles().collect();
        assert_eq!(
            tiles,
            vec![
                Tile {
                    pos: Pos::new(2, 1),
                    kind: TileKind::Wall
                },
                Tile {
                    pos: Pos::new(3, 3),
                    kind: TileKind::Exit
                },
            ]
        );
        assert_eq!(map.find(TileKind::Exit), Some(Pos::new(3, 3)));
        assert_eq!(map.get(Pos::new(9, 0)), None);
    }
}
