//! Static maze grid, collectible layouts and the enemy spawn heuristic.

use crate::error::MazeError;
use rand::seq::SliceRandom;
use rand::Rng;

/// Grid of flags with the maze's dimensions, indexed `grid[row][col]`.
pub type PelletGrid = Vec<Vec<bool>>;

const STANDARD_LAYOUT: &[&str] = &[
    "############################",
    "#o........................o#",
    "#.####.#.##.####.##.#.####.#",
    "#.####.#.##.####.##.#.####.#",
    "#......#............#......#",
    "###.##...##.##.####.######.#",
    "###.##.#...................#",
    "###....####.##.####.########",
    "####.#.##........##.########",
    ".......##.##..##.##.........",
    "######.##.#....#.##.########",
    "######.##...##...##.########",
    "######.##.#.##.#.##.########",
    "######....#..G.#....########",
    "######.##.##..##.##.########",
    "######.##.#....#.##.########",
    ".......##...##...##.........",
    "######.##.#....#.##.##.#####",
    "######.##.######.##.##.#####",
    "######.##........##.##.#####",
    "######.####.##.####.##.#####",
    "######.####.##.####.##.#####",
    "#............P.............#",
    "#.####.#####.#####.#####.#.#",
    "#.####.#####.#####.#####.#.#",
    "#...#..........#....##.....#",
    "#o#.#.##.##.##.#.##.##.###o#",
    "#.#.#.##.##.##.#.##.##.###.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
}

/// Grid coordinate. Rows grow downwards, columns grow to the right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
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
    pub const ALL: [Dir; 4] = [Dir::Up, Dir::Down, Dir::Left, Dir::Right];

    /// `(row, col)` offset of one step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Dir::Up => (-1, 0),
            Dir::Down => (1, 0),
            Dir::Left => (0, -1),
            Dir::Right => (0, 1),
        }
    }
}

pub fn manhattan(a: Cell, b: Cell) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

/// Immutable maze definition. Built once, shared by every session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: usize,
    height: usize,
    grid: Vec<Vec<Tile>>,
    power_pellets: Vec<Cell>,
    player_spawn: Cell,
    enemy_spawn: Cell,
    walkable: Vec<Cell>,
}

impl Maze {
    /// The built-in 30x28 board with tunnels on rows 9 and 16.
    pub fn standard() -> Self {
        Self::parse(&STANDARD_LAYOUT.join("\n")).expect("built-in layout is valid")
    }

    /// Parses a text layout: `#` wall, `.` open, `o` power pellet,
    /// `P` player spawn, `G` enemy spawn. Blank lines are ignored.
    pub fn parse(layout: &str) -> Result<Self, MazeError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MazeError::Empty);
        }

        let width = lines[0].chars().count();
        let height = lines.len();
        let mut grid = Vec::with_capacity(height);
        let mut power_pellets = Vec::new();
        let mut player_spawn = None;
        let mut enemy_spawn = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(MazeError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            let mut tiles = Vec::with_capacity(width);
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::new(row, col);
                let tile = match ch {
                    '#' => Tile::Wall,
                    '.' => Tile::Open,
                    'o' => {
                        power_pellets.push(cell);
                        Tile::Open
                    }
                    'P' => {
                        if player_spawn.replace(cell).is_some() {
                            return Err(MazeError::DuplicateSpawn("player"));
                        }
                        Tile::Open
                    }
                    'G' => {
                        if enemy_spawn.replace(cell).is_some() {
                            return Err(MazeError::DuplicateSpawn("enemy"));
                        }
                        Tile::Open
                    }
                    _ => return Err(MazeError::UnknownTile { row, col, ch }),
                };
                tiles.push(tile);
            }
            grid.push(tiles);
        }

        check_border(&grid, width, height)?;

        let player_spawn = player_spawn.ok_or(MazeError::MissingSpawn("player"))?;
        let enemy_spawn = enemy_spawn.ok_or(MazeError::MissingSpawn("enemy"))?;

        let mut walkable = Vec::new();
        for (row, tiles) in grid.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                if *tile == Tile::Open {
                    walkable.push(Cell::new(row, col));
                }
            }
        }

        log::debug!(
            "parsed {}x{} maze with {} walkable cells",
            height,
            width,
            walkable.len()
        );

        Ok(Self {
            width,
            height,
            grid,
            power_pellets,
            player_spawn,
            enemy_spawn,
            walkable,
        })
    }

    /// Replaces the designated power-pellet cells. Cells that are not
    /// walkable are kept here but never receive a power pellet.
    pub fn with_power_pellets(mut self, cells: impl IntoIterator<Item = Cell>) -> Self {
        self.power_pellets = cells.into_iter().collect();
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player_spawn(&self) -> Cell {
        self.player_spawn
    }

    pub fn enemy_spawn(&self) -> Cell {
        self.enemy_spawn
    }

    pub fn power_pellet_positions(&self) -> &[Cell] {
        &self.power_pellets
    }

    /// Every open cell in row-major order.
    pub fn walkable_cells(&self) -> &[Cell] {
        &self.walkable
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.grid.get(cell.row).and_then(|r| r.get(cell.col)).copied()
    }

    /// True iff `(row, col)` is inside the grid and open. Never panics.
    pub fn is_walkable(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        self.tile(Cell::new(row as usize, col as usize)) == Some(Tile::Open)
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.tile(cell) == Some(Tile::Open)
    }

    /// Walkable 4-neighbours of `cell` in `Dir::ALL` order. No wrap-around.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        let mut out = Vec::with_capacity(4);
        for dir in Dir::ALL {
            let (dr, dc) = dir.delta();
            let nr = cell.row as isize + dr;
            let nc = cell.col as isize + dc;
            if self.is_walkable(nr, nc) {
                out.push(Cell::new(nr as usize, nc as usize));
            }
        }
        out
    }

    /// Player movement rule: columns wrap around, rows do not. Returns
    /// `None` when the target is off-grid or a wall.
    pub fn wrapped_step(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let nr = cell.row as isize + dr;
        let mut nc = cell.col as isize + dc;
        if nc < 0 {
            nc = self.width as isize - 1;
        } else if nc >= self.width as isize {
            nc = 0;
        }
        if !self.is_walkable(nr, nc) {
            return None;
        }
        Some(Cell::new(nr as usize, nc as usize))
    }

    /// Every open cell holds a pellet except the power-pellet cells.
    pub fn create_initial_pellets(&self) -> PelletGrid {
        let mut pellets = vec![vec![false; self.width]; self.height];
        for cell in &self.walkable {
            pellets[cell.row][cell.col] = !self.power_pellets.contains(cell);
        }
        pellets
    }

    /// Exactly the designated power-pellet cells that are walkable.
    pub fn create_initial_power_pellets(&self) -> PelletGrid {
        let mut power = vec![vec![false; self.width]; self.height];
        for cell in &self.power_pellets {
            if self.is_open(*cell) {
                power[cell.row][cell.col] = true;
            }
        }
        power
    }

    /// Uniform pick among walkable cells at Manhattan distance of at least
    /// `min_distance` from `reference`, or among all walkable cells when none
    /// qualifies.
    pub fn spawn_far_from(&self, reference: Cell, min_distance: usize, rng: &mut impl Rng) -> Cell {
        let candidates: Vec<Cell> = self
            .walkable
            .iter()
            .copied()
            .filter(|c| manhattan(*c, reference) >= min_distance)
            .collect();
        let pool = if candidates.is_empty() {
            &self.walkable
        } else {
            &candidates
        };
        pool.choose(rng).copied().unwrap_or(self.enemy_spawn)
    }
}

fn check_border(grid: &[Vec<Tile>], width: usize, height: usize) -> Result<(), MazeError> {
    for row in [0, height - 1] {
        if let Some(col) = grid[row].iter().position(|t| *t == Tile::Open) {
            return Err(MazeError::OpenBorder { row, col });
        }
    }
    for (row, tiles) in grid.iter().enumerate() {
        let left = tiles[0] == Tile::Open;
        let right = tiles[width - 1] == Tile::Open;
        if left != right {
            return Err(MazeError::BrokenTunnel { row });
        }
    }
    Ok(())
}
