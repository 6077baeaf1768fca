//! Uniform random-walk transition table over walkable cells.
//!
//! Each walkable cell is a state of a first-order Markov chain. From a state
//! the chain moves to one of its walkable up/down/left/right neighbours, all
//! with equal probability. Enemies never use the player's column wrap, so the
//! tunnel exits are ordinary cells with a single neighbour here.

use crate::maze::{Cell, Maze};
use rand::Rng;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    pub to: Cell,
    pub prob: f64,
}

#[derive(Clone, Debug, Default)]
pub struct TransitionTable {
    transitions: HashMap<Cell, Vec<Transition>>,
}

impl TransitionTable {
    /// One entry per walkable cell. A fully walled-in cell gets an empty list.
    pub fn build(maze: &Maze) -> Self {
        let mut transitions = HashMap::with_capacity(maze.walkable_cells().len());
        for &cell in maze.walkable_cells() {
            let neighbors = maze.neighbors(cell);
            let prob = if neighbors.is_empty() {
                0.0
            } else {
                1.0 / neighbors.len() as f64
            };
            let list = neighbors
                .into_iter()
                .map(|to| Transition { to, prob })
                .collect();
            transitions.insert(cell, list);
        }
        log::debug!("built transition table with {} states", transitions.len());
        Self { transitions }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Outgoing transitions of `cell`, empty for unknown cells.
    pub fn transitions(&self, cell: Cell) -> &[Transition] {
        self.transitions.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn outgoing_mass(&self, cell: Cell) -> f64 {
        self.transitions(cell).iter().map(|t| t.prob).sum()
    }

    /// States with no way out, sorted.
    pub fn dead_ends(&self) -> Vec<Cell> {
        let mut cells: Vec<Cell> = self
            .transitions
            .iter()
            .filter(|(_, list)| list.is_empty())
            .map(|(cell, _)| *cell)
            .collect();
        cells.sort();
        cells
    }

    /// Draws the next state from `current`. A state without transitions
    /// stays put; if rounding leaves the draw above the accumulated mass,
    /// the last listed transition wins.
    pub fn sample_next(&self, current: Cell, rng: &mut impl Rng) -> Cell {
        let list = self.transitions(current);
        let Some(last) = list.last() else {
            return current;
        };
        let r: f64 = rng.gen();
        let mut acc = 0.0;
        for t in list {
            acc += t.prob;
            if r <= acc {
                return t.to;
            }
        }
        last.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_state_is_stochastic() {
        let maze = Maze::standard();
        let table = TransitionTable::build(&maze);
        assert_eq!(table.len(), maze.walkable_cells().len());
        assert!(table.dead_ends().is_empty());
        for &cell in maze.walkable_cells() {
            let mass = table.outgoing_mass(cell);
            assert!((mass - 1.0).abs() < 1e-9, "{cell:?} sums to {mass}");
        }
    }

    #[test]
    fn destinations_are_walkable_neighbours() {
        let maze = Maze::standard();
        let table = TransitionTable::build(&maze);
        for &cell in maze.walkable_cells() {
            let list = table.transitions(cell);
            assert_eq!(list.len(), maze.neighbors(cell).len());
            for t in list {
                assert!(maze.is_open(t.to));
                assert_eq!(crate::maze::manhattan(cell, t.to), 1);
                assert!((t.prob - 1.0 / list.len() as f64).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn tunnel_mouth_does_not_wrap() {
        let table = TransitionTable::build(&Maze::standard());
        let list = table.transitions(Cell::new(9, 0));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].to, Cell::new(9, 1));
        assert_eq!(list[0].prob, 1.0);
    }

    #[test]
    fn two_way_split_is_even() {
        let maze = Maze::standard();
        let table = TransitionTable::build(&maze);
        let source = Cell::new(1, 1);
        let list = table.transitions(source);
        assert_eq!(list.len(), 2);

        let mut rng = StdRng::seed_from_u64(42);
        let draws = 10_000;
        let mut first = 0;
        for _ in 0..draws {
            let next = table.sample_next(source, &mut rng);
            if next == list[0].to {
                first += 1;
            } else {
                assert_eq!(next, list[1].to);
            }
        }
        let share = first as f64 / draws as f64;
        assert!((share - 0.5).abs() < 0.03, "share was {share}");
    }

    #[test]
    fn walled_in_cell_stays_put() {
        let maze = Maze::parse("#####\n#P#G#\n#####").unwrap();
        let table = TransitionTable::build(&maze);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(table.dead_ends(), vec![Cell::new(1, 1), Cell::new(1, 3)]);
        assert_eq!(table.outgoing_mass(Cell::new(1, 3)), 0.0);
        assert_eq!(table.sample_next(Cell::new(1, 3), &mut rng), Cell::new(1, 3));
    }

    #[test]
    fn unknown_state_stays_put() {
        let table = TransitionTable::build(&Maze::standard());
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(table.sample_next(Cell::new(0, 0), &mut rng), Cell::new(0, 0));
    }

    #[test]
    fn short_mass_falls_back_to_last() {
        let mut table = TransitionTable::default();
        let from = Cell::new(1, 1);
        let a = Cell::new(1, 2);
        let b = Cell::new(2, 1);
        table.transitions.insert(
            from,
            vec![Transition { to: a, prob: 0.0 }, Transition { to: b, prob: 0.0 }],
        );
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(table.sample_next(from, &mut rng), b);
        }
    }
}
