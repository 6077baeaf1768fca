//! A single play-through: player, enemies, collectibles, score and mode flags.
//!
//! The session is driven by three inputs only: lifecycle signals
//! ([`Session::start`], [`Session::restart`]), movement intents
//! ([`Session::move_player`]) and elapsed time ([`Session::advance`]).
//! Enemy steps and the end of frightened mode are timers on the session's
//! own logical clock, re-armed whenever the mode changes.

use crate::config::Rules;
use crate::maze::{Cell, Dir, Maze, PelletGrid};
use crate::markov::TransitionTable;
use crate::timer::{TimerId, Timers};
use rand::Rng;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Active,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Session is not active.
    Ignored,
    /// Target is a wall or off-grid.
    Blocked,
    Moved,
    /// Moved onto an enemy.
    Caught,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Event {
    EnemyStep,
    FrightenedOver,
}

/// Everything a renderer needs after an input or a tick.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub player: Cell,
    pub facing: Dir,
    pub enemies: &'a [Cell],
    pub pellets: &'a PelletGrid,
    pub power_pellets: &'a PelletGrid,
    pub score: u32,
    pub enemy_cap: usize,
    pub pellets_left: usize,
    pub phase: Phase,
    pub frightened: bool,
}

pub struct Session {
    maze: Maze,
    table: TransitionTable,
    rules: Rules,
    phase: Phase,
    player: Cell,
    facing: Dir,
    enemies: Vec<Cell>,
    pellets: PelletGrid,
    power_pellets: PelletGrid,
    pellets_left: usize,
    score: u32,
    frightened: bool,
    timers: Timers<Event>,
    enemy_timer: Option<TimerId>,
    frightened_timer: Option<TimerId>,
}

impl Session {
    pub fn new(maze: Maze, rules: Rules) -> Self {
        let table = TransitionTable::build(&maze);
        let pellets = maze.create_initial_pellets();
        let power_pellets = maze.create_initial_power_pellets();
        let pellets_left = count(&pellets) + count(&power_pellets);
        Self {
            player: maze.player_spawn(),
            facing: Dir::Right,
            enemies: vec![maze.enemy_spawn()],
            maze,
            table,
            rules,
            phase: Phase::NotStarted,
            pellets,
            power_pellets,
            pellets_left,
            score: 0,
            frightened: false,
            timers: Timers::new(),
            enemy_timer: None,
            frightened_timer: None,
        }
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened
    }

    pub fn player(&self) -> Cell {
        self.player
    }

    pub fn facing(&self) -> Dir {
        self.facing
    }

    pub fn enemies(&self) -> &[Cell] {
        &self.enemies
    }

    pub fn pellets(&self) -> &PelletGrid {
        &self.pellets
    }

    pub fn power_pellets(&self) -> &PelletGrid {
        &self.power_pellets
    }

    pub fn pellets_left(&self) -> usize {
        self.pellets_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Session clock, advanced only by [`Session::advance`].
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            player: self.player,
            facing: self.facing,
            enemies: &self.enemies,
            pellets: &self.pellets,
            power_pellets: &self.power_pellets,
            score: self.score,
            enemy_cap: self.rules.max_enemies,
            pellets_left: self.pellets_left,
            phase: self.phase,
            frightened: self.frightened,
        }
    }

    /// NotStarted -> Active. Returns false in any other phase.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::NotStarted {
            return false;
        }
        self.phase = Phase::Active;
        self.arm_enemy_timer();
        log::info!("session started, {} pellets on the board", self.pellets_left);
        true
    }

    /// Back to NotStarted with fresh collectibles, spawns and score.
    pub fn restart(&mut self) {
        self.timers.cancel_all();
        self.enemy_timer = None;
        self.frightened_timer = None;
        self.phase = Phase::NotStarted;
        self.player = self.maze.player_spawn();
        self.facing = Dir::Right;
        self.enemies = vec![self.maze.enemy_spawn()];
        self.pellets = self.maze.create_initial_pellets();
        self.power_pellets = self.maze.create_initial_power_pellets();
        self.pellets_left = count(&self.pellets) + count(&self.power_pellets);
        self.score = 0;
        self.frightened = false;
        log::info!("session reset");
    }

    /// One step of the player. Columns wrap, rows and walls block.
    pub fn move_player(&mut self, dir: Dir, rng: &mut impl Rng) -> MoveOutcome {
        if self.phase != Phase::Active {
            return MoveOutcome::Ignored;
        }
        let Some(next) = self.maze.wrapped_step(self.player, dir) else {
            return MoveOutcome::Blocked;
        };
        self.player = next;
        self.facing = dir;

        if take(&mut self.power_pellets, next) {
            self.pellets_left = self.pellets_left.saturating_sub(1);
            self.score += self.rules.power_pellet_score;
            self.enter_frightened();
        }
        if take(&mut self.pellets, next) {
            self.pellets_left = self.pellets_left.saturating_sub(1);
            self.score += self.rules.pellet_score;
            self.maybe_spawn_enemy(rng);
        }

        if self.check_collision() {
            return MoveOutcome::Caught;
        }
        MoveOutcome::Moved
    }

    /// Advances the clock by `elapsed`, firing every timer that falls due.
    pub fn advance(&mut self, elapsed: Duration, rng: &mut impl Rng) {
        let until = self.timers.now() + elapsed;
        while self.phase == Phase::Active {
            let Some((id, event)) = self.timers.pop_due(until) else {
                break;
            };
            match event {
                Event::EnemyStep => {
                    self.step_enemies(rng);
                }
                Event::FrightenedOver => {
                    if self.frightened_timer == Some(id) {
                        self.end_frightened();
                    }
                }
            }
        }
        self.timers.set_now(until);
    }

    /// Moves every enemy one independent step along the chain. Returns true
    /// when this ends the game.
    pub fn step_enemies(&mut self, rng: &mut impl Rng) -> bool {
        if self.phase != Phase::Active {
            return false;
        }
        for enemy in self.enemies.iter_mut() {
            *enemy = self.table.sample_next(*enemy, rng);
        }
        self.check_collision()
    }

    fn maybe_spawn_enemy(&mut self, rng: &mut impl Rng) {
        if self.enemies.len() >= self.rules.max_enemies {
            return;
        }
        let needed = (self.enemies.len() as u32).saturating_mul(self.rules.points_per_enemy);
        if self.score < needed {
            return;
        }
        let cell = self
            .maze
            .spawn_far_from(self.player, self.rules.spawn_min_distance, rng);
        self.enemies.push(cell);
        log::debug!(
            "score {} spawned enemy {} at {:?}",
            self.score,
            self.enemies.len(),
            cell
        );
    }

    fn enter_frightened(&mut self) {
        if let Some(id) = self.frightened_timer.take() {
            self.timers.cancel(id);
        }
        self.frightened_timer = Some(
            self.timers
                .schedule_once(Event::FrightenedOver, self.rules.frightened_duration),
        );
        if !self.frightened {
            self.frightened = true;
            self.arm_enemy_timer();
        }
        log::debug!("frightened until {:?}", self.now() + self.rules.frightened_duration);
    }

    fn end_frightened(&mut self) {
        self.frightened = false;
        self.frightened_timer = None;
        self.arm_enemy_timer();
        log::debug!("frightened mode over at {:?}", self.now());
    }

    fn arm_enemy_timer(&mut self) {
        if let Some(id) = self.enemy_timer.take() {
            self.timers.cancel(id);
        }
        let period = if self.frightened {
            self.rules.enemy_step_frightened
        } else {
            self.rules.enemy_step_active
        };
        self.enemy_timer = Some(self.timers.schedule_every(Event::EnemyStep, period));
    }

    fn check_collision(&mut self) -> bool {
        if !self.enemies.contains(&self.player) {
            return false;
        }
        self.timers.cancel_all();
        self.enemy_timer = None;
        self.frightened_timer = None;
        self.frightened = false;
        self.phase = Phase::GameOver;
        log::info!("caught at {:?}, final score {}", self.player, self.score);
        true
    }
}

fn take(grid: &mut PelletGrid, cell: Cell) -> bool {
    match grid.get_mut(cell.row).and_then(|r| r.get_mut(cell.col)) {
        Some(flag) if *flag => {
            *flag = false;
            true
        }
        _ => false,
    }
}

fn count(grid: &PelletGrid) -> usize {
    grid.iter().flatten().filter(|p| **p).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::manhattan;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn started() -> (Session, StdRng) {
        let mut session = Session::new(Maze::standard(), Rules::default());
        assert!(session.start());
        (session, StdRng::seed_from_u64(11))
    }

    #[test]
    fn moves_ignored_before_start() {
        let mut session = Session::new(Maze::standard(), Rules::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Ignored);
        assert_eq!(session.player(), Cell::new(22, 13));
        session.advance(Duration::from_secs(5), &mut rng);
        assert_eq!(session.enemies(), &[Cell::new(13, 13)]);
    }

    #[test]
    fn start_only_from_not_started() {
        let (mut session, _) = started();
        assert!(!session.start());
        assert!(session.is_active());
    }

    #[test]
    fn pellet_counts_once_per_cell() {
        let (mut session, mut rng) = started();
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Moved);
        assert_eq!(session.score(), 1);
        assert!(!session.pellets()[22][14]);
        assert_eq!(session.move_player(Dir::Left, &mut rng), MoveOutcome::Moved);
        assert_eq!(session.score(), 2);
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Moved);
        assert_eq!(session.score(), 2);
        assert_eq!(session.pellets_left(), 344 - 2);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let (mut session, mut rng) = started();
        assert_eq!(session.move_player(Dir::Up, &mut rng), MoveOutcome::Blocked);
        assert_eq!(session.player(), Cell::new(22, 13));
        assert_eq!(session.facing(), Dir::Right);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn facing_follows_successful_moves() {
        let (mut session, mut rng) = started();
        session.move_player(Dir::Left, &mut rng);
        assert_eq!(session.facing(), Dir::Left);
        session.move_player(Dir::Up, &mut rng);
        assert_eq!(session.facing(), Dir::Left);
    }

    #[test]
    fn player_wraps_through_tunnel() {
        let (mut session, mut rng) = started();
        session.player = Cell::new(9, 0);
        assert_eq!(session.move_player(Dir::Left, &mut rng), MoveOutcome::Moved);
        assert_eq!(session.player(), Cell::new(9, 27));
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Moved);
        assert_eq!(session.player(), Cell::new(9, 0));
    }

    #[test]
    fn enemies_step_on_active_period() {
        let (mut session, mut rng) = started();
        session.advance(Duration::from_millis(219), &mut rng);
        assert_eq!(session.enemies(), &[Cell::new(13, 13)]);
        session.advance(Duration::from_millis(1), &mut rng);
        assert_eq!(manhattan(session.enemies()[0], Cell::new(13, 13)), 1);
    }

    #[test]
    fn frightened_slows_enemies_then_reverts() {
        let (mut session, mut rng) = started();
        session.player = Cell::new(1, 2);
        assert_eq!(session.move_player(Dir::Left, &mut rng), MoveOutcome::Moved);
        assert!(session.is_frightened());
        assert_eq!(session.score(), 10);
        assert!(!session.power_pellets()[1][1]);

        session.advance(Duration::from_millis(399), &mut rng);
        assert_eq!(session.enemies(), &[Cell::new(13, 13)]);
        session.advance(Duration::from_millis(1), &mut rng);
        assert_ne!(session.enemies(), &[Cell::new(13, 13)]);

        session.advance(Duration::from_millis(6599), &mut rng);
        assert!(session.is_frightened());
        session.advance(Duration::from_millis(1), &mut rng);
        assert!(!session.is_frightened());
    }

    #[test]
    fn collision_on_move_ends_game() {
        let (mut session, mut rng) = started();
        session.enemies = vec![Cell::new(22, 14)];
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Caught);
        assert!(session.is_game_over());
        assert_eq!(session.timers.pending(), 0);

        assert_eq!(session.move_player(Dir::Left, &mut rng), MoveOutcome::Ignored);
        session.advance(Duration::from_secs(10), &mut rng);
        assert_eq!(session.enemies(), &[Cell::new(22, 14)]);
        assert!(!session.step_enemies(&mut rng));
    }

    #[test]
    fn restart_resets_everything() {
        let (mut session, mut rng) = started();
        session.player = Cell::new(1, 2);
        session.move_player(Dir::Left, &mut rng);
        session.enemies = vec![Cell::new(1, 2)];
        assert_eq!(session.move_player(Dir::Right, &mut rng), MoveOutcome::Caught);

        session.restart();
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.player(), Cell::new(22, 13));
        assert_eq!(session.facing(), Dir::Right);
        assert_eq!(session.enemies(), &[Cell::new(13, 13)]);
        assert_eq!(session.score(), 0);
        assert!(!session.is_frightened());
        assert!(session.power_pellets()[1][1]);
        assert!(session.pellets()[1][2]);
        assert_eq!(session.pellets_left(), 344);
        assert!(session.start());
    }

    #[test]
    fn frame_reflects_state() {
        let (session, _) = started();
        let frame = session.frame();
        assert_eq!(frame.player, Cell::new(22, 13));
        assert_eq!(frame.enemies.len(), 1);
        assert_eq!(frame.enemy_cap, 10);
        assert_eq!(frame.phase, Phase::Active);
        assert!(!frame.frightened);
        assert_eq!(frame.score, 0);
    }
}
