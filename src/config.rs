//! Game rules and front-end settings, overridable from the environment.

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MAX_ENEMIES: usize = 10;
const DEFAULT_POINTS_PER_ENEMY: u32 = 5;
const DEFAULT_PELLET_SCORE: u32 = 1;
const DEFAULT_POWER_PELLET_SCORE: u32 = 10;
const DEFAULT_FRIGHTENED_MS: u64 = 7000;
const DEFAULT_STEP_MS: u64 = 220;
const DEFAULT_FRIGHTENED_STEP_MS: u64 = 400;
const DEFAULT_SPAWN_DISTANCE: usize = 7;
const DEFAULT_RENDER_FPS: u64 = 60;

/// Gameplay constants for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rules {
    /// Enemies never exceed this count.
    pub max_enemies: usize,
    /// Score needed per enemy already on the board before another spawns.
    pub points_per_enemy: u32,
    pub pellet_score: u32,
    pub power_pellet_score: u32,
    pub frightened_duration: Duration,
    /// Enemy step period outside frightened mode.
    pub enemy_step_active: Duration,
    pub enemy_step_frightened: Duration,
    /// Minimum Manhattan distance between the player and a new enemy.
    pub spawn_min_distance: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_enemies: DEFAULT_MAX_ENEMIES,
            points_per_enemy: DEFAULT_POINTS_PER_ENEMY,
            pellet_score: DEFAULT_PELLET_SCORE,
            power_pellet_score: DEFAULT_POWER_PELLET_SCORE,
            frightened_duration: Duration::from_millis(DEFAULT_FRIGHTENED_MS),
            enemy_step_active: Duration::from_millis(DEFAULT_STEP_MS),
            enemy_step_frightened: Duration::from_millis(DEFAULT_FRIGHTENED_STEP_MS),
            spawn_min_distance: DEFAULT_SPAWN_DISTANCE,
        }
    }
}

impl Rules {
    /// Defaults overridden by `MARKOV_MAZE_*` variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_enemies: env_setting("MARKOV_MAZE_MAX_ENEMIES", defaults.max_enemies),
            points_per_enemy: env_setting("MARKOV_MAZE_POINTS_PER_ENEMY", defaults.points_per_enemy),
            pellet_score: defaults.pellet_score,
            power_pellet_score: env_setting("MARKOV_MAZE_POWER_SCORE", defaults.power_pellet_score),
            frightened_duration: Duration::from_millis(env_setting(
                "MARKOV_MAZE_FRIGHTENED_MS",
                DEFAULT_FRIGHTENED_MS,
            )),
            enemy_step_active: Duration::from_millis(env_setting("MARKOV_MAZE_STEP_MS", DEFAULT_STEP_MS)),
            enemy_step_frightened: Duration::from_millis(env_setting(
                "MARKOV_MAZE_FRIGHTENED_STEP_MS",
                DEFAULT_FRIGHTENED_STEP_MS,
            )),
            spawn_min_distance: env_setting("MARKOV_MAZE_SPAWN_DISTANCE", defaults.spawn_min_distance),
        }
    }
}

/// Terminal front-end settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub render_fps: u64,
    /// Custom layout file instead of the built-in maze.
    pub layout_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render_fps: DEFAULT_RENDER_FPS,
            layout_path: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self {
            render_fps: env_setting("MARKOV_MAZE_FPS", DEFAULT_RENDER_FPS),
            layout_path: std::env::var("MARKOV_MAZE_LAYOUT")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.render_fps.max(1))
    }
}

fn env_setting<T>(key: &str, default: T) -> T
where
    T: FromStr + PartialEq + Default + Copy + std::fmt::Display,
{
    let raw = std::env::var(key).ok();
    parse_setting(key, raw.as_deref(), default)
}

/// Parses a positive setting, falling back to `default` on absent, malformed
/// or zero values.
pub(crate) fn parse_setting<T>(key: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + PartialEq + Default + Copy + std::fmt::Display,
{
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) if v != T::default() => v,
        _ => {
            log::warn!("ignoring {}={:?}, using {}", key, raw, default);
            default
        }
    }
}
