use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use markov_maze::{Cell, Dir, Frame, Maze, Phase};
use std::io::{self, Stdout, Write};
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;

#[derive(Clone, Copy, PartialEq)]
enum Glyph {
    Player(Dir),
    Enemy,
    Frightened,
    Wall,
    Empty,
    Pellet,
    Power,
}

#[derive(Clone, Copy, PartialEq)]
struct Sprite {
    glyph: Glyph,
    color: Color,
}

/// Redraws only the cells, HUD and prompt that changed since the last frame.
pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Sprite>,
    last_hud: String,
    last_prompt: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(maze: &Maze) -> Self {
        Self {
            width: maze.width(),
            height: maze.height(),
            last: vec![
                Sprite {
                    glyph: Glyph::Empty,
                    color: Color::Reset,
                };
                maze.width() * maze.height()
            ],
            last_hud: String::new(),
            last_prompt: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn draw(&mut self, stdout: &mut Stdout, maze: &Maze, frame: &Frame<'_>) -> io::Result<()> {
        let needed_h = (self.height + 3) as u16;
        let needed_w = (self.width * CELL_W) as u16;

        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y || self.needs_full {
            stdout.queue(Clear(ClearType::All))?;
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }

        let hud = hud_line(frame);
        if self.needs_full || hud != self.last_hud {
            self.print_line(stdout, self.origin_y - 1, Color::White, &hud)?;
            self.last_hud = hud;
        }

        for row in 0..self.height {
            for col in 0..self.width {
                let cell = Cell::new(row, col);
                let sprite = sprite_for(maze, frame, cell);
                let idx = row * self.width + col;
                if self.needs_full || sprite != self.last[idx] {
                    self.last[idx] = sprite;
                    self.draw_sprite(stdout, cell, sprite)?;
                }
            }
        }

        let prompt = prompt_line(frame);
        if self.needs_full || prompt != self.last_prompt {
            let y = self.origin_y + self.height as u16;
            self.print_line(stdout, y, Color::Yellow, &prompt)?;
            self.last_prompt = prompt;
        }
        self.needs_full = false;

        stdout.flush()
    }

    fn print_line(&self, stdout: &mut Stdout, y: u16, color: Color, text: &str) -> io::Result<()> {
        stdout.queue(MoveTo(self.origin_x, y))?;
        stdout.queue(Clear(ClearType::CurrentLine))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        stdout.queue(ResetColor)?;
        Ok(())
    }

    fn draw_sprite(&self, stdout: &mut Stdout, cell: Cell, sprite: Sprite) -> io::Result<()> {
        let text = match sprite.glyph {
            Glyph::Player(Dir::Right) => "ᗧ",
            Glyph::Player(Dir::Left) => "ᗤ",
            Glyph::Player(Dir::Up) => "ᗢ",
            Glyph::Player(Dir::Down) => "ᗣ",
            Glyph::Enemy => "👻",
            Glyph::Frightened => "😱",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Pellet => "·",
            Glyph::Power => "●",
        };
        let x = self.origin_x + (cell.col * CELL_W) as u16;
        let y = self.origin_y + cell.row as u16;
        stdout.queue(MoveTo(x, y))?;
        stdout.queue(SetForegroundColor(sprite.color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            stdout.queue(Print(" ".repeat(CELL_W - w)))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

fn sprite_for(maze: &Maze, frame: &Frame<'_>, cell: Cell) -> Sprite {
    if cell == frame.player {
        return Sprite {
            glyph: Glyph::Player(frame.facing),
            color: Color::Yellow,
        };
    }
    if frame.enemies.contains(&cell) {
        return if frame.frightened {
            Sprite {
                glyph: Glyph::Frightened,
                color: Color::Blue,
            }
        } else {
            Sprite {
                glyph: Glyph::Enemy,
                color: Color::Red,
            }
        };
    }
    if !maze.is_open(cell) {
        return Sprite {
            glyph: Glyph::Wall,
            color: Color::Blue,
        };
    }
    if frame.power_pellets[cell.row][cell.col] {
        return Sprite {
            glyph: Glyph::Power,
            color: Color::Magenta,
        };
    }
    if frame.pellets[cell.row][cell.col] {
        return Sprite {
            glyph: Glyph::Pellet,
            color: Color::White,
        };
    }
    Sprite {
        glyph: Glyph::Empty,
        color: Color::Reset,
    }
}

fn hud_line(frame: &Frame<'_>) -> String {
    let mode = if frame.frightened { "  FRIGHTENED" } else { "" };
    format!(
        "Score: {}  Enemies: {} / {}  Pellets: {}{}  (q to quit)",
        frame.score,
        frame.enemies.len(),
        frame.enemy_cap,
        frame.pellets_left,
        mode
    )
}

fn prompt_line(frame: &Frame<'_>) -> String {
    match frame.phase {
        Phase::NotStarted => "Press Enter to start. Move with arrows, WASD or hjkl.".to_string(),
        Phase::Active => String::new(),
        Phase::GameOver => format!("GAME OVER - Final Score: {} (r to play again, q to quit)", frame.score),
    }
}
