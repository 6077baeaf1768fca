mod render;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use markov_maze::{Dir, Maze, Result, Rules, Session, Settings};
use render::Renderer;
use std::io::{self, Stdout};
use std::thread;
use std::time::{Duration, Instant};

enum Command {
    Move(Dir),
    Start,
    Restart,
    Quit,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::from_env();
    let rules = Rules::from_env();
    let maze = load_maze(&settings)?;
    log::info!("{:?}", rules);

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, Session::new(maze, rules), &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

fn load_maze(settings: &Settings) -> Result<Maze> {
    match &settings.layout_path {
        Some(path) => {
            log::info!("loading layout from {}", path);
            let text = std::fs::read_to_string(path)?;
            Ok(Maze::parse(&text)?)
        }
        None => Ok(Maze::standard()),
    }
}

fn run(stdout: &mut Stdout, mut session: Session, settings: &Settings) -> Result<()> {
    let mut rng = rand::thread_rng();
    let mut renderer = Renderer::new(session.maze());
    let frame_time = settings.frame_time();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                continue;
            }
            match command_for(key.code) {
                Some(Command::Quit) => return Ok(()),
                Some(Command::Start) => {
                    session.start();
                }
                Some(Command::Restart) => {
                    if session.is_game_over() {
                        session.restart();
                    }
                }
                Some(Command::Move(dir)) => {
                    session.move_player(dir, &mut rng);
                }
                None => {}
            }
        }

        let now = Instant::now();
        session.advance(now - last_tick, &mut rng);
        last_tick = now;
        renderer.draw(stdout, session.maze(), &session.frame())?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn command_for(code: KeyCode) -> Option<Command> {
    let command = match code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('k') => Command::Move(Dir::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('j') => Command::Move(Dir::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('h') => Command::Move(Dir::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('l') => Command::Move(Dir::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Command::Start,
        KeyCode::Char('r') => Command::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        _ => return None,
    };
    Some(command)
}
