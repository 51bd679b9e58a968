use accutype::{
    app::{App, AppAction},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore, Theme},
    controller::Controller,
    difficulty::Difficulty,
    export::write_attempts_csv,
    feedback::{player_from_config, TerminalBell},
    logging,
    passages::PassageSource,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    store::ScoreStore,
    ui::leaderboard::format_leaderboard,
};
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::File,
    io::{self, stdin, Write},
    path::PathBuf,
    time::Instant,
};

/// typing speed tester with badges, streaks and a persistent leaderboard
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type a random passage as fast and as accurately as you can. Every submitted attempt is ranked on a per-difficulty leaderboard; accurate runs build a streak."
)]
pub struct Cli {
    /// log in straight away as this user
    #[clap(short = 'u', long)]
    user: Option<String>,

    /// difficulty tier to start on
    #[clap(short = 'd', long, value_enum)]
    difficulty: Option<Difficulty>,

    /// color theme
    #[clap(short = 't', long, value_enum)]
    theme: Option<Theme>,

    /// path of the score database
    #[clap(long)]
    db: Option<PathBuf>,

    /// directory holding easy.txt, medium.txt and hard.txt
    #[clap(long)]
    passages_dir: Option<PathBuf>,

    /// path of the config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// disable the sound cue after each attempt
    #[clap(long)]
    no_sound: bool,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// print the leaderboard for a difficulty
    Leaderboard {
        #[clap(short = 'd', long, value_enum)]
        difficulty: Option<Difficulty>,

        /// number of rows to show
        #[clap(short = 'n', long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        limit: Option<usize>,
    },
    /// print every attempt of a user, newest first
    History { username: String },
    /// write every attempt to a CSV file
    Export { output: PathBuf },
}

impl Cli {
    /// Apply command line overrides on top of the stored configuration
    fn merge_into(&self, mut cfg: Config) -> Config {
        if let Some(d) = self.difficulty {
            cfg.difficulty = d;
        }
        if let Some(t) = self.theme {
            cfg.theme = t;
        }
        if let Some(db) = &self.db {
            cfg.database = Some(db.clone());
        }
        if let Some(dir) = &self.passages_dir {
            cfg.passages_dir = Some(dir.clone());
        }
        if self.no_sound {
            cfg.sound = false;
        }
        cfg
    }
}

fn open_store(cfg: &Config) -> rusqlite::Result<ScoreStore> {
    match &cfg.database {
        Some(path) => ScoreStore::open(path),
        None => ScoreStore::open_default(),
    }
}

fn run_command(command: Command, cfg: &Config) -> Result<(), Box<dyn Error>> {
    let store = open_store(cfg)?;

    match command {
        Command::Leaderboard { difficulty, limit } => {
            let difficulty = difficulty.unwrap_or(cfg.difficulty);
            let entries = store.top_scores(difficulty, limit.unwrap_or(cfg.leaderboard_limit))?;
            println!("Leaderboard - {difficulty}");
            for line in format_leaderboard(&entries) {
                println!("{line}");
            }
        }
        Command::History { username } => {
            let attempts = store.attempts(Some(username.trim()))?;
            if attempts.is_empty() {
                println!("No attempts recorded for {}", username.trim());
            }
            for a in attempts {
                println!(
                    "{}  {:<6}  {:>7.2} wpm  {:>6.2}%  {:>6.2}s",
                    a.recorded_at.format("%Y-%m-%d %H:%M:%S"),
                    a.difficulty,
                    a.wpm,
                    a.accuracy,
                    a.elapsed_secs
                );
            }
        }
        Command::Export { output } => {
            let attempts = store.attempts(None)?;
            let written = write_attempts_csv(File::create(&output)?, &attempts)?;
            println!("Exported {written} attempts to {}", output.display());
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config_store = match &cli.config {
        Some(path) => FileConfigStore::with_path(path),
        None => FileConfigStore::new(),
    };
    let cfg = cli.merge_into(config_store.load());

    if let Some(command) = cli.command.clone() {
        logging::init_stderr();
        return run_command(command, &cfg);
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        logging::init_file(&log_path)?;
    }

    // Fail on bad passage or database settings before touching the terminal
    let passages = PassageSource::from_dir_or_bundled(cfg.passages_dir.clone());
    passages.load(cfg.difficulty)?;
    let bell = TerminalBell::new();
    let controller = Controller::new(open_store(&cfg)?, passages)
        .with_sound(player_from_config(&cfg, bell.clone()))
        .with_leaderboard_limit(cfg.leaderboard_limit);

    let mut app = App::new(controller, &cfg);
    if let Some(user) = &cli.user {
        app.login(user)?;
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    // With bracketed paste on, pastes arrive as one event the runtime drops
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &bell);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Remember the last difficulty and theme for next time
    let saved = Config {
        difficulty: app.difficulty,
        theme: app.theme,
        ..config_store.load()
    };
    if let Err(e) = config_store.save(&saved) {
        tracing::warn!(error = %e, "unable to save config");
    }

    result
}

fn start_tui<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    bell: &TerminalBell,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        if bell.take_pending() {
            let backend = terminal.backend_mut();
            backend.write_all(b"\x07")?;
            Write::flush(backend)?;
        }

        match app.handle_event(runner.step(), Instant::now()) {
            Ok(AppAction::Continue) => {}
            Ok(AppAction::Quit) => break,
            Err(e) => {
                tracing::error!(error = %e, "fatal error");
                return Err(e.into());
            }
        }
    }

    Ok(())
}
