use crate::config::{Config, Theme};
use crate::controller::{Controller, SubmitOutcome};
use crate::difficulty::Difficulty;
use crate::error::{AppError, AppResult};
use crate::runtime::AppEvent;
use crate::store::LeaderboardEntry;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Login,
    Practice,
}

/// One-line message shown under the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    Continue,
    Quit,
}

/// Interactive front end state around a [`Controller`]
pub struct App {
    pub controller: Controller,
    pub state: AppState,
    pub login_buffer: String,
    pub difficulty: Difficulty,
    pub theme: Theme,
    pub notice: Option<Notice>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl App {
    pub fn new(controller: Controller, config: &Config) -> Self {
        Self {
            controller,
            state: AppState::Login,
            login_buffer: String::new(),
            difficulty: config.difficulty,
            theme: config.theme,
            notice: None,
            leaderboard: Vec::new(),
        }
    }

    /// Log straight in, skipping the login screen
    pub fn login(&mut self, username: &str) -> AppResult<()> {
        let username = match self.controller.login(username, self.difficulty) {
            Ok(session) => session.username.clone(),
            Err(e) => return self.absorb(e),
        };
        self.notice = Some(Notice::Info(format!("Logged in as {username}")));
        self.state = AppState::Practice;
        self.login_buffer.clear();
        self.refresh_leaderboard()
    }

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> AppResult<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key, now),
            AppEvent::Resize | AppEvent::Tick => Ok(AppAction::Continue),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> AppResult<AppAction> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Ok(AppAction::Quit),
            KeyCode::Char('c') if ctrl => return Ok(AppAction::Quit),
            KeyCode::Char('t') if ctrl => {
                self.theme = self.theme.toggled();
                return Ok(AppAction::Continue);
            }
            KeyCode::Tab => {
                self.difficulty = self.difficulty.next();
                if self.state == AppState::Practice {
                    self.notice = None;
                    let result = self
                        .controller
                        .select_difficulty(self.difficulty)
                        .and_then(|_| self.refresh_leaderboard());
                    if let Err(e) = result {
                        self.absorb(e)?;
                    }
                }
                return Ok(AppAction::Continue);
            }
            _ => {}
        }

        match self.state {
            AppState::Login => self.handle_login_key(key),
            AppState::Practice => self.handle_practice_key(key, ctrl, now),
        }
        .map(|_| AppAction::Continue)
    }

    fn handle_login_key(&mut self, key: KeyEvent) -> AppResult<()> {
        match key.code {
            KeyCode::Enter => {
                let username = self.login_buffer.clone();
                self.login(&username)
            }
            KeyCode::Backspace => {
                self.login_buffer.pop();
                Ok(())
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.login_buffer.push(c);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn handle_practice_key(&mut self, key: KeyEvent, ctrl: bool, now: Instant) -> AppResult<()> {
        let result = match key.code {
            KeyCode::Char('n') if ctrl => {
                self.notice = None;
                self.controller.new_passage()
            }
            KeyCode::Char('l') if ctrl => {
                self.controller.logout();
                self.state = AppState::Login;
                self.leaderboard.clear();
                self.notice = Some(Notice::Info("Logged out".to_string()));
                Ok(())
            }
            KeyCode::Enter => self.submit(now),
            KeyCode::Backspace => self.controller.backspace(),
            KeyCode::Char(c) if !ctrl => self.controller.type_char(c, now),
            _ => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) => self.absorb(e),
        }
    }

    fn submit(&mut self, now: Instant) -> AppResult<()> {
        match self.controller.submit(now)? {
            SubmitOutcome::Graded(_) => {
                self.notice = None;
                self.refresh_leaderboard()
            }
            SubmitOutcome::Rejected(rejection) => {
                self.notice = Some(Notice::Warning(rejection.message().to_string()));
                Ok(())
            }
        }
    }

    pub fn refresh_leaderboard(&mut self) -> AppResult<()> {
        self.leaderboard = self.controller.leaderboard()?;
        Ok(())
    }

    /// Turn recoverable errors into a notice; anything else is fatal.
    /// A failed write only costs the current request, the user can resubmit.
    fn absorb(&mut self, err: AppError) -> AppResult<()> {
        match err {
            e if e.is_user_facing() => {
                self.notice = Some(Notice::Error(e.to_string()));
                Ok(())
            }
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                self.notice = Some(Notice::Error(format!("Could not save: {e}")));
                Ok(())
            }
            e => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passages::PassageSource;
    use crate::session::SessionPhase;
    use crate::store::ScoreStore;
    use std::collections::HashMap;
    use std::time::Duration;

    fn app() -> App {
        let mut map = HashMap::new();
        map.insert(Difficulty::Easy, "go\n".to_string());
        map.insert(Difficulty::Medium, "slow down\n".to_string());
        let controller =
            Controller::new(ScoreStore::open_in_memory().unwrap(), PassageSource::Memory(map));
        App::new(controller, &Config::default())
    }

    fn press(app: &mut App, code: KeyCode, now: Instant) -> AppAction {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE), now)
            .unwrap()
    }

    fn ctrl(app: &mut App, c: char, now: Instant) -> AppAction {
        app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL), now)
            .unwrap()
    }

    #[test]
    fn empty_login_shows_error() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, Instant::now());
        assert_eq!(app.state, AppState::Login);
        assert_eq!(
            app.notice,
            Some(Notice::Error("Username cannot be empty".to_string()))
        );
    }

    #[test]
    fn typing_a_name_logs_in() {
        let mut app = app();
        let now = Instant::now();
        for c in "bob".chars() {
            press(&mut app, KeyCode::Char(c), now);
        }
        press(&mut app, KeyCode::Enter, now);
        assert_eq!(app.state, AppState::Practice);
        assert_eq!(app.controller.session().unwrap().username, "bob");
        assert!(app.login_buffer.is_empty());
    }

    #[test]
    fn empty_submit_warns() {
        let mut app = app();
        app.login("bob").unwrap();
        press(&mut app, KeyCode::Enter, Instant::now());
        assert_eq!(
            app.notice,
            Some(Notice::Warning("Please type the passage first!".to_string()))
        );
        assert_eq!(app.controller.store().attempt_count().unwrap(), 0);
    }

    #[test]
    fn submit_updates_leaderboard() {
        let mut app = app();
        app.login("bob").unwrap();
        let t0 = Instant::now();
        press(&mut app, KeyCode::Char('g'), t0);
        press(&mut app, KeyCode::Char('o'), t0);
        press(&mut app, KeyCode::Enter, t0 + Duration::from_secs(2));

        assert_eq!(
            app.controller.session().unwrap().phase(),
            SessionPhase::Submitted
        );
        assert_eq!(app.leaderboard.len(), 1);
        assert_eq!(app.leaderboard[0].max_wpm, 30.0);
    }

    #[test]
    fn tab_cycles_difficulty_and_resets() {
        let mut app = app();
        app.login("bob").unwrap();
        press(&mut app, KeyCode::Char('g'), Instant::now());
        press(&mut app, KeyCode::Tab, Instant::now());

        let session = app.controller.session().unwrap();
        assert_eq!(session.difficulty, Difficulty::Medium);
        assert_eq!(session.passage, "slow down");
        assert!(session.input.is_empty());
    }

    #[test]
    fn missing_passages_are_fatal() {
        let mut app = app();
        app.login("bob").unwrap();
        press(&mut app, KeyCode::Tab, Instant::now());
        let result = app.handle_key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE), Instant::now());
        assert!(matches!(result, Err(AppError::Passage(_))));
    }

    #[test]
    fn ctrl_shortcuts() {
        let mut app = app();
        app.login("bob").unwrap();
        let theme = app.theme;
        ctrl(&mut app, 't', Instant::now());
        assert_ne!(app.theme, theme);

        ctrl(&mut app, 'l', Instant::now());
        assert_eq!(app.state, AppState::Login);
        assert!(!app.controller.is_logged_in());

        assert_eq!(ctrl(&mut app, 'c', Instant::now()), AppAction::Quit);
        assert_eq!(press(&mut app, KeyCode::Esc, Instant::now()), AppAction::Quit);
    }
}
