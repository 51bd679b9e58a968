use std::collections::HashMap;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use accutype::app::{App, AppAction, AppState};
use accutype::config::Config;
use accutype::passages::PassageSource;
use accutype::runtime::{AppEvent, FixedTicker, Runner, TestEventSource};
use accutype::session::SessionPhase;
use accutype::{Controller, Difficulty, ScoreStore};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

fn key(code: KeyCode) -> AppEvent {
    AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn app(passage: &str) -> App {
    let mut map = HashMap::new();
    map.insert(Difficulty::Easy, format!("{passage}\n"));
    let controller = Controller::new(
        ScoreStore::open_in_memory().unwrap(),
        PassageSource::Memory(map),
    );
    App::new(controller, &Config::default())
}

// Drives the App through the runtime without a TTY: login, type, submit, quit.
#[test]
fn headless_login_type_submit_flow() {
    let mut app = app("hi there");

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "carol".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    for c in "hi there".chars() {
        tx.send(key(KeyCode::Char(c))).unwrap();
    }
    tx.send(key(KeyCode::Enter)).unwrap();
    tx.send(key(KeyCode::Esc)).unwrap();

    let start = Instant::now();
    let mut quit = false;
    for step in 0..200u64 {
        let now = start + Duration::from_millis(step * 250);
        if app.handle_event(runner.step(), now).unwrap() == AppAction::Quit {
            quit = true;
            break;
        }
    }

    assert!(quit, "esc should end the loop");
    assert_eq!(app.state, AppState::Practice);

    let session = app.controller.session().unwrap();
    assert_eq!(session.username, "carol");
    assert_eq!(session.phase(), SessionPhase::Submitted);
    let grading = session.last_grading.unwrap();
    assert_eq!(grading.score.accuracy, 100.0);
    assert!(grading.score.wpm > 0.0);

    assert_eq!(app.controller.store().attempt_count().unwrap(), 1);
    assert_eq!(app.leaderboard.len(), 1);
    assert_eq!(app.leaderboard[0].username, "carol");
}

#[test]
fn ticks_do_not_change_state() {
    let mut app = app("hi");
    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    for _ in 0..5 {
        let action = app.handle_event(runner.step(), Instant::now()).unwrap();
        assert_eq!(action, AppAction::Continue);
    }
    assert_eq!(app.state, AppState::Login);
    assert!(app.notice.is_none());
}

#[test]
fn failed_save_shows_notice_and_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scores.db");
    let mut map = HashMap::new();
    map.insert(Difficulty::Easy, "hi\n".to_string());
    let controller = Controller::new(ScoreStore::open(&path).unwrap(), PassageSource::Memory(map));
    let mut app = App::new(controller, &Config::default());
    app.login("frank").unwrap();

    let t0 = Instant::now();
    for c in "hi".chars() {
        app.handle_event(key(KeyCode::Char(c)), t0).unwrap();
    }

    rusqlite::Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE scores")
        .unwrap();

    let action = app
        .handle_event(key(KeyCode::Enter), t0 + Duration::from_secs(1))
        .unwrap();
    assert_eq!(action, AppAction::Continue);
    assert!(matches!(
        &app.notice,
        Some(accutype::app::Notice::Error(msg)) if msg.starts_with("Could not save")
    ));
    assert_eq!(
        app.controller.session().unwrap().phase(),
        SessionPhase::InProgress
    );
}
