use crate::difficulty::Difficulty;
use crate::error::{AppError, AppResult};
use crate::feedback::{play_detached, Cue, Silent, SoundPlayer};
use crate::passages::PassageSource;
use crate::session::{Grading, Rejection, Session};
use crate::store::{LeaderboardEntry, NewAttempt, ScoreStore, DEFAULT_LEADERBOARD_LIMIT};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    Graded(Grading),
    Rejected(Rejection),
}

/// Wires passages, the session state machine, scoring and the score store
/// together for one interactive user.
pub struct Controller {
    store: ScoreStore,
    passages: PassageSource,
    sound: Arc<dyn SoundPlayer>,
    rng: StdRng,
    session: Option<Session>,
    leaderboard_limit: usize,
}

impl Controller {
    pub fn new(store: ScoreStore, passages: PassageSource) -> Self {
        Self {
            store,
            passages,
            sound: Arc::new(Silent),
            rng: StdRng::from_entropy(),
            session: None,
            leaderboard_limit: DEFAULT_LEADERBOARD_LIMIT,
        }
    }

    pub fn with_sound(mut self, sound: Arc<dyn SoundPlayer>) -> Self {
        self.sound = sound;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_leaderboard_limit(mut self, limit: usize) -> Self {
        self.leaderboard_limit = limit;
        self
    }

    pub fn store(&self) -> &ScoreStore {
        &self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Start a session for `username` (trimmed) on a fresh passage.
    /// A blank name is rejected without touching any state.
    pub fn login(&mut self, username: &str, difficulty: Difficulty) -> AppResult<&Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::EmptyUsername);
        }

        let passage = self.passages.draw(difficulty, &mut self.rng)?;
        self.store.ensure_user(username)?;
        tracing::info!(username, %difficulty, "logged in");

        Ok(&*self
            .session
            .insert(Session::new(username.to_string(), difficulty, passage)))
    }

    /// Drop the session. Nothing in the store changes.
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(username = %session.username, "logged out");
        }
    }

    /// Switch tiers. Choosing the current tier again keeps the passage.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> AppResult<()> {
        let current = self.session_ref()?.difficulty;
        if current == difficulty {
            return Ok(());
        }
        self.redraw(difficulty)
    }

    pub fn new_passage(&mut self) -> AppResult<()> {
        let difficulty = self.session_ref()?.difficulty;
        self.redraw(difficulty)
    }

    fn redraw(&mut self, difficulty: Difficulty) -> AppResult<()> {
        let passage = self.passages.draw(difficulty, &mut self.rng)?;
        let session = self.session.as_mut().ok_or(AppError::NotLoggedIn)?;
        session.reset(difficulty, passage);
        tracing::debug!(%difficulty, "session reset");
        Ok(())
    }

    pub fn set_input(&mut self, text: &str, now: Instant) -> AppResult<()> {
        self.session_mut()?.set_input(text, now);
        Ok(())
    }

    pub fn type_char(&mut self, c: char, now: Instant) -> AppResult<()> {
        self.session_mut()?.push_char(c, now);
        Ok(())
    }

    pub fn backspace(&mut self) -> AppResult<()> {
        self.session_mut()?.backspace();
        Ok(())
    }

    /// Grade and record the current input.
    ///
    /// Blank input and repeated submits come back as `Rejected` and record
    /// nothing. If the store fails the error is returned and the session stays
    /// ungraded, so the user can submit again.
    pub fn submit(&mut self, now: Instant) -> AppResult<SubmitOutcome> {
        let session = self.session.as_mut().ok_or(AppError::NotLoggedIn)?;

        let score = match session.evaluate(now) {
            Ok(score) => score,
            Err(rejection) => {
                tracing::debug!(?rejection, "submit ignored");
                return Ok(SubmitOutcome::Rejected(rejection));
            }
        };

        self.store.record_attempt(&NewAttempt {
            username: &session.username,
            wpm: score.wpm,
            accuracy: score.accuracy,
            elapsed_secs: score.elapsed_secs,
            difficulty: session.difficulty,
        })?;

        let grading = session.complete(score);
        play_detached(Arc::clone(&self.sound), Cue::for_accuracy(score.accuracy));

        Ok(SubmitOutcome::Graded(grading))
    }

    /// Leaderboard for the session's tier
    pub fn leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let difficulty = self.session_ref()?.difficulty;
        self.leaderboard_for(difficulty)
    }

    pub fn leaderboard_for(&self, difficulty: Difficulty) -> AppResult<Vec<LeaderboardEntry>> {
        Ok(self.store.top_scores(difficulty, self.leaderboard_limit)?)
    }

    fn session_ref(&self) -> AppResult<&Session> {
        self.session.as_ref().ok_or(AppError::NotLoggedIn)
    }

    fn session_mut(&mut self) -> AppResult<&mut Session> {
        self.session.as_mut().ok_or(AppError::NotLoggedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badge::Badge;
    use crate::session::SessionPhase;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::time::Duration;

    fn controller() -> Controller {
        let mut map = HashMap::new();
        map.insert(Difficulty::Easy, "the cat sat\n".to_string());
        map.insert(Difficulty::Medium, "a longer medium line\n".to_string());
        Controller::new(ScoreStore::open_in_memory().unwrap(), PassageSource::Memory(map))
            .with_rng(StdRng::seed_from_u64(42))
    }

    #[test]
    fn login_rejects_blank_username() {
        let mut c = controller();
        assert_matches!(c.login("   ", Difficulty::Easy), Err(AppError::EmptyUsername));
        assert!(!c.is_logged_in());
        assert_eq!(c.store().user_count().unwrap(), 0);
    }

    #[test]
    fn login_trims_and_creates_user() {
        let mut c = controller();
        let session = c.login("  alice ", Difficulty::Easy).unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.passage, "the cat sat");
        assert!(c.store().user("alice").unwrap().is_some());
    }

    #[test]
    fn login_with_missing_tier_fails() {
        let mut c = controller();
        assert_matches!(c.login("bob", Difficulty::Hard), Err(AppError::Passage(_)));
        assert!(!c.is_logged_in());
    }

    #[test]
    fn operations_require_login() {
        let mut c = controller();
        assert_matches!(c.submit(Instant::now()), Err(AppError::NotLoggedIn));
        assert_matches!(c.new_passage(), Err(AppError::NotLoggedIn));
        assert_matches!(c.type_char('a', Instant::now()), Err(AppError::NotLoggedIn));
        assert_matches!(c.leaderboard(), Err(AppError::NotLoggedIn));
    }

    #[test]
    fn the_cat_sat_end_to_end() {
        let mut c = controller();
        c.login("alice", Difficulty::Easy).unwrap();
        let t0 = Instant::now();
        c.set_input("the cat sat", t0).unwrap();

        let outcome = c.submit(t0 + Duration::from_secs(6)).unwrap();
        let grading = match outcome {
            SubmitOutcome::Graded(g) => g,
            other => panic!("expected a graded attempt, got {other:?}"),
        };
        assert_eq!(grading.score.wpm, 30.0);
        assert_eq!(grading.score.accuracy, 100.0);
        assert_eq!(grading.badge, Badge::PrecisionMaster);
        assert_eq!(grading.streak, 1);

        let board = c.leaderboard().unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].username, "alice");
        assert_eq!(board[0].max_wpm, 30.0);
    }

    #[test]
    fn double_submit_records_once() {
        let mut c = controller();
        c.login("alice", Difficulty::Easy).unwrap();
        let t0 = Instant::now();
        c.set_input("the cat sat", t0).unwrap();

        assert_matches!(c.submit(t0 + Duration::from_secs(6)), Ok(SubmitOutcome::Graded(_)));
        assert_matches!(
            c.submit(t0 + Duration::from_secs(7)),
            Ok(SubmitOutcome::Rejected(Rejection::AlreadySubmitted))
        );
        assert_eq!(c.store().attempt_count().unwrap(), 1);
    }

    #[test]
    fn blank_submit_records_nothing() {
        let mut c = controller();
        c.login("alice", Difficulty::Easy).unwrap();
        c.set_input("  ", Instant::now()).unwrap();

        assert_matches!(
            c.submit(Instant::now()),
            Ok(SubmitOutcome::Rejected(Rejection::EmptyInput))
        );
        assert_eq!(c.store().attempt_count().unwrap(), 0);
        assert_eq!(c.session().unwrap().phase(), SessionPhase::InProgress);
    }

    #[test]
    fn changing_difficulty_resets_session() {
        let mut c = controller();
        c.login("alice", Difficulty::Easy).unwrap();
        c.type_char('t', Instant::now()).unwrap();

        c.select_difficulty(Difficulty::Easy).unwrap();
        assert_eq!(c.session().unwrap().input, "t");

        c.select_difficulty(Difficulty::Medium).unwrap();
        let s = c.session().unwrap();
        assert_eq!(s.phase(), SessionPhase::AwaitingInput);
        assert_eq!(s.difficulty, Difficulty::Medium);
        assert_eq!(s.passage, "a longer medium line");
        assert!(s.input.is_empty());
    }

    #[test]
    fn streak_survives_new_passage_but_not_logout() {
        let mut c = controller();
        c.login("alice", Difficulty::Easy).unwrap();
        for round in 1..=2u32 {
            let t0 = Instant::now();
            c.set_input("the cat sat", t0).unwrap();
            c.submit(t0 + Duration::from_secs(6)).unwrap();
            assert_eq!(c.session().unwrap().streak, round);
            c.new_passage().unwrap();
        }

        c.logout();
        assert!(!c.is_logged_in());
        assert_eq!(c.login("alice", Difficulty::Easy).unwrap().streak, 0);
        assert_eq!(c.store().attempt_count().unwrap(), 2);
    }
}
