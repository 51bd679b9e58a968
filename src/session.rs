use crate::badge::Badge;
use crate::difficulty::Difficulty;
use crate::scoring::{score, Score};
use crate::streak::update_streak;
use std::time::{Duration, Instant};

/// Length of the typing progress bar
pub const PROGRESS_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No keystroke yet, timer not running
    AwaitingInput,
    /// Timer running, not yet graded
    InProgress,
    /// Graded; input and submit are ignored until reset
    Submitted,
}

/// Why a submit request did not grade anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    EmptyInput,
    AlreadySubmitted,
}

impl Rejection {
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::EmptyInput => "Please type the passage first!",
            Rejection::AlreadySubmitted => "Already submitted, request a new passage to go again",
        }
    }
}

/// Everything shown to the user after a graded attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grading {
    pub score: Score,
    pub badge: Badge,
    pub streak: u32,
}

/// Per-user interaction state, created on login and dropped on logout
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    pub difficulty: Difficulty,
    pub passage: String,
    pub started_at: Option<Instant>,
    pub input: String,
    pub submitted: bool,
    pub streak: u32,
    pub last_grading: Option<Grading>,
}

impl Session {
    pub fn new(username: String, difficulty: Difficulty, passage: String) -> Self {
        Self {
            username,
            difficulty,
            passage,
            started_at: None,
            input: String::new(),
            submitted: false,
            streak: 0,
            last_grading: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.submitted {
            SessionPhase::Submitted
        } else if self.started_at.is_some() {
            SessionPhase::InProgress
        } else {
            SessionPhase::AwaitingInput
        }
    }

    /// Replace the input wholesale. The timer starts on the first non-empty
    /// input and keeps running even if the input is cleared again.
    pub fn set_input(&mut self, text: &str, now: Instant) {
        if self.submitted {
            return;
        }
        if !text.is_empty() && self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.input = text.to_string();
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        if self.submitted {
            return;
        }
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        if !self.submitted {
            self.input.pop();
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.started_at
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }

    /// Fraction of the one-minute progress window used, or None when the
    /// bar is hidden (not started yet, or already graded)
    pub fn progress(&self, now: Instant) -> Option<f64> {
        match self.phase() {
            SessionPhase::InProgress => {
                Some((self.elapsed(now).as_secs_f64() / PROGRESS_WINDOW.as_secs_f64()).min(1.0))
            }
            _ => None,
        }
    }

    /// Grade the current input without changing any state
    pub fn evaluate(&self, now: Instant) -> Result<Score, Rejection> {
        if self.submitted {
            return Err(Rejection::AlreadySubmitted);
        }
        if self.input.trim().is_empty() {
            return Err(Rejection::EmptyInput);
        }
        Ok(score(
            &self.passage,
            &self.input,
            self.elapsed(now).as_secs_f64(),
        ))
    }

    /// Lock in a score produced by [`Session::evaluate`]: awards the badge,
    /// advances or breaks the streak and moves to `Submitted`.
    pub fn complete(&mut self, score: Score) -> Grading {
        self.streak = update_streak(self.streak, score.accuracy);
        self.submitted = true;
        let grading = Grading {
            score,
            badge: Badge::classify(score.wpm, score.accuracy),
            streak: self.streak,
        };
        self.last_grading = Some(grading);
        grading
    }

    /// Start over on a fresh passage, keeping the streak
    pub fn reset(&mut self, difficulty: Difficulty, passage: String) {
        self.difficulty = difficulty;
        self.passage = passage;
        self.started_at = None;
        self.input.clear();
        self.submitted = false;
        self.last_grading = None;
    }
}
