// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod app_dirs;
pub mod badge;
pub mod config;
pub mod controller;
pub mod difficulty;
pub mod error;
pub mod export;
pub mod feedback;
pub mod logging;
pub mod passages;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod store;
pub mod streak;
pub mod ui;

pub use badge::Badge;
pub use controller::{Controller, SubmitOutcome};
pub use difficulty::Difficulty;
pub use error::{AppError, AppResult};
pub use scoring::{score, Score};
pub use store::{Attempt, LeaderboardEntry, ScoreStore};
