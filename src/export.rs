use crate::error::AppResult;
use crate::store::Attempt;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct AttemptRecord<'a> {
    id: i64,
    username: &'a str,
    wpm: f64,
    accuracy: f64,
    time_taken: f64,
    difficulty: &'a str,
    timestamp: String,
}

impl<'a> From<&'a Attempt> for AttemptRecord<'a> {
    fn from(a: &'a Attempt) -> Self {
        Self {
            id: a.id,
            username: &a.username,
            wpm: a.wpm,
            accuracy: a.accuracy,
            time_taken: a.elapsed_secs,
            difficulty: a.difficulty.as_str(),
            timestamp: a.recorded_at.to_rfc3339(),
        }
    }
}

/// Write attempts as CSV with a header row; returns the number of rows written
pub fn write_attempts_csv<W: Write>(writer: W, attempts: &[Attempt]) -> AppResult<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    for attempt in attempts {
        wtr.serialize(AttemptRecord::from(attempt))?;
    }
    wtr.flush()?;
    Ok(attempts.len())
}
