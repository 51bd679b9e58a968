/// Minimum accuracy (inclusive) that keeps a streak alive
pub const STREAK_ACCURACY_THRESHOLD: f64 = 90.0;

pub fn update_streak(current: u32, accuracy: f64) -> u32 {
    if accuracy >= STREAK_ACCURACY_THRESHOLD {
        current.saturating_add(1)
    } else {
        0
    }
}

pub fn keeps_streak(accuracy: f64) -> bool {
    accuracy >= STREAK_ACCURACY_THRESHOLD
}
