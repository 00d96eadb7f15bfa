mod engine;
mod zone;

pub use engine::{
    completed_days, compute_streak, is_completed_on, streak_label, summarize, StreakSummary,
};
pub use zone::CalendarZone;
