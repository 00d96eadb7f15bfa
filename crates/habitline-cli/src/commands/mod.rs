pub mod config;
pub mod habit;
pub mod track;

use chrono::NaiveDate;
use habitline_core::{CalendarZone, Config, Habit, HabitDb};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve `--as-of`, defaulting to today in the configured zone.
///
/// This is the only place the CLI reads the clock.
pub fn resolve_day(
    as_of: Option<&str>,
    zone: CalendarZone,
) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match as_of {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid --as-of date '{raw}' (expected YYYY-MM-DD): {e}").into()),
        None => Ok(zone.today()),
    }
}

/// Load a habit owned by the configured account.
///
/// Habits of other owners are reported as missing.
pub fn owned_habit(
    db: &HabitDb,
    config: &Config,
    id: &str,
) -> Result<Habit, Box<dyn std::error::Error>> {
    match db.get_habit(id)? {
        Some(habit) if habit.owner_id == config.account.owner_id => Ok(habit),
        _ => Err(format!("Habit not found: {id}").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_date_is_parsed() {
        let day = resolve_day(Some("2024-01-10"), CalendarZone::Utc).unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = resolve_day(Some("10/01/2024"), CalendarZone::Utc).unwrap_err();
        assert!(err.to_string().contains("invalid --as-of date"));
    }

    #[test]
    fn missing_date_defaults_to_today_in_zone() {
        let zone = CalendarZone::fixed(-600).unwrap();
        assert_eq!(resolve_day(None, zone).unwrap(), zone.today());
    }

    #[test]
    fn other_owners_habits_are_hidden() {
        let db = HabitDb::open_memory().unwrap();
        let habit = Habit::new("someone-else", "Run", chrono::Utc::now()).unwrap();
        db.create_habit(&habit).unwrap();

        let config = Config::default();
        assert!(owned_habit(&db, &config, &habit.id).is_err());

        let mut theirs = Config::default();
        theirs.apply("account.owner_id", "someone-else").unwrap();
        assert_eq!(owned_habit(&db, &theirs, &habit.id).unwrap().id, habit.id);
    }
}
