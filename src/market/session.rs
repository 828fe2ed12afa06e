use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc, Weekday};

/// Exchange local time is fixed UTC+5:30 (no DST).
pub const IST_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

/// 09:15, inclusive
const OPEN_MINUTE: u32 = 9 * 60 + 15;
/// 15:30, inclusive
const CLOSE_MINUTE: u32 = 15 * 60 + 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Open,
    Closed,
}

impl SessionState {
    pub fn from_open(open: bool) -> Self {
        if open {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open)
    }
}

/// Wall-clock time as seen on the exchange floor.
pub fn exchange_time(now: DateTime<Utc>) -> NaiveDateTime {
    now.naive_utc() + Duration::seconds(IST_OFFSET_SECS)
}

/// Session window rule: weekdays, 09:15 through 15:30 exchange time.
pub fn session_state(now: DateTime<Utc>) -> SessionState {
    let local = exchange_time(now);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return SessionState::Closed;
    }

    let minutes = local.hour() * 60 + local.minute();
    SessionState::from_open((OPEN_MINUTE..=CLOSE_MINUTE).contains(&minutes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    /// Build a UTC instant from an exchange-local wall time.
    pub(crate) fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        let local = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap();
        Utc.from_utc_datetime(&(local - Duration::seconds(IST_OFFSET_SECS)))
    }

    // 2024-01-06 is a Saturday, 2024-01-08 a Monday

    #[test]
    fn test_weekend_closed() {
        assert_eq!(session_state(ist(2024, 1, 6, 10, 0)), SessionState::Closed);
        assert_eq!(session_state(ist(2024, 1, 7, 12, 0)), SessionState::Closed);
    }

    #[test]
    fn test_open_boundary_inclusive() {
        assert_eq!(session_state(ist(2024, 1, 8, 9, 14)), SessionState::Closed);
        assert_eq!(session_state(ist(2024, 1, 8, 9, 15)), SessionState::Open);
    }

    #[test]
    fn test_close_boundary_inclusive() {
        assert_eq!(session_state(ist(2024, 1, 8, 15, 30)), SessionState::Open);
        assert_eq!(session_state(ist(2024, 1, 8, 15, 31)), SessionState::Closed);
    }

    #[test]
    fn test_last_second_of_close_minute_still_open() {
        let t = ist(2024, 1, 8, 15, 30) + Duration::seconds(59);
        assert_eq!(session_state(t), SessionState::Open);
    }

    #[test]
    fn test_day_boundary_uses_exchange_date() {
        // Friday 20:00 UTC is already Saturday 01:30 on the exchange
        let fri_evening = Utc.with_ymd_and_hms(2024, 1, 5, 20, 0, 0).unwrap();
        assert_eq!(exchange_time(fri_evening).weekday(), Weekday::Sat);
        assert_eq!(session_state(fri_evening), SessionState::Closed);

        // Monday 04:00 UTC is 09:30 on the exchange
        let mon_morning = Utc.with_ymd_and_hms(2024, 1, 8, 4, 0, 0).unwrap();
        assert_eq!(session_state(mon_morning), SessionState::Open);
    }

    #[test]
    fn test_midweek_evening_closed() {
        assert_eq!(session_state(ist(2024, 1, 10, 18, 0)), SessionState::Closed);
        assert_eq!(session_state(ist(2024, 1, 10, 0, 0)), SessionState::Closed);
    }
}
