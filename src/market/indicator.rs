use chrono::{DateTime, Timelike, Utc};

use super::session::{exchange_time, SessionState};
use crate::api::MarketSnapshot;

/// Where the open/closed flag on the indicator came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorSource {
    /// Server said so (knows about holidays)
    Remote,
    /// Local session window rule
    LocalRule,
}

/// Day move for one index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMove {
    pub name: &'static str,
    pub change_pct: f64,
    pub price: Option<f64>,
}

/// Everything the header status widget needs to redraw.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub state: SessionState,
    pub source: IndicatorSource,
    /// Time of the remote snapshot behind this indicator; `None` when
    /// only the local rule has spoken.
    pub updated_at: Option<DateTime<Utc>>,
    pub indices: Vec<IndexMove>,
}

impl Indicator {
    /// Indicator from the local rule alone. Carries no update time.
    pub fn local(state: SessionState) -> Self {
        Self {
            state,
            source: IndicatorSource::LocalRule,
            updated_at: None,
            indices: Vec::new(),
        }
    }

    /// Indicator from a usable snapshot. A definite `is_open` from the
    /// server wins over `local`; otherwise `local` is used.
    pub fn from_snapshot(snap: &MarketSnapshot, local: SessionState, now: DateTime<Utc>) -> Self {
        let (state, source) = match snap.is_open {
            Some(open) => (SessionState::from_open(open), IndicatorSource::Remote),
            None => (local, IndicatorSource::LocalRule),
        };

        let indices = [
            ("NIFTY 50", snap.nifty, snap.nifty_price),
            ("SENSEX", snap.sensex, snap.sensex_price),
            ("INDIA VIX", snap.vix, snap.vix_price),
            ("BANK NIFTY", snap.banknifty, snap.banknifty_price),
        ]
        .into_iter()
        .filter_map(|(name, pct, price)| {
            pct.map(|change_pct| IndexMove {
                name,
                change_pct,
                price,
            })
        })
        .collect();

        Self {
            state,
            source,
            updated_at: Some(now),
            indices,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.state {
            SessionState::Open => "MARKET OPEN",
            SessionState::Closed => "MARKET CLOSED",
        }
    }

    /// Dot colour
    pub fn color(&self) -> &'static str {
        match self.state {
            SessionState::Open => "#22c55e",
            SessionState::Closed => "#ef4444",
        }
    }

    pub fn glow(&self) -> &'static str {
        match self.state {
            SessionState::Open => "0 0 8px rgba(34, 197, 94, 0.7)",
            SessionState::Closed => "0 0 8px rgba(239, 68, 68, 0.7)",
        }
    }

    /// e.g. "Last updated: -- 3.07PM", in exchange time.
    /// `None` until a snapshot has arrived.
    pub fn updated_label(&self) -> Option<String> {
        let local = exchange_time(self.updated_at?);
        let (pm, hour12) = local.hour12();
        Some(format!(
            "Last updated: -- {}.{:02}{}",
            hour12,
            local.minute(),
            if pm { "PM" } else { "AM" }
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::session::tests::ist;

    fn snapshot(is_open: Option<bool>) -> MarketSnapshot {
        MarketSnapshot {
            status: "OK".to_string(),
            is_open,
            nifty: Some(0.42),
            nifty_price: Some(22450.5),
            vix: Some(-2.1),
            ..Default::default()
        }
    }

    #[test]
    fn test_remote_flag_wins() {
        let now = ist(2024, 1, 26, 11, 0);
        let ind = Indicator::from_snapshot(&snapshot(Some(false)), SessionState::Open, now);
        assert_eq!(ind.state, SessionState::Closed);
        assert_eq!(ind.source, IndicatorSource::Remote);
        assert_eq!(ind.label(), "MARKET CLOSED");
        assert_eq!(ind.color(), "#ef4444");
    }

    #[test]
    fn test_missing_flag_uses_local() {
        let now = ist(2024, 1, 8, 11, 0);
        let ind = Indicator::from_snapshot(&snapshot(None), SessionState::Open, now);
        assert_eq!(ind.state, SessionState::Open);
        assert_eq!(ind.source, IndicatorSource::LocalRule);
        assert_eq!(ind.label(), "MARKET OPEN");
        assert_eq!(ind.color(), "#22c55e");
    }

    #[test]
    fn test_indices_only_when_present() {
        let ind = Indicator::from_snapshot(&snapshot(None), SessionState::Open, ist(2024, 1, 8, 11, 0));
        let names: Vec<_> = ind.indices.iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["NIFTY 50", "INDIA VIX"]);
        assert_eq!(ind.indices[0].price, Some(22450.5));
        assert_eq!(ind.indices[1].price, None);
    }

    #[test]
    fn test_updated_label_twelve_hour() {
        let label = |h, m| {
            Indicator::from_snapshot(&snapshot(None), SessionState::Open, ist(2024, 1, 8, h, m))
                .updated_label()
        };
        assert_eq!(label(15, 7).as_deref(), Some("Last updated: -- 3.07PM"));
        assert_eq!(label(0, 5).as_deref(), Some("Last updated: -- 12.05AM"));
        assert_eq!(label(12, 0).as_deref(), Some("Last updated: -- 12.00PM"));
    }

    #[test]
    fn test_local_indicator_has_no_update_time() {
        let ind = Indicator::local(SessionState::Open);
        assert_eq!(ind.updated_at, None);
        assert_eq!(ind.updated_label(), None);
        assert_eq!(ind.label(), "MARKET OPEN");
    }
}
