use serde::Serialize;

/// Connectivity as seen by the most recent poll.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Connected,
    Degraded,
}

/// What the visible "Connecting..." indicator has to do after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorChange {
    Shown,
    Hidden,
    Unchanged,
}

/// Tracks poll outcomes and reports indicator transitions. Repeated
/// failures keep the indicator shown without showing it again.
#[derive(Debug, Clone, Default)]
pub struct ConnectivityIndicator {
    state: ConnectionState,
    consecutive_failures: u32,
}

impl ConnectivityIndicator {
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_shown(&self) -> bool {
        self.state == ConnectionState::Degraded
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn record_success(&mut self) -> IndicatorChange {
        self.consecutive_failures = 0;
        match self.state {
            ConnectionState::Degraded => {
                self.state = ConnectionState::Connected;
                IndicatorChange::Hidden
            }
            ConnectionState::Connected => IndicatorChange::Unchanged,
        }
    }

    pub fn record_failure(&mut self) -> IndicatorChange {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        match self.state {
            ConnectionState::Connected => {
                self.state = ConnectionState::Degraded;
                IndicatorChange::Shown
            }
            ConnectionState::Degraded => IndicatorChange::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connected_without_indicator() {
        let indicator = ConnectivityIndicator::default();
        assert_eq!(indicator.state(), ConnectionState::Connected);
        assert!(!indicator.is_shown());
    }

    #[test]
    fn shows_once_over_consecutive_failures() {
        let mut indicator = ConnectivityIndicator::default();
        assert_eq!(indicator.record_failure(), IndicatorChange::Shown);
        assert_eq!(indicator.record_failure(), IndicatorChange::Unchanged);
        assert_eq!(indicator.record_failure(), IndicatorChange::Unchanged);
        assert!(indicator.is_shown());
        assert_eq!(indicator.consecutive_failures(), 3);

        assert_eq!(indicator.record_success(), IndicatorChange::Hidden);
        assert!(!indicator.is_shown());
        assert_eq!(indicator.consecutive_failures(), 0);
        assert_eq!(indicator.record_success(), IndicatorChange::Unchanged);
    }
}
