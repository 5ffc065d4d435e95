use std::collections::HashMap;

/// Remembers the previous reading of each field so "change since last poll"
/// displays can be computed. The first reading of a field yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct DeltaTracker {
    previous: HashMap<String, f64>,
}

impl DeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` for `field` and return `current - previous`.
    pub fn update(&mut self, field: &str, current: f64) -> f64 {
        match self.previous.insert(field.to_string(), current) {
            Some(previous) => current - previous,
            None => 0.0,
        }
    }

    pub fn previous(&self, field: &str) -> Option<f64> {
        self.previous.get(field).copied()
    }

    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reading_is_zero() {
        let mut tracker = DeltaTracker::new();
        let delta = tracker.update("Value", 10.0);
        assert_eq!(delta, 0.0);
        assert!(!delta.is_nan());
    }

    #[test]
    fn keeps_only_the_previous_value() {
        let mut tracker = DeltaTracker::new();
        tracker.update("Value", 10.0);
        assert_eq!(tracker.update("Value", 14.0), 4.0);
        assert_eq!(tracker.update("Value", 13.0), -1.0);
        assert_eq!(tracker.previous("Value"), Some(13.0));
    }

    #[test]
    fn fields_are_independent() {
        let mut tracker = DeltaTracker::new();
        tracker.update("Flow", 1.0);
        assert_eq!(tracker.update("Total", 50.0), 0.0);
        assert_eq!(tracker.update("Flow", 3.0), 2.0);

        tracker.reset();
        assert_eq!(tracker.update("Flow", 9.0), 0.0);
    }
}
