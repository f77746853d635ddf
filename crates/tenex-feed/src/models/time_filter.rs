use serde::{Deserialize, Serialize};

/// Width of a time-window filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeWindow {
    OneHour,
    FourHours,
    OneDay,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 3] = [Self::OneHour, Self::FourHours, Self::OneDay];

    pub fn seconds(&self) -> u64 {
        match self {
            Self::OneHour => 3600,
            Self::FourHours => 14400,
            Self::OneDay => 86400,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }

    fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.label() == label)
    }
}

/// A selected time-window view over the thread list.
///
/// "No filter" is represented as `Option::<TimeFilter>::None` by callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeFilter {
    /// Threads with any activity inside the window.
    Activity(TimeWindow),
    /// Threads where another participant has been waiting on the current
    /// user for longer than the window.
    NeedsResponse(TimeWindow),
}

const NEEDS_RESPONSE_PREFIX: &str = "needs-response-";

impl TimeFilter {
    /// Parse a filter key (`"1h"`, `"needs-response-4h"`, ...).
    /// Unknown keys yield `None`, which means no filtering.
    pub fn parse(key: &str) -> Option<Self> {
        match key.strip_prefix(NEEDS_RESPONSE_PREFIX) {
            Some(window) => TimeWindow::parse(window).map(Self::NeedsResponse),
            None => TimeWindow::parse(key).map(Self::Activity),
        }
    }

    pub fn key(&self) -> String {
        match self {
            Self::Activity(window) => window.label().to_string(),
            Self::NeedsResponse(window) => format!("{}{}", NEEDS_RESPONSE_PREFIX, window.label()),
        }
    }

    pub fn window(&self) -> TimeWindow {
        match self {
            Self::Activity(window) | Self::NeedsResponse(window) => *window,
        }
    }

    pub fn seconds(&self) -> u64 {
        self.window().seconds()
    }

    pub fn label(&self) -> String {
        match self {
            Self::Activity(window) => format!("Active {}", window.label()),
            Self::NeedsResponse(window) => format!("Needs response > {}", window.label()),
        }
    }

    /// Threshold in seconds for a raw filter key, `None` for unknown keys.
    pub fn threshold_for_key(key: &str) -> Option<u64> {
        Self::parse(key).map(|filter| filter.seconds())
    }

    pub fn cycle_next(current: Option<Self>) -> Option<Self> {
        use TimeWindow::*;
        match current {
            None => Some(Self::Activity(OneHour)),
            Some(Self::Activity(OneHour)) => Some(Self::Activity(FourHours)),
            Some(Self::Activity(FourHours)) => Some(Self::Activity(OneDay)),
            Some(Self::Activity(OneDay)) => Some(Self::NeedsResponse(OneHour)),
            Some(Self::NeedsResponse(OneHour)) => Some(Self::NeedsResponse(FourHours)),
            Some(Self::NeedsResponse(FourHours)) => Some(Self::NeedsResponse(OneDay)),
            Some(Self::NeedsResponse(OneDay)) => None,
        }
    }

    /// Placeholder shown when a filtered list is empty.
    pub fn empty_state_message(filter: Option<Self>) -> String {
        match filter {
            None => "No conversations yet".to_string(),
            Some(Self::NeedsResponse(window)) => format!(
                "No conversations waiting on you for more than {}",
                window.label()
            ),
            Some(Self::Activity(window)) => {
                format!("No conversations with activity in the last {}", window.label())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_keys() {
        assert_eq!(TimeFilter::parse("1h"), Some(TimeFilter::Activity(TimeWindow::OneHour)));
        assert_eq!(TimeFilter::parse("1d"), Some(TimeFilter::Activity(TimeWindow::OneDay)));
        assert_eq!(
            TimeFilter::parse("needs-response-4h"),
            Some(TimeFilter::NeedsResponse(TimeWindow::FourHours))
        );
    }

    #[test]
    fn test_unknown_keys_mean_no_filter() {
        assert_eq!(TimeFilter::parse("12h"), None);
        assert_eq!(TimeFilter::parse("needs-response-"), None);
        assert_eq!(TimeFilter::parse(""), None);
        assert_eq!(TimeFilter::threshold_for_key("7d"), None);
    }

    #[test]
    fn test_thresholds_are_fixed() {
        assert_eq!(TimeFilter::threshold_for_key("1h"), Some(3600));
        assert_eq!(TimeFilter::threshold_for_key("4h"), Some(14400));
        assert_eq!(TimeFilter::threshold_for_key("needs-response-1d"), Some(86400));
    }

    #[test]
    fn test_key_matches_parse() {
        let mut current = TimeFilter::cycle_next(None);
        while let Some(filter) = current {
            assert_eq!(TimeFilter::parse(&filter.key()), Some(filter));
            current = TimeFilter::cycle_next(current);
        }
    }

    #[test]
    fn test_cycle_visits_all_filters_then_none() {
        let mut seen = 0;
        let mut current = TimeFilter::cycle_next(None);
        while current.is_some() {
            seen += 1;
            current = TimeFilter::cycle_next(current);
        }
        assert_eq!(seen, 6);
    }

    #[test]
    fn test_empty_state_messages_are_distinct() {
        let none = TimeFilter::empty_state_message(None);
        let activity = TimeFilter::empty_state_message(TimeFilter::parse("1h"));
        let needs = TimeFilter::empty_state_message(TimeFilter::parse("needs-response-1h"));
        assert_ne!(none, activity);
        assert_ne!(none, needs);
        assert_ne!(activity, needs);
    }
}
