//! Time-window classification of threads.
//!
//! Activity windows are inclusive at the boundary (`now - t <= window`),
//! needs-response windows are exclusive (`now - t > window`). A thread
//! without a creation time never appears in a time-windowed view.

use crate::models::{FeedEvent, TimeFilter};

/// Timestamps a thread is classified on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThreadActivity {
    pub created_at: Option<u64>,
    /// Latest qualifying reply from anyone
    pub last_reply_at: Option<u64>,
    /// Latest qualifying reply from someone other than the current user
    pub last_other_reply_at: Option<u64>,
    /// Latest qualifying reply from the current user
    pub last_own_reply_at: Option<u64>,
}

impl ThreadActivity {
    pub fn compute<'a, I>(thread: &FeedEvent, replies: I, current_user: Option<&str>) -> Self
    where
        I: IntoIterator<Item = &'a FeedEvent>,
    {
        let mut activity = Self {
            created_at: thread.created_at,
            ..Self::default()
        };

        for reply in replies {
            if reply.root_ref() != Some(thread.id.as_str()) || !reply.is_qualifying_reply() {
                continue;
            }
            let Some(at) = reply.created_at else {
                continue;
            };

            activity.last_reply_at = activity.last_reply_at.max(Some(at));
            if current_user == Some(reply.pubkey.as_str()) {
                activity.last_own_reply_at = activity.last_own_reply_at.max(Some(at));
            } else {
                activity.last_other_reply_at = activity.last_other_reply_at.max(Some(at));
            }
        }

        activity
    }

    /// Whether the thread belongs in the view selected by `filter` at `now`.
    /// `None` selects every thread.
    pub fn matches(&self, filter: Option<TimeFilter>, now: u64) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        let Some(created_at) = self.created_at else {
            return false;
        };

        match filter {
            TimeFilter::Activity(window) => {
                let reference = self.last_reply_at.unwrap_or(created_at);
                now.saturating_sub(reference) <= window.seconds()
            }
            TimeFilter::NeedsResponse(window) => {
                let Some(other) = self.last_other_reply_at else {
                    return false;
                };
                if self.last_own_reply_at.is_some_and(|own| own > other) {
                    return false;
                }
                now.saturating_sub(other) > window.seconds()
            }
        }
    }
}

/// Split `threads` into (matching, not matching) for `filter`.
/// `replies_for` supplies the reply snapshot of a thread id.
pub fn partition<'a, 'r, F, R>(
    threads: impl IntoIterator<Item = &'a FeedEvent>,
    replies_for: F,
    filter: Option<TimeFilter>,
    now: u64,
    current_user: Option<&str>,
) -> (Vec<&'a FeedEvent>, Vec<&'a FeedEvent>)
where
    F: Fn(&str) -> R,
    R: IntoIterator<Item = &'r FeedEvent>,
{
    threads.into_iter().partition(|thread| {
        ThreadActivity::compute(thread, replies_for(&thread.id), current_user).matches(filter, now)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    const ME: &str = "me";
    const HOUR: u64 = 3600;

    fn activity_1h() -> Option<TimeFilter> {
        Some(TimeFilter::Activity(TimeWindow::OneHour))
    }

    fn needs_1h() -> Option<TimeFilter> {
        Some(TimeFilter::NeedsResponse(TimeWindow::OneHour))
    }

    fn thread(at: Option<u64>) -> FeedEvent {
        FeedEvent::new("t", "alice", 11, at)
    }

    fn reply(id: &str, author: &str, at: u64) -> FeedEvent {
        FeedEvent::new(id, author, 1111, Some(at)).with_tag(["E", "t"])
    }

    fn classify(thread: &FeedEvent, replies: &[FeedEvent], filter: Option<TimeFilter>, now: u64) -> bool {
        ThreadActivity::compute(thread, replies, Some(ME)).matches(filter, now)
    }

    #[test]
    fn test_scenario_a_fresh_thread_without_replies() {
        let t = thread(Some(1000));
        let now = 1000 + 1800;
        assert!(classify(&t, &[], activity_1h(), now));
        assert!(!classify(&t, &[], needs_1h(), now));
    }

    #[test]
    fn test_scenario_b_other_party_waiting() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", "bob", 100)];
        assert!(classify(&t, &replies, needs_1h(), 100 + 3700));
    }

    #[test]
    fn test_scenario_c_user_already_responded() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", "bob", 100), reply("r2", ME, 150)];
        assert!(!classify(&t, &replies, needs_1h(), 100 + 3700));
    }

    #[test]
    fn test_boundary_asymmetry_at_exact_threshold() {
        let now = 10_000;
        let t = thread(Some(0));
        let replies = vec![reply("r1", "bob", now - HOUR)];
        assert!(classify(&t, &replies, activity_1h(), now));
        assert!(!classify(&t, &replies, needs_1h(), now));

        // One second later both flip
        assert!(!classify(&t, &replies, activity_1h(), now + 1));
        assert!(classify(&t, &replies, needs_1h(), now + 1));
    }

    #[test]
    fn test_activity_uses_latest_reply_not_creation() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", ME, 9_000)];
        assert!(classify(&t, &replies, activity_1h(), 10_000));
        assert!(!classify(&t, &[], activity_1h(), 10_000));
    }

    #[test]
    fn test_own_reply_at_same_second_still_needs_response() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", "bob", 100), reply("r2", ME, 100)];
        assert!(classify(&t, &replies, needs_1h(), 100 + 3700));
    }

    #[test]
    fn test_only_own_replies_never_need_response() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", ME, 100)];
        assert!(!classify(&t, &replies, needs_1h(), 100_000));
    }

    #[test]
    fn test_reactions_do_not_trigger_needs_response() {
        let t = thread(Some(0));
        let reaction = FeedEvent::new("x", "bob", 7, Some(100)).with_tag(["E", "t"]);
        assert!(!classify(&t, &[reaction], needs_1h(), 100_000));
    }

    #[test]
    fn test_missing_created_at_is_excluded_from_windows() {
        let t = thread(None);
        let replies = vec![reply("r1", "bob", 100)];
        assert!(!classify(&t, &replies, activity_1h(), 200));
        assert!(!classify(&t, &replies, needs_1h(), 100_000));
        assert!(classify(&t, &replies, None, 100_000));
    }

    #[test]
    fn test_without_current_user_everyone_is_other() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", ME, 100)];
        let activity = ThreadActivity::compute(&t, &replies, None);
        assert_eq!(activity.last_other_reply_at, Some(100));
        assert_eq!(activity.last_own_reply_at, None);
    }

    #[test]
    fn test_future_timestamps_count_as_recent() {
        let t = thread(Some(0));
        let replies = vec![reply("r1", "bob", 20_000)];
        assert!(classify(&t, &replies, activity_1h(), 10_000));
        assert!(!classify(&t, &replies, needs_1h(), 10_000));
    }

    #[test]
    fn test_partition_is_idempotent() {
        let threads = vec![
            FeedEvent::new("a", "alice", 11, Some(9_000)),
            FeedEvent::new("b", "alice", 11, Some(0)),
            FeedEvent::new("c", "alice", 11, None),
        ];
        let replies = vec![FeedEvent::new("r", "bob", 1111, Some(9_500)).with_tag(["E", "b"])];
        let replies_for = |id: &str| {
            replies
                .iter()
                .filter(|r| r.root_ref() == Some(id))
                .collect::<Vec<_>>()
        };

        let first = partition(&threads, replies_for, activity_1h(), 10_000, Some(ME));
        let second = partition(&threads, replies_for, activity_1h(), 10_000, Some(ME));

        let ids = |v: &Vec<&FeedEvent>| v.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first.0), vec!["a", "b"]);
        assert_eq!(ids(&first.1), vec!["c"]);
        assert_eq!(ids(&first.0), ids(&second.0));
        assert_eq!(ids(&first.1), ids(&second.1));
    }
}
