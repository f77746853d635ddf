use std::collections::BTreeSet;

use crate::constants::tags;
use crate::models::tag_utils::extract_tag_str;
use crate::models::FeedEvent;

/// Per-thread reply aggregate, recomputed from the full reply snapshot on
/// every change so arrival order never affects the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplySummary {
    /// Replies of kind 1111 or 1934
    pub reply_count: usize,
    /// Thread author plus authors of qualifying replies
    pub participants: BTreeSet<String>,
    pub last_reply_at: Option<u64>,
    /// Content of the latest qualifying reply
    pub last_message: Option<String>,
    /// Phase tag of the newest reply carrying one, any kind
    pub phase: Option<String>,
}

impl ReplySummary {
    /// Aggregate `replies` for `thread`. Events whose `E` tag does not name
    /// this thread are ignored, as are timestamps that are missing.
    pub fn compute<'a, I>(thread: &FeedEvent, replies: I) -> Self
    where
        I: IntoIterator<Item = &'a FeedEvent>,
    {
        let mut summary = Self::default();
        summary.participants.insert(thread.pubkey.clone());

        let mut latest: Option<&FeedEvent> = None;
        let mut latest_phase: Option<(&FeedEvent, &str)> = None;

        for reply in replies {
            if reply.root_ref() != Some(thread.id.as_str()) {
                continue;
            }

            if reply.created_at.is_some() {
                if let Some(phase) = extract_tag_str(reply, tags::PHASE) {
                    if latest_phase.map_or(true, |(current, _)| is_newer(reply, current)) {
                        latest_phase = Some((reply, phase));
                    }
                }
            }

            if !reply.is_qualifying_reply() {
                continue;
            }

            summary.reply_count += 1;
            summary.participants.insert(reply.pubkey.clone());

            if reply.created_at.is_some() && latest.map_or(true, |current| is_newer(reply, current)) {
                latest = Some(reply);
            }
        }

        summary.last_reply_at = latest.and_then(|r| r.created_at);
        summary.last_message = latest.map(|r| r.content.clone());
        summary.phase = latest_phase.map(|(_, phase)| phase.to_string());
        summary
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Max of the thread's creation time and the latest reply time.
    pub fn last_activity(&self, thread: &FeedEvent) -> Option<u64> {
        thread.created_at.max(self.last_reply_at)
    }
}

/// Total order over timed events: later `created_at` wins, equal times go to
/// the greater id.
pub(crate) fn is_newer(candidate: &FeedEvent, current: &FeedEvent) -> bool {
    (candidate.created_at, candidate.id.as_str()) > (current.created_at, current.id.as_str())
}
