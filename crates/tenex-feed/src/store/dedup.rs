use std::collections::HashMap;

use super::replies::is_newer;
use crate::models::FeedEvent;

/// Collapse events sharing an `E` reference into one representative each.
///
/// The representative is the newest event by `created_at` (untimed events
/// lose to timed ones); equal timestamps go to the greater id. Events with no
/// `E` tag pass through. Kept events retain their input order.
pub fn dedup_by_reference<'a, I>(events: I) -> Vec<&'a FeedEvent>
where
    I: IntoIterator<Item = &'a FeedEvent>,
{
    let events: Vec<&FeedEvent> = events.into_iter().collect();

    let mut winners: HashMap<&str, usize> = HashMap::new();
    for (index, event) in events.iter().enumerate() {
        let Some(reference) = event.root_ref() else {
            continue;
        };
        match winners.get(reference) {
            Some(&current) if !is_newer(event, events[current]) => {}
            _ => {
                winners.insert(reference, index);
            }
        }
    }

    events
        .iter()
        .enumerate()
        .filter(|(index, event)| match event.root_ref() {
            Some(reference) => winners.get(reference) == Some(index),
            None => true,
        })
        .map(|(_, event)| *event)
        .collect()
}
