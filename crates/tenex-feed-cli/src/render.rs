use chrono::{DateTime, Local};
use serde::Serialize;
use tenex_feed::models::ThreadView;
use tenex_feed::store::ThreadList;
use tenex_feed::virtual_list::RenderPlan;
use tenex_feed::FeedItem;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_time(timestamp: Option<u64>) -> String {
    timestamp
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "----------------".to_string())
}

fn thread_row(thread: &ThreadView) -> String {
    let mut line = format!(
        "{}  {}  ({} replies, {} participants)",
        format_time(thread.sort_time()),
        thread.title,
        thread.reply_count,
        thread.participant_count
    );
    if let Some(phase) = &thread.phase {
        line.push_str(&format!(" [{}]", phase));
    }
    if !thread.hashtags.is_empty() {
        let tags: Vec<String> = thread.hashtags.iter().map(|t| format!("#{}", t)).collect();
        line.push_str(&format!(" {}", tags.join(" ")));
    }
    line
}

/// Text rows for the part of `list` selected by `plan`.
pub fn thread_lines(list: &ThreadList, plan: &RenderPlan) -> Vec<String> {
    if let Some(message) = &list.empty_message {
        return vec![message.clone()];
    }

    let rows = plan.rows();
    let mut lines = Vec::new();
    for thread in &list.threads[rows.clone()] {
        lines.push(thread_row(thread));
        if !thread.preview.is_empty() {
            lines.push(format!("    {}", thread.preview));
        }
    }
    if plan.is_virtualized() {
        lines.push(format!(
            "-- {}-{} of {} --",
            rows.start + 1,
            rows.end,
            list.threads.len()
        ));
    }
    lines
}

pub fn feed_line(item: &FeedItem) -> String {
    format!("{}  {}", format_time(item.created_at()), item.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: &str, title: &str) -> ThreadView {
        ThreadView {
            id: id.to_string(),
            pubkey: "alice".to_string(),
            title: title.to_string(),
            preview: String::new(),
            reply_count: 2,
            participant_count: 3,
            created_at: None,
            last_activity: None,
            phase: Some("execution".to_string()),
            hashtags: vec!["infra".to_string()],
            project: None,
        }
    }

    #[test]
    fn test_empty_list_shows_message() {
        let list = ThreadList {
            threads: vec![],
            empty_message: Some("No conversations".to_string()),
        };
        let lines = thread_lines(&list, &RenderPlan::All { count: 0 });
        assert_eq!(lines, vec!["No conversations"]);
    }

    #[test]
    fn test_row_format() {
        let list = ThreadList {
            threads: vec![view("a", "Deploy")],
            empty_message: None,
        };
        let lines = thread_lines(&list, &RenderPlan::All { count: 1 });
        assert_eq!(
            lines,
            vec!["----------------  Deploy  (2 replies, 3 participants) [execution] #infra"]
        );
    }

    #[test]
    fn test_window_footer() {
        let threads = (0..10).map(|i| view(&i.to_string(), "T")).collect();
        let list = ThreadList {
            threads,
            empty_message: None,
        };
        let plan = RenderPlan::Window {
            rows: 2..4,
            offset: 0,
            total_height: 0,
        };
        let lines = thread_lines(&list, &plan);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "-- 3-4 of 10 --");
    }
}
