//! End-to-end pipeline tests with mock source and sink

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use github_slack_notifier::config::Config;
use github_slack_notifier::error::ForwardError;
use github_slack_notifier::filter::FilterSet;
use github_slack_notifier::github::{
    Notification, NotificationQuery, NotificationSource, Repository, Subject, SubjectKind,
};
use github_slack_notifier::pipeline::{run, RunOutcome};
use github_slack_notifier::slack::MessageSink;

/// Mock notification source with call recording
struct MockSource {
    notifications: Vec<Notification>,
    fail_mark_on: Option<String>,
    list_calls: AtomicUsize,
    marked: Mutex<Vec<String>>,
}

impl MockSource {
    fn new(notifications: Vec<Notification>) -> Self {
        Self {
            notifications,
            fail_mark_on: None,
            list_calls: AtomicUsize::new(0),
            marked: Mutex::new(Vec::new()),
        }
    }

    fn failing_mark_on(mut self, thread_id: &str) -> Self {
        self.fail_mark_on = Some(thread_id.to_string());
        self
    }

    fn marked(&self) -> Vec<String> {
        self.marked.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSource for MockSource {
    async fn list_notifications(&self, _query: &NotificationQuery) -> Result<Vec<Notification>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.notifications.clone())
    }

    async fn paginate_notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>> {
        self.list_notifications(query).await
    }

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()> {
        if self.fail_mark_on.as_deref() == Some(thread_id) {
            return Err(anyhow!("thread endpoint returned 500"));
        }
        self.marked.lock().unwrap().push(thread_id.to_string());
        Ok(())
    }

    async fn fetch_html_url(&self, api_url: &str) -> Result<String> {
        Ok(format!("{api_url}/html"))
    }
}

/// Mock message sink, records delivered batches
struct MockSink {
    delivered: Mutex<Vec<(String, Vec<Notification>)>>,
    fail: bool,
}

impl MockSink {
    fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn delivered(&self) -> Vec<(String, Vec<Notification>)> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for MockSink {
    async fn deliver(&self, channel: &str, notifications: &[Notification]) -> Result<()> {
        if self.fail {
            return Err(anyhow!("slack is down"));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((channel.to_string(), notifications.to_vec()));
        Ok(())
    }
}

fn notification(id: &str, reason: &str, repo: &str) -> Notification {
    Notification {
        id: id.to_string(),
        reason: reason.to_string(),
        unread: true,
        updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
        url: format!("https://api.github.com/notifications/threads/{id}"),
        subject: Subject {
            title: format!("subject {id}"),
            url: Some(format!("https://api.github.com/repos/{repo}/issues/{id}")),
            latest_comment_url: None,
            kind: SubjectKind::Issue,
        },
        repository: Repository {
            full_name: repo.to_string(),
            html_url: format!("https://github.com/{repo}"),
        },
        html_url: None,
    }
}

fn config() -> Config {
    Config {
        github_token: "gh-token".to_string(),
        slack_token: "slack-token".to_string(),
        slack_channel: "#github-notifications".to_string(),
        schedule: "*/15 * * * *".to_string(),
        timezone: "UTC".to_string(),
        paginate_all: false,
        only_unread: true,
        only_participating: false,
        filters: FilterSet::default(),
        sort_oldest_first: false,
        mark_as_read: false,
        debug_logging: false,
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 7, 0).unwrap()
}

#[tokio::test]
async fn empty_fetch_completes_without_delivering() {
    let source = MockSource::new(Vec::new());
    let sink = MockSink::new();

    let outcome = run(&source, &sink, &config(), now()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoneFetched);
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn invalid_schedule_aborts_before_any_fetch() {
    let source = MockSource::new(vec![notification("1", "mention", "acme/widgets")]);
    let sink = MockSink::new();
    let mut config = config();
    config.schedule = "not a cron".to_string();

    let err = run(&source, &sink, &config, now()).await.unwrap_err();

    assert!(matches!(err, ForwardError::InvalidSchedule { .. }));
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 0);
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn excluded_reasons_are_dropped_and_survivors_enriched() {
    // reasons [mention, review_requested, ci_activity], exclude ci_activity
    let source = MockSource::new(vec![
        notification("1", "mention", "acme/widgets"),
        notification("2", "review_requested", "acme/widgets"),
        notification("3", "ci_activity", "acme/widgets"),
    ]);
    let sink = MockSink::new();
    let mut config = config();
    config.filters.exclude_reasons = vec!["ci_activity".to_string()];

    let outcome = run(&source, &sink, &config, now()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Forwarded {
            sent: 2,
            marked_read: 0
        }
    );
    let delivered = sink.delivered();
    assert_eq!(delivered.len(), 1);
    let (channel, batch) = &delivered[0];
    assert_eq!(channel, "#github-notifications");
    let ids: Vec<_> = batch.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    for n in batch {
        assert!(!n.html_url.as_deref().unwrap_or_default().is_empty());
    }
}

#[tokio::test]
async fn fully_filtered_set_is_a_successful_no_op() {
    let source = MockSource::new(vec![notification("1", "ci_activity", "acme/widgets")]);
    let sink = MockSink::new();
    let mut config = config();
    config.filters.exclude_reasons = vec!["ci_activity".to_string()];

    let outcome = run(&source, &sink, &config, now()).await.unwrap();

    assert_eq!(outcome, RunOutcome::AllFiltered);
    assert!(sink.delivered().is_empty());
}

#[tokio::test]
async fn sort_oldest_first_reverses_dispatch_order() {
    let source = MockSource::new(vec![
        notification("newest", "mention", "acme/widgets"),
        notification("middle", "mention", "acme/widgets"),
        notification("oldest", "mention", "acme/widgets"),
    ]);
    let sink = MockSink::new();
    let mut config = config();
    config.sort_oldest_first = true;

    run(&source, &sink, &config, now()).await.unwrap();

    let ids: Vec<_> = sink.delivered()[0].1.iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids, vec!["oldest", "middle", "newest"]);
}

#[tokio::test]
async fn default_order_preserves_fetch_order() {
    let source = MockSource::new(vec![
        notification("newest", "mention", "acme/widgets"),
        notification("oldest", "mention", "acme/widgets"),
    ]);
    let sink = MockSink::new();

    run(&source, &sink, &config(), now()).await.unwrap();

    let ids: Vec<_> = sink.delivered()[0].1.iter().map(|n| n.id.clone()).collect();
    assert_eq!(ids, vec!["newest", "oldest"]);
}

#[tokio::test]
async fn mark_as_read_marks_every_notification_in_dispatch_order() {
    let source = MockSource::new(vec![
        notification("1", "mention", "acme/widgets"),
        notification("2", "mention", "acme/widgets"),
        notification("3", "mention", "acme/widgets"),
    ]);
    let sink = MockSink::new();
    let mut config = config();
    config.mark_as_read = true;

    let outcome = run(&source, &sink, &config, now()).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Forwarded {
            sent: 3,
            marked_read: 3
        }
    );
    assert_eq!(source.marked(), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn mark_failure_stops_the_sequence_but_keeps_earlier_marks() {
    let source = MockSource::new(vec![
        notification("1", "mention", "acme/widgets"),
        notification("2", "mention", "acme/widgets"),
        notification("3", "mention", "acme/widgets"),
    ])
    .failing_mark_on("2");
    let sink = MockSink::new();
    let mut config = config();
    config.mark_as_read = true;

    let err = run(&source, &sink, &config, now()).await.unwrap_err();

    match err {
        ForwardError::MarkRead { thread_id, .. } => assert_eq!(thread_id, "2"),
        other => panic!("expected MarkRead error, got {other:?}"),
    }
    // item 1 stays marked, item 3 is never attempted
    assert_eq!(source.marked(), vec!["1"]);
    // delivery happened before the failing mark step
    assert_eq!(sink.delivered().len(), 1);
}

#[tokio::test]
async fn delivery_failure_aborts_before_any_mark() {
    let source = MockSource::new(vec![notification("1", "mention", "acme/widgets")]);
    let sink = MockSink::failing();
    let mut config = config();
    config.mark_as_read = true;

    let err = run(&source, &sink, &config, now()).await.unwrap_err();

    assert!(matches!(err, ForwardError::Deliver { .. }));
    assert!(source.marked().is_empty());
}
