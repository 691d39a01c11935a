//! 转发管道 - 窗口推算、拉取、过滤、解析、投递、标记已读的编排
//!
//! 各阶段严格串行，仅 URL 解析内部并发。空结果是正常完成而非错误：
//! 拉取为空与过滤后为空是两种不同的正常结局，日志提示各不相同。
//!
//! 投递先于标记已读。投递失败时一条都不会被标记；标记中途失败时，
//! 之前已标记的线程保持已读，不做回滚。

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ForwardError;
use crate::filter::FilterSummary;
use crate::github::{NotificationQuery, NotificationSource};
use crate::resolve::resolve_all;
use crate::schedule::previous_run_start;
use crate::slack::MessageSink;

/// 一次运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 窗口内没有拉到任何通知
    NoneFetched,
    /// 拉到了通知但全部被过滤掉
    AllFiltered,
    /// 成功转发
    Forwarded { sent: usize, marked_read: usize },
}

/// 执行一次完整的转发
pub async fn run<S, K>(
    source: &S,
    sink: &K,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<RunOutcome, ForwardError>
where
    S: NotificationSource + ?Sized,
    K: MessageSink + ?Sized,
{
    let since = previous_run_start(&config.schedule, &config.timezone, now)?;
    info!(%since, %now, "fetching notifications for the previous schedule window");

    let query = NotificationQuery {
        since,
        all: !config.only_unread,
        participating: config.only_participating,
    };
    let notifications = if config.paginate_all {
        source
            .paginate_notifications(&query)
            .await
            .map_err(|error| ForwardError::FetchAll { source: error.into() })?
    } else {
        source
            .list_notifications(&query)
            .await
            .map_err(|error| ForwardError::Fetch { source: error.into() })?
    };

    if notifications.is_empty() {
        info!(
            only_unread = config.only_unread,
            only_participating = config.only_participating,
            "no new notifications fetched since last run"
        );
        return Ok(RunOutcome::NoneFetched);
    }
    info!(count = notifications.len(), "notifications fetched before filtering");

    if config.debug_logging {
        for notification in &notifications {
            debug!(
                payload = %serde_json::to_string(notification).unwrap_or_default(),
                "fetched notification"
            );
        }
    }

    let notifications = config.filters.apply(notifications);
    if notifications.is_empty() {
        let summary = FilterSummary {
            only_unread: config.only_unread,
            only_participating: config.only_participating,
            filters: &config.filters,
        };
        info!(filters = %summary, "no notifications left after filtering");
        return Ok(RunOutcome::AllFiltered);
    }

    let mut notifications = resolve_all(source, notifications).await;

    // 默认保持接口返回的新到旧顺序，按需翻转为旧到新
    if config.sort_oldest_first {
        notifications.reverse();
    }

    info!(
        count = notifications.len(),
        channel = %config.slack_channel,
        "forwarding notifications to slack"
    );
    sink.deliver(&config.slack_channel, &notifications)
        .await
        .map_err(|error| ForwardError::Deliver {
            channel: config.slack_channel.clone(),
            source: error.into(),
        })?;

    let mut marked_read = 0;
    if config.mark_as_read {
        info!(count = notifications.len(), "marking forwarded notifications as read");
        // 按投递顺序逐条标记，中途失败即中止
        for notification in &notifications {
            source
                .mark_thread_read(&notification.id)
                .await
                .map_err(|error| ForwardError::MarkRead {
                    thread_id: notification.id.clone(),
                    source: error.into(),
                })?;
            marked_read += 1;
        }
    }

    Ok(RunOutcome::Forwarded {
        sent: notifications.len(),
        marked_read,
    })
}
