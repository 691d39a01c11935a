//! 错误定义 - 管道级致命错误分类
//!
//! URL 解析失败不在此列：单条通知的链接查询失败会静默降级为仓库主页链接，
//! 从不中断运行。

use thiserror::Error;

/// 下层协作方（HTTP 客户端等）上抛的原始错误
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 管道致命错误。任何一个都会终止本次运行并以非零码退出。
#[derive(Debug, Error)]
pub enum ForwardError {
    /// cron 表达式无法解析
    #[error("invalid schedule expression {expression:?}: {reason}; use the same cron string that schedules this job")]
    InvalidSchedule { expression: String, reason: String },

    /// 时区名无法识别
    #[error("unknown timezone {timezone:?}")]
    InvalidTimezone { timezone: String },

    /// 单页拉取失败
    #[error("unable to fetch notifications; is the github token properly scoped?")]
    Fetch {
        #[source]
        source: SourceError,
    },

    /// 全量分页拉取失败。分页访问需要更宽的 token scope，单独提示。
    #[error("unable to fetch all notification pages with paginate-all; is the github token properly scoped?")]
    FetchAll {
        #[source]
        source: SourceError,
    },

    /// Slack 投递失败
    #[error("failed to deliver notifications to slack channel {channel:?}")]
    Deliver {
        channel: String,
        #[source]
        source: SourceError,
    },

    /// 标记已读失败。失败之前已标记的线程保持已读，不回滚。
    #[error("failed to mark notification thread {thread_id} as read")]
    MarkRead {
        thread_id: String,
        #[source]
        source: SourceError,
    },
}
