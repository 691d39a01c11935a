//! GitHub Slack Notifier - 按调度窗口拉取 GitHub 通知并转发到 Slack

pub mod config;
pub mod error;
pub mod filter;
pub mod github;
pub mod pipeline;
pub mod resolve;
pub mod schedule;
pub mod slack;

pub use config::{Cli, Config};
pub use error::{ForwardError, SourceError};
pub use filter::{FilterSet, FilterSummary};
pub use github::{
    GithubClient, Notification, NotificationQuery, NotificationSource, Repository, Subject,
    SubjectKind,
};
pub use pipeline::{run, RunOutcome};
pub use resolve::{determine_url, resolve_all};
pub use schedule::previous_run_start;
pub use slack::{MessageSink, SlackSender};
