//! GitHub 数据源 - 通知拉取、已读标记与资源回查

pub mod client;
pub mod types;

pub use client::{GithubClient, NotificationSource};
pub use types::{Notification, NotificationQuery, Repository, Subject, SubjectKind};
