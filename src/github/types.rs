//! GitHub 通知 API 数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知所指向资源的类型，决定 URL 解析规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    Issue,
    PullRequest,
    Commit,
    Release,
    Discussion,
    CheckSuite,
    RepositoryInvitation,
    /// 未识别的类型，统一降级为仓库主页链接
    #[serde(other)]
    Unknown,
}

/// 通知主题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub title: String,
    /// 资源的 API URL（部分类型为空，如 Discussion）
    #[serde(default)]
    pub url: Option<String>,
    /// 最近一条评论的 API URL
    #[serde(default)]
    pub latest_comment_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: SubjectKind,
}

/// 通知来源仓库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub full_name: String,
    pub html_url: String,
}

/// 一条通知线程，反序列化自 GET /notifications
///
/// `html_url` 不在入站数据中，由 URL 解析阶段补齐。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub reason: String,
    pub unread: bool,
    pub updated_at: DateTime<Utc>,
    /// 线程自身的 API URL
    pub url: String,
    pub subject: Subject,
    pub repository: Repository,
    /// 解析出的可浏览链接
    #[serde(skip_deserializing, default)]
    pub html_url: Option<String>,
}

/// 拉取参数
#[derive(Debug, Clone)]
pub struct NotificationQuery {
    /// 窗口起点，只拉取此后有更新的通知
    pub since: DateTime<Utc>,
    /// true 时包含已读通知（对应 API 的 all=true）
    pub all: bool,
    /// 只拉取用户直接参与的通知
    pub participating: bool,
}
