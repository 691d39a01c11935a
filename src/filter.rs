//! 通知过滤 - reason 与仓库两个维度的 include/exclude 四级过滤
//!
//! 匹配列表在配置解析阶段已统一小写，比较时把通知字段也转小写，
//! 因此过滤整体是大小写无关的。

use std::fmt;

use crate::github::Notification;

/// 四组小写匹配列表
///
/// include 为白名单（非空时只保留命中的），exclude 为黑名单（非空时剔除命中的），
/// 空列表不生效。同一维度可以同时配置，先 include 后 exclude。
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub include_reasons: Vec<String>,
    pub exclude_reasons: Vec<String>,
    pub include_repositories: Vec<String>,
    pub exclude_repositories: Vec<String>,
}

impl FilterSet {
    /// 按固定顺序应用四级过滤：reason include → reason exclude →
    /// repository include → repository exclude。输入顺序保持不变。
    pub fn apply(&self, mut notifications: Vec<Notification>) -> Vec<Notification> {
        if !self.include_reasons.is_empty() {
            notifications.retain(|n| self.include_reasons.contains(&n.reason.to_lowercase()));
        }
        if !self.exclude_reasons.is_empty() {
            notifications.retain(|n| !self.exclude_reasons.contains(&n.reason.to_lowercase()));
        }
        if !self.include_repositories.is_empty() {
            notifications
                .retain(|n| self.include_repositories.contains(&n.repository.full_name.to_lowercase()));
        }
        if !self.exclude_repositories.is_empty() {
            notifications
                .retain(|n| !self.exclude_repositories.contains(&n.repository.full_name.to_lowercase()));
        }
        notifications
    }
}

/// 过滤配置摘要，供"全部被过滤"时的提示日志使用
pub struct FilterSummary<'a> {
    pub only_unread: bool,
    pub only_participating: bool,
    pub filters: &'a FilterSet,
}

impl fmt::Display for FilterSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "only-unread: {}, only-participating: {}, include-reasons: {}, exclude-reasons: {}, include-repositories: {}, exclude-repositories: {}",
            self.only_unread,
            self.only_participating,
            display_list(&self.filters.include_reasons),
            display_list(&self.filters.exclude_reasons),
            display_list(&self.filters.include_repositories),
            display_list(&self.filters.exclude_repositories),
        )
    }
}

fn display_list(list: &[String]) -> String {
    if list.is_empty() {
        "[]".to_string()
    } else {
        list.join(", ")
    }
}
