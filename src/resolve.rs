//! URL 解析 - 把通知的 API 引用换算成可浏览的网页链接
//!
//! 解析从不让管道失败：任何回查错误都降级为仓库主页链接。
//! 整组通知的回查并发进行，结果按原顺序回填。

use futures::future::join_all;
use tracing::debug;

use crate::github::{Notification, NotificationSource, SubjectKind};

/// 解析单条通知的展示链接
pub async fn determine_url<S>(source: &S, notification: &Notification) -> String
where
    S: NotificationSource + ?Sized,
{
    let repo = &notification.repository;
    let fallback = repo.html_url.clone();

    match notification.subject.kind {
        SubjectKind::Issue | SubjectKind::PullRequest | SubjectKind::Release => {
            lookup(source, notification.subject.url.as_deref(), fallback).await
        }
        // Commit 通知优先取最近评论，得到带锚点的页面
        SubjectKind::Commit => {
            let target = notification
                .subject
                .latest_comment_url
                .as_deref()
                .or(notification.subject.url.as_deref());
            lookup(source, target, fallback).await
        }
        SubjectKind::Discussion => format!("{}/discussions", repo.html_url),
        SubjectKind::CheckSuite => format!("{}/actions", repo.html_url),
        SubjectKind::RepositoryInvitation => format!("{}/invitations", repo.html_url),
        SubjectKind::Unknown => fallback,
    }
}

async fn lookup<S>(source: &S, api_url: Option<&str>, fallback: String) -> String
where
    S: NotificationSource + ?Sized,
{
    let Some(api_url) = api_url else {
        return fallback;
    };
    match source.fetch_html_url(api_url).await {
        Ok(html_url) => html_url,
        Err(error) => {
            debug!(%api_url, %error, "url lookup failed, falling back to repository link");
            fallback
        }
    }
}

/// 并发解析整组通知，按原顺序回填 `html_url`
pub async fn resolve_all<S>(source: &S, mut notifications: Vec<Notification>) -> Vec<Notification>
where
    S: NotificationSource + ?Sized,
{
    let lookups = notifications.iter().map(|n| determine_url(source, n));
    let urls = join_all(lookups).await;
    for (notification, url) in notifications.iter_mut().zip(urls) {
        notification.html_url = Some(url);
    }
    notifications
}
