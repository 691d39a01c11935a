//! GitHub REST 客户端
//!
//! 管道只依赖 `NotificationSource` trait；`GithubClient` 是真实实现。
//! 拉取失败如何提示由管道层按拉取模式区分，这里只负责带上下文上抛。

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

use super::types::{Notification, NotificationQuery};

const DEFAULT_BASE_URL: &str = "https://api.github.com";
const ACCEPT_HEADER: &str = "application/vnd.github+json";
const PAGE_SIZE: usize = 100;

/// 通知数据源能力
#[async_trait]
pub trait NotificationSource: Send + Sync {
    /// 单页拉取（最多 100 条）
    async fn list_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>>;

    /// 全量分页拉取，直到数据源给出最后一页
    async fn paginate_notifications(&self, query: &NotificationQuery)
        -> Result<Vec<Notification>>;

    /// 将通知线程标记为已读
    async fn mark_thread_read(&self, thread_id: &str) -> Result<()>;

    /// 查询 API 资源对应的网页链接（URL 解析阶段的回查）
    async fn fetch_html_url(&self, api_url: &str) -> Result<String>;
}

/// GitHub REST API 客户端
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("github-slack-notifier")
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            token: token.into(),
        })
    }

    /// 覆盖 API 地址（测试用）
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn notifications_page(
        &self,
        query: &NotificationQuery,
        page: usize,
    ) -> Result<Vec<Notification>> {
        let url = format!("{}/notifications", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
            .query(&[
                ("all", query.all.to_string()),
                ("participating", query.participating.to_string()),
                (
                    "since",
                    query
                        .since
                        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
                ),
                ("per_page", PAGE_SIZE.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await
            .context("notifications request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GET /notifications returned {status}: {body}"));
        }

        response
            .json()
            .await
            .context("failed to decode notifications payload")
    }
}

#[async_trait]
impl NotificationSource for GithubClient {
    async fn list_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>> {
        self.notifications_page(query, 1).await
    }

    async fn paginate_notifications(
        &self,
        query: &NotificationQuery,
    ) -> Result<Vec<Notification>> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let batch = self.notifications_page(query, page).await?;
            let fetched = batch.len();
            all.extend(batch);
            // 不足一整页即为最后一页
            if fetched < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        debug!(pages = page, total = all.len(), "fetched all notification pages");
        Ok(all)
    }

    async fn mark_thread_read(&self, thread_id: &str) -> Result<()> {
        let url = format!("{}/notifications/threads/{}", self.base_url, thread_id);
        let response = self
            .client
            .patch(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await
            .with_context(|| format!("mark-read request failed for thread {thread_id}"))?;

        let status = response.status();
        // 成功返回 205 Reset Content；304 表示线程本来就是已读
        if status.is_success() || status == StatusCode::NOT_MODIFIED {
            Ok(())
        } else {
            Err(anyhow!(
                "PATCH /notifications/threads/{thread_id} returned {status}"
            ))
        }
    }

    async fn fetch_html_url(&self, api_url: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct HtmlUrl {
            html_url: String,
        }

        let response = self
            .client
            .get(api_url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_HEADER)
            .send()
            .await
            .with_context(|| format!("resource lookup failed for {api_url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("GET {api_url} returned {status}"));
        }

        let body: HtmlUrl = response
            .json()
            .await
            .with_context(|| format!("resource payload for {api_url} missing html_url"))?;
        Ok(body.html_url)
    }
}
