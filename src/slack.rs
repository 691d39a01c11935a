//! Slack 投递 - chat.postMessage 封装与消息排版
//!
//! 排版与分批由本模块负责：Block Kit 单条消息最多 50 个 block，
//! 按固定条数分批，逐批顺序发送，任何一批失败即整体失败。

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::github::Notification;

const DEFAULT_API_URL: &str = "https://slack.com/api/chat.postMessage";
/// 每条消息承载的通知条数。header 占一个 block，留出余量不顶到 50 上限。
const CHUNK_SIZE: usize = 20;

/// 消息出口能力。管道把整组通知交给实现，分批与排版由实现负责。
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn deliver(&self, channel: &str, notifications: &[Notification]) -> Result<()>;
}

/// Slack Web API 发送端
#[derive(Debug, Clone)]
pub struct SlackSender {
    client: Client,
    api_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackSender {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build http client")?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            token: token.into(),
        })
    }

    /// 覆盖 API 地址（测试用）
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    async fn post_chunk(&self, channel: &str, chunk: &[Notification]) -> Result<()> {
        let payload = json!({
            "channel": channel,
            "text": format!("{} new GitHub notification(s)", chunk.len()),
            "blocks": build_blocks(chunk),
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .context("chat.postMessage request failed")?;

        let body: PostMessageResponse = response
            .json()
            .await
            .context("failed to decode slack response")?;

        if body.ok {
            Ok(())
        } else {
            Err(anyhow!(
                "slack rejected the message: {}",
                body.error.unwrap_or_else(|| "unknown error".to_string())
            ))
        }
    }
}

/// 把一批通知排版成 Block Kit blocks
fn build_blocks(chunk: &[Notification]) -> Vec<Value> {
    let mut blocks = vec![json!({
        "type": "header",
        "text": {
            "type": "plain_text",
            "text": format!("{} new GitHub notification(s)", chunk.len()),
        },
    })];

    for notification in chunk {
        let url = notification
            .html_url
            .as_deref()
            .unwrap_or(&notification.repository.html_url);
        blocks.push(json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!(
                    "*<{}|{}>*\n`{}` · {} · {}",
                    url,
                    notification.subject.title,
                    notification.repository.full_name,
                    notification.reason,
                    notification.updated_at.format("%Y-%m-%d %H:%M UTC"),
                ),
            },
        }));
    }

    blocks
}

#[async_trait]
impl MessageSink for SlackSender {
    async fn deliver(&self, channel: &str, notifications: &[Notification]) -> Result<()> {
        for chunk in notifications.chunks(CHUNK_SIZE) {
            self.post_chunk(channel, chunk).await?;
            debug!(count = chunk.len(), channel, "posted notification chunk to slack");
        }
        Ok(())
    }
}
