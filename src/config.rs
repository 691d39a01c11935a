//! 运行配置 - 命令行参数与归一化后的不可变配置
//!
//! 列表参数在解析阶段就完成拆分、去空白、统一小写，
//! 后续各阶段只消费 `Config`，不再碰原始输入。

use clap::Parser;

use crate::filter::FilterSet;

/// 命令行参数，与定时 workflow 的输入一一对应
#[derive(Debug, Parser)]
#[command(name = "gsn", version, about = "Forward GitHub notifications to Slack")]
pub struct Cli {
    /// GitHub token（需要 notifications scope）
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Slack bot token
    #[arg(long, env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: String,

    /// 目标 Slack 频道（如 #github-notifications）
    #[arg(long, env = "SLACK_CHANNEL")]
    pub slack_channel: String,

    /// 调度本任务的 cron 表达式，必须与 workflow 的 schedule 保持一致
    #[arg(long)]
    pub action_schedule: String,

    /// cron 表达式使用的时区
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// 拉取全部分页而非单页 100 条（需要更宽的 token scope）
    #[arg(long)]
    pub paginate_all: bool,

    /// 只拉取未读通知
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub filter_only_unread: bool,

    /// 只拉取用户直接参与的通知
    #[arg(long)]
    pub filter_only_participating: bool,

    /// 仅保留这些 reason（逗号分隔，留空不过滤）
    #[arg(long, default_value = "")]
    pub filter_include_reasons: String,

    /// 剔除这些 reason（逗号分隔）
    #[arg(long, default_value = "")]
    pub filter_exclude_reasons: String,

    /// 仅保留这些仓库，owner/name 全名（逗号分隔）
    #[arg(long, default_value = "")]
    pub filter_include_repositories: String,

    /// 剔除这些仓库（逗号分隔）
    #[arg(long, default_value = "")]
    pub filter_exclude_repositories: String,

    /// 最旧的通知排在最前（默认保持接口的新到旧顺序）
    #[arg(long)]
    pub sort_oldest_first: bool,

    /// 转发完成后将通知标记为已读
    #[arg(long)]
    pub mark_as_read: bool,

    /// 打印每条原始通知（调试用）
    #[arg(long)]
    pub debug_logging: bool,
}

/// 归一化后的运行配置
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub slack_token: String,
    pub slack_channel: String,
    pub schedule: String,
    pub timezone: String,
    pub paginate_all: bool,
    pub only_unread: bool,
    pub only_participating: bool,
    pub filters: FilterSet,
    pub sort_oldest_first: bool,
    pub mark_as_read: bool,
    pub debug_logging: bool,
}

impl Cli {
    pub fn into_config(self) -> Config {
        Config {
            github_token: self.github_token,
            slack_token: self.slack_token,
            slack_channel: self.slack_channel,
            schedule: self.action_schedule,
            timezone: self.timezone,
            paginate_all: self.paginate_all,
            only_unread: self.filter_only_unread,
            only_participating: self.filter_only_participating,
            filters: FilterSet {
                include_reasons: parse_list(&self.filter_include_reasons),
                exclude_reasons: parse_list(&self.filter_exclude_reasons),
                include_repositories: parse_list(&self.filter_include_repositories),
                exclude_repositories: parse_list(&self.filter_exclude_repositories),
            },
            sort_oldest_first: self.sort_oldest_first,
            mark_as_read: self.mark_as_read,
            debug_logging: self.debug_logging,
        }
    }
}

/// 逗号分隔列表 → 去空白、去空项、统一小写
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
