//! 调度窗口解析 - 根据 cron 表达式推算回溯窗口的起点
//!
//! "now" 通常落在当前调度周期内部，向前回退一步只能得到当前周期的起点，
//! 会漏掉上一个已完成周期的通知。因此固定回退两步，取上上次触发时刻。

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::ForwardError;

/// 计算回溯窗口的起点：now 之前的第二个触发时刻
pub fn previous_run_start(
    expression: &str,
    timezone: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ForwardError> {
    let tz: Tz = timezone.parse().map_err(|_| ForwardError::InvalidTimezone {
        timezone: timezone.to_string(),
    })?;

    let schedule =
        Schedule::from_str(&normalize(expression)).map_err(|error| ForwardError::InvalidSchedule {
            expression: expression.to_string(),
            reason: error.to_string(),
        })?;

    let mut firings = schedule.after(&now.with_timezone(&tz));
    // 第一步回到当前周期的起点，第二步才是上一个完整周期的起点
    firings.next_back();
    let start = firings.next_back().ok_or_else(|| ForwardError::InvalidSchedule {
        expression: expression.to_string(),
        reason: "no prior firing before now".to_string(),
    })?;

    Ok(start.with_timezone(&Utc))
}

/// workflow 调度使用五段 cron（分钟精度），cron crate 需要秒段，补零对齐
fn normalize(expression: &str) -> String {
    if expression.split_whitespace().count() == 5 {
        format!("0 {expression}")
    } else {
        expression.to_string()
    }
}
