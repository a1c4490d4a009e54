//! # LRC 时间戳编解码
//!
//! 时间戳内部以厘秒存储，文本形式为 `mm:ss.cc`，分钟不设上限。
//! 读取三位小数（毫秒）时整除 10 降为厘秒；对三位数字而言，
//! 这与截取前两位的结果完全一致。

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TimestampError;

/// 匹配单个裸时间戳 `M+:SS.FF` 或 `M+:SS.FFF`
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2})\.(\d{2,3})$").expect("未能编译 TIMESTAMP_REGEX")
});

/// 从一行文本中提取所有 `[mm:ss.cc]` 标签
pub(crate) static TIMESTAMP_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(\d+):(\d{2})\.(\d{2,3})\]").expect("未能编译 TIMESTAMP_TAG_REGEX")
});

const CENTIS_PER_SECOND: u64 = 100;
const CENTIS_PER_MINUTE: u64 = 60 * CENTIS_PER_SECOND;
const MAX_CENTIS_IN_SECOND: u64 = 99;

/// 一个非负、厘秒精度的歌词时间点。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(into = "String", try_from = "String")]
pub struct Timestamp {
    centis: u64,
}

impl Timestamp {
    pub const ZERO: Self = Self { centis: 0 };

    #[must_use]
    pub const fn from_centis(centis: u64) -> Self {
        Self { centis }
    }

    /// 由浮点秒数构造。
    ///
    /// 负数与 NaN 归零；厘秒四舍五入后钳制在 `[0, 99]`，不会进位到秒。
    #[must_use]
    pub fn from_seconds(seconds: f64) -> Self {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Self::ZERO;
        }
        let whole = seconds.floor();
        let centis = ((seconds - whole) * 100.0).round() as u64;
        Self {
            centis: (whole as u64)
                .saturating_mul(CENTIS_PER_SECOND)
                .saturating_add(centis.min(MAX_CENTIS_IN_SECOND)),
        }
    }

    /// 由播放器上报的毫秒位置构造，舍入规则与 [`Timestamp::from_seconds`] 相同。
    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        let whole = ms / 1000;
        let centis = ((ms % 1000 + 5) / 10).min(MAX_CENTIS_IN_SECOND);
        Self {
            centis: whole * CENTIS_PER_SECOND + centis,
        }
    }

    #[must_use]
    pub const fn as_centis(self) -> u64 {
        self.centis
    }

    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.centis as f64 / CENTIS_PER_SECOND as f64
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.centis.saturating_mul(10)
    }

    /// 带方括号的标签形式，例如 `[01:02.03]`。
    #[must_use]
    pub fn to_tag(self) -> String {
        format!("[{self}]")
    }

    pub(crate) fn from_parts(
        minutes: &str,
        seconds: &str,
        fraction: &str,
    ) -> Result<Self, TimestampError> {
        let overflow = || TimestampError::Overflow(format!("{minutes}:{seconds}.{fraction}"));

        let minutes: u64 = minutes.parse().map_err(|_| overflow())?;
        let seconds: u64 = seconds.parse().map_err(|_| overflow())?;
        let fraction_value: u64 = fraction.parse().map_err(|_| overflow())?;
        let centis = match fraction.len() {
            2 => fraction_value,
            3 => fraction_value / 10,
            _ => {
                return Err(TimestampError::InvalidFormat(format!(
                    "{minutes}:{seconds}.{fraction}"
                )));
            }
        };

        minutes
            .checked_mul(CENTIS_PER_MINUTE)
            .and_then(|m| m.checked_add(seconds.checked_mul(CENTIS_PER_SECOND)?))
            .and_then(|t| t.checked_add(centis))
            .map(Self::from_centis)
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.centis / CENTIS_PER_MINUTE;
        let seconds = (self.centis / CENTIS_PER_SECOND) % 60;
        let centis = self.centis % CENTIS_PER_SECOND;
        write!(f, "{minutes:02}:{seconds:02}.{centis:02}")
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = TIMESTAMP_REGEX
            .captures(trimmed)
            .ok_or_else(|| TimestampError::InvalidFormat(trimmed.to_string()))?;
        Self::from_parts(&caps[1], &caps[2], &caps[3])
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> Self {
        ts.to_string()
    }
}

impl TryFrom<String> for Timestamp {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// 解析 `mm:ss.cc` 文本，返回秒数。
pub fn parse_timestamp(text: &str) -> Result<f64, TimestampError> {
    text.parse::<Timestamp>().map(Timestamp::as_seconds)
}

/// 将秒数格式化为 `mm:ss.cc`。
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    Timestamp::from_seconds(seconds).to_string()
}

/// 播放进度标签，例如 `01:02.50 / 03:30.00`。
#[must_use]
pub fn format_position_label(position_ms: i64, duration_ms: i64) -> String {
    let clamp = |ms: i64| Timestamp::from_millis(ms.max(0) as u64);
    format!("{} / {}", clamp(position_ms), clamp(duration_ms))
}
