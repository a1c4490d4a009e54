//! # LRC 格式解析器
//!
//! 兼容几种历史上互不相容的双语写法：
//! - 同一时间戳的两行，第一行为原文、第二行为译文；
//! - 单行内以 ` / ` 或 ` | ` 分隔原文与译文；
//! - 一行携带多个时间戳标签，共享同一段文本；
//! - 没有时间戳的纯文本行。
//!
//! 解析从不失败，无法识别的行会被跳过。

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::timestamp::{TIMESTAMP_TAG_REGEX, Timestamp};
use crate::types::{Document, LyricLine, MetadataKey};

/// 匹配 `[ti:...]` / `[ar:...]` / `[al:...]` 元数据标签
static LRC_METADATA_TAG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[(ti|ar|al):([^\]]*)\]").expect("未能编译 LRC_METADATA_TAG_REGEX")
});

/// 单行双语的分隔符，两侧空白可有可无
static BILINGUAL_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*[/|]\s*").expect("未能编译 BILINGUAL_SEPARATOR_REGEX")
});

/// 两侧都有空白的分隔符，即生成器写出的 ` / `
static PADDED_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+[/|]\s+").expect("未能编译 PADDED_SEPARATOR_REGEX")
});

/// 将 LRC 文本解析为 [`Document`]。
///
/// 有时间戳的行按时间升序排列，无时间戳的行附在最后。
/// 这是文档顺序唯一一次由时间戳决定的地方。
#[must_use]
pub fn parse_lrc(content: &str) -> Document {
    let mut document = Document::new();
    let mut timed: BTreeMap<Timestamp, Vec<String>> = BTreeMap::new();
    let mut untimed: Vec<String> = Vec::new();

    for (line_num, raw_line) in content.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = LRC_METADATA_TAG_REGEX.captures(line) {
            if let Ok(key) = caps[1].parse::<MetadataKey>() {
                document.metadata.set(key, caps[2].trim());
            }
            continue;
        }

        let text = line
            .rfind(']')
            .map_or(line, |pos| line[pos + 1..].trim())
            .to_string();

        let mut saw_tag = false;
        let mut timestamps: Vec<Timestamp> = Vec::new();
        for caps in TIMESTAMP_TAG_REGEX.captures_iter(line) {
            saw_tag = true;
            match Timestamp::from_parts(&caps[1], &caps[2], &caps[3]) {
                Ok(ts) => timestamps.push(ts),
                Err(e) => log::warn!("[LRC 解析] 行 {}: 跳过无效时间戳: {e}", line_num + 1),
            }
        }

        if !timestamps.is_empty() {
            for ts in timestamps {
                timed.entry(ts).or_default().push(text.clone());
            }
        } else if saw_tag {
            log::warn!(
                "[LRC 解析] 行 {}: 所有时间戳均无效，已跳过: '{line}'",
                line_num + 1
            );
        } else if !text.is_empty() {
            untimed.push(text);
        } else {
            log::debug!("[LRC 解析] 行 {}: 跳过未识别的标签: '{line}'", line_num + 1);
        }
    }

    for (ts, texts) in timed {
        let line = match texts.as_slice() {
            [single] => split_bilingual(Some(ts), single),
            [original, translated, rest @ ..] => {
                if !rest.is_empty() {
                    log::warn!(
                        "[LRC 解析] 时间戳 {ts} 下有 {} 行文本，仅保留前两行",
                        texts.len()
                    );
                }
                LyricLine::new(Some(ts), original.as_str(), translated.as_str())
            }
            [] => continue,
        };
        document.lines.push(line);
    }

    document
        .lines
        .extend(untimed.iter().map(|text| split_bilingual(None, text)));

    log::debug!(
        "[LRC 解析] 共解析 {} 行歌词，其中 {} 行无时间戳",
        document.lines.len(),
        untimed.len()
    );

    document
}

/// 按单行分隔符拆出原文与译文，只在第一个分隔符处拆分，没有分隔符时译文为空。
///
/// 文本中存在两侧带空白的分隔符时优先在它处拆分，
/// 因此 `AC/DC / 译文` 的原文仍是 `AC/DC`。
#[must_use]
pub fn split_bilingual(timestamp: Option<Timestamp>, text: &str) -> LyricLine {
    let separator = if PADDED_SEPARATOR_REGEX.is_match(text) {
        &*PADDED_SEPARATOR_REGEX
    } else {
        &*BILINGUAL_SEPARATOR_REGEX
    };
    let mut parts = separator.splitn(text, 2);
    let original = parts.next().unwrap_or_default();
    let translated = parts.next().unwrap_or_default();
    LyricLine::new(timestamp, original, translated)
}
