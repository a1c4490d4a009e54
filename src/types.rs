use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::timestamp::Timestamp;

/// LRC 头部支持的元数据键，`Display` 输出为标签名。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum MetadataKey {
    #[strum(to_string = "ti", serialize = "title")]
    Title,
    #[strum(to_string = "ar", serialize = "artist")]
    Artist,
    #[strum(to_string = "al", serialize = "album")]
    Album,
}

/// 固定键的元数据，值默认为空字符串。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub title: String,
    pub artist: String,
    pub album: String,
}

impl Metadata {
    #[must_use]
    pub fn get(&self, key: MetadataKey) -> &str {
        match key {
            MetadataKey::Title => &self.title,
            MetadataKey::Artist => &self.artist,
            MetadataKey::Album => &self.album,
        }
    }

    pub fn set(&mut self, key: MetadataKey, value: impl Into<String>) {
        let slot = match key {
            MetadataKey::Title => &mut self.title,
            MetadataKey::Artist => &mut self.artist,
            MetadataKey::Album => &mut self.album,
        };
        *slot = value.into();
    }

    /// 按输出顺序（标题、艺术家、专辑）遍历非空字段。
    pub fn populated(&self) -> impl Iterator<Item = (MetadataKey, &str)> {
        MetadataKey::iter()
            .map(|key| (key, self.get(key)))
            .filter(|(_, value)| !value.is_empty())
    }
}

/// 一行双语歌词。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricLine {
    /// `None` 表示尚未打点
    pub timestamp: Option<Timestamp>,
    pub original: String,
    pub translated: String,
}

impl LyricLine {
    #[must_use]
    pub fn new(
        timestamp: Option<Timestamp>,
        original: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            original: original.into(),
            translated: translated.into(),
        }
    }

    /// 原文与译文都为空。此类行在编辑中允许存在，保存时被丢弃。
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.original.is_empty() && self.translated.is_empty()
    }
}

/// 规范化的歌词文档。
///
/// `lines` 的顺序即用户看到的顺序，除首次解析外从不自动排序。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: Metadata,
    pub lines: Vec<LyricLine>,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// 保存双语歌词时的排版方式。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BilingualLayout {
    /// 原文与译文各占一行，共享同一时间戳
    #[default]
    Separated,
    /// 单行，以 ` / ` 分隔原文与译文
    SingleLine,
}

/// 可单独编辑的行字段。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum LineField {
    #[strum(to_string = "时间")]
    Timestamp,
    #[strum(to_string = "原文")]
    Original,
    #[strum(to_string = "译文")]
    Translated,
}
