use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// 时间戳文本无法解析。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("无效的时间格式: '{0}'")]
    InvalidFormat(String),
    #[error("时间数值溢出: '{0}'")]
    Overflow(String),
}

/// 编辑操作的前置条件未满足。
///
/// 被拒绝的操作不会修改文档，也不会产生撤销记录。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditRejection {
    #[error("没有选中任何行")]
    EmptySelection,
    #[error("合并至少需要选中两行，当前选中 {0} 行")]
    NeedTwoRows(usize),
    #[error("拆分需要恰好选中一行，当前选中 {0} 行")]
    NeedOneRow(usize),
    #[error("第 {0} 行的原文不足两个词，无法拆分")]
    NothingToSplit(usize),
    #[error("行号 {index} 超出范围 (共 {len} 行)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("第 {0} 行没有时间戳")]
    Untimed(usize),
    #[error(transparent)]
    InvalidTimestamp(#[from] TimestampError),
    #[error("没有正在进行的字段编辑")]
    NoPendingEdit,
    #[error("没有可撤销的操作")]
    NothingToUndo,
    #[error("没有可重做的操作")]
    NothingToRedo,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("读写文件 '{}' 失败: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("编辑被拒绝: {0}")]
    Edit(#[from] EditRejection),

    #[error("配置文件错误: {0}")]
    Settings(#[from] ini::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("错误: {0}")]
    Custom(String),
}

impl AppError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
