//! # lrc_editor
//!
//! 双语 LRC 歌词编辑核心。
//!
//! - [`lrc_parser`] / [`lrc_generator`]：容错解析与两种双语排版的生成
//! - [`document`]：增删、合并、拆分、打点等结构化编辑
//! - [`history`]：基于快照的有界撤销/重做
//! - [`playback`]：播放位置与歌词行的对齐
//! - [`editor`]：把以上部分组合为一个编辑会话

pub mod app_settings;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod io;
pub mod logger;
pub mod lrc_generator;
pub mod lrc_parser;
pub mod playback;
pub mod selection;
pub mod timestamp;
pub mod types;

pub use editor::LyricEditor;
pub use error::{AppError, AppResult, EditRejection, TimestampError};
pub use lrc_generator::generate_lrc;
pub use lrc_parser::parse_lrc;
pub use timestamp::Timestamp;
pub use types::{BilingualLayout, Document, LineField, LyricLine, Metadata, MetadataKey};
