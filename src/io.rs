//! 歌词文件的读写。

use std::fs;
use std::path::Path;

use crate::error::{AppError, AppResult};
use crate::lrc_generator::generate_lrc;
use crate::lrc_parser::parse_lrc;
use crate::types::{BilingualLayout, Document};

/// 读取文件内容。非 UTF-8 的字节以替换字符代替并记录警告。
pub fn read_lyric_text(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path).map_err(|e| AppError::io(path, e))?;
    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => {
            log::warn!("文件 {path:?} 不是有效的 UTF-8 编码，无法识别的字节已被替换。");
            Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
        }
    }
}

pub fn read_lyric_file(path: &Path) -> AppResult<Document> {
    let text = read_lyric_text(path)?;
    let document = parse_lrc(&text);
    log::info!(
        "已读取 {path:?}：{} 行歌词",
        document.lines.len()
    );
    Ok(document)
}

/// 以 UTF-8 写出 LRC 文本。
pub fn write_lyric_file(
    path: &Path,
    document: &Document,
    layout: BilingualLayout,
) -> AppResult<()> {
    let text = generate_lrc(document, layout);
    fs::write(path, text).map_err(|e| AppError::io(path, e))?;
    log::info!("已保存到 {path:?}（{layout}）");
    Ok(())
}
