use crate::types::{BilingualLayout, Document};

/// 单行双语格式中原文与译文之间的分隔符
pub const SINGLE_LINE_SEPARATOR: &str = " / ";

/// 将文档生成为 LRC 文本。
///
/// 歌词行按当前存储顺序输出，不做排序；原文与译文都为空的行被跳过。
/// 末尾不追加换行。
#[must_use]
pub fn generate_lrc(document: &Document, layout: BilingualLayout) -> String {
    let mut output: Vec<String> = document
        .metadata
        .populated()
        .map(|(key, value)| format!("[{key}:{value}]"))
        .collect();

    let mut skipped = 0_usize;
    for line in &document.lines {
        if line.is_blank() {
            skipped += 1;
            continue;
        }

        let time_str = line.timestamp.map(|ts| ts.to_tag()).unwrap_or_default();

        if line.translated.is_empty() {
            output.push(format!("{time_str}{}", line.original));
            continue;
        }

        match layout {
            BilingualLayout::Separated => {
                output.push(format!("{time_str}{}", line.original));
                output.push(format!("{time_str}{}", line.translated));
            }
            BilingualLayout::SingleLine => {
                output.push(format!(
                    "{time_str}{}{SINGLE_LINE_SEPARATOR}{}",
                    line.original, line.translated
                ));
            }
        }
    }

    if skipped > 0 {
        log::debug!("[LRC 生成] 跳过了 {skipped} 个空行");
    }

    output.join("\n")
}
