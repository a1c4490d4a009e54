//! # 文档结构化编辑
//!
//! 所有操作先校验前置条件，再一次性修改文档：返回 `Err` 时文档保持原样。
//! 撤销记录由 [`crate::editor::LyricEditor`] 负责，这里只处理数据本身。

use crate::error::EditRejection;
use crate::timestamp::Timestamp;
use crate::types::{Document, LineField, LyricLine, MetadataKey};

impl Document {
    /// 在 `after` 之后插入一个空行（未给出位置时追加到末尾），返回新行的行号。
    pub fn add_line(&mut self, after: Option<usize>) -> Result<usize, EditRejection> {
        let index = match after {
            Some(after) => {
                self.check_index(after)?;
                after + 1
            }
            None => self.lines.len(),
        };
        self.lines.insert(index, LyricLine::default());
        Ok(index)
    }

    /// 删除给定的所有行，返回实际删除的行数。
    pub fn delete_lines(&mut self, indices: &[usize]) -> Result<usize, EditRejection> {
        let rows = self.normalize_rows(indices)?;
        for &row in rows.iter().rev() {
            self.lines.remove(row);
        }
        Ok(rows.len())
    }

    /// 将给定行合并到其中最小的行号上，返回该行号。
    ///
    /// 原文与译文分别以空格连接后去除首尾空白，保留基准行的时间戳。
    pub fn merge_lines(&mut self, indices: &[usize]) -> Result<usize, EditRejection> {
        let rows = self.normalize_rows(indices)?;
        if rows.len() < 2 {
            return Err(EditRejection::NeedTwoRows(rows.len()));
        }

        let original = join_field(&self.lines, &rows, |line| line.original.as_str());
        let translated = join_field(&self.lines, &rows, |line| line.translated.as_str());

        let base = rows[0];
        for &row in rows[1..].iter().rev() {
            self.lines.remove(row);
        }
        let base_line = &mut self.lines[base];
        base_line.original = original;
        base_line.translated = translated;
        Ok(base)
    }

    /// 按空白拆分原文，第一个词留在原行，其余每个词各成一行插入其后。
    ///
    /// 返回新插入的行数。
    pub fn split_line(&mut self, index: usize) -> Result<usize, EditRejection> {
        self.check_index(index)?;
        let tokens: Vec<String> = self.lines[index]
            .original
            .split_whitespace()
            .map(str::to_string)
            .collect();
        let Some((first, rest)) = tokens.split_first() else {
            return Err(EditRejection::NothingToSplit(index));
        };
        if rest.is_empty() {
            return Err(EditRejection::NothingToSplit(index));
        }

        self.lines[index].original.clone_from(first);
        let new_lines = rest.iter().map(|token| LyricLine::new(None, token.as_str(), ""));
        self.lines.splice(index + 1..index + 1, new_lines);
        Ok(rest.len())
    }

    /// 为所有给定行设置同一个时间戳。
    pub fn set_timestamp(
        &mut self,
        indices: &[usize],
        timestamp: Timestamp,
    ) -> Result<(), EditRejection> {
        let rows = self.normalize_rows(indices)?;
        for row in rows {
            self.lines[row].timestamp = Some(timestamp);
        }
        Ok(())
    }

    /// 修改某一行的单个字段。时间字段按 `mm:ss.cc` 重新解析，空文本表示清除时间戳。
    pub fn edit_field(
        &mut self,
        index: usize,
        field: LineField,
        value: &str,
    ) -> Result<(), EditRejection> {
        self.check_index(index)?;
        match field {
            LineField::Timestamp => {
                let value = value.trim();
                let timestamp = if value.is_empty() {
                    None
                } else {
                    Some(value.parse::<Timestamp>()?)
                };
                self.lines[index].timestamp = timestamp;
            }
            LineField::Original => value.clone_into(&mut self.lines[index].original),
            LineField::Translated => value.clone_into(&mut self.lines[index].translated),
        }
        Ok(())
    }

    pub fn edit_metadata(&mut self, key: MetadataKey, value: &str) {
        self.metadata.set(key, value);
    }

    /// 当前某行某字段的文本形式，时间字段未打点时为空字符串。
    pub fn field_text(&self, index: usize, field: LineField) -> Result<String, EditRejection> {
        self.check_index(index)?;
        let line = &self.lines[index];
        Ok(match field {
            LineField::Timestamp => line.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
            LineField::Original => line.original.clone(),
            LineField::Translated => line.translated.clone(),
        })
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<(), EditRejection> {
        if index < self.lines.len() {
            Ok(())
        } else {
            Err(EditRejection::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
        }
    }

    /// 排序去重并校验行号，空选择视为错误。
    fn normalize_rows(&self, indices: &[usize]) -> Result<Vec<usize>, EditRejection> {
        let mut rows = indices.to_vec();
        rows.sort_unstable();
        rows.dedup();
        if rows.is_empty() {
            return Err(EditRejection::EmptySelection);
        }
        if let Some(&last) = rows.last() {
            self.check_index(last)?;
        }
        Ok(rows)
    }
}

fn join_field(
    lines: &[LyricLine],
    rows: &[usize],
    pick: impl Fn(&LyricLine) -> &str,
) -> String {
    rows.iter()
        .map(|&row| pick(&lines[row]))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
