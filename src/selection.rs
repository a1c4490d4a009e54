//! 行选择状态，以及由选择推导出的编辑按钮可用状态。

use std::collections::BTreeSet;

use crate::history::History;
use crate::types::Document;

/// 当前选中的行号，始终有序且不重复。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    rows: BTreeSet<usize>,
}

impl Selection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 选中一行。`multi` 为 `false` 时先清空已有选择。
    pub fn select(&mut self, row: usize, multi: bool) {
        if !multi {
            self.rows.clear();
        }
        self.rows.insert(row);
    }

    /// 选中闭区间 `[from, to]`，参数顺序无关。
    pub fn select_range(&mut self, from: usize, to: usize) {
        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        self.rows.extend(start..=end);
    }

    pub fn deselect(&mut self, row: usize) {
        self.rows.remove(&row);
    }

    pub fn set(&mut self, rows: impl IntoIterator<Item = usize>) {
        self.rows = rows.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// 丢弃超出文档范围的行号（删除或撤销之后）。
    pub fn clamp_to(&mut self, len: usize) {
        self.rows.retain(|&row| row < len);
    }

    /// 在 `at` 处插入了 `count` 行：位于其后的选中行随之下移。
    pub fn shift_for_insert(&mut self, at: usize, count: usize) {
        self.rows = self
            .rows
            .iter()
            .map(|&row| if row >= at { row + count } else { row })
            .collect();
    }

    /// 删除了 `removed` 中的行：被删的行退出选择，其余行号前移。
    pub fn shift_for_removal(&mut self, removed: &BTreeSet<usize>) {
        self.rows = self
            .rows
            .iter()
            .filter(|&&row| !removed.contains(&row))
            .map(|&row| row - removed.range(..row).count())
            .collect();
    }

    /// 合并到 `base` 之后：选中过任一被合并行时改为选中 `base`，其余行号前移。
    pub fn collapse_merged(&mut self, merged: &[usize], base: usize) {
        let touched = merged.iter().any(|row| self.rows.contains(row));
        let removed: BTreeSet<usize> = merged.iter().copied().filter(|&row| row != base).collect();
        self.shift_for_removal(&removed);
        if touched {
            self.rows.insert(base);
        }
    }

    #[must_use]
    pub fn rows(&self) -> Vec<usize> {
        self.rows.iter().copied().collect()
    }

    #[must_use]
    pub fn contains(&self, row: usize) -> bool {
        self.rows.contains(&row)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<usize> {
        self.rows.first().copied()
    }

    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.rows.last().copied()
    }

    /// 恰好选中一行时返回该行。
    #[must_use]
    pub fn single(&self) -> Option<usize> {
        if self.rows.len() == 1 {
            self.first()
        } else {
            None
        }
    }
}

/// 各编辑动作当前是否可用。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ActionStates {
    pub add_line: bool,
    pub delete_lines: bool,
    pub merge_lines: bool,
    pub split_line: bool,
    pub mark_timestamp: bool,
    pub play_from_line: bool,
    pub undo: bool,
    pub redo: bool,
}

impl ActionStates {
    #[must_use]
    pub fn derive(
        selection: &Selection,
        document: &Document,
        history: &History,
        audio_loaded: bool,
    ) -> Self {
        let count = selection.count();
        let single_timed = selection
            .single()
            .and_then(|row| document.lines.get(row))
            .is_some_and(|line| line.timestamp.is_some());

        Self {
            add_line: true,
            delete_lines: count > 0,
            merge_lines: count > 1,
            split_line: count == 1,
            mark_timestamp: count > 0 && audio_loaded,
            play_from_line: single_timed && audio_loaded,
            undo: history.can_undo(),
            redo: history.can_redo(),
        }
    }
}
