//! 基于快照的撤销/重做历史。
//!
//! 每条命令保存一次逻辑编辑前后两份完整的文档副本。历史是线性的：
//! 当前位置 `position` 之前的命令可撤销，之后的可重做；在撤销后提交新命令
//! 会丢弃所有可重做的命令。超出容量时从最旧的一端淘汰。
//!
//! ```ignore
//! history.begin(&document);
//! document.delete_lines(&[2])?;
//! history.commit("删除行", &document);
//!
//! if let Some(previous) = history.undo() {
//!     document = previous.clone();
//! }
//! ```

use crate::types::Document;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// 一次可撤销的逻辑编辑。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// 用于菜单显示的描述，例如 "合并行"
    pub description: String,
    pub before: Document,
    pub after: Document,
}

#[derive(Debug, Clone)]
pub struct History {
    commands: Vec<Command>,
    position: usize,
    limit: usize,
    /// 编辑开始时的文档快照，等待 `commit`
    pending_before: Option<Document>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// 容量至少为 1。
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            commands: Vec::new(),
            position: 0,
            limit: limit.max(1),
            pending_before: None,
        }
    }

    /// 记录一次编辑开始前的文档状态。
    ///
    /// 已有未提交的编辑时保留更早的快照，使连续的修改合并为一条命令。
    pub fn begin(&mut self, snapshot: &Document) {
        if self.pending_before.is_some() {
            log::debug!("[历史] 已有未提交的编辑，沿用其起始快照");
            return;
        }
        self.pending_before = Some(snapshot.clone());
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending_before.is_some()
    }

    /// 放弃未提交的编辑起点，返回其快照。
    pub fn cancel(&mut self) -> Option<Document> {
        self.pending_before.take()
    }

    /// 以 `current` 作为编辑后的状态提交一条命令。
    ///
    /// 没有对应的 `begin`，或文档实际上没有变化时不产生命令，返回 `false`。
    pub fn commit(&mut self, description: &str, current: &Document) -> bool {
        let Some(before) = self.pending_before.take() else {
            log::warn!("[历史] 提交 '{description}' 时没有对应的编辑起点，已忽略");
            return false;
        };
        self.record(description, before, current.clone())
    }

    /// 直接压入一条命令。`before == after` 时忽略。
    pub fn record(&mut self, description: &str, before: Document, after: Document) -> bool {
        if before == after {
            log::debug!("[历史] '{description}' 没有改变文档，不记录");
            return false;
        }

        self.commands.truncate(self.position);
        self.commands.push(Command {
            description: description.to_string(),
            before,
            after,
        });
        self.position += 1;

        while self.commands.len() > self.limit {
            self.commands.remove(0);
            self.position -= 1;
        }

        log::debug!(
            "[历史] 已记录 '{description}'，可撤销 {} 步",
            self.position
        );
        true
    }

    /// 撤销，返回应整体替换为当前文档的快照。
    pub fn undo(&mut self) -> Option<&Document> {
        if self.pending_before.take().is_some() {
            log::warn!("[历史] 撤销前丢弃了未提交的编辑起点");
        }
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        let command = &self.commands[self.position];
        log::debug!("[历史] 撤销 '{}'", command.description);
        Some(&command.before)
    }

    /// 重做，返回应整体替换为当前文档的快照。
    pub fn redo(&mut self) -> Option<&Document> {
        if self.pending_before.take().is_some() {
            log::warn!("[历史] 重做前丢弃了未提交的编辑起点");
        }
        let command = self.commands.get(self.position)?;
        self.position += 1;
        log::debug!("[历史] 重做 '{}'", command.description);
        Some(&command.after)
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.position > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.position < self.commands.len()
    }

    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.commands.get(i))
            .map(|c| c.description.as_str())
    }

    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.commands
            .get(self.position)
            .map(|c| c.description.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.position = 0;
        self.pending_before = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LyricLine;

    fn doc(tag: &str) -> Document {
        let mut d = Document::new();
        d.lines.push(LyricLine::new(None, tag, ""));
        d
    }

    fn apply(h: &mut History, current: &mut Document, label: &str, next: &str) {
        h.begin(current);
        *current = doc(next);
        assert!(h.commit(label, current));
    }

    #[test]
    fn test_new_history_is_empty() {
        let h = History::default();
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert_eq!(h.limit(), DEFAULT_HISTORY_LIMIT);
        assert!(h.undo_description().is_none());
    }

    #[test]
    fn test_undo_then_redo() {
        let mut h = History::new(10);
        let mut current = doc("a");
        apply(&mut h, &mut current, "改为 b", "b");
        apply(&mut h, &mut current, "改为 c", "c");
        assert_eq!(h.undo_description(), Some("改为 c"));

        assert_eq!(h.undo(), Some(&doc("b")));
        assert_eq!(h.undo(), Some(&doc("a")));
        assert_eq!(h.undo(), None);
        assert_eq!(h.position(), 0);

        assert_eq!(h.redo(), Some(&doc("b")));
        assert_eq!(h.redo_description(), Some("改为 c"));
        assert_eq!(h.redo(), Some(&doc("c")));
        assert_eq!(h.redo(), None);
    }

    #[test]
    fn test_commit_after_undo_truncates_redo() {
        let mut h = History::new(10);
        let mut current = doc("a");
        apply(&mut h, &mut current, "b", "b");
        apply(&mut h, &mut current, "c", "c");
        current = h.undo().cloned().unwrap();
        apply(&mut h, &mut current, "d", "d");

        assert!(!h.can_redo());
        assert_eq!(h.len(), 2);
        assert_eq!(h.undo(), Some(&doc("b")));
        assert_eq!(h.undo(), Some(&doc("a")));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut h = History::new(3);
        let mut current = doc("0");
        for i in 1..=5 {
            apply(&mut h, &mut current, &i.to_string(), &i.to_string());
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.position(), 3);
        let mut last = None;
        while let Some(snapshot) = h.undo() {
            last = Some(snapshot.clone());
        }
        assert_eq!(last, Some(doc("2")));
    }

    #[test]
    fn test_unchanged_or_unbegun_commit_is_ignored() {
        let mut h = History::new(10);
        let current = doc("a");
        assert!(!h.commit("无起点", &current));
        h.begin(&current);
        assert!(!h.commit("无变化", &current));
        assert!(h.is_empty());
        assert!(!h.is_pending());
    }

    #[test]
    fn test_nested_begin_keeps_first_snapshot() {
        let mut h = History::new(10);
        h.begin(&doc("a"));
        h.begin(&doc("b"));
        assert!(h.commit("合并", &doc("c")));
        assert_eq!(h.undo(), Some(&doc("a")));
    }

    #[test]
    fn test_undo_discards_pending_edit() {
        let mut h = History::new(10);
        let mut current = doc("a");
        apply(&mut h, &mut current, "b", "b");
        h.begin(&current);
        assert_eq!(h.undo(), Some(&doc("a")));
        assert!(!h.is_pending());
    }
}
