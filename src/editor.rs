//! # 编辑会话
//!
//! [`LyricEditor`] 独占当前文档，把每一次结构化编辑包装成一条撤销命令，
//! 并把选择状态与播放对齐串在一起。所有方法都在同一线程上同步执行。

use std::collections::BTreeSet;

use crate::app_settings::EditorSettings;
use crate::error::EditRejection;
use crate::history::History;
use crate::lrc_generator::generate_lrc;
use crate::lrc_parser::parse_lrc;
use crate::playback::{HighlightChange, PlaybackState, PlaybackTracker, RowMarks, nudge};
use crate::selection::{ActionStates, Selection};
use crate::timestamp::Timestamp;
use crate::types::{BilingualLayout, Document, LineField, MetadataKey};

/// 正在进行中的单元格编辑。
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldEdit {
    index: usize,
    field: LineField,
    /// 时间字段在提交时才解析，输入过程中只保存文本
    text: String,
}

#[derive(Debug, Clone)]
pub struct LyricEditor {
    document: Document,
    history: History,
    selection: Selection,
    playback: PlaybackTracker,
    layout: BilingualLayout,
    seek_step_ms: i64,
    audio_loaded: bool,
    field_edit: Option<FieldEdit>,
}

impl Default for LyricEditor {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}

impl LyricEditor {
    #[must_use]
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            document: Document::new(),
            history: History::new(settings.history_limit),
            selection: Selection::new(),
            playback: PlaybackTracker::new(settings.poll_interval_ms),
            layout: settings.bilingual_layout,
            seek_step_ms: settings.seek_step_ms,
            audio_loaded: false,
            field_edit: None,
        }
    }

    /// 载入新文档，清空历史、选择与高亮。
    pub fn load_document(&mut self, document: Document) {
        log::info!(
            "[编辑器] 载入文档：{} 行歌词",
            document.lines.len()
        );
        self.document = document;
        self.history.clear();
        self.selection.clear();
        self.field_edit = None;
        self.playback.reset();
    }

    pub fn load_text(&mut self, content: &str) {
        self.load_document(parse_lrc(content));
    }

    /// 按给定排版生成 LRC 文本。会先提交尚未完成的单元格编辑。
    pub fn to_lrc(&mut self, layout: BilingualLayout) -> String {
        self.flush_field_edit();
        generate_lrc(&self.document, layout)
    }

    /// 使用默认排版生成 LRC 文本。
    pub fn to_default_lrc(&mut self) -> String {
        self.to_lrc(self.layout)
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    #[must_use]
    pub const fn playback(&self) -> &PlaybackTracker {
        &self.playback
    }

    #[must_use]
    pub const fn default_layout(&self) -> BilingualLayout {
        self.layout
    }

    pub fn set_default_layout(&mut self, layout: BilingualLayout) {
        self.layout = layout;
    }

    pub fn set_audio_loaded(&mut self, loaded: bool) {
        self.audio_loaded = loaded;
    }

    // ---- 结构化编辑 ----

    // 结构化编辑之后选择随行号移动，始终指向原来的行

    pub fn add_line(&mut self, after: Option<usize>) -> Result<usize, EditRejection> {
        let index = self.apply("添加行", |doc| doc.add_line(after))?;
        self.selection.shift_for_insert(index, 1);
        Ok(index)
    }

    pub fn delete_lines(&mut self, indices: &[usize]) -> Result<usize, EditRejection> {
        let removed = self.apply("删除行", |doc| doc.delete_lines(indices))?;
        let rows: BTreeSet<usize> = indices.iter().copied().collect();
        self.selection.shift_for_removal(&rows);
        Ok(removed)
    }

    pub fn merge_lines(&mut self, indices: &[usize]) -> Result<usize, EditRejection> {
        let base = self.apply("合并行", |doc| doc.merge_lines(indices))?;
        self.selection.collapse_merged(indices, base);
        Ok(base)
    }

    pub fn split_line(&mut self, index: usize) -> Result<usize, EditRejection> {
        let added = self.apply("拆分行", |doc| doc.split_line(index))?;
        self.selection.shift_for_insert(index + 1, added);
        Ok(added)
    }

    pub fn set_timestamp(
        &mut self,
        indices: &[usize],
        timestamp: Timestamp,
    ) -> Result<(), EditRejection> {
        self.apply("设置时间", |doc| doc.set_timestamp(indices, timestamp))
    }

    /// 一次性修改单个字段，产生一条撤销命令。
    pub fn edit_field(
        &mut self,
        index: usize,
        field: LineField,
        value: &str,
    ) -> Result<bool, EditRejection> {
        self.begin_field_edit(index, field)?;
        self.update_field_live(value)?;
        self.finish_field_edit()
    }

    /// 修改元数据，返回是否产生了撤销命令。
    pub fn edit_metadata(&mut self, key: MetadataKey, value: &str) -> bool {
        self.flush_field_edit();
        self.history.begin(&self.document);
        self.document.edit_metadata(key, value);
        self.history.commit(&format!("编辑元数据 [{key}]"), &self.document)
    }

    // ---- 基于当前选择的编辑 ----

    /// 在最后一个选中行之后插入空行（没有选择时追加到末尾），并选中新行。
    pub fn add_line_after_selection(&mut self) -> Result<usize, EditRejection> {
        let after = self.selection.last();
        let index = self.add_line(after)?;
        self.selection.select(index, false);
        Ok(index)
    }

    pub fn delete_selected(&mut self) -> Result<usize, EditRejection> {
        let rows = self.selection.rows();
        let removed = self.delete_lines(&rows)?;
        self.selection.clear();
        Ok(removed)
    }

    pub fn merge_selected(&mut self) -> Result<usize, EditRejection> {
        let rows = self.selection.rows();
        let base = self.merge_lines(&rows)?;
        self.selection.select(base, false);
        Ok(base)
    }

    pub fn split_selected(&mut self) -> Result<usize, EditRejection> {
        let index = self
            .selection
            .single()
            .ok_or_else(|| EditRejection::NeedOneRow(self.selection.count()))?;
        self.split_line(index)
    }

    /// 把当前播放位置打到所有选中行上。
    ///
    /// 只选中一行且其后还有行时，选择自动移到下一行，便于连续打点。
    pub fn mark_timestamp(&mut self, position_ms: i64) -> Result<Timestamp, EditRejection> {
        let rows = self.selection.rows();
        let timestamp = Timestamp::from_millis(position_ms.max(0) as u64);
        self.apply("标记时间", |doc| doc.set_timestamp(&rows, timestamp))?;

        if let [row] = rows.as_slice() {
            let next = row + 1;
            if next < self.document.len() {
                self.selection.select(next, false);
            }
        }
        Ok(timestamp)
    }

    /// 双击某行时播放器应跳转到的位置（毫秒）。
    pub fn seek_target(&self, index: usize) -> Result<i64, EditRejection> {
        self.document.check_index(index)?;
        self.document.lines[index]
            .timestamp
            .map(|ts| i64::try_from(ts.as_millis()).unwrap_or(i64::MAX))
            .ok_or(EditRejection::Untimed(index))
    }

    // ---- 单元格编辑（合并为一次提交） ----

    /// 开始编辑某个单元格。若另一个单元格仍在编辑，先提交它。
    pub fn begin_field_edit(&mut self, index: usize, field: LineField) -> Result<(), EditRejection> {
        self.document.check_index(index)?;
        if self
            .field_edit
            .as_ref()
            .is_some_and(|edit| edit.index == index && edit.field == field)
        {
            return Ok(());
        }
        self.flush_field_edit();

        let text = self.document.field_text(index, field)?;
        self.history.begin(&self.document);
        self.field_edit = Some(FieldEdit { index, field, text });
        Ok(())
    }

    /// 输入过程中的每次修改，不产生撤销命令。
    pub fn update_field_live(&mut self, value: &str) -> Result<(), EditRejection> {
        let edit = self.field_edit.as_mut().ok_or(EditRejection::NoPendingEdit)?;
        value.clone_into(&mut edit.text);
        if edit.field != LineField::Timestamp {
            self.document.edit_field(edit.index, edit.field, value)?;
        }
        Ok(())
    }

    /// 提交单元格编辑（失去焦点），返回是否产生了撤销命令。
    ///
    /// 时间文本无法解析时整个编辑被撤回，文档回到编辑前的状态。
    pub fn finish_field_edit(&mut self) -> Result<bool, EditRejection> {
        let edit = self.field_edit.take().ok_or(EditRejection::NoPendingEdit)?;
        if let Err(e) = self.document.edit_field(edit.index, edit.field, &edit.text) {
            log::warn!("[编辑器] 第 {} 行{}无效: {e}", edit.index + 1, edit.field);
            if let Some(before) = self.history.cancel() {
                self.document = before;
            }
            return Err(e);
        }
        Ok(self
            .history
            .commit(&format!("编辑{}", edit.field), &self.document))
    }

    /// 放弃单元格编辑，恢复编辑前的内容。
    pub fn cancel_field_edit(&mut self) {
        if self.field_edit.take().is_some() {
            if let Some(before) = self.history.cancel() {
                self.document = before;
            }
        }
    }

    fn flush_field_edit(&mut self) {
        if self.field_edit.is_some() {
            if let Err(e) = self.finish_field_edit() {
                log::debug!("[编辑器] 未完成的单元格编辑已撤回: {e}");
            }
        }
    }

    // ---- 撤销 / 重做 ----

    pub fn undo(&mut self) -> Result<(), EditRejection> {
        self.cancel_field_edit();
        let snapshot = self
            .history
            .undo()
            .cloned()
            .ok_or(EditRejection::NothingToUndo)?;
        self.replace_document(snapshot);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditRejection> {
        self.cancel_field_edit();
        let snapshot = self
            .history
            .redo()
            .cloned()
            .ok_or(EditRejection::NothingToRedo)?;
        self.replace_document(snapshot);
        Ok(())
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ---- 播放 ----

    pub fn set_playback_state(&mut self, state: PlaybackState) -> Option<HighlightChange> {
        self.playback.set_state(state)
    }

    /// 定时轮询入口，当前行变化时返回通知。
    pub fn poll_playback(&mut self, position_ms: i64) -> Option<HighlightChange> {
        self.playback.poll(&self.document, position_ms)
    }

    pub fn seek(&mut self, position_ms: i64) -> Option<HighlightChange> {
        self.playback.seek(&self.document, position_ms)
    }

    /// 按配置的步长快退，返回跳转目标。
    pub fn rewind(&mut self, position_ms: i64, duration_ms: i64) -> i64 {
        let target = nudge(position_ms, -self.seek_step_ms, duration_ms);
        self.seek(target);
        target
    }

    /// 按配置的步长快进，返回跳转目标。
    pub fn forward(&mut self, position_ms: i64, duration_ms: i64) -> i64 {
        let target = nudge(position_ms, self.seek_step_ms, duration_ms);
        self.seek(target);
        target
    }

    #[must_use]
    pub fn row_marks(&self) -> RowMarks {
        RowMarks::compute(&self.document, self.playback.current(), &self.selection)
    }

    #[must_use]
    pub fn action_states(&self) -> ActionStates {
        ActionStates::derive(
            &self.selection,
            &self.document,
            &self.history,
            self.audio_loaded,
        )
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.selection.clamp_to(self.document.len());
        self.playback.reset();
    }

    fn apply<T>(
        &mut self,
        description: &str,
        op: impl FnOnce(&mut Document) -> Result<T, EditRejection>,
    ) -> Result<T, EditRejection> {
        self.flush_field_edit();
        self.history.begin(&self.document);
        match op(&mut self.document) {
            Ok(value) => {
                self.history.commit(description, &self.document);
                Ok(value)
            }
            Err(e) => {
                self.history.cancel();
                log::warn!("[编辑器] {description}被拒绝: {e}");
                Err(e)
            }
        }
    }
}
