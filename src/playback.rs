//! # 播放位置与歌词行对齐
//!
//! 播放时外部以固定间隔轮询当前位置，[`PlaybackTracker`] 缓存上一次的结果，
//! 只有当前行发生变化时才通知界面高亮与滚动。

use std::collections::BTreeSet;
use std::time::Duration;

use strum_macros::Display;

use crate::selection::Selection;
use crate::types::Document;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 33;

/// 按存储顺序查找播放位置对应的当前行。
///
/// 取最后一个时间戳不晚于 `position_seconds` 的行；遇到第一个晚于该位置的
/// 时间戳即停止扫描。无时间戳的行被跳过，永远不会成为当前行。
#[must_use]
pub fn current_line(document: &Document, position_seconds: f64) -> Option<usize> {
    let mut current = None;
    for (index, line) in document.lines.iter().enumerate() {
        let Some(ts) = line.timestamp else {
            continue;
        };
        if ts.as_seconds() > position_seconds {
            break;
        }
        current = Some(index);
    }
    current
}

/// 与 [`current_line`] 相同，位置以毫秒给出（负数表示没有播放位置）。
#[must_use]
pub fn current_line_at_millis(document: &Document, position_ms: i64) -> Option<usize> {
    current_line(document, position_ms as f64 / 1000.0)
}

/// 时间戳早于前一个有时间戳行的行号，用于提示，不做修正。
#[must_use]
pub fn disordered_indices(document: &Document) -> BTreeSet<usize> {
    let mut disordered = BTreeSet::new();
    let mut previous = None;
    for (index, line) in document.lines.iter().enumerate() {
        let Some(ts) = line.timestamp else {
            continue;
        };
        if previous.is_some_and(|prev| ts < prev) {
            disordered.insert(index);
        }
        previous = Some(ts);
    }
    disordered
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum PlaybackState {
    #[default]
    #[strum(to_string = "停止")]
    Stopped,
    #[strum(to_string = "播放")]
    Playing,
    #[strum(to_string = "暂停")]
    Paused,
}

/// 当前行发生变化时产生的通知。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// 轮询播放位置并缓存当前行。
#[derive(Debug, Clone)]
pub struct PlaybackTracker {
    state: PlaybackState,
    current: Option<usize>,
    position_ms: i64,
    poll_interval: Duration,
}

impl Default for PlaybackTracker {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_MS)
    }
}

impl PlaybackTracker {
    #[must_use]
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            state: PlaybackState::Stopped,
            current: None,
            position_ms: 0,
            poll_interval: Duration::from_millis(poll_interval_ms.max(1)),
        }
    }

    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        self.current
    }

    #[must_use]
    pub const fn position_ms(&self) -> i64 {
        self.position_ms
    }

    /// 外部计时器应使用的轮询间隔，只在播放时轮询。
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// 播放器状态变化。停止时播放位置归零并清除高亮。
    pub fn set_state(&mut self, state: PlaybackState) -> Option<HighlightChange> {
        log::debug!("[播放] 状态 {} -> {state}", self.state);
        self.state = state;
        if state == PlaybackState::Stopped {
            self.position_ms = 0;
            return self.update(None);
        }
        None
    }

    /// 轮询一次。只在播放中重新计算，结果未变化时返回 `None`。
    pub fn poll(&mut self, document: &Document, position_ms: i64) -> Option<HighlightChange> {
        if self.state != PlaybackState::Playing {
            return None;
        }
        self.position_ms = position_ms;
        self.update(current_line_at_millis(document, position_ms))
    }

    /// 跳转到新位置。播放或暂停时立即重新计算当前行，停止时只记录位置。
    pub fn seek(&mut self, document: &Document, position_ms: i64) -> Option<HighlightChange> {
        self.position_ms = position_ms.max(0);
        if self.state == PlaybackState::Stopped {
            return None;
        }
        self.update(current_line_at_millis(document, self.position_ms))
    }

    /// 文档被整体替换（撤销、重做、重新加载）后丢弃缓存。
    pub fn reset(&mut self) -> Option<HighlightChange> {
        self.update(None)
    }

    fn update(&mut self, current: Option<usize>) -> Option<HighlightChange> {
        if current == self.current {
            return None;
        }
        let change = HighlightChange {
            previous: self.current,
            current,
        };
        self.current = current;
        log::debug!("[播放] 当前行 {:?} -> {:?}", change.previous, change.current);
        Some(change)
    }
}

/// 快进/快退后的目标位置，限制在 `[0, duration_ms]` 内。
#[must_use]
pub fn nudge(position_ms: i64, delta_ms: i64, duration_ms: i64) -> i64 {
    position_ms
        .saturating_add(delta_ms)
        .clamp(0, duration_ms.max(0))
}

/// 界面需要额外标记的行，不包含用户已选中的行，避免与选中样式互相覆盖。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowMarks {
    pub highlighted: Option<usize>,
    pub out_of_order: BTreeSet<usize>,
}

impl RowMarks {
    #[must_use]
    pub fn compute(document: &Document, current: Option<usize>, selection: &Selection) -> Self {
        Self {
            highlighted: current.filter(|&row| !selection.contains(row)),
            out_of_order: disordered_indices(document)
                .into_iter()
                .filter(|&row| !selection.contains(row))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::Timestamp;
    use crate::types::LyricLine;

    fn doc(stamps: &[Option<u64>]) -> Document {
        Document {
            lines: stamps
                .iter()
                .map(|s| LyricLine::new(s.map(Timestamp::from_centis), "x", ""))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_before_first_timed_line_is_none() {
        let d = doc(&[None, Some(100), Some(300)]);
        assert_eq!(current_line(&d, -1.0), None);
        assert_eq!(current_line(&d, 0.99), None);
        assert_eq!(current_line(&Document::new(), 5.0), None);
    }

    #[test]
    fn test_picks_last_line_at_or_before_position() {
        let d = doc(&[Some(100), None, Some(300), Some(500)]);
        assert_eq!(current_line(&d, 1.0), Some(0));
        assert_eq!(current_line(&d, 2.99), Some(0));
        assert_eq!(current_line(&d, 3.0), Some(2));
        assert_eq!(current_line(&d, 5.0), Some(3));
        assert_eq!(current_line(&d, 999.0), Some(3));
    }

    #[test]
    fn test_untimed_lines_never_current() {
        let d = doc(&[Some(100), None, None]);
        assert_eq!(current_line(&d, 50.0), Some(0));
    }

    #[test]
    fn test_scan_stops_at_first_later_timestamp() {
        // 用户把 9 秒的行拖到了前面：扫描在它处停下
        let d = doc(&[Some(100), Some(900), Some(300)]);
        assert_eq!(current_line(&d, 4.0), Some(0));
        assert_eq!(current_line(&d, 9.5), Some(2));
    }

    #[test]
    fn test_disordered_indices() {
        let d = doc(&[Some(500), None, Some(300), Some(400), Some(100)]);
        assert_eq!(disordered_indices(&d), BTreeSet::from([2, 4]));
        assert!(disordered_indices(&doc(&[Some(1), Some(1), None])).is_empty());
    }

    #[test]
    fn test_tracker_only_reports_changes_while_playing() {
        let d = doc(&[Some(100), Some(300)]);
        let mut tracker = PlaybackTracker::default();
        assert_eq!(tracker.poll(&d, 1_500), None);

        tracker.set_state(PlaybackState::Playing);
        assert_eq!(tracker.poll(&d, 500), None);
        assert_eq!(
            tracker.poll(&d, 1_500),
            Some(HighlightChange {
                previous: None,
                current: Some(0)
            })
        );
        assert_eq!(tracker.poll(&d, 2_000), None);
        assert_eq!(
            tracker.poll(&d, 3_000),
            Some(HighlightChange {
                previous: Some(0),
                current: Some(1)
            })
        );

        // 向后跳转
        assert_eq!(
            tracker.poll(&d, 1_000),
            Some(HighlightChange {
                previous: Some(1),
                current: Some(0)
            })
        );

        tracker.set_state(PlaybackState::Paused);
        assert_eq!(tracker.poll(&d, 3_000), None);
        assert_eq!(tracker.current(), Some(0));
    }

    #[test]
    fn test_stop_clears_highlight() {
        let d = doc(&[Some(100)]);
        let mut tracker = PlaybackTracker::new(20);
        tracker.set_state(PlaybackState::Playing);
        tracker.poll(&d, 2_000);
        assert_eq!(
            tracker.set_state(PlaybackState::Stopped),
            Some(HighlightChange {
                previous: Some(0),
                current: None
            })
        );
        assert_eq!(tracker.position_ms(), 0);
        assert_eq!(tracker.set_state(PlaybackState::Stopped), None);
        assert_eq!(tracker.poll_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_seek_updates_highlight_unless_stopped() {
        let d = doc(&[Some(100), Some(300)]);
        let mut tracker = PlaybackTracker::default();
        assert_eq!(tracker.seek(&d, 3_500), None);
        assert_eq!(tracker.position_ms(), 3_500);
        assert_eq!(tracker.current(), None);

        tracker.set_state(PlaybackState::Paused);
        assert_eq!(
            tracker.seek(&d, 3_500),
            Some(HighlightChange {
                previous: None,
                current: Some(1)
            })
        );
        assert_eq!(
            tracker.seek(&d, -20),
            Some(HighlightChange {
                previous: Some(1),
                current: None
            })
        );
        assert_eq!(tracker.position_ms(), 0);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PlaybackState::Playing.to_string(), "播放");
        assert_eq!(PlaybackState::default().to_string(), "停止");
    }

    #[test]
    fn test_nudge_is_clamped() {
        assert_eq!(nudge(500, -1_000, 10_000), 0);
        assert_eq!(nudge(9_500, 1_000, 10_000), 10_000);
        assert_eq!(nudge(4_000, 1_000, 10_000), 5_000);
    }

    #[test]
    fn test_row_marks_exclude_selection() {
        let d = doc(&[Some(500), Some(100), Some(50)]);
        let mut selection = Selection::default();
        selection.select(1, false);
        let marks = RowMarks::compute(&d, Some(1), &selection);
        assert_eq!(marks.highlighted, None);
        assert_eq!(marks.out_of_order, BTreeSet::from([2]));

        let marks = RowMarks::compute(&d, Some(0), &Selection::default());
        assert_eq!(marks.highlighted, Some(0));
        assert_eq!(marks.out_of_order, BTreeSet::from([1, 2]));
    }
}
