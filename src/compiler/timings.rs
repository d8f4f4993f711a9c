//! 录制阶段的计时事件收集器。
//!
//! 捕获界面每次按键都会追加一条事件。追加 START 时会校正与上一条
//! 记录冲突的 END：END 在被下一个 START 确认之前都是临时的。

use crate::compiler::types::{LyricEvent, LyricMarker, Seconds};

/// 按录制顺序收集 [`LyricEvent`] 的列表。
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TimingsList {
    events: Vec<LyricEvent>,
}

impl TimingsList {
    /// 创建一个空列表。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条事件。
    ///
    /// 新事件是 START、时间又不晚于上一条记录、且上一条记录是 END 时，
    /// 那条 END 按误按丢弃，让 START 生效。
    pub fn add(&mut self, timestamp: Seconds, marker: LyricMarker) {
        if marker == LyricMarker::SegmentStart {
            self.discard_conflicting_end(timestamp);
        }
        self.events.push(LyricEvent(timestamp, marker));
    }

    fn discard_conflicting_end(&mut self, start_timestamp: Seconds) {
        let Some(previous) = self.events.last() else {
            return;
        };
        if start_timestamp > previous.timestamp() {
            return;
        }
        if previous.marker() == LyricMarker::SegmentEnd {
            self.events.pop();
        }
    }

    /// 第 `segment_num` 个 START 事件的时间戳（从 0 计）。
    #[must_use]
    pub fn start_for_segment(&self, segment_num: usize) -> Option<Seconds> {
        self.events
            .iter()
            .filter(|event| event.marker() == LyricMarker::SegmentStart)
            .nth(segment_num)
            .map(LyricEvent::timestamp)
    }

    /// 丢弃从第 `segment_num` 个 START 起的全部事件，供重录使用。
    pub fn truncate_to_segment(&mut self, segment_num: usize) {
        let mut starts_seen = 0usize;
        let cut = self.events.iter().position(|event| {
            if event.marker() == LyricMarker::SegmentStart {
                starts_seen += 1;
            }
            starts_seen > segment_num
        });
        if let Some(index) = cut {
            self.events.truncate(index);
        }
    }

    /// 最近一条事件。
    #[must_use]
    pub fn last(&self) -> Option<&LyricEvent> {
        self.events.last()
    }

    /// 已记录的事件数量。
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// 是否还没有任何记录。
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// 以切片形式访问全部事件。
    #[must_use]
    pub fn as_events(&self) -> &[LyricEvent] {
        &self.events
    }

    /// 取出全部事件，交给时间轴编译器。
    #[must_use]
    pub fn into_events(self) -> Vec<LyricEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // START 早于上一条 END 时, 丢弃那条临时的 END
    #[test]
    fn test_stale_end_is_discarded_by_earlier_start() {
        let mut timings = TimingsList::new();
        timings.add(1.0, LyricMarker::SegmentStart);
        timings.add(3.0, LyricMarker::SegmentEnd);
        timings.add(2.5, LyricMarker::SegmentStart);

        assert_eq!(timings.len(), 2);
        assert_eq!(
            timings.as_events()[1],
            LyricEvent(2.5, LyricMarker::SegmentStart)
        );
    }

    // 上一条是 START 时不丢弃, 即使时间冲突
    #[test]
    fn test_conflicting_start_is_kept() {
        let mut timings = TimingsList::new();
        timings.add(3.0, LyricMarker::SegmentStart);
        timings.add(2.0, LyricMarker::SegmentStart);

        assert_eq!(timings.len(), 2);
    }

    // 时间正常递增时 END 原样保留
    #[test]
    fn test_ordered_events_are_untouched() {
        let mut timings = TimingsList::new();
        timings.add(1.0, LyricMarker::SegmentStart);
        timings.add(2.0, LyricMarker::SegmentEnd);
        timings.add(3.0, LyricMarker::SegmentStart);

        assert_eq!(timings.len(), 3);
        assert_eq!(
            timings.as_events()[1],
            LyricEvent(2.0, LyricMarker::SegmentEnd)
        );
    }

    #[test]
    fn test_start_for_segment() {
        let mut timings = TimingsList::new();
        timings.add(1.0, LyricMarker::SegmentStart);
        timings.add(2.0, LyricMarker::SegmentEnd);
        timings.add(3.0, LyricMarker::SegmentStart);

        assert_eq!(timings.start_for_segment(0), Some(1.0));
        assert_eq!(timings.start_for_segment(1), Some(3.0));
        assert_eq!(timings.start_for_segment(2), None);
    }

    // 回到第 n 段重录时, 该段 START 及之后的记录全部丢弃
    #[test]
    fn test_truncate_to_segment() {
        let mut timings = TimingsList::new();
        timings.add(1.0, LyricMarker::SegmentStart);
        timings.add(2.0, LyricMarker::SegmentEnd);
        timings.add(3.0, LyricMarker::SegmentStart);
        timings.add(4.0, LyricMarker::SegmentStart);

        timings.truncate_to_segment(1);
        assert_eq!(timings.len(), 2);
        assert_eq!(timings.last(), Some(&LyricEvent(2.0, LyricMarker::SegmentEnd)));

        timings.truncate_to_segment(0);
        assert!(timings.is_empty());
    }
}
