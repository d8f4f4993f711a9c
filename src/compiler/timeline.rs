//! 时间轴编译器与时间戳解算。
//!
//! 把切分出的段落和按键事件按序配对，组装出屏幕 → 行 → 段落的树，
//! 再补全缺失的结束时间，并让屏幕在显示时间上首尾相接。

use tracing::error;

use crate::compiler::{
    segmenter,
    types::{LyricEvent, LyricMarker, LyricSegment, LyricsLine, LyricsScreen, Seconds},
};

/// 按事件顺序读取按键计时，构造带时间信息的屏幕列表。
///
/// 每个 START 事件消耗一个段落；段落文本以 `\n` 结尾时闭合当前行，
/// 以 `\n\n` 结尾时同时闭合当前屏幕。END 事件把结束时间写到最近
/// 开始的段落上。事件比段落多时记录错误并提前返回，只保留已经
/// 闭合的屏幕。
#[must_use]
pub fn compile_lyric_timings(lyrics: &str, events: &[LyricEvent]) -> Vec<LyricsScreen> {
    let mut segments = segmenter::parse_segments(lyrics, false).into_iter();
    let mut screens: Vec<LyricsScreen> = Vec::new();
    let mut screen: Option<LyricsScreen> = None;
    let mut line: Option<LyricsLine> = None;

    for (event_index, event) in events.iter().enumerate() {
        match event.marker() {
            LyricMarker::SegmentStart => {
                let Some(segment) = segments.next() else {
                    error!(
                        "段落在第 {} 个事件处用尽, 停止编译并返回已闭合的 {} 个屏幕",
                        event_index,
                        screens.len()
                    );
                    return screens;
                };
                let text = segment.text;
                if screen.is_none() {
                    screen = Some(LyricsScreen::default());
                }
                line.get_or_insert_with(LyricsLine::default)
                    .segments
                    .push(LyricSegment::new(text.clone(), event.timestamp()));
                if text.ends_with('\n')
                    && let (Some(open_screen), Some(closed_line)) = (screen.as_mut(), line.take())
                {
                    open_screen.lines.push(closed_line);
                }
                if text.ends_with("\n\n")
                    && let Some(closed_screen) = screen.take()
                {
                    screens.push(closed_screen);
                }
            }
            LyricMarker::SegmentEnd => {
                if let Some(previous) = last_segment_mut(&mut screens, &mut screen, &mut line) {
                    previous.end_timestamp = Some(event.timestamp());
                }
            }
        }
    }

    // 收尾: 把仍未闭合的行和屏幕补进输出
    if let Some(open_line) = line.take() {
        screen
            .get_or_insert_with(LyricsScreen::default)
            .lines
            .push(open_line);
    }
    if let Some(open_screen) = screen.take()
        && !open_screen.lines.is_empty()
    {
        screens.push(open_screen);
    }

    screens
}

/// 最近开始的段落：优先在未闭合的行里找，其次是未闭合屏幕的末行，
/// 最后是已输出屏幕的末行。
fn last_segment_mut<'a>(
    screens: &'a mut [LyricsScreen],
    screen: &'a mut Option<LyricsScreen>,
    line: &'a mut Option<LyricsLine>,
) -> Option<&'a mut LyricSegment> {
    if let Some(open_line) = line.as_mut() {
        return open_line.segments.last_mut();
    }
    if let Some(open_screen) = screen.as_mut() {
        return open_screen
            .lines
            .last_mut()
            .and_then(|last_line| last_line.segments.last_mut());
    }
    screens
        .last_mut()
        .and_then(|last_screen| last_screen.lines.last_mut())
        .and_then(|last_line| last_line.segments.last_mut())
}

/// 把缺失的段落结束时间补成下一个段落的开始时间；
/// 整首歌的最后一个段落补成歌曲时长。
///
/// 补全之后，段落在时间上连续，除非后续调整显式制造间隙。
#[must_use]
pub fn set_segment_end_times(
    mut screens: Vec<LyricsScreen>,
    song_duration: Seconds,
) -> Vec<LyricsScreen> {
    let starts: Vec<Seconds> = screens
        .iter()
        .flat_map(|screen| &screen.lines)
        .flat_map(|line| &line.segments)
        .map(|segment| segment.timestamp)
        .collect();

    let mut index = 0usize;
    for screen in &mut screens {
        for line in &mut screen.lines {
            for segment in &mut line.segments {
                if segment.end_timestamp.is_none() {
                    segment.end_timestamp =
                        Some(starts.get(index + 1).copied().unwrap_or(song_duration));
                }
                index += 1;
            }
        }
    }
    screens
}

/// 首屏从 0 秒开始显示，其后每屏紧接上一屏的结束时间。
///
/// 屏幕之间默认没有显示间隙；任何间隙都必须由调整阶段显式引入。
/// 重复调用是幂等的。
#[must_use]
pub fn set_screen_start_times(mut screens: Vec<LyricsScreen>) -> Vec<LyricsScreen> {
    let mut previous_end: Option<Seconds> = None;
    for screen in &mut screens {
        screen.start_timestamp = Some(previous_end.unwrap_or(0.0));
        previous_end = Some(screen.end_timestamp());
    }
    screens
}

/// 标准的解算组合：先补段落结束时间，再补屏幕显示起点。
#[must_use]
pub fn denormalize_timestamps(
    screens: Vec<LyricsScreen>,
    song_duration: Seconds,
) -> Vec<LyricsScreen> {
    set_screen_start_times(set_segment_end_times(screens, song_duration))
}

/// 把所有时间戳整体后移 `delta` 秒，返回新的屏幕列表。
///
/// 每个调整阶段都用它来腾出空间。尚未设置显示起点的屏幕保持未设置。
#[must_use]
pub fn adjust_screen_timestamps(screens: &[LyricsScreen], delta: Seconds) -> Vec<LyricsScreen> {
    screens.iter().map(|screen| screen.adjusted(delta)).collect()
}
