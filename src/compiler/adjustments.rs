//! 屏幕列表的调整流水线。
//!
//! 每个阶段都是 `Vec<LyricsScreen> → Vec<LyricsScreen>` 的独立变换，
//! 由编译入口按固定顺序串联：快速开场倒数、逐屏倒数提示、标题卡、
//! 相邻屏行的提前显示、间奏屏。所有阶段都返回新值，不共享可变状态。

use tracing::debug;

use crate::{
    compiler::{
        timeline::adjust_screen_timestamps,
        types::{KaraokeOptions, LyricSegment, LyricsLine, LyricsScreen, Seconds},
    },
    error::{KaraokeError, Result},
};

/// 与上一屏结束的间隔超过该秒数时，插入倒数提示。
pub const COUNT_IN_THRESHOLD: Seconds = 5.0;
/// 倒数提示的时长（秒）。
pub const COUNT_IN_DURATION: Seconds = 2.0;
/// 倒数提示显示的文本。
pub const COUNT_IN_TEXT: &str = "●●● ";
/// 首个段落不晚于该秒数时，屏幕上没有地方放倒数提示，
/// 需要整体延迟腾出空间。
pub const QUICK_START_THRESHOLD: Seconds = 1.0;
/// 标题卡的总时长（秒）。
pub const TITLE_SCREEN_DURATION: Seconds = 4.0;
/// 段落间的静默超过该秒数时，插入间奏屏。
pub const INSTRUMENTAL_SCREEN_THRESHOLD: Seconds = 8.0;
/// 间奏屏显示的占位文本。
pub const INSTRUMENTAL_TEXT: &str = "■■■■";
/// 下一屏与当前屏的演唱间隔不超过该秒数时，提前显示下一屏的前几行。
pub const STAGGER_GAP_THRESHOLD: Seconds = 2.0;
/// 提前显示/提前消失的行使用的淡入淡出时长（秒）。
pub const STAGGER_FADE_DURATION: Seconds = 0.3;

/// 一次最多提前显示的行数。
const MAX_STAGGERED_LINES: usize = 2;

/// 显示起点比较时允许的浮点误差。
const TIME_EPSILON: Seconds = 1e-9;

/// 歌声几乎立刻开始时，整体延迟歌曲，腾出开头的倒数提示。
///
/// 所有时间戳后移 `COUNT_IN_DURATION - 首个时间戳`，首屏的显示起点
/// 恢复原值（屏幕先于歌词出现），首行前插入可见的倒数段落，并把
/// 平移量记在首屏的 `audio_delay` 上，混流时音轨同步延迟。
#[must_use]
pub fn add_quick_start_count_in(screens: Vec<LyricsScreen>) -> Vec<LyricsScreen> {
    let Some(first_timestamp) = screens
        .first()
        .and_then(LyricsScreen::first_segment_timestamp)
    else {
        return screens;
    };
    if first_timestamp > QUICK_START_THRESHOLD {
        return screens;
    }

    let shift = COUNT_IN_DURATION - first_timestamp;
    debug!("歌声从 {first_timestamp} 秒就开始, 整体延迟 {shift} 秒");
    let original_start = screens[0].start_timestamp;
    let mut shifted = adjust_screen_timestamps(&screens, shift);

    let first_screen = &mut shifted[0];
    first_screen.start_timestamp = original_start;
    first_screen.audio_delay = shift;
    if let Some(first_line) = first_screen.lines.first_mut() {
        let sing_start = first_timestamp + shift;
        first_line.segments.insert(
            0,
            LyricSegment::with_end(COUNT_IN_TEXT, sing_start - COUNT_IN_DURATION, sing_start),
        );
    }
    shifted
}

/// 为与上一屏结束间隔过长的屏幕插入倒数提示。
///
/// 倒数段落覆盖该屏首个段落之前的最后两秒，不改动其它时间戳。
/// 首屏也参与（把歌曲开头当作上一屏的结束）；一秒内开唱的情况由
/// [`add_quick_start_count_in`] 处理，两者不会重复插入。
#[must_use]
pub fn add_screen_count_ins(mut screens: Vec<LyricsScreen>) -> Vec<LyricsScreen> {
    let mut previous_end: Seconds = 0.0;
    for screen in &mut screens {
        if let Some(first_timestamp) = screen.first_segment_timestamp()
            && first_timestamp - previous_end > COUNT_IN_THRESHOLD
            && let Some(first_line) = screen.lines.first_mut()
        {
            first_line.segments.insert(
                0,
                LyricSegment::with_end(
                    COUNT_IN_TEXT,
                    first_timestamp - COUNT_IN_DURATION,
                    first_timestamp,
                ),
            );
        }
        previous_end = screen.end_timestamp();
    }
    screens
}

/// 在最前面插入标题卡：歌名和演唱者各占一半时长的两行。
///
/// 前奏足够容纳标题卡时，把首屏的显示起点裁剪掉同样的时长，标题卡
/// 借用原本静默的前奏，音频无需延迟；否则整体后移标题卡的时长，并
/// 把延迟记在标题卡的 `audio_delay` 上。
pub fn add_title_screen(
    screens: Vec<LyricsScreen>,
    song_title: &str,
    artist: &str,
) -> Result<Vec<LyricsScreen>> {
    let half = TITLE_SCREEN_DURATION / 2.0;
    let mut title_screen = LyricsScreen::new(vec![
        LyricsLine::new(vec![LyricSegment::with_end(song_title, 0.0, half)]),
        LyricsLine::new(vec![LyricSegment::with_end(
            artist,
            half,
            TITLE_SCREEN_DURATION,
        )]),
    ]);
    title_screen.start_timestamp = Some(0.0);

    let mut screens = screens;
    match screens
        .first()
        .and_then(LyricsScreen::first_segment_timestamp)
    {
        Some(intro_length) if intro_length >= TITLE_SCREEN_DURATION => {
            debug!("前奏 {intro_length} 秒, 标题卡借用前奏播放");
            trim_display_start(&mut screens[0], TITLE_SCREEN_DURATION, "标题卡")?;
        }
        Some(_) => {
            screens = adjust_screen_timestamps(&screens, TITLE_SCREEN_DURATION);
            title_screen.audio_delay = TITLE_SCREEN_DURATION;
        }
        None => {}
    }
    screens.insert(0, title_screen);
    Ok(screens)
}

/// 把衔接紧密的下一屏前几行提前显示出来。
///
/// 对每个内部屏幕（标题卡和最后一屏除外），若与下一屏的演唱间隔不
/// 超过阈值，则下一屏的前一两行在当前屏对应行之后那一行唱到 75% 时
/// 淡入出现，当前屏被顶替的行在同一行唱到 50% 时淡出消失，腾出
/// 纵向空间。两屏行数不同导致首行位置不一致时，让下一屏的行落在
/// 当前屏空出的位置上。
#[must_use]
pub fn display_quick_lines_early(
    mut screens: Vec<LyricsScreen>,
    options: &KaraokeOptions,
) -> Vec<LyricsScreen> {
    if screens.len() < 3 {
        return screens;
    }
    for current_index in 1..screens.len() - 1 {
        let (head, tail) = screens.split_at_mut(current_index + 1);
        let current = &mut head[current_index];
        let next = &mut tail[0];
        if next.lines.is_empty() || current.lines.len() < 2 {
            continue;
        }
        let gap = next.sing_start() - current.sing_end();
        if gap > STAGGER_GAP_THRESHOLD {
            continue;
        }

        let early_count = MAX_STAGGERED_LINES
            .min(next.lines.len())
            .min(current.lines.len() - 1);
        for line_index in 0..early_count {
            let follower = &current.lines[line_index + 1];
            let follower_start = follower.timestamp();
            let follower_duration =
                follower.end_timestamp().unwrap_or(follower_start) - follower_start;

            let early_line = &mut next.lines[line_index];
            early_line.custom_display_start = Some(follower_start + 0.75 * follower_duration);
            early_line.fade_in_duration = STAGGER_FADE_DURATION;

            let vacated_line = &mut current.lines[line_index];
            vacated_line.custom_display_end = Some(follower_start + 0.5 * follower_duration);
            vacated_line.fade_out_duration = STAGGER_FADE_DURATION;
        }

        let font_size = options.font.size;
        let current_top = current.line_y(0, font_size, options.vertical_alignment);
        let next_top = next.line_y(0, font_size, options.vertical_alignment);
        if current_top < next_top {
            next.custom_first_line_top_margin = Some(current_top);
        }
    }
    screens
}

/// 为相邻屏幕之间的长静默插入间奏屏。
///
/// 间隔按上一屏的结束到下一屏首个段落的演唱时间计算（而不是补齐后
/// 的屏幕边界）。超过阈值时，插入一个占位行恰好跨越整段间隔的新屏
/// 幕，并把下一屏的显示起点顺延同样的时长。
pub fn add_instrumental_screens(screens: Vec<LyricsScreen>) -> Result<Vec<LyricsScreen>> {
    let mut result = Vec::with_capacity(screens.len());
    let mut iter = screens.into_iter();
    let Some(mut previous) = iter.next() else {
        return Ok(result);
    };

    for mut next in iter {
        let previous_end = previous.end_timestamp();
        let gap = next
            .first_segment_timestamp()
            .map(|timestamp| timestamp - previous_end);
        result.push(previous);

        if let Some(gap) = gap
            && gap > INSTRUMENTAL_SCREEN_THRESHOLD
        {
            debug!("在 {previous_end} 秒处插入 {gap} 秒的间奏屏");
            let mut interlude = LyricsScreen::new(vec![LyricsLine::new(vec![
                LyricSegment::with_end(INSTRUMENTAL_TEXT, previous_end, previous_end + gap),
            ])]);
            interlude.start_timestamp = Some(previous_end);
            // 间奏屏占用了这段显示时间, 下一屏相应顺延
            trim_display_start(&mut next, gap, "间奏屏")?;
            result.push(interlude);
        }
        previous = next;
    }
    result.push(previous);
    Ok(result)
}

/// 把屏幕的显示起点前移 `amount` 秒。
///
/// 起点不允许越过首行的可见时间；越过说明调整阶段之间的约定被破坏。
fn trim_display_start(
    screen: &mut LyricsScreen,
    amount: Seconds,
    adjustment: &'static str,
) -> Result<()> {
    let new_start = screen.start_timestamp.unwrap_or(0.0) + amount;
    let first_timestamp = screen.first_segment_timestamp().unwrap_or(new_start);
    if new_start > first_timestamp + TIME_EPSILON {
        return Err(KaraokeError::DisplayTrim {
            adjustment,
            amount,
            first_timestamp,
        });
    }
    screen.start_timestamp = Some(new_start);
    Ok(())
}
