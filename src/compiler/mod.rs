//! 字幕编译核心模块。
//!
//! 数据严格单向流动：切分器 → 时间轴编译器 → 时间戳解算 →
//! 调整流水线（每个阶段 `Vec<LyricsScreen> → Vec<LyricsScreen>`）→
//! ASS 渲染器。所有结构在每次编译时重新构建，没有共享的可变状态。

pub mod adjustments;
pub mod ass_generator;
pub mod markup;
pub mod segmenter;
pub mod timeline;
pub mod timings;
pub mod types;

pub use types::{
    CompiledSubtitles, KaraokeOptions, LyricEvent, LyricMarker, LyricsScreen, Seconds,
};

use tracing::debug;

use crate::error::Result;

// ==========================================================
//  顶级编译入口
// ==========================================================

/// 把歌词标记和按键计时编译为完整的 ASS 字幕。
///
/// 依次执行时间轴编译、时间戳解算和调整流水线（倒数提示、标题卡、
/// 相邻屏行的提前显示、间奏屏，按 `options` 逐项开关；标题卡总是
/// 插入），最后渲染为 ASS 文本。
///
/// # 参数
///
/// * `lyrics` - 带标记的歌词文本。
/// * `events` - 按时间排列的按键计时事件。
/// * `song_duration` - 歌曲总时长（秒），用于补全最后一段的结束时间。
/// * `song_title` / `artist` - 标题卡显示的歌名和演唱者。
/// * `options` - 显示选项。
///
/// # 返回
///
/// * `Result<CompiledSubtitles>` - 成功时包含 ASS 文本和混流方需要的
///   音频延迟总秒数（各屏幕 `audio_delay` 之和）。
pub fn create_ass_file(
    lyrics: &str,
    events: &[LyricEvent],
    song_duration: Seconds,
    song_title: &str,
    artist: &str,
    options: &KaraokeOptions,
) -> Result<CompiledSubtitles> {
    let screens = timeline::compile_lyric_timings(lyrics, events);
    debug!("编译出 {} 个屏幕", screens.len());
    let mut screens = timeline::denormalize_timestamps(screens, song_duration);

    if options.add_count_ins {
        screens = adjustments::add_quick_start_count_in(screens);
        screens = adjustments::add_screen_count_ins(screens);
    }
    screens = adjustments::add_title_screen(screens, song_title, artist)?;
    if options.add_staggered_lines {
        screens = adjustments::display_quick_lines_early(screens, options);
    }
    if options.add_instrumental_screens {
        screens = adjustments::add_instrumental_screens(screens)?;
    }

    let audio_delay = screens.iter().map(|screen| screen.audio_delay).sum();
    let content = ass_generator::generate_ass(&screens, options)?;
    Ok(CompiledSubtitles {
        content,
        audio_delay,
    })
}
