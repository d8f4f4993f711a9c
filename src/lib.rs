#![warn(missing_docs)]

//! # Karaoke Timing RS
//!
//! 一个 Rust 库，把标记过的歌词文本和录制时的按键计时编译成带
//! 逐字高亮动画的卡拉OK字幕 (ASS)。
//!
//! ## 主要功能
//!
//! - **歌词切分**: 按换行、下划线和斜杠把标记文本切成段落，双换行
//!   分隔屏幕。
//! - **时间轴编译**: 把按键事件与段落逐一配对，组装出屏幕 → 行 →
//!   段落的树并补全所有时间戳。
//! - **调整流水线**: 倒数提示、标题卡、间奏屏、相邻屏歌词的提前
//!   显示，每个阶段都是独立的纯变换。
//! - **ASS 渲染**: 逐字 `\kf` 高亮、空隙填充、淡入淡出和纵向布局，
//!   并给出混流时需要的音频延迟。
//!
//! ## 编译字幕
//!
//! ```rust
//! use karaoke_timing_rs::{
//!     KaraokeOptions, LyricEvent, LyricMarker, create_ass_file,
//! };
//!
//! let lyrics = "Be bop_a lu bop\nShe's my ba/by";
//! let events = vec![
//!     LyricEvent(1.0, LyricMarker::SegmentStart),
//!     LyricEvent(2.0, LyricMarker::SegmentEnd),
//!     LyricEvent(3.0, LyricMarker::SegmentStart),
//!     LyricEvent(4.0, LyricMarker::SegmentStart),
//!     LyricEvent(5.0, LyricMarker::SegmentStart),
//! ];
//! let options = KaraokeOptions::default();
//!
//! match create_ass_file(lyrics, &events, 60.0, "歌曲名", "演唱者", &options) {
//!     Ok(subtitles) => {
//!         println!("音频需要延迟 {} 秒", subtitles.audio_delay);
//!         println!("{}", subtitles.content);
//!     }
//!     Err(e) => eprintln!("编译失败: {e}"),
//! }
//! ```

pub mod compiler;
pub mod error;

pub use crate::{
    compiler::{
        create_ass_file,
        timings::TimingsList,
        types::{
            CompiledSubtitles, KaraokeOptions, LyricEvent, LyricMarker, LyricSegment, LyricsLine,
            LyricsScreen, Seconds, VerticalAlignment,
        },
    },
    error::{KaraokeError, Result},
};
