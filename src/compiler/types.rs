//! 定义了字幕编译中使用的核心数据类型。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::EnumString;

//=============================================================================
// 1. 基础类型
//=============================================================================

/// 以秒为单位的时间戳。
pub type Seconds = f64;

/// 字幕布局使用的参考画面宽度（像素）。
pub const VIDEO_WIDTH: f64 = 400.0;
/// 字幕布局使用的参考画面高度（像素）。
pub const VIDEO_HEIGHT: f64 = 320.0;

/// 行高与字号的比例。
const LINE_HEIGHT_FACTOR: f64 = 1.5;

/// 录制时按键产生的标记类型。
///
/// 空格标记一个段落的开始，回车标记上一个段落的结束。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum LyricMarker {
    /// 段落开始。
    SegmentStart = 1,
    /// 上一个段落结束。
    SegmentEnd = 2,
}

/// 一条原始计时事件：时间戳加标记。
///
/// 序列化为 `[秒数, 标记]` 的二元数组，与录制工具存储的
/// `timings.json` 格式一致。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LyricEvent(pub Seconds, pub LyricMarker);

impl LyricEvent {
    /// 事件发生的时间戳（秒）。
    #[must_use]
    pub fn timestamp(&self) -> Seconds {
        self.0
    }

    /// 事件的标记类型。
    #[must_use]
    pub fn marker(&self) -> LyricMarker {
        self.1
    }
}

//=============================================================================
// 2. 歌词结构
//=============================================================================

/// 歌词标记中最小的文本单元，由切分器产出，不携带时间信息。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// 段落文本。行尾段落以 `\n` 结尾，屏幕末尾段落以 `\n\n` 结尾。
    pub text: String,
}

/// 一次带时间的段落演唱。
///
/// `timestamp` 是高亮动画开始的时间；`end_timestamp` 在显式的结束
/// 事件或解算阶段补全之前可以为空。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricSegment {
    /// 段落文本，原样进入渲染结果。
    pub text: String,
    /// 开始演唱的时间戳（秒）。
    pub timestamp: Seconds,
    /// 结束演唱的时间戳（秒），补全后不早于 `timestamp`。
    pub end_timestamp: Option<Seconds>,
}

impl LyricSegment {
    /// 创建一个尚无结束时间的段落。
    #[must_use]
    pub fn new(text: impl Into<String>, timestamp: Seconds) -> Self {
        Self {
            text: text.into(),
            timestamp,
            end_timestamp: None,
        }
    }

    /// 创建一个起止时间都已确定的段落。
    #[must_use]
    pub fn with_end(text: impl Into<String>, timestamp: Seconds, end_timestamp: Seconds) -> Self {
        Self {
            text: text.into(),
            timestamp,
            end_timestamp: Some(end_timestamp),
        }
    }

    /// 返回整体后移 `delta` 秒的新段落。
    #[must_use]
    pub fn adjusted(&self, delta: Seconds) -> Self {
        Self {
            text: self.text.clone(),
            timestamp: self.timestamp + delta,
            end_timestamp: self.end_timestamp.map(|end| end + delta),
        }
    }
}

/// 一行歌词：按演唱顺序排列的段落序列。
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsLine {
    /// 该行的段落，顺序即演唱顺序。
    pub segments: Vec<LyricSegment>,
    /// 覆盖该行开始显示的时间；未设置时使用所在屏幕的显示起点。
    pub custom_display_start: Option<Seconds>,
    /// 覆盖该行消失的时间；未设置时使用所在屏幕的结束时间。
    pub custom_display_end: Option<Seconds>,
    /// 淡入时长（秒），0 表示不淡入。
    pub fade_in_duration: Seconds,
    /// 淡出时长（秒），0 表示不淡出。
    pub fade_out_duration: Seconds,
}

impl LyricsLine {
    /// 用一组段落创建一行。
    #[must_use]
    pub fn new(segments: Vec<LyricSegment>) -> Self {
        Self {
            segments,
            ..Default::default()
        }
    }

    /// 该行开始演唱的时间戳：首个段落的时间戳，空行为 0。
    #[must_use]
    pub fn timestamp(&self) -> Seconds {
        self.segments.first().map_or(0.0, |segment| segment.timestamp)
    }

    /// 该行结束演唱的时间戳：末尾段落的结束时间。
    #[must_use]
    pub fn end_timestamp(&self) -> Option<Seconds> {
        self.segments
            .last()
            .and_then(|segment| segment.end_timestamp)
    }

    /// 返回整体后移 `delta` 秒的新行。
    #[must_use]
    pub fn adjusted(&self, delta: Seconds) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .map(|segment| segment.adjusted(delta))
                .collect(),
            custom_display_start: self.custom_display_start.map(|t| t + delta),
            custom_display_end: self.custom_display_end.map(|t| t + delta),
            fade_in_duration: self.fade_in_duration,
            fade_out_duration: self.fade_out_duration,
        }
    }
}

/// 一个屏幕：同时显示的一组歌词行。
///
/// `start_timestamp` 由解算和调整阶段显式设置，而不是从行推导，
/// 因为屏幕可以先于首行的动画出现（例如标题卡或倒数提示期间）。
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsScreen {
    /// 屏幕内的行，顺序即显示顺序。
    pub lines: Vec<LyricsLine>,
    /// 屏幕开始显示的时间；在解算阶段之前为空。
    pub start_timestamp: Option<Seconds>,
    /// 混流时主音轨需要延迟的秒数。只有首屏或标题卡才有意义。
    pub audio_delay: Seconds,
    /// 覆盖首行的纵向位置（像素），后续行在其下依次排列。
    pub custom_first_line_top_margin: Option<f64>,
}

impl LyricsScreen {
    /// 用一组行创建一个屏幕。
    #[must_use]
    pub fn new(lines: Vec<LyricsLine>) -> Self {
        Self {
            lines,
            ..Default::default()
        }
    }

    /// 屏幕的结束时间：末行的结束时间，没有行时回落到显示起点。
    #[must_use]
    pub fn end_timestamp(&self) -> Seconds {
        self.lines
            .last()
            .and_then(LyricsLine::end_timestamp)
            .or(self.start_timestamp)
            .unwrap_or(0.0)
    }

    /// 屏幕内实际开始演唱的时间（首行的演唱时间戳）。
    ///
    /// 与显示起点不同：倒数提示或标题卡可以让屏幕先出现。
    #[must_use]
    pub fn sing_start(&self) -> Seconds {
        self.lines
            .first()
            .map_or_else(|| self.start_timestamp.unwrap_or(0.0), LyricsLine::timestamp)
    }

    /// 屏幕内演唱结束的时间（末行的结束时间戳）。
    #[must_use]
    pub fn sing_end(&self) -> Seconds {
        self.end_timestamp()
    }

    /// 首个段落的演唱时间戳（包括倒数提示这类插入的段落）。
    #[must_use]
    pub fn first_segment_timestamp(&self) -> Option<Seconds> {
        self.lines
            .first()
            .and_then(|line| line.segments.first())
            .map(|segment| segment.timestamp)
    }

    /// 计算第 `line_index` 行的纵向位置（像素）。
    ///
    /// 行高为字号的 1.5 倍。`Middle` 把整块行在参考画面上垂直居中，
    /// `Top` 从顶部空出一个行高，`Bottom` 从底部向上排列。
    /// `custom_first_line_top_margin` 存在时覆盖以上规则。
    #[must_use]
    pub fn line_y(
        &self,
        line_index: usize,
        font_size: u32,
        alignment: VerticalAlignment,
    ) -> f64 {
        let line_height = f64::from(font_size) * LINE_HEIGHT_FACTOR;
        let index = line_index as f64;
        if let Some(margin) = self.custom_first_line_top_margin {
            return margin + index * line_height;
        }
        let line_count = self.lines.len() as f64;
        match alignment {
            VerticalAlignment::Top => line_height * (index + 1.0),
            VerticalAlignment::Middle => {
                VIDEO_HEIGHT / 2.0 - line_count * line_height / 2.0 + index * line_height
            }
            VerticalAlignment::Bottom => {
                VIDEO_HEIGHT - line_height * (line_count - index + 1.0)
            }
        }
    }

    /// 返回整体后移 `delta` 秒的新屏幕。
    ///
    /// 尚未设置显示起点的屏幕保持未设置。
    #[must_use]
    pub fn adjusted(&self, delta: Seconds) -> Self {
        Self {
            lines: self.lines.iter().map(|line| line.adjusted(delta)).collect(),
            start_timestamp: self.start_timestamp.map(|t| t + delta),
            audio_delay: self.audio_delay,
            custom_first_line_top_margin: self.custom_first_line_top_margin,
        }
    }
}

//=============================================================================
// 3. 显示选项
//=============================================================================

/// 字幕块的纵向对齐方式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum VerticalAlignment {
    /// 靠近画面顶部。
    Top,
    /// 垂直居中。
    #[default]
    Middle,
    /// 靠近画面底部。
    Bottom,
}

impl fmt::Display for VerticalAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerticalAlignment::Top => write!(f, "Top"),
            VerticalAlignment::Middle => write!(f, "Middle"),
            VerticalAlignment::Bottom => write!(f, "Bottom"),
        }
    }
}

/// RGB 颜色。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// 红色通道 (0-255)。
    pub red: u8,
    /// 绿色通道 (0-255)。
    pub green: u8,
    /// 蓝色通道 (0-255)。
    pub blue: u8,
}

impl Rgb {
    /// 创建一个 RGB 颜色。
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// 编码为 ASS 的 `&HAABBGGRR` 颜色串。
    ///
    /// 通道顺序与 RGB 相反，每个通道两位大写十六进制；
    /// alpha 为 0 表示完全不透明。
    #[must_use]
    pub fn to_ass(&self, alpha: u8) -> String {
        format!(
            "&H{:02X}{:02X}{:02X}{:02X}",
            alpha, self.blue, self.green, self.red
        )
    }
}

/// 字体设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontOptions {
    /// 字号（布局参考画面下的像素）。
    pub size: u32,
    /// 字体名称。
    pub name: String,
}

/// 配色设置。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorOptions {
    /// 没有背景视频时画面的底色。
    pub background: Rgb,
    /// 已唱部分的高亮颜色。
    pub primary: Rgb,
    /// 未唱部分的颜色。
    pub secondary: Rgb,
}

/// 卡拉OK视频的显示选项。
///
/// 在调整流水线和渲染阶段只读使用。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KaraokeOptions {
    /// 是否在长间隔前插入倒数提示。
    pub add_count_ins: bool,
    /// 是否为较长的间奏插入占位屏幕。
    pub add_instrumental_screens: bool,
    /// 是否提前显示衔接紧密的下一屏歌词。
    pub add_staggered_lines: bool,
    /// 是否使用背景视频。由混流方消费，字幕渲染不读取。
    pub use_background_video: bool,
    /// 字幕块的纵向对齐方式。
    pub vertical_alignment: VerticalAlignment,
    /// 字体设置。
    pub font: FontOptions,
    /// 配色设置。
    pub color: ColorOptions,
}

impl Default for KaraokeOptions {
    fn default() -> Self {
        Self {
            add_count_ins: true,
            add_instrumental_screens: true,
            add_staggered_lines: true,
            use_background_video: false,
            vertical_alignment: VerticalAlignment::Middle,
            font: FontOptions {
                size: 20,
                name: "Arial Narrow".to_string(),
            },
            color: ColorOptions {
                background: Rgb::new(255, 255, 0),
                primary: Rgb::new(255, 0, 255),
                secondary: Rgb::new(0, 255, 255),
            },
        }
    }
}

//=============================================================================
// 4. 编译结果
//=============================================================================

/// 一次完整编译的产物。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledSubtitles {
    /// 生成的 ASS 字幕文本。
    pub content: String,
    /// 混流时主音轨需要延迟的总秒数（各屏幕延迟之和）。
    pub audio_delay: Seconds,
}
