//! ASS 格式生成器。
//!
//! 把调整完成的屏幕列表序列化为带逐字高亮动画的 ASS 字幕文本。

use std::fmt::Write;

use tracing::warn;

use crate::{
    compiler::types::{KaraokeOptions, LyricsLine, LyricsScreen, Seconds},
    error::{KaraokeError, Result},
};

/// 样式与事件使用的固定名称。
const STYLE_NAME: &str = "Default";
const SPEAKER_NAME: &str = "Singer";

/// floor 前加入的极小量, 抵消秒数换算厘秒时的浮点噪声。
const CENTISECOND_EPSILON: f64 = 1e-6;

/// 把秒数换算为厘秒整数（向下取整，不四舍五入）。
fn to_centiseconds(seconds: Seconds) -> i64 {
    (seconds * 100.0 + CENTISECOND_EPSILON).floor() as i64
}

/// 把秒数换算为毫秒整数，用于 `\fad` 标签。
fn to_milliseconds(seconds: Seconds) -> i64 {
    (seconds * 1000.0 + CENTISECOND_EPSILON).floor() as i64
}

/// 把秒数格式化为 ASS 时间码 `H:MM:SS.cc`（厘秒精度）。
#[must_use]
pub fn float_to_timecode(seconds: Seconds) -> String {
    let total_cs = to_centiseconds(seconds);
    let cs = total_cs % 100;
    let total_seconds = total_cs / 100;
    let secs = total_seconds % 60;
    let total_minutes = total_seconds / 60;
    let minutes = total_minutes % 60;
    let hours = total_minutes / 60;
    format!("{hours}:{minutes:02}:{secs:02}.{cs:02}")
}

/// ASS 生成的主入口函数。
pub fn generate_ass(screens: &[LyricsScreen], options: &KaraokeOptions) -> Result<String> {
    validate_timestamps(screens)?;

    let mut output = String::with_capacity(screens.len() * 256 + 512);
    write_header(&mut output, options)?;
    for screen in screens {
        write_screen_events(&mut output, screen, options)?;
    }
    Ok(output)
}

/// 写出 [Script Info]、[V4+ Styles] 和 [Events] 的头部。
fn write_header(output: &mut String, options: &KaraokeOptions) -> Result<()> {
    writeln!(output, "[Script Info]")?;
    writeln!(output, "; Script generated by karaoke_timing_rs")?;
    writeln!(output)?;
    writeln!(output, "[V4+ Styles]")?;
    writeln!(
        output,
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding"
    )?;
    writeln!(
        output,
        "Style: {STYLE_NAME},{},{},{},{},&HFF000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,2,8,0,0,0,0",
        options.font.name,
        options.font.size,
        options.color.primary.to_ass(0),
        options.color.secondary.to_ass(0),
    )?;
    writeln!(output)?;
    writeln!(output, "[Events]")?;
    writeln!(
        output,
        "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
    )?;
    Ok(())
}

/// 把一个屏幕的所有行写成 Dialogue 事件。
///
/// 行的显示区间默认取屏幕的起止时间，`custom_display_start` /
/// `custom_display_end` 存在时覆盖之。段落文本原样写出，行尾段落
/// 携带的换行会按原样进入文档。
fn write_screen_events(
    output: &mut String,
    screen: &LyricsScreen,
    options: &KaraokeOptions,
) -> Result<()> {
    let screen_start = screen.start_timestamp.unwrap_or(0.0);
    let screen_end = screen.end_timestamp();
    for (line_index, line) in screen.lines.iter().enumerate() {
        let display_start = line.custom_display_start.unwrap_or(screen_start);
        let display_end = line.custom_display_end.unwrap_or(screen_end);
        let margin_v = screen
            .line_y(line_index, options.font.size, options.vertical_alignment)
            .floor() as i64;
        let text = decorate_line(line, display_start)?;
        writeln!(
            output,
            "Dialogue: 0,{},{},{STYLE_NAME},{SPEAKER_NAME},0,0,{margin_v},,{text}",
            float_to_timecode(display_start),
            float_to_timecode(display_end),
        )?;
    }
    Ok(())
}

/// 构建一行的高亮动画文本。
///
/// 行首是 `{\k<延迟>}`，延迟为行的演唱时间与显示起点之差（厘秒）。
/// 之后每个段落写成 `{\kf<时长>}文本`；段落之间有空隙时补一个
/// 零文本的空白段，让动画时间轴没有空洞。行配置了淡入淡出时，
/// 在最前面加 `{\fad(...)}`。
fn decorate_line(line: &LyricsLine, display_start: Seconds) -> Result<String> {
    let mut text = String::new();

    if line.fade_in_duration > 0.0 || line.fade_out_duration > 0.0 {
        write!(
            text,
            "{{\\fad({},{})}}",
            to_milliseconds(line.fade_in_duration),
            to_milliseconds(line.fade_out_duration),
        )?;
    }

    let mut delay_cs = to_centiseconds(line.timestamp() - display_start);
    if delay_cs < 0 {
        // 负延迟说明上游的显示时间不一致, 通常来自边界上的浮点舍入
        warn!("行首延迟为负 ({delay_cs} cs), 已钳制为 0");
        delay_cs = 0;
    }
    write!(text, "{{\\k{delay_cs}}}")?;

    let mut previous_end: Option<Seconds> = None;
    for segment in &line.segments {
        let Some(end_timestamp) = segment.end_timestamp else {
            return Err(KaraokeError::Internal(
                "渲染时段落仍缺少结束时间戳".to_string(),
            ));
        };
        if let Some(previous_end) = previous_end
            && previous_end < segment.timestamp
        {
            write!(
                text,
                "{{\\kf{}}}",
                to_centiseconds(segment.timestamp - previous_end)
            )?;
        }
        write!(
            text,
            "{{\\kf{}}}{}",
            to_centiseconds(end_timestamp - segment.timestamp),
            segment.text,
        )?;
        previous_end = Some(end_timestamp);
    }

    Ok(text)
}

/// 渲染前的兜底校验。
///
/// NaN 一律视为上游不变量被破坏，立刻失败；缺少显示起点的屏幕
/// 同样说明调整阶段之间的约定被破坏。
fn validate_timestamps(screens: &[LyricsScreen]) -> Result<()> {
    for (screen_index, screen) in screens.iter().enumerate() {
        let Some(start) = screen.start_timestamp else {
            return Err(KaraokeError::Internal(format!(
                "屏幕 {screen_index} 缺少显示起点"
            )));
        };
        if start.is_nan() {
            return Err(KaraokeError::InvalidTimestamp(format!(
                "屏幕 {screen_index} 的显示起点为 NaN"
            )));
        }
        for line in &screen.lines {
            let custom_times = [line.custom_display_start, line.custom_display_end];
            if custom_times.iter().flatten().any(|t| t.is_nan()) {
                return Err(KaraokeError::InvalidTimestamp(format!(
                    "屏幕 {screen_index} 中某行的自定义显示时间为 NaN"
                )));
            }
            for segment in &line.segments {
                if segment.timestamp.is_nan()
                    || segment.end_timestamp.is_some_and(f64::is_nan)
                {
                    return Err(KaraokeError::InvalidTimestamp(format!(
                        "屏幕 {screen_index} 中段落 {:?} 的时间戳为 NaN",
                        segment.text
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::types::{LyricSegment, VerticalAlignment};

    #[test]
    fn test_float_to_timecode() {
        assert_eq!(float_to_timecode(0.0), "0:00:00.00");
        assert_eq!(float_to_timecode(25.42), "0:00:25.42");
        assert_eq!(float_to_timecode(60.0), "0:01:00.00");
        assert_eq!(float_to_timecode(3661.5), "1:01:01.50");
    }

    // 厘秒换算向下取整, 但不被浮点噪声拖到下一厘秒
    #[test]
    fn test_to_centiseconds_truncates() {
        assert_eq!(to_centiseconds(0.25), 25);
        assert_eq!(to_centiseconds(25.42), 2542);
        assert_eq!(to_centiseconds(1.999), 199);
        assert_eq!(to_centiseconds(-45.0), -4500);
    }

    #[test]
    fn test_segment_karaoke_tag() {
        let line = LyricsLine::new(vec![LyricSegment::with_end("boop", 2.0, 3.0)]);
        assert_eq!(decorate_line(&line, 2.0).unwrap(), "{\\k0}{\\kf100}boop");

        let line = LyricsLine::new(vec![LyricSegment::with_end("baby", 0.5, 0.75)]);
        assert_eq!(decorate_line(&line, 0.5).unwrap(), "{\\k0}{\\kf25}baby");
    }

    // 段落间的空隙由零文本的空白段补齐
    #[test]
    fn test_gaps_are_filled_with_blank_segments() {
        let line = LyricsLine::new(vec![
            LyricSegment::with_end("Hold", 0.0, 1.0),
            LyricSegment::with_end("me", 2.0, 3.0),
            LyricSegment::with_end("now", 3.0, 4.0),
        ]);
        assert_eq!(
            decorate_line(&line, 0.0).unwrap(),
            "{\\k0}{\\kf100}Hold{\\kf100}{\\kf100}me{\\kf100}now"
        );
    }

    // 负延迟钳制为 0
    #[test]
    fn test_negative_delay_is_clamped() {
        let line = LyricsLine::new(vec![LyricSegment::with_end("late", 1.0, 2.0)]);
        assert_eq!(decorate_line(&line, 3.0).unwrap(), "{\\k0}{\\kf100}late");
    }

    // 淡入淡出写成 \fad 前缀
    #[test]
    fn test_fade_tag() {
        let mut line = LyricsLine::new(vec![LyricSegment::with_end("soft", 1.0, 2.0)]);
        line.fade_in_duration = 0.3;
        assert_eq!(
            decorate_line(&line, 1.0).unwrap(),
            "{\\fad(300,0)}{\\k0}{\\kf100}soft"
        );
    }

    // NaN 时间戳让渲染立刻失败
    #[test]
    fn test_nan_timestamp_fails_loudly() {
        let mut screen = LyricsScreen::new(vec![LyricsLine::new(vec![LyricSegment::with_end(
            "bad", f64::NAN, 2.0,
        )])]);
        screen.start_timestamp = Some(0.0);

        let result = generate_ass(&[screen], &KaraokeOptions::default());
        assert!(matches!(result, Err(KaraokeError::InvalidTimestamp(_))));
    }

    // 头部包含配置的字体与反序编码的颜色
    #[test]
    fn test_header_reflects_options() {
        let mut screen = LyricsScreen::new(vec![]);
        screen.start_timestamp = Some(0.0);
        let output = generate_ass(&[screen], &KaraokeOptions::default()).unwrap();

        assert!(output.starts_with("[Script Info]\n"));
        assert!(output.contains(
            "Style: Default,Arial Narrow,20,&H00FF00FF,&H00FFFF00,&HFF000000,&H00000000,-1,0,0,0,100,100,0,0,1,2,2,8,0,0,0,0"
        ));
        assert!(output.ends_with(
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n"
        ));
    }

    // 事件行使用屏幕的起止时间和按行号计算的纵向边距
    #[test]
    fn test_dialogue_line_fields() {
        let mut screen = LyricsScreen::new(vec![
            LyricsLine::new(vec![LyricSegment::with_end("one\n", 1.0, 2.0)]),
            LyricsLine::new(vec![LyricSegment::with_end("two", 2.0, 3.0)]),
        ]);
        screen.start_timestamp = Some(0.0);
        let options = KaraokeOptions::default();
        assert_eq!(options.vertical_alignment, VerticalAlignment::Middle);

        let output = generate_ass(&[screen], &options).unwrap();
        assert!(output.contains(
            "Dialogue: 0,0:00:00.00,0:00:03.00,Default,Singer,0,0,130,,{\\k100}{\\kf100}one\n"
        ));
        assert!(output.contains(
            "Dialogue: 0,0:00:00.00,0:00:03.00,Default,Singer,0,0,160,,{\\k200}{\\kf100}two\n"
        ));
    }
}
