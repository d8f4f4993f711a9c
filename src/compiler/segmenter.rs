//! 歌词标记文本的切分器。
//!
//! 把带标记的歌词切成有序的段落序列：
//! - 换行切分段落，连续两个换行分隔屏幕。
//! - 下划线在一行内的单词边界处切分段落。
//! - 斜杠在单词内部切分段落。

use crate::compiler::types::Segment;

/// 把标记文本解析为段落列表。
///
/// 扫描一遍、不回溯。`include_markup` 为假时斜杠被丢弃、下划线替换为
/// 空格；为真时两者原样保留。连续两个换行不会产生新段落，第二个换行
/// 被补到上一段的末尾，时间轴编译器据此用 `\n\n` 结尾识别屏幕边界。
#[must_use]
pub fn parse_segments(lyrics: &str, include_markup: bool) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut current = String::new();

    for ch in lyrics.chars() {
        if ch == '\n' && current.is_empty() {
            // 连续换行: 标记上一段同时结束行和屏幕
            if let Some(previous) = segments.last_mut() {
                previous.text.push('\n');
            }
            continue;
        }
        match ch {
            '\n' => {
                current.push('\n');
            }
            '/' => {
                if include_markup {
                    current.push('/');
                }
            }
            '_' => {
                current.push(if include_markup { '_' } else { ' ' });
            }
            other => {
                current.push(other);
                continue;
            }
        }
        segments.push(Segment {
            text: std::mem::take(&mut current),
        });
    }

    // 输入末尾视作一个隐式边界, 收掉未闭合的段落
    if !current.is_empty() {
        segments.push(Segment { text: current });
    }

    segments
}
