//! 定义了整个 `karaoke-timing` 库的错误类型 `KaraokeError`。

use std::fmt;
use thiserror::Error;

/// `karaoke-timing` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum KaraokeError {
    /// 字符串格式化错误。
    #[error("格式错误: {0}")]
    Format(#[from] fmt::Error),

    /// 时间戳不是有效的数值，说明上游的不变量被破坏。
    #[error("无效的时间戳: {0}")]
    InvalidTimestamp(String),

    /// 调整阶段把屏幕的显示起点裁剪到了首行可见时间之后。
    ///
    /// 这是调整阶段之间的契约被破坏，正确的选项组合下不应出现。
    #[error("{adjustment}无法将显示起点前移 {amount} 秒: 首行时间戳为 {first_timestamp} 秒")]
    DisplayTrim {
        /// 发起裁剪的调整阶段。
        adjustment: &'static str,
        /// 请求前移的秒数。
        amount: f64,
        /// 该屏幕首行的可见时间戳。
        first_timestamp: f64,
    },

    /// 内部逻辑错误或未明确分类的错误。
    #[error("内部错误: {0}")]
    Internal(String),
}

/// `KaraokeError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, KaraokeError>;
