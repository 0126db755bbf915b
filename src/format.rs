/*!
日志行格式化器。

格式化发生在消费侧的处理回调里，读取记录中已存好的时间戳文本，
不在写出时重新取当前时间。
*/

use crate::Record;
use std::fmt;

/// 格式化器接口
pub trait Formatter: Send + Sync {
    /// 将日志记录格式化为一行输出字节
    fn format(&self, record: &Record) -> Result<Vec<u8>, fmt::Error>;
}

/// 默认格式化器
///
/// 输出 `[时间] [级别] (文件:行号) 消息`，位置段仅在记录携带
/// 源位置时出现。
pub struct DefaultFormatter {
    /// 是否使用彩色输出
    colored: bool,
}

impl DefaultFormatter {
    /// 创建新的默认格式化器
    pub fn new() -> Self {
        Self {
            colored: Self::should_use_color(),
        }
    }

    /// 创建使用彩色输出的格式化器
    pub fn colored() -> Self {
        Self { colored: true }
    }

    /// 创建不使用彩色输出的格式化器
    pub fn plain() -> Self {
        Self { colored: false }
    }

    /// 检查是否应该使用彩色输出
    fn should_use_color() -> bool {
        // 简化处理：非Windows系统默认彩色
        #[cfg(not(windows))]
        return true;
        #[cfg(windows)]
        return false;
    }

    fn color_code(level: crate::Level) -> u8 {
        match level {
            crate::Level::Trace => 90,    // 灰色
            crate::Level::Debug => 36,    // 青色
            crate::Level::Info => 32,     // 绿色
            crate::Level::Warn => 33,     // 黄色
            crate::Level::Error => 31,    // 红色
            crate::Level::Critical => 35, // 紫色
            crate::Level::Off => 0,
        }
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for DefaultFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>, fmt::Error> {
        let mut result = Vec::with_capacity(64 + record.message_bytes().len());

        // 时间戳段
        if !record.time_bytes().is_empty() {
            result.push(b'[');
            result.extend_from_slice(record.time_bytes());
            result.extend_from_slice(b"] ");
        }

        // 级别段（可选带颜色）
        if self.colored {
            let level_str = format!(
                "\x1b[{}m[{:8}]\x1b[0m ",
                Self::color_code(record.level()),
                record.level()
            );
            result.extend_from_slice(level_str.as_bytes());
        } else {
            let level_str = format!("[{:8}] ", record.level());
            result.extend_from_slice(level_str.as_bytes());
        }

        // 位置段
        if record.has_location() {
            let location = format!("({}:{}) ", record.file(), record.line());
            result.extend_from_slice(location.as_bytes());
        }

        result.extend_from_slice(record.message_bytes());
        result.push(b'\n');

        Ok(result)
    }
}

/// JSON格式化器
pub struct JsonFormatter {
    /// 是否美化输出
    pretty: bool,
}

impl JsonFormatter {
    /// 创建新的JSON格式化器
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// 创建美化格式的JSON格式化器
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>, fmt::Error> {
        let message = record.message().replace('\\', "\\\\").replace('"', "\\\"");
        let file = record.file().replace('\\', "\\\\").replace('"', "\\\"");
        let result = if self.pretty {
            format!(
                "{{\n  \"time\": \"{}\",\n  \"level\": \"{}\",\n  \"file\": \"{}\",\n  \"line\": {},\n  \"message\": \"{}\"\n}}\n",
                record.time(),
                record.level().as_str(),
                file,
                record.line(),
                message
            )
        } else {
            format!(
                "{{\"time\":\"{}\",\"level\":\"{}\",\"file\":\"{}\",\"line\":{},\"message\":\"{}\"}}\n",
                record.time(),
                record.level().as_str(),
                file,
                record.line(),
                message
            )
        };

        Ok(result.into_bytes())
    }
}

/// 简单格式化器
pub struct SimpleFormatter;

impl SimpleFormatter {
    /// 创建新的简单格式化器
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimpleFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for SimpleFormatter {
    fn format(&self, record: &Record) -> Result<Vec<u8>, fmt::Error> {
        // 最简格式：级别 + 消息
        let result = format!("[{}] {}\n", record.level(), record.message());
        Ok(result.into_bytes())
    }
}
