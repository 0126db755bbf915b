/*!
固定容量日志记录。

所有文本字段使用预分配缓冲区，超出容量的内容静默截断，
热路径上不发生任何堆增长。
*/

use crate::Level;
use std::borrow::Cow;
use std::fmt;

/// 消息缓冲区大小
pub const MESSAGE_BUFFER_SIZE: usize = 512;
/// 文件名缓冲区大小
pub const FILE_BUFFER_SIZE: usize = 256;
/// 时间戳缓冲区大小
pub const TIME_BUFFER_SIZE: usize = 32;

/// 固定容量的日志记录
///
/// 一条记录同一时刻只有一个所有者：生产者填充、队列暂存、工作线程
/// 处理、对象池闲置。记录只按值移动，不提供 `Clone`——复制缓冲区
/// 正是对象池要避免的开销。
pub struct Record {
    level: Level,
    line: u32,
    time_len: usize,
    message_len: usize,
    file_len: usize,
    time: [u8; TIME_BUFFER_SIZE],
    message: [u8; MESSAGE_BUFFER_SIZE],
    file: [u8; FILE_BUFFER_SIZE],
}

impl Default for Record {
    fn default() -> Self {
        Self {
            level: Level::Info,
            line: 0,
            time_len: 0,
            message_len: 0,
            file_len: 0,
            time: [0; TIME_BUFFER_SIZE],
            message: [0; MESSAGE_BUFFER_SIZE],
            file: [0; FILE_BUFFER_SIZE],
        }
    }
}

/// 截断拷贝：最多写入 capacity-1 字节，始终以 NUL 结尾，
/// 返回实际拷贝的长度。
fn copy_truncated(buf: &mut [u8], src: &[u8]) -> usize {
    let copied = src.len().min(buf.len() - 1);
    buf[..copied].copy_from_slice(&src[..copied]);
    buf[copied] = 0;
    copied
}

impl Record {
    /// 创建带级别和消息的记录
    pub fn new(level: Level, message: &str) -> Self {
        let mut record = Self::default();
        record.level = level;
        record.set_message(message);
        record
    }

    /// 重置为空记录，幂等
    ///
    /// 只清空级别、行号和长度，缓冲区内容保持已定义但无意义。
    pub fn reset(&mut self) {
        self.level = Level::Info;
        self.line = 0;
        self.time_len = 0;
        self.message_len = 0;
        self.file_len = 0;
        self.time[0] = 0;
        self.message[0] = 0;
        self.file[0] = 0;
    }

    /// 设置日志级别
    #[inline]
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
    }

    /// 设置源代码行号
    #[inline]
    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    /// 设置消息内容，超出容量部分静默截断
    pub fn set_message(&mut self, message: &str) {
        self.message_len = copy_truncated(&mut self.message, message.as_bytes());
    }

    /// 设置源文件名，超出容量部分静默截断
    pub fn set_file(&mut self, file: &str) {
        self.file_len = copy_truncated(&mut self.file, file.as_bytes());
    }

    /// 设置已格式化的时间戳文本，超出容量部分静默截断
    pub fn set_time(&mut self, time: &str) {
        self.time_len = copy_truncated(&mut self.time, time.as_bytes());
    }

    /// 获取日志级别
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// 获取源代码行号
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// 获取消息内容
    #[inline]
    pub fn message(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.message_bytes())
    }

    /// 获取消息的原始字节
    #[inline]
    pub fn message_bytes(&self) -> &[u8] {
        &self.message[..self.message_len]
    }

    /// 获取源文件名
    #[inline]
    pub fn file(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.file_bytes())
    }

    /// 获取源文件名的原始字节
    #[inline]
    pub fn file_bytes(&self) -> &[u8] {
        &self.file[..self.file_len]
    }

    /// 获取时间戳文本
    #[inline]
    pub fn time(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.time_bytes())
    }

    /// 获取时间戳文本的原始字节
    #[inline]
    pub fn time_bytes(&self) -> &[u8] {
        &self.time[..self.time_len]
    }

    /// 是否携带源位置信息
    #[inline]
    pub fn has_location(&self) -> bool {
        self.file_len > 0 && self.line > 0
    }

    /// 是否为空记录（重置后或默认构造的状态）
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.message_len == 0 && self.time_len == 0 && self.file_len == 0 && self.line == 0
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("level", &self.level)
            .field("time", &self.time())
            .field("message", &self.message())
            .field("file", &self.file())
            .field("line", &self.line)
            .finish()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.time(), self.level, self.message())
    }
}
