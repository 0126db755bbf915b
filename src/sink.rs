/*!
日志输出目标。

接口是同步的：写出发生在管线的单一工作线程里，批量写入接口让
一个批次只付一次锁与系统调用的开销。
*/

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// 输出目标接口
pub trait Sink: Send + Sync {
    /// 写入一行日志数据
    fn write(&self, data: &[u8]) -> io::Result<()>;

    /// 批量写入日志数据
    fn write_batch(&self, data: &[Vec<u8>]) -> io::Result<()> {
        for item in data {
            self.write(item)?;
        }
        Ok(())
    }

    /// 刷新输出缓冲区
    fn flush(&self) -> io::Result<()>;

    /// 关闭输出目标
    fn shutdown(&self) -> io::Result<()> {
        self.flush()
    }
}

/// 控制台输出目标
pub struct ConsoleSink {
    /// 是否使用标准错误输出
    stderr: bool,
}

impl ConsoleSink {
    /// 创建新的控制台输出目标
    pub fn new() -> Self {
        Self { stderr: false }
    }

    /// 创建使用标准错误输出的控制台输出目标
    pub fn stderr() -> Self {
        Self { stderr: true }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn write(&self, data: &[u8]) -> io::Result<()> {
        if self.stderr {
            io::stderr().write_all(data)?;
        } else {
            io::stdout().write_all(data)?;
        }
        Ok(())
    }

    fn write_batch(&self, data: &[Vec<u8>]) -> io::Result<()> {
        // 整批锁一次标准输出
        if self.stderr {
            let mut out = io::stderr().lock();
            for item in data {
                out.write_all(item)?;
            }
        } else {
            let mut out = io::stdout().lock();
            for item in data {
                out.write_all(item)?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        if self.stderr {
            io::stderr().flush()?;
        } else {
            io::stdout().flush()?;
        }
        Ok(())
    }
}

/// 文件输出目标
pub struct FileSink {
    /// 缓冲写入器
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl FileSink {
    /// 以追加模式创建文件输出目标，父目录不存在时自动创建
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Self::with_buffer_size(path, 8 * 1024)
    }

    /// 创建带指定缓冲区大小的文件输出目标
    pub fn with_buffer_size<P: AsRef<Path>>(path: P, buffer_size: usize) -> io::Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::with_capacity(buffer_size, file))),
        })
    }

    fn lock_writer(&self) -> io::Result<std::sync::MutexGuard<'_, BufWriter<File>>> {
        self.writer
            .lock()
            .map_err(|_| io::Error::other("lock poisoned"))
    }
}

impl Sink for FileSink {
    fn write(&self, data: &[u8]) -> io::Result<()> {
        let mut writer = self.lock_writer()?;
        writer.write_all(data)?;
        Ok(())
    }

    fn write_batch(&self, data: &[Vec<u8>]) -> io::Result<()> {
        let mut writer = self.lock_writer()?;
        for item in data {
            writer.write_all(item)?;
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        let mut writer = self.lock_writer()?;
        writer.flush()?;
        Ok(())
    }
}

/// 内存输出目标（用于测试和调试）
pub struct MemorySink {
    /// 内存缓冲区
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// 创建新的内存输出目标
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 获取缓冲区内容
    pub fn get_content(&self) -> Vec<u8> {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// 清空缓冲区
    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for MemorySink {
    fn write(&self, data: &[u8]) -> io::Result<()> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("lock poisoned"))?;
        buffer.extend_from_slice(data);
        Ok(())
    }

    fn write_batch(&self, data: &[Vec<u8>]) -> io::Result<()> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| io::Error::other("lock poisoned"))?;
        for item in data {
            buffer.extend_from_slice(item);
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// 空输出目标（用于性能测试）
#[derive(Default)]
pub struct NullSink;

impl NullSink {
    /// 创建新的空输出目标
    pub fn new() -> Self {
        Self
    }
}

impl Sink for NullSink {
    fn write(&self, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn write_batch(&self, _data: &[Vec<u8>]) -> io::Result<()> {
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// 复合输出目标（同一行写到多个目标）
#[derive(Default)]
pub struct CompositeSink {
    /// 输出目标列表
    sinks: Vec<Arc<dyn Sink>>,
}

impl CompositeSink {
    /// 创建新的复合输出目标
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// 添加输出目标
    pub fn add_sink(&mut self, sink: Arc<dyn Sink>) {
        self.sinks.push(sink);
    }
}

impl Sink for CompositeSink {
    fn write(&self, data: &[u8]) -> io::Result<()> {
        for sink in &self.sinks {
            sink.write(data)?;
        }
        Ok(())
    }

    fn write_batch(&self, data: &[Vec<u8>]) -> io::Result<()> {
        for sink in &self.sinks {
            sink.write_batch(data)?;
        }
        Ok(())
    }

    fn flush(&self) -> io::Result<()> {
        for sink in &self.sinks {
            sink.flush()?;
        }
        Ok(())
    }

    fn shutdown(&self) -> io::Result<()> {
        for sink in &self.sinks {
            sink.shutdown()?;
        }
        Ok(())
    }
}
