/*!
* 文件名: history.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tracing
* 描述: 命令历史的加载与持久化 / Loading and persisting command history
*/

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use crate::errors::HistoryError;

/// 默认历史文件名 / Default history file name
pub const DEFAULT_HISTORY_FILE: &str = ".datalake_history";

#[derive(Debug, Default)]
struct HistoryBuffer {
    /// 按提交顺序排列的条目 / Entries in submission order
    entries: Vec<String>,
    /// 已写入文件的条目数 / Number of entries already on disk
    persisted: usize,
}

/// 历史存储 / History store
///
/// 在前台循环和关闭协调器之间通过 `Arc` 共享。
/// Shared between the foreground loop and the shutdown coordinator via `Arc`.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    buffer: Mutex<HistoryBuffer>,
    /// 成功完成的刷写次数 / Number of completed flushes
    flushes: AtomicUsize,
}

impl HistoryStore {
    /// 创建新的历史存储（不读取文件）/ Create a new store without touching the file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            buffer: Mutex::new(HistoryBuffer::default()),
            flushes: AtomicUsize::new(0),
        }
    }

    /// 历史文件路径 / History file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从文件加载历史 / Load history from the file
    ///
    /// 文件不存在时返回 `HistoryError::NotFound`，调用方应继续使用空历史。
    /// Returns `HistoryError::NotFound` for a missing file; callers proceed with no entries.
    pub fn load(&self) -> Result<usize, HistoryError> {
        let file = File::open(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => HistoryError::NotFound {
                path: self.path.clone(),
            },
            _ => HistoryError::Read {
                path: self.path.clone(),
                source,
            },
        })?;

        let mut loaded = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| HistoryError::Read {
                path: self.path.clone(),
                source,
            })?;
            loaded.push(line);
        }

        let count = loaded.len();
        let mut buffer = self.lock();
        // 加载的条目已在磁盘上，排在本会话条目之前
        // Loaded entries are on disk and precede this session's
        loaded.append(&mut buffer.entries);
        buffer.entries = loaded;
        buffer.persisted += count;

        debug!("Loaded {} history entries from {:?}", count, self.path);
        Ok(count)
    }

    /// 记录一条输入 / Record one input line
    pub fn record(&self, line: impl Into<String>) {
        self.lock().entries.push(line.into());
    }

    /// 当前内存中的全部条目 / Snapshot of all in-memory entries
    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    /// 尚未持久化的条目数 / Number of entries not yet written
    pub fn pending(&self) -> usize {
        let buffer = self.lock();
        buffer.entries.len() - buffer.persisted
    }

    /// 将未持久化的条目追加写入文件 / Append entries not yet persisted to the file
    ///
    /// 文件句柄在返回前关闭。连续调用不会重复写入。
    /// The file handle is closed before returning. Repeated calls never duplicate entries.
    pub fn flush(&self) -> Result<usize, HistoryError> {
        // 持有锁直到写入完成，保证快照一致 / Hold the lock for a consistent snapshot
        let mut buffer = self.lock();

        let file = open_for_append(&self.path).map_err(|source| HistoryError::Open {
            path: self.path.clone(),
            source,
        })?;

        let pending = &buffer.entries[buffer.persisted..];
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        let mut writer = BufWriter::new(file);
        for entry in pending {
            writeln!(writer, "{}", entry).map_err(write_err)?;
        }
        let file = writer.into_inner().map_err(|e| write_err(e.into_error()))?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        let written = pending.len();
        buffer.persisted = buffer.entries.len();
        self.flushes.fetch_add(1, Ordering::SeqCst);

        debug!("Flushed {} history entries to {:?}", written, self.path);
        Ok(written)
    }

    /// 已成功完成的刷写次数 / How many flushes have completed
    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HistoryBuffer> {
        // 前台线程中途panic也不应丢失历史 / A panicking holder must not cost us the history
        self.buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(unix)]
fn open_for_append(path: &Path) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    OpenOptions::new()
        .append(true)
        .create(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}
