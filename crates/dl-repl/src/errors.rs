/*!
* 文件名: errors.rs
* 作者: JQQ
* 创建日期: 2025/12/15
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: thiserror
* 描述: REPL模块的错误定义 / Error definitions for the REPL module
*/

use std::path::PathBuf;
use thiserror::Error;

/// REPL模块的Result类型别名 / Result type alias for the REPL module
pub type ShellResult<T> = Result<T, ShellError>;

/// REPL模块的错误类型 / Error type for the REPL module
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("History error: {0}")]
    /// 历史记录错误 / History error
    History(#[from] HistoryError),

    #[error("Line editor error: {0}")]
    /// 行编辑器错误 / Line editor error
    Readline(String),

    #[error("Command failed: {0}")]
    /// 命令执行失败 / Command failed
    Command(String),

    #[error("could not restore terminal attributes: {0}")]
    /// 终端属性恢复失败 / Terminal attributes could not be restored
    Terminal(#[source] std::io::Error),

    #[error("IO error: {0}")]
    /// IO错误 / IO error
    IoError(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    /// 运行时错误 / Runtime error
    RuntimeError(String),
}

impl ShellError {
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::RuntimeError(msg.into())
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Readline(err.to_string())
    }
}

/// 历史文件错误 / History file error
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history file {path:?} does not exist")]
    /// 历史文件不存在，调用方应视为空历史 / File missing, callers treat it as empty history
    NotFound { path: PathBuf },

    #[error("could not read history from {path:?}: {source}")]
    /// 读取失败 / Read failed
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open {path:?} to append history: {source}")]
    /// 打开失败 / Open for append failed
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write history to {path:?}: {source}")]
    /// 写入失败 / Write failed
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HistoryError {
    /// 是否为"文件不存在" / Whether this is the not-found case
    pub fn is_not_found(&self) -> bool {
        matches!(self, HistoryError::NotFound { .. })
    }
}
