/*!
* 文件名: errors.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/17
* 版权: 2023 JQQ. All rights reserved.
* 依赖: thiserror
* 描述: 数据库模块的错误定义 / Error definitions for the database module
*/

use std::path::PathBuf;
use thiserror::Error;

/// 数据库模块的Result类型别名 / Result type alias for the database module
pub type DbResult<T> = Result<T, DbError>;

/// 数据库模块的错误类型 / Error type for the database module
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Cannot find specified configuration file {0:?}, aborting.")]
    /// 显式指定的配置文件不存在 / Explicit configuration file missing
    ConfigNotFound(PathBuf),

    #[error("Invalid configuration in {path:?}: {source}")]
    /// 配置解析失败 / Configuration parse failure
    InvalidConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database already initialized at {0:?}")]
    /// 数据库已初始化 / Database already initialized
    AlreadyInitialized(PathBuf),

    #[error("Database not initialized at {0:?}; run `site-intelligence init` first")]
    /// 数据库未初始化 / Database not initialized
    NotInitialized(PathBuf),

    #[error("IO error on {path:?}: {source}")]
    /// IO错误 / IO error
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    /// 序列化错误 / Serialization error
    Serialization(#[from] serde_json::Error),
}

impl DbError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<DbError> for dl_repl::ShellError {
    fn from(err: DbError) -> Self {
        dl_repl::ShellError::Command(err.to_string())
    }
}
