/*!
* 文件名: storage.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/17
* 版权: 2023 JQQ. All rights reserved.
* 依赖: serde, serde_json, chrono, tracing
* 描述: 数据库存储的初始化与打开 / Database storage initialization and opening
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::errors::{DbError, DbResult};

/// 元数据文件名 / Metadata file name
pub const META_FILE: &str = "meta.json";
/// 存储格式版本 / Storage format version
pub const FORMAT_VERSION: u32 = 1;

/// 数据库元数据 / Database metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMeta {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
}

/// 数据库目录是否已初始化 / Whether the database directory is initialized
pub fn is_initialized(path: &Path) -> bool {
    path.join(META_FILE).is_file()
}

/// 创建空数据库 / Create an empty database
pub fn init(config: &Config) -> DbResult<DatabaseMeta> {
    let path = config.database_path.as_path();
    if is_initialized(path) {
        return Err(DbError::AlreadyInitialized(path.to_path_buf()));
    }

    std::fs::create_dir_all(path).map_err(|e| DbError::io(path, e))?;

    let meta = DatabaseMeta {
        format_version: FORMAT_VERSION,
        created_at: Utc::now(),
    };
    let meta_path = path.join(META_FILE);
    // create_new: 并发初始化时只有一个成功 / only one concurrent init can win
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&meta_path)
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => DbError::AlreadyInitialized(path.to_path_buf()),
            _ => DbError::io(&meta_path, e),
        })?;
    file.write_all(serde_json::to_string_pretty(&meta)?.as_bytes())
        .map_err(|e| DbError::io(&meta_path, e))?;

    info!("Initialized database at {:?}", path);
    Ok(meta)
}

/// 打开已初始化的数据库 / Open an initialized database
pub fn open(path: &Path) -> DbResult<DatabaseMeta> {
    let meta_path = path.join(META_FILE);
    let content = std::fs::read_to_string(&meta_path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DbError::NotInitialized(path.to_path_buf()),
        _ => DbError::io(&meta_path, e),
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_at(path: &Path) -> Config {
        Config {
            database_path: path.to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_init_creates_database() {
        let dir = tempdir().unwrap();
        let db = dir.path().join("nested").join("db");

        assert!(!is_initialized(&db));
        let meta = init(&config_at(&db)).unwrap();
        assert_eq!(meta.format_version, FORMAT_VERSION);
        assert!(is_initialized(&db));
        assert_eq!(open(&db).unwrap(), meta);
    }

    #[test]
    fn test_init_refuses_to_reinitialize() {
        let dir = tempdir().unwrap();
        let config = config_at(dir.path());

        init(&config).unwrap();
        let err = init(&config).unwrap_err();
        assert!(matches!(err, DbError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_open_uninitialized() {
        let dir = tempdir().unwrap();
        let err = open(dir.path()).unwrap_err();
        assert!(matches!(err, DbError::NotInitialized(_)));
    }
}
