/*!
* 文件名: config.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: serde, serde_json, tracing
* 描述: 配置的发现与加载 / Configuration discovery and loading
*/

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::{DbError, DbResult};

/// 指向配置文件的环境变量 / Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "DL_SITE_INTELLIGENCE_CFG";
/// 系统级配置文件路径 / System-wide configuration file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/dl_site_intelligence.cfg";
/// 默认URL重定向探索深度 / Default URL redirection depth
pub const DEFAULT_URL_DEPTH: u32 = 1;

/// 站点情报配置 / Site intelligence configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// 基础URL列表文件 / File listing the base URLs to scan
    #[serde(alias = "urlFile")]
    pub url_file: Option<PathBuf>,
    /// URL重定向探索深度，0表示未设置 / Redirection depth, 0 when unset
    #[serde(alias = "urlDepth")]
    pub url_depth: u32,
    /// 数据库目录 / Database directory
    pub database_path: PathBuf,
    /// 历史文件 / History file
    pub history_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_file: None,
            url_depth: 0,
            database_path: PathBuf::from("datalake"),
            history_file: PathBuf::from(dl_repl::history::DEFAULT_HISTORY_FILE),
        }
    }
}

/// 配置来源 / Where the configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// 命令行显式指定 / Named on the command line
    Explicit(PathBuf),
    /// 环境变量 / Environment variable
    Environment(PathBuf),
    /// 系统级路径 / System-wide path
    System(PathBuf),
    /// 仅使用默认值 / Defaults only
    Defaults,
}

impl ConfigSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::Environment(p) | ConfigSource::System(p) => {
                Some(p.as_path())
            }
            ConfigSource::Defaults => None,
        }
    }
}

/// 按优先级确定配置文件 / Resolve the configuration file by precedence
///
/// 显式参数 > 环境变量 > 系统路径 > 默认值。显式指定但不存在的文件是致命错误。
/// Explicit flag > environment variable > system path > defaults. A missing explicit file is fatal.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env_value: Option<&Path>,
    system_path: &Path,
) -> DbResult<ConfigSource> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(DbError::ConfigNotFound(path.to_path_buf()));
        }
        return Ok(ConfigSource::Explicit(path.to_path_buf()));
    }

    if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
        if path.exists() {
            return Ok(ConfigSource::Environment(path.to_path_buf()));
        }
        debug!("{} points at missing file {:?}", CONFIG_ENV, path);
    }

    if system_path.exists() {
        return Ok(ConfigSource::System(system_path.to_path_buf()));
    }

    info!(
        "Couldn't find a config file in either ${} or {:?}. Going by flag defaults only.",
        CONFIG_ENV, system_path
    );
    Ok(ConfigSource::Defaults)
}

/// 读取进程环境来确定配置文件 / Resolve the configuration file from the process environment
pub fn discover(explicit: Option<&Path>) -> DbResult<ConfigSource> {
    let env_value = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    resolve_config_path(
        explicit,
        env_value.as_deref(),
        Path::new(SYSTEM_CONFIG_PATH),
    )
}

impl Config {
    /// 从来源加载配置 / Load configuration from a source
    pub fn load(source: &ConfigSource) -> DbResult<Self> {
        let Some(path) = source.path() else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path).map_err(|e| DbError::io(path, e))?;
        let config = serde_json::from_str(&content).map_err(|source| DbError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// 用命令行参数补全未设置的字段 / Fill unset fields from command-line flags
    pub fn with_flag_defaults(mut self, url_file: Option<PathBuf>, url_depth: u32) -> Self {
        if self.url_file.is_none() {
            self.url_file = url_file;
        }
        if self.url_depth == 0 {
            self.url_depth = url_depth;
        }
        self
    }
}
