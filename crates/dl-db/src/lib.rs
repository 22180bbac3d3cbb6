/*!
* 文件名: lib.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/17
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: 数据库协作组件：配置、存储初始化与查询引擎 / Database collaborators: configuration, storage init and query engine
*/

pub mod config;
pub mod engine;
pub mod errors;
pub mod storage;

pub use config::{Config, ConfigSource};
pub use engine::QueryEngine;
pub use errors::{DbError, DbResult};
