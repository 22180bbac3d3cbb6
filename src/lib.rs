//! # site-intelligence
//!
//! An interactive discovery shell for the deep web: a REPL over the Data Lake backing
//! store with durable, signal-safe command history.
//!
//! ## Crates
//!
//! - **dl-repl** - the shell core: tokenizer, history store, terminal session,
//!   shutdown coordinator and REPL driver
//! - **dl-db** - configuration discovery, storage initialization and the bundled
//!   query engine
//!
//! ## Features
//!
//! - **cli** - builds the `site-intelligence` binary (enabled by default)
//!
//! ## Example
//!
//! ```rust,no_run
//! use site_intelligence::dl_db::{Config, QueryEngine};
//! use site_intelligence::dl_repl::{EditorReader, Shell};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let outcome = Shell::new(&config.history_file)
//!         .run(EditorReader::new, move || Ok(QueryEngine::new(config)))
//!         .await;
//!     std::process::exit(outcome.status);
//! }
//! ```

// Re-export the workspace crates
pub use dl_db;
pub use dl_repl;

#[cfg(feature = "cli")]
pub mod cli;

// Re-export commonly used dependencies for convenience
pub use tokio;
pub use tracing;

/// 版本号 / Package version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 构建信息，编译时设置 `DL_BUILD_DATE` 才会有值
/// Build string, present only when `DL_BUILD_DATE` was set at compile time
pub fn build_string() -> Option<String> {
    option_env!("DL_BUILD_DATE").map(|date| format!("site-intelligence {} built {}", VERSION, date))
}

/// `version` 子命令的输出 / Output of the `version` subcommand
pub fn version_line() -> String {
    build_string().unwrap_or_else(|| format!("Site-intelligence snapshot {}", VERSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line_mentions_version() {
        assert!(version_line().contains(VERSION));
    }
}
