/*!
* 文件名: app.rs
* 作者: JQQ
* 创建日期: 2025/12/15
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: clap
* 描述: 命令行参数定义 / Command-line argument definitions
*/

use clap::{Parser, Subcommand};
use dl_db::config::DEFAULT_URL_DEPTH;
use std::path::PathBuf;

/// site-intelligence is a discovery tool for the deep web.
#[derive(Parser, Debug)]
#[command(name = "site-intelligence")]
#[command(about = "site-intelligence is a discovery tool for the deep web.")]
pub struct Cli {
    /// Path to an explicit configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// URL file to use for list of base URLs to scan.
    #[arg(long = "url-file", alias = "urlFile", global = true, value_name = "FILE")]
    pub url_file: Option<PathBuf>,

    /// Initialize the database before using it.
    #[arg(long, global = true)]
    pub init: bool,

    /// Depth of URL redirection to explore.
    #[arg(long, global = true, default_value_t = DEFAULT_URL_DEPTH)]
    pub depth: u32,

    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Create an empty database.
    Init,
    /// Version information.
    Version,
    /// Start the interactive shell (the default).
    Repl,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults() {
        let cli = Cli::try_parse_from(["site-intelligence"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.depth, DEFAULT_URL_DEPTH);
        assert!(!cli.init);
    }

    #[test]
    fn test_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "site-intelligence",
            "init",
            "--config",
            "/tmp/dl.cfg",
            "--urlFile",
            "urls.txt",
            "--depth",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.command, Some(Command::Init));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/dl.cfg")));
        assert_eq!(cli.url_file, Some(PathBuf::from("urls.txt")));
        assert_eq!(cli.depth, 3);
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["site-intelligence", "crawl"]).is_err());
    }
}
