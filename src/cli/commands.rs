/*!
* 文件名: commands.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: console, tracing, dl-db, dl-repl
* 描述: 子命令处理 / Subcommand handlers
*/

use console::style;
use std::fmt::Display;
use tracing::{error, info, warn};

use dl_db::config::{self, Config};
use dl_db::{storage, DbError, DbResult, QueryEngine};
use dl_repl::shutdown::{EXIT_FAILURE, EXIT_OK};
use dl_repl::{EditorReader, Shell};

use super::app::{Cli, Command};

/// 输出错误信息 / Report an error on stderr
pub fn report_error(err: impl Display) {
    error!("{}", err);
    eprintln!("{} {}", style("error:").red().bold(), err);
}

/// 发现并加载配置，合并命令行参数 / Discover and load configuration, merged with flags
pub fn load_config(cli: &Cli) -> DbResult<Config> {
    let source = config::discover(cli.config.as_deref())?;
    let config = Config::load(&source)?;
    Ok(config.with_flag_defaults(cli.url_file.clone(), cli.depth))
}

/// 执行命令，返回退出码 / Execute the command and return the exit status
pub async fn execute(cli: Cli) -> i32 {
    let command = cli.command.unwrap_or(Command::Repl);
    if command == Command::Version {
        println!("{}", crate::version_line());
        info!("Exiting");
        return EXIT_OK;
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            report_error(e);
            return EXIT_FAILURE;
        }
    };

    match command {
        Command::Init => match storage::init(&config) {
            Ok(_) => {
                println!("Initialized database at {:?}", config.database_path);
                EXIT_OK
            }
            Err(e) => {
                report_error(e);
                EXIT_FAILURE
            }
        },
        Command::Repl => run_repl(config, cli.init).await,
        Command::Version => EXIT_OK,
    }
}

/// 启动交互式Shell / Start the interactive shell
async fn run_repl(config: Config, init: bool) -> i32 {
    if init {
        match storage::init(&config) {
            Ok(_) => {}
            Err(DbError::AlreadyInitialized(path)) => {
                warn!("Database at {:?} already initialized, continuing", path);
            }
            Err(e) => {
                report_error(e);
                return EXIT_FAILURE;
            }
        }
    }

    let outcome = Shell::new(&config.history_file)
        .run(EditorReader::new, move || Ok(QueryEngine::new(config)))
        .await;
    outcome.status
}
