/*!
* 文件名: mod.rs
* 作者: JQQ
* 创建日期: 2025/12/15
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: clap, tokio, tracing-subscriber
* 描述: CLI模块 / CLI module
*/

pub mod app;
pub mod commands;

pub use app::{Cli, Command};

use clap::Parser;
use tracing::info;

/// 工作线程数的环境变量，由tokio读取 / Worker thread override read by tokio
const WORKER_THREADS_ENV: &str = "TOKIO_WORKER_THREADS";

/// CLI入口 / CLI entry point
pub fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(build) = crate::build_string() {
        info!("{}", build);
    }

    let runtime = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            commands::report_error(format!("failed to start runtime: {}", e));
            std::process::exit(dl_repl::shutdown::EXIT_FAILURE);
        }
    };

    let status = runtime.block_on(commands::execute(cli));
    std::process::exit(status);
}

/// 初始化日志，输出到stderr / Initialize logging to stderr
fn init_logging(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// 构建运行时；未指定工作线程数时使用全部CPU / Build the runtime, using every CPU unless overridden
fn build_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();

    match std::env::var(WORKER_THREADS_ENV) {
        Ok(value) => info!("{} currently {} -- not adjusting", WORKER_THREADS_ENV, value),
        Err(_) => {
            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            builder.worker_threads(cpus);
            info!("Setting worker threads to {}", cpus);
        }
    }

    builder.build()
}
