/*!
* 文件名: main.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: clap, tokio, console, rustyline
* 描述: site-intelligence 命令行入口 / Entry point of the site-intelligence CLI
*/

#[cfg(feature = "cli")]
fn main() {
    site_intelligence::cli::main();
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("Error: CLI feature is not enabled. Please compile with --features cli");
    std::process::exit(1);
}
