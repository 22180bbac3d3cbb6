/*!
* 文件名: lib.rs
* 作者: JQQ
* 创建日期: 2025/12/15
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, rustyline, libc
* 描述: 交互式Shell核心：会话、历史与关闭协调 / Interactive shell core: session, history and shutdown
*/

pub mod errors;
pub mod executor;
pub mod history;
pub mod repl;
pub mod shell;
pub mod shutdown;
pub mod terminal;
pub mod tokenizer;
pub mod tty;

pub use errors::{HistoryError, ShellError, ShellResult};
pub use executor::{Dispatch, Executor};
pub use history::HistoryStore;
pub use repl::Repl;
pub use shell::Shell;
pub use shutdown::{ShutdownCoordinator, ShutdownHandle, ShutdownOutcome, ShutdownTrigger};
pub use terminal::{EditorReader, Input, LineReader, PromptState, TerminalSession};
pub use tokenizer::split_line;
pub use tty::TerminalState;

/// REPL模块的版本号 / Version of the REPL module
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
