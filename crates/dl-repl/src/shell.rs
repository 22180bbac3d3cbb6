/*!
* 文件名: shell.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, tracing
* 描述: 组装会话、REPL与关闭协调器 / Wires the session, the REPL and the shutdown coordinator
*/

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::ShellResult;
use crate::executor::Executor;
use crate::history::{HistoryStore, DEFAULT_HISTORY_FILE};
use crate::repl::Repl;
use crate::shutdown::{
    ProcessTerminator, ShutdownCoordinator, ShutdownOutcome, ShutdownTrigger, Terminator,
};
use crate::terminal::{LineReader, TerminalSession};
use crate::tty::TerminalState;

/// 交互式Shell / Interactive shell
pub struct Shell<T: Terminator = ProcessTerminator> {
    history: Arc<HistoryStore>,
    terminator: T,
    watch_signals: bool,
    output: Option<Box<dyn Write + Send>>,
}

impl Default for Shell<ProcessTerminator> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_FILE)
    }
}

impl Shell<ProcessTerminator> {
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history: Arc::new(HistoryStore::new(history_path)),
            terminator: ProcessTerminator,
            watch_signals: true,
            output: None,
        }
    }
}

impl<T: Terminator + 'static> Shell<T> {
    pub fn with_terminator<U: Terminator>(self, terminator: U) -> Shell<U> {
        Shell {
            history: self.history,
            terminator,
            watch_signals: self.watch_signals,
            output: self.output,
        }
    }

    pub fn with_signal_watcher(mut self, enabled: bool) -> Self {
        self.watch_signals = enabled;
        self
    }

    /// 替换会话的标准输出 / Replace the session's standard output
    pub fn with_output(mut self, output: Box<dyn Write + Send>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// 运行Shell直到退出 / Run the shell until it exits
    ///
    /// 前台循环在阻塞线程中运行；行读取器和执行引擎在该线程内创建。
    /// 即使信号在读取中途结束会话，关闭时也会恢复标准输入的终端属性。
    /// 返回前已调用一次终止器。
    /// The foreground loop runs on a blocking thread, where the reader and the engine
    /// are built. The terminal attributes of stdin are restored on shutdown even when
    /// a signal ends the session mid-read. The terminator has been invoked once before
    /// this returns.
    pub async fn run<R, E, MR, ME>(self, make_reader: MR, make_executor: ME) -> ShutdownOutcome
    where
        R: LineReader,
        E: Executor,
        MR: FnOnce() -> ShellResult<R> + Send + 'static,
        ME: FnOnce() -> ShellResult<E> + Send + 'static,
    {
        // 在行编辑器进入原始模式之前保存 / Saved before the line editor enters raw mode
        let coordinator = ShutdownCoordinator::new(self.history.clone(), self.terminator)
            .with_terminal_state(TerminalState::capture_stdin());
        let watcher = if self.watch_signals {
            Some(coordinator.spawn_signal_watcher())
        } else {
            None
        };

        let handle = coordinator.handle();
        let history = self.history;
        let output = self.output;
        let foreground = tokio::task::spawn_blocking(move || {
            let started = (|| -> ShellResult<_> {
                let reader = make_reader()?;
                let mut term = TerminalSession::new(reader, history);
                if let Some(output) = output {
                    term = term.with_output(output);
                }
                let loaded = term.open()?;
                info!("Loaded {} history entries", loaded);
                Ok((term, make_executor()?))
            })();

            match started {
                Ok((term, executor)) => Repl::new(term, executor, handle).run(),
                Err(e) => {
                    handle.fire(ShutdownTrigger::StartupFailed(e.to_string()));
                    Err(e)
                }
            }
        });

        let outcome = coordinator.shutdown().await;

        if let Some(watcher) = watcher {
            watcher.abort();
        }
        // 信号路径获胜时前台仍阻塞在读取中，不等待它
        // If a signal won, the foreground is still blocked
        if foreground.is_finished() {
            if let Ok(Err(e)) = foreground.await {
                debug!("Foreground loop ended with error: {}", e);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ShellError;
    use crate::executor::Dispatch;
    use crate::shutdown::{EXIT_FAILURE, EXIT_OK};
    use crate::terminal::ScriptedReader;
    use tempfile::tempdir;

    struct NoExit;
    impl Terminator for NoExit {
        fn terminate(&self, _status: i32) {}
    }

    fn accept(_command: &str, _arguments: &str) -> ShellResult<Dispatch> {
        Ok(Dispatch::Complete)
    }

    #[tokio::test]
    async fn test_session_persists_history_on_eof() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".datalake_history");
        std::fs::write(&path, "old\n").unwrap();

        let shell = Shell::new(&path)
            .with_terminator(NoExit)
            .with_signal_watcher(false)
            .with_output(Box::new(std::io::sink()));
        let outcome = shell
            .run(|| Ok(ScriptedReader::new(["new", "# comment"])), || Ok(accept))
            .await;

        assert_eq!(outcome.trigger, ShutdownTrigger::EndOfInput);
        assert_eq!(outcome.status, EXIT_OK);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "old\nnew\n# comment\n"
        );
    }

    #[tokio::test]
    async fn test_startup_failure_exits_before_prompt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".datalake_history");

        let shell = Shell::new(&path)
            .with_terminator(NoExit)
            .with_signal_watcher(false);
        let outcome = shell
            .run(
                || -> ShellResult<ScriptedReader> { Err(ShellError::runtime("no terminal")) },
                || Ok(accept),
            )
            .await;

        assert!(matches!(outcome.trigger, ShutdownTrigger::StartupFailed(_)));
        assert_eq!(outcome.status, EXIT_FAILURE);
        assert!(!path.exists());
    }
}
