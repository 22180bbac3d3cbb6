/*!
* 文件名: shutdown.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tokio, tracing
* 描述: 关闭协调器：信号监听与一次性的清理退出 / Shutdown coordinator: signal watching and the single clean-up-and-exit
*/

use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{ShellError, ShellResult};
use crate::history::HistoryStore;
use crate::tty::TerminalState;

/// 正常退出 / Normal exit
pub const EXIT_OK: i32 = 0;
/// 会话异常结束 / Session ended abnormally
pub const EXIT_FAILURE: i32 = 1;
/// 历史未能保存 / History could not be saved
pub const EXIT_CLEANUP_FAILURE: i32 = 2;

/// 触发关闭的原因 / What triggered the shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownTrigger {
    /// 输入结束 / End of input
    EndOfInput,
    /// 操作系统信号 / OS signal
    Signal(&'static str),
    /// 读取失败 / The line reader failed
    ReadFailed(String),
    /// 会话未能启动，不需要刷写 / Session never started, nothing to flush
    StartupFailed(String),
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownTrigger::EndOfInput => write!(f, "end of input"),
            ShutdownTrigger::Signal(name) => write!(f, "signal {}", name),
            ShutdownTrigger::ReadFailed(msg) => write!(f, "read failure: {}", msg),
            ShutdownTrigger::StartupFailed(msg) => write!(f, "startup failure: {}", msg),
        }
    }
}

/// 一次性关闭令牌 / Single-use shutdown token
///
/// 任何路径都可以克隆并触发，但只有第一次触发生效。
/// Any exit path may hold a clone and fire it; only the first fire wins.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Arc<Mutex<Option<oneshot::Sender<ShutdownTrigger>>>>,
}

impl ShutdownHandle {
    fn new(sender: oneshot::Sender<ShutdownTrigger>) -> Self {
        Self {
            sender: Arc::new(Mutex::new(Some(sender))),
        }
    }

    /// 触发关闭，若已被其他路径触发则返回 false / Fire; false if another path already did
    pub fn fire(&self, trigger: ShutdownTrigger) -> bool {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(tx) => {
                info!("Shutting down: {}", trigger);
                tx.send(trigger).is_ok()
            }
            None => {
                debug!("Shutdown already in progress, ignoring {}", trigger);
                false
            }
        }
    }

    /// 令牌是否已被消耗 / Whether the token has been consumed
    pub fn is_fired(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_none()
    }
}

/// 进程终止接口 / Process termination seam
pub trait Terminator: Send + Sync {
    fn terminate(&self, status: i32);
}

/// 真正结束进程 / Ends the process for real
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTerminator;

impl Terminator for ProcessTerminator {
    fn terminate(&self, status: i32) {
        std::process::exit(status);
    }
}

/// 关闭结果 / Shutdown outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownOutcome {
    pub trigger: ShutdownTrigger,
    pub status: i32,
}

/// 关闭协调器 / Shutdown coordinator
///
/// 刷写历史、恢复终端和退出只在 `shutdown` 中执行一次。
/// Flushing history, restoring the terminal and exiting happen exactly once, inside `shutdown`.
pub struct ShutdownCoordinator<T: Terminator = ProcessTerminator> {
    history: Arc<HistoryStore>,
    terminal: TerminalState,
    receiver: oneshot::Receiver<ShutdownTrigger>,
    handle: ShutdownHandle,
    terminator: T,
}

impl<T: Terminator> ShutdownCoordinator<T> {
    pub fn new(history: Arc<HistoryStore>, terminator: T) -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            history,
            terminal: TerminalState::detached(),
            receiver: rx,
            handle: ShutdownHandle::new(tx),
            terminator,
        }
    }

    /// 关闭时恢复的终端属性 / Terminal attributes to restore on shutdown
    pub fn with_terminal_state(mut self, terminal: TerminalState) -> Self {
        self.terminal = terminal;
        self
    }

    /// 获取一个可触发关闭的句柄 / Get a handle that can fire the shutdown
    pub fn handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// 启动信号监听任务 / Spawn the signal watcher task
    pub fn spawn_signal_watcher(&self) -> JoinHandle<()> {
        let handle = self.handle();
        tokio::spawn(async move {
            match wait_for_signal().await {
                Ok(name) => {
                    handle.fire(ShutdownTrigger::Signal(name));
                }
                Err(e) => error!("Failed to install signal handlers: {}", e),
            }
        })
    }

    /// 等待第一个触发，刷写历史并结束进程 / Await the first trigger, flush and terminate
    pub async fn shutdown(self) -> ShutdownOutcome {
        let trigger = match self.receiver.await {
            Ok(trigger) => trigger,
            Err(_) => {
                // 发送端随协调器存活，仅在异常情况下到达
                // Sender lives with us; unreachable in practice
                warn!("Shutdown token dropped without firing");
                ShutdownTrigger::EndOfInput
            }
        };

        let status = match &trigger {
            ShutdownTrigger::StartupFailed(msg) => {
                eprintln!("{}", msg);
                EXIT_FAILURE
            }
            _ => match clean_up(&self.history, &self.terminal) {
                Ok(()) => match &trigger {
                    ShutdownTrigger::ReadFailed(msg) => {
                        eprintln!("{}", msg);
                        EXIT_FAILURE
                    }
                    _ => EXIT_OK,
                },
                Err(e) => {
                    error!("Session clean-up failed: {}", e);
                    eprintln!("failed to properly clean up terminal: {}", e);
                    EXIT_CLEANUP_FAILURE
                }
            },
        };

        self.terminator.terminate(status);
        ShutdownOutcome { trigger, status }
    }
}

/// 刷写历史并恢复终端；两步都会执行 / Flush history and restore the terminal; both steps always run
fn clean_up(history: &HistoryStore, terminal: &TerminalState) -> ShellResult<()> {
    let flushed = history.flush();
    let restored = terminal.restore().map_err(ShellError::Terminal);

    let written = flushed?;
    debug!("Persisted {} history entries", written);
    restored?;
    Ok(())
}

/// 等待中断或终止信号 / Wait for an interrupt or termination signal
#[cfg(unix)]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sighup.recv() => "SIGHUP",
    };
    Ok(name)
}

/// 等待中断信号 / Wait for an interrupt signal
#[cfg(not(unix))]
pub async fn wait_for_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
