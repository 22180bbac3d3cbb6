/*!
* 文件名: repl.rs
* 作者: JQQ
* 创建日期: 2025/12/15
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: tracing
* 描述: REPL实现 / REPL implementation
*/

use std::io::Write;
use tracing::{debug, warn};

use crate::errors::ShellResult;
use crate::executor::{Dispatch, Executor};
use crate::shutdown::{ShutdownHandle, ShutdownTrigger};
use crate::terminal::{Input, LineReader, TerminalSession};
use crate::tokenizer::split_line;

/// 驱动状态 / Driver stage
#[derive(Debug)]
enum Stage {
    Reading,
    Dispatching(String),
    Exiting(ShellResult<()>),
}

/// 空行和注释行不触发分派 / Blank and comment lines are never dispatched
pub fn is_noop(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#')
}

/// REPL / REPL
pub struct Repl<R: LineReader, E: Executor> {
    /// 终端会话 / Terminal session
    term: TerminalSession<R>,
    /// 执行引擎 / Execution engine
    executor: E,
    /// 关闭令牌 / Shutdown token
    shutdown: ShutdownHandle,
    errors: Box<dyn Write + Send>,
}

impl<R: LineReader, E: Executor> Repl<R, E> {
    /// 创建新的REPL / Create new REPL
    pub fn new(term: TerminalSession<R>, executor: E, shutdown: ShutdownHandle) -> Self {
        Self {
            term,
            executor,
            shutdown,
            errors: Box::new(std::io::stderr()),
        }
    }

    /// 替换错误输出流 / Replace the error stream
    pub fn with_error_output(mut self, errors: Box<dyn Write + Send>) -> Self {
        self.errors = errors;
        self
    }

    /// 运行REPL直到输入结束或读取失败 / Run until end of input or a read failure
    ///
    /// 退出时触发关闭令牌，由协调器负责唯一一次刷写。
    /// On exit the shutdown token is fired; the coordinator performs the one flush.
    pub fn run(mut self) -> ShellResult<()> {
        let mut stage = Stage::Reading;
        loop {
            stage = match stage {
                Stage::Reading => self.read(),
                Stage::Dispatching(statement) => self.dispatch(&statement),
                Stage::Exiting(result) => return self.exit(result),
            };
        }
    }

    fn read(&mut self) -> Stage {
        match self.term.prompt() {
            Ok(Input::Line(line)) => {
                if is_noop(&line) {
                    return Stage::Reading;
                }
                Stage::Dispatching(self.term.accumulate(line.trim()).to_string())
            }
            Ok(Input::Interrupted) => {
                self.term.reset();
                Stage::Reading
            }
            Ok(Input::Eof) => Stage::Exiting(Ok(())),
            Err(e) => Stage::Exiting(Err(e)),
        }
    }

    fn dispatch(&mut self, statement: &str) -> Stage {
        let (command, arguments) = split_line(statement);
        match self.executor.execute(command, arguments) {
            Ok(Dispatch::Complete) => self.term.complete(),
            Ok(Dispatch::Incomplete) => self.term.continue_statement(),
            Err(e) => {
                warn!("Command {:?} failed: {}", command, e);
                writeln!(self.errors, "{}", e).ok();
                self.term.reset();
            }
        }
        Stage::Reading
    }

    fn exit(self, result: ShellResult<()>) -> ShellResult<()> {
        let trigger = match &result {
            Ok(()) => ShutdownTrigger::EndOfInput,
            Err(e) => ShutdownTrigger::ReadFailed(e.to_string()),
        };
        if !self.shutdown.fire(trigger) {
            debug!("Shutdown already claimed by another path");
        }
        result
    }
}

impl<R: LineReader, E: Executor> Repl<R, E> {
    /// 当前会话 / Current session
    pub fn session(&self) -> &TerminalSession<R> {
        &self.term
    }
}
