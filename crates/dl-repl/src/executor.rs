/*!
* 文件名: executor.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/16
* 版权: 2023 JQQ. All rights reserved.
* 依赖: None
* 描述: 执行引擎接口 / Execution engine interface
*/

use crate::errors::ShellResult;

/// 分派结果 / Dispatch outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// 语句已执行 / Statement executed
    Complete,
    /// 语句不完整，需要续行 / Statement incomplete, more input needed
    Incomplete,
}

/// 执行引擎 / Execution engine
///
/// REPL不关心命令语义，也不定义续行语法；引擎通过返回 `Dispatch::Incomplete` 请求续行。
/// The shell knows no command vocabulary or continuation grammar; the engine asks for
/// more input by returning `Dispatch::Incomplete`.
pub trait Executor {
    fn execute(&mut self, command: &str, arguments: &str) -> ShellResult<Dispatch>;
}

impl<F> Executor for F
where
    F: FnMut(&str, &str) -> ShellResult<Dispatch>,
{
    fn execute(&mut self, command: &str, arguments: &str) -> ShellResult<Dispatch> {
        self(command, arguments)
    }
}
