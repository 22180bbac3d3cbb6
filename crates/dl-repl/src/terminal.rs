/*!
* 文件名: terminal.rs
* 作者: JQQ
* 创建日期: 2025/12/16
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: rustyline, tracing
* 描述: 终端会话与提示符状态 / Terminal session and prompt state
*/

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tracing::{debug, info};

use crate::errors::{HistoryError, ShellResult};
use crate::history::HistoryStore;

/// 主提示符 / Primary prompt
pub const PS1: &str = "dl> ";
/// 续行提示符 / Continuation prompt
pub const PS2: &str = "...     ";

/// 提示符状态 / Prompt state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptState {
    #[default]
    Primary,
    Continuation,
}

impl PromptState {
    pub fn text(&self) -> &'static str {
        match self {
            PromptState::Primary => PS1,
            PromptState::Continuation => PS2,
        }
    }
}

impl fmt::Display for PromptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptState::Primary => write!(f, "primary"),
            PromptState::Continuation => write!(f, "continuation"),
        }
    }
}

/// 一次读取的结果 / Outcome of one read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// 完整的一行 / A submitted line
    Line(String),
    /// 编辑时按下 Ctrl-C / Ctrl-C while editing
    Interrupted,
    /// 输入结束 / End of input
    Eof,
}

/// 行读取接口 / Line reading surface
pub trait LineReader {
    /// 阻塞直到读到一行、EOF或中断 / Block until a line, EOF or an interrupt
    fn read_line(&mut self, prompt: &str) -> ShellResult<Input>;

    /// 加入行编辑器的回溯缓冲 / Add to the editor's recall buffer
    fn add_history(&mut self, _line: &str) {}
}

/// 基于 rustyline 的行读取器 / rustyline-backed line reader
pub struct EditorReader {
    editor: Editor<(), DefaultHistory>,
}

impl EditorReader {
    pub fn new() -> ShellResult<Self> {
        let editor = Editor::<(), DefaultHistory>::new()?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> ShellResult<Input> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(Input::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
            Err(ReadlineError::Eof) => Ok(Input::Eof),
            Err(err) => Err(err.into()),
        }
    }

    fn add_history(&mut self, line: &str) {
        // 回溯缓冲只是便利功能，失败可忽略 / Recall is a convenience, failures are ignored
        self.editor.add_history_entry(line).ok();
    }
}

/// 终端会话 / Terminal session
///
/// 持有行读取器、历史存储引用以及提示符状态机。
/// Owns the line reader, a handle to the history store and the prompt state machine.
pub struct TerminalSession<R: LineReader> {
    reader: R,
    history: Arc<HistoryStore>,
    state: PromptState,
    /// 续行时累积的语句 / Statement accumulated across continuation lines
    buffer: String,
    out: Box<dyn Write + Send>,
}

impl<R: LineReader> TerminalSession<R> {
    /// 创建会话 / Create a session
    pub fn new(reader: R, history: Arc<HistoryStore>) -> Self {
        Self {
            reader,
            history,
            state: PromptState::Primary,
            buffer: String::new(),
            out: Box::new(std::io::stdout()),
        }
    }

    /// 替换输出流 / Replace the output stream
    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    /// 加载历史文件并回填行编辑器 / Load the history file and seed the editor
    ///
    /// 文件不存在不是错误 / A missing file is not an error
    pub fn open(&mut self) -> ShellResult<usize> {
        match self.history.load() {
            Ok(count) => {
                for entry in self.history.entries() {
                    self.reader.add_history(&entry);
                }
                Ok(count)
            }
            Err(HistoryError::NotFound { path }) => {
                writeln!(self.out, "creating new history file: {:?}", path)?;
                info!("History file {:?} not found, starting with empty history", path);
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 当前提示符状态 / Current prompt state
    pub fn state(&self) -> PromptState {
        self.state
    }

    /// 当前累积的语句 / Currently accumulated statement
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    /// 显示提示符并读取一行 / Show the prompt and read one line
    ///
    /// 每行在切分前即写入历史。EOF时输出换行。
    /// Every line is recorded before it is tokenized. A newline is emitted on EOF.
    pub fn prompt(&mut self) -> ShellResult<Input> {
        let input = self.reader.read_line(self.state.text())?;
        match &input {
            Input::Line(line) => {
                self.history.record(line.as_str());
                self.reader.add_history(line);
            }
            Input::Eof => {
                writeln!(self.out)?;
                self.out.flush()?;
            }
            Input::Interrupted => {}
        }
        Ok(input)
    }

    /// 将一行并入当前语句，返回完整语句 / Append a line to the pending statement
    pub fn accumulate(&mut self, line: &str) -> &str {
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
        &self.buffer
    }

    /// 语句完整，回到主提示符 / Statement complete, back to the primary prompt
    pub fn complete(&mut self) {
        self.buffer.clear();
        self.transition(PromptState::Primary);
    }

    /// 语句未完成，进入续行 / Statement incomplete, continue on the next line
    pub fn continue_statement(&mut self) {
        self.transition(PromptState::Continuation);
    }

    /// 丢弃未完成的语句 / Discard the pending statement
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            debug!("Discarding partial statement ({} bytes)", self.buffer.len());
        }
        self.complete();
    }

    fn transition(&mut self, next: PromptState) {
        if self.state != next {
            debug!("Prompt state: {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

/// 无需终端的脚本化读取器 / Scripted reader that needs no terminal
///
/// 从预先给定的输入序列读取，供测试驱动会话；管道输入仍走 `EditorReader`。
/// Reads from a fixed sequence of inputs so tests can drive a session; piped stdin
/// still goes through `EditorReader`.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    inputs: std::collections::VecDeque<ShellResult<Input>>,
    /// 每次读取时显示的提示符 / Prompt shown for each read
    pub prompts: Vec<String>,
    /// 加入回溯缓冲的条目 / Entries pushed into the recall buffer
    pub recalled: Vec<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inputs: lines.into_iter().map(|l| Ok(Input::Line(l.into()))).collect(),
            prompts: Vec::new(),
            recalled: Vec::new(),
        }
    }

    /// 追加一个读取结果 / Queue one more read outcome
    pub fn then(mut self, input: ShellResult<Input>) -> Self {
        self.inputs.push_back(input);
        self
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, prompt: &str) -> ShellResult<Input> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().unwrap_or(Ok(Input::Eof))
    }

    fn add_history(&mut self, line: &str) {
        self.recalled.push(line.to_string());
    }
}

impl<R: LineReader> LineReader for &mut R {
    fn read_line(&mut self, prompt: &str) -> ShellResult<Input> {
        (**self).read_line(prompt)
    }

    fn add_history(&mut self, line: &str) {
        (**self).add_history(line)
    }
}
