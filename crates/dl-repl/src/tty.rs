/*!
* 文件名: tty.rs
* 作者: JQQ
* 创建日期: 2025/12/19
* 最后修改日期: 2025/12/19
* 版权: 2023 JQQ. All rights reserved.
* 依赖: libc (unix)
* 描述: 终端属性的保存与恢复 / Saving and restoring terminal attributes
*/

use std::io;
use tracing::{debug, warn};

/// 会话开始时的终端属性快照 / Terminal attributes captured when the session starts
///
/// 行编辑器在读取期间把终端切到原始模式；信号路径直接结束进程时，
/// 编辑器自身的恢复逻辑不会运行，需要由关闭协调器恢复这里保存的属性。
/// The line editor switches the terminal to raw mode while reading. When a signal
/// ends the process, the editor never restores it, so the shutdown coordinator
/// restores the attributes saved here.
#[derive(Clone, Copy, Default)]
pub struct TerminalState {
    #[cfg(unix)]
    saved: Option<unix::Saved>,
}

impl std::fmt::Debug for TerminalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalState")
            .field("attached", &self.is_attached())
            .finish()
    }
}

impl TerminalState {
    /// 不关联任何终端 / Not attached to any terminal; restoring is a no-op
    pub fn detached() -> Self {
        Self::default()
    }

    /// 保存标准输入的终端属性；不是终端时返回未关联状态
    /// Capture stdin's attributes; detached when stdin is not a terminal
    pub fn capture_stdin() -> Self {
        #[cfg(unix)]
        {
            match Self::capture_fd(libc::STDIN_FILENO) {
                Ok(state) => state,
                Err(e) => {
                    warn!("Could not save terminal attributes: {}", e);
                    Self::detached()
                }
            }
        }
        #[cfg(not(unix))]
        {
            Self::detached()
        }
    }

    /// 保存指定描述符的终端属性 / Capture the attributes of the given descriptor
    #[cfg(unix)]
    pub fn capture_fd(fd: std::os::unix::io::RawFd) -> io::Result<Self> {
        let saved = unix::capture(fd)?;
        if saved.is_none() {
            debug!("fd {} is not a terminal, nothing to restore", fd);
        }
        Ok(Self { saved })
    }

    /// 是否保存了终端属性 / Whether attributes were captured
    pub fn is_attached(&self) -> bool {
        #[cfg(unix)]
        {
            self.saved.is_some()
        }
        #[cfg(not(unix))]
        {
            false
        }
    }

    /// 恢复保存的属性，返回是否实际执行了恢复
    /// Restore the saved attributes; true if anything was restored
    pub fn restore(&self) -> io::Result<bool> {
        #[cfg(unix)]
        {
            match &self.saved {
                Some(saved) => {
                    unix::restore(saved)?;
                    debug!("Restored terminal attributes");
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        #[cfg(not(unix))]
        {
            Ok(false)
        }
    }
}

#[cfg(unix)]
mod unix {
    use std::io;
    use std::mem::MaybeUninit;
    use std::os::unix::io::RawFd;

    #[derive(Clone, Copy)]
    pub(super) struct Saved {
        fd: RawFd,
        attrs: libc::termios,
    }

    pub(super) fn capture(fd: RawFd) -> io::Result<Option<Saved>> {
        // SAFETY: isatty only inspects the descriptor.
        if unsafe { libc::isatty(fd) } != 1 {
            return Ok(None);
        }

        let mut attrs = MaybeUninit::<libc::termios>::uninit();
        // SAFETY: tcgetattr fully initializes `attrs` when it returns 0.
        if unsafe { libc::tcgetattr(fd, attrs.as_mut_ptr()) } != 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: checked above.
        let attrs = unsafe { attrs.assume_init() };
        Ok(Some(Saved { fd, attrs }))
    }

    pub(super) fn restore(saved: &Saved) -> io::Result<()> {
        // SAFETY: `attrs` was produced by tcgetattr on the same descriptor.
        if unsafe { libc::tcsetattr(saved.fd, libc::TCSANOW, &saved.attrs) } != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

#[cfg(all(test, unix))]
pub(crate) mod pty {
    //! 测试用伪终端 / Pseudo-terminal pair for tests

    use std::ffi::CStr;
    use std::fs::{File, OpenOptions};
    use std::os::unix::io::{AsRawFd, FromRawFd};

    pub struct Pty {
        pub master: File,
        pub slave: File,
    }

    pub fn open() -> Pty {
        unsafe {
            let master = libc::posix_openpt(libc::O_RDWR | libc::O_NOCTTY);
            assert!(master >= 0, "posix_openpt failed");
            assert_eq!(libc::grantpt(master), 0);
            assert_eq!(libc::unlockpt(master), 0);
            let name = CStr::from_ptr(libc::ptsname(master))
                .to_str()
                .unwrap()
                .to_owned();
            let slave = OpenOptions::new()
                .read(true)
                .write(true)
                .open(name)
                .unwrap();
            Pty {
                master: File::from_raw_fd(master),
                slave,
            }
        }
    }

    pub fn local_flags(file: &File) -> libc::tcflag_t {
        unsafe {
            let mut attrs: libc::termios = std::mem::zeroed();
            assert_eq!(libc::tcgetattr(file.as_raw_fd(), &mut attrs), 0);
            attrs.c_lflag
        }
    }

    pub fn clear_local_flags(file: &File, flags: libc::tcflag_t) {
        unsafe {
            let mut attrs: libc::termios = std::mem::zeroed();
            assert_eq!(libc::tcgetattr(file.as_raw_fd(), &mut attrs), 0);
            attrs.c_lflag &= !flags;
            assert_eq!(libc::tcsetattr(file.as_raw_fd(), libc::TCSANOW, &attrs), 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_restore_is_noop() {
        let state = TerminalState::detached();
        assert!(!state.is_attached());
        assert!(!state.restore().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_regular_file_is_not_a_terminal() {
        use std::os::unix::io::AsRawFd;

        let file = tempfile::tempfile().unwrap();
        let state = TerminalState::capture_fd(file.as_raw_fd()).unwrap();
        assert!(!state.is_attached());
    }

    #[cfg(unix)]
    #[test]
    fn test_restore_undoes_raw_mode() {
        use std::os::unix::io::AsRawFd;

        let pty = pty::open();
        let cooked = pty::local_flags(&pty.slave);
        assert_ne!(cooked & libc::ECHO, 0);
        assert_ne!(cooked & libc::ICANON, 0);

        let state = TerminalState::capture_fd(pty.slave.as_raw_fd()).unwrap();
        assert!(state.is_attached());

        // 模拟行编辑器进入原始模式 / What the line editor does while reading
        pty::clear_local_flags(&pty.slave, libc::ECHO | libc::ICANON);
        assert_eq!(pty::local_flags(&pty.slave) & (libc::ECHO | libc::ICANON), 0);

        assert!(state.restore().unwrap());
        assert_eq!(pty::local_flags(&pty.slave), cooked);
    }
}
