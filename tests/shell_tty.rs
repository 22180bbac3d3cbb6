// Enable the cli feature for tests
#![cfg(all(unix, feature = "cli"))]

/*!
* 文件名: shell_tty.rs
* 作者: JQQ
* 创建日期: 2025/12/19
* 最后修改日期: 2025/12/19
* 版权: 2023 JQQ. All rights reserved.
* 依赖: libc, tempfile
* 描述: 在伪终端上运行Shell的端到端测试 / End-to-end tests running the shell on a pseudo-terminal
*/

use std::ffi::CStr;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::tempdir;

const MODE_FLAGS: libc::tcflag_t = libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN;

struct Pty {
    master: File,
    slave: File,
}

fn open_pty() -> Pty {
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

fn mode_flags(file: &File) -> libc::tcflag_t {
    unsafe {
        let mut attrs: libc::termios = std::mem::zeroed();
        assert_eq!(libc::tcgetattr(file.as_raw_fd(), &mut attrs), 0);
        attrs.c_lflag & MODE_FLAGS
    }
}

/// 持续读取主端输出 / Keep draining whatever the shell writes to the terminal
fn drain(mut master: File) -> Arc<Mutex<String>> {
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = seen.clone();
    std::thread::spawn(move || {
        let mut buf = [0u8; 1024];
        while let Ok(n) = master.read(&mut buf) {
            if n == 0 {
                break;
            }
            sink.lock()
                .unwrap()
                .push_str(&String::from_utf8_lossy(&buf[..n]));
        }
    });
    seen
}

fn wait_until(what: &str, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(20);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for {}", what);
        std::thread::sleep(Duration::from_millis(20));
    }
}

#[test]
fn test_sigterm_restores_terminal_attributes() {
    let dir = tempdir().unwrap();
    let pty = open_pty();
    let cooked = mode_flags(&pty.slave);
    assert_ne!(cooked & libc::ECHO, 0);
    assert_ne!(cooked & libc::ICANON, 0);

    let mut keyboard = pty.master.try_clone().unwrap();
    let seen = drain(pty.master.try_clone().unwrap());

    let mut child = Command::new(env!("CARGO_BIN_EXE_site-intelligence"))
        .arg("--init")
        .current_dir(dir.path())
        .env_remove("DL_SITE_INTELLIGENCE_CFG")
        .env_remove("RUST_LOG")
        .env("TERM", "xterm")
        .stdin(Stdio::from(pty.slave.try_clone().unwrap()))
        .stdout(Stdio::from(pty.slave.try_clone().unwrap()))
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn site-intelligence");

    let prompts = |n: usize| {
        let seen = seen.clone();
        move || seen.lock().unwrap().matches("dl> ").count() >= n
    };
    wait_until("the first prompt", prompts(1));
    keyboard.write_all(b"g.V()\r").unwrap();
    wait_until("the second prompt", prompts(2));

    // 等待行编辑器进入原始模式 / The editor holds the terminal raw while it waits for input
    wait_until("raw mode", || mode_flags(&pty.slave) & libc::ECHO == 0);

    let killed = Command::new("kill")
        .arg("-TERM")
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(killed.success());

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0));
    assert_eq!(mode_flags(&pty.slave), cooked);

    let history = std::fs::read_to_string(dir.path().join(".datalake_history")).unwrap();
    assert_eq!(history, "g.V()\n");
}
