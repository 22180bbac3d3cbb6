/*!
* 文件名: engine.rs
* 作者: JQQ
* 创建日期: 2025/12/17
* 最后修改日期: 2025/12/18
* 版权: 2023 JQQ. All rights reserved.
* 依赖: dl-repl, serde_json, url, tracing
* 描述: 内置查询引擎 / Bundled query engine
*/

use std::io::Write;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use dl_repl::{Dispatch, Executor, ShellError, ShellResult};

use crate::config::Config;
use crate::errors::DbError;
use crate::storage;

/// 内置查询引擎 / Bundled query engine
pub struct QueryEngine {
    config: Config,
    out: Box<dyn Write + Send>,
}

impl QueryEngine {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            out: Box::new(std::io::stdout()),
        }
    }

    pub fn with_output(mut self, out: Box<dyn Write + Send>) -> Self {
        self.out = out;
        self
    }

    /// 显示帮助信息 / Show help
    fn show_help(&mut self) -> ShellResult<()> {
        writeln!(self.out, "Commands:")?;
        writeln!(self.out, "  :help          show this help")?;
        writeln!(self.out, "  :config        show the active configuration")?;
        writeln!(self.out, "  :urls          list the base URLs to scan")?;
        writeln!(
            self.out,
            "  <query>        run a query; unclosed brackets continue on the next line"
        )?;
        Ok(())
    }

    /// 显示当前配置 / Show the active configuration
    fn show_config(&mut self) -> ShellResult<()> {
        let json = serde_json::to_string_pretty(&self.config).map_err(DbError::from)?;
        writeln!(self.out, "{}", json)?;
        Ok(())
    }

    /// 列出基础URL / List base URLs
    fn list_urls(&mut self) -> ShellResult<()> {
        let Some(path) = self.config.url_file.clone() else {
            return Err(ShellError::command("no URL file configured (use --url-file)"));
        };
        let content = std::fs::read_to_string(&path).map_err(|e| DbError::io(&path, e))?;

        let mut valid = 0usize;
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Url::parse(line) {
                Ok(url) => {
                    valid += 1;
                    writeln!(self.out, "  {}", url)?;
                }
                Err(e) => {
                    warn!("Skipping invalid URL {:?} in {:?}: {}", line, path, e);
                    writeln!(self.out, "  invalid: {} ({})", line, e)?;
                }
            }
        }
        writeln!(
            self.out,
            "{} base URLs, redirect depth {}",
            valid, self.config.url_depth
        )?;
        Ok(())
    }

    /// 执行查询 / Run a query
    fn run_query(&mut self, query: &str) -> ShellResult<()> {
        storage::open(&self.config.database_path)?;

        let started = Instant::now();
        debug!("Running query: {}", query);
        writeln!(self.out)?;
        writeln!(
            self.out,
            "Elapsed time: {} ms\n",
            started.elapsed().as_secs_f64() * 1e3
        )?;
        Ok(())
    }
}

impl Executor for QueryEngine {
    fn execute(&mut self, command: &str, arguments: &str) -> ShellResult<Dispatch> {
        match command {
            ":help" | ":h" => self.show_help()?,
            ":config" => self.show_config()?,
            ":urls" => self.list_urls()?,
            _ if command.starts_with(':') => {
                return Err(ShellError::command(format!("unknown command {}", command)));
            }
            _ => {
                let query = format!("{}{}", command, arguments);
                if !is_complete(&query) {
                    return Ok(Dispatch::Incomplete);
                }
                self.run_query(&query)?;
            }
        }
        Ok(Dispatch::Complete)
    }
}

/// 括号与字符串是否闭合 / Whether brackets and strings are closed
pub fn is_complete(query: &str) -> bool {
    let mut depth = 0i64;
    let mut in_string = false;
    let mut escaped = false;

    for c in query.chars() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    !in_string && depth <= 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn engine(config: Config) -> (QueryEngine, Captured) {
        let out = Captured::default();
        (QueryEngine::new(config).with_output(Box::new(out.clone())), out)
    }

    fn initialized(dir: &Path) -> Config {
        let config = Config {
            database_path: dir.join("db"),
            ..Config::default()
        };
        storage::init(&config).unwrap();
        config
    }

    #[test]
    fn test_is_complete() {
        assert!(is_complete("g.V().All()"));
        assert!(is_complete(""));
        assert!(!is_complete("g.V("));
        assert!(!is_complete("{ \"a\": [1, 2"));
        assert!(is_complete("\"(\""));
        assert!(!is_complete("\"unterminated"));
        assert!(is_complete("\"esc \\\" (\""));
    }

    #[test]
    fn test_open_bracket_requests_continuation() {
        let dir = tempdir().unwrap();
        let (mut engine, _) = engine(initialized(dir.path()));

        assert_eq!(engine.execute("g.V(", "").unwrap(), Dispatch::Incomplete);
        assert_eq!(
            engine.execute("g.V(", "\n\"x\")").unwrap(),
            Dispatch::Complete
        );
    }

    #[test]
    fn test_query_requires_initialized_database() {
        let dir = tempdir().unwrap();
        let (mut engine, _) = engine(Config {
            database_path: dir.path().join("missing"),
            ..Config::default()
        });

        let err = engine.execute("g.V()", "").unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[test]
    fn test_query_reports_elapsed_time() {
        let dir = tempdir().unwrap();
        let (mut engine, out) = engine(initialized(dir.path()));

        engine.execute("g.V()", ".All()").unwrap();
        let text = out.text();
        assert!(text.starts_with("\nElapsed time: "), "{:?}", text);
        assert!(text.ends_with(" ms\n\n"), "{:?}", text);
    }

    #[test]
    fn test_failed_query_reports_no_elapsed_time() {
        let dir = tempdir().unwrap();
        let (mut engine, out) = engine(Config {
            database_path: dir.path().join("missing"),
            ..Config::default()
        });

        assert!(engine.execute("g.V()", "").is_err());
        assert!(out.text().is_empty());
    }

    #[test]
    fn test_list_urls_validates_entries() {
        let dir = tempdir().unwrap();
        let urls = dir.path().join("urls.txt");
        std::fs::write(
            &urls,
            "# seeds\nhttps://example.com/\n\nnot a url\nhttp://example.org/a\n",
        )
        .unwrap();

        let (mut engine, out) = engine(Config {
            url_file: Some(urls),
            url_depth: 2,
            ..Config::default()
        });
        assert_eq!(engine.execute(":urls", "").unwrap(), Dispatch::Complete);

        let text = out.text();
        assert!(text.contains("https://example.com/"));
        assert!(text.contains("invalid: not a url"));
        assert!(text.contains("2 base URLs, redirect depth 2"));
    }

    #[test]
    fn test_list_urls_without_file() {
        let (mut engine, _) = engine(Config::default());
        assert!(engine.execute(":urls", "").is_err());
    }

    #[test]
    fn test_meta_commands() {
        let (mut engine, out) = engine(Config::default());

        engine.execute(":help", "").unwrap();
        engine.execute(":config", "").unwrap();
        assert!(out.text().contains("\"history_file\": \".datalake_history\""));

        let err = engine.execute(":bogus", " x").unwrap_err();
        assert!(matches!(err, ShellError::Command(_)));
    }
}
