#![deny(missing_docs)]

//! # Writer
//!
//! Writes generated Go sources to disk, asking before overwriting, and runs
//! the source formatter on every written file.
//!
//! Prompting and formatting sit behind traits so tests run without a
//! terminal or a Go toolchain.

use crate::error::{AppError, AppResult};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::{info, warn};

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Leave existing files alone.
    CreateIfAbsent,
    /// Ask the [`OverwritePrompt`].
    #[default]
    PromptBeforeOverwrite,
    /// Always replace.
    Overwrite,
}

/// A rendered file waiting to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Destination.
    pub path: PathBuf,
    /// Full file content.
    pub body: String,
    /// Existing-file policy.
    pub policy: WritePolicy,
}

/// Result of writing one [`GeneratedFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file did not exist and was created.
    Created(PathBuf),
    /// The file existed and was replaced.
    Overwritten(PathBuf),
    /// The file existed and was left untouched.
    Skipped(PathBuf),
}

impl WriteOutcome {
    /// Path the outcome refers to.
    pub fn path(&self) -> &Path {
        match self {
            WriteOutcome::Created(p) | WriteOutcome::Overwritten(p) | WriteOutcome::Skipped(p) => p,
        }
    }
}

/// Asks whether an existing file may be replaced.
pub trait OverwritePrompt {
    /// True to overwrite `path`.
    fn confirm_overwrite(&mut self, path: &Path) -> AppResult<bool>;
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl OverwritePrompt for FixedAnswer {
    fn confirm_overwrite(&mut self, _path: &Path) -> AppResult<bool> {
        Ok(self.0)
    }
}

const YES: [&str; 5] = ["y", "Y", "yes", "Yes", "YES"];
const NO: [&str; 5] = ["n", "N", "no", "No", "NO"];

/// Interactive `[Yes|No]` prompt.
///
/// Unrecognized answers re-ask; end of input counts as no.
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl StdinPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Prompt reading the process stdin and writing to stderr.
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    /// Prompt over arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> OverwritePrompt for StdinPrompt<R, W> {
    fn confirm_overwrite(&mut self, path: &Path) -> AppResult<bool> {
        write!(
            self.output,
            "'{}' already exists. Do you want to overwrite it? [Yes|No] ",
            path.display()
        )?;
        self.output.flush()?;

        loop {
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            let answer = line.trim();
            if YES.contains(&answer) {
                return Ok(true);
            }
            if NO.contains(&answer) {
                return Ok(false);
            }
            writeln!(self.output, "Please type yes or no and then press enter:")?;
            self.output.flush()?;
        }
    }
}

/// Runs an external program.
///
/// Abstracted so formatter tests do not need the program installed.
pub trait CommandExecutor {
    /// Executes `program` with `args` and returns its output.
    fn execute(&self, program: &str, args: &[&str]) -> AppResult<Output>;
}

/// Executor backed by `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellExecutor;

impl CommandExecutor for ShellExecutor {
    fn execute(&self, program: &str, args: &[&str]) -> AppResult<Output> {
        let output = Command::new(program).args(args).output()?;
        Ok(output)
    }
}

/// Reformats a written source file in place.
pub trait SourceFormatter {
    /// Formats `path`.
    fn format(&self, path: &Path) -> AppResult<()>;
}

/// `gofmt -w <file>`.
pub struct GoFmt<E: CommandExecutor = ShellExecutor> {
    program: String,
    executor: E,
}

impl GoFmt {
    /// Formatter running `program` (normally `gofmt`) from `PATH`.
    pub fn new(program: impl Into<String>) -> Self {
        Self::with_executor(program, ShellExecutor)
    }
}

impl<E: CommandExecutor> GoFmt<E> {
    /// Formatter using a custom executor.
    pub fn with_executor(program: impl Into<String>, executor: E) -> Self {
        Self {
            program: program.into(),
            executor,
        }
    }
}

impl<E: CommandExecutor> SourceFormatter for GoFmt<E> {
    fn format(&self, path: &Path) -> AppResult<()> {
        let target = path.to_string_lossy();
        let output = self.executor.execute(&self.program, &["-w", &target])?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::General(format!(
                "{} failed with status {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

/// Leaves files as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFormatter;

impl SourceFormatter for NoopFormatter {
    fn format(&self, _path: &Path) -> AppResult<()> {
        Ok(())
    }
}

/// Writes one file according to its policy, then formats it.
///
/// A declined overwrite is [`WriteOutcome::Skipped`]; a formatter failure is
/// only a warning.
pub fn write_generated(
    file: &GeneratedFile,
    prompt: &mut dyn OverwritePrompt,
    formatter: &dyn SourceFormatter,
) -> AppResult<WriteOutcome> {
    let path = &file.path;
    let exists = path.exists();

    if exists {
        let replace = match file.policy {
            WritePolicy::Overwrite => true,
            WritePolicy::CreateIfAbsent => false,
            WritePolicy::PromptBeforeOverwrite => prompt.confirm_overwrite(path)?,
        };
        if !replace {
            warn!("Skipped create file '{}'", path.display());
            return Ok(WriteOutcome::Skipped(path.clone()));
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &file.body)?;
    info!("create {}", path.display());

    if let Err(e) = formatter.format(path) {
        warn!("Could not format '{}': {}", path.display(), e);
    }

    Ok(if exists {
        WriteOutcome::Overwritten(path.clone())
    } else {
        WriteOutcome::Created(path.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;
    use tempfile::tempdir;

    struct MockExecutor {
        last_command: RefCell<Option<(String, Vec<String>)>>,
        should_fail: bool,
    }

    impl MockExecutor {
        fn new(should_fail: bool) -> Self {
            Self {
                last_command: RefCell::new(None),
                should_fail,
            }
        }
    }

    impl CommandExecutor for &MockExecutor {
        fn execute(&self, program: &str, args: &[&str]) -> AppResult<Output> {
            self.last_command.borrow_mut().replace((
                program.to_string(),
                args.iter().map(|s| s.to_string()).collect(),
            ));
            Ok(Output {
                status: ExitStatus::from_raw(if self.should_fail { 256 } else { 0 }),
                stdout: Vec::new(),
                stderr: if self.should_fail {
                    b"syntax error".to_vec()
                } else {
                    Vec::new()
                },
            })
        }
    }

    fn file(path: PathBuf, body: &str, policy: WritePolicy) -> GeneratedFile {
        GeneratedFile {
            path,
            body: body.into(),
            policy,
        }
    }

    #[test]
    fn test_create_then_policies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("validator/user_valid.go");

        let out = write_generated(
            &file(path.clone(), "v1", WritePolicy::PromptBeforeOverwrite),
            &mut FixedAnswer(false),
            &NoopFormatter,
        )
        .unwrap();
        assert_eq!(out, WriteOutcome::Created(path.clone()));

        let out = write_generated(
            &file(path.clone(), "v2", WritePolicy::PromptBeforeOverwrite),
            &mut FixedAnswer(false),
            &NoopFormatter,
        )
        .unwrap();
        assert_eq!(out, WriteOutcome::Skipped(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v1");

        let out = write_generated(
            &file(path.clone(), "v3", WritePolicy::CreateIfAbsent),
            &mut FixedAnswer(true),
            &NoopFormatter,
        )
        .unwrap();
        assert!(matches!(out, WriteOutcome::Skipped(_)));

        let out = write_generated(
            &file(path.clone(), "v4", WritePolicy::Overwrite),
            &mut FixedAnswer(false),
            &NoopFormatter,
        )
        .unwrap();
        assert_eq!(out, WriteOutcome::Overwritten(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "v4");
    }

    #[test]
    fn test_stdin_prompt_reasks() {
        let mut output = Vec::new();
        let mut prompt = StdinPrompt::new(Cursor::new("maybe\nYes\n"), &mut output);
        assert!(prompt.confirm_overwrite(Path::new("a.go")).unwrap());

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("'a.go' already exists"));
        assert!(text.contains("Please type yes or no"));
    }

    #[test]
    fn test_stdin_prompt_no_and_eof() {
        let mut prompt = StdinPrompt::new(Cursor::new("NO\n"), Vec::new());
        assert!(!prompt.confirm_overwrite(Path::new("a.go")).unwrap());

        let mut prompt = StdinPrompt::new(Cursor::new(""), Vec::new());
        assert!(!prompt.confirm_overwrite(Path::new("a.go")).unwrap());
    }

    #[test]
    fn test_gofmt_invocation() {
        let executor = MockExecutor::new(false);
        let formatter = GoFmt::with_executor("gofmt", &executor);
        formatter.format(Path::new("/tmp/x.go")).unwrap();

        let (program, args) = executor.last_command.take().unwrap();
        assert_eq!(program, "gofmt");
        assert_eq!(args, vec!["-w".to_string(), "/tmp/x.go".to_string()]);
    }

    #[test]
    fn test_formatter_failure_is_not_fatal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.go");
        let executor = MockExecutor::new(true);
        let formatter = GoFmt::with_executor("gofmt", &executor);

        let err = formatter.format(&path).unwrap_err();
        assert!(err.to_string().contains("syntax error"));

        let out = write_generated(
            &file(path.clone(), "package validator\n", WritePolicy::Overwrite),
            &mut FixedAnswer(true),
            &formatter,
        )
        .unwrap();
        assert_eq!(out, WriteOutcome::Created(path));
    }
}
