// src/cli.rs
use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use thiserror::Error;

use crate::config::options::RunOptions;
use crate::logging::{default_log_level, normalize_level};
use crate::progress::Progress;

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(&'static str),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("unknown arg: {0}")]
    Unknown(String),
}

/// Parsed command line for a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliArgs {
    pub options: RunOptions,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
    pub quiet: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            options: RunOptions::default(),
            log_level: default_log_level(),
            log_dir: None,
            quiet: false,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Run(CliArgs),
    Help,
}

/// Parse arguments (program name already stripped).
pub fn parse_args<I>(args: I) -> Result<Command, ArgsError>
where
    I: IntoIterator<Item = String>,
{
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(a) = args.next() {
        match a.as_str() {
            "--root" => cli.options.paths.root = PathBuf::from(value(&mut args, "--root")?),
            "--data-dir" => cli.options.paths.data_dir = PathBuf::from(value(&mut args, "--data-dir")?),
            "--tmp-dir" => cli.options.paths.tmp_dir = PathBuf::from(value(&mut args, "--tmp-dir")?),
            "--archive" => {
                let v = value(&mut args, "--archive")?;
                if v.trim().is_empty() || v.contains(['/', '\\']) {
                    return Err(ArgsError::InvalidValue { flag: "--archive", value: v });
                }
                cli.options.paths.archive_file = v;
            }
            "--timeout" => {
                let v = value(&mut args, "--timeout")?;
                let secs: u64 = match v.parse() {
                    Ok(n) if n > 0 => n,
                    _ => return Err(ArgsError::InvalidValue { flag: "--timeout", value: v }),
                };
                cli.options.timeout = Duration::from_secs(secs);
            }
            "--log-level" => {
                let v = value(&mut args, "--log-level")?;
                cli.log_level = normalize_level(&v)
                    .map_err(|_| ArgsError::InvalidValue { flag: "--log-level", value: v })?;
            }
            "--log-dir" => cli.log_dir = Some(PathBuf::from(value(&mut args, "--log-dir")?)),
            "-q" | "--quiet" => cli.quiet = true,
            "-h" | "--help" => return Ok(Command::Help),
            _ => return Err(ArgsError::Unknown(a)),
        }
    }

    Ok(Command::Run(cli))
}

fn value<I: Iterator<Item = String>>(args: &mut I, flag: &'static str) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue(flag))
}

/// Prints one line per source and a closing summary to the given writer.
pub struct ConsoleProgress<W: Write> {
    out: W,
    total: usize,
    failed: usize,
}

impl ConsoleProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out, total: 0, failed: 0 }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    // Console output is best effort; a closed stdout must not fail the run.
    fn line(&mut self, msg: &str) {
        let _ = writeln!(self.out, "{msg}");
    }
}

impl<W: Write> Progress for ConsoleProgress<W> {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.line(&format!("Checking {total} feeds"));
    }

    fn log(&mut self, msg: &str) {
        self.line(msg);
    }

    fn item_done(&mut self, index: usize, entries: usize) {
        self.line(&format!("  feed {}/{}: {entries} entries", index + 1, self.total));
    }

    fn item_failed(&mut self, index: usize, reason: &str) {
        self.failed += 1;
        self.line(&format!("  feed {}/{}: skipped ({reason})", index + 1, self.total));
    }

    fn finish(&mut self) {
        if self.failed > 0 {
            self.line(&format!("{} of {} feeds failed", self.failed, self.total));
        }
        let _ = self.out.flush();
    }
}
