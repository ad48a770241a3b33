use std::{fs::{self, File}, io::{self, Write}, path::Path};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Mirror every log record to stderr and, when provided, a plain-text file.
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

pub struct Logger;

impl Logger {
    /// Initialize the global logger.
    ///
    /// # Arguments
    /// - `verbosity`: `0 => Error ... 4+ => Trace` (see `u8_to_loglevel`)
    /// - `logfile`  : optional path of a file receiving a copy of every record.
    ///                Parent directories are created when missing.
    ///
    /// # Errors
    /// - when `logfile` cannot be created.
    /// - when a global logger was already set.
    pub fn init(verbosity: u8, logfile: Option<impl AsRef<Path>>) -> Result<()> {
        let log_level = Self::u8_to_loglevel(verbosity);
        let env       = Env::default().filter("SNPSEA_LOG");

        let file = match logfile {
            Some(path) => {
                let path = path.as_ref();
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
                }
                let file = File::create(path)
                    .with_context(|| format!("Failed to create log file '{}'", path.display()))?;
                Some(file)
            }
            None => None,
        };

        Builder::new()
            .filter_level(log_level)
            .format(|buf, record| {
                let traceback = if record.level() == LevelFilter::Error {
                    format!("(@ {}:{}) ", record.file().unwrap_or("unknown"), record.line().unwrap_or(0))
                } else {
                    String::new()
                };
                writeln!(
                    buf,
                    "[{} {: <5} {}] {traceback}{}",
                    chrono::Local::now().format("%Y-%m-%dT%H:%M:%S"),
                    record.level(),
                    record.target(),
                    record.args()
                )
            })
            .target(Target::Pipe(Box::new(Tee { file })))
            .parse_env(env)
            .try_init()
            .context("Failed to set the global logger")?;
        Ok(())
    }

    fn u8_to_loglevel(verbosity: u8) -> LevelFilter {
        match verbosity {
            0            => LevelFilter::Error,
            1            => LevelFilter::Warn,
            2            => LevelFilter::Info,
            3            => LevelFilter::Debug,
            4..= u8::MAX => LevelFilter::Trace
        }
    }

    pub fn set_level(verbosity: u8) {
        log::set_max_level(Self::u8_to_loglevel(verbosity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        // Another test may have already set the global logger.
        let _ = Logger::init(0, Some(&tmpdir.path().join("log.txt")));
        for level in 0..u8::MAX {
            Logger::set_level(level);

            let expected_level = match level {
                0           => LevelFilter::Error,
                1           => LevelFilter::Warn,
                2           => LevelFilter::Info,
                3           => LevelFilter::Debug,
                4..=u8::MAX => LevelFilter::Trace
            };

            assert_eq!(log::max_level(), expected_level);
        }
        Ok(())
    }

    #[test]
    fn logfile_created_with_parents() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path   = tmpdir.path().join("nested/dir/log.txt");
        // A second global init fails, but the file must exist regardless.
        let _ = Logger::init(2, Some(&path));
        assert!(path.exists());
        Ok(())
    }
}
