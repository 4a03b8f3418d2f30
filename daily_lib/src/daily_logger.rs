use env_logger::{Builder, Env, Target};
use log::debug;
use stack_string::{format_sstr, StackString};
use std::{
    fs::{create_dir_all, remove_file, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use time::Date;

use crate::{daily_config::DailyConfig, errors::DailyError as Error};

/// Number of previous weekly log files kept next to the current one.
pub const LOG_BACKUP_COUNT: usize = 4;

/// Log file for the ISO week containing `date`, e.g. `2026-W43.log`.
#[must_use]
pub fn weekly_log_filename(date: Date) -> StackString {
    let (year, week, _) = date.to_iso_week_date();
    format_sstr!("{year:04}-W{week:02}.log")
}

fn is_weekly_log_file(fname: &str) -> bool {
    let Some(stem) = fname.strip_suffix(".log") else {
        return false;
    };
    let Some((year, week)) = stem.split_once("-W") else {
        return false;
    };
    year.len() == 4
        && week.len() == 2
        && year.bytes().all(|b| b.is_ascii_digit())
        && week.bytes().all(|b| b.is_ascii_digit())
}

/// Remove all weekly log files in `log_dir` except `current` and the
/// `keep` most recent others.
/// # Errors
/// Returns error if the directory can't be read or a file can't be removed
pub fn prune_log_files(
    log_dir: &Path,
    current: &str,
    keep: usize,
) -> Result<Vec<PathBuf>, Error> {
    let mut previous: Vec<StackString> = log_dir
        .read_dir()?
        .filter_map(|entry| {
            let fname: StackString = entry.ok()?.file_name().to_string_lossy().to_string().into();
            if is_weekly_log_file(&fname) && fname.as_str() != current {
                Some(fname)
            } else {
                None
            }
        })
        .collect();
    previous.sort_unstable_by(|a, b| b.cmp(a));

    previous
        .iter()
        .skip(keep)
        .map(|fname| {
            let path = log_dir.join(fname.as_str());
            remove_file(&path)?;
            Ok(path)
        })
        .collect()
}

struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Set up the process logger: records go to stderr and to the weekly log
/// file under `config.log_dir`. `RUST_LOG` overrides the default `info`
/// level. Returns the path of the log file in use.
/// # Errors
/// Returns error if the log directory or file can't be created, or if a
/// logger was already installed
pub fn init_logging(config: &DailyConfig) -> Result<PathBuf, Error> {
    create_dir_all(&config.log_dir)?;
    let fname = weekly_log_filename(config.today());
    let removed = prune_log_files(&config.log_dir, &fname, LOG_BACKUP_COUNT)?;

    let log_file = config.log_dir.join(fname.as_str());
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                buf.timestamp(),
                record.target(),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(TeeWriter { file })))
        .try_init()?;

    for path in removed {
        debug!("removed old log file {}", path.display());
    }
    Ok(log_file)
}

#[cfg(test)]
mod tests {
    use std::fs::{read_dir, File};
    use tempfile::TempDir;
    use time::macros::date;

    use crate::{
        daily_logger::{is_weekly_log_file, prune_log_files, weekly_log_filename},
        errors::DailyError as Error,
    };

    #[test]
    fn test_weekly_log_filename() {
        assert_eq!(weekly_log_filename(date!(2026 - 10 - 19)), "2026-W43.log");
        assert_eq!(weekly_log_filename(date!(2026 - 01 - 01)), "2026-W01.log");
        assert_eq!(weekly_log_filename(date!(2027 - 01 - 01)), "2026-W53.log");
    }

    #[test]
    fn test_is_weekly_log_file() {
        assert!(is_weekly_log_file("2026-W43.log"));
        assert!(!is_weekly_log_file("2026-W43.txt"));
        assert!(!is_weekly_log_file("notes.log"));
        assert!(!is_weekly_log_file("26-W4.log"));
    }

    #[test]
    fn test_prune_log_files() -> Result<(), Error> {
        let dir = TempDir::new()?;
        for week in 36..=43 {
            File::create(dir.path().join(format!("2026-W{week:02}.log")))?;
        }
        File::create(dir.path().join("keep_me.txt"))?;

        let removed = prune_log_files(dir.path(), "2026-W43.log", 4)?;
        assert_eq!(removed.len(), 3);

        let mut remaining: Vec<_> = read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        remaining.sort();
        assert_eq!(
            remaining,
            vec![
                "2026-W39.log",
                "2026-W40.log",
                "2026-W41.log",
                "2026-W42.log",
                "2026-W43.log",
                "keep_me.txt",
            ]
        );
        Ok(())
    }
}
