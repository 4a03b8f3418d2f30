use log::warn;
use std::fs::{read_to_string, File};
use tempfile::TempDir;

use daily_lib::{
    daily_config::{DailyConfig, DailyConfigInner},
    daily_logger::{init_logging, weekly_log_filename},
    errors::DailyError as Error,
};

#[test]
fn test_init_logging() -> Result<(), Error> {
    let dir = TempDir::new()?;
    for week in 1..=6 {
        File::create(dir.path().join(format!("2020-W{week:02}.log")))?;
    }
    let log_dir = dir.path().to_string_lossy().to_string();
    let lookup = |key: &str| match key {
        "NOTION_TOKEN" => Some("secret_abc".to_string()),
        "TEMPLATE_PAGE_ID" => Some("template".to_string()),
        "DAILY_DATABASE_ID" => Some("daily-db".to_string()),
        "LOG_DIR" => Some(log_dir.clone()),
        "TIMEZONE" => Some("UTC".to_string()),
        _ => None,
    };
    let config = DailyConfig::from_inner(DailyConfigInner::new().from_lookup(lookup))?;

    let log_file = init_logging(&config)?;
    assert_eq!(
        log_file,
        dir.path().join(weekly_log_filename(config.today()).as_str())
    );
    assert!(!dir.path().join("2020-W01.log").exists());
    assert!(!dir.path().join("2020-W02.log").exists());
    assert!(dir.path().join("2020-W03.log").exists());

    warn!("written to the weekly file");
    log::logger().flush();
    let contents = read_to_string(&log_file)?;
    assert!(contents.contains(" - test_daily_logger - WARN - written to the weekly file"));

    assert!(matches!(
        init_logging(&config),
        Err(Error::SetLoggerError(_))
    ));
    Ok(())
}
