use std::path::Path;

use daily_lib::{daily_config::DailyConfig, errors::DailyError as Error};

#[test]
fn test_daily_config_get_config() -> Result<(), Error> {
    let config = DailyConfig::get_config(Some(Path::new("tests/data/test.env")))?;

    assert_eq!(config.notion_token, "secret_test_token");
    assert_eq!(config.template_page_id, "0f5c1e8a2b7d4c6e9a1b3c5d7e9f1a2b");
    assert_eq!(config.daily_database_id, "9e8d7c6b5a4f3e2d1c0b9a8f7e6d5c4b");
    assert_eq!(config.steps_property, "Daily Steps");
    assert_eq!(config.sleep_property, "Sleep");
    assert_eq!(config.notion_version, "2022-06-28");
    assert_eq!(config.timezone.as_ref().map(|tz| tz.as_str()), Some("America/New_York"));
    Ok(())
}
