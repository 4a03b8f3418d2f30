use anyhow::Error;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use daily_lib::{daily_config::DailyConfig, daily_logger::init_logging};
use notion_lib::notion_client::NotionClient;

use crate::daily_pipeline::{run_pipeline, PipelineOptions};

/// Create today's daily page with last night's sleep and record yesterday's
/// step count.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "notion-daily", version)]
pub struct DailyCliOpts {
    /// Health export payload: sleep_* and steps_* keys, as a JSON object
    #[arg(short, long)]
    pub data: String,
    /// Env file to load before reading the environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Don't create today's page
    #[arg(long)]
    pub skip_create: bool,
    /// Don't update yesterday's step count
    #[arg(long)]
    pub skip_update: bool,
}

impl DailyCliOpts {
    /// # Errors
    /// Returns error if configuration, logging or the http client can't be
    /// set up
    pub async fn process_args() -> Result<(), Error> {
        Self::parse().run().await
    }

    #[must_use]
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            skip_create: self.skip_create,
            skip_update: self.skip_update,
        }
    }

    /// # Errors
    /// Returns error if configuration, logging or the http client can't be
    /// set up
    pub async fn run(&self) -> Result<(), Error> {
        let config = DailyConfig::get_config(self.config.as_deref())?;
        let log_file = init_logging(&config)?;
        info!("Script launched, logging to {}", log_file.display());

        let client = NotionClient::new(config.clone())?;
        info!("Client successfully initialised");

        let today = config.today();
        let report = run_pipeline(&client, &config, &self.data, today, self.options()).await;
        info!(
            "Run finished for {today}: updated {:?}, created {:?}",
            report.updated_page, report.created_page
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::Path;

    use crate::{daily_cli_opts::DailyCliOpts, daily_pipeline::PipelineOptions};

    #[test]
    fn test_parse_args() -> Result<(), clap::Error> {
        let opts = DailyCliOpts::try_parse_from([
            "notion-daily",
            "--data",
            r#"{"steps_value": 10}"#,
            "--config",
            "/tmp/daily.env",
            "--skip-update",
        ])?;
        assert_eq!(opts.data, r#"{"steps_value": 10}"#);
        assert_eq!(opts.config.as_deref(), Some(Path::new("/tmp/daily.env")));
        assert_eq!(
            opts.options(),
            PipelineOptions {
                skip_create: false,
                skip_update: true,
            }
        );
        Ok(())
    }

    #[test]
    fn test_data_is_required() {
        assert!(DailyCliOpts::try_parse_from(["notion-daily"]).is_err());
        assert!(DailyCliOpts::try_parse_from(["notion-daily", "-d", "{}"]).is_ok());
    }
}
