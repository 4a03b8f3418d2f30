use log::{error, info};
use stack_string::StackString;
use time::Date;

use daily_lib::daily_config::DailyConfig;
use daily_models::daily_summary::DailySummary;
use notion_lib::{block_tree::fetch_block_tree, daily_page::DailyPageWriter, notion_api::NotionApi};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub skip_create: bool,
    pub skip_update: bool,
}

/// What a run managed to do. Every failure is logged where it happens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub summary: Option<DailySummary>,
    pub updated_page: Option<StackString>,
    pub created_page: Option<StackString>,
}

/// Aggregate `data`, set yesterday's step count, then create today's page
/// from the template. A bad payload stops the run before anything is
/// written; any later failure only skips its own step.
pub async fn run_pipeline<A>(
    api: &A,
    config: &DailyConfig,
    data: &str,
    today: Date,
    options: PipelineOptions,
) -> PipelineReport
where
    A: NotionApi + Sync,
{
    let mut report = PipelineReport::default();
    info!("Param ingested : data={data}");

    let summary = match DailySummary::from_json(data, today) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Failed to process input data: {e}");
            return report;
        }
    };
    info!("Input Data Processed results : {summary}");
    report.summary = Some(summary);

    let writer = DailyPageWriter::new(api, config);

    if options.skip_update {
        info!("Skipping update of yesterday's page");
    } else {
        match writer.update_yesterday_page(&summary, today).await {
            Ok(page_id) => report.updated_page = Some(page_id),
            Err(e) => error!("Failed to update yesterday's page: {e}"),
        }
    }

    if options.skip_create {
        info!("Skipping creation of today's page");
    } else {
        let children = match fetch_block_tree(api, &config.template_page_id).await {
            Ok(children) => children,
            Err(e) => {
                error!(
                    "Failed to retrieve template {}: {e}",
                    config.template_page_id
                );
                Vec::new()
            }
        };
        report.created_page = writer.create_daily_page(&summary, children).await;
    }

    report
}
