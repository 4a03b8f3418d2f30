use log::{error, info, warn};
use serde_json::{json, Map, Value};
use stack_string::{format_sstr, StackString};
use time::Date;

use daily_lib::{daily_config::DailyConfig, errors::DailyError as Error};
use daily_models::{
    daily_summary::DailySummary,
    daily_util::{format_property_date, format_title_date, parse_property_date},
};

use crate::{
    notion_api::{CreatePageRequest, DatabaseQuery, NotionApi, NotionPage, PageIcon, PageParent},
    notion_block::Block,
};

/// Writes the daily summary into the daily database.
pub struct DailyPageWriter<'a, A> {
    api: &'a A,
    config: &'a DailyConfig,
}

impl<'a, A> DailyPageWriter<'a, A>
where
    A: NotionApi + Sync,
{
    pub fn new(api: &'a A, config: &'a DailyConfig) -> Self {
        Self { api, config }
    }

    /// Date, sleep and title properties of a new daily page.
    /// # Errors
    /// Returns error if the date can't be formatted
    pub fn page_properties(&self, summary: &DailySummary) -> Result<Map<String, Value>, Error> {
        let start = format_property_date(summary.sleep_end_date)?;
        let title = format_title_date(summary.sleep_end_date)?;

        let mut properties = Map::new();
        properties.insert(
            self.config.date_property.to_string(),
            json!({"type": "date", "date": {"start": start, "end": null}}),
        );
        properties.insert(
            self.config.sleep_property.to_string(),
            json!({"type": "number", "number": summary.total_daily_sleep_hours}),
        );
        properties.insert(
            self.config.title_property.to_string(),
            json!({
                "type": "title",
                "title": [{"type": "text", "text": {"content": title, "link": null}}]
            }),
        );
        Ok(properties)
    }

    /// # Errors
    /// Returns error if the properties can't be built
    pub fn create_request(
        &self,
        summary: &DailySummary,
        children: Vec<Block>,
    ) -> Result<CreatePageRequest, Error> {
        Ok(CreatePageRequest {
            parent: PageParent {
                database_id: self.config.daily_database_id.clone(),
            },
            icon: PageIcon::emoji(&self.config.page_icon),
            properties: self.page_properties(summary)?,
            children,
        })
    }

    /// Create the daily page with `children` as content. Failures are logged
    /// and yield `None`.
    pub async fn create_daily_page(
        &self,
        summary: &DailySummary,
        children: Vec<Block>,
    ) -> Option<StackString> {
        let request = self
            .create_request(summary, children)
            .map_err(|e| error!("Error during page creation : {e}"))
            .ok()?;
        match self.api.create_page(&request).await {
            Ok(page) => {
                info!("Page Created with id : {}", page.id);
                Some(page.id)
            }
            Err(e) => {
                error!("Error during page creation : {e}");
                None
            }
        }
    }

    /// Pages of the daily database dated this week, across every result
    /// page of the query.
    /// # Errors
    /// Returns the first failed query
    pub async fn pages_this_week(&self) -> Result<Vec<NotionPage>, Error> {
        let mut query = DatabaseQuery {
            filter: Some(json!({
                "property": self.config.date_property.as_str(),
                "date": {"this_week": {}}
            })),
            ..DatabaseQuery::default()
        };
        let mut pages = Vec::new();
        loop {
            let list = self
                .api
                .query_database(&self.config.daily_database_id, &query)
                .await?;
            pages.extend(list.results);
            match list.next_cursor {
                Some(next) if list.has_more => query.start_cursor = Some(next),
                _ => break,
            }
        }
        Ok(pages)
    }

    /// Set the step count of the page dated the day before `today` to
    /// `summary.total_steps`, returning the updated page id. When several
    /// pages carry that date the first one is updated.
    /// # Errors
    /// Returns `LookupError` if no page carries yesterday's date, or the
    /// remote error of a failed query or update
    pub async fn update_yesterday_page(
        &self,
        summary: &DailySummary,
        today: Date,
    ) -> Result<StackString, Error> {
        let yesterday = today
            .previous_day()
            .ok_or(Error::StaticCustomError("No day before today"))?;
        let date_property = self.config.date_property.as_str();

        let matches: Vec<NotionPage> = self
            .pages_this_week()
            .await?
            .into_iter()
            .filter(|page| {
                page.date_start(date_property)
                    .and_then(|start| parse_property_date(start).ok())
                    == Some(yesterday)
            })
            .collect();

        let (page, others) = matches.split_first().ok_or_else(|| {
            Error::LookupError(format_sstr!("No daily page dated {yesterday}"))
        })?;
        if !others.is_empty() {
            let ignored: Vec<&str> = others.iter().map(|p| p.id.as_str()).collect();
            warn!(
                "{} pages dated {yesterday}, updating {} and ignoring {}",
                matches.len(),
                page.id,
                ignored.join(", ")
            );
        }

        let mut properties = Map::new();
        properties.insert(
            self.config.steps_property.to_string(),
            json!({"number": summary.total_steps}),
        );
        self.api
            .update_page_properties(&page.id, &properties)
            .await?;
        info!(
            "Page {} updated with {} steps",
            page.id, summary.total_steps
        );
        Ok(page.id.clone())
    }
}
