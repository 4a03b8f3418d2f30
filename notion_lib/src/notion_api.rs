use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stack_string::StackString;
use std::future::Future;

use daily_lib::errors::DailyError as Error;

use crate::notion_block::Block;

/// One page of `GET /blocks/{id}/children`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockChildren {
    pub results: Vec<Block>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<StackString>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotionPage {
    pub id: StackString,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl NotionPage {
    /// Start of a date property, `None` if the property is missing or empty.
    #[must_use]
    pub fn date_start(&self, property: &str) -> Option<&str> {
        self.properties.get(property)?.get("date")?.get("start")?.as_str()
    }
}

/// One page of `POST /databases/{id}/query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageList {
    pub results: Vec<NotionPage>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<StackString>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<StackString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageParent {
    pub database_id: StackString,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageIcon {
    #[serde(rename = "type")]
    pub icon_type: StackString,
    pub emoji: StackString,
}

impl PageIcon {
    #[must_use]
    pub fn emoji(emoji: &str) -> Self {
        Self {
            icon_type: "emoji".into(),
            emoji: emoji.into(),
        }
    }
}

/// Body of `POST /pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePageRequest {
    pub parent: PageParent,
    pub icon: PageIcon,
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Block>,
}

/// Error object returned by the API for non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotionErrorResponse {
    #[serde(default)]
    pub code: StackString,
    #[serde(default)]
    pub message: StackString,
}

/// The four remote calls the daily pipeline needs.
pub trait NotionApi {
    fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> impl Future<Output = Result<BlockChildren, Error>> + Send;

    fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> impl Future<Output = Result<PageList, Error>> + Send;

    fn create_page(
        &self,
        request: &CreatePageRequest,
    ) -> impl Future<Output = Result<NotionPage, Error>> + Send;

    fn update_page_properties(
        &self,
        page_id: &str,
        properties: &Map<String, Value>,
    ) -> impl Future<Output = Result<NotionPage, Error>> + Send;
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Error};
    use stack_string::StackString;

    use crate::notion_api::{BlockChildren, DatabaseQuery, NotionPage};

    #[test]
    fn test_block_children() -> Result<(), Error> {
        let children: BlockChildren = serde_json::from_value(json!({
            "object": "list",
            "results": [
                {"id": "a", "type": "divider", "divider": {}, "has_children": false}
            ],
            "next_cursor": "cursor-1",
            "has_more": true,
            "type": "block",
            "block": {}
        }))?;
        assert_eq!(children.results.len(), 1);
        assert!(children.has_more);
        assert_eq!(
            children.next_cursor.as_ref().map(StackString::as_str),
            Some("cursor-1")
        );
        Ok(())
    }

    #[test]
    fn test_date_start() -> Result<(), Error> {
        let page: NotionPage = serde_json::from_value(json!({
            "object": "page",
            "id": "page-1",
            "properties": {
                "Date": {"id": "x", "type": "date", "date": {"start": "2026-10-18", "end": null}},
                "Empty": {"id": "y", "type": "date", "date": null}
            }
        }))?;
        assert_eq!(page.date_start("Date"), Some("2026-10-18"));
        assert_eq!(page.date_start("Empty"), None);
        assert_eq!(page.date_start("Missing"), None);
        Ok(())
    }

    #[test]
    fn test_database_query() -> Result<(), Error> {
        let query = DatabaseQuery {
            filter: Some(json!({"property": "Date", "date": {"this_week": {}}})),
            ..DatabaseQuery::default()
        };
        assert_eq!(
            serde_json::to_value(&query)?,
            json!({"filter": {"property": "Date", "date": {"this_week": {}}}})
        );
        Ok(())
    }
}
