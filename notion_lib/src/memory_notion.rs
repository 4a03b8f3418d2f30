use parking_lot::Mutex;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use stack_string::{format_sstr, StackString};
use std::collections::{HashMap, HashSet};

use daily_lib::errors::DailyError as Error;

use crate::{
    notion_api::{
        BlockChildren, CreatePageRequest, DatabaseQuery, NotionApi, NotionPage, PageList,
    },
    notion_block::Block,
};

/// `NotionApi` backed by in-process data, records every write it receives.
/// Child listings and database queries are paged the same way the remote
/// API pages them, with the page number as cursor.
#[derive(Debug, Default)]
pub struct MemoryNotion {
    children: HashMap<String, Vec<Vec<Block>>>,
    failing_blocks: HashSet<String>,
    pages: Vec<NotionPage>,
    query_page_size: Option<usize>,
    reject_create: bool,
    fail_query: bool,
    fail_update: bool,
    listed: Mutex<Vec<StackString>>,
    queries: Mutex<Vec<DatabaseQuery>>,
    created: Mutex<Vec<CreatePageRequest>>,
    updated: Mutex<Vec<(StackString, Map<String, Value>)>>,
}

fn not_found(id: &str) -> Error {
    Error::RemoteCallError {
        status: StatusCode::NOT_FOUND,
        message: format_sstr!("object_not_found: Could not find {id}"),
    }
}

fn server_error(what: &str) -> Error {
    Error::RemoteCallError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format_sstr!("internal_server_error: {what} failed"),
    }
}

fn cursor_index(cursor: Option<&str>) -> Result<usize, Error> {
    cursor.map_or(Ok(0), |c| c.parse::<usize>().map_err(Into::into))
}

impl MemoryNotion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one listing page of children for `block_id`.
    pub fn add_children(&mut self, block_id: &str, blocks: Vec<Block>) -> &mut Self {
        self.children.entry(block_id.into()).or_default().push(blocks);
        self
    }

    pub fn fail_block(&mut self, block_id: &str) -> &mut Self {
        self.failing_blocks.insert(block_id.into());
        self
    }

    pub fn add_page(&mut self, page: NotionPage) -> &mut Self {
        self.pages.push(page);
        self
    }

    pub fn set_query_page_size(&mut self, size: usize) -> &mut Self {
        self.query_page_size = Some(size.max(1));
        self
    }

    pub fn reject_create(&mut self) -> &mut Self {
        self.reject_create = true;
        self
    }

    pub fn fail_query(&mut self) -> &mut Self {
        self.fail_query = true;
        self
    }

    pub fn fail_update(&mut self) -> &mut Self {
        self.fail_update = true;
        self
    }

    #[must_use]
    pub fn listed_blocks(&self) -> Vec<StackString> {
        self.listed.lock().clone()
    }

    #[must_use]
    pub fn queries(&self) -> Vec<DatabaseQuery> {
        self.queries.lock().clone()
    }

    #[must_use]
    pub fn created_pages(&self) -> Vec<CreatePageRequest> {
        self.created.lock().clone()
    }

    #[must_use]
    pub fn updated_pages(&self) -> Vec<(StackString, Map<String, Value>)> {
        self.updated.lock().clone()
    }
}

impl NotionApi for MemoryNotion {
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildren, Error> {
        self.listed.lock().push(block_id.into());
        if self.failing_blocks.contains(block_id) {
            return Err(server_error(&format_sstr!("listing {block_id}")));
        }
        let chunks = self.children.get(block_id).ok_or_else(|| not_found(block_id))?;
        let index = cursor_index(start_cursor)?;
        let has_more = index + 1 < chunks.len();
        Ok(BlockChildren {
            results: chunks.get(index).cloned().unwrap_or_default(),
            has_more,
            next_cursor: has_more.then(|| format_sstr!("{}", index + 1)),
        })
    }

    async fn query_database(
        &self,
        _database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<PageList, Error> {
        self.queries.lock().push(query.clone());
        if self.fail_query {
            return Err(server_error("database query"));
        }
        let size = self.query_page_size.unwrap_or(self.pages.len().max(1));
        let cursor = query.start_cursor.as_ref().map(StackString::as_str);
        let start = cursor_index(cursor)? * size;
        let end = (start + size).min(self.pages.len());
        let has_more = end < self.pages.len();
        Ok(PageList {
            results: self.pages.get(start..end).map(<[_]>::to_vec).unwrap_or_default(),
            has_more,
            next_cursor: has_more.then(|| format_sstr!("{}", end / size)),
        })
    }

    async fn create_page(&self, request: &CreatePageRequest) -> Result<NotionPage, Error> {
        if self.reject_create {
            return Err(Error::RemoteCallError {
                status: StatusCode::BAD_REQUEST,
                message: "validation_error: body failed validation".into(),
            });
        }
        let mut created = self.created.lock();
        created.push(request.clone());
        Ok(NotionPage {
            id: format_sstr!("created-{}", created.len()),
            properties: request.properties.clone(),
        })
    }

    async fn update_page_properties(
        &self,
        page_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<NotionPage, Error> {
        if self.fail_update {
            return Err(server_error(&format_sstr!("updating {page_id}")));
        }
        let page = self
            .pages
            .iter()
            .find(|page| page.id.as_str() == page_id)
            .ok_or_else(|| not_found(page_id))?;
        self.updated
            .lock()
            .push((page_id.into(), properties.clone()));
        let mut page = page.clone();
        page.properties.extend(properties.clone());
        Ok(page)
    }
}
