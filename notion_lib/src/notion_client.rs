use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use stack_string::{format_sstr, StackString};
use std::time::Duration;
use url::Url;

use daily_lib::{daily_config::DailyConfig, errors::DailyError as Error};

use crate::notion_api::{
    BlockChildren, CreatePageRequest, DatabaseQuery, NotionApi, NotionErrorResponse, NotionPage,
    PageList,
};

const PAGE_SIZE: &str = "100";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct NotionClient {
    pub config: DailyConfig,
    client: Client,
    base_url: Url,
}

impl NotionClient {
    /// # Errors
    /// Returns error if the token or version aren't valid header values, the
    /// api url doesn't parse or the http client can't be built
    pub fn new(config: DailyConfig) -> Result<Self, Error> {
        let mut auth: HeaderValue = format_sstr!("Bearer {}", config.notion_token).parse()?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert("notion-version", config.notion_version.parse()?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let base_url = Url::parse(&format_sstr!(
            "{}/",
            config.notion_api_url.trim_end_matches('/')
        ))?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    fn api_url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Into::into)
    }

    async fn api_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            let message: StackString = match serde_json::from_str::<NotionErrorResponse>(&body) {
                Ok(e) => format_sstr!("{}: {}", e.code, e.message),
                Err(_) => body.into(),
            };
            return Err(Error::RemoteCallError { status, message });
        }
        response.json().await.map_err(Into::into)
    }
}

impl NotionApi for NotionClient {
    async fn list_block_children(
        &self,
        block_id: &str,
        start_cursor: Option<&str>,
    ) -> Result<BlockChildren, Error> {
        let mut url = self.api_url(&format_sstr!("blocks/{block_id}/children"))?;
        url.query_pairs_mut().append_pair("page_size", PAGE_SIZE);
        if let Some(start_cursor) = start_cursor {
            url.query_pairs_mut()
                .append_pair("start_cursor", start_cursor);
        }
        debug!("GET {url}");
        self.api_json(self.client.get(url)).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        query: &DatabaseQuery,
    ) -> Result<PageList, Error> {
        let url = self.api_url(&format_sstr!("databases/{database_id}/query"))?;
        debug!("POST {url}");
        self.api_json(self.client.post(url).json(query)).await
    }

    async fn create_page(&self, request: &CreatePageRequest) -> Result<NotionPage, Error> {
        let url = self.api_url("pages")?;
        debug!("POST {url} with {} blocks", request.children.len());
        self.api_json(self.client.post(url).json(request)).await
    }

    async fn update_page_properties(
        &self,
        page_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<NotionPage, Error> {
        let url = self.api_url(&format_sstr!("pages/{page_id}"))?;
        debug!("PATCH {url}");
        let body = serde_json::json!({ "properties": properties });
        self.api_json(self.client.patch(url).json(&body)).await
    }
}
