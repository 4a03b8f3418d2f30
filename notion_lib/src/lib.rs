#![allow(clippy::too_many_lines)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod block_tree;
pub mod daily_page;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory_notion;
pub mod notion_api;
pub mod notion_block;
pub mod notion_client;
