use futures::future::{BoxFuture, FutureExt};
use log::{debug, error, warn};
use stack_string::StackString;

use daily_lib::errors::DailyError as Error;

use crate::{notion_api::NotionApi, notion_block::Block};

/// Every child of `block_id`, following the listing cursor until the last
/// page.
/// # Errors
/// Returns the first failed listing
pub async fn list_all_children<A>(api: &A, block_id: &str) -> Result<Vec<Block>, Error>
where
    A: NotionApi + Sync,
{
    let mut blocks = Vec::new();
    let mut cursor: Option<StackString> = None;
    loop {
        let page = api
            .list_block_children(block_id, cursor.as_ref().map(StackString::as_str))
            .await?;
        blocks.extend(page.results);
        match page.next_cursor {
            Some(next) if page.has_more => cursor = Some(next),
            _ => break,
        }
    }
    debug!("block {block_id} has {} children", blocks.len());
    Ok(blocks)
}

/// Fetch the content of `block_id` depth first, nesting each expandable
/// block's children inside its body so the tree can be sent back as page
/// content. A subtree that fails to load is logged and its parent kept
/// without children.
/// # Errors
/// Returns error only if the children of `block_id` itself can't be listed
pub fn fetch_block_tree<'a, A>(
    api: &'a A,
    block_id: &'a str,
) -> BoxFuture<'a, Result<Vec<Block>, Error>>
where
    A: NotionApi + Sync,
{
    async move {
        let mut blocks = list_all_children(api, block_id).await?;
        for block in &mut blocks {
            if !block.is_expandable() {
                continue;
            }
            let Some(child_id) = block.id.clone() else {
                warn!("{} block without id under {block_id}", block.kind.type_name());
                continue;
            };
            match fetch_block_tree(api, &child_id).await {
                Ok(children) => block.set_children(children),
                Err(e) => error!("Failed to retrieve or process block {child_id}: {e}"),
            }
        }
        Ok(blocks)
    }
    .boxed()
}
