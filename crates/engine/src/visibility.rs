#![forbid(unsafe_code)]

use crate::error::EngineError;
use navet_core::model::Post;
use navet_core::org::OrgTree;
use navet_core::scope::relevant_chain;
use navet_core::status::PostStatus;
use std::collections::BTreeSet;

/// Hierarchical feed filter. `posts` is expected newest-first; the filter
/// preserves that order. Peeking at a station outside the allowed set is not
/// an error — it just yields nothing.
pub fn filter_posts(
    tree: &OrgTree,
    allowed: &BTreeSet<String>,
    posts: Vec<Post>,
    station_filter: Option<&str>,
    completed_only: bool,
) -> Result<Vec<Post>, EngineError> {
    let chain = match station_filter {
        None => None,
        Some(station) => {
            if !allowed.contains(station) {
                return Ok(Vec::new());
            }
            Some(relevant_chain(tree, station)?)
        }
    };

    let posts = posts
        .into_iter()
        .filter(|post| {
            if post.status.is_hidden() {
                return false;
            }
            if completed_only != (post.status == PostStatus::Completed) {
                return false;
            }
            if !allowed.contains(&post.target_audience) {
                return false;
            }
            match &chain {
                Some(chain) => chain.contains(&post.target_audience),
                None => true,
            }
        })
        .collect();

    Ok(posts)
}
