//! One full query cycle: the viral videos and the ranked tags for a topic,
//! plus the bits derived from them for display.

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::tags::{RankedTag, rank_tags};
use crate::viral::{ViralVideo, viral_videos};
use crate::youtube::{SearchOrder, VideoApi};

pub const VIRAL_RESULTS: usize = 5;
pub const TAG_RESULTS: usize = 25;
pub const TAGS_TEXT_LIMIT: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Insights {
    pub query: String,
    pub tags: Vec<RankedTag>,
    /// The top tags joined with ", ", ready to paste into an upload form.
    pub tags_text: String,
    pub viral_videos: Vec<ViralVideo>,
    /// Title of the most-viewed video, if any came back.
    pub suggested_title: Option<String>,
}

pub fn tags_text(tags: &[RankedTag]) -> String {
    tags.iter()
        .take(TAGS_TEXT_LIMIT)
        .map(RankedTag::tag)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Runs the viral selector and the tag ranker for `query`.
///
/// A blank query returns empty insights without calling the API. Any failure
/// aborts the whole cycle; partial results are never returned.
pub fn collect_insights<A: VideoApi>(api: &A, query: &str) -> Result<Insights> {
    collect_insights_ordered(api, query, SearchOrder::ViewCount)
}

/// Like [`collect_insights`], but the videos feeding the tag ranking are
/// searched with `tag_order`. The viral list always uses view count.
pub fn collect_insights_ordered<A: VideoApi>(
    api: &A,
    query: &str,
    tag_order: SearchOrder,
) -> Result<Insights> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Insights::default());
    }

    let viral = viral_videos(api, query, VIRAL_RESULTS)?;
    let suggested_title = viral.first().map(|video| video.title.clone());
    let tags = rank_tags(api, query, TAG_RESULTS, tag_order)?;

    info!(
        "insights for {query:?}: {} tag(s), {} viral video(s)",
        tags.len(),
        viral.len()
    );

    Ok(Insights {
        query: query.to_string(),
        tags_text: tags_text(&tags),
        tags,
        viral_videos: viral,
        suggested_title,
    })
}
