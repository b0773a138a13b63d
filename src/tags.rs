//! Tag aggregation and ranking.
//!
//! Tags from every video in a batch are normalized (trimmed, lowercased),
//! counted once per video and weighted by the video's views. The result is
//! ordered by total views, then frequency, and numbered from 1.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use log::info;
use serde::Serialize;

use crate::error::Result;
use crate::youtube::{SearchOrder, VideoApi, VideoRecord};

/// Aggregated popularity of one normalized tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagStat {
    pub tag: String,
    /// Number of videos carrying the tag.
    pub frequency: u32,
    /// Sum of the view counts of those videos.
    pub total_views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTag {
    pub rank: usize,
    #[serde(flatten)]
    pub stat: TagStat,
}

impl RankedTag {
    pub fn tag(&self) -> &str {
        &self.stat.tag
    }
}

/// Trimmed, lowercased form of `tag`, or `None` when nothing is left.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let normalized = tag.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// Folds the tags of `videos` into one entry per normalized tag, in the order
/// each tag was first seen.
pub fn aggregate_tags(videos: &[VideoRecord]) -> Vec<TagStat> {
    let mut stats: Vec<TagStat> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for video in videos {
        let mut seen = HashSet::new();
        for tag in video.tags.iter().filter_map(|tag| normalize_tag(tag)) {
            if !seen.insert(tag.clone()) {
                continue;
            }
            let slot = *index.entry(tag).or_insert_with_key(|tag| {
                stats.push(TagStat {
                    tag: tag.clone(),
                    frequency: 0,
                    total_views: 0,
                });
                stats.len() - 1
            });
            let stat = &mut stats[slot];
            stat.frequency += 1;
            stat.total_views = stat.total_views.saturating_add(video.view_count);
        }
    }

    stats
}

/// Orders by total views then frequency, both descending, and assigns ranks
/// 1..=N. The sort is stable, so full ties keep their incoming order.
pub fn rank(mut stats: Vec<TagStat>) -> Vec<RankedTag> {
    stats.sort_by_key(|stat| (Reverse(stat.total_views), Reverse(stat.frequency)));
    stats
        .into_iter()
        .enumerate()
        .map(|(position, stat)| RankedTag {
            rank: position + 1,
            stat,
        })
        .collect()
}

/// Searches `query`, fetches the matching videos and ranks their tags.
///
/// Returns an empty list when the videos carry no tags at all.
pub fn rank_tags<A: VideoApi>(
    api: &A,
    query: &str,
    max_results: usize,
    order: SearchOrder,
) -> Result<Vec<RankedTag>> {
    let ids = api.search(query, max_results, order)?;
    let videos = api.fetch_details(&ids)?;
    let stats = aggregate_tags(&videos);
    info!(
        "ranked {} tag(s) from {} video(s) for {query:?}",
        stats.len(),
        videos.len()
    );
    Ok(rank(stats))
}
