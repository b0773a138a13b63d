use std::cmp::Reverse;

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::youtube::{SearchOrder, VideoApi, VideoRecord};

pub const DEFAULT_TITLE: &str = "No title";
pub const DEFAULT_CHANNEL: &str = "Unknown channel";

/// A most-viewed video, reduced to what gets shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViralVideo {
    pub title: String,
    pub channel: String,
    pub views: u64,
    pub url: Option<String>,
}

impl From<VideoRecord> for ViralVideo {
    fn from(record: VideoRecord) -> Self {
        let url = record.watch_url();
        ViralVideo {
            title: record.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            channel: record
                .channel_title
                .unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            views: record.view_count,
            url,
        }
    }
}

/// Projects `records` and sorts them by views, highest first.
///
/// The API is asked for `viewCount` order already; the sort still runs and a
/// correction is logged whenever the incoming order was off.
pub fn select_viral(records: Vec<VideoRecord>) -> Vec<ViralVideo> {
    let mut videos: Vec<ViralVideo> = records.into_iter().map(ViralVideo::from).collect();
    if !videos.is_sorted_by(|a, b| a.views >= b.views) {
        debug!("upstream returned videos out of view order; re-sorting");
    }
    videos.sort_by_key(|video| Reverse(video.views));
    videos
}

/// The `max_results` most-viewed videos for `query`.
pub fn viral_videos<A: VideoApi>(
    api: &A,
    query: &str,
    max_results: usize,
) -> Result<Vec<ViralVideo>> {
    let ids = api.search(query, max_results, SearchOrder::ViewCount)?;
    let records = api.fetch_details(&ids)?;
    Ok(select_viral(records))
}
