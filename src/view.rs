use maud::{DOCTYPE, Markup, html};

use crate::insights::Insights;
use crate::tags::RankedTag;
use crate::viral::ViralVideo;

const PAGE_TITLE: &str = "YouTube Tag Finder";

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
form { display: flex; gap: .5rem; margin-bottom: 1.5rem; }
input[type=text] { flex: 1; padding: .5rem; }
table { border-collapse: collapse; width: 100%; margin-bottom: 1.5rem; }
th, td { text-align: left; padding: .35rem .5rem; border-bottom: 1px solid #ddd; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
textarea { width: 100%; min-height: 4rem; }
.error { background: #fde8e8; color: #9b1c1c; padding: .75rem; margin-bottom: 1rem; }
.suggested { background: #eef6ff; padding: .75rem; margin-bottom: 1rem; }
"#;

/// What the index page shows after a form submit (or nothing before one).
#[derive(Debug, Default)]
pub struct IndexPage {
    pub query: String,
    pub insights: Option<Insights>,
    pub error: Option<String>,
}

pub fn index(page: &IndexPage) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (PAGE_TITLE) }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                h1 { (PAGE_TITLE) }
                form method="post" action="/" {
                    input type="text" name="title" value=(page.query)
                        placeholder="Video title or topic" required;
                    button type="submit" { "Find tags" }
                }
                @if let Some(error) = &page.error {
                    div class="error" { "Error: " (error) }
                }
                @if let Some(insights) = &page.insights {
                    (results(insights))
                }
            }
        }
    }
}

fn results(insights: &Insights) -> Markup {
    html! {
        @if let Some(title) = &insights.suggested_title {
            div class="suggested" {
                strong { "Suggested title: " }
                (title)
            }
        }
        @if !insights.viral_videos.is_empty() {
            h2 { "Most viral videos" }
            (viral_table(&insights.viral_videos))
        }
        @if insights.tags.is_empty() {
            p { "No tags found for " em { (insights.query) } "." }
        } @else {
            h2 { "Top tags" }
            textarea readonly { (insights.tags_text) }
            (tag_table(&insights.tags))
        }
    }
}

fn viral_table(videos: &[ViralVideo]) -> Markup {
    html! {
        table {
            thead { tr { th { "Title" } th { "Channel" } th { "Views" } } }
            tbody {
                @for video in videos {
                    tr {
                        td {
                            @if let Some(url) = &video.url {
                                a href=(url) target="_blank" rel="noopener" { (video.title) }
                            } @else {
                                (video.title)
                            }
                        }
                        td { (video.channel) }
                        td class="num" { (format_count(video.views)) }
                    }
                }
            }
        }
    }
}

fn tag_table(tags: &[RankedTag]) -> Markup {
    html! {
        table {
            thead {
                tr { th { "#" } th { "Tag" } th { "Videos" } th { "Total views" } }
            }
            tbody {
                @for tag in tags {
                    tr {
                        td class="num" { (tag.rank) }
                        td { (tag.tag()) }
                        td class="num" { (tag.stat.frequency) }
                        td class="num" { (format_count(tag.stat.total_views)) }
                    }
                }
            }
        }
    }
}

/// `1234567` → `"1,234,567"`.
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{TagStat, rank};

    fn sample_insights() -> Insights {
        let tags = rank(vec![TagStat {
            tag: "fun".into(),
            frequency: 2,
            total_views: 110,
        }]);
        Insights {
            query: "cats".into(),
            tags_text: "fun".into(),
            tags,
            viral_videos: vec![
                ViralVideo {
                    title: "Cats <3".into(),
                    channel: "Kitty".into(),
                    views: 1_234_567,
                    url: Some("https://www.youtube.com/watch?v=abc".into()),
                },
                ViralVideo {
                    title: "No link".into(),
                    channel: "Unknown channel".into(),
                    views: 5,
                    url: None,
                },
            ],
            suggested_title: Some("Cats <3".into()),
        }
    }

    #[test]
    fn format_count_groups_thousands() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn empty_page_shows_only_the_form() {
        let html = index(&IndexPage::default()).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"name="title""#));
        assert!(!html.contains("Top tags"));
        assert!(!html.contains("class=\"error\""));
    }

    #[test]
    fn results_are_rendered_and_escaped() {
        let page = IndexPage {
            query: "cats".into(),
            insights: Some(sample_insights()),
            error: None,
        };
        let html = index(&page).into_string();
        assert!(html.contains("Suggested title: </strong>Cats &lt;3"));
        assert!(html.contains(r#"href="https://www.youtube.com/watch?v=abc""#));
        assert!(html.contains("1,234,567"));
        assert!(html.contains("<td>fun</td>"));
        assert!(!html.contains("Cats <3"));
    }

    #[test]
    fn query_and_error_are_escaped() {
        let page = IndexPage {
            query: "\"><script>alert(1)</script>".into(),
            insights: None,
            error: Some("<b>boom</b>".into()),
        };
        let html = index(&page).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("Error: &lt;b&gt;boom&lt;/b&gt;"));
    }

    #[test]
    fn empty_tag_list_says_so() {
        let page = IndexPage {
            query: "zzz".into(),
            insights: Some(Insights {
                query: "zzz".into(),
                ..Insights::default()
            }),
            error: None,
        };
        let html = index(&page).into_string();
        assert!(html.contains("No tags found for <em>zzz</em>."));
    }
}
