use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::config::Config;

/// How many stories a news section shows per load.
pub const STORIES_PER_SECTION: usize = 3;

/// The fixed set of news sections. Each category is bound to one feed
/// endpoint via [`crate::config::Sources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsCategory {
    Health,
    Food,
    Fitness,
    Sports,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 4] = [
        NewsCategory::Health,
        NewsCategory::Food,
        NewsCategory::Fitness,
        NewsCategory::Sports,
    ];

    /// Section heading shown on pages.
    pub fn title(&self) -> &'static str {
        match self {
            NewsCategory::Health => "Health News",
            NewsCategory::Food => "Food News",
            NewsCategory::Fitness => "Fitness News",
            NewsCategory::Sports => "Sports News",
        }
    }

    /// Lowercase slug used in routes, element ids and config keys.
    pub fn slug(&self) -> &'static str {
        match self {
            NewsCategory::Health => "health",
            NewsCategory::Food => "food",
            NewsCategory::Fitness => "fitness",
            NewsCategory::Sports => "sports",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Error)]
#[error("unknown news category")]
pub struct UnknownCategory;

impl FromStr for NewsCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "health" => Ok(NewsCategory::Health),
            "food" => Ok(NewsCategory::Food),
            "fitness" => Ok(NewsCategory::Fitness),
            "sports" => Ok(NewsCategory::Sports),
            _ => Err(UnknownCategory),
        }
    }
}

/// Response body of the feed-to-JSON endpoint. Only the fields that get
/// rendered are modeled; everything else in the document is ignored.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub items: Option<Vec<FeedItem>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, rename = "contentSnippet")]
    pub content_snippet: Option<String>,
}

impl FeedItem {
    /// First non-empty markup field, in the order feed converters
    /// usually fill them.
    pub fn body_html(&self) -> &str {
        [&self.description, &self.content, &self.content_snippet]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|body| !body.is_empty())
            .unwrap_or("")
    }
}

/// One rendered news entry: verbatim title plus a plain-text summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsStory {
    pub title: String,
    pub summary: String,
}

impl NewsStory {
    pub fn from_item(item: &FeedItem) -> Self {
        Self {
            title: item.title.clone(),
            summary: strip_html(item.body_html()),
        }
    }
}

pub struct Fetcher {
    client: Client,
    config: Arc<Config>,
}

impl Fetcher {
    pub fn new(config: Arc<Config>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent("Mealboard/1.0 (Wellness News Reader)")
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetches the category's feed endpoint and returns at most the first
    /// three stories in response order. Every call hits the endpoint
    /// fresh; nothing is cached or persisted. A response without an
    /// `items` collection yields no stories.
    pub async fn load(&self, category: NewsCategory) -> anyhow::Result<Vec<NewsStory>> {
        let url = self.config.sources.url_for(category);
        info!("Fetching {} news from {}", category, url);

        let response = self.client.get(url).send().await?.error_for_status()?;
        let feed: FeedResponse = response.json().await?;

        let items = match feed.items {
            Some(items) => items,
            None => return Ok(Vec::new()),
        };

        Ok(items
            .iter()
            .take(STORIES_PER_SECTION)
            .map(NewsStory::from_item)
            .collect())
    }
}

/// Strip markup from a feed snippet: tags are dropped (quote-aware, so a
/// '>' inside an attribute value doesn't end the tag early) and common
/// entities are decoded. An unterminated tag swallows the remainder.
pub fn strip_html(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(idx) = rest.find(|c: char| c == '<' || c == '&') {
        text.push_str(&rest[..idx]);
        let marker = &rest[idx..];
        if marker.starts_with('<') {
            match tag_end(marker) {
                Some(end) => rest = &marker[end..],
                None => {
                    rest = "";
                    break;
                }
            }
        } else {
            match decode_entity(marker) {
                Some((decoded, consumed)) => {
                    text.push(decoded);
                    rest = &marker[consumed..];
                }
                None => {
                    text.push('&');
                    rest = &marker[1..];
                }
            }
        }
    }

    text.push_str(rest);
    text.trim().to_string()
}

/// Byte length of the tag starting at the '<' in `s`, if it closes.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '>' => return Some(i + 1),
                _ => {}
            },
        }
    }
    None
}

/// Decode the entity starting at the '&' in `s`, returning the character
/// and the byte length consumed. Anything that doesn't look like an
/// entity is left to the caller to pass through verbatim.
fn decode_entity(s: &str) -> Option<(char, usize)> {
    let semi = s[1..].find(';')?;
    if semi == 0 || semi > 10 {
        return None;
    }
    let name = &s[1..1 + semi];
    let decoded = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)?
        }
    };
    Some((decoded, semi + 2))
}
