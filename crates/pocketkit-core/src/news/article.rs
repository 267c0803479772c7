//! Articles and their conversion from Hacker News items.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

pub const PLACEHOLDER_IMAGE_URL: &str = "https://picsum.photos/800/400";
pub const NO_CONTENT: &str = "No content available. Kindly check out the original article.";
const SUMMARY_WORDS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Ai,
    Gadgets,
    Startups,
    Cybersecurity,
    Gaming,
    Software,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Ai,
        Category::Gadgets,
        Category::Startups,
        Category::Cybersecurity,
        Category::Gaming,
        Category::Software,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Ai => "ai",
            Category::Gadgets => "gadgets",
            Category::Startups => "startups",
            Category::Cybersecurity => "cybersecurity",
            Category::Gaming => "gaming",
            Category::Software => "software",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Ai => "AI & Machine Learning",
            Category::Gadgets => "Gadgets",
            Category::Startups => "Startups",
            Category::Cybersecurity => "Cybersecurity",
            Category::Gaming => "Gaming",
            Category::Software => "Software Development",
        }
    }

    /// Feed endpoint (without `.json`) that stands in for this category.
    pub fn endpoint(self) -> &'static str {
        match self {
            Category::Software => "topstories",
            Category::Startups => "showstories",
            Category::Ai => "beststories",
            _ => "newstories",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(wanted) || c.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownItem {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// Raw item from the Hacker News API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HnItem {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub url: Option<String>,
    pub by: Option<String>,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub kids: Vec<u64>,
    pub score: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub hn_id: u64,
    pub title: String,
    pub summary: String,
    pub content: String,
    pub author: String,
    pub publish_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub source_url: Option<String>,
    pub category: Category,
}

/// Stable article id for an upstream item id.
pub fn article_id(hn_id: u64) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("hn:{hn_id}").as_bytes())
}

impl Article {
    /// Convert an item. Anything that is not a titled story yields `None`.
    pub fn from_item(item: &HnItem) -> Option<Article> {
        if item.kind.as_deref() != Some("story") {
            return None;
        }
        let title = item.title.clone()?;

        let stripped = item.text.as_deref().map(strip_html);
        let content = stripped.clone().unwrap_or_else(|| strip_html(NO_CONTENT));
        let summary = match &stripped {
            Some(text) => summarize(text),
            None => title.clone(),
        };

        Some(Article {
            id: article_id(item.id),
            hn_id: item.id,
            summary,
            content,
            author: item.by.clone().unwrap_or_else(|| "Unknown".to_string()),
            publish_date: DateTime::from_timestamp(item.time, 0).unwrap_or_default(),
            image_url: Some(PLACEHOLDER_IMAGE_URL.to_string()),
            source_url: item
                .url
                .as_deref()
                .filter(|u| url::Url::parse(u).is_ok())
                .map(str::to_string),
            category: categorize(&title, item.text.as_deref().unwrap_or("")),
            title,
        })
    }

    /// Case-insensitive match on title or summary.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query) || self.summary.to_lowercase().contains(&query)
    }
}

fn tag_pattern() -> Option<&'static Regex> {
    static TAGS: OnceLock<Option<Regex>> = OnceLock::new();
    TAGS.get_or_init(|| Regex::new(r"<[^>]+>").ok()).as_ref()
}

/// Remove tags, decode the common entities and trim.
pub fn strip_html(text: &str) -> String {
    let untagged = match tag_pattern() {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    };
    untagged
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// First words of `text`, with an ellipsis when there were more.
pub fn summarize(text: &str) -> String {
    let words: Vec<&str> = text.split(' ').filter(|w| !w.is_empty()).collect();
    let mut summary = words
        .iter()
        .take(SUMMARY_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > SUMMARY_WORDS {
        summary.push_str("...");
    }
    summary
}

/// Keyword match over the lowercased title and text. Matching is by
/// substring, so short keywords also hit inside longer words.
pub fn categorize(title: &str, text: &str) -> Category {
    const RULES: [(Category, &[&str]); 5] = [
        (Category::Ai, &["ai", "machine learning", "neural"]),
        (Category::Startups, &["startup", "launch", "founder"]),
        (Category::Cybersecurity, &["security", "hack", "vulnerability"]),
        (Category::Gaming, &["game", "gaming", "playstation", "xbox"]),
        (Category::Gadgets, &["hardware", "device", "phone", "laptop"]),
    ];

    let haystack = format!("{} {}", title.to_lowercase(), text.to_lowercase());
    RULES
        .iter()
        .find(|(_, words)| words.iter().any(|w| haystack.contains(w)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Software)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn item(json: &str) -> HnItem {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn converts_a_text_story() {
        let hn = item(indoc! {r#"
            {
              "id": 8863,
              "type": "story",
              "by": "dhouston",
              "time": 1175714200,
              "title": "My YC app: Dropbox - Throw away your USB drive",
              "text": "<p>Sync files &amp; folders &quot;everywhere&quot;</p>",
              "url": "http://www.getdropbox.com/u/2/screencast.html",
              "kids": [8952, 9224],
              "score": 111
            }
        "#});
        let article = Article::from_item(&hn).unwrap();
        assert_eq!(article.id, article_id(8863));
        assert_eq!(article.content, "Sync files & folders \"everywhere\"");
        assert_eq!(article.summary, article.content);
        assert_eq!(article.author, "dhouston");
        assert_eq!(article.publish_date.timestamp(), 1175714200);
        assert_eq!(article.image_url.as_deref(), Some(PLACEHOLDER_IMAGE_URL));
        assert!(article.source_url.is_some());
    }

    #[test]
    fn link_story_uses_title_as_summary() {
        let hn = item(r#"{"id": 1, "type": "story", "time": 0, "title": "Rust 2.0 announced"}"#);
        let article = Article::from_item(&hn).unwrap();
        assert_eq!(article.summary, "Rust 2.0 announced");
        assert_eq!(article.content, NO_CONTENT);
        assert_eq!(article.author, "Unknown");
    }

    #[test]
    fn skips_jobs_and_untitled_items() {
        assert!(Article::from_item(&item(r#"{"id": 2, "type": "job", "time": 0, "title": "Hiring"}"#)).is_none());
        assert!(Article::from_item(&item(r#"{"id": 3, "type": "story", "time": 0}"#)).is_none());
        assert!(Article::from_item(&item(r#"{"id": 4, "time": 0, "title": "x"}"#)).is_none());
    }

    #[test]
    fn article_ids_are_stable() {
        assert_eq!(article_id(42), article_id(42));
        assert_ne!(article_id(42), article_id(43));
    }

    #[test]
    fn summary_is_capped_at_thirty_words() {
        let text = (1..=31).map(|n| n.to_string()).collect::<Vec<_>>().join(" ");
        let summary = summarize(&text);
        assert!(summary.ends_with("30..."));
        assert_eq!(summarize("one  two"), "one two");
    }

    #[test]
    fn category_rules_apply_in_order() {
        assert_eq!(categorize("Neural nets for startups", ""), Category::Ai);
        assert_eq!(categorize("Show HN: launch week", ""), Category::Startups);
        assert_eq!(categorize("OpenSSL vulnerability", ""), Category::Cybersecurity);
        assert_eq!(categorize("Xbox controller teardown", ""), Category::Gaming);
        assert_eq!(categorize("New laptop review", ""), Category::Gadgets);
        assert_eq!(categorize("Postgres 17 released", ""), Category::Software);
        // Substring match: "said" contains "ai".
        assert_eq!(categorize("Linus said no", ""), Category::Ai);
    }

    #[test]
    fn categories_parse_from_key_or_name() {
        assert_eq!("ai".parse::<Category>().unwrap(), Category::Ai);
        assert_eq!("Software Development".parse::<Category>().unwrap(), Category::Software);
        assert!("sports".parse::<Category>().is_err());
        assert_eq!(Category::Gaming.endpoint(), "newstories");
    }
}
