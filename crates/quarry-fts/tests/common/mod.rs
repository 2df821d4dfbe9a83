//! Common fixtures for quarry integration tests.

use std::path::Path;

use quarry_fts::{Collection, CollectionConfig, Projection, Record};

/// A news article, as loaded from the article table.
#[derive(Debug, Clone)]
pub struct NewsInfo {
    pub nid: i32,
    pub title: String,
    pub ndate: Option<String>,
    pub author: String,
    pub content: String,
}

impl NewsInfo {
    pub fn new(nid: i32, title: &str, content: &str) -> Self {
        Self {
            nid,
            title: title.to_string(),
            ndate: Some("2016-05-20".to_string()),
            author: "编辑部".to_string(),
            content: content.to_string(),
        }
    }

    /// An article whose date column is NULL.
    pub fn undated(mut self) -> Self {
        self.ndate = None;
        self
    }
}

impl Record for NewsInfo {
    fn projection() -> Projection<Self> {
        Projection::builder()
            .field("nid", |n: &NewsInfo| n.nid)
            .field("title", |n: &NewsInfo| n.title.clone())
            .field("author", |n: &NewsInfo| n.author.clone())
            .field("content", |n: &NewsInfo| n.content.clone())
            .try_field("ndate", |n: &NewsInfo| n.ndate.clone().ok_or("ndate is NULL"))
            .build()
    }
}

/// Configuration for the news collection rooted at `root`.
pub fn news_config(root: &Path) -> CollectionConfig {
    CollectionConfig::new("NewsInfo", "nid", ["title", "content"]).with_index_root(root)
}

/// Open the news collection rooted at `root`.
pub fn news_collection(root: &Path) -> Collection<NewsInfo> {
    Collection::open_record(news_config(root)).expect("news collection should open")
}

/// The two-article data set from the search walkthrough.
pub fn headline_news() -> Vec<NewsInfo> {
    vec![
        NewsInfo::new(1, "中国经济", "增长强劲"),
        NewsInfo::new(2, "天气预报", "晴天"),
    ]
}

/// A larger mixed data set.
pub fn sample_news() -> Vec<NewsInfo> {
    vec![
        NewsInfo::new(1, "中国经济", "增长强劲"),
        NewsInfo::new(2, "天气预报", "晴天"),
        NewsInfo::new(3, "体育新闻", "中国队获得冠军"),
        NewsInfo::new(4, "Rust 1.0 released", "The Rust team announces a stable release"),
        NewsInfo::new(5, "Release notes", "Minor fixes for the search engine"),
        NewsInfo::new(6, "财经快讯", "股市小幅上涨"),
    ]
}
