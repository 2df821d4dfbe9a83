//! Integration tests for keyword search over the news collection.

use quarry_fts::{Error, SearchQuery};

use crate::common::{headline_news, news_collection, sample_news};

#[test]
fn test_headline_search_returns_matching_article() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&headline_news()).unwrap();

    let result = news.search(["title", "content"], "中国", 10).unwrap();

    assert_eq!(result.len(), 1);
    let doc = &result.hits()[0].document;
    assert_eq!(doc.identifier, "1");
    assert_eq!(doc.get("title"), Some("中国经济"));
    assert_eq!(doc.get("content"), Some("增长强劲"));
}

#[test]
fn test_added_terms_are_findable_in_every_searchable_field() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    for (field, keyword, expected) in [
        ("title", "天气", "2"),
        ("content", "晴天", "2"),
        ("title", "财经", "6"),
        ("content", "股市", "6"),
    ] {
        let result = news.search([field], keyword, 10).unwrap();
        assert!(
            result.identifiers().contains(&expected),
            "{keyword} in {field} should find {expected}"
        );
    }
}

#[test]
fn test_search_spans_fields() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    // 中国 is in the title of 1 and the content of 3.
    let mut ids = news
        .search(["title", "content"], "中国", 10)
        .unwrap()
        .identifiers()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    ids.sort();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_search_is_case_insensitive() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let result = news.search(["title"], "RUST", 10).unwrap();
    assert_eq!(result.identifiers(), vec!["4"]);
}

#[test]
fn test_boolean_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let result = news
        .search(["title", "content"], "+release -rust", 10)
        .unwrap();
    assert_eq!(result.identifiers(), vec!["5"]);

    let result = news
        .search(["title", "content"], "\"stable release\"", 10)
        .unwrap();
    assert_eq!(result.identifiers(), vec!["4"]);
}

#[test]
fn test_no_hits_is_empty_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let result = news.search(["title", "content"], "火星", 10).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.total(), 0);
}

#[test]
fn test_malformed_keyword_is_a_syntax_error() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    for keyword in ["(中国 AND 经济", "title:(中国"] {
        let err = news.search(["title", "content"], keyword, 10).unwrap_err();
        assert!(
            matches!(err, Error::QuerySyntax { .. }),
            "{keyword} should be rejected, got {err:?}"
        );
    }
}

#[test]
fn test_invalid_queries_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());

    let empty: [&str; 0] = [];
    assert!(matches!(
        news.search(empty, "中国", 10),
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        news.search(["title"], "", 10),
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        news.search(["title"], "中国", 0),
        Err(Error::Validation { .. })
    ));
    assert!(matches!(
        news.search(["ndate"], "中国", 10),
        Err(Error::FieldNotFound { .. })
    ));
}

#[test]
fn test_search_before_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());

    let result = news.search(["title", "content"], "中国", 10).unwrap();
    assert!(result.is_empty());
    assert!(!news.index_path().exists());
}

#[test]
fn test_search_query_limit() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let query = SearchQuery::new(["title", "content"], "中国 天气 财经", 2);
    let result = news.search_query(&query).unwrap();
    assert_eq!(result.len(), 2);
    assert_eq!(result.total(), 4);
}

#[test]
fn test_limit_far_beyond_document_count() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let expected = news
        .search(["title", "content"], "中国 天气 财经", 10)
        .unwrap();
    assert_eq!(expected.len(), 4);

    for limit in [1_000_000_000, usize::MAX] {
        let result = news
            .search(["title", "content"], "中国 天气 财经", limit)
            .unwrap();
        assert_eq!(result.total(), 4);
        assert_eq!(result.identifiers(), expected.identifiers());
        let scores: Vec<f32> = result.hits().iter().map(|h| h.score).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }
}

#[test]
fn test_field_prefix_reaches_declared_fields_outside_query() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    let result = news.search(["title"], "nid:1", 10).unwrap();
    assert_eq!(result.identifiers(), vec!["1"]);

    assert!(matches!(
        news.search(["title"], "price:1", 10),
        Err(Error::QuerySyntax { .. })
    ));
}
