//! Integration tests for the write lifecycle: add, update, delete, clear and
//! persistence across reopen.

use quarry_fts::{Collection, CollectionState, Error, FieldDecl, FieldKind, GenericDocument};

use crate::common::{NewsInfo, headline_news, news_collection, news_config, sample_news};

#[test]
fn test_update_leaves_exactly_one_document() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&headline_news()).unwrap();

    news.update(&NewsInfo::new(1, "中国经济持续向好", "消费回暖"))
        .unwrap();
    news.update(&NewsInfo::new(1, "中国经济持续向好", "出口增长"))
        .unwrap();

    assert_eq!(news.doc_count().unwrap(), 2);
    let result = news.search(["title"], "中国", 10).unwrap();
    assert_eq!(result.identifiers(), vec!["1"]);
    assert_eq!(result.hits()[0].document.get("content"), Some("出口增长"));
    assert!(news.search(["content"], "增长强劲", 10).unwrap().is_empty());
}

#[test]
fn test_delete_removes_unique_terms() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    news.delete("6").unwrap();

    assert!(news.search(["title", "content"], "股市", 10).unwrap().is_empty());
    assert!(news.find_by_identifier("6").unwrap().is_none());
    assert_eq!(news.doc_count().unwrap(), 5);
}

#[test]
fn test_delete_all_empties_every_search() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&sample_news()).unwrap();

    news.delete_all().unwrap();

    for keyword in ["中国", "天气", "rust", "release"] {
        assert!(news.search(["title", "content"], keyword, 10).unwrap().is_empty());
    }
    assert_eq!(news.doc_count().unwrap(), 0);
    assert!(news.index_path().is_dir());
}

#[test]
fn test_delete_all_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&headline_news()).unwrap();

    news.delete_all().unwrap();
    news.delete_all().unwrap();

    assert_eq!(news.doc_count().unwrap(), 0);
    assert_eq!(news.state(), CollectionState::Populated);

    // The cleared index takes new documents.
    news.add(&headline_news()).unwrap();
    assert_eq!(news.doc_count().unwrap(), 2);
}

#[test]
fn test_delete_all_on_fresh_collection() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.delete_all().unwrap();
    assert_eq!(news.doc_count().unwrap(), 0);
    assert_eq!(news.state(), CollectionState::Empty);
}

#[test]
fn test_batch_skips_failing_records() {
    let dir = tempfile::tempdir().unwrap();
    let config = news_config(dir.path());
    let config = quarry_fts::CollectionConfig {
        searchable_fields: vec!["title".into(), "content".into(), "ndate".into()],
        ..config
    };
    let news = Collection::<NewsInfo>::open_record(config).unwrap();

    let batch = vec![
        NewsInfo::new(1, "中国经济", "增长强劲"),
        NewsInfo::new(2, "天气预报", "晴天").undated(),
        NewsInfo::new(3, "体育新闻", "中国队获得冠军"),
    ];
    let stats = news.add(&batch).unwrap();

    assert_eq!(stats.written, 2);
    assert_eq!(stats.skipped, 1);
    let failure = &stats.failures[0];
    assert_eq!(failure.position, 1);
    assert_eq!(failure.identifier.as_deref(), Some("2"));
    match &failure.error {
        Error::Projection { field, message } => {
            assert_eq!(field, "ndate");
            assert_eq!(message, "ndate is NULL");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(news.find_by_identifier("1").unwrap().is_some());
    assert!(news.find_by_identifier("2").unwrap().is_none());
    assert!(news.find_by_identifier("3").unwrap().is_some());
}

#[test]
fn test_prebuilt_documents_with_custom_typing() {
    let dir = tempfile::tempdir().unwrap();
    let config = news_config(dir.path())
        .with_extra_field(FieldDecl::new("author", FieldKind::Exact, true))
        .with_extra_field(FieldDecl::new("summary", FieldKind::Text, false));
    let news = Collection::<NewsInfo>::open_record(config).unwrap();

    let stats = news
        .add_documents(&[
            GenericDocument::builder("10")
                .field("title", "专题报道")
                .field("author", "Li Lei")
                .field("summary", "年度经济回顾")
                .build(),
            GenericDocument::builder("11")
                .field("title", "专题访谈")
                .field("author", "Han Meimei")
                .build(),
        ])
        .unwrap();
    assert_eq!(stats.written, 2);

    // Exact fields match the whole value only.
    news.delete_term("author", "Li").unwrap();
    assert_eq!(news.doc_count().unwrap(), 2);
    news.delete_term("author", "Li Lei").unwrap();
    assert_eq!(news.doc_count().unwrap(), 1);

    let doc = news.find_by_identifier("11").unwrap().unwrap();
    assert_eq!(doc.get("author"), Some("Han Meimei"));
}

#[test]
fn test_update_document_by_custom_term() {
    let dir = tempfile::tempdir().unwrap();
    let config = news_config(dir.path())
        .with_extra_field(FieldDecl::new("author", FieldKind::Exact, true));
    let news = Collection::<NewsInfo>::open_record(config).unwrap();

    news.add_documents(&[GenericDocument::builder("20")
        .field("title", "旧标题")
        .field("author", "Li Lei")
        .build()])
        .unwrap();

    let replacement = GenericDocument::builder("21")
        .field("title", "新标题")
        .field("author", "Li Lei")
        .build();
    news.update_document(&replacement, "author", "Li Lei").unwrap();

    assert_eq!(news.doc_count().unwrap(), 1);
    assert!(news.find_by_identifier("20").unwrap().is_none());
    assert!(news.find_by_identifier("21").unwrap().is_some());
}

#[test]
fn test_index_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let news = news_collection(dir.path());
        news.add(&headline_news()).unwrap();
    }

    let news = news_collection(dir.path());
    assert_eq!(news.state(), CollectionState::Populated);
    let result = news.search(["title", "content"], "中国", 10).unwrap();
    assert_eq!(result.identifiers(), vec!["1"]);
}

#[test]
fn test_reopen_with_different_layout_fails() {
    let dir = tempfile::tempdir().unwrap();
    news_collection(dir.path()).add(&headline_news()).unwrap();

    let config = quarry_fts::CollectionConfig {
        searchable_fields: vec!["title".into()],
        ..news_config(dir.path())
    };
    let err = Collection::<NewsInfo>::open_record(config).unwrap_err();
    assert!(matches!(err, Error::SchemaMismatch { .. }));
}

#[test]
fn test_namespaces_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    let archive_config = quarry_fts::CollectionConfig {
        namespace: "NewsArchive".to_string(),
        ..news_config(dir.path())
    };
    let archive = Collection::<NewsInfo>::open_record(archive_config).unwrap();

    news.add(&headline_news()).unwrap();

    assert_eq!(news.doc_count().unwrap(), 2);
    assert_eq!(archive.doc_count().unwrap(), 0);
    assert_ne!(news.index_path(), archive.index_path());
    assert!(news.index_path().ends_with("NewsInfo"));
}
