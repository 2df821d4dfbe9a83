//! Integration tests for concurrent access to one namespace.

use std::sync::Barrier;

use crate::common::{NewsInfo, news_collection};

#[test]
fn test_concurrent_adds_are_all_committed() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());

    std::thread::scope(|scope| {
        for t in 0..4 {
            let news = news.clone();
            scope.spawn(move || {
                for i in 0..10 {
                    let nid = t * 100 + i;
                    news.add(&[NewsInfo::new(nid, "并发写入", "内容")]).unwrap();
                }
            });
        }
    });

    assert_eq!(news.doc_count().unwrap(), 40);
}

#[test]
fn test_readers_run_alongside_writers() {
    let dir = tempfile::tempdir().unwrap();
    let news = news_collection(dir.path());
    news.add(&[NewsInfo::new(0, "初始", "内容")]).unwrap();

    let barrier = Barrier::new(3);
    std::thread::scope(|scope| {
        let writer = news.clone();
        let barrier_ref = &barrier;
        scope.spawn(move || {
            barrier_ref.wait();
            for i in 1..=20 {
                writer.update(&NewsInfo::new(i, "更新", "内容")).unwrap();
            }
        });

        for _ in 0..2 {
            let reader = news.clone();
            scope.spawn(move || {
                barrier_ref.wait();
                let mut last = 0;
                for _ in 0..20 {
                    // Each snapshot sees a committed state that never goes back.
                    let count = reader.doc_count().unwrap();
                    assert!(count >= last);
                    assert!((1..=21).contains(&count));
                    last = count;
                    reader.search(["title", "content"], "内容", 50).unwrap();
                }
            });
        }
    });

    assert_eq!(news.doc_count().unwrap(), 21);
}

#[test]
fn test_separate_handles_share_the_writer_lock() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    std::thread::scope(|scope| {
        for t in 0..3 {
            let root = root.clone();
            scope.spawn(move || {
                let news = news_collection(&root);
                for i in 0..5 {
                    news.add(&[NewsInfo::new(t * 10 + i, "独立句柄", "内容")]).unwrap();
                }
            });
        }
    });

    assert_eq!(news_collection(&root).doc_count().unwrap(), 15);
}
