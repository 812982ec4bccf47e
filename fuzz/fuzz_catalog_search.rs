//! Fuzz target for catalog loading and search.
//!
//! Run with: cargo +nightly fuzz run fuzz_catalog_search
//!
//! The input is split at the first newline: the head is the search text and
//! course filter (separated by `|`), the tail is the catalog JSON.

#![no_main]

use coursemind_core::catalog::{CourseCatalog, MemoryCatalog, SearchQuery};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let (head, json) = s.split_once('\n').unwrap_or((s, "{\"courses\": []}"));
    let Ok(catalog) = MemoryCatalog::from_json(json) else {
        return;
    };

    let (text, course) = head.split_once('|').unwrap_or((head, ""));
    let mut query = SearchQuery::new(text, 5);
    if !course.is_empty() {
        query = query.in_course(course);
    }
    if let Ok(hits) = catalog.search(&query) {
        assert!(hits.len() <= 5);
    }
    let _ = catalog.resolve_course(text);
});
