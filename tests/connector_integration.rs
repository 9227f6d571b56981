//! Integration tests for the connector through its public API.
//!
//! Hosts are simulated by a scripted in-memory transport so every request
//! the connector makes can be asserted on.

use std::sync::Arc;

use hean_core::{
    Chapter, ChapterLocator, DirectoryCache, HeanConnector, HostConfig, NoCache, PageListOutcome,
    ProgressToken, ReleaseStatus, RequestPurpose, Work,
};
use serde_json::{Value, json};

mod support;
use support::scripted_transport::ScriptedTransport;

const HOST: &str = "https://api.example.com";

fn connector(transport: &Arc<ScriptedTransport>) -> HeanConnector {
    HeanConnector::new(
        HostConfig::new(HOST).unwrap(),
        transport.clone(),
        Arc::new(NoCache),
    )
}

fn series_json(slug: &str, title: &str) -> Value {
    json!({
        "id": 31,
        "title": title,
        "series_slug": slug,
        "author": "Chugong",
        "description": "<p>Hunters</p>",
        "alternative_names": "Na Honjaman Level Up",
        "tags": [{"name": "Action"}],
        "thumbnail": "https://cdn.example.com/covers/solo.webp",
        "release_year": 2018,
        "status": "Ongoing"
    })
}

fn series_with_seasons(seasons: Value) -> Value {
    let mut series = series_json("solo-leveling", "Solo Leveling");
    series["seasons"] = seasons;
    series
}

fn work() -> Work {
    hean_core::map_series_json(
        &series_json("solo-leveling", "Solo Leveling"),
        &HostConfig::new(HOST).unwrap(),
    )
    .unwrap()
}

fn chapter(locator: &str) -> Chapter {
    Chapter::new("solo-leveling", "", "1", "1", ChapterLocator::new(locator))
}

// ==================== Series ====================

#[tokio::test]
async fn test_find_by_title_resolves_every_hit() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_json(
                &format!("{HOST}/query?query_string=Solo"),
                json!({"data": [{"series_slug": "solo-leveling"}, {"series_slug": "solo-max"}]}),
            )
            .with_json(
                &format!("{HOST}/series/solo-leveling"),
                series_json("solo-leveling", "Solo Leveling"),
            )
            .with_json(
                &format!("{HOST}/series/solo-max"),
                series_json("solo-max", "Solo Max-Level Newbie"),
            ),
    );

    let works = connector(&transport).find_by_title("Solo").await;

    let titles: Vec<_> = works.iter().map(|work| work.title.as_str()).collect();
    assert_eq!(titles, vec!["Solo Leveling", "Solo Max-Level Newbie"]);
    assert_eq!(works[0].status, ReleaseStatus::Continuing);
    assert_eq!(
        transport.requested_urls(),
        vec![
            format!("{HOST}/query?query_string=Solo"),
            format!("{HOST}/series/solo-leveling"),
            format!("{HOST}/series/solo-max"),
        ]
    );
}

#[tokio::test]
async fn test_find_by_title_server_error_returns_empty() {
    let transport = Arc::new(ScriptedTransport::new().with_response(
        &format!("{HOST}/query?query_string=Solo"),
        500,
        "internal error",
    ));

    let works = connector(&transport).find_by_title("Solo").await;

    assert!(works.is_empty());
    assert_eq!(transport.requested_urls().len(), 1);
}

#[tokio::test]
async fn test_find_by_title_encodes_term() {
    let transport = Arc::new(ScriptedTransport::new());

    let works = connector(&transport).find_by_title("Solo Leveling").await;

    assert!(works.is_empty());
    assert_eq!(
        transport.requested_urls(),
        vec![format!("{HOST}/query?query_string=Solo%20Leveling")]
    );
}

#[tokio::test]
async fn test_find_by_title_drops_unresolvable_hits() {
    let mut broken = series_json("broken", "Broken");
    broken.as_object_mut().unwrap().remove("title");
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_json(
                &format!("{HOST}/query?query_string=Solo"),
                json!({"data": [{"series_slug": "broken"}, null, {"title": "no slug"}, {"series_slug": "gone"}, {"series_slug": "solo-leveling"}]}),
            )
            .with_json(&format!("{HOST}/series/broken"), broken)
            .with_response(&format!("{HOST}/series/gone"), 404, "")
            .with_json(
                &format!("{HOST}/series/solo-leveling"),
                series_json("solo-leveling", "Solo Leveling"),
            ),
    );

    let works = connector(&transport).find_by_title("Solo").await;

    assert_eq!(works.len(), 1);
    assert_eq!(works[0].id, "solo-leveling");
}

#[tokio::test]
async fn test_resolve_by_slug_maps_work() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/series/solo-leveling"),
        series_json("solo-leveling", "Solo Leveling"),
    ));

    let work = connector(&transport)
        .resolve_by_slug("solo-leveling")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(work.id, "solo-leveling");
    assert_eq!(work.description, "Hunters");
    assert_eq!(work.year, Some(2018));
    assert_eq!(work.website_url, "https://example.com/series/solo-leveling");
    assert_eq!(
        transport.requests(),
        vec![(
            format!("{HOST}/series/solo-leveling"),
            RequestPurpose::SeriesInfo
        )]
    );
}

#[tokio::test]
async fn test_resolve_by_slug_missing_title_is_error() {
    let mut series = series_json("solo-leveling", "Solo Leveling");
    series.as_object_mut().unwrap().remove("title");
    let transport = Arc::new(
        ScriptedTransport::new().with_json(&format!("{HOST}/series/solo-leveling"), series),
    );

    let result = connector(&transport).resolve_by_slug("solo-leveling").await;

    let err = result.unwrap_err();
    assert!(err.to_string().contains("title"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_resolve_by_slug_undecodable_body_is_absent() {
    let transport = Arc::new(ScriptedTransport::new().with_response(
        &format!("{HOST}/series/solo-leveling"),
        200,
        "<html>maintenance</html>",
    ));

    let result = connector(&transport).resolve_by_slug("solo-leveling").await;

    assert!(result.unwrap().is_none());
}

#[tokio::test]
async fn test_resolve_by_url_extracts_slug() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/series/solo-leveling"),
        series_json("solo-leveling", "Solo Leveling"),
    ));

    let work = connector(&transport)
        .resolve_by_url("https://example.com/series/solo-leveling?ref=home")
        .await
        .unwrap();

    assert_eq!(work.unwrap().id, "solo-leveling");
}

#[tokio::test]
async fn test_resolve_by_url_foreign_url_makes_no_request() {
    let transport = Arc::new(ScriptedTransport::new());

    let work = connector(&transport)
        .resolve_by_url("https://other.example.org/manga/solo-leveling")
        .await
        .unwrap();

    assert!(work.is_none());
    assert!(transport.requested_urls().is_empty());
}

#[tokio::test]
async fn test_resolve_caches_cover_through_cache_writer() {
    let cache_dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_json(
                &format!("{HOST}/series/solo-leveling"),
                series_json("solo-leveling", "Solo Leveling"),
            )
            .with_response("https://cdn.example.com/covers/solo.webp", 200, vec![1u8, 2, 3]),
    );
    let cache = Arc::new(DirectoryCache::new(cache_dir.path(), transport.clone()));
    let connector = HeanConnector::new(HostConfig::new(HOST).unwrap(), transport.clone(), cache.clone());

    let work = connector
        .resolve_by_slug("solo-leveling")
        .await
        .unwrap()
        .unwrap();

    let cover = work.cover.unwrap();
    assert_eq!(cover.cache_name.as_deref(), Some("solo-leveling_solo.webp"));
    assert_eq!(cache.dir(), cache_dir.path());
    let stored = std::fs::read(cache.dir().join("solo-leveling_solo.webp")).unwrap();
    assert_eq!(stored, vec![1, 2, 3]);
    assert_eq!(cache.work("solo-leveling").unwrap().title, "Solo Leveling");
    assert!(
        transport
            .requests()
            .contains(&("https://cdn.example.com/covers/solo.webp".to_string(), RequestPurpose::CoverImage))
    );
}

// ==================== Chapters ====================

#[tokio::test]
async fn test_list_chapters_generation_one() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/series/solo-leveling"),
        series_with_seasons(json!([
            {"index": 2, "chapters": [{"index": "5", "chapter_slug": "ch5", "chapter_title": "Five", "price": 0}]}
        ])),
    ));

    let chapters = connector(&transport).list_chapters(&work()).await;

    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].volume, "2");
    assert_eq!(chapters[0].number, "5");
    assert_eq!(chapters[0].locator.as_str(), "ch5");
    assert_eq!(transport.requested_urls().len(), 1, "no generation-2 requests expected");
}

#[tokio::test]
async fn test_list_chapters_generation_one_orders_and_filters() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/series/solo-leveling"),
        series_with_seasons(json!([
            {"index": 2, "chapters": [
                {"index": "10", "chapter_slug": "c10"},
                {"index": "11", "chapter_slug": "c11", "price": 100}
            ]},
            {"index": 1, "chapters": [
                {"index": "10", "chapter_slug": "s1c10"},
                {"index": "9", "chapter_slug": "s1c9"}
            ]}
        ])),
    ));

    let chapters = connector(&transport).list_chapters(&work()).await;

    let locators: Vec<_> = chapters.iter().map(|c| c.locator.as_str()).collect();
    assert_eq!(locators, vec!["s1c9", "s1c10", "c10"]);
}

#[tokio::test]
async fn test_list_chapters_falls_back_to_generation_two() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_json(
                &format!("{HOST}/series/solo-leveling"),
                series_with_seasons(json!([])),
            )
            .with_json(
                &format!("{HOST}/chapter/query?series_id=31&perPage=9999&page=1"),
                json!({"data": [
                    {"id": 110, "chapter_name": "Chapter 10", "price": 0},
                    {"id": 111, "chapter_name": "Chapter 11", "price": 25},
                    {"id": 109, "chapter_name": "Chapter 9"}
                ]}),
            )
            .with_json(
                &format!("{HOST}/chapter/110"),
                json!({"chapter_slug": "chapter-10", "index": "10", "season": {"index": 1}}),
            )
            .with_json(
                &format!("{HOST}/chapter/109"),
                json!({"chapter_slug": "chapter-9", "chapter_title": "The Ninth", "index": "9", "season": {"index": 1}}),
            ),
    );

    let chapters = connector(&transport).list_chapters(&work()).await;

    let summary: Vec<_> = chapters
        .iter()
        .map(|c| (c.number.as_str(), c.locator.as_str(), c.title.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("9", "chapter-9", "The Ninth"),
            ("10", "chapter-10", "Chapter 10"),
        ]
    );
    assert!(
        !transport
            .requested_urls()
            .contains(&format!("{HOST}/chapter/111")),
        "paid chapter details must not be fetched"
    );
}

#[tokio::test]
async fn test_list_chapters_generation_two_failure_returns_empty() {
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_json(
                &format!("{HOST}/series/solo-leveling"),
                series_json("solo-leveling", "Solo Leveling"),
            )
            .with_json(
                &format!("{HOST}/chapter/query?series_id=31&perPage=9999&page=1"),
                json!({"data": [{"id": 1}, {"id": 2}]}),
            )
            .with_json(
                &format!("{HOST}/chapter/1"),
                json!({"chapter_slug": "chapter-1", "index": "1", "season": {"index": 1}}),
            )
            .with_response(&format!("{HOST}/chapter/2"), 503, ""),
    );

    let chapters = connector(&transport).list_chapters(&work()).await;

    assert!(chapters.is_empty());
}

#[tokio::test]
async fn test_list_chapters_retries_series_for_generation_two() {
    let series_url = format!("{HOST}/series/solo-leveling");
    let transport = Arc::new(
        ScriptedTransport::new()
            .with_response(&series_url, 503, "")
            .with_json(&series_url, json!({"id": 5, "seasons": []}))
            .with_json(
                &format!("{HOST}/chapter/query?series_id=5&perPage=9999&page=1"),
                json!({"data": [{"id": 9, "chapter_name": "Chapter 9"}]}),
            )
            .with_json(
                &format!("{HOST}/chapter/9"),
                json!({"chapter_slug": "chapter-9", "index": "9", "season": {"index": 1}}),
            ),
    );

    let chapters = connector(&transport).list_chapters(&work()).await;

    let locators: Vec<_> = chapters.iter().map(|c| c.locator.as_str()).collect();
    assert_eq!(locators, vec!["chapter-9"]);
    assert_eq!(
        transport.requested_urls(),
        vec![
            series_url.clone(),
            series_url,
            format!("{HOST}/chapter/query?series_id=5&perPage=9999&page=1"),
            format!("{HOST}/chapter/9"),
        ]
    );
}

#[tokio::test]
async fn test_list_chapters_series_failure_in_both_generations_returns_empty() {
    let series_url = format!("{HOST}/series/solo-leveling");
    let transport = Arc::new(ScriptedTransport::new().with_response(&series_url, 500, ""));

    let chapters = connector(&transport).list_chapters(&work()).await;

    assert!(chapters.is_empty());
    assert_eq!(
        transport.requested_urls(),
        vec![series_url.clone(), series_url]
    );
}

// ==================== Pages ====================

#[tokio::test]
async fn test_fetch_images_relative_urls() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/chapter/solo-leveling/ch5"),
        json!({"data": ["a.jpg", "b.jpg"]}),
    ));

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), None)
        .await;

    let pages = outcome.pages().unwrap();
    assert_eq!(
        pages.urls,
        vec![
            "https://api.example.com/a.jpg",
            "https://api.example.com/b.jpg"
        ]
    );
    let descriptor = pages.comic_info.clone().unwrap();
    let xml = std::fs::read_to_string(&descriptor).unwrap();
    assert!(xml.contains("<Series>Solo Leveling</Series>"));
    assert!(xml.contains("<PageCount>2</PageCount>"));
    std::fs::remove_file(descriptor).unwrap();
    assert_eq!(
        transport.requests(),
        vec![(
            format!("{HOST}/chapter/solo-leveling/ch5"),
            RequestPurpose::ChapterInfo
        )]
    );
}

#[tokio::test]
async fn test_fetch_images_absolute_urls_unchanged() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/chapter/solo-leveling/ch5"),
        json!({"chapter_thumbnail": "https://cdn.example.org/thumb.jpg", "chapter": {"chapter_data": {"images": ["https://cdn.example.org/1.jpg"]}}}),
    ));

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), None)
        .await;

    assert_eq!(
        outcome.pages().unwrap().urls,
        vec![
            "https://cdn.example.org/thumb.jpg",
            "https://cdn.example.org/1.jpg"
        ]
    );
}

#[tokio::test]
async fn test_fetch_images_paywall_is_payment_required() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/chapter/solo-leveling/ch5"),
        json!({"paywall": true, "data": ["a.jpg"]}),
    ));
    let token = ProgressToken::new();

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), Some(&token))
        .await;

    assert_eq!(outcome, PageListOutcome::PaymentRequired);
    assert_eq!(outcome.status_code(), 402);
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_fetch_images_without_image_list_is_no_content() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/chapter/solo-leveling/ch5"),
        json!({"paywall": false}),
    ));
    let token = ProgressToken::new();

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), Some(&token))
        .await;

    assert_eq!(outcome, PageListOutcome::NoContent);
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn test_fetch_images_transport_failure_is_no_content() {
    let transport = Arc::new(ScriptedTransport::new());

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), None)
        .await;

    assert_eq!(outcome.status_code(), 204);
}

#[tokio::test]
async fn test_fetch_images_cancelled_makes_no_request() {
    let transport = Arc::new(ScriptedTransport::new());
    let token = ProgressToken::new();
    token.request_cancellation();

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), Some(&token))
        .await;

    assert_eq!(outcome, PageListOutcome::Cancelled);
    assert_eq!(outcome.status_code(), 408);
    assert!(token.is_cancelled());
    assert!(transport.requested_urls().is_empty());
}

#[tokio::test]
async fn test_fetch_images_success_leaves_token_untouched() {
    let transport = Arc::new(ScriptedTransport::new().with_json(
        &format!("{HOST}/chapter/solo-leveling/ch5"),
        json!({"data": []}),
    ));
    let token = ProgressToken::new();

    let outcome = connector(&transport)
        .fetch_images(&work(), &chapter("ch5"), Some(&token))
        .await;

    let pages = outcome.pages().unwrap();
    assert!(pages.urls.is_empty());
    if let Some(path) = &pages.comic_info {
        std::fs::remove_file(path).unwrap();
    }
    assert!(!token.is_cancelled());
}
