//! InstitutionDataService caching and per-term isolation against wiremock.

use std::time::Duration;

use openlens::data::works_key;
use openlens::{Explorer, InstitutionDataService, RetryConfig, SchedulerConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(mock_server: &MockServer) -> InstitutionDataService {
    Explorer::builder()
        .base_url(mock_server.uri())
        .scheduler(SchedulerConfig::new().min_delay(Duration::ZERO))
        .retry(RetryConfig::new().initial_delay(Duration::from_millis(1)))
        .build_data_service()
        .unwrap()
}

fn institution_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": format!("https://openalex.org/{id}"),
        "display_name": name,
        "works_count": 1000,
        "cited_by_count": 50000
    })
}

async fn mount_search(mock_server: &MockServer, term: &str, id: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path("/institutions"))
        .and(query_param("search", term))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [institution_json(id, name)]
        })))
        .mount(mock_server)
        .await;
}

async fn mount_works(mock_server: &MockServer, id: &str, count: u64) {
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param(
            "filter",
            format!("authorships.institutions.lineage:{id}"),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "meta": {"count": count, "cited_by_count_sum": count * 10}
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn fetch_many_merges_works_into_each_institution() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "MIT", "I63966007", "MIT").await;
    mount_search(&mock_server, "Stanford", "I97018004", "Stanford University").await;
    mount_works(&mock_server, "I63966007", 10).await;
    mount_works(&mock_server, "I97018004", 20).await;

    let service = service(&mock_server);
    let results = service.fetch_many(&["MIT", "Stanford"], None).await;

    assert_eq!(results.len(), 2);
    let mit = results["MIT"].as_ref().expect("MIT resolved");
    assert_eq!(mit.works.as_ref().unwrap().count, 10);
    let stanford = results["Stanford"].as_ref().expect("Stanford resolved");
    assert_eq!(stanford.works.as_ref().unwrap().cited_by_count_sum, Some(200));
}

#[tokio::test]
async fn second_fetch_is_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/institutions"))
        .and(query_param("search", "MIT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [institution_json("I63966007", "MIT")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 5}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service(&mock_server);
    let first = service.fetch_one("MIT", None).await;
    let second = service.fetch_one("MIT", Some("allTopics")).await;

    assert_eq!(first, second);
    assert!(service.institution_cache().has("MIT"));
    assert!(service.works_cache().has(&works_key("I63966007", None)));
}

#[tokio::test]
async fn new_topic_refetches_works_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/institutions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [institution_json("I1", "Somewhere")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("filter", "authorships.institutions.lineage:I1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 100}})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param(
            "filter",
            "authorships.institutions.lineage:I1,primary_topic.id:T5",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 7}})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service(&mock_server);
    let all = service.fetch_one("Somewhere", None).await.unwrap();
    let scoped = service.fetch_one("Somewhere", Some("T5")).await.unwrap();

    assert_eq!(all.works.unwrap().count, 100);
    assert_eq!(scoped.works.unwrap().count, 7);
}

#[tokio::test]
async fn cached_terms_add_no_stagger_to_works_misses() {
    let mock_server = MockServer::start().await;
    let terms = ["A", "B", "C", "D", "E"];
    for (i, term) in terms.iter().enumerate() {
        let id = format!("I{i}");
        mount_search(&mock_server, term, &id, term).await;
        mount_works(&mock_server, &id, 1).await;
    }

    let service = Explorer::builder()
        .base_url(mock_server.uri())
        .scheduler(SchedulerConfig::new().min_delay(Duration::from_millis(75)))
        .retry(RetryConfig::disabled())
        .build_data_service()
        .unwrap();
    service.fetch_many(&terms[..4], None).await;

    // Only E misses: its lookups are the first misses of the batch.
    let started = std::time::Instant::now();
    let results = service.fetch_many(&terms, None).await;
    let elapsed = started.elapsed();

    assert!(results["E"].as_ref().unwrap().works.is_some());
    assert!(
        elapsed < Duration::from_millis(250),
        "works miss was staggered by batch position: {elapsed:?}"
    );
}

#[tokio::test]
async fn duplicate_terms_are_fetched_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/institutions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [institution_json("I1", "Somewhere")]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_works(&mock_server, "I1", 1).await;

    let results = service(&mock_server)
        .fetch_many(&["Somewhere", "Somewhere"], None)
        .await;
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn failures_are_isolated_per_term() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "MIT", "I63966007", "MIT").await;
    mount_works(&mock_server, "I63966007", 10).await;

    // Stanford's search fails permanently.
    Mock::given(method("GET"))
        .and(path("/institutions"))
        .and(query_param("search", "Stanford"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    // Harvard resolves but its works lookup fails.
    mount_search(&mock_server, "Harvard", "I136199984", "Harvard University").await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("filter", "authorships.institutions.lineage:I136199984"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&mock_server)
        .await;

    let service = service(&mock_server);
    let results = service
        .fetch_many(&["MIT", "Stanford", "Harvard"], None)
        .await;

    assert!(results["MIT"].as_ref().unwrap().works.is_some());
    assert!(results["Stanford"].is_none());
    let harvard = results["Harvard"].as_ref().expect("institution without works");
    assert!(harvard.works.is_none());
    // Failed lookups are not cached.
    assert!(!service.institution_cache().has("Stanford"));
}

#[tokio::test]
async fn empty_term_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    assert!(service(&mock_server).fetch_one("  ", None).await.is_none());
}

#[tokio::test]
async fn topic_name_is_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topics/T10017"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_name": "Machine Learning"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = service(&mock_server);
    let first = service.topic("T10017").await.unwrap().unwrap();
    let second = service.topic("T10017").await.unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(second.display_name, "Machine Learning");
}
