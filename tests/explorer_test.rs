//! End-to-end session flows through Explorer.

use std::sync::Arc;
use std::time::Duration;

use openlens::stores::{MemoryNavigator, Navigator};
use openlens::types::TermType;
use openlens::{Explorer, RetryConfig, SchedulerConfig, Topic};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MIT_LINEAGE: &str = "authorships.institutions.lineage:I63966007";

async fn mount_mit(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/institutions"))
        .and(query_param("search", "MIT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "https://openalex.org/I63966007",
                "display_name": "Massachusetts Institute of Technology"
            }]
        })))
        .expect(1)
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("filter", MIT_LINEAGE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 1000}})))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("filter", format!("{MIT_LINEAGE},primary_topic.id:T10017")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"meta": {"count": 80}})))
        .mount(mock_server)
        .await;
}

fn explorer(mock_server: &MockServer, navigator: Arc<MemoryNavigator>) -> Explorer {
    Explorer::builder()
        .base_url(mock_server.uri())
        .scheduler(SchedulerConfig::new().min_delay(Duration::ZERO))
        .retry(RetryConfig::disabled())
        .navigator(navigator)
        .build()
        .unwrap()
}

#[tokio::test]
async fn initialize_fetches_under_restored_topic() {
    let mock_server = MockServer::start().await;
    mount_mit(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/topics/T10017"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "display_name": "Machine Learning"
        })))
        .mount(&mock_server)
        .await;

    let query = "q=MIT&topic=T10017";
    let navigator = Arc::new(MemoryNavigator::with_query("/explore", query));
    let explorer = explorer(&mock_server, navigator.clone());

    explorer.initialize(query).await;

    assert_eq!(explorer.topic().get().display_name, "Machine Learning");
    let terms = explorer.terms().terms();
    let works = terms[0].data.as_ref().unwrap().works.as_ref().unwrap();
    assert_eq!(works.count, 80);
    assert_eq!(navigator.query(), query);
}

#[tokio::test]
async fn select_topic_refreshes_works_without_new_search() {
    let mock_server = MockServer::start().await;
    mount_mit(&mock_server).await;

    let navigator = Arc::new(MemoryNavigator::with_query("/explore", "q=MIT"));
    let explorer = explorer(&mock_server, navigator.clone());
    explorer.initialize("q=MIT").await;
    assert_eq!(
        explorer.terms().terms()[0].data.as_ref().unwrap().works.as_ref().unwrap().count,
        1000
    );

    explorer
        .select_topic(Topic::new("T10017", "Machine Learning"))
        .await;

    let terms = explorer.terms().terms();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[1].kind, TermType::Compare);
    assert_eq!(
        terms[0].data.as_ref().unwrap().works.as_ref().unwrap().count,
        80
    );
    assert_eq!(navigator.query(), "q=MIT&topic=T10017");

    // Back to all topics: the earlier aggregate is still cached.
    explorer.select_topic(Topic::all()).await;
    assert_eq!(
        explorer.terms().terms()[0].data.as_ref().unwrap().works.as_ref().unwrap().count,
        1000
    );
    assert_eq!(navigator.query(), "q=MIT");
}

#[tokio::test]
async fn loading_store_tracks_batches() {
    let mock_server = MockServer::start().await;
    mount_mit(&mock_server).await;

    let explorer = explorer(&mock_server, Arc::new(MemoryNavigator::default()));
    assert!(explorer.loading().get().is_loading);

    explorer.initialize("q=MIT").await;

    let state = explorer.loading().get();
    assert!(!state.is_loading);
    assert!(state.error.is_none());
}
