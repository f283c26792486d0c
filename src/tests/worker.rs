use super::{Reply, Request, Worker};
use crate::api::ApiClient;
use crate::error::Error;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test(flavor = "multi_thread")]
async fn test_worker_round_trips_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/d9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "id": "d9", "filename": "x.pdf", "status": "completed",
                "upload_date": "2024-01-01T00:00:00", "total_sections": 1
            },
            "sections": [{"id": "s1", "title": "Only", "content": "", "page_number": 1}]
        })))
        .mount(&server)
        .await;

    let client = ApiClient::with_timeout(&server.uri(), Duration::from_secs(5)).unwrap();
    let reply = tokio::task::spawn_blocking(move || {
        let worker = Worker::spawn(client);
        assert!(worker.send(Request::OpenDocument {
            document_id: "d9".to_string(),
            focus: Some("s1".to_string()),
        }));
        worker.wait(Duration::from_secs(5))
    })
    .await
    .unwrap();

    match reply {
        Some(Reply::Document {
            document_id,
            focus,
            result,
        }) => {
            assert_eq!(document_id, "d9");
            assert_eq!(focus.as_deref(), Some("s1"));
            assert_eq!(result.unwrap().sections.len(), 1);
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn test_blank_search_fails_without_network() {
    // Nothing listens on this port; a blank query must never get that far.
    let client = ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
    let worker = Worker::spawn(client);
    assert!(worker.send(Request::Search {
        query: "  ".to_string()
    }));

    match worker.wait(Duration::from_secs(5)) {
        Some(Reply::Search(Err(Error::InvalidInput(_)))) => {}
        other => panic!("unexpected reply: {other:?}"),
    }
    assert!(worker.drain().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_slow_search_does_not_hold_up_the_document_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "long answer"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "query": "long answer", "response": "eventually", "citations": []
                }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"documents": []})))
        .mount(&server)
        .await;

    let client = ApiClient::with_timeout(&server.uri(), Duration::from_secs(5)).unwrap();
    let (first, second) = tokio::task::spawn_blocking(move || {
        let worker = Worker::spawn(client);
        assert!(worker.send(Request::Search {
            query: "long answer".to_string()
        }));
        assert!(worker.send(Request::ListDocuments));
        let first = worker.wait(Duration::from_secs(1));
        let second = worker.wait(Duration::from_secs(5));
        (first, second)
    })
    .await
    .unwrap();

    assert!(
        matches!(first, Some(Reply::Documents(Ok(ref listing))) if listing.documents.is_empty()),
        "unexpected first reply: {first:?}"
    );
    match second {
        Some(Reply::Search(Ok(result))) => assert_eq!(result.response, "eventually"),
        other => panic!("unexpected reply: {other:?}"),
    }
}
