use super::{form_filename, validate_query, validate_upload, ApiClient};
use crate::error::Error;
use crate::lifecycle::DocumentStatus;
use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::{tempdir, Builder};
use wiremock::matchers::{body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiClient::with_timeout(&server.uri(), Duration::from_secs(5)).unwrap()
}

async fn blocking<T, F>(f: F) -> T
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.unwrap()
}

#[test]
fn test_rejects_unparseable_base_url() {
    let result = ApiClient::with_timeout("not a url", Duration::from_secs(1));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_blank_query_rejected() {
    assert!(matches!(validate_query("   \t"), Err(Error::InvalidInput(_))));
    assert_eq!(validate_query("  budget 2024 ").unwrap(), "budget 2024");
}

#[test]
fn test_only_pdf_uploads() {
    assert_eq!(
        validate_upload(Path::new("/tmp/Report.PDF")).unwrap(),
        "Report.PDF"
    );
    assert!(validate_upload(Path::new("/tmp/notes.txt")).is_err());
    assert!(validate_upload(Path::new("/tmp/pdf")).is_err());
}

#[test]
fn test_form_filename_cannot_break_out_of_its_header() {
    assert_eq!(form_filename("Annual Report.pdf"), "Annual Report.pdf");
    assert_eq!(
        form_filename("evil\r\nContent-Type: text/html\r\n\r\nx.pdf"),
        "evil__Content-Type: text/html____x.pdf"
    );
    assert_eq!(form_filename("say \"hi\".pdf"), "say _hi_.pdf");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_documents_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [
                {
                    "id": "d1",
                    "filename": "a.pdf",
                    "status": "in_progress",
                    "upload_date": "2024-03-01T10:15:00.123456",
                    "total_sections": 4
                },
                {
                    "id": "d2",
                    "filename": "b.pdf",
                    "status": "failed",
                    "upload_date": "2024-03-02T08:00:00Z",
                    "error_message": "no text layer"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let listing = blocking(move || client.list_documents()).await.unwrap();

    assert_eq!(listing.documents.len(), 2);
    assert_eq!(listing.documents[0].status, DocumentStatus::InProgress);
    assert_eq!(listing.documents[0].upload_day(), "2024-03-01");
    assert_eq!(listing.documents[1].total_sections, 0);
    assert_eq!(listing.documents[1].failure(), Some("no text layer"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_document_tolerates_missing_optional_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {
                "id": "d1",
                "filename": "a.pdf",
                "status": "completed",
                "upload_date": "2024-03-01T10:15:00",
                "total_sections": 2,
                "unexpected": true
            },
            "sections": [
                {"id": "s1", "title": "Intro", "content": "Hello", "page_number": 1},
                {"id": "s2", "title": "More", "content": "", "page_number": 2,
                 "parent_id": "s1", "children": []}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let detail = blocking(move || client.get_document("d1")).await.unwrap();

    assert_eq!(detail.sections.len(), 2);
    assert_eq!(detail.sections[0].parent_id, None);
    assert!(detail.sections[0].children.is_empty());
    assert_eq!(detail.sections[1].parent_id.as_deref(), Some("s1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_get_section_by_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/d1/sections/s2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s2", "title": "Results", "content": "Numbers", "page_number": 7
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let section = blocking(move || client.get_section("d1", "s2"))
        .await
        .unwrap();

    assert_eq!(section.title, "Results");
    assert_eq!(section.page_number, 7);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_sends_query_and_keeps_citation_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "net revenue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "net revenue",
            "response": "Revenue grew.",
            "citations": [
                {"document_id": "d1", "document_name": "a.pdf", "section_id": "s3",
                 "section_title": "Revenue", "text": "grew 4%", "score": 0.873},
                {"document_id": "d2", "document_name": "b.pdf", "section_id": "s1",
                 "section_title": "Summary", "text": "up", "score": 0.41}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = blocking(move || client.search("  net revenue ")).await.unwrap();

    assert_eq!(result.response, "Revenue grew.");
    assert_eq!(result.citations[0].section_id, "s3");
    assert_eq!(result.citations[1].document_id, "d2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Document not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = blocking(move || client.get_document("missing")).await;

    assert!(matches!(result, Err(Error::Status { code: 404 })));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = blocking(move || client.list_documents()).await;

    assert!(matches!(result, Err(Error::Decode(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_posts_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("%PDF-1.4 fake"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document_id": "new-id",
            "filename": "report.pdf",
            "status": "pending",
            "message": "Document uploaded successfully and processing started"
        })))
        .mount(&server)
        .await;

    let mut file = Builder::new().suffix(".pdf").tempfile().unwrap();
    write!(file, "%PDF-1.4 fake").unwrap();
    let file_path = file.path().to_path_buf();

    let client = client_for(&server);
    let ack = blocking(move || client.upload(&file_path)).await.unwrap();

    assert_eq!(ack.document_id, "new-id");
    assert_eq!(ack.status, DocumentStatus::Pending);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_and_reset_acknowledge() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Document deleted successfully"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/documents/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "All documents deleted",
            "deleted_count": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let (deleted, reset) = blocking(move || (client.delete_document("d1"), client.reset())).await;

    assert_eq!(deleted.unwrap().message, "Document deleted successfully");
    assert_eq!(reset.unwrap().message, "All documents deleted");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_upload_with_line_breaks_in_file_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(body_string_contains("filename=\"evil__X-Injected: 1.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document_id": "odd-name",
            "filename": "evil.pdf",
            "status": "pending",
            "message": "Document uploaded successfully and processing started"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    let file_path = dir.path().join("evil\r\nX-Injected: 1.pdf");
    std::fs::write(&file_path, "%PDF-1.4 fake").unwrap();

    let client = client_for(&server);
    let ack = blocking(move || client.upload(&file_path)).await.unwrap();

    assert_eq!(ack.document_id, "odd-name");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreadable_acknowledgement_still_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/documents/d1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("deleted"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let ack = blocking(move || client.delete_document("d1")).await.unwrap();

    assert!(ack.message.is_empty());
}
