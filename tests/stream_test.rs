//! Live stream tests, with scripted frames and against a wiremock SSE endpoint.

mod common;

use std::time::Duration;

use common::{message_json, mock_client, test_client, test_config, TEST_FLOW, TEST_ORG};
use flowdock::error::StreamError;
use flowdock::{ClientConfig, Content, FramePolicy, StreamStatus};
use futures_util::StreamExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_n_frames_yield_n_messages_in_order() {
    let (client, _, events) = mock_client(ClientConfig::new());
    for id in 1..=50 {
        events.push_data(message_json(id));
    }
    events.finish();

    let stream = client.messages().stream("token", TEST_ORG, TEST_FLOW).unwrap();
    let ids: Vec<i64> = stream.filter_map(|m| async move { m.id }).collect().await;

    assert_eq!(ids, (1..=50).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_read_error_after_k_frames_stops_delivery() {
    let (client, _, events) = mock_client(ClientConfig::new());
    for id in 1..=4 {
        events.push_data(message_json(id));
    }
    events.push_error(StreamError::ConnectionLost {
        message: "gave up after 3 reconnect attempts".to_string(),
    });
    events.push_data(message_json(5));

    let mut stream = client.messages().stream("token", TEST_ORG, TEST_FLOW).unwrap();
    let mut ids = Vec::new();
    while let Some(message) = stream.recv().await {
        ids.push(message.id.unwrap());
    }

    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!(stream.is_finished());
    assert!(matches!(
        stream.status(),
        StreamStatus::Failed(StreamError::ConnectionLost { .. })
    ));
    assert!(events.is_released());
}

#[tokio::test]
async fn test_skip_policy_from_config() {
    let (client, _, events) =
        mock_client(ClientConfig::new().with_frame_policy(FramePolicy::Skip));
    events.push_data(message_json(1));
    events.push_data("<html>oops</html>");
    events.push_data(message_json(2));
    events.finish();

    let mut stream = client.messages().stream("token", TEST_ORG, TEST_FLOW).unwrap();
    let first = stream.recv().await.unwrap();
    let second = stream.recv().await.unwrap();

    assert_eq!((first.id, second.id), (Some(1), Some(2)));
    assert_eq!(stream.recv().await, None);
    assert_eq!(stream.status(), StreamStatus::Ended);
}

#[tokio::test]
async fn test_close_stops_quiet_stream() {
    let (client, _, events) = mock_client(ClientConfig::new());

    let mut stream = client.messages().stream("token", TEST_ORG, TEST_FLOW).unwrap();
    let status = tokio::time::timeout(TIMEOUT, stream.close())
        .await
        .expect("close returned");

    assert_eq!(status, StreamStatus::Cancelled);
    assert!(events.is_released());
    assert_eq!(stream.recv().await, None);
}

#[tokio::test]
async fn test_open_failure_is_returned() {
    let (client, _, events) = mock_client(ClientConfig::new());
    events.fail_open(StreamError::InvalidUrl {
        url: "https://stream.flowdock.com/flows/acme/main?access_token=***".to_string(),
        message: "bad".to_string(),
    });

    let err = client
        .messages()
        .stream("token", TEST_ORG, TEST_FLOW)
        .unwrap_err();

    assert_eq!(err.error_code(), "E_STREAM_URL");
}

#[tokio::test]
async fn test_sse_endpoint_end_to_end() {
    let server = MockServer::start().await;

    let body = format!(
        "data: {}\n\n: keep-alive\n\ndata: {}\n\n",
        r#"{"id":1,"event":"message","content":"first"}"#,
        r#"{"id":2,"event":"comment","message":1,"content":{"title":"first","text":"second"}}"#,
    );
    Mock::given(method("GET"))
        .and(path("/flows/acme/main"))
        .and(query_param("access_token", "s3cret"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut stream = client.messages().stream("s3cret", TEST_ORG, TEST_FLOW).unwrap();

    let first = tokio::time::timeout(TIMEOUT, stream.recv())
        .await
        .expect("first message")
        .unwrap();
    let second = tokio::time::timeout(TIMEOUT, stream.recv())
        .await
        .expect("second message")
        .unwrap();

    assert_eq!(first.id, Some(1));
    assert_eq!(first.content().unwrap().to_string(), "first");
    assert_eq!(second.id, Some(2));
    assert!(matches!(second.content().unwrap(), Content::Comment(_)));

    stream.close().await;
}

#[tokio::test]
async fn test_sse_rejected_subscription_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/flows/acme/main"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;

    common::init_tracing();
    let client = flowdock::Client::new(
        test_config(&server.uri()).with_max_reconnect_attempts(Some(2)),
    )
    .unwrap();
    let mut stream = client.messages().stream("wrong", TEST_ORG, TEST_FLOW).unwrap();

    let next = tokio::time::timeout(TIMEOUT, stream.recv()).await.expect("stream stopped");
    assert!(next.is_none());

    let status = stream.wait().await;
    assert!(
        matches!(status, StreamStatus::Failed(StreamError::Rejected { .. })),
        "Expected a rejected subscription, got {:?}",
        status
    );
}
