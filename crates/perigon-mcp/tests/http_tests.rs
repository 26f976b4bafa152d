//! Router tests for the direct tool endpoint and the MCP HTTP transport.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use perigon_mcp::config::Config;
use perigon_mcp::server::transport::{AppState, create_router};

fn router_with(config: &Config) -> Router {
    let state = AppState::new(config, "http://localhost:8000".into()).unwrap();
    create_router(Arc::new(state))
}

fn router(mock_server: &MockServer) -> Router {
    router_with(&Config::for_testing(&mock_server.uri()))
}

fn post_json(uri: &str, key: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header("content-type", "application/json");
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn mount_articles(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "numResults": 1,
            "results": [{"articleId": "a1", "title": "Headline"}]
        })))
        .mount(mock_server)
        .await;
}

// =============================================================================
// /api/tools
// =============================================================================

#[tokio::test]
async fn test_list_tools_catalog() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(Request::builder().uri("/api/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let tools = body["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 13);
    assert_eq!(tools[0]["name"], "search_news_articles");
    assert_eq!(tools[0]["args"]["type"], "object");
}

#[tokio::test]
async fn test_call_tool_success_uses_caller_key() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/all"))
        .and(header("x-api-key", "caller-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "numResults": 1,
            "results": [{"articleId": "a1", "title": "Headline"}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = router(&mock_server)
        .oneshot(post_json(
            "/api/tools",
            Some("caller-key"),
            &json!({"tool": "search_news_articles", "args": {"query": "rates"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let text = body["result"].as_str().unwrap();
    assert!(text.starts_with("Got 1 articles"));
}

#[tokio::test]
async fn test_call_tool_result_is_text() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"numResults": 0, "results": []})))
        .mount(&mock_server)
        .await;

    let response = router(&mock_server)
        .oneshot(post_json(
            "/api/tools",
            Some("k"),
            &json!({
                "tool": "search_news_articles",
                "args": {"query": "inflation rate", "from": "2024-01-01"}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"result": "No results found"}));
}

#[tokio::test]
async fn test_call_tool_without_credential() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(post_json("/api/tools", None, &json!({"tool": "search_news_articles"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["code"], "AUTH_REQUIRED");
}

#[tokio::test]
async fn test_call_unknown_tool() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(post_json("/api/tools", Some("k"), &json!({"tool": "search_everything"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "TOOL_NOT_FOUND");
}

#[tokio::test]
async fn test_call_tool_invalid_arguments() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(post_json(
            "/api/tools",
            Some("k"),
            &json!({"tool": "search_news_articles", "args": {"size": "lots"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "INVALID_ARGUMENTS");
    assert_eq!(body["details"][0]["field"], "size");
}

#[tokio::test]
async fn test_call_tool_malformed_body() {
    let mock_server = MockServer::start().await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/tools")
        .header("content-type", "application/json")
        .header("x-api-key", "k")
        .body(Body::from("{not json"))
        .unwrap();
    let response = router(&mock_server).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_request_counter() {
    let mock_server = MockServer::start().await;
    mount_articles(&mock_server).await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.rate_limit_per_minute = Some(1);
    let app = router_with(&config);
    let body = json!({"tool": "search_news_articles"});

    let first = app.clone().oneshot(post_json("/api/tools", Some("k"), &body)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.clone().oneshot(post_json("/api/tools", Some("k"), &body)).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key("retry-after"));
    assert_eq!(read_json(second).await["code"], "RATE_LIMITED");

    // Another caller has its own window.
    let other = app.oneshot(post_json("/api/tools", Some("other"), &body)).await.unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_unconfigured() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(post_json(
            "/api/chat",
            Some("k"),
            &json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// =============================================================================
// MCP over HTTP
// =============================================================================

#[tokio::test]
async fn test_mcp_requires_credential() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(post_json(
            "/mcp",
            None,
            &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"]["code"], -32001);
}

#[tokio::test]
async fn test_mcp_tools_are_gated_by_scope() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/introspect"))
        .and(header("x-api-key", "scoped-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scopes": ["COMPANIES"]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = router(&mock_server);

    let init = app
        .clone()
        .oneshot(post_json(
            "/mcp",
            Some("scoped-key"),
            &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        ))
        .await
        .unwrap();
    assert_eq!(init.status(), StatusCode::OK);
    let session_id = init.headers()["mcp-session-id"].to_str().unwrap().to_string();

    let list = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("content-type", "application/json")
        .header("mcp-session-id", &session_id)
        .body(Body::from(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}).to_string()))
        .unwrap();
    let body = read_json(app.clone().oneshot(list).await.unwrap()).await;
    let names: Vec<&str> =
        body["result"]["tools"].as_array().unwrap().iter().filter_map(|t| t["name"].as_str()).collect();
    assert_eq!(names, vec!["search_news_articles", "search_companies", "get_company_news"]);

    // Hidden tools are unknown to this session.
    let call = Request::builder()
        .method("POST")
        .uri(format!("/mcp?sessionId={session_id}"))
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "tools/call",
                "params": {"name": "search_people", "arguments": {}}
            })
            .to_string(),
        ))
        .unwrap();
    let body = read_json(app.oneshot(call).await.unwrap()).await;
    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_mcp_introspection_failure_falls_back() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/introspect"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let app = router(&mock_server);
    let init = app
        .clone()
        .oneshot(post_json(
            "/mcp",
            Some("k"),
            &json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
        ))
        .await
        .unwrap();
    let body = read_json(init).await;
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "search_news_articles");
}

#[tokio::test]
async fn test_mcp_session_rejects_other_credential() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"scopes": []})))
        .mount(&mock_server)
        .await;

    let app = router(&mock_server);
    let init = app
        .clone()
        .oneshot(post_json(
            "/mcp",
            Some("owner-key"),
            &json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        ))
        .await
        .unwrap();
    let session_id = init.headers()["mcp-session-id"].to_str().unwrap().to_string();

    let hijack = post_json(
        &format!("/mcp?sessionId={session_id}"),
        Some("intruder-key"),
        &json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
    );
    let response = app.oneshot(hijack).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;
    let response = router(&mock_server)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["service"], "perigon-mcp");
}
