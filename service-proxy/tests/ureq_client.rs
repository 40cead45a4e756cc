use std::io::Read;

use mockito::{Matcher, Server, ServerGuard};
use serde::{Deserialize, Serialize};
use service_proxy::{
    Body, Error, HttpClient, HttpRequest, RequestOptions, ServiceApi, ServiceProxy,
    ServiceProxyOptions, UreqClient,
};

fn proxy_for(server: &ServerGuard, options: ServiceProxyOptions) -> ServiceProxy {
    let options = ServiceProxyOptions {
        scheme: "http".to_string(),
        host: server.host_with_port(),
        ..options
    };
    ServiceProxy::with_client(options, UreqClient::with_timeout(5))
}

fn api_table() -> ServiceProxyOptions {
    ServiceProxyOptions::default()
        .with_api("getUser", ServiceApi::get("/users/42"))
        .with_api("createUser", ServiceApi::post("/users"))
        .with_api("updateUser", ServiceApi::put("/users/42"))
        .with_api("deleteUser", ServiceApi::delete("/users/42"))
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
}

#[test]
fn get_with_query_and_headers() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/users/42")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("fields".into(), "id,name".into()),
            Matcher::UrlEncoded("q".into(), "a b".into()),
        ]))
        .match_header("x-request-id", "abc")
        .with_status(200)
        .with_body("raw bytes")
        .create();

    let proxy = proxy_for(&server, api_table());
    let opts = RequestOptions::new("getUser")
        .with_query("fields", "id,name")
        .with_query("q", "a b")
        .with_header("X-Request-Id", "abc");

    let body = proxy.request(&opts).unwrap();

    assert_eq!(body, b"raw bytes");
    mock.assert();
}

#[test]
fn form_body_is_urlencoded() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/users")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body("name=alice")
        .with_status(201)
        .create();

    let proxy = proxy_for(&server, api_table());
    let opts = RequestOptions::new("createUser").with_body(Body::form([("name", "alice")]));

    assert!(proxy.request(&opts).unwrap().is_empty());
    mock.assert();
}

#[test]
fn json_body_and_json_response() {
    #[derive(Serialize)]
    struct Rename<'a> {
        name: &'a str,
    }

    let mut server = Server::new();
    let mock = server
        .mock("PUT", "/users/42")
        .match_header("content-type", "application/json")
        .match_body(Matcher::JsonString(r#"{"name":"bob"}"#.to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":42,"name":"bob"}"#)
        .create();

    let proxy = proxy_for(&server, api_table());
    let body = Body::json(&Rename { name: "bob" }).unwrap();
    let opts = RequestOptions::new("updateUser").with_body(body);

    let user: User = proxy.json(&opts).unwrap();

    assert_eq!(
        user,
        User {
            id: 42,
            name: "bob".to_string()
        }
    );
    mock.assert();
}

#[test]
fn text_body_is_sent_verbatim() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/users")
        .match_body("plain payload")
        .with_status(200)
        .with_body("ok")
        .create();

    let proxy = proxy_for(&server, api_table());
    let opts = RequestOptions::new("createUser").with_body("plain payload");

    assert_eq!(proxy.request(&opts).unwrap(), b"ok");
    mock.assert();
}

#[test]
fn preprocessor_headers_reach_the_server() {
    let mut server = Server::new();
    let mock = server
        .mock("DELETE", "/users/42")
        .match_header("authorization", "Bearer secret")
        .with_status(204)
        .create();

    let proxy = proxy_for(
        &server,
        api_table().with_preprocessor(|req: &mut HttpRequest| {
            req.headers.set("Authorization", "Bearer secret");
        }),
    );

    proxy.request(&RequestOptions::new("deleteUser")).unwrap();
    mock.assert();
}

#[test]
fn error_status_is_reported_without_body() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/users/42")
        .with_status(404)
        .with_body("user not found")
        .create();

    let proxy = proxy_for(&server, api_table());

    let err = proxy.request(&RequestOptions::new("getUser")).unwrap_err();

    assert!(matches!(err, Error::UnexpectedStatus { code: 404, .. }));
    assert!(!err.to_string().contains("user not found"));
    mock.assert();
}

#[test]
fn server_error_is_reported() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/users")
        .with_status(503)
        .create();

    let proxy = proxy_for(&server, api_table());

    let err = proxy
        .json::<User>(&RequestOptions::new("createUser"))
        .unwrap_err();

    assert_eq!(err.status(), Some(503));
    mock.assert();
}

#[test]
fn connection_refused_is_a_transport_failure() {
    // nothing listens on port 1
    let proxy = ServiceProxy::with_client(
        api_table_at("127.0.0.1:1"),
        UreqClient::with_timeout(5),
    );

    let err = proxy.request(&RequestOptions::new("getUser")).unwrap_err();

    match err {
        Error::Transport { url, .. } => assert_eq!(url, "http://127.0.0.1:1/users/42"),
        other => panic!("expected transport failure, got {other:?}"),
    }
}

fn api_table_at(host: &str) -> ServiceProxyOptions {
    ServiceProxyOptions {
        scheme: "http".to_string(),
        host: host.to_string(),
        ..api_table()
    }
}

#[test]
fn custom_agent_exposes_response_headers() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/health")
        .match_header("user-agent", "service-proxy-test")
        .with_status(200)
        .with_header("x-trace-id", "t-1")
        .with_body("up")
        .create();

    let agent = ureq::AgentBuilder::new()
        .user_agent("service-proxy-test")
        .build();
    let client = UreqClient::with_agent(agent);
    let request = HttpRequest::new("GET", format!("{}/health", server.url()));

    let mut response = client.execute(&request).unwrap();
    let mut body = String::new();
    response.body.read_to_string(&mut body).unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.headers.get("X-Trace-Id"), Some("t-1"));
    assert_eq!(body, "up");
    mock.assert();
}

#[test]
fn error_status_is_returned_as_response_by_client() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_header("x-reason", "gone")
        .create();

    let client = UreqClient::default();
    let request = HttpRequest::new("GET", format!("{}/missing", server.url()));

    let response = client.execute(&request).unwrap();

    assert_eq!(response.status, 404);
    assert!(!response.is_success());
    assert_eq!(response.headers.get("x-reason"), Some("gone"));
    mock.assert();
}
