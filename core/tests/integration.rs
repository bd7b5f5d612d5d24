//! Session tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `Session` over real
//! loopback HTTP. The `/echo` route reports back what the server received,
//! which is how these tests see the method, headers and body that actually
//! went over the wire.

use std::net::SocketAddr;
use std::sync::OnceLock;

use curlex_core::{Request, Session, SessionConfig, Verb};
use mock_server::Echo;

/// Start one mock server for the whole test binary.
fn server() -> SocketAddr {
    static ADDR: OnceLock<SocketAddr> = OnceLock::new();
    *ADDR.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });
        addr
    })
}

fn request(endpoint: &str) -> Request {
    Request::new()
        .scheme("http")
        .host(&server().to_string())
        .endpoint(endpoint)
}

fn echo_of(body: &str) -> Echo {
    serde_json::from_str(body).unwrap()
}

#[test]
fn get_with_params_and_headers() {
    let mut session = Session::new();
    let req = request("echo")
        .add_param("q", "abc")
        .add_param("limit", 10)
        .add_header("X-Custom", "value")
        .add_header("X-Number", 7)
        .build();

    let resp = session.get(&req).expect("response");
    assert_eq!(resp.code(), 200);

    let echo = echo_of(resp.body());
    assert_eq!(echo.method, "GET");
    assert_eq!(echo.query.as_deref(), Some("q=abc&limit=10"));
    assert_eq!(echo.headers["x-custom"], "value");
    assert_eq!(echo.headers["x-number"], "7");
}

#[test]
fn response_headers_are_sorted() {
    let mut session = Session::new();
    let resp = session.get(&request("headers").build()).expect("response");
    assert_eq!(resp.body(), "headers");

    let headers = resp.headers();
    assert!(headers.iter().all(|line| line.contains(':')));
    let mut sorted = headers.to_vec();
    sorted.sort();
    assert_eq!(headers, sorted.as_slice());

    let alpha = headers.iter().position(|h| h == "x-alpha: first").unwrap();
    let zulu = headers.iter().position(|h| h == "x-zulu: last").unwrap();
    assert!(alpha < zulu);
    assert_eq!(resp.header("Content-Language"), Some("en"));
}

#[test]
fn post_streams_data() {
    let mut session = Session::new();
    let payload = "x".repeat(100_000) + "end";
    let req = request("echo")
        .data(&payload)
        .add_header("Content-Type", "text/plain")
        .build();

    let resp = session.post(&req).expect("response");
    assert_eq!(resp.code(), 200);
    let echo = echo_of(resp.body());
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body.len(), payload.len());
    assert_eq!(echo.body, payload);
    assert_eq!(echo.headers["content-length"], payload.len().to_string());
}

#[test]
fn post_falls_back_to_body() {
    let mut session = Session::new();
    let resp = session
        .post(&request("echo").body("from body").build())
        .expect("response");
    assert_eq!(echo_of(resp.body()).body, "from body");
}

#[test]
fn post_without_payload() {
    let mut session = Session::new();
    let resp = session.post(&request("echo").build()).expect("response");
    let echo = echo_of(resp.body());
    assert_eq!(echo.method, "POST");
    assert!(echo.body.is_empty());
}

#[test]
fn options_uses_custom_method() {
    let mut session = Session::new();
    let resp = session.options(&request("echo").build()).expect("response");
    assert_eq!(echo_of(resp.body()).method, "OPTIONS");
}

#[test]
fn non_success_status_is_still_a_response() {
    let mut session = Session::new();
    let resp = session.get(&request("status/404").build()).expect("response");
    assert_eq!(resp.code(), 404);
    assert_eq!(resp.body(), "status 404");
    assert!(!resp.is_success());
}

#[test]
fn second_call_does_not_inherit_first() {
    let mut session = Session::new();

    let first = request("echo")
        .add_header("X-First", "1")
        .add_param("first", 1)
        .verbose()
        .build();
    let resp = session.options(&first).expect("first response");
    assert_eq!(echo_of(resp.body()).method, "OPTIONS");

    let second = request("echo").build();
    let resp = session.get(&second).expect("second response");
    let echo = echo_of(resp.body());
    assert_eq!(echo.method, "GET");
    assert!(echo.query.is_none());
    assert!(!echo.headers.contains_key("x-first"));
}

#[test]
fn get_after_post_is_a_plain_get() {
    let mut session = Session::new();
    session
        .post(&request("echo").data("payload").add_header("X-Post", "yes").build())
        .expect("post response");

    let resp = session.get(&request("echo").build()).expect("get response");
    let echo = echo_of(resp.body());
    assert_eq!(echo.method, "GET");
    assert!(echo.body.is_empty());
    assert!(!echo.headers.contains_key("x-post"));
    assert!(!echo.headers.contains_key("content-length"));
}

#[test]
fn session_recovers_after_failure() {
    let mut session = Session::new();
    let dead = Request::new()
        .scheme("http")
        .host("127.0.0.1:1")
        .add_header("X-Dead", "1")
        .build();
    assert!(session.get(&dead).is_none());
    assert!(session.perform(Verb::Post, &dead).is_err());

    let resp = session.get(&request("echo").build()).expect("response");
    assert!(!echo_of(resp.body()).headers.contains_key("x-dead"));
}

#[test]
fn clones_run_independently() {
    let mut original = Session::new();
    let mut copy = original.clone();

    let post = request("echo").data("from clone").build();
    let get = request("echo").add_header("X-Original", "1").build();

    let copy_resp = copy.post(&post).expect("clone response");
    let orig_resp = original.get(&get).expect("original response");

    let copy_echo = echo_of(copy_resp.body());
    assert_eq!(copy_echo.method, "POST");
    assert_eq!(copy_echo.body, "from clone");
    assert!(!copy_echo.headers.contains_key("x-original"));

    let orig_echo = echo_of(orig_resp.body());
    assert_eq!(orig_echo.method, "GET");
    assert!(orig_echo.body.is_empty());

    // Reverse order on the same pair.
    let orig_resp = original.post(&post).expect("original post");
    let copy_resp = copy.get(&get).expect("clone get");
    assert_eq!(echo_of(orig_resp.body()).method, "POST");
    assert_eq!(echo_of(copy_resp.body()).method, "GET");
}

#[test]
fn clones_work_across_threads() {
    let session = Session::new();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let mut session = session.clone();
            let req = request("echo").add_param("worker", i).build();
            std::thread::spawn(move || {
                let resp = session.get(&req).expect("response");
                echo_of(resp.body()).query
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Some(format!("worker={i}")));
    }
}

#[test]
fn config_persists_across_calls_and_clones() {
    let config = SessionConfig {
        user_agent: Some("curlex-test/1.0".to_string()),
        timeout_ms: Some(5_000),
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(config);

    for _ in 0..2 {
        let resp = session.get(&request("echo").build()).expect("response");
        assert_eq!(echo_of(resp.body()).headers["user-agent"], "curlex-test/1.0");
    }

    let mut copy = session.clone();
    let resp = copy.get(&request("echo").build()).expect("response");
    assert_eq!(echo_of(resp.body()).headers["user-agent"], "curlex-test/1.0");
}

#[test]
fn reset_params_then_rebuild() {
    let mut session = Session::new();
    let req = request("echo").add_param("a", 1).build().reset_params();
    assert!(session.get(&req).is_none());

    let resp = session.get(&req.build()).expect("response");
    assert!(echo_of(resp.body()).query.is_none());
}
