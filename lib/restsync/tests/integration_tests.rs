//! Integration tests for `HyperTransport` using wiremock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert2::{check, let_assert};
use restsync::{
    AjaxConfig, CrudMethod, HyperTransport, Model, OutgoingRequest, Response, ResponseBody,
    SyncOptions, Syncer,
};
use serde_json::{Value, json};
use tokio::sync::oneshot;
use wiremock::{
    Match, Mock, MockServer, Request, ResponseTemplate,
    matchers::{body_json, body_string, header, method, path, query_param},
};

struct Todo {
    url: String,
    json: Value,
    ajax: AjaxConfig,
}

impl Todo {
    fn at(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            json: json!({"title": "milk", "done": false}),
            ajax: AjaxConfig::default(),
        }
    }
}

impl Model for Todo {
    fn to_json(&self, _options: &SyncOptions) -> Value {
        self.json.clone()
    }

    fn url(&self) -> Option<String> {
        Some(self.url.clone())
    }

    fn ajax_config(&self) -> AjaxConfig {
        self.ajax.clone()
    }
}

/// Matches a form-encoded body by its decoded content.
struct FormBody(Value);

impl Match for FormBody {
    fn matches(&self, request: &Request) -> bool {
        std::str::from_utf8(&request.body)
            .ok()
            .and_then(|body| restsync::parse_query_string(body).ok())
            .is_some_and(|decoded| decoded == self.0)
    }
}

/// What the callbacks of one sync call observed.
#[derive(Debug, Default)]
struct Report {
    success: Option<(u16, ResponseBody)>,
    error: Option<(Option<u16>, String)>,
    status_text: &'static str,
    raw: String,
}

fn with_report(options: SyncOptions) -> (SyncOptions, Arc<Mutex<Report>>, oneshot::Receiver<()>) {
    let report = Arc::new(Mutex::new(Report::default()));
    let (done, finished) = oneshot::channel();

    let on_success = Arc::clone(&report);
    let on_error = Arc::clone(&report);
    let on_always = Arc::clone(&report);
    let options = options
        .on_success(move |body, response| {
            on_success.lock().expect("lock").success = Some((response.status(), body));
        })
        .on_error(move |response, message| {
            on_error.lock().expect("lock").error =
                Some((response.map(Response::status), message.to_string()));
        })
        .on_always(move |outcome| {
            {
                let mut report = on_always.lock().expect("lock");
                report.status_text = outcome.status_text();
                report.raw = String::from_utf8_lossy(&outcome.raw_body()).into_owned();
            }
            let _ = done.send(());
        });

    (options, report, finished)
}

async fn run(
    syncer: &Syncer,
    crud: CrudMethod,
    model: Option<&dyn Model>,
    options: SyncOptions,
) -> Report {
    let (options, report, finished) = with_report(options);
    syncer.sync(crud, model, options).expect("sync");

    tokio::time::timeout(Duration::from_secs(10), finished)
        .await
        .expect("completed in time")
        .expect("always callback ran");

    std::mem::take(&mut *report.lock().expect("lock"))
}

#[tokio::test]
async fn test_read_sends_payload_as_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .and(query_param("page", "2"))
        .and(query_param("filter[done]", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let todos = Todo::at(format!("{}/todos", mock_server.uri()));
    let options = SyncOptions::new().data(json!({"page": 2, "filter": {"done": true}}));

    let report = run(&restsync::syncer(), CrudMethod::Read, Some(&todos), options).await;

    let_assert!(Some((200, ResponseBody::Json(body))) = report.success);
    check!(body == json!([{"id": 1}]));
    check!(report.error.is_none());
    check!(report.status_text == "success");
}

#[tokio::test]
async fn test_create_posts_model_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "milk", "done": false})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos", mock_server.uri()));
    let report = run(&restsync::syncer(), CrudMethod::Create, Some(&todo), SyncOptions::new()).await;

    let_assert!(Some((201, ResponseBody::Json(body))) = report.success);
    check!(body == json!({"id": 42}));
    check!(report.raw == r#"{"id":42}"#);
}

#[tokio::test]
async fn test_json_emulation_sends_form_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todos"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(FormBody(json!({"model": {"title": "milk", "done": "false"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos", mock_server.uri()));
    let options = SyncOptions::new().emulate_json(true);
    let report = run(&restsync::syncer(), CrudMethod::Create, Some(&todo), options).await;

    check!(report.status_text == "success");
}

#[tokio::test]
async fn test_http_emulation_tunnels_update_through_post() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todos/7"))
        .and(header("x-http-method-override", "PUT"))
        .and(body_json(json!({"title": "milk", "done": false})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos/7", mock_server.uri()));
    let syncer = Syncer::new(HyperTransport::new()).with_config(
        restsync::SyncConfig::builder().emulate_http(true).build(),
    );
    let report = run(&syncer, CrudMethod::Update, Some(&todo), SyncOptions::new()).await;

    let_assert!(Some((204, ResponseBody::Text(body))) = report.success);
    check!(body.is_empty());
}

#[tokio::test]
async fn test_both_emulations_put_verb_in_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/todos/7"))
        .and(header("x-http-method-override", "DELETE"))
        .and(body_string("_method=DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos/7", mock_server.uri()));
    let options = SyncOptions::new().emulate_http(true).emulate_json(true);
    let report = run(&restsync::syncer(), CrudMethod::Delete, Some(&todo), options).await;

    check!(report.status_text == "success");
}

#[tokio::test]
async fn test_http_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos/404", mock_server.uri()));
    let report = run(&restsync::syncer(), CrudMethod::Read, Some(&todo), SyncOptions::new()).await;

    check!(report.success.is_none());
    let_assert!(Some((Some(404), message)) = report.error);
    check!(message == "HTTP404");
    check!(report.status_text == "error");
}

#[tokio::test]
async fn test_http_error_body_becomes_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/todos/1"))
        .respond_with(ResponseTemplate::new(422).set_body_string("title is required"))
        .mount(&mock_server)
        .await;

    let todo = Todo::at(format!("{}/todos/1", mock_server.uri()));
    let options = SyncOptions::new().attrs(json!({"title": ""}));
    let report = run(&restsync::syncer(), CrudMethod::Patch, Some(&todo), options).await;

    let_assert!(Some((Some(422), message)) = report.error);
    check!(message == "title is required");
    check!(report.raw == "title is required");
}

#[tokio::test]
async fn test_invalid_json_suppresses_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let todos = Todo::at(format!("{}/todos", mock_server.uri()));
    let report = run(&restsync::syncer(), CrudMethod::Read, Some(&todos), SyncOptions::new()).await;

    check!(report.success.is_none());
    let_assert!(Some((Some(200), message)) = report.error);
    check!(message.contains("JSON"));
    check!(report.raw == "not json");
}

#[tokio::test]
async fn test_text_accept_skips_json_parsing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/readme"))
        .and(header("accept", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&mock_server)
        .await;

    let options = SyncOptions::new()
        .url(format!("{}/readme", mock_server.uri()))
        .header("Accept", "text/plain");
    let report = run(&restsync::syncer(), CrudMethod::Read, None, options).await;

    let_assert!(Some((200, ResponseBody::Text(body))) = report.success);
    check!(body == "hello");
}

#[tokio::test]
async fn test_connection_error() {
    let options = SyncOptions::new().url("http://127.0.0.1:1/todos");
    let report = run(&restsync::syncer(), CrudMethod::Read, None, options).await;

    check!(report.success.is_none());
    let_assert!(Some((None, message)) = report.error);
    check!(message.starts_with("connection error"));
    check!(report.raw.is_empty());
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let transport = HyperTransport::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let options = SyncOptions::new().url(format!("{}/slow", mock_server.uri()));
    let report = run(&Syncer::new(transport), CrudMethod::Read, None, options).await;

    let_assert!(Some((None, message)) = report.error);
    check!(message == "request timeout");
}

#[tokio::test]
async fn test_relative_url_joins_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/todos/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base = restsync::url::Url::parse(&format!("{}/api/", mock_server.uri())).expect("url");
    let transport = HyperTransport::builder().base_url(base).build();
    let todo = Todo::at("todos/3");

    let report = run(&Syncer::new(transport), CrudMethod::Delete, Some(&todo), SyncOptions::new()).await;

    check!(report.status_text == "success");
}

#[tokio::test]
async fn test_relative_url_without_base_fails() {
    let todo = Todo::at("/todos/3");
    let report = run(&restsync::syncer(), CrudMethod::Read, Some(&todo), SyncOptions::new()).await;

    let_assert!(Some((None, message)) = report.error);
    check!(message.starts_with("invalid URL"));
}

#[tokio::test]
async fn test_model_headers_and_hook_reach_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/todos"))
        .and(header("authorization", "Bearer model-token"))
        .and(header("x-request-id", "abc"))
        .and(header("user-agent", "restsync-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut todos = Todo::at(format!("{}/todos", mock_server.uri()));
    todos.ajax = AjaxConfig::default()
        .header("Authorization", "Bearer model-token")
        .before_send(Arc::new(|request: &mut OutgoingRequest| -> Option<Value> {
            request.set_header("X-Request-Id", "abc");
            None
        }));

    let transport = HyperTransport::builder().user_agent("restsync-test").build();
    let report = run(&Syncer::new(transport), CrudMethod::Read, Some(&todos), SyncOptions::new()).await;

    check!(report.status_text == "success");
}

#[tokio::test]
async fn test_cancelled_request_never_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let options = SyncOptions::new().url(format!("{}/slow", mock_server.uri()));
    let (options, report, finished) = with_report(options);
    let handle = restsync::syncer()
        .sync(CrudMethod::Read, None, options)
        .expect("sync");

    check!(handle.is_cancellable());
    handle.cancel();

    let waited = tokio::time::timeout(Duration::from_secs(2), finished).await;
    let_assert!(Ok(Err(_)) = waited);

    let report = report.lock().expect("lock");
    check!(report.success.is_none());
    check!(report.error.is_none());
}

#[test]
fn test_send_without_runtime_reports_error() {
    let options = SyncOptions::new().url("http://127.0.0.1:1/todos");
    let (options, report, _finished) = with_report(options);

    let handle = restsync::syncer()
        .sync(CrudMethod::Read, None, options)
        .expect("sync");

    check!(!handle.is_cancellable());
    let report = report.lock().expect("lock");
    let_assert!(Some((None, message)) = &report.error);
    check!(message.contains("no Tokio runtime"));
    check!(report.status_text == "error");
}
