#![allow(dead_code)]

use actix_web::{
    http::StatusCode,
    middleware::{from_fn, NormalizePath},
    web, App, HttpRequest, HttpResponse, HttpServer,
};
use bythewave_backend::{
    middlewares::cors::{build_cors, preflight_no_content},
    routes::configure_routes,
    settings::AppConfig,
    use_cases::extractors::PayloadLimit,
    AppState,
};
use parking_lot::Mutex;
use reqwest::Client;
use serde_json::{json, Value};
use std::{net::TcpListener, sync::Arc, time::Duration};

pub const TEST_API_KEY: &str = "re_test_0123456789abcdef";

/// One call the fake mail provider received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct RecordedEmails(Arc<Mutex<Vec<RecordedRequest>>>);

impl RecordedEmails {
    pub fn count(&self) -> usize {
        self.0.lock().len()
    }

    pub fn last(&self) -> Option<RecordedRequest> {
        self.0.lock().last().cloned()
    }
}

#[derive(Clone, Default)]
pub struct RecordedQueries(Arc<Mutex<Vec<String>>>);

impl RecordedQueries {
    pub fn all(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

struct ProviderReply {
    status: u16,
    body: Value,
}

/// What the fake CMS knows. Any query mentioning a rejected field
/// is answered with a GraphQL `errors` list, like a drifted schema would.
#[derive(Clone)]
pub struct CmsScript {
    pub rejected_fields: Vec<&'static str>,
    pub vehicles: Value,
}

impl Default for CmsScript {
    fn default() -> Self {
        CmsScript {
            rejected_fields: Vec::new(),
            vehicles: json!([]),
        }
    }
}

pub struct TestSetup {
    pub api_key: Option<String>,
    pub provider_status: u16,
    pub provider_body: Value,
    pub provider_reachable: bool,
    pub cms: CmsScript,
    pub cms_reachable: bool,
    pub rate_limit_max: u32,
    pub max_payload_bytes: usize,
}

impl Default for TestSetup {
    fn default() -> Self {
        TestSetup {
            api_key: Some(TEST_API_KEY.to_string()),
            provider_status: 200,
            provider_body: json!({ "id": "4ef9a417-02e9-4d39-ad75-9611e0fcc33c" }),
            provider_reachable: true,
            cms: CmsScript::default(),
            cms_reachable: true,
            rate_limit_max: 8,
            max_payload_bytes: 64 * 1024,
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub config: AppConfig,
    pub state: web::Data<AppState>,
    pub emails: RecordedEmails,
    pub queries: RecordedQueries,
}

async fn fake_resend(
    req: HttpRequest,
    body: web::Json<Value>,
    reply: web::Data<ProviderReply>,
    log: web::Data<RecordedEmails>,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    log.0.lock().push(RecordedRequest {
        authorization,
        body: body.into_inner(),
    });

    let status = StatusCode::from_u16(reply.status).unwrap();
    HttpResponse::build(status).json(&reply.body)
}

async fn fake_graphql(
    body: web::Json<Value>,
    script: web::Data<CmsScript>,
    log: web::Data<RecordedQueries>,
) -> HttpResponse {
    let query = body["query"].as_str().unwrap_or_default().to_string();
    log.0.lock().push(query.clone());

    if let Some(field) = script.rejected_fields.iter().find(|f| query.contains(*f)) {
        return HttpResponse::Ok().json(json!({
            "errors": [
                { "message": format!("Cannot query field \"{}\" on type \"PopisVozidla\".", field) }
            ]
        }));
    }

    HttpResponse::Ok().json(json!({
        "data": { "vozidla": { "nodes": script.vehicles } }
    }))
}

fn bind_local() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

/// An address nobody listens on.
fn dead_address(path: &str) -> String {
    let (listener, port) = bind_local();
    drop(listener);
    format!("http://127.0.0.1:{}{}", port, path)
}

fn spawn_fake_resend(status: u16, body: Value, log: RecordedEmails) -> String {
    let (listener, port) = bind_local();
    let reply = web::Data::new(ProviderReply { status, body });
    let log = web::Data::new(log);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(reply.clone())
            .app_data(log.clone())
            .route("/emails", web::post().to(fake_resend))
    })
    .listen(listener)
    .expect("Failed to bind fake mail provider")
    .workers(1)
    .run();

    tokio::spawn(server);
    format!("http://127.0.0.1:{}/emails", port)
}

fn spawn_fake_cms(script: CmsScript, log: RecordedQueries) -> String {
    let (listener, port) = bind_local();
    let script = web::Data::new(script);
    let log = web::Data::new(log);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(script.clone())
            .app_data(log.clone())
            .route("/graphql", web::post().to(fake_graphql))
    })
    .listen(listener)
    .expect("Failed to bind fake CMS")
    .workers(1)
    .run();

    tokio::spawn(server);
    format!("http://127.0.0.1:{}/graphql", port)
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestSetup::default()).await
    }

    pub async fn spawn_with(setup: TestSetup) -> Self {
        let emails = RecordedEmails::default();
        let queries = RecordedQueries::default();

        let mut config = AppConfig::for_testing();
        config.resend_api_key = setup.api_key;
        config.rate_limit_max = setup.rate_limit_max;
        config.max_payload_bytes = setup.max_payload_bytes;
        config.resend_api_url = if setup.provider_reachable {
            spawn_fake_resend(setup.provider_status, setup.provider_body, emails.clone())
        } else {
            dead_address("/emails")
        };
        config.graphql_endpoint = if setup.cms_reachable {
            spawn_fake_cms(setup.cms, queries.clone())
        } else {
            dead_address("/graphql")
        };

        let state = web::Data::new(AppState::new(&config).expect("Failed to build app state"));

        let (listener, port) = bind_local();
        let address = format!("http://127.0.0.1:{}", port);

        let app_state = state.clone();
        let cors_origins = config.cors_origins();
        let payload_limit = PayloadLimit(config.max_payload_bytes);
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .app_data(payload_limit)
                .wrap(build_cors(&cors_origins))
                .wrap(from_fn(preflight_no_content))
                .wrap(NormalizePath::trim())
                .configure(configure_routes)
        })
        .listen(listener)
        .expect("Failed to bind server")
        .workers(config.worker_count)
        .run();

        tokio::spawn(server);

        let client = Client::new();
        while client.get(&format!("{}/", address)).send().await.is_err() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        Self {
            address,
            client,
            config,
            state,
            emails,
            queries,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post_form(&self, path: &str, fields: &[(&str, String)]) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .form(fields)
            .send()
            .await
            .expect("Failed to send form")
    }

    pub async fn post_multipart(&self, path: &str, fields: &[(&str, String)]) -> reqwest::Response {
        let boundary = "----btw-test-boundary-7MA4YWxkTrZu0gW";
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        self.client
            .post(&self.url(path))
            .header("Content-Type", format!("multipart/form-data; boundary={boundary}"))
            .body(body)
            .send()
            .await
            .expect("Failed to send multipart form")
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send JSON")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(&self.url(path))
            .send()
            .await
            .expect("Failed to send GET")
    }
}
