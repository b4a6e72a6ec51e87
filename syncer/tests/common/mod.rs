#![allow(dead_code)]

//! Scripted stand-ins for the upstream APIs, served from a dedicated thread
//! with its own runtime so the test body keeps full control of time and
//! cancellation on its side.

use std::collections::{HashMap, HashSet};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::thread::JoinHandle;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use tokio::sync::oneshot;
use url::Url;

/// Shared state of the NVD mock: canned pages keyed by `startIndex`, a set
/// of request ordinals (1-based) that answer with a 500, and a capture of
/// everything the engine sent.
#[derive(Default)]
pub struct NvdState {
    pub pages: Mutex<HashMap<usize, Value>>,
    pub fail_hits: Mutex<HashSet<usize>>,
    pub hits: AtomicUsize,
    pub requests: Mutex<Vec<HashMap<String, String>>>,
}

async fn cves(
    state: web::Data<NvdState>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    let params = query.into_inner();
    let start_index = params
        .get("startIndex")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);
    state.requests.lock().unwrap().push(params);

    if state.fail_hits.lock().unwrap().contains(&hit) {
        return HttpResponse::InternalServerError().finish();
    }
    match state.pages.lock().unwrap().get(&start_index) {
        Some(page) => HttpResponse::Ok().json(page),
        None => HttpResponse::NotFound().finish(),
    }
}

pub struct MockNvd {
    pub url: Url,
    pub state: web::Data<NvdState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockNvd {
    pub fn spawn() -> Self {
        let _ = env_logger::try_init();

        let state = web::Data::new(NvdState::default());
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/rest/json/cves/2.0")).unwrap();

        let app_state = state.clone();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = std::thread::spawn(move || {
            let runtime = Runtime::new().unwrap();
            runtime.block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .route("/rest/json/cves/2.0", web::get().to(cves))
                })
                .workers(1)
                .listen(listener)
                .unwrap()
                .run();
                tokio::select! {
                    _ = server => {}
                    _ = rx => {}
                }
            });
        });

        Self {
            url,
            state,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn serve_page(&self, start_index: usize, page: Value) {
        self.state.pages.lock().unwrap().insert(start_index, page);
    }

    pub fn fail_hits(&self, hits: impl IntoIterator<Item = usize>) {
        self.state.fail_hits.lock().unwrap().extend(hits);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockNvd {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Response envelope in the API 2.0 shape.
pub fn page(
    results_per_page: usize,
    total_results: usize,
    timestamp: &str,
    cves: Vec<Value>,
) -> Value {
    json!({
        "resultsPerPage": results_per_page,
        "startIndex": 0,
        "totalResults": total_results,
        "format": "NVD_CVE",
        "version": "2.0",
        "timestamp": timestamp,
        "vulnerabilities": cves.into_iter().map(|cve| json!({"cve": cve})).collect::<Vec<_>>(),
    })
}

pub fn cve(id: &str) -> Value {
    cve_from(id, "cve@mitre.org")
}

pub fn cve_from(id: &str, source: &str) -> Value {
    json!({
        "id": id,
        "sourceIdentifier": source,
        "published": "2023-01-01T10:00:00.000",
        "lastModified": "2023-06-01T10:00:00.000",
        "vulnStatus": "Analyzed",
        "descriptions": [{"lang": "en", "value": format!("Description of {id}.")}]
    })
}

pub fn rejected_cve(id: &str) -> Value {
    let mut value = cve(id);
    value["vulnStatus"] = json!("Rejected");
    value
}

/// Shared state of the VulnCheck mock: pages keyed by cursor (empty string
/// for the first page) plus captured auth headers.
#[derive(Default)]
pub struct VulnCheckState {
    pub pages: Mutex<HashMap<String, Value>>,
    pub fail_hits: Mutex<HashSet<usize>>,
    pub hits: AtomicUsize,
    pub auth: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<HashMap<String, String>>>,
}

async fn vulncheck_index(
    request: HttpRequest,
    state: web::Data<VulnCheckState>,
    query: web::Query<HashMap<String, String>>,
) -> HttpResponse {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    let params = query.into_inner();
    let cursor = params.get("cursor").cloned().unwrap_or_default();
    state.requests.lock().unwrap().push(params);
    state.auth.lock().unwrap().push(
        request
            .headers()
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    );

    if state.fail_hits.lock().unwrap().contains(&hit) {
        return HttpResponse::InternalServerError().finish();
    }
    match state.pages.lock().unwrap().get(&cursor) {
        Some(page) => HttpResponse::Ok().json(page),
        None => HttpResponse::NotFound().finish(),
    }
}

pub struct MockVulnCheck {
    pub url: Url,
    pub state: web::Data<VulnCheckState>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl MockVulnCheck {
    pub fn spawn() -> Self {
        let _ = env_logger::try_init();

        let state = web::Data::new(VulnCheckState::default());
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = Url::parse(&format!("http://127.0.0.1:{port}/v3/index/nist-nvd2")).unwrap();

        let app_state = state.clone();
        let (tx, rx) = oneshot::channel::<()>();
        let handle = std::thread::spawn(move || {
            let runtime = Runtime::new().unwrap();
            runtime.block_on(async move {
                let server = HttpServer::new(move || {
                    App::new()
                        .app_data(app_state.clone())
                        .route("/v3/index/nist-nvd2", web::get().to(vulncheck_index))
                })
                .workers(1)
                .listen(listener)
                .unwrap()
                .run();
                tokio::select! {
                    _ = server => {}
                    _ = rx => {}
                }
            });
        });

        Self {
            url,
            state,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn serve_page(&self, cursor: &str, page: Value) {
        self.state.pages.lock().unwrap().insert(cursor.to_string(), page);
    }

    pub fn fail_hits(&self, hits: impl IntoIterator<Item = usize>) {
        self.state.fail_hits.lock().unwrap().extend(hits);
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn auth(&self) -> Vec<String> {
        self.state.auth.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<HashMap<String, String>> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockVulnCheck {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
