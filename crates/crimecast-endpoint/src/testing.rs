//! Stub HTTP server for exercising the clients against real sockets.

use std::sync::{Arc, Mutex};

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};

/// A request as the stub received it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Captured {
    fn from_request(req: &HttpRequest, body: &web::Bytes) -> Self {
        Self {
            method: req.method().to_string(),
            path: req.path().to_string(),
            headers: req
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect(),
            body: String::from_utf8_lossy(body).to_string(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Running stub that answers every request with one canned response.
pub struct StubServer {
    base_url: String,
    captured: Arc<Mutex<Vec<Captured>>>,
    handle: ServerHandle,
}

impl StubServer {
    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    /// Stop the server and return the single request it saw.
    pub async fn finish(self) -> Captured {
        self.handle.stop(true).await;
        let mut captured = self.captured.lock().unwrap();
        assert_eq!(captured.len(), 1, "expected exactly one request");
        captured.remove(0)
    }
}

/// Client that ignores any proxy settings in the test environment.
pub fn direct_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// Serve `status`, `extra_headers` and `body` on a loopback port.
///
/// Must run inside an actix system (`#[actix_web::test]`).
pub async fn serve_once(
    status: StatusCode,
    extra_headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> StubServer {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let server = HttpServer::new(move || {
        let sink = sink.clone();
        App::new().default_service(web::to(move |req: HttpRequest, payload: web::Bytes| {
            let sink = sink.clone();
            async move {
                sink.lock()
                    .unwrap()
                    .push(Captured::from_request(&req, &payload));
                let mut resp = HttpResponse::build(status);
                for (name, value) in extra_headers {
                    resp.insert_header((*name, *value));
                }
                resp.body(body)
            }
        }))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let base_url = format!("http://{}", server.addrs()[0]);
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    StubServer {
        base_url,
        captured,
        handle,
    }
}
