//! Stub sessions backend for integration tests.
//!
//! Serves canned JSON responses keyed by `"METHOD /path"` on a local port and
//! records every request it receives.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use clinic_sessions::models::config::ClientConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// `"METHOD /path"`, relative to the API root.
    pub route: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct Reply {
    status: u16,
    body: String,
}

pub struct StubBackend {
    pub api_url: String,
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Mutex<HashMap<String, Reply>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let served_routes = Arc::clone(&routes);
        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&served_routes);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    serve(stream, routes, seen).await;
                });
            }
        });

        Self {
            api_url: format!("http://{addr}/api"),
            routes,
            requests,
        }
    }

    /// Answers `route` (e.g. `"GET /sessions"`) with `status` and `body`.
    pub fn reply(&self, route: &str, status: u16, body: impl Into<String>) {
        self.routes.lock().unwrap().insert(
            route.to_string(),
            Reply {
                status,
                body: body.into(),
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, route: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.route == route)
            .count()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone(),
            api_token: None,
            request_timeout_secs: 5,
            items_per_page: 10,
            notice_seconds: 3,
        }
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    seen: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let Ok(read) = stream.read(&mut chunk).await else {
            return;
        };
        if read == 0 {
            return;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap_or(0),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }

    while buffer.len() < head_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => buffer.extend_from_slice(&chunk[..read]),
        }
    }
    let body = String::from_utf8_lossy(&buffer[head_end..]).to_string();

    let route = format!("{method} {}", path.strip_prefix("/api").unwrap_or(&path));
    seen.lock().unwrap().push(RecordedRequest {
        route: route.clone(),
        authorization,
        body,
    });

    let reply = routes.lock().unwrap().get(&route).cloned().unwrap_or(Reply {
        status: 404,
        body: r#"{"message":"Not Found","statusCode":404}"#.to_string(),
    });

    let response = format!(
        "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Wire JSON for one session, as the backend would send it.
pub fn session_json(
    id: i32,
    starts_at: &str,
    ends_at: &str,
    patient: Option<&str>,
    paid: bool,
) -> String {
    let patient = match patient {
        Some(name) => format!(
            r#"{{"id":{pid},"fullName":"{name}","email":"p{pid}@example.com","createdAt":"2024-01-01T00:00:00.000Z","updatedAt":"2024-01-01T00:00:00.000Z"}}"#,
            pid = 100 + id
        ),
        None => "null".to_string(),
    };
    format!(
        r#"{{"id":{id},"patientId":{pid},"patient":{patient},"fechaInicio":"{starts_at}","fechaFin":"{ends_at}","conceptoPrincipal":"individual","notasDelTerapeuta":null,"precio":"25000.00","pagado":{paid},"createdAt":"2024-05-01T10:00:00.000Z","updatedAt":"2024-05-01T10:00:00.000Z"}}"#,
        pid = 100 + id
    )
}

pub fn transcription_json(id: i32, session_id: i32, content: &str) -> String {
    format!(
        r#"{{"id":{id},"sessionId":{session_id},"content":"{content}","createdAt":"2024-05-10T11:00:00.000Z","updatedAt":"2024-05-10T11:00:00.000Z"}}"#
    )
}
