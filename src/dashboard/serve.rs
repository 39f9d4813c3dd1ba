//! Local HTTP server for the rendered dashboard
//!
//! Serves one immutable page: `GET /` answers with the HTML, any other path is
//! 404 and any other method is 405. Every connection is handled on its own
//! task and closed after one response.

use crate::finance::error::{DashboardError, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Largest request head we are willing to buffer
const MAX_REQUEST_HEAD: usize = 16 * 1024;

/// How long a client may take to send its request head
const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// A bound listener plus the page it serves
pub struct DashboardServer {
    listener: TcpListener,
    page: Arc<String>,
}

impl DashboardServer {
    /// Bind to `host:port` (port 0 lets the OS choose)
    pub async fn bind(host: &str, port: u16, page: String) -> Result<Self> {
        let listener = TcpListener::bind((host, port)).await?;
        Ok(Self {
            listener,
            page: Arc::new(page),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` completes
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Received shutdown signal");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                            continue;
                        }
                    };
                    let page = Arc::clone(&self.page);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &page).await {
                            debug!(%peer, error = %e, "connection closed with error");
                        }
                    });
                }
            }
        }

        Ok(())
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "cannot listen for Ctrl-C, serving until killed");
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}

/// Response for a request line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Page,
    NotFound,
    MethodNotAllowed,
    BadRequest,
}

fn route(request_line: &str) -> Route {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(m), Some(t)) => (m, t),
        _ => return Route::BadRequest,
    };

    let path = target.split('?').next().unwrap_or(target);
    match (method, path) {
        ("GET", "/") | ("GET", "/index.html") => Route::Page,
        ("GET", _) => Route::NotFound,
        _ => Route::MethodNotAllowed,
    }
}

async fn read_request_head(stream: &mut TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn handle_connection(mut stream: TcpStream, page: &str) -> Result<()> {
    let head = tokio::time::timeout(READ_TIMEOUT, read_request_head(&mut stream))
        .await
        .map_err(|_| DashboardError::Other("timed out reading request".to_string()))??;

    let request_line = head.lines().next().unwrap_or("");
    let route = route(request_line);
    debug!(request = request_line, ?route, "request");

    let response = match route {
        Route::Page => response("200 OK", "text/html; charset=utf-8", page, &[]),
        Route::NotFound => response("404 Not Found", "text/plain; charset=utf-8", "Not Found\n", &[]),
        Route::MethodNotAllowed => response(
            "405 Method Not Allowed",
            "text/plain; charset=utf-8",
            "Method Not Allowed\n",
            &[("Allow", "GET")],
        ),
        Route::BadRequest => response(
            "400 Bad Request",
            "text/plain; charset=utf-8",
            "Bad Request\n",
            &[],
        ),
    };

    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}

fn response(status: &str, content_type: &str, body: &str, extra: &[(&str, &str)]) -> String {
    let mut out = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        content_type,
        body.len()
    );
    for (name, value) in extra {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str("\r\n");
    out.push_str(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;

    #[test]
    fn test_route() {
        assert_eq!(route("GET / HTTP/1.1"), Route::Page);
        assert_eq!(route("GET /?tab=1 HTTP/1.1"), Route::Page);
        assert_eq!(route("GET /favicon.ico HTTP/1.1"), Route::NotFound);
        assert_eq!(route("POST / HTTP/1.1"), Route::MethodNotAllowed);
        assert_eq!(route(""), Route::BadRequest);
    }

    async fn fetch(addr: SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_serves_page_until_shutdown() {
        let page = "<!DOCTYPE html><html><body>dashboard</body></html>".to_string();
        let server = DashboardServer::bind("127.0.0.1", 0, page.clone())
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async move {
            let _ = rx.await;
        }));

        let ok = fetch(addr, "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
        assert!(ok.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(ok.contains(&format!("Content-Length: {}\r\n", page.len())));
        assert!(ok.ends_with(&page));

        let missing = fetch(addr, "GET /data.json HTTP/1.1\r\n\r\n").await;
        assert!(missing.starts_with("HTTP/1.1 404 Not Found"));

        let post = fetch(addr, "POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n").await;
        assert!(post.starts_with("HTTP/1.1 405 Method Not Allowed"));
        assert!(post.contains("Allow: GET\r\n"));

        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();
    }
}
