//! Minimal in-process tile server for tests.
//!
//! Serves canned bodies by request path, answers 404 for anything else and counts every request
//! it reads. Can also cut bodies short or never answer at all.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

enum Reply {
    Tiles(HashMap<String, Vec<u8>>),
    /// Announces `declared` bytes but closes the connection after sending `body`.
    Truncated { body: Vec<u8>, declared: usize },
    Stalled,
}

pub struct TestTileServer {
    pub base_url: String,
    requests: Arc<AtomicUsize>,
}

impl TestTileServer {
    pub async fn start(tiles: HashMap<String, Vec<u8>>) -> TestTileServer {
        Self::serve(Reply::Tiles(tiles)).await
    }

    pub async fn truncated(body: Vec<u8>, declared: usize) -> TestTileServer {
        Self::serve(Reply::Truncated { body, declared }).await
    }

    pub async fn stalled() -> TestTileServer {
        Self::serve(Reply::Stalled).await
    }

    async fn serve(reply: Reply) -> TestTileServer {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind test tile server");
        let addr = listener.local_addr().expect("test tile server has no address");
        let requests = Arc::new(AtomicUsize::new(0));
        let reply = Arc::new(reply);

        let counter = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let reply = Arc::clone(&reply);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let _ = respond(socket, &reply, &counter).await;
                });
            }
        });

        TestTileServer {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// URL of a port nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind throwaway listener");
    let addr = listener.local_addr().expect("throwaway listener has no address");
    drop(listener);
    format!("http://{}", addr)
}

fn ok_response(body: &[u8], content_length: usize) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\n\
         Connection: close\r\n\r\n",
        content_length
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

async fn respond(socket: TcpStream, reply: &Reply, requests: &AtomicUsize) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    loop {
        let mut header = String::new();
        let read = reader.read_line(&mut header).await?;
        if read == 0 || header == "\r\n" {
            break;
        }
    }
    requests.fetch_add(1, Ordering::SeqCst);

    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    let response = match reply {
        Reply::Tiles(tiles) => match tiles.get(path) {
            Some(body) => ok_response(body, body.len()),
            None => {
                b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec()
            }
        },
        Reply::Truncated { body, declared } => ok_response(body, *declared),
        Reply::Stalled => {
            // hold the connection open without ever answering
            std::future::pending::<()>().await;
            return Ok(());
        }
    };
    writer.write_all(&response).await?;
    writer.shutdown().await?;
    Ok(())
}

/// Client that talks to the test server directly, ignoring any proxy set in the environment.
pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("failed to build test client")
}
