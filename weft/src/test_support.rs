//! Raw TCP mock server for OpenAI-compatible endpoints in unit tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Reads one HTTP request and returns its body.
pub(crate) async fn read_http_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];
    loop {
        let n = stream.read(&mut tmp).await.unwrap();
        if n == 0 {
            return String::new();
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let header_end = pos + 4;
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = headers
                .lines()
                .find_map(|line| {
                    let lower = line.to_ascii_lowercase();
                    lower
                        .strip_prefix("content-length:")
                        .and_then(|v| v.trim().parse::<usize>().ok())
                })
                .unwrap_or(0);
            let mut body = buf[header_end..].to_vec();
            while body.len() < content_length {
                let m = stream.read(&mut tmp).await.unwrap();
                if m == 0 {
                    break;
                }
                body.extend_from_slice(&tmp[..m]);
            }
            body.truncate(content_length);
            return String::from_utf8_lossy(&body).to_string();
        }
    }
}

pub(crate) async fn write_http_response(
    stream: &mut TcpStream,
    status: &str,
    content_type: &str,
    body: &str,
) {
    let resp = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nConnection: close\r\nContent-Length: {}\r\n\r\n{}",
        status,
        content_type,
        body.len(),
        body
    );
    stream.write_all(resp.as_bytes()).await.unwrap();
}

/// Serves one JSON response per accepted connection, in order. The join handle yields
/// the request bodies received.
pub(crate) async fn serve_json(responses: Vec<(&'static str, String)>) -> (String, JoinHandle<Vec<String>>) {
    serve(
        responses
            .into_iter()
            .map(|(status, body)| (status, "application/json", body))
            .collect(),
    )
    .await
}

pub(crate) async fn serve(
    responses: Vec<(&'static str, &'static str, String)>,
) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut bodies = Vec::new();
        for (status, content_type, body) in responses {
            let (mut stream, _) = listener.accept().await.unwrap();
            bodies.push(read_http_request(&mut stream).await);
            write_http_response(&mut stream, status, content_type, &body).await;
        }
        bodies
    });
    (format!("http://{}", addr), handle)
}
