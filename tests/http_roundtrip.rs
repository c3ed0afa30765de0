//! End-to-end: real models on disk, a real listener, a raw HTTP client.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use shico_server::config::NetworkMode;
use shico_server::server::{serve, AppState};
use shico_tracker::VocabularyMonitor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

fn write_model(dir: &Path, key: &str, entries: &[(&str, [f32; 3])]) {
    let mut file = std::fs::File::create(dir.join(format!("{}.w2v", key))).unwrap();
    let mut bytes = format!("{} 3\n", entries.len()).into_bytes();
    for (word, vector) in entries {
        bytes.extend_from_slice(word.as_bytes());
        bytes.push(b' ');
        for v in vector {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes.push(b'\n');
    }
    file.write_all(&bytes).unwrap();
}

async fn start_server(mode: NetworkMode) -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    write_model(
        dir.path(),
        "1950_1954",
        &[
            ("oorlog", [1.0, 0.0, 0.0]),
            ("strijd", [0.9, 0.1, 0.0]),
            ("vrede", [0.0, 1.0, 0.0]),
        ],
    );
    write_model(
        dir.path(),
        "1955_1959",
        &[
            ("oorlog", [1.0, 0.0, 0.0]),
            ("conflict", [0.8, 0.0, 0.2]),
            ("brood", [0.0, 0.0, 1.0]),
        ],
    );

    let pattern = format!("{}/*.w2v", dir.path().display());
    let monitor = VocabularyMonitor::load(&pattern, true).unwrap();
    assert_eq!(monitor.len(), 2);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let state = AppState::new(Arc::new(monitor), mode);
    tokio::spawn(async move {
        let _ = serve(listener, state).await;
    });

    (addr, dir)
}

/// Send one request and split the reply into status line, headers and body.
async fn request(addr: &str, method: &str, target: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!(
        "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        method, target, addr
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();
    let raw = String::from_utf8(raw).unwrap();

    let (head, body) = raw.split_once("\r\n\r\n").unwrap();
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    (status, head.to_ascii_lowercase(), body.to_string())
}

#[tokio::test]
async fn track_over_http() {
    let (addr, _dir) = start_server(NetworkMode::Placeholder).await;

    let (status, head, body) = request(&addr, "GET", "/track/oorlog?maxRelatedTerms=1").await;
    assert_eq!(status, 200);
    assert!(head.contains("access-control-allow-origin: *"));
    assert!(head.contains("content-type: application/json"));

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let stream = json["stream"].as_object().unwrap();
    assert_eq!(stream.len(), 2);
    assert!(stream["1950_1954"].get("strijd").is_some());
    assert!(stream["1955_1959"].get("oorlog").is_some());

    let networks = json["networks"].as_object().unwrap();
    assert_eq!(networks.len(), 2);
    assert_eq!(networks["1950_1954"]["links"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn bad_parameter_over_http() {
    let (addr, _dir) = start_server(NetworkMode::Placeholder).await;

    let (status, head, body) = request(&addr, "GET", "/track/term1?maxTerms=abc").await;
    assert_eq!(status, 400);
    assert!(head.contains("access-control-allow-origin: *"));
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "bad_parameter");
}

#[tokio::test]
async fn links_network_over_http() {
    let (addr, _dir) = start_server(NetworkMode::Links).await;

    let (status, _, body) = request(&addr, "GET", "/track/oorlog?maxRelatedTerms=1&endKey=1950_1954").await;
    assert_eq!(status, 200);

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let network = &json["networks"]["1950_1954"];
    let names: Vec<&str> = network["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["oorlog", "strijd"]);
    assert_eq!(network["links"][0]["source"], 0);
    assert_eq!(network["links"][0]["target"], 1);
}

#[tokio::test]
async fn health_and_preflight_over_http() {
    let (addr, _dir) = start_server(NetworkMode::Placeholder).await;

    let (status, _, body) = request(&addr, "GET", "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body, "OK");

    let (status, head, _) = request(&addr, "OPTIONS", "/track/oorlog").await;
    assert_eq!(status, 204);
    assert!(head.contains("access-control-allow-methods: get, options"));
}
