//! End-to-end pipeline test
//!
//! Runs the real coordinator against a loopback host: fetch over HTTP,
//! transform in the worker thread via the broker, delivery into a temp
//! directory.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread;

use tempfile::TempDir;

use dashbook::api::{DashboardFetcher, DashboardId, HostSession};
use dashbook::broker::TransformWorker;
use dashbook::export::{DirEmitter, ExportCoordinator, LogNotifier};
use dashbook::ExportError;

const DASHBOARD_BODY: &str = r#"{
    "id": 42,
    "name": "Sales Overview",
    "widgets": [
        {"id": 1, "visualization": {"id": 2, "query": {"id": 3, "name": "Revenue", "query": "SELECT sum(amount) FROM orders"}}},
        {"id": 4, "text": "commentary"},
        {"id": 5, "visualization": {"id": 6, "query": {"id": 7, "query": "SELECT count(*) FROM users"}}}
    ]
}"#;

/// Serves one canned HTTP response on a loopback port
fn serve_once(status_line: &str, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let status_line = status_line.to_string();
    let body = body.to_string();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{addr}")
}

fn coordinator_for(base_url: String, out_dir: &std::path::Path) -> (ExportCoordinator, TransformWorker) {
    let fetcher = DashboardFetcher::new(HostSession::new(base_url)).unwrap();
    let (broker, worker) = TransformWorker::spawn().unwrap();
    let coordinator = ExportCoordinator::new(
        fetcher,
        broker,
        Box::new(DirEmitter::new(out_dir)),
        Box::new(LogNotifier),
    );
    (coordinator, worker)
}

#[test]
fn exports_a_dashboard_end_to_end() {
    let out = TempDir::new().unwrap();
    let base = serve_once("200 OK", DASHBOARD_BODY);
    let (coordinator, worker) = coordinator_for(base, out.path());

    let outcome = coordinator.export_dashboard(DashboardId::from(42)).unwrap();
    drop(coordinator);
    worker.join();

    assert_eq!(outcome.dashboard, "Sales Overview");
    assert!(outcome.filename.starts_with("dashboard_sales_overview_"));
    assert!(outcome.filename.ends_with(".yml"));

    let content = fs::read_to_string(&outcome.path).unwrap();
    assert!(content.starts_with("_id:"));
    assert!(content.contains("schema_version: 1.3.0"));
    assert!(content.contains("name: Revenue"));
    // the unnamed query fell back to its qualifying position
    assert!(content.contains("name: Query 2"));
    assert!(content.contains("order: 2"));
    assert!(content.contains("SELECT count(*) FROM users"));
    assert!(!content.contains("commentary"));
}

#[test]
fn server_failure_carries_status_and_body() {
    let out = TempDir::new().unwrap();
    let base = serve_once("404 Not Found", "not found");
    let (coordinator, worker) = coordinator_for(base, out.path());

    let err = coordinator
        .export_dashboard(DashboardId::from(42))
        .unwrap_err();
    drop(coordinator);
    worker.join();

    match err {
        ExportError::Server { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body, "not found");
        }
        other => panic!("expected server error, got {other:?}"),
    }

    // nothing was delivered
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn malformed_host_payload_stops_the_pipeline() {
    let out = TempDir::new().unwrap();
    let base = serve_once("200 OK", r#"{"unexpected": true}"#);
    let (coordinator, worker) = coordinator_for(base, out.path());

    let err = coordinator
        .export_dashboard(DashboardId::from(42))
        .unwrap_err();
    drop(coordinator);
    worker.join();

    assert!(err.is_validation(), "got {err:?}");
    assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
}
