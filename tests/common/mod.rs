use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::{http::StatusCode, routing::get, Router};

/// Serves `body` with `status` at `/movies` on an ephemeral port.
pub async fn mock_endpoint(status: StatusCode, body: &'static str) -> SocketAddr {
    let app = Router::new().route("/movies", get(move || async move { (status, body) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock endpoint");
    let addr = listener.local_addr().expect("mock endpoint addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock endpoint");
    });
    addr
}

pub fn write_config(dir: &Path, addr: SocketAddr) -> PathBuf {
    let db = dir.join("movies.db");
    let log = dir.join("logs").join("sync.log");
    let path = dir.join("config.yaml");
    let yaml = format!(
        r#"logging:
  level: INFO
  file: "{log}"
database:
  url: "sqlite:///{db}"
api:
  url: "http://{addr}/movies"
  timeout: 5
"#,
        log = log.display(),
        db = db.display(),
    );
    std::fs::write(&path, yaml).expect("write config");
    path
}

pub fn log_path(dir: &Path) -> PathBuf {
    dir.join("logs").join("sync.log")
}
