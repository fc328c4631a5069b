//! Server Bootstrap
//!
//! Config → storage backend → router → listener, then wait for SIGINT or
//! SIGTERM and give in-flight requests [`SHUTDOWN_GRACE_PERIOD`] to finish.

use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use student_core::{PostgresBackend, SqliteBackend, StorageResult, StudentStore};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use crate::api;
use crate::config::{Config, StorageConfig};
use crate::APP_VERSION;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// How long in-flight requests may run after a shutdown signal
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

// =============================================================================
// Bootstrap
// =============================================================================

/// Open the configured backend, creating the students table if absent.
///
/// # Errors
/// Returns error if the backend cannot be opened.
pub async fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn StudentStore>> {
    match config {
        StorageConfig::Sqlite(sqlite) => {
            let backend = SqliteBackend::open_with_timeout(
                sqlite.expanded_path(),
                Duration::from_secs(sqlite.acquire_timeout_secs),
            )
            .await?;
            Ok(Arc::new(backend))
        }
        StorageConfig::Postgres(pg) => {
            let backend = PostgresBackend::connect(pg).await?;
            Ok(Arc::new(backend))
        }
    }
}

/// Run the service until a termination signal arrives.
///
/// # Errors
/// Returns error if storage cannot be opened, the address cannot be bound, or
/// the server fails while running.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config.storage)
        .await
        .with_context(|| format!("failed to initialize {} storage", config.storage.kind()))?;

    tracing::info!(
        env = %config.env,
        version = APP_VERSION,
        backend = config.storage.kind(),
        "storage initialized"
    );

    let listener = TcpListener::bind(&config.http_server.address)
        .await
        .with_context(|| format!("failed to bind {}", config.http_server.address))?;
    tracing::info!(address = %listener.local_addr()?, "server started");

    let app = api::router(Arc::clone(&store));
    let result = serve(listener, app, shutdown_signal()).await;

    store.close().await;
    result
}

/// Serve `app` until `signal` resolves, then drain for at most
/// [`SHUTDOWN_GRACE_PERIOD`].
///
/// # Errors
/// Returns error if the server stops on its own with an I/O failure.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = stop_rx.await;
    });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => {
            joined.context("server task panicked")??;
            return Ok(());
        }
        () = signal => {}
    }

    tracing::info!("shutting down the server");
    let _ = stop_tx.send(());

    match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, server).await {
        Ok(joined) => {
            joined.context("server task panicked")??;
            tracing::info!("server shutdown successfully");
        }
        Err(_) => {
            tracing::warn!(
                grace_secs = SHUTDOWN_GRACE_PERIOD.as_secs(),
                "in-flight requests still running at shutdown deadline"
            );
        }
    }

    Ok(())
}

/// Resolve on Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqliteConfig;
    use async_trait::async_trait;
    use std::net::SocketAddr;
    use std::time::Instant;
    use student_core::{NewStudent, StorageError, Student};
    use tempfile::tempdir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Notify;

    /// Store whose listing takes `delay` and announces when it has started.
    struct SlowStore {
        delay: Duration,
        started: Arc<Notify>,
    }

    #[async_trait]
    impl StudentStore for SlowStore {
        async fn create_student(&self, _student: &NewStudent) -> StorageResult<i64> {
            Ok(1)
        }

        async fn get_student_by_id(&self, id: i64) -> StorageResult<Student> {
            Err(StorageError::not_found(id))
        }

        async fn get_students(&self) -> StorageResult<Vec<Student>> {
            self.started.notify_one();
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }

        async fn update_student_by_id(
            &self,
            id: i64,
            _student: &NewStudent,
        ) -> StorageResult<Student> {
            Err(StorageError::not_found(id))
        }

        async fn delete_student_by_id(&self, id: i64) -> StorageResult<Student> {
            Err(StorageError::not_found(id))
        }

        async fn close(&self) {}
    }

    async fn get_students_raw(addr: SocketAddr) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = "GET /api/students HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    /// Start `serve` over a slow store, issue one listing request, and fire the
    /// shutdown signal once the request is inside the store.
    async fn shutdown_during_request(
        delay: Duration,
    ) -> (
        tokio::task::JoinHandle<anyhow::Result<()>>,
        tokio::task::JoinHandle<String>,
        Instant,
    ) {
        let started = Arc::new(Notify::new());
        let store: Arc<dyn StudentStore> = Arc::new(SlowStore {
            delay,
            started: Arc::clone(&started),
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve(listener, api::router(store), async move {
            let _ = rx.await;
        }));
        let client = tokio::spawn(get_students_raw(addr));

        started.notified().await;
        let signalled_at = Instant::now();
        tx.send(()).unwrap();
        (server, client, signalled_at)
    }

    #[tokio::test]
    async fn test_open_store_sqlite() {
        let dir = tempdir().unwrap();
        let config = StorageConfig::Sqlite(SqliteConfig {
            path: dir.path().join("db").join("students.db").display().to_string(),
            acquire_timeout_secs: 1,
        });

        let store = open_store(&config).await.unwrap();
        assert!(store.get_students().await.unwrap().is_empty());
        store.close().await;
    }

    #[tokio::test]
    async fn test_serve_stops_on_signal() {
        let store: Arc<dyn StudentStore> = Arc::new(SqliteBackend::in_memory().await.unwrap());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(serve(listener, api::router(store), async move {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();
        let result = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD * 2, handle)
            .await
            .expect("serve should return within the grace period")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_serve_waits_for_in_flight_request() {
        let (server, client, _) = shutdown_during_request(Duration::from_millis(300)).await;

        let result = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, server)
            .await
            .expect("serve should return once the request finishes")
            .unwrap();
        assert!(result.is_ok());

        let response = client.await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    }

    #[tokio::test]
    async fn test_serve_gives_up_after_grace_period() {
        let (server, client, signalled_at) = shutdown_during_request(Duration::from_secs(60)).await;

        let result = tokio::time::timeout(SHUTDOWN_GRACE_PERIOD * 2, server)
            .await
            .expect("serve should return at the shutdown deadline")
            .unwrap();
        assert!(result.is_ok());

        let elapsed = signalled_at.elapsed();
        assert!(elapsed >= SHUTDOWN_GRACE_PERIOD, "returned after {elapsed:?}");
        assert!(
            elapsed < SHUTDOWN_GRACE_PERIOD + Duration::from_secs(2),
            "returned after {elapsed:?}"
        );
        client.abort();
    }
}
