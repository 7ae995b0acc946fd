//! HTTP server startup

use anyhow::Result;
use axum::serve;
use chronicle::service_logs::ServiceLogs;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DrafterConfig;
use crate::pipeline::ReportService;
use crate::server::routing::{create_router, AppState};

const COMPONENT: &str = "drafter-server";

/// Build the service from configuration and serve until shutdown
pub async fn start_server(config: DrafterConfig, ephemeral: bool) -> Result<()> {
  let logs = ServiceLogs::new(&config.server.logs_path)?;
  let addr = config.server.bind;

  logs.info(&format!("Starting drafter server on {addr}"), COMPONENT).await;
  let service = Arc::new(ReportService::from_config(&config, ephemeral).await?);

  // warm the index; a failure here is reported per request instead
  match service.index().ensure_populated().await {
    Ok(outcome) => {
      let index = service.index();
      logs
        .info(
          &format!("Collection '{}' holds {} playbooks", index.collection(), outcome.count()),
          COMPONENT,
        )
        .await
    }
    Err(e) => logs.warn(&format!("Playbook index not ready: {e}"), COMPONENT).await,
  }

  let app = create_router(AppState::new(service, logs.clone()))
    .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()));

  let listener = TcpListener::bind(addr).await?;
  logs.info(&format!("Server listening on {addr}"), COMPONENT).await;

  match serve(listener, app).await {
    Ok(()) => {
      logs.info("Server shutdown gracefully", COMPONENT).await;
      Ok(())
    }
    Err(e) => {
      logs.error(&format!("Server error: {e}"), COMPONENT).await;
      Err(anyhow::anyhow!("Server error: {e}"))
    }
  }
}
