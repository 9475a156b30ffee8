use crate::api::Mode;
use crate::args::ServeArgs;
use crate::commands::Out;
use crate::ingest::{Ingestor, Snapshot};
use crate::server::{self, AppState};
use crate::{Config, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Handles the `peppermint serve` command.
///
/// A bad certificate or key fails the command before anything is served. A failed first ingestion
/// pass does not: the server starts and answers 503 until a refresh succeeds.
pub async fn serve(config: Config, mode: Mode, args: &ServeArgs) -> Result<Out<()>> {
    let ingestor = Arc::new(Ingestor::connect(&config, mode).await?);
    let snapshot = Snapshot::new();

    if let Err(e) = snapshot.refresh(&ingestor).await {
        error!("Initial ingestion failed, serving 503 until a refresh succeeds: {e}");
    }

    let timer = args.refresh_secs().map(|secs| {
        info!("Refreshing transactions every {secs} seconds");
        spawn_refresh_timer(ingestor.clone(), snapshot.clone(), Duration::from_secs(secs))
    });

    let served = server::serve(AppState::new(ingestor, snapshot), args.bind()).await;
    if let Some(timer) = timer {
        timer.abort();
    }
    served?;
    Ok(Out::new_message("Server stopped"))
}

/// Refreshes `snapshot` every `period`, starting one `period` from now. Failures are logged and the
/// previous snapshot is kept.
fn spawn_refresh_timer(
    ingestor: Arc<Ingestor>,
    snapshot: Snapshot,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = snapshot.refresh(&ingestor).await {
                warn!("Scheduled refresh failed, keeping the previous transactions: {e}");
            }
        }
    })
}
