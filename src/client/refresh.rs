use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::{JoinError, JoinSet};

use super::backend::HttpBackend;
use crate::identity::UserSession;
use crate::settings::SettingsRecord;

pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// What the page currently shows. `None` means still loading.
#[derive(Debug, Clone, Default)]
pub struct PassBoardView {
    pub session: Option<UserSession>,
    pub settings: Option<SettingsRecord>,
    pub pass_data: Option<serde_json::Value>,
}

/// Reloads the settings record and the pass data a fixed delay after a save.
///
/// The delay gives the backend time to make the write visible to the pass
/// prediction; nothing confirms it did. Refreshes are never cancelled or
/// merged, so the last response to arrive is what the view ends up holding.
pub struct RefreshCoordinator {
    backend: Arc<HttpBackend>,
    delay: Duration,
    view: Arc<RwLock<PassBoardView>>,
    pending: Mutex<JoinSet<()>>,
}

impl RefreshCoordinator {
    pub fn new(backend: Arc<HttpBackend>, delay: Duration) -> Self {
        Self {
            backend,
            delay,
            view: Arc::new(RwLock::new(PassBoardView::default())),
            pending: Mutex::new(JoinSet::new()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn view(&self) -> PassBoardView {
        self.view.read().await.clone()
    }

    /// First load of the page: identity, settings and passes, no delay.
    pub async fn initial_load(&self) {
        match self.backend.fetch_session().await {
            Ok(session) => self.view.write().await.session = session,
            Err(e) => log::error!("Failed to load session: {}", e),
        }
        reload(&self.backend, &self.view).await;
    }

    pub async fn schedule_refresh(&self) {
        let backend = self.backend.clone();
        let view = self.view.clone();
        let delay = self.delay;

        let mut pending = self.pending.lock().await;
        while let Some(joined) = pending.try_join_next() {
            log_join(joined);
        }
        pending.spawn(async move {
            tokio::time::sleep(delay).await;
            reload(&backend, &view).await;
        });
        log::debug!("Refresh scheduled in {:?}", delay);
    }

    /// Waits for every refresh scheduled so far to finish. Refreshes
    /// scheduled meanwhile are not waited for and are not held up.
    pub async fn settle(&self) {
        let mut draining = std::mem::take(&mut *self.pending.lock().await);
        while let Some(joined) = draining.join_next().await {
            log_join(joined);
        }
    }
}

fn log_join(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        log::error!("Refresh task failed: {}", e);
    }
}

// A failed load leaves that part of the view as it was.
async fn reload(backend: &HttpBackend, view: &RwLock<PassBoardView>) {
    match backend.fetch_settings().await {
        Ok(settings) => view.write().await.settings = Some(settings),
        Err(e) => log::error!("Failed to load settings: {}", e),
    }
    match backend.fetch_pass_data().await {
        Ok(data) => view.write().await.pass_data = Some(data),
        Err(e) => log::error!("Failed to load pass data: {}", e),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mockito::{Mock, Server};

    pub const SETTINGS_BODY: &str = r#"{"stationLong":-73.43,"stationLat":45.51,"predictionType":"realtime","customStartTime":null,"predHours":24,"minElevation":5.0,"satList":{"0":{"NORADid":25544,"name":"ISS (ZARYA)","priority":0}}}"#;

    pub async fn mock_reads(server: &mut Server, hits: usize) -> (Mock, Mock) {
        let settings = server
            .mock("GET", "/api/settings")
            .with_header("content-type", "application/json")
            .with_body(SETTINGS_BODY)
            .expect(hits)
            .create_async()
            .await;
        let passes = server
            .mock("GET", "/api/passData")
            .with_header("content-type", "application/json")
            .with_body(r#"{"passes":[]}"#)
            .expect(hits)
            .create_async()
            .await;
        (settings, passes)
    }

    #[tokio::test]
    async fn refresh_waits_for_delay() {
        let mut server = Server::new_async().await;
        let (settings, passes) = mock_reads(&mut server, 1).await;

        let backend = Arc::new(HttpBackend::new(&server.url()).unwrap());
        let coordinator = RefreshCoordinator::new(backend, Duration::from_millis(300));
        coordinator.schedule_refresh().await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!settings.matched_async().await);
        assert!(coordinator.view().await.settings.is_none());

        coordinator.settle().await;
        settings.assert_async().await;
        passes.assert_async().await;

        let view = coordinator.view().await;
        assert_eq!(view.settings.unwrap().roster().norad_ids(), vec![25544]);
        assert_eq!(view.pass_data.unwrap()["passes"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn overlapping_refreshes_all_run() {
        let mut server = Server::new_async().await;
        let (settings, passes) = mock_reads(&mut server, 2).await;

        let backend = Arc::new(HttpBackend::new(&server.url()).unwrap());
        let coordinator = RefreshCoordinator::new(backend, Duration::from_millis(20));
        coordinator.schedule_refresh().await;
        coordinator.schedule_refresh().await;
        coordinator.settle().await;

        settings.assert_async().await;
        passes.assert_async().await;
    }

    #[tokio::test]
    async fn scheduling_is_not_blocked_by_settle() {
        let mut server = Server::new_async().await;
        let (settings, passes) = mock_reads(&mut server, 2).await;

        let backend = Arc::new(HttpBackend::new(&server.url()).unwrap());
        let coordinator = Arc::new(RefreshCoordinator::new(
            backend,
            Duration::from_millis(400),
        ));
        coordinator.schedule_refresh().await;

        let waiting = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.settle().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        tokio::time::timeout(Duration::from_millis(100), coordinator.schedule_refresh())
            .await
            .expect("scheduling waited on settle");

        waiting.await.unwrap();
        coordinator.settle().await;
        settings.assert_async().await;
        passes.assert_async().await;
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_view() {
        let mut server = Server::new_async().await;
        let (settings, passes) = mock_reads(&mut server, 1).await;

        let backend = Arc::new(HttpBackend::new(&server.url()).unwrap());
        let coordinator = RefreshCoordinator::new(backend, Duration::from_millis(10));
        coordinator.schedule_refresh().await;
        coordinator.settle().await;
        settings.assert_async().await;
        passes.assert_async().await;
        settings.remove_async().await;
        passes.remove_async().await;

        let broken = server
            .mock("GET", "/api/settings")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let passes_again = server
            .mock("GET", "/api/passData")
            .with_header("content-type", "application/json")
            .with_body(r#"{"passes":[1]}"#)
            .create_async()
            .await;

        coordinator.schedule_refresh().await;
        coordinator.settle().await;
        broken.assert_async().await;
        passes_again.assert_async().await;

        let view = coordinator.view().await;
        assert!(view.settings.is_some());
        assert_eq!(view.pass_data.unwrap()["passes"], serde_json::json!([1]));
    }

    #[tokio::test]
    async fn initial_load_with_server_down_stays_loading() {
        let backend = Arc::new(HttpBackend::new("http://127.0.0.1:1").unwrap());
        let coordinator = RefreshCoordinator::new(backend, DEFAULT_REFRESH_DELAY);
        coordinator.initial_load().await;

        let view = coordinator.view().await;
        assert!(view.session.is_none());
        assert!(view.settings.is_none());
        assert!(view.pass_data.is_none());
    }
}
