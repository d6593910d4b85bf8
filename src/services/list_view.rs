use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, FixedOffset, Utc};
use tokio::sync::RwLock;
use tracing::{error, warn};
use uuid::Uuid;

use crate::db::models::requests::{NewServiceRequest, ServiceRequest, ServiceStatus};
use crate::errors::{ExportError, RepositoryError};
use crate::services::export::{export_rows, write_workbook};
use crate::services::request_repository::RequestRepository;

/// The collection currently shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub requests: Vec<ServiceRequest>,
    /// Time of the last refresh that succeeded.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Set when the latest refresh failed and `requests` may be outdated.
    pub stale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// Row absent from the displayed collection or no longer pending.
    NotOffered,
    /// A transition for this row is still running.
    AlreadyInFlight,
}

/// Marks a row busy for as long as it lives.
struct BusyGuard {
    id: Uuid,
    updating: Arc<Mutex<HashSet<Uuid>>>,
}

impl BusyGuard {
    fn acquire(updating: &Arc<Mutex<HashSet<Uuid>>>, id: Uuid) -> Option<Self> {
        let mut set = updating.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !set.insert(id) {
            return None;
        }
        Some(BusyGuard {
            id,
            updating: updating.clone(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut set = self
            .updating
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        set.remove(&self.id);
    }
}

/// Dashboard list state: displayed collection, busy rows, and the actions
/// that mutate through the repository and then reload.
pub struct ListView {
    repo: RequestRepository,
    displayed: RwLock<Snapshot>,
    updating: Arc<Mutex<HashSet<Uuid>>>,
    display_offset: FixedOffset,
}

impl ListView {
    pub fn new(repo: RequestRepository, display_offset: FixedOffset) -> Self {
        Self {
            repo,
            displayed: RwLock::new(Snapshot::default()),
            updating: Arc::new(Mutex::new(HashSet::new())),
            display_offset,
        }
    }

    pub fn repository(&self) -> &RequestRepository {
        &self.repo
    }

    pub fn display_offset(&self) -> &FixedOffset {
        &self.display_offset
    }

    /// Reloads the collection. A failed reload keeps the previous rows and
    /// flags the snapshot stale.
    pub async fn refresh(&self) -> Snapshot {
        match self.repo.list().await {
            Ok(requests) => {
                let mut displayed = self.displayed.write().await;
                *displayed = Snapshot {
                    requests,
                    refreshed_at: Some(Utc::now()),
                    stale: false,
                };
                displayed.clone()
            }
            Err(e) => {
                error!(error = %e, "Error fetching requests");
                let mut displayed = self.displayed.write().await;
                displayed.stale = true;
                displayed.clone()
            }
        }
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.displayed.read().await.clone()
    }

    pub fn is_updating(&self, id: Uuid) -> bool {
        self.updating
            .lock()
            .map(|set| set.contains(&id))
            .unwrap_or(false)
    }

    /// "Complete" action for a displayed pending row.
    pub async fn mark_completed(&self, id: Uuid) -> Result<TransitionOutcome, RepositoryError> {
        let offered = self
            .displayed
            .read()
            .await
            .requests
            .iter()
            .any(|r| r.id == id && r.status.can_mark_completed());
        if !offered {
            return Ok(TransitionOutcome::NotOffered);
        }

        let Some(_busy) = BusyGuard::acquire(&self.updating, id) else {
            warn!(request_id = %id, "Transition already in flight");
            return Ok(TransitionOutcome::AlreadyInFlight);
        };

        if let Err(e) = self.repo.transition(id, ServiceStatus::Completed).await {
            error!(request_id = %id, error = %e, "Error updating status");
            return Err(e);
        }
        self.refresh().await;
        Ok(TransitionOutcome::Applied)
    }

    /// Any-status transition from the API, serialized per row like the
    /// dashboard button.
    pub async fn transition(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<TransitionOutcome, RepositoryError> {
        let Some(_busy) = BusyGuard::acquire(&self.updating, id) else {
            warn!(request_id = %id, "Transition already in flight");
            return Ok(TransitionOutcome::AlreadyInFlight);
        };

        if let Err(e) = self.repo.transition(id, status).await {
            error!(request_id = %id, error = %e, "Error updating status");
            return Err(e);
        }
        self.refresh().await;
        Ok(TransitionOutcome::Applied)
    }

    /// Creation form submit. The collection is reloaded only on success.
    pub async fn submit(&self, payload: &NewServiceRequest) -> Result<(), RepositoryError> {
        if let Err(e) = self.repo.create(payload).await {
            error!(error = %e, "Error submitting request");
            return Err(e);
        }
        self.refresh().await;
        Ok(())
    }

    /// Workbook built from the displayed collection; no store access.
    pub async fn export(&self) -> Result<Vec<u8>, ExportError> {
        let displayed = self.displayed.read().await;
        let rows = export_rows(&displayed.requests, &self.display_offset);
        write_workbook(&rows)
    }
}
