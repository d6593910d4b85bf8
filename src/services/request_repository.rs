use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::db::models::requests::{NewServiceRequest, ServiceRequest, ServiceStatus};
use crate::db::store::ServiceRequestStore;
use crate::errors::RepositoryError;

/// How `transition` treats the current status of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Any status may overwrite any other.
    #[default]
    Permissive,
    /// Only moves listed in [`ServiceStatus::allowed_next`], plus rewriting
    /// the current status.
    Strict,
}

impl TransitionPolicy {
    pub fn permits(self, from: ServiceStatus, to: ServiceStatus) -> bool {
        match self {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => from == to || from.allowed_next().contains(&to),
        }
    }
}

/// Read/create/transition over the service request table.
#[derive(Clone)]
pub struct RequestRepository {
    store: Arc<dyn ServiceRequestStore>,
    policy: TransitionPolicy,
}

impl RequestRepository {
    pub fn new(store: Arc<dyn ServiceRequestStore>, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    /// All requests, newest `created_at` first.
    pub async fn list(&self) -> Result<Vec<ServiceRequest>, RepositoryError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<ServiceRequest, RepositoryError> {
        self.store
            .get(id)
            .await?
            .ok_or(RepositoryError::NotFound(id))
    }

    /// Inserts one pending request. The caller re-lists to observe it.
    pub async fn create(&self, payload: &NewServiceRequest) -> Result<(), RepositoryError> {
        let fields = payload.validate()?;
        let row = self.store.insert(&fields).await?;
        info!(request_id = %row.id, customer = %row.customer_name, "Service request created");
        Ok(())
    }

    /// Writes only the `status` column of the row with `id`.
    pub async fn transition(&self, id: Uuid, status: ServiceStatus) -> Result<(), RepositoryError> {
        if self.policy == TransitionPolicy::Strict {
            let current = self.get(id).await?;
            if !self.policy.permits(current.status, status) {
                return Err(RepositoryError::InvalidTransition {
                    from: current.status,
                    to: status,
                });
            }
        }

        let updated = self
            .store
            .update_status(id, status)
            .await?
            .ok_or(RepositoryError::NotFound(id))?;

        info!(request_id = %updated.id, status = %updated.status, "Service request status updated");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(self.store.ping().await?)
    }
}
