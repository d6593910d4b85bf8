use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::models::requests::{ServiceRequest, ServiceRequestFields, ServiceStatus};
use crate::db::models::user::User;
use crate::db::store::{InsertUserError, ServiceRequestStore, UserStore};
use crate::errors::PersistenceError;

/// Process-local request table, used when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct InMemoryServiceRequestStore {
    rows: RwLock<Vec<ServiceRequest>>,
    unavailable: AtomicBool,
}

impl InMemoryServiceRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails like an unreachable backend.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Seeds a complete row, bypassing creation defaults.
    pub async fn seed(&self, row: ServiceRequest) {
        self.rows.write().await.push(row);
    }

    fn check(&self) -> Result<(), PersistenceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable("in-memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ServiceRequestStore for InMemoryServiceRequestStore {
    async fn list(&self) -> Result<Vec<ServiceRequest>, PersistenceError> {
        self.check()?;
        let mut rows = self.rows.read().await.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, PersistenceError> {
        self.check()?;
        Ok(self.rows.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn insert(&self, fields: &ServiceRequestFields) -> Result<ServiceRequest, PersistenceError> {
        self.check()?;
        let row = ServiceRequest {
            id: Uuid::new_v4(),
            customer_name: fields.customer_name.clone(),
            complaint: fields.complaint.clone(),
            mobile: fields.mobile.clone(),
            technician_name: fields.technician_name.clone(),
            service_date: fields.service_date,
            status: ServiceStatus::default(),
            notes: None,
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<Option<ServiceRequest>, PersistenceError> {
        self.check()?;
        let mut rows = self.rows.write().await;
        Ok(rows.iter_mut().find(|r| r.id == id).map(|row| {
            row.status = status;
            row.clone()
        }))
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        self.check()
    }
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, InsertUserError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(InsertUserError::Duplicate);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn fields(name: &str) -> ServiceRequestFields {
        ServiceRequestFields {
            customer_name: name.into(),
            complaint: "AC noise".into(),
            mobile: "9999999999".into(),
            technician_name: "Raj".into(),
            service_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_defaults() {
        let store = InMemoryServiceRequestStore::new();
        let row = store.insert(&fields("Amit")).await.unwrap();
        assert_eq!(row.status, ServiceStatus::Pending);
        assert!(row.notes.is_none());
        assert_eq!(store.get(row.id).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryServiceRequestStore::new();
        let older = store.insert(&fields("old")).await.unwrap();
        let mut newer = older.clone();
        newer.id = Uuid::new_v4();
        newer.customer_name = "new".into();
        newer.created_at = older.created_at + Duration::minutes(5);
        store.seed(newer.clone()).await;

        let rows = store.list().await.unwrap();
        assert_eq!(rows[0].id, newer.id);
        assert_eq!(rows[1].id, older.id);
    }

    #[tokio::test]
    async fn update_status_unknown_id_is_none() {
        let store = InMemoryServiceRequestStore::new();
        let out = store
            .update_status(Uuid::new_v4(), ServiceStatus::Completed)
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = InMemoryServiceRequestStore::new();
        store.set_unavailable(true);
        assert!(store.list().await.is_err());
        assert!(store.insert(&fields("x")).await.is_err());
        assert!(store.ping().await.is_err());
        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let users = InMemoryUserStore::new();
        users.insert("a@b.co", "hash").await.unwrap();
        assert!(matches!(
            users.insert("a@b.co", "hash").await,
            Err(InsertUserError::Duplicate)
        ));
    }
}
