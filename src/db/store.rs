use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::requests::{ServiceRequest, ServiceRequestFields, ServiceStatus};
use crate::db::models::user::User;
use crate::errors::PersistenceError;

/// Remote table of service requests.
///
/// `list` must return rows newest first.
#[async_trait]
pub trait ServiceRequestStore: Send + Sync {
    async fn list(&self) -> Result<Vec<ServiceRequest>, PersistenceError>;

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, PersistenceError>;

    /// Inserts one row; id, created_at and status are assigned by the store.
    async fn insert(&self, fields: &ServiceRequestFields) -> Result<ServiceRequest, PersistenceError>;

    /// Writes only the status column. `None` when no row has `id`.
    async fn update_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<Option<ServiceRequest>, PersistenceError>;

    /// Cheap reachability probe for readiness checks.
    async fn ping(&self) -> Result<(), PersistenceError>;
}

#[derive(Debug)]
pub enum InsertUserError {
    Duplicate,
    Persistence(PersistenceError),
}

/// Accounts backing the auth provider.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError>;

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, InsertUserError>;
}

const SELECT_COLUMNS: &str = "id, customer_name, complaint, mobile, technician_name, service_date, status, notes, created_at";

#[derive(Clone)]
pub struct PgServiceRequestStore {
    pool: PgPool,
}

impl PgServiceRequestStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRequestStore for PgServiceRequestStore {
    async fn list(&self) -> Result<Vec<ServiceRequest>, PersistenceError> {
        let rows = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {SELECT_COLUMNS} FROM service_requests ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ServiceRequest>, PersistenceError> {
        let row = sqlx::query_as::<_, ServiceRequest>(&format!(
            "SELECT {SELECT_COLUMNS} FROM service_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, fields: &ServiceRequestFields) -> Result<ServiceRequest, PersistenceError> {
        let row = sqlx::query_as::<_, ServiceRequest>(&format!(
            r#"
            INSERT INTO service_requests (customer_name, complaint, mobile, technician_name, service_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SELECT_COLUMNS}
            "#
        ))
        .bind(&fields.customer_name)
        .bind(&fields.complaint)
        .bind(&fields.mobile)
        .bind(&fields.technician_name)
        .bind(fields.service_date)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ServiceStatus,
    ) -> Result<Option<ServiceRequest>, PersistenceError> {
        let row = sqlx::query_as::<_, ServiceRequest>(&format!(
            "UPDATE service_requests SET status = $1 WHERE id = $2 RETURNING {SELECT_COLUMNS}"
        ))
        .bind(status)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn ping(&self) -> Result<(), PersistenceError> {
        sqlx::query("SELECT 1 FROM service_requests LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, InsertUserError> {
        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.code().map(|code| code == "23505").unwrap_or(false) {
                        return Err(InsertUserError::Duplicate);
                    }
                }
                Err(InsertUserError::Persistence(e.into()))
            }
        }
    }
}
