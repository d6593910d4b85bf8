use chrono::FixedOffset;
use serde::Serialize;
use tera::{Context, Tera};
use uuid::Uuid;

use crate::db::models::requests::{NewServiceRequest, ServiceRequest};
use crate::services::export::{CREATED_AT_FORMAT, SERVICE_DATE_FORMAT};
use crate::services::list_view::{ListView, Snapshot};

/// Embedded page templates.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn load() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../templates/base.html")),
            ("login.html", include_str!("../../templates/login.html")),
            ("dashboard.html", include_str!("../../templates/dashboard.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn render_dashboard(&self, page: &DashboardPage) -> Result<String, tera::Error> {
        self.tera
            .render("dashboard.html", &Context::from_serialize(page)?)
    }

    pub fn render_login(&self, page: &LoginPage) -> Result<String, tera::Error> {
        self.tera.render("login.html", &Context::from_serialize(page)?)
    }
}

/// One table row, pre-formatted for the template.
#[derive(Debug, Serialize)]
pub struct RequestRow {
    pub id: Uuid,
    pub customer_name: String,
    pub complaint: String,
    pub mobile: String,
    pub technician_name: String,
    pub service_date: String,
    pub status: &'static str,
    pub badge_class: &'static str,
    pub can_complete: bool,
    pub terminal: bool,
    pub updating: bool,
}

impl RequestRow {
    fn new(request: &ServiceRequest, updating: bool) -> Self {
        RequestRow {
            id: request.id,
            customer_name: request.customer_name.clone(),
            complaint: request.complaint.clone(),
            mobile: request.mobile.clone(),
            technician_name: request.technician_name.clone(),
            service_date: request.service_date.format(SERVICE_DATE_FORMAT).to_string(),
            status: request.status.as_str(),
            badge_class: request.status.badge_class(),
            can_complete: request.status.can_mark_completed(),
            terminal: request.status.is_terminal(),
            updating,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct FormState {
    pub open: bool,
    pub values: NewServiceRequest,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub signed_in: bool,
    pub email: String,
    pub rows: Vec<RequestRow>,
    pub stale: bool,
    pub refreshed_at: Option<String>,
    pub form: FormState,
}

impl DashboardPage {
    pub fn build(view: &ListView, snapshot: &Snapshot, email: String, form: FormState) -> Self {
        let offset: &FixedOffset = view.display_offset();
        DashboardPage {
            signed_in: true,
            email,
            rows: snapshot
                .requests
                .iter()
                .map(|r| RequestRow::new(r, view.is_updating(r.id)))
                .collect(),
            stale: snapshot.stale,
            refreshed_at: snapshot
                .refreshed_at
                .map(|at| at.with_timezone(offset).format(CREATED_AT_FORMAT).to_string()),
            form,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct LoginPage {
    pub signed_in: bool,
    pub email: String,
    pub error: Option<&'static str>,
}
