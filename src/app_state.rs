use std::sync::Arc;

use crate::config::Config;
use crate::db::store::{ServiceRequestStore, UserStore};
use crate::services::auth_service::AuthService;
use crate::services::list_view::ListView;
use crate::services::request_repository::RequestRepository;
use crate::views::Templates;

#[derive(Clone)]
pub struct AppState {
    pub requests: RequestRepository,
    pub list_view: Arc<ListView>,
    pub auth: AuthService,
    pub templates: Arc<Templates>,
}

impl AppState {
    /// Wires the collaborators once at startup.
    pub fn new(
        config: Config,
        request_store: Arc<dyn ServiceRequestStore>,
        user_store: Arc<dyn UserStore>,
    ) -> Result<Self, tera::Error> {
        let requests = RequestRepository::new(request_store, config.transition_policy);
        let list_view = Arc::new(ListView::new(requests.clone(), config.display_offset));
        let auth = AuthService::new(
            user_store,
            config.jwt_secret.clone(),
            config.token_ttl_secs,
            config.bcrypt_cost,
        );

        Ok(Self {
            requests,
            list_view,
            auth,
            templates: Arc::new(Templates::load()?),
        })
    }
}
