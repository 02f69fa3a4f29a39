/*
 * Responsibility
 * - Shared context attached to the Router (AppState)
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use crate::config::Config;
use crate::services::authz::{AuthorizationEngine, LoginService, SessionAuthorityCache};

#[derive(Clone, Debug)]
pub struct AppState {
    pub engine: Arc<AuthorizationEngine>,
    pub login: Arc<LoginService>,
    pub session_cookie_name: Arc<str>,
    pub login_entry_point: Arc<str>,
}

impl AppState {
    pub fn new(engine: AuthorizationEngine, login: LoginService, config: &Config) -> Self {
        Self {
            engine: Arc::new(engine),
            login: Arc::new(login),
            session_cookie_name: Arc::from(config.session_cookie_name.as_str()),
            login_entry_point: Arc::from(config.login_entry_point.as_str()),
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionAuthorityCache> {
        self.login.sessions()
    }
}
