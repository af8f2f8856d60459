use std::sync::Arc;

use app_core::config::Config;

use crate::usecase::profile::ProfileUseCase;
use crate::usecase::session::SessionUseCase;

#[derive(Clone)]
pub struct ProfileState {
    pub config: Arc<Config>,
    pub profile: Arc<dyn ProfileUseCase>,
    pub session: Arc<dyn SessionUseCase>,
}

impl ProfileState {
    pub fn new(config: Arc<Config>, profile: Arc<dyn ProfileUseCase>, session: Arc<dyn SessionUseCase>) -> Self {
        Self { config, profile, session }
    }

    /// Where clients without a valid session are sent.
    pub fn login_route(&self) -> String {
        self.config.get_or("routes.login", "/login".to_string())
    }
}
