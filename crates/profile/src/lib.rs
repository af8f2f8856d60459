mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;

use app_core::config::Config;
use app_core::storage::StorageService;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
pub use inbound::router::create_router;
pub use inbound::state::ProfileState;
use sea_orm::DatabaseConnection;

use crate::outbound::orm::ProfileORM;
use crate::outbound::session::SessionRedis;
use crate::usecase::profile::ProfileService;
use crate::usecase::session::SessionService;

pub struct Dependency {
    pub db: Arc<DatabaseConnection>,
    pub rds: Pool<RedisConnectionManager>,
    pub config: Arc<Config>,
    pub storage: Arc<dyn StorageService>,
}

pub fn new(dep: Dependency) -> ProfileState {
    let sessions = Arc::new(SessionRedis::new(dep.rds));
    let repo = Arc::new(ProfileORM::new(dep.db));

    let profile_svc = Arc::new(ProfileService::new(dep.config.clone(), dep.storage, repo.clone()));
    let session_svc = Arc::new(SessionService::new(dep.config.clone(), sessions, repo));

    ProfileState::new(dep.config, profile_svc, session_svc)
}
