//! Application state shared across handlers

use std::{fmt, sync::Arc};

use application::{
    AuthService, HealthService, IdentityProviderPort, KeyValueStorePort, LogService, LogSinkPort,
    MigrationPort, ProjectService, SessionStore, TokenPort, UserService,
};

/// Outbound adapters the services are built from
pub struct Ports {
    pub identity: Arc<dyn IdentityProviderPort>,
    pub migration: Arc<dyn MigrationPort>,
    pub tokens: Arc<dyn TokenPort>,
    pub store: Arc<dyn KeyValueStorePort>,
    pub log_sink: Arc<dyn LogSinkPort>,
}

impl fmt::Debug for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ports").finish_non_exhaustive()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub project_service: Arc<ProjectService>,
    pub log_service: Arc<LogService>,
    pub health_service: Arc<HealthService>,
    /// Verifies app tokens on protected routes
    pub tokens: Arc<dyn TokenPort>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire every service from the given adapters
    pub fn new(ports: Ports) -> Self {
        let sessions = SessionStore::new(Arc::clone(&ports.store));

        Self {
            auth_service: Arc::new(AuthService::new(
                Arc::clone(&ports.identity),
                Arc::clone(&ports.tokens),
                sessions.clone(),
            )),
            user_service: Arc::new(UserService::new(
                Arc::clone(&ports.identity),
                sessions.clone(),
            )),
            project_service: Arc::new(ProjectService::new(ports.migration, sessions)),
            log_service: Arc::new(LogService::new(Arc::clone(&ports.log_sink))),
            health_service: Arc::new(HealthService::new(ports.store, ports.log_sink)),
            tokens: ports.tokens,
        }
    }
}
