use std::sync::Arc;

use admiral_application::{AdminAccountService, AdminGroupService, DirectoryService};
use admiral_core::AppError;
use admiral_domain::{AccessPolicyEngine, RoleResolver};
use admiral_infrastructure::{InMemoryDirectory, PostgresDirectory};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, DirectoryBackend};
use crate::state::AppState;

use super::database::connect_and_migrate;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let directory: Arc<dyn DirectoryService> = match &config.directory_backend {
        DirectoryBackend::Postgres { database_url } => {
            let pool = connect_and_migrate(database_url).await?;
            info!("using postgres admin directory");
            Arc::new(PostgresDirectory::new(pool))
        }
        DirectoryBackend::Memory => {
            warn!("using in-memory admin directory; data is lost on restart");
            Arc::new(InMemoryDirectory::seeded()?)
        }
    };

    Ok(app_state_for(directory, config))
}

/// Wires the services over an already built directory.
pub fn app_state_for(directory: Arc<dyn DirectoryService>, config: &ApiConfig) -> AppState {
    let policy = AccessPolicyEngine::new(config.denial_verbosity);
    let group_service = AdminGroupService::new(directory.clone(), config.group_page_size);
    let account_service = AdminAccountService::new(
        directory,
        group_service.clone(),
        policy,
        config.listing_limits,
    );

    AppState {
        account_service,
        group_service,
        role_resolver: RoleResolver::new(config.role_claim.as_str()),
    }
}
