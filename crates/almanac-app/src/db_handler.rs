use std::sync::Arc;

use salvo::async_trait;

use almanac_core::error::CoreError;
use almanac_db::db::DbProvider;

use crate::error::AppResult;

/// Shared handle to the connection source, as stored in the depot.
pub type SharedDbProvider = Arc<dyn DbProvider + Send + Sync>;

/// Makes a database provider available to every handler below it.
pub struct DbProviderHandler {
    provider: SharedDbProvider,
}

impl DbProviderHandler {
    #[must_use]
    pub fn new<T: DbProvider + Send + Sync + 'static>(provider: T) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl salvo::Handler for DbProviderHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.provider));
    }
}

/// ## Summary
/// Retrieves the database provider from the depot.
///
/// ## Errors
/// Returns an error if the database provider is not found in the depot.
pub fn get_db_from_depot(depot: &salvo::Depot) -> AppResult<SharedDbProvider> {
    depot
        .obtain::<SharedDbProvider>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Database provider not found in depot").into())
}
