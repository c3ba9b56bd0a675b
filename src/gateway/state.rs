use std::sync::Arc;

use crate::account::AccountService;
use crate::db::Database;
use crate::transfer::TransferEngine;

/// Shared gateway state
#[derive(Clone)]
pub struct AppState {
    /// Storage handle (health checks)
    pub db: Arc<Database>,
    /// Transfer engine
    pub engine: Arc<TransferEngine>,
    /// Profiles, point events and ledger reads
    pub accounts: Arc<AccountService>,
}

impl AppState {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            engine: Arc::new(TransferEngine::new(db.clone())),
            accounts: Arc::new(AccountService::new(db.clone())),
            db,
        }
    }
}
