use std::sync::Arc;

use crate::auth::Credentials;
use crate::database::TeaStore;

/// Shared handler state: the store and the credential service built at startup
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TeaStore>,
    pub credentials: Arc<Credentials>,
}

impl AppState {
    pub fn new(store: Arc<dyn TeaStore>, credentials: Credentials) -> Self {
        Self {
            store,
            credentials: Arc::new(credentials),
        }
    }
}
