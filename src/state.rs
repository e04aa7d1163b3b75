//! Shared application state.

use crate::admin::AdminSite;
use crate::domain::repositories::RecordRepository;
use std::sync::Arc;

/// State handed to every request handler.
///
/// The site is frozen before the server starts, so handlers read it without
/// locking.
#[derive(Clone)]
pub struct AppState {
    pub site: Arc<AdminSite>,
    pub records: Arc<dyn RecordRepository>,
}

impl AppState {
    pub fn new(site: Arc<AdminSite>, records: Arc<dyn RecordRepository>) -> Self {
        Self { site, records }
    }
}
