//! Business logic services

pub mod invoice;
pub mod stats;

use crate::{config::InvoiceConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub stats: stats::StatsService,
    pub invoices: invoice::InvoiceService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, invoice_config: InvoiceConfig) -> Self {
        Self {
            stats: stats::StatsService::new(repository.clone()),
            invoices: invoice::InvoiceService::new(repository, invoice_config),
        }
    }
}
