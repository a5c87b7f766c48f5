//! Store selection and service wiring.

use std::sync::Arc;

use tracing::info;

use invoicer_core::InvoiceResult;
use invoicer_infra::store::schema::ensure_schema;
use invoicer_infra::{InMemoryInvoiceStore, InvoiceService, InvoiceStore, PostgresInvoiceStore};

use crate::config::StoreConfig;

/// Services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub invoices: InvoiceService,
}

impl AppServices {
    pub fn new(invoices: InvoiceService) -> Self {
        Self { invoices }
    }
}

/// Build the store selected by `config` and wrap it in the invoice service.
///
/// Postgres builds connect eagerly and create the schema when missing.
pub async fn build_services(config: &StoreConfig) -> InvoiceResult<AppServices> {
    let store: Arc<dyn InvoiceStore> = match config {
        StoreConfig::InMemory => {
            info!("using in-memory invoice store");
            Arc::new(InMemoryInvoiceStore::new())
        }
        StoreConfig::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PostgresInvoiceStore::connect(database_url, *max_connections).await?;
            ensure_schema(store.pool()).await?;
            info!(max_connections, "using postgres invoice store");
            Arc::new(store)
        }
    };

    Ok(AppServices::new(InvoiceService::new(store)))
}
