// src/jobs/address_cleanup.rs

use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;

use super::RecurringJob;
use crate::services::address_service::AddressService;

pub const JOB_NAME: &str = "address-cleanup";

/// Varredura diária dos endereços sem dono. Falhas só são logadas; a próxima execução tenta de novo.
pub fn address_cleanup_job(addresses: AddressService) -> RecurringJob {
    Arc::new(move || {
        let addresses = addresses.clone();
        async move {
            match addresses.delete_unlinked_addresses(Utc::now()).await {
                Ok(deleted) if deleted.is_empty() => {
                    tracing::debug!("Nenhum endereço órfão para remover");
                }
                Ok(deleted) => {
                    let ids: Vec<i32> = deleted.iter().map(|a| a.id).collect();
                    tracing::info!(count = ids.len(), ids = ?ids, "🧹 Endereços órfãos removidos");
                }
                Err(e) => tracing::error!(error = %e, "Falha na limpeza de endereços"),
            }
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::test_support::address_payload;
    use chrono::Duration;

    #[tokio::test]
    async fn job_runs_the_sweep() {
        let db = MemoryDatabase::new();
        db.insert_address_at(&address_payload(), Utc::now() - Duration::hours(30));
        let addresses = AddressService::new(Arc::new(db.clone()));

        let job = address_cleanup_job(addresses.clone());
        job().await;

        assert!(addresses.list().await.unwrap().is_empty());
    }
}
