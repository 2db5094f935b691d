// src/jobs/document_queue.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempPath;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{document::NewDocument, party::OwnerType},
    services::document_service::DocumentService,
    storage::ObjectStorage,
};

pub const MAX_ATTEMPTS: u32 = 3;
pub const QUEUE_CAPACITY: usize = 100;

/// Upload aceito pela API e ainda não gravado no bucket.
/// O arquivo temporário é apagado quando o job é descartado.
#[derive(Debug)]
pub struct DocumentJob {
    pub id: Uuid,
    pub temp_file: TempPath,
    pub file_name: String,
    pub document_type_id: i32,
    pub owner_type: OwnerType,
    pub owner_id: i32,
    pub observation: Option<String>,
}

impl DocumentJob {
    pub fn object_key(&self) -> String {
        format!("documents/{}-{}", self.id, self.file_name)
    }
}

#[derive(Clone)]
pub struct DocumentQueue {
    sender: mpsc::Sender<DocumentJob>,
}

impl DocumentQueue {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<DocumentJob>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self { sender }, receiver)
    }

    pub async fn enqueue(&self, job: DocumentJob) -> Result<Uuid, AppError> {
        let id = job.id;
        self.sender
            .send(job)
            .await
            .map_err(|_| AppError::QueueError("Fila de documentos encerrada.".into()))?;
        tracing::debug!(job_id = %id, "Documento enfileirado");
        Ok(id)
    }
}

#[async_trait]
pub trait DocumentJobHandler: Send + Sync {
    async fn handle(&self, job: &DocumentJob) -> Result<(), AppError>;
}

/// Sobe o arquivo para o bucket e grava o documento.
pub struct DocumentUploadHandler {
    storage: Arc<dyn ObjectStorage>,
    documents: DocumentService,
}

impl DocumentUploadHandler {
    pub fn new(storage: Arc<dyn ObjectStorage>, documents: DocumentService) -> Self {
        Self { storage, documents }
    }
}

#[async_trait]
impl DocumentJobHandler for DocumentUploadHandler {
    async fn handle(&self, job: &DocumentJob) -> Result<(), AppError> {
        // mesma chave em cada tentativa: um reenvio sobrescreve o anterior
        let object_key = job.object_key();
        let url = self.storage.upload(&job.temp_file, &object_key).await?;

        let document = self
            .documents
            .persist_uploaded(NewDocument {
                document_type_id: job.document_type_id,
                owner_type: job.owner_type,
                owner_id: job.owner_id,
                url,
                object_key,
                file_name: job.file_name.clone(),
                observation: job.observation.clone(),
            })
            .await?;

        tracing::info!(job_id = %job.id, document_id = document.id, "Documento processado");
        Ok(())
    }
}

/// Consumidor único da fila.
pub struct DocumentWorker {
    receiver: mpsc::Receiver<DocumentJob>,
    handler: Arc<dyn DocumentJobHandler>,
    retry_delay: Duration,
}

impl DocumentWorker {
    pub fn new(
        receiver: mpsc::Receiver<DocumentJob>,
        handler: Arc<dyn DocumentJobHandler>,
        retry_delay: Duration,
    ) -> Self {
        Self { receiver, handler, retry_delay }
    }

    pub async fn run(mut self) {
        tracing::info!("🚀 Worker de documentos iniciado.");
        while let Some(job) = self.receiver.recv().await {
            self.process(job).await;
        }
        tracing::info!("Fila de documentos encerrada, worker finalizado.");
    }

    /// Até `MAX_ATTEMPTS` tentativas; devolve se o job terminou com sucesso.
    pub async fn process(&self, job: DocumentJob) -> bool {
        for attempt in 1..=MAX_ATTEMPTS {
            match self.handler.handle(&job).await {
                Ok(()) => return true,
                Err(e) if attempt < MAX_ATTEMPTS => {
                    tracing::warn!(job_id = %job.id, attempt, error = %e, "Falha no job de documento, nova tentativa");
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        job_id = %job.id,
                        attempts = MAX_ATTEMPTS,
                        file_name = %job.file_name,
                        error = %e,
                        "Job de documento descartado"
                    );
                }
            }
        }
        false
    }
}
