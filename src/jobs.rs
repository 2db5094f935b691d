// src/jobs.rs
//
// Trabalho fora do ciclo de requisição: a fila de upload de documentos e os
// jobs recorrentes (cron).

pub mod address_cleanup;
pub mod document_queue;
pub mod scheduler;

pub use document_queue::{DocumentJob, DocumentQueue, DocumentUploadHandler, DocumentWorker};
pub use scheduler::{CronScheduler, RecurringJob, Scheduler};
