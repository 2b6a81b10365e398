pub mod ingest_service;
pub mod query_service;
