// Application layer - Use cases and ports
pub mod ingest_service;
pub mod reading_repository;
