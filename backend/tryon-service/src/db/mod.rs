/// Database access layer for tryon-service
pub mod credential_repo;
pub mod garment_repo;
