/// Business logic layer for tryon-service
pub mod garment_cache;
pub mod rotator;
pub mod storage;

pub use garment_cache::{fetch_garment, GarmentCache};
pub use rotator::{CredentialRotator, CredentialStore, PgCredentialStore};
