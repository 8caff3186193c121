//! Request extractors for fiscal-service.

pub mod tenant;

pub use tenant::TenantContext;
