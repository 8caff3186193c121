//! Fiscal Service - document numbering and GSTR-1 reporting for repair businesses.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;

pub use error::FiscalError;
pub use startup::{build_router, AppState, Application};
