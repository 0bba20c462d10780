//! Configuration loading and management for the Payroll Computation Engine.
//!
//! This module provides functionality to load per-tenant payroll configuration
//! from YAML files: currency, status amounts, overtime multipliers and
//! statutory deduction settings.
//!
//! # Example
//!
//! ```no_run
//! use payroll_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/tenants").unwrap();
//! let tenant = config.tenant("acme_mining").unwrap();
//! println!("Loaded tenant: {}", tenant.metadata.name);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, validate};
pub use types::{
    AlternateLevyConfig, CurrencyConfig, DeductionConfig, IncomeLevyConfig, LevyBase, LevyBracket,
    LevyMode, OvertimeConfig, RateTable, ReferenceCurrency, SocialSecurityConfig, TenantConfig,
    TenantMetadata,
};
