//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading per-tenant
//! payroll configurations from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

use super::types::{
    DeductionConfig, LevyMode, OvertimeConfig, RateTable, TenantConfig, TenantMetadata,
};

/// Loads and provides access to tenant configurations.
///
/// # Directory Structure
///
/// The configuration root holds one directory per tenant:
/// ```text
/// config/tenants/
/// ├── acme_mining/
/// │   ├── tenant.yaml          # Tenant id, name, currency
/// │   ├── status_amounts.yaml  # Amount per attendance status
/// │   ├── overtime.yaml        # Workday length and multipliers
/// │   └── deductions.yaml      # CNSS, RTS and VF settings
/// └── sahel_transport/
///     └── ...
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/tenants").unwrap();
/// let tenant = loader.tenant("acme_mining").unwrap();
/// println!("Loaded tenant: {}", tenant.metadata.name);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    tenants: BTreeMap<String, TenantConfig>,
}

impl ConfigLoader {
    /// Loads every tenant directory under `path`.
    ///
    /// Returns an error if the root is missing, contains no tenant directory,
    /// or any tenant file is missing, malformed, or fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let root_str = path.display().to_string();

        let entries = fs::read_dir(path).map_err(|_| EngineError::ConfigNotFound {
            path: root_str.clone(),
        })?;

        let mut loader = Self::default();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: root_str.clone(),
            })?;
            let tenant_dir = entry.path();
            if tenant_dir.is_dir() {
                let tenant = Self::load_tenant(&tenant_dir)?;
                debug!(tenant_id = %tenant.tenant_id(), "Loaded tenant configuration");
                loader.insert(tenant);
            }
        }

        if loader.tenants.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no tenant directories found)", root_str),
            });
        }

        info!(tenants = loader.tenants.len(), "Tenant configurations loaded");
        Ok(loader)
    }

    /// Loads a single tenant directory.
    pub fn load_tenant<P: AsRef<Path>>(path: P) -> EngineResult<TenantConfig> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<TenantMetadata>(&path.join("tenant.yaml"))?;
        let rates = Self::load_yaml::<RateTable>(&path.join("status_amounts.yaml"))?;
        let overtime = Self::load_yaml::<OvertimeConfig>(&path.join("overtime.yaml"))?;
        let deductions = Self::load_yaml::<DeductionConfig>(&path.join("deductions.yaml"))?;

        let config = TenantConfig {
            metadata,
            rates: rates.with_zero_defaults(),
            overtime,
            deductions,
        };
        validate(&config)?;
        Ok(config)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Registers a tenant configuration, replacing any previous one with the same id.
    pub fn insert(&mut self, tenant: TenantConfig) {
        self.tenants.insert(tenant.tenant_id().to_string(), tenant);
    }

    /// Gets a tenant configuration by id.
    ///
    /// Returns `TenantNotFound` when no configuration is loaded for the tenant.
    pub fn tenant(&self, tenant_id: &str) -> EngineResult<&TenantConfig> {
        self.tenants
            .get(tenant_id)
            .ok_or_else(|| EngineError::TenantNotFound {
                tenant_id: tenant_id.to_string(),
            })
    }

    /// Returns the ids of all loaded tenants, sorted.
    pub fn tenant_ids(&self) -> impl Iterator<Item = &str> {
        self.tenants.keys().map(String::as_str)
    }
}

/// Checks structural rules that serde cannot express.
pub fn validate(config: &TenantConfig) -> EngineResult<()> {
    let tenant_id = config.tenant_id();
    let invalid = |message: String| EngineError::InvalidConfiguration {
        tenant_id: tenant_id.to_string(),
        message,
    };
    let hundred = Decimal::ONE_HUNDRED;
    let check_rate = |name: &str, rate: Decimal| {
        if rate < Decimal::ZERO || rate > hundred {
            Err(invalid(format!("{} must be between 0 and 100, got {}", name, rate)))
        } else {
            Ok(())
        }
    };

    if config.overtime.standard_workday_hours <= Decimal::ZERO {
        return Err(invalid(
            "standard_workday_hours must be greater than zero".to_string(),
        ));
    }
    if config.overtime.ordinary_multiplier < Decimal::ZERO
        || config.overtime.sunday_holiday_multiplier < Decimal::ZERO
    {
        return Err(invalid("overtime multipliers must not be negative".to_string()));
    }

    let deductions = &config.deductions;
    check_rate("social_security.employee_rate", deductions.social_security.employee_rate)?;
    check_rate("social_security.employer_rate", deductions.social_security.employer_rate)?;
    if let Some(rate) = deductions.alternate_levy.rate {
        check_rate("alternate_levy.rate", rate)?;
    }
    if let Some(flat_rate) = deductions.income_levy.flat_rate {
        check_rate("income_levy.flat_rate", flat_rate)?;
    }

    let brackets = &deductions.income_levy.brackets;
    let mut previous: Option<Decimal> = None;
    for (index, bracket) in brackets.iter().enumerate() {
        check_rate(&format!("income_levy.brackets[{}].rate", index), bracket.rate)?;
        match bracket.upper_bound {
            Some(upper) => {
                if upper <= previous.unwrap_or(Decimal::ZERO) {
                    return Err(invalid(format!(
                        "income_levy.brackets[{}] upper_bound {} must be greater than the previous bound",
                        index, upper
                    )));
                }
                previous = Some(upper);
            }
            None if index + 1 != brackets.len() => {
                return Err(invalid(format!(
                    "income_levy.brackets[{}] is unbounded but is not the last bracket",
                    index
                )));
            }
            None => {}
        }
    }

    if deductions.income_levy.mode == LevyMode::Progressive && brackets.is_empty() {
        debug!(tenant_id, "Progressive income levy configured without brackets");
    }

    Ok(())
}
