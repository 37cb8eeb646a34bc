//! Host collaborators
//!
//! The batch host (for example a NetSuite Map/Reduce script) owns the
//! credential record, the company information and the record-creation stage.
//! The sync core only sees them through these traits; host-specific field
//! names stay behind the implementations.

mod sink;

pub use sink::JsonLinesSink;

use crate::config::{IntegrationConfig, SyncConfig};
use crate::sync::SyncRecord;
use crate::{Result, SyncError};

/// Source of the JIRA credentials for a run
pub trait CredentialStore {
    /// Read the integration record; failure is terminal for the run
    fn fetch_integration_config(&self) -> Result<IntegrationConfig>;
}

/// Source of the host company identifier
pub trait CompanyInfoSource {
    fn company_id(&self) -> Result<String>;
}

/// Receiver of mapped records (the host's record-creation stage)
pub trait RecordSink {
    fn accept(&mut self, records: &[SyncRecord]) -> Result<()>;
}

impl CredentialStore for IntegrationConfig {
    fn fetch_integration_config(&self) -> Result<IntegrationConfig> {
        Ok(self.clone())
    }
}

impl CredentialStore for SyncConfig {
    fn fetch_integration_config(&self) -> Result<IntegrationConfig> {
        self.integration_config()
    }
}

impl CompanyInfoSource for SyncConfig {
    fn company_id(&self) -> Result<String> {
        self.company
            .company_id
            .clone()
            .ok_or_else(|| SyncError::ConfigLoad("No company_id configured".to_string()))
    }
}

/// Fixed company identifier, or a missing one
#[derive(Debug, Clone, Default)]
pub struct StaticCompanyInfo {
    pub company_id: Option<String>,
}

impl StaticCompanyInfo {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: Some(company_id.into()),
        }
    }
}

impl CompanyInfoSource for StaticCompanyInfo {
    fn company_id(&self) -> Result<String> {
        self.company_id
            .clone()
            .ok_or_else(|| SyncError::ConfigLoad("Company information unavailable".to_string()))
    }
}

/// Environment heuristic over the host company identifier
///
/// A numeric-looking identifier means non-production, and so does any
/// failure to read it. Everything else is production.
pub fn is_production_environment(source: &dyn CompanyInfoSource) -> bool {
    match source.company_id() {
        Ok(id) => !looks_numeric(&id),
        Err(e) => {
            tracing::error!(error = %e, "Could not read company information, assuming non-production");
            false
        }
    }
}

/// Non-empty and only ASCII digits after trimming
pub fn looks_numeric(company_id: &str) -> bool {
    let id = company_id.trim();
    !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_company_is_non_production() {
        assert!(!is_production_environment(&StaticCompanyInfo::new("1234567")));
        assert!(!is_production_environment(&StaticCompanyInfo::new(" 42 ")));
    }

    #[test]
    fn test_non_numeric_company_is_production() {
        assert!(is_production_environment(&StaticCompanyInfo::new("1234567_SB1")));
        assert!(is_production_environment(&StaticCompanyInfo::new("TSTDRV99")));
    }

    #[test]
    fn test_read_failure_is_non_production() {
        assert!(!is_production_environment(&StaticCompanyInfo::default()));
        assert!(!is_production_environment(&SyncConfig::default()));
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("0"));
        assert!(!looks_numeric(""));
        assert!(!looks_numeric("   "));
        assert!(!looks_numeric("12.5"));
        assert!(!looks_numeric("-12"));
    }

    #[test]
    fn test_sync_config_as_credential_store() {
        let config = SyncConfig::new("https://acme.atlassian.net", "jane@example.com", "tok")
            .with_company_id("ACME");
        let creds = config.fetch_integration_config().unwrap();
        assert_eq!(creds.username, "jane@example.com");
        assert_eq!(config.company_id().unwrap(), "ACME");
    }
}
