//! Operator identity and the super-user check

use crate::config::AccessConfig;
use crate::domain::{BridgeError, Result};

/// Role that grants every bridge operation
pub const SUPER_USER_ROLE: &str = "System Developer";

/// The person driving the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operator {
    username: String,
    roles: Vec<String>,
}

impl Operator {
    pub fn new(username: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            username: username.into(),
            roles,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn is_super_user(&self) -> bool {
        self.roles.iter().any(|r| r == SUPER_USER_ROLE)
    }

    /// # Errors
    ///
    /// Returns `BridgeError::AccessDenied` unless the operator holds
    /// [`SUPER_USER_ROLE`].
    pub fn require_super_user(&self) -> Result<()> {
        if self.is_super_user() {
            Ok(())
        } else {
            tracing::warn!(username = %self.username, "Super user privilege required");
            Err(BridgeError::AccessDenied(format!(
                "{} does not hold the {} role",
                self.username, SUPER_USER_ROLE
            )))
        }
    }
}

impl From<&AccessConfig> for Operator {
    fn from(config: &AccessConfig) -> Self {
        Self::new(config.username.clone(), config.roles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_access_config_is_super_user() {
        let operator = Operator::from(&AccessConfig::default());
        assert_eq!(operator.username(), "admin");
        assert!(operator.require_super_user().is_ok());
    }

    #[test]
    fn test_other_roles_are_denied() {
        let operator = Operator::new("clerk", vec!["Data Clerk".to_string()]);
        let err = operator.require_super_user().unwrap_err();
        assert!(matches!(err, BridgeError::AccessDenied(_)));
        assert!(err.to_string().contains("clerk"));
    }
}
