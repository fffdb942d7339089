use crate::error::{DashboardError, Result};

/// Authentication state of one session. Created by the front end and passed
/// to every call that needs it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthContext {
    authenticated: bool,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        AuthContext::default()
    }

    /// Check `attempt` against the configured password. Without a configured
    /// password nobody gets in.
    pub fn verify(expected: Option<&str>, attempt: &str) -> Result<Self> {
        let expected = expected
            .filter(|p| !p.is_empty())
            .ok_or(DashboardError::PasswordNotConfigured)?;
        if constant_time_eq(expected.as_bytes(), attempt.as_bytes()) {
            tracing::info!("Session authenticated");
            Ok(AuthContext { authenticated: true })
        } else {
            tracing::warn!("Rejected password attempt");
            Err(DashboardError::IncorrectPassword)
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn require(&self) -> Result<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(DashboardError::NotAuthenticated)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_authenticates() {
        let ctx = AuthContext::verify(Some("s3cret"), "s3cret").unwrap();
        assert!(ctx.is_authenticated());
        assert!(ctx.require().is_ok());
    }

    #[test]
    fn wrong_password_is_rejected() {
        assert!(matches!(
            AuthContext::verify(Some("s3cret"), "s3cre"),
            Err(DashboardError::IncorrectPassword)
        ));
        assert!(AuthContext::verify(Some("s3cret"), "S3cret").is_err());
    }

    #[test]
    fn no_configured_password_refuses() {
        assert!(matches!(
            AuthContext::verify(None, ""),
            Err(DashboardError::PasswordNotConfigured)
        ));
        assert!(AuthContext::verify(Some(""), "").is_err());
    }

    #[test]
    fn anonymous_context_is_not_authenticated() {
        let ctx = AuthContext::anonymous();
        assert!(matches!(ctx.require(), Err(DashboardError::NotAuthenticated)));
    }
}
