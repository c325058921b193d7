//! Per-user identity and the headers derived from it.

use std::fmt;

/// Who is calling the API. Values are opaque and never validated.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    subscription_id: String,
    access_token: String,
    company: String,
    email: String,
}

impl ClientIdentity {
    pub fn new(
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
        company: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            access_token: access_token.into(),
            company: company.into(),
            email: email.into(),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Tick asks integrations to identify themselves as `Company(email)`.
    pub fn user_agent(&self) -> String {
        format!("{}({})", self.company, self.email)
    }

    pub fn authorization(&self) -> String {
        format!("Token token={}", self.access_token)
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("company", &self.company)
            .field("email", &self.email)
            .finish()
    }
}
