//! Outbound email notifications via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport to send the auth
//! flows' plain-text mails (confirmation codes, reset codes, change
//! notices). Configuration is loaded from environment variables; if
//! `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and the
//! mailer runs disabled: every send logs its payload and succeeds, so local
//! development works without an SMTP server. With a configured transport,
//! delivery errors propagate to the caller.

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@toktak.local";

/// Configuration for the SMTP delivery transport.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                |
    /// |-----------------|----------|------------------------|
    /// | `SMTP_HOST`     | yes      | —                      |
    /// | `SMTP_PORT`     | no       | `587`                  |
    /// | `SMTP_FROM`     | no       | `noreply@toktak.local` |
    /// | `SMTP_USER`     | no       | —                      |
    /// | `SMTP_PASSWORD` | no       | —                      |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends the auth flows' notification emails via SMTP.
pub struct Mailer {
    config: Option<EmailConfig>,
}

impl Mailer {
    /// Create a mailer with the given transport configuration.
    pub fn new(config: Option<EmailConfig>) -> Self {
        Self { config }
    }

    /// Build a mailer from environment variables (disabled when `SMTP_HOST`
    /// is unset).
    pub fn from_env() -> Self {
        Self::new(EmailConfig::from_env())
    }

    /// Whether a transport is configured.
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Email-verification code for a new or changed account.
    pub async fn send_confirmation_code(
        &self,
        to_email: &str,
        first_name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        let subject = "Welcome to Toktak! Confirm your Email";
        let body = format!(
            "Hi {first_name},\n\nYour email verification code is: {code}\n\n\
             Enter it in the app to confirm your address."
        );
        self.deliver(to_email, subject, &body).await
    }

    /// Password-reset code for the forgot-password flow.
    pub async fn send_password_reset_code(
        &self,
        to_email: &str,
        first_name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        let subject = "Reset your password!";
        let body = format!(
            "Hi {first_name},\n\nYour password reset code is: {code}\n\n\
             If you did not request a reset, you can ignore this email."
        );
        self.deliver(to_email, subject, &body).await
    }

    /// Notice that the account password was changed.
    pub async fn send_password_changed(
        &self,
        to_email: &str,
        first_name: &str,
    ) -> Result<(), MailError> {
        let subject = "Your password has been changed!";
        let body = format!(
            "Hi {first_name},\n\nYour Toktak password was just changed.\n\n\
             If this wasn't you, reset your password immediately."
        );
        self.deliver(to_email, subject, &body).await
    }

    /// Confirmation code for an email-address change.
    pub async fn send_email_update_code(
        &self,
        to_email: &str,
        first_name: &str,
        code: &str,
    ) -> Result<(), MailError> {
        let subject = "Email update confirmation!";
        let body = format!(
            "Hi {first_name},\n\nYour email update confirmation code is: {code}"
        );
        self.deliver(to_email, subject, &body).await
    }

    /// Welcome mail after a confirmed registration.
    pub async fn send_welcome(&self, to_email: &str, first_name: &str) -> Result<(), MailError> {
        let subject = "Welcome to Toktak";
        let body = format!("Hi {first_name},\n\nWelcome aboard!");
        self.deliver(to_email, subject, &body).await
    }

    /// Send a plain-text message through the configured transport.
    async fn deliver(&self, to_email: &str, subject: &str, body: &str) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let Some(config) = &self.config else {
            tracing::warn!(to = to_email, subject, "SMTP not configured, logging mail instead");
            tracing::info!(to = to_email, body, "mail payload");
            return Ok(());
        };

        let email = Message::builder()
            .from(config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to = to_email, subject, "Notification email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(EmailConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn unconfigured_mailer_send_succeeds() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_configured());
        mailer
            .send_confirmation_code("a@x.com", "A", "A1B2C3")
            .await
            .expect("disabled mailer must not fail");
    }

    #[test]
    fn mail_error_display_build() {
        let err = MailError::Build("missing body".to_string());
        assert_eq!(err.to_string(), "Email build error: missing body");
    }

    #[test]
    fn mail_error_display_address() {
        let addr_err: Result<lettre::Address, _> = "not-an-email".parse();
        let err = MailError::Address(addr_err.unwrap_err());
        assert!(err.to_string().contains("Email address parse error"));
    }
}
