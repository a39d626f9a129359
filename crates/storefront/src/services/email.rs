//! Email service for password reset links.
//!
//! Uses SMTP via lettre for delivery with Askama templates. Without SMTP
//! settings the storefront logs the link instead of sending it.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;
use crate::models::account::RESET_TOKEN_TTL_MINUTES;

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    username: &'a str,
    link: &'a str,
    valid_minutes: i64,
}

#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    username: &'a str,
    link: &'a str,
    valid_minutes: i64,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// The link a reset email points to.
#[must_use]
pub fn reset_link(base_url: &str, token: &str) -> String {
    format!("{}/reset-password?token={token}", base_url.trim_end_matches('/'))
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the password reset link.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_password_reset(
        &self,
        to: &str,
        username: &str,
        link: &str,
    ) -> Result<(), EmailError> {
        let (text, html) = render_password_reset(username, link)?;
        self.send_multipart_email(to, "Réinitialisation de votre mot de passe", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

fn render_password_reset(username: &str, link: &str) -> Result<(String, String), EmailError> {
    let text = PasswordResetEmailText {
        username,
        link,
        valid_minutes: RESET_TOKEN_TTL_MINUTES,
    }
    .render()?;
    let html = PasswordResetEmailHtml {
        username,
        link,
        valid_minutes: RESET_TOKEN_TTL_MINUTES,
    }
    .render()?;
    Ok((text, html))
}

/// Deliver a reset link by email, or log it when SMTP is not configured.
///
/// # Errors
///
/// Returns error if a configured mailer fails.
pub async fn deliver_reset_link(
    mailer: Option<&EmailService>,
    to: &str,
    username: &str,
    link: &str,
) -> Result<(), EmailError> {
    match mailer {
        Some(service) => service.send_password_reset(to, username, link).await,
        None => {
            tracing::warn!(to = %to, link = %link, "SMTP not configured, reset link not emailed");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link() {
        assert_eq!(
            reset_link("https://darkoftan.tn/", "abc123"),
            "https://darkoftan.tn/reset-password?token=abc123"
        );
        assert_eq!(
            reset_link("http://localhost:3000", "abc123"),
            "http://localhost:3000/reset-password?token=abc123"
        );
    }

    #[test]
    fn test_templates_include_link() {
        let link = "https://darkoftan.tn/reset-password?token=ff00";
        let (text, html) = render_password_reset("yasmine", link).unwrap();
        assert!(text.contains("Bonjour yasmine"));
        assert!(text.contains(link));
        assert!(text.contains("60 minutes"));
        assert!(html.contains("reset-password?token=ff00"));
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_logs_instead() {
        let result = deliver_reset_link(None, "a@example.tn", "a", "http://x/reset").await;
        assert!(result.is_ok());
    }
}
