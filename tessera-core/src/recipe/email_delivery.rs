//! Email delivery ingredient
//!
//! Recipes describe *what* to send as an [`EmailType`]; an
//! [`EmailDeliveryService`] turns it into content and hands it to a transport.
//! The SMTP transport lives outside this crate.

use async_trait::async_trait;

use crate::{Error, recipe::emailverification::User};

#[derive(Debug, Clone, PartialEq)]
pub enum EmailType {
    EmailVerification { user: User, link: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub is_html: bool,
}

#[async_trait]
pub trait EmailDeliveryService: Send + Sync {
    async fn get_content(&self, email: &EmailType) -> Result<EmailContent, Error>;

    async fn send_raw_email(&self, content: EmailContent) -> Result<(), Error>;

    async fn send_email(&self, email: EmailType) -> Result<(), Error> {
        let content = self.get_content(&email).await?;
        self.send_raw_email(content).await
    }
}

/// Plain-text content for the emails recipes send.
pub fn default_content(app_name: &str, email: &EmailType) -> EmailContent {
    match email {
        EmailType::EmailVerification { user, link } => EmailContent {
            to_email: user.email.clone(),
            subject: format!("Email verification instructions for {app_name}"),
            body: format!(
                "Please verify your email address for {app_name} by opening the link below.\r\n\r\n{link}\r\n\r\nIf you did not create an account, you can ignore this email."
            ),
            is_html: false,
        },
    }
}

/// Delivery that only logs what would have been sent. Useful in development
/// and as the default until a real transport is configured.
pub struct LogOnlyDelivery {
    app_name: String,
}

impl LogOnlyDelivery {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }
}

#[async_trait]
impl EmailDeliveryService for LogOnlyDelivery {
    async fn get_content(&self, email: &EmailType) -> Result<EmailContent, Error> {
        Ok(default_content(&self.app_name, email))
    }

    async fn send_raw_email(&self, content: EmailContent) -> Result<(), Error> {
        tracing::info!(
            email.to = %content.to_email,
            email.subject = %content.subject,
            "Email delivery not configured, logging instead"
        );
        tracing::debug!(email.body = %content.body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verification() -> EmailType {
        EmailType::EmailVerification {
            user: User {
                id: "u-1".to_string(),
                email: "ada@example.com".to_string(),
            },
            link: "https://example.com/auth/verify-email?token=t".to_string(),
        }
    }

    #[test]
    fn test_default_content() {
        let content = default_content("Demo", &verification());
        assert_eq!(content.to_email, "ada@example.com");
        assert_eq!(content.subject, "Email verification instructions for Demo");
        assert!(content.body.contains("https://example.com/auth/verify-email?token=t"));
        assert!(!content.is_html);
    }

    #[tokio::test]
    async fn test_log_only_delivery_sends() {
        let delivery = LogOnlyDelivery::new("Demo");
        assert!(delivery.send_email(verification()).await.is_ok());
    }
}
