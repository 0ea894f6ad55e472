use super::{AlertSink, SinkError};
use crate::config::MailConfig;
use crate::types::{defang, Alert};
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

/// Plaintext mail over implicit TLS to a single fixed recipient.
pub struct MailSink {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    subject: String,
}

impl MailSink {
    pub fn new(config: &MailConfig, timeout: Duration) -> Result<Self, SinkError> {
        let from: Mailbox = config
            .smtp_email
            .parse()
            .map_err(|e| SinkError::Config(format!("Invalid SMTP_EMAIL: {}", e)))?;
        let to: Mailbox = config
            .dest_email
            .parse()
            .map_err(|e| SinkError::Config(format!("Invalid DEST_EMAIL: {}", e)))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_server)
            .map_err(|e| SinkError::Smtp(format!("SMTP transport error: {}", e)))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_email.clone(),
                config.smtp_password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        Ok(Self {
            transport,
            from,
            to,
            subject: config.subject.clone(),
        })
    }
}

/// CRLF-joined plaintext body with every link de-clicked.
pub fn mail_body(alert: &Alert) -> String {
    let event = &alert.event;
    let body = format!(
        "FROM: @{}\r\nTEXT: {}\r\nTWEET DATE: {}\r\nLINK: {}",
        event.author_handle,
        event.match_text(),
        event.created_at.format("%a %b %d %H:%M:%S %z %Y"),
        alert.permalink,
    );
    defang(&body)
}

#[async_trait]
impl AlertSink for MailSink {
    async fn deliver(&self, alert: &Alert) -> Result<(), SinkError> {
        let email = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(&self.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail_body(alert))
            .map_err(|e| SinkError::Smtp(format!("Failed to build email: {}", e)))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| SinkError::Smtp(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }

    fn quiet(&self) -> bool {
        true
    }
}
