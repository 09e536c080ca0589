use crate::config::email::EmailConfig;
use anyhow::Result;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

#[derive(Clone)]
pub struct EmailService {
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
}

impl EmailService {
    /// Build from environment variables. Without SMTP settings, messages are
    /// written to the debug log instead of being sent.
    pub fn from_env() -> Self {
        let Some(cfg) = EmailConfig::from_env() else {
            return Self::disabled();
        };

        let creds = Credentials::new(cfg.smtp_username.clone(), cfg.smtp_password.clone());
        match AsyncSmtpTransport::<Tokio1Executor>::relay(&cfg.smtp_host)
            .map(|builder| builder.port(cfg.smtp_port).credentials(creds).build())
        {
            Ok(transport) => Self {
                transport: Some(transport),
                from_address: Some(cfg.from_address),
            },
            Err(e) => {
                tracing::warn!("Failed to build SMTP transport: {e}");
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self {
            transport: None,
            from_address: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    /// Deliver a login passcode.
    pub async fn send_otp_email(&self, to: &str, code: &str, valid_minutes: i64) -> Result<()> {
        if !self.is_configured() {
            tracing::debug!("SMTP not configured, OTP for {to}: {code}");
            return Ok(());
        }

        let body = format!(
            "Your sign-in code is: {code}\n\nIt expires in {valid_minutes} minutes and can be used once. If you did not try to sign in, you can ignore this email."
        );
        self.send_email(to, "Your sign-in code", &body).await
    }

    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let (Some(transport), Some(from_address)) = (&self.transport, &self.from_address) else {
            tracing::debug!("SMTP not configured, skipping email to {to}");
            return Ok(());
        };

        let from_mailbox: Mailbox =
            from_address
                .parse()
                .map_err(|e: lettre::address::AddressError| {
                    anyhow::anyhow!("Invalid from address '{}': {}", from_address, e)
                })?;
        let to_mailbox: Mailbox = to.parse().map_err(|e: lettre::address::AddressError| {
            anyhow::anyhow!("Invalid to address '{}': {}", to, e)
        })?;

        let email = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())?;

        transport.send(email).await?;
        tracing::info!("Email sent to {to}: {subject}");
        Ok(())
    }
}
