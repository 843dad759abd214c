use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use snafu::{ResultExt, Snafu};

use crate::config::models::Smtp;

use super::models::LowSupplyAlert;

/// Delivers [`LowSupplyAlert`]s. Tests substitute a recording fake.
pub trait AlertTransport {
    fn send(&self, alert: &LowSupplyAlert) -> Result<(), MailError>;
}

/// Sends alerts over plain SMTP submission with opportunistic STARTTLS:
/// the transport upgrades when the relay offers it and silently stays on
/// plaintext when it does not. Accepted risk for an on-site relay.
pub struct AlertMailer {
    transport: SmtpTransport,
    from: Mailbox,
    to: Mailbox,
}

impl AlertMailer {
    pub fn new(settings: &Smtp) -> Result<Self, MailError> {
        let from = settings.from.parse().context(AddressSnafu { address: settings.from.clone() })?;
        let to = settings.to.parse().context(AddressSnafu { address: settings.to.clone() })?;

        let tls = TlsParameters::new(settings.host.clone()).context(TransportSnafu)?;
        let mut builder = SmtpTransport::builder_dangerous(&settings.host)
            .port(settings.port)
            .tls(Tls::Opportunistic(tls));
        if !settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        }

        Ok(Self { transport: builder.build(), from, to })
    }
}

impl AlertTransport for AlertMailer {
    fn send(&self, alert: &LowSupplyAlert) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(alert.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(alert.body())
            .context(BuildSnafu)?;

        self.transport.send(&message).context(TransportSnafu)?;
        Ok(())
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum MailError {
    #[snafu(display("Invalid mail address '{address}': {source}"))]
    Address { address: String, source: lettre::address::AddressError },

    #[snafu(display("Could not assemble alert message: {source}"))]
    Build { source: lettre::error::Error },

    #[snafu(display("SMTP transport error: {source}"))]
    Transport { source: lettre::transport::smtp::Error },
}

#[cfg(test)]
mod tests {
    use crate::config::models::Smtp;

    use super::{AlertMailer, MailError};

    fn smtp_settings() -> Smtp {
        Smtp {
            host: "localhost".to_string(),
            port: 25,
            from: "csp2mail@localhost".to_string(),
            to: "operator@localhost".to_string(),
            username: String::new(),
            password: String::new(),
        }
    }

    #[test]
    fn mailer_builds_from_valid_settings() {
        assert!(AlertMailer::new(&smtp_settings()).is_ok());
    }

    #[test]
    fn bad_recipient_address_is_rejected_at_startup() {
        let mut settings = smtp_settings();
        settings.to = "not an address".to_string();
        let result = AlertMailer::new(&settings);
        assert!(matches!(result, Err(MailError::Address { .. })));
    }
}
