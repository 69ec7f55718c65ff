use async_trait::async_trait;
use lettre::message::{ Mailbox, MultiPart };
use lettre::transport::smtp::authentication::Credentials;
use lettre::{ AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor };
use tracing::{ info, warn };

use crate::alert_monitor::AlertMailer;
use crate::config::Config;
use crate::enums::AlertKind;
use crate::error::{ AppError, Result };

pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailService {
    pub fn new(config: &Config) -> Result<Self> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.clone()
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>
            ::relay(&config.smtp_host)
            .map_err(|e|
                AppError::Config(format!("Invalid SMTP relay {}: {}", config.smtp_host, e))
            )?
            .credentials(credentials)
            .build();

        let from = config.smtp_from
            .parse::<Mailbox>()
            .map_err(|e| AppError::Config(format!("Invalid SMTP from address: {}", e)))?;

        Ok(Self { transport, from })
    }

    fn build_alert_message(
        &self,
        to: &str,
        city: &str,
        kind: AlertKind,
        observed_temp: f64,
        threshold: f64
    ) -> Result<Message> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| AppError::Internal(format!("Invalid recipient address: {}", e)))?;

        // The email shows a rounded temperature; the ledger keeps the raw one
        let rounded = observed_temp.round();

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(format!("\u{1f321}\u{fe0f} Temperature Alert: {}", city))
            .multipart(
                MultiPart::alternative_plain_html(
                    alert_body_plain(city, kind, rounded, threshold),
                    alert_body_html(city, kind, rounded, threshold)
                )
            )
            .map_err(|e| AppError::Internal(format!("Failed to build alert email: {}", e)))
    }
}

#[async_trait]
impl AlertMailer for EmailService {
    /// Attempt delivery and report the outcome as a bool. Transport errors
    /// never escape this boundary; the caller decides what a failed send
    /// means for the ledger.
    async fn send_temperature_alert(
        &self,
        to: &str,
        city: &str,
        kind: AlertKind,
        observed_temp: f64,
        threshold: f64
    ) -> bool {
        let message = match self.build_alert_message(to, city, kind, observed_temp, threshold) {
            Ok(message) => message,
            Err(e) => {
                warn!(recipient = %to, error = %e, "failed to build alert email");
                return false;
            }
        };

        match self.transport.send(message).await {
            Ok(_) => {
                info!(recipient = %to, city = %city, kind = %kind, "alert email sent");
                true
            }
            Err(e) => {
                warn!(recipient = %to, city = %city, error = %e, "failed to send alert email");
                false
            }
        }
    }
}

fn alert_body_plain(city: &str, kind: AlertKind, temp: f64, threshold: f64) -> String {
    format!(
        "Temperature Alert for {city}\n\n\
        Alert Type: {kind_name}\n\
        Current Temperature: {temp}\u{b0}F\n\
        Your Threshold: {threshold}\u{b0}F\n\n\
        This is an automated alert from your Weather Dashboard.\n",
        kind_name = kind.display_name()
    )
}

fn alert_body_html(city: &str, kind: AlertKind, temp: f64, threshold: f64) -> String {
    let (headline, accent) = match kind {
        AlertKind::High => ("\u{1f525} High Temperature Alert", "#ef4444"),
        AlertKind::Low => ("\u{2744}\u{fe0f} Low Temperature Alert", "#00f2fe"),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; background: #0a0e27; color: #ffffff; padding: 20px;">
    <div style="max-width: 600px; margin: 0 auto; border: 2px solid #00f2fe; border-radius: 10px; padding: 30px;">
        <h1 style="color: #00f2fe; text-align: center;">&#127777;&#65039; Temperature Alert</h1>
        <p style="text-align: center; color: #94a3b8;">Alert for {city}</p>
        <h2 style="color: {accent};">{headline}</h2>
        <div style="font-size: 48px; font-weight: bold; color: #00f2fe; text-align: center; margin: 20px 0;">{temp}&#176;F</div>
        <p>Current Temperature: <strong>{temp}&#176;F</strong></p>
        <p>Your Threshold: <strong>{threshold}&#176;F</strong></p>
        <p>Alert Type: <strong>{kind_name}</strong></p>
        <p style="text-align: center; color: #64748b; font-size: 12px; margin-top: 30px;">
            This is an automated alert from your Weather Dashboard.<br>
            You are receiving this because you set up temperature alerts for {city}.
        </p>
    </div>
</body>
</html>"#,
        kind_name = kind.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service() -> EmailService {
        EmailService {
            transport: AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous("localhost").build(),
            from: "Weather Dashboard <alerts@example.com>".parse().unwrap(),
        }
    }

    #[test]
    fn test_plain_body_carries_temp_and_threshold() {
        let body = alert_body_plain("Austin", AlertKind::High, 95.0, 90.0);

        assert!(body.contains("Austin"));
        assert!(body.contains("High Temperature"));
        assert!(body.contains("95\u{b0}F"));
        assert!(body.contains("90\u{b0}F"));
    }

    #[test]
    fn test_html_body_names_the_city() {
        let body = alert_body_html("Oslo", AlertKind::Low, 5.0, 10.0);

        assert!(body.contains("Low Temperature Alert"));
        assert!(body.contains("temperature alerts for Oslo"));
    }

    #[tokio::test]
    async fn test_build_alert_message() {
        let service = test_service();
        let message = service.build_alert_message("user@example.com", "Austin", AlertKind::High, 95.4, 90.0);

        assert!(message.is_ok());
    }

    #[tokio::test]
    async fn test_build_rejects_bad_recipient() {
        let service = test_service();
        let message = service.build_alert_message("not an address", "Austin", AlertKind::High, 95.4, 90.0);

        assert!(message.is_err());
    }
}
