//! Outgoing notification mail.
//!
//! Delivery failures must never fail the operation that triggered them, so
//! callers send through [`send_in_background`].

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::entities::{clients, consolidates, packages};

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Writes outgoing mail to the log instead of delivering it. Used when email
/// is disabled and in tests.
pub struct LogMailer {
    from_address: String,
}

impl LogMailer {
    #[must_use]
    pub const fn new(from_address: String) -> Self {
        Self { from_address }
    }
}

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        info!(
            from = %self.from_address,
            to = %message.to,
            subject = %message.subject,
            "Email (delivery disabled):\n{}",
            message.body
        );
        Ok(())
    }
}

/// Fire-and-forget delivery; failures are logged and swallowed.
pub fn send_in_background(mailer: Arc<dyn Mailer>, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(e) = mailer.send(&message).await {
            warn!(to = %message.to, subject = %message.subject, "Failed to send email: {e:#}");
        }
    });
}

/// Notification sent to the client when their packages are grouped for
/// shipping, itemising each package and totalling the service price.
#[must_use]
pub fn consolidation_created(
    client: &clients::Model,
    consolidate: &consolidates::Model,
    packages: &[packages::Model],
) -> EmailMessage {
    let mut body = format!(
        "Hello {},\n\nYour packages have been consolidated (consolidation #{}).\n\nPackages:\n",
        client.full_name(),
        consolidate.id
    );

    let mut total_service = 0.0;
    for package in packages {
        let weight = package.weight.map_or_else(String::new, |w| {
            format!(
                ", {:.2} {}",
                w,
                package.weight_unit.as_deref().unwrap_or("kg")
            )
        });
        let price = package
            .service_price
            .map_or_else(String::new, |p| format!(", service ${p:.2}"));
        total_service += package.service_price.unwrap_or(0.0);

        body.push_str(&format!(
            "  - {} via {}{weight}{price}\n",
            package.barcode, package.courier
        ));
    }

    body.push_str(&format!(
        "\nTotal service price: ${total_service:.2}\n\nStatus: {}\n",
        consolidate.status
    ));

    EmailMessage {
        to: client.email.clone(),
        subject: format!("Consolidation #{} created", consolidate.id),
        body,
    }
}

/// Password-reset link pointing at the web frontend.
#[must_use]
pub fn password_reset(email: &str, frontend_url: &str, token: &str) -> EmailMessage {
    let link = format!(
        "{}/reset-password?token={token}",
        frontend_url.trim_end_matches('/')
    );

    EmailMessage {
        to: email.to_string(),
        subject: "Password reset requested".to_string(),
        body: format!(
            "A password reset was requested for your account.\n\n\
             Follow this link to choose a new password:\n{link}\n\n\
             If you did not request this, you can ignore this message.\n"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> clients::Model {
        let now = chrono::Utc::now();
        clients::Model {
            id: 1,
            user_id: None,
            first_name: "Ana".to_string(),
            last_name: "Lopez".to_string(),
            email: "ana@example.com".to_string(),
            identification_number: "0912345678".to_string(),
            state: "Pichincha".to_string(),
            city: "Quito".to_string(),
            main_street: "Av. Amazonas".to_string(),
            secondary_street: "Naciones Unidas".to_string(),
            building_number: "N34-12".to_string(),
            mobile_phone_number: "0991234567".to_string(),
            phone_number: "022345678".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn test_package(barcode: &str, service_price: Option<f64>) -> packages::Model {
        let now = chrono::Utc::now();
        packages::Model {
            id: 1,
            barcode: barcode.to_string(),
            courier: "DHL".to_string(),
            other_courier: None,
            length: None,
            width: None,
            height: None,
            dimension_unit: None,
            weight: Some(1.5),
            weight_unit: Some("kg".to_string()),
            description: None,
            purchase_link: None,
            real_price: None,
            service_price,
            arrival_date: None,
            client_id: 1,
            consolidate_id: Some(9),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_consolidation_body_totals_service_price() {
        let now = chrono::Utc::now();
        let consolidate = consolidates::Model {
            id: 9,
            description: "Box to Quito".to_string(),
            status: "pending".to_string(),
            delivery_date: None,
            comment: None,
            extra_attributes: serde_json::json!({}),
            client_id: 1,
            created_at: now,
            updated_at: now,
        };
        let packages = vec![
            test_package("TRK001", Some(10.0)),
            test_package("TRK002", Some(2.5)),
        ];

        let message = consolidation_created(&test_client(), &consolidate, &packages);
        assert_eq!(message.to, "ana@example.com");
        assert!(message.body.contains("TRK001"));
        assert!(message.body.contains("TRK002"));
        assert!(message.body.contains("Total service price: $12.50"));
    }

    #[test]
    fn test_reset_link_uses_frontend_url() {
        let message = password_reset("ana@example.com", "https://app.example.com/", "abc123");
        assert!(
            message
                .body
                .contains("https://app.example.com/reset-password?token=abc123")
        );
    }
}
