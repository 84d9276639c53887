//! SMTP email action with a plain text and HTML body

use lettre::message::header::{Header, HeaderName, HeaderValue};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use serde_json::Value;

use crate::{AlertAction, AlertError, AlertPayload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    High,
    Normal,
    Low,
}

impl Priority {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Normal,
        }
    }

    /// `(X-Priority, Importance)` values, none for normal priority
    fn headers(self) -> Option<(&'static str, &'static str)> {
        match self {
            Priority::High => Some(("1", "high")),
            Priority::Low => Some(("5", "low")),
            Priority::Normal => None,
        }
    }
}

/// Email parameters read from the payload configuration
#[derive(Clone)]
pub struct EmailSettings {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub message: String,
    pub priority: Priority,
    pub include_results: bool,
    pub include_link: bool,
    pub smtp_server: String,
    pub smtp_port: u16,
    pub smtp_use_tls: bool,
    pub smtp_user: String,
    pub smtp_password: String,
    pub from_address: String,
}

impl EmailSettings {
    pub fn from_payload(payload: &AlertPayload) -> Result<Self, AlertError> {
        let to = split_addresses(&payload.setting_or("to", ""));
        if to.is_empty() {
            return Err(AlertError::MissingSetting("No recipients configured"));
        }

        let port = payload.setting_or("smtp_port", "25");
        let smtp_port = port.trim().parse().map_err(|_| AlertError::Email {
            reason: format!("invalid SMTP port: {}", port),
        })?;

        Ok(Self {
            to,
            cc: split_addresses(&payload.setting_or("cc", "")),
            subject: payload.setting_or("subject", "Bitsight Alert"),
            message: payload.setting_or("message", ""),
            priority: Priority::parse(&payload.setting_or("priority", "normal")),
            include_results: payload.flag("include_results", true),
            include_link: payload.flag("include_link", true),
            smtp_server: payload.setting_or("smtp_server", "localhost"),
            smtp_port,
            smtp_use_tls: payload.flag("smtp_use_tls", false),
            smtp_user: payload.setting_or("smtp_user", ""),
            smtp_password: payload.setting_or("smtp_password", ""),
            from_address: payload.setting_or("from_address", "splunk@localhost"),
        })
    }
}

impl std::fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailSettings")
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("subject", &self.subject)
            .field("priority", &self.priority)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_use_tls", &self.smtp_use_tls)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &"<redacted>")
            .field("from_address", &self.from_address)
            .finish()
    }
}

fn split_addresses(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(String::from)
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// HTML alternative: the message, a table of result fields not starting
/// with `_`, and the results link
pub fn html_body(settings: &EmailSettings, payload: &AlertPayload) -> String {
    let mut html = String::from(
        "<html>\n<head>\n<style>\n\
         body { font-family: Arial, sans-serif; }\n\
         .alert-header { background-color: #d9534f; color: white; padding: 15px; }\n\
         .alert-body { padding: 15px; background-color: #f5f5f5; }\n\
         .results-table { border-collapse: collapse; width: 100%; }\n\
         .results-table th, .results-table td \
         { border: 1px solid #ddd; padding: 8px; text-align: left; }\n\
         .results-table th { background-color: #4a4a4a; color: white; }\n\
         </style>\n</head>\n<body>\n\
         <div class=\"alert-header\"><h2>Bitsight Security Alert</h2></div>\n\
         <div class=\"alert-body\">\n",
    );
    html.push_str(&format!(
        "<p>{}</p>\n",
        escape_html(&settings.message).replace('\n', "<br>")
    ));

    if settings.include_results && !payload.result.is_empty() {
        html.push_str("<h3>Alert Details</h3>\n<table class=\"results-table\">\n");
        for (key, value) in &payload.result {
            if key.starts_with('_') {
                continue;
            }
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            html.push_str(&format!(
                "<tr><th>{}</th><td>{}</td></tr>\n",
                escape_html(key),
                escape_html(&text)
            ));
        }
        html.push_str("</table>\n");
    }

    if settings.include_link && !payload.results_link.is_empty() {
        html.push_str(&format!(
            "<p><a href=\"{}\">View Results in Splunk</a></p>\n",
            escape_html(&payload.results_link)
        ));
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

fn mailbox(address: &str) -> Result<Mailbox, AlertError> {
    address.parse().map_err(|e: lettre::address::AddressError| AlertError::InvalidAddress {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[derive(Clone)]
struct XPriority(String);

impl Header for XPriority {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("X-Priority")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

#[derive(Clone)]
struct Importance(String);

impl Header for Importance {
    fn name() -> HeaderName {
        HeaderName::new_from_ascii_str("Importance")
    }

    fn parse(s: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Self(s.to_string()))
    }

    fn display(&self) -> HeaderValue {
        HeaderValue::new(Self::name(), self.0.clone())
    }
}

/// Assemble the multipart message without sending it
pub(crate) fn compose(
    settings: &EmailSettings,
    payload: &AlertPayload,
) -> Result<Message, AlertError> {
    let mut builder = Message::builder()
        .from(mailbox(&settings.from_address)?)
        .subject(settings.subject.clone());
    for address in &settings.to {
        builder = builder.to(mailbox(address)?);
    }
    for address in &settings.cc {
        builder = builder.cc(mailbox(address)?);
    }
    if let Some((x_priority, importance)) = settings.priority.headers() {
        builder = builder
            .header(XPriority(x_priority.to_string()))
            .header(Importance(importance.to_string()));
    }

    builder
        .multipart(MultiPart::alternative_plain_html(
            settings.message.clone(),
            html_body(settings, payload),
        ))
        .map_err(|e| AlertError::Email {
            reason: e.to_string(),
        })
}

/// Sends alerts over SMTP, optionally upgrading with STARTTLS
#[derive(Debug, Default)]
pub struct EmailAction;

impl EmailAction {
    pub fn new() -> Self {
        Self
    }
}

impl AlertAction for EmailAction {
    fn name(&self) -> &str {
        "email"
    }

    fn execute(&self, payload: &AlertPayload) -> Result<String, AlertError> {
        let settings = EmailSettings::from_payload(payload)?;
        let message = compose(&settings, payload)?;
        let smtp_failed = |e: lettre::transport::smtp::Error| AlertError::Email {
            reason: e.to_string(),
        };

        let mut builder = if settings.smtp_use_tls {
            SmtpTransport::starttls_relay(&settings.smtp_server)
                .map_err(smtp_failed)?
                .port(settings.smtp_port)
        } else {
            SmtpTransport::builder_dangerous(&settings.smtp_server).port(settings.smtp_port)
        };
        if !settings.smtp_user.is_empty() && !settings.smtp_password.is_empty() {
            builder = builder.credentials(Credentials::new(
                settings.smtp_user.clone(),
                settings.smtp_password.clone(),
            ));
        }

        builder.build().send(&message).map_err(smtp_failed)?;
        tracing::info!(
            recipients = settings.to.len() + settings.cc.len(),
            "alert email sent"
        );
        Ok("Email sent successfully".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(configuration: Value) -> AlertPayload {
        serde_json::from_value(json!({
            "search_name": "Rating Drop",
            "results_link": "https://splunk/results?sid=1",
            "result": {"company_name": "Acme & Co", "rating": 640, "_raw": "hidden"},
            "configuration": configuration
        }))
        .unwrap()
    }

    fn formatted(message: &Message) -> String {
        String::from_utf8_lossy(&message.formatted()).into_owned()
    }

    #[test]
    fn test_settings_defaults() {
        let settings =
            EmailSettings::from_payload(&payload(json!({"to": "a@example.com, b@example.com"})))
                .unwrap();

        assert_eq!(settings.to, vec!["a@example.com", "b@example.com"]);
        assert!(settings.cc.is_empty());
        assert_eq!(settings.subject, "Bitsight Alert");
        assert_eq!(settings.priority, Priority::Normal);
        assert_eq!(settings.smtp_server, "localhost");
        assert_eq!(settings.smtp_port, 25);
        assert!(!settings.smtp_use_tls);
        assert!(settings.include_results);
        assert_eq!(settings.from_address, "splunk@localhost");
    }

    #[test]
    fn test_recipients_required() {
        let err = EmailSettings::from_payload(&payload(json!({"to": " , "}))).unwrap_err();
        assert!(matches!(err, AlertError::MissingSetting(_)));
    }

    #[test]
    fn test_html_lists_visible_fields_and_link() {
        let p = payload(json!({"to": "a@example.com", "message": "Line one\nLine two"}));
        let settings = EmailSettings::from_payload(&p).unwrap();
        let html = html_body(&settings, &p);

        assert!(html.contains("Line one<br>Line two"));
        assert!(html.contains("<tr><th>company_name</th><td>Acme &amp; Co</td></tr>"));
        assert!(html.contains("<tr><th>rating</th><td>640</td></tr>"));
        assert!(!html.contains("_raw"));
        assert!(html.contains("href=\"https://splunk/results?sid=1\""));
    }

    #[test]
    fn test_html_respects_include_flags() {
        let p = payload(json!({
            "to": "a@example.com",
            "include_results": "0",
            "include_link": "0"
        }));
        let settings = EmailSettings::from_payload(&p).unwrap();
        let html = html_body(&settings, &p);

        assert!(!html.contains("Alert Details"));
        assert!(!html.contains("View Results"));
    }

    #[test]
    fn test_high_priority_headers() {
        let p = payload(json!({
            "to": "a@example.com",
            "cc": "c@example.com",
            "priority": "high",
            "subject": "Rating alert"
        }));
        let settings = EmailSettings::from_payload(&p).unwrap();
        let text = formatted(&compose(&settings, &p).unwrap());

        assert!(text.contains("X-Priority: 1"));
        assert!(text.contains("Importance: high"));
        assert!(text.contains("Cc: c@example.com"));
        assert!(text.contains("Subject: Rating alert"));
        assert!(text.contains("multipart/alternative"));
    }

    #[test]
    fn test_low_and_normal_priority_headers() {
        let low = payload(json!({"to": "a@example.com", "priority": "low"}));
        let text = formatted(&compose(&EmailSettings::from_payload(&low).unwrap(), &low).unwrap());
        assert!(text.contains("X-Priority: 5"));
        assert!(text.contains("Importance: low"));

        let normal = payload(json!({"to": "a@example.com"}));
        let text =
            formatted(&compose(&EmailSettings::from_payload(&normal).unwrap(), &normal).unwrap());
        assert!(!text.contains("X-Priority"));
    }

    #[test]
    fn test_invalid_address() {
        let p = payload(json!({"to": "not an address"}));
        let settings = EmailSettings::from_payload(&p).unwrap();
        assert!(matches!(
            compose(&settings, &p),
            Err(AlertError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_password_not_in_debug() {
        let p = payload(json!({"to": "a@example.com", "smtp_password": "hunter2"}));
        let settings = EmailSettings::from_payload(&p).unwrap();
        assert!(!format!("{:?}", settings).contains("hunter2"));
    }
}
