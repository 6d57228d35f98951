use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Asia::Dubai;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::ContactForm;

// Email ready to hand to the provider
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("request to email provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email provider returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Transactional email provider. Returns the provider's message id.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError>;
}

// Resend's reply to a send request
#[derive(Deserialize)]
struct ResendResponse {
    id: String,
}

pub struct ResendMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl ResendMailer {
    pub fn new(client: reqwest::Client, api_url: &str, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, MailError> {
        let res = self
            .client
            .post(format!("{}/emails", self.api_url))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }

        let body = res.json::<ResendResponse>().await?;
        Ok(body.id)
    }
}

// Where contact submissions go
pub struct ContactRelay {
    pub mailer: std::sync::Arc<dyn Mailer>,
    pub from: String,
    pub to: String,
}

impl ContactRelay {
    /// Builds the notification email for a submission. `ip` is left out of the
    /// body when the client address is unknown.
    pub fn compose(&self, form: &ContactForm, submitted_at: DateTime<Utc>, ip: Option<&str>) -> OutgoingEmail {
        OutgoingEmail {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            reply_to: form.email.clone(),
            subject: format!("New Contact: {}", form.subject),
            html: render_contact_email(form, submitted_at, ip),
        }
    }
}

pub fn render_contact_email(form: &ContactForm, submitted_at: DateTime<Utc>, ip: Option<&str>) -> String {
    let name = escape_html(&form.name);
    let email = escape_html(&form.email);
    let subject = escape_html(&form.subject);
    let message = escape_html(&form.message);
    let timestamp = submitted_at.to_rfc3339();
    let generated = submitted_at
        .with_timezone(&Dubai)
        .format("%B %-d, %Y at %H:%M:%S (GST)");
    let ip_line = match ip {
        Some(ip) => format!("<div>IP: {}</div>", escape_html(ip)),
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>New Contact Form Submission</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; background-color: #f8f9fa; }}
    .container {{ background: white; border-radius: 8px; padding: 30px; }}
    .header h1 {{ color: #2563eb; margin: 0; font-size: 24px; }}
    .field {{ margin-bottom: 20px; }}
    .label {{ font-weight: 600; color: #6b7280; font-size: 14px; text-transform: uppercase; }}
    .message {{ background: #f8f9fa; border-left: 4px solid #2563eb; padding: 20px; white-space: pre-wrap; }}
    .footer {{ margin-top: 30px; font-size: 12px; color: #6b7280; }}
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>New Contact Form Submission</h1>
      <p>You've received a new message from your portfolio website.</p>
    </div>
    <div class="field"><div class="label">Name</div><div class="value">{name}</div></div>
    <div class="field"><div class="label">Email Address</div><div class="value"><a href="mailto:{email}" style="color: #2563eb;">{email}</a></div></div>
    <div class="field"><div class="label">Subject</div><div class="value">{subject}</div></div>
    <div class="field"><div class="label">Message</div><div class="message">{message}</div></div>
    <div class="field">
      <div class="label">Submission Details</div>
      <div class="value"><div>{timestamp}</div>{ip_line}</div>
    </div>
    <div class="footer">
      <p>This message was sent from your portfolio contact form.</p>
      <p>Generated on {generated}</p>
    </div>
  </div>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
