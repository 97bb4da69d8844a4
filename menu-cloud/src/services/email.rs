//! Outgoing email
//!
//! `SesEmailSender` sends simple HTML mail, switching to a raw MIME message
//! when attachments are present. `LogEmailSender` only logs.

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::primitives::Blob;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message, RawMessage};
use base64::Engine;

use super::qr::QrImage;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), BoxError>;
}

/// Welcome mail sent at the end of provisioning
pub fn welcome_email(
    to: &str,
    restaurant_name: &str,
    menu_url: &str,
    qr: Option<&QrImage>,
) -> EmailMessage {
    let qr_note = if qr.is_some() {
        "<p>Adjuntamos el código QR de tu menú / Your menu QR code is attached.</p>"
    } else {
        ""
    };
    let html = format!(
        "<h1>¡Bienvenido, {restaurant_name}!</h1>\
         <p>Tu menú digital ya está disponible en <a href=\"{menu_url}\">{menu_url}</a>.</p>\
         <p>Your digital menu is live at <a href=\"{menu_url}\">{menu_url}</a>.</p>\
         {qr_note}"
    );
    EmailMessage {
        to: to.to_string(),
        subject: "Tu menú está listo / Your menu is ready".to_string(),
        html,
        attachments: qr
            .map(|qr| EmailAttachment {
                file_name: "menu-qr.svg".to_string(),
                content_type: qr.content_type.to_string(),
                bytes: qr.bytes.clone(),
            })
            .into_iter()
            .collect(),
    }
}

/// multipart/mixed message with a base64 HTML part and base64 attachments
fn build_raw_mime(from: &str, message: &EmailMessage, boundary: &str) -> String {
    let b64 = base64::engine::general_purpose::STANDARD;
    let subject = format!("=?UTF-8?B?{}?=", b64.encode(message.subject.as_bytes()));

    let mut mime = format!(
        "From: {from}\r\n\
         To: {to}\r\n\
         Subject: {subject}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n\r\n\
         --{boundary}\r\n\
         Content-Type: text/html; charset=UTF-8\r\n\
         Content-Transfer-Encoding: base64\r\n\r\n\
         {body}\r\n",
        to = message.to,
        body = b64.encode(message.html.as_bytes()),
    );
    for attachment in &message.attachments {
        mime.push_str(&format!(
            "--{boundary}\r\n\
             Content-Type: {content_type}; name=\"{name}\"\r\n\
             Content-Disposition: attachment; filename=\"{name}\"\r\n\
             Content-Transfer-Encoding: base64\r\n\r\n\
             {data}\r\n",
            content_type = attachment.content_type,
            name = attachment.file_name,
            data = b64.encode(&attachment.bytes),
        ));
    }
    mime.push_str(&format!("--{boundary}--\r\n"));
    mime
}

pub struct SesEmailSender {
    client: SesClient,
    from: String,
}

impl SesEmailSender {
    pub fn new(client: SesClient, from: String) -> Self {
        Self { client, from }
    }
}

#[async_trait]
impl EmailSender for SesEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), BoxError> {
        let content = if message.attachments.is_empty() {
            let subject = Content::builder().data(&message.subject).build()?;
            let body = Body::builder()
                .html(Content::builder().data(&message.html).build()?)
                .build();
            EmailContent::builder()
                .simple(Message::builder().subject(subject).body(body).build())
                .build()
        } else {
            let boundary = format!("menu-cloud-{}", uuid::Uuid::new_v4().simple());
            let raw = build_raw_mime(&self.from, message, &boundary);
            EmailContent::builder()
                .raw(RawMessage::builder().data(Blob::new(raw.into_bytes())).build()?)
                .build()
        };

        self.client
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .content(content)
            .send()
            .await?;

        tracing::info!(
            to = %message.to,
            attachments = message.attachments.len(),
            "Email sent"
        );
        Ok(())
    }
}

/// Development sender: logs instead of sending
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), BoxError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "Email (not sent, log sender)"
        );
        Ok(())
    }
}
