//! Outgoing mail: email verification, password reset and reset confirmation.
//!
//! Every message is sent as `multipart/alternative` with a plain text and an
//! HTML part. With `SMTP_ENABLED=false` the message is logged instead.

use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use scolaris_config::EmailConfig;
use scolaris_core::AppError;

/// An email ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn verification_link(&self, token: &str) -> String {
        format!("{}/verify-email?token={}", self.config.frontend_url, token)
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}/reset-password?token={}", self.config.frontend_url, token)
    }

    pub fn verification_email(&self, to_email: &str, to_name: &str, token: &str) -> OutgoingEmail {
        let link = self.verification_link(token);
        OutgoingEmail {
            to: to_email.to_string(),
            subject: "Verify your email address".to_string(),
            text_body: format!(
                "Hi {},\n\n\
                 Please confirm your email address by opening the link below:\n\
                 {}\n\n\
                 This link expires in 10 minutes.\n\n\
                 The Scolaris team",
                to_name, link
            ),
            html_body: layout(
                "Verify your email address",
                "#2563EB",
                &format!(
                    "{}\
                     <p style=\"{P}\">Please confirm your email address to activate your account.</p>\
                     {}\
                     <p style=\"{SMALL}\"><strong>This link expires in 10 minutes.</strong></p>",
                    greeting(to_name),
                    button(&link, "Verify email"),
                ),
            ),
        }
    }

    pub fn password_reset_email(&self, to_email: &str, to_name: &str, token: &str) -> OutgoingEmail {
        let link = self.reset_link(token);
        OutgoingEmail {
            to: to_email.to_string(),
            subject: "Password reset request".to_string(),
            text_body: format!(
                "Hi {},\n\n\
                 You asked to reset your password. Open the link below to choose a new one:\n\
                 {}\n\n\
                 This link expires in 15 minutes.\n\n\
                 If you did not ask for this, you can ignore this email.\n\n\
                 The Scolaris team",
                to_name, link
            ),
            html_body: layout(
                "Password reset request",
                "#2563EB",
                &format!(
                    "{}\
                     <p style=\"{P}\">We received a request to reset your password.</p>\
                     {}\
                     <p style=\"{SMALL}\"><strong>This link expires in 15 minutes.</strong></p>\
                     <p style=\"{SMALL}\">If you did not ask for this, you can ignore this email.</p>",
                    greeting(to_name),
                    button(&link, "Reset password"),
                ),
            ),
        }
    }

    pub fn password_reset_confirmation_email(&self, to_email: &str, to_name: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to_email.to_string(),
            subject: "Your password has been changed".to_string(),
            text_body: format!(
                "Hi {},\n\n\
                 Your password has been changed. You can now log in with your new password.\n\n\
                 If you did not make this change, contact the administration immediately.\n\n\
                 The Scolaris team",
                to_name
            ),
            html_body: layout(
                "Password changed",
                "#059669",
                &format!(
                    "{}\
                     <p style=\"{P}\">Your password has been changed. You can now log in with your new password.</p>\
                     <p style=\"{SMALL}\"><strong>If you did not make this change, contact the administration immediately.</strong></p>",
                    greeting(to_name),
                ),
            ),
        }
    }

    #[instrument(skip(self, token))]
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), AppError> {
        self.send(self.verification_email(to_email, to_name, token))
            .await
    }

    #[instrument(skip(self, token))]
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        token: &str,
    ) -> Result<(), AppError> {
        self.send(self.password_reset_email(to_email, to_name, token))
            .await
    }

    #[instrument(skip(self))]
    pub async fn send_password_reset_confirmation(
        &self,
        to_email: &str,
        to_name: &str,
    ) -> Result<(), AppError> {
        self.send(self.password_reset_confirmation_email(to_email, to_name))
            .await
    }

    #[instrument(skip(self, outgoing), fields(to = %outgoing.to, subject = %outgoing.subject))]
    async fn send(&self, outgoing: OutgoingEmail) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(body = %outgoing.text_body, "SMTP disabled, email not sent");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(outgoing
                .to
                .parse()
                .map_err(|e| AppError::internal_error(format!("Invalid to email: {}", e)))?)
            .subject(outgoing.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(outgoing.text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(outgoing.html_body),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}

const P: &str = "margin: 0 0 20px 0; color: #4b5563; font-size: 16px; line-height: 1.5;";
const SMALL: &str = "margin: 0 0 16px 0; color: #6b7280; font-size: 14px; line-height: 1.5;";

fn greeting(name: &str) -> String {
    format!("<p style=\"{P}\">Hi <strong>{}</strong>,</p>", escape(name))
}

fn button(href: &str, label: &str) -> String {
    format!(
        r#"<table width="100%" cellpadding="0" cellspacing="0" style="margin: 28px 0;">
  <tr><td align="center">
    <a href="{href}" style="display: inline-block; padding: 12px 36px; background-color: #2563EB; color: #ffffff; text-decoration: none; border-radius: 6px; font-size: 16px; font-weight: bold;">{label}</a>
  </td></tr>
</table>
<p style="{SMALL}">Or paste this link into your browser:<br><span style="color: #2563EB; word-break: break-all;">{href}</span></p>"#
    )
}

fn layout(title: &str, accent: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
</head>
<body style="margin: 0; padding: 0; font-family: Arial, sans-serif; background-color: #f3f4f6;">
  <table width="100%" cellpadding="0" cellspacing="0" style="padding: 20px;">
    <tr><td align="center">
      <table width="600" cellpadding="0" cellspacing="0" style="background-color: #ffffff; border-radius: 8px; overflow: hidden;">
        <tr><td style="background-color: {accent}; padding: 24px; text-align: center;">
          <h1 style="margin: 0; color: #ffffff; font-size: 26px;">Scolaris</h1>
        </td></tr>
        <tr><td style="padding: 36px 30px;">
          <h2 style="margin: 0 0 20px 0; color: #111827; font-size: 22px;">{title}</h2>
          {content}
        </td></tr>
        <tr><td style="background-color: #f9fafb; padding: 16px 30px; text-align: center; border-top: 1px solid #e5e7eb;">
          <p style="margin: 0; color: #9ca3af; font-size: 12px;">Automated message from Scolaris, please do not reply.</p>
        </td></tr>
      </table>
    </td></tr>
  </table>
</body>
</html>"#
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
