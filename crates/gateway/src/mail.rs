use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use riquer_core::{AbsenceForm, TeacherContactForm};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery is not configured")]
    NotConfigured,
    #[error("mail transport failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider answered with HTTP {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

pub fn compose_absence_email(
    form: &AbsenceForm,
    sender_name: Option<&str>,
    sender_contact: Option<&str>,
    recipient: &str,
    now: DateTime<Utc>,
) -> OutboundEmail {
    let sender = sender_name.filter(|name| !name.trim().is_empty()).unwrap_or("Família");

    OutboundEmail {
        subject: format!("Justificació de falta - {} ({})", form.student, form.course),
        body: format!(
            "Benvolguts,\n\n\
             Sol·licito justificar la falta d'assistència següent:\n\n\
             Alumne/a: {}\n\
             Curs: {}\n\
             Data de la falta: {}\n\
             Motiu: {}\n\n\
             Atentament,\n{}\nContacte: {}\n\n\
             ---\n\
             Enviat automàticament des del sistema de l'Institut Alexandre de Riquer\n{}",
            form.student,
            form.course,
            form.date,
            form.reason,
            sender,
            sender_contact.unwrap_or(""),
            now.format("%d/%m/%Y %H:%M"),
        ),
        recipient: recipient.to_string(),
    }
}

pub fn compose_contact_email(
    form: &TeacherContactForm,
    sender_name: Option<&str>,
    sender_contact: Option<&str>,
    recipient: &str,
    now: DateTime<Utc>,
) -> OutboundEmail {
    let sender = sender_name.filter(|name| !name.trim().is_empty()).unwrap_or("Família");
    let availability = form
        .availability
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| format!("Disponibilitat: {}\n\n", value))
        .unwrap_or_default();

    OutboundEmail {
        subject: format!("{} - {}", form.subject, sender),
        body: format!(
            "Benvolgut/da {},\n\n{}\n\n{}\
             Atentament,\n{}\n{}\n\n\
             ---\n\
             Enviat automàticament des del sistema de l'Institut Alexandre de Riquer\n{}",
            form.teacher,
            form.message,
            availability,
            sender,
            sender_contact.unwrap_or(""),
            now.format("%d/%m/%Y %H:%M"),
        ),
        recipient: recipient.to_string(),
    }
}

#[derive(Clone)]
pub struct MailgunMailer {
    client: Client,
    api_key: String,
    domain: String,
    from: String,
}

impl MailgunMailer {
    pub fn new(api_key: String, domain: String, from: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("failed to build mail HTTP client")?;

        Ok(Self {
            client,
            api_key,
            domain,
            from,
        })
    }

    async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(format!(
                "https://api.mailgun.net/v3/{}/messages",
                self.domain
            ))
            .basic_auth("api", Some(self.api_key.as_str()))
            .form(&[
                ("from", self.from.as_str()),
                ("to", email.recipient.as_str()),
                ("subject", email.subject.as_str()),
                ("text", email.body.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(MailError::Status(status.as_u16()))
        }
    }
}

#[derive(Clone)]
pub enum Mailer {
    Mailgun(MailgunMailer),
    Disabled,
}

impl Mailer {
    pub fn mailgun(api_key: String, domain: String, from: String) -> Result<Self> {
        Ok(Self::Mailgun(MailgunMailer::new(api_key, domain, from)?))
    }

    pub fn disabled() -> Self {
        Self::Disabled
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Mailgun(_))
    }

    pub async fn send(&self, email: &OutboundEmail) -> Result<(), MailError> {
        match self {
            Self::Mailgun(mailer) => mailer.send(email).await,
            Self::Disabled => Err(MailError::NotConfigured),
        }
    }
}
