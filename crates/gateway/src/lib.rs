mod backend;
mod context;
mod mail;

pub use backend::{BackendError, ChatBackend, HttpChatBackend};
pub use context::{ContextFile, InstituteContext};
pub use mail::{
    compose_absence_email, compose_contact_email, MailError, Mailer, MailgunMailer, OutboundEmail,
};
