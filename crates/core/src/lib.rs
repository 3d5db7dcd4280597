pub mod directory;
pub mod dispatch;
pub mod forms;
pub mod i18n;
pub mod intent;
pub mod language;
pub mod models;

pub use directory::{default_roster, resolve_teacher_email, email_slug, EMAIL_DOMAIN};
pub use dispatch::{classify, plan_dispatch, Dispatch};
pub use forms::{is_form_submission, AbsenceForm, TeacherContactForm, ValidationError};
pub use i18n::{localize, MessageKey};
pub use intent::{classify_intent, normalize_text};
pub use language::detect_language;
pub use models::*;
