use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::{Duration, Utc};
use riquer_core::{
    classify_intent, i18n, is_form_submission, localize, normalize_text, plan_dispatch,
    resolve_teacher_email, AbsenceForm, AssistantReply, ChatInput, ConversationSession,
    ConversationTurn, Dispatch, Intent, Language, MessageKey, ReplyAction, Teacher,
    TeacherContactForm,
};
use riquer_gateway::{compose_absence_email, compose_contact_email, ChatBackend, Mailer};
use riquer_observability::AppMetrics;
use riquer_storage::{SessionRepository, TeacherRepository};
use tracing::{info, instrument, warn};
use uuid::Uuid;

const MAX_SESSION_TURNS: usize = 40;

#[derive(Clone)]
pub struct AssistantAgent<S>
where
    S: SessionRepository + TeacherRepository,
{
    backend: ChatBackend,
    mailer: Mailer,
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    absence_recipient: String,
}

impl<S> AssistantAgent<S>
where
    S: SessionRepository + TeacherRepository,
{
    pub fn new(
        backend: ChatBackend,
        mailer: Mailer,
        store: Arc<S>,
        metrics: Arc<AppMetrics>,
        absence_recipient: String,
    ) -> Self {
        Self {
            backend,
            mailer,
            store,
            metrics,
            absence_recipient,
        }
    }

    pub fn backend_configured(&self) -> bool {
        self.backend.is_configured()
    }

    pub fn mailer_configured(&self) -> bool {
        self.mailer.is_configured()
    }

    pub async fn teachers(&self) -> Result<Vec<Teacher>> {
        self.store.list_teachers().await
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.store.purge_expired(Utc::now()).await
    }

    #[instrument(skip(self, input))]
    pub async fn handle_message(&self, input: ChatInput) -> Result<AssistantReply> {
        let started = Instant::now();
        self.metrics.inc_request();

        let normalized = normalize_text(&input.message);
        let (tag_language, text) = match Language::from_tag_prefix(&normalized) {
            Some((language, rest)) => (Some(language), rest.trim().to_string()),
            None => (None, normalized),
        };
        let explicit = Language::from_optional_str(input.language.as_deref()).or(tag_language);

        let session_id = input
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let mut session = self
            .store
            .load_session(&session_id)
            .await?
            .unwrap_or_else(|| ConversationSession {
                session_id: session_id.clone(),
                user_name: None,
                user_contact: None,
                language: Language::default(),
                expires_at: Utc::now() + Duration::hours(24),
                turns: Vec::new(),
            });

        let current = explicit.unwrap_or(session.language);

        let (reply_text, action, intent, language) = if is_form_submission(&text) {
            self.metrics.inc_form_submission();
            let (reply_text, intent) = self.handle_form(&text, &input, current).await?;
            (reply_text, ReplyAction::None, intent, current)
        } else {
            match plan_dispatch(&text, current) {
                Dispatch::ShowAbsenceForm { language } => (
                    localize(language, MessageKey::UnderstandAbsence).to_string(),
                    ReplyAction::ShowAbsenceForm,
                    Intent::Absence,
                    language,
                ),
                Dispatch::ShowTeacherForm { language } => (
                    localize(language, MessageKey::UnderstandContact).to_string(),
                    ReplyAction::ShowTeacherForm,
                    Intent::TeacherContact,
                    language,
                ),
                Dispatch::SendToBackend { message, language } => {
                    let reply_text = self
                        .forward_to_backend(&message, language, input.user_name.as_deref())
                        .await;
                    (reply_text, ReplyAction::None, Intent::None, language)
                }
            }
        };

        if let Some(user_name) = input.user_name.as_ref() {
            session.user_name = Some(user_name.clone());
        }
        if let Some(user_contact) = input.user_contact.as_ref() {
            session.user_contact = Some(user_contact.clone());
        }
        session.language = language;
        session.expires_at = Utc::now() + Duration::hours(24);
        session.turns.push(ConversationTurn {
            at: Utc::now(),
            user_text: text,
            assistant_text: reply_text.clone(),
            intent,
        });
        if session.turns.len() > MAX_SESSION_TURNS {
            let keep_from = session.turns.len() - MAX_SESSION_TURNS;
            session.turns = session.turns.split_off(keep_from);
        }
        self.store.upsert_session(&session).await?;

        self.metrics.observe_latency(started.elapsed());
        info!(
            session_id = %session_id,
            language = %language.as_code(),
            intent = ?intent,
            action = ?action,
            "message handled"
        );

        Ok(AssistantReply {
            reply_text,
            action,
            language,
            intent,
            session_id,
        })
    }

    async fn forward_to_backend(
        &self,
        message: &str,
        language: Language,
        user_name: Option<&str>,
    ) -> String {
        self.metrics.inc_backend_call();

        match self.backend.send(message, language, user_name).await {
            Ok(response) => format_response(&response),
            Err(error) => {
                self.metrics.inc_backend_failure();
                warn!(%error, "chat backend call failed");
                localize(language, MessageKey::ErrorSending).to_string()
            }
        }
    }

    // Serialized forms are handled locally; the chat backend is never
    // involved on this path.
    async fn handle_form(
        &self,
        text: &str,
        input: &ChatInput,
        language: Language,
    ) -> Result<(String, Intent)> {
        if text.contains("Justificar falta") {
            let reply = match AbsenceForm::parse(text) {
                Ok(form) => self.dispatch_absence(&form, input).await,
                Err(error) => {
                    warn!(field = error.field, "incomplete absence form");
                    localize(language, MessageKey::FillAllFields).to_string()
                }
            };
            return Ok((reply, Intent::Absence));
        }

        if text.contains("Contactar professor") {
            let reply = match TeacherContactForm::parse(text) {
                Ok(form) => self.dispatch_contact(&form, input).await?,
                Err(error) => {
                    warn!(field = error.field, "incomplete teacher contact form");
                    localize(language, MessageKey::FillAllFields).to_string()
                }
            };
            return Ok((reply, Intent::TeacherContact));
        }

        Ok((
            localize(language, MessageKey::ErrorSending).to_string(),
            classify_intent(text),
        ))
    }

    async fn dispatch_absence(&self, form: &AbsenceForm, input: &ChatInput) -> String {
        let email = compose_absence_email(
            form,
            input.user_name.as_deref(),
            input.user_contact.as_deref(),
            &self.absence_recipient,
            Utc::now(),
        );

        match self.mailer.send(&email).await {
            Ok(()) => {
                self.metrics.inc_email_sent();
                i18n::absence_sent(&email.recipient)
            }
            Err(error) => {
                warn!(%error, recipient = %email.recipient, "absence mail failed");
                i18n::absence_failed(&email.recipient)
            }
        }
    }

    async fn dispatch_contact(
        &self,
        form: &TeacherContactForm,
        input: &ChatInput,
    ) -> Result<String> {
        let roster = self.store.list_teachers().await?;
        let recipient = resolve_teacher_email(&form.teacher, &roster);

        let email = compose_contact_email(
            form,
            input.user_name.as_deref(),
            input.user_contact.as_deref(),
            &recipient,
            Utc::now(),
        );

        Ok(match self.mailer.send(&email).await {
            Ok(()) => {
                self.metrics.inc_email_sent();
                i18n::contact_sent(&recipient)
            }
            Err(error) => {
                warn!(%error, recipient = %recipient, "teacher contact mail failed");
                i18n::contact_failed(&recipient)
            }
        })
    }
}

fn format_response(response: &str) -> String {
    response.replace("**", "").replace('*', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use riquer_storage::MemoryStore;

    fn agent_with_metrics() -> (AssistantAgent<MemoryStore>, Arc<AppMetrics>) {
        let metrics = AppMetrics::shared();
        let agent = AssistantAgent::new(
            ChatBackend::disabled(),
            Mailer::disabled(),
            Arc::new(MemoryStore::new()),
            metrics.clone(),
            "consergeria@inscalaf.cat".to_string(),
        );
        (agent, metrics)
    }

    fn input(message: &str) -> ChatInput {
        ChatInput {
            session_id: None,
            message: message.to_string(),
            language: None,
            user_name: Some("Carme García".to_string()),
            user_contact: Some("carme@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn absence_intent_opens_the_form_without_backend_traffic() {
        let (agent, metrics) = agent_with_metrics();

        let reply = agent
            .handle_message(input("Vull justificar una falta"))
            .await
            .unwrap();

        assert_eq!(reply.action, ReplyAction::ShowAbsenceForm);
        assert_eq!(reply.intent, Intent::Absence);
        assert!(reply.reply_text.starts_with("Entenc"));
        assert_eq!(metrics.snapshot().backend_calls_total, 0);
    }

    #[tokio::test]
    async fn contact_intent_opens_the_teacher_form() {
        let (agent, metrics) = agent_with_metrics();

        let reply = agent
            .handle_message(input("Vull parlar amb el tutor"))
            .await
            .unwrap();

        assert_eq!(reply.action, ReplyAction::ShowTeacherForm);
        assert_eq!(reply.intent, Intent::TeacherContact);
        assert_eq!(metrics.snapshot().backend_calls_total, 0);
    }

    #[tokio::test]
    async fn completed_forms_never_reach_the_backend() {
        let (agent, metrics) = agent_with_metrics();

        let serialized = AbsenceForm {
            student: "Maria García".to_string(),
            course: "2n ESO A".to_string(),
            date: "2024-03-10".to_string(),
            reason: "Visita mèdica".to_string(),
        }
        .serialize()
        .unwrap();

        let reply = agent.handle_message(input(&serialized)).await.unwrap();

        // Disabled mailer: delivery fails but the session stays retryable.
        assert!(reply.reply_text.contains("Error al enviar la justificació"));
        assert_eq!(reply.intent, Intent::Absence);
        assert_eq!(metrics.snapshot().backend_calls_total, 0);
        assert_eq!(metrics.snapshot().form_submissions_total, 1);
    }

    #[tokio::test]
    async fn contact_form_resolves_the_recipient_from_the_roster() {
        let (agent, _) = agent_with_metrics();

        let serialized = TeacherContactForm {
            teacher: "Roger Codina".to_string(),
            subject: "reunio".to_string(),
            message: "hola".to_string(),
            availability: None,
        }
        .serialize()
        .unwrap();

        let reply = agent.handle_message(input(&serialized)).await.unwrap();
        assert!(reply.reply_text.contains("roger.codina@inscalaf.cat"));
    }

    #[tokio::test]
    async fn unknown_teacher_gets_a_synthetic_recipient() {
        let (agent, _) = agent_with_metrics();

        let serialized = TeacherContactForm {
            teacher: "Natàlia Muñoz".to_string(),
            subject: "consulta".to_string(),
            message: "Una pregunta".to_string(),
            availability: None,
        }
        .serialize()
        .unwrap();

        let reply = agent.handle_message(input(&serialized)).await.unwrap();
        assert!(reply.reply_text.contains("natalia.munoz@inscalaf.cat"));
    }

    #[tokio::test]
    async fn backend_failure_surfaces_one_localized_error() {
        let (agent, metrics) = agent_with_metrics();

        let reply = agent
            .handle_message(input("Quin és l'horari de secretaria?"))
            .await
            .unwrap();

        assert_eq!(reply.intent, Intent::None);
        assert_eq!(
            reply.reply_text,
            localize(Language::Catalan, MessageKey::ErrorSending)
        );
        assert_eq!(metrics.snapshot().backend_calls_total, 1);
        assert_eq!(metrics.snapshot().backend_failures_total, 1);
    }

    #[tokio::test]
    async fn session_language_survives_between_turns() {
        let (agent, _) = agent_with_metrics();

        let first = agent
            .handle_message(input("¿Qué tal? ¿Cuándo abre la secretaría?"))
            .await
            .unwrap();
        assert_eq!(first.language, Language::Spanish);

        // Ambiguous follow-up in the same session keeps the Spanish default.
        let follow_up = ChatInput {
            session_id: Some(first.session_id.clone()),
            ..input("12345")
        };
        let second = agent.handle_message(follow_up).await.unwrap();
        assert_eq!(second.language, Language::Spanish);
    }

    #[tokio::test]
    async fn widget_language_tags_are_stripped_and_honored() {
        let (agent, _) = agent_with_metrics();

        let reply = agent
            .handle_message(input("[AR] 12345"))
            .await
            .unwrap();
        assert_eq!(reply.language, Language::Arabic);
    }

    #[tokio::test]
    async fn incomplete_form_line_asks_for_all_fields() {
        let (agent, _) = agent_with_metrics();

        let reply = agent
            .handle_message(input(
                "Justificar falta - Alumne: , Curs: 2n ESO A, Data: 2024-01-01, Motiu: x",
            ))
            .await
            .unwrap();

        assert_eq!(
            reply.reply_text,
            localize(Language::Catalan, MessageKey::FillAllFields)
        );
    }
}
