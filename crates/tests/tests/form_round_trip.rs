use std::sync::Arc;

use riquer_agent::AssistantAgent;
use riquer_core::{
    plan_dispatch, AbsenceForm, ChatInput, Dispatch, Intent, Language, ReplyAction,
    TeacherContactForm,
};
use riquer_gateway::{ChatBackend, Mailer};
use riquer_observability::AppMetrics;
use riquer_storage::MemoryStore;

fn agent() -> (AssistantAgent<MemoryStore>, Arc<AppMetrics>) {
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

fn input(session_id: Option<String>, message: &str) -> ChatInput {
    ChatInput {
        session_id,
        message: message.to_string(),
        language: None,
        user_name: Some("Carme García".to_string()),
        user_contact: Some("carme@example.com".to_string()),
    }
}

// Classify, dispatch, then serialize: the backend-send path is never taken
// before the form is completed, and never for the form itself.
#[tokio::test]
async fn absence_flow_never_calls_the_backend() {
    let (agent, metrics) = agent();

    let plan = plan_dispatch("Vull justificar una falta", Language::Catalan);
    assert!(matches!(plan, Dispatch::ShowAbsenceForm { .. }));

    let first = agent
        .handle_message(input(None, "Vull justificar una falta"))
        .await
        .unwrap();
    assert_eq!(first.action, ReplyAction::ShowAbsenceForm);
    assert_eq!(metrics.snapshot().backend_calls_total, 0);

    let serialized = AbsenceForm {
        student: "Maria García Pérez".to_string(),
        course: "2n ESO A".to_string(),
        date: "2024-01-01".to_string(),
        reason: "Visita mèdica".to_string(),
    }
    .serialize()
    .unwrap();

    let second = agent
        .handle_message(input(Some(first.session_id.clone()), &serialized))
        .await
        .unwrap();

    assert_eq!(second.intent, Intent::Absence);
    assert_eq!(second.action, ReplyAction::None);
    assert_eq!(metrics.snapshot().backend_calls_total, 0);
    assert_eq!(metrics.snapshot().form_submissions_total, 1);
    assert_eq!(second.session_id, first.session_id);
}

#[tokio::test]
async fn teacher_contact_flow_resolves_and_stays_local() {
    let (agent, metrics) = agent();

    let first = agent
        .handle_message(input(None, "Vull parlar amb el tutor"))
        .await
        .unwrap();
    assert_eq!(first.action, ReplyAction::ShowTeacherForm);

    let serialized = TeacherContactForm {
        teacher: "Anna Bresolí".to_string(),
        subject: "seguiment".to_string(),
        message: "Com va el trimestre?".to_string(),
        availability: Some("Dilluns a la tarda".to_string()),
    }
    .serialize()
    .unwrap();

    let second = agent
        .handle_message(input(Some(first.session_id), &serialized))
        .await
        .unwrap();

    assert_eq!(second.intent, Intent::TeacherContact);
    assert!(second.reply_text.contains("anna.bresoli@inscalaf.cat"));
    assert_eq!(metrics.snapshot().backend_calls_total, 0);
}
