use std::collections::BTreeMap;

use crate::models::Language;

/// Messages the assistant itself emits. The widget-facing table lives in
/// [`ui_strings`]; these are the keys the dispatch and form paths need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKey {
    UnderstandAbsence,
    UnderstandContact,
    FormCancelled,
    ErrorSending,
    FillAllFields,
}

pub fn localize(language: Language, key: MessageKey) -> &'static str {
    use MessageKey::*;

    match (language, key) {
        (Language::Catalan, UnderstandAbsence) => {
            "Entenc que vols justificar una falta. Si us plau, omple aquest formulari:"
        }
        (Language::Catalan, UnderstandContact) => {
            "Vols contactar amb un professor. Si us plau, omple aquest formulari:"
        }
        (Language::Catalan, FormCancelled) => "Formulari cancel·lat. En què més et puc ajudar?",
        (Language::Catalan, ErrorSending) => {
            "Ho sento, hi ha hagut un error. Si us plau, torna-ho a intentar."
        }
        (Language::Catalan, FillAllFields) => {
            "Si us plau, completa tots els camps obligatoris."
        }

        (Language::Spanish, UnderstandAbsence) => {
            "Entiendo que quieres justificar una falta. Por favor, rellena este formulario:"
        }
        (Language::Spanish, UnderstandContact) => {
            "Quieres contactar con un profesor. Por favor, rellena este formulario:"
        }
        (Language::Spanish, FormCancelled) => "Formulario cancelado. ¿En qué más puedo ayudarte?",
        (Language::Spanish, ErrorSending) => {
            "Lo siento, ha habido un error. Por favor, inténtalo de nuevo."
        }
        (Language::Spanish, FillAllFields) => {
            "Por favor, completa todos los campos obligatorios."
        }

        (Language::Arabic, UnderstandAbsence) => {
            "أفهم أنك تريد تبرير غياب. من فضلك، املأ هذا النموذج:"
        }
        (Language::Arabic, UnderstandContact) => {
            "تريد التواصل مع معلم. من فضلك، املأ هذا النموذج:"
        }
        (Language::Arabic, FormCancelled) => "تم إلغاء النموذج. كيف يمكنني مساعدتك أيضاً؟",
        (Language::Arabic, ErrorSending) => "عذراً، حدث خطأ. من فضلك حاول مرة أخرى.",
        (Language::Arabic, FillAllFields) => "من فضلك، أكمل جميع الحقول المطلوبة.",
    }
}

/// Mail confirmations stay Catalan like the rest of the outbound mail flow.
pub fn absence_sent(recipient: &str) -> String {
    format!(
        "✅ Justificació enviada correctament!\n\nDestinatari: {recipient}\n\n\
         En breu rebràs confirmació de recepció."
    )
}

pub fn absence_failed(recipient: &str) -> String {
    format!(
        "❌ Error al enviar la justificació.\n\nAlternatives:\n• Trucar al 93 868 04 14\n\
         • Enviar email manualment a {recipient}"
    )
}

pub fn contact_sent(recipient: &str) -> String {
    format!(
        "✅ Missatge enviat correctament!\n\nDestinatari: {recipient}\n\n\
         El professor/a rebrà el teu missatge i et respondrà al teu correu."
    )
}

pub fn contact_failed(recipient: &str) -> String {
    format!(
        "❌ Error al enviar el missatge.\n\nAlternatives:\n• Trucar al 93 868 04 14\n\
         • Enviar email directament a {recipient}"
    )
}

const CATALAN_STRINGS: &[(&str, &str)] = &[
    ("chatTitle", "Xat amb l'Institut Alexandre de Riquer"),
    ("welcomeGreeting", "Hola {name}! 👋"),
    (
        "welcomeIntro",
        "Sóc en Riquer, l'assistent virtual de l'Institut Alexandre de Riquer.",
    ),
    (
        "welcomeHelp",
        "Estic aquí per ajudar-te amb qualsevol consulta sobre l'institut. Pots preguntar-me sobre:",
    ),
    ("schedules", "Horaris i calendari escolar"),
    ("teacherContact", "Contacte amb professors i tutors"),
    ("absenceJustify", "Justificació de faltes"),
    ("academicInfo", "Informació acadèmica"),
    ("activities", "Activitats i serveis de l'institut"),
    ("helpQuestion", "En què et puc ajudar?"),
    ("messagePlaceholder", "Escriu el teu missatge..."),
    ("absenceFormTitle", "📋 Justificació de Falta d'Assistència"),
    ("studentName", "Nom de l'alumne:"),
    ("courseGroup", "Curs i grup:"),
    ("absenceDate", "Data de l'absència:"),
    ("reason", "Motiu:"),
    ("sendJustification", "Enviar justificació"),
    ("cancel", "Cancel·lar"),
    ("teacherFormTitle", "📧 Contactar amb Professor/a"),
    ("teacherName", "Nom del professor/a:"),
    ("subject", "Assumpte:"),
    ("selectOption", "Selecciona..."),
    ("requestMeeting", "Sol·licitar reunió"),
    ("academicQuery", "Consulta acadèmica"),
    ("studentFollowup", "Seguiment de l'alumne"),
    ("other", "Altre"),
    ("message", "Missatge:"),
    ("availability", "Disponibilitat (si és per reunió):"),
    ("sendMessage", "Enviar missatge"),
    ("typingIndicator", "En Riquer està escrivint..."),
    (
        "understandAbsence",
        "Entenc que vols justificar una falta. Si us plau, omple aquest formulari:",
    ),
    (
        "understandContact",
        "Vols contactar amb un professor. Si us plau, omple aquest formulari:",
    ),
    ("formCancelled", "Formulari cancel·lat. En què més et puc ajudar?"),
    (
        "errorSending",
        "Ho sento, hi ha hagut un error. Si us plau, torna-ho a intentar.",
    ),
    ("fillAllFields", "Si us plau, completa tots els camps obligatoris."),
];

const SPANISH_STRINGS: &[(&str, &str)] = &[
    ("chatTitle", "Chat con el Instituto Alexandre de Riquer"),
    ("welcomeGreeting", "¡Hola {name}! 👋"),
    (
        "welcomeIntro",
        "Soy Riquer, el asistente virtual del Instituto Alexandre de Riquer.",
    ),
    (
        "welcomeHelp",
        "Estoy aquí para ayudarte con cualquier consulta sobre el instituto. Puedes preguntarme sobre:",
    ),
    ("schedules", "Horarios y calendario escolar"),
    ("teacherContact", "Contacto con profesores y tutores"),
    ("absenceJustify", "Justificación de faltas"),
    ("academicInfo", "Información académica"),
    ("activities", "Actividades y servicios del instituto"),
    ("helpQuestion", "¿En qué puedo ayudarte?"),
    ("messagePlaceholder", "Escribe tu mensaje..."),
    ("absenceFormTitle", "📋 Justificación de Falta de Asistencia"),
    ("studentName", "Nombre del alumno:"),
    ("courseGroup", "Curso y grupo:"),
    ("absenceDate", "Fecha de la ausencia:"),
    ("reason", "Motivo:"),
    ("sendJustification", "Enviar justificación"),
    ("cancel", "Cancelar"),
    ("teacherFormTitle", "📧 Contactar con Profesor/a"),
    ("teacherName", "Nombre del profesor/a:"),
    ("subject", "Asunto:"),
    ("selectOption", "Selecciona..."),
    ("requestMeeting", "Solicitar reunión"),
    ("academicQuery", "Consulta académica"),
    ("studentFollowup", "Seguimiento del alumno"),
    ("other", "Otro"),
    ("message", "Mensaje:"),
    ("availability", "Disponibilidad (si es para reunión):"),
    ("sendMessage", "Enviar mensaje"),
    ("typingIndicator", "Riquer está escribiendo..."),
    (
        "understandAbsence",
        "Entiendo que quieres justificar una falta. Por favor, rellena este formulario:",
    ),
    (
        "understandContact",
        "Quieres contactar con un profesor. Por favor, rellena este formulario:",
    ),
    ("formCancelled", "Formulario cancelado. ¿En qué más puedo ayudarte?"),
    (
        "errorSending",
        "Lo siento, ha habido un error. Por favor, inténtalo de nuevo.",
    ),
    ("fillAllFields", "Por favor, completa todos los campos obligatorios."),
];

const ARABIC_STRINGS: &[(&str, &str)] = &[
    ("chatTitle", "محادثة مع معهد ألكسندر دي ريكير"),
    ("welcomeGreeting", "مرحباً {name}! 👋"),
    ("welcomeIntro", "أنا ريكير، المساعد الافتراضي لمعهد ألكسندر دي ريكير."),
    (
        "welcomeHelp",
        "أنا هنا لمساعدتك في أي استفسار حول المعهد. يمكنك أن تسألني عن:",
    ),
    ("schedules", "الجداول والتقويم المدرسي"),
    ("teacherContact", "التواصل مع المعلمين والمرشدين"),
    ("absenceJustify", "تبرير الغياب"),
    ("academicInfo", "المعلومات الأكاديمية"),
    ("activities", "الأنشطة والخدمات في المعهد"),
    ("helpQuestion", "كيف يمكنني مساعدتك؟"),
    ("messagePlaceholder", "اكتب رسالتك..."),
    ("absenceFormTitle", "📋 تبرير الغياب"),
    ("studentName", "اسم الطالب:"),
    ("courseGroup", "الصف والمجموعة:"),
    ("absenceDate", "تاريخ الغياب:"),
    ("reason", "السبب:"),
    ("sendJustification", "إرسال التبرير"),
    ("cancel", "إلغاء"),
    ("teacherFormTitle", "📧 التواصل مع المعلم"),
    ("teacherName", "اسم المعلم:"),
    ("subject", "الموضوع:"),
    ("selectOption", "اختر..."),
    ("requestMeeting", "طلب اجتماع"),
    ("academicQuery", "استفسار أكاديمي"),
    ("studentFollowup", "متابعة الطالب"),
    ("other", "آخر"),
    ("message", "الرسالة:"),
    ("availability", "التوفر (إذا كان للاجتماع):"),
    ("sendMessage", "إرسال الرسالة"),
    ("typingIndicator", "ريكير يكتب..."),
    ("understandAbsence", "أفهم أنك تريد تبرير غياب. من فضلك، املأ هذا النموذج:"),
    ("understandContact", "تريد التواصل مع معلم. من فضلك، املأ هذا النموذج:"),
    ("formCancelled", "تم إلغاء النموذج. كيف يمكنني مساعدتك أيضاً؟"),
    ("errorSending", "عذراً، حدث خطأ. من فضلك حاول مرة أخرى."),
    ("fillAllFields", "من فضلك، أكمل جميع الحقول المطلوبة."),
];

/// Widget string table for one language. Keys missing from a translation fall
/// back to the Catalan value.
pub fn ui_strings(language: Language) -> BTreeMap<&'static str, &'static str> {
    let mut table: BTreeMap<_, _> = CATALAN_STRINGS.iter().copied().collect();

    let overrides = match language {
        Language::Catalan => CATALAN_STRINGS,
        Language::Spanish => SPANISH_STRINGS,
        Language::Arabic => ARABIC_STRINGS,
    };
    for (key, value) in overrides {
        table.insert(key, value);
    }

    table
}
