use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("required field missing: {field}")]
pub struct ValidationError {
    pub field: &'static str,
}

/// Markers the chat pipeline uses to recognize a serialized form before
/// anything is forwarded upstream.
const FORM_MARKERS: &[&str] = &[
    "Justificar falta - Alumne:",
    "Contactar professor",
    "- Assumpte:",
    "Missatge:",
];

pub fn is_form_submission(message: &str) -> bool {
    FORM_MARKERS.iter().any(|marker| message.contains(marker))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceForm {
    #[serde(rename = "alumne")]
    pub student: String,
    #[serde(rename = "curs")]
    pub course: String,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "motiu")]
    pub reason: String,
}

impl AbsenceForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.student, "alumne")?;
        require(&self.course, "curs")?;
        require(&self.date, "data")?;
        require(&self.reason, "motiu")?;
        Ok(())
    }

    pub fn serialize(&self) -> Result<String, ValidationError> {
        self.validate()?;
        Ok(format!(
            "Justificar falta - Alumne: {}, Curs: {}, Data: {}, Motiu: {}",
            self.student.trim(),
            self.course.trim(),
            self.date.trim(),
            self.reason.trim()
        ))
    }

    pub fn parse(message: &str) -> Result<Self, ValidationError> {
        let mut student = String::new();
        let mut course = String::new();
        let mut date = String::new();
        let mut reason = String::new();

        for line in message.lines() {
            let line = line.trim();
            let Some(rest) = line
                .find("Justificar falta - ")
                .map(|at| &line[at + "Justificar falta - ".len()..])
            else {
                continue;
            };

            for part in rest.split(", ") {
                if let Some(value) = part.strip_prefix("Alumne:") {
                    student = value.trim().to_string();
                } else if let Some(value) = part.strip_prefix("Curs:") {
                    course = value.trim().to_string();
                } else if let Some(value) = part.strip_prefix("Data:") {
                    date = value.trim().to_string();
                } else if let Some(value) = part.strip_prefix("Motiu:") {
                    reason = value.trim().to_string();
                }
            }
        }

        let form = Self {
            student,
            course,
            date,
            reason,
        };
        form.validate()?;
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherContactForm {
    #[serde(rename = "professor")]
    pub teacher: String,
    #[serde(rename = "assumpte")]
    pub subject: String,
    #[serde(rename = "missatge")]
    pub message: String,
    #[serde(rename = "disponibilitat", default)]
    pub availability: Option<String>,
}

impl TeacherContactForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.teacher, "professor")?;
        require(&self.subject, "assumpte")?;
        require(&self.message, "missatge")?;
        Ok(())
    }

    fn availability_trimmed(&self) -> Option<&str> {
        self.availability
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn serialize(&self) -> Result<String, ValidationError> {
        self.validate()?;
        let mut line = format!(
            "Contactar professor {} - Assumpte: {}, Missatge: {}",
            self.teacher.trim(),
            self.subject.trim(),
            self.message.trim()
        );
        if let Some(availability) = self.availability_trimmed() {
            line.push_str(", Disponibilitat: ");
            line.push_str(availability);
        }
        Ok(line)
    }

    pub fn parse(message: &str) -> Result<Self, ValidationError> {
        let teacher = extract_between(message, "Contactar professor ", " - Assumpte:")
            .unwrap_or_default();

        let subject = extract_after(message, "Assumpte: ")
            .map(|rest| {
                let end = rest
                    .find(',')
                    .or_else(|| rest.find('\n'))
                    .unwrap_or(rest.len());
                rest[..end].trim().to_string()
            })
            .unwrap_or_default();

        let body = extract_after(message, "Missatge: ")
            .map(|rest| {
                let end = rest.find(", Disponibilitat:").unwrap_or(rest.len());
                rest[..end].trim().to_string()
            })
            .unwrap_or_default();

        let availability = extract_after(message, ", Disponibilitat: ")
            .map(|rest| rest.trim().to_string())
            .filter(|value| !value.is_empty());

        let form = Self {
            teacher,
            subject,
            message: body,
            availability,
        };
        form.validate()?;
        Ok(form)
    }
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError { field })
    } else {
        Ok(())
    }
}

fn extract_after<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    message
        .find(marker)
        .map(|at| &message[at + marker.len()..])
}

fn extract_between(message: &str, start_marker: &str, end_marker: &str) -> Option<String> {
    let rest = extract_after(message, start_marker)?;
    let end = rest.find(end_marker)?;
    Some(rest[..end].trim().to_string())
}
