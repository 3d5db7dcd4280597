use std::path::Path;

use anyhow::Result;
use regex::Regex;
use tracing::warn;
use walkdir::WalkDir;

const PERSONA: &str = "Ets Riquer, assistent virtual de l'Institut Alexandre de Riquer de Calaf.\n\
PERSONALITAT: Amable, proper, eficient.\n\
FUNCIONS: informar sobre l'institut (horaris, cursos, contactes), ajudar a \
contactar professors i justificar faltes, resoldre dubtes acadèmics i administratius.\n\
CONTACTE: C. Sant Joan Bta. de la Salle 6-8, 08280 Calaf · 93 868 04 14 · \
a8043395@xtec.cat · inscalaf.cat\n\
HORARIS: classes 8:00-14:35h, atenció dilluns-divendres 8:00-14:00h, \
secretaria dilluns-divendres 9:00-13:00h\n\
CURSOS: ESO (1r-4t), Batxillerat (1r-2n), FP (GM i GS)\n\
REGLES: respostes breus i clares, només informació verificada dels arxius, \
si no saps una cosa indica-ho clarament, no inventis informació, \
no tractis temes aliens a l'institut.";

#[derive(Debug, Clone)]
pub struct ContextFile {
    pub title: String,
    pub source_path: String,
    pub body: String,
}

/// Institute knowledge files folded into every backend prompt, loaded once at
/// startup. An unreadable file is skipped, not fatal.
#[derive(Debug, Clone, Default)]
pub struct InstituteContext {
    files: Vec<ContextFile>,
}

impl InstituteContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            warn!(root = %root.display(), "context root missing, starting without institute files");
            return Ok(Self::empty());
        }

        let heading_regex = Regex::new(r"(?m)^#\s+(.+)$")?;
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                matches!(
                    entry.path().extension().and_then(|ext| ext.to_str()),
                    Some("md") | Some("txt") | Some("csv")
                )
            })
        {
            let path = entry.path();
            let body = match std::fs::read_to_string(path) {
                Ok(body) => body,
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable context file");
                    continue;
                }
            };

            let rel_path = path
                .strip_prefix(root)
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_else(|_| path.to_string_lossy().to_string());

            let title = heading_regex
                .captures(&body)
                .and_then(|captures| {
                    captures
                        .get(1)
                        .map(|value| value.as_str().trim().to_string())
                })
                .unwrap_or_else(|| {
                    path.file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or("untitled")
                        .replace('-', " ")
                });

            files.push(ContextFile {
                title,
                source_path: rel_path,
                body,
            });
        }

        files.sort_by(|a, b| a.source_path.cmp(&b.source_path));
        Ok(Self { files })
    }

    pub fn files(&self) -> &[ContextFile] {
        &self.files
    }

    /// Persona plus the concatenated institute files. Empty only when the
    /// assistant should run as a pure pass-through.
    pub fn system_prompt(&self) -> String {
        let mut prompt = String::from(PERSONA);
        prompt.push_str("\n\nINFORMACIÓ DELS ARXIUS DE L'INSTITUT:\n");

        if self.files.is_empty() {
            prompt.push_str("No s'han pogut carregar els arxius");
        } else {
            for file in &self.files {
                prompt.push_str(&format!("\n--- {} ---\n{}", file.title, file.body));
            }
        }

        prompt
    }
}
