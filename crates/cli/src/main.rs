use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use riquer_agent::AssistantAgent;
use riquer_core::{classify, plan_dispatch, ChatInput, Language, ReplyAction};
use riquer_gateway::{ChatBackend, InstituteContext, Mailer};
use riquer_observability::{init_tracing, AppMetrics};
use riquer_storage::Store;

#[derive(Debug, Parser)]
#[command(name = "riquer")]
#[command(about = "Riquer school assistant CLI")]
struct Cli {
    #[arg(long, default_value = "kb")]
    kb_root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat against the assistant core.
    Chat,
    /// Classify one utterance and print the dispatch plan.
    Classify {
        text: String,
        #[arg(long, default_value = "ca")]
        language: String,
    },
    /// Print the teacher roster.
    Teachers,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("riquer_cli");
    let cli = Cli::parse();

    match cli.command {
        Command::Chat => {
            let agent = build_agent(&cli.kb_root).await?;
            run_chat(agent).await?;
        }
        Command::Classify { text, language } => {
            let current = Language::from_optional_str(Some(&language)).unwrap_or_default();
            let classification = classify(&text, current);
            let plan = plan_dispatch(&text, current);

            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "intent": classification.intent,
                    "language": classification.language,
                    "dispatch": match &plan {
                        riquer_core::Dispatch::ShowAbsenceForm { .. } => "show_absence_form",
                        riquer_core::Dispatch::ShowTeacherForm { .. } => "show_teacher_form",
                        riquer_core::Dispatch::SendToBackend { .. } => "send_to_backend",
                    },
                }))?
            );
        }
        Command::Teachers => {
            let agent = build_agent(&cli.kb_root).await?;
            let teachers = agent.teachers().await?;
            println!("{}", serde_json::to_string_pretty(&teachers)?);
        }
    }

    Ok(())
}

async fn run_chat(agent: AssistantAgent<Store>) -> Result<()> {
    let mut session_id: Option<String> = None;

    println!("Riquer assistant chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = agent
            .handle_message(ChatInput {
                session_id: session_id.clone(),
                message: message.to_string(),
                language: None,
                user_name: None,
                user_contact: None,
            })
            .await?;

        session_id = Some(reply.session_id.clone());

        println!("\n{}\n", reply.reply_text);

        match reply.action {
            ReplyAction::ShowAbsenceForm => {
                println!("[the widget would open the absence justification form here]\n");
            }
            ReplyAction::ShowTeacherForm => {
                println!("[the widget would open the teacher contact form here]\n");
            }
            ReplyAction::None => {}
        }
    }

    Ok(())
}

async fn build_agent(kb_root: &PathBuf) -> Result<AssistantAgent<Store>> {
    let metrics = AppMetrics::shared();
    let context = Arc::new(InstituteContext::load(kb_root)?);

    let backend = match env::var("RIQUER_BACKEND_URL") {
        Ok(url) if !url.trim().is_empty() => ChatBackend::http(
            url,
            env::var("RIQUER_BACKEND_API_KEY").ok(),
            context.clone(),
        )?,
        _ => ChatBackend::disabled(),
    };

    let mailer = match (
        env::var("RIQUER_MAILGUN_API_KEY"),
        env::var("RIQUER_MAILGUN_DOMAIN"),
    ) {
        (Ok(api_key), Ok(domain)) => {
            let from = env::var("RIQUER_MAIL_FROM").unwrap_or_else(|_| {
                "Institut Alexandre de Riquer <riquer@inscalaf.cat>".to_string()
            });
            Mailer::mailgun(api_key, domain, from)?
        }
        _ => Mailer::disabled(),
    };

    let store = if let Ok(database_url) = env::var("RIQUER_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };

    let absence_recipient = env::var("RIQUER_ABSENCE_RECIPIENT")
        .unwrap_or_else(|_| "consergeria@inscalaf.cat".to_string());

    Ok(AssistantAgent::new(
        backend,
        mailer,
        Arc::new(store),
        metrics,
        absence_recipient,
    ))
}
