//! One-question chat with the care helper.

use potpal_core::ChatSession;

use crate::cli::{ChatArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn handle(args: ChatArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let question = args.question.join(" ");
    if question.trim().is_empty() {
        return Err(CliError::Validation {
            field: "question".into(),
            reason: "must not be empty".into(),
        });
    }

    let resolved = config::resolve(global);
    let client = config::genai_client(&resolved, global)?;

    let mut chat = ChatSession::new(client);
    let reply = chat.ask(&question).await?;
    println!("{reply}");
    Ok(())
}
