//! Command handlers, one module per concern.

pub mod auth;
pub mod chat;
pub mod config_cmd;
pub mod journal;
pub mod plants;
pub mod pot;
pub mod profile_cmd;
pub mod tasks;

use std::future::Future;

use potpal_api::CloudClient;
use potpal_core::SyncSession;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, global).await,
        Command::Register(args) => auth::register(args, global).await,
        Command::Account(cmd) => auth::account(cmd, global).await,
        Command::Plants(cmd) => plants::handle(cmd, global).await,
        Command::Tasks(cmd) => tasks::handle(cmd, global).await,
        Command::Journal(cmd) => journal::handle(cmd, global).await,
        Command::Pot(cmd) => pot::handle(cmd, global).await,
        Command::Chat(args) => chat::handle(args, global).await,
        Command::Profile(cmd) => profile_cmd::handle(cmd, global).await,
        Command::Config(_) | Command::Completions(_) => {
            unreachable!("handled before dispatch")
        }
    }
}

/// Run `f` inside a one-shot session: resolve the profile, sign in, run,
/// sign out.
pub(crate) async fn with_session<T, F, Fut>(global: &GlobalOpts, f: F) -> Result<T, CliError>
where
    F: FnOnce(SyncSession<CloudClient>) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let resolved = config::resolve(global);
    let client = config::cloud_client(&resolved, global)?;
    let session_config = config::session_config(&resolved);
    let (email, password) = config::credentials(&resolved)?;

    SyncSession::oneshot(client, session_config, &email, &password, f).await
}
