//! Local profile and text-size preference.
//!
//! Profiles live on the device, keyed by the account email, alongside the
//! display scale factor the app applies to every font.

use crate::cli::{GlobalOpts, ProfileCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(cmd: ProfileCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global);
    let (email, _) = config::credentials(&resolved)?;
    let store = config::local_store().await?;

    match cmd {
        ProfileCommand::Show => {
            let profile = store.profile(&email).await?;
            let rendered = output::render_single(
                global.output,
                &profile,
                |p| {
                    format!(
                        "Profile for {}\n  Name:       {}\n  Bio:        {}\n  Text scale: {:.2}",
                        p.user_id,
                        if p.name.is_empty() { "-" } else { &p.name },
                        if p.bio.is_empty() { "-" } else { &p.bio },
                        p.text_scale,
                    )
                },
                |p| p.user_id.clone(),
            );
            output::print_output(&rendered);
            Ok(())
        }

        ProfileCommand::Set { name, bio } => {
            let mut profile = store.profile(&email).await?;
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(bio) = bio {
                profile.bio = bio;
            }
            store.save_profile(&profile).await?;
            output::ok_line(output::should_color(global.color), "Profile updated");
            Ok(())
        }

        ProfileCommand::TextSize { scale } => {
            if !(0.5..=3.0).contains(&scale) {
                return Err(CliError::Validation {
                    field: "scale".into(),
                    reason: "must be between 0.5 and 3.0".into(),
                });
            }
            store.set_text_scale(&email, scale).await?;
            output::ok_line(
                output::should_color(global.color),
                &format!("Text scale set to {scale:.2}"),
            );
            Ok(())
        }
    }
}
