//! Config file management.

use potpal_config::{Config, Profile};

use crate::cli::{ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(cmd: ConfigCommand, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        ConfigCommand::Init { cloud_url } => {
            let path = potpal_config::config_path();
            if path.exists() {
                return Err(CliError::Validation {
                    field: "config".into(),
                    reason: format!("{} already exists", path.display()),
                });
            }

            let mut cfg = Config::default();
            let mut profile = Profile::default();
            if let Some(url) = cloud_url {
                profile.cloud_url = url;
            }
            cfg.profiles.insert("default".into(), profile);
            potpal_config::save_config(&cfg)?;

            output::ok_line(
                output::should_color(global.color),
                &format!("Wrote {}", path.display()),
            );
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = potpal_config::load_config_or_default();
            let text = toml::to_string_pretty(&cfg).map_err(potpal_config::ConfigError::from)?;
            print!("{text}");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", potpal_config::config_path().display());
            Ok(())
        }
    }
}
