//! Settings subcommands.
use log::*;
use std::env;

use crate::{
    cli::SettingsCommand, error::Result, service::ReleaseService,
    settings::Settings,
};

pub const TRACKER_TOKEN_ENV_VAR: &str = "RELNOTES_TRACKER_TOKEN";
pub const LLM_TOKEN_ENV_VAR: &str = "RELNOTES_LLM_TOKEN";

pub async fn execute(service: &ReleaseService, cmd: SettingsCommand) -> Result<()> {
    match cmd {
        SettingsCommand::Set {
            tracker_url,
            tracker_email,
            tracker_token,
            llm_token,
        } => {
            let update = Settings {
                tracker_base_url: tracker_url,
                tracker_email,
                tracker_token: with_env_fallback(tracker_token, TRACKER_TOKEN_ENV_VAR),
                llm_token: with_env_fallback(llm_token, LLM_TOKEN_ENV_VAR),
            };

            let settings = service.update_settings(update).await?;

            if let Err(err) = settings.resolve() {
                warn!("settings are incomplete: {err}");
            }

            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
        }
        SettingsCommand::Show => {
            let settings = service.get_settings().await?;
            println!("{}", serde_json::to_string_pretty(&settings.redacted())?);
        }
    }

    Ok(())
}

fn with_env_fallback(value: Option<String>, env_var: &str) -> Option<String> {
    value.or_else(|| env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
}
