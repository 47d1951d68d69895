use quest_master::{
    GameMaster, OpenAICompletionClient, PersonaRegistry, Settings, app::App, logging,
};

use color_eyre::eyre::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    // A missing .env file is fine, the variables may come from the shell.
    let _ = dotenvy::dotenv();

    let settings_path = Settings::default_path();
    let (mut settings, load_error) = Settings::load_or_default(&settings_path)?;
    settings.apply_env()?;

    logging::init(&Settings::data_dir(), settings.log_level())?;
    log::info!("Quest Master start: {}", chrono::Local::now());
    if let Some(e) = load_error {
        log::warn!(
            "Could not read {}, using defaults: {e}",
            settings_path.display()
        );
    }

    if let Err(e) = settings.validate() {
        log::error!("Invalid configuration: {e}");
        return Err(e.into());
    }

    // validate() guarantees both are present.
    let client = OpenAICompletionClient::new(
        settings.api_key.as_deref().unwrap_or_default(),
        settings.base_url.as_deref().unwrap_or_default(),
        settings.request_timeout(),
    );
    let game_master = Arc::new(GameMaster::new(
        settings,
        PersonaRegistry::standard(),
        client,
    ));

    App::new(game_master).run().await
}
