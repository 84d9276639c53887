pub mod alert;
pub mod collect;
pub mod config;
pub mod endpoints;
pub mod run;
pub mod validate;
pub mod version;

use bitsight_api::ApiClient;
use bitsight_core::Settings;
use bitsight_telemetry::Paths;

/// Resolve the state directory and load settings with env overrides
pub(crate) fn load_settings() -> anyhow::Result<(Paths, Settings)> {
    let paths = Paths::new()?;
    let settings = Settings::load_with_env(&paths.config_file())?;
    Ok((paths, settings))
}

/// API client for the configured account; a token must be set
pub(crate) fn api_client(settings: &Settings) -> anyhow::Result<ApiClient> {
    if settings.api.api_token.is_empty() {
        anyhow::bail!(
            "API token is not configured; run `bitsight config set api api_token <token>` \
             or set {}",
            bitsight_core::TOKEN_ENV
        );
    }
    Ok(ApiClient::new(&settings.request_settings())?)
}
