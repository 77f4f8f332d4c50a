use crate::args::InitArgs;
use crate::commands::Out;
use crate::config::InferenceSettings;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and an initial `config.json` in it, using the inference settings in
/// `args` and defaults for anything not given.
///
/// # Arguments
/// - `ledger_home` - The directory that will be the root of data directory, e.g. `$HOME/ledger`
///
/// # Errors
/// - Returns an error if a config file already exists or the endpoint is not a valid URL.
/// - Returns an error if any file operations fail.
pub async fn init(ledger_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let settings = InferenceSettings {
        endpoint: args.endpoint().map(String::from),
        model: args.model().map(String::from),
        context_size: args.context_size(),
        timeout_secs: args.timeout_secs(),
    };
    let config = Config::create(ledger_home, &settings)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the ledger directory and config at {}",
        config.root().display()
    )
    .into())
}
