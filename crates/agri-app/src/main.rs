mod cli;
mod commands;
mod render;
mod runtime;

use std::sync::Arc;

use agri_core::config::AppConfig;
use agri_core::fixtures::Fixtures;
use agri_core::llm::{
    AdvisoryGateway, CannedModel, EnvCredentials, GeminiClient, GeminiClientError,
    StaticCredentials,
};
use agri_core::models::Theme;
use cli::{CliError, CliOptions, ModelMode};
use runtime::App;
use tracing::{error, info};

const DEFAULT_LOG_FILTER: &str = "agrismart=info,agri_core=info";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = match CliOptions::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(CliError::HelpRequested) => {
            print_usage();
            std::process::exit(0);
        }
        Err(err) => {
            eprintln!("error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to read agrismart config: {err}");
            std::process::exit(1);
        }
    };

    let fixtures = match Fixtures::load() {
        Ok(fixtures) => fixtures,
        Err(err) => {
            error!("failed to load fixtures: {err}");
            std::process::exit(1);
        }
    };

    let gateway = match build_gateway(options.mode, &config) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build model client: {err}");
            std::process::exit(1);
        }
    };

    let theme = if options.dark { Theme::Dark } else { config.theme };
    info!(
        mode = options.mode.as_str(),
        vision_model = %config.models.vision,
        text_model = %config.models.text,
        "agrismart starting"
    );

    let (app, completions) = App::new(theme, gateway, fixtures);
    if let Err(err) = runtime::run(app, completions).await {
        error!("failed to read input: {err}");
        std::process::exit(1);
    }
}

fn build_gateway(
    mode: ModelMode,
    config: &AppConfig,
) -> Result<AdvisoryGateway, GeminiClientError> {
    let gateway = match mode {
        ModelMode::Live => AdvisoryGateway::new(
            Arc::new(GeminiClient::new(config.gemini.clone())?),
            Arc::new(EnvCredentials::default()),
            config.models.clone(),
        ),
        ModelMode::Mocked => AdvisoryGateway::new(
            Arc::new(CannedModel::default()),
            Arc::new(StaticCredentials::new("offline")),
            config.models.clone(),
        ),
    };

    Ok(gateway)
}

fn print_usage() {
    eprintln!(
        "Usage: agrismart [--mode live|mocked] [--dark]\n\
         \n\
         Modes:\n\
         - live (default): answers come from the Gemini API (needs GEMINI_API_KEY)\n\
         - mocked: offline sample answers, no network\n\
         \n\
         Options:\n\
         - --dark   Start in dark mode\n\
         - --help   Show this help text\n\
         \n\
         Type `help` at the prompt for the command list."
    );
}
