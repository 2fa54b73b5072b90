use game_info_api::config::Settings;
use game_info_api::global::Global;
use game_info_api::http;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Settings::new()?;

    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .parse_lossy(&config.logging.level),
        )
        .init();

    tracing::info!("starting game information api");

    let global = Global::init(config)?;

    tokio::select! {
        r = http::run(global.clone()) => {
            if let Err(e) = r {
                tracing::error!("http server error: {:#}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}
