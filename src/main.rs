use std::{
    process::ExitCode,
    sync::Arc,
};

use lexiq::{
    core::utils::kst_today,
    persistence::{
        JsonFileStore,
        KeyValueStore,
    },
    srs::DashboardState,
    ApiClient,
    ClientConfig,
    LexiqError,
};
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lexiq=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "lexiq failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), LexiqError> {
    let config = ClientConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        timeout_ms = config.timeout.as_millis() as u64,
        "Loaded client configuration"
    );

    let store: Arc<dyn KeyValueStore> = match &config.store_path {
        Some(path) => Arc::new(JsonFileStore::open(path)?),
        None => Arc::new(JsonFileStore::open_default()?),
    };

    let client = ApiClient::new(config, store)?;
    if !client.is_authenticated() {
        tracing::warn!("No access token stored, authenticated endpoints will fail");
    }

    let state = DashboardState::new();
    let Some(view) = state.refresh(&client, kst_today()).await else {
        return Err(LexiqError::Custom("dashboard refresh was superseded".to_string()));
    };

    if view.unauthorized {
        tracing::warn!("Session expired, log in again");
    }

    match view.banner.message() {
        Some(message) => tracing::info!(banner = %message, "Review reminder"),
        None => tracing::info!("Nothing due"),
    }

    let study = &view.study;
    if study.is_estimated {
        tracing::info!(
            attempts = study.total,
            "Today's study (count only, no breakdown available)"
        );
    } else {
        tracing::info!(
            words = study.total,
            correct = study.correct,
            incorrect = study.incorrect,
            error_rate = %format!("{:.1}%", study.error_rate()),
            "Today's study"
        );
    }

    tracing::info!(
        streak = view.streak.current_streak,
        progress = %format!("{:.0}%", view.streak_progress.percent),
        due = view.due_count,
        wrong = view.wrong_answer_count,
        mastered = view.mastered_count,
        degraded = view.is_degraded(),
        "Dashboard"
    );

    Ok(())
}
