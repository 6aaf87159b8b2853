use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dotenv::dotenv;
use tokio::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analytics_cell::StatsService;
use consultation_cell::{ConsultationSession, QueueWatcher};
use intake_cell::RosterService;
use session_cell::{SessionContext, SessionService};
use shared_config::AppConfig;
use shared_gateway::BackendClient;
use shared_models::UserRole;
use shared_utils::time::local_date;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting hospital workstation");

    let config = AppConfig::from_env();
    let gateway = Arc::new(BackendClient::new(&config));

    let role_var = std::env::var("WORKSTATION_ROLE").unwrap_or_else(|_| "doctor".into());
    let role = UserRole::from_str(&role_var).map_err(|e| anyhow::anyhow!(e))?;
    let user_id =
        std::env::var("WORKSTATION_USER_ID").context("WORKSTATION_USER_ID is required")?;
    let password =
        std::env::var("WORKSTATION_PASSWORD").context("WORKSTATION_PASSWORD is required")?;

    let sessions = SessionService::with_client(Arc::clone(&gateway));
    let user = sessions.login(role, &user_id, &password).await?;

    let mut context = SessionContext::new();
    context.establish(user);

    let result = match context.require()?.role {
        UserRole::Doctor => run_doctor_desk(gateway, &config, &context).await,
        UserRole::Admin => run_admin_board(gateway, &context).await,
        UserRole::Patient => run_patient_roster(gateway, &context).await,
    };

    context.clear();
    result
}

/// Doctor seat: keep the two queues fresh and report their depth until
/// interrupted.
async fn run_doctor_desk(
    gateway: Arc<BackendClient>,
    config: &AppConfig,
    context: &SessionContext,
) -> anyhow::Result<()> {
    let doctor = context.require()?.clone();
    let mut session = ConsultationSession::new(gateway, doctor)?;
    session.refresh_queues().await?;

    let session = Arc::new(Mutex::new(session));
    let watcher = QueueWatcher::spawn(Arc::clone(&session), config);

    info!("Watching consultation queues; press Ctrl-C to stop");
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_secs(config.queue_poll_interval_secs)) => {
                let session = session.lock().await;
                info!(
                    "Queue depth: {} mine, {} department (phase {:?})",
                    session.queues().mine.len(),
                    session.queues().department.len(),
                    session.phase(),
                );
            }
        }
    }

    watcher.stop();
    Ok(())
}

/// Admin seat: one-shot day board and hourly trend for today.
async fn run_admin_board(
    gateway: Arc<BackendClient>,
    context: &SessionContext,
) -> anyhow::Result<()> {
    let stats = StatsService::with_client(gateway);
    let today = local_date();

    let board = stats.day_board(&today, context.token()).await?;
    info!(
        "Day board {}: {} total, {} pending, {} completed",
        board.date, board.total, board.pending, board.completed
    );
    for load in &board.department_load {
        info!("  {}: {}", load.name, load.value);
    }

    let trend = stats.hourly_trend(Some(&today), context.token()).await?;
    for bucket in trend {
        info!("  {:02}:00 - {} bookings", bucket.hour, bucket.count);
    }

    Ok(())
}

/// Patient seat: print the caller's own bookings, newest first.
async fn run_patient_roster(
    gateway: Arc<BackendClient>,
    context: &SessionContext,
) -> anyhow::Result<()> {
    let roster = RosterService::with_client(gateway);
    let appointments = roster.my_appointments(context.require()?).await?;

    info!("{} appointment(s) on file", appointments.len());
    for appointment in appointments {
        info!(
            "  {} {} {} ({})",
            appointment.create_time,
            appointment.id,
            appointment.department_name,
            appointment.status,
        );
    }

    Ok(())
}
