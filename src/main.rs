use ampere_spawner::config::Config;
use ampere_spawner::oci::OciClient;
use ampere_spawner::spawner::{ChatTarget, RunOutcome, Spawner};
use ampere_spawner::telegram::TelegramClient;
use ampere_spawner::{LaunchReport, SpawnError};
use mimalloc::MiMalloc;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = Config::load();
    let loglevel = cfg
        .as_ref()
        .map(|c| c.basic.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(loglevel));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(err) => return fatal(&err),
    };

    info!(
        shape = %cfg.launch.shape,
        ocpus = cfg.launch.ocpus,
        memory_gbs = cfg.launch.memory_in_gbs,
        availability_domains = ?cfg.launch.availability_domains,
        region = %cfg.oci.region,
        proxy = %cfg.basic.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        notifications = cfg.telegram().is_some(),
        "Start spawning instance {} - {} ocpus - {} GB",
        cfg.launch.shape,
        cfg.launch.ocpus,
        cfg.launch.memory_in_gbs
    );

    let spawner = match build_spawner(&cfg) {
        Ok(spawner) => spawner,
        Err(err) => return fatal(&err),
    };

    tokio::select! {
        result = spawner.run() => {
            match &result {
                Ok(report) => log_finished(report),
                Err(err) => log_fatal(err),
            }
            RunOutcome::from_result(&result).into()
        }
        () = shutdown_signal() => {
            warn!("Interrupted, exiting without further notification.");
            RunOutcome::Interrupted.into()
        }
    }
}

fn build_spawner(cfg: &Config) -> Result<Spawner<OciClient, TelegramClient>, SpawnError> {
    let http = ampere_spawner::http::build_client(cfg.basic.proxy.as_ref())?;
    let oci_cfg = cfg.oci()?;
    let cloud = OciClient::new(&oci_cfg, http.clone())?;
    let chat = cfg.telegram().map(|tg| ChatTarget {
        api: TelegramClient::new(&tg, http.clone()),
        chat_id: tg.chat_id,
    });
    Ok(Spawner::new(cfg, cloud, chat))
}

fn log_finished(report: &LaunchReport) {
    if report.public_ip.is_none() {
        error!(
            instance_id = %report.instance_id,
            "Instance launched without a resolved public IP; check the console."
        );
    }
}

fn log_fatal(err: &SpawnError) {
    error!(error = %err, "{err}. **SPAWN STOPPED**");
}

fn fatal(err: &SpawnError) -> ExitCode {
    log_fatal(err);
    RunOutcome::Fatal.into()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
