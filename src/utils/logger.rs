use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Crates whose debug output drowns the provisioning log
const NOISY_TARGETS: [&str; 4] = ["alloy_rpc_client", "alloy_transport_http", "hyper_util", "reqwest"];

/// Sets up console logging.
///
/// # Arguments
/// * `verbosity` - overrides `RUST_LOG` when given; without either the
///   level is `Info`
///
/// # Errors
/// * If a logger was already installed
pub fn setup_logger(verbosity: Option<LevelFilter>) -> Result<()> {
    let level = verbosity.unwrap_or_else(|| {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| level.parse().ok())
            .unwrap_or(LevelFilter::Info)
    });

    let dispatch = NOISY_TARGETS
        .iter()
        .fold(Dispatch::new().level(level), |dispatch, target| {
            dispatch.level_for(*target, level.min(LevelFilter::Info))
        });

    dispatch
        // Results go to stdout; keep the log on stderr
        .chain(std::io::stderr())
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
