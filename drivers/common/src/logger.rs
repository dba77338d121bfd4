use std::env;
use std::io::Write;
use std::str::FromStr;

pub fn output_level() -> log::LevelFilter {
    log::LevelFilter::Info
}

/// Configures logging for a single driver.
///
/// Records are prefixed with `category/subcategory` so several drivers can
/// share one console.
pub fn setup_logging(category: &str, subcategory: &str, mut output_level: log::LevelFilter) {
    if let Some(log_level) = read_log_level_env(category, subcategory) {
        output_level = log_level;
    }

    let prefix = format!("{category}/{subcategory}");
    let record_prefix = prefix.clone();
    let res = env_logger::Builder::new()
        .filter_level(output_level)
        .format(move |buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}: {}",
                record_prefix,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
    if let Err(err) = res {
        eprintln!("{prefix}: failed to set default logger: {err}");
    }
}

fn read_log_level_env(category: &str, subcategory: &str) -> Option<log::LevelFilter> {
    let log_env_keys = [
        format!("DRIVER_{}_LOG_LEVEL", subcategory.to_ascii_uppercase()),
        format!("DRIVER_{}_LOG_LEVEL", category.to_ascii_uppercase()),
        "DRIVER_LOG_LEVEL".to_string(),
    ];

    log_env_keys.iter().find_map(|key| {
        env::var(key)
            .ok()
            .and_then(|value| log::LevelFilter::from_str(value.trim()).ok())
    })
}
