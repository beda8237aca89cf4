use env_logger::Env;

/// Level precedence: RUST_LOG, then the --log-level flag, then "info".
/// Decode warnings and summary anomalies land at warn, step progress at
/// info/debug.
pub fn init(level: Option<&str>) {
    let env = Env::default().default_filter_or(level.unwrap_or("info"));
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
