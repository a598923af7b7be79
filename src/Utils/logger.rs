use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode};

/// Initializes a terminal logger at the given level. Logging is opt-in;
/// library code only emits through the log facade and stays silent unless
/// a consumer calls this (or installs its own logger). Repeated calls are
/// harmless, only the first installation wins.
pub fn init_term_logger(level: &str) -> Result<(), String> {
    let log_option = match level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => return Err(format!("loglevel must be trace, debug, info, warn, error or off, got '{level}'")),
    };
    let logger_instance = CombinedLogger::init(vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
    // an already-installed logger is fine
    let _ = logger_instance;
    Ok(())
}
