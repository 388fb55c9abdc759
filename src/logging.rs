use log::LevelFilter;

const DEBUG_ENV: &str = "CONCENTRATION_DEBUG";

static GLIB_LOGGER: glib::GlibLogger = glib::GlibLogger::new(
    glib::GlibLoggerFormat::Plain,
    glib::GlibLoggerDomain::CrateTarget,
);

fn level_from(value: Option<&str>) -> LevelFilter {
    match value.map(str::trim) {
        Some("1") | Some("true") => LevelFilter::Debug,
        _ => LevelFilter::Info,
    }
}

/// Routes `log` records into GLib's structured logging.
pub fn init() {
    let level = level_from(std::env::var(DEBUG_ENV).ok().as_deref());
    if log::set_logger(&GLIB_LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
