//! Logging setup, mirroring the `log` + `pretty_env_logger` pattern used throughout
//! this codebase: opt-in via `RUST_LOG`, silent otherwise.

pub fn init_logging() {
    if let Ok(directives) = std::env::var("RUST_LOG") {
        println!("Logging enabled with directives: {directives}");
        pretty_env_logger::formatted_timed_builder()
            .parse_filters(&directives)
            .format_timestamp_millis()
            .init();
    } else {
        println!("Logging disabled");
    }
}
