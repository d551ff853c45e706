pub mod reference;
pub mod run;

use cipherstat_tests::CusumMode;

/// Install the global logger. `RUST_LOG` wins; otherwise `warn`, or `debug`
/// with `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

/// Map a `--cusum-mode` value to the enum. clap has already restricted it to
/// "forward" or "backward".
pub fn parse_cusum_mode(s: &str) -> CusumMode {
    match s {
        "backward" => CusumMode::Backward,
        _ => CusumMode::Forward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cusum_modes() {
        assert_eq!(parse_cusum_mode("forward"), CusumMode::Forward);
        assert_eq!(parse_cusum_mode("backward"), CusumMode::Backward);
    }
}
