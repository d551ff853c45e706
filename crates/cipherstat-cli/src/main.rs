//! CLI for cipherstat: run the NIST SP 800-22 randomness battery over batches of bit sequences.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cipherstat")]
#[command(about = "cipherstat: NIST SP 800-22 randomness battery for ciphertext bit streams")]
#[command(version = cipherstat_tests::VERSION)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the battery over every sample in the given files.
    /// Text files hold one bit string per line; use "-" for stdin.
    Run {
        /// Input files
        #[arg(required = true)]
        files: Vec<String>,

        /// Worker threads (0 = one per core)
        #[arg(long, default_value = "0")]
        workers: usize,

        /// Block length M of the block frequency test
        #[arg(long, default_value = "128")]
        block_size: usize,

        /// Direction of the cumulative sums walk
        #[arg(long, default_value = "forward", value_parser = ["forward", "backward"])]
        cusum_mode: String,

        /// Drop characters other than '0'/'1' instead of rejecting the sample
        #[arg(long)]
        lenient: bool,

        /// Treat each file as one sample of raw bytes (MSB first)
        #[arg(long)]
        binary: bool,

        /// Output format
        #[arg(long, default_value = "table", value_parser = ["table", "json"])]
        format: String,

        /// Write the full JSON report to this path
        #[arg(long)]
        output: Option<String>,
    },

    /// Check the battery against the published NIST SP 800-22 worked examples
    Reference,
}

fn main() {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    match cli.command {
        Commands::Run {
            files,
            workers,
            block_size,
            cusum_mode,
            lenient,
            binary,
            format,
            output,
        } => commands::run::run(commands::run::RunCommandConfig {
            files: &files,
            workers,
            block_size,
            cusum_mode: &cusum_mode,
            lenient,
            binary,
            format: &format,
            output_path: output.as_deref(),
        }),
        Commands::Reference => commands::reference::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(mode: &str) -> Vec<&str> {
        vec!["cipherstat", "run", "--cusum-mode", mode, "samples.txt"]
    }

    #[test]
    fn test_cusum_mode_values() {
        assert!(Cli::try_parse_from(run_args("forward")).is_ok());
        assert!(Cli::try_parse_from(run_args("backward")).is_ok());
        assert!(Cli::try_parse_from(run_args("bwd")).is_err());
        assert!(Cli::try_parse_from(run_args("Backward")).is_err());
    }

    #[test]
    fn test_run_requires_files() {
        assert!(Cli::try_parse_from(["cipherstat", "run"]).is_err());
        assert!(Cli::try_parse_from(["cipherstat", "reference"]).is_ok());
    }
}
