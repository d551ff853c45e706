use std::io::{self, Read};
use std::time::Instant;

use cipherstat_tests::{
    BatteryConfig, BatteryReport, BitSequence, ParsePolicy, PoolConfig, SequenceError, run_batch,
    run_batch_strings,
};
use serde::Serialize;
use thiserror::Error;

pub struct RunCommandConfig<'a> {
    pub files: &'a [String],
    pub workers: usize,
    pub block_size: usize,
    pub cusum_mode: &'a str,
    pub lenient: bool,
    pub binary: bool,
    pub format: &'a str,
    pub output_path: Option<&'a str>,
}

#[derive(Debug, Error)]
#[error("failed to read {path}: {source}")]
pub struct LoadError {
    path: String,
    #[source]
    source: io::Error,
}

/// Labelled samples read from the input files.
#[derive(Debug)]
pub enum Samples {
    /// One bit string per non-empty line, labelled `path:line`.
    Lines(Vec<(String, String)>),
    /// One raw-byte sample per file, labelled with the path.
    Sequences(Vec<(String, BitSequence)>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Self::Lines(lines) => lines.len(),
            Self::Sequences(seqs) => seqs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Battery result of one labelled sample.
#[derive(Debug)]
pub struct SampleResult {
    pub label: String,
    pub result: Result<BatteryReport, SequenceError>,
}

/// Pass count of one outcome slot across every sample that parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassRate {
    pub test: String,
    pub passed: usize,
    pub tested: usize,
    pub rate: f64,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    config: &'a BatteryConfig,
    samples: Vec<JsonSample<'a>>,
    pass_rates: Vec<PassRate>,
}

#[derive(Serialize)]
struct JsonSample<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    passed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a BatteryReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn run(config: RunCommandConfig) {
    let samples = match load_samples(config.files, config.binary) {
        Ok(samples) => samples,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if samples.is_empty() {
        eprintln!("No samples found.");
        std::process::exit(1);
    }

    let battery = BatteryConfig {
        block_frequency_block_size: config.block_size,
        cusum_mode: super::parse_cusum_mode(config.cusum_mode),
    };
    let pool = PoolConfig::with_workers(config.workers);
    let policy = if config.lenient {
        ParsePolicy::Lenient
    } else {
        ParsePolicy::Strict
    };
    let table = config.format != "json";

    if table {
        println!("Running battery on {} sample(s)...", samples.len());
    }
    let t0 = Instant::now();
    let results = execute(samples, policy, &battery, &pool);
    let elapsed = t0.elapsed().as_secs_f64();
    log::info!("battery finished in {elapsed:.2}s");

    let mut failures = 0usize;
    for sample in &results {
        if let Err(e) = &sample.result {
            eprintln!("{}: {e}", sample.label);
            failures += 1;
        }
    }

    if !table || config.output_path.is_some() {
        let json = match render_json(&results, &battery) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                std::process::exit(1);
            }
        };
        if let Some(path) = config.output_path {
            if let Err(e) = std::fs::write(path, &json) {
                eprintln!("Failed to write report to {path}: {e}");
                std::process::exit(1);
            }
            if table {
                println!("Report saved to: {path}");
            }
        }
        if !table {
            println!("{json}");
        }
    }

    if table {
        println!("Done in {elapsed:.1}s\n");
        print!("{}", render_table(&results));
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

fn read_input(path: &str) -> Result<Vec<u8>, LoadError> {
    let data = if path == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map(|_| buf)
    } else {
        std::fs::read(path)
    };
    data.map_err(|source| LoadError {
        path: path.to_string(),
        source,
    })
}

/// Read every input file. Blank lines are skipped; surrounding whitespace and
/// line endings are not part of a sample.
pub fn load_samples(files: &[String], binary: bool) -> Result<Samples, LoadError> {
    if binary {
        let mut seqs = Vec::with_capacity(files.len());
        for path in files {
            let data = read_input(path)?;
            seqs.push((path.clone(), BitSequence::from_bytes(&data)));
        }
        return Ok(Samples::Sequences(seqs));
    }

    let mut lines = Vec::new();
    for path in files {
        let data = read_input(path)?;
        let text = String::from_utf8_lossy(&data);
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if !line.is_empty() {
                lines.push((format!("{path}:{}", i + 1), line.to_string()));
            }
        }
    }
    log::debug!("loaded {} samples from {} file(s)", lines.len(), files.len());
    Ok(Samples::Lines(lines))
}

/// Run the battery over every sample, keeping input order.
pub fn execute(
    samples: Samples,
    policy: ParsePolicy,
    battery: &BatteryConfig,
    pool: &PoolConfig,
) -> Vec<SampleResult> {
    match samples {
        Samples::Lines(lines) => {
            let (labels, texts): (Vec<String>, Vec<String>) = lines.into_iter().unzip();
            let results = run_batch_strings(&texts, policy, battery, pool);
            labels
                .into_iter()
                .zip(results)
                .map(|(label, result)| SampleResult { label, result })
                .collect()
        }
        Samples::Sequences(seqs) => {
            let (labels, seqs): (Vec<String>, Vec<BitSequence>) = seqs.into_iter().unzip();
            let reports = run_batch(&seqs, battery, pool);
            labels
                .into_iter()
                .zip(reports)
                .map(|(label, report)| SampleResult {
                    label,
                    result: Ok(report),
                })
                .collect()
        }
    }
}

/// Per-slot pass rates over every sample that produced a report.
pub fn pass_rates(results: &[SampleResult]) -> Vec<PassRate> {
    let mut rates: Vec<PassRate> = Vec::new();
    for report in results.iter().filter_map(|s| s.result.as_ref().ok()) {
        for (i, (label, outcome)) in report.scored_outcomes().into_iter().enumerate() {
            if i == rates.len() {
                rates.push(PassRate {
                    test: label,
                    passed: 0,
                    tested: 0,
                    rate: 0.0,
                });
            }
            rates[i].tested += 1;
            if outcome.passes {
                rates[i].passed += 1;
            }
        }
    }
    for rate in &mut rates {
        rate.rate = rate.passed as f64 / rate.tested as f64;
    }
    rates
}

pub fn render_json(
    results: &[SampleResult],
    config: &BatteryConfig,
) -> Result<String, serde_json::Error> {
    let samples = results
        .iter()
        .map(|s| match &s.result {
            Ok(report) => JsonSample {
                label: &s.label,
                passed: Some(report.passed_count()),
                total: Some(report.total_count()),
                report: Some(report),
                error: None,
            },
            Err(e) => JsonSample {
                label: &s.label,
                passed: None,
                total: None,
                report: None,
                error: Some(e.to_string()),
            },
        })
        .collect();
    serde_json::to_string_pretty(&JsonReport {
        version: cipherstat_tests::VERSION,
        config,
        samples,
        pass_rates: pass_rates(results),
    })
}

pub fn render_table(results: &[SampleResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(64)));
    out.push_str(&format!("{:<36} {:>12} {:>12}\n", "Sample", "Bits", "Passed"));
    out.push_str(&format!("{}\n", "-".repeat(64)));
    for sample in results {
        match &sample.result {
            Ok(report) => out.push_str(&format!(
                "  {:<34} {:>12} {:>9}/{}\n",
                sample.label,
                report.length,
                report.passed_count(),
                report.total_count()
            )),
            Err(e) => out.push_str(&format!("  {:<34} error: {e}\n", sample.label)),
        }
    }

    let rates = pass_rates(results);
    if rates.is_empty() {
        return out;
    }
    out.push_str(&format!("\n{}\n", "=".repeat(64)));
    out.push_str(&format!("{:<36} {:>12} {:>12}\n", "Test", "Passed", "Rate"));
    out.push_str(&format!("{}\n", "-".repeat(64)));
    for rate in &rates {
        out.push_str(&format!(
            "  {:<34} {:>12} {:>11.1}%\n",
            rate.test,
            format!("{}/{}", rate.passed, rate.tested),
            rate.rate * 100.0
        ));
    }
    out
}
