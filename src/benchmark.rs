//! Timing experiments for the colony.
//!
//! Provides tools for timing full colony runs over a range of iteration
//! counts, writing duration reports, and comparing parallel against
//! sequential execution.

use crate::colony::{run_colony, ColonyConfig, ExecutionMode};
use crate::error::{ColonyError, ReportError};
use crate::instance::ProblemInstance;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Timing of one iteration count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingRecord {
    /// Number of colony iterations
    pub iterations: usize,
    /// Execution mode of the ant phase
    pub mode: ExecutionMode,
    /// Mean wall-clock time in seconds
    pub seconds: f64,
    /// Standard deviation over repeats (zero for a single run)
    pub std_dev: f64,
    /// Number of timed runs
    pub runs: usize,
}

/// Speedup of the parallel run over the sequential one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedupPoint {
    pub iterations: usize,
    pub sequential: f64,
    pub parallel: f64,
    pub speedup: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Iteration counts to time, one report line each
    pub iteration_counts: Vec<usize>,
    /// Timed runs per iteration count
    pub repeats: usize,
    pub mode: ExecutionMode,
}

impl BenchmarkConfig {
    /// Check the configuration before timing anything.
    ///
    /// Iteration counts key the timing table, so each may appear only once.
    pub fn validate(&self) -> Result<(), ColonyError> {
        if self.repeats == 0 {
            return Err(ColonyError::InvalidConfig(
                "benchmark repeats must be positive".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        if let Some(dup) = self.iteration_counts.iter().find(|&&n| !seen.insert(n)) {
            return Err(ColonyError::InvalidConfig(format!(
                "iteration count {} listed more than once",
                dup
            )));
        }

        Ok(())
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            iteration_counts: vec![1000, 5000, 10000, 50000, 100000],
            repeats: 1,
            mode: ExecutionMode::Parallel,
        }
    }
}

/// Benchmarking engine
pub struct TimingBenchmark {
    config: BenchmarkConfig,
    records: Vec<TimingRecord>,
}

impl TimingBenchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        TimingBenchmark {
            config,
            records: Vec::new(),
        }
    }

    /// Time the colony for every configured iteration count.
    ///
    /// Every run starts from the instance's initial pheromone matrix.
    pub fn run(&mut self, instance: &ProblemInstance, colony: &ColonyConfig) -> Result<(), ReportError> {
        self.config.validate()?;

        for &iterations in &self.config.iteration_counts {
            let config = ColonyConfig {
                num_iterations: iterations,
                mode: self.config.mode,
                ..colony.clone()
            };

            let mut samples = Vec::with_capacity(self.config.repeats);
            for _ in 0..self.config.repeats {
                let start = Instant::now();
                run_colony(instance, instance.initial_pheromone(), &config, |_| {})?;
                samples.push(start.elapsed().as_secs_f64());
            }

            let record = summarize(iterations, self.config.mode, &samples);
            log::info!(
                "{} iterations ({}): {:.6} s",
                iterations,
                record.mode,
                record.seconds
            );
            self.records.push(record);
        }

        Ok(())
    }

    /// Get all records
    pub fn records(&self) -> &[TimingRecord] {
        &self.records
    }

    /// Mean seconds keyed by iteration count
    pub fn timings(&self) -> BTreeMap<usize, f64> {
        self.records.iter().map(|r| (r.iterations, r.seconds)).collect()
    }

    /// One human-readable line per timed iteration count
    pub fn report_lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| format_report_line(r.iterations, r.seconds))
            .collect()
    }

    /// Write the duration report
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        for line in self.report_lines() {
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    /// Export records to CSV
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ReportError> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for record in &self.records {
            writer.serialize(record)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn summarize(iterations: usize, mode: ExecutionMode, samples: &[f64]) -> TimingRecord {
    let seconds = samples.iter().mean();
    let std_dev = if samples.len() > 1 {
        samples.iter().std_dev()
    } else {
        0.0
    };

    TimingRecord {
        iterations,
        mode,
        seconds,
        std_dev,
        runs: samples.len(),
    }
}

/// Render one report line
pub fn format_report_line(iterations: usize, seconds: f64) -> String {
    format!(
        "Execution time for {} iterations: {:.6} seconds",
        iterations, seconds
    )
}

/// Parse a duration report back into seconds keyed by iteration count.
///
/// Blank lines are skipped. The iteration count is the second-to-last
/// word before the colon and the duration is the first word after it.
pub fn parse_report(text: &str) -> Result<BTreeMap<usize, f64>, ReportError> {
    let mut timings = BTreeMap::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let malformed = || ReportError::MalformedLine {
            line: idx + 1,
            content: line.to_string(),
        };

        let (head, tail) = line.split_once(':').ok_or_else(malformed)?;
        let words: Vec<&str> = head.split_whitespace().collect();
        let iterations = words
            .len()
            .checked_sub(2)
            .and_then(|i| words[i].parse::<usize>().ok())
            .ok_or_else(malformed)?;
        let seconds = tail
            .split_whitespace()
            .next()
            .and_then(|w| w.parse::<f64>().ok())
            .ok_or_else(malformed)?;

        timings.insert(iterations, seconds);
    }

    Ok(timings)
}

/// Read a duration report file
pub fn read_report<P: AsRef<Path>>(path: P) -> Result<BTreeMap<usize, f64>, ReportError> {
    let text = std::fs::read_to_string(path)?;
    parse_report(&text)
}

/// Speedup per iteration count present in both timings
pub fn speedup(sequential: &BTreeMap<usize, f64>, parallel: &BTreeMap<usize, f64>) -> Vec<SpeedupPoint> {
    sequential
        .iter()
        .filter_map(|(&iterations, &seq)| {
            parallel.get(&iterations).map(|&par| SpeedupPoint {
                iterations,
                sequential: seq,
                parallel: par,
                speedup: seq / par,
            })
        })
        .collect()
}

/// Time both execution modes on the same instance and compute the speedup
pub fn compare_modes(
    instance: &ProblemInstance,
    colony: &ColonyConfig,
    config: &BenchmarkConfig,
) -> Result<Vec<SpeedupPoint>, ReportError> {
    let mut sequential = TimingBenchmark::new(BenchmarkConfig {
        mode: ExecutionMode::Sequential,
        ..config.clone()
    });
    sequential.run(instance, colony)?;

    let mut parallel = TimingBenchmark::new(BenchmarkConfig {
        mode: ExecutionMode::Parallel,
        ..config.clone()
    });
    parallel.run(instance, colony)?;

    Ok(speedup(&sequential.timings(), &parallel.timings()))
}

/// Format a speedup table
pub fn format_speedup_table(points: &[SpeedupPoint]) -> String {
    let mut report = String::new();

    report.push_str(&format!(
        "{:>12} {:>14} {:>14} {:>10}\n",
        "Iterations", "Sequential(s)", "Parallel(s)", "Speedup"
    ));
    report.push_str("-".repeat(53).as_str());
    report.push('\n');

    for p in points {
        report.push_str(&format!(
            "{:>12} {:>14.6} {:>14.6} {:>10.3}\n",
            p.iterations, p.sequential, p.parallel, p.speedup
        ));
    }

    report
}
