//! Batch report runner.
//!
//! Plays the pipeline around the engine: snapshot in, engine over the fact
//! arrays, JSON and delimited-text files out.

use chrono::{DateTime, Utc};
use domain::models::{
    ConformityReport, Decomposition, FleetUtilizationSummary, PeriodAggregation,
    UtilizationScore,
};
use domain::services::{
    decompose_fleet, filter_records, normalize_events, rank_by_score, score_fleet,
    summarize_fleet, AnomalyDetector, FilterContext, PeriodAggregator, ResultCache,
};
use serde::Serialize;
use serde_json::Value;
use shared::period::PeriodKey;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ReportError;
use crate::export;
use crate::metrics;
use crate::snapshot::Snapshot;

/// Normalization counts surfaced in the report.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizationSummary {
    pub assets: usize,
    pub events: usize,
    pub excluded: usize,
}

/// Everything derived from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub dataset_version: u64,
    pub generated_at: DateTime<Utc>,
    pub normalization: NormalizationSummary,
    pub decompositions: Vec<Decomposition>,
    /// Ranked best first.
    pub utilization: Vec<UtilizationScore>,
    pub fleet_summary: FleetUtilizationSummary,
    pub conformity: ConformityReport,
    pub churn: PeriodAggregation,
}

/// Files written by a run.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub files: Vec<PathBuf>,
}

pub struct ReportRunner {
    config: Config,
    detector: AnomalyDetector,
    churn: PeriodAggregator<Value>,
    churn_cache: ResultCache<PeriodAggregation>,
}

impl ReportRunner {
    pub fn new(config: Config) -> Result<Self, ReportError> {
        let detector = AnomalyDetector::new(&config.anomaly);

        let mut churn =
            PeriodAggregator::for_fields(&config.churn.date_field, &config.churn.event_field);
        if let Some(field) = &config.churn.value_field {
            churn = churn.with_value_field(field);
        }
        if let Some((from, to)) = config.churn.calendar_range()? {
            churn = churn.with_calendar_range(from, to)?;
        }

        Ok(Self {
            config,
            detector,
            churn,
            churn_cache: ResultCache::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Churn buckets for a filter selection, memoized per dataset version.
    pub fn churn(&mut self, snapshot: &Snapshot, ctx: &FilterContext) -> Arc<PeriodAggregation> {
        self.churn_cache
            .invalidate_before(snapshot.dataset_version);
        let churn = &self.churn;
        self.churn_cache
            .get_or_compute(snapshot.dataset_version, ctx, || {
                churn.aggregate(&snapshot.contract_events, ctx)
            })
    }

    /// Contract events of one month, for record-level export.
    pub fn drill_down<'a>(&self, snapshot: &'a Snapshot, period: PeriodKey) -> Vec<&'a Value> {
        let ctx = FilterContext::new().with_period(period);
        filter_records(&snapshot.contract_events, &self.config.churn.date_field, &ctx)
    }

    /// Runs the full engine over a snapshot.
    pub fn build_report(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> FleetReport {
        let normalized = normalize_events(&snapshot.lifecycle_events);
        metrics::record_excluded_events(normalized.excluded);

        let decompositions = decompose_fleet(&normalized, &snapshot.assets, now);

        let mut utilization = score_fleet(&decompositions, &self.config.utilization);
        rank_by_score(&mut utilization);
        let fleet_summary = summarize_fleet(&utilization);

        let conformity = self.detector.evaluate(&snapshot.cases, now);
        metrics::record_conformity(&conformity);

        let churn = self.churn(snapshot, &FilterContext::new());
        metrics::record_churn_excluded(churn.excluded);

        info!(
            dataset_version = snapshot.dataset_version,
            assets = decompositions.len(),
            scored = utilization.len(),
            anomalies = conformity.anomalies.len(),
            conformity_pct = conformity.conformity_pct,
            periods = churn.buckets.len(),
            "Built fleet report"
        );

        FleetReport {
            dataset_version: snapshot.dataset_version,
            generated_at: now,
            normalization: NormalizationSummary {
                assets: normalized.by_asset.len(),
                events: normalized.event_count(),
                excluded: normalized.excluded,
            },
            decompositions,
            utilization,
            fleet_summary,
            conformity,
            churn: PeriodAggregation::clone(&churn),
        }
    }

    /// Writes `report.json` and, when enabled, the CSV exports.
    pub fn write_outputs(
        &self,
        report: &FleetReport,
        snapshot: &Snapshot,
        dir: &Path,
    ) -> Result<RunOutput, ReportError> {
        let mut output = RunOutput::default();
        let mut write = |name: String, content: String| -> Result<(), ReportError> {
            let path = dir.join(name);
            export::write_file(&path, &content)?;
            output.files.push(path);
            Ok(())
        };

        write("report.json".to_string(), export::to_json(report)?)?;

        if self.config.output.write_csv {
            write(
                "utilization.csv".to_string(),
                export::utilization_csv(&report.utilization),
            )?;
            write(
                "anomalies.csv".to_string(),
                export::anomalies_csv(&report.conformity.anomalies),
            )?;
            write("churn.csv".to_string(), export::churn_csv(&report.churn.buckets))?;

            if let Some(period) = self.config.churn.drill_down_period()? {
                let records = self.drill_down(snapshot, period);
                if records.is_empty() {
                    warn!(period = %period, "No contract events in drill-down period");
                }
                let churn = &self.config.churn;
                let mut columns = vec![churn.date_field.as_str(), churn.event_field.as_str()];
                if let Some(value_field) = &churn.value_field {
                    columns.push(value_field.as_str());
                }
                write(
                    format!("churn_{}.csv", period),
                    export::records_csv(&records, &columns),
                )?;
            }
        }

        Ok(output)
    }

    /// Loads the configured snapshot, builds the report and writes it out.
    pub fn run(&mut self, now: DateTime<Utc>) -> Result<RunOutput, ReportError> {
        let started = Instant::now();
        let snapshot = Snapshot::from_path(&self.config.snapshot_path())?;

        let report = self.build_report(&snapshot, now);
        let dir = self.config.output.dir.clone();
        let output = self.write_outputs(&report, &snapshot, &dir)?;

        metrics::record_run_duration(started.elapsed().as_secs_f64());
        info!(
            files = output.files.len(),
            dir = %dir.display(),
            "Report written"
        );

        Ok(output)
    }
}
