//! Pipeline driver
//!
//! Owns every registry for the duration of one run and moves through
//! `Start -> Streaming -> Aggregating -> Reconciling -> Serializing -> Done`.
//! Reconciling is skipped when geocoding is inactive. A stream failure moves
//! the run to `Failed` before anything is written.

use crate::app::models::PipelineStage;
use crate::app::services::artifact_writer::ArtifactWriter;
use crate::app::services::charge_csv_parser::{ChargeCsvReader, normalize_record, normalize_row};
use crate::app::services::charge_ledger::ChargeLedger;
use crate::app::services::diagnostics::DiagnosticLog;
use crate::app::services::drg_catalog::DrgCatalog;
use crate::app::services::geocoder::{
    GeocodeService, GeocodingReconciler, MapQuestClient, ReconcileSummary,
};
use crate::app::services::provider_registry::ProviderRegistry;
use crate::app::services::stats_aggregator::StatsAggregator;
use crate::config::Config;
use crate::constants::artifacts;
use crate::Result;
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Rows between spinner refreshes
const PROGRESS_INTERVAL: usize = 1_000;

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub stage: PipelineStage,
    /// Data rows streamed, header excluded
    pub rows_streamed: usize,
    pub drg_count: usize,
    pub provider_count: usize,
    pub charge_count: usize,
    pub stat_group_count: usize,
    pub artifacts_written: Vec<PathBuf>,
    /// Present when the reconciling stage ran
    pub geocoding: Option<ReconcileSummary>,
    pub diagnostic_counts: BTreeMap<&'static str, usize>,
    pub elapsed_secs: f64,
    #[serde(skip)]
    pub diagnostics: DiagnosticLog,
}

/// One run of the charge conversion
pub struct Pipeline {
    config: Config,
    stage: PipelineStage,
    header: Option<StringRecord>,
    rows_streamed: usize,
    drgs: DrgCatalog,
    providers: ProviderRegistry,
    charges: ChargeLedger,
    stats: StatsAggregator,
    diagnostics: DiagnosticLog,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        let stats = StatsAggregator::new(config.processing.state_filter.clone());
        Self {
            config,
            stage: PipelineStage::Start,
            header: None,
            rows_streamed: 0,
            drgs: DrgCatalog::new(),
            providers: ProviderRegistry::new(),
            charges: ChargeLedger::new(),
            stats,
            diagnostics: DiagnosticLog::new(),
            show_progress: false,
        }
    }

    /// Show a spinner on stderr while streaming
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Header fields captured from row 0
    pub fn header(&self) -> Option<&StringRecord> {
        self.header.as_ref()
    }

    pub fn drgs(&self) -> &DrgCatalog {
        &self.drgs
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn charges(&self) -> &ChargeLedger {
        &self.charges
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    /// Run against the configured geocoding service
    ///
    /// The HTTP client is only built when geocoding is active, so a missing API
    /// key fails here before any row is read.
    pub async fn run(&mut self) -> Result<PipelineOutcome> {
        if self.config.geocoding_active() {
            let client = MapQuestClient::new(&self.config.geocoding)?;
            self.execute(Some(client)).await
        } else {
            self.execute(None::<MapQuestClient>).await
        }
    }

    /// Run with a caller-supplied geocoding service
    ///
    /// The service is only used when geocoding is active in the configuration.
    pub async fn run_with_service<S: GeocodeService>(
        &mut self,
        service: S,
    ) -> Result<PipelineOutcome> {
        let service = self.config.geocoding_active().then_some(service);
        self.execute(service).await
    }

    async fn execute<S: GeocodeService>(&mut self, service: Option<S>) -> Result<PipelineOutcome> {
        let started = Instant::now();
        info!(
            "Processing {} (state filter: {})",
            self.config.processing.input_path.display(),
            self.config.processing.state_filter
        );

        self.stage = PipelineStage::Streaming;
        let reader = match ChargeCsvReader::from_path(&self.config.processing.input_path) {
            Ok(reader) => reader,
            Err(e) => return Err(self.fail(e)),
        };
        self.stream(reader)?;

        self.aggregate();

        let geocoding = match service {
            Some(service) => Some(self.reconcile(service).await),
            None => {
                debug!("Geocoding inactive; skipping reconciliation");
                None
            }
        };

        let artifacts_written = self.serialize(geocoding.is_some());

        self.stage = PipelineStage::Done;
        let elapsed = started.elapsed();
        info!(
            "Pipeline finished in {:.2}s with {} diagnostics",
            elapsed.as_secs_f64(),
            self.diagnostics.len()
        );

        Ok(self.outcome(artifacts_written, geocoding, elapsed))
    }

    /// Consume every row of `reader` in file order
    pub fn stream<R: Read>(&mut self, reader: ChargeCsvReader<R>) -> Result<()> {
        self.stage = PipelineStage::Streaming;
        let spinner = self.show_progress.then(create_spinner);
        let source = reader.source_name().to_string();

        for item in reader {
            let (index, record) = match item {
                Ok(item) => item,
                Err(e) => {
                    if let Some(pb) = &spinner {
                        pb.abandon_with_message("Stream failed");
                    }
                    return Err(self.fail(e));
                }
            };

            if index == 0 {
                let header = normalize_record(&record);
                debug!("Captured header with {} fields", header.len());
                self.header = Some(header);
                continue;
            }

            self.process_row(index, &record);

            if let Some(pb) = &spinner {
                if self.rows_streamed % PROGRESS_INTERVAL == 0 {
                    pb.set_message(format!("Streamed {} rows", self.rows_streamed));
                }
            }
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        info!(
            "Streamed {} rows from {}: {} DRGs, {} providers, {} charges",
            self.rows_streamed,
            source,
            self.drgs.len(),
            self.providers.len(),
            self.charges.len()
        );
        Ok(())
    }

    /// Route one data row through the builders
    ///
    /// The DRG code resolves first since both the statistics keys and the charge
    /// fact depend on it. Provider and charge only see rows of the filter state.
    fn process_row(&mut self, index: usize, record: &StringRecord) {
        let row = normalize_row(record);
        self.rows_streamed += 1;

        let drg_code = self
            .drgs
            .ingest(&row.drg_definition, index, &mut self.diagnostics);

        self.stats.ingest(&drg_code, &row);

        if row.is_in_state(&self.config.processing.state_filter) {
            let provider_id = self.providers.ingest(&row, index, &mut self.diagnostics);
            self.charges
                .ingest(&drg_code, &provider_id, &row, index, &mut self.diagnostics);
        }
    }

    pub fn aggregate(&mut self) {
        self.stage = PipelineStage::Aggregating;
        self.stats.finalize();
    }

    /// Geocode the provider registry; resolves once every batch settles
    pub async fn reconcile<S: GeocodeService>(&mut self, service: S) -> ReconcileSummary {
        self.stage = PipelineStage::Reconciling;
        let reconciler = GeocodingReconciler::new(
            service,
            self.config.geocoding.batch_size,
            self.config.geocoding.all_overrides(),
        );
        reconciler
            .reconcile(&mut self.providers, &mut self.diagnostics)
            .await
    }

    /// Write each artifact independently and return the ones that landed
    pub fn serialize(&mut self, include_providers: bool) -> Vec<PathBuf> {
        self.stage = PipelineStage::Serializing;

        if let Err(e) = self.config.ensure_output_directory() {
            error!("{}", e);
        }

        let mut writer = ArtifactWriter::new(&self.config.processing.output_path);
        writer.write_or_report(artifacts::DRGS, &self.drgs, &mut self.diagnostics);
        writer.write_or_report(artifacts::CHARGES, &self.charges, &mut self.diagnostics);
        if include_providers {
            writer.write_or_report(artifacts::PROVIDERS, &self.providers, &mut self.diagnostics);
        } else {
            debug!("Provider registry not written; reconciliation did not run");
        }
        writer.write_or_report(artifacts::STATS, &self.stats, &mut self.diagnostics);

        writer.into_written()
    }

    fn fail(&mut self, e: crate::Error) -> crate::Error {
        self.stage = PipelineStage::Failed;
        error!("Pipeline failed while streaming: {}", e);
        warn!("No artifacts were written");
        e
    }

    fn outcome(
        &self,
        artifacts_written: Vec<PathBuf>,
        geocoding: Option<ReconcileSummary>,
        elapsed: Duration,
    ) -> PipelineOutcome {
        PipelineOutcome {
            stage: self.stage,
            rows_streamed: self.rows_streamed,
            drg_count: self.drgs.len(),
            provider_count: self.providers.len(),
            charge_count: self.charges.len(),
            stat_group_count: self.stats.group_count(),
            artifacts_written,
            geocoding,
            diagnostic_counts: self
                .diagnostics
                .counts_by_kind()
                .into_iter()
                .map(|(kind, count)| (kind.as_str(), count))
                .collect(),
            elapsed_secs: elapsed.as_secs_f64(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed}] {msg}")
    {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message("Streaming rows");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
