use crate::export::ExporterRegistry;
use crate::lock::{parse_lock, parse_manifest, GraphBuilder};
use crate::metadata::MetadataEnricher;
use crate::model::Normalizer;
use crate::ports::inbound::{ExportRequest, ExportResponse, SbomExportPort};
use crate::ports::outbound::{
    LockfileReader, ManifestReader, MetadataSource, ProgressReporter,
};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::path::Path;
use std::sync::Arc;

/// ExportPipeline - Core use case driving one export run
///
/// Orchestrates the full pipeline with generic dependency injection for
/// all infrastructure dependencies: read the lock description and
/// manifest, build the dependency graph, enrich it with metadata,
/// normalize it into the intermediate document, and export it through
/// the registry.
///
/// # Type Parameters
/// * `LR` - LockfileReader implementation
/// * `MR` - ManifestReader implementation
/// * `PR` - ProgressReporter implementation
pub struct ExportPipeline<LR, MR, PR> {
    lockfile_reader: LR,
    manifest_reader: MR,
    metadata_sources: Vec<Arc<dyn MetadataSource>>,
    progress_reporter: PR,
    registry: ExporterRegistry,
}

impl<LR, MR, PR> ExportPipeline<LR, MR, PR>
where
    LR: LockfileReader,
    MR: ManifestReader,
    PR: ProgressReporter,
{
    /// Creates a new ExportPipeline with injected dependencies.
    ///
    /// `metadata_sources` are consulted in precedence order; an empty
    /// list skips enrichment entirely.
    pub fn new(
        lockfile_reader: LR,
        manifest_reader: MR,
        metadata_sources: Vec<Arc<dyn MetadataSource>>,
        progress_reporter: PR,
    ) -> Self {
        Self {
            lockfile_reader,
            manifest_reader,
            metadata_sources,
            progress_reporter,
            registry: ExporterRegistry::new(),
        }
    }

    async fn run(&self, request: &ExportRequest) -> Result<Vec<u8>> {
        self.progress_reporter.report(&format!(
            "📖 Loading pdm.lock from: {}",
            request.project_path.display()
        ));
        let lock_content = self.lockfile_reader.read_lockfile(&request.project_path)?;
        let manifest_content = self.manifest_reader.read_manifest(&request.project_path)?;

        let lock = parse_lock(&lock_content)?;
        let manifest = parse_manifest(&manifest_content)?;
        let mut graph = GraphBuilder::new(&manifest, &lock).build()?;
        self.progress_reporter.report(&format!(
            "✅ Resolved {} package(s), {} dependency edge(s)",
            graph.package_count(),
            graph.edge_count()
        ));
        if !graph.cycles().is_empty() {
            self.progress_reporter.report_error(&format!(
                "⚠️  {} dependency cycle(s) detected in the lock data",
                graph.cycles().len()
            ));
        }

        if !self.metadata_sources.is_empty() {
            let enricher = MetadataEnricher::new(self.metadata_sources.clone());
            let report = enricher
                .enrich(&mut graph, &self.progress_reporter)
                .await?;
            if !report.coverage_complete() {
                self.progress_reporter.report_error(&format!(
                    "⚠️  No metadata found for {} package(s)",
                    report.missing.len() + report.timed_out.len()
                ));
            }
        }

        let document = Normalizer::new(&graph, &manifest)
            .include_dev(request.include_dev)
            .normalize();

        let version = request
            .version
            .unwrap_or_else(|| self.registry.default_version(request.family));
        self.progress_reporter.report(&format!(
            "📦 Exporting {} {} ({})",
            request.family,
            version,
            request
                .syntax
                .map(|s| s.label())
                .unwrap_or("default syntax")
        ));
        self.registry
            .export(&document, request.family, Some(version), request.syntax)
    }
}

#[async_trait::async_trait]
impl<LR, MR, PR> SbomExportPort for ExportPipeline<LR, MR, PR>
where
    LR: LockfileReader + Send + Sync,
    MR: ManifestReader + Send + Sync,
    PR: ProgressReporter,
{
    async fn export(&self, request: ExportRequest) -> Result<ExportResponse> {
        self.validate_project_path(&request.project_path)?;
        let content = self.run(&request).await?;
        Ok(ExportResponse::new(content))
    }

    fn validate_project_path(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(SbomError::InvalidProjectPath {
                path: path.to_path_buf(),
                reason: "the path does not exist".to_string(),
            }
            .into());
        }
        if !path.is_dir() {
            return Err(SbomError::InvalidProjectPath {
                path: path.to_path_buf(),
                reason: "the path is not a directory".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
