use super::PackageMetadata;
use crate::lock::DependencyGraph;
use crate::ports::outbound::{MetadataSource, ProgressReporter};
use crate::shared::Result;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;

/// Degree of parallelism for metadata lookups
const CONCURRENT_LOOKUPS: usize = 8;

/// Default per-lookup deadline
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of an enrichment pass.
///
/// Enrichment never fails the pipeline over missing facts: packages the
/// sources do not know stay bare and are listed here instead.
#[derive(Debug, Default)]
pub struct EnricherReport {
    /// Packages that received metadata
    pub enriched: usize,
    /// Packages no source knew, as `name@version`
    pub missing: Vec<String>,
    /// Packages whose lookup hit the deadline, as `name@version`
    pub timed_out: Vec<String>,
}

impl EnricherReport {
    pub fn coverage_complete(&self) -> bool {
        self.missing.is_empty() && self.timed_out.is_empty()
    }
}

/// MetadataEnricher attaches authorship, license and description facts to
/// graph nodes.
///
/// Sources are consulted in the order given; the first one that knows the
/// package wins, so callers encode precedence (declared overrides before
/// installed distribution metadata) by ordering the source list. Lookups
/// run concurrently with a bounded degree of parallelism and a per-lookup
/// deadline; a deadline hit degrades that package to "no metadata" with a
/// warning rather than failing the pass.
pub struct MetadataEnricher {
    sources: Vec<Arc<dyn MetadataSource>>,
    timeout: Duration,
}

impl MetadataEnricher {
    pub fn new(sources: Vec<Arc<dyn MetadataSource>>) -> Self {
        Self {
            sources,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the enrichment pass over every non-root node.
    ///
    /// # Arguments
    /// * `graph` - The dependency graph to decorate in place
    /// * `progress` - Sink for progress and warning messages
    ///
    /// # Errors
    /// Only infrastructure failures surface as errors; "package unknown"
    /// and deadline hits are reported in the [`EnricherReport`].
    pub async fn enrich(
        &self,
        graph: &mut DependencyGraph,
        progress: &dyn ProgressReporter,
    ) -> Result<EnricherReport> {
        let root = graph.root();
        let targets: Vec<(usize, String, String)> = graph
            .records()
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != root)
            .map(|(index, record)| {
                (index, record.key.name.clone(), record.key.version.clone())
            })
            .collect();

        let total = targets.len();
        progress.report(&format!("🔍 Looking up metadata for {} packages...", total));

        let results: Vec<(usize, String, LookupOutcome)> = stream::iter(targets)
            .map(|(index, name, version)| async move {
                let outcome = self.lookup_with_deadline(&name, &version, progress).await;
                (index, format!("{}@{}", name, version), outcome)
            })
            .buffer_unordered(CONCURRENT_LOOKUPS)
            .collect()
            .await;

        let mut report = EnricherReport::default();
        for (done, (index, label, outcome)) in results.into_iter().enumerate() {
            progress.report_progress(done + 1, total, None);
            match outcome {
                LookupOutcome::Found(metadata) => {
                    report.enriched += 1;
                    graph.attach_metadata(index, metadata);
                }
                LookupOutcome::Missing => report.missing.push(label),
                LookupOutcome::TimedOut => report.timed_out.push(label),
            }
        }
        report.missing.sort();
        report.timed_out.sort();

        progress.report_completion(&format!(
            "✅ Metadata attached for {}/{} packages",
            report.enriched, total
        ));
        Ok(report)
    }

    /// Walks the source list in precedence order under one shared
    /// deadline. A failing source is warned about and skipped so a broken
    /// cache never masks a healthy fallback.
    async fn lookup_with_deadline(
        &self,
        name: &str,
        version: &str,
        progress: &dyn ProgressReporter,
    ) -> LookupOutcome {
        let chain = async {
            for source in &self.sources {
                match source.lookup(name, version).await {
                    Ok(Some(metadata)) => return Some(metadata),
                    Ok(None) => continue,
                    Err(e) => {
                        progress.report_error(&format!(
                            "⚠️  {} lookup failed for {}@{}: {}",
                            source.label(),
                            name,
                            version,
                            e
                        ));
                    }
                }
            }
            None
        };

        match tokio::time::timeout(self.timeout, chain).await {
            Ok(Some(metadata)) => LookupOutcome::Found(metadata),
            Ok(None) => LookupOutcome::Missing,
            Err(_) => {
                progress.report_error(&format!(
                    "⚠️  Metadata lookup for {}@{} timed out after {}s, continuing without it",
                    name,
                    version,
                    self.timeout.as_secs()
                ));
                LookupOutcome::TimedOut
            }
        }
    }
}

enum LookupOutcome {
    Found(PackageMetadata),
    Missing,
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{parse_lock, parse_manifest, GraphBuilder};
    use crate::metadata::Author;
    use async_trait::async_trait;

    struct SilentProgress;

    impl ProgressReporter for SilentProgress {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, _current: usize, _total: usize, _message: Option<&str>) {}
        fn report_error(&self, _message: &str) {}
        fn report_completion(&self, _message: &str) {}
    }

    struct FixedSource {
        package: &'static str,
        metadata: PackageMetadata,
    }

    #[async_trait]
    impl MetadataSource for FixedSource {
        async fn lookup(&self, name: &str, _version: &str) -> Result<Option<PackageMetadata>> {
            if name == self.package {
                Ok(Some(self.metadata.clone()))
            } else {
                Ok(None)
            }
        }

        fn label(&self) -> &str {
            "fixed"
        }
    }

    struct SlowSource;

    #[async_trait]
    impl MetadataSource for SlowSource {
        async fn lookup(&self, _name: &str, _version: &str) -> Result<Option<PackageMetadata>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(None)
        }

        fn label(&self) -> &str {
            "slow"
        }
    }

    fn build_graph() -> DependencyGraph {
        let manifest = parse_manifest(
            r#"
[project]
name = "app"
version = "1.0"
dependencies = ["lib", "other"]
"#,
        )
        .unwrap();
        let lock = parse_lock(
            r#"
[metadata]
lock_version = "4.4.1"

[[package]]
name = "lib"
version = "2.1"

[[package]]
name = "other"
version = "0.9"
"#,
        )
        .unwrap();
        GraphBuilder::new(&manifest, &lock).build().unwrap()
    }

    fn mit_metadata() -> PackageMetadata {
        PackageMetadata {
            authors: vec![Author::new("Jane", None)],
            license: Some("MIT".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let mut graph = build_graph();
        let enricher = MetadataEnricher::new(vec![
            Arc::new(FixedSource {
                package: "lib",
                metadata: mit_metadata(),
            }),
            Arc::new(FixedSource {
                package: "lib",
                metadata: PackageMetadata {
                    license: Some("Apache-2.0".to_string()),
                    ..Default::default()
                },
            }),
        ]);

        let report = enricher.enrich(&mut graph, &SilentProgress).await.unwrap();

        assert_eq!(report.enriched, 1);
        assert_eq!(report.missing, vec!["other@0.9".to_string()]);
        let lib_index = graph
            .records()
            .iter()
            .position(|r| r.key.name == "lib")
            .unwrap();
        assert_eq!(
            graph.metadata(lib_index).unwrap().license.as_deref(),
            Some("MIT")
        );
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_missing() {
        let mut graph = build_graph();
        let enricher = MetadataEnricher::new(vec![Arc::new(SlowSource)])
            .with_timeout(Duration::from_millis(10));

        let report = enricher.enrich(&mut graph, &SilentProgress).await.unwrap();

        assert_eq!(report.enriched, 0);
        assert_eq!(report.timed_out.len(), 2);
        assert!(!report.coverage_complete());
    }

    #[tokio::test]
    async fn test_no_sources_leaves_graph_bare() {
        let mut graph = build_graph();
        let enricher = MetadataEnricher::new(Vec::new());

        let report = enricher.enrich(&mut graph, &SilentProgress).await.unwrap();

        assert_eq!(report.enriched, 0);
        assert_eq!(report.missing.len(), 2);
        assert!(graph.metadata(1).is_none());
    }
}
