//! pdm-sbom - SBOM generation tool for PDM projects
//!
//! Renders a PDM project's lock description (`pdm.lock` plus
//! `pyproject.toml`) as a standardized bill-of-materials document:
//! CycloneDX 1.0-1.5, SPDX 1.0-2.3, SPDX 3.0 or JFrog BuildInfo, in the
//! syntaxes each version supports.
//!
//! The pipeline runs in fixed stages: the lock data becomes a
//! deduplicated, cycle-safe dependency graph ([`lock`]), metadata
//! sources decorate the graph's nodes ([`metadata`]), the graph is
//! normalized into a format-neutral intermediate document ([`model`]),
//! and a format driver maps that document onto the requested schema
//! version before a syntax codec renders the bytes ([`export`]).
//!
//! The crate follows a hexagonal layout: [`ports`] defines the
//! interfaces, [`adapters`] the infrastructure implementations, and
//! [`pipeline`] wires them into the export use case.

pub mod adapters;
pub mod cli;
pub mod export;
pub mod lock;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod ports;
pub mod shared;

/// Commonly used types, re-exported for adapters, tests and embedders
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::metadata::{
        CachingMetadataSource, DeclaredMetadataSource, DistInfoMetadataSource,
    };
    pub use crate::export::{ExporterRegistry, SchemaFamily, SpecVersion, Syntax};
    pub use crate::lock::{parse_lock, parse_manifest, DependencyGraph, GraphBuilder};
    pub use crate::metadata::{MetadataEnricher, PackageMetadata};
    pub use crate::model::{IntermediateDocument, Normalizer};
    pub use crate::pipeline::ExportPipeline;
    pub use crate::ports::inbound::{ExportRequest, ExportResponse, SbomExportPort};
    pub use crate::ports::outbound::{
        LockfileReader, ManifestReader, MetadataSource, OutputPresenter, ProgressReporter,
    };
    pub use crate::shared::error::{ExitCode, SbomError};
    pub use crate::shared::Result;
}
