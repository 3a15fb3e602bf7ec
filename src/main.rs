use owo_colors::OwoColorize;
use pdm_sbom::adapters::outbound::console::StderrProgressReporter;
use pdm_sbom::adapters::outbound::filesystem::{
    FileSystemReader, FileSystemWriter, StdoutPresenter,
};
use pdm_sbom::adapters::outbound::metadata::{
    CachingMetadataSource, DeclaredMetadataSource, DistInfoMetadataSource,
};
use pdm_sbom::cli::Args;
use pdm_sbom::lock::parse_manifest;
use pdm_sbom::pipeline::ExportPipeline;
use pdm_sbom::ports::inbound::{ExportRequest, SbomExportPort};
use pdm_sbom::ports::outbound::{ManifestReader, MetadataSource, OutputPresenter};
use pdm_sbom::shared::error::{ExitCode, SbomError};
use pdm_sbom::shared::Result;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!();
        eprintln!("{}", "❌ An error occurred:".red().bold());
        eprintln!();
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!();
            eprintln!("Caused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(exit_code_for(&e).as_i32());
    }
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    match error.downcast_ref::<SbomError>() {
        Some(SbomError::UnsupportedVersion { .. })
        | Some(SbomError::UnsupportedSyntax { .. })
        | Some(SbomError::InvalidProjectPath { .. }) => ExitCode::InvalidArguments,
        Some(_) => ExitCode::GenerationFailed,
        None => ExitCode::ApplicationError,
    }
}

async fn run() -> Result<()> {
    let args = Args::parse_args();

    let project_path = args.path.unwrap_or_else(|| PathBuf::from("."));

    // Dependency injection: file system in, stderr progress, declared
    // overrides ahead of dist-info metadata behind a cache
    let mut metadata_sources: Vec<Arc<dyn MetadataSource>> = Vec::new();
    if let Ok(content) = FileSystemReader::new().read_manifest(&project_path) {
        if let Ok(manifest) = parse_manifest(&content) {
            if !manifest.metadata_overrides.is_empty() {
                metadata_sources.push(Arc::new(DeclaredMetadataSource::new(
                    manifest.metadata_overrides,
                )));
            }
        }
    }
    if let Some(environment) = args.environment {
        metadata_sources.push(Arc::new(CachingMetadataSource::new(
            DistInfoMetadataSource::new(environment),
        )));
    }

    let pipeline = ExportPipeline::new(
        FileSystemReader::new(),
        FileSystemReader::new(),
        metadata_sources,
        StderrProgressReporter::new(),
    );

    let request = ExportRequest {
        project_path,
        family: args.format,
        version: args.spec_version,
        syntax: args.syntax,
        include_dev: !args.no_dev,
    };
    let response = pipeline.export(request).await?;

    let presenter: Box<dyn OutputPresenter> = match args.output {
        Some(output_path) => Box::new(FileSystemWriter::new(output_path)),
        None => Box::new(StdoutPresenter::new()),
    };
    presenter.present(&response.content)?;

    Ok(())
}
