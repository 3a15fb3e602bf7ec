/// Integration tests for the export pipeline
mod test_utilities;

use pdm_sbom::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use test_utilities::mocks::*;

const MANIFEST: &str = r#"
[project]
name = "app"
version = "1.0"
dependencies = ["lib"]
"#;

const LOCK: &str = r#"
[metadata]
groups = ["default", "dev"]
lock_version = "4.4.1"

[[package]]
name = "lib"
version = "2.1"
groups = ["default"]
summary = "A helpful library"
dependencies = ["testtool"]

[[package]]
name = "testtool"
version = "0.3"
groups = ["dev"]
"#;

fn pipeline(
    lock: &str,
    manifest: &str,
    sources: Vec<Arc<dyn MetadataSource>>,
) -> ExportPipeline<MockLockfileReader, MockManifestReader, MockProgressReporter> {
    ExportPipeline::new(
        MockLockfileReader::new(lock),
        MockManifestReader::new(manifest),
        sources,
        MockProgressReporter::new(),
    )
}

fn request(family: SchemaFamily, version: Option<SpecVersion>, syntax: Option<Syntax>) -> ExportRequest {
    ExportRequest {
        project_path: PathBuf::from("."),
        family,
        version,
        syntax,
        include_dev: true,
    }
}

#[tokio::test]
async fn test_cyclonedx_1_4_example() {
    let sources: Vec<Arc<dyn MetadataSource>> = vec![Arc::new(
        MockMetadataSource::new().with_package("lib", "2.1", "MIT", "A helpful library"),
    )];
    let pipeline = pipeline(LOCK, MANIFEST, sources);

    let response = pipeline
        .export(request(
            SchemaFamily::CycloneDx,
            Some(SpecVersion::new(1, 4)),
            Some(Syntax::Json),
        ))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&response.content).unwrap();

    assert_eq!(value["specVersion"], "1.4");
    assert_eq!(value["metadata"]["component"]["name"], "app");

    // three components total: the subject plus two dependencies
    let components = value["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);

    // each listed component carries exactly one outgoing or incoming edge
    let dependencies = value["dependencies"].as_array().unwrap();
    let app = dependencies
        .iter()
        .find(|d| d["ref"] == "pkg:pypi/app@1.0")
        .unwrap();
    assert_eq!(app["dependsOn"].as_array().unwrap().len(), 1);
    let lib = dependencies
        .iter()
        .find(|d| d["ref"] == "pkg:pypi/lib@2.1")
        .unwrap();
    assert_eq!(lib["dependsOn"].as_array().unwrap().len(), 1);

    // testtool is only reachable through the dev group
    let testtool = components.iter().find(|c| c["name"] == "testtool").unwrap();
    assert_eq!(testtool["scope"], "excluded");
    let lib = components.iter().find(|c| c["name"] == "lib").unwrap();
    assert_eq!(lib["licenses"][0]["expression"], "MIT");
}

#[tokio::test]
async fn test_no_dev_excludes_dev_only_components() {
    let pipeline = pipeline(LOCK, MANIFEST, Vec::new());

    let mut req = request(SchemaFamily::CycloneDx, None, Some(Syntax::Json));
    req.include_dev = false;
    let response = pipeline.export(req).await.unwrap();
    let value: serde_json::Value = serde_json::from_slice(&response.content).unwrap();

    let components = value["components"].as_array().unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0]["name"], "lib");
}

#[tokio::test]
async fn test_unsupported_version_fails_with_no_output() {
    let pipeline = pipeline(LOCK, MANIFEST, Vec::new());

    let result = pipeline
        .export(request(
            SchemaFamily::CycloneDx,
            Some(SpecVersion::new(9, 9)),
            None,
        ))
        .await;

    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("9.9"));
    assert!(message.contains("not supported"));
}

#[tokio::test]
async fn test_unsupported_syntax_fails() {
    let pipeline = pipeline(LOCK, MANIFEST, Vec::new());

    let result = pipeline
        .export(request(
            SchemaFamily::CycloneDx,
            Some(SpecVersion::new(1, 0)),
            Some(Syntax::Json),
        ))
        .await;

    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("json"));
}

#[tokio::test]
async fn test_dangling_reference_fails_with_parent_and_target() {
    let lock = r#"
[metadata]
lock_version = "4.4.1"

[[package]]
name = "lib"
version = "2.1"
dependencies = ["ghost"]
"#;
    let pipeline = pipeline(lock, MANIFEST, Vec::new());

    let result = pipeline
        .export(request(SchemaFamily::CycloneDx, None, None))
        .await;

    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("lib@2.1"));
    assert!(message.contains("ghost"));
}

#[tokio::test]
async fn test_cyclic_lock_terminates_and_lists_each_component_once() {
    let lock = r#"
[metadata]
lock_version = "4.4.1"

[[package]]
name = "lib"
version = "2.1"
dependencies = ["extra-helper"]

[[package]]
name = "extra-helper"
version = "0.9"
dependencies = ["lib"]
"#;
    let pipeline = pipeline(lock, MANIFEST, Vec::new());

    let response = pipeline
        .export(request(SchemaFamily::CycloneDx, None, Some(Syntax::Json)))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&response.content).unwrap();

    let components = value["components"].as_array().unwrap();
    assert_eq!(components.len(), 2);
    let names: Vec<&str> = components
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["extra-helper", "lib"]);
}

#[tokio::test]
async fn test_determinism_across_runs() {
    // timestamps and serial numbers differ per run; everything else is
    // ordering-stable
    let export = || async {
        let sources: Vec<Arc<dyn MetadataSource>> = vec![Arc::new(
            MockMetadataSource::new().with_package("lib", "2.1", "MIT", "A helpful library"),
        )];
        let pipeline = pipeline(LOCK, MANIFEST, sources);
        let response = pipeline
            .export(request(SchemaFamily::CycloneDx, None, Some(Syntax::Json)))
            .await
            .unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&response.content).unwrap();
        value.as_object_mut().unwrap().remove("serialNumber");
        value["metadata"].as_object_mut().unwrap().remove("timestamp");
        value
    };

    assert_eq!(export().await, export().await);
}

#[tokio::test]
async fn test_invalid_project_path_is_rejected() {
    let pipeline = pipeline(LOCK, MANIFEST, Vec::new());

    let mut req = request(SchemaFamily::CycloneDx, None, None);
    req.project_path = PathBuf::from("/nonexistent/path");
    let result = pipeline.export(req).await;

    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("/nonexistent/path"));
}

#[tokio::test]
async fn test_progress_messages_are_reported() {
    let progress = MockProgressReporter::new();
    let pipeline = ExportPipeline::new(
        MockLockfileReader::new(LOCK),
        MockManifestReader::new(MANIFEST),
        Vec::new(),
        progress.clone(),
    );

    pipeline
        .export(request(SchemaFamily::Spdx, None, None))
        .await
        .unwrap();

    let messages = progress.messages();
    assert!(messages.iter().any(|m| m.contains("📖 Loading pdm.lock")));
    assert!(messages
        .iter()
        .any(|m| m.contains("✅ Resolved 2 package(s)")));
    assert!(messages.iter().any(|m| m.contains("📦 Exporting spdx 2.3")));
}

#[tokio::test]
async fn test_version_conflict_is_flagged() {
    let lock = r#"
[metadata]
lock_version = "4.4.1"

[[package]]
name = "lib"
version = "2.1"

[[package]]
name = "lib"
version = "3.0"
"#;
    let pipeline = pipeline(lock, MANIFEST, Vec::new());

    let result = pipeline
        .export(request(SchemaFamily::CycloneDx, None, None))
        .await;

    let message = format!("{}", result.unwrap_err());
    assert!(message.contains("conflicting versions"));
}
