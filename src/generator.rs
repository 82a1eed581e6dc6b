//! Layer generation: parse, name, build, publish
//!
//! [`run`] is the boundary of the crate. Every failure along the way is turned
//! into a [`LayerOutcome::Failed`] record; nothing is propagated to the caller.

use crate::builder::LayerBuilder;
use crate::installer::Installer;
use crate::naming::{generate_layer_description, generate_layer_name};
use crate::publish::{LayerPublisher, LayerUpload};
use crate::{parse_packages, Error, Reporter, Result};
use serde::Serialize;

/// Result of a layer generation run, as printed by `--json`
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LayerOutcome {
    Published(PublishedLayer),
    Failed(FailedLayer),
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishedLayer {
    pub success: bool,
    pub layer_arn: String,
    pub layer_name: String,
    pub description: String,
    pub packages: Vec<String>,
    pub python_version: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedLayer {
    pub success: bool,
    pub error: String,
    pub error_type: String,
}

impl LayerOutcome {
    pub fn failed(err: &Error) -> Self {
        LayerOutcome::Failed(FailedLayer {
            success: false,
            error: err.to_string(),
            error_type: err.kind().to_string(),
        })
    }
}

/// Generate and publish a layer, reporting any failure as a [`LayerOutcome::Failed`]
///
/// `connect` creates the publisher. It runs after the package string has been
/// validated and before anything is installed, so configuration problems
/// surface without waiting for a build.
pub fn run<I, P, F>(
    installer: I,
    connect: F,
    reporter: &Reporter,
    packages: &str,
    python_version: &str,
) -> LayerOutcome
where
    I: Installer,
    P: LayerPublisher,
    F: FnOnce(&Reporter) -> Result<P>,
{
    reporter.section("Lambda Layer Generation");

    match create_layer(installer, connect, reporter, packages, python_version) {
        Ok(layer) => LayerOutcome::Published(layer),
        Err(e) => {
            reporter.error(&format!("Layer generation failed: {}", e));
            LayerOutcome::failed(&e)
        }
    }
}

fn create_layer<I, P, F>(
    installer: I,
    connect: F,
    reporter: &Reporter,
    packages_str: &str,
    python_version: &str,
) -> Result<PublishedLayer>
where
    I: Installer,
    P: LayerPublisher,
    F: FnOnce(&Reporter) -> Result<P>,
{
    let packages = parse_packages(packages_str, reporter)?;

    reporter.step("Generating layer metadata");
    let layer_name = generate_layer_name(&packages, reporter);
    let description = generate_layer_description(&packages, python_version, reporter);

    let publisher = connect(reporter)?;

    let builder = LayerBuilder::new(installer, python_version);
    let archive = builder.create_layer_zip(&packages, reporter)?;

    reporter.step("Publishing layer to AWS");
    reporter.detail("Layer name", &layer_name);
    reporter.detail("Python runtime", python_version);
    reporter.detail("Content size", &format!("{:.2} MB", archive.size_mb()));
    reporter.detail("Content SHA256", &archive.sha256());
    reporter.progress("Uploading layer to AWS Lambda", None);

    let published = publisher
        .publish(&LayerUpload {
            name: &layer_name,
            description: &description,
            zip: &archive.bytes,
            runtime: python_version,
        })
        .inspect_err(|e| tracing::debug!("Publish failed ({}): {}", e.kind(), e))?;

    reporter.success("Layer published successfully!");
    reporter.detail("Layer ARN", &published.arn);
    reporter.detail("Layer version", &published.version.to_string());

    reporter.section("Generation Complete");
    reporter.success("🎉 Lambda layer created successfully!");
    reporter.detail("Final layer ARN", &published.arn);
    reporter.detail("Total packages", &packages.len().to_string());
    reporter.detail("Layer size", &format!("{:.2} MB", archive.size_mb()));

    Ok(PublishedLayer {
        success: true,
        layer_arn: published.arn,
        layer_name,
        description,
        packages: packages.iter().map(|p| p.to_string()).collect(),
        python_version: python_version.to_string(),
        region: publisher.region().to_string(),
    })
}
