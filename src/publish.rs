//! Publishing layers to AWS Lambda
//!
//! [`LayerPublisher`] is the seam the generator talks to. [`LambdaPublisher`]
//! implements it on top of `aws-sdk-lambda`; it owns a current-thread tokio
//! runtime and blocks on each SDK call, so callers stay synchronous.
//!
//! # Examples
//!
//! ```no_run
//! use layerpack::{LambdaPublisher, LayerPublisher, LayerUpload, Reporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let reporter = Reporter::human();
//! let publisher = LambdaPublisher::connect(&reporter)?;
//!
//! let zip = std::fs::read("layer.zip")?;
//! let published = publisher.publish(&LayerUpload {
//!     name: "layer-requests",
//!     description: "Python python3.10 layer with: requests",
//!     zip: &zip,
//!     runtime: "python3.10",
//! })?;
//! println!("{} (version {})", published.arn, published.version);
//! # Ok(())
//! # }
//! ```

use crate::{env, Error, Reporter, Result};
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_lambda::config::Region;
use aws_sdk_lambda::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::{Architecture, LayerVersionContentInput, Runtime};
use serde::Serialize;
use std::fmt;

/// Architectures every published layer declares
pub const COMPATIBLE_ARCHITECTURES: &[&str] = &["x86_64", "arm64"];

/// Everything needed to publish one layer version
#[derive(Debug, Clone, Copy)]
pub struct LayerUpload<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub zip: &'a [u8],
    pub runtime: &'a str,
}

/// A layer version as returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedVersion {
    pub arn: String,
    pub version: i64,
}

/// Details of an existing layer version
#[derive(Debug, Clone, Serialize)]
pub struct LayerInfo {
    pub arn: String,
    pub description: String,
    pub created_date: String,
    pub compatible_runtimes: Vec<String>,
    pub compatible_architectures: Vec<String>,
}

/// Registers layer archives with the platform
pub trait LayerPublisher {
    /// Region layers are published to
    fn region(&self) -> &str;

    fn publish(&self, upload: &LayerUpload<'_>) -> Result<PublishedVersion>;
}

impl<T: LayerPublisher + ?Sized> LayerPublisher for &T {
    fn region(&self) -> &str {
        (**self).region()
    }

    fn publish(&self, upload: &LayerUpload<'_>) -> Result<PublishedVersion> {
        (**self).publish(upload)
    }
}

/// Map a Lambda service error code to an error category
pub fn classify_service_error(code: &str, message: &str) -> Error {
    match code {
        "InvalidParameterValueException" => Error::InvalidParameter(message.to_string()),
        "TooManyRequestsException" => Error::RateLimit,
        "ResourceConflictException" => Error::Conflict(message.to_string()),
        _ => Error::Publish {
            code: code.to_string(),
            message: message.to_string(),
        },
    }
}

fn sdk_error<E, R>(err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: fmt::Debug,
{
    match err.as_service_error() {
        Some(service) => {
            let code = service.code().unwrap_or("Unknown");
            tracing::debug!("Lambda API error {}: {:?}", code, service.message());
            classify_service_error(code, service.message().unwrap_or_default())
        }
        None => Error::Publish {
            code: "Unknown".to_string(),
            message: DisplayErrorContext(&err).to_string(),
        },
    }
}

/// Parsed `arn:<partition>:lambda:<region>:<account>:layer:<name>:<version>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerArn {
    pub partition: String,
    pub region: String,
    pub account: String,
    pub name: String,
    pub version: i64,
}

impl LayerArn {
    pub fn parse(arn: &str) -> Result<Self> {
        let invalid = || Error::InvalidArn(arn.to_string());

        let parts: Vec<&str> = arn.trim().split(':').collect();
        if parts.len() != 8 || parts[0] != "arn" || parts[2] != "lambda" || parts[5] != "layer" {
            return Err(invalid());
        }
        if [parts[1], parts[3], parts[4], parts[6]].iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }

        let version: i64 = parts[7].parse().map_err(|_| invalid())?;
        if version < 1 {
            return Err(invalid());
        }

        Ok(Self {
            partition: parts[1].to_string(),
            region: parts[3].to_string(),
            account: parts[4].to_string(),
            name: parts[6].to_string(),
            version,
        })
    }

    /// ARN of the layer itself, without the version
    pub fn layer_arn(&self) -> String {
        format!(
            "arn:{}:lambda:{}:{}:layer:{}",
            self.partition, self.region, self.account, self.name
        )
    }
}

impl fmt::Display for LayerArn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.layer_arn(), self.version)
    }
}

/// [`LayerPublisher`] backed by the AWS Lambda API
pub struct LambdaPublisher {
    runtime: tokio::runtime::Runtime,
    client: aws_sdk_lambda::Client,
    region: String,
}

impl LambdaPublisher {
    /// Connect using the region from the environment and the ambient credential chain
    ///
    /// Fails with [`Error::MissingRegion`] or [`Error::MissingCredentials`]
    /// before any API call is attempted.
    pub fn connect(reporter: &Reporter) -> Result<Self> {
        reporter.step("Initializing AWS client");

        let region = env::resolve_region().inspect_err(|_| {
            reporter.error("AWS region not found in environment variables");
        })?;
        Self::init(region, reporter)
    }

    /// Connect to an explicit region, e.g. the one named in a layer ARN
    pub fn connect_in(region: &str, reporter: &Reporter) -> Result<Self> {
        reporter.step("Initializing AWS client");
        Self::init(region.to_string(), reporter)
    }

    fn init(region: String, reporter: &Reporter) -> Result<Self> {
        reporter.detail("AWS Region", &region);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        reporter.progress("Connecting to AWS Lambda service", None);
        let sdk_config = runtime.block_on(
            aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .load(),
        );

        let provider = sdk_config
            .credentials_provider()
            .ok_or(Error::MissingCredentials)?;
        if let Err(e) = runtime.block_on(provider.provide_credentials()) {
            tracing::debug!("Credential chain failed: {}", DisplayErrorContext(&e));
            reporter.error("AWS credentials not found in environment");
            return Err(Error::MissingCredentials);
        }

        let client = aws_sdk_lambda::Client::new(&sdk_config);
        reporter.success(&format!("AWS client initialized for region: {}", region));

        Ok(Self {
            runtime,
            client,
            region,
        })
    }

    /// Look up an existing layer version by its ARN
    pub fn layer_info(&self, arn: &str) -> Result<LayerInfo> {
        let parsed = LayerArn::parse(arn)?;

        let output = self
            .runtime
            .block_on(
                self.client
                    .get_layer_version()
                    .layer_name(parsed.layer_arn())
                    .version_number(parsed.version)
                    .send(),
            )
            .map_err(sdk_error)?;

        Ok(LayerInfo {
            arn: output
                .layer_version_arn()
                .map(str::to_string)
                .unwrap_or_else(|| parsed.to_string()),
            description: output.description().unwrap_or_default().to_string(),
            created_date: output.created_date().unwrap_or_default().to_string(),
            compatible_runtimes: output
                .compatible_runtimes()
                .iter()
                .map(|r| r.as_str().to_string())
                .collect(),
            compatible_architectures: output
                .compatible_architectures()
                .iter()
                .map(|a| a.as_str().to_string())
                .collect(),
        })
    }
}

impl LayerPublisher for LambdaPublisher {
    fn region(&self) -> &str {
        &self.region
    }

    fn publish(&self, upload: &LayerUpload<'_>) -> Result<PublishedVersion> {
        let content = LayerVersionContentInput::builder()
            .zip_file(Blob::new(upload.zip.to_vec()))
            .build();

        let mut request = self
            .client
            .publish_layer_version()
            .layer_name(upload.name)
            .description(upload.description)
            .content(content)
            .compatible_runtimes(Runtime::from(upload.runtime));
        for arch in COMPATIBLE_ARCHITECTURES {
            request = request.compatible_architectures(Architecture::from(*arch));
        }

        let output = self.runtime.block_on(request.send()).map_err(sdk_error)?;

        let arn = output
            .layer_version_arn()
            .ok_or_else(|| Error::Publish {
                code: "MissingLayerVersionArn".to_string(),
                message: "PublishLayerVersion response did not include an ARN".to_string(),
            })?
            .to_string();

        Ok(PublishedVersion {
            arn,
            version: output.version(),
        })
    }
}
