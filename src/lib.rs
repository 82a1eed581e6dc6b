//! layerpack - Build and publish AWS Lambda layers from Python packages
//!
//! layerpack takes a comma-separated list of pip requirements, installs them
//! into the `python/` layout Lambda expects, strips files a layer does not
//! need and publishes the zipped result as a new layer version:
//!
//! - Package specs with all pip comparison operators (`>=`, `==`, `~=`, ...)
//! - Deterministic layer names and descriptions derived from the packages
//! - Three-pass `pip install --target` sequence with a non-fatal reconcile pass
//! - Conservative pruning of bytecode, metadata and test directories
//! - Publishing for `x86_64` and `arm64` with categorized API errors
//!
//! # Examples
//!
//! ```no_run
//! use layerpack::{generator, LambdaPublisher, PipInstaller, Reporter};
//!
//! let reporter = Reporter::human();
//! let outcome = generator::run(
//!     PipInstaller::default(),
//!     LambdaPublisher::connect,
//!     &reporter,
//!     "boto3>=1.26.1,requests==2.28.0",
//!     "python3.10",
//! );
//! println!("{}", serde_json::to_string_pretty(&outcome).unwrap());
//! ```
//!
//! # Modules
//!
//! - [`package`] - Parse package specifications
//! - [`naming`] - Layer names and descriptions
//! - [`installer`] - Installer trait and the `pip` implementation
//! - [`cleanup`] - Prune unneeded files from the staged layer
//! - [`archive`] - Zip the staged layer
//! - [`builder`] - Build a layer archive end to end
//! - [`publish`] - Publish layers to AWS Lambda
//! - [`generator`] - Run the whole pipeline and report the outcome
//! - [`env`] - `.env` loading and region resolution
//! - [`config`] - User configuration
//! - [`reporter`] - Progress output
//! - [`error`] - Error types and result handling

pub mod archive;
pub mod builder;
pub mod cleanup;
pub mod config;
pub mod env;
pub mod error;
pub mod generator;
pub mod installer;
pub mod naming;
pub mod package;
pub mod publish;
pub mod reporter;

pub use archive::LayerArchive;
pub use builder::LayerBuilder;
pub use config::Config;
pub use error::{Error, Result};
pub use generator::LayerOutcome;
pub use installer::{InstallPass, Installer, PipInstaller};
pub use naming::{generate_layer_description, generate_layer_name};
pub use package::{parse_packages, PackageSpec};
pub use publish::{
    LambdaPublisher, LayerArn, LayerInfo, LayerPublisher, LayerUpload, PublishedVersion,
};
pub use reporter::Reporter;
