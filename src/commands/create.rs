use anyhow::Result;
use layerpack::{generator, Config, LambdaPublisher, LayerOutcome, PipInstaller, Reporter};

pub fn run(
    packages: String,
    python_version: Option<String>,
    json: bool,
    reporter: &Reporter,
) -> Result<()> {
    let outcome = match Config::load() {
        Ok(config) => {
            let python_version =
                python_version.unwrap_or_else(|| config.layer.default_runtime.clone());
            generator::run(
                PipInstaller::new(&config.installer),
                LambdaPublisher::connect,
                reporter,
                &packages,
                &python_version,
            )
        }
        Err(e) => {
            reporter.error(&format!("Could not load configuration: {}", e));
            LayerOutcome::failed(&e)
        }
    };

    if json {
        // JSON mode reports failures in the document and still exits 0
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        LayerOutcome::Published(layer) => {
            println!();
            println!("🎯 Final Results:");
            println!("✓ Layer created successfully!");
            println!("  Layer Name:  {}", layer.layer_name);
            println!("  Layer ARN:   {}", layer.layer_arn);
            println!("  Description: {}", layer.description);
            println!("  Region:      {}", layer.region);
            println!("  Packages:    {}", layer.packages.join(", "));
            Ok(())
        }
        LayerOutcome::Failed(failed) => {
            if failed.error_type == "MissingCredentialsError" {
                super::print_credentials_hint();
            }
            anyhow::bail!("{}", failed.error)
        }
    }
}
