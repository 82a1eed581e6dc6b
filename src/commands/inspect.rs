use anyhow::{Context, Result};
use layerpack::{Error, LambdaPublisher, LayerArn, Reporter};

pub fn run(arn: &str, json: bool, reporter: &Reporter) -> Result<()> {
    // Validate before touching the network
    let parsed = LayerArn::parse(arn)?;

    // The layer lives in the region its ARN names
    let publisher = match LambdaPublisher::connect_in(&parsed.region, reporter) {
        Ok(publisher) => publisher,
        Err(e @ Error::MissingCredentials) => {
            if !json {
                super::print_credentials_hint();
            }
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    let info = publisher
        .layer_info(arn)
        .with_context(|| format!("Failed to get layer info for {}", parsed))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("Layer {} (version {})", parsed.name, parsed.version);
    println!("  ARN:           {}", info.arn);
    if !info.description.is_empty() {
        println!("  Description:   {}", info.description);
    }
    if !info.created_date.is_empty() {
        println!("  Created:       {}", info.created_date);
    }
    println!("  Runtimes:      {}", info.compatible_runtimes.join(", "));
    println!("  Architectures: {}", info.compatible_architectures.join(", "));
    Ok(())
}
