//! Layer name and description generation

use crate::{PackageSpec, Reporter};

/// Maximum number of package names folded into a layer name
pub const MAX_NAME_PARTS: usize = 3;

/// Generate a layer name from package names
///
/// A single package gives `layer-<name>`. Several packages are sorted by
/// clean name and the first [`MAX_NAME_PARTS`] are joined with `-`.
pub fn generate_layer_name(packages: &[PackageSpec], reporter: &Reporter) -> String {
    let mut names: Vec<String> = packages.iter().map(PackageSpec::clean_name).collect();

    let layer_name = if names.len() == 1 {
        format!("layer-{}", names[0])
    } else {
        names.sort();
        names.truncate(MAX_NAME_PARTS);
        format!("layer-{}", names.join("-"))
    };

    reporter.detail("Generated layer name", &layer_name);
    layer_name
}

/// Generate a layer description listing packages and the target runtime
pub fn generate_layer_description(
    packages: &[PackageSpec],
    python_version: &str,
    reporter: &Reporter,
) -> String {
    let details: Vec<String> = packages
        .iter()
        .map(|pkg| match pkg.version_for_description() {
            Some(version) => format!("{} {}", pkg.name, version),
            None => pkg.name.clone(),
        })
        .collect();

    let description = format!("Python {} layer with: {}", python_version, details.join(", "));
    reporter.detail("Generated description", &description);
    description
}
