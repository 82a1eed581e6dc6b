pub mod create;
pub mod inspect;

use layerpack::{env as layer_env, Reporter};

const CREDENTIALS_HINT: &str = "Hint: layerpack uses the standard AWS credential chain.

Options:
  1. Export AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY
  2. Add them to a .env file in the working directory
  3. Configure a profile with `aws configure` and set AWS_PROFILE";

/// Load `.env` from the working directory; failures are only warned about
pub fn load_env(reporter: &Reporter) {
    let loaded = std::env::current_dir()
        .map_err(layerpack::Error::from)
        .and_then(|dir| layer_env::load_env_file(&dir, reporter));
    if let Err(e) = loaded {
        reporter.warning(&format!("Could not load .env file: {}", e));
    }
}

/// Human-mode follow-up for a credentials failure
pub fn print_credentials_hint() {
    eprintln!();
    eprintln!("{}", CREDENTIALS_HINT);
}
