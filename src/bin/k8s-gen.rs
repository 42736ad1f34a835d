//! Prints Kubernetes manifests for the file manager to stdout.
//!
//! Configure with IMAGE, NAMESPACE, APP_NAME, STORAGE, STORAGE_CLASS and PORT.

use file_manager::deploy::ManifestConfig;
use std::io::Write;

fn main() {
    env_logger::init();

    let config = match ManifestConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid manifest configuration: {}", e);
            std::process::exit(2);
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = stdout.write_all(config.render().as_bytes()) {
        log::error!("Failed to write manifests: {}", e);
        std::process::exit(1);
    }
}
