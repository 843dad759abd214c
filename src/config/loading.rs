use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment};

use super::models::Settings;

/// The fixed constants the service runs with when nothing is configured.
fn builder_with_defaults() -> ConfigBuilder<DefaultState> {
    Config::builder()
        .set_default("printer.name", "DS620").unwrap()
        .set_default("vendor.dllpath", "data/CspStat.dll").unwrap()
        .set_default("smtp.host", "localhost").unwrap()
        .set_default("smtp.port", "25").unwrap()
        .set_default("smtp.from", "csp2mail@localhost").unwrap()
        .set_default("smtp.to", "operator@localhost").unwrap()
        .set_default("smtp.username", "").unwrap()
        .set_default("smtp.password", "").unwrap()
        .set_default("monitor.schedule", "5m").unwrap()
        .set_default("monitor.grace", "15s").unwrap()
        .set_default("monitor.lowthresholdpercent", "10.0").unwrap()
}

pub fn load_config() -> Settings {
    // As Rust has no native support for .env files,
    // we use the dotenv_flow crate to import to actual ENV vars.
    let dotenv_path = dotenv_flow::dotenv_flow();
    if dotenv_path.is_ok() {
        println!("Loaded dotenv file: {:?}", dotenv_path.unwrap());
    }

    let config = builder_with_defaults()
        .add_source(Environment::default()
            .prefix("CSP")
            .separator("_")
            .prefix_separator("_")
            .try_parsing(true))
        .build().unwrap();

    config.try_deserialize().unwrap()
}
