use super::print_json;
use cloudspan_driver::DriverRegistry;
use serde_json::{Map, Value, json};

pub fn handle(registry: &DriverRegistry) -> anyhow::Result<()> {
    let drivers: Vec<Value> = registry
        .iter()
        .map(|driver| {
            let capability: Map<String, Value> = driver
                .capability()
                .iter()
                .map(|(kind, supported)| (kind.handler_name().to_string(), json!(supported)))
                .collect();
            json!({
                "name": driver.name(),
                "version": driver.driver_version(),
                "capability": capability,
            })
        })
        .collect();
    print_json(&drivers)
}
