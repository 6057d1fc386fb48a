use std::collections::BTreeMap;

use serde::Serialize;

use crate::exit_codes;
use crate::output::print_result;
use crate::providers;
use crate::OutputArgs;

#[derive(Serialize)]
struct ProviderEntry {
    provider: String,
    use_cases: Vec<String>,
    services: BTreeMap<String, String>,
}

pub fn list_cmd(output: OutputArgs) -> i32 {
    let entries: Vec<ProviderEntry> = providers::bundled()
        .into_iter()
        .map(|b| ProviderEntry {
            provider: b.provider.name().to_string(),
            use_cases: b.provider.use_cases().map(String::from).collect(),
            services: b
                .services
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .collect();
    print_result(output.format, output.quiet, &entries);
    exit_codes::SUCCESS
}
