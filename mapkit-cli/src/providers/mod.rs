//! Providers compiled into the binary.

use mapkit_exec::Provider;

pub mod address;
pub mod weather;

pub struct Bundled {
    pub provider: Provider,
    /// Named base URLs; the first is the default service.
    pub services: &'static [(&'static str, &'static str)],
    /// Query parameters that carry credentials for this API.
    pub secret_query_params: &'static [&'static str],
}

pub fn bundled() -> Vec<Bundled> {
    vec![address::bundle(), weather::bundle()]
}

pub fn find(name: &str) -> Option<Bundled> {
    bundled().into_iter().find(|b| b.provider.name() == name)
}
