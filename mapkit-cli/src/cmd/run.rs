use std::sync::Arc;

use mapkit_core::Invocation;
use mapkit_exec::executor::{HttpClient, ReqwestHttpClient, Report};
use mapkit_exec::{RetryingHttpClient, Runtime};

use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::providers;
use crate::{InvocationArgs, OutputArgs, RetryArgs, RuntimeArgs};

use super::config::{
    build_event_sink, build_retry_config, build_runtime_config, build_url_resolver,
    load_document, merge_set_inputs,
};

pub async fn run_cmd(
    provider_name: &str,
    use_case: &str,
    invocation: InvocationArgs,
    output: OutputArgs,
    runtime: RuntimeArgs,
    retry: RetryArgs,
) -> i32 {
    let Some(bundle) = providers::find(provider_name) else {
        print_error(
            output.format,
            output.quiet,
            &format!("unknown provider `{provider_name}`"),
        );
        return exit_codes::INVALID_INPUT;
    };

    let documents = load_document(invocation.input.as_deref(), "input").and_then(|input| {
        let parameters = load_document(invocation.parameters.as_deref(), "parameters")?;
        let security = load_document(invocation.security.as_deref(), "security")?;
        Ok((input, parameters, security))
    });
    let (mut input, parameters, security) = match documents {
        Ok(docs) => docs,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::INVALID_INPUT;
        }
    };
    merge_set_inputs(&mut input, &invocation.set_inputs);

    let urls = match build_url_resolver(bundle.services, &runtime.services) {
        Ok(r) => r,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::INVALID_INPUT;
        }
    };
    let events = match build_event_sink(&runtime.events) {
        Ok(s) => s,
        Err(e) => {
            print_error(output.format, output.quiet, &e);
            return exit_codes::INVALID_INPUT;
        }
    };

    let transport = match ReqwestHttpClient::new() {
        Ok(c) => c,
        Err(e) => {
            print_error(
                output.format,
                output.quiet,
                &format!("failed to build HTTP client: {e}"),
            );
            return exit_codes::FAULT;
        }
    };
    let http: Arc<dyn HttpClient> = match build_retry_config(&retry) {
        Some(cfg) => Arc::new(RetryingHttpClient::new(transport, cfg)),
        None => Arc::new(transport),
    };

    let rt = Runtime::new(http, Arc::new(urls))
        .with_config(build_runtime_config(&runtime, bundle.secret_query_params))
        .with_events(events);

    let invocation = Invocation {
        input: input.unwrap_or_default(),
        parameters: parameters.unwrap_or_default(),
        security: security.unwrap_or_default(),
    };

    tracing::debug!(provider = provider_name, use_case, "running use case");
    match bundle.provider.run(&rt, use_case, invocation).await {
        Ok(report) => {
            let code = match report {
                Report::Success(_) => exit_codes::SUCCESS,
                Report::Failure(_) => exit_codes::FAILURE_REPORT,
            };
            print_result(output.format, output.quiet, &report);
            code
        }
        Err(fault) => {
            print_error(output.format, output.quiet, &fault.to_string());
            exit_codes::FAULT
        }
    }
}
