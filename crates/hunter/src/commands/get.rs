//! `hunter get`: one authenticated GET, response data printed as JSON.

use hunter_api::Method;
use hunter_core::SyncSession;

use crate::cli::{GetArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    args: &GetArgs,
    session: &SyncSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let pairs = parse_query(&args.query)?;
    let query = (!pairs.is_empty()).then_some(pairs.as_slice());

    let data = session
        .api()
        .send(Method::GET, &args.path, None, query)
        .await
        .map_err(|e| CliError::from_request(e, session.api().endpoints().api_base().as_str()))?;

    output::print_output(&output::render_value(global.output, &data)?);
    Ok(())
}

/// Split each `key=value` argument at its first `=`.
fn parse_query(pairs: &[String]) -> Result<Vec<(&str, &str)>, CliError> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| CliError::Validation {
                    field: "--query".into(),
                    reason: format!("expected key=value, got '{pair}'"),
                })
        })
        .collect()
}
