use crate::cli::RenderArgs;
use anyhow::Context;
use serde_json::json;
use sqlrow::{OwnedParams, Params, normalize, render_placeholders};

pub fn run(args: &RenderArgs) -> anyhow::Result<serde_json::Value> {
    let params = match args.args.as_deref() {
        Some(raw) => {
            let json: serde_json::Value =
                serde_json::from_str(raw).context("--args is not valid JSON")?;
            Params::from_json(json)?
        }
        None => OwnedParams::None,
    };
    let stmt = normalize(&args.sql, params.as_params())?;
    tracing::debug!(sql = %stmt.sql, param_count = stmt.args.len(), "rendered template");

    let mut output = serde_json::to_value(&stmt)?;
    if args.numbered {
        output["numbered"] = json!(render_placeholders(&stmt.sql));
    }
    Ok(output)
}
