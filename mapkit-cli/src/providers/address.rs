use std::sync::Arc;

use async_trait::async_trait;
use mapkit_core::{Branches, Flow, MapFailure, StatusMatch};
use mapkit_exec::{Map, MapContext, Provider};
use serde_json::{json, Value as JsonValue};

use super::Bundled;

const FIELDS: [&str; 4] = ["street", "city", "state", "zipcode"];

pub fn bundle() -> Bundled {
    Bundled {
        provider: Provider::builder("address-validation")
            .map("CleanAddress", Arc::new(CleanAddress))
            .build(),
        services: &[("default", "https://us-street.api.smarty.com")],
        secret_query_params: &["auth-id", "auth-token"],
    }
}

fn is_blank(v: &JsonValue) -> bool {
    match v {
        JsonValue::Null => true,
        JsonValue::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Normalizes a postal address through a street-address lookup.
pub struct CleanAddress;

#[async_trait]
impl Map for CleanAddress {
    fn name(&self) -> &str {
        "CleanAddress"
    }

    async fn run(&self, ctx: &mut MapContext) -> Result<(), MapFailure> {
        if FIELDS.iter().all(|f| is_blank(ctx.input_field(f))) {
            return Err(MapFailure::Error(json!({"title": "Bad request"})));
        }

        let mut req = ctx
            .request("GET", "/street-address")
            .query(json!({
                "auth-id": ctx.security()["authId"],
                "auth-token": ctx.security()["authToken"],
                "candidates": 1,
            }));
        for f in FIELDS {
            let v = ctx.input_field(f);
            if !is_blank(v) {
                req = req.query(json!({ f: v }));
            }
        }

        let branches = Branches::new()
            .on(200, "application/json", |resp, frame| {
                match resp.json().get(0) {
                    Some(c) => frame.set_data(json!({
                        "street": c["delivery_line_1"],
                        "city": c["components"]["city_name"],
                        "state": c["components"]["state_abbreviation"],
                        "zipcode": c["components"]["zipcode"],
                    })),
                    None => frame.set_error(json!({"title": "Address not found"})),
                }
                Ok(Flow::Return)
            })
            .on(400, "*", |resp, frame| {
                frame.set_error(json!({"title": "Bad request", "detail": resp.body.to_value()}));
                Ok(Flow::Return)
            })
            .on(401, "*", |_, frame| {
                frame.set_error(json!({"title": "Unauthorized"}));
                Ok(Flow::Return)
            })
            .on(StatusMatch::Any, "*", |resp, frame| {
                frame.set_error(json!({"title": "Upstream error", "status": resp.status}));
                Ok(Flow::Return)
            });
        ctx.fetch(req, branches).await?;
        Ok(())
    }
}
