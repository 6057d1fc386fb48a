use std::sync::Arc;

use async_trait::async_trait;
use mapkit_core::{Branches, Flow, MapFailure, StatusMatch};
use mapkit_exec::{Map, MapContext, Provider};
use serde_json::{json, Value as JsonValue};

use super::Bundled;

const DEFAULT_PAGE_SIZE: u64 = 50;

pub fn bundle() -> Bundled {
    Bundled {
        provider: Provider::builder("weather")
            .map("GetCurrentWeather", Arc::new(GetCurrentWeather))
            .map("ListWeatherStations", Arc::new(ListWeatherStations))
            .build(),
        services: &[("default", "https://api.openweathermap.org")],
        secret_query_params: &["appid"],
    }
}

fn upstream_error(status: u16, body: JsonValue) -> JsonValue {
    match status {
        401 => json!({"title": "Unauthorized"}),
        404 => json!({"title": "Not found", "detail": body["message"]}),
        429 => json!({"title": "Rate limited"}),
        _ => json!({"title": "Upstream error", "status": status}),
    }
}

pub struct GetCurrentWeather;

#[async_trait]
impl Map for GetCurrentWeather {
    fn name(&self) -> &str {
        "GetCurrentWeather"
    }

    async fn run(&self, ctx: &mut MapContext) -> Result<(), MapFailure> {
        let city = ctx.input_field("city");
        if !city.as_str().is_some_and(|c| !c.trim().is_empty()) {
            return Err(MapFailure::Error(
                json!({"title": "Bad request", "detail": "city is required"}),
            ));
        }
        let units = match ctx.input_field("units") {
            JsonValue::Null => json!("metric"),
            other => other.clone(),
        };

        let req = ctx.request("GET", "/data/2.5/weather").query(json!({
            "q": city,
            "units": units,
            "appid": ctx.security()["apiKey"],
        }));
        let branches = Branches::new()
            .on(200, "application/json", |resp, frame| {
                let body = resp.json();
                frame.set_data(json!({
                    "temperature": body["main"]["temp"],
                    "feelsLike": body["main"]["feels_like"],
                    "description": body["weather"][0]["description"],
                }));
                Ok(Flow::Return)
            })
            .on(StatusMatch::Any, "*", |resp, frame| {
                frame.set_error(upstream_error(resp.status, resp.body.to_value()));
                Ok(Flow::Return)
            });
        ctx.fetch(req, branches).await?;
        Ok(())
    }
}

/// Page-fetch helper: one page of registered stations.
pub struct WeatherStationsPage;

#[async_trait]
impl Map for WeatherStationsPage {
    fn name(&self) -> &str {
        "WeatherStationsPage"
    }

    async fn run(&self, ctx: &mut MapContext) -> Result<(), MapFailure> {
        let limit = ctx.input_field("limit").as_u64().unwrap_or(DEFAULT_PAGE_SIZE);
        let req = ctx.request("GET", "/data/3.0/stations").query(json!({
            "page": ctx.input_field("page"),
            "limit": limit,
            "appid": ctx.security()["apiKey"],
        }));
        let branches = Branches::new()
            .on(200, "application/json", move |resp, frame| {
                let items: Vec<JsonValue> = resp
                    .json()
                    .as_array()
                    .map(|stations| {
                        stations
                            .iter()
                            .map(|s| {
                                json!({
                                    "id": s["id"],
                                    "name": s["name"],
                                    "latitude": s["latitude"],
                                    "longitude": s["longitude"],
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                let last = (items.len() as u64) < limit;
                frame.set_data(json!({"items": items, "last": last}));
                Ok(Flow::Return)
            })
            .on(StatusMatch::Any, "*", |resp, frame| {
                frame.set_error(upstream_error(resp.status, resp.body.to_value()));
                Ok(Flow::Return)
            });
        ctx.fetch(req, branches).await?;
        Ok(())
    }
}

pub struct ListWeatherStations;

#[async_trait]
impl Map for ListWeatherStations {
    fn name(&self) -> &str {
        "ListWeatherStations"
    }

    async fn run(&self, ctx: &mut MapContext) -> Result<(), MapFailure> {
        let limit = ctx.input_field("pageSize").as_u64().unwrap_or(DEFAULT_PAGE_SIZE);
        let paginated = ctx
            .paginate(&WeatherStationsPage, json!({"limit": limit}), "stations")
            .await?;
        if paginated.capped {
            ctx.debug(
                "station list truncated",
                json!({"pages": paginated.pages, "items": paginated.items.len()}),
            )
            .await;
        }
        let stations = ctx.var("stations").cloned().unwrap_or_else(|| json!([]));
        ctx.set_data(json!({"stations": stations, "count": paginated.items.len()}));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_errors_are_classified() {
        assert_eq!(upstream_error(401, JsonValue::Null), json!({"title": "Unauthorized"}));
        assert_eq!(
            upstream_error(404, json!({"message": "city not found"})),
            json!({"title": "Not found", "detail": "city not found"})
        );
        assert_eq!(
            upstream_error(503, JsonValue::Null),
            json!({"title": "Upstream error", "status": 503})
        );
    }

    #[test]
    fn bundle_registers_both_use_cases() {
        let b = bundle();
        let names: Vec<&str> = b.provider.use_cases().collect();
        assert_eq!(names, vec!["GetCurrentWeather", "ListWeatherStations"]);
    }
}
