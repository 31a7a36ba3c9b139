// src/extract/rentcast.rs
//
// Client for the RentCast listings API. Every call costs money, so results
// go through the file cache; the HTTP layer itself is fail-fast: one
// attempt, client-side timeout, no retry loop.

use crate::config::Settings;
use crate::errors::PipelineError;
use crate::extract::FileCache;
use crate::table::DataTable;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

pub struct RentCastClient {
    client: Client,
}

impl RentCastClient {
    pub fn new() -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| PipelineError::Api(e.to_string()))?;

        Ok(Self { client })
    }

    /// Pulls active listings for a city and caches the table locally.
    pub fn get_property_listings(
        &self,
        settings: &Settings,
        cache: &FileCache,
        city: &str,
        state: &str,
        limit: u32,
    ) -> Result<DataTable, PipelineError> {
        let key = format!(
            "properties_{}_{}.csv",
            city.to_lowercase(),
            state.to_lowercase()
        );

        if let Some(contents) = cache.get(&key) {
            println!("📂 Using cached property listings");
            return DataTable::read_csv_str(&contents);
        }

        println!("🌐 Calling RentCast API (PAID) with limit={limit}");
        let records = self.fetch(settings, city, state, limit)?;
        let table = DataTable::from_json_records(&records)?;

        cache.put(&key, &table.to_csv_string()?)?;
        Ok(table)
    }

    fn fetch(
        &self,
        settings: &Settings,
        city: &str,
        state: &str,
        limit: u32,
    ) -> Result<Vec<Value>, PipelineError> {
        let api_key = settings.require_api_key()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut params = HashMap::new();
        params.insert("city", city.to_string());
        params.insert("state", state.to_string());
        params.insert("status", "Active".to_string());
        params.insert("limit", limit.to_string());

        let resp = self
            .client
            .get(&settings.base_url)
            .headers(headers)
            .header("X-Api-Key", api_key)
            .query(&params)
            .send()
            .map_err(|e| PipelineError::Api(format!("API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(PipelineError::Api(format!(
                "API request failed with status {}",
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .map_err(|e| PipelineError::Api(format!("invalid JSON response: {e}")))?;

        // The API sometimes wraps the listings in an envelope object.
        let records = match data {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("properties") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(PipelineError::Api(
                        "response object has no 'properties' array".into(),
                    ))
                }
            },
            other => {
                return Err(PipelineError::Api(format!(
                    "unexpected response shape: {other}"
                )))
            }
        };

        if records.is_empty() {
            return Err(PipelineError::Api(
                "No data returned from API. Check key, credits, or location.".into(),
            ));
        }

        Ok(records)
    }
}
