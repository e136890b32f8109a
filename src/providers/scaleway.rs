//! Scaleway Domains and DNS API client.

use super::RecordClient;
use crate::error::{Result, SudError};
use crate::record::ARecordInfo;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

const DEFAULT_BASE_URL: &str = "https://api.scaleway.com/domain/v2beta1";
const AUTH_HEADER: &str = "X-Auth-Token";
const RECORD_TYPE: &str = "A";

/// Scaleway DNS client.
pub struct ScalewayClient {
    client: reqwest::Client,
    api_secret: String,
    base_url: String,
}

impl fmt::Debug for ScalewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalewayClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<ScalewayRecord>,
}

#[derive(Debug, Deserialize)]
struct ScalewayRecord {
    name: String,
    ttl: u32,
    data: String,
}

#[derive(Debug, Serialize)]
struct PatchRecordsRequest<'a> {
    changes: Vec<RecordChange<'a>>,
    disallow_new_zone_creation: bool,
    return_all_records: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum RecordChange<'a> {
    Add {
        records: Vec<NewRecord<'a>>,
    },
    Set {
        id_fields: IdFields<'a>,
        records: Vec<NewRecord<'a>>,
    },
}

#[derive(Debug, Serialize)]
struct IdFields<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
}

#[derive(Debug, Serialize)]
struct NewRecord<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    record_type: &'static str,
    ttl: u32,
    data: &'a str,
}

impl ScalewayRecord {
    fn into_info(self, domain: &str) -> ARecordInfo {
        ARecordInfo {
            name: self.name,
            domain: domain.to_string(),
            ttl: self.ttl,
            address: Some(self.data),
        }
    }
}

impl ScalewayClient {
    /// Create a new Scaleway client.
    pub fn new(api_secret: String) -> Result<Self> {
        Self::with_base_url(api_secret, DEFAULT_BASE_URL.to_string())
    }

    /// Create with custom base URL (for testing).
    pub fn with_base_url(api_secret: String, base_url: String) -> Result<Self> {
        Ok(Self {
            client: crate::http::client()?,
            api_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn records_url(&self, domain: &str) -> String {
        format!("{}/dns-zones/{}/records", self.base_url, domain)
    }

    /// Send an authenticated request and decode the JSON reply.
    ///
    /// On failure the returned string is the best detail available: the
    /// provider's JSON error body, its raw text, or the transport error.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> std::result::Result<T, String> {
        let response = request
            .header(AUTH_HEADER, &self.api_secret)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(json) => json.to_string(),
                Err(_) if !body.trim().is_empty() => format!("HTTP {}: {}", status, body.trim()),
                Err(_) => format!("HTTP {}", status),
            });
        }

        response
            .json()
            .await
            .map_err(|e| format!("invalid response: {}", e))
    }

    async fn update_zone(&self, info: &ARecordInfo, change: RecordChange<'_>) -> Result<ARecordInfo> {
        let body = PatchRecordsRequest {
            changes: vec![change],
            disallow_new_zone_creation: true,
            return_all_records: false,
        };

        let update_error = |message: String| SudError::RecordUpdate {
            name: info.name.clone(),
            domain: info.domain.clone(),
            message,
        };

        let response: RecordsResponse = self
            .call(self.client.patch(self.records_url(&info.domain)).json(&body))
            .await
            .map_err(update_error)?;

        response
            .records
            .into_iter()
            .next()
            .map(|record| record.into_info(&info.domain))
            .ok_or_else(|| update_error("no record returned".to_string()))
    }
}

#[async_trait]
impl RecordClient for ScalewayClient {
    async fn get_record(&self, info: &ARecordInfo) -> Result<Option<ARecordInfo>> {
        let request = self
            .client
            .get(self.records_url(&info.domain))
            .query(&[("type", RECORD_TYPE), ("name", info.name.as_str())]);

        let response: RecordsResponse =
            self.call(request)
                .await
                .map_err(|message| SudError::RecordLookup {
                    name: info.name.clone(),
                    domain: info.domain.clone(),
                    message,
                })?;

        Ok(response
            .records
            .into_iter()
            .find(|record| record.name == info.name)
            .map(|record| record.into_info(&info.domain)))
    }

    async fn add_record(&self, info: &ARecordInfo, address: &str) -> Result<ARecordInfo> {
        let dns_name = info.dns_name();
        let change = RecordChange::Add {
            records: vec![NewRecord {
                name: &dns_name,
                record_type: RECORD_TYPE,
                ttl: info.ttl,
                data: address,
            }],
        };
        self.update_zone(info, change).await
    }

    async fn change_record(&self, info: &ARecordInfo, address: &str) -> Result<ARecordInfo> {
        let dns_name = info.dns_name();
        let change = RecordChange::Set {
            id_fields: IdFields {
                name: &dns_name,
                record_type: RECORD_TYPE,
            },
            records: vec![NewRecord {
                name: &dns_name,
                record_type: RECORD_TYPE,
                ttl: info.ttl,
                data: address,
            }],
        };
        self.update_zone(info, change).await
    }
}
