//! Road-address lookup against the juso.go.kr search API.

use async_trait::async_trait;
use jeonyu_core::{AddressCandidate, AddressLookup, LookupError};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{ClientConfig, ClientError};

const SEARCH_PATH: &str = "/addrlink/addrLinkApi.do";
const SUCCESS_CODE: &str = "0";

pub struct JusoClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
    count_per_page: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: SearchResults,
}

#[derive(Deserialize)]
struct SearchResults {
    common: Common,
    #[serde(default)]
    juso: Option<Vec<JusoRecord>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Common {
    error_code: String,
    #[serde(default)]
    error_message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JusoRecord {
    #[serde(default)]
    adm_cd: String,
    #[serde(default)]
    lnbr_mnnm: String,
    #[serde(default)]
    lnbr_slno: String,
    #[serde(default)]
    road_addr: String,
    #[serde(default)]
    jibun_addr: String,
}

impl TryFrom<JusoRecord> for AddressCandidate {
    type Error = ClientError;

    fn try_from(r: JusoRecord) -> Result<Self, ClientError> {
        let main_lot_number = r.lnbr_mnnm.trim().parse().map_err(|_| {
            ClientError::Malformed(format!("lnbrMnnm {:?} is not a lot number", r.lnbr_mnnm))
        })?;
        let sub_lot = r.lnbr_slno.trim();
        let sub_lot_number = if sub_lot.is_empty() {
            0
        } else {
            sub_lot.parse().map_err(|_| {
                ClientError::Malformed(format!("lnbrSlno {:?} is not a lot number", r.lnbr_slno))
            })?
        };
        Ok(AddressCandidate {
            administrative_code: r.adm_cd,
            main_lot_number,
            sub_lot_number,
            road_address_text: r.road_addr,
            lot_address_text: r.jibun_addr,
        })
    }
}

/// Decode a search response body into candidates, in the API's order.
pub fn parse_search_response(body: &str) -> Result<Vec<AddressCandidate>, ClientError> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    let common = parsed.results.common;
    if common.error_code != SUCCESS_CODE {
        return Err(ClientError::Api {
            code: common.error_code,
            message: common.error_message,
        });
    }
    parsed
        .results
        .juso
        .unwrap_or_default()
        .into_iter()
        .map(AddressCandidate::try_from)
        .collect()
}

impl JusoClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.juso_base_url.trim_end_matches('/').to_string(),
            key: config.juso_key.clone(),
            count_per_page: config.address_candidates,
        })
    }

    pub async fn search_candidates(&self, query: &str) -> Result<Vec<AddressCandidate>, ClientError> {
        let url = format!("{}{SEARCH_PATH}", self.base_url);
        info!(url = %url, query, "searching road address");

        let count = self.count_per_page.to_string();
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("confmKey", self.key.as_str()),
                ("currentPage", "1"),
                ("countPerPage", count.as_str()),
                ("keyword", query),
                ("resultType", "json"),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await?;
        let candidates = parse_search_response(&body)?;
        debug!(count = candidates.len(), "address candidates");
        Ok(candidates)
    }
}

#[async_trait]
impl AddressLookup for JusoClient {
    async fn search(&self, query: &str) -> Result<Vec<AddressCandidate>, LookupError> {
        Ok(self.search_candidates(query).await?)
    }
}
