//! Building registry hub (건축물대장 HUB) over HTTP.

use async_trait::async_trait;
use jeonyu_core::{LookupError, LotKey, RegistryItem, RegistryLookup, RegistryOperation};
use tracing::{debug, info, warn};

use crate::xml::parse_registry_page;
use crate::{ClientConfig, ClientError};

/// What to do after reading one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageStep {
    Next,
    Done,
    /// More items exist than `max_pages` pages can hold.
    Truncated { total: usize },
}

fn next_step(
    page: u32,
    max_pages: u32,
    received: usize,
    collected: usize,
    total_count: Option<usize>,
) -> PageStep {
    let Some(total) = total_count else {
        return PageStep::Done;
    };
    if received == 0 || collected >= total {
        PageStep::Done
    } else if page >= max_pages {
        PageStep::Truncated { total }
    } else {
        PageStep::Next
    }
}

pub struct RegistryClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
    rows_per_page: u32,
    max_pages: u32,
}

impl RegistryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.registry_base_url.trim_end_matches('/').to_string(),
            key: config.registry_key.clone(),
            rows_per_page: config.rows_per_page.max(1),
            max_pages: config.max_pages.max(1),
        })
    }

    fn url(&self, operation: RegistryOperation) -> String {
        format!("{}/{}", self.base_url, operation.name())
    }

    async fn fetch_page(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
        page: u32,
    ) -> Result<crate::xml::RegistryPage, ClientError> {
        let url = self.url(operation);
        let rows = self.rows_per_page.to_string();
        let page_no = page.to_string();
        debug!(url = %url, page, "fetching registry page");

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("serviceKey", self.key.as_str()),
                ("sigunguCd", lot.district_code()),
                ("bjdongCd", lot.dong_code()),
                ("bun", lot.main_lot()),
                ("ji", lot.sub_lot()),
                ("numOfRows", rows.as_str()),
                ("pageNo", page_no.as_str()),
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
        parse_registry_page(&body)
    }

    /// All items of one operation for one lot, following `totalCount` across pages.
    pub async fn fetch_all(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
    ) -> Result<Vec<RegistryItem>, ClientError> {
        info!(%operation, %lot, "querying registry hub");
        let mut items = Vec::new();
        for page in 1..=self.max_pages {
            let fetched = self.fetch_page(operation, lot, page).await?;
            let received = fetched.items.len();
            items.extend(fetched.items);

            match next_step(page, self.max_pages, received, items.len(), fetched.total_count) {
                PageStep::Next => {}
                PageStep::Done => break,
                PageStep::Truncated { total } => {
                    warn!(%operation, total, kept = items.len(), "page limit reached; listing truncated");
                    break;
                }
            }
        }
        info!(%operation, count = items.len(), "registry items received");
        Ok(items)
    }
}

#[async_trait]
impl RegistryLookup for RegistryClient {
    async fn fetch(
        &self,
        operation: RegistryOperation,
        lot: &LotKey,
    ) -> Result<Vec<RegistryItem>, LookupError> {
        Ok(self.fetch_all(operation, lot).await?)
    }
}
