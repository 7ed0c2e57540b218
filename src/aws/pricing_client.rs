use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::sigv4::{self, SigningRequest};
use super::Credentials;
use crate::billing::{LookupError, PriceQuery, PriceQuote, PricingLookup};

const SERVICE_CODE: &str = "AmazonEC2";
const TARGET: &str = "AWSPriceListService.GetProducts";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";
const SIGNING_SERVICE: &str = "pricing";
const PAGE_SIZE: u32 = 100;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetProductsRequest<'a> {
    service_code: &'a str,
    filters: Vec<ProductFilter<'a>>,
    format_version: &'a str,
    max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProductFilter<'a> {
    #[serde(rename = "Type")]
    kind: &'a str,
    #[serde(rename = "Field")]
    field: &'a str,
    #[serde(rename = "Value")]
    value: &'a str,
}

impl<'a> ProductFilter<'a> {
    fn term_match(field: &'a str, value: &'a str) -> Self {
        Self {
            kind: "TERM_MATCH",
            field,
            value,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetProductsResponse {
    #[serde(default)]
    price_list: Vec<String>,
    #[serde(default)]
    next_token: Option<String>,
}

fn transport(error: reqwest::Error) -> LookupError {
    LookupError::Transport(error.to_string())
}

/// AWS Price List `GetProducts` client for EBS storage prices
pub struct PricingClient {
    client: Client,
    endpoint: url::Url,
    signing_region: String,
    credentials: Credentials,
}

impl PricingClient {
    pub fn new(
        endpoint: url::Url,
        signing_region: impl Into<String>,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(transport)?;
        Ok(Self {
            client,
            endpoint,
            signing_region: signing_region.into(),
            credentials,
        })
    }

    async fn fetch_page(
        &self,
        query: &PriceQuery,
        next_token: Option<String>,
    ) -> Result<GetProductsResponse, LookupError> {
        let request = GetProductsRequest {
            service_code: SERVICE_CODE,
            filters: vec![
                ProductFilter::term_match("volumeType", query.tier_name),
                ProductFilter::term_match("location", query.region_name),
                ProductFilter::term_match("volumeApiName", query.tier.code()),
            ],
            format_version: "aws_v1",
            max_results: PAGE_SIZE,
            next_token,
        };
        let body = serde_json::to_vec(&request)?;

        let headers = [("content-type", CONTENT_TYPE), ("x-amz-target", TARGET)];
        let signed = sigv4::sign(
            &SigningRequest {
                method: "POST",
                url: &self.endpoint,
                headers: &headers,
                body: &body,
                region: &self.signing_region,
                service: SIGNING_SERVICE,
            },
            &self.credentials,
            chrono::Utc::now(),
        )?;

        let mut req = self.client.post(self.endpoint.clone());
        for (name, value) in headers.iter() {
            req = req.header(*name, *value);
        }
        for (name, value) in &signed {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req.body(body).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(tier = %query.tier, %status, "pricing request rejected");
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(transport)?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl PricingLookup for PricingClient {
    async fn lookup(&self, query: &PriceQuery) -> Result<Vec<PriceQuote>, LookupError> {
        let mut quotes = Vec::new();
        let mut next_token = None;
        let mut page = 0;

        loop {
            let response = self.fetch_page(query, next_token).await?;
            page += 1;
            debug!(
                tier = %query.tier,
                page,
                entries = response.price_list.len(),
                "fetched price list page"
            );

            for raw in &response.price_list {
                quotes.push(PriceQuote::from_json(raw)?);
            }

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(quotes)
    }
}
