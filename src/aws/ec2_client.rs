use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::sigv4::{self, SigningRequest};
use super::{Credentials, VolumeSource};
use crate::billing::VolumeRecord;
use crate::error::AppError;

const API_VERSION: &str = "2016-11-15";
const CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";
const SIGNING_SERVICE: &str = "ec2";
const PAGE_SIZE: u32 = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescribeVolumesResponse {
    #[serde(default)]
    volume_set: ItemSet<XmlVolume>,
    #[serde(default)]
    next_token: Option<String>,
}

/// EC2 Query lists are wrapped as `<xxxSet><item>..</item></xxxSet>`
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ItemSet<T> {
    #[serde(default, rename = "item")]
    items: Vec<T>,
}

impl<T> Default for ItemSet<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlVolume {
    volume_id: String,
    volume_type: String,
    size: u64,
    #[serde(default)]
    availability_zone: Option<String>,
    #[serde(default)]
    attachment_set: ItemSet<XmlAttachment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct XmlAttachment {
    #[serde(default)]
    instance_id: Option<String>,
}

impl From<XmlVolume> for VolumeRecord {
    fn from(volume: XmlVolume) -> Self {
        VolumeRecord {
            id: volume.volume_id,
            tier: volume.volume_type,
            size_units: volume.size,
            attachment_count: volume
                .attachment_set
                .items
                .iter()
                .filter(|attachment| attachment.instance_id.is_some())
                .count() as u32,
            availability_zone: volume.availability_zone,
        }
    }
}

fn inventory_error(context: &str, error: impl std::fmt::Display) -> AppError {
    AppError::Inventory(format!("{}: {}", context, error))
}

/// EC2 `DescribeVolumes` client listing every volume of one region
pub struct Ec2VolumeClient {
    client: Client,
    endpoint: url::Url,
    region: String,
    credentials: Credentials,
}

impl Ec2VolumeClient {
    pub fn new(
        endpoint: url::Url,
        region: impl Into<String>,
        credentials: Credentials,
        request_timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| inventory_error("cannot build EC2 client", e))?;
        Ok(Self {
            client,
            endpoint,
            region: region.into(),
            credentials,
        })
    }

    /// Public endpoint of the EC2 API in `region`
    pub fn regional_endpoint(region: &str) -> Result<url::Url, AppError> {
        url::Url::parse(&format!("https://ec2.{}.amazonaws.com/", region))
            .map_err(|e| AppError::Config(format!("EC2 endpoint for {}: {}", region, e)))
    }

    async fn fetch_page(
        &self,
        next_token: Option<&str>,
    ) -> Result<DescribeVolumesResponse, AppError> {
        let body = {
            let mut form = url::form_urlencoded::Serializer::new(String::new());
            form.append_pair("Action", "DescribeVolumes")
                .append_pair("Version", API_VERSION)
                .append_pair("MaxResults", &PAGE_SIZE.to_string());
            if let Some(token) = next_token {
                form.append_pair("NextToken", token);
            }
            form.finish().into_bytes()
        };

        let headers = [("content-type", CONTENT_TYPE)];
        let signed = sigv4::sign(
            &SigningRequest {
                method: "POST",
                url: &self.endpoint,
                headers: &headers,
                body: &body,
                region: &self.region,
                service: SIGNING_SERVICE,
            },
            &self.credentials,
            chrono::Utc::now(),
        )
        .map_err(|e| inventory_error("cannot sign DescribeVolumes", e))?;

        let mut req = self
            .client
            .post(self.endpoint.clone())
            .header("content-type", CONTENT_TYPE);
        for (name, value) in &signed {
            req = req.header(name.as_str(), value.as_str());
        }

        let response = req
            .body(body)
            .send()
            .await
            .map_err(|e| inventory_error("DescribeVolumes request failed", e))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| inventory_error("DescribeVolumes response unreadable", e))?;
        if !status.is_success() {
            warn!(region = %self.region, %status, "DescribeVolumes rejected");
            return Err(AppError::Inventory(format!(
                "EC2 returned HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        quick_xml::de::from_str(&text)
            .map_err(|e| inventory_error("invalid DescribeVolumes response", e))
    }
}

#[async_trait]
impl VolumeSource for Ec2VolumeClient {
    async fn list_volumes(&self) -> Result<Vec<VolumeRecord>, AppError> {
        let mut records = Vec::new();
        let mut next_token: Option<String> = None;
        let mut page = 0;

        loop {
            let response = self.fetch_page(next_token.as_deref()).await?;
            page += 1;
            debug!(
                region = %self.region,
                page,
                volumes = response.volume_set.items.len(),
                "fetched volume page"
            );

            records.extend(response.volume_set.items.into_iter().map(VolumeRecord::from));

            match response.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_string_contains, header, header_exists, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const FIRST_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeVolumesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>59dbff89-35bd-4eac-99ed-be587EXAMPLE</requestId>
    <volumeSet>
        <item>
            <volumeId>vol-0001</volumeId>
            <size>80</size>
            <snapshotId/>
            <availabilityZone>us-east-1a</availabilityZone>
            <status>in-use</status>
            <createTime>2023-05-01T09:12:00.000Z</createTime>
            <attachmentSet>
                <item>
                    <volumeId>vol-0001</volumeId>
                    <instanceId>i-0abc</instanceId>
                    <device>/dev/xvda</device>
                    <status>attached</status>
                    <deleteOnTermination>true</deleteOnTermination>
                </item>
            </attachmentSet>
            <volumeType>gp2</volumeType>
            <encrypted>false</encrypted>
        </item>
        <item>
            <volumeId>vol-0002</volumeId>
            <size>500</size>
            <availabilityZone>us-east-1b</availabilityZone>
            <status>available</status>
            <attachmentSet/>
            <volumeType>sc1</volumeType>
            <tagSet>
                <item>
                    <key>Name</key>
                    <value>archive</value>
                </item>
            </tagSet>
        </item>
    </volumeSet>
    <nextToken>page-2</nextToken>
</DescribeVolumesResponse>"#;

    const SECOND_PAGE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeVolumesResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>59dbff89-35bd-4eac-99ed-be587EXAMPLF</requestId>
    <volumeSet>
        <item>
            <volumeId>vol-0003</volumeId>
            <size>20</size>
            <availabilityZone>us-east-1c</availabilityZone>
            <attachmentSet/>
            <volumeType>gp3</volumeType>
        </item>
    </volumeSet>
</DescribeVolumesResponse>"#;

    fn client(server: &MockServer) -> Ec2VolumeClient {
        let endpoint = url::Url::parse(&server.uri()).unwrap();
        let credentials = Credentials {
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: "secret".to_string(),
            session_token: None,
        };
        Ec2VolumeClient::new(endpoint, "us-east-1", credentials, Duration::from_secs(5)).unwrap()
    }

    fn xml(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/xml;charset=UTF-8")
    }

    #[tokio::test]
    async fn test_lists_volumes_across_pages() {
        let server = MockServer::start().await;
        // Mounted first so it takes precedence for the second page
        Mock::given(method("POST"))
            .and(body_string_contains("NextToken=page-2"))
            .respond_with(xml(SECOND_PAGE))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("content-type", CONTENT_TYPE))
            .and(header_exists("authorization"))
            .and(body_string_contains("Action=DescribeVolumes"))
            .and(body_string_contains("Version=2016-11-15"))
            .respond_with(xml(FIRST_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let records = client(&server).list_volumes().await.unwrap();

        assert_eq!(
            records,
            vec![
                VolumeRecord::new("vol-0001", "gp2", 80, 1).in_zone("us-east-1a"),
                VolumeRecord::new("vol-0002", "sc1", 500, 0).in_zone("us-east-1b"),
                VolumeRecord::new("vol-0003", "gp3", 20, 0).in_zone("us-east-1c"),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_region() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(xml(
                r#"<DescribeVolumesResponse><requestId>r</requestId><volumeSet/></DescribeVolumesResponse>"#,
            ))
            .mount(&server)
            .await;

        let records = client(&server).list_volumes().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_http_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(
                "<Response><Errors><Error><Code>AuthFailure</Code></Error></Errors></Response>",
            ))
            .mount(&server)
            .await;

        let result = client(&server).list_volumes().await;
        assert!(
            matches!(result, Err(AppError::Inventory(ref msg)) if msg.contains("401") && msg.contains("AuthFailure"))
        );
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(xml("<DescribeVolumesResponse><volumeSet><item><volumeId>vol-1</volumeId></item></volumeSet></DescribeVolumesResponse>"))
            .mount(&server)
            .await;

        let result = client(&server).list_volumes().await;
        assert!(matches!(result, Err(AppError::Inventory(_))));
    }

    #[test]
    fn test_regional_endpoint() {
        assert_eq!(
            Ec2VolumeClient::regional_endpoint("eu-west-1").unwrap().as_str(),
            "https://ec2.eu-west-1.amazonaws.com/"
        );
    }
}
