use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;

use super::qr_source::{ decode_qr_image, QrProfile, QrSource };
use crate::config::Config;
use crate::error::{ AppError, Result };

const RETRY_BACKOFF_MS: u64 = 250;

/// QR source backed by the public `create-qr-code` HTTP endpoint.
pub struct QrServerSource {
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
}

impl QrServerSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.qr_api_base_url.clone(),
            client,
            max_retries: config.fetch_max_retries,
        })
    }

    /// Full request URL. Only the payload is percent-encoded.
    pub fn request_url(&self, payload: &str, profile: &QrProfile) -> String {
        format!(
            "{}?size={}x{}&data={}&bgcolor=FFFFFF&format=png&qzone={}&margin={}&ecc=H",
            self.base_url,
            profile.size_px,
            profile.size_px,
            urlencoding::encode(payload),
            profile.quiet_zone,
            profile.margin
        )
    }

    /// GET with a bounded number of retries on transport errors, 429 and 5xx.
    async fn fetch_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut last_err = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS)).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!("QR fetch attempt {} failed: {}", attempt + 1, e);
                    last_err = Some(AppError::SourceUnavailable(format!("QR request failed: {}", e)));
                    continue;
                }
            };

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                tracing::warn!("QR fetch attempt {} returned {}", attempt + 1, status);
                last_err = Some(AppError::SourceUnavailable(format!("QR API returned status: {}", status)));
                continue;
            }

            if !status.is_success() {
                return Err(AppError::SourceUnavailable(format!("QR API returned status: {}", status)));
            }

            let bytes = response
                .bytes().await
                .map_err(|e| AppError::SourceUnavailable(format!("Failed to read QR response: {}", e)))?;
            return Ok(bytes.to_vec());
        }
        Err(last_err.unwrap_or_else(|| AppError::SourceUnavailable("QR request failed after retries".to_string())))
    }
}

#[async_trait]
impl QrSource for QrServerSource {
    async fn fetch_qr(&self, payload: &str, profile: &QrProfile) -> Result<DynamicImage> {
        let url = self.request_url(payload, profile);
        tracing::debug!("Fetching QR ({}px) from {}", profile.size_px, self.base_url);

        let bytes = self.fetch_with_retry(&url).await?;
        decode_qr_image(&bytes)
    }

    fn name(&self) -> &str {
        "qrserver"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ ImageFormat, Luma };
    use std::io::Cursor;
    use wiremock::matchers::{ method, path, query_param };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    fn png_bytes(size: u32) -> Vec<u8> {
        let img = image::GrayImage::from_pixel(size, size, Luma([0]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    fn source_for(server: &MockServer, max_retries: u32) -> QrServerSource {
        let config = Config {
            qr_api_base_url: format!("{}/v1/create-qr-code/", server.uri()),
            fetch_timeout: Duration::from_secs(2),
            fetch_max_retries: max_retries,
            ..Config::default()
        };
        QrServerSource::new(&config).unwrap()
    }

    #[test]
    fn test_request_url_encodes_payload_only() {
        let source = QrServerSource::new(&Config::default()).unwrap();
        let url = source.request_url("instagram://user?username=a b", &QrProfile::export(1024));
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=1024x1024&data=instagram%3A%2F%2Fuser%3Fusername%3Da%20b&bgcolor=FFFFFF&format=png&qzone=2&margin=0&ecc=H"
        );
    }

    #[test]
    fn test_request_url_preview_profile() {
        let source = QrServerSource::new(&Config::default()).unwrap();
        let url = source.request_url("https://x.com/a", &QrProfile::preview(200));
        assert!(url.contains("size=200x200"));
        assert!(url.contains("qzone=4&margin=2"));
    }

    #[tokio::test]
    async fn test_fetch_qr_sends_fixed_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/create-qr-code/"))
            .and(query_param("data", "https://x.com/jack"))
            .and(query_param("size", "64x64"))
            .and(query_param("bgcolor", "FFFFFF"))
            .and(query_param("ecc", "H"))
            .and(query_param("qzone", "2"))
            .and(query_param("margin", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(64)))
            .expect(1)
            .mount(&server).await;

        let source = source_for(&server, 1);
        let image = source.fetch_qr("https://x.com/jack", &QrProfile::export(64)).await.unwrap();
        assert_eq!((image.width(), image.height()), (64, 64));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server).await;

        let source = source_for(&server, 1);
        let err = source.fetch_qr("x", &QrProfile::export(64)).await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_server_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(png_bytes(32)))
            .with_priority(2)
            .mount(&server).await;

        let source = source_for(&server, 1);
        let image = source.fetch_qr("x", &QrProfile::export(32)).await.unwrap();
        assert_eq!(image.width(), 32);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&server).await;

        let source = source_for(&server, 1);
        let err = source.fetch_qr("x", &QrProfile::export(32)).await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not an image"))
            .mount(&server).await;

        let source = source_for(&server, 0);
        let err = source.fetch_qr("x", &QrProfile::export(32)).await.unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }
}
