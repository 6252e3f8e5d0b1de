use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use image::{ GenericImageView, ImageFormat, Rgba, RgbaImage };
use social_qr::{
    AppError,
    BadgeSpec,
    ComposeService,
    Config,
    ExportRequest,
    ExportService,
    LinkType,
    LocalQrSource,
    OsVariant,
    PlatformId,
};
use wiremock::matchers::{ method, query_param };
use wiremock::{ Mock, MockServer, ResponseTemplate };

fn local_service(export_size_px: u32) -> ExportService {
    let config = Config { export_size_px, ..Config::default() };
    ExportService::new(ComposeService::with_default_badges(Arc::new(LocalQrSource::new())), &config)
}

fn png(img: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    bytes
}

#[tokio::test]
async fn test_default_export_is_1024_square_png() {
    let request = ExportRequest::new(PlatformId::Instagram, "johndoe").with_badge(
        BadgeSpec::DefaultGlyph(PlatformId::Instagram)
    );
    let artifact = local_service(1024).export(&request, LinkType::Web).await.unwrap();

    assert_eq!(artifact.filename, "instagram_johndoe_web_qr.png");
    let decoded = image::load_from_memory_with_format(&artifact.image.bytes, ImageFormat::Png).unwrap();
    assert_eq!(decoded.dimensions(), (1024, 1024));

    // Badge backing sits in the middle of the canvas.
    assert_eq!(decoded.get_pixel(512, 409 + 2), Rgba([255, 255, 255, 255]));
}

#[tokio::test]
async fn test_custom_logo_from_file_is_composited() {
    let dir = tempfile::tempdir().unwrap();
    let logo_path = dir.path().join("logo.png");
    std::fs::write(&logo_path, png(&RgbaImage::from_pixel(16, 16, Rgba([0, 200, 0, 255])))).unwrap();

    let badge = BadgeSpec::custom_from_file(&logo_path).await.unwrap();
    let request = ExportRequest::new(PlatformId::Tiktok, "creator").with_badge(badge);
    let artifact = local_service(500).export(&request, LinkType::Deep).await.unwrap();

    assert_eq!(artifact.uri, "tiktok://@creator");
    let decoded = image::load_from_memory(&artifact.image.bytes).unwrap().to_rgb8();
    let center = decoded.get_pixel(250, 250).0;
    assert!(center[1] > 150 && center[0] < 50 && center[2] < 50, "center pixel {:?}", center);
}

#[tokio::test]
async fn test_deep_and_web_exports_are_independent() {
    let service = local_service(256);
    let request = ExportRequest::new(PlatformId::X, "@jack");

    let (deep, web) = service.export_both(&request).await.unwrap();
    assert_eq!(deep.uri, "twitter://user?screen_name=jack");
    assert_eq!(web.uri, "https://x.com/jack");
    assert_ne!(deep.image.bytes, web.image.bytes);

    let (deep_again, _) = service.export_both(&request).await.unwrap();
    assert_eq!(deep.image.bytes, deep_again.image.bytes);
}

#[tokio::test]
async fn test_http_source_end_to_end() {
    let server = MockServer::start().await;
    let qr = png(&RgbaImage::from_pixel(64, 64, Rgba([0, 0, 0, 255])));
    Mock::given(method("GET"))
        .and(query_param("data", "fb://page/123"))
        .and(query_param("size", "128x128"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(qr))
        .expect(1)
        .mount(&server).await;

    let config = Config {
        qr_api_base_url: format!("{}/v1/create-qr-code/", server.uri()),
        fetch_timeout: Duration::from_secs(2),
        export_size_px: 128,
        ..Config::default()
    };
    let service = ExportService::from_config(&config).unwrap();

    let request = ExportRequest::new(PlatformId::Facebook, "123").with_os(OsVariant::Android);
    let artifact = service.export(&request, LinkType::Deep).await.unwrap();

    assert_eq!(artifact.filename, "facebook_123_deep_qr.png");
    assert_eq!((artifact.image.width, artifact.image.height), (128, 128));
}

#[tokio::test]
async fn test_http_outage_fails_export() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server).await;

    let config = Config {
        qr_api_base_url: format!("{}/v1/create-qr-code/", server.uri()),
        fetch_max_retries: 0,
        ..Config::default()
    };
    let service = ExportService::from_config(&config).unwrap();

    let err = service
        .export(&ExportRequest::new(PlatformId::Instagram, "johndoe"), LinkType::Web).await
        .unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
    assert_eq!(err.code(), "SOURCE_UNAVAILABLE");
}
