pub mod qr_source;
pub mod qrserver;
pub mod local;

pub use qr_source::{ decode_qr_image, QrProfile, QrSource };
pub use qrserver::QrServerSource;
pub use local::LocalQrSource;
