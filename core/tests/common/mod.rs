#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use schoolhouse_core::SchoolCore;
use schoolhouse_core::core::assets::IncomingFile;
use schoolhouse_core::core::session::credentials::StaticCredentials;
use schoolhouse_core::types::{AppConfig, Config};
use secrecy::SecretString;
use std::io::Cursor;
use std::time::SystemTime;
use tempfile::TempDir;

pub const ADMIN: &str = "admin";
pub const PASSWORD: &str = "admin123";

pub fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

pub fn config_for(dir: &TempDir) -> Config {
    Config {
        base_path: dir.path().to_path_buf(),
    }
}

pub fn open_core(dir: &TempDir, now: SystemTime) -> SchoolCore {
    let verifier = StaticCredentials::new(ADMIN, &secret(PASSWORD));
    SchoolCore::open(config_for(dir), AppConfig::default(), Box::new(verifier), now).unwrap()
}

pub fn encoded_image(name: &str, width: u32, height: u32, format: ImageFormat) -> IncomingFile {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format).unwrap();

    IncomingFile {
        name: name.to_string(),
        mime_type: format.to_mime_type().to_string(),
        bytes,
    }
}
