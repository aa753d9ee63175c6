use std::env;

use log::warn;
use serde::Deserialize;

use crate::integration::Result;

/// Unsigned upload endpoint of the external image host. The service never
/// stores image bytes itself; it forwards them and keeps only the returned URL.
#[derive(Clone)]
pub struct Config {
    upload_url: String,
    upload_preset: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upload_url: String::from("https://api.cloudinary.com/v1_1/demo/image/upload"),
            upload_preset: String::from("unsigned"),
        }
    }
}

impl Config {
    pub fn env() -> Result<Self> {
        let upload_url = env::var("MEDIA_UPLOAD_URL")?;
        let upload_preset = env::var("MEDIA_UPLOAD_PRESET").unwrap_or_else(|_| {
            warn!("MEDIA_UPLOAD_PRESET is not set, using 'unsigned'");
            String::from("unsigned")
        });

        Ok(Self {
            upload_url,
            upload_preset,
        })
    }
}

#[derive(Deserialize)]
struct UploadResult {
    secure_url: String,
}

#[derive(Clone)]
pub struct MediaStorage {
    http: reqwest::Client,
    config: Config,
}

impl MediaStorage {
    pub fn new(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }

    /// Uploads the file and returns its public secure URL.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = reqwest::multipart::Form::new()
            .text("upload_preset", self.config.upload_preset.clone())
            .part("file", part);

        let response = self
            .http
            .post(&self.config.upload_url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(super::Error::UploadRejected(response.status().as_u16()));
        }

        let result = response.json::<UploadResult>().await?;
        Ok(result.secure_url)
    }
}
