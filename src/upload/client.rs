use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SiftError;

const UPLOAD_URL: &str = "https://photoslibrary.googleapis.com/v1/uploads";
const BATCH_CREATE_URL: &str = "https://photoslibrary.googleapis.com/v1/mediaItems:batchCreate";

/// Two-step Photos upload: raw bytes buy an upload token, the token is
/// then registered as a library item.
pub struct PhotosClient {
    client: reqwest::blocking::Client,
    access_token: String,
}

impl PhotosClient {
    pub fn new(access_token: String) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            access_token,
        }
    }

    /// Step one: POST the file bytes, receive the opaque upload token.
    pub fn upload_bytes(&self, path: &Path) -> Result<String, SiftError> {
        let bytes = std::fs::read(path).map_err(|e| SiftError::UploadRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let response = self
            .client
            .post(UPLOAD_URL)
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/octet-stream")
            .header("X-Goog-Upload-Content-Type", upload_content_type(path))
            .header("X-Goog-Upload-Protocol", "raw")
            .body(bytes)
            .send()
            .map_err(|e| SiftError::UploadRequest {
                path: path.to_path_buf(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(SiftError::UploadRejected {
                path: path.to_path_buf(),
                status: response.status().as_u16(),
            });
        }
        response.text().map_err(|e| SiftError::UploadRequest {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Step two: register the uploaded bytes as a media item. The
    /// description is what the Photos UI shows under the photo.
    pub fn create_media_item(
        &self,
        upload_token: String,
        description: &str,
    ) -> Result<(), SiftError> {
        let item_err = |message: String| SiftError::MediaItemCreate {
            name: description.to_string(),
            message,
        };

        let request = BatchCreateRequest {
            new_media_items: vec![NewMediaItem {
                description: description.to_string(),
                simple_media_item: SimpleMediaItem { upload_token },
            }],
        };

        let response = self
            .client
            .post(BATCH_CREATE_URL)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .map_err(|e| item_err(e.to_string()))?;

        if !response.status().is_success() {
            return Err(item_err(format!("HTTP {}", response.status().as_u16())));
        }

        let parsed: BatchCreateResponse = response.json().map_err(|e| item_err(e.to_string()))?;
        let result = parsed
            .new_media_item_results
            .first()
            .ok_or_else(|| item_err("empty batch response".to_string()))?;

        match &result.status {
            Some(status) if !status.is_ok() => Err(item_err(status.describe())),
            _ => Ok(()),
        }
    }
}

/// JPEGs declare their real type; RAW sidecars go up as generic binary.
fn upload_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") => {
            "image/jpeg"
        }
        _ => "application/octet-stream",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types (camelCase per the Photos API)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateRequest {
    new_media_items: Vec<NewMediaItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewMediaItem {
    description: String,
    simple_media_item: SimpleMediaItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimpleMediaItem {
    upload_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchCreateResponse {
    #[serde(default)]
    new_media_item_results: Vec<MediaItemResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaItemResult {
    #[serde(default)]
    status: Option<ItemStatus>,
}

/// google.rpc.Status: code 0 (or omitted) is success.
#[derive(Debug, Deserialize)]
struct ItemStatus {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

impl ItemStatus {
    fn is_ok(&self) -> bool {
        self.code.unwrap_or(0) == 0
    }

    fn describe(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => format!("code {}", self.code.unwrap_or(-1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_type_follows_jpg_rule() {
        assert_eq!(upload_content_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(upload_content_type(Path::new("b.JPG")), "image/jpeg");
        assert_eq!(upload_content_type(Path::new("c.jpeg")), "image/jpeg");
        assert_eq!(
            upload_content_type(Path::new("d.NEF")),
            "application/octet-stream"
        );
        assert_eq!(
            upload_content_type(Path::new("noext")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_batch_create_request_wire_shape() {
        let request = BatchCreateRequest {
            new_media_items: vec![NewMediaItem {
                description: "IMG_0042.jpg".to_string(),
                simple_media_item: SimpleMediaItem {
                    upload_token: "tok-123".to_string(),
                },
            }],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "newMediaItems": [{
                    "description": "IMG_0042.jpg",
                    "simpleMediaItem": { "uploadToken": "tok-123" }
                }]
            })
        );
    }

    #[test]
    fn test_batch_response_success_variants() {
        let ok: BatchCreateResponse = serde_json::from_value(json!({
            "newMediaItemResults": [
                { "status": { "message": "Success" } }
            ]
        }))
        .unwrap();
        assert!(ok.new_media_item_results[0]
            .status
            .as_ref()
            .is_none_or(ItemStatus::is_ok));

        let missing_status: BatchCreateResponse = serde_json::from_value(json!({
            "newMediaItemResults": [{}]
        }))
        .unwrap();
        assert!(missing_status.new_media_item_results[0].status.is_none());
    }

    #[test]
    fn test_batch_response_failure_is_reported() {
        let failed: BatchCreateResponse = serde_json::from_value(json!({
            "newMediaItemResults": [
                { "status": { "code": 3, "message": "NO_UPLOAD_TOKEN" } }
            ]
        }))
        .unwrap();

        let status = failed.new_media_item_results[0].status.as_ref().unwrap();
        assert!(!status.is_ok());
        assert_eq!(status.describe(), "NO_UPLOAD_TOKEN");
    }
}
