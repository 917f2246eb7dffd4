use crate::errors::{Result, DataGenError};
use crate::storage::ObjectStore;
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use log::{debug, info};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const DEFAULT_API_BASE: &str = "https://storage.googleapis.com";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: u64 = 3600;
// 提前刷新，避免请求途中过期
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Service-account key file, only the fields needed for the JWT bearer flow
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            DataGenError::CredentialsError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DataGenError::CredentialsError(format!("Invalid service account file {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// Google Cloud Storage 客户端，绑定单个 bucket
pub struct GcsStore {
    client: Client,
    bucket: String,
    key: ServiceAccountKey,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
}

impl GcsStore {
    pub fn new(key: ServiceAccountKey, bucket: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DataGenError::RequestError)?;

        Ok(Self {
            client,
            bucket: bucket.to_string(),
            key,
            api_base: DEFAULT_API_BASE.to_string(),
            token: Mutex::new(None),
        })
    }

    /// 从服务账号密钥文件创建客户端
    pub fn from_service_account_file(path: &Path, bucket: &str, timeout: Option<Duration>) -> Result<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        info!("Using service account {} for bucket {}", key.client_email, bucket);
        Self::new(key, bucket, timeout)
    }

    /// Point the client at another storage endpoint, e.g. an emulator
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| DataGenError::StorageError(format!("Invalid API base {}: {}", self.api_base, e)))?;
        url.path_segments_mut()
            .map_err(|_| DataGenError::StorageError(format!("Invalid API base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// 对象元数据地址，对象名按路径段编码
    fn object_url(&self, name: &str) -> Result<Url> {
        self.endpoint(&["storage", "v1", "b", self.bucket.as_str(), "o", name])
    }

    fn upload_url(&self) -> Result<Url> {
        self.endpoint(&["upload", "storage", "v1", "b", self.bucket.as_str(), "o"])
    }

    fn signed_assertion(&self) -> Result<String> {
        let iat = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: STORAGE_SCOPE,
            aud: &self.key.token_uri,
            iat,
            exp: iat + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_REFRESH_MARGIN {
                return Ok(token.value.clone());
            }
        }

        debug!("Requesting access token from {}", self.key.token_uri);
        let assertion = self.signed_assertion()?;
        let response = self.client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataGenError::CredentialsError(format!(
                "Token request failed: HTTP {}: {}", status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn exists(&self, name: &str) -> Result<bool> {
        let token = self.access_token().await?;
        let response = self.client
            .get(self.object_url(name)?)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DataGenError::StorageError(format!(
                    "Existence check for gs://{}/{} failed: HTTP {}: {}", self.bucket, name, status, body
                )))
            }
        }
    }

    async fn upload(&self, name: &str, local_path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(local_path).await?;
        let token = self.access_token().await?;

        info!("Uploading {} ({} bytes) to gs://{}/{}", local_path.display(), bytes.len(), self.bucket, name);

        // ifGenerationMatch=0 仅在对象不存在时写入
        let response = self.client
            .post(self.upload_url()?)
            .query(&[("uploadType", "media"), ("name", name), ("ifGenerationMatch", "0")])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(bytes)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::PRECONDITION_FAILED => Err(DataGenError::StorageError(format!(
                "Object gs://{}/{} already exists", self.bucket, name
            ))),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(DataGenError::StorageError(format!(
                    "Upload of gs://{}/{} failed: HTTP {}: {}", self.bucket, name, status, body
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn test_key() -> ServiceAccountKey {
        ServiceAccountKey {
            client_email: "uploader@project.iam.gserviceaccount.com".to_string(),
            private_key: "not-a-real-key".to_string(),
            token_uri: DEFAULT_TOKEN_URI.to_string(),
        }
    }

    #[test]
    fn object_url_encodes_name_as_single_segment() {
        let store = GcsStore::new(test_key(), "stock-price-history", None).unwrap();

        assert_eq!(
            store.object_url("AAPL_data.csv").unwrap().as_str(),
            "https://storage.googleapis.com/storage/v1/b/stock-price-history/o/AAPL_data.csv"
        );
        assert_eq!(
            store.object_url("daily/BRK B.csv").unwrap().as_str(),
            "https://storage.googleapis.com/storage/v1/b/stock-price-history/o/daily%2FBRK%20B.csv"
        );
    }

    #[test]
    fn upload_url_respects_api_base() {
        let store = GcsStore::new(test_key(), "prices", None)
            .unwrap()
            .with_api_base("http://localhost:4443/");

        assert_eq!(
            store.upload_url().unwrap().as_str(),
            "http://localhost:4443/upload/storage/v1/b/prices/o"
        );
    }

    #[test]
    fn key_file_defaults_token_uri() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type": "service_account", "client_email": "a@b.iam.gserviceaccount.com", "private_key": "pem"}}"#
        )
        .unwrap();

        let key = ServiceAccountKey::from_file(file.path()).unwrap();
        assert_eq!(key.client_email, "a@b.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn missing_key_file_is_credentials_error() {
        let result = GcsStore::from_service_account_file(
            Path::new("/nonexistent/service_account.json"),
            "prices",
            None,
        );
        assert!(matches!(result, Err(DataGenError::CredentialsError(_))));
    }

    #[test]
    fn malformed_key_file_is_credentials_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"client_email\": 42}}").unwrap();

        assert!(matches!(
            ServiceAccountKey::from_file(file.path()),
            Err(DataGenError::CredentialsError(_))
        ));
    }

    #[test]
    fn invalid_private_key_fails_signing() {
        let store = GcsStore::new(test_key(), "prices", None).unwrap();
        assert!(matches!(store.signed_assertion(), Err(DataGenError::TokenError(_))));
    }
}
