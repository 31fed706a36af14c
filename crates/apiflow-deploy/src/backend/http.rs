//! Bearer認証付きの共通HTTPクライアント

use crate::error::{DeployError, Result};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

pub(crate) struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub(crate) fn new(base_url: &str, token: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("apiflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeployError::transport("failed to build HTTP client", e))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub(crate) fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.token)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.token)
    }
}

/// リクエストを送信する（通信エラーには呼び出し内容を付ける）
pub(crate) async fn send(request: RequestBuilder, context: &str) -> Result<Response> {
    request
        .send()
        .await
        .map_err(|e| DeployError::transport(context, e))
}

/// 非2xxのレスポンスボディをそのまま取り出す
pub(crate) async fn error_body(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    (status, body_text(response.text().await))
}

/// 読み取りに失敗したボディは、そのエラーを本文の代わりにする
fn body_text(body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| format!("<failed to read response body: {}>", e))
}

pub(crate) async fn json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| DeployError::transport(context, e))
}
