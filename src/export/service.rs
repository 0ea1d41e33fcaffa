use std::time::Duration;

use async_trait::async_trait;

use crate::{
    export::request::ExportRequest,
    foundation::error::{RibbonError, RibbonResult},
};

/// Raw answer from the render service.
///
/// The body is only read on success; for any other status it is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ServiceResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The remote renderer, reached through one request/response exchange per export.
///
/// `Err` is reserved for transport-level failures (connection, timeout, unreadable
/// body). A non-success status is a normal `Ok` response.
#[async_trait(?Send)]
pub trait RenderService {
    async fn render(&self, request: &ExportRequest) -> RibbonResult<ServiceResponse>;
}

/// [`RenderService`] over HTTP: `POST <url>` with the request as JSON.
#[derive(Clone, Debug)]
pub struct HttpRenderService {
    url: String,
    client: reqwest::Client,
}

impl HttpRenderService {
    pub fn new(url: impl Into<String>, timeout: Duration) -> RibbonResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RibbonError::transport(format!("build http client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait(?Send)]
impl RenderService for HttpRenderService {
    async fn render(&self, request: &ExportRequest) -> RibbonResult<ServiceResponse> {
        tracing::debug!(url = %self.url, width = request.width, "sending export request");
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(ServiceResponse {
                status: status.as_u16(),
                body: Vec::new(),
            });
        }
        let body = response.bytes().await?;
        Ok(ServiceResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}
