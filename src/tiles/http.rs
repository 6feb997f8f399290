//! Spreadsheet backend endpoints.
//!
//! URL construction is target-independent; the [`HttpTileSource`] that issues
//! the requests exists on wasm32 only and uses the browser `fetch` API.

use url::Url;

use crate::error::{AuditViewError, Result};
use crate::types::{Address, PageRequest};

/// Absolute URLs of the `meta`, `page`, and `spotlight` endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Build from an absolute base URL such as `https://host/api/excel`.
    pub fn new(base: &str) -> Result<Self> {
        Ok(Self {
            base: Url::parse(base)?,
        })
    }

    /// Resolve a possibly relative `api_base` against the page origin.
    pub fn resolve(origin: &str, api_base: &str) -> Result<Self> {
        let base = Url::parse(origin)?.join(api_base)?;
        Ok(Self { base })
    }

    fn endpoint(&self, name: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| AuditViewError::Config(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .push(name);
        Ok(url)
    }

    pub fn meta_url(&self, file_id: &str) -> Result<Url> {
        let mut url = self.endpoint("meta")?;
        url.query_pairs_mut().append_pair("file_id", file_id);
        Ok(url)
    }

    pub fn page_url(&self, file_id: &str, request: &PageRequest) -> Result<Url> {
        let mut url = self.endpoint("page")?;
        url.query_pairs_mut()
            .append_pair("file_id", file_id)
            .append_pair("sheet", &request.sheet)
            .append_pair("r0", &request.r0.to_string())
            .append_pair("r1", &request.r1.to_string())
            .append_pair("c0", &request.c0.to_string())
            .append_pair("c1", &request.c1.to_string());
        Ok(url)
    }

    pub fn spotlight_url(&self, file_id: &str, sheet: &str, cell: Address) -> Result<Url> {
        let mut url = self.endpoint("spotlight")?;
        url.query_pairs_mut()
            .append_pair("file_id", file_id)
            .append_pair("sheet", sheet)
            .append_pair("cell", &cell.to_string());
        Ok(url)
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::HttpTileSource;

#[cfg(target_arch = "wasm32")]
mod browser {
    use serde::de::DeserializeOwned;
    use url::Url;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::Endpoints;
    use crate::error::{AuditViewError, Result};
    use crate::tiles::TileSource;
    use crate::types::{Address, MetaResponse, PageRequest, Spotlight, Tile};

    fn js_err(e: &wasm_bindgen::JsValue) -> AuditViewError {
        AuditViewError::Fetch(format!("{e:?}"))
    }

    /// Tile source backed by the browser `fetch` API.
    #[derive(Debug, Clone)]
    pub struct HttpTileSource {
        endpoints: Endpoints,
    }

    impl HttpTileSource {
        pub fn new(endpoints: Endpoints) -> Self {
            Self { endpoints }
        }

        async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T> {
            let window = web_sys::window()
                .ok_or_else(|| AuditViewError::Fetch("no window".to_string()))?;
            let opts = RequestInit::new();
            opts.set_method("GET");
            opts.set_mode(RequestMode::Cors);
            let request = Request::new_with_str_and_init(url.as_str(), &opts)
                .map_err(|e| js_err(&e))?;
            let value = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(|e| js_err(&e))?;
            let response: Response = value.dyn_into().map_err(|e| js_err(&e))?;
            if !response.ok() {
                return Err(AuditViewError::Http {
                    status: response.status(),
                    url: url.to_string(),
                });
            }
            let body = JsFuture::from(response.text().map_err(|e| js_err(&e))?)
                .await
                .map_err(|e| js_err(&e))?;
            let text = body
                .as_string()
                .ok_or_else(|| AuditViewError::Fetch("response body is not text".to_string()))?;
            Ok(serde_json::from_str(&text)?)
        }
    }

    impl TileSource for HttpTileSource {
        async fn meta(&self, file_id: &str) -> Result<MetaResponse> {
            let url = self.endpoints.meta_url(file_id)?;
            self.get_json(&url).await
        }

        async fn page(&self, file_id: &str, request: &PageRequest) -> Result<Tile> {
            let url = self.endpoints.page_url(file_id, request)?;
            self.get_json(&url).await
        }

        async fn spotlight(&self, file_id: &str, sheet: &str, cell: Address) -> Result<Spotlight> {
            let url = self.endpoints.spotlight_url(file_id, sheet, cell)?;
            self.get_json(&url).await
        }
    }
}
