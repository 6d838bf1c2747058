use gloo::net::http::{Request, Response};
use shared::{ApiFailure, DeleteRequest, EntityInfo, Fields, Record, SaveTarget};

/// API client for the record endpoints
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// Create a new API client talking to the page's own origin
    pub fn new() -> Self {
        Self {
            base_url: String::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Ask the server which entity it is configured for
    pub async fn entity(&self) -> Result<EntityInfo, ApiFailure> {
        let response = Request::get(&self.url("/entity"))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Fetch the record list (at most 100, server order)
    pub async fn list_records(&self) -> Result<Vec<Record>, ApiFailure> {
        let response = Request::get(&self.url("/data"))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Create or update, depending on whether the fields carry an id
    pub async fn save_record(&self, fields: &Fields) -> Result<Record, ApiFailure> {
        let target = SaveTarget::for_fields(fields);
        let url = self.url(&target.path());
        let builder = match target {
            SaveTarget::Create => Request::post(&url),
            SaveTarget::Update(_) => Request::put(&url),
        };

        let response = builder
            .header("Accept", "application/json")
            .json(fields)
            .map_err(|e| ApiFailure::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        Self::decode(response).await
    }

    /// Delete a confirmed record, returning what the server removed
    pub async fn delete_record(&self, request: &DeleteRequest) -> Result<Record, ApiFailure> {
        let response = Request::delete(&self.url(&request.path()))
            .send()
            .await
            .map_err(|e| ApiFailure::Network(e.to_string()))?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiFailure> {
        if !response.ok() {
            let status_text = response.status_text();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiFailure::rejected(status_text, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiFailure::Decode(e.to_string()))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
