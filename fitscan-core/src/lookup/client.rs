//! HTTP client for the barcode product database.

use std::time::Duration;

use serde::Deserialize;

use super::error::LookupError;
use super::ProductSource;
use crate::models::Product;

/// Nutritionix item search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://trackapi.nutritionix.com/v2/search/item";
/// Upper bound on a single lookup. The scan guard only clears once a lookup resolves.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the product database.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub endpoint: String,
    pub app_id: String,
    pub app_key: String,
    pub timeout: Duration,
}

impl LookupConfig {
    pub fn new(app_id: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            app_id: app_id.into(),
            app_key: app_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ItemSearchResponse {
    #[serde(default)]
    foods: Vec<FoodRecord>,
}

#[derive(Debug, Deserialize)]
struct FoodRecord {
    food_name: Option<String>,
    nf_calories: Option<f64>,
    nf_protein: Option<f64>,
    nf_total_carbohydrate: Option<f64>,
    nf_total_fat: Option<f64>,
}

impl From<FoodRecord> for Product {
    fn from(record: FoodRecord) -> Self {
        Product::from_parts(
            record.food_name,
            record.nf_calories,
            record.nf_protein,
            record.nf_total_carbohydrate,
            record.nf_total_fat,
        )
    }
}

/// Looks up products by UPC barcode.
///
/// Every call issues one fresh request; there is no cache and no retry.
#[derive(Debug, Clone)]
pub struct ProductLookupClient {
    config: LookupConfig,
    http: reqwest::Client,
}

impl ProductLookupClient {
    pub fn new(config: LookupConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    /// Fetches the product for `barcode`.
    pub async fn lookup(&self, barcode: &str) -> Result<Product, LookupError> {
        // The payload goes out as decoded; only blank ones are refused.
        if barcode.trim().is_empty() {
            return Err(LookupError::EmptyBarcode);
        }

        tracing::info!(barcode, "Looking up product");

        let response = self
            .http
            .get(self.build_url(barcode))
            .header("x-app-id", &self.config.app_id)
            .header("x-app-key", &self.config.app_key)
            .timeout(self.config.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(barcode, status = status.as_u16(), "Product lookup failed");
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        let parsed: ItemSearchResponse = serde_json::from_str(&body)
            .map_err(|e| LookupError::MalformedBody(e.to_string()))?;

        match parsed.foods.into_iter().next() {
            Some(record) => {
                let product = Product::from(record);
                tracing::info!(
                    barcode,
                    name = %product.name,
                    calories = product.calories,
                    "Product found"
                );
                Ok(product)
            }
            None => {
                tracing::debug!(barcode, "No product for barcode");
                Err(LookupError::NotFound(barcode.to_string()))
            }
        }
    }

    fn classify(&self, error: reqwest::Error) -> LookupError {
        if error.is_timeout() {
            LookupError::Timeout(self.config.timeout)
        } else if error.is_decode() {
            LookupError::MalformedBody(error.to_string())
        } else {
            LookupError::Transport(error.to_string())
        }
    }

    fn build_url(&self, barcode: &str) -> String {
        let separator = if self.config.endpoint.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{}upc={}",
            self.config.endpoint,
            separator,
            urlencoding::encode(barcode)
        )
    }
}

impl ProductSource for ProductLookupClient {
    async fn lookup(&self, barcode: &str) -> Result<Product, LookupError> {
        ProductLookupClient::lookup(self, barcode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_PRODUCT_NAME;

    fn test_client(endpoint: &str) -> ProductLookupClient {
        ProductLookupClient::new(LookupConfig::new("id", "key").with_endpoint(endpoint))
    }

    #[test]
    fn test_build_url() {
        let client = test_client("https://api.example.com/v2/search/item");
        assert_eq!(
            client.build_url("012345678905"),
            "https://api.example.com/v2/search/item?upc=012345678905"
        );

        let client = test_client("http://localhost/item?lang=en");
        assert_eq!(
            client.build_url(" 0123 "),
            "http://localhost/item?lang=en&upc=%200123%20"
        );
        assert_eq!(
            client.build_url("a b"),
            "http://localhost/item?lang=en&upc=a%20b"
        );
    }

    #[test]
    fn test_config_defaults() {
        let config = LookupConfig::new("app", "secret");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_record_mapping_with_nulls() {
        let body = r#"{"foods":[{"food_name":null,"nf_calories":210,"nf_protein":null}]}"#;
        let parsed: ItemSearchResponse = serde_json::from_str(body).unwrap();
        let product = Product::from(parsed.foods.into_iter().next().unwrap());
        assert_eq!(product.name, UNKNOWN_PRODUCT_NAME);
        assert_eq!(product.calories, 210.0);
        assert_eq!(product.protein, 0.0);
        assert_eq!(product.carbohydrates, 0.0);
        assert_eq!(product.fat, 0.0);
    }

    #[tokio::test]
    async fn test_empty_barcode_rejected_without_request() {
        let client = test_client("http://127.0.0.1:9/never");
        let result = client.lookup("   ").await;
        assert_eq!(result, Err(LookupError::EmptyBarcode));
    }
}
