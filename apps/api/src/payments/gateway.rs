//! Payment gateway seam. Handlers only see `Arc<dyn PaymentGateway>`; the
//! Razorpay implementation talks to its Orders API and checks checkout
//! signatures locally.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::payments::signature;

const RAZORPAY_API_URL: &str = "https://api.razorpay.com";

/// An order as created on the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder, AppError>;

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Public key id handed to the browser checkout.
    fn key_id(&self) -> &str;
}

pub struct RazorpayGateway {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    notes: Value,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayErrorBody,
}

#[derive(Debug, Deserialize)]
struct RazorpayErrorBody {
    description: Option<String>,
}

impl RazorpayGateway {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: RAZORPAY_API_URL.to_string(),
            key_id,
            key_secret,
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: Value,
    ) -> Result<GatewayOrder, AppError> {
        debug!(amount, currency, receipt, "Creating Razorpay order");

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency,
                receipt,
                notes,
            })
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Order request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<RazorpayErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error.description)
                .unwrap_or(body);
            warn!("Razorpay returned {status}: {message}");
            return Err(AppError::Gateway(format!(
                "Order creation failed ({status}): {message}"
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| AppError::Gateway(format!("Unexpected order response: {e}")))
    }

    fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        signature::verify(order_id, payment_id, signature, &self.key_secret)
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_checks_signatures_with_key_secret() {
        let gateway = RazorpayGateway::new("rzp_test_key".into(), "gateway-secret".into());
        let good = signature::sign("order_1", "pay_1", "gateway-secret");
        assert!(gateway.verify_signature("order_1", "pay_1", &good));
        assert!(!gateway.verify_signature("order_1", "pay_2", &good));
        assert_eq!(gateway.key_id(), "rzp_test_key");
    }

    #[test]
    fn test_order_body_shape() {
        let body = serde_json::to_value(CreateOrderBody {
            amount: 9_900,
            currency: "INR",
            receipt: "rcpt_1",
            notes: serde_json::json!({"pack_id": "starter"}),
        })
        .unwrap();
        assert_eq!(body["amount"], 9_900);
        assert_eq!(body["notes"]["pack_id"], "starter");
    }
}
