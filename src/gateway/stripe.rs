//! Stripe REST gateway
//!
//! Form-encoded requests, bearer auth, JSON responses. Failures are mapped
//! onto `GatewayError`; a 404 becomes `NotFound`, everything else keeps the
//! Stripe error type for the logs. Nothing here retries.

use super::{models::*, CouponExpand, PaymentGateway};
use crate::config::StripeSettings;
use crate::errors::GatewayError;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

const LIST_PAGE_SIZE: &str = "100";

// Stripe REST error envelope: { error: { type, message } }
#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(settings: &StripeSettings) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        Ok(Self {
            http,
            secret_key: settings.secret_key.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn map_error(status: StatusCode, body: &str) -> GatewayError {
        match serde_json::from_str::<StripeErrorEnvelope>(body) {
            Ok(env) => GatewayError::Api {
                status: status.as_u16(),
                error_type: env.error.type_,
                message: env.error.message,
            },
            Err(_) => GatewayError::Http(format!("status={} body={}", status.as_u16(), body)),
        }
    }

    /// Sends a request and decodes the body. `resource` names what a 404 means.
    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        resource: &str,
    ) -> Result<T, GatewayError> {
        let resp = req
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        if status.is_success() {
            serde_json::from_str::<T>(&text).map_err(|e| GatewayError::Decode(e.to_string()))
        } else if status == StatusCode::NOT_FOUND {
            Err(GatewayError::NotFound(resource.to_string()))
        } else {
            Err(Self::map_error(status, &text))
        }
    }

    /// Walks a cursor-paginated list endpoint, following `starting_after`
    /// from the last element of each page until `has_more` is false.
    async fn list_all<T, F>(
        &self,
        path: &str,
        query: &[(&str, String)],
        resource: &str,
        id_of: F,
    ) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> &str,
    {
        let mut items = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            debug!(target: "stripe", method = "GET", path, cursor = cursor.as_deref(), "stripe request");
            let mut req = self
                .http
                .get(self.url(path))
                .query(&[("limit", LIST_PAGE_SIZE)])
                .query(query);
            if let Some(after) = &cursor {
                req = req.query(&[("starting_after", after.as_str())]);
            }

            let page: ListResponse<T> = self.send(req, resource).await?;
            let next = match (page.has_more, page.data.last()) {
                (true, Some(last)) => Some(id_of(last).to_string()),
                _ => None,
            };
            items.extend(page.data);

            match next {
                Some(after) => cursor = Some(after),
                None => return Ok(items),
            }
        }
    }

    async fn active_price(&self, product_id: &str) -> Result<Price, GatewayError> {
        debug!(target: "stripe", method = "GET", path = "/v1/prices", product_id, "stripe request");
        let req = self.http.get(self.url("/v1/prices")).query(&[
            ("product", product_id),
            ("active", "true"),
            ("limit", "1"),
        ]);
        let list: ListResponse<Price> = self
            .send(req, &format!("Product {}", product_id))
            .await?;

        list.data
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::NotFound(format!("Price for product {}", product_id)))
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[instrument(skip(self))]
    async fn unit_price(&self, product_id: &str) -> Result<u64, GatewayError> {
        self.active_price(product_id)
            .await?
            .unit_amount
            .ok_or_else(|| GatewayError::NotFound(format!("Price for product {}", product_id)))
    }

    #[instrument(skip(self))]
    async fn price_reference(&self, product_id: &str) -> Result<String, GatewayError> {
        Ok(self.active_price(product_id).await?.id)
    }

    #[instrument(skip(self))]
    async fn coupon(&self, coupon_id: &str, expand: CouponExpand) -> Result<Coupon, GatewayError> {
        debug!(target: "stripe", method = "GET", path = "/v1/coupons/{id}", coupon_id, ?expand, "stripe request");
        let mut req = self.http.get(self.url(&format!("/v1/coupons/{}", coupon_id)));
        if expand == CouponExpand::AppliesTo {
            req = req.query(&[("expand[]", "applies_to")]);
        }
        self.send(req, &format!("Coupon {}", coupon_id)).await
    }

    #[instrument(skip(self, metadata))]
    async fn update_coupon_metadata(
        &self,
        coupon_id: &str,
        metadata: HashMap<String, String>,
    ) -> Result<(), GatewayError> {
        debug!(target: "stripe", method = "POST", path = "/v1/coupons/{id}", coupon_id, "stripe request");
        let form: Vec<(String, String)> = metadata
            .into_iter()
            .map(|(k, v)| (format!("metadata[{}]", k), v))
            .collect();
        let req = self
            .http
            .post(self.url(&format!("/v1/coupons/{}", coupon_id)))
            .form(&form);
        let _updated: Coupon = self.send(req, &format!("Coupon {}", coupon_id)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_coupons(&self) -> Result<Vec<Coupon>, GatewayError> {
        self.list_all("/v1/coupons", &[], "Coupons", |c: &Coupon| c.id.as_str())
            .await
    }

    #[instrument(skip(self))]
    async fn promotion_code(&self, id: &str) -> Result<PromotionCode, GatewayError> {
        let req = self.http.get(self.url(&format!("/v1/promotion_codes/{}", id)));
        self.send(req, &format!("Promotion code {}", id)).await
    }

    #[instrument(skip(self))]
    async fn list_promotion_codes(
        &self,
        filter: &PromotionCodeFilter,
    ) -> Result<Vec<PromotionCode>, GatewayError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(code) = &filter.code {
            query.push(("code", code.clone()));
        }
        if let Some(coupon) = &filter.coupon {
            query.push(("coupon", coupon.clone()));
        }
        if let Some(active) = filter.active {
            query.push(("active", active.to_string()));
        }
        self.list_all(
            "/v1/promotion_codes",
            &query,
            "Promotion codes",
            |p: &PromotionCode| p.id.as_str(),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn create_payment_intent(
        &self,
        amount: u64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        debug!(target: "stripe", method = "POST", path = "/v1/payment_intents", amount, currency, "stripe request");
        let form = [
            ("amount", amount.to_string()),
            ("currency", currency.to_ascii_lowercase()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        let req = self.http.post(self.url("/v1/payment_intents")).form(&form);
        self.send(req, "Payment intent").await
    }

    #[instrument(skip(self))]
    async fn confirm_payment_intent(
        &self,
        id: &str,
        payment_method: &str,
        return_url: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        debug!(target: "stripe", method = "POST", path = "/v1/payment_intents/{id}/confirm", intent_id = id, "stripe request");
        let form = [("payment_method", payment_method), ("return_url", return_url)];
        let req = self
            .http
            .post(self.url(&format!("/v1/payment_intents/{}/confirm", id)))
            .form(&form);
        self.send(req, &format!("Payment intent {}", id)).await
    }

    #[instrument(skip(self))]
    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, GatewayError> {
        let req = self.http.get(self.url(&format!("/v1/payment_intents/{}", id)));
        self.send(req, &format!("Payment intent {}", id)).await
    }

    #[instrument(skip(self, request), fields(coupon_id = %request.coupon_id, lines = request.line_items.len()))]
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        debug!(target: "stripe", method = "POST", path = "/v1/checkout/sessions", "stripe request");
        let mut form: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("success_url".into(), request.success_url.clone()),
            ("cancel_url".into(), request.cancel_url.clone()),
            ("discounts[0][coupon]".into(), request.coupon_id.clone()),
        ];
        for (i, line) in request.line_items.iter().enumerate() {
            form.push((format!("line_items[{}][price]", i), line.price.clone()));
            form.push((format!("line_items[{}][quantity]", i), line.quantity.to_string()));
        }
        let req = self.http.post(self.url("/v1/checkout/sessions")).form(&form);
        self.send(req, "Checkout session").await
    }
}
