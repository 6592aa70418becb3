use std::time::Duration;

use anyhow::{Context as _, anyhow};
use serde::Deserialize;

use crate::domain::repository::SmsGateway;
use crate::error::AuthServiceError;

const KAVENEGAR_BASE_URL: &str = "https://api.kavenegar.com/v1";

/// SMS template registered with the provider for OTP delivery.
const OTP_TEMPLATE: &str = "otp_code";

/// Kavenegar verify-lookup client: one template, one token per message.
#[derive(Clone)]
pub struct KavenegarClient {
    http: reqwest::Client,
    api_key: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(rename = "return")]
    ret: LookupReturn,
}

#[derive(Deserialize)]
struct LookupReturn {
    status: i32,
    message: String,
}

impl KavenegarClient {
    /// `timeout` bounds the whole gateway call; hitting it is a delivery
    /// failure like any other.
    pub fn new(api_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build sms http client")?;
        Ok(Self { http, api_key })
    }

    fn lookup_url(&self) -> String {
        format!("{KAVENEGAR_BASE_URL}/{}/verify/lookup.json", self.api_key)
    }
}

impl SmsGateway for KavenegarClient {
    async fn send_otp_code(&self, mobile: &str, code: &str) -> Result<(), AuthServiceError> {
        tracing::debug!(mobile, template = OTP_TEMPLATE, "dispatching otp sms");

        let response = self
            .http
            .post(self.lookup_url())
            .query(&[
                ("receptor", mobile),
                ("template", OTP_TEMPLATE),
                ("token", code),
            ])
            .send()
            .await
            .map_err(|e| AuthServiceError::Delivery(anyhow!(e).context("sms gateway request")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthServiceError::Delivery(anyhow!(
                "sms gateway returned {status}"
            )));
        }

        let body: LookupResponse = response.json().await.map_err(|e| {
            AuthServiceError::Delivery(anyhow!(e).context("decode sms gateway response"))
        })?;

        if body.ret.status != 200 {
            return Err(AuthServiceError::Delivery(anyhow!(
                "sms gateway rejected the message: {} ({})",
                body.ret.message,
                body.ret.status
            )));
        }

        Ok(())
    }
}
