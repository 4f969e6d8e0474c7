//! Sonoff switches through the eWeLink cloud (API v2).
//!
//! Credentials: `access_token` and `app_id` (required), `region`
//! (default `eu`), and `base_url` to point at a different API host.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use switchyard_app::ports::DeviceDriver;
use switchyard_domain::credentials::Credentials;
use switchyard_domain::device::PowerState;
use switchyard_domain::error::{ConfigurationError, ExecutionError};

use crate::error::DeviceError;
use crate::http::{parse_power, read_json};

const DEFAULT_REGION: &str = "eu";
const ITEM_TYPE_DEVICE: u8 = 1;

/// eWeLink response envelope.
#[derive(Deserialize)]
struct Envelope<T> {
    error: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self) -> Result<Option<T>, DeviceError> {
        if self.error == 0 {
            Ok(self.data)
        } else {
            Err(DeviceError::Api {
                code: self.error,
                message: self.msg,
            })
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThingList {
    thing_list: Vec<Thing>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Thing {
    item_data: ItemData,
}

#[derive(Deserialize)]
struct ItemData {
    #[serde(default)]
    online: bool,
    params: Params,
}

#[derive(Deserialize)]
struct Params {
    switch: String,
}

/// Driver for one eWeLink-connected Sonoff device.
pub struct SonoffDriver {
    client: reqwest::Client,
    base_url: String,
    device_id: String,
    access_token: String,
    app_id: String,
}

impl SonoffDriver {
    /// Build a driver from device credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError`] when `access_token` or `app_id` is
    /// missing.
    pub fn from_credentials(
        client: reqwest::Client,
        device_id: &str,
        credentials: &Credentials,
    ) -> Result<Self, ConfigurationError> {
        let access_token = credentials.require("access_token")?.to_string();
        let app_id = credentials.require("app_id")?.to_string();
        let base_url = match credentials.get("base_url") {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let region = credentials.get("region").unwrap_or(DEFAULT_REGION);
                format!("https://{region}-apia.coolkit.cc")
            }
        };
        Ok(Self {
            client,
            base_url,
            device_id: device_id.to_string(),
            access_token,
            app_id,
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<Option<T>, DeviceError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.access_token)
            .header("X-CK-Appid", &self.app_id)
            .json(body)
            .send()
            .await?;
        let envelope: Envelope<T> = read_json(response).await?;
        envelope.into_data()
    }
}

impl DeviceDriver for SonoffDriver {
    async fn switch(&self, state: PowerState) -> Result<(), ExecutionError> {
        tracing::debug!(device_id = %self.device_id, %state, "ewelink switch");
        let body = json!({
            "type": ITEM_TYPE_DEVICE,
            "id": self.device_id,
            "params": { "switch": state.as_str() },
        });
        self.post::<Value>("/v2/device/thing/status", &body).await?;
        Ok(())
    }

    async fn status(&self) -> Result<PowerState, ExecutionError> {
        tracing::debug!(device_id = %self.device_id, "ewelink status");
        let body = json!({
            "thingList": [{ "itemType": ITEM_TYPE_DEVICE, "id": self.device_id }],
        });
        let things: Option<ThingList> = self.post("/v2/device/thing", &body).await?;
        let thing = things
            .and_then(|list| list.thing_list.into_iter().next())
            .ok_or_else(|| DeviceError::UnexpectedState("empty thing list".to_string()))?;
        if !thing.item_data.online {
            return Err(DeviceError::Offline(self.device_id.clone()).into());
        }
        Ok(parse_power(&thing.item_data.params.switch)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use switchyard_domain::action::FailureKind;

    fn driver(server: &Server) -> SonoffDriver {
        let credentials = Credentials::new()
            .with("access_token", "token-123")
            .with("app_id", "app-456")
            .with("base_url", server.url());
        SonoffDriver::from_credentials(reqwest::Client::new(), "1000abcdef", &credentials).unwrap()
    }

    fn thing_body(online: bool, switch: &str) -> String {
        json!({
            "error": 0,
            "msg": "",
            "data": {
                "thingList": [{
                    "itemType": 1,
                    "itemData": {
                        "deviceid": "1000abcdef",
                        "online": online,
                        "params": { "switch": switch },
                    },
                }],
            },
        })
        .to_string()
    }

    #[tokio::test]
    async fn should_post_switch_command_then_read_back() {
        let mut server = Server::new_async().await;
        let command = server
            .mock("POST", "/v2/device/thing/status")
            .match_header("authorization", "Bearer token-123")
            .match_header("x-ck-appid", "app-456")
            .match_body(Matcher::Json(json!({
                "type": 1,
                "id": "1000abcdef",
                "params": { "switch": "off" },
            })))
            .with_body(r#"{"error":0,"msg":"","data":{}}"#)
            .expect(1)
            .create_async()
            .await;
        let status = server
            .mock("POST", "/v2/device/thing")
            .match_body(Matcher::PartialJson(json!({
                "thingList": [{ "itemType": 1, "id": "1000abcdef" }],
            })))
            .with_body(thing_body(true, "off"))
            .expect(1)
            .create_async()
            .await;

        driver(&server).off().await.unwrap();

        command.assert_async().await;
        status.assert_async().await;
    }

    #[tokio::test]
    async fn should_fail_when_device_is_offline() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/device/thing")
            .with_body(thing_body(false, "on"))
            .create_async()
            .await;

        let err = driver(&server).status().await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Network);
        assert!(err.describe().contains("offline"));
    }

    #[tokio::test]
    async fn should_fail_on_error_envelope() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/device/thing/status")
            .with_body(r#"{"error":401,"msg":"token expired","data":{}}"#)
            .create_async()
            .await;

        let err = driver(&server).switch(PowerState::On).await.unwrap_err();

        assert_eq!(err.kind(), FailureKind::Network);
        assert!(err.describe().contains("token expired"));
    }

    #[test]
    fn should_default_to_eu_region() {
        let credentials = Credentials::new()
            .with("access_token", "t")
            .with("app_id", "a");
        let driver = SonoffDriver::from_credentials(reqwest::Client::new(), "1000", &credentials).unwrap();
        assert_eq!(driver.base_url, "https://eu-apia.coolkit.cc");
    }

    #[test]
    fn should_require_access_token() {
        let credentials = Credentials::new().with("app_id", "a");
        let result = SonoffDriver::from_credentials(reqwest::Client::new(), "1000", &credentials);
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingField { field }) if field == "access_token"
        ));
    }
}
