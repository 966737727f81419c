//! HyP3 subscriptions API client.

use tracing::debug;

use crate::error::Hyp3Error;
use crate::models::{
    NewSubscription, SubmitRequest, SubmitResponse, Subscription, SubscriptionUpdate,
    SubscriptionsResponse,
};

/// Earthdata URS endpoint that establishes an authenticated session for the
/// HyP3 API. The redirect chain sets the session cookie on the client's
/// cookie store.
const EARTHDATA_AUTHORIZE_URL: &str =
    "https://urs.earthdata.nasa.gov/oauth/authorize?response_type=code&client_id=BO_n7nTIlMljdvU6kRRB3g&redirect_uri=https://auth.asf.alaska.edu/login&app_type=401";

/// Client for the HyP3 subscriptions API.
///
/// Authentication is a two-step affair: construct the client against an API
/// URL, then call [`Hyp3Client::login`] once with Earthdata credentials. The
/// session cookie obtained from the URS redirect chain is carried on every
/// subsequent request.
#[derive(Debug, Clone)]
pub struct Hyp3Client {
    http: reqwest::Client,
    api_url: String,
}

impl Hyp3Client {
    /// Create a client for the given API URL. No credentials are exchanged
    /// until [`Hyp3Client::login`] is called.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_url: impl Into<String>) -> Result<Self, Hyp3Error> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(concat!("hyp3-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut api_url = api_url.into();
        while api_url.ends_with('/') {
            api_url.pop();
        }

        Ok(Self { http, api_url })
    }

    /// Establish an Earthdata session for this client.
    ///
    /// # Errors
    ///
    /// Returns [`Hyp3Error::Auth`] if the URS endpoint rejects the
    /// credentials, or [`Hyp3Error::Http`] on transport failure.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), Hyp3Error> {
        debug!(username, "Establishing Earthdata session");

        let response = self
            .http
            .get(EARTHDATA_AUTHORIZE_URL)
            .basic_auth(username, Some(password))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Hyp3Error::Auth(format!(
                "URS authorization returned {status} for user {username}"
            )));
        }

        Ok(())
    }

    /// Fetch the subscriptions whose name matches `name` exactly.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn subscriptions_by_name(
        &self,
        name: &str,
    ) -> Result<SubscriptionsResponse, Hyp3Error> {
        let url = format!("{}/subscriptions", self.api_url);
        debug!(name, "Querying subscriptions by name");

        let response = self.http.get(&url).query(&[("name", name)]).send().await?;
        Self::parse(response).await
    }

    /// Fetch every subscription belonging to the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn list_subscriptions(&self) -> Result<SubscriptionsResponse, Hyp3Error> {
        let url = format!("{}/subscriptions", self.api_url);
        let response = self.http.get(&url).send().await?;
        Self::parse(response).await
    }

    /// Submit a new subscription, returning the stored record with its
    /// assigned identifier.
    ///
    /// With `validate_only` set, the API runs its server-side checks without
    /// persisting anything; used for dry runs.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn submit_subscription(
        &self,
        subscription: NewSubscription,
        validate_only: bool,
    ) -> Result<Subscription, Hyp3Error> {
        let url = format!("{}/subscriptions", self.api_url);
        debug!(
            name = %subscription.job_specification.name,
            validate_only,
            "Submitting subscription"
        );

        let request = SubmitRequest {
            subscription,
            validate_only,
        };
        let response = self.http.post(&url).json(&request).send().await?;
        let envelope: SubmitResponse = Self::parse(response).await?;
        Ok(envelope.subscription)
    }

    /// Update mutable fields of an existing subscription.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success response.
    pub async fn update_subscription(
        &self,
        subscription_id: &str,
        update: SubscriptionUpdate,
    ) -> Result<Subscription, Hyp3Error> {
        let url = format!("{}/subscriptions/{subscription_id}", self.api_url);
        debug!(subscription_id, "Updating subscription");

        let response = self.http.patch(&url).json(&update).send().await?;
        Self::parse(response).await
    }

    /// Decode a response body, mapping non-success statuses to
    /// [`Hyp3Error::Api`].
    async fn parse<T>(response: reqwest::Response) -> Result<T, Hyp3Error>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Hyp3Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(Hyp3Error::Serialization)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let client = Hyp3Client::new("https://hyp3-pdc.example.com/").unwrap();
        assert_eq!(client.api_url, "https://hyp3-pdc.example.com");
    }
}
