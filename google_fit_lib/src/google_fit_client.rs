use log::debug;
use reqwest::{header::HeaderMap, Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use stack_string::StackString;
use url::Url;

use health_lib::errors::HealthError as Error;

use crate::{
    google_fit_types::{DataSource, Dataset, USER_ID},
    google_oauth::AccessToken,
};

/// The three calls the importer makes against the fitness api.
#[allow(async_fn_in_trait)]
pub trait FitnessApi {
    /// Returns `HealthError::DataSourceExists` if the source is already
    /// registered.
    async fn create_data_source(&self, data_source: &DataSource) -> Result<DataSource, Error>;

    async fn get_data_source(&self, data_source_id: &str) -> Result<DataSource, Error>;

    async fn patch_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
        dataset: &Dataset,
    ) -> Result<Dataset, Error>;
}

#[derive(Debug, Clone)]
pub struct GoogleFitClient {
    client: Client,
    api_url: Url,
    access_token: AccessToken,
}

impl GoogleFitClient {
    /// # Errors
    /// Return error if `api_url` doesn't parse or the http client can't be
    /// built
    pub fn new(api_url: &str, access_token: AccessToken) -> Result<Self, Error> {
        let client = Client::builder().build()?;
        let api_url = Url::parse(api_url)?;
        Ok(Self {
            client,
            api_url,
            access_token,
        })
    }

    /// `{api_url}/users/me/dataSources/{segments...}`, each segment percent
    /// encoded.
    /// # Errors
    /// Return error if the api url can't take path segments
    pub fn data_sources_url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::StaticCustomError("api url cannot be a base"))?
            .pop_if_empty()
            .extend(["users", USER_ID, "dataSources"])
            .extend(segments);
        Ok(url)
    }

    fn get_auth_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", self.access_token.auth_header().as_str().parse()?);
        Ok(headers)
    }
}

impl FitnessApi for GoogleFitClient {
    async fn create_data_source(&self, data_source: &DataSource) -> Result<DataSource, Error> {
        let url = self.data_sources_url(&[])?;
        debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .headers(self.get_auth_headers()?)
            .json(data_source)
            .send()
            .await?;
        handle_response(resp).await.map_err(conflict_to_exists)
    }

    async fn get_data_source(&self, data_source_id: &str) -> Result<DataSource, Error> {
        let url = self.data_sources_url(&[data_source_id])?;
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .headers(self.get_auth_headers()?)
            .send()
            .await?;
        handle_response(resp).await
    }

    async fn patch_dataset(
        &self,
        data_source_id: &str,
        dataset_id: &str,
        dataset: &Dataset,
    ) -> Result<Dataset, Error> {
        let url = self.data_sources_url(&[data_source_id, "datasets", dataset_id])?;
        debug!("PATCH {url} with {} points", dataset.point.len());
        let resp = self
            .client
            .patch(url)
            .headers(self.get_auth_headers()?)
            .json(dataset)
            .send()
            .await?;
        handle_response(resp).await
    }
}

async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        resp.json().await.map_err(Into::into)
    } else {
        let body: StackString = resp.text().await?.into();
        Err(Error::ApiError {
            status: status.as_u16(),
            body,
        })
    }
}

/// A create that collides with an existing source comes back as `409` with
/// an `alreadyExists` reason.
pub fn conflict_to_exists(error: Error) -> Error {
    match error {
        Error::ApiError { status, body }
            if status == StatusCode::CONFLICT.as_u16()
                || body.as_str().contains("alreadyExists") =>
        {
            Error::DataSourceExists(body)
        }
        e => e,
    }
}
