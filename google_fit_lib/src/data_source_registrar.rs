use log::{debug, info};
use stack_string::{format_sstr, StackString};

use health_lib::{errors::HealthError as Error, health_config::HealthConfig};

use crate::{
    google_fit_client::FitnessApi,
    google_fit_types::{Application, DataSource, DataType, DataTypeField, Device, WEIGHT_DATA_TYPE},
};

/// Fixed description of this importer as the origin of the uploaded weight
/// data. Built once from config and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightSourceDescriptor {
    pub application_name: StackString,
    pub manufacturer: StackString,
    pub model: StackString,
    pub uid: StackString,
    pub version: StackString,
}

impl WeightSourceDescriptor {
    #[must_use]
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            application_name: config.application_name.clone(),
            manufacturer: config.device_manufacturer.clone(),
            model: config.device_model.clone(),
            uid: config.device_uid.clone(),
            version: config.device_version.clone(),
        }
    }

    /// The body sent when creating the data source.
    #[must_use]
    pub fn to_data_source(&self) -> DataSource {
        DataSource {
            data_stream_id: None,
            data_stream_name: None,
            source_type: "raw".into(),
            application: Some(Application {
                name: self.application_name.clone(),
                ..Application::default()
            }),
            data_type: Some(DataType {
                name: WEIGHT_DATA_TYPE.into(),
                field: vec![DataTypeField {
                    name: "weight".into(),
                    format: "floatPoint".into(),
                    optional: None,
                }],
            }),
            device: Some(Device {
                device_type: "unknown".into(),
                manufacturer: self.manufacturer.clone(),
                model: self.model.clone(),
                uid: self.uid.clone(),
                version: self.version.clone(),
            }),
        }
    }

    /// `raw:com.google.weight:{project}:{manufacturer}:{model}:{uid}`, the id
    /// the api assigns to a raw source with this device.
    #[must_use]
    pub fn data_source_id(&self, project_number: &str) -> StackString {
        format_sstr!(
            "raw:{WEIGHT_DATA_TYPE}:{project_number}:{}:{}:{}",
            self.manufacturer,
            self.model,
            self.uid
        )
    }
}

#[derive(Debug, Clone)]
pub struct DataSourceRegistrar {
    pub descriptor: WeightSourceDescriptor,
    pub project_number: StackString,
}

impl DataSourceRegistrar {
    #[must_use]
    pub fn new(descriptor: WeightSourceDescriptor, project_number: StackString) -> Self {
        Self {
            descriptor,
            project_number,
        }
    }

    #[must_use]
    pub fn data_source_id(&self) -> StackString {
        self.descriptor.data_source_id(self.project_number.as_str())
    }

    /// Create the data source if needed, then fetch it by id. An existing
    /// source is not an error. The create response is never returned.
    /// # Errors
    /// Return error if create fails for any reason other than the source
    /// already existing, or if the fetch fails
    pub async fn ensure_data_source<A: FitnessApi>(&self, api: &A) -> Result<DataSource, Error> {
        match api
            .create_data_source(&self.descriptor.to_data_source())
            .await
        {
            Ok(_) => info!("created data source"),
            Err(Error::DataSourceExists(body)) => debug!("data source already exists {body}"),
            Err(e) => return Err(e),
        }
        let data_source_id = self.data_source_id();
        debug!("fetch data source {data_source_id}");
        api.get_data_source(data_source_id.as_str()).await
    }
}
