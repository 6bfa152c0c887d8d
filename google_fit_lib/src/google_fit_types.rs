use derive_more::Display;
use serde::{Deserialize, Serialize};
use stack_string::StackString;

pub const USER_ID: &str = "me";
pub const WEIGHT_DATA_TYPE: &str = "com.google.weight";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DataSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_stream_id: Option<StackString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_stream_name: Option<StackString>,
    #[serde(rename = "type")]
    pub source_type: StackString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub name: StackString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<StackString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details_url: Option<StackString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_name: Option<StackString>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DataType {
    pub name: StackString,
    pub field: Vec<DataTypeField>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct DataTypeField {
    pub name: StackString,
    pub format: StackString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Device {
    #[serde(rename = "type")]
    pub device_type: StackString,
    pub manufacturer: StackString,
    pub model: StackString,
    pub uid: StackString,
    pub version: StackString,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fp_val: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub int_val: Option<i32>,
}

impl Value {
    #[must_use]
    pub fn from_fp(fp_val: f64) -> Self {
        Self {
            fp_val: Some(fp_val),
            int_val: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataPoint {
    pub data_type_name: StackString,
    #[serde(with = "nanos_string")]
    pub start_time_nanos: i64,
    #[serde(with = "nanos_string")]
    pub end_time_nanos: i64,
    pub value: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub origin_data_source_id: Option<StackString>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub data_source_id: StackString,
    #[serde(with = "nanos_string")]
    pub min_start_time_ns: i64,
    #[serde(with = "nanos_string")]
    pub max_end_time_ns: i64,
    #[serde(default)]
    pub point: Vec<DataPoint>,
}

/// Datasets are addressed as `{minStartTimeNs}-{maxEndTimeNs}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{min_start_time_ns}-{max_end_time_ns}")]
pub struct DatasetId {
    pub min_start_time_ns: i64,
    pub max_end_time_ns: i64,
}

impl Dataset {
    #[must_use]
    pub fn dataset_id(&self) -> DatasetId {
        DatasetId {
            min_start_time_ns: self.min_start_time_ns,
            max_end_time_ns: self.max_end_time_ns,
        }
    }
}

/// int64 fields are sent as json strings by the fitness api.
mod nanos_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use stack_string::StackString;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        String(StackString),
        Int(i64),
    }

    pub fn serialize<S>(value: &i64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match StringOrInt::deserialize(deserializer)? {
            StringOrInt::String(s) => s.as_str().parse().map_err(de::Error::custom),
            StringOrInt::Int(i) => Ok(i),
        }
    }
}
