use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use stack_string::StackString;
use std::{fs::File, io::Read, path::Path};

use health_lib::{
    errors::HealthError as Error,
    weight_row::{timestamp_nanos, WeightRow},
};

use crate::{
    google_fit_client::FitnessApi,
    google_fit_types::{DataPoint, DataSource, Dataset, DatasetId, Value, WEIGHT_DATA_TYPE},
};

/// A weight at an instant, ready to become a data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightSample {
    pub timestamp_nanos: i64,
    pub weight: f64,
}

impl WeightSample {
    /// A bad timestamp is an error, a bad weight only skips the row.
    /// # Errors
    /// Return error if the timestamp doesn't parse
    pub fn from_row(row: &WeightRow) -> Result<Option<Self>, Error> {
        let timestamp_nanos = timestamp_nanos(row.parse_timestamp()?)?;
        let Some(weight) = row.parse_weight() else {
            debug!("skip row with weight {:?}", row.weight);
            return Ok(None);
        };
        Ok(Some(Self {
            timestamp_nanos,
            weight,
        }))
    }

    #[must_use]
    pub fn to_data_point(&self, origin_data_source_id: &str) -> DataPoint {
        DataPoint {
            data_type_name: WEIGHT_DATA_TYPE.into(),
            start_time_nanos: self.timestamp_nanos,
            end_time_nanos: self.timestamp_nanos,
            value: vec![Value::from_fp(self.weight)],
            origin_data_source_id: Some(origin_data_source_id.into()),
        }
    }
}

fn get_field(record: &StringRecord, index: usize) -> StackString {
    record.get(index).unwrap_or("").into()
}

/// Read `Date,Weight` rows by position, the header line is skipped whatever
/// it says. Every row must have the same number of columns.
/// # Errors
/// Return error if the csv can't be read
pub fn read_weight_rows<R: Read>(reader: R) -> Result<Vec<WeightRow>, Error> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    reader
        .records()
        .map(|record| {
            let record = record?;
            Ok(WeightRow {
                timestamp: get_field(&record, 0),
                weight: get_field(&record, 1),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub points: usize,
    pub dataset_id: StackString,
}

/// Weight samples in ascending time order, never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightImporter {
    samples: Vec<WeightSample>,
}

impl WeightImporter {
    /// # Errors
    /// Return error if the file can't be read, a timestamp is invalid or no
    /// row has a usable weight
    pub fn from_csv_file(path: &Path) -> Result<Self, Error> {
        let rows = read_weight_rows(File::open(path)?)?;
        debug!("read {} rows from {}", rows.len(), path.display());
        Self::from_rows(&rows)
    }

    /// # Errors
    /// Return error if a timestamp is invalid or no row has a usable weight
    pub fn from_rows(rows: &[WeightRow]) -> Result<Self, Error> {
        let mut samples = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(sample) = WeightSample::from_row(row)? {
                samples.push(sample);
            }
        }
        if samples.is_empty() {
            return Err(Error::NoDataToImport);
        }
        samples.sort_by_key(|s| s.timestamp_nanos);
        Ok(Self { samples })
    }

    #[must_use]
    pub fn samples(&self) -> &[WeightSample] {
        &self.samples
    }

    /// Bounds are the first and last sample times.
    #[must_use]
    pub fn dataset_id(&self) -> DatasetId {
        let min_start_time_ns = self.samples.first().map_or(0, |s| s.timestamp_nanos);
        let max_end_time_ns = self.samples.last().map_or(0, |s| s.timestamp_nanos);
        DatasetId {
            min_start_time_ns,
            max_end_time_ns,
        }
    }

    #[must_use]
    pub fn build_dataset(&self, data_stream_id: &str) -> Dataset {
        let DatasetId {
            min_start_time_ns,
            max_end_time_ns,
        } = self.dataset_id();
        Dataset {
            data_source_id: data_stream_id.into(),
            min_start_time_ns,
            max_end_time_ns,
            point: self
                .samples
                .iter()
                .map(|s| s.to_data_point(data_stream_id))
                .collect(),
        }
    }

    /// Send every sample in a single dataset patch.
    /// # Errors
    /// Return error if the data source has no stream id or the patch fails
    pub async fn upload<A: FitnessApi>(
        &self,
        api: &A,
        data_source: &DataSource,
    ) -> Result<ImportSummary, Error> {
        let data_stream_id = data_source
            .data_stream_id
            .as_ref()
            .ok_or(Error::StaticCustomError("data source has no dataStreamId"))?;
        let dataset = self.build_dataset(data_stream_id.as_str());
        let dataset_id = dataset.dataset_id().to_string();
        api.patch_dataset(data_stream_id.as_str(), &dataset_id, &dataset)
            .await?;
        info!("uploaded {} points to {dataset_id}", dataset.point.len());
        Ok(ImportSummary {
            points: dataset.point.len(),
            dataset_id: dataset_id.into(),
        })
    }
}
