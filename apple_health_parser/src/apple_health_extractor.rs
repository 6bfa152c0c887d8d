use csv::{Terminator, WriterBuilder};
use log::{debug, info};
use quick_xml::{events::Event, Reader};
use stack_string::{format_sstr, StackString};
use std::{
    fs::{remove_file, File},
    io::{BufRead, BufReader, Write},
    path::Path,
};

use health_lib::{
    errors::HealthError as Error,
    weight_row::{WeightRow, DATE_HEADER, WEIGHT_HEADER},
};

use crate::health_record::{HealthRecord, BODY_MASS_RECORD_TYPE, RECORD_ELEMENT};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractSummary {
    pub records_seen: usize,
    pub rows_written: usize,
}

/// Streams an Apple Health `export.xml` and writes the records of a single
/// type to a `Date,Weight` csv file.
#[derive(Debug, Clone)]
pub struct AppleHealthExtractor {
    pub record_type: StackString,
}

impl Default for AppleHealthExtractor {
    fn default() -> Self {
        Self {
            record_type: BODY_MASS_RECORD_TYPE.into(),
        }
    }
}

impl AppleHealthExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract from `xml_file` into a new csv file at `out`. If extraction
    /// fails after `out` was created the partial file is removed.
    /// # Errors
    /// Return error if the input can't be opened, the output can't be created,
    /// or any element fails to decode
    pub fn extract_file(&self, xml_file: &Path, out: &Path) -> Result<ExtractSummary, Error> {
        if !xml_file.exists() {
            return Err(Error::CustomError(format_sstr!(
                "file {} does not exist",
                xml_file.to_string_lossy()
            )));
        }
        let input = BufReader::new(File::open(xml_file)?);
        let output = File::create(out)?;

        match self.extract(input, output) {
            Ok(summary) => {
                info!(
                    "wrote {} of {} records to {}",
                    summary.rows_written,
                    summary.records_seen,
                    out.to_string_lossy()
                );
                Ok(summary)
            }
            Err(e) => {
                debug!("removing partial output {}", out.to_string_lossy());
                remove_file(out).ok();
                Err(e)
            }
        }
    }

    /// Single forward pass over `input`, one `HealthRecord` at a time.
    /// # Errors
    /// Return error on malformed xml, an undecodable `Record`, or a write
    /// failure
    pub fn extract<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<ExtractSummary, Error> {
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(output);
        writer.write_record([DATE_HEADER, WEIGHT_HEADER])?;

        let mut reader = Reader::from_reader(input);
        let mut buf = Vec::new();
        let mut summary = ExtractSummary::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(element) | Event::Empty(element)
                    if element.local_name().as_ref() == RECORD_ELEMENT =>
                {
                    let record = HealthRecord::from_element(&element)?;
                    summary.records_seen += 1;
                    if record.is_type(self.record_type.as_str()) {
                        let row = WeightRow::new(record.start_date, record.value);
                        writer.write_record([row.timestamp.as_str(), row.weight.as_str()])?;
                        summary.rows_written += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        writer.flush()?;
        Ok(summary)
    }
}
