use log::debug;
use quick_xml::events::BytesStart;
use stack_string::{format_sstr, StackString};

use health_lib::errors::HealthError as Error;

pub const RECORD_ELEMENT: &[u8] = b"Record";
pub const BODY_MASS_RECORD_TYPE: &str = "HKQuantityTypeIdentifierBodyMass";

/// Attributes of a single `<Record>` element in an Apple Health export.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HealthRecord {
    pub record_type: StackString,
    pub start_date: StackString,
    pub end_date: StackString,
    pub value: f64,
}

impl HealthRecord {
    /// Decode the attributes of a `Record` start (or empty) tag. Missing
    /// attributes are left at their default.
    /// # Errors
    /// Return error if an attribute is malformed or `value` isn't a number
    pub fn from_element(element: &BytesStart<'_>) -> Result<Self, Error> {
        let mut record = Self::default();
        for attr in element.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"type" => record.record_type = attr.unescape_value()?.into_owned().into(),
                b"startDate" => record.start_date = attr.unescape_value()?.into_owned().into(),
                b"endDate" => record.end_date = attr.unescape_value()?.into_owned().into(),
                b"value" => record.value = parse_record_value(&attr.unescape_value()?)?,
                _ => {}
            }
        }
        Ok(record)
    }

    pub fn is_type(&self, record_type: &str) -> bool {
        self.record_type.as_str() == record_type
    }
}

fn parse_record_value(value: &str) -> Result<f64, Error> {
    let value = value.trim();
    if value.is_empty() {
        debug!("empty Record value read as 0.0");
        return Ok(0.0);
    }
    value
        .parse()
        .map_err(|e| Error::CustomError(format_sstr!("invalid Record value {value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use quick_xml::{events::Event, Reader};

    use health_lib::errors::HealthError;

    use crate::health_record::{HealthRecord, BODY_MASS_RECORD_TYPE};

    fn decode(xml: &str) -> Result<HealthRecord, HealthError> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) => return HealthRecord::from_element(&e),
                Event::Eof => return Err(HealthError::StaticCustomError("no element")),
                _ => {}
            }
        }
    }

    #[test]
    fn test_from_element() -> Result<(), HealthError> {
        let record = decode(
            r#"<Record type="HKQuantityTypeIdentifierBodyMass" sourceName="Scale" unit="kg"
                startDate="2023-01-01 08:00:00 +0000" endDate="2023-01-01 08:00:01 +0000"
                value="70.5"/>"#,
        )?;
        assert!(record.is_type(BODY_MASS_RECORD_TYPE));
        assert_eq!(record.start_date.as_str(), "2023-01-01 08:00:00 +0000");
        assert_eq!(record.end_date.as_str(), "2023-01-01 08:00:01 +0000");
        assert_abs_diff_eq!(record.value, 70.5);
        Ok(())
    }

    #[test]
    fn test_from_element_missing_attributes() -> Result<(), HealthError> {
        let record = decode(r#"<Record type="HKQuantityTypeIdentifierStepCount">"#)?;
        assert!(!record.is_type(BODY_MASS_RECORD_TYPE));
        assert_eq!(record.start_date.as_str(), "");
        assert_abs_diff_eq!(record.value, 0.0);
        Ok(())
    }

    #[test]
    fn test_from_element_blank_value() -> Result<(), HealthError> {
        let record = decode(r#"<Record type="HKQuantityTypeIdentifierBodyMass" value="  "/>"#)?;
        assert!(record.is_type(BODY_MASS_RECORD_TYPE));
        assert_abs_diff_eq!(record.value, 0.0);
        Ok(())
    }

    #[test]
    fn test_from_element_unescapes() -> Result<(), HealthError> {
        let record = decode(r#"<Record type="A&amp;B" value=" 12.25 "/>"#)?;
        assert_eq!(record.record_type.as_str(), "A&B");
        assert_abs_diff_eq!(record.value, 12.25);
        Ok(())
    }

    #[test]
    fn test_from_element_bad_value() {
        let err = decode(r#"<Record type="HKQuantityTypeIdentifierBodyMass" value="heavy"/>"#)
            .unwrap_err();
        assert!(err.to_string().contains("heavy"));
    }
}
