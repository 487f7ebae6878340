//! Request field validation shared by inbound HTTP adapters.

use serde_json::json;

use crate::domain::{Error, IdentifierValidationError};

pub fn missing_field_error(field: &'static str) -> Error {
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": "missing_field",
    }))
}

/// Require a field and convert it into a validated identifier.
pub fn required<T>(value: Option<String>, field: &'static str) -> Result<T, Error>
where
    T: TryFrom<String, Error = IdentifierValidationError>,
{
    let raw = value.ok_or_else(|| missing_field_error(field))?;
    T::try_from(raw).map_err(Error::from)
}

/// Require a boolean flag.
pub fn required_flag(value: Option<bool>, field: &'static str) -> Result<bool, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Convert a list of raw identifiers, reporting the first invalid index.
pub fn identifier_list<T>(values: Vec<String>, field: &'static str) -> Result<Vec<T>, Error>
where
    T: TryFrom<String, Error = IdentifierValidationError>,
{
    values
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            T::try_from(raw.clone()).map_err(|err| {
                Error::invalid_request(format!("{field} contains an invalid identifier"))
                    .with_details(json!({
                        "field": field,
                        "index": index,
                        "value": raw,
                        "code": match err {
                            IdentifierValidationError::Empty { .. } => "empty",
                            IdentifierValidationError::SurroundingWhitespace { .. } => {
                                "surrounding_whitespace"
                            }
                        },
                    }))
            })
        })
        .collect()
}
