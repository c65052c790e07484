//! Shared validation helpers for inbound HTTP adapters.

use chrono::{DateTime, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, OrganType, Role, Urgency};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidTimestamp,
    InvalidOrgan,
    InvalidRole,
    InvalidUrgency,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidOrgan => "invalid_organ",
            ErrorCode::InvalidRole => "invalid_role",
            ErrorCode::InvalidUrgency => "invalid_urgency",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(
    field: FieldName,
    message: String,
    code: ErrorCode,
    value: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value.into(),
        "code": code.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: String, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(&value).map_err(|_| {
        field_error(
            field,
            format!("{} must be a valid UUID", field.as_str()),
            ErrorCode::InvalidUuid,
            value,
        )
    })
}

pub(crate) fn parse_rfc3339_timestamp(
    value: String,
    field: FieldName,
) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(&value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| {
            field_error(
                field,
                format!("{} must be an RFC 3339 timestamp", field.as_str()),
                ErrorCode::InvalidTimestamp,
                value,
            )
        })
}

pub(crate) fn parse_optional_rfc3339_timestamp(
    value: Option<String>,
    field: FieldName,
) -> Result<Option<DateTime<Utc>>, Error> {
    value
        .map(|raw| parse_rfc3339_timestamp(raw, field))
        .transpose()
}

pub(crate) fn parse_organ(value: String, field: FieldName) -> Result<OrganType, Error> {
    value.parse::<OrganType>().map_err(|_| {
        field_error(
            field,
            format!(
                "{} must be one of heart, kidney, liver, lung, pancreas, or cornea",
                field.as_str()
            ),
            ErrorCode::InvalidOrgan,
            value,
        )
    })
}

pub(crate) fn parse_role(value: String, field: FieldName) -> Result<Role, Error> {
    value.parse::<Role>().map_err(|_| {
        field_error(
            field,
            format!(
                "{} must be one of patient, donor, doctor, or admin",
                field.as_str()
            ),
            ErrorCode::InvalidRole,
            value,
        )
    })
}

pub(crate) fn parse_urgency(value: u8, field: FieldName) -> Result<Urgency, Error> {
    Urgency::new(value).map_err(|err| {
        field_error(
            field,
            err.to_string(),
            ErrorCode::InvalidUrgency,
            value.to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn invalid_uuid_reports_field_and_code() {
        let err = parse_uuid("nope".to_owned(), FieldName::new("requestId"))
            .expect_err("invalid uuid");
        let details = err.details.expect("details present");
        assert_eq!(details["field"], "requestId");
        assert_eq!(details["code"], "invalid_uuid");
    }

    #[rstest]
    fn valid_timestamp_is_normalised_to_utc() {
        let parsed = parse_rfc3339_timestamp(
            "2026-08-01T12:00:00+02:00".to_owned(),
            FieldName::new("viableUntil"),
        )
        .expect("valid timestamp");
        assert_eq!(parsed.to_rfc3339(), "2026-08-01T10:00:00+00:00");
    }

    #[rstest]
    fn absent_optional_timestamp_is_accepted() {
        let parsed = parse_optional_rfc3339_timestamp(None, FieldName::new("viableUntil"))
            .expect("absent is fine");
        assert!(parsed.is_none());
    }

    #[rstest]
    fn unknown_organ_reports_value() {
        let err =
            parse_organ("spleen".to_owned(), FieldName::new("organ")).expect_err("unknown organ");
        let details = err.details.expect("details present");
        assert_eq!(details["value"], "spleen");
        assert_eq!(details["code"], "invalid_organ");
    }

    #[rstest]
    fn unknown_role_reports_value() {
        let err =
            parse_role("surgeon".to_owned(), FieldName::new("role")).expect_err("unknown role");
        let details = err.details.expect("details present");
        assert_eq!(details["code"], "invalid_role");
    }

    #[rstest]
    #[case(0)]
    #[case(9)]
    fn out_of_range_urgency_is_rejected(#[case] value: u8) {
        let err = parse_urgency(value, FieldName::new("urgency")).expect_err("out of range");
        let details = err.details.expect("details present");
        assert_eq!(details["code"], "invalid_urgency");
    }
}
