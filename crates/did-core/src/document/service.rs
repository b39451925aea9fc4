//! Services are used to express ways of communicating with the DID subject or associated entities.
//! Can be any type of service the DID subject wants to advertise, for example a data hub.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::Kind;
use crate::error::Err;
use crate::{tracerr, Result};

/// Maximum length of a service identifier.
pub const MAX_ID_LENGTH: usize = 50;

/// Maximum length of a service type.
pub const MAX_TYPE_LENGTH: usize = 30;

/// Service description.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Service {
    /// Identifier for the service. Should be unique for services within the DID document.
    pub id: String,
    /// The type of service.
    #[serde(rename = "type")]
    pub type_: String,
    /// Location of the service: a URI or a map of named locations.
    pub service_endpoint: Kind<Map<String, Value>>,
}

impl Service {
    /// Construct a service with a URI endpoint.
    pub fn new(
        id: impl Into<String>,
        type_: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            type_: type_.into(),
            service_endpoint: Kind::String(endpoint.into()),
        }
    }
}

/// Check the services in a set conform to format constraints.
///
/// # Errors
///
/// [`Err::InvalidServiceEndpoint`] when:
/// - a service ID is empty, duplicated, longer than 50 characters or not base64url characters
/// - a service type is empty or longer than 30 characters
/// - a service endpoint is an empty string, an invalid URL or an empty map
pub fn check_services(services: &[Service]) -> Result<()> {
    let mut ids = HashSet::new();
    for s in services {
        if s.id.is_empty() {
            tracerr!(Err::InvalidServiceEndpoint, "Service ID is empty");
        }
        if s.id.len() > MAX_ID_LENGTH {
            tracerr!(
                Err::InvalidServiceEndpoint,
                "Service ID exceeds limit of {MAX_ID_LENGTH}: {}",
                s.id.len()
            );
        }
        if !s.id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            tracerr!(Err::InvalidServiceEndpoint, "Service ID is not base64url: {}", s.id);
        }
        if !ids.insert(s.id.as_str()) {
            tracerr!(Err::InvalidServiceEndpoint, "Duplicate service ID: {}", s.id);
        }

        if s.type_.is_empty() {
            tracerr!(Err::InvalidServiceEndpoint, "Service type is empty: {}", s.id);
        }
        if s.type_.len() > MAX_TYPE_LENGTH {
            tracerr!(
                Err::InvalidServiceEndpoint,
                "Service type exceeds limit of {MAX_TYPE_LENGTH}: {}",
                s.type_.len()
            );
        }

        match &s.service_endpoint {
            Kind::String(url) if url.is_empty() => {
                tracerr!(Err::InvalidServiceEndpoint, "Service endpoint is empty: {}", s.id);
            }
            Kind::String(url) => {
                if let Err(e) = url::Url::parse(url) {
                    tracerr!(Err::InvalidServiceEndpoint, "Service endpoint {url} is invalid: {e}");
                }
            }
            Kind::Object(map) if map.is_empty() => {
                tracerr!(Err::InvalidServiceEndpoint, "Service endpoint map is empty: {}", s.id);
            }
            Kind::Object(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn hub() -> Service {
        Service::new("hub", "IdentityHub", "https://hub.example.com/")
    }

    #[test]
    fn deserialize_string_endpoint() {
        let input = json!({
            "id": "domain-1",
            "type": "LinkedDomains",
            "serviceEndpoint": "https://foo.example.com"
        });
        let svc: Service = serde_json::from_value(input).expect("failed to deserialize");
        assert_eq!(svc.service_endpoint.as_str(), Some("https://foo.example.com"));
    }

    #[test]
    fn deserialize_map_endpoint() {
        let input = json!({
            "id": "hub",
            "type": "IdentityHub",
            "serviceEndpoint": { "instances": ["https://hub.example.com/"] }
        });
        let svc: Service = serde_json::from_value(input).expect("failed to deserialize");
        let map = svc.service_endpoint.as_object().expect("expected map endpoint");
        assert!(map.contains_key("instances"));
        check_services(&[svc]).expect("map endpoint should be valid");
    }

    #[test]
    fn serialize_canonical() {
        let json = serde_json_canonicalizer::to_string(&hub()).expect("failed to serialize");
        assert_eq!(
            json,
            r#"{"id":"hub","serviceEndpoint":"https://hub.example.com/","type":"IdentityHub"}"#
        );
    }

    #[test]
    fn check_ok() {
        let other = Service::new("other", "LinkedDomains", "https://example.com");
        check_services(&[hub(), other]).expect("services should be valid");
        check_services(&[]).expect("no services is valid");
    }

    #[test]
    fn check_missing_fields() {
        for svc in [
            Service { id: String::new(), ..hub() },
            Service { type_: String::new(), ..hub() },
            Service::new("hub", "IdentityHub", ""),
            Service::new("hub", "IdentityHub", "not a url"),
            Service { service_endpoint: Kind::Object(Map::new()), ..hub() },
        ] {
            let err = check_services(&[svc]).expect_err("expected error");
            assert!(err.is(Err::InvalidServiceEndpoint));
        }
    }

    #[test]
    fn check_constraints() {
        let dup = check_services(&[hub(), hub()]).expect_err("expected duplicate error");
        assert!(dup.is(Err::InvalidServiceEndpoint));

        let long_type = Service { type_: "t".repeat(31), ..hub() };
        assert!(check_services(&[long_type]).is_err());

        let long_id = Service { id: "i".repeat(51), ..hub() };
        assert!(check_services(&[long_id]).is_err());

        let bad_id = Service { id: "#hub".to_string(), ..hub() };
        assert!(check_services(&[bad_id]).is_err());
    }
}
