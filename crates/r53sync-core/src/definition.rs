//! Resource definition: the declarative document mapping DNS record names to
//! instance-discovery filters.
//!
//! ```json
//! {
//!   "HostedZone": "Z148QEXAMPLE8V",
//!   "Region": "us-west-1",
//!   "Resources": {
//!     "launch": {
//!       "Instances": [
//!         { "Filters": [{ "Name": "tag:Name", "Values": ["launch"] }], "PrivateIP": true }
//!       ],
//!       "ResourceRecordSet": { "Name": "launch.example.com", "TTL": 60 }
//!     }
//!   }
//! }
//! ```
//!
//! Parsing happens in two passes. The raw JSON tree is walked once to check
//! required fields in a fixed order (top level, then each resource, then each
//! of its instance groups) so the first violation names the resource and the
//! field. Only then is each piece deserialized into the typed model.

use crate::error::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};
use std::path::Path;

/// Origin label used when the caller does not say where bytes came from
const INPUT_ORIGIN: &str = "<input>";

/// Default record type applied by the record-set builder
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// Top-level resource definition document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceDefinition {
    /// Target hosted zone identifier
    #[serde(rename = "HostedZone")]
    pub hosted_zone: String,

    /// Default compute region for every instance group
    #[serde(rename = "Region", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Named resources, in document order
    #[serde(rename = "Resources")]
    pub resources: Resources,
}

/// Ordered mapping of resource name to [`ResourceSpec`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resources(Vec<(String, ResourceSpec)>);

impl Resources {
    /// Iterate `(name, spec)` pairs in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceSpec)> {
        self.0.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Look up a resource by name
    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, spec)| spec)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ResourceSpec)> for Resources {
    fn from_iter<I: IntoIterator<Item = (String, ResourceSpec)>>(iter: I) -> Self {
        let mut resources: Vec<(String, ResourceSpec)> = Vec::new();
        for (name, spec) in iter {
            // mapping semantics: a repeated key replaces the earlier entry
            match resources.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = spec,
                None => resources.push((name, spec)),
            }
        }
        Self(resources)
    }
}

impl Serialize for Resources {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, spec) in &self.0 {
            map.serialize_entry(name, spec)?;
        }
        map.end()
    }
}

/// One DNS-record target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceSpec {
    /// Discovery queries whose results are concatenated
    pub instances: Vec<InstanceGroup>,

    /// Partial record attributes; `ResourceRecords` is always recomputed
    pub resource_record_set: RecordTemplate,

    /// Region for every instance group of this resource that names none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// One discovery query plus its address-selection policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceGroup {
    /// Opaque tag/attribute filters passed to the inventory query
    #[serde(rename = "Filters")]
    pub filters: Vec<Filter>,

    /// Prefer the private address when the instance has one
    #[serde(rename = "PrivateIP", default)]
    pub private_ip: bool,

    /// Region override for this group
    #[serde(rename = "Region", default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Inventory filter, e.g. `{"Name": "tag:Name", "Values": ["web"]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl Filter {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single record value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    #[serde(rename = "Value")]
    pub value: String,
}

/// Defaults-filled DNS record description
///
/// Attributes this type does not model (for example `SetIdentifier` or
/// `Weight`) are kept in `extra`, in document order, and survive the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordTemplate {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,

    /// Any JSON number; the provider decides what it accepts
    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<Number>,

    #[serde(
        rename = "ResourceRecords",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub resource_records: Option<Vec<ResourceRecord>>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecordTemplate {
    /// Create a template with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: None,
            ttl: None,
            resource_records: None,
            extra: Map::new(),
        }
    }

    /// Set the record type
    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: i64) -> Self {
        self.ttl = Some(Number::from(ttl));
        self
    }
}

impl ResourceDefinition {
    /// Parse and validate a resource definition
    ///
    /// Fails with [`Error::Parse`] when the bytes are not JSON and with
    /// [`Error::Validation`] naming the first missing or invalid field.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Self::parse_from(data, INPUT_ORIGIN)
    }

    /// Like [`ResourceDefinition::parse`], labelling parse errors with `origin`
    pub fn parse_from(data: &[u8], origin: &str) -> Result<Self> {
        let doc: Value =
            serde_json::from_slice(data).map_err(|e| Error::parse(origin, e.to_string()))?;
        Self::from_value(doc)
    }

    /// Read a definition from a local file
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        Self::parse_from(&data, &path.display().to_string())
    }

    /// Canonical JSON serialization
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| Error::validation(e.to_string()))
    }

    /// Region a group's discovery query must be scoped to
    ///
    /// Group region wins over the resource region, which wins over the
    /// document region. `None` means the backend's default region.
    pub fn region_for<'a>(
        &'a self,
        spec: &'a ResourceSpec,
        group: &'a InstanceGroup,
    ) -> Option<&'a str> {
        group
            .region
            .as_deref()
            .or(spec.region.as_deref())
            .or(self.region.as_deref())
    }

    fn from_value(doc: Value) -> Result<Self> {
        let root = doc
            .as_object()
            .ok_or_else(|| Error::validation("Resource definition must be a JSON object"))?;

        let hosted_zone = match root.get("HostedZone") {
            None => return Err(Error::validation("Resource must have HostedZone")),
            Some(Value::String(zone)) if zone.is_empty() => {
                return Err(Error::validation("HostedZone must not be empty"));
            }
            Some(Value::String(zone)) => zone.clone(),
            Some(_) => return Err(Error::validation("HostedZone must be a string")),
        };

        let region = optional_string(root, "Region", || "Region".to_string())?;

        let resources = match root.get("Resources") {
            None => return Err(Error::validation("Resource must have Resources")),
            Some(Value::Object(resources)) => resources,
            Some(_) => {
                return Err(Error::validation(
                    "Resources must be a mapping of resource names to resources",
                ));
            }
        };

        let resources = resources
            .iter()
            .map(|(name, raw)| Ok((name.clone(), parse_resource(name, raw)?)))
            .collect::<Result<Resources>>()?;

        Ok(Self {
            hosted_zone,
            region,
            resources,
        })
    }
}

fn parse_resource(name: &str, raw: &Value) -> Result<ResourceSpec> {
    let spec = raw
        .as_object()
        .ok_or_else(|| Error::validation(format!("Resource \"{name}\" must be an object")))?;

    let instances = match spec.get("Instances") {
        None => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" must have Instances"
            )));
        }
        Some(Value::Array(instances)) => instances,
        Some(_) => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" Instances must be a list"
            )));
        }
    };

    let record_set = match spec.get("ResourceRecordSet") {
        None => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" must have ResourceRecordSet"
            )));
        }
        Some(Value::Object(record_set)) => record_set,
        Some(_) => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" ResourceRecordSet must be an object"
            )));
        }
    };
    match record_set.get("Name") {
        None => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" ResourceRecordSet must have a Name"
            )));
        }
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" ResourceRecordSet Name must be a string"
            )));
        }
    }

    let region = optional_string(spec, "Region", || format!("Resource \"{name}\" Region"))?;

    let mut groups = Vec::with_capacity(instances.len());
    for (index, raw_group) in instances.iter().enumerate() {
        groups.push(parse_instance_group(name, index, raw_group)?);
    }

    // ResourceRecords is recomputed from discovery; whatever the document holds is discarded
    let record_set: Map<String, Value> = record_set
        .iter()
        .filter(|(key, _)| key.as_str() != "ResourceRecords")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let resource_record_set: RecordTemplate =
        serde_json::from_value(Value::Object(record_set)).map_err(|e| {
            Error::validation(format!("Resource \"{name}\" ResourceRecordSet: {e}"))
        })?;

    Ok(ResourceSpec {
        instances: groups,
        resource_record_set,
        region,
    })
}

fn parse_instance_group(name: &str, index: usize, raw: &Value) -> Result<InstanceGroup> {
    let group = raw.as_object().ok_or_else(|| {
        Error::validation(format!(
            "Resource \"{name}\" Instances[{index}] must be an object"
        ))
    })?;

    match group.get("Filters") {
        None => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" Instances[{index}] must have Filters"
            )));
        }
        Some(Value::Array(_)) => {}
        Some(_) => {
            return Err(Error::validation(format!(
                "Resource \"{name}\" Instances[{index}] Filters must be a list"
            )));
        }
    }

    serde_json::from_value(raw.clone()).map_err(|e| {
        Error::validation(format!("Resource \"{name}\" Instances[{index}]: {e}"))
    })
}

/// Read an optional string field; `null` counts as absent
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    label: impl FnOnce() -> String,
) -> Result<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(Error::validation(format!("{} must be a string", label()))),
    }
}
