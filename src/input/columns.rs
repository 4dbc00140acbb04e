use std::io::Read;

use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::input::InputError;
use crate::model::{GroupId, SpeciesId};
use crate::report::merge::MergeStrategy;

/// Declarative description of one report column group.
///
/// Accepts the loose shapes produced by form-encoded parameters: ids may be
/// numbers or strings, empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnCriteria {
    #[serde(default, deserialize_with = "de_id_list")]
    pub species_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_merge")]
    pub merge: Option<MergeStrategy>,
    #[serde(default, deserialize_with = "de_flag")]
    pub percentages: bool,
    #[serde(default, deserialize_with = "de_blank_string")]
    pub computed: Option<String>,
    #[serde(default, deserialize_with = "de_blank_string")]
    pub header: Option<String>,
}

impl ColumnCriteria {
    pub fn allows(&self, species_id: SpeciesId) -> bool {
        let id = species_id.to_string();
        self.species_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|s| *s == id))
    }
}

/// Column groups in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnSpec {
    groups: Vec<(String, ColumnCriteria)>,
}

impl ColumnSpec {
    pub fn new(groups: Vec<(String, ColumnCriteria)>) -> Self {
        Self { groups }
    }

    /// One unreduced group listing every species: the plain matrix.
    pub fn all_species(species_ids: impl IntoIterator<Item = SpeciesId>) -> Self {
        let criteria = ColumnCriteria {
            species_ids: Some(species_ids.into_iter().map(|id| id.to_string()).collect()),
            ..ColumnCriteria::default()
        };
        Self::new(vec![("all".to_string(), criteria)])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnCriteria)> {
        self.groups.iter().map(|(id, c)| (id.as_str(), c))
    }
}

impl<'de> Deserialize<'de> for ColumnSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let mut groups = Vec::with_capacity(map.len());
        for (id, value) in map {
            let criteria: ColumnCriteria = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("column group {id}: {e}")))?;
            groups.push((id, criteria));
        }
        Ok(ColumnSpec::new(groups))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportRequest {
    #[serde(default, deserialize_with = "de_id_list")]
    pub samples_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "de_group_id")]
    pub percentages_group_id: Option<GroupId>,
    #[serde(default)]
    pub columns: ColumnSpec,
}

impl ReportRequest {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InputError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

fn id_to_string<E: DeError>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(E::custom(format!("expected an id, found {other}"))),
    }
}

fn de_id_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    let ids = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        Value::Array(items) => items
            .into_iter()
            .map(id_to_string)
            .collect::<Result<Vec<_>, _>>()?,
        // Form-encoded arrays arrive as {"0": "3", "1": "4"}.
        Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| id_to_string(v))
            .collect::<Result<Vec<_>, _>>()?,
        single => vec![id_to_string(single)?],
    };
    Ok(Some(ids.into_iter().filter(|s| !s.is_empty()).collect()))
}

fn de_merge<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<MergeStrategy>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(name) if name.trim().is_empty() => Ok(None),
        Some(name) => MergeStrategy::from_name(name.trim())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unknown merge strategy `{name}`"))),
    }
}

fn de_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Ok(true),
            "" | "0" | "false" | "off" | "no" => Ok(false),
            other => Err(D::Error::custom(format!("invalid flag `{other}`"))),
        },
        other => Err(D::Error::custom(format!("invalid flag {other}"))),
    }
}

fn de_blank_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

fn de_group_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<GroupId>, D::Error> {
    let raw = match Value::deserialize(deserializer)? {
        Value::Null => return Ok(None),
        other => id_to_string::<D::Error>(other)?,
    };
    if raw.is_empty() {
        return Ok(None);
    }
    let id: GroupId = raw
        .parse()
        .map_err(|_| D::Error::custom(format!("invalid group id `{raw}`")))?;
    Ok((id != 0).then_some(id))
}
