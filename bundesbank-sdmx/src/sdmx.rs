//! SDMX-JSON wire types, as returned by `/data/{flow}/{key}?format=json`.
//!
//! Only the parts needed to rebuild a date-indexed series are modelled.
//! Every collection tolerates `null` as well as absence.

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Dimension id whose values give the date of each observation index.
pub const TIME_PERIOD: &str = "TIME_PERIOD";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a JSON object as its entries in document order (`null` is empty).
fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map or null")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_map(self)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_option(EntriesVisitor(PhantomData))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SdmxResponse {
    #[serde(default)]
    pub meta: Option<Meta>,
    #[serde(default)]
    pub data: Option<Data>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub prepared: Option<String>,
    #[serde(default)]
    pub test: Option<bool>,
    #[serde(default)]
    pub sender: Option<Sender>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sender {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub names: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Data {
    #[serde(default)]
    pub structure: Option<Structure>,
    #[serde(rename = "dataSets", default, deserialize_with = "null_as_default")]
    pub data_sets: Vec<DataSet>,
}

impl Data {
    /// Ids of the `TIME_PERIOD` observation dimension, in positional order.
    pub fn time_periods(&self) -> Vec<&str> {
        self.structure
            .as_ref()
            .and_then(|s| s.dimensions.as_ref())
            .map(|dims| {
                dims.observation
                    .iter()
                    .filter(|dim| dim.id == TIME_PERIOD)
                    .flat_map(|dim| dim.values.iter())
                    // A null entry keeps its position and fails date parsing later.
                    .map(|value| {
                        value
                            .as_ref()
                            .and_then(|v| v.id.as_deref())
                            .unwrap_or("")
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dimensions {
    #[serde(default, deserialize_with = "null_as_default")]
    pub series: Vec<Dimension>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub observation: Vec<Dimension>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dimension {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "keyPosition", default)]
    pub key_position: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<Option<DimensionValue>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DimensionValue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataSet {
    #[serde(default)]
    pub action: Option<String>,
    /// `(series key, series)` pairs, e.g. `"0:0:0:0:0:0"`, in document order.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub series: Vec<(String, Series)>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Series {
    /// Observation index (as a string) -> `[value, attribute indices...]`;
    /// a `null` list is kept so the decoder can count it as missing.
    #[serde(default, deserialize_with = "null_as_default")]
    pub observations: BTreeMap<String, Option<Vec<serde_json::Value>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_periods_follow_declared_order() {
        let body = r#"{
            "data": {
                "structure": { "dimensions": {
                    "series": [ { "id": "BBK_STD_FREQ", "keyPosition": 0, "values": [ { "id": "D", "name": "daily" } ] } ],
                    "observation": [
                        { "id": "TIME_PERIOD", "name": "Time", "values": [
                            { "id": "2024-01-03", "name": "2024-01-03" },
                            { "id": "2024-01-02", "name": "2024-01-02" }
                        ] }
                    ]
                } },
                "dataSets": []
            }
        }"#;
        let response: SdmxResponse = serde_json::from_str(body).unwrap();
        let data = response.data.unwrap();

        assert_eq!(data.time_periods(), vec!["2024-01-03", "2024-01-02"]);
        assert!(data.data_sets.is_empty());
    }

    #[test]
    fn test_nulls_deserialize_as_empty() {
        let body = r#"{
            "meta": null,
            "data": {
                "structure": { "dimensions": { "observation": null } },
                "dataSets": [ { "series": { "0:0": { "observations": null } } } ]
            }
        }"#;
        let response: SdmxResponse = serde_json::from_str(body).unwrap();
        let data = response.data.unwrap();

        assert!(data.time_periods().is_empty());
        assert_eq!(data.data_sets[0].series[0].0, "0:0");
        assert!(data.data_sets[0].series[0].1.observations.is_empty());
    }

    #[test]
    fn test_series_keep_document_order() {
        let body = r#"{
            "data": { "dataSets": [ { "series": {
                "1:0": { "observations": { "0": ["2.0"] } },
                "0:0": { "observations": { "0": ["1.0"] } }
            } } ] }
        }"#;
        let response: SdmxResponse = serde_json::from_str(body).unwrap();
        let keys: Vec<_> = response.data.unwrap().data_sets[0]
            .series
            .iter()
            .map(|(key, _)| key.clone())
            .collect();

        assert_eq!(keys, vec!["1:0", "0:0"]);
    }

    #[test]
    fn test_null_entries_do_not_reject_document() {
        let body = r#"{
            "data": {
                "structure": { "dimensions": { "observation": [
                    { "id": "TIME_PERIOD", "values": [ { "id": "2024-01-02" }, { "id": null } ] }
                ] } },
                "dataSets": [ { "series": { "0:0": { "observations": { "0": ["1.0956"], "1": null } } } } ]
            }
        }"#;
        let response: SdmxResponse = serde_json::from_str(body).unwrap();
        let data = response.data.unwrap();

        assert_eq!(data.time_periods(), vec!["2024-01-02", ""]);
        assert_eq!(data.data_sets[0].series[0].1.observations["1"], None);
    }
}
