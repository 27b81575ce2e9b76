/// Wire-level helpers for the stream viewer backend.
///
/// The backend forwards Xtream data mostly untouched, so numbers arrive as
/// JSON numbers or as strings depending on the provider. These helpers
/// decode such fields leniently.
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A JSON object decoded into `(key, value)` pairs in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new(entries: Vec<(String, V)>) -> Self {
        Self(entries)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, V)> {
        self.0
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V> Deserialize<'de> for OrderedMap<V>
where
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V> Visitor<'de> for OrderedMapVisitor<V>
        where
            V: Deserialize<'de>,
        {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::default())
            }

            // PHP backends encode an empty object as `[]`
            fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                while access.next_element::<IgnoredAny>()?.is_some() {}
                Ok(OrderedMap::default())
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    entries.push((key, value));
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_any(OrderedMapVisitor(PhantomData))
    }
}

/// Decodes a field whose `null` means the same as a missing value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a required unsigned integer sent as a number or numeric string.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_as_u64(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an unsigned integer, got {value}")))
}

pub(crate) fn lenient_u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_as_u64(&value)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0))
}

/// Optional unsigned integer; anything unparseable becomes `None`.
pub(crate) fn optional_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_u64(&Value::deserialize(deserializer)?))
}

pub(crate) fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Optional float sent as a number or numeric string.
pub(crate) fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Optional display string; numbers and booleans are stringified.
pub(crate) fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_string(Value::deserialize(deserializer)?))
}

/// Required display string; numbers are stringified, `null` becomes empty.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_as_string(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.trim(), "1" | "true" | "yes"),
        _ => false,
    })
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_as_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// Request bodies

#[derive(Debug, Serialize)]
pub(super) struct StreamIdBody {
    pub stream_id: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct SeriesIdBody {
    pub series_id: u64,
}

#[derive(Debug, Serialize)]
pub(super) struct FavoriteBody<'a> {
    pub media_key: &'a str,
}

// Response envelopes

/// `{"success": true}` style acknowledgement.
#[derive(Debug, Deserialize)]
pub(super) struct SuccessEnvelope {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
}

/// Response of `GET /api/playback`.
#[derive(Debug, Deserialize)]
pub(super) struct PlaybackEnvelope {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub success: bool,
    #[serde(default)]
    pub entry: Option<super::WatchRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "optional_u64")]
        id: Option<u64>,
        #[serde(default, deserialize_with = "optional_string")]
        category: Option<String>,
        #[serde(default, deserialize_with = "optional_f64")]
        position: Option<f64>,
    }

    #[test]
    fn test_ordered_map_keeps_document_order() {
        let map: OrderedMap<u32> =
            serde_json::from_str(r#"{"2": 20, "10": 100, "1": 10}"#).unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["2", "10", "1"]);
        assert_eq!(map.get("10"), Some(&100));
        assert_eq!(map.get("3"), None);
    }

    #[test]
    fn test_ordered_map_from_null() {
        let map: OrderedMap<u32> = serde_json::from_str("null").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_ordered_map_from_empty_array() {
        let map: OrderedMap<u32> = serde_json::from_str("[]").unwrap();
        assert!(map.is_empty());
        let map: OrderedMap<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_null_as_default() {
        #[derive(Debug, Deserialize)]
        struct Listing {
            #[serde(default, deserialize_with = "null_as_default")]
            items: Vec<u32>,
        }

        let listing: Listing = serde_json::from_value(json!({"items": null})).unwrap();
        assert!(listing.items.is_empty());
        let listing: Listing = serde_json::from_value(json!({})).unwrap();
        assert!(listing.items.is_empty());
        let listing: Listing = serde_json::from_value(json!({"items": [3]})).unwrap();
        assert_eq!(listing.items, vec![3]);
    }

    #[test]
    fn test_lenient_numbers() {
        let probe: Probe =
            serde_json::from_value(json!({"id": "42", "category": 7, "position": "12.5"})).unwrap();
        assert_eq!(probe.id, Some(42));
        assert_eq!(probe.category.as_deref(), Some("7"));
        assert_eq!(probe.position, Some(12.5));

        let probe: Probe =
            serde_json::from_value(json!({"id": "abc", "category": null, "position": []})).unwrap();
        assert_eq!(probe.id, None);
        assert_eq!(probe.category, None);
        assert_eq!(probe.position, None);
    }

    #[test]
    fn test_success_envelope_variants() {
        let ok: SuccessEnvelope = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(ok.success);
        let numeric: SuccessEnvelope = serde_json::from_value(json!({"success": 1})).unwrap();
        assert!(numeric.success);
        let missing: SuccessEnvelope = serde_json::from_value(json!({})).unwrap();
        assert!(!missing.success);
    }
}
