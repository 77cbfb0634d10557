//! Preset records and the save request, in their wire shape.
//!
//! JSON field names match the preset API: `rawCode`, `controlsJson`,
//! `createdAt` on records, and `name`/`raw`/`controlsJson` on save requests.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::controls::{ControlOverrides, ControlSet};
use crate::error::{PresetError, ValidationError};

/// Store-assigned preset identity.
pub type PresetId = i64;

/// Maximum preset name length, in characters.
pub const MAX_NAME_LEN: usize = 200;

// ── Stored Records ──────────────────────────────────────────

/// A saved preset, including the song template and controls snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub id: PresetId,
    pub name: String,
    /// Song template, placeholders intact.
    pub raw_code: String,
    /// Serialized total `ControlSet`, exactly as it was saved.
    pub controls_json: String,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
}

impl Preset {
    pub fn summary(&self) -> PresetSummary {
        PresetSummary {
            id: self.id,
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }

    /// Parse the stored controls. Fields missing from older presets stay
    /// unset and fall back to the defaults when merged.
    pub fn controls(&self) -> Result<ControlOverrides, PresetError> {
        ControlOverrides::from_json(&self.controls_json).map_err(PresetError::MalformedStoredData)
    }
}

/// The listing view of a preset: no template, no controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSummary {
    pub id: PresetId,
    pub name: String,
    #[serde(deserialize_with = "deserialize_created_at")]
    pub created_at: DateTime<Utc>,
}

/// Parse a `createdAt` value. RFC 3339 with an offset is preferred; the API
/// also emits bare local-format timestamps (`2025-11-20T14:03:12.5533333`),
/// which are read as UTC.
pub fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::parse_from_rfc3339(value) {
        return Some(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_created_at<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_created_at(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid createdAt timestamp: {value}")))
}

// ── Save Request ────────────────────────────────────────────

/// Body of a save call. Missing fields deserialize as empty strings and are
/// then rejected by [`SavePresetRequest::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePresetRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub controls_json: String,
}

impl SavePresetRequest {
    /// Build a request from a template and a resolved control snapshot.
    pub fn new(name: impl Into<String>, raw: impl Into<String>, controls: &ControlSet) -> Self {
        SavePresetRequest {
            name: name.into(),
            raw: raw.into(),
            controls_json: controls.to_json(),
        }
    }

    /// Check the request before it reaches a store.
    ///
    /// Blank (whitespace-only) values count as empty. Name length is measured
    /// in characters, not bytes. `controlsJson` must parse as a JSON object.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(ValidationError::NameTooLong { len, max: MAX_NAME_LEN });
        }
        if self.raw.trim().is_empty() {
            return Err(ValidationError::EmptyRawCode);
        }
        if self.controls_json.trim().is_empty() {
            return Err(ValidationError::EmptyControlsJson);
        }
        match serde_json::from_str::<serde_json::Value>(&self.controls_json) {
            Ok(serde_json::Value::Object(_)) => Ok(()),
            Ok(other) => Err(ValidationError::MalformedControlsJson(format!(
                "expected an object, found {other}"
            ))),
            Err(e) => Err(ValidationError::MalformedControlsJson(e.to_string())),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::default_controls;

    fn request(name: &str, raw: &str, json: &str) -> SavePresetRequest {
        SavePresetRequest {
            name: name.into(),
            raw: raw.into(),
            controls_json: json.into(),
        }
    }

    #[test]
    fn valid_request_passes() {
        let req = SavePresetRequest::new("Default Beat", "setcps(<CPS>)", default_controls());
        assert_eq!(req.validate(), Ok(()));
    }

    #[test]
    fn name_rules() {
        assert_eq!(request("", "x", "{}").validate(), Err(ValidationError::EmptyName));
        assert_eq!(request("   ", "x", "{}").validate(), Err(ValidationError::EmptyName));
        assert_eq!(request(&"a".repeat(200), "x", "{}").validate(), Ok(()));
        assert_eq!(
            request(&"a".repeat(201), "x", "{}").validate(),
            Err(ValidationError::NameTooLong { len: 201, max: 200 })
        );
        // 200 multibyte characters are still within the limit.
        assert_eq!(request(&"é".repeat(200), "x", "{}").validate(), Ok(()));
    }

    #[test]
    fn raw_and_controls_required() {
        assert_eq!(request("n", "", "{}").validate(), Err(ValidationError::EmptyRawCode));
        assert_eq!(request("n", "x", "").validate(), Err(ValidationError::EmptyControlsJson));
    }

    #[test]
    fn controls_must_be_a_json_object() {
        assert!(matches!(
            request("n", "x", "{not json").validate(),
            Err(ValidationError::MalformedControlsJson(_))
        ));
        assert!(matches!(
            request("n", "x", "[1,2]").validate(),
            Err(ValidationError::MalformedControlsJson(_))
        ));
    }

    #[test]
    fn save_request_wire_names() {
        let req: SavePresetRequest =
            serde_json::from_str(r#"{"name":"a","raw":"b","controlsJson":"{}"}"#).unwrap();
        assert_eq!(req, request("a", "b", "{}"));

        let partial: SavePresetRequest = serde_json::from_str(r#"{"name":"a"}"#).unwrap();
        assert_eq!(partial.validate(), Err(ValidationError::EmptyRawCode));
    }

    #[test]
    fn record_wire_names() {
        let preset = Preset {
            id: 5,
            name: "n".into(),
            raw_code: "r".into(),
            controls_json: "{}".into(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let value = serde_json::to_value(&preset).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["id", "name", "rawCode", "controlsJson", "createdAt"] {
            assert!(obj.contains_key(key), "missing {key}");
        }

        let summary = serde_json::to_value(preset.summary()).unwrap();
        assert_eq!(summary.as_object().unwrap().len(), 3);
        assert!(summary.get("rawCode").is_none());
    }

    #[test]
    fn created_at_accepts_offsetless_timestamps() {
        let summary: PresetSummary = serde_json::from_str(
            r#"{"id":1,"name":"A","createdAt":"2025-11-20T14:03:12.5533333"}"#,
        )
        .unwrap();
        let expected = DateTime::parse_from_rfc3339("2025-11-20T14:03:12.5533333Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(summary.created_at, expected);

        let whole_seconds = parse_created_at("2025-11-20T14:03:12").unwrap();
        assert_eq!(whole_seconds.timestamp(), expected.timestamp());
    }

    #[test]
    fn created_at_converts_offsets_to_utc() {
        let stamp = parse_created_at("2025-11-20T16:03:12+02:00").unwrap();
        assert_eq!(stamp, parse_created_at("2025-11-20T14:03:12Z").unwrap());
    }

    #[test]
    fn created_at_rejects_garbage() {
        assert_eq!(parse_created_at("yesterday"), None);
        let err = serde_json::from_str::<PresetSummary>(
            r#"{"id":1,"name":"A","createdAt":"yesterday"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("createdAt"));
    }

    #[test]
    fn record_round_trips_through_json() {
        let preset = Preset {
            id: 3,
            name: "n".into(),
            raw_code: "r".into(),
            controls_json: "{}".into(),
            created_at: DateTime::from_timestamp(1_700_000_000, 123_000_000).unwrap(),
        };
        let json = serde_json::to_string(&preset).unwrap();
        assert_eq!(serde_json::from_str::<Preset>(&json).unwrap(), preset);
    }

    #[test]
    fn malformed_stored_controls() {
        let preset = Preset {
            id: 1,
            name: "n".into(),
            raw_code: "r".into(),
            controls_json: "{\"room\":".into(),
            created_at: Utc::now(),
        };
        assert!(matches!(preset.controls(), Err(PresetError::MalformedStoredData(_))));
    }
}
