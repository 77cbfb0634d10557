//! Playback controls: the total `ControlSet`, the sparse `ControlOverrides`
//! a caller supplies, and the fixed defaults they are merged against.
//!
//! Field names on the wire are camelCase (`muteDrums`, `drumsPattern`,
//! `p1Hushed`) so stored `controlsJson` values stay readable by the browser UI.

use std::sync::LazyLock;

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Defaults ────────────────────────────────────────────────

pub const DEFAULT_CPS: &str = "120/60/4";
pub const DEFAULT_ROOM: f64 = 0.2;
pub const DEFAULT_GAIN: f64 = 1.2;
pub const DEFAULT_MUTE_DRUMS: bool = false;
pub const DEFAULT_DRUMS_PATTERN: &str = "bd sd [~ bd] sd, hh*16";
pub const DEFAULT_P1_HUSHED: bool = false;
pub const DEFAULT_SYNTH: &str = "gm_piano:0";

static DEFAULTS: LazyLock<ControlSet> = LazyLock::new(|| ControlSet {
    cps: DEFAULT_CPS.to_string(),
    room: DEFAULT_ROOM,
    gain: DEFAULT_GAIN,
    mute_drums: DEFAULT_MUTE_DRUMS,
    drums_pattern: DEFAULT_DRUMS_PATTERN.to_string(),
    p1_hushed: DEFAULT_P1_HUSHED,
    synth: DEFAULT_SYNTH.to_string(),
});

/// The built-in control defaults. Built once, never mutated.
pub fn default_controls() -> &'static ControlSet {
    &DEFAULTS
}

// ── Ranges & Choices ────────────────────────────────────────

/// Inclusive range and slider step for a numeric control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ControlRange {
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

/// Reverb amount.
pub const ROOM_RANGE: ControlRange = ControlRange { min: 0.0, max: 1.0, step: 0.05 };
/// Output gain.
pub const GAIN_RANGE: ControlRange = ControlRange { min: 0.0, max: 3.0, step: 0.1 };

/// A selectable synth: identifier passed to the audio engine and its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthChoice {
    pub id: &'static str,
    pub label: &'static str,
}

pub const SYNTH_CHOICES: &[SynthChoice] = &[
    SynthChoice { id: "gm_piano:0", label: "GM Piano" },
    SynthChoice { id: "gm_piano:4", label: "GM E.Piano" },
];

/// Look up the display label for a synth id.
pub fn synth_label(id: &str) -> Option<&'static str> {
    SYNTH_CHOICES.iter().find(|c| c.id == id).map(|c| c.label)
}

// ── ControlSet ──────────────────────────────────────────────

/// The seven playback parameters, every one populated.
///
/// Deserializing goes through [`ControlOverrides`], so missing or `null`
/// fields in stored JSON fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ControlOverrides")]
pub struct ControlSet {
    /// Tempo expression, `int/int/int`.
    pub cps: String,
    /// Reverb amount [0, 1].
    pub room: f64,
    /// Output gain [0, 3].
    pub gain: f64,
    pub mute_drums: bool,
    /// Pattern source handed verbatim to the audio engine.
    pub drums_pattern: String,
    /// Silences voice "p1" when set.
    pub p1_hushed: bool,
    pub synth: String,
}

impl Default for ControlSet {
    fn default() -> Self {
        default_controls().clone()
    }
}

impl From<ControlOverrides> for ControlSet {
    fn from(overrides: ControlOverrides) -> Self {
        merge_controls(&overrides)
    }
}

impl ControlSet {
    /// Serialize as the `controlsJson` snapshot stored with a preset.
    pub fn to_json(&self) -> String {
        // A struct of strings, finite-or-not floats and bools always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Every field, expressed as an explicit override.
    pub fn to_overrides(&self) -> ControlOverrides {
        ControlOverrides {
            cps: Some(self.cps.clone()),
            room: Some(self.room),
            gain: Some(self.gain),
            mute_drums: Some(self.mute_drums),
            drums_pattern: Some(self.drums_pattern.clone()),
            p1_hushed: Some(self.p1_hushed),
            synth: Some(self.synth.clone()),
        }
    }
}

// ── ControlOverrides ────────────────────────────────────────

/// A partial set of controls. `None` means "use whatever is underneath".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mute_drums: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drums_pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1_hushed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synth: Option<String>,
}

impl ControlOverrides {
    pub fn is_empty(&self) -> bool {
        *self == ControlOverrides::default()
    }

    /// Parse stored or user-supplied controls JSON. Unknown fields are ignored.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read overrides field by field from an untyped value.
    ///
    /// A field of the wrong type is dropped on its own; the rest still apply.
    /// Anything other than an object yields no overrides.
    pub fn from_value_lenient(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            if !value.is_null() {
                warn!("ignoring controls: expected an object, found {value}");
            }
            return ControlOverrides::default();
        };
        ControlOverrides {
            cps: lenient_field(obj, "cps"),
            room: lenient_field(obj, "room"),
            gain: lenient_field(obj, "gain"),
            mute_drums: lenient_field(obj, "muteDrums"),
            drums_pattern: lenient_field(obj, "drumsPattern"),
            p1_hushed: lenient_field(obj, "p1Hushed"),
            synth: lenient_field(obj, "synth"),
        }
    }

    /// Layer `update` on top of `self`; fields set in `update` win.
    pub fn apply(&mut self, update: ControlOverrides) {
        let ControlOverrides {
            cps,
            room,
            gain,
            mute_drums,
            drums_pattern,
            p1_hushed,
            synth,
        } = update;
        if cps.is_some() {
            self.cps = cps;
        }
        if room.is_some() {
            self.room = room;
        }
        if gain.is_some() {
            self.gain = gain;
        }
        if mute_drums.is_some() {
            self.mute_drums = mute_drums;
        }
        if drums_pattern.is_some() {
            self.drums_pattern = drums_pattern;
        }
        if p1_hushed.is_some() {
            self.p1_hushed = p1_hushed;
        }
        if synth.is_some() {
            self.synth = synth;
        }
    }

    /// Resolve against the built-in defaults.
    pub fn merge(&self) -> ControlSet {
        merge_controls(self)
    }
}

fn lenient_field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let value = obj.get(key)?;
    match serde_json::from_value::<Option<T>>(value.clone()) {
        Ok(field) => field,
        Err(e) => {
            warn!("ignoring control '{key}': {e}");
            None
        }
    }
}

/// Resolve a sparse override set into a total `ControlSet`.
///
/// Each field takes the override when present, otherwise the default.
pub fn merge_controls(overrides: &ControlOverrides) -> ControlSet {
    let d = default_controls();
    ControlSet {
        cps: overrides.cps.clone().unwrap_or_else(|| d.cps.clone()),
        room: overrides.room.unwrap_or(d.room),
        gain: overrides.gain.unwrap_or(d.gain),
        mute_drums: overrides.mute_drums.unwrap_or(d.mute_drums),
        drums_pattern: overrides
            .drums_pattern
            .clone()
            .unwrap_or_else(|| d.drums_pattern.clone()),
        p1_hushed: overrides.p1_hushed.unwrap_or(d.p1_hushed),
        synth: overrides.synth.clone().unwrap_or_else(|| d.synth.clone()),
    }
}

// ── Tests ───────────────────────────────────────────────────
