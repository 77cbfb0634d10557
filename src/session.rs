//! Editing session: the template being played, the controls the user has
//! touched, and the save/load flows that move them to and from a store.
//!
//! The session only holds *overrides*. Anything the user never touched is
//! resolved against the defaults at render or save time.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::controls::{ControlOverrides, ControlSet, GAIN_RANGE, ROOM_RANGE};
use crate::cps::validate_cps;
use crate::error::{ControlError, PresetResult, SongFileError, ValidationError};
use crate::preset::{Preset, PresetId, PresetStore, SavePresetRequest};
use crate::template::preprocess_song;

/// What happened when a stored preset was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Template and controls both applied.
    Applied,
    /// Template applied; the stored controls were unreadable and the
    /// previous controls were kept.
    ControlsSkipped { reason: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    raw: String,
    controls: ControlOverrides,
}

impl Session {
    pub fn new(raw: impl Into<String>) -> Self {
        Session {
            raw: raw.into(),
            controls: ControlOverrides::default(),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn set_raw(&mut self, raw: impl Into<String>) {
        self.raw = raw.into();
    }

    /// The user's overrides, unmerged.
    pub fn overrides(&self) -> &ControlOverrides {
        &self.controls
    }

    /// Controls in effect: overrides merged with the defaults.
    pub fn controls(&self) -> ControlSet {
        self.controls.merge()
    }

    /// Layer a partial update over the current overrides.
    pub fn set_controls(&mut self, update: ControlOverrides) {
        self.controls.apply(update);
    }

    /// The song as it should be handed to the audio engine.
    pub fn render(&self) -> String {
        preprocess_song(&self.raw, &self.controls)
    }

    // ── Interactive Edits ───────────────────────────────────

    /// Commit the tempo text field. The input is trimmed first; an invalid
    /// expression is refused and the field reverts to the tempo in effect.
    pub fn commit_tempo(&mut self, input: &str) -> Result<(), ControlError> {
        let value = input.trim();
        if !validate_cps(value) {
            return Err(ControlError::InvalidCps {
                input: input.to_string(),
                restored: self.controls().cps,
            });
        }
        self.controls.cps = Some(value.to_string());
        Ok(())
    }

    /// Commit the reverb slider, clamped to its range.
    pub fn commit_room(&mut self, room: f64) {
        self.controls.room = Some(ROOM_RANGE.clamp(room));
    }

    /// Commit the gain slider, clamped to its range.
    pub fn commit_gain(&mut self, gain: f64) {
        self.controls.gain = Some(GAIN_RANGE.clamp(gain));
    }

    pub fn set_mute_drums(&mut self, muted: bool) {
        self.controls.mute_drums = Some(muted);
    }

    pub fn set_drums_pattern(&mut self, pattern: impl Into<String>) {
        self.controls.drums_pattern = Some(pattern.into());
    }

    pub fn set_p1_hushed(&mut self, hushed: bool) {
        self.controls.p1_hushed = Some(hushed);
    }

    pub fn set_synth(&mut self, synth: impl Into<String>) {
        self.controls.synth = Some(synth.into());
    }

    // ── Saving ──────────────────────────────────────────────

    /// Snapshot the template and the full control set for saving under `name`.
    pub fn save_request(&self, name: &str) -> Result<SavePresetRequest, ValidationError> {
        let controls = self.controls();
        if !validate_cps(&controls.cps) {
            return Err(ValidationError::InvalidCps(controls.cps));
        }
        let request = SavePresetRequest::new(name, self.raw.clone(), &controls);
        request.validate()?;
        Ok(request)
    }

    pub fn save_to<S: PresetStore + ?Sized>(&self, store: &S, name: &str) -> PresetResult<PresetId> {
        let request = self.save_request(name)?;
        store.save(&request)
    }

    // ── Loading ─────────────────────────────────────────────

    /// Apply a stored preset. The template always applies; stored controls
    /// replace the current overrides only if they parse.
    pub fn apply_preset(&mut self, preset: &Preset) -> LoadOutcome {
        self.raw = preset.raw_code.clone();
        match preset.controls() {
            Ok(controls) => {
                self.controls = controls;
                info!("loaded preset {} '{}'", preset.id, preset.name);
                LoadOutcome::Applied
            }
            Err(e) => {
                warn!("preset {} has unreadable controls, keeping current: {e}", preset.id);
                LoadOutcome::ControlsSkipped {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn load_from<S: PresetStore + ?Sized>(
        &mut self,
        store: &S,
        id: PresetId,
    ) -> PresetResult<LoadOutcome> {
        let preset = store.get_by_id(id)?;
        Ok(self.apply_preset(&preset))
    }

    /// Apply a song/settings file (see [`SongFile`]). Controls in the file
    /// are layered over the current ones.
    pub fn load_song_file(&mut self, json: &str) -> Result<(), SongFileError> {
        let file = SongFile::from_json(json)?;
        if let Some(raw) = file.raw {
            self.raw = raw;
        }
        if let Some(controls) = file.controls {
            self.set_controls(controls);
        }
        Ok(())
    }

    pub fn to_song_file(&self) -> SongFile {
        SongFile {
            raw: Some(self.raw.clone()),
            controls: Some(self.controls.clone()),
        }
    }
}

// ── Song Files ──────────────────────────────────────────────

/// A song/settings file: `{"raw": "...", "controls": {...}}`.
///
/// Reading is lenient: `raw` is used only if it is a string, and each
/// `controls` field only if it has the right type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<ControlOverrides>,
}

impl SongFile {
    pub fn from_json(json: &str) -> Result<Self, SongFileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let obj = value.as_object().ok_or(SongFileError::NotAnObject)?;
        let raw = obj.get("raw").and_then(|v| v.as_str()).map(str::to_string);
        let controls = match obj.get("controls") {
            Some(v) if v.is_object() => Some(ControlOverrides::from_value_lenient(v)),
            Some(v) => {
                warn!("song file controls ignored: expected an object, found {v}");
                None
            }
            None => None,
        };
        Ok(SongFile { raw, controls })
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

// ── Tests ───────────────────────────────────────────────────
