//! Song template substitution.
//!
//! A template is Strudel source text with placeholder literals such as
//! `<CPS>` or `<DRUMS>`. Substitution is a literal search/replace over the
//! fixed placeholder set; anything else, including unknown `<...>` text,
//! passes through untouched.

use crate::controls::{ControlOverrides, ControlSet};
use crate::token::{Placeholder, Span, Spanned};

/// Locate every recognized placeholder in `template`, left to right.
pub fn scan_placeholders(template: &str) -> Vec<Spanned> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = template[pos..].find('<') {
        let start = pos + offset;
        match Placeholder::match_prefix(&template[start..]) {
            Some(placeholder) => {
                let end = start + placeholder.literal().len();
                found.push(Spanned {
                    placeholder,
                    span: Span { start, end },
                });
                pos = end;
            }
            // '<' is one byte, so start + 1 is always a char boundary.
            None => pos = start + 1,
        }
    }
    found
}

/// Replacement text for one placeholder under `controls`.
pub fn replacement(placeholder: Placeholder, controls: &ControlSet) -> String {
    match placeholder {
        Placeholder::P1Radio => {
            if controls.p1_hushed {
                "_".to_string()
            } else {
                String::new()
            }
        }
        Placeholder::Drums => {
            if controls.mute_drums {
                "~".to_string()
            } else {
                controls.drums_pattern.clone()
            }
        }
        Placeholder::Cps => controls.cps.clone(),
        Placeholder::Room => format_number(controls.room),
        Placeholder::Gain => format_number(controls.gain),
        Placeholder::Synth => controls.synth.clone(),
    }
}

/// Replace every placeholder in `template` with its control value.
///
/// One literal replace-all pass per placeholder, in [`Placeholder::ALL`]
/// order. Later passes see the output of earlier ones, so text exposed by a
/// replacement (`<CP<p1_Radio>S>` becomes `<CPS>`) is substituted too. Every
/// occurrence of a given placeholder receives the same text.
pub fn substitute(template: &str, controls: &ControlSet) -> String {
    if template.is_empty() {
        return String::new();
    }

    Placeholder::ALL
        .into_iter()
        .fold(template.to_string(), |song, placeholder| {
            if song.contains(placeholder.literal()) {
                song.replace(placeholder.literal(), &replacement(placeholder, controls))
            } else {
                song
            }
        })
}

/// Merge `overrides` with the defaults, then substitute into `raw`.
pub fn preprocess_song(raw: &str, overrides: &ControlOverrides) -> String {
    if raw.is_empty() {
        return String::new();
    }
    substitute(raw, &overrides.merge())
}

/// Render a number the way the browser UI prints it: shortest round-trip
/// digits, integral values without a fractional part, and exponent form
/// (`1e+21`, `1e-7`) outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    let magnitude = n.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return format!("{n}");
    }

    // `{:e}` gives shortest digits as `1.5e-7` / `1e21`; the UI signs
    // positive exponents.
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

// ── Tests ───────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::default_controls;
    use pretty_assertions::assert_eq;

    #[test]
    fn end_to_end_scenario() {
        let template = "setcps(<CPS>) room(<ROOM>) gain(<GAIN>) <DRUMS> <SYNTH>";
        let overrides = ControlOverrides {
            cps: Some("90/45/2".into()),
            mute_drums: Some(true),
            ..Default::default()
        };
        assert_eq!(
            preprocess_song(template, &overrides),
            "setcps(90/45/2) room(0.2) gain(1.2) ~ gm_piano:0"
        );
    }

    #[test]
    fn empty_template_is_empty() {
        assert_eq!(substitute("", default_controls()), "");
        assert_eq!(preprocess_song("", &ControlOverrides::default()), "");
    }

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let template = "note(\"c e g\").s(\"<piano>\") // <cps> <DRUMS <ROOM >";
        assert_eq!(substitute(template, default_controls()), template);
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let template = "<GAIN>+<GAIN>*<GAIN>";
        let controls = ControlOverrides {
            gain: Some(2.0),
            ..Default::default()
        }
        .merge();
        assert_eq!(substitute(template, &controls), "2+2*2");
    }

    #[test]
    fn drums_pattern_when_not_muted() {
        assert_eq!(
            substitute("s(\"<DRUMS>\")", default_controls()),
            "s(\"bd sd [~ bd] sd, hh*16\")"
        );
    }

    #[test]
    fn p1_radio_hush() {
        let hushed = ControlOverrides {
            p1_hushed: Some(true),
            ..Default::default()
        }
        .merge();
        assert_eq!(substitute("<p1_Radio>p1: note(c)", &hushed), "_p1: note(c)");
        assert_eq!(substitute("<p1_Radio>p1: note(c)", default_controls()), "p1: note(c)");
    }

    #[test]
    fn placeholders_are_case_sensitive() {
        assert_eq!(substitute("<cps><P1_RADIO>", default_controls()), "<cps><P1_RADIO>");
    }

    #[test]
    fn multibyte_text_survives() {
        let template = "ñ<ROOM>✓<<SYNTH>>";
        assert_eq!(substitute(template, default_controls()), "ñ0.2✓<gm_piano:0>");
    }

    #[test]
    fn placeholder_exposed_by_an_earlier_pass_is_replaced() {
        assert_eq!(substitute("<CP<p1_Radio>S>", default_controls()), "120/60/4");

        let hushed = ControlOverrides {
            p1_hushed: Some(true),
            ..Default::default()
        }
        .merge();
        assert_eq!(substitute("<CP<p1_Radio>S>", &hushed), "<CP_S>");
    }

    #[test]
    fn later_placeholders_inside_replacement_text_are_replaced() {
        let controls = ControlOverrides {
            drums_pattern: Some("<CPS>".into()),
            cps: Some("<DRUMS>".into()),
            ..Default::default()
        }
        .merge();
        // DRUMS runs before CPS, so its output is rescanned but CPS output is not.
        assert_eq!(substitute("<DRUMS>", &controls), "<DRUMS>");
        assert_eq!(substitute("<CPS>", &controls), "<DRUMS>");
    }

    #[test]
    fn substitution_is_deterministic() {
        let template = "<CPS> <ROOM> <GAIN> <DRUMS> <SYNTH> <p1_Radio>";
        let a = substitute(template, default_controls());
        let b = substitute(template, default_controls());
        assert_eq!(a, b);
    }

    #[test]
    fn scan_reports_spans() {
        let spans = scan_placeholders("x<CPS>y<DRUMS>");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].placeholder, Placeholder::Cps);
        assert_eq!(spans[0].span, Span { start: 1, end: 6 });
        assert_eq!(spans[1].placeholder, Placeholder::Drums);
        assert_eq!(spans[1].span, Span { start: 7, end: 14 });
    }

    #[test]
    fn numbers_print_like_the_ui() {
        assert_eq!(format_number(0.2), "0.2");
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.05), "0.05");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn extreme_numbers_use_exponent_form() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e22), "1.5e+22");
        assert_eq!(format_number(-2e30), "-2e+30");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(2.5e-9), "2.5e-9");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }
}
