/// One of the fixed placeholders a song template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    P1Radio, // <p1_Radio>
    Drums,   // <DRUMS>
    Cps,     // <CPS>
    Room,    // <ROOM>
    Gain,    // <GAIN>
    Synth,   // <SYNTH>
}

impl Placeholder {
    /// Every placeholder, in substitution order.
    pub const ALL: [Placeholder; 6] = [
        Placeholder::P1Radio,
        Placeholder::Drums,
        Placeholder::Cps,
        Placeholder::Room,
        Placeholder::Gain,
        Placeholder::Synth,
    ];

    /// The literal text matched in templates.
    pub fn literal(self) -> &'static str {
        match self {
            Placeholder::P1Radio => "<p1_Radio>",
            Placeholder::Drums => "<DRUMS>",
            Placeholder::Cps => "<CPS>",
            Placeholder::Room => "<ROOM>",
            Placeholder::Gain => "<GAIN>",
            Placeholder::Synth => "<SYNTH>",
        }
    }

    /// Placeholder whose literal starts at the beginning of `text`.
    pub fn match_prefix(text: &str) -> Option<Placeholder> {
        Placeholder::ALL
            .into_iter()
            .find(|p| text.starts_with(p.literal()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub placeholder: Placeholder,
    pub span: Span,
}
