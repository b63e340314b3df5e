//! Marker and separator glyphs, Unicode or plain ASCII.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyphs {
    /// RNA polymerase position on the template
    pub polymerase: &'static str,
    /// Ribosome position on the mRNA
    pub ribosome: &'static str,
    pub bond: &'static str,
    pub h_separator: &'static str,
    pub arrow_right: &'static str,
    pub arrow_down: &'static str,
    pub done: &'static str,
}

pub fn select(fancy_requested: bool) -> Glyphs {
    if fancy_requested {
        fancy()
    } else {
        ascii()
    }
}

fn ascii() -> Glyphs {
    Glyphs {
        polymerase: "v",
        ribosome: "^",
        bond: "-",
        h_separator: "-",
        arrow_right: ">",
        arrow_down: "|",
        done: "+",
    }
}

fn fancy() -> Glyphs {
    Glyphs {
        polymerase: "▼",
        ribosome: "▲",
        bond: "─",
        h_separator: "─",
        arrow_right: "→",
        arrow_down: "↓",
        done: "✓",
    }
}
