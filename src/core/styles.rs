//! Style roles for terminal output
//!
//! Each logical role maps to an optional `colored::Color`. Colouring is
//! applied only when the caller passes `enabled = true`.
//!
//! ```
//! use rollcall::core::styles::StyleRole;
//! assert_eq!(StyleRole::Success.paint("Recorded", false), "Recorded");
//! assert!(StyleRole::Success.paint("Recorded", true).starts_with("\x1b["));
//! ```

use colored::Color;

macro_rules! style {
    ( $( $variant:ident => $color:expr ),+ $(,)? ) => {
        #[derive(Copy, Clone, Debug, PartialEq, Eq)]
        pub enum StyleRole { $( $variant ),+ }

        impl StyleRole {
            pub fn color(self) -> Option<Color> {
                match self { $( StyleRole::$variant => $color ),+ }
            }
        }
    }
}

style! {
    Header  => Some(Color::Yellow),
    Key     => Some(Color::BrightGreen),
    Value   => None,
    Success => Some(Color::Green),
    Error   => Some(Color::BrightRed),
    Info    => Some(Color::Cyan),
    Dim     => Some(Color::BrightBlack),
}

impl StyleRole {
    pub fn paint(self, text: &str, enabled: bool) -> String {
        match self.color().and_then(ansi_code) {
            Some(code) if enabled => format!("\x1b[{}m{}\x1b[0m", code, text),
            _ => text.to_string(),
        }
    }

    /// prettytable style spec (foreground colour) for this role
    pub fn to_prettytable_spec(self) -> Option<&'static str> {
        let spec = match self.color()? {
            Color::Red => "Fr",
            Color::Green => "Fg",
            Color::Yellow => "Fy",
            Color::Blue => "Fb",
            Color::Cyan => "Fc",
            Color::BrightRed => "FR",
            Color::BrightGreen => "FG",
            Color::BrightBlack => "FK",
            _ => return None,
        };
        Some(spec)
    }
}

fn ansi_code(color: Color) -> Option<&'static str> {
    let code = match color {
        Color::Red => "31",
        Color::Green => "32",
        Color::Yellow => "33",
        Color::Blue => "34",
        Color::Cyan => "36",
        Color::BrightBlack => "90",
        Color::BrightRed => "91",
        Color::BrightGreen => "92",
        _ => return None,
    };
    Some(code)
}
