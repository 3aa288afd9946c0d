//! Named glyph registry shared by every renderer.

use crossterm::style::Stylize;

const ICONS: &[(&str, &str)] = &[
    ("robot", "🤖"),
    ("document", "📄"),
    ("upload", "⬆"),
    ("folder", "📁"),
    ("settings", "⚙"),
    ("chart", "📊"),
    ("tools", "🔧"),
    ("briefcase", "💼"),
    ("package", "📦"),
    ("check", "✔"),
    ("error", "✖"),
    ("warning", "⚠"),
    ("info", "ℹ"),
    ("lock", "🔒"),
    ("menu", "☰"),
    ("stop", "■"),
    ("lightning", "⚡"),
    ("download", "⬇"),
];

pub fn lookup(name: &str) -> Option<&'static str> {
    ICONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, glyph)| *glyph)
}

/// Glyph for `name`, styled by `class` (`bold`, `dim`, anything else plain).
///
/// Unknown names log a warning and render as an empty string.
pub fn get_icon(name: &str, class: &str) -> String {
    let Some(glyph) = lookup(name) else {
        tracing::warn!(icon = name, "icon not found");
        return String::new();
    };
    match class {
        "bold" => glyph.bold().to_string(),
        "dim" => glyph.dim().to_string(),
        _ => glyph.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_icons_render() {
        assert_eq!(get_icon("download", "icon"), "⬇");
        assert!(get_icon("check", "bold").contains('✔'));
    }

    #[test]
    fn unknown_icon_is_empty() {
        assert_eq!(get_icon("unicorn", "icon"), "");
        assert!(lookup("unicorn").is_none());
    }

    #[test]
    fn registry_names_are_unique() {
        let mut names: Vec<_> = ICONS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ICONS.len());
    }
}
