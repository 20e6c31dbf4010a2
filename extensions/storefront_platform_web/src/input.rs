//! Browser input conversion (DOM `KeyboardEvent` -> storefront_platform)

use storefront_platform::Key;

/// Convert a DOM `KeyboardEvent.key` value to a [`Key`]
pub fn convert_key(key: &str) -> Key {
    match key {
        " " | "Spacebar" => Key::Space,
        "Enter" => Key::Enter,
        // "Esc" is what older Edge and IE report
        "Escape" | "Esc" => Key::Escape,
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c),
                _ => Key::Unknown,
            }
        }
    }
}
