//! Shared helpers for BluOS payload parsing and URL building.

use quick_xml::events::BytesStart;

// ─────────────────────────────────────────────────────────────────────────────
// XML Parsing Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Gets an attribute value from an XML element with entities decoded.
///
/// # Arguments
/// * `elem` - The XML element to search
/// * `attr_name` - The attribute name as bytes (e.g., `b"modelName"`)
///
/// # Returns
/// The attribute value as a String, or None if not found
pub fn get_xml_attr(elem: &BytesStart, attr_name: &[u8]) -> Option<String> {
    elem.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == attr_name)
        .map(|a| decode_entities(&String::from_utf8_lossy(&a.value)))
}

/// Gets an attribute value, treating an empty or whitespace-only value as absent.
pub fn get_non_empty_attr(elem: &BytesStart, attr_name: &[u8]) -> Option<String> {
    get_xml_attr(elem, attr_name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a BluOS boolean attribute (`true`/`1`).
pub fn get_bool_attr(elem: &BytesStart, attr_name: &[u8]) -> bool {
    matches!(
        get_xml_attr(elem, attr_name).as_deref().map(str::trim),
        Some("true") | Some("1")
    )
}

/// Decodes XML/HTML entities in raw element text or attribute values.
pub fn decode_entities(raw: &str) -> String {
    html_escape::decode_html_entities(raw).to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// URL Building
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the base URL of a player's HTTP control interface.
pub fn build_player_url(address: &str, port: u16, path: &str) -> String {
    format!("http://{}:{}{}", address, port, path)
}

/// Resolves an artwork reference against the player that reported it.
///
/// BluOS reports local artwork as a path (`/Artwork?...`) and streaming
/// service artwork as an absolute URL.
pub fn resolve_image_url(address: &str, port: u16, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else if image.starts_with('/') {
        build_player_url(address, port, image)
    } else {
        build_player_url(address, port, &format!("/{}", image))
    }
}
