//! Locale helpers.

/// SP-API spells locales with underscores: `en-US` becomes `en_US`.
pub fn convert_locale_to_sp_api_format(locale: &str) -> String {
    locale.replace('-', "_")
}
