/// Interprets an environment-variable flag. Accepts `1`/`true`/`yes`/`on` and `0`/`false`/`no`/`off`
/// in any case, with surrounding whitespace ignored; anything else (including an absent variable)
/// falls back to `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        _ => default,
    }
}
