//! Native-friendly names for remote identifiers.

/// Convert a remote identifier to `snake_case`.
///
/// `getForecast` becomes `get_forecast`, `HTTPServer` becomes `http_server`,
/// and `-` or spaces become `_`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            out.push('_');
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

/// Convert a resource name to an `UPPER_SNAKE_CASE` constant-style name.
pub fn to_constant_case(name: &str) -> String {
    to_snake_case(name)
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case_to_snake() {
        assert_eq!(to_snake_case("getForecast"), "get_forecast");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("read-file"), "read_file");
        assert_eq!(to_snake_case("v2Api"), "v2_api");
        assert_eq!(to_snake_case("get_Forecast"), "get_forecast");
    }

    #[test]
    fn constant_case() {
        assert_eq!(to_constant_case("appConfig"), "APP_CONFIG");
        assert_eq!(to_constant_case("readme.md"), "README_MD");
    }
}
