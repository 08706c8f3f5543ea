//! Key case conversions used when looking up inputs in submitted data

/// `snake_case` to `camelCase`; strings without `_` are returned unchanged
#[must_use]
pub fn to_camel_case(s: &str) -> String {
    if !s.contains('_') {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut upper = false;
    for c in s.chars() {
        match c {
            '_' => upper = !out.is_empty(),
            c if upper => {
                out.extend(c.to_uppercase());
                upper = false;
            }
            c if out.is_empty() => out.extend(c.to_lowercase()),
            c => out.push(c),
        }
    }
    out
}

/// `camelCase` to `snake_case`
#[must_use]
pub fn to_snake_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Uppercase the first character
#[must_use]
pub fn first_upper(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert_eq!(to_camel_case("max_count_of_queries"), "maxCountOfQueries");
        assert_eq!(to_camel_case("title"), "title");
        assert_eq!(to_camel_case("sendHello"), "sendHello");
    }

    #[test]
    fn snake_case() {
        assert_eq!(to_snake_case("maxCountOfQueries"), "max_count_of_queries");
        assert_eq!(to_snake_case("title"), "title");
        assert_eq!(to_snake_case("Title"), "title");
    }

    #[test]
    fn first_upper_handles_empty() {
        assert_eq!(first_upper("'title' must be defined."), "'title' must be defined.");
        assert_eq!(first_upper("item is not valid."), "Item is not valid.");
        assert_eq!(first_upper(""), "");
    }
}
