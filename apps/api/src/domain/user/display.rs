// Name formatting used by member listings and avatars

/// Up to two upper-cased initials, one per space-separated part
///
/// ```
/// use teamhub_api::domain::user::initials;
///
/// assert_eq!(initials("ada lovelace byron"), "AL");
/// assert_eq!(initials(""), "");
/// ```
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// First and last name only, dropping any middle names
pub fn first_last_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [first, .., last] => format!("{} {}", first, last),
        _ => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_name_initial() {
        assert_eq!(initials("madonna"), "M");
    }

    #[test]
    fn initials_ignore_extra_whitespace() {
        assert_eq!(initials("  grace   hopper "), "GH");
    }

    #[test]
    fn first_last_skips_middle_names() {
        assert_eq!(first_last_name("Maria da Silva Santos"), "Maria Santos");
    }

    #[test]
    fn first_last_keeps_single_name() {
        assert_eq!(first_last_name("Cher"), "Cher");
        assert_eq!(first_last_name(""), "");
    }
}
