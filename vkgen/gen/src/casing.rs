//! Identifier casing for schema names.
//!
//! Schema names are snake_case or dotted (`users_user_full`, `users.get`).
//! The [`Caser`] turns them into declaration identifiers: each separator
//! (`_`, space, `.`) is dropped and the character after it is capitalised,
//! as is the first character. A table of abbreviation fixes is then applied
//! in a single left-to-right pass.
//!
//! The transform is not idempotent. Case each raw name once and keep the
//! result; never feed an already-cased identifier back in.
//!
//! ## Examples
//!
//! ```
//! use vkgen_gen::casing::Caser;
//!
//! let caser = Caser::new(true);
//! assert_eq!(caser.case("user_id"), "UserID");
//! assert_eq!(caser.case("users.get"), "UsersGet");
//! assert_eq!(caser.case("account_2fa_required"), "AccountTwoFARequired");
//!
//! // Disabled casing passes names through.
//! assert_eq!(Caser::new(false).case("user_id"), "user_id");
//! ```

/// Abbreviation fixes, tried in order at each position of the joined name.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("2fa", "TwoFA"),
    ("json", "JSON"),
    ("Json", "JSON"),
    ("Id", "ID"),
    ("Ttl", "TTL"),
    ("Sdk", "SDK"),
    ("Vk", "VK"),
    ("Tv", "TV"),
    ("Url", "URL"),
];

const SEPARATORS: &[char] = &['_', ' ', '.'];

/// Converts raw schema names into declaration identifiers.
#[derive(Debug, Clone, Copy)]
pub struct Caser {
    enabled: bool,
}

impl Caser {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Cases `name`, or returns it unchanged when casing is disabled.
    ///
    /// An empty name yields an empty string.
    pub fn case(&self, name: &str) -> String {
        if !self.enabled {
            return name.to_string();
        }
        substitute(&capitalize_words(name))
    }
}

fn capitalize_words(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if SEPARATORS.contains(&c) {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn substitute(joined: &str) -> String {
    let mut out = String::with_capacity(joined.len() + 4);
    let mut rest = joined;
    'scan: while !rest.is_empty() {
        for (from, to) in ABBREVIATIONS {
            if let Some(tail) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str) -> String {
        Caser::new(true).case(name)
    }

    #[test]
    fn capitalizes_after_each_separator() {
        assert_eq!(case("users_user_full"), "UsersUserFull");
        assert_eq!(case("users.get"), "UsersGet");
        assert_eq!(case("first name"), "FirstName");
    }

    #[test]
    fn id_suffix_is_corrected() {
        assert_eq!(case("user_id"), "UserID");
        assert!(case("owner_id").ends_with("ID"));
    }

    #[test]
    fn two_factor_abbreviation() {
        assert_eq!(case("2fa_required"), "TwoFARequired");
        assert_eq!(case("two_factor"), "TwoFactor");
    }

    #[test]
    fn abbreviations_apply_mid_word() {
        assert_eq!(case("base_sdk_url"), "BaseSDKURL");
        assert_eq!(case("cache_ttl"), "CacheTTL");
        assert_eq!(case("vk_pay"), "VKPay");
        assert_eq!(case("apps_tv_token"), "AppsTVToken");
        assert_eq!(case("getjson"), "GetJSON");
        assert_eq!(case("raw_json"), "RawJSON");
    }

    #[test]
    fn lowercase_id_inside_words_is_untouched() {
        assert_eq!(case("video"), "Video");
        assert_eq!(case("is_hidden"), "IsHidden");
    }

    #[test]
    fn trailing_and_repeated_separators_are_dropped() {
        assert_eq!(case("count_"), "Count");
        assert_eq!(case("a__b"), "AB");
    }

    #[test]
    fn non_ascii_is_capitalized() {
        assert_eq!(case("émoji_ok"), "ÉmojiOk");
    }

    #[test]
    fn empty_name_stays_empty() {
        assert_eq!(case(""), "");
    }

    #[test]
    fn disabled_caser_passes_through() {
        let caser = Caser::new(false);
        assert!(!caser.is_enabled());
        assert_eq!(caser.case("users_user_full"), "users_user_full");
    }

    #[test]
    fn recasing_is_not_stable() {
        let once = case("tvk");
        assert_eq!(once, "TVk");
        assert_eq!(case(&once), "TVK");
    }
}
