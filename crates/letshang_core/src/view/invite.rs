//! Invite links and share text.
//!
//! A hang is shared as `<base>?code=XXXXXX`. Opening such a link selects
//! the hang from the store; the code is the only credential.

use crate::code::ShareCode;
use crate::model::hang::Hang;

pub const CODE_QUERY_PARAM: &str = "code";

/// Builds the invite URL for a hang code.
pub fn invite_url(base_url: &str, code: &ShareCode) -> String {
    let base = base_url.trim();
    let (without_fragment, fragment) = match base.split_once('#') {
        Some((head, tail)) => (head, Some(tail)),
        None => (base, None),
    };
    let separator = if without_fragment.contains('?') { '&' } else { '?' };
    let mut url = format!("{without_fragment}{separator}{CODE_QUERY_PARAM}={code}");
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Extracts the raw `code` query value from a URL or bare query string.
///
/// Returns `None` when the parameter is absent or empty. The value is not
/// validated here; `HangService::join` does that.
pub fn code_from_url(url: &str) -> Option<String> {
    let query = match url.split_once('?') {
        Some((_, query)) => query,
        None if url.contains('=') => url,
        None => return None,
    };
    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == CODE_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Text handed to the platform share sheet or clipboard.
pub fn share_text(hang: &Hang) -> String {
    format!(
        "Join me for {}!\n{} at {}\n{}",
        hang.title, hang.date, hang.time, hang.location
    )
}

/// Share text followed by the invite link.
pub fn share_message(hang: &Hang, base_url: &str) -> String {
    format!("{}\n{}", share_text(hang), invite_url(base_url, &hang.code))
}

#[cfg(test)]
mod tests {
    use super::{code_from_url, invite_url, share_message, share_text};
    use crate::code::ShareCode;
    use crate::model::hang::NewHang;

    fn code() -> ShareCode {
        ShareCode::parse("K7Q2ZP").unwrap()
    }

    #[test]
    fn invite_url_appends_query_parameter() {
        assert_eq!(
            invite_url("https://letshang.app/", &code()),
            "https://letshang.app/?code=K7Q2ZP"
        );
        assert_eq!(
            invite_url("https://letshang.app/?ref=sms#top", &code()),
            "https://letshang.app/?ref=sms&code=K7Q2ZP#top"
        );
    }

    #[test]
    fn code_is_read_from_query_or_bare_string() {
        assert_eq!(
            code_from_url("https://letshang.app/?ref=x&code=k7q2zp#details").as_deref(),
            Some("k7q2zp")
        );
        assert_eq!(code_from_url("code=K7Q2ZP").as_deref(), Some("K7Q2ZP"));
        assert_eq!(code_from_url("https://letshang.app/"), None);
        assert_eq!(code_from_url("https://letshang.app/?code="), None);
    }

    #[test]
    fn share_text_lists_when_and_where() {
        let hang = NewHang {
            title: "Game Night".to_string(),
            date: "2024-01-15".to_string(),
            time: "19:00".to_string(),
            location: "My place".to_string(),
            ..NewHang::default()
        }
        .into_hang(code(), "Alex");
        assert_eq!(
            share_text(&hang),
            "Join me for Game Night!\n2024-01-15 at 19:00\nMy place"
        );
        assert!(share_message(&hang, "https://letshang.app/").ends_with("?code=K7Q2ZP"));
    }
}
