//! Built-in string formats

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

/// Named string formats checked by [`Check::format`](super::Check::format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Ipv4,
    Ipv6,
    Cuid,
    Cuid2,
    Ulid,
    Xid,
    Ksuid,
    NanoId,
    Json,
    Emoji,
    Jwt,
    Base64,
    Base64Url,
    Hex,
    E164,
    /// ISO 8601 date-time with an offset.
    IsoDateTime,
    /// ISO 8601 calendar date (`YYYY-MM-DD`).
    IsoDate,
    /// ISO 8601 time of day.
    IsoTime,
    /// ISO 8601 duration (`P3DT4H`).
    IsoDuration,
    Lowercase,
    Uppercase,
}

macro_rules! static_regex {
    ($name:ident, $pattern:literal) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect(concat!("invalid built-in regex ", stringify!($name))));
    };
}

static_regex!(EMAIL, r"^[A-Za-z0-9_'+\-.]+@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$");
static_regex!(UUID, r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$");
static_regex!(CUID, r"^[cC][^\s-]{8,}$");
static_regex!(CUID2, r"^[0-9a-z]+$");
static_regex!(ULID, r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$");
static_regex!(XID, r"^[0-9a-vA-V]{20}$");
static_regex!(KSUID, r"^[A-Za-z0-9]{27}$");
static_regex!(NANOID, r"^[a-zA-Z0-9_-]{21}$");
static_regex!(EMOJI, r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$");
static_regex!(HEX, r"^[0-9a-fA-F]*$");
static_regex!(E164, r"^\+[1-9]\d{6,14}$");
static_regex!(
    DURATION,
    r"^P(?:(\d+(?:[.,]\d+)?Y)?(\d+(?:[.,]\d+)?M)?(\d+(?:[.,]\d+)?W)?(\d+(?:[.,]\d+)?D)?)?(?:T(\d+(?:[.,]\d+)?H)?(\d+(?:[.,]\d+)?M)?(\d+(?:[.,]\d+)?S)?)?$"
);

impl StringFormat {
    /// Name reported in the `format` property of `invalid_format` issues.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Cuid => "cuid",
            Self::Cuid2 => "cuid2",
            Self::Ulid => "ulid",
            Self::Xid => "xid",
            Self::Ksuid => "ksuid",
            Self::NanoId => "nanoid",
            Self::Json => "json_string",
            Self::Emoji => "emoji",
            Self::Jwt => "jwt",
            Self::Base64 => "base64",
            Self::Base64Url => "base64url",
            Self::Hex => "hex",
            Self::E164 => "e164",
            Self::IsoDateTime => "datetime",
            Self::IsoDate => "date",
            Self::IsoTime => "time",
            Self::IsoDuration => "duration",
            Self::Lowercase => "lowercase",
            Self::Uppercase => "uppercase",
        }
    }

    /// Returns `true` if `input` is in this format.
    #[must_use]
    pub fn validate(self, input: &str) -> bool {
        match self {
            Self::Email => {
                EMAIL.is_match(input) && !input.starts_with('.') && !input.contains("..")
            }
            Self::Url => url::Url::parse(input).is_ok(),
            Self::Uuid => UUID.is_match(input) && uuid::Uuid::try_parse(input).is_ok(),
            Self::Ipv4 => input.parse::<Ipv4Addr>().is_ok(),
            Self::Ipv6 => input.parse::<Ipv6Addr>().is_ok(),
            Self::Cuid => CUID.is_match(input),
            Self::Cuid2 => CUID2.is_match(input),
            Self::Ulid => ULID.is_match(input),
            Self::Xid => XID.is_match(input),
            Self::Ksuid => KSUID.is_match(input),
            Self::NanoId => NANOID.is_match(input),
            Self::Json => serde_json::from_str::<serde_json::Value>(input).is_ok(),
            Self::Emoji => EMOJI.is_match(input),
            Self::Jwt => is_jwt(input),
            Self::Base64 => STANDARD.decode(input).is_ok(),
            Self::Base64Url => URL_SAFE_NO_PAD.decode(input.trim_end_matches('=')).is_ok(),
            Self::Hex => HEX.is_match(input),
            Self::E164 => E164.is_match(input),
            Self::IsoDateTime => is_iso_datetime(input),
            Self::IsoDate => input.len() == 10 && NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok(),
            Self::IsoTime => {
                NaiveTime::parse_from_str(input, "%H:%M:%S%.f").is_ok()
                    || NaiveTime::parse_from_str(input, "%H:%M").is_ok()
            }
            Self::IsoDuration => DURATION.is_match(input) && input != "P" && !input.ends_with('T'),
            Self::Lowercase => input.chars().all(|c| !c.is_uppercase()),
            Self::Uppercase => input.chars().all(|c| !c.is_lowercase()),
        }
    }
}

fn is_iso_datetime(input: &str) -> bool {
    DateTime::parse_from_rfc3339(input).is_ok()
        || NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
}

fn is_jwt(input: &str) -> bool {
    let mut parts = input.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(decoded) = URL_SAFE_NO_PAD.decode(header.trim_end_matches('=')) else {
        return false;
    };
    serde_json::from_slice::<serde_json::Value>(&decoded)
        .ok()
        .and_then(|json| json.get("alg").cloned())
        .is_some()
}
