//! NASC value encoding.
//!
//! Values use Base64 with the alphabet `A-Z a-z 0-9 . -` and `*` in place of `=` padding.
//! Request bodies are form-encoded; `*` is left alone by form encoding and must be escaped by
//! hand as `%2A`.

use base64::{
    Engine as _,
    alphabet::Alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};

const ALPHABET: Alphabet =
    match Alphabet::new("ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789.-") {
        Ok(alphabet) => alphabet,
        Err(_) => panic!("invalid NASC alphabet"),
    };

const ENGINE: GeneralPurpose = GeneralPurpose::new(
    &ALPHABET,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Padding character used on the wire.
const PAD: char = '*';

/// Encodes `value` with the NASC alphabet.
pub fn encode_value(value: impl AsRef<[u8]>) -> String {
    ENGINE.encode(value).replace('=', "*")
}

/// Decodes a NASC Base64 value. Padding is optional.
pub fn decode_value(value: &str) -> Result<Vec<u8>, base64::DecodeError> {
    ENGINE.decode(value.trim_end_matches(PAD))
}

/// Form-encodes already NASC-encoded pairs, in order.
pub fn encode_form<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish().replace('*', "%2A")
}

/// Splits a form body into decoded pairs, in order.
pub fn decode_form(body: &[u8]) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body)
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_vectors() {
        assert_eq!(encode_value("1"), "MQ**");
        assert_eq!(encode_value("001"), "MDAx");
        assert_eq!(encode_value("LOGIN"), "TE9HSU4*");
        assert_eq!(encode_value("1.2.3.4:12345"), "MS4yLjMuNDoxMjM0NQ**");
        assert_eq!(encode_value("1700000000"), "MTcwMDAwMDAwMA**");
        assert_eq!(encode_value([0xFB, 0xFF]), ".-8*");
        assert_eq!(encode_value(""), "");
    }

    #[test]
    fn test_decode_accepts_padded_and_bare() {
        assert_eq!(decode_value("MQ**").unwrap(), b"1");
        assert_eq!(decode_value("MQ").unwrap(), b"1");
        assert_eq!(decode_value(".-8*").unwrap(), [0xFB, 0xFF]);
        assert!(decode_value("M+Q").is_err());
    }

    #[test]
    fn test_form_escapes_padding() {
        let body = encode_form([("gameid", "MDAwMDAwMDA*"), ("action", "TE9HSU4*")]);
        assert_eq!(body, "gameid=MDAwMDAwMDA%2A&action=TE9HSU4%2A");
    }

    #[test]
    fn test_form_decodes_percent_and_plus() {
        let pairs = decode_form(b"returncd=MDAx&token=a%2Ab+c&=skipped&empty=");
        assert_eq!(
            pairs,
            vec![
                ("returncd".to_owned(), "MDAx".to_owned()),
                ("token".to_owned(), "a*b c".to_owned()),
                ("empty".to_owned(), String::new()),
            ]
        );
    }
}
