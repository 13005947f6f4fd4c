//! Windows-1252 text handling.
//!
//! The game client only reads its item tables in the Windows-1252 code page,
//! so every byte that crosses the file boundary goes through this module.
//! Decoding is total (all 256 byte values map to a char) and encoding is the
//! exact inverse for decoded text, which keeps untouched regions byte-stable.

use std::borrow::Cow;

use encoding_rs::{EncoderResult, WINDOWS_1252};

/// Substitute written for characters the code page cannot represent.
pub const UNMAPPABLE_REPLACEMENT: u8 = b'?';

pub fn decode_legacy(bytes: &[u8]) -> String {
    let (text, _had_errors) = WINDOWS_1252.decode_without_bom_handling(bytes);
    text.into_owned()
}

pub fn encode_legacy(text: &str) -> Vec<u8> {
    let mut encoder = WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut remaining = text;

    loop {
        let (result, read) =
            encoder.encode_from_utf8_to_vec_without_replacement(remaining, &mut out, true);
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::Unmappable(_) => out.push(UNMAPPABLE_REPLACEMENT),
            EncoderResult::OutputFull => out.reserve(remaining.len().max(16)),
        }
    }

    out
}

/// Clamp `text` to characters the code page can store, replacing the rest.
pub fn to_legacy_repertoire(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_representable) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(decode_legacy(&encode_legacy(text)))
}

fn is_representable(c: char) -> bool {
    if c.is_ascii() {
        return true;
    }
    let mut buf = [0u8; 4];
    let (_, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    !unmappable
}
