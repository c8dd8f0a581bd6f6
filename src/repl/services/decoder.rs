//! Response body decoding.
//!
//! Bodies arrive as raw bytes. They are first decompressed according to
//! `Content-Encoding`, then turned into text using the charset from
//! `Content-Type`. Bodies that are not textual are shown as base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use flate2::read::{DeflateDecoder, GzDecoder};
use std::io::Read;
use thiserror::Error;

pub const ENC_IDENTITY: &str = "identity";
pub const ENC_GZIP: &str = "gzip";
pub const ENC_DEFLATE: &str = "deflate";
pub const ENC_ZSTD: &str = "zstd";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("unsupported content encoding '{0}'")]
    UnsupportedEncoding(String),
    #[error("failed to decode {encoding} body: {source}")]
    Corrupted {
        encoding: String,
        #[source]
        source: std::io::Error,
    },
}

pub fn decode_gzip(data: &[u8]) -> std::io::Result<Bytes> {
    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Bytes::from(decoded))
}

pub fn decode_deflate(data: &[u8]) -> std::io::Result<Bytes> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(Bytes::from(decoded))
}

pub fn decode_zstd(data: &[u8]) -> std::io::Result<Bytes> {
    Ok(Bytes::from(zstd::decode_all(data)?))
}

/// Undo every coding listed in a `Content-Encoding` value.
///
/// Codings are listed in the order they were applied, so they are removed
/// from last to first.
pub fn decompress(data: Bytes, content_encoding: Option<&str>) -> Result<Bytes, DecodeError> {
    let Some(content_encoding) = content_encoding else {
        return Ok(data);
    };

    let codings: Vec<String> = content_encoding
        .split(',')
        .map(|c| c.trim().to_ascii_lowercase())
        .filter(|c| !c.is_empty())
        .collect();

    let mut body = data;
    for coding in codings.iter().rev() {
        let decoded = match coding.as_str() {
            ENC_IDENTITY => continue,
            ENC_GZIP | "x-gzip" => decode_gzip(&body),
            ENC_DEFLATE => decode_deflate(&body),
            ENC_ZSTD => decode_zstd(&body),
            other => return Err(DecodeError::UnsupportedEncoding(other.to_string())),
        };
        body = decoded.map_err(|source| DecodeError::Corrupted {
            encoding: coding.clone(),
            source,
        })?;
    }
    Ok(body)
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn charset(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches('"').as_bytes())
        } else {
            None
        }
    })
}

fn is_textual(media_type: &str) -> bool {
    media_type.starts_with("text/")
        || media_type.ends_with("+json")
        || media_type.ends_with("+xml")
        || matches!(
            media_type,
            "application/json"
                | "application/xml"
                | "application/javascript"
                | "application/x-www-form-urlencoded"
        )
}

/// Turn a decompressed body into displayable text.
///
/// Textual media types are decoded with their declared charset (UTF-8 when
/// none is given); malformed sequences become replacement characters. Without
/// a `Content-Type`, valid UTF-8 is shown as is. Everything else is base64.
pub fn body_to_text(body: &[u8], content_type: Option<&str>) -> String {
    match content_type {
        Some(content_type) if is_textual(&media_type(content_type)) => {
            let encoding = charset(content_type).unwrap_or(UTF_8);
            let (text, _, _) = encoding.decode(body);
            text.into_owned()
        }
        None => match std::str::from_utf8(body) {
            Ok(text) => text.to_string(),
            Err(_) => STANDARD.encode(body),
        },
        Some(_) => STANDARD.encode(body),
    }
}

/// Decompress and decode a response body in one go
pub fn decode_body(
    data: Bytes,
    content_encoding: Option<&str>,
    content_type: Option<&str>,
) -> Result<String, DecodeError> {
    let body = decompress(data, content_encoding)?;
    Ok(body_to_text(&body, content_type))
}
