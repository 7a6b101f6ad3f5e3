use crate::header::{Platform, HEADER_LEN};
use crate::EFFECT_READER;

fn push_7bit(out: &mut Vec<u8>, mut value: u32) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

fn push_string(out: &mut Vec<u8>, text: &str) {
    push_7bit(out, text.len() as u32);
    out.extend_from_slice(text.as_bytes());
}

/// Content stream holding a single effect asset read by the stock effect reader.
pub fn effect_content(effect: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    push_7bit(&mut out, 1);
    push_string(&mut out, EFFECT_READER);
    out.extend_from_slice(&0i32.to_le_bytes());
    push_7bit(&mut out, 0);
    push_7bit(&mut out, 1);
    out.extend_from_slice(&(effect.len() as i32).to_le_bytes());
    out.extend_from_slice(effect);
    out
}

/// Uncompressed XNB file around `content`.
pub fn build_xnb(platform: Platform, version: u8, content: &[u8]) -> Vec<u8> {
    let mut out = b"XNB".to_vec();
    out.push(platform.id());
    out.push(version);
    out.push(0);
    out.extend_from_slice(&((HEADER_LEN + content.len()) as u32).to_le_bytes());
    out.extend_from_slice(content);
    out
}

/// Compressed XNB file whose payload frames `content` as stored blocks of at most 0xFFFF bytes,
/// for use with a pass-through [`crate::Decompressor`].
pub fn build_compressed_xnb(platform: Platform, content: &[u8]) -> Vec<u8> {
    let mut payload = Vec::new();
    for chunk in content.chunks(0xFFFF) {
        payload.push(0xFF);
        payload.extend_from_slice(&(chunk.len() as u16).to_be_bytes());
        payload.extend_from_slice(&(chunk.len() as u16).to_be_bytes());
        payload.extend_from_slice(chunk);
    }
    let mut out = b"XNB".to_vec();
    out.push(platform.id());
    out.push(5);
    out.push(0x80);
    out.extend_from_slice(&((crate::COMPRESSED_HEADER_LEN + payload.len()) as u32).to_le_bytes());
    out.extend_from_slice(&(content.len() as u32).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}
