//! Matrix parameters: `name;k1=v1;k2=[a,b]` path segments carrying read params.
//!
//! Segments are split on `;`, `=` and `,` before percent-decoding, so encoded values may
//! contain any of the delimiters. An empty list is written as a bare `k[]`, which keeps it
//! apart from `k=[]`, the list holding one empty string.

use crate::request::{ParamValue, Params};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::btree_map::Entry;

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub(crate) fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Suffix of a bare key holding an empty list. Raw brackets never occur in an encoded key.
const EMPTY_LIST: &str = "[]";

fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Encode a resource name and its params as one matrix path segment.
pub fn encode(resource: &str, params: &Params) -> String {
    let mut out = encode_component(resource);
    for (key, value) in params {
        out.push(';');
        out.push_str(&encode_component(key));
        match value {
            ParamValue::Many(items) if items.is_empty() => out.push_str(EMPTY_LIST),
            ParamValue::One(s) => {
                out.push('=');
                out.push_str(&encode_component(s));
            }
            ParamValue::Many(items) => {
                out.push('=');
                out.push('[');
                let encoded: Vec<String> = items.iter().map(|s| encode_component(s)).collect();
                out.push_str(&encoded.join(","));
                out.push(']');
            }
        }
    }
    out
}

fn decode_value(raw: &str) -> ParamValue {
    match raw.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
        Some(inner) => ParamValue::Many(inner.split(',').map(decode_component).collect()),
        None => ParamValue::One(decode_component(raw)),
    }
}

/// Decode `key=value` pairs. Repeated keys accumulate in order of appearance.
pub fn decode_params<'a>(pairs: impl IntoIterator<Item = &'a str>) -> Params {
    let mut params = Params::new();
    for pair in pairs.into_iter().filter(|p| !p.is_empty()) {
        let (raw_key, value) = match pair.split_once('=') {
            Some((raw_key, raw_value)) => (raw_key, decode_value(raw_value)),
            None => match pair.strip_suffix(EMPTY_LIST) {
                Some(raw_key) => (raw_key, ParamValue::Many(Vec::new())),
                None => (pair, ParamValue::One(String::new())),
            },
        };
        match params.entry(decode_component(raw_key)) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                for item in value.as_slice() {
                    slot.get_mut().push(item.clone());
                }
            }
        }
    }
    params
}

/// Decode a full matrix segment into the resource name and its params.
pub fn decode(segment: &str) -> (String, Params) {
    let mut parts = segment.split(';');
    let resource = parts.next().map(decode_component).unwrap_or_default();
    (resource, decode_params(parts))
}
