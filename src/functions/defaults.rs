//! Default helper implementations.
//!
//! | name | args | returns |
//! |------|------|---------|
//! | `len` | (s) | number |
//! | `toupper`, `tolower` | (s) | string |
//! | `replace` | (s, old, new) | string |
//! | `trim`, `trimleft`, `trimright` | (s, cutset) | string |
//! | `trimspace` | (s) | string |
//! | `trimprefix`, `trimsuffix` | (s, affix) | string |
//! | `base64`, `base64_decode` | (s) | string |
//! | `md5`, `sha256` | (s) | string (lowercase hex) |
//! | `contains` | (s, substr) | boolean |
//! | `regex` | (pattern, s) | boolean |

use super::FunctionLibrary;
use crate::error::EvalError;
use crate::expr::{Value, ValueKind};

use base64::{engine::general_purpose, Engine as _};
use md5::Md5;
use sha2::{Digest, Sha256};

const S: ValueKind = ValueKind::String;

/// Register every default helper.
pub fn register_defaults(library: &mut FunctionLibrary) {
    register_string_functions(library);
    register_encoding_functions(library);
    register_hashing_functions(library);
    register_search_functions(library);
}

/// Fetch argument `position` as a string.
///
/// [`HelperFunction::call`](super::HelperFunction::call) validates kinds
/// before invoking, so this only fails when a helper is called directly with
/// mismatched arguments.
pub fn string_arg<'a>(
    function: &str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a str, EvalError> {
    match args.get(position) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(EvalError::ArgumentType {
            function: function.to_string(),
            position,
            expected: ValueKind::String,
            found: other.kind(),
        }),
        None => Err(EvalError::Arity {
            function: function.to_string(),
            expected: position + 1,
            found: args.len(),
        }),
    }
}

/// Case conversion, replacement and trimming.
fn register_string_functions(library: &mut FunctionLibrary) {
    library
        .register("len", &[S], ValueKind::Number, |args| {
            let s = string_arg("len", args, 0)?;
            Ok(Value::Number(s.chars().count() as f64))
        })
        .register("toupper", &[S], S, |args| {
            Ok(Value::String(string_arg("toupper", args, 0)?.to_uppercase()))
        })
        .register("tolower", &[S], S, |args| {
            Ok(Value::String(string_arg("tolower", args, 0)?.to_lowercase()))
        })
        .register("replace", &[S, S, S], S, |args| {
            let s = string_arg("replace", args, 0)?;
            let old = string_arg("replace", args, 1)?;
            let new = string_arg("replace", args, 2)?;
            Ok(Value::String(s.replace(old, new)))
        })
        .register("trim", &[S, S], S, |args| {
            let s = string_arg("trim", args, 0)?;
            let cutset = string_arg("trim", args, 1)?;
            Ok(Value::String(s.trim_matches(|c: char| cutset.contains(c)).to_string()))
        })
        .register("trimleft", &[S, S], S, |args| {
            let s = string_arg("trimleft", args, 0)?;
            let cutset = string_arg("trimleft", args, 1)?;
            Ok(Value::String(
                s.trim_start_matches(|c: char| cutset.contains(c)).to_string(),
            ))
        })
        .register("trimright", &[S, S], S, |args| {
            let s = string_arg("trimright", args, 0)?;
            let cutset = string_arg("trimright", args, 1)?;
            Ok(Value::String(
                s.trim_end_matches(|c: char| cutset.contains(c)).to_string(),
            ))
        })
        .register("trimspace", &[S], S, |args| {
            Ok(Value::String(string_arg("trimspace", args, 0)?.trim().to_string()))
        })
        .register("trimprefix", &[S, S], S, |args| {
            let s = string_arg("trimprefix", args, 0)?;
            let prefix = string_arg("trimprefix", args, 1)?;
            Ok(Value::String(s.strip_prefix(prefix).unwrap_or(s).to_string()))
        })
        .register("trimsuffix", &[S, S], S, |args| {
            let s = string_arg("trimsuffix", args, 0)?;
            let suffix = string_arg("trimsuffix", args, 1)?;
            Ok(Value::String(s.strip_suffix(suffix).unwrap_or(s).to_string()))
        });
}

/// Standard base64 in both directions.
fn register_encoding_functions(library: &mut FunctionLibrary) {
    library
        .register("base64", &[S], S, |args| {
            let s = string_arg("base64", args, 0)?;
            Ok(Value::String(general_purpose::STANDARD.encode(s.as_bytes())))
        })
        .register("base64_decode", &[S], S, |args| {
            let s = string_arg("base64_decode", args, 0)?;
            general_purpose::STANDARD
                .decode(s)
                .map(|bytes| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
                .map_err(|e| EvalError::Decode {
                    function: "base64_decode".to_string(),
                    reason: format!("Base64 decode failed: {e}"),
                })
        });
}

/// Digests rendered as lowercase hex.
fn register_hashing_functions(library: &mut FunctionLibrary) {
    library
        .register("md5", &[S], S, |args| {
            let s = string_arg("md5", args, 0)?;
            Ok(Value::String(hex::encode(Md5::digest(s.as_bytes()))))
        })
        .register("sha256", &[S], S, |args| {
            let s = string_arg("sha256", args, 0)?;
            Ok(Value::String(hex::encode(Sha256::digest(s.as_bytes()))))
        });
}

fn register_search_functions(library: &mut FunctionLibrary) {
    library
        .register("contains", &[S, S], ValueKind::Bool, |args| {
            let s = string_arg("contains", args, 0)?;
            let substr = string_arg("contains", args, 1)?;
            Ok(Value::Bool(s.contains(substr)))
        })
        .register_pattern("regex", &[S, S], ValueKind::Bool, 0, |re, args| {
            Ok(Value::Bool(re.is_match(string_arg("regex", args, 1)?)))
        });
}
