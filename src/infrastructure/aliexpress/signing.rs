//! Request signing for the AliExpress open platform.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

pub const SIGN_METHOD: &str = "sha256";

/// Computes the `sign` parameter for a `/sync` call.
///
/// Every parameter (system and business, `sign` itself excluded) is sorted
/// by key and concatenated as `key1value1key2value2...`. The result is the
/// upper-case hex HMAC-SHA256 of that string keyed by the app secret.
pub fn sign(params: &BTreeMap<String, String>, app_secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(app_secret.as_bytes()).expect("HMAC accepts any key length");

    for (key, value) in params.iter().filter(|(k, _)| k.as_str() != "sign") {
        mac.update(key.as_bytes());
        mac.update(value.as_bytes());
    }

    hex::encode_upper(mac.finalize().into_bytes())
}
