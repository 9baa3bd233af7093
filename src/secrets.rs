use std::fmt;
use std::str::FromStr;

use ethers::prelude::k256::SecretKey;

/// A signing key sourced from the process environment.
///
/// `Debug` is implemented by hand so the key material never ends up in logs
/// or error reports. `Display` exposes the raw hex and exists solely to hand
/// the key to the `forge` subprocess.
#[derive(Clone)]
pub struct PrivateKey {
    pub key: SecretKey,
}

impl FromStr for PrivateKey {
    type Err = eyre::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim_start_matches("0x");

        let bytes = hex::decode(s)?;

        let key = SecretKey::from_slice(&bytes)?;

        Ok(Self { key })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl fmt::Display for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.key.to_bytes()))
    }
}
