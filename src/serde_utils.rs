use std::path::Path;

use eyre::Context;
use serde::de::DeserializeOwned;

pub async fn read_deserialize<T>(path: impl AsRef<Path>) -> eyre::Result<T>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading from {}", path.display()))?;

    let value = serde_yaml::from_str(&content)
        .with_context(|| format!("Parsing {}", path.display()))?;

    Ok(value)
}
