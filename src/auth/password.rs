use crate::config;
use crate::error::ApiError;

/// bcrypt on the blocking pool; cost comes from config
pub async fn hash(plain: String) -> Result<String, ApiError> {
    let cost = config::config().security.bcrypt_cost;
    let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(anyhow::Error::from)?
        .map_err(anyhow::Error::from)?;
    Ok(hashed)
}

pub async fn verify(plain: String, hashed: String) -> Result<bool, ApiError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hashed))
        .await
        .map_err(anyhow::Error::from)?
        .map_err(anyhow::Error::from)?;
    Ok(matches)
}
