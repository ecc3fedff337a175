//! Blocking retrieval of the dataset archives.

use log::{debug, info};
use snafu::ResultExt;

use crate::{FetchingSnafu, WomResult};

/// Fetches the raw bytes of an archive. One blocking GET, no retries;
/// retry policy is the caller's concern.
pub fn fetch_archive(url: &str) -> WomResult<Vec<u8>> {
    info!("fetch_archive: GET {}", url);
    let mut response = ureq::get(url).call().context(FetchingSnafu { url })?;
    let bytes = response
        .body_mut()
        .read_to_vec()
        .context(FetchingSnafu { url })?;
    debug!("fetch_archive: {} bytes", bytes.len());
    Ok(bytes)
}
