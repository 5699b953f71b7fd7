//! Stripping an embedded archive from a container

use tracing::info;

use crate::container::locate;
use crate::error::Result;
use crate::store::Store;

/// Remove the embedded archive and trailer from `store`
///
/// The store is cut back to the archive offset recorded in its trailer,
/// which is its length before embedding. Returns that length. A store
/// without a trailer fails with
/// [`EmbedFsError::NoFootprint`](crate::EmbedFsError::NoFootprint) and is
/// left untouched.
pub fn truncate<S: Store>(store: &mut S) -> Result<u64> {
    let archive_offset = locate(store)?;
    let size = store.size()?;

    store.truncate(archive_offset)?;
    info!(
        "Truncated embedded archive: {} -> {} bytes",
        size, archive_offset
    );
    Ok(archive_offset)
}
