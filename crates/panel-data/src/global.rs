//! Process-wide instance
//!
//! A host installs one [`DataManager`] at startup; any part of the process
//! can then reach it through [`get_instance`]. Code that can take the manager
//! as a parameter should do so instead.

use crate::error::{DataError, DataResult};
use crate::manager::DataManager;
use once_cell::sync::OnceCell;

static GLOBAL: OnceCell<DataManager> = OnceCell::new();

/// Install the process-wide manager
///
/// # Errors
/// [`DataError::AlreadyInstalled`] on every call after the first.
pub fn install_global(manager: DataManager) -> DataResult<()> {
    GLOBAL
        .set(manager)
        .map_err(|_| DataError::AlreadyInstalled)?;
    tracing::debug!("global data manager installed");
    Ok(())
}

/// The process-wide manager
///
/// # Errors
/// [`DataError::NotInstalled`] before [`install_global`].
pub fn get_instance() -> DataResult<DataManager> {
    GLOBAL.get().cloned().ok_or(DataError::NotInstalled)
}
