//! Process-wide instance
//!
//! Kept in its own test binary: the slot can only be filled once per process.

use panel_data::{get_instance, install_global, DataConfig, DataError, ManagerState};
use panel_test_utils::{manager_with, sample_loader};

#[tokio::test]
async fn install_once_then_share() {
    assert_eq!(get_instance().unwrap_err(), DataError::NotInstalled);

    install_global(manager_with(sample_loader(), DataConfig::default())).unwrap();
    let second = manager_with(sample_loader(), DataConfig::default());
    assert_eq!(install_global(second).unwrap_err(), DataError::AlreadyInstalled);

    get_instance().unwrap().initialize().await.unwrap();
    assert_eq!(get_instance().unwrap().state(), ManagerState::Ready);
    assert_eq!(get_instance().unwrap().get_kpi_list().unwrap().len(), 4);
}
