// MotionWatch: On-board Storage
//
// Mounts the SPIFFS data partition so recordings can be written through
// `std::fs`.

use std::ffi::CString;

use esp_idf_sys::{esp, esp_vfs_spiffs_conf_t, esp_vfs_spiffs_register};

use crate::config::*;

/// Mount the default SPIFFS partition at [`STORAGE_MOUNT_POINT`], formatting
/// it on first use.
pub fn mount_spiffs() -> anyhow::Result<()> {
    let base_path = CString::new(STORAGE_MOUNT_POINT)?;
    let conf = esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: STORAGE_MAX_FILES,
        format_if_mount_failed: true,
    };

    // SAFETY: the VFS layer copies `base_path` during registration.
    esp!(unsafe { esp_vfs_spiffs_register(&conf) })?;

    log::info!("SPIFFS mounted at {}", STORAGE_MOUNT_POINT);
    Ok(())
}

pub fn record_path() -> String {
    format!("{}/{}", STORAGE_MOUNT_POINT, RECORD_FILE_NAME)
}
