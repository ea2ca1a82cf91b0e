//! Tests for loading PARAM.SFO metadata from an installed game layout

use ol_vfs::{load_psf_data, metadata::DEFAULT_FW_VERSION, SfoBuilder};
use std::path::Path;
use tempfile::TempDir;

fn write_param_sfo(game_dir: &Path, data: &[u8]) -> std::path::PathBuf {
    let sce_sys = game_dir.join("sce_sys");
    std::fs::create_dir_all(&sce_sys).unwrap();
    let path = sce_sys.join("param.sfo");
    std::fs::write(&path, data).unwrap();
    path
}

#[test]
fn test_load_full_param_sfo() {
    let temp_dir = TempDir::new().unwrap();
    let data = SfoBuilder::new()
        .content_id("UP0000-CUSA00001_00-0000000000000000")
        .title_id("CUSA00001")
        .title("Sample Game")
        .app_ver("01.05")
        .system_ver(0x0550_0000)
        .pubtool_info("c_date=20200101,sdk_ver=05508001,img0_l0_size=1")
        .attribute(1 << 14)
        .category("gd")
        .generate();
    let path = write_param_sfo(temp_dir.path(), &data);

    let psf = load_psf_data(&path).expect("param.sfo should load");
    assert_eq!(psf.id, "CUSA00001");
    assert_eq!(psf.title, "Sample Game");
    assert_eq!(psf.app_version, "01.05");
    assert_eq!(psf.fw_version, 0x0550_0000);
    assert_eq!(psf.sdk_version, 0x0550_8001);
    assert!(psf.psvr_supported);
    assert!(!psf.psvr_required);
    assert!(psf.splash_path.is_none());
}

#[test]
fn test_splash_path_detected() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_param_sfo(temp_dir.path(), &SfoBuilder::new().title("Game").generate());
    let splash = temp_dir.path().join("sce_sys").join("pic1.png");
    std::fs::write(&splash, b"\x89PNG").unwrap();

    let psf = load_psf_data(&path).unwrap();
    assert_eq!(psf.splash_path, Some(splash));
    assert_eq!(psf.fw_version, DEFAULT_FW_VERSION);
}

#[test]
fn test_missing_file_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    assert!(load_psf_data(&temp_dir.path().join("sce_sys").join("param.sfo")).is_none());
}

#[test]
fn test_corrupt_file_is_absent() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_param_sfo(temp_dir.path(), b"definitely not an sfo file");
    assert!(load_psf_data(&path).is_none());
}
