use std::path::Path;
use std::process::{Command, Output};

fn acquire_imu(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_acquire_imu"))
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn unsupported_frequency_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();
    let output = acquire_imu(dir.path(), &["/dev/ttyUSB0", "115200", "out.bin", "7"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FREQUENCY"), "stderr: {}", stderr);
    assert!(stderr.contains("200, 100, 50, 40, 25, 20, 10, 5 or 1"), "stderr: {}", stderr);
    assert!(!dir.path().join("out.bin").exists());
}

#[test]
fn wrong_argument_count_prints_usage_and_exits_1() {
    let dir = tempfile::tempdir().unwrap();

    for args in [
        &["/dev/ttyUSB0", "115200", "out.bin"][..],
        &["/dev/ttyUSB0", "115200", "out.bin", "10", "extra"][..],
    ] {
        let output = acquire_imu(dir.path(), args);
        assert_eq!(output.status.code(), Some(1), "args: {:?}", args);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("OUTPUT_FILE"), "stderr: {}", stderr);
        assert!(!dir.path().join("out.bin").exists());
    }
}

#[test]
fn help_exits_0() {
    let dir = tempfile::tempdir().unwrap();
    let output = acquire_imu(dir.path(), &["--help"]);

    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("FREQUENCY"));
}
