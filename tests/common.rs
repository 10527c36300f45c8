#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Per-test scratch directory, also used as HOME so the config dir is isolated.
pub fn test_home(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("fuellog_test_{}", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create test home");
    path
}

/// `fuellog --test --db <home>/test.db` with HOME pointing at the scratch dir
pub fn fl(home: &PathBuf) -> Command {
    let mut cmd = cargo_bin_cmd!("fuellog");
    cmd.env("HOME", home)
        .env("APPDATA", home)
        .args(["--test", "--db", &db_path(home)]);
    cmd
}

pub fn db_path(home: &PathBuf) -> String {
    home.join("test.db").to_string_lossy().to_string()
}

/// Output file path inside the scratch dir, removed if it already exists
pub fn temp_out(home: &PathBuf, name: &str) -> String {
    let p = home.join(name);
    fs::remove_file(&p).ok();
    p.to_string_lossy().to_string()
}

/// Fresh HOME with an initialized database
pub fn setup(name: &str) -> PathBuf {
    let home = test_home(name);
    fl(&home).arg("init").assert().success();
    home
}

/// Add a WITHOUT_HOUR_METER record through the CLI, meters left to their defaults
pub fn add_simple(home: &PathBuf, date: &str, time: &str, equipment: &str, liters: &str) {
    fl(home)
        .args([
            "add",
            "--date",
            date,
            "--time",
            time,
            "--equipment",
            equipment,
            "--operator",
            "Jose",
            "--liters",
            liters,
            "--price",
            "2.80",
        ])
        .assert()
        .success();
}
