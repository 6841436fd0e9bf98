use std::fs;
use tempfile::tempdir;

#[test]
fn status_lists_paths_archives_and_output_state() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    let data_dir = home.join("data");
    fs::create_dir_all(&data_dir).expect("mkdir data");
    fs::write(data_dir.join("2023.zip"), b"placeholder").expect("write bundle");
    fs::write(
        data_dir.join("lottery-data.json"),
        "{\"last_updated\":\"2024-05-11 08:00:00\",\"total_records\":42,\"jackpots\":{},\"games\":{}}",
    )
    .expect("write output");

    assert_cmd::cargo::cargo_bin_cmd!("lotto-sync")
        .current_dir(home)
        .env("LOTTO_HOME", home)
        .env("LOTTO_CONFIG_PATH", home.join("absent.toml"))
        .env("LOTTO_HISTORY_FIRST_YEAR", "2021")
        .env("LOTTO_HISTORY_LAST_YEAR", "2024")
        .arg("status")
        .assert()
        .success()
        .stdout(predicates::str::contains("status: ok"))
        .stdout(predicates::str::contains("archives.present=2023"))
        .stdout(predicates::str::contains("output.total_records=42"))
        .stdout(predicates::str::contains("output.last_updated=2024-05-11 08:00:00"));
}

#[test]
fn status_flags_unknown_lotto_variables() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    fs::create_dir_all(home.join("data")).expect("mkdir data");

    assert_cmd::cargo::cargo_bin_cmd!("lotto-sync")
        .current_dir(home)
        .env("LOTTO_HOME", home)
        .env("LOTTO_CONFIG_PATH", home.join("absent.toml"))
        .env("LOTTO_API_BAES", "https://typo.example")
        .args(["status", "--json"])
        .assert()
        .failure()
        .stdout(predicates::str::contains("\"ok\": false"))
        .stdout(predicates::str::contains("unknown environment variable LOTTO_API_BAES"))
        .stdout(predicates::str::contains("output.state=missing"));
}

#[test]
fn status_reports_invalid_config_file() {
    let tmp = tempdir().expect("tempdir");
    let home = tmp.path();
    fs::create_dir_all(home.join("data")).expect("mkdir data");
    let config_path = home.join("lotto.toml");
    fs::write(&config_path, "[live]\ntimeout_secs = 5\n\n[jackpot]\ntimeout_secs = 10\n")
        .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("lotto-sync")
        .current_dir(home)
        .env("LOTTO_HOME", home)
        .env("LOTTO_CONFIG_PATH", &config_path)
        .arg("status")
        .assert()
        .failure()
        .stdout(predicates::str::contains("config invalid"));
}
