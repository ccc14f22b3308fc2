use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const OCR_TEXT: &str = "FACTURE EN COMPTE N° 00123 du 10 mai
DOIT : S2M
Adresse de livraison : 12 rue de la Paix, 75002 Paris.
Suivant votre bon de commande : BC-117
Château Margaux 75cl  12  34  6
Chablis 75 cl 1 2 12
";

fn vinscan(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vinscan").unwrap();
    // Keep the user's configuration and data directories out of the way.
    cmd.env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"));
    cmd
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn parse_outputs_record_json() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ocr.txt", OCR_TEXT);

    vinscan(&dir)
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"invoice_number\": \"00123\""))
        .stdout(predicate::str::contains("\"payer_code\": \"S2M\""))
        .stdout(predicate::str::contains("\"month\": \"Mai\""))
        .stdout(predicate::str::contains("\"article\": \"Château Margaux\""));
}

#[test]
fn parse_reads_stdin_as_csv() {
    let dir = TempDir::new().unwrap();

    vinscan(&dir)
        .args(["parse", "-", "--format", "csv"])
        .write_stdin(OCR_TEXT)
        .assert()
        .success()
        .stdout(predicate::str::contains("00123,Mai,S2M,BC-117"))
        .stdout(predicate::str::contains("Chablis,12"));
}

#[test]
fn parse_editable_adds_blank_item() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ocr.txt", "FACTURE N° 998\n");

    vinscan(&dir)
        .args(["parse", "--editable"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"bottle_count\": 0"))
        .stderr(predicate::str::contains("Could not extract line items"));
}

#[test]
fn send_dry_run_prints_rows() {
    let dir = TempDir::new().unwrap();
    let input = write(&dir, "ocr.txt", OCR_TEXT);
    let record = dir.path().join("record.json");

    vinscan(&dir)
        .arg("parse")
        .arg(&input)
        .arg("--output")
        .arg(&record)
        .assert()
        .success();

    vinscan(&dir)
        .args(["send", "--dry-run", "--writer", "CFSTOCK", "--month", "juin"])
        .arg("--record")
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mois,DOIT,Date"))
        .stdout(predicate::str::contains("Juin,S2M,"))
        .stdout(predicate::str::contains("Château Margaux,6,CFSTOCK"))
        .stdout(predicate::str::contains("Chablis,12,CFSTOCK"));
}

#[test]
fn send_items_override_drops_placeholders() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "record.json", r#"{"month": "Mai", "line_items": []}"#);

    vinscan(&dir)
        .args(["send", "--dry-run", "--writer", "CFADMIN"])
        .args(["--item", "Pomerol=3", "--item", "=0"])
        .arg("--record")
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pomerol,3,CFADMIN"))
        .stdout(predicate::str::contains(",0,CFADMIN").not());
}

#[test]
fn send_rejects_unknown_month() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "record.json", "{}");

    vinscan(&dir)
        .args(["send", "--dry-run", "--writer", "w", "--month", "Brumaire"])
        .arg("--record")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown month"));
}

#[test]
fn send_without_items_fails() {
    let dir = TempDir::new().unwrap();
    let record = write(
        &dir,
        "record.json",
        r#"{"line_items": [{"article": "", "bottle_count": 0}]}"#,
    );

    vinscan(&dir)
        .args(["send", "--dry-run", "--writer", "w"])
        .arg("--record")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No line items"));
}

#[test]
fn send_requires_writer() {
    let dir = TempDir::new().unwrap();
    let record = write(&dir, "record.json", "{}");

    vinscan(&dir)
        .args(["send", "--dry-run"])
        .arg("--record")
        .arg(&record)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No writer identity"));
}

#[test]
fn preview_without_spreadsheet_fails() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "config.json", r#"{"sheet": {"spreadsheet_id": ""}}"#);

    vinscan(&dir)
        .arg("--config")
        .arg(&config)
        .arg("preview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no spreadsheet id configured"));
}

#[test]
fn config_init_then_get() {
    let dir = TempDir::new().unwrap();

    vinscan(&dir).args(["config", "init"]).assert().success();

    vinscan(&dir)
        .args(["config", "get", "sheet.preview_limit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("200"));
}

#[test]
fn config_set_writes_the_file_given_by_config() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("x.json");

    vinscan(&dir)
        .arg("--config")
        .arg(&custom)
        .args(["config", "set", "sheet.spreadsheet_id", "abc"])
        .assert()
        .success();

    let saved = fs::read_to_string(&custom).unwrap();
    assert!(saved.contains("\"spreadsheet_id\": \"abc\""));
    assert!(!dir.path().join("config").join("vinscan").join("config.json").exists());

    vinscan(&dir)
        .args(["config", "get", "sheet.spreadsheet_id", "--config"])
        .arg(&custom)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"abc\""));
}
