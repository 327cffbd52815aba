use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

const BIN_NAME: &str = "tally";

fn tally(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("TALLY_DATA_DIR", dir.path());
    cmd.env("RUST_LOG", "off");
    cmd
}

fn run(dir: &TempDir, args: &[&str]) -> String {
    let output = tally(dir).args(args).assert().success().get_output().stdout.clone();
    String::from_utf8(output).expect("utf-8 output")
}

/// Initialized ledger with a `Cash` account (1000 EUR) and one tag of each kind
fn ledger() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    run(&dir, &["init"]);
    run(&dir, &["account", "create", "Cash", "--balance", "1000"]);
    run(&dir, &["group", "create", "Food"]);
    run(&dir, &["category", "create", "Groceries"]);
    run(&dir, &["party", "create", "Market"]);
    dir
}

fn add_expense(dir: &TempDir, amount: &str) -> String {
    let stdout = run(
        dir,
        &[
            "transaction", "add", amount, "--account", "Cash", "--group", "Food",
            "--category", "Groceries", "--party", "Market", "--date", "2025-01-15",
        ],
    );
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Transaction: "))
        .expect("transaction id in output")
        .trim()
        .to_string()
}

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .args(["account", "list"])
        .assert()
        .failure()
        .stderr(contains("tally init"));
}

#[test]
fn init_seeds_default_currencies() {
    let dir = TempDir::new().unwrap();
    tally(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Initialization complete"));

    tally(&dir)
        .args(["account", "currencies"])
        .assert()
        .success()
        .stdout(contains("EUR").and(contains("USD")).and(contains("KZT")));
}

#[test]
fn expense_lowers_balance_and_delete_restores_it() {
    let dir = ledger();
    let id = add_expense(&dir, "42.50");

    tally(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("957.50"));

    tally(&dir)
        .args(["transaction", "list"])
        .assert()
        .success()
        .stdout(contains("-42.50").and(contains("15.01.2025")).and(contains("Market")));

    run(&dir, &["transaction", "edit", &id, "--amount", "50"]);
    tally(&dir)
        .args(["account", "show", "Cash"])
        .assert()
        .success()
        .stdout(contains("950.00 EUR").and(contains("1 transaction(s)")));

    run(&dir, &["txn", "delete", &id]);
    tally(&dir)
        .args(["account", "show", "Cash"])
        .assert()
        .success()
        .stdout(contains("1,000.00 EUR").and(contains("0 transaction(s)")));
}

#[test]
fn unknown_reference_is_rejected() {
    let dir = ledger();
    tally(&dir)
        .args([
            "transaction", "add", "10", "--account", "Cash", "--group", "Travel",
            "--category", "Groceries", "--party", "Market",
        ])
        .assert()
        .failure()
        .stderr(contains("Group not available"));

    tally(&dir)
        .args(["account", "show", "Cash"])
        .assert()
        .success()
        .stdout(contains("1,000.00 EUR"));
}

#[test]
fn transfer_applies_coefficient() {
    let dir = ledger();
    run(&dir, &["account", "create", "Card", "--currency", "USD"]);

    tally(&dir)
        .args(["transfer", "create", "Cash", "Card", "100", "--coef", "1.5"])
        .assert()
        .success()
        .stdout(contains("-100.00").and(contains("+150.00")));

    tally(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(contains("900.00").and(contains("150.00")));

    tally(&dir)
        .args(["transfer", "create", "Cash", "Cash", "10"])
        .assert()
        .failure()
        .stderr(contains("Invalid transfer"));
}

#[test]
fn choices_rank_most_used_first() {
    let dir = ledger();
    run(&dir, &["party", "create", "Bakery"]);
    add_expense(&dir, "5");

    let stdout = run(&dir, &["party", "choices"]);
    let market = stdout.find("Market").expect("Market listed");
    let bakery = stdout.find("Bakery").expect("Bakery listed");
    assert!(market < bakery);

    run(&dir, &["party", "deactivate", "Bakery"]);
    tally(&dir)
        .args(["party", "choices"])
        .assert()
        .success()
        .stdout(contains("Bakery").not());
}

#[test]
fn list_limit_keeps_most_recent_rows() {
    let dir = ledger();
    let base = [
        "--account", "Cash", "--group", "Food", "--category", "Groceries", "--party", "Market",
    ];
    run(&dir, &[&["transaction", "add", "1.11", "--date", "2025-05-01"][..], &base[..]].concat());
    run(&dir, &[&["transaction", "add", "2.22", "--date", "2025-06-01"][..], &base[..]].concat());

    tally(&dir)
        .args(["transaction", "list", "--limit", "1"])
        .assert()
        .success()
        .stdout(contains("-2.22").and(contains("01.06.2025")).and(contains("1.11").not()));
}

#[test]
fn summary_shows_active_accounts_and_month_income() {
    let dir = ledger();
    run(&dir, &["account", "create", "Dormant", "--balance", "5"]);
    run(&dir, &["account", "deactivate", "Dormant"]);

    let base = [
        "--account", "Cash", "--group", "Food", "--category", "Groceries", "--party", "Market",
        "--income",
    ];
    run(&dir, &[&["transaction", "add", "250"][..], &base[..]].concat());
    run(&dir, &[&["transaction", "add", "777", "--date", "2020-01-01"][..], &base[..]].concat());

    tally(&dir)
        .arg("summary")
        .assert()
        .success()
        .stdout(
            contains("Cash")
                .and(contains("2,027.00"))
                .and(contains("Dormant").not())
                .and(contains("Income since 01."))
                .and(contains(": 250.00")),
        );
}
