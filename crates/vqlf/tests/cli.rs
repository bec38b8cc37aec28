//! Integration tests running the `vqlf` binary.
//!
//! Every test points the binary at its own config, catalog and store files
//! so nothing outside the temp directory is read or written.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

struct CliEnv {
    dir: TempDir,
}

impl CliEnv {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        fs::write(
            dir.path().join("catalog.json"),
            r#"{
                "fields": [
                    {"name": "chr", "category": "plain", "type": "str"},
                    {"name": "pos", "category": "plain", "type": "int"},
                    {"name": "ref", "category": "plain", "type": "str"},
                    {"name": "gene", "category": "group", "type": "str"},
                    {"name": "gt", "category": "instance", "type": "int"}
                ],
                "instances": ["boby", "sacha"]
            }"#,
        )
        .expect("failed to write catalog");
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vqlf"))
            .args(args)
            .arg("--no-color")
            .env("VQLF_CONFIG", self.path("config.toml"))
            .env("VQLF_CATALOG", self.path("catalog.json"))
            .env("VQLF_STORE", self.path("filters.json"))
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run vqlf")
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let mut all = args.to_vec();
        all.push("--json");
        let output = self.run(&all);
        assert!(
            output.status.success(),
            "vqlf {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_parse_prints_outline() {
    let env = CliEnv::new();
    let output = env.run(&["parse", "chr = 'chr1' AND (ref = 'A' OR ref = 'G')"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("AND #"));
    assert!(text.contains("└── OR #"));
    assert!(text.contains("    └── ref = 'G' #"));
}

#[test]
fn test_parse_json_holds_mapping() {
    let env = CliEnv::new();
    let json = env.run_json(&["parse", "a = 1 OR b = 2"]);
    assert_eq!(json["vql"], "a = 1 OR b = 2");
    assert_eq!(json["mapping"]["$or"][1]["field"], "b");
}

#[test]
fn test_syntax_error_exit_code() {
    let env = CliEnv::new();
    let output = env.run(&["parse", "(a = 1 OR b = 2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("Error: "));
}

#[test]
fn test_json_error_object() {
    let env = CliEnv::new();
    let output = env.run(&["parse", "", "--json"]);
    assert_eq!(output.status.code(), Some(1));
    let json: Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["code"], "SYNTAX_ERROR");
}

#[test]
fn test_sql_expands_wildcards() {
    let env = CliEnv::new();
    let json = env.run_json(&["sql", "samples.ANY.gt = 1"]);
    assert_eq!(
        json["predicate"],
        "(`sample_boby`.`gt` = 1 OR `sample_sacha`.`gt` = 1)"
    );
    assert_eq!(
        json["fields"],
        serde_json::json!(["samples.boby.gt", "samples.sacha.gt"])
    );
}

#[test]
fn test_sql_like_flag() {
    let env = CliEnv::new();
    let json = env.run_json(&["sql", "ann.gene =~ 'CFTR'", "--like"]);
    assert_eq!(json["predicate"], "`annotations`.`gene` LIKE '%CFTR%'");
}

#[test]
fn test_sql_unknown_field_suggests() {
    let env = CliEnv::new();
    let output = env.run(&["sql", "chrom = 'chr1'"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Did you mean 'chr'?"));
}

#[test]
fn test_sql_without_catalog_is_config_error() {
    let env = CliEnv::new();
    let output = Command::new(env!("CARGO_BIN_EXE_vqlf"))
        .args(["sql", "pos > 1"])
        .env("VQLF_CONFIG", env.path("config.toml"))
        .env_remove("VQLF_CATALOG")
        .env_remove("RUST_LOG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_select_statement() {
    let env = CliEnv::new();
    let json = env.run_json(&[
        "select",
        "SELECT chr, pos FROM variants WHERE ann.gene = 'GJB2'",
        "--order-by",
        "pos",
        "--limit",
        "10",
    ]);
    assert_eq!(
        json["sql"],
        "SELECT `variants`.`chr` AS `chr`, `variants`.`pos` AS `pos` FROM `variants` \
         LEFT JOIN `annotations` ON `annotations`.`variant_id` = `variants`.`id` \
         WHERE `annotations`.`gene` = 'GJB2' ORDER BY `variants`.`pos` ASC LIMIT 10"
    );
}

#[test]
fn test_render_mapping_file() {
    let env = CliEnv::new();
    let mapping = env.path("mapping.json");
    fs::write(
        &mapping,
        r#"{"$or": [{"pos": {"$gt": 100}}, {"field": "chr", "value": "chrX"}]}"#,
    )
    .unwrap();
    let output = env.run(&["render", mapping.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "pos > 100 OR chr = 'chrX'\n");
}

#[test]
fn test_saved_filter_lifecycle() {
    let env = CliEnv::new();

    let output = env.run(&["saved", "save", "snp", "ref = 'A' OR ref = 'G'"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert_eq!(stdout(&output), "Saved filter 'snp': ref = 'A' OR ref = 'G'\n");
    assert!(env.path("filters.json").exists());

    let list = env.run_json(&["saved", "list"]);
    assert_eq!(list["filters"][0]["name"], "snp");

    let shown = env.run_json(&["saved", "show", "snp"]);
    assert_eq!(shown["vql"], "ref = 'A' OR ref = 'G'");

    let output = env.run(&["saved", "delete", "snp"]);
    assert!(output.status.success());

    let output = env.run(&["saved", "show", "snp"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("no saved filter named 'snp'"));
}

#[test]
fn test_saved_save_rejects_bad_expression() {
    let env = CliEnv::new();
    let output = env.run(&["saved", "save", "bad", "a = "]);
    assert_eq!(output.status.code(), Some(1));
    assert!(!env.path("filters.json").exists());
}

#[test]
fn test_config_init_and_path() {
    let env = CliEnv::new();

    let output = env.run(&["config", "path"]);
    assert_eq!(
        stdout(&output).trim(),
        env.path("config.toml").display().to_string()
    );

    let output = env.run(&["config", "init"]);
    assert!(output.status.success());
    assert!(env.path("config.toml").exists());

    let output = env.run(&["config", "init"]);
    assert_eq!(output.status.code(), Some(5));

    let json = env.run_json(&["config", "show"]);
    assert_eq!(json["exists"], true);
    assert_eq!(json["config"]["version"], 1);
}

#[test]
fn test_broken_config_still_allows_init() {
    let env = CliEnv::new();
    fs::write(env.path("config.toml"), "version = [").unwrap();

    let output = env.run(&["parse", "a = 1"]);
    assert_eq!(output.status.code(), Some(5));

    let output = env.run(&["config", "init", "--force"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(env.run(&["parse", "a = 1"]).status.success());
}

#[test]
fn test_verbose_logs_to_stderr() {
    let env = CliEnv::new();
    let output = env.run(&["-v", "parse", "a = 1"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("AND #"));
    assert!(stderr(&output).contains("DEBUG"));
}

#[test]
fn test_completions() {
    let env = CliEnv::new();
    let output = env.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("vqlf"));
}
