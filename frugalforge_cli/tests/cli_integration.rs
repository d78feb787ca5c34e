use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn frugalforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_frugalforge"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("binary runs")
}

fn write_datapack(root: &Path) {
    let professions = root.join("professions");
    fs::create_dir_all(&professions).unwrap();
    fs::write(
        professions.join("tailoring.json"),
        r#"{
  "professionId": 197,
  "professionName": "Tailoring",
  "recipes": [
    {
      "recipeId": "bolt-of-linen-cloth",
      "professionId": 197,
      "name": "Bolt of Linen Cloth",
      "createsItemId": 2996,
      "createsQuantity": 1,
      "learnedByTrainer": true,
      "cooldownSeconds": 0,
      "minSkill": 1,
      "orangeUntil": 24,
      "yellowUntil": 36,
      "greenUntil": 49,
      "grayAt": 50,
      "reagents": [{"itemId": 2589, "qty": 2}]
    }
  ]
}"#,
    )
    .unwrap();
    fs::write(
        root.join("items.json"),
        r#"[{"itemId": 2996, "name": "Bolt of Linen Cloth"}, {"itemId": 2589, "name": "Linen Cloth"}]"#,
    )
    .unwrap();
    fs::write(
        root.join("producers.json"),
        r#"{"producers": [
  {"kind": "Smelt", "name": "Smelt Copper", "output": {"itemId": 2840, "qty": 1}, "reagents": [{"itemId": 2770, "qty": 1}]},
  {"kind": "Vendor", "name": "ignored"}
]}"#,
    )
    .unwrap();
}

#[test]
fn export_addon_writes_lua_file() {
    let dir = tempfile::tempdir().unwrap();
    write_datapack(dir.path());
    let out = dir.path().join("addon").join("Data.lua");

    let output = frugalforge(&[
        "export-addon",
        "--data-dir",
        dir.path().to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
        "--global-name",
        "FrugalForgeData_Test",
        "--output",
        "json",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let lua = fs::read_to_string(&out).unwrap();
    assert!(lua.starts_with("FrugalForgeData_Test = {\n"));
    assert!(lua.contains("          learnedByTrainer = true,\n"));
    assert!(!lua.contains("cooldownSeconds"));
    assert!(lua.contains("    [2840] = {\n"));
    assert!(!lua.contains("ignored"));
    assert!(lua.find("[2589]").unwrap() < lua.find("[2996]").unwrap());

    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary[1]["Metric"], "Recipes");
    assert_eq!(summary[1]["Count"], 1);
}

#[test]
fn export_addon_fails_without_items() {
    let dir = tempfile::tempdir().unwrap();
    write_datapack(dir.path());
    fs::remove_file(dir.path().join("items.json")).unwrap();
    let out = dir.path().join("Data.lua");

    let output = frugalforge(&[
        "export-addon",
        "--data-dir",
        dir.path().to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn negative_request_delay_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let items = dir.path().join("items.json");
    fs::write(&items, "[]").unwrap();

    let output = frugalforge(&[
        "backfill-vendor-prices",
        "--items-json",
        items.to_str().unwrap(),
        "--cache-dir",
        dir.path().join("cache").to_str().unwrap(),
        "--request-delay-seconds=-1",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("non-negative"));
}

#[test]
fn oversized_request_delay_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let items = dir.path().join("items.json");
    fs::write(&items, "[]").unwrap();

    let output = frugalforge(&[
        "backfill-vendor-prices",
        "--items-json",
        items.to_str().unwrap(),
        "--cache-dir",
        dir.path().join("cache").to_str().unwrap(),
        "--request-delay-seconds",
        "1e30",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("non-negative"));
}

// ============================================================================
// Scraping commands against a mock server
// ============================================================================

mod scraping {
    use std::fs;
    use std::process::Output;

    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SKILL_LINE_CSV: &str = "ID,SkillLine,Spell\n100,197,2963\n";

    /// A valid tailoring page whose only reagent has no name anywhere on it.
    const UNNAMED_REAGENT_PAGE: &str = r#"<html><body>
<div>Requires Tailoring (1)</div>
<script>WH.Gatherer.addData(6, 5, {"2963":{"name_enus":"Bolt of Linen Cloth","rank_enus":""}});</script>
<script>WH.markup.printHtml("[ul][li]Difficulty: [color=r1]1[\/color] [color=r2]25[\/color] [color=r3]37[\/color] [color=r4]50[\/color][/li][/ul]");</script>
<h2 class="heading-size-3" id="icon-list-heading-reagents">Reagents</h2>
<table class="icon-list"><tr><td data-icon-list-quantity="2"><a href="/tbc/item=2589/linen-cloth">Linen Cloth</a></td></tr></table>
</body></html>"#;

    async fn run(server: &MockServer, args: &[&str]) -> Output {
        tokio::process::Command::new(env!("CARGO_BIN_EXE_frugalforge"))
            .args(args)
            .arg("--pages-base-url")
            .arg(server.uri())
            .arg("--db-base-url")
            .arg(server.uri())
            .env("RUST_LOG", "off")
            .output()
            .await
            .expect("binary runs")
    }

    #[tokio::test]
    async fn export_recipes_with_unnamed_reagent_writes_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/db2/SkillLineAbility/csv"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SKILL_LINE_CSV))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/tbc/spell=2963"))
            .respond_with(ResponseTemplate::new(200).set_body_string(UNNAMED_REAGENT_PAGE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let pack = dir.path().join("professions").join("tailoring.json");
        let items = dir.path().join("items.json");
        let items_before = r#"[{"itemId": 2996, "name": "Bolt of Linen Cloth"}]"#;
        fs::write(&items, items_before).unwrap();

        let output = run(
            &mock_server,
            &[
                "export-recipes",
                "--out-profession-json",
                pack.to_str().unwrap(),
                "--out-items-json",
                items.to_str().unwrap(),
                "--cache-dir",
                dir.path().join("cache").to_str().unwrap(),
                "--request-delay-seconds",
                "0",
            ],
        )
        .await;

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("2589"));
        assert!(!pack.exists());
        assert_eq!(fs::read_to_string(&items).unwrap(), items_before);
    }

    #[tokio::test]
    async fn backfill_fetch_failure_leaves_items_untouched() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tbc/item=2320"))
            .and(query_param("xml", ""))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let items = dir.path().join("items.json");
        let items_before = r#"[{"itemId": 2320, "name": "Coarse Thread", "vendorPriceCopper": -1}]"#;
        fs::write(&items, items_before).unwrap();

        let output = run(
            &mock_server,
            &[
                "backfill-vendor-prices",
                "--items-json",
                items.to_str().unwrap(),
                "--cache-dir",
                dir.path().join("cache").to_str().unwrap(),
            ],
        )
        .await;

        assert!(!output.status.success());
        assert_eq!(fs::read_to_string(&items).unwrap(), items_before);
    }
}
