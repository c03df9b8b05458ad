use predicates::str::contains;

mod common;
use common::TestEnv;

#[test]
fn run_derives_reports_from_artifacts_without_network() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&["v11.2.0", "v11.1.5", "v11.1.4"]);

    env.cmd()
        .arg("run")
        .assert()
        .success()
        .stdout(contains("Grafana Bug Report"))
        .stdout(contains("- Total Bugs Scanned: 6"));

    for name in [
        "open_report.md",
        "closed_report.md",
        "all_report.md",
        "stats_by_version.csv",
        "stats_by_major_minor_version.csv",
        "release_stats.csv",
        "major_minor_release_stats.csv",
        "stats.txt",
    ] {
        assert!(
            env.reports.join(name).exists(),
            "missing report output {name}"
        );
    }
}

#[test]
fn all_report_orders_versions_and_state_runs() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&[]);

    env.cmd().arg("run").assert().success();
    let md = env.report("all_report.md");

    let v112 = md.find("## 11.2.0").expect("11.2.0 heading");
    let v110 = md.find("## 11.0.0").expect("11.0.0 heading");
    let none = md.find("## No Version").expect("No Version heading");
    assert!(v112 < v110 && v110 < none, "versions must render descending");
    assert_eq!(md.matches("## 11.0.0").count(), 1);

    // under 11.0.0: the OPEN run precedes the CLOSED run, one bullet each
    let section = &md[v110..none];
    let open_at = section.find("### OPEN").expect("open sub-heading");
    let closed_at = section.find("### CLOSED").expect("closed sub-heading");
    assert!(open_at < closed_at);
    assert!(section.contains(
        "- [Dashboard wont save](https://github.com/grafana/grafana/issues/4)\n"
    ));
    assert!(section.contains(
        "- [Broken panel legend](https://github.com/grafana/grafana/issues/3) (Fixed in 11.1.0)\n"
    ));

    // within 11.2.0 titles sort ascending
    let s112 = &md[v112..v110];
    let alert = s112.find("Alert list flickers").expect("first title");
    let stuck = s112.find("Stuck query editor").expect("second title");
    assert!(alert < stuck);

    // the line-only issue never shows up as a bullet
    assert!(!md.contains("Screenshot only"));
}

#[test]
fn open_report_filters_closed_and_omits_sub_headings() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&[]);

    env.cmd().arg("run").assert().success();
    let md = env.report("open_report.md");

    assert!(md.contains("## 11.0.0"));
    assert!(md.contains("Dashboard wont save"));
    assert!(!md.contains("Broken panel legend"));
    assert!(!md.contains("### OPEN"));
    assert!(!md.contains("### CLOSED"));
    // "No Version" holds only a closed issue, so its heading is suppressed
    assert!(!md.contains("## No Version"));
}

#[test]
fn closed_report_keeps_fixed_in_suffix() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&[]);

    env.cmd().arg("run").assert().success();
    let md = env.report("closed_report.md");

    assert!(md.contains(
        "- [Broken panel legend](https://github.com/grafana/grafana/issues/3) (Fixed in 11.1.0)\n"
    ));
    assert!(md.contains("- [Mystery crash](https://github.com/grafana/grafana/issues/5)\n"));
    assert!(!md.contains("Dashboard wont save"));
}

#[test]
fn stats_csvs_roll_patch_buckets_up() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&[]);

    env.cmd().arg("run").assert().success();

    let by_version = env.report("stats_by_version.csv");
    assert_eq!(
        by_version,
        "Version, Total, Open, Closed\n\
         11.2.0, 2, 2, 0\n\
         11.0.0, 2, 1, 1\n\
         No Version, 1, 0, 1\n"
    );

    let by_major_minor = env.report("stats_by_major_minor_version.csv");
    assert_eq!(
        by_major_minor,
        "Version, Total, Open, Closed\n\
         11.2, 2, 2, 0\n\
         11.0, 2, 1, 1\n\
         No Version, 1, 0, 1\n"
    );
}

#[test]
fn release_stats_cover_every_known_tag() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&["v11.1.4", "v11.2.0", "v11.1.5"]);

    env.cmd().arg("run").assert().success();

    let releases = env.report("release_stats.csv");
    assert_eq!(
        releases,
        "Version, Total, Open, Closed, Commits\n\
         11.2.0, 2, 2, 0, 0\n\
         11.1.5, 0, 0, 0, 0\n\
         11.1.4, 0, 0, 0, 0\n"
    );

    let rolled = env.report("major_minor_release_stats.csv");
    assert_eq!(
        rolled,
        "Version, Total, Open, Closed, Commits\n\
         11.2, 2, 2, 0, 0\n\
         11.1, 0, 0, 0, 0\n"
    );
}

#[test]
fn rerunning_from_the_same_artifacts_is_byte_identical() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&["v11.2.0", "v11.1.5"]);

    env.cmd().arg("run").assert().success();
    let first: Vec<String> = REPORT_FILES.iter().map(|n| env.report(n)).collect();

    env.cmd().arg("run").assert().success();
    let second: Vec<String> = REPORT_FILES.iter().map(|n| env.report(n)).collect();

    assert_eq!(first, second);
}

const REPORT_FILES: [&str; 8] = [
    "open_report.md",
    "closed_report.md",
    "all_report.md",
    "stats_by_version.csv",
    "stats_by_major_minor_version.csv",
    "release_stats.csv",
    "major_minor_release_stats.csv",
    "stats.txt",
];

#[test]
fn run_without_artifacts_fails_fast() {
    let env = TestEnv::new();
    env.cmd()
        .arg("run")
        .assert()
        .failure()
        .stderr(contains("missing artifact"));
}

#[test]
fn stats_json_reports_all_counters() {
    let env = TestEnv::new();
    env.seed_issue_artifacts();
    env.seed_tags(&[]);
    env.cmd().arg("run").assert().success();

    let value = env.run_json(&["stats"]);
    assert_eq!(value["ok"], true);
    assert_eq!(value["data"]["scanned"], 6);
    assert_eq!(value["data"]["open"], 4);
    assert_eq!(value["data"]["closed"], 2);
    assert_eq!(value["data"]["with_version"], 4);
    assert_eq!(value["data"]["open_with_version"], 3);
    assert_eq!(value["data"]["line_only"], 1);
}

#[test]
fn tags_listing_serves_cache_most_recent_first() {
    let env = TestEnv::new();
    env.seed_tags(&["v11.1.5", "v11.2.0", "v11.1.10"]);

    env.cmd()
        .arg("tags")
        .assert()
        .success()
        .stdout(contains("v11.2.0\nv11.1.10\nv11.1.5\n"));
}
