use tfprobe_domain::TestIdentity;
use tfprobe_harness::ScenarioReport;

/// Render a report as JSON.
pub fn render_report_json(report: &ScenarioReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

/// Render an identity as `key: value` lines.
pub fn render_identity(identity: &TestIdentity) -> String {
    format!(
        "project: {}\nregion:  {}\nname:    {}\n",
        identity.project_id, identity.region_id, identity.test_name
    )
}
