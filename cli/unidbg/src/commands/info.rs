//! `unidbg info`: list the printer catalog.

use anyhow::{bail, Result};
use serde::Serialize;
use unidbg_core::ProcessImage;
use unidbg_registry::Session;

/// One catalog row.
#[derive(Debug, Clone, Serialize)]
pub struct PrinterInfo {
    pub category: String,
    pub name: String,
    pub match_kind: String,
    pub pattern: String,
    pub versions: String,
    pub enabled: bool,
    /// Whether the range covers the session's library version.
    pub applies: bool,
}

/// The full report.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub library_version: Option<String>,
    pub printers: Vec<PrinterInfo>,
}

/// Collect the catalog of a session.
pub fn report(session: &Session<ProcessImage>) -> InfoReport {
    let version = session.version();
    let printers = session
        .registry()
        .catalog()
        .map(|entry| PrinterInfo {
            category: entry.category.to_string(),
            name: entry.name.to_string(),
            match_kind: entry.match_kind.name().to_string(),
            pattern: entry.pattern.to_string(),
            versions: entry.versions.to_string(),
            enabled: entry.enabled,
            applies: version.is_some_and(|v| entry.versions.contains(v)),
        })
        .collect();
    InfoReport {
        library_version: version.map(ToString::to_string),
        printers,
    }
}

/// Render the report as plain text.
pub fn to_text(report: &InfoReport) -> String {
    let mut out = format!(
        "library version: {}\n",
        report.library_version.as_deref().unwrap_or("unknown")
    );
    for p in &report.printers {
        let state = match (p.enabled, p.applies) {
            (false, _) => "disabled",
            (true, false) => "inactive",
            (true, true) => "active",
        };
        out.push_str(&format!(
            "  {:<9} {};{:<22} {:<6} {:<24} {}\n",
            state, p.category, p.name, p.match_kind, p.pattern, p.versions
        ));
    }
    out
}

/// Print the catalog in `format` (text or json).
pub fn run(session: &Session<ProcessImage>, format: &str) -> Result<()> {
    let report = report(session);
    match format {
        "text" => print!("{}", to_text(&report)),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => bail!("unknown format '{other}' (expected text or json)"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{fixtures, open_session, Toggles};
    use crate::config::Config;

    fn session(toggles: &Toggles, config: &Config) -> Session<ProcessImage> {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = fixtures::write_snapshot(dir.path());
        open_session(&snapshot, config, toggles).unwrap()
    }

    #[test]
    fn report_lists_catalog_with_state() {
        let toggles = Toggles {
            enable: Vec::new(),
            disable: vec!["unitex;UnitexString".to_string()],
        };
        let report = report(&session(&toggles, &Config::default()));
        assert_eq!(report.library_version.as_deref(), Some("3.3.0"));

        let ustring = report.printers.iter().find(|p| p.name == "Ustring").unwrap();
        assert!(ustring.enabled && ustring.applies);
        assert_eq!(ustring.match_kind, "exact");
        assert_eq!(ustring.versions, "3.1.0..=3.99.99");

        let wrapper = report.printers.iter().find(|p| p.name == "UnitexString").unwrap();
        assert!(!wrapper.enabled);

        let list = report
            .printers
            .iter()
            .find(|p| p.name == "unitex::list_int")
            .unwrap();
        assert_eq!(list.versions, "*");
    }

    #[test]
    fn out_of_range_version_marks_printers_inactive() {
        let config = Config::from_str("[printers]\nversion_override = \"4.2.0\"").unwrap();
        let report = report(&session(&Toggles::default(), &config));
        let ustring = report.printers.iter().find(|p| p.name == "Ustring").unwrap();
        assert!(ustring.enabled && !ustring.applies);
        assert!(to_text(&report).contains("inactive"));
    }

    #[test]
    fn json_report_shape() {
        let report = report(&session(&Toggles::default(), &Config::default()));
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["library_version"], "3.3.0");
        assert_eq!(json["printers"][0]["name"], "Ustring");
        assert_eq!(json["printers"][0]["enabled"], true);
    }

    #[test]
    fn unknown_format_is_rejected() {
        let session = session(&Toggles::default(), &Config::default());
        assert!(run(&session, "yaml").is_err());
    }
}
