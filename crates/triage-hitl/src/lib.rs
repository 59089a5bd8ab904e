use triage_core::{BulkScope, Finding, PendingBulk};

/// Reviewer's answer to a bulk prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulkAnswer {
    Apply(BulkScope),
    Cancel,
}

/// Markdown ASK packet for a pending bulk edit.
pub fn format_bulk_prompt(pending: &PendingBulk, finding: &Finding) -> String {
    let mut s = String::new();
    s.push_str(&format!("# ASK: {}\n\n", pending.target.as_str()));
    s.push_str(&format!(
        "**Decision needed:** {} ({}) is being marked {}. {} other open finding(s) share `{}`.\n\n",
        finding.code,
        finding.label,
        pending.status.label(),
        pending.similar_count(),
        pending.bulk_key.as_str()
    ));
    if !finding.omschrijving.is_empty() {
        s.push_str(&format!("> {}\n\n", finding.omschrijving));
    }
    s.push_str("## Options\n");
    s.push_str("- [1] Only this finding\n");
    s.push_str(&format!("- [2] This finding and all {} similar open findings\n", pending.similar_count()));
    s.push_str(&format!("- [3] Cancel (keep {})\n", pending.previous.label()));
    s.push('\n');
    s.push_str("**Recommended:** 2\n");
    s
}

/// Empty input cancels; anything unrecognised is `None` so the caller can ask again.
pub fn parse_bulk_answer(input: &str) -> Option<BulkAnswer> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "deze" | "this" | "only" => Some(BulkAnswer::Apply(BulkScope::ThisOnly)),
        "2" | "alle" | "all" => Some(BulkAnswer::Apply(BulkScope::AllSimilar)),
        "" | "3" | "annuleer" | "cancel" | "c" => Some(BulkAnswer::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{BulkKey, FindingId, Status};

    fn pending() -> PendingBulk {
        PendingBulk {
            target: FindingId::from_str("DL1:AN:E1-002:CODE:0"),
            bulk_key: BulkKey::from_str("E1-002:CODE"),
            previous: Status::Open,
            status: Status::Genegeerd,
            similar: vec![FindingId::from_str("DL2:AN:E1-002:CODE:1"), FindingId::from_str("DL3:AN:E1-002:CODE:2")],
        }
    }

    #[test]
    fn prompt_names_count_and_options() {
        let f = Finding {
            code: "E1-002".into(),
            label: "AN_CODE".into(),
            omschrijving: "Ongeldige code".into(),
            ..Default::default()
        };
        let out = format_bulk_prompt(&pending(), &f);
        assert!(out.starts_with("# ASK: DL1:AN:E1-002:CODE:0\n\n"));
        assert!(out.contains("2 other open finding(s) share `E1-002:CODE`"));
        assert!(out.contains("> Ongeldige code\n"));
        assert!(out.contains("- [2] This finding and all 2 similar open findings\n"));
        assert!(out.ends_with("**Recommended:** 2\n"));
    }

    #[test]
    fn answers() {
        assert_eq!(parse_bulk_answer("1"), Some(BulkAnswer::Apply(BulkScope::ThisOnly)));
        assert_eq!(parse_bulk_answer(" Alle "), Some(BulkAnswer::Apply(BulkScope::AllSimilar)));
        assert_eq!(parse_bulk_answer(""), Some(BulkAnswer::Cancel));
        assert_eq!(parse_bulk_answer("misschien"), None);
    }
}
