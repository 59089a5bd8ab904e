use crate::{BulkKey, Finding, FindingId};

/// Field name without its owning-entity prefix: `AN_CODE` -> `CODE`.
/// A label without an underscore is its own suffix.
pub fn label_suffix(label: &str) -> &str {
    match label.split_once('_') {
        Some((_, rest)) => rest,
        None => label,
    }
}

/// `contract:entiteit:code:labelSuffix:index`
///
/// The index is the finding's position in the report's findings array, so two
/// otherwise identical findings stay distinct. Ids are positional: reordering
/// the array invalidates stored ids.
pub fn derive_finding_id(finding: &Finding, index: usize) -> FindingId {
    FindingId::from_str(format!(
        "{}:{}:{}:{}:{}",
        finding.contract,
        finding.entiteit,
        finding.code,
        label_suffix(&finding.label),
        index
    ))
}

/// `code:labelSuffix`, shared by the same defect across contracts.
pub fn derive_bulk_key(finding: &Finding) -> BulkKey {
    BulkKey::from_str(format!("{}:{}", finding.code, label_suffix(&finding.label)))
}

/// `code|labelSuffix|omschrijving`, the grouping equivalence key.
pub fn derive_group_key(finding: &Finding) -> String {
    format!("{}|{}|{}", finding.code, label_suffix(&finding.label), finding.omschrijving)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(contract: &str, label: &str) -> Finding {
        Finding {
            contract: contract.into(),
            entiteit: "AN".into(),
            code: "E1-002".into(),
            label: label.into(),
            omschrijving: "Ongeldige dekkingscode".into(),
            ..Default::default()
        }
    }

    #[test]
    fn suffix_strips_first_token_only() {
        assert_eq!(label_suffix("AN_CODE"), "CODE");
        assert_eq!(label_suffix("PP_BTP_X"), "BTP_X");
        assert_eq!(label_suffix("VOLGNUM"), "VOLGNUM");
        assert_eq!(label_suffix(""), "");
    }

    #[test]
    fn finding_id_layout() {
        let f = finding("DL252168", "AN_CODE");
        assert_eq!(derive_finding_id(&f, 7).as_str(), "DL252168:AN:E1-002:CODE:7");
    }

    #[test]
    fn empty_fields_keep_ids_well_formed() {
        let id = derive_finding_id(&Finding::default(), 0);
        assert_eq!(id.as_str(), "::::0");
        assert_eq!(derive_bulk_key(&Finding::default()).as_str(), ":");
    }

    #[test]
    fn index_separates_identical_findings() {
        let f = finding("DL1", "AN_CODE");
        assert_ne!(derive_finding_id(&f, 0), derive_finding_id(&f, 1));
    }

    #[test]
    fn bulk_key_ignores_contract_and_prefix() {
        let a = finding("DL1", "AN_CODE");
        let b = finding("DL2", "DA_CODE");
        assert_eq!(derive_bulk_key(&a), derive_bulk_key(&b));
        assert_eq!(derive_bulk_key(&a).as_str(), "E1-002:CODE");
    }

    #[test]
    fn group_key_includes_description() {
        let a = finding("DL1", "AN_CODE");
        let mut b = finding("DL2", "AN_CODE");
        assert_eq!(derive_group_key(&a), derive_group_key(&b));
        b.omschrijving = "Andere tekst".into();
        assert_ne!(derive_group_key(&a), derive_group_key(&b));
    }
}
