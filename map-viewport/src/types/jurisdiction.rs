/// The administrative selection supplied by the host. Each level is settable
/// independently; any of them may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JurisdictionSelection {
    pub province_id: Option<String>,
    pub district_id: Option<String>,
    pub ward_id: Option<String>,
}
