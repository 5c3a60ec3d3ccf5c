use serde::Deserialize;

/// An inspection team and the jurisdictions it is responsible for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Ward ids managed by the team, in the order the host supplies them.
    pub managed_jurisdictions: Vec<String>,
    /// Member names, shown in the on-hover roster summary.
    pub roster: Vec<String>,
}
