//! Keyword filters that select a dataset's files among discovery resources.
//!
//! A data.gouv.fr dataset page exposes many resources: historical snapshots,
//! documentation, alternate formats. Each variant here keeps only the
//! extractions one dataset actually loads. All matching is case-insensitive
//! substring testing over the resource's title, URL, and declared format.

use super::RemoteResource;

/// Filter strategy for discovery resources, one variant per discovery dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceFilter {
    /// Main RPPS extraction TXT files: `libreacces` plus one of the
    /// per-extraction keywords.
    RegistryExtract,
    /// Open Medic complete expenditure base CSVs.
    PrescriptionBase,
    /// Main FINESS establishment CSV extractions.
    EstablishmentExtract,
    /// Commune, departement, and region CSVs from the INSEE COG.
    GeographicCodes,
}

impl ResourceFilter {
    /// Returns true when the resource belongs to this filter's dataset.
    #[must_use]
    pub fn matches(self, resource: &RemoteResource) -> bool {
        let title = resource.title.to_lowercase();
        let url = resource.url.to_lowercase();
        let format = resource.format.to_lowercase();
        let haystack = format!("{title}{url}");

        match self {
            Self::RegistryExtract => {
                url.ends_with(".txt")
                    && haystack.contains("libreacces")
                    && ["personne", "savoirfaire", "dipl"]
                        .iter()
                        .any(|kw| haystack.contains(kw))
            }
            Self::PrescriptionBase => {
                (title.contains("open_medic") || url.contains("open_medic"))
                    && (format.contains("csv") || url.ends_with(".csv"))
            }
            Self::EstablishmentExtract => {
                format == "csv"
                    && (title.contains("etalab")
                        || title.contains("stock")
                        || url.contains("finess"))
            }
            Self::GeographicCodes => {
                format == "csv"
                    && ["v_commune", "v_departement", "v_region", "v_pays"]
                        .iter()
                        .any(|kw| haystack.contains(kw))
            }
        }
    }
}
