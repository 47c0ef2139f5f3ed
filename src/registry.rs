//! Dataset registry: the static catalogue of configured open-data sources.
//!
//! Each descriptor records where a dataset's files come from (data.gouv.fr
//! discovery or static direct URLs), how the raw files are encoded, and
//! which discovery resources belong to it. The registry is the single source
//! of truth consumed by the [`crate::pipeline`] orchestrator.

use thiserror::Error;

use crate::resolver::ResourceFilter;

/// Name of the dataset that has no bulk-downloadable source.
///
/// data.ansm is a visualization platform; the orchestrator short-circuits it
/// to a placeholder artifact instead of running discovery.
pub const STUB_DATASET: &str = "ansm";

/// Base URL for BDPM direct downloads. The filename goes in the query string.
pub const BDPM_BASE_URL: &str =
    "https://base-donnees-publique.medicaments.gouv.fr/telechargement.php?fichier=";

/// The eight BDPM extraction files served behind `telechargement.php`.
pub const BDPM_FILES: [&str; 8] = [
    "CIS_bdpm.txt",
    "CIS_CIP_bdpm.txt",
    "CIS_COMPO_bdpm.txt",
    "CIS_HAS_SMR_bdpm.txt",
    "CIS_HAS_ASMR_bdpm.txt",
    "CIS_GENER_bdpm.txt",
    "CIS_CPD_bdpm.txt",
    "HAS_LiensPageCT_bdpm.txt",
];

/// Errors for malformed dataset descriptors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An API-discovery descriptor is missing its discovery identifier.
    #[error("dataset {name} uses API discovery but has no dataset id")]
    MissingDatasetId {
        /// Name of the offending dataset.
        name: String,
    },

    /// An API-discovery descriptor is missing its resource filter.
    #[error("dataset {name} uses API discovery but has no resource filter")]
    MissingFilter {
        /// Name of the offending dataset.
        name: String,
    },

    /// A direct-URL descriptor (other than the stub) has an empty URL list.
    #[error("dataset {name} uses direct URLs but its URL list is empty")]
    MissingUrls {
        /// Name of the offending dataset.
        name: String,
    },
}

/// How a dataset's files are located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Resource URLs are discovered through the data.gouv.fr dataset API.
    ApiDiscovery,
    /// Resource URLs are configured statically.
    DirectUrl,
}

/// Configuration for a single open-data source.
#[derive(Debug, Clone)]
pub struct DatasetDescriptor {
    /// Short identifier, also the dataset's storage directory name.
    pub name: &'static str,
    /// Human description shown in listings.
    pub description: &'static str,
    /// Where the dataset's files come from.
    pub kind: SourceKind,
    /// Text encoding of the raw files (recorded for downstream loaders).
    pub encoding: &'static str,
    /// Field separator of the raw files (recorded for downstream loaders).
    pub separator: &'static str,
    /// File format tag: "csv", "txt", "xlsx", "zip".
    pub file_format: &'static str,
    /// data.gouv.fr dataset slug, for [`SourceKind::ApiDiscovery`].
    pub dataset_id: Option<&'static str>,
    /// Static URL list, for [`SourceKind::DirectUrl`].
    pub direct_urls: Vec<String>,
    /// Selects the dataset's files among discovery resources.
    pub filter: Option<ResourceFilter>,
    /// Free-text operator notes.
    pub notes: &'static str,
}

impl DatasetDescriptor {
    /// Returns true for the designated stub dataset.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.name == STUB_DATASET
    }

    /// Checks the source-kind invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an API-discovery descriptor lacks a dataset
    /// id or filter, or a non-stub direct-URL descriptor has no URLs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.kind {
            SourceKind::ApiDiscovery => {
                if self.dataset_id.is_none_or(str::is_empty) {
                    return Err(ConfigError::MissingDatasetId {
                        name: self.name.to_string(),
                    });
                }
                if self.filter.is_none() {
                    return Err(ConfigError::MissingFilter {
                        name: self.name.to_string(),
                    });
                }
            }
            SourceKind::DirectUrl => {
                if !self.is_stub() && self.direct_urls.is_empty() {
                    return Err(ConfigError::MissingUrls {
                        name: self.name.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Builds the full registry of configured datasets.
#[must_use]
pub fn builtin_datasets() -> Vec<DatasetDescriptor> {
    vec![
        DatasetDescriptor {
            name: "rpps",
            description: "RPPS / Annuaire Santé - national registry of health professionals",
            kind: SourceKind::ApiDiscovery,
            encoding: "utf-8",
            separator: "|",
            file_format: "txt",
            dataset_id: Some(
                "annuaire-sante-extractions-des-donnees-en-libre-acces-des-professionnels-intervenant-dans-le-systeme-de-sante-rpps",
            ),
            direct_urls: Vec::new(),
            filter: Some(ResourceFilter::RegistryExtract),
            notes: "Main file ~800MB. Pipe-delimited.",
        },
        DatasetDescriptor {
            name: "open_medic",
            description: "Open Medic - prescription expenditure data (2014-2024)",
            kind: SourceKind::ApiDiscovery,
            encoding: "latin-1",
            separator: ";",
            file_format: "csv",
            dataset_id: Some("open-medic-base-complete-sur-les-depenses-de-medicaments-interregimes"),
            direct_urls: Vec::new(),
            filter: Some(ResourceFilter::PrescriptionBase),
            notes: "Latin-1 encoding, semicolon-delimited. One CSV per year.",
        },
        DatasetDescriptor {
            name: "finess",
            description: "FINESS - healthcare establishment registry",
            kind: SourceKind::ApiDiscovery,
            encoding: "utf-8",
            separator: ";",
            file_format: "csv",
            dataset_id: Some("finess-extraction-du-fichier-des-etablissements"),
            direct_urls: Vec::new(),
            filter: Some(ResourceFilter::EstablishmentExtract),
            notes: "Includes geolocated and standard establishment files.",
        },
        DatasetDescriptor {
            name: "insee_cog",
            description: "INSEE COG - official geographic codes (communes, departments, regions)",
            kind: SourceKind::ApiDiscovery,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: Some("code-officiel-geographique-cog"),
            direct_urls: Vec::new(),
            filter: Some(ResourceFilter::GeographicCodes),
            notes: "Comma-separated UTF-8. Files hosted on insee.fr.",
        },
        DatasetDescriptor {
            name: "transparence_sante",
            description: "Transparence Santé - pharma-to-HCP payments (EurosForDocs cleaned)",
            kind: SourceKind::DirectUrl,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: None,
            direct_urls: vec!["https://www.eurosfordocs.fr/download/ts_declaration.csv".to_string()],
            filter: None,
            notes: "EurosForDocs cleaned version. ~500MB+. Handles deduplication and RPPS matching.",
        },
        DatasetDescriptor {
            name: "bdpm",
            description: "BDPM - public drug database (specialties, compositions, SMR/ASMR)",
            kind: SourceKind::DirectUrl,
            encoding: "utf-8",
            separator: "\t",
            file_format: "txt",
            dataset_id: None,
            direct_urls: BDPM_FILES
                .iter()
                .map(|file| format!("{BDPM_BASE_URL}{file}"))
                .collect(),
            filter: None,
            notes: "Tab-separated. 8 small files (1-4MB each).",
        },
        DatasetDescriptor {
            name: STUB_DATASET,
            description: "data.ansm - pharmacovigilance (stub: visualization platform only)",
            kind: SourceKind::DirectUrl,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: None,
            direct_urls: Vec::new(),
            filter: None,
            notes: "Visualization platform only. No bulk download available. Stub for future sprint.",
        },
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_all_datasets_registered() {
        let names: Vec<&str> = builtin_datasets().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "rpps",
                "open_medic",
                "finess",
                "insee_cog",
                "transparence_sante",
                "bdpm",
                "ansm"
            ]
        );
    }

    #[test]
    fn test_all_descriptors_validate() {
        for descriptor in builtin_datasets() {
            descriptor.validate().unwrap();
            assert!(!descriptor.description.is_empty());
            assert!(matches!(descriptor.encoding, "utf-8" | "latin-1"));
        }
    }

    #[test]
    fn test_discovery_datasets_have_id_and_filter() {
        for descriptor in builtin_datasets() {
            if descriptor.kind == SourceKind::ApiDiscovery {
                assert!(
                    descriptor.dataset_id.is_some_and(|id| !id.is_empty()),
                    "{} is ApiDiscovery but has no dataset_id",
                    descriptor.name
                );
                assert!(
                    descriptor.filter.is_some(),
                    "{} needs a resource filter",
                    descriptor.name
                );
            }
        }
    }

    #[test]
    fn test_direct_url_datasets_have_urls() {
        for descriptor in builtin_datasets() {
            if descriptor.kind == SourceKind::DirectUrl && !descriptor.is_stub() {
                assert!(
                    !descriptor.direct_urls.is_empty(),
                    "{} has no direct_urls",
                    descriptor.name
                );
            }
        }
    }

    #[test]
    fn test_bdpm_has_all_files() {
        let datasets = builtin_datasets();
        let bdpm = datasets.iter().find(|d| d.name == "bdpm").unwrap();
        assert_eq!(bdpm.direct_urls.len(), BDPM_FILES.len());
        for url in &bdpm.direct_urls {
            assert!(url.contains("fichier="), "expected fichier= in {url}");
        }
    }

    #[test]
    fn test_open_medic_encoding() {
        let datasets = builtin_datasets();
        let open_medic = datasets.iter().find(|d| d.name == "open_medic").unwrap();
        assert_eq!(open_medic.encoding, "latin-1");
        assert_eq!(open_medic.separator, ";");
    }

    #[test]
    fn test_validate_rejects_discovery_without_id() {
        let descriptor = DatasetDescriptor {
            name: "broken",
            description: "broken",
            kind: SourceKind::ApiDiscovery,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: None,
            direct_urls: Vec::new(),
            filter: Some(ResourceFilter::GeographicCodes),
            notes: "",
        };
        assert!(matches!(
            descriptor.validate(),
            Err(ConfigError::MissingDatasetId { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_discovery_without_filter() {
        let descriptor = DatasetDescriptor {
            name: "broken",
            description: "broken",
            kind: SourceKind::ApiDiscovery,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: Some("some-slug"),
            direct_urls: Vec::new(),
            filter: None,
            notes: "",
        };
        assert!(matches!(
            descriptor.validate(),
            Err(ConfigError::MissingFilter { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_direct_url_without_urls() {
        let descriptor = DatasetDescriptor {
            name: "broken",
            description: "broken",
            kind: SourceKind::DirectUrl,
            encoding: "utf-8",
            separator: ",",
            file_format: "csv",
            dataset_id: None,
            direct_urls: Vec::new(),
            filter: None,
            notes: "",
        };
        assert!(matches!(
            descriptor.validate(),
            Err(ConfigError::MissingUrls { .. })
        ));
    }

    #[test]
    fn test_stub_dataset_validates_with_empty_urls() {
        let datasets = builtin_datasets();
        let stub = datasets.iter().find(|d| d.is_stub()).unwrap();
        assert!(stub.direct_urls.is_empty());
        stub.validate().unwrap();
    }
}
