// ChEMBL Paginated API Backend
//
// Walks the REST API with explicit limit/offset pages and flattens the
// responses into the backend-neutral tables. The API serves numbers as
// strings in several fields, so the page models keep loose types and
// coerce on extraction; a field that does not coerce is omitted, the row
// is kept.

use super::models::{ChemblActivity, ChemblIndication, ChemblMolecule, ChemblTables};
use super::API_PAGE_SIZE;
use crate::adapter::{HttpFetcher, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MoleculePage {
    #[serde(default)]
    page_meta: PageMeta,
    #[serde(default)]
    molecules: Vec<ApiMolecule>,
}

#[derive(Debug, Deserialize)]
struct ApiMolecule {
    molecule_chembl_id: String,
    #[serde(default)]
    pref_name: Option<String>,
    #[serde(default)]
    molecule_type: Option<String>,
    #[serde(default)]
    max_phase: Option<Value>,
    #[serde(default)]
    molecule_structures: Option<ApiStructures>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiStructures {
    #[serde(default)]
    canonical_smiles: Option<String>,
    #[serde(default)]
    standard_inchi_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TargetPage {
    #[serde(default)]
    page_meta: PageMeta,
    #[serde(default)]
    targets: Vec<ApiTarget>,
}

#[derive(Debug, Deserialize)]
struct ApiTarget {
    target_chembl_id: String,
    #[serde(default)]
    target_components: Vec<ApiTargetComponent>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiTargetComponent {
    #[serde(default)]
    accession: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ActivityPage {
    #[serde(default)]
    page_meta: PageMeta,
    #[serde(default)]
    activities: Vec<ApiActivity>,
}

#[derive(Debug, Deserialize)]
struct ApiActivity {
    #[serde(default)]
    molecule_chembl_id: Option<String>,
    #[serde(default)]
    target_chembl_id: Option<String>,
    #[serde(default)]
    standard_type: Option<String>,
    #[serde(default)]
    standard_value: Option<Value>,
    #[serde(default)]
    standard_units: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndicationPage {
    #[serde(default)]
    page_meta: PageMeta,
    #[serde(default)]
    drug_indications: Vec<ApiIndication>,
}

#[derive(Debug, Deserialize)]
struct ApiIndication {
    #[serde(default)]
    molecule_chembl_id: Option<String>,
    #[serde(default)]
    efo_id: Option<String>,
    #[serde(default)]
    max_phase_for_ind: Option<Value>,
}

/// Coerce an API number that may arrive as a JSON number or string
fn as_f64(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_phase(value: &Option<Value>) -> Option<i32> {
    as_f64(value).map(|v| v as i32)
}

/// Fetch every page of an endpoint, stopping early at the record cap when
/// one is set (test mode bounds the walk before truncation even applies)
async fn fetch_pages<P, T>(
    fetcher: &HttpFetcher,
    base_url: &str,
    endpoint: &str,
    record_cap: Option<usize>,
    extract: impl Fn(P) -> (Vec<T>, Option<String>),
) -> Result<Vec<T>>
where
    P: serde::de::DeserializeOwned,
{
    let mut collected = Vec::new();
    let mut offset = 0usize;

    loop {
        let url = format!(
            "{}/{}.json?limit={}&offset={}",
            base_url, endpoint, API_PAGE_SIZE, offset
        );
        let page: P = fetcher.get_json(&url).await?;
        let (items, next) = extract(page);

        let batch = items.len();
        collected.extend(items);
        offset += API_PAGE_SIZE;

        let capped = record_cap.is_some_and(|cap| collected.len() >= cap);
        if batch == 0 || next.is_none() || capped {
            break;
        }
    }

    info!("Fetched {} records from ChEMBL API {}", collected.len(), endpoint);
    Ok(collected)
}

/// Materialize all three tables from the paginated API
pub async fn fetch_tables(
    fetcher: &HttpFetcher,
    base_url: &str,
    record_cap: Option<usize>,
) -> Result<ChemblTables> {
    let molecules = fetch_pages(fetcher, base_url, "molecule", record_cap, |p: MoleculePage| {
        let items = p
            .molecules
            .into_iter()
            .map(|m| {
                let structures = m.molecule_structures.unwrap_or_default();
                ChemblMolecule {
                    chembl_id: m.molecule_chembl_id,
                    pref_name: m.pref_name.unwrap_or_default(),
                    molecule_type: m.molecule_type.unwrap_or_default(),
                    max_phase: as_phase(&m.max_phase),
                    canonical_smiles: structures.canonical_smiles.unwrap_or_default(),
                    standard_inchi_key: structures.standard_inchi_key.unwrap_or_default(),
                }
            })
            .collect();
        (items, p.page_meta.next)
    })
    .await?;

    let target_pairs = fetch_pages(fetcher, base_url, "target", record_cap, |p: TargetPage| {
        let items = p
            .targets
            .into_iter()
            .map(|t| {
                let accession = t
                    .target_components
                    .iter()
                    .find_map(|c| c.accession.clone())
                    .unwrap_or_default();
                (t.target_chembl_id, accession)
            })
            .collect();
        (items, p.page_meta.next)
    })
    .await?;

    let accession_by_target: HashMap<String, String> = target_pairs
        .into_iter()
        .filter(|(_, accession)| !accession.is_empty())
        .collect();

    let activities = fetch_pages(fetcher, base_url, "activity", record_cap, |p: ActivityPage| {
        let items = p
            .activities
            .into_iter()
            .filter_map(|a| {
                let molecule = a.molecule_chembl_id?;
                Some((molecule, a.target_chembl_id, a.standard_type, a.standard_value, a.standard_units))
            })
            .collect();
        (items, p.page_meta.next)
    })
    .await?
    .into_iter()
    .map(|(molecule, target, standard_type, value, units)| ChemblActivity {
        molecule_chembl_id: molecule,
        target_accession: target
            .and_then(|t| accession_by_target.get(&t).cloned())
            .unwrap_or_default(),
        standard_type: standard_type.unwrap_or_default(),
        standard_value: as_f64(&value),
        standard_units: units.unwrap_or_default(),
    })
    .collect();

    let indications = fetch_pages(
        fetcher,
        base_url,
        "drug_indication",
        record_cap,
        |p: IndicationPage| {
            let items = p
                .drug_indications
                .into_iter()
                .filter_map(|i| {
                    let molecule = i.molecule_chembl_id?;
                    Some(ChemblIndication {
                        molecule_chembl_id: molecule,
                        efo_id: i.efo_id.unwrap_or_default(),
                        max_phase_for_ind: as_phase(&i.max_phase_for_ind),
                    })
                })
                .collect();
            (items, p.page_meta.next)
        },
    )
    .await?;

    Ok(ChemblTables {
        molecules,
        activities,
        indications,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_f64_coerces_strings_and_numbers() {
        assert_eq!(as_f64(&Some(Value::from(4.0))), Some(4.0));
        assert_eq!(as_f64(&Some(Value::String("4.0".to_string()))), Some(4.0));
        assert_eq!(as_f64(&Some(Value::String("n/a".to_string()))), None);
        assert_eq!(as_f64(&None), None);
    }

    #[tokio::test]
    async fn test_fetch_tables_from_mock_api() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/molecule.json"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page_meta":{"next":null},"molecules":[
                    {"molecule_chembl_id":"CHEMBL25","pref_name":"ASPIRIN","molecule_type":"Small molecule","max_phase":"4.0",
                     "molecule_structures":{"canonical_smiles":"CC(=O)Oc1ccccc1C(=O)O","standard_inchi_key":"BSYNRYMUTXBXSQ-UHFFFAOYSA-N"}}]}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/target.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page_meta":{"next":null},"targets":[
                    {"target_chembl_id":"CHEMBL301","target_components":[{"accession":"P24941"}]}]}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/activity.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page_meta":{"next":null},"activities":[
                    {"molecule_chembl_id":"CHEMBL25","target_chembl_id":"CHEMBL301","standard_type":"IC50","standard_value":"12000","standard_units":"nM"}]}"#,
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/drug_indication.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page_meta":{"next":null},"drug_indications":[
                    {"molecule_chembl_id":"CHEMBL25","efo_id":"EFO:0003843","max_phase_for_ind":4}]}"#,
            ))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(dir.path(), 30, 1).unwrap();
        let tables = fetch_tables(&fetcher, &server.uri(), None).await.unwrap();

        assert_eq!(tables.molecules.len(), 1);
        assert_eq!(tables.molecules[0].chembl_id, "CHEMBL25");
        assert_eq!(tables.molecules[0].max_phase, Some(4));

        assert_eq!(tables.activities.len(), 1);
        // Target id was joined to its protein accession
        assert_eq!(tables.activities[0].target_accession, "P24941");
        assert_eq!(tables.activities[0].standard_value, Some(12000.0));

        assert_eq!(tables.indications.len(), 1);
        assert_eq!(tables.indications[0].efo_id, "EFO:0003843");
    }

    #[tokio::test]
    async fn test_api_error_propagates() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpFetcher::new(dir.path(), 30, 1).unwrap();
        let result = fetch_tables(&fetcher, &server.uri(), None).await;
        assert!(result.is_err());
    }
}
