// UniProt Export Models

use serde::{Deserialize, Serialize};

/// One row of the UniProtKB TSV stream export.
///
/// All columns are kept as the raw strings UniProt serves; typed accessors
/// parse on demand and a malformed value simply omits that property rather
/// than dropping the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniprotRecord {
    #[serde(rename = "Entry")]
    pub accession: String,

    #[serde(rename = "Protein names", default)]
    pub protein_name: String,

    #[serde(rename = "Length", default)]
    pub length: String,

    #[serde(rename = "Mass", default)]
    pub mass: String,

    #[serde(rename = "Organism (ID)", default)]
    pub organism_id: String,

    #[serde(rename = "Organism", default)]
    pub organism_name: String,

    #[serde(rename = "Gene Names (primary)", default)]
    pub gene_primary: String,

    /// Semicolon-delimited Ensembl transcript xrefs, e.g.
    /// `ENST00000269305.9 [P04637-1];ENST00000413465.6`
    #[serde(rename = "Ensembl", default)]
    pub xref_ensembl: String,

    /// Semicolon-delimited Entrez Gene xrefs, e.g. `7157;`
    #[serde(rename = "GeneID", default)]
    pub xref_geneid: String,

    /// Semicolon-delimited STRING xrefs, e.g. `9606.ENSP00000269305;`
    #[serde(rename = "STRING", default)]
    pub xref_string: String,
}

impl UniprotRecord {
    /// Sequence length; UniProt serves plain integers here
    pub fn length_value(&self) -> Option<i64> {
        parse_grouped_int(&self.length)
    }

    /// Molecular mass in daltons; UniProt groups digits with commas
    pub fn mass_daltons(&self) -> Option<i64> {
        parse_grouped_int(&self.mass)
    }

    /// First semicolon-delimited Entrez Gene id; a present-but-empty
    /// column means the entry is unmapped
    pub fn entrez_gene_id(&self) -> Option<&str> {
        self.xref_geneid
            .split(';')
            .map(str::trim)
            .find(|part| !part.is_empty())
    }
}

/// Parse an integer that may use comma digit grouping
fn parse_grouped_int(value: &str) -> Option<i64> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mass_with_digit_grouping() {
        let record = UniprotRecord {
            mass: "43,653".to_string(),
            ..Default::default()
        };
        assert_eq!(record.mass_daltons(), Some(43653));
    }

    #[test]
    fn test_malformed_numeric_is_none() {
        let record = UniprotRecord {
            length: "n/a".to_string(),
            mass: String::new(),
            ..Default::default()
        };
        assert_eq!(record.length_value(), None);
        assert_eq!(record.mass_daltons(), None);
    }

    #[test]
    fn test_entrez_gene_id_first_value() {
        let record = UniprotRecord {
            xref_geneid: "7157;".to_string(),
            ..Default::default()
        };
        assert_eq!(record.entrez_gene_id(), Some("7157"));

        let unmapped = UniprotRecord {
            xref_geneid: ";".to_string(),
            ..Default::default()
        };
        assert_eq!(unmapped.entrez_gene_id(), None);
    }
}
