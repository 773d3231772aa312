// mod.rs - IAS interaction-score table

//! Loader for the IAS (Integrated Associations) score table, the
//! tab-separated file whose rows provide the edges of every generated
//! subnetwork. The first two columns name the interacting proteins; every
//! other column is carried onto the edge as an attribute.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

pub const PROTEIN_ONE: &str = "Protein 1";
pub const PROTEIN_TWO: &str = "Protein 2";

/// Interaction rows indexed `Protein 1 -> Protein 2 -> row attributes`.
/// Rows are stored in table direction only; use [`IasScoreMap::interaction`]
/// for the symmetric lookup.
#[derive(Debug, Clone, Default)]
pub struct IasScoreMap {
    map: HashMap<String, HashMap<String, Map<String, Value>>>,
    interactions: usize,
}

impl IasScoreMap {
    /// Load the score table from a local path or, when `source` is an
    /// http(s) URL, by downloading it.
    pub fn load(source: &str) -> Result<Self, String> {
        if source.starts_with("http://") || source.starts_with("https://") {
            println!("⏳ Downloading IAS score table from '{}' ...", source);
            let text = download_text(source)?;
            Self::from_reader(text.as_bytes())
        } else {
            let file = File::open(source)
                .map_err(|e| format!("Failed to open IAS score file '{}': {}", source, e))?;
            Self::from_reader(file)
        }
    }

    /// Parse a tab-separated score table.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| format!("Failed to read IAS score header: {}", e))?
            .clone();

        for required in [PROTEIN_ONE, PROTEIN_TWO] {
            if !headers.iter().any(|h| h == required) {
                return Err(format!("IAS score table is missing the '{}' column", required));
            }
        }

        let mut map: HashMap<String, HashMap<String, Map<String, Value>>> = HashMap::new();
        let mut interactions = 0;

        for (row_num, record) in csv_reader.records().enumerate() {
            let record =
                record.map_err(|e| format!("Failed to parse IAS score row {}: {}", row_num + 2, e))?;

            let mut attrs = Map::new();
            for (header, field) in headers.iter().zip(record.iter()) {
                // protein names stay strings even when they look numeric
                let value = if header == PROTEIN_ONE || header == PROTEIN_TWO {
                    Value::String(field.to_string())
                } else {
                    parse_field(field)
                };
                attrs.insert(header.to_string(), value);
            }

            let p1 = attrs
                .get(PROTEIN_ONE)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("IAS score row {} has no '{}'", row_num + 2, PROTEIN_ONE))?
                .to_string();
            let p2 = attrs
                .get(PROTEIN_TWO)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| format!("IAS score row {} has no '{}'", row_num + 2, PROTEIN_TWO))?
                .to_string();

            // duplicate rows replace the stored entry without recounting
            if map.entry(p1).or_default().insert(p2, attrs).is_none() {
                interactions += 1;
            }
        }

        println!(
            "✅ IAS score table loaded: {} interactions, {} source proteins",
            interactions,
            map.len()
        );
        Ok(IasScoreMap { map, interactions })
    }

    /// Row stored under `a -> b`, in table direction.
    pub fn get(&self, a: &str, b: &str) -> Option<&Map<String, Value>> {
        self.map.get(a).and_then(|partners| partners.get(b))
    }

    /// Row for the protein pair in either direction.
    pub fn interaction(&self, a: &str, b: &str) -> Option<&Map<String, Value>> {
        self.get(a, b).or_else(|| self.get(b, a))
    }

    pub fn protein_count(&self) -> usize {
        self.map.len()
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions
    }

    pub fn partners(&self, a: &str) -> Option<&HashMap<String, Map<String, Value>>> {
        self.map.get(a)
    }
}

/// Attributes a score row contributes to an edge: everything except the two
/// protein-name columns.
pub fn edge_attributes(row: &Map<String, Value>) -> Map<String, Value> {
    row.iter()
        .filter(|(name, _)| name.as_str() != PROTEIN_ONE && name.as_str() != PROTEIN_TWO)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn parse_field(field: &str) -> Value {
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => serde_json::json!(n),
        _ => Value::String(field.to_string()),
    }
}

fn download_text(url: &str) -> Result<String, String> {
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| format!("Failed to download IAS score table from '{}': {}", url, e))?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(format!(
            "Failed to download IAS score table from '{}': HTTP status {}",
            url, status
        ));
    }

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| format!("Failed to decode IAS score table from '{}': {}", url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    const FIVE_ROWS: &str = "Protein 1\tProtein 2\tIntegrated score\tevidence: Co-dependence\tevidence: Physical\tevidence: Protein co-expression\tevidence: Sequence similarity\tevidence: mRNA co-expression\n\
A1BG\tABCB4\t0.208\t0.0\t0.092\t0.007\t0.112\t0.316\n\
A1BG\tABCC2\t0.155\t0.0\t0.081\t0.003\t0.154\t0.255\n\
A1BG\tCRISPLD1\t0.141\t0.0\t0.072\t0.001\t0.09\t0.213\n\
A1CF\tAPOBEC1\t0.512\t0.02\t0.455\t0.012\t0.0\t0.388\n\
A1CF\tSYNCRIP\t0.247\t0.0\t0.199\t0.008\t0.0\t0.301\n";

    #[test]
    fn test_from_reader_with_5rows() {
        let score_map = IasScoreMap::from_reader(FIVE_ROWS.as_bytes()).unwrap();

        assert_eq!(score_map.protein_count(), 2);
        assert_eq!(score_map.interaction_count(), 5);
        assert_eq!(score_map.partners("A1BG").unwrap().len(), 3);
        assert_eq!(score_map.partners("A1CF").unwrap().len(), 2);

        let row = score_map.get("A1BG", "ABCB4").unwrap();
        assert_eq!(
            Value::Object(row.clone()),
            json!({
                "Protein 1": "A1BG",
                "Protein 2": "ABCB4",
                "Integrated score": 0.208,
                "evidence: Co-dependence": 0.0,
                "evidence: Physical": 0.092,
                "evidence: Protein co-expression": 0.007,
                "evidence: Sequence similarity": 0.112,
                "evidence: mRNA co-expression": 0.316
            })
        );
    }

    #[test]
    fn test_interaction_is_symmetric() {
        let score_map = IasScoreMap::from_reader(FIVE_ROWS.as_bytes()).unwrap();
        assert!(score_map.interaction("A1BG", "ABCC2").is_some());
        assert!(score_map.interaction("ABCC2", "A1BG").is_some());
        assert!(score_map.get("ABCC2", "A1BG").is_none());
        assert!(score_map.interaction("A1BG", "SYNCRIP").is_none());
    }

    #[test]
    fn test_duplicate_rows_counted_once() {
        let table = "Protein 1\tProtein 2\tIntegrated score\n\
                     A1BG\tABCB4\t0.208\n\
                     A1BG\tABCB4\t0.9\n";
        let score_map = IasScoreMap::from_reader(table.as_bytes()).unwrap();

        assert_eq!(score_map.interaction_count(), 1);
        // the later row wins
        let row = score_map.get("A1BG", "ABCB4").unwrap();
        assert_eq!(row["Integrated score"], json!(0.9));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIVE_ROWS.as_bytes()).unwrap();
        let score_map = IasScoreMap::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(score_map.interaction_count(), 5);
    }

    #[test]
    fn test_missing_protein_column() {
        let table = "Protein 1\tIntegrated score\nA1BG\t0.2\n";
        let err = IasScoreMap::from_reader(table.as_bytes()).unwrap_err();
        assert!(err.contains("Protein 2"));
    }

    #[test]
    fn test_edge_attributes() {
        // nothing to carry over
        assert!(edge_attributes(&Map::new()).is_empty());

        let mut row = Map::new();
        row.insert(PROTEIN_ONE.to_string(), json!("foo"));
        row.insert(PROTEIN_TWO.to_string(), json!("blah"));
        assert!(edge_attributes(&row).is_empty());

        row.insert("x".to_string(), json!(1.0));
        let attrs = edge_attributes(&row);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs["x"], json!(1.0));
    }
}
