use serde::Deserialize;
use serde_json::Value;

use super::StatsError;

/// Envelope shared by the stats endpoints: named tables of `headers` + `rowSet`.
#[derive(Debug, Deserialize)]
pub struct StatsResponse {
    #[serde(rename = "resultSets")]
    pub result_sets: Vec<ResultSet>,
}

#[derive(Debug, Deserialize)]
pub struct ResultSet {
    pub name: String,
    pub headers: Vec<String>,
    #[serde(rename = "rowSet")]
    pub row_set: Vec<Vec<Value>>,
}

#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    headers: &'a [String],
    row: &'a [Value],
}

impl StatsResponse {
    pub fn result_set(&self, name: &str) -> Result<&ResultSet, StatsError> {
        self.result_sets
            .iter()
            .find(|set| set.name == name)
            .ok_or_else(|| StatsError::MissingResultSet(name.to_string()))
    }

    pub fn optional_result_set(&self, name: &str) -> Option<&ResultSet> {
        self.result_sets.iter().find(|set| set.name == name)
    }
}

impl ResultSet {
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        self.row_set.iter().map(|row| Record {
            headers: &self.headers,
            row,
        })
    }
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        let index = self.headers.iter().position(|h| h == column)?;
        self.row.get(index).filter(|v| !v.is_null())
    }

    /// Numeric cell; numeric strings are accepted too.
    pub fn number(&self, column: &str) -> Option<f64> {
        match self.get(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn text(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
