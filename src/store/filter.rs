use serde_json::Value;
use uuid::Uuid;

use crate::store::client::StoreError;

/// Document filter: equality conditions on document fields, an optional
/// native text-search condition, and an optional id condition. All clauses
/// intersect (boolean AND) when rendered.
#[derive(Debug, Clone, Default)]
pub struct DocFilter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
enum Clause {
    Id(Uuid),
    Eq(String, Value),
    Text(String),
}

/// Rendered WHERE fragment with positional text parameters.
#[derive(Debug, Clone)]
pub struct SqlWhere {
    pub clause: String,
    pub params: Vec<String>,
}

impl DocFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match the server-assigned document id.
    pub fn id(mut self, id: Uuid) -> Self {
        self.clauses.push(Clause::Id(id));
        self
    }

    /// Exact equality on a document field.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push(Clause::Eq(field.into(), value.into()));
        self
    }

    /// Native full-text search across the whole document.
    pub fn text(mut self, query: impl Into<String>) -> Self {
        self.clauses.push(Clause::Text(query.into()));
        self
    }

    /// The id clause, if one was set. An upsert that has to insert keeps a
    /// caller-addressed id instead of minting a fresh one.
    pub fn id_value(&self) -> Option<Uuid> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Id(id) => Some(*id),
            _ => None,
        })
    }

    /// Equality pairs of the filter, used to seed the document an upsert
    /// inserts when nothing matched.
    pub fn eq_pairs(&self) -> Vec<(String, Value)> {
        self.clauses
            .iter()
            .filter_map(|c| match c {
                Clause::Eq(field, value) => Some((field.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    /// Render to a WHERE fragment. `first_param` is the 1-based index of the
    /// first placeholder, so the fragment composes with params bound before
    /// it (e.g. an update patch).
    pub fn to_sql(&self, first_param: usize) -> Result<SqlWhere, StoreError> {
        let mut parts = Vec::new();
        let mut params = Vec::new();
        let mut n = first_param;

        for clause in &self.clauses {
            match clause {
                Clause::Id(id) => {
                    parts.push(format!("id = ${}::uuid", n));
                    params.push(id.to_string());
                    n += 1;
                }
                Clause::Eq(field, value) => {
                    validate_field_name(field)?;
                    parts.push(format!("doc->>'{}' = ${}", field, n));
                    params.push(match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                    n += 1;
                }
                Clause::Text(query) => {
                    parts.push(format!(
                        "to_tsvector('simple', doc::text) @@ plainto_tsquery('simple', ${})",
                        n
                    ));
                    params.push(query.clone());
                    n += 1;
                }
            }
        }

        Ok(SqlWhere { clause: parts.join(" AND "), params })
    }
}

/// Field names are interpolated into the JSONB accessor, so the usual
/// identifier alphabet is all that is accepted.
pub fn validate_field_name(field: &str) -> Result<(), StoreError> {
    let mut chars = field.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidFieldName(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_renders_empty_clause() {
        let sql = DocFilter::new().to_sql(1).unwrap();
        assert!(sql.clause.is_empty());
        assert!(sql.params.is_empty());
    }

    #[test]
    fn eq_clauses_are_anded_in_order() {
        let sql = DocFilter::new()
            .eq("createdBy", "a@b.c")
            .eq("category", "travel")
            .to_sql(1)
            .unwrap();
        assert_eq!(sql.clause, "doc->>'createdBy' = $1 AND doc->>'category' = $2");
        assert_eq!(sql.params, vec!["a@b.c", "travel"]);
    }

    #[test]
    fn text_search_intersects_with_other_clauses() {
        let sql = DocFilter::new()
            .eq("category", "travel")
            .text("mountain")
            .to_sql(1)
            .unwrap();
        assert!(sql.clause.contains("doc->>'category' = $1"));
        assert!(sql.clause.contains("plainto_tsquery('simple', $2)"));
        assert!(sql.clause.contains(" AND "));
        assert_eq!(sql.params, vec!["travel", "mountain"]);
    }

    #[test]
    fn first_param_offsets_placeholders() {
        let sql = DocFilter::new().eq("email", "a@b.c").to_sql(3).unwrap();
        assert_eq!(sql.clause, "doc->>'email' = $3");
    }

    #[test]
    fn id_clause_casts_to_uuid() {
        let id = Uuid::new_v4();
        let sql = DocFilter::new().id(id).to_sql(1).unwrap();
        assert_eq!(sql.clause, "id = $1::uuid");
        assert_eq!(sql.params, vec![id.to_string()]);
    }

    #[test]
    fn hostile_field_names_are_rejected() {
        assert!(DocFilter::new().eq("a'; --", "x").to_sql(1).is_err());
        assert!(DocFilter::new().eq("", "x").to_sql(1).is_err());
        assert!(DocFilter::new().eq("9lives", "x").to_sql(1).is_err());
        assert!(validate_field_name("createdBy").is_ok());
    }

    #[test]
    fn eq_pairs_exposes_only_equality_clauses() {
        let filter = DocFilter::new().eq("email", "a@b.c").text("hello");
        let pairs = filter.eq_pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "email");
    }
}
