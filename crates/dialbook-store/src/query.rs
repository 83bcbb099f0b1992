use dialbook_core::GeographyBucket;
use rusqlite::types::Value;

pub(crate) const CONTACT_COLUMNS: &str = "id, phone, raw_phone, e164_phone, name, address, location_text, city, state, country, geography_bucket, other, created_at, updated_at";

/// Selection for listing contacts. An empty bucket list selects every
/// contact; `limit: None` returns all rows.
#[derive(Debug, Default, Clone)]
pub struct ContactQuery {
    pub buckets: Vec<GeographyBucket>,
    pub limit: Option<i64>,
}

pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl ContactQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_buckets(buckets: &[GeographyBucket]) -> Self {
        let mut query = Self::default();
        for bucket in buckets {
            if !query.buckets.contains(bucket) {
                query.buckets.push(*bucket);
            }
        }
        query
    }

    pub fn with_limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn to_sql(&self) -> SqlQuery {
        let mut sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts");
        let mut params = Vec::new();

        if !self.buckets.is_empty() {
            let mut placeholders = Vec::with_capacity(self.buckets.len());
            for bucket in &self.buckets {
                params.push(Value::from(bucket.as_str().to_string()));
                placeholders.push(format!("?{}", params.len()));
            }
            sql.push_str(&format!(
                " WHERE geography_bucket IN ({})",
                placeholders.join(", ")
            ));
        }

        sql.push_str(" ORDER BY updated_at DESC, name COLLATE NOCASE ASC, id ASC");

        if let Some(limit) = self.limit {
            params.push(Value::from(limit.max(0)));
            sql.push_str(&format!(" LIMIT ?{}", params.len()));
        }

        sql.push(';');
        SqlQuery { sql, params }
    }
}
