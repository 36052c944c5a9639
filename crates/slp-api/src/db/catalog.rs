//! # Schema Introspection
//!
//! Builds the field descriptors every list response carries. Column and enum
//! metadata comes from the PostgreSQL catalog through a [`CatalogSource`];
//! the [`Introspector`] caches the raw metadata per table for the life of the
//! process and applies exclusions and prefixes per call.
//!
//! Schema migrations restart the service, so the cache is never refreshed on
//! its own. [`Introspector::invalidate`] exists for operators and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use slp_core::fields::{dedupe, describe_columns};
use slp_core::{CatalogColumn, FieldDescriptor};
use sqlx::PgPool;

/// Read access to the database catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync + std::fmt::Debug {
    /// Columns of `public.<table>` in ordinal order.
    async fn columns(&self, table: &str) -> Result<Vec<CatalogColumn>, sqlx::Error>;

    /// Labels of each enum type in `udt_names`, in declaration order.
    async fn enum_labels(
        &self,
        udt_names: &[String],
    ) -> Result<HashMap<String, Vec<String>>, sqlx::Error>;
}

/// [`CatalogSource`] over `information_schema` and `pg_enum`.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogSource for PgCatalog {
    async fn columns(&self, table: &str) -> Result<Vec<CatalogColumn>, sqlx::Error> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT column_name::text, data_type::text, udt_name::text \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(column_name, data_type, udt_name)| CatalogColumn {
                column_name,
                data_type,
                udt_name,
            })
            .collect())
    }

    async fn enum_labels(
        &self,
        udt_names: &[String],
    ) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT t.typname::text, e.enumlabel::text \
             FROM pg_enum e JOIN pg_type t ON t.oid = e.enumtypid \
             WHERE t.typname = ANY($1) \
             ORDER BY t.typname, e.enumsortorder",
        )
        .bind(udt_names)
        .fetch_all(&self.pool)
        .await?;

        let mut labels: HashMap<String, Vec<String>> = HashMap::new();
        for (type_name, label) in rows {
            labels.entry(type_name).or_default().push(label);
        }
        Ok(labels)
    }
}

/// A table joined under a dot-path prefix, with its own nested joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub table: &'static str,
    /// Key of this relation inside its parent row.
    pub path: &'static str,
    /// Columns to drop, by snake_case catalog name.
    pub excludes: &'static [&'static str],
    pub children: Vec<Relation>,
}

impl Relation {
    /// The root table of a result set; its columns carry no prefix.
    pub fn root(table: &'static str, excludes: &'static [&'static str]) -> Self {
        Self {
            table,
            path: "",
            excludes,
            children: Vec::new(),
        }
    }

    pub fn nested(
        path: &'static str,
        table: &'static str,
        excludes: &'static [&'static str],
    ) -> Self {
        Self {
            table,
            path,
            excludes,
            children: Vec::new(),
        }
    }

    pub fn join(mut self, child: Relation) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug)]
struct TableMeta {
    columns: Vec<CatalogColumn>,
    enums: HashMap<String, Vec<String>>,
}

/// Cached descriptor builder.
#[derive(Debug, Clone)]
pub struct Introspector {
    source: Arc<dyn CatalogSource>,
    cache: Arc<RwLock<HashMap<String, Arc<TableMeta>>>>,
}

impl Introspector {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Descriptors for one table.
    pub async fn describe_table(
        &self,
        table: &str,
        excludes: &[&str],
        prefix: &str,
    ) -> Result<Vec<FieldDescriptor>, sqlx::Error> {
        let meta = self.meta(table).await?;
        Ok(describe_columns(&meta.columns, &meta.enums, excludes, prefix))
    }

    /// Descriptors for a root table and every relation under it, with
    /// structural duplicates removed.
    pub async fn describe_joined(
        &self,
        root: &Relation,
    ) -> Result<Vec<FieldDescriptor>, sqlx::Error> {
        let mut fields = Vec::new();
        let mut pending: Vec<(&Relation, String)> = vec![(root, String::new())];

        while let Some((relation, prefix)) = pending.pop() {
            fields.extend(
                self.describe_table(relation.table, relation.excludes, &prefix)
                    .await?,
            );
            for child in relation.children.iter().rev() {
                let child_prefix = if prefix.is_empty() {
                    child.path.to_string()
                } else {
                    format!("{prefix}.{}", child.path)
                };
                pending.push((child, child_prefix));
            }
        }

        Ok(dedupe(fields))
    }

    /// Drop cached metadata for one table, or for all tables.
    pub fn invalidate(&self, table: Option<&str>) {
        let mut cache = self.cache.write();
        match table {
            Some(name) => {
                cache.remove(name);
            }
            None => cache.clear(),
        }
    }

    async fn meta(&self, table: &str) -> Result<Arc<TableMeta>, sqlx::Error> {
        let cached = self.cache.read().get(table).cloned();
        if let Some(meta) = cached {
            return Ok(meta);
        }

        let columns = self.source.columns(table).await?;
        let mut udt_names: Vec<String> = columns
            .iter()
            .filter(|c| c.is_enum())
            .map(|c| c.udt_name.clone())
            .collect();
        udt_names.sort();
        udt_names.dedup();

        let enums = if udt_names.is_empty() {
            HashMap::new()
        } else {
            self.source.enum_labels(&udt_names).await?
        };

        let meta = Arc::new(TableMeta { columns, enums });
        // Unknown tables are not cached so a late migration is picked up.
        if !meta.columns.is_empty() {
            self.cache
                .write()
                .insert(table.to_string(), Arc::clone(&meta));
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slp_core::FieldType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct FakeCatalog {
        column_calls: AtomicUsize,
        enum_calls: AtomicUsize,
    }

    fn col(name: &str, data_type: &str, udt: &str) -> CatalogColumn {
        CatalogColumn {
            column_name: name.into(),
            data_type: data_type.into(),
            udt_name: udt.into(),
        }
    }

    #[async_trait]
    impl CatalogSource for FakeCatalog {
        async fn columns(&self, table: &str) -> Result<Vec<CatalogColumn>, sqlx::Error> {
            self.column_calls.fetch_add(1, Ordering::SeqCst);
            Ok(match table {
                "pool" => vec![
                    col("id", "uuid", "uuid"),
                    col("number", "integer", "int4"),
                    col("status", "USER-DEFINED", "PoolStatus"),
                    col("company_id", "uuid", "uuid"),
                ],
                "storage" => vec![
                    col("id", "uuid", "uuid"),
                    col("name", "character varying", "varchar"),
                    col("type", "USER-DEFINED", "StorageType"),
                ],
                "zone" => vec![col("id", "uuid", "uuid"), col("geo_id", "text", "text")],
                _ => vec![],
            })
        }

        async fn enum_labels(
            &self,
            udt_names: &[String],
        ) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
            self.enum_calls.fetch_add(1, Ordering::SeqCst);
            let mut out = HashMap::new();
            for name in udt_names {
                let labels = match name.as_str() {
                    "PoolStatus" => vec!["ACTIVE".to_string(), "CLOSED".to_string()],
                    "StorageType" => vec!["DC".to_string(), "PUP".to_string()],
                    _ => continue,
                };
                out.insert(name.clone(), labels);
            }
            Ok(out)
        }
    }

    fn introspector() -> (Introspector, Arc<FakeCatalog>) {
        let fake = Arc::new(FakeCatalog::default());
        (Introspector::new(fake.clone()), fake)
    }

    #[tokio::test]
    async fn enum_columns_carry_labels_and_facet() {
        let (catalog, _) = introspector();
        let fields = catalog.describe_table("pool", &[], "").await.unwrap();

        let status = fields.iter().find(|f| f.name == "status").unwrap();
        assert_eq!(status.field_type, FieldType::Enum);
        assert!(status.facet);
        assert_eq!(
            status.values.as_deref(),
            Some(&["ACTIVE".to_string(), "CLOSED".to_string()][..])
        );

        let number = fields.iter().find(|f| f.name == "number").unwrap();
        assert_eq!(number.field_type, FieldType::Number);
        assert!(!number.facet);
        assert!(number.values.is_none());
    }

    #[tokio::test]
    async fn excludes_apply_per_call_over_cached_metadata() {
        let (catalog, fake) = introspector();
        let all = catalog.describe_table("pool", &[], "").await.unwrap();
        let trimmed = catalog
            .describe_table("pool", &["company_id"], "pool")
            .await
            .unwrap();

        assert_eq!(all.len(), 4);
        let names: Vec<_> = trimmed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["pool.id", "pool.number", "pool.status"]);
        assert_eq!(fake.column_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fake.enum_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn tables_without_enums_skip_label_lookup() {
        let (catalog, fake) = introspector();
        let fields = catalog.describe_table("zone", &[], "").await.unwrap();
        assert_eq!(fields[1].name, "geoId");
        assert_eq!(fields[1].field_type, FieldType::Native("text".into()));
        assert_eq!(fake.enum_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalidate_forces_reload() {
        let (catalog, fake) = introspector();
        catalog.describe_table("pool", &[], "").await.unwrap();
        catalog.invalidate(Some("pool"));
        catalog.describe_table("pool", &[], "").await.unwrap();
        assert_eq!(fake.column_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unknown_tables_are_empty_and_uncached() {
        let (catalog, fake) = introspector();
        assert!(catalog.describe_table("nope", &[], "").await.unwrap().is_empty());
        catalog.describe_table("nope", &[], "").await.unwrap();
        assert_eq!(fake.column_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn joined_relations_are_prefixed_and_deduplicated() {
        let (catalog, _) = introspector();
        let root = Relation::root("pool", &["company_id"])
            .join(Relation::nested("storage", "storage", &["type"]))
            .join(Relation::nested("storage", "storage", &["type"]));

        let fields = catalog.describe_joined(&root).await.unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["id", "number", "status", "storage.id", "storage.name"]
        );
    }

    #[tokio::test]
    async fn nested_prefixes_chain_paths() {
        let (catalog, _) = introspector();
        let root = Relation::root("zone", &[]).join(
            Relation::nested("pool", "pool", &["id", "number", "status"])
                .join(Relation::nested("storage", "storage", &["id", "type"])),
        );

        let fields = catalog.describe_joined(&root).await.unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["id", "geoId", "pool.companyId", "pool.storage.name"]
        );
    }
}
