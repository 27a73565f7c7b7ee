//! Database object browser vocabulary and the catalog-backed children loader.
//!
//! Node ids join object names with `.`. Folders and the column/index lists
//! under a relation are introduced with `#`, so an object named like a
//! folder (a schema called `extensions`) never shares an id with one:
//!
//! ```text
//! app                                database
//! app#extensions.pgcrypto            extension
//! app.public                         schema
//! app.public#tables                  group folder
//! app.public#tables.users            relation
//! app.public#tables.users#col.id     column
//! app.public#tables.users#idx.pkey   index
//! app.public#functions.f(int)        function
//! ```

use crate::error::{LoaderError, Result};
use crate::navigator::Navigator;
use crate::query::TypeFilter;
use crate::tree::{ChildSpec, NodeKind, Tree, TreeNode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/// Folder categories shown under a database or schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Extensions,
    Tables,
    Views,
    MaterializedViews,
    Functions,
    Sequences,
}

impl ObjectClass {
    pub fn title(&self) -> &'static str {
        match self {
            ObjectClass::Extensions => "Extensions",
            ObjectClass::Tables => "Tables",
            ObjectClass::Views => "Views",
            ObjectClass::MaterializedViews => "Materialized Views",
            ObjectClass::Functions => "Functions",
            ObjectClass::Sequences => "Sequences",
        }
    }

    /// Id segment for the folder node
    pub fn segment(&self) -> &'static str {
        match self {
            ObjectClass::Extensions => "extensions",
            ObjectClass::Tables => "tables",
            ObjectClass::Views => "views",
            ObjectClass::MaterializedViews => "matviews",
            ObjectClass::Functions => "functions",
            ObjectClass::Sequences => "sequences",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DbKind {
    Root,
    Database,
    Schema,
    Group(ObjectClass),
    Table,
    View,
    MaterializedView,
    Function,
    Sequence,
    Extension,
    Column,
    Index,
    Error,
    Empty,
}

/// Per-object details shown by the decorator and the detail pane
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_estimate: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arguments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl NodeKind for DbKind {
    type Meta = DbMeta;

    fn root() -> Self {
        DbKind::Root
    }

    fn error() -> Self {
        DbKind::Error
    }

    fn is_searchable(&self) -> bool {
        matches!(
            self,
            DbKind::Schema
                | DbKind::Table
                | DbKind::View
                | DbKind::MaterializedView
                | DbKind::Function
                | DbKind::Sequence
                | DbKind::Extension
                | DbKind::Column
                | DbKind::Index
        )
    }

    fn satisfies(&self, filter: TypeFilter) -> bool {
        matches!(
            (self, filter),
            (DbKind::Table, TypeFilter::Table)
                | (DbKind::View | DbKind::MaterializedView, TypeFilter::View)
                | (DbKind::Function, TypeFilter::Function)
                | (DbKind::Schema, TypeFilter::Schema)
                | (DbKind::Sequence, TypeFilter::Sequence)
                | (DbKind::Extension, TypeFilter::Extension)
                | (DbKind::Column, TypeFilter::Column)
                | (DbKind::Index, TypeFilter::Index)
        )
    }

    fn is_leaf(&self) -> bool {
        matches!(
            self,
            DbKind::Function
                | DbKind::Sequence
                | DbKind::Extension
                | DbKind::Column
                | DbKind::Index
                | DbKind::Error
                | DbKind::Empty
        )
    }

    fn decorate(node: &TreeNode<Self>) -> String {
        let meta = &node.meta;
        match node.kind {
            DbKind::Column => {
                let mut out = node.label.clone();
                if let Some(data_type) = &meta.data_type {
                    out.push_str(": ");
                    out.push_str(data_type);
                }
                if meta.nullable == Some(false) {
                    out.push_str(" NOT NULL");
                }
                if meta.primary_key {
                    out.push_str(" PK");
                }
                out
            }
            DbKind::Table | DbKind::MaterializedView => match meta.row_estimate {
                Some(rows) if rows >= 0 => format!("{} (~{})", node.label, rows),
                _ => node.label.clone(),
            },
            DbKind::Function => {
                let mut out = format!(
                    "{}({})",
                    node.label,
                    meta.arguments.as_deref().unwrap_or("")
                );
                if let Some(returns) = &meta.returns {
                    out.push_str(" -> ");
                    out.push_str(returns);
                }
                out
            }
            DbKind::Extension => match &meta.version {
                Some(version) => format!("{} {}", node.label, version),
                None => node.label.clone(),
            },
            DbKind::Group(_) if node.loaded => {
                format!("{} ({})", node.label, node.children().len())
            }
            _ => node.label.clone(),
        }
    }
}

pub type DbNavigator = Navigator<DbKind>;

/// Empty browser tree for a connection; the root loads lazily under id ""
pub fn browser_tree(connection: &str) -> Tree<DbKind> {
    Tree::new("", connection)
}

/// Source of child descriptors for the browser. Implementations run off
/// the UI thread, so they must be shareable.
#[cfg_attr(test, mockall::automock)]
pub trait ChildrenLoader: Send + Sync {
    fn load_children(&self, id: &str) -> std::result::Result<Vec<ChildSpec<DbKind>>, LoaderError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub databases: Vec<DatabaseEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseEntry {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub extensions: Vec<ExtensionEntry>,
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionEntry {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub tables: Vec<RelationEntry>,
    #[serde(default)]
    pub views: Vec<RelationEntry>,
    #[serde(default)]
    pub materialized_views: Vec<RelationEntry>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
    #[serde(default)]
    pub sequences: Vec<SequenceEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationEntry {
    pub name: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub row_estimate: Option<i64>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnEntry>,
    #[serde(default)]
    pub indexes: Vec<IndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnEntry {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

fn default_nullable() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(default)]
    pub definition: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
    #[serde(default)]
    pub returns: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SequenceEntry {
    pub name: String,
    #[serde(default)]
    pub data_type: Option<String>,
}

impl CatalogSnapshot {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

/// Answers children loads from a catalog snapshot.
///
/// The snapshot is indexed once by parent id; every load is a map lookup.
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    children: HashMap<String, Vec<ChildSpec<DbKind>>>,
}

impl CatalogLoader {
    pub fn new(snapshot: &CatalogSnapshot) -> Self {
        let mut loader = Self::default();
        let roots: Vec<_> = snapshot
            .databases
            .iter()
            .map(|db| {
                loader.index_database(db);
                ChildSpec::new(db.name.clone(), DbKind::Database, db.name.clone()).with_meta(DbMeta {
                    owner: db.owner.clone(),
                    ..DbMeta::default()
                })
            })
            .collect();
        loader.children.insert(String::new(), roots);
        log::info!(
            "catalog: indexed {} parents from {} databases",
            loader.children.len(),
            snapshot.databases.len()
        );
        loader
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(&CatalogSnapshot::from_path(path)?))
    }

    /// Build the whole tree eagerly, for headless commands
    pub fn load_all(&self, connection: &str) -> Tree<DbKind> {
        let mut tree = browser_tree(connection);
        let mut queue = VecDeque::from([tree.root()]);
        while let Some(idx) = queue.pop_front() {
            let Some(node) = tree.get(idx) else {
                continue;
            };
            if node.leaf {
                continue;
            }
            let Ok(children) = self.load_children(&node.id) else {
                continue;
            };
            tree.refresh_children(idx, children);
            queue.extend(tree.children(idx).iter().copied());
        }
        tree
    }

    fn index_database(&mut self, db: &DatabaseEntry) {
        let mut children = Vec::new();
        if !db.extensions.is_empty() {
            let group_id = folder_id(&db.name, ObjectClass::Extensions);
            let extensions: Vec<_> = db
                .extensions
                .iter()
                .map(|ext| {
                    ChildSpec::new(format!("{}.{}", group_id, ext.name), DbKind::Extension, ext.name.clone())
                        .with_meta(DbMeta {
                            version: ext.version.clone(),
                            ..DbMeta::default()
                        })
                })
                .collect();
            children.push(group(&group_id, ObjectClass::Extensions));
            self.children.insert(group_id, extensions);
        }
        for schema in &db.schemas {
            let schema_id = format!("{}.{}", db.name, schema.name);
            self.index_schema(&schema_id, schema);
            children.push(
                ChildSpec::new(schema_id, DbKind::Schema, schema.name.clone()).with_meta(DbMeta {
                    owner: schema.owner.clone(),
                    ..DbMeta::default()
                }),
            );
        }
        self.children.insert(db.name.clone(), children);
    }

    fn index_schema(&mut self, schema_id: &str, schema: &SchemaEntry) {
        let mut groups = Vec::new();
        let relations = [
            (ObjectClass::Tables, DbKind::Table, &schema.tables),
            (ObjectClass::Views, DbKind::View, &schema.views),
            (
                ObjectClass::MaterializedViews,
                DbKind::MaterializedView,
                &schema.materialized_views,
            ),
        ];
        for (class, kind, entries) in relations {
            if entries.is_empty() {
                continue;
            }
            let group_id = folder_id(schema_id, class);
            let items: Vec<_> = entries
                .iter()
                .map(|rel| {
                    let rel_id = format!("{}.{}", group_id, rel.name);
                    self.index_relation(&rel_id, rel);
                    ChildSpec::new(rel_id, kind, rel.name.clone()).with_meta(DbMeta {
                        owner: rel.owner.clone(),
                        row_estimate: rel.row_estimate,
                        definition: rel.definition.clone(),
                        ..DbMeta::default()
                    })
                })
                .collect();
            groups.push(group(&group_id, class));
            self.children.insert(group_id, items);
        }

        if !schema.functions.is_empty() {
            let group_id = folder_id(schema_id, ObjectClass::Functions);
            let items: Vec<_> = schema
                .functions
                .iter()
                .map(|f| {
                    // overloads share a name, so the argument list is part of the id
                    ChildSpec::new(
                        format!("{}.{}({})", group_id, f.name, f.arguments),
                        DbKind::Function,
                        f.name.clone(),
                    )
                    .with_meta(DbMeta {
                        arguments: Some(f.arguments.clone()),
                        returns: f.returns.clone(),
                        ..DbMeta::default()
                    })
                })
                .collect();
            groups.push(group(&group_id, ObjectClass::Functions));
            self.children.insert(group_id, items);
        }

        if !schema.sequences.is_empty() {
            let group_id = folder_id(schema_id, ObjectClass::Sequences);
            let items: Vec<_> = schema
                .sequences
                .iter()
                .map(|s| {
                    ChildSpec::new(format!("{}.{}", group_id, s.name), DbKind::Sequence, s.name.clone())
                        .with_meta(DbMeta {
                            data_type: s.data_type.clone(),
                            ..DbMeta::default()
                        })
                })
                .collect();
            groups.push(group(&group_id, ObjectClass::Sequences));
            self.children.insert(group_id, items);
        }

        self.children.insert(schema_id.to_string(), groups);
    }

    fn index_relation(&mut self, rel_id: &str, rel: &RelationEntry) {
        let columns = rel.columns.iter().map(|c| {
            ChildSpec::new(format!("{}#col.{}", rel_id, c.name), DbKind::Column, c.name.clone())
                .with_meta(DbMeta {
                    data_type: Some(c.data_type.clone()),
                    nullable: Some(c.nullable),
                    primary_key: c.primary_key,
                    ..DbMeta::default()
                })
        });
        let indexes = rel.indexes.iter().map(|i| {
            ChildSpec::new(format!("{}#idx.{}", rel_id, i.name), DbKind::Index, i.name.clone())
                .with_meta(DbMeta {
                    definition: i.definition.clone(),
                    ..DbMeta::default()
                })
        });
        self.children
            .insert(rel_id.to_string(), columns.chain(indexes).collect());
    }
}

fn folder_id(parent: &str, class: ObjectClass) -> String {
    format!("{}#{}", parent, class.segment())
}

fn group(id: &str, class: ObjectClass) -> ChildSpec<DbKind> {
    ChildSpec::new(id, DbKind::Group(class), class.title()).unselectable()
}

impl ChildrenLoader for CatalogLoader {
    fn load_children(&self, id: &str) -> std::result::Result<Vec<ChildSpec<DbKind>>, LoaderError> {
        let children = self
            .children
            .get(id)
            .ok_or_else(|| LoaderError::NotFound(id.to_string()))?;
        if children.is_empty() {
            return Ok(vec![ChildSpec::new(format!("{}#empty", id), DbKind::Empty, "(empty)")
                .unselectable()]);
        }
        Ok(children.clone())
    }
}
