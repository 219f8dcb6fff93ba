//! In-memory collaborators shared by the unit tests of this crate.

use async_trait::async_trait;
use lvgen_core::{GenError, GenResult, MenuRecord, MenuStore, RawColumn, SchemaStore, TableInfo};
use lvgen_ir::{ConfigBuilder, GenerateConfig, InferenceEngine};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn article_columns() -> Vec<RawColumn> {
    vec![
        RawColumn::new("id", "int").with_key("PRI").not_null(),
        RawColumn::new("title", "varchar").with_comment("Title").not_null(),
        RawColumn::new("content", "text").with_comment("Body"),
        RawColumn::new("status", "int").with_comment("Status"),
        RawColumn::new("created_at", "datetime"),
        RawColumn::new("updated_at", "datetime"),
        RawColumn::new("deleted_at", "datetime"),
    ]
}

pub fn article_config() -> GenerateConfig {
    let columns = InferenceEngine::default().infer_all(&article_columns());
    ConfigBuilder::new(TableInfo::new("lv_articles", "Articles"), columns)
        .package_name("blog")
        .build()
        .unwrap()
}

/// A router source in the shape of the target project.
pub const ROUTER_GO: &str = r#"package router

func InitRouter(r *gin.Engine) {
	publicGroup := r.Group("")
	{
		publicGroup.GET("/health", func(c *gin.Context) {
			c.JSON(200, "ok")
		})
	}

	// privateGroup := r.Group("old") { commented out }
	privateGroup := r.Group("")
	privateGroup.Use(middleware.JWTAuth())
	{
		settingApi := v1.SettingApi{}
		privateGroup.GET("/settings", settingApi.GetSettings)

		systemUserApi := v1.SystemUserApi{}
		systemUserGroup := privateGroup.Group("system/user")
		{
			systemUserGroup.GET("list", systemUserApi.GetList)
			systemUserGroup.GET("tricky", func(c *gin.Context) { c.String(200, "}") })
		}
	}

	global.LV_LOG.Info("router register success")
}
"#;

// ============================================================================
// Schema store fakes
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeSchema {
    tables: Vec<TableInfo>,
    columns: BTreeMap<String, Vec<RawColumn>>,
    failing: bool,
}

impl FakeSchema {
    pub fn articles() -> Self {
        Self::default().with_table(TableInfo::new("lv_articles", "Articles"), article_columns())
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, table: TableInfo, columns: Vec<RawColumn>) -> Self {
        self.columns.insert(table.name.clone(), columns);
        self.tables.push(table);
        self
    }
}

#[async_trait]
impl SchemaStore for FakeSchema {
    async fn tables(&self, _database: &str) -> GenResult<Vec<TableInfo>> {
        if self.failing {
            return Err(GenError::schema(None, "connection refused"));
        }
        Ok(self.tables.clone())
    }

    async fn columns(&self, _database: &str, table: &str) -> GenResult<Vec<RawColumn>> {
        if self.failing {
            return Err(GenError::schema(Some(table), "connection refused"));
        }
        Ok(self.columns.get(table).cloned().unwrap_or_default())
    }
}

/// A store that never answers within a reasonable deadline.
#[derive(Debug)]
pub struct SlowSchema(pub Duration);

#[async_trait]
impl SchemaStore for SlowSchema {
    async fn tables(&self, _database: &str) -> GenResult<Vec<TableInfo>> {
        tokio::time::sleep(self.0).await;
        Ok(Vec::new())
    }

    async fn columns(&self, _database: &str, _table: &str) -> GenResult<Vec<RawColumn>> {
        tokio::time::sleep(self.0).await;
        Ok(article_columns())
    }
}

// ============================================================================
// Menu store fake
// ============================================================================

#[derive(Debug, Default)]
pub struct FakeMenus {
    records: Mutex<Vec<(u64, MenuRecord)>>,
    next_id: Mutex<u64>,
    failing: bool,
    delay: Option<Duration>,
}

impl FakeMenus {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<(u64, MenuRecord)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl MenuStore for FakeMenus {
    async fn create(&self, record: &MenuRecord) -> GenResult<u64> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing {
            return Err(GenError::schema(Some("lv_menus"), "insert rejected"));
        }
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        self.records.lock().unwrap().push((*next, record.clone()));
        Ok(*next)
    }

    async fn delete(&self, id: u64) -> GenResult<()> {
        if self.failing {
            return Err(GenError::menu("delete rejected"));
        }
        self.records.lock().unwrap().retain(|(rid, _)| *rid != id);
        Ok(())
    }
}
