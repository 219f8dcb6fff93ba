//! # Template Rendering Engine
//!
//! Renders the six artifacts of a module from one [`GenerateConfig`].
//! Rendering is pure: the same config and template set always produce
//! byte-identical output.

use lvgen_core::{ArtifactKind, GenError, GenResult, Validatable};
use lvgen_ir::GenerateConfig;
use minijinja::Environment;
use std::collections::BTreeMap;

use crate::context::RenderContext;
use crate::templates::TemplateSet;

// ============================================================================
// RenderedModule
// ============================================================================

/// The rendered artifacts of one module, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedModule {
    artifacts: BTreeMap<ArtifactKind, String>,
}

impl RenderedModule {
    pub fn get(&self, kind: ArtifactKind) -> Option<&str> {
        self.artifacts.get(&kind).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &str)> {
        self.artifacts.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Artifact map keyed by artifact key (`entity`, `view`, …), as returned
    /// by a dry-run preview.
    pub fn to_preview_map(&self) -> BTreeMap<String, String> {
        self.artifacts
            .iter()
            .map(|(k, v)| (k.key().to_string(), v.clone()))
            .collect()
    }

    /// Total rendered size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.artifacts.values().map(String::len).sum()
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Compiled template environment.
#[derive(Debug, Clone)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Compile a template set.
    pub fn new(templates: &TemplateSet) -> GenResult<Self> {
        Ok(Self {
            env: templates.compile()?,
        })
    }

    /// Renderer over the compiled-in templates.
    pub fn builtin() -> GenResult<Self> {
        Self::new(&TemplateSet::builtin())
    }

    /// Render every artifact.
    ///
    /// # Errors
    ///
    /// `GenError::Config` if the config does not validate, `GenError::Template`
    /// if a template references a binding the context does not provide.
    pub fn render(&self, config: &GenerateConfig) -> GenResult<RenderedModule> {
        config.validate()?;
        let ctx = RenderContext::from_config(config);

        let mut artifacts = BTreeMap::new();
        for kind in ArtifactKind::ALL {
            artifacts.insert(kind, self.render_with(kind, &ctx)?);
        }

        tracing::debug!(
            module = %config.module_name,
            artifacts = artifacts.len(),
            "artifacts rendered",
        );
        Ok(RenderedModule { artifacts })
    }

    /// Render a single artifact.
    pub fn render_artifact(&self, kind: ArtifactKind, config: &GenerateConfig) -> GenResult<String> {
        config.validate()?;
        self.render_with(kind, &RenderContext::from_config(config))
    }

    fn render_with(&self, kind: ArtifactKind, ctx: &RenderContext) -> GenResult<String> {
        let template = self
            .env
            .get_template(kind.template_name())
            .map_err(|e| GenError::template(kind.key(), e.to_string()))?;
        template
            .render(ctx)
            .map_err(|e| GenError::template(kind.key(), e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lvgen_core::QueryOperator;
    use lvgen_ir::{ColumnOverride, ConfigBuilder, InferenceEngine, RawColumn, TableInfo};
    use pretty_assertions::assert_eq;

    fn article_columns(soft_delete: bool) -> Vec<RawColumn> {
        let mut columns = vec![
            RawColumn::new("id", "int").with_key("PRI").not_null(),
            RawColumn::new("title", "varchar").with_comment("Title").not_null(),
            RawColumn::new("content", "text").with_comment("Body"),
            RawColumn::new("status", "int").with_comment("Status"),
            RawColumn::new("created_at", "datetime"),
            RawColumn::new("updated_at", "datetime"),
        ];
        if soft_delete {
            columns.push(RawColumn::new("deleted_at", "datetime"));
        }
        columns
    }

    fn article_config(soft_delete: bool) -> GenerateConfig {
        let inferred = InferenceEngine::default().infer_all(&article_columns(soft_delete));
        ConfigBuilder::new(TableInfo::new("lv_articles", "Articles"), inferred)
            .package_name("blog")
            .build()
            .unwrap()
    }

    fn render(config: &GenerateConfig) -> RenderedModule {
        Renderer::builtin().unwrap().render(config).unwrap()
    }

    #[test]
    fn test_renders_all_six_artifacts() {
        let module = render(&article_config(true));
        assert_eq!(module.len(), 6);
        let keys: Vec<_> = module.to_preview_map().into_keys().collect();
        assert_eq!(
            keys,
            vec!["api_client", "entity", "handler", "routes", "service", "view"]
        );
        assert!(module.total_bytes() > 0);
    }

    #[test]
    fn test_rendering_is_byte_identical() {
        let config = article_config(true);
        let renderer = Renderer::builtin().unwrap();
        assert_eq!(renderer.render(&config).unwrap(), renderer.render(&config).unwrap());
    }

    #[test]
    fn test_soft_delete_entity_and_service() {
        let module = render(&article_config(true));
        let entity = module.get(ArtifactKind::Entity).unwrap();
        assert_eq!(
            entity,
            "package model\n\
             \n\
             import \"gorm.io/gorm\"\n\
             \n\
             // Article Articles\n\
             type Article struct {\n\
             \tgorm.Model\n\
             \tTitle string `json:\"title\" gorm:\"column:title;comment:Title\"` // Title\n\
             \tContent string `json:\"content\" gorm:\"column:content;comment:Body\"` // Body\n\
             \tStatus int `json:\"status\" gorm:\"column:status;comment:Status\"` // Status\n\
             }\n\
             \n\
             func (Article) TableName() string {\n\
             \treturn \"lv_articles\"\n\
             }\n"
        );

        let service = module.get(ArtifactKind::Service).unwrap();
        assert!(service.contains("return global.LV_DB.Delete(&model.Article{}, id).Error"));
        assert!(!service.contains("Unscoped"));
    }

    #[test]
    fn test_hard_delete_entity_and_service() {
        let module = render(&article_config(false));
        let entity = module.get(ArtifactKind::Entity).unwrap();
        assert!(entity.contains("import \"time\"\n"));
        assert!(entity.contains("\tID uint `json:\"id\" gorm:\"primaryKey;autoIncrement\"`\n"));
        assert!(entity.contains("\tCreatedAt time.Time"));
        assert!(!entity.contains("gorm.Model"));
        assert!(!entity.contains("DeletedAt"));

        let service = module.get(ArtifactKind::Service).unwrap();
        assert!(service.contains("global.LV_DB.Unscoped().Delete(&model.Article{}, id).Error"));

        let view = module.get(ArtifactKind::View).unwrap();
        assert!(view.contains("deleteArticle(row.id)"));
    }

    #[test]
    fn test_service_filters_follow_operators() {
        let inferred = InferenceEngine::default().infer_all(&article_columns(true));
        let config = ConfigBuilder::new(TableInfo::new("lv_articles", "Articles"), inferred)
            .override_column(
                "title",
                ColumnOverride {
                    query_operator: Some(QueryOperator::Like),
                    ..Default::default()
                },
            )
            .override_column(
                "status",
                ColumnOverride {
                    query_operator: Some(QueryOperator::Gte),
                    ..Default::default()
                },
            )
            .build()
            .unwrap();

        let service = render(&config).get(ArtifactKind::Service).unwrap().to_string();
        assert!(service.contains("GetList(page, pageSize int, title string, status string)"));
        assert!(service.contains("db.Where(\"title LIKE ?\", \"%\"+title+\"%\")"));
        assert!(service.contains("db.Where(\"status >= ?\", status)"));
        assert!(!service.contains("content"));
    }

    #[test]
    fn test_routes_snippet() {
        let module = render(&article_config(true));
        let routes = module.get(ArtifactKind::Routes).unwrap();
        assert!(routes.starts_with("// Articles routes (generated)\n"));
        assert!(routes.contains("articleGroup := privateGroup.Group(\"blog/article\")\n"));
        assert!(routes.contains("\tarticleGroup.DELETE(\":id\", articleApi.Delete)\n"));
    }

    #[test]
    fn test_view_form_and_table() {
        let module = render(&article_config(true));
        let view = module.get(ArtifactKind::View).unwrap();
        assert!(view.contains("<n-input v-model:value=\"searchForm.title\" placeholder=\"Title\""));
        assert!(view.contains("v-model:value=\"formData.content\" type=\"textarea\""));
        assert!(view.contains("<n-input-number v-model:value=\"formData.status\""));
        assert!(view.contains("  title: { required: true, message: 'Title is required', trigger: 'blur' },\n"));
        assert!(!view.contains("content: { required"));
        assert!(view.contains("  { title: 'Body', key: 'content' },\n"));
        assert!(view.contains("  status: 0,\n"));
        assert!(view.contains("from '@/api/blog/article';"));
        assert!(!view.contains("deleted_at"));
    }

    #[test]
    fn test_api_client_urls() {
        let module = render(&article_config(true));
        let client = module.get(ArtifactKind::ApiClient).unwrap();
        assert!(client.contains("url: '/blog/article/list'"));
        assert!(client.contains("url: `/blog/article/${id}`, method: 'delete'"));
        assert!(client.contains("export const createArticle = (data: any)"));
    }

    #[test]
    fn test_unbound_variable_is_template_error() {
        let set = TemplateSet::builtin()
            .with_template(ArtifactKind::Handler, "package v1 // {{ missing_binding }}\n");
        let renderer = Renderer::new(&set).unwrap();
        let err = renderer.render(&article_config(true)).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::Template);
        assert!(err.to_string().contains("handler"));
    }

    #[test]
    fn test_invalid_config_is_rejected_before_rendering() {
        let mut config = article_config(true);
        config.module_name = "bad name".into();
        let err = Renderer::builtin().unwrap().render(&config).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::Config);
    }
}
