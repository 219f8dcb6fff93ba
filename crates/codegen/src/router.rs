//! # Router Patcher
//!
//! Registers a module's route group inside the authenticated block of an
//! existing router source:
//!
//! ```go
//! privateGroup := r.Group("")
//! privateGroup.Use(middleware.JWTAuth())
//! {
//!     systemUserGroup := privateGroup.Group("system/user")
//!     { ... }
//!                                   <- new group is spliced here
//! }
//!
//! global.LV_LOG.Info("router register success")
//! ```
//!
//! The file is not pattern-matched as plain text. A small lexer masks out
//! strings, raw strings, runes and comments, the block after the
//! `privateGroup` declaration is brace-matched, and the route-group
//! declarations inside it are listed. Only the bytes of the inserted block
//! change; everything else is written back as it was read.
//!
//! Every patch and revert in the process is serialized by one lock.

use lvgen_core::{GenError, GenResult, ResultExt};
use lvgen_ir::GenerateConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Identifier of the authenticated route group.
pub const PRIVATE_GROUP: &str = "privateGroup";

const ANCHOR: &str = "privateGroup := …; { … }";

static ROUTER_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Lexer
// ============================================================================

/// `mask[i]` is true when byte `i` is code, false inside a string, raw
/// string, rune literal or comment (delimiters included).
fn code_mask(src: &str) -> Vec<bool> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str,
        Raw,
        Rune,
        LineComment,
        BlockComment,
    }

    let bytes = src.as_bytes();
    let mut mask = vec![true; bytes.len()];
    let mut state = State::Code;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        match state {
            State::Code => match (b, next) {
                (b'/', Some(b'/')) => {
                    state = State::LineComment;
                    mask[i] = false;
                }
                (b'/', Some(b'*')) => {
                    state = State::BlockComment;
                    mask[i] = false;
                    mask[i + 1] = false;
                    i += 1;
                }
                (b'"', _) => {
                    state = State::Str;
                    mask[i] = false;
                }
                (b'`', _) => {
                    state = State::Raw;
                    mask[i] = false;
                }
                (b'\'', _) => {
                    state = State::Rune;
                    mask[i] = false;
                }
                _ => {}
            },
            State::Str | State::Rune => {
                mask[i] = false;
                let close = if state == State::Str { b'"' } else { b'\'' };
                if b == b'\\' && next.is_some() {
                    mask[i + 1] = false;
                    i += 1;
                } else if b == close || b == b'\n' {
                    state = State::Code;
                }
            }
            State::Raw => {
                mask[i] = false;
                if b == b'`' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    mask[i] = false;
                }
            }
            State::BlockComment => {
                mask[i] = false;
                if b == b'*' && next == Some(b'/') {
                    mask[i + 1] = false;
                    i += 1;
                    state = State::Code;
                }
            }
        }
        i += 1;
    }
    mask
}

// ============================================================================
// RouterFile
// ============================================================================

/// One `<ident> := privateGroup.Group("<path>")` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGroup {
    pub ident: String,
    pub path: String,
}

/// A parsed router source.
#[derive(Debug, Clone)]
pub struct RouterFile {
    text: String,
    /// Byte offset of the `}` closing the authenticated block
    block_close: usize,
    groups: Vec<RouteGroup>,
}

impl RouterFile {
    /// Parse router source text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// `GenError::PatchAnchorNotFound` if there is no `privateGroup`
    /// declaration followed by a balanced block.
    pub fn parse(path: &Path, text: String) -> GenResult<Self> {
        let not_found = || GenError::PatchAnchorNotFound {
            path: path.to_path_buf(),
            anchor: ANCHOR.to_string(),
        };
        let mask = code_mask(&text);
        let bytes = text.as_bytes();

        let declaration =
            Regex::new(&format!(r"\b{}\s*:=", PRIVATE_GROUP)).with_context("router parse")?;
        let decl_end = declaration
            .find_iter(&text)
            .find(|m| mask[m.start()])
            .map(|m| m.end())
            .ok_or_else(not_found)?;

        // First `{` outside any call parentheses opens the block.
        let mut parens = 0usize;
        let mut block_open = None;
        for (i, &b) in bytes.iter().enumerate().skip(decl_end) {
            if !mask[i] {
                continue;
            }
            match b {
                b'(' => parens += 1,
                b')' => parens = parens.saturating_sub(1),
                b'{' if parens == 0 => {
                    block_open = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let block_open = block_open.ok_or_else(not_found)?;

        let mut depth = 0usize;
        let mut block_close = None;
        for (i, &b) in bytes.iter().enumerate().skip(block_open) {
            if !mask[i] {
                continue;
            }
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        block_close = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let block_close = block_close.ok_or_else(not_found)?;

        let group = Regex::new(&format!(
            r#"(\w+)\s*:=\s*{}\s*\.\s*Group\s*\(\s*(?:"([^"]*)"|`([^`]*)`)"#,
            PRIVATE_GROUP
        ))
        .with_context("router parse")?;

        let body = &text[block_open..block_close];
        let groups = group
            .captures_iter(body)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if !mask[block_open + whole.start()] {
                    return None;
                }
                let path = caps.get(2).or_else(|| caps.get(3))?.as_str();
                Some(RouteGroup {
                    ident: caps[1].to_string(),
                    path: path.trim_matches('/').to_string(),
                })
            })
            .collect();

        Ok(Self {
            text,
            block_close,
            groups,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    /// A module counts as registered when its group identifier or its route
    /// path is already declared.
    pub fn is_registered(&self, ident: &str, route_path: &str) -> bool {
        let route_path = route_path.trim_matches('/');
        self.groups
            .iter()
            .any(|g| g.ident == ident || g.path == route_path)
    }

    /// Text with `snippet` spliced in as the last statement of the
    /// authenticated block, one indent level deeper than its closing brace.
    pub fn with_block(&self, snippet: &str) -> String {
        let close = self.block_close;
        let line_start = self.text[..close].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.text[line_start..close];
        let brace_on_own_line = prefix.chars().all(|c| c == ' ' || c == '\t');

        let (insert_at, outer_indent) = if brace_on_own_line {
            (line_start, prefix.to_string())
        } else {
            (close, String::new())
        };
        let inner_indent = format!("{}\t", outer_indent);

        let mut block = String::with_capacity(snippet.len() + 64);
        if !brace_on_own_line {
            block.push('\n');
        }
        block.push('\n');
        for line in snippet.trim_end().lines() {
            if line.trim().is_empty() {
                block.push('\n');
            } else {
                block.push_str(&inner_indent);
                block.push_str(line);
                block.push('\n');
            }
        }
        if !brace_on_own_line {
            block.push_str(&outer_indent);
        }

        let mut out = String::with_capacity(self.text.len() + block.len());
        out.push_str(&self.text[..insert_at]);
        out.push_str(&block);
        out.push_str(&self.text[insert_at..]);
        out
    }
}

// ============================================================================
// RouterPatcher
// ============================================================================

/// What a patch call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The group was added; both texts are kept so the patch can be reverted.
    Patched { original: String, patched: String },
    /// The module was already registered; the file was not touched.
    AlreadyRegistered,
}

impl PatchOutcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, PatchOutcome::Patched { .. })
    }
}

/// Patches one router file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterPatcher {
    path: PathBuf,
}

impl RouterPatcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the router file without changing it.
    pub fn inspect(&self) -> GenResult<RouterFile> {
        let text = self.read()?;
        RouterFile::parse(&self.path, text)
    }

    /// Register the module's route group unless it is already present.
    ///
    /// # Errors
    ///
    /// `GenError::Template` if the snippet does not declare the module's
    /// group on `privateGroup`, since a rerun could not recognise it. The
    /// file is left untouched.
    pub fn patch(&self, config: &GenerateConfig, snippet: &str) -> GenResult<PatchOutcome> {
        let _guard = ROUTER_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let router = RouterFile::parse(&self.path, self.read()?)?;
        let ident = config.route_group_ident();
        if router.is_registered(&ident, &config.route_path()) {
            tracing::info!(
                router = %self.path.display(),
                group = %ident,
                "route group already registered, router left unchanged",
            );
            return Ok(PatchOutcome::AlreadyRegistered);
        }

        let patched = router.with_block(snippet);
        let route_path = config.route_path();
        if !RouterFile::parse(&self.path, patched.clone())?.is_registered(&ident, &route_path) {
            return Err(GenError::template(
                "routes",
                format!(
                    "snippet declares neither {} nor group \"{}\" on {}",
                    ident, route_path, PRIVATE_GROUP
                ),
            ));
        }
        self.write(&patched)?;
        tracing::info!(
            router = %self.path.display(),
            group = %ident,
            existing_groups = router.groups().len(),
            "route group registered",
        );
        Ok(PatchOutcome::Patched {
            original: router.text,
            patched,
        })
    }

    /// Put `original` back, but only if the file still holds exactly what
    /// the patch wrote. Returns whether the file was restored.
    pub fn revert(&self, original: &str, patched: &str) -> GenResult<bool> {
        let _guard = ROUTER_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let current = self.read()?;
        if current != patched {
            tracing::warn!(
                router = %self.path.display(),
                "router changed since it was patched, not reverting",
            );
            return Ok(false);
        }
        self.write(original)?;
        Ok(true)
    }

    fn read(&self) -> GenResult<String> {
        std::fs::read_to_string(&self.path).read_context(&self.path)
    }

    fn write(&self, text: &str) -> GenResult<()> {
        std::fs::write(&self.path, text).write_context(&self.path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lvgen_ir::{ConfigBuilder, InferenceEngine, RawColumn, TableInfo};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const ROUTER: &str = r#"package router

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

    const SNIPPET: &str = "// Articles routes (generated)\narticleApi := v1.ArticleApi{}\narticleGroup := privateGroup.Group(\"blog/article\")\n{\n\tarticleGroup.GET(\"list\", articleApi.GetList)\n}\n";

    fn config() -> GenerateConfig {
        let columns = InferenceEngine::default().infer_all(&[RawColumn::new("title", "varchar")]);
        ConfigBuilder::new(TableInfo::new("lv_articles", "Articles"), columns)
            .package_name("blog")
            .build()
            .unwrap()
    }

    fn router_in(dir: &TempDir, text: &str) -> RouterPatcher {
        let path = dir.path().join("router.go");
        std::fs::write(&path, text).unwrap();
        RouterPatcher::new(path)
    }

    #[test]
    fn test_lexer_masks_strings_and_comments() {
        let src = "a \"{\" b `}` c '{' // }\nd /* { */ e";
        let mask = code_mask(src);
        let code: String = src
            .char_indices()
            .filter(|(i, _)| mask[*i])
            .map(|(_, c)| c)
            .collect();
        assert_eq!(code, "a  b  c  \nd  e");
    }

    #[test]
    fn test_parse_finds_private_groups() {
        let router = RouterFile::parse(Path::new("router.go"), ROUTER.to_string()).unwrap();
        assert_eq!(
            router.groups(),
            &[RouteGroup {
                ident: "systemUserGroup".into(),
                path: "system/user".into(),
            }]
        );
        assert!(router.is_registered("systemUserGroup", "x"));
        assert!(router.is_registered("other", "/system/user"));
        assert!(!router.is_registered("articleGroup", "blog/article"));
    }

    #[test]
    fn test_splice_before_closing_brace() {
        let router = RouterFile::parse(Path::new("router.go"), ROUTER.to_string()).unwrap();
        let patched = router.with_block(SNIPPET);

        let expected_tail = "\t\t}\n\
            \n\
            \t\t// Articles routes (generated)\n\
            \t\tarticleApi := v1.ArticleApi{}\n\
            \t\tarticleGroup := privateGroup.Group(\"blog/article\")\n\
            \t\t{\n\
            \t\t\tarticleGroup.GET(\"list\", articleApi.GetList)\n\
            \t\t}\n\
            \t}\n\
            \n\
            \tglobal.LV_LOG.Info(\"router register success\")\n\
            }\n";
        assert!(patched.ends_with(expected_tail), "{patched}");

        // Everything before the insertion point is untouched.
        let insert_at = ROUTER.rfind("\t}\n\n\tglobal").unwrap();
        assert_eq!(&patched[..insert_at], &ROUTER[..insert_at]);
    }

    #[test]
    fn test_patch_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, ROUTER);

        let first = patcher.patch(&config(), SNIPPET).unwrap();
        assert!(first.is_patched());
        let once = std::fs::read_to_string(patcher.path()).unwrap();

        let second = patcher.patch(&config(), SNIPPET).unwrap();
        assert_eq!(second, PatchOutcome::AlreadyRegistered);
        assert_eq!(std::fs::read_to_string(patcher.path()).unwrap(), once);
        assert_eq!(once.matches("articleGroup := privateGroup.Group").count(), 1);
    }

    #[test]
    fn test_missing_anchor() {
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, "package router\n\nfunc InitRouter() {}\n");
        let err = patcher.patch(&config(), SNIPPET).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::PatchAnchorNotFound);

        let unbalanced = router_in(&dir, "privateGroup := r.Group(\"\")\n{\n\tfoo()\n");
        let err = unbalanced.patch(&config(), SNIPPET).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::PatchAnchorNotFound);
    }

    #[test]
    fn test_commented_declaration_is_ignored() {
        let text = "// privateGroup := r.Group(\"\") {\n";
        let err = RouterFile::parse(Path::new("r.go"), text.to_string()).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::PatchAnchorNotFound);
    }

    #[test]
    fn test_revert_only_if_unchanged() {
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, ROUTER);

        let PatchOutcome::Patched { original, patched } = patcher.patch(&config(), SNIPPET).unwrap()
        else {
            panic!("expected a patch");
        };
        assert!(patcher.revert(&original, &patched).unwrap());
        assert_eq!(std::fs::read_to_string(patcher.path()).unwrap(), ROUTER);

        let PatchOutcome::Patched { original, patched } = patcher.patch(&config(), SNIPPET).unwrap()
        else {
            panic!("expected a patch");
        };
        std::fs::write(patcher.path(), format!("{patched}// edited\n")).unwrap();
        assert!(!patcher.revert(&original, &patched).unwrap());
    }

    #[test]
    fn test_brace_sharing_a_line() {
        let text = "privateGroup := r.Group(\"\")\n{ privateGroup.GET(\"/a\", h) }\n";
        let router = RouterFile::parse(Path::new("r.go"), text.to_string()).unwrap();
        let patched = router.with_block("xGroup := privateGroup.Group(\"p/x\")\n");
        assert_eq!(
            patched,
            "privateGroup := r.Group(\"\")\n{ privateGroup.GET(\"/a\", h) \n\n\txGroup := privateGroup.Group(\"p/x\")\n}\n"
        );
        let reparsed = RouterFile::parse(Path::new("r.go"), patched).unwrap();
        assert!(reparsed.is_registered("xGroup", ""));
    }

    #[test]
    fn test_renamed_group_still_recognised_by_path() {
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, ROUTER);
        let snippet = SNIPPET.replace("articleGroup", "postsGroup");

        assert!(patcher.patch(&config(), &snippet).unwrap().is_patched());
        assert_eq!(
            patcher.patch(&config(), &snippet).unwrap(),
            PatchOutcome::AlreadyRegistered
        );
    }

    #[test]
    fn test_unrecognisable_snippet_is_rejected() {
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, ROUTER);
        let snippet = "authed := privateGroup\narticles := authed.Group(\"blog/article\")\n";

        let err = patcher.patch(&config(), snippet).unwrap_err();
        assert_eq!(err.kind(), lvgen_core::ErrorKind::Template);
        assert!(err.to_string().contains("articleGroup"), "{err}");
        assert_eq!(std::fs::read_to_string(patcher.path()).unwrap(), ROUTER);
    }

    #[test]
    fn test_concurrent_patches_are_serialized() {
        const MODULES: usize = 16;
        let dir = TempDir::new().unwrap();
        let patcher = router_in(&dir, ROUTER);
        let before = patcher.inspect().unwrap().groups().len();

        std::thread::scope(|scope| {
            for i in 0..MODULES {
                let path = patcher.path().to_path_buf();
                scope.spawn(move || {
                    let module = format!("item{i}");
                    let columns = InferenceEngine::default().infer_all(&[RawColumn::new("title", "varchar")]);
                    let config = ConfigBuilder::new(TableInfo::new("lv_items", "Items"), columns)
                        .module_name(&module)
                        .package_name("biz")
                        .build()
                        .unwrap();
                    let snippet = format!(
                        "{module}Group := privateGroup.Group(\"biz/{module}\")\n{{\n\t{module}Group.GET(\"list\", h)\n}}\n"
                    );
                    let outcome = RouterPatcher::new(path).patch(&config, &snippet).unwrap();
                    assert!(outcome.is_patched());
                });
            }
        });

        let text = std::fs::read_to_string(patcher.path()).unwrap();
        for i in 0..MODULES {
            let declaration = format!("item{i}Group := privateGroup.Group(");
            assert_eq!(text.matches(&declaration).count(), 1, "{declaration}");
        }
        let router = patcher.inspect().unwrap();
        assert_eq!(router.groups().len(), before + MODULES);
        assert!(text.ends_with("\tglobal.LV_LOG.Info(\"router register success\")\n}\n"));
    }
}
