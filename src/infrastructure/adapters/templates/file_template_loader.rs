//! File Template Loader - 从磁盘读取提示词模板
//!
//! 依次尝试每个根目录下的 `<name>.txt` 和 `<name>`，再尝试可执行文件所在目录。

use dashmap::DashMap;
use std::path::{Path, PathBuf};

use crate::application::ports::TemplateSourcePort;

/// 模板加载器配置
#[derive(Debug, Clone)]
pub struct FileTemplateLoaderConfig {
    pub dirs: Vec<PathBuf>,
    pub cache: bool,
    /// 是否追加可执行文件所在目录作为候选
    pub search_exe_dir: bool,
}

impl Default for FileTemplateLoaderConfig {
    fn default() -> Self {
        Self {
            dirs: vec![
                PathBuf::from("prompts"),
                PathBuf::from("lib/prompts"),
                PathBuf::from("."),
            ],
            cache: true,
            search_exe_dir: true,
        }
    }
}

/// 文件模板加载器
pub struct FileTemplateLoader {
    config: FileTemplateLoaderConfig,
    cache: DashMap<String, String>,
}

impl FileTemplateLoader {
    pub fn new(config: FileTemplateLoaderConfig) -> Self {
        Self {
            config,
            cache: DashMap::new(),
        }
    }

    /// 所有候选路径（按优先级）
    fn candidates(&self, name: &str) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self.config.dirs.clone();
        if self.config.search_exe_dir {
            if let Some(exe_dir) = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(Path::to_path_buf))
            {
                roots.extend(self.config.dirs.iter().map(|d| exe_dir.join(d)));
            }
        }

        roots
            .iter()
            .flat_map(|root| [root.join(format!("{}.txt", name)), root.join(name)])
            .collect()
    }
}

impl TemplateSourcePort for FileTemplateLoader {
    fn load(&self, name: &str) -> String {
        if self.config.cache {
            if let Some(cached) = self.cache.get(name) {
                return cached.clone();
            }
        }

        let candidates = self.candidates(name);
        for path in &candidates {
            if !path.is_file() {
                continue;
            }
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    tracing::debug!(
                        template = %name,
                        path = %path.display(),
                        chars = content.chars().count(),
                        "Prompt template loaded"
                    );
                    if self.config.cache {
                        self.cache.insert(name.to_string(), content.clone());
                    }
                    return content;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to read template");
                }
            }
        }

        let attempted: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        tracing::error!(
            template = %name,
            attempted = %attempted.join(", "),
            "Prompt template not found"
        );
        String::new()
    }
}
