//! Template Source Port - 提示词模板读取

/// 模板来源
///
/// `load` 是全函数：任何失败都返回空字符串（并记录日志），调用方据此改用内置提示词。
pub trait TemplateSourcePort: Send + Sync {
    fn load(&self, name: &str) -> String;
}

/// 模板名称
pub mod names {
    pub const OUTLINE: &str = "SEO記事構成プロンプト";
    pub const OUTLINE_EXAMPLES: &str = "記事構成のお手本集";
    pub const TITLES: &str = "SEO記事タイトルプロンプト";
    pub const WRITING: &str = "SEO記事執筆プロンプト";
    pub const WRITING_KNOWLEDGE: &str = "執筆プロンプトに反映したいこと";
    pub const INTERNAL_LINKS: &str = "内部リンクプロンプト";
    pub const SALES_LOCATIONS: &str = "セールス箇所特定のプロンプト";
    pub const FINISHING: &str = "導入文・セールス文・まとめ文・ディスクリプションのプロンプト";
    pub const INTRO_EXAMPLE: &str = "導入文のお手本";
    pub const SALES_EXAMPLE: &str = "セールス文のお手本";
    pub const SUMMARY_EXAMPLE: &str = "まとめ文のお手本";
    pub const DESCRIPTION_EXAMPLE: &str = "ディスクリプションのお手本";
    pub const SUPERVISOR: &str = "監修者吹き出しプロンプト";
    pub const WORDPRESS: &str = "ワードプレス入稿プロンプト";
}
