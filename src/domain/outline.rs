//! 大纲解析
//!
//! 逐行状态机：H2 开启新段落，H3/H4（以及 `- ` 条目）追加为小标题，
//! 其余非空行记入段落的大纲正文，第一个 H2 之前的内容丢弃。
//!
//! 段落身份由稳定 ID 维持：标题可以携带 `{#key}` 后缀，
//! 重新解析时先按 key 匹配，再按完全相同的标题匹配。

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::article::{HeadingLevel, Section, SectionId, SubHeading};

static H2_LABELLED_MD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^##\s*H2[:：]\s*(.+)$").unwrap());
static H4_MD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^####\s+(.+)$").unwrap());
static H3_MD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^###\s+(.+)$").unwrap());
static H2_MD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^##\s+(.+)$").unwrap());
static H2_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^H2[:：]\s*(.+)$").unwrap());
static H3_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^H3[:：]\s*(.+)$").unwrap());
static H4_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^H4[:：]\s*(.+)$").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\s*(.+)$").unwrap());

static LEVEL_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^H[234][:：]\s*").unwrap());
static KEY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*\{#([A-Za-z0-9_-]{1,64})\}$").unwrap());

/// 整篇扫描用的多行正则（与逐行状态机相互独立）
static HEADING_SCAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?mi)^[ \t]*(?:(?P<h2l>##[ \t]*H2[:：])|(?P<h4>####)[ \t]|(?P<h3>###)[ \t]|(?P<h2>##)[ \t]|(?P<h2b>H2[:：])|(?P<h3b>H3[:：])|(?P<h4b>H4[:：])|(?P<dash>-))[ \t]*(?P<title>[^\r\n]*?)[ \t\r]*$",
    )
    .unwrap()
});

/// 单行分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineLine {
    Heading(String),
    Sub(SubHeading),
    Body(String),
    Blank,
}

/// 解析出的段落（尚未分配 ID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSection {
    /// 大纲中显式携带的 `{#key}`
    pub key: Option<SectionId>,
    pub title: String,
    pub subheadings: Vec<SubHeading>,
    pub body: Vec<String>,
}

/// 对单行分类
pub fn classify_line(raw: &str) -> OutlineLine {
    let line = raw.trim();
    if line.is_empty() {
        return OutlineLine::Blank;
    }

    let capture = |re: &Regex| {
        re.captures(line)
            .and_then(|c| c.get(1))
            .map(|m| clean_title(m.as_str()))
            .filter(|t| !t.is_empty())
    };

    if let Some(title) = capture(&H2_LABELLED_MD) {
        return OutlineLine::Heading(title);
    }
    if let Some(title) = capture(&H4_MD).or_else(|| capture(&H4_LABEL)) {
        return OutlineLine::Sub(SubHeading::h4(title));
    }
    if let Some(title) = capture(&H3_MD).or_else(|| capture(&H3_LABEL)) {
        return OutlineLine::Sub(SubHeading::h3(title));
    }
    if let Some(title) = capture(&H2_MD).or_else(|| capture(&H2_LABEL)) {
        return OutlineLine::Heading(title);
    }
    if let Some(title) = capture(&BULLET) {
        return OutlineLine::Sub(SubHeading::h3(title));
    }
    OutlineLine::Body(line.to_string())
}

fn clean_title(raw: &str) -> String {
    LEVEL_LABEL.replace(raw.trim(), "").trim().to_string()
}

/// 拆分标题与 `{#key}` 后缀
pub fn split_key(title: &str) -> (String, Option<SectionId>) {
    match KEY_SUFFIX.captures(title) {
        Some(caps) => {
            let text = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            let key = caps.get(2).and_then(|m| SectionId::parse(m.as_str()).ok());
            if text.is_empty() {
                (title.to_string(), None)
            } else {
                (text.to_string(), key)
            }
        }
        None => (title.to_string(), None),
    }
}

/// 解析大纲
pub fn parse_outline(outline: &str) -> Vec<ParsedSection> {
    let mut sections = Vec::new();
    let mut current: Option<ParsedSection> = None;

    for raw in outline.lines() {
        match classify_line(raw) {
            OutlineLine::Heading(heading) => {
                if let Some(done) = current.take() {
                    sections.push(done);
                }
                let (title, key) = split_key(&heading);
                current = Some(ParsedSection {
                    key,
                    title,
                    subheadings: Vec::new(),
                    body: Vec::new(),
                });
            }
            OutlineLine::Sub(sub) => {
                if let Some(section) = current.as_mut() {
                    section.subheadings.push(sub);
                }
            }
            OutlineLine::Body(text) => {
                if let Some(section) = current.as_mut() {
                    section.body.push(text);
                }
            }
            OutlineLine::Blank => {}
        }
    }

    if let Some(done) = current {
        sections.push(done);
    }
    sections
}

/// 直接扫描整篇大纲得到标题序列（第一个 H2 之前的标题不计）
pub fn scan_headings(outline: &str) -> Vec<(HeadingLevel, String)> {
    let mut out = Vec::new();
    let mut seen_h2 = false;

    for caps in HEADING_SCAN.captures_iter(outline) {
        let title = caps.name("title").map(|m| clean_title(m.as_str())).unwrap_or_default();
        if title.is_empty() {
            continue;
        }
        let level = if caps.name("h2l").is_some() || caps.name("h2").is_some() || caps.name("h2b").is_some() {
            HeadingLevel::H2
        } else if caps.name("h4").is_some() || caps.name("h4b").is_some() {
            HeadingLevel::H4
        } else {
            HeadingLevel::H3
        };

        if level == HeadingLevel::H2 {
            seen_h2 = true;
            out.push((level, split_key(&title).0));
        } else if seen_h2 {
            out.push((level, title));
        }
    }
    out
}

/// 解析结果展开为标题序列
pub fn heading_sequence(sections: &[ParsedSection]) -> Vec<(HeadingLevel, String)> {
    let mut out = Vec::new();
    for section in sections {
        out.push((HeadingLevel::H2, section.title.clone()));
        for sub in &section.subheadings {
            out.push((sub.level, sub.title.clone()));
        }
    }
    out
}

/// 以 Markdown 形式重新输出大纲，H2 附带稳定 key
pub fn render_outline(sections: &[Section]) -> String {
    let mut lines = Vec::new();
    for section in sections {
        lines.push(format!("## {} {{#{}}}", section.title, section.id));
        for sub in &section.subheadings {
            lines.push(format!("{} {}", sub.level.markdown_prefix(), sub.title));
        }
        lines.extend(section.outline_body.iter().cloned());
    }
    lines.join("\n")
}

/// 合并结果
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub sections: Vec<Section>,
    /// 找不到对应标题、但带有用户内容的旧段落
    pub orphaned: Vec<Section>,
    pub reused: usize,
    pub created: usize,
}

/// 将新解析的段落与已有段落合并
///
/// 匹配顺序：显式 key → 完全相同的标题。匹配成功的段落沿用原 ID、正文、指示和 HTML；
/// 未被匹配且带有内容的旧段落作为 orphaned 返回，由调用方记录为冲突。
pub fn merge_sections(existing: Vec<Section>, parsed: Vec<ParsedSection>) -> MergeOutcome {
    let mut pool: Vec<Option<Section>> = existing.into_iter().map(Some).collect();
    let mut used: HashSet<SectionId> = HashSet::new();
    let mut outcome = MergeOutcome::default();

    for item in parsed {
        let by_key = item.key.as_ref().and_then(|key| {
            pool.iter()
                .position(|slot| slot.as_ref().map_or(false, |s| &s.id == key))
        });
        let matched = by_key.or_else(|| {
            pool.iter()
                .position(|slot| slot.as_ref().map_or(false, |s| s.title == item.title))
        });

        let mut section = match matched.and_then(|idx| pool[idx].take()) {
            Some(mut previous) => {
                outcome.reused += 1;
                previous.title = item.title;
                previous
            }
            None => {
                outcome.created += 1;
                let id = match item.key {
                    Some(key) if !used.contains(&key) => key,
                    _ => SectionId::new(),
                };
                Section::new(id, item.title)
            }
        };

        if used.contains(&section.id) {
            section.id = SectionId::new();
        }
        section.subheadings = item.subheadings;
        section.outline_body = item.body;
        used.insert(section.id.clone());
        outcome.sections.push(section);
    }

    outcome.orphaned = pool
        .into_iter()
        .flatten()
        .filter(|s| s.has_user_content())
        .collect();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn titles(sections: &[ParsedSection]) -> Vec<&str> {
        sections.iter().map(|s| s.title.as_str()).collect()
    }

    #[test]
    fn test_basic_scenario() {
        let parsed = parse_outline("## Introduction\n### Point A\n## Summary");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].title, "Introduction");
        assert_eq!(parsed[0].subheadings, vec![SubHeading::h3("Point A")]);
        assert_eq!(parsed[1].title, "Summary");
        assert!(parsed[1].subheadings.is_empty());
    }

    #[test]
    fn test_label_notation_case_insensitive() {
        let outline = "タイトル: 記事\nh2: Webライターとは\nH3：仕事内容\nh4: 詳細\n## H2: まとめ";
        let parsed = parse_outline(outline);
        assert_eq!(titles(&parsed), vec!["Webライターとは", "まとめ"]);
        assert_eq!(
            parsed[0].subheadings,
            vec![SubHeading::h3("仕事内容"), SubHeading::h4("詳細")]
        );
    }

    #[test]
    fn test_lines_before_first_heading_dropped() {
        let parsed = parse_outline("前置き\n### 迷子のH3\n## 本題\n説明文");
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].subheadings.is_empty());
        assert_eq!(parsed[0].body, vec!["説明文".to_string()]);
    }

    #[test]
    fn test_bullet_lines_become_h3() {
        let parsed = parse_outline("## 始め方\n- 準備\n- 実践");
        assert_eq!(
            parsed[0].subheadings,
            vec![SubHeading::h3("準備"), SubHeading::h3("実践")]
        );
    }

    #[test]
    fn test_key_suffix() {
        let parsed = parse_outline("## 始め方 {#start}\n### 準備");
        assert_eq!(parsed[0].title, "始め方");
        assert_eq!(parsed[0].key, Some(SectionId::parse("start").unwrap()));
    }

    #[test]
    fn test_merge_keeps_prose_by_title() {
        let mut old = Section::new(SectionId::parse("a").unwrap(), "始め方");
        old.prose = "書いた本文".to_string();

        let outcome = merge_sections(vec![old], parse_outline("## 導入\n## 始め方\n### 準備"));
        assert_eq!(outcome.sections.len(), 2);
        assert_eq!(outcome.sections[1].id.as_str(), "a");
        assert_eq!(outcome.sections[1].prose, "書いた本文");
        assert_eq!(outcome.sections[1].subheadings.len(), 1);
        assert!(outcome.orphaned.is_empty());
        assert_eq!(outcome.reused, 1);
        assert_eq!(outcome.created, 1);
    }

    #[test]
    fn test_merge_rename_with_key_keeps_identity() {
        let mut old = Section::new(SectionId::parse("a").unwrap(), "始め方");
        old.prose = "書いた本文".to_string();

        let outcome = merge_sections(vec![old], parse_outline("## 始め方ガイド {#a}"));
        assert_eq!(outcome.sections[0].title, "始め方ガイド");
        assert_eq!(outcome.sections[0].prose, "書いた本文");
        assert!(outcome.orphaned.is_empty());
    }

    #[test]
    fn test_merge_rename_without_key_reports_orphan() {
        let mut old = Section::new(SectionId::parse("a").unwrap(), "始め方");
        old.prose = "書いた本文".to_string();
        let empty = Section::new(SectionId::parse("b").unwrap(), "空の段落");

        let outcome = merge_sections(vec![old, empty], parse_outline("## 始め方ガイド"));
        assert_eq!(outcome.sections.len(), 1);
        assert!(outcome.sections[0].prose.is_empty());
        assert_eq!(outcome.orphaned.len(), 1);
        assert_eq!(outcome.orphaned[0].prose, "書いた本文");
    }

    #[test]
    fn test_merge_duplicate_keys_get_distinct_ids() {
        let outcome = merge_sections(Vec::new(), parse_outline("## A {#x}\n## B {#x}"));
        assert_eq!(outcome.sections.len(), 2);
        assert_ne!(outcome.sections[0].id, outcome.sections[1].id);
        assert_eq!(outcome.sections[0].id.as_str(), "x");
    }

    #[test]
    fn test_render_then_parse_keeps_ids() {
        let first = merge_sections(Vec::new(), parse_outline("## A\n### a1\n## B"));
        let rendered = render_outline(&first.sections);
        let second = merge_sections(first.sections.clone(), parse_outline(&rendered));
        let ids: Vec<_> = second.sections.iter().map(|s| s.id.clone()).collect();
        let original: Vec<_> = first.sections.iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, original);
        assert_eq!(second.reused, 2);
    }

    fn outline_line() -> impl Strategy<Value = String> {
        let text = "[a-zA-Zあ-ん0-9 ]{0,12}";
        prop_oneof![
            text.prop_map(|t| format!("## {}", t)),
            text.prop_map(|t| format!("H2: {}", t)),
            text.prop_map(|t| format!("### {}", t)),
            text.prop_map(|t| format!("h3：{}", t)),
            text.prop_map(|t| format!("#### {}", t)),
            text.prop_map(|t| format!("- {}", t)),
            text.prop_map(|t| t.to_string()),
            Just(String::new()),
        ]
    }

    proptest! {
        #[test]
        fn prop_parse_matches_direct_scan(lines in prop::collection::vec(outline_line(), 0..30)) {
            let outline = lines.join("\n");
            let parsed = parse_outline(&outline);
            prop_assert_eq!(heading_sequence(&parsed), scan_headings(&outline));
        }

        #[test]
        fn prop_render_roundtrip_preserves_headings(lines in prop::collection::vec(outline_line(), 0..30)) {
            let outline = lines.join("\n");
            let merged = merge_sections(Vec::new(), parse_outline(&outline));
            let reparsed = parse_outline(&render_outline(&merged.sections));
            prop_assert_eq!(heading_sequence(&reparsed), scan_headings(&outline));
        }
    }
}
