//! 导语 / 销售文 / まとめ / 摘要 的解析与回填

use serde::Serialize;

use crate::domain::markers::SALES_PLACEHOLDER;
use crate::domain::{Article, SectionId};

const INTRO: &str = "【導入文】";
const SALES: &str = "【セールス文】";
const SUMMARY: &str = "【まとめ文】";
const DESCRIPTION: &str = "【ディスクリプション】";
const HEADERS: [&str; 4] = [INTRO, SALES, SUMMARY, DESCRIPTION];

/// 单个段落的销售文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesCopy {
    pub block_id: String,
    pub copy: String,
}

/// 解析结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishingBundle {
    pub intro: String,
    pub sales: Vec<SalesCopy>,
    pub summary: String,
    pub description: String,
}

/// 回填统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishingReport {
    pub intro_updated: bool,
    pub summary_updated: bool,
    pub description_updated: bool,
    pub placeholders_filled: usize,
    /// 文章中找不到的段落 ID
    pub unknown_blocks: Vec<String>,
}

/// 取某个标题到下一个标题之间的内容
fn section_body<'a>(raw: &'a str, header: &str) -> &'a str {
    let Some(pos) = raw.find(header) else {
        return "";
    };
    let body = &raw[pos + header.len()..];
    let end = HEADERS
        .iter()
        .filter_map(|h| body.find(h))
        .min()
        .unwrap_or(body.len());
    body[..end].trim()
}

fn find_label(text: &str, label: &str) -> Option<(usize, usize)> {
    [format!("{}:", label), format!("{}：", label)]
        .iter()
        .filter_map(|l| text.find(l.as_str()).map(|pos| (pos, pos + l.len())))
        .min()
}

fn clean_copy(copy: &str) -> String {
    copy.replace(SALES_PLACEHOLDER, "")
        .lines()
        .filter(|l| !l.trim_start().starts_with("既存の文章"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn parse_sales(body: &str) -> Vec<SalesCopy> {
    let mut entries = Vec::new();
    let mut rest = body;

    while let Some((_, id_start)) = find_label(rest, "ブロックID") {
        let chunk = &rest[id_start..];
        let chunk_end = find_label(chunk, "ブロックID")
            .map(|(pos, _)| pos)
            .unwrap_or(chunk.len());
        let entry = &chunk[..chunk_end];
        rest = &chunk[chunk_end..];

        let block_id = entry
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches(|c| matches!(c, '[' | ']' | '［' | '］'))
            .trim()
            .to_string();
        let Some((_, copy_start)) = find_label(entry, "セールス文") else {
            continue;
        };
        let copy = clean_copy(&entry[copy_start..]);
        if !block_id.is_empty() && !copy.is_empty() {
            entries.push(SalesCopy { block_id, copy });
        }
    }
    entries
}

/// 解析模型按四个标题分段的回复
pub fn parse_finishing(raw: &str) -> FinishingBundle {
    FinishingBundle {
        intro: section_body(raw, INTRO).to_string(),
        sales: parse_sales(section_body(raw, SALES)),
        summary: section_body(raw, SUMMARY).to_string(),
        description: section_body(raw, DESCRIPTION).to_string(),
    }
}

impl FinishingBundle {
    pub fn is_empty(&self) -> bool {
        self.intro.is_empty()
            && self.sales.is_empty()
            && self.summary.is_empty()
            && self.description.is_empty()
    }

    /// 回填到文章：导语、摘要、まとめ 段落、销售占位符
    pub fn apply(&self, article: &mut Article) -> FinishingReport {
        let mut report = FinishingReport::default();

        if !self.intro.is_empty() {
            article.intro = self.intro.clone();
            report.intro_updated = true;
        }
        if !self.description.is_empty() {
            article.description = self.description.clone();
            report.description_updated = true;
        }
        if !self.summary.is_empty() {
            if let Some(section) = article.summary_section_mut() {
                section.prose = self.summary.clone();
                report.summary_updated = true;
            }
        }

        for entry in &self.sales {
            let filled = SectionId::parse(&entry.block_id)
                .ok()
                .and_then(|id| article.fill_sales_copy(&id, &entry.copy).ok());
            match filled {
                Some(count) => report.placeholders_filled += count,
                None => report.unknown_blocks.push(entry.block_id.clone()),
            }
        }

        report
    }
}
