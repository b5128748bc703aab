//! 模型输出清洗
//!
//! 优先取信封标记之间的内容；模型没有遵守信封时，退回到按任务定义的正则级联，
//! 删除分析报告、确认提问、分隔线等常见的多余输出。

use once_cell::sync::Lazy;
use regex::Regex;

use super::prompts::{OUTPUT_BEGIN, OUTPUT_END};
use super::MutationKind;

/// 取信封内的文本；缺少结束标记时取开始标记之后的全部
pub fn unwrap_envelope(raw: &str) -> Option<&str> {
    let start = raw.find(OUTPUT_BEGIN)? + OUTPUT_BEGIN.len();
    let inner = &raw[start..];
    let inner = match inner.find(OUTPUT_END) {
        Some(end) => &inner[..end],
        None => inner,
    };
    Some(inner.trim())
}

/// 无特别清洗规则的任务：信封或原文，去首尾空白
pub fn sanitize_plain(raw: &str) -> String {
    unwrap_envelope(raw)
        .unwrap_or(raw)
        .replace(OUTPUT_END, "")
        .trim()
        .to_string()
}

// ============================================================================
// 大纲
// ============================================================================

const OUTLINE_PREAMBLE: &str = "すべての情報収集が完了しました。";

static SUMMARY_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:H2[:：]|^##)\s*まとめ").unwrap());

static TRAILING_SECTIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(▼\s*)?(H2[:：]\s*(FAQ|よくある質問|Q&A)|FAQ|よくある質問|Q&A|外部引用・統計データ候補|外部引用|統計データ)",
    )
    .unwrap()
});

static HEADING_MARKUP_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(#{1,6}\s*|H[234][:：]\s*|[-*・]\s*)?$").unwrap());

/// 删除「すべての情報収集が完了しました。」起到下一个标题为止的前言
fn strip_outline_preamble(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(OUTLINE_PREAMBLE) {
        let after = &rest[pos + OUTLINE_PREAMBLE.len()..];
        match next_outline_anchor(after) {
            Some(anchor) => {
                out.push_str(&rest[..pos]);
                rest = &after[anchor..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn next_outline_anchor(text: &str) -> Option<usize> {
    let upper = text.to_ascii_uppercase();
    ["#", "H2:", "タイトル"]
        .iter()
        .filter_map(|needle| upper.find(needle))
        .min()
}

/// 大纲清洗：去前言；有 まとめ 则截到 まとめ 行，否则在 FAQ / 外部引用 处截断
pub fn sanitize_outline(raw: &str) -> String {
    let body = sanitize_plain(raw);
    let text = strip_outline_preamble(&body);

    let lines: Vec<&str> = text.lines().collect();
    if let Some(idx) = lines.iter().position(|l| SUMMARY_HEADING.is_match(l.trim())) {
        return lines[..=idx].join("\n").trim().to_string();
    }

    match TRAILING_SECTIONS.find(&text) {
        Some(m) => cut_at_line_markup(&text, m.start()).trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// 截断位置之前同一行只有标题记号时，连同记号一起截掉
fn cut_at_line_markup(text: &str, at: usize) -> &str {
    let line_start = text[..at].rfind('\n').map(|i| i + 1).unwrap_or(0);
    if HEADING_MARKUP_ONLY.is_match(&text[line_start..at]) {
        &text[..line_start]
    } else {
        &text[..at]
    }
}

// ============================================================================
// 改写类任务
// ============================================================================

fn cascade(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

static LINK_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    cascade(&[
        r"(?s)記事を分析し、内部リンクの挿入箇所を提案します。.*?【内部リンク挿入提案】",
        r"(?s)【分析結果】.*?【内部リンク挿入提案】",
        r"(?s)検出した見出し数[:：].*?選定した関連記事[:：]",
        r"(?s)提案内容は適切でしたか[?？].*?削除すべきリンク提案はありますか[?？]",
        r"追加でリンクを検討すべき箇所はありますか[?？]",
        r"削除すべきリンク提案はありますか[?？]",
        r"(?s)提案内容は以上です。.*$",
        r"(?m)^---+$",
    ])
});

static SALES_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    cascade(&[
        r"(?s)記事を分析し、セールス箇所を特定します。.*?【セールス箇所提案】",
        r"(?s)【分析結果】.*?【セールス箇所提案】",
        r"(?s)提案内容は適切でしたか[?？].*$",
        r"(?m)^---+$",
    ])
});

static SUPERVISOR_CHATTER: Lazy<Vec<Regex>> = Lazy::new(|| {
    cascade(&[
        r"(?s)記事を分析し、監修者の吹き出しを挿入します。.*?【監修者コメント挿入】",
        r"(?s)【分析結果】.*?【監修者コメント挿入】",
        r"(?s)提案内容は適切でしたか[?？].*$",
        r"(?m)^---+$",
    ])
});

static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6}\s+|(?i:H[234])[:：])").unwrap());

fn chatter(kind: MutationKind) -> &'static [Regex] {
    match kind {
        MutationKind::InternalLinks => &LINK_CHATTER,
        MutationKind::SalesLocations => &SALES_CHATTER,
        MutationKind::SupervisorComments => &SUPERVISOR_CHATTER,
    }
}

/// 改写类任务清洗
///
/// `original` 为发送给模型的原文部分，用于判断开头的标题行是否属于原文。
pub fn sanitize_mutation(raw: &str, kind: MutationKind, original: &str) -> String {
    let body = match unwrap_envelope(raw) {
        Some(inner) => inner.to_string(),
        None => chatter(kind)
            .iter()
            .fold(raw.to_string(), |acc, re| re.replace_all(&acc, "").into_owned()),
    };
    strip_leading_headings(&body, original)
}

/// 删除模型在正文前回显的标题行（原文本身以该行开头时保留）
pub fn strip_leading_headings(candidate: &str, original: &str) -> String {
    let original_first = original
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");

    let mut lines = candidate.lines().peekable();
    while let Some(line) = lines.peek() {
        let trimmed = line.trim();
        let echoed_heading = HEADING_LINE.is_match(trimmed) && trimmed != original_first;
        if trimmed.is_empty() || echoed_heading {
            lines.next();
        } else {
            break;
        }
    }
    lines.collect::<Vec<_>>().join("\n").trim().to_string()
}

// ============================================================================
// HTML
// ============================================================================

static FENCED_HTML: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```html\s*(.*?)```").unwrap());
static FENCED_ANY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)```\s*(.*?)```").unwrap());
static HTML_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)^.*?# WordPress Gutenberg用HTML変換完了.*?以下、そのままWordPressのコードエディタに貼り付け可能なHTMLです。\s*(```html\s*)?",
    )
    .unwrap()
});

const HTML_TAIL_MARKERS: [&str; 4] = [
    "---",
    "## ✅ 変換完了チェックリスト",
    "## 📝 貼り付け手順",
    "このままご使用いただけます！",
];

/// 从模型回复中提取 HTML；找不到任何标签时返回空字符串
pub fn extract_html(raw: &str) -> String {
    if let Some(c) = FENCED_HTML.captures(raw).or_else(|| FENCED_ANY.captures(raw)) {
        let inner = c.get(1).map(|m| m.as_str().trim()).unwrap_or("");
        if inner.contains('<') {
            return inner.to_string();
        }
    }

    let text = HTML_HEADER.replace(raw, "");
    let cut = HTML_TAIL_MARKERS
        .iter()
        .filter_map(|m| text.find(m))
        .min()
        .unwrap_or(text.len());
    let html = text[..cut].trim();

    if html.contains('<') {
        html.to_string()
    } else {
        String::new()
    }
}
