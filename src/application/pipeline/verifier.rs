//! 原文保留校验
//!
//! 改写类任务只允许插入，不允许删改。比较前先从双方文本中去掉本任务插入的内容，
//! 再把双方的空白全部去掉（日文正文中的换行和空格不影响内容）。

use crate::domain::markers::{has_internal_link, strip_citations, SupervisorTag, SALES_PLACEHOLDER};
use crate::domain::text::{head_chars, tail_chars, Truncated};

use super::MutationKind;

/// 边界比较的字符数
const BOUNDARY_CHARS: usize = 100;

/// 拒绝原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyOutput,
    MarkerMissing,
    BoundaryMismatch,
    LinesMissing,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::EmptyOutput => "empty output",
            RejectReason::MarkerMissing => "marker missing",
            RejectReason::BoundaryMismatch => "start or end of original changed",
            RejectReason::LinesMissing => "original lines missing",
        }
    }
}

/// 校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// 校验器
#[derive(Debug, Clone)]
pub struct ContentVerifier {
    supervisor: SupervisorTag,
}

impl ContentVerifier {
    pub fn new(supervisor: SupervisorTag) -> Self {
        Self { supervisor }
    }

    fn has_marker(&self, kind: MutationKind, text: &str) -> bool {
        match kind {
            MutationKind::InternalLinks => has_internal_link(text),
            MutationKind::SalesLocations => text.contains(SALES_PLACEHOLDER),
            MutationKind::SupervisorComments => self.supervisor.is_present(text),
        }
    }

    fn strip_insertions(&self, kind: MutationKind, text: &str) -> String {
        match kind {
            MutationKind::InternalLinks => strip_citations(text),
            MutationKind::SalesLocations => text.replace(SALES_PLACEHOLDER, ""),
            MutationKind::SupervisorComments => self
                .supervisor
                .strip_balloons(text)
                .replace(&self.supervisor.button(), ""),
        }
    }

    /// 校验候选文本是否完整保留了 `original`（发送给模型的部分）
    pub fn verify(&self, kind: MutationKind, original: &str, candidate: &str) -> Verdict {
        if candidate.trim().is_empty() {
            return Verdict::Rejected(RejectReason::EmptyOutput);
        }
        if !self.has_marker(kind, candidate) {
            return Verdict::Rejected(RejectReason::MarkerMissing);
        }

        let original = self.strip_insertions(kind, original);
        let stripped = squash(&self.strip_insertions(kind, candidate));
        let expected = squash(&original);

        let head = head_chars(&expected, BOUNDARY_CHARS);
        let tail = tail_chars(&expected, BOUNDARY_CHARS);
        if !stripped.contains(head) || !stripped.contains(tail) {
            return Verdict::Rejected(RejectReason::BoundaryMismatch);
        }

        let missing = original
            .lines()
            .map(squash)
            .filter(|l| !l.is_empty())
            .any(|l| !stripped.contains(&l));
        if missing {
            return Verdict::Rejected(RejectReason::LinesMissing);
        }

        Verdict::Accepted
    }
}

fn squash(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// 截断发送时，把未发送的部分接回模型结果之后
pub fn reassemble(candidate: &str, sent: &Truncated<'_>) -> String {
    if !sent.is_truncated() {
        return candidate.to_string();
    }
    let trailing = &sent.sent[sent.sent.trim_end().len()..];
    format!("{}{}{}", candidate.trim_end(), trailing, sent.rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::text::truncate_chars;
    use proptest::prelude::*;

    fn verifier() -> ContentVerifier {
        ContentVerifier::new(SupervisorTag::new("佐藤誠一"))
    }

    const ORIGINAL: &str = "Webライターは未経験でも始められます。\nまずはクラウドソーシングに登録しましょう。\n実績を積むと単価が上がります。";

    #[test]
    fn test_accepts_inserted_link() {
        let candidate = "Webライターは未経験でも始められます。\n参考記事：Webライターとは?(https://webwriter-school.net/webwriter/)\nまずはクラウドソーシングに登録しましょう。\n実績を積むと単価が上がります。";
        assert_eq!(
            verifier().verify(MutationKind::InternalLinks, ORIGINAL, candidate),
            Verdict::Accepted
        );
    }

    #[test]
    fn test_inline_citation_accepted_and_rewrite_rejected() {
        let original = "Paragraph one. Paragraph two.";
        let candidate = "Paragraph one. 参考記事：X (https://x.example/)\nParagraph two.";
        assert!(verifier()
            .verify(MutationKind::InternalLinks, original, candidate)
            .is_accepted());

        let rewritten = "A totally rewritten paragraph. 参考記事：X (https://x.example/)";
        assert_eq!(
            verifier().verify(MutationKind::InternalLinks, original, rewritten),
            Verdict::Rejected(RejectReason::BoundaryMismatch)
        );
    }

    #[test]
    fn test_rejects_missing_marker() {
        assert_eq!(
            verifier().verify(MutationKind::InternalLinks, ORIGINAL, ORIGINAL),
            Verdict::Rejected(RejectReason::MarkerMissing)
        );
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            verifier().verify(MutationKind::SalesLocations, ORIGINAL, "  \n"),
            Verdict::Rejected(RejectReason::EmptyOutput)
        );
    }

    #[test]
    fn test_rejects_summarised_output() {
        let candidate = format!("Webライターは未経験でも始められます。\n{}", SALES_PLACEHOLDER);
        assert_eq!(
            verifier().verify(MutationKind::SalesLocations, ORIGINAL, &candidate),
            Verdict::Rejected(RejectReason::BoundaryMismatch)
        );
    }

    #[test]
    fn test_rejects_dropped_middle_line() {
        let first = "あ".repeat(120);
        let last = "い".repeat(120);
        let original = format!("{}\nまずは登録しましょう。\n{}", first, last);
        let candidate = format!(
            "{}\n<佐藤誠一吹き出し>\n大事です\n</佐藤誠一吹き出し>\n{}",
            first, last
        );
        assert_eq!(
            verifier().verify(MutationKind::SupervisorComments, &original, &candidate),
            Verdict::Rejected(RejectReason::LinesMissing)
        );
    }

    #[test]
    fn test_accepts_inline_placeholder() {
        let candidate = format!(
            "Webライターは未経験でも始められます。まずはクラウドソーシングに登録しましょう。{}\n実績を積むと単価が上がります。",
            SALES_PLACEHOLDER
        );
        assert!(verifier()
            .verify(MutationKind::SalesLocations, ORIGINAL, &candidate)
            .is_accepted());
    }

    #[test]
    fn test_existing_placeholder_in_original_is_ignored() {
        let original = format!("{}\n{}", ORIGINAL, SALES_PLACEHOLDER);
        let candidate = format!(
            "Webライターは未経験でも始められます。\n{}\nまずはクラウドソーシングに登録しましょう。\n実績を積むと単価が上がります。",
            SALES_PLACEHOLDER
        );
        assert!(verifier()
            .verify(MutationKind::SalesLocations, &original, &candidate)
            .is_accepted());
    }

    #[test]
    fn test_reassemble_truncated() {
        let original = "一行目です。\n二行目です。\n三行目です。";
        let sent = truncate_chars(original, 7);
        assert_eq!(sent.sent, "一行目です。\n");
        let merged = reassemble(&format!("一行目です。\n{}", SALES_PLACEHOLDER), &sent);
        assert_eq!(merged, format!("一行目です。\n{}\n二行目です。\n三行目です。", SALES_PLACEHOLDER));
    }

    #[test]
    fn test_reassemble_untruncated() {
        let sent = truncate_chars("本文", 100);
        assert_eq!(reassemble("本文+", &sent), "本文+");
    }

    proptest! {
        #[test]
        fn prop_inserted_placeholder_is_accepted(
            lines in prop::collection::vec("[あ-ん]{1,20}", 1..8),
            at in 0usize..8,
        ) {
            let original = lines.join("\n");
            let mut with_marker = lines.clone();
            with_marker.insert(at.min(lines.len()), SALES_PLACEHOLDER.to_string());
            let candidate = with_marker.join("\n");
            prop_assert!(verifier()
                .verify(MutationKind::SalesLocations, &original, &candidate)
                .is_accepted());
        }

        #[test]
        fn prop_dropped_line_is_rejected(
            lines in prop::collection::vec("[あ-ん]{3,20}", 2..8),
            drop in 0usize..8,
        ) {
            let original = lines.join("\n");
            let victim = drop % lines.len();
            let victim_line = lines[victim].clone();
            let remaining: Vec<String> = lines
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != victim)
                .map(|(_, l)| l.clone())
                .collect();
            let candidate = format!("{}\n{}", remaining.join("\n"), SALES_PLACEHOLDER);
            prop_assume!(!squash(&candidate).contains(&victim_line));
            prop_assert!(!verifier()
                .verify(MutationKind::SalesLocations, &original, &candidate)
                .is_accepted());
        }
    }
}
