//! 标题候选提取

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::text::char_len;

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)[\.．]\s*(.+)$").unwrap());
static CATEGORY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^【.+】").unwrap());
static BARE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// 从模型回复中提取字符数在 `[min, max]` 内的标题
///
/// 编号行取编号后的部分；模型没有统一编号时，未编号的行也一并采用。结果去重并保持顺序。
pub fn extract_titles(raw: &str, min: usize, max: usize) -> Vec<String> {
    let in_window = |t: &str| (min..=max).contains(&char_len(t));
    let usable = |t: &str| !CATEGORY.is_match(t) && !BARE_NUMBER.is_match(t) && in_window(t);

    let mut seen = std::collections::HashSet::new();
    raw.lines()
        .filter_map(|line| {
            let line = line.trim();
            match NUMBERED.captures(line) {
                Some(c) => c.get(2).map(|m| clean(m.as_str())),
                None => Some(clean(line)).filter(|t| !t.is_empty() && !t.starts_with('#')),
            }
        })
        .filter(|t| usable(t.as_str()))
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn clean(line: &str) -> String {
    line.trim().trim_matches('*').trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // 30 / 32 / 43 字符
    const T30: &str = "Webライターの始め方を完全解説！未経験から月5万円稼ぐまで";
    const T32: &str = "Webライターとは？仕事内容や年収、向いている人の特徴を徹底解説";
    const TOO_LONG: &str = "Webライターになるには？必要なスキルと案件獲得のコツを現役ライターが丁寧に解説します";

    #[test]
    fn test_numbered_titles_within_window() {
        let raw = format!(
            "【数字型】\n1. {}\n2．{}\n3. {}\n4. 短い\n5. {}",
            T30, T32, TOO_LONG, T30
        );
        let titles = extract_titles(&raw, 30, 40);
        assert_eq!(titles, vec![T30.to_string(), T32.to_string()]);
    }

    #[test]
    fn test_fallback_to_unnumbered_lines() {
        let raw = format!("# タイトル案\n{}\n\n{}\n{}", T30, T32, T30);
        assert_eq!(extract_titles(&raw, 30, 40), vec![T30.to_string(), T32.to_string()]);
    }

    #[test]
    fn test_mixed_numbered_and_unnumbered_lines() {
        let raw = format!("1. {}\n{}\n2. {}", T30, T32, TOO_LONG);
        assert_eq!(extract_titles(&raw, 30, 40), vec![T30.to_string(), T32.to_string()]);
    }

    #[test]
    fn test_no_titles() {
        assert!(extract_titles("1. 短い\n2. 短い", 30, 40).is_empty());
        assert!(extract_titles("", 30, 40).is_empty());
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let exact30 = "あ".repeat(30);
        let exact40 = "い".repeat(40);
        let raw = format!("1. {}\n2. {}\n3. {}", exact30, exact40, "う".repeat(29));
        assert_eq!(extract_titles(&raw, 30, 40), vec![exact30, exact40]);
    }

    proptest! {
        #[test]
        fn prop_every_title_fits_window(
            lines in prop::collection::vec("[あ-んア-ン]{1,50}", 0..10),
            numbered in any::<bool>(),
        ) {
            let raw = lines
                .iter()
                .enumerate()
                .map(|(i, l)| if numbered { format!("{}. {}", i + 1, l) } else { l.clone() })
                .collect::<Vec<_>>()
                .join("\n");
            for title in extract_titles(&raw, 30, 40) {
                let n = char_len(&title);
                prop_assert!((30..=40).contains(&n), "{} chars: {}", n, title);
            }
        }
    }
}
