//! Prompt Assembler - 提示词组装
//!
//! 每个任务一个方法：读取模板（及示例 / 知识文件），删除面向对话式助手的交互指令，
//! 拼接用户字段，最后追加固定的输出格式约束。用户字段按原样拼接，不做转义。

use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::PipelineSettings;
use crate::application::ports::{template_names as names, CatalogEntry, ImagePart, TemplateSourcePort};
use crate::domain::markers::{SupervisorTag, BOX_CLOSE, BOX_OPEN, INTERNAL_LINK_PREFIX, SALES_PLACEHOLDER};
use crate::domain::text::Truncated;
use crate::domain::{Article, ArticleInputData, Attachment, SubHeading};
use crate::domain::article::AttachmentKind;
use crate::domain::markers::BlockRole;

/// 输出信封起止标记
pub const OUTPUT_BEGIN: &str = "<<<BEGIN_OUTPUT>>>";
pub const OUTPUT_END: &str = "<<<END_OUTPUT>>>";

/// 未填写字段的占位
const UNSPECIFIED: &str = "未指定";

/// 监修者档案模板名
pub const SUPERVISOR_PROFILE: &str = "監修者プロフィール";

type Strip = (Regex, &'static str);

fn strips(patterns: &[(&str, &'static str)]) -> Vec<Strip> {
    patterns
        .iter()
        .map(|(p, r)| (Regex::new(p).unwrap(), *r))
        .collect()
}

static OUTLINE_DIALOGUE: Lazy<Vec<Strip>> = Lazy::new(|| {
    strips(&[
        (r"(?s)## 完了確認.*?これからSEO記事構成を作成いたします。.*?\n", ""),
        (r"すべての情報収集が完了しました。これからSEO記事構成を作成いたします。", ""),
    ])
});

static TITLE_DIALOGUE: Lazy<Vec<Strip>> = Lazy::new(|| {
    strips(&[
        (r"(?s)# 対話の流れ.*?→すべての回答を受け取ったら、タイトル生成へ", ""),
        (r"(?s)## 質問1: キーワードの確認.*?→ユーザーの回答を受け取った後、次の質問へ", ""),
        (r"(?s)## 質問2: 想定読者の確認.*?→ユーザーの回答を受け取った後、次の質問へ", ""),
        (r"(?s)## 質問3: 記事構成の確認.*?→すべての回答を受け取ったら、タイトル生成へ", ""),
        (
            r"(?s)# 重要な注意点.*?ユーザーの回答内容を要約して確認し、認識が正しいか確認してから次に進んでください",
            "",
        ),
    ])
});

static WRITING_DIALOGUE: Lazy<Vec<Strip>> = Lazy::new(|| {
    strips(&[
        (r"(?s)## \*\*STEP1:.*?ユーザーがH2ブロックを指定するまで待機\*\*", ""),
        (r"(?s)#### \*\*Step 1[a-e]:\*\*.*?次の質問に進みます。", ""),
        (r"(?s)質問の例：.*?指定してください」", ""),
        (
            r"\*\*重要：\*\* ユーザーがH2ブロックを指定するまで、執筆を開始してはいけません。必ず指定を待ってください。",
            "",
        ),
    ])
});

static LINK_DIALOGUE: Lazy<Vec<Strip>> = Lazy::new(|| {
    strips(&[
        (r"(?s)## 応答開始時のテンプレート.*?\[ここから実際の出力を開始\]", ""),
        (r"(?s)## 継続的改善のためのフィードバック要請.*?削除すべきリンク提案はありますか\?", ""),
        (r"(?s)## 実行コマンド.*?このプロンプトに従って分析と提案を開始してください。.*$", ""),
        (r"(?s)## エラーハンドリング.*?記事が添付されていません。.*?---", ""),
    ])
});

static SALES_DIALOGUE: Lazy<Vec<Strip>> = Lazy::new(|| {
    strips(&[
        (r"(?s)## 対話フロー.*?## 分析・提案フェーズ", "## 分析・提案フェーズ"),
        (r"(?s)## 実行開始.*$", ""),
        (r"(?s)それでは、\*\*質問1\*\*から始めてください。.*$", ""),
        (r"(?s)ユーザーが全ての情報を提供するまで、段階的に質問を進めてください。.*$", ""),
    ])
});

fn apply_strips(text: &str, strips: &[Strip]) -> String {
    strips.iter().fold(text.to_string(), |acc, (re, rep)| {
        re.replace_all(&acc, *rep).into_owned()
    })
}

fn or_unspecified(value: &str) -> &str {
    if value.trim().is_empty() {
        UNSPECIFIED
    } else {
        value
    }
}

/// 要求模型用信封包裹输出
fn envelope_instruction() -> String {
    format!(
        "\n\n## 出力の囲み\n\
         - 出力する本文は必ず「{begin}」だけの行から始め、「{end}」だけの行で終えてください\n\
         - この2行の外側には説明・前置き・質問などを一切書かないでください",
        begin = OUTPUT_BEGIN,
        end = OUTPUT_END
    )
}

/// 组装结果（带可选的图片附件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    pub images: Vec<ImagePart>,
}

/// 执笔任务的输入
#[derive(Debug, Clone, Copy)]
pub struct WritingBrief<'a> {
    pub section_title: &'a str,
    pub subheadings: &'a [SubHeading],
    pub input: &'a ArticleInputData,
    pub outline: &'a str,
    pub instruction: &'a str,
    pub attachments: &'a [Attachment],
}

/// 局部编辑的输入
#[derive(Debug, Clone, Copy)]
pub struct PartEdit<'a> {
    pub selected_text: &'a str,
    pub instruction: &'a str,
    /// 全文（大纲或段落正文），仅作参考
    pub full_text: &'a str,
}

/// 导语 / 销售文 / まとめ / 摘要 任务的输入
#[derive(Debug, Clone, Default)]
pub struct FinishingBrief {
    pub keyword: String,
    pub title: String,
    pub article_body: String,
    pub product_url: String,
    pub intro_reader_worry: String,
    pub description_keywords: String,
    /// 含销售占位符的段落（ID, 正文）
    pub sales_blocks: Vec<(String, String)>,
    pub summary_block: Option<String>,
}

impl FinishingBrief {
    pub fn from_article(article: &Article) -> Self {
        let sales_blocks = article
            .sections
            .iter()
            .filter(|s| s.prose.contains(SALES_PLACEHOLDER))
            .map(|s| (s.id.to_string(), s.prose.clone()))
            .collect();
        let summary_block = article
            .sections
            .iter()
            .find(|s| s.role() == BlockRole::Summary)
            .map(|s| s.prose.clone());

        Self {
            keyword: article.input.main_keyword.clone(),
            title: article.title.clone(),
            article_body: article.body_markdown(),
            product_url: article.input.product_url.clone(),
            intro_reader_worry: article.input.intro_reader_worry.clone(),
            description_keywords: article.input.description_keywords.clone(),
            sales_blocks,
            summary_block,
        }
    }
}

/// 提示词组装器
pub struct PromptAssembler {
    templates: Arc<dyn TemplateSourcePort>,
    supervisor: SupervisorTag,
}

impl PromptAssembler {
    pub fn new(templates: Arc<dyn TemplateSourcePort>, settings: &PipelineSettings) -> Self {
        Self {
            templates,
            supervisor: SupervisorTag::new(settings.supervisor_name.clone()),
        }
    }

    pub fn supervisor(&self) -> &SupervisorTag {
        &self.supervisor
    }

    fn load(&self, name: &str) -> String {
        let text = self.templates.load(name);
        if text.is_empty() {
            tracing::warn!(template = %name, "Template unavailable, using built-in prompt");
        } else {
            tracing::debug!(template = %name, chars = text.chars().count(), "Template loaded");
        }
        text
    }

    // ========================================================================
    // 大纲
    // ========================================================================

    pub fn outline(&self, input: &ArticleInputData) -> String {
        let base = self.load(names::OUTLINE);
        let brief = format!(
            "メインキーワード: {}\n関連キーワード: {}\nターゲット読者: {}\n検索意図: {}\n競合記事: {}\nお手本の構成: {}\n一次情報: {}\n記事のゴール: {}",
            input.main_keyword,
            input.related_keywords,
            input.target_reader,
            input.search_intent,
            input.competitor_articles,
            input.sample_structure,
            input.primary_info,
            input.article_goal,
        );

        if base.is_empty() {
            return format!(
                "あなたはSEO記事構成のスペシャリストです。\n以下の情報を基に、SEO記事の構成（H2、H3）を作成してください。\n\n{}{}",
                brief,
                envelope_instruction()
            );
        }

        let mut prompt = apply_strips(&base, &OUTLINE_DIALOGUE);
        prompt.push_str(&self.outline_knowledge());
        prompt.push_str("\n\n以下の情報を基に記事構成を作成してください：\n");
        prompt.push_str(&brief);
        prompt.push_str(
            "\n\n## 重要：出力形式の厳守\n\
             - 「すべての情報収集が完了しました」などの前置きメッセージは一切出力しないでください\n\
             - タイトルと記事構成（H2、H3）のみを出力してください\n\
             - 「H2: まとめ」は必ず出力してください\n\
             - 「H2: まとめ」の配下にH3は出力しないでください\n\
             - 「H2: まとめ」の後にFAQ（よくある質問・Q&A）や外部引用・統計データ候補のセクションは出力しないでください\n\
             - 見出しタイトルのみを出力し、説明文や解説は一切含めないでください",
        );
        prompt.push_str(&envelope_instruction());
        prompt
    }

    fn outline_knowledge(&self) -> String {
        let knowledge = self.load(names::OUTLINE_EXAMPLES);
        if knowledge.is_empty() {
            return String::new();
        }
        format!(
            "\n\n## ナレッジ: 記事構成のお手本集\n以下のお手本集を参照し、構成の作り方・雰囲気・流れを学習してください：\n\n{}",
            knowledge
        )
    }

    /// 大纲局部编辑
    pub fn outline_part_edit(&self, edit: PartEdit<'_>, input: &ArticleInputData) -> String {
        let mut prompt = format!(
            "あなたはSEO記事構成の編集スペシャリストです。\n\n\
             以下の記事構成の一部を選択し、ユーザーの編集指示に従って編集してください。\n\n\
             ## 編集対象の選択部分：\n{}\n\n## 編集指示：\n{}\n\n## 記事構成全体（参考用）：\n{}\n\n\
             ## 元の入力情報（参考用）：\nメインキーワード: {}\n関連キーワード: {}\nターゲット読者: {}\n検索意図: {}\n記事のゴール: {}\n\n\
             ## 指示：\n選択部分を編集指示に従って修正してください。\n\
             - 前後の文脈を考慮して、自然な流れになるように編集してください\n\
             - 記事構成全体の整合性を保ってください\n\
             - 編集後の選択部分のみを出力してください（前後の文脈は含めない）\n\
             - 見出しの記法（H2、H3など）を維持してください",
            edit.selected_text,
            edit.instruction,
            edit.full_text,
            input.main_keyword,
            input.related_keywords,
            input.target_reader,
            input.search_intent,
            input.article_goal,
        );
        prompt.push_str(&self.outline_knowledge());
        prompt.push_str(&envelope_instruction());
        prompt
    }

    // ========================================================================
    // 标题
    // ========================================================================

    pub fn titles(&self, keyword: &str, target_reader: &str, outline: &str) -> String {
        let base = self.load(names::TITLES);
        let (keyword, target_reader, outline) = (
            or_unspecified(keyword),
            or_unspecified(target_reader),
            or_unspecified(outline),
        );

        let mut prompt = if base.is_empty() {
            "あなたはSEOとキャッチコピーの専門家です。\n\n以下の情報を基に、記事タイトル案を30個作成してください。"
                .to_string()
        } else {
            apply_strips(&base, &TITLE_DIALOGUE)
                .replace("${keyword}", keyword)
                .replace("${targetReader}", target_reader)
                .replace("${structure}", outline)
        };

        prompt.push_str(&format!(
            "\n\n## 入力情報\nメインキーワード: {}\nターゲット読者: {}\n記事構成: {}",
            keyword, target_reader, outline
        ));
        prompt.push_str(
            "\n\n## タイトル作成の要件\n\
             1. **必ず30個のタイトル案を作成してください**（30個未満は不可）\n\
             2. **各タイトルは30文字以上40文字以下を厳守してください**（満たさないタイトルは出力しないでください）\n\
             3. キーワードを自然に含めてください\n\
             4. 数字型・質問型・ベネフィット型・否定型・権威型をバランスよく含めてください\n\n\
             ## 出力形式\n各タイトルを「1. タイトル案」の形式で番号付きで出力してください。カテゴリー分けは不要です。",
        );
        prompt.push_str(&envelope_instruction());
        prompt
    }

    // ========================================================================
    // 执笔
    // ========================================================================

    fn writing_base(&self) -> String {
        let base = self.load(names::WRITING);
        let mut prompt = if base.is_empty() {
            "あなたはSEO記事のプロライターです。指定されたH2ブロックの本文を執筆してください。".to_string()
        } else {
            apply_strips(&base, &WRITING_DIALOGUE)
        };

        let knowledge = self.load(names::WRITING_KNOWLEDGE);
        if !knowledge.is_empty() {
            prompt.push_str(&format!(
                "\n\n## ナレッジ: 執筆プロンプトに反映したいこと\n以下のナレッジファイルを参照し、執筆時のルールを完璧に遵守してください：\n\n{}\n\n\
                 **重要**: 上記のナレッジファイルに記載されているすべてのルール・禁止表現・NG/OK例を必ず遵守してください。",
                knowledge
            ));
        }

        prompt.push_str(&format!(
            "\n\n## 重要：出力形式の厳守\n\
             - **HTML形式は絶対に使用しないでください。プレーンテキスト（マークダウン形式）で出力してください**\n\
             - 見出しは「H2: タイトル」「H3: タイトル」のようにテキストで記述してください\n\
             - 箇条書きは「- 項目」、表は「| 項目 | 説明 |」の形式で記述してください\n\
             - **箇条書きや表を使用する場合は、必ず{open}{close}で囲んでください**\n\
             - **例：**\n  {open}\n  - 項目1\n  - 項目2\n  {close}",
            open = BOX_OPEN,
            close = BOX_CLOSE
        ));
        prompt
    }

    pub fn writing(&self, brief: WritingBrief<'_>) -> AssembledPrompt {
        let mut prompt = self.writing_base();

        prompt.push_str(&format!(
            "\n\n以下の情報を基に記事を執筆してください：\n\n\
             - 該当のH2ブロック（{title}）の執筆文のみを出力してください\n\
             - 記事全体の構成や他のH2ブロックの内容は出力しないでください\n\n\
             ## 執筆対象のH2ブロック情報\nH2ブロック: {title}\n",
            title = brief.section_title
        ));

        if brief.subheadings.is_empty() {
            prompt.push_str("**重要**: このH2ブロックにはH3見出しがありません。H2単体の内容を執筆してください。\n");
        } else {
            let titles: Vec<&str> = brief.subheadings.iter().map(|s| s.title.as_str()).collect();
            let listed = serde_json::to_string(&titles).unwrap_or_default();
            prompt.push_str(&format!(
                "H3一覧: {}\n**重要**: 上記のH3一覧に記載されているH3のみを執筆してください。\n",
                listed
            ));
        }

        prompt.push_str(&format!(
            "キーワード: {}\nターゲット読者: {}\n検索意図: {}\n記事構成（参考）: {}\nメディアの記事例（参考）: {}\n執筆指示: {}",
            brief.input.main_keyword,
            brief.input.target_reader,
            brief.input.search_intent,
            brief.outline,
            brief.input.media_example,
            brief.instruction,
        ));

        let images = self.append_attachments(&mut prompt, brief.attachments);
        prompt.push_str(&envelope_instruction());

        AssembledPrompt { text: prompt, images }
    }

    fn append_attachments(&self, prompt: &mut String, attachments: &[Attachment]) -> Vec<ImagePart> {
        let mut images = Vec::new();
        if attachments.is_empty() {
            return images;
        }

        prompt.push_str(
            "\n\n## ⚠️【超重要】添付ファイル（必須参考資料）⚠️\n\
             以下の添付ファイルの内容を必ず読み取り、執筆時に参照してください。添付ファイルを無視して執筆することは禁止です。\n",
        );

        for (index, file) in attachments.iter().enumerate() {
            prompt.push_str(&format!("\n### ファイル{}: {} ({})\n", index + 1, file.name, file.mime_type));
            match file.kind() {
                AttachmentKind::Text => {
                    match base64::engine::general_purpose::STANDARD.decode(file.base64_payload()) {
                        Ok(bytes) => prompt.push_str(&format!(
                            "**ファイル内容（必ず参照してください）:**\n```\n{}\n```\n",
                            String::from_utf8_lossy(&bytes)
                        )),
                        Err(e) => {
                            tracing::warn!(file = %file.name, error = %e, "Failed to decode text attachment");
                            prompt.push_str("**注意**: ファイル内容の読み取りに失敗しました。\n");
                        }
                    }
                }
                AttachmentKind::Pdf | AttachmentKind::Image => {
                    prompt.push_str("**重要**: 添付の内容（テキスト・図表・データ）を読み取り、執筆内容に反映してください。\n");
                    let data = file.base64_payload();
                    if !data.is_empty() {
                        images.push(ImagePart {
                            mime_type: file.effective_mime(),
                            data: data.to_string(),
                        });
                    }
                }
                AttachmentKind::Other => {
                    prompt.push_str("**重要**: 可能な限り内容を読み取り、執筆時に参照してください。\n");
                }
            }
        }
        images
    }

    /// 段落正文局部编辑
    pub fn writing_part_edit(
        &self,
        edit: PartEdit<'_>,
        section_title: &str,
        subheadings: &[SubHeading],
    ) -> String {
        let titles: Vec<&str> = subheadings.iter().map(|s| s.title.as_str()).collect();
        let mut prompt = self.writing_base();
        prompt.push_str(&format!(
            "\n\n## 重要：選択部分の編集指示\n\n以下の執筆内容の一部を選択し、ユーザーの編集指示に従って編集してください。\n\n\
             ## 選択された部分：\n{}\n\n## 編集指示：\n{}\n\n## 執筆内容全体（参考用）：\n{}\n\n\
             ## H2ブロック情報（参考用）：\nH2ブロック: {}\nH3一覧: {}\n\n\
             ## 指示：\n\
             - 前後の文脈を考慮して、自然な流れになるように編集してください\n\
             - 編集後の選択部分のみを出力してください（前後の文脈は含めない）\n\
             - マークダウン形式を維持してください",
            edit.selected_text,
            edit.instruction,
            edit.full_text,
            section_title,
            serde_json::to_string(&titles).unwrap_or_default(),
        ));
        prompt.push_str(&envelope_instruction());
        prompt
    }

    // ========================================================================
    // 改写类任务
    // ========================================================================

    fn preservation_rules(&self, insertion: &str) -> String {
        format!(
            "- **既存の記事内容を一字一句そのまま保持してください**\n\
             - **既存の記事内容を削除・変更・要約してはいけません**\n\
             - **既存の文章を全て残したまま、{insertion}だけを追加してください**\n\
             - **分析結果・提案メッセージ・確認の質問・「---」などの区切り線は一切出力しないでください**\n\
             - **既存の記事内容に{insertion}を挿入した結果のみを出力してください**",
            insertion = insertion
        )
    }

    /// 内部链接插入
    pub fn internal_links(
        &self,
        section_title: &str,
        subheadings: &[SubHeading],
        prose: &Truncated<'_>,
        catalog: &[CatalogEntry],
    ) -> String {
        let base = self.load(names::INTERNAL_LINKS);
        let mut prompt = if base.is_empty() {
            "あなたはSEOの内部リンク設計の専門家です。記事一覧から関連する記事を選び、記事内の適切な箇所に内部リンクを挿入してください。".to_string()
        } else {
            apply_strips(&base, &LINK_DIALOGUE)
        };

        if !catalog.is_empty() {
            let lines: Vec<String> = catalog.iter().map(CatalogEntry::prompt_line).collect();
            prompt.push_str(&format!(
                "\n\n## ナレッジ: 記事一覧\n以下の記事一覧から、記事内容に関連する記事を選んで内部リンクを挿入してください（形式: 記事タイトル (URL)）：\n\n{}",
                lines.join("\n")
            ));
        }

        let mut article = format!("## {}\n", section_title);
        for sub in subheadings {
            article.push_str(&format!("{} {}\n", sub.level.markdown_prefix(), sub.title));
        }
        article.push('\n');
        article.push_str(&prose.for_prompt());

        prompt.push_str(&format!("\n\n記事内容:\n{}", article));
        prompt.push_str("\n\n## ⚠️【超重要】出力形式⚠️\n");
        prompt.push_str(&self.preservation_rules("内部リンク"));
        prompt.push_str(&format!(
            "\n- **内部リンクは必ず「{prefix}記事タイトル(URL)」の形式で、全角コロンの「{prefix}」から始めてください**\n\
             - **記事内容の見出し（##、###、H2:、H3:など）は出力しないでください**\n\
             - **出力例：**\n  既存の文章の一部です。\n  {prefix}Webライターとは?8年経験者が解説!(https://webwriter-school.net/webwriter/)\n  既存の文章の続きです。",
            prefix = INTERNAL_LINK_PREFIX
        ));
        prompt.push_str(&envelope_instruction());
        prompt
    }

    /// 销售位置标注
    pub fn sales_locations(&self, prose: &Truncated<'_>, topic: &str, product_url: &str) -> String {
        let base = self.load(names::SALES_LOCATIONS);
        let mut prompt = if base.is_empty() {
            "あなたはセールスライティングの専門家です。記事内でセールス文を入れるべき箇所を特定してください。".to_string()
        } else {
            apply_strips(&base, &SALES_DIALOGUE)
        };

        prompt.push_str(&format!(
            "\n\n## 提供された情報\n記事のトピック: {}\n記事内容: {}\n商品・サービスURL: {}",
            or_unspecified(topic),
            prose.for_prompt(),
            or_unspecified(product_url),
        ));
        prompt.push_str("\n\n## ⚠️【超重要】出力形式について⚠️\n");
        prompt.push_str(&self.preservation_rules(&format!("「{}」", SALES_PLACEHOLDER)));
        prompt.push_str(&format!(
            "\n- **見出し（##、###、H2:、H3:など）は出力せず、本文のみを出力してください**\n\
             - **挿入すべき箇所が見つからない場合も、最も適切な箇所に1つ挿入してください**\n\
             - **出力例：**\n  既存の文章の一部です。\n  {marker}\n  既存の文章の続きです。",
            marker = SALES_PLACEHOLDER
        ));
        prompt.push_str(&envelope_instruction());
        prompt
    }

    /// 监修者评论插入
    pub fn supervisor_comments(&self, prose: &Truncated<'_>, heading: &str) -> String {
        let base = self.load(names::SUPERVISOR);
        let tag = &self.supervisor;
        let mut prompt = if base.is_empty() {
            "監修者の吹き出しを執筆してください。".to_string()
        } else {
            base
        };

        prompt.push_str(&format!("\n\n記事内容:\n{}", prose.for_prompt()));
        if !heading.is_empty() {
            prompt.push_str(&format!("\n\n見出し: {}", heading));
        }

        prompt.push_str("\n\n## ⚠️【超重要】出力形式について⚠️\n");
        prompt.push_str(&format!("- **監修者名は「{}」で統一してください**\n", tag.name()));
        prompt.push_str(&self.preservation_rules("監修者の吹き出し"));
        prompt.push_str(&format!(
            "\n- **監修者の吹き出しの形式：**\n  {open}\n  〜コメント〜\n  {close}\n\
             - **見出し（##、###、H2:、H3:など）は出力せず、本文のみを出力してください**\n\
             - **吹き出しは50〜100文字程度で、読者にとって価値のある専門的な補足を提供できる箇所にのみ挿入してください**\n\
             - **全てのH3に入れる必要はありません**",
            open = tag.open(),
            close = tag.close()
        ));
        prompt.push_str(&envelope_instruction());
        prompt
    }

    // ========================================================================
    // 导语 / 销售文 / まとめ / 摘要
    // ========================================================================

    pub fn finishing(&self, brief: &FinishingBrief) -> String {
        let base = self.load(names::FINISHING);
        let mut prompt = if base.is_empty() {
            "導入文・セールス文・まとめ文・ディスクリプションを執筆してください。".to_string()
        } else {
            base
        };

        let samples: Vec<(&str, String)> = [
            ("導入文のお手本", names::INTRO_EXAMPLE),
            ("セールス文のお手本", names::SALES_EXAMPLE),
            ("まとめ文のお手本", names::SUMMARY_EXAMPLE),
            ("ディスクリプションのお手本", names::DESCRIPTION_EXAMPLE),
        ]
        .iter()
        .map(|(label, name)| (*label, self.load(name)))
        .filter(|(_, text)| !text.is_empty())
        .collect();

        if !samples.is_empty() {
            prompt.push_str("\n\n## ナレッジ: お手本集\n以下のお手本を参照し、テイストやトーンを学習してください：\n");
            for (label, text) in samples {
                prompt.push_str(&format!("\n### {}\n{}\n", label, text));
            }
        }

        prompt.push_str(&format!(
            "\n\n以下の情報を基に、導入文・セールス文・まとめ文・ディスクリプションを執筆してください：\n\n\
             キーワード: {}\n記事タイトル: {}\n完成している記事の本文: {}\n商品・サービスのURL: {}\n\
             導入文の冒頭に入れる読者の「悩み」や「キーワード」: {}\nディスクリプションに含めたいキーワード: {}\n",
            brief.keyword,
            brief.title,
            brief.article_body,
            brief.product_url,
            brief.intro_reader_worry,
            brief.description_keywords,
        ));

        if !brief.sales_blocks.is_empty() {
            let blocks: Vec<String> = brief
                .sales_blocks
                .iter()
                .map(|(id, content)| format!("ブロックID: {}\n内容: {}", id, content))
                .collect();
            prompt.push_str(&format!("セールス文を挿入する必要がある箇所:\n{}\n", blocks.join("\n\n")));
        }
        if let Some(summary) = &brief.summary_block {
            prompt.push_str(&format!("まとめブロックの内容: {}\n", summary));
        }

        prompt.push_str(&self.supervisor_profile_section());
        prompt.push_str(&self.finishing_format_section());
        prompt
    }

    fn supervisor_profile_section(&self) -> String {
        let tag = &self.supervisor;
        let mut profile = self.load(SUPERVISOR_PROFILE);
        if profile.is_empty() {
            profile = DEFAULT_SUPERVISOR_PROFILE.to_string();
        }
        format!(
            "\n## ⚠️【超重要】監修者情報⚠️\n\
             - **監修者名は「{name}」で統一してください**\n\
             - **監修者吹き出しの形式：{open}...{close}**\n\
             - **ボタンの形式：{button}**\n\n\
             導入文には、以下の形式で監修者情報を追加してください：\n\n\
             {box_open}\n監修者：{name}\n[実績]←記事の内容に相応しい権威性になる実績を1つ簡潔に書く\n{box_close}\n\n\
             監修者「{name}」の実績情報：\n{profile}\n\n\
             上記の実績情報から、記事の内容に相応しい権威性になる実績を1つ選んで、簡潔に記載してください。\n",
            name = tag.name(),
            open = tag.open(),
            close = tag.close(),
            button = tag.button(),
            box_open = BOX_OPEN,
            box_close = BOX_CLOSE,
            profile = profile.trim_end(),
        )
    }

    fn finishing_format_section(&self) -> String {
        format!(
            "\n## ⚠️【超重要】出力形式について⚠️\n以下の形式で、各項目を明確に分けて出力してください。\n\n\
             【導入文】\nここに導入文を出力してください。\n\n\
             【セールス文】\nセールス文を挿入する必要がある各ブロックについて、以下の形式で出力してください：\n\
             ブロックID: [ブロックID]\nセールス文: [セールス文の内容のみ]\n\n\
             **重要：セールス文は「{marker}」の箇所に挿入する内容のみを出力してください。既存の文章は一切出力しないでください。**\n\n\
             【まとめ文】\nここにまとめ文を出力してください。\n\n\
             【ディスクリプション】\nここにディスクリプションを出力してください。",
            marker = SALES_PLACEHOLDER
        )
    }

    // ========================================================================
    // WordPress HTML
    // ========================================================================

    pub fn wordpress_html(&self, content: &str) -> String {
        let base = self.load(names::WORDPRESS);
        let mut prompt = if base.is_empty() {
            "WordPress（Gutenberg）用HTMLに変換してください。".to_string()
        } else {
            base
        };
        prompt.push_str(&format!("\n\n記事内容:\n{}", content));
        prompt.push_str(
            "\n\n## ⚠️【超重要】出力形式について⚠️\n\
             - **HTMLコードだけを出力してください**\n\
             - **説明文・チェックリスト・貼り付け手順・完了メッセージなどは一切出力しないでください**\n\
             - **HTMLコードブロック（```html ... ```）で囲まないでください**\n\
             - **提供されたコンテンツの全てをHTMLに変換してください（途中で切れないようにしてください）**",
        );
        prompt
    }
}

/// 默认监修者实绩（可用模板「監修者プロフィール」覆盖）
const DEFAULT_SUPERVISOR_PROFILE: &str = "- SEO歴11年
- 合計7,000記事以上を作成
- 転職記事を4,200本以上執筆
- そのうちGoogle検索TOP10入りキーワード実績：3000以上
- 1サイトで月間100万PV達成（ライターは私のみで達成）
- 転職エージェント様のサイトで月100本のCV達成
- AIを使ってSEO記事作成の時間を1/6に短縮
- 7社様のSEO記事作成プロンプトを開発
- 個人ブログでも年間300万円を収益化
- YouTubeチャンネル登録1.2万人以上
- Xのフォロワー数15,000人
- SEOディレクター実績：多数";
