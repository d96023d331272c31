//! 提示词构建
//!
//! 所有提示词都是固定模板 + 插值；不校验模型输出是否遵守格式。

use crate::models::{ExtractedTopic, PesticideRecord, SourceText};

/// 主题提取时原文的最大字符数
pub const TOPIC_SOURCE_MAX_CHARS: usize = 15_000;
/// 标签用量提取时原文的最大字符数
pub const LABEL_SOURCE_MAX_CHARS: usize = 30_000;
/// 写作时原文的最大字符数
pub const DRAFT_SOURCE_MAX_CHARS: usize = 40_000;

/// 找不到主题时模型应返回的占位组合
pub const FALLBACK_TOPIC: &str = "General - Crop Protection";

/// 写作和改写共用的规则
const WRITING_RULES: &str = "\
1. Write ONLY the Gujarati article text, entirely in Gujarati. No robotic intro/outro (e.g., \"Here is the article\").
2. Use a lively journalistic, magazine-feature tone aimed at farmers.
3. Start with one short, catchy headline on the first line, then the article body.
4. Write in continuous paragraph form. Do not use bullet points, numbered lists or tables.
5. Do not name or credit any university, institute or organisation as the source of the information.
6. Ensure agricultural terminology is perfectly localized for South Gujarat.";

/// 调研提示词（搜索模型）
pub fn research_prompt(subject: &str) -> String {
    format!(
        r#"Search for the latest agricultural trends, advisories, or research regarding {subject}.
You MUST focus your search strictly on sources from Navsari Agricultural University (NAU),
Anand Agricultural University (AAU / Krushi Govidya), and Krushi Prabhat.

Provide:
1. A specific topic title.
2. A detailed summary of the pest management advisory or research finding.
3. The direct URL/Link to the PDF or source web page."#
    )
}

/// 主题提取提示词
pub fn topic_extraction_prompt(source: &SourceText) -> String {
    format!(
        r#"Read the agricultural text below and list every crop and the pest that affects it.

Output format rules (follow strictly):
1. One pair per line, exactly in the form: Crop - Pest
2. No numbering, no bullet points, no headings, no explanations, no other text.
3. Write crop and pest names in English.
4. If no crop/pest pair can be identified, output exactly: {FALLBACK_TOPIC}

Text:
{}"#,
        source.excerpt(TOPIC_SOURCE_MAX_CHARS)
    )
}

/// 标签用量提取提示词（JSON 模式）
pub fn label_claim_extraction_prompt(source: &SourceText) -> String {
    format!(
        r#"You are reading a pesticide label-claim document. Extract every recommended use.

Return ONLY a JSON array. Each element must be an object with exactly these keys:
- "chemical_name": the pesticide / active ingredient name with formulation (string)
- "crop": the crop name (string)
- "pest": the target pest (string)
- "formulation_dose": the formulation quantity per hectare, as a number (ml or g)
- "water_volume": the water quantity per hectare in litres, as a number

Do not add any other keys, comments or text. If nothing can be extracted, return [].

Document:
{}"#,
        source.excerpt(LABEL_SOURCE_MAX_CHARS)
    )
}

/// 写作提示词的输入
#[derive(Debug, Clone, Copy)]
pub struct DraftingInput<'a> {
    pub source: &'a SourceText,
    pub topic: Option<&'a ExtractedTopic>,
    pub doses: &'a [&'a PesticideRecord],
}

/// 写作提示词
pub fn drafting_prompt(input: &DraftingInput<'_>) -> String {
    let focus = match input.topic {
        Some(topic) => format!(
            "Focus the article on the crop \"{}\" and the pest \"{}\".\n\n",
            topic.crop, topic.pest
        ),
        None => String::new(),
    };

    let doses = if input.doses.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = input
            .doses
            .iter()
            .map(|record| format!("- {}", record.summary()))
            .collect();
        format!(
            "\nChemical control data (mention EVERY chemical below by name and weave its dose \
             per 10-litre pump naturally into the paragraphs):\n{}\n",
            lines.join("\n")
        )
    };

    format!(
        r#"You are an expert Agricultural Entomologist writing a practical extension article for farmers of Gujarat.
Based on the source material below, write a comprehensive article in fluent Gujarati.

{focus}Rules:
{WRITING_RULES}
{doses}
Source material:
{}"#,
        input.source.excerpt(DRAFT_SOURCE_MAX_CHARS)
    )
}

/// 改写提示词
pub fn rewrite_prompt(draft: &str, suggestion: &str) -> String {
    format!(
        r#"Below is a Gujarati agricultural article. Revise it according to the editor's suggestion.

Apply ONLY the requested change and keep everything else as it is.
Return the complete revised article.

Rules:
{WRITING_RULES}

Editor's suggestion:
{suggestion}

Current article:
{draft}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PesticideRecord {
        PesticideRecord {
            chemical_name: "Spiromesifen 22.9 SC".to_string(),
            crop: "Brinjal".to_string(),
            pest: "Red spider mite".to_string(),
            formulation_dose: 400.0,
            water_volume: 500.0,
            pump_dose: 8.0,
        }
    }

    #[test]
    fn test_research_prompt_names_sources() {
        let prompt = research_prompt("mites (કથીરી)");
        assert!(prompt.contains("mites (કથીરી)"));
        assert!(prompt.contains("Navsari Agricultural University"));
        assert!(prompt.contains("Krushi Govidya"));
        assert!(prompt.contains("Krushi Prabhat"));
        assert!(prompt.contains("URL"));
    }

    #[test]
    fn test_topic_prompt_truncates_source() {
        let long = "ક".repeat(TOPIC_SOURCE_MAX_CHARS + 500);
        let source = SourceText::new(long).unwrap();
        let prompt = topic_extraction_prompt(&source);

        let count = prompt.chars().filter(|c| *c == 'ક').count();
        assert_eq!(count, TOPIC_SOURCE_MAX_CHARS);
        assert!(prompt.contains(FALLBACK_TOPIC));
    }

    #[test]
    fn test_drafting_prompt_without_extras() {
        let source = SourceText::new("Mites damage okra leaves.").unwrap();
        let prompt = drafting_prompt(&DraftingInput {
            source: &source,
            topic: None,
            doses: &[],
        });

        assert!(prompt.contains("Mites damage okra leaves."));
        assert!(prompt.contains("Gujarati"));
        assert!(!prompt.contains("Focus the article"));
        assert!(!prompt.contains("10-litre pump"));
    }

    #[test]
    fn test_drafting_prompt_with_topic_and_doses() {
        let source = SourceText::new("Label claim text").unwrap();
        let topic = ExtractedTopic::new("Brinjal", "Red spider mite");
        let record = record();
        let doses = [&record];
        let prompt = drafting_prompt(&DraftingInput {
            source: &source,
            topic: Some(&topic),
            doses: &doses,
        });

        assert!(prompt.contains("\"Brinjal\""));
        assert!(prompt.contains("Spiromesifen 22.9 SC"));
        assert!(prompt.contains("= 8 per 10-litre pump"));
    }

    #[test]
    fn test_rewrite_prompt_contains_draft_and_suggestion() {
        let prompt = rewrite_prompt("મૂળ લેખ", "Make the headline shorter");
        assert!(prompt.contains("મૂળ લેખ"));
        assert!(prompt.contains("Make the headline shorter"));
        assert!(prompt.contains("ONLY the requested change"));
    }
}
