//! Prompt templates. Every template is a plain function of the data it
//! embeds; the brand voice replaces anything company-specific.

use crate::model::{BrandVoice, Brief, CandidatePhoto, Outline, OutlineSection};

fn persona(brand: &BrandVoice) -> String {
    match (brand.name.trim(), brand.description.trim()) {
        ("", _) => "a small-business blog".to_string(),
        (name, "") => name.to_string(),
        (name, description) => format!("{name}, {description}"),
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

pub fn outline_prompt(brief: &Brief, brand: &BrandVoice) -> String {
    format!(
        r#"You are a blog content strategist for {persona}.

Create a detailed outline for a blog post with these parameters:
- Topic: {topic}
- Angle: {angle}
- Target Audience: {audience}
- Tone: {tone}
- Key Points to Cover: {key_points}

Brand Voice Guidelines:
- Tone: {brand_tone}
- Values to emphasize: {values}
- Things to avoid: {avoid}
- Focus on practical, actionable advice

SEO Requirements for Outline:
- Headline must include primary keyword and be under 60 characters
- Alternative headlines should test different keyword variations
- Section headings (H2) should include relevant keywords naturally
- Structure should support featured snippets (use lists, clear definitions)
- Introduction should hook readers with a problem statement

Generate:
1. A compelling, SEO-friendly headline (60 chars or less)
2. Three alternative headlines
3. An engaging introduction hook (2-3 sentences)
4. 5-7 main section headings with 2-4 bullet points each
5. A conclusion approach that ties back to the brand's value
6. A suggested call-to-action

Format your response as valid JSON with this structure:
{{
  "headline": "Main headline",
  "alternativeHeadlines": ["Alt 1", "Alt 2", "Alt 3"],
  "introHook": "Introduction hook text",
  "sections": [
    {{
      "heading": "Section heading",
      "points": ["Point 1", "Point 2", "Point 3"]
    }}
  ],
  "conclusion": "Conclusion approach description",
  "cta": "Suggested call-to-action"
}}"#,
        persona = persona(brand),
        topic = brief.topic,
        angle = brief.angle,
        audience = brief.audience,
        tone = brief.tone,
        key_points = join_or_none(&brief.key_points),
        brand_tone = brand.tone,
        values = join_or_none(&brand.values),
        avoid = join_or_none(&brand.avoid),
    )
}

pub fn article_prompt(
    outline: &Outline,
    brief: &Brief,
    brand: &BrandVoice,
    min_images: usize,
) -> String {
    let sections = outline
        .sections
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}\n   - {}", i + 1, s.heading, s.points.join("\n   - ")))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a professional blog writer for {persona}.

Write a complete, engaging blog post based on this outline:

HEADLINE: {headline}

INTRODUCTION HOOK: {hook}

SECTIONS:
{sections}

CONCLUSION: {conclusion}

CALL-TO-ACTION: {cta}

Article Parameters:
- Topic: {topic}
- Target Audience: {audience}
- Tone: {tone}
- Word Count: MINIMUM 850 words (aim for 1000-1500 words)

Brand Voice:
- Values: {values}
- Keywords to naturally incorporate: {keywords}
- Tone: {brand_tone}
- Avoid: {avoid}

SEO REQUIREMENTS (CRITICAL):
- Include focus keyword in title, first paragraph, and at least 2 H2 headings
- Meta description must be compelling and 140-155 characters
- Use related keywords naturally throughout, target density 1-2%
- Use semantic HTML markup
- Alt text for all images (keyword-rich but natural)

Writing Guidelines:
- Short paragraphs (2-4 sentences)
- H2 for main sections, H3 for subsections
- Include 2-3 pull quotes in <blockquote> tags
- Clear, actionable advice with bullet points or numbered lists
- End with the provided CTA

Image Placement Instructions (MINIMUM {min_images} IMAGES REQUIRED):
- Mark where images should go with: [IMAGE: description for search]
- Place one [IMAGE: ...] marker directly after each major H2 heading
- Include 1 featured/hero image marker at the very start before the intro
- The markers must be INSIDE the content field, not only in imagePlacements
- Example: "<h2>Section Title</h2>\n[IMAGE: relevant image description]\n<p>Paragraph text...</p>"

Format your response as valid JSON:
{{
  "title": "Article headline",
  "content": "Full HTML content with [IMAGE: ...] markers embedded",
  "excerpt": "Meta description (155 chars max)",
  "seoKeywords": ["keyword1", "keyword2", "keyword3"],
  "categories": ["Category1", "Category2"],
  "tags": ["tag1", "tag2", "tag3"],
  "imagePlacements": [
    {{
      "position": "featured",
      "searchQuery": "description for photo search",
      "altText": "alt text for image"
    }},
    {{
      "position": "inline-1",
      "searchQuery": "section 1 image description",
      "altText": "alt text"
    }}
  ]
}}"#,
        persona = persona(brand),
        headline = outline.headline,
        hook = outline.intro_hook,
        conclusion = outline.conclusion,
        cta = outline.cta,
        topic = brief.topic,
        audience = brief.audience,
        tone = brief.tone,
        values = join_or_none(&brand.values),
        keywords = join_or_none(&brand.keywords),
        brand_tone = brand.tone,
        avoid = join_or_none(&brand.avoid),
    )
}

pub fn clarification_prompt(brief: &Brief, brand: &BrandVoice) -> String {
    format!(
        r#"You are a blog planning assistant for {persona}.

The user wants to write a blog post about:
- Topic: {topic}
- Angle: {angle}
- Audience: {audience}
- Tone: {tone}

Ask 2-3 thoughtful follow-up questions to refine the direction and make the article more specific and valuable.

Focus on:
- Specific pain points or challenges to highlight
- Whether to focus more on problems or solutions
- Any particular features or benefits to emphasize
- Real-world scenarios or examples to include

Format your response as a simple JSON array of questions:
["Question 1?", "Question 2?", "Question 3?"]"#,
        persona = persona(brand),
        topic = brief.topic,
        angle = brief.angle,
        audience = brief.audience,
        tone = brief.tone,
    )
}

pub fn section_edit_prompt(section: &OutlineSection, feedback: &str) -> String {
    let points = section
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {p}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are editing a section of a blog post outline.

Current section:
Heading: {heading}
Points:
{points}

User feedback: {feedback}

Generate an improved version of this section based on the feedback.

Respond with valid JSON:
{{
  "heading": "Updated heading if needed",
  "points": ["Point 1", "Point 2", "Point 3"]
}}"#,
        heading = section.heading,
    )
}

pub fn image_selection_prompt(candidates: &[CandidatePhoto], context: &str, topic: &str) -> String {
    let listing = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}\n   ID: {}", i + 1, c.description_or_default(), c.id))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are selecting the best image for a blog post about "{topic}".

Available images:
{listing}

Context from article: {context}...

Pick the BEST image number (1-{count}) based on:
1. Relevance to the content
2. Professional quality
3. Appropriate for a small business audience
4. Diverse representation when possible
5. Not overly stock-photo looking

Respond with ONLY valid JSON:
{{
  "imageNumber": 3,
  "reason": "Brief reason for selection"
}}"#,
        count = candidates.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_prompt_embeds_brief_and_brand() {
        let brief = Brief {
            topic: "cold brew".into(),
            angle: "health".into(),
            audience: "gym-goers".into(),
            tone: "casual".into(),
            key_points: vec!["caffeine".into(), "electrolytes".into()],
        };
        let brand = BrandVoice {
            name: "Brewly".into(),
            description: "a coffee subscription".into(),
            values: vec!["honesty".into()],
            ..Default::default()
        };
        let prompt = outline_prompt(&brief, &brand);
        assert!(prompt.contains("Brewly, a coffee subscription"));
        assert!(prompt.contains("Key Points to Cover: caffeine, electrolytes"));
        assert!(prompt.contains("Values to emphasize: honesty"));
        assert!(prompt.contains("Things to avoid: none"));
        assert!(prompt.contains("\"alternativeHeadlines\""));
    }

    #[test]
    fn test_article_prompt_lists_sections_and_minimum() {
        let outline = Outline {
            headline: "H".into(),
            sections: vec![OutlineSection {
                heading: "Why".into(),
                points: vec!["a".into(), "b".into()],
            }],
            ..Default::default()
        };
        let prompt = article_prompt(&outline, &Brief::default(), &BrandVoice::default(), 5);
        assert!(prompt.contains("1. Why\n   - a\n   - b"));
        assert!(prompt.contains("MINIMUM 5 IMAGES"));
        assert!(prompt.contains("a small-business blog"));
    }
}
