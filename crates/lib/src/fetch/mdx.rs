//! Turn MDX pages into plain markdown and reject responses that are not markdown.

use regex::{Captures, Regex};
use std::sync::LazyLock;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("received HTML instead of markdown")]
    Html,
    #[error("content too short ({0} bytes)")]
    TooShort(usize),
    #[error("content doesn't appear to be markdown (only {0} indicators)")]
    NotMarkdown(usize),
}

struct Patterns {
    export_start: Regex,
    export_end: Regex,
    warning: Regex,
    note: Regex,
    tip: Regex,
    tabs: Regex,
    tab_title: Regex,
    tab_end: Regex,
    code_group: Regex,
    card_group: Regex,
    card: Regex,
    steps: Regex,
    step: Regex,
    self_closing: Regex,
    import: Regex,
    blank_runs: Regex,
}

static PATTERNS: LazyLock<Patterns> = LazyLock::new(|| {
    let re = |p: &str| Regex::new(p).expect("mdx pattern is valid");
    Patterns {
        export_start: re(r"^export\s+const\s+\w+\s*="),
        export_end: re(r"^\};\s*$"),
        warning: re(r"(?s)<Warning>\s*(.*?)\s*</Warning>"),
        note: re(r"(?s)<Note>\s*(.*?)\s*</Note>"),
        tip: re(r"(?s)<Tip>\s*(.*?)\s*</Tip>"),
        tabs: re(r"</?Tabs.*?>"),
        tab_title: re(r#"<Tab\s+title="([^"]+)">"#),
        tab_end: re(r"</Tab>"),
        code_group: re(r"</?CodeGroup.*?>"),
        card_group: re(r"</?CardGroup.*?>"),
        card: re(r#"(?s)<Card\s+title="([^"]+)"\s+icon="[^"]*"\s+href="([^"]+)">\s*(.*?)\s*</Card>"#),
        steps: re(r"(?s)<Steps>\s*(.*?)\s*</Steps>"),
        step: re(r#"(?s)<Step\s+title="([^"]+)">\s*(.*?)\s*</Step>"#),
        self_closing: re(r"<[A-Z][a-zA-Z]*(?:\s+[^>]*)?\s*/>"),
        import: re(r#"(?m)^import\s+.*?['"];?\s*$"#),
        blank_runs: re(r"\n{4,}"),
    }
});

/// Strip JSX components from an MDX page, keeping their text as plain markdown.
pub fn clean_mdx_content(content: &str) -> String {
    let p = &*PATTERNS;
    let content = remove_export_blocks(content, p);

    let content = p.warning.replace_all(&content, "> **Warning:** ${1}");
    let content = p.note.replace_all(&content, "> **Note:** ${1}");
    let content = p.tip.replace_all(&content, "> **Tip:** ${1}");

    let content = p.tabs.replace_all(&content, "");
    let content = p.tab_title.replace_all(&content, "\n#### ${1}\n");
    let content = p.tab_end.replace_all(&content, "");

    let content = p.code_group.replace_all(&content, "");
    let content = p.card_group.replace_all(&content, "");
    let content = p.card.replace_all(&content, |caps: &Captures| convert_card(caps));
    let content = p
        .steps
        .replace_all(&content, |caps: &Captures| convert_steps(&p.step, &caps[1]));

    let content = p.self_closing.replace_all(&content, "");
    let content = p.import.replace_all(&content, "");
    let content = p.blank_runs.replace_all(&content, "\n\n\n");

    content.trim().to_string()
}

/// Drop `export const X = ...` blocks up to a closing `};` line.
fn remove_export_blocks(content: &str, p: &Patterns) -> String {
    let mut out = Vec::new();
    let mut lines = content.split('\n');
    while let Some(line) = lines.next() {
        if p.export_start.is_match(line) {
            for inner in lines.by_ref() {
                if p.export_end.is_match(inner) {
                    break;
                }
            }
        } else {
            out.push(line);
        }
    }
    out.join("\n")
}

fn convert_card(caps: &Captures) -> String {
    let mut parts = vec![format!("- **{}**", &caps[1])];
    let href = &caps[2];
    if !href.is_empty() {
        parts.push(format!("  - {}", href));
    }
    let body = caps[3].trim();
    if !body.is_empty() {
        for line in body.split('\n') {
            parts.push(format!("  - {}", line.trim()));
        }
    }
    parts.join("\n")
}

fn convert_steps(step: &Regex, inner: &str) -> String {
    let mut lines = Vec::new();
    for (idx, caps) in step.captures_iter(inner).enumerate() {
        lines.push(format!("{}. **{}**", idx + 1, &caps[1]));
        for line in caps[2].trim().split('\n') {
            lines.push(format!("   {}", line));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

const MARKDOWN_INDICATORS: &[&str] = &["# ", "## ", "### ", "```", "- ", "* ", "1. ", "[", "**", "_", "> "];

/// Reject HTML error pages, near-empty bodies, and text with too few markdown features.
pub fn validate_markdown_content(content: &str) -> Result<(), ContentError> {
    let head: String = content.chars().take(100).collect();
    if content.is_empty() || content.starts_with("<!DOCTYPE") || head.contains("<html") {
        return Err(ContentError::Html);
    }
    if content.trim().chars().count() < 50 {
        return Err(ContentError::TooShort(content.len()));
    }

    let indicators = content
        .split('\n')
        .take(50)
        .filter(|line| {
            let trimmed = line.trim();
            MARKDOWN_INDICATORS
                .iter()
                .any(|i| trimmed.starts_with(i) || line.contains(i))
        })
        .count();
    if indicators < 3 {
        return Err(ContentError::NotMarkdown(indicators));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callouts_become_blockquotes() {
        let out = clean_mdx_content("Intro\n\n<Warning>\n  Be careful.\n</Warning>\n\n<Tip>Use hooks.</Tip>");
        assert_eq!(out, "Intro\n\n> **Warning:** Be careful.\n\n> **Tip:** Use hooks.");
    }

    #[test]
    fn export_blocks_and_imports_are_removed() {
        let src = "import { Foo } from '/snippets/foo.mdx';\nexport const Foo = () => {\n  return 1;\n};\n# Title\n<Foo />\nText";
        assert_eq!(clean_mdx_content(src), "# Title\n\nText");
    }

    #[test]
    fn tabs_become_headings() {
        let src = "<Tabs>\n<Tab title=\"Python\">\npy\n</Tab>\n</Tabs>";
        let out = clean_mdx_content(src);
        assert!(out.contains("#### Python\n"));
        assert!(!out.contains("<Tab"));
        assert!(!out.contains("</Tab"));
    }

    #[test]
    fn cards_become_lists() {
        let src = "<CardGroup cols={2}>\n<Card title=\"Hooks\" icon=\"bolt\" href=\"/agent-sdk/hooks\">\n  Intercept tools\n</Card>\n</CardGroup>";
        assert_eq!(
            clean_mdx_content(src),
            "- **Hooks**\n  - /agent-sdk/hooks\n  - Intercept tools"
        );
    }

    #[test]
    fn steps_become_numbered_list() {
        let src = "<Steps>\n<Step title=\"Install\">\nnpm i\n</Step>\n<Step title=\"Run\">\nnode a.js\n</Step>\n</Steps>";
        assert_eq!(
            clean_mdx_content(src),
            "1. **Install**\n   npm i\n\n2. **Run**\n   node a.js"
        );
    }

    #[test]
    fn collapses_blank_runs() {
        assert_eq!(clean_mdx_content("a\n\n\n\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn html_is_rejected() {
        assert_eq!(
            validate_markdown_content("<!DOCTYPE html><html><body>nope</body></html>"),
            Err(ContentError::Html)
        );
        assert_eq!(validate_markdown_content(""), Err(ContentError::Html));
    }

    #[test]
    fn short_content_is_rejected() {
        assert_eq!(validate_markdown_content("# Hi"), Err(ContentError::TooShort(4)));
    }

    #[test]
    fn plain_text_is_rejected() {
        let text = "This is plain prose without any markup at all.\nIt goes on for a while longer.\nAnd longer.";
        assert_eq!(validate_markdown_content(text), Err(ContentError::NotMarkdown(0)));
    }

    #[test]
    fn markdown_passes() {
        let md = "# Sessions\n\nSessions keep context.\n\n## Resume\n\n- pass `resume`\n- or fork";
        assert_eq!(validate_markdown_content(md), Ok(()));
    }
}
