use regex::{Captures, Regex};
use std::sync::LazyLock;

// Rules run in a fixed order; every later rule sees the output of the earlier ones.
static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)```([A-Za-z0-9_]+)?\n?(.*?)```"));
static H1: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?mR)^# (.*)$"));
static H2: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?mR)^## (.*)$"));
static H3: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?mR)^### (.*)$"));
static BOLD: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?R)\*\*(.*?)\*\*"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?R)\*(.*?)\*"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| pattern(r"`([^`]+)`"));
static LINK_BUTTON: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\[([^\]]*)\]\(([^)]*)\)\{button\}"));
static BUTTON: LazyLock<Regex> = LazyLock::new(|| pattern(r"\[([^\]]*)\]\{button\}"));
static SIZED_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"!\[([^\]]*)\]\(([^)]*)\)\{([^}]*)\}"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| pattern(r"!\[([^\]]*)\]\(([^)]*)\)"));
static SIZED_IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<img src="([^"]*)">\{([^}]*)\}"#));
static LINK: LazyLock<Regex> = LazyLock::new(|| pattern(r"\[([^\]]*)\]\(([^)]*)\)"));
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?mR)^[0-9]+\. (.*)$"));
static LIST_SPAN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?s)(<li>.*</li>)"));

static SCALE: LazyLock<Regex> = LazyLock::new(|| pattern(r"scale=([0-9.]+)"));
static WIDTH: LazyLock<Regex> = LazyLock::new(|| pattern(r"width=([0-9]+)"));
static HEIGHT: LazyLock<Regex> = LazyLock::new(|| pattern(r"height=([0-9]+)"));

pub const USER_ID_DECODER: &str = "{user-id-decoder}";
pub const USER_ID_DECODER_MOUNT: &str = r#"<div class="user-id-decoder-component"></div>"#;

const BUTTON_BLOCK_PREFIX: &str = r#"<div style="margin-bottom: 10px;"><button"#;

/// Separator between output lines; matches the indentation of the
/// article container in the page template.
const LINE_SEPARATOR: &str = "\n                            ";

/// Lines starting with one of these are emitted as-is instead of being
/// wrapped in a paragraph.
const STRUCTURAL_PREFIXES: &[&str] = &[
    "<h1",
    "<h2",
    "<h3",
    "<ol",
    "</ol>",
    "<li>",
    "<pre>",
    "__CODE_BLOCK_",
    "<div><button",
    BUTTON_BLOCK_PREFIX,
];

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("built-in markdown pattern must compile")
}

/// Convert a markdown document into the HTML fragment placed inside the
/// article container.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut code_blocks: Vec<String> = Vec::new();
    let mut html = CODE_BLOCK
        .replace_all(markdown, |caps: &Captures| {
            let placeholder = code_placeholder(code_blocks.len());
            let class = caps
                .get(1)
                .map(|lang| format!(" class=\"language-{}\"", lang.as_str()))
                .unwrap_or_default();
            let content = escape_html(caps[2].trim());
            code_blocks.push(format!("<pre><code{class}>{content}</code></pre>"));
            placeholder
        })
        .into_owned();

    html = H1.replace_all(&html, r#"<h1 id="header">${1}</h1>"#).into_owned();
    html = H2.replace_all(&html, r#"<h2 class="with-separator">${1}</h2>"#).into_owned();
    html = H3.replace_all(&html, "<h3>${1}</h3>").into_owned();

    html = BOLD.replace_all(&html, "<strong>${1}</strong>").into_owned();
    html = ITALIC.replace_all(&html, "<em>${1}</em>").into_owned();

    html = INLINE_CODE
        .replace_all(&html, |caps: &Captures| format!("<code>{}</code>", escape_html(&caps[1])))
        .into_owned();

    // Buttons share bracket syntax with links and images, so they go first
    html = LINK_BUTTON
        .replace_all(
            &html,
            r#"<div style="margin-bottom: 10px;"><button type="button" class="yt-uix-button" onclick="window.open('${2}', '_blank')"><span class="yt-uix-button-content">${1}</span></button></div>"#,
        )
        .into_owned();
    html = BUTTON
        .replace_all(
            &html,
            r#"<div style="margin-bottom: 10px;"><button type="button" class="yt-uix-button"><span class="yt-uix-button-content">${1}</span></button></div>"#,
        )
        .into_owned();

    html = html.replace(USER_ID_DECODER, USER_ID_DECODER_MOUNT);

    html = SIZED_IMAGE
        .replace_all(&html, |caps: &Captures| {
            format!(
                r#"<img src="{}" alt="{}"{}>"#,
                &caps[2],
                &caps[1],
                sizing_style(&caps[3])
            )
        })
        .into_owned();
    html = IMAGE.replace_all(&html, r#"<img src="${2}" alt="${1}">"#).into_owned();
    html = SIZED_IMG_TAG
        .replace_all(&html, |caps: &Captures| {
            format!(r#"<img src="{}"{}>"#, &caps[1], sizing_style(&caps[2]))
        })
        .into_owned();

    html = LINK.replace_all(&html, r#"<a href="${2}">${1}</a>"#).into_owned();

    html = LIST_ITEM.replace_all(&html, "<li>${1}</li>").into_owned();
    html = LIST_SPAN
        .replace_all(&html, r#"<ol class="lower-roman">${1}</ol>"#)
        .into_owned();

    let mut output = wrap_paragraphs(&html);

    for (index, block) in code_blocks.iter().enumerate() {
        output = output.replacen(&code_placeholder(index), block, 1);
    }

    output
}

fn code_placeholder(index: usize) -> String {
    format!("__CODE_BLOCK_{index}__")
}

fn wrap_paragraphs(html: &str) -> String {
    html.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if is_structural(line) {
                line.to_string()
            } else {
                format!("<p>{line}</p>")
            }
        })
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

fn is_structural(line: &str) -> bool {
    STRUCTURAL_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
}

/// Escape text for code blocks and inline code spans.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text)
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Build the ` style="..."` attribute for an image sizing annotation such
/// as `width=200`, `height=120` or `scale=0.5`. `scale` wins over explicit
/// dimensions. Returns an empty string when nothing usable was found.
pub fn sizing_style(sizing: &str) -> String {
    let mut style = String::new();

    if sizing.contains("scale=") {
        let scale = SCALE
            .captures(sizing)
            .and_then(|caps| parse_leading_float(&caps[1]));
        if let Some(scale) = scale {
            let percentage = (scale * 100.0).round();
            style.push_str(&format!("width: {percentage}%; height: auto; "));
        }
    } else {
        if let Some(caps) = WIDTH.captures(sizing) {
            style.push_str(&format!("width: {}px; ", &caps[1]));
        }
        if let Some(caps) = HEIGHT.captures(sizing) {
            style.push_str(&format!("height: {}px; ", &caps[1]));
        }
    }

    let style = style.trim();
    if style.is_empty() {
        String::new()
    } else {
        format!(" style=\"{style}\"")
    }
}

/// Parse the longest numeric prefix (`1.25` out of `1.25.3`).
fn parse_leading_float(text: &str) -> Option<f64> {
    let mut seen_dot = false;
    let end = text
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' && !seen_dot {
                seen_dot = true;
                false
            } else {
                !c.is_ascii_digit()
            }
        })
        .map(|(i, _)| i)
        .unwrap_or(text.len());

    text[..end].parse().ok()
}
