use crate::site::{Document, TreeNode};

const HIGHLIGHT: &str = r#" class="item-highlight""#;

/// Render the sidebar navigation for one page.
///
/// `current` is the slug of the page being rendered, `articles` the full
/// flattened article list and `article_path` the URL prefix articles are
/// served under (`/t`).
pub fn render_navigation(
    tree: &[TreeNode],
    current: &str,
    articles: &[Document],
    article_path: &str,
) -> String {
    let renderer = NavRenderer {
        current,
        articles,
        article_path,
    };

    let roots: Vec<&TreeNode> = tree.iter().collect();
    let mut items = String::new();
    renderer.render_items(&roots, &mut items);

    let mut html = String::new();
    push_line(&mut html, 24, "<ol>");
    push_line(&mut html, 28, &items);
    push_line(&mut html, 24, "</ol>");
    html
}

struct NavRenderer<'a> {
    current: &'a str,
    articles: &'a [Document],
    article_path: &'a str,
}

impl NavRenderer<'_> {
    fn render_items(&self, items: &[&TreeNode], html: &mut String) {
        for item in items {
            match item {
                TreeNode::Folder(folder) => {
                    // A folder only links somewhere if some article carries its name
                    let target = self.articles.iter().find(|a| a.filename == folder.name);
                    let href = match target {
                        Some(_) => format!("{}/{}", self.article_path, folder.name),
                        None => "#".to_string(),
                    };
                    let highlight = match target {
                        Some(article) if article.filename == self.current => HIGHLIGHT,
                        _ => "",
                    };

                    push_line(html, 28, r#"<li class="top-level">"#);
                    push_line(
                        html,
                        32,
                        &format!(r#"<a href="{href}"{highlight}>{}</a>"#, folder.display_name()),
                    );
                    push_line(html, 28, "</li>");

                    if !folder.children.is_empty() {
                        push_line(html, 28, r#"<ol class="indented">"#);
                        let children: Vec<&TreeNode> = folder
                            .children
                            .iter()
                            .filter(|child| {
                                !matches!(child, TreeNode::File(doc) if doc.filename == folder.name)
                            })
                            .collect();
                        self.render_items(&children, html);
                        push_line(html, 28, "</ol>");
                    }
                }
                TreeNode::File(doc) => {
                    let highlight = if doc.filename == self.current {
                        HIGHLIGHT
                    } else {
                        ""
                    };

                    push_line(html, 32, r#"<li class="sub-level">"#);
                    push_line(
                        html,
                        36,
                        &format!(
                            r#"<a href="{}/{}"{highlight}>{}</a>"#,
                            self.article_path, doc.filename, doc.title
                        ),
                    );
                    push_line(html, 32, "</li>");
                }
            }
        }
    }
}

fn push_line(html: &mut String, indent: usize, text: &str) {
    html.push('\n');
    html.extend(std::iter::repeat_n(' ', indent));
    html.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::collect_articles;
    use crate::site::fixtures::{doc, folder};

    fn overview_tree() -> Vec<TreeNode> {
        vec![
            folder(
                "overview",
                Some(doc("overview", "Overview")),
                vec![TreeNode::File(doc("sub", "Sub Page"))],
            ),
            TreeNode::File(doc("about", "About")),
        ]
    }

    #[test]
    fn test_exact_markup() {
        let tree = vec![TreeNode::File(doc("about", "About"))];
        let articles = collect_articles(&tree);

        let html = render_navigation(&tree, "other", &articles, "/t");
        let expected = concat!(
            "\n                        <ol>",
            "\n                            ",
            "\n                                <li class=\"sub-level\">",
            "\n                                    <a href=\"/t/about\">About</a>",
            "\n                                </li>",
            "\n                        </ol>",
        );
        assert_eq!(html, expected);
    }

    #[test]
    fn test_folder_links_to_its_page_and_nests_children() {
        let tree = overview_tree();
        let articles = collect_articles(&tree);

        let html = render_navigation(&tree, "sub", &articles, "/t");
        let folder_link = html.find(r#"<a href="/t/overview">Overview</a>"#).unwrap();
        let nested = html.find(r#"<ol class="indented">"#).unwrap();
        let child = html
            .find(r#"<a href="/t/sub" class="item-highlight">Sub Page</a>"#)
            .unwrap();
        assert!(folder_link < nested && nested < child);
    }

    #[test]
    fn test_current_folder_is_highlighted() {
        let tree = overview_tree();
        let articles = collect_articles(&tree);

        let html = render_navigation(&tree, "overview", &articles, "/t");
        assert!(html.contains(r#"<a href="/t/overview" class="item-highlight">Overview</a>"#));
        assert!(html.contains(r#"<a href="/t/about">About</a>"#));
    }

    #[test]
    fn test_folder_without_page_is_not_a_link() {
        let tree = vec![folder(
            "early_uploads",
            None,
            vec![TreeNode::File(doc("first", "First"))],
        )];
        let articles = collect_articles(&tree);

        let html = render_navigation(&tree, "first", &articles, "/t");
        assert!(html.contains(r##"<a href="#">Early Uploads</a>"##));
    }

    #[test]
    fn test_file_named_like_parent_is_hidden() {
        let tree = vec![folder(
            "foo",
            None,
            vec![
                TreeNode::File(doc("foo", "Foo Inner")),
                TreeNode::File(doc("bar", "Bar")),
            ],
        )];
        let articles = collect_articles(&tree);

        let html = render_navigation(&tree, "bar", &articles, "/t");
        assert!(html.contains(r#"<a href="/t/foo">Foo</a>"#));
        assert!(!html.contains("Foo Inner"));
        assert!(html.contains(r#"<a href="/t/bar" class="item-highlight">Bar</a>"#));
    }

    #[test]
    fn test_empty_folder_has_no_nested_list() {
        let tree = vec![folder("empty", None, vec![])];
        let html = render_navigation(&tree, "", &[], "/t");
        assert!(!html.contains("indented"));
    }
}
