//! Lowers the parsed mdast tree into the render tree.
//!
//! Raw HTML becomes passthrough [`RenderNode::RawHtml`] nodes; a raw fragment
//! that is a single element with a capitalized tag name becomes a
//! [`RenderNode::Component`]. Unparseable embedded syntax stays literal.

use crate::tree::{Attr, RenderNode, RenderTree};
use markdown::mdast::{AlignKind, Node};

/// Lowers a parsed mdast root into a render tree.
pub fn lower_document(root: &Node) -> RenderTree {
    let children = match root {
        Node::Root(root) => lower_blocks(&root.children),
        other => lower_block(other),
    };
    RenderTree::new(children)
}

fn lower_blocks(nodes: &[Node]) -> Vec<RenderNode> {
    nodes.iter().flat_map(lower_block).collect()
}

fn lower_block(node: &Node) -> Vec<RenderNode> {
    match node {
        Node::Paragraph(p) => {
            let children = lower_inline(&p.children);
            // A paragraph whose whole content is one component is flow
            // content, not prose.
            if children.len() == 1 && matches!(children[0], RenderNode::Component { .. }) {
                return children;
            }
            vec![RenderNode::element("p", vec![], children)]
        }
        Node::Heading(h) => vec![RenderNode::Heading {
            depth: h.depth,
            slug: None,
            children: lower_inline(&h.children),
        }],
        Node::Code(code) => vec![RenderNode::CodeBlock {
            lang: code.lang.clone(),
            code: code.value.clone(),
            tokens: None,
        }],
        Node::Html(html) => vec![lower_raw(&html.value)],
        Node::Blockquote(quote) => vec![RenderNode::element(
            "blockquote",
            vec![],
            lower_blocks(&quote.children),
        )],
        Node::List(list) => vec![lower_list(list)],
        Node::Table(table) => vec![lower_table(table)],
        Node::ThematicBreak(_) => vec![RenderNode::element("hr", vec![], vec![])],
        // Front matter is extracted before parsing; a surviving metadata
        // node carries nothing for the tree.
        Node::Yaml(_) | Node::Toml(_) => vec![],
        other => lower_unhandled(other),
    }
}

fn lower_inline(nodes: &[Node]) -> Vec<RenderNode> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            Node::Text(text) => out.push(RenderNode::text(&text.value)),
            Node::Emphasis(em) => {
                out.push(RenderNode::element("em", vec![], lower_inline(&em.children)))
            }
            Node::Strong(strong) => out.push(RenderNode::element(
                "strong",
                vec![],
                lower_inline(&strong.children),
            )),
            Node::Delete(del) => out.push(RenderNode::element(
                "del",
                vec![],
                lower_inline(&del.children),
            )),
            Node::InlineCode(code) => out.push(RenderNode::element(
                "code",
                vec![],
                vec![RenderNode::text(&code.value)],
            )),
            Node::Break(_) => out.push(RenderNode::element("br", vec![], vec![])),
            Node::Link(link) => {
                let mut attrs = vec![Attr::new("href", &link.url)];
                if let Some(title) = &link.title {
                    attrs.push(Attr::new("title", title));
                }
                out.push(RenderNode::element(
                    "a",
                    attrs,
                    lower_inline(&link.children),
                ));
            }
            Node::Image(image) => {
                let mut attrs = vec![
                    Attr::new("src", &image.url),
                    Attr::new("alt", &image.alt),
                ];
                if let Some(title) = &image.title {
                    attrs.push(Attr::new("title", title));
                }
                out.push(RenderNode::element("img", attrs, vec![]));
            }
            Node::Html(html) => out.push(lower_raw(&html.value)),
            other => out.extend(lower_unhandled(other)),
        }
    }
    coalesce_raw_runs(out)
}

/// Unhandled mdast kinds degrade to their children, never a silent drop.
fn lower_unhandled(node: &Node) -> Vec<RenderNode> {
    log::warn!("unhandled markdown node type: {:?}", node);
    match node.children() {
        Some(children) => lower_blocks(children),
        None => vec![],
    }
}

fn lower_raw(value: &str) -> RenderNode {
    match parse_component(value) {
        Some(component) => component,
        None => RenderNode::raw(value),
    }
}

fn lower_list(list: &markdown::mdast::List) -> RenderNode {
    let tag = if list.ordered { "ol" } else { "ul" };
    let mut attrs = Vec::new();
    if let Some(start) = list.start
        && start != 1
    {
        attrs.push(Attr::new("start", start.to_string()));
    }

    let items = list
        .children
        .iter()
        .map(|child| match child {
            Node::ListItem(item) => lower_list_item(item),
            other => RenderNode::element("li", vec![], lower_block(other)),
        })
        .collect();

    RenderNode::element(tag, attrs, items)
}

fn lower_list_item(item: &markdown::mdast::ListItem) -> RenderNode {
    let mut attrs = Vec::new();
    let mut children = Vec::new();

    if let Some(checked) = item.checked {
        attrs.push(Attr::new("class", "task-list-item"));
        let mut input_attrs = vec![Attr::new("type", "checkbox"), Attr::new("disabled", "")];
        if checked {
            input_attrs.push(Attr::new("checked", ""));
        }
        children.push(RenderNode::element("input", input_attrs, vec![]));
        children.push(RenderNode::text(" "));
    }

    for child in &item.children {
        // Tight list items inline their single paragraph's content.
        if let Node::Paragraph(p) = child
            && !item.spread
        {
            children.extend(lower_inline(&p.children));
        } else {
            children.extend(lower_block(child));
        }
    }

    RenderNode::element("li", attrs, children)
}

fn lower_table(table: &markdown::mdast::Table) -> RenderNode {
    let mut rows = table.children.iter();
    let mut sections = Vec::new();

    if let Some(Node::TableRow(header)) = rows.next() {
        sections.push(RenderNode::element(
            "thead",
            vec![],
            vec![lower_table_row(header, &table.align, "th")],
        ));
    }

    let body: Vec<RenderNode> = rows
        .filter_map(|row| match row {
            Node::TableRow(row) => Some(lower_table_row(row, &table.align, "td")),
            _ => None,
        })
        .collect();
    if !body.is_empty() {
        sections.push(RenderNode::element("tbody", vec![], body));
    }

    RenderNode::element("table", vec![], sections)
}

fn lower_table_row(
    row: &markdown::mdast::TableRow,
    align: &[AlignKind],
    cell_tag: &str,
) -> RenderNode {
    let cells = row
        .children
        .iter()
        .enumerate()
        .filter_map(|(index, cell)| match cell {
            Node::TableCell(cell) => {
                let mut attrs = Vec::new();
                match align.get(index) {
                    Some(AlignKind::Left) => attrs.push(Attr::new("align", "left")),
                    Some(AlignKind::Right) => attrs.push(Attr::new("align", "right")),
                    Some(AlignKind::Center) => attrs.push(Attr::new("align", "center")),
                    _ => {}
                }
                Some(RenderNode::element(
                    cell_tag,
                    attrs,
                    lower_inline(&cell.children),
                ))
            }
            _ => None,
        })
        .collect();
    RenderNode::element("tr", vec![], cells)
}

/// Merges maximal runs of adjacent raw/text inline nodes that contain at
/// least one raw fragment into a single raw fragment, escaping text. Inline
/// HTML arrives from the parser as separate open-tag/close-tag nodes; the
/// sanitizer needs to see them as one contiguous piece of markup.
fn coalesce_raw_runs(nodes: Vec<RenderNode>) -> Vec<RenderNode> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run: Vec<RenderNode> = Vec::new();
    let mut run_has_raw = false;

    for node in nodes {
        match node {
            RenderNode::RawHtml { .. } => {
                run_has_raw = true;
                run.push(node);
            }
            RenderNode::Text { .. } => run.push(node),
            other => {
                flush_run(&mut out, &mut run, &mut run_has_raw);
                out.push(other);
            }
        }
    }
    flush_run(&mut out, &mut run, &mut run_has_raw);
    out
}

fn flush_run(out: &mut Vec<RenderNode>, run: &mut Vec<RenderNode>, has_raw: &mut bool) {
    if *has_raw {
        let mut html = String::new();
        for node in run.drain(..) {
            match node {
                RenderNode::RawHtml { value } => html.push_str(&value),
                RenderNode::Text { value } => {
                    html.push_str(&html_escape::encode_text(&value));
                }
                _ => unreachable!("runs contain only raw and text nodes"),
            }
        }
        // Inline component tags arrive as separate open/close fragments;
        // the coalesced run may now form a complete component element.
        out.push(lower_raw(&html));
    } else {
        out.append(run);
    }
    *has_raw = false;
}

/// Parses a raw fragment that is exactly one capitalized-tag element into a
/// component node. Anything else returns `None` and stays literal markup.
pub(crate) fn parse_component(html: &str) -> Option<RenderNode> {
    let trimmed = html.trim();
    let rest = trimmed.strip_prefix('<')?;
    if !rest.chars().next()?.is_ascii_uppercase() {
        return None;
    }

    let name_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    let name = rest[..name_len].to_string();
    let mut cursor = &rest[name_len..];
    let mut attrs = Vec::new();

    loop {
        cursor = cursor.trim_start();
        if let Some(after) = cursor.strip_prefix("/>") {
            if !after.trim().is_empty() {
                return None;
            }
            return Some(RenderNode::Component {
                name,
                attrs,
                children: vec![],
            });
        }
        if let Some(after) = cursor.strip_prefix('>') {
            let closer = format!("</{}>", name);
            let inner = after.trim_end().strip_suffix(closer.as_str())?;
            let children = if inner.trim().is_empty() {
                vec![]
            } else {
                vec![RenderNode::raw(inner)]
            };
            return Some(RenderNode::Component {
                name,
                attrs,
                children,
            });
        }
        let (attr, remaining) = parse_attribute(cursor)?;
        attrs.push(attr);
        cursor = remaining;
    }
}

fn parse_attribute(input: &str) -> Option<(Attr, &str)> {
    let name_len = input.find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))?;
    if name_len == 0 {
        return None;
    }
    let name = &input[..name_len];
    let rest = &input[name_len..];

    match rest.strip_prefix('=') {
        Some(value_part) => {
            let quote = value_part.chars().next()?;
            if quote != '"' && quote != '\'' {
                // JSX expression props are not literal markup; leave the
                // whole fragment as raw text.
                return None;
            }
            let value_part = &value_part[1..];
            let end = value_part.find(quote)?;
            Some((
                Attr::new(name, &value_part[..end]),
                &value_part[end + 1..],
            ))
        }
        None => Some((Attr::new(name, ""), rest)),
    }
}
