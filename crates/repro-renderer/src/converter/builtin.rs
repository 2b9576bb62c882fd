//! In-process markdown to LaTeX conversion with `pulldown-cmark`.
//!
//! Escapes LaTeX specials the same way `lowdown -tlatex` does, so converter
//! output goes through the same normalization regardless of backend.
//! Emphasis uses `\textit` rather than `\emph` to survive that normalization.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use super::{ConvertError, MarkdownConverter};

const PREAMBLE: &str = "\\documentclass{article}\n\
\\usepackage[utf8]{inputenc}\n\
\\usepackage{graphicx}\n\
\\usepackage{hyperref}\n\
\\usepackage[normalem]{ulem}\n";

/// Pure Rust markdown converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinConverter;

impl BuiltinConverter {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convert markdown to a LaTeX fragment without the document wrapper.
    #[must_use]
    pub fn convert_fragment(markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let mut writer = LatexWriter::default();
        for event in Parser::new_ext(markdown, options) {
            writer.event(event);
        }
        writer.out
    }
}

impl MarkdownConverter for BuiltinConverter {
    fn name(&self) -> &str {
        "builtin"
    }

    fn convert(&self, markdown: &str) -> Result<String, ConvertError> {
        let body = Self::convert_fragment(markdown);
        Ok(format!(
            "{PREAMBLE}\\begin{{document}}\n\n{}\n\\end{{document}}\n",
            body.trim_end()
        ))
    }
}

#[derive(Debug, Default)]
struct TableState {
    cell: usize,
}

#[derive(Debug, Default)]
struct LatexWriter {
    out: String,
    table: Option<TableState>,
    in_code_block: bool,
    /// Image alt text is dropped.
    image_depth: usize,
}

impl LatexWriter {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => {
                self.out.push_str("\\texttt{");
                self.out.push_str(&escape_latex(&code));
                self.out.push('}');
            }
            Event::InlineMath(math) => {
                self.out.push('$');
                self.out.push_str(&math);
                self.out.push('$');
            }
            Event::DisplayMath(math) => {
                self.out.push_str("\\[");
                self.out.push_str(&math);
                self.out.push_str("\\]");
            }
            Event::SoftBreak => self.out.push('\n'),
            Event::HardBreak => self.out.push_str("\\\\\n"),
            Event::Rule => self.out.push_str("\\noindent\\rule{\\linewidth}{0.4pt}\n\n"),
            Event::TaskListMarker(checked) => {
                self.out.push_str(if checked { "[x] " } else { "[ ] " });
            }
            Event::Html(_) | Event::InlineHtml(_) | Event::FootnoteReference(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::TableRow => {}
            Tag::Heading { level, .. } => {
                self.out.push_str(heading_command(level));
                self.out.push('{');
            }
            Tag::BlockQuote(_) => self.out.push_str("\\begin{quote}\n"),
            Tag::CodeBlock(kind) => {
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind
                    && !lang.is_empty()
                {
                    self.out.push_str("% language: ");
                    self.out.push_str(&lang);
                    self.out.push('\n');
                }
                self.out.push_str("\\begin{verbatim}\n");
            }
            Tag::List(start) => {
                match start {
                    Some(n) if n != 1 => {
                        self.out.push_str("\\begin{enumerate}\n");
                        // enumi counts items already shown, so a list at 0 starts below zero
                        let counter = i128::from(n) - 1;
                        self.out.push_str(&format!("\\setcounter{{enumi}}{{{counter}}}\n"));
                    }
                    Some(_) => self.out.push_str("\\begin{enumerate}\n"),
                    None => self.out.push_str("\\begin{itemize}\n"),
                }
            }
            Tag::Item => self.out.push_str("\\item "),
            Tag::Table(alignments) => {
                let spec: String = alignments.iter().map(column_spec).collect();
                self.out.push_str(&format!("\\begin{{tabular}}{{{spec}}}\n"));
                self.table = Some(TableState::default());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.cell = 0;
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    if table.cell > 0 {
                        self.out.push_str(" & ");
                    }
                    table.cell += 1;
                }
            }
            Tag::Emphasis => self.out.push_str("\\textit{"),
            Tag::Strong => self.out.push_str("\\textbf{"),
            Tag::Strikethrough => self.out.push_str("\\sout{"),
            Tag::Superscript => self.out.push_str("\\textsuperscript{"),
            Tag::Subscript => self.out.push_str("\\textsubscript{"),
            Tag::Link { dest_url, .. } => {
                self.out.push_str("\\href{");
                self.out.push_str(&escape_url(&dest_url));
                self.out.push_str("}{");
            }
            Tag::Image { dest_url, .. } => {
                if self.image_depth == 0 {
                    self.out.push_str("\\includegraphics[width=\\linewidth]{");
                    self.out.push_str(&dest_url);
                    self.out.push('}');
                }
                self.image_depth += 1;
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.out.push_str("\n\n"),
            TagEnd::Heading(_) => self.out.push_str("}\n\n"),
            TagEnd::BlockQuote(_) => self.out.push_str("\\end{quote}\n\n"),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
                self.out.push_str("\\end{verbatim}\n\n");
            }
            TagEnd::List(ordered) => self.out.push_str(if ordered {
                "\\end{enumerate}\n\n"
            } else {
                "\\end{itemize}\n\n"
            }),
            TagEnd::Item => {
                if !self.out.ends_with('\n') {
                    self.out.push('\n');
                }
            }
            TagEnd::Table => {
                self.table = None;
                self.out.push_str("\\end{tabular}\n\n");
            }
            TagEnd::TableHead => {
                self.out.push_str(" \\\\\n\\hline\n");
                if let Some(table) = &mut self.table {
                    table.cell = 0;
                }
            }
            TagEnd::TableRow => {
                self.out.push_str(" \\\\\n");
                if let Some(table) = &mut self.table {
                    table.cell = 0;
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript
            | TagEnd::Link => self.out.push('}'),
            TagEnd::Image => self.image_depth = self.image_depth.saturating_sub(1),
            TagEnd::TableCell
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::FootnoteDefinition
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.image_depth > 0 {
            return;
        }
        if self.in_code_block {
            self.out.push_str(text);
        } else {
            self.out.push_str(&escape_latex(text));
        }
    }
}

fn heading_command(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "\\section",
        HeadingLevel::H2 => "\\subsection",
        HeadingLevel::H3 => "\\subsubsection",
        HeadingLevel::H4 => "\\paragraph",
        HeadingLevel::H5 | HeadingLevel::H6 => "\\subparagraph",
    }
}

fn column_spec(alignment: &Alignment) -> char {
    match alignment {
        Alignment::Center => 'c',
        Alignment::Right => 'r',
        Alignment::None | Alignment::Left => 'l',
    }
}

/// Escape LaTeX special characters in text.
fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '#' | '$' | '%' | '&' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_url(url: &str) -> String {
    url.replace('%', "\\%").replace('#', "\\#")
}
