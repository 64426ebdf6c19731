// Copyright 2025 the Plotfit Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-page HTML report that stacks the demo figures.

use crate::svg::escape_xml;

#[derive(Debug)]
pub(crate) struct HtmlSection {
    pub(crate) title: String,
    pub(crate) notes: Vec<String>,
    pub(crate) svg: String,
}

impl HtmlSection {
    pub(crate) fn new(title: &str, svg: String) -> Self {
        Self {
            title: title.to_string(),
            notes: Vec::new(),
            svg,
        }
    }

    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

pub(crate) fn render_report(title: &str, sections: &[HtmlSection]) -> String {
    let mut out = String::new();
    out.push_str("<!doctype html>\n<html><head><meta charset=\"utf-8\">");
    out.push_str(&format!("<title>{}</title>", escape_xml(title)));
    out.push_str(
        "<style>body{font-family:sans-serif;margin:24px;background:#fafafa}\
         section{margin-bottom:32px}svg{background:#fff;border:1px solid #ddd}\
         ul{color:#555;font-size:13px}</style>",
    );
    out.push_str("</head><body>\n");
    out.push_str(&format!("<h1>{}</h1>\n", escape_xml(title)));
    for section in sections {
        out.push_str("<section>\n");
        out.push_str(&format!("<h2>{}</h2>\n", escape_xml(&section.title)));
        out.push_str(&section.svg);
        if !section.notes.is_empty() {
            out.push_str("<ul>\n");
            for note in &section.notes {
                out.push_str(&format!("<li>{}</li>\n", escape_xml(note)));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</section>\n");
    }
    out.push_str("</body></html>\n");
    out
}
