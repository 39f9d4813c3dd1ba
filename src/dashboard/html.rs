//! Self-contained HTML rendering of a tab set
//!
//! Charts are embedded as base64 SVG data URIs, so the page has no external
//! assets. Tab switching is a few lines of inline script.

use super::{Column, Grid, Pane, Tabs};
use std::fmt::Write;

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #fafafa; color: #222; }
.tabs { display: flex; min-height: 100vh; }
.tabs.loc-left { flex-direction: row; }
.tabs.loc-right { flex-direction: row-reverse; }
.tabs.loc-above { flex-direction: column; }
.tabs.loc-below { flex-direction: column-reverse; }
.tab-headers { display: flex; gap: 2px; background: #eee; padding: 4px; }
.loc-left .tab-headers, .loc-right .tab-headers { flex-direction: column; }
.tab-headers button { border: 0; background: transparent; padding: 8px 14px; cursor: pointer; text-align: left; font-size: 14px; }
.tab-headers button.active { background: #fff; font-weight: bold; }
.tab-body { display: none; padding: 12px 20px; }
.tab-body.active { display: block; }
.column { display: flex; flex-direction: column; gap: 8px; }
.grid { display: grid; gap: 8px; }
.chart img { display: block; background: #fff; }
.markdown p { margin: 4px 0; }
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.tab-headers button').forEach(function (button) {
  button.addEventListener('click', function () {
    var target = button.getAttribute('data-tab');
    document.querySelectorAll('.tab-headers button').forEach(function (b) {
      b.classList.toggle('active', b === button);
    });
    document.querySelectorAll('.tab-body').forEach(function (body) {
      body.classList.toggle('active', body.id === target);
    });
  });
});
"#;

/// Render the tab set as a complete HTML document
pub fn render_page(tabs: &Tabs, title: &str) -> String {
    let mut out = String::with_capacity(64 * 1024);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape(title));
    let _ = writeln!(out, "<style>{}</style>", STYLE);
    out.push_str("</head>\n<body>\n");

    let _ = writeln!(out, "<div class=\"tabs loc-{}\">", tabs.location.as_str());

    out.push_str("<nav class=\"tab-headers\">\n");
    for (i, tab) in tabs.tabs.iter().enumerate() {
        let _ = writeln!(
            out,
            "<button type=\"button\" data-tab=\"tab-{}\"{}>{}</button>",
            i,
            if i == 0 { " class=\"active\"" } else { "" },
            escape(&tab.title)
        );
    }
    out.push_str("</nav>\n<main>\n");

    for (i, tab) in tabs.tabs.iter().enumerate() {
        let _ = writeln!(
            out,
            "<section class=\"tab-body{}\" id=\"tab-{}\">",
            if i == 0 { " active" } else { "" },
            i
        );
        render_pane(&mut out, &tab.content);
        out.push_str("</section>\n");
    }

    out.push_str("</main>\n</div>\n");
    let _ = writeln!(out, "<script>{}</script>", SCRIPT);
    out.push_str("</body>\n</html>\n");
    out
}

fn render_pane(out: &mut String, pane: &Pane) {
    match pane {
        Pane::Markdown(text) => render_markdown(out, text),
        Pane::Chart(chart) => {
            let _ = writeln!(
                out,
                "<figure class=\"chart chart-{}\"><img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"{}\"></figure>",
                chart.kind.as_str(),
                chart.to_data_uri(),
                chart.width,
                chart.height,
                escape(&chart.title)
            );
        }
        Pane::Column(column) => render_column(out, column),
        Pane::Grid(grid) => render_grid(out, grid),
    }
}

fn render_column(out: &mut String, column: &Column) {
    out.push_str("<div class=\"column\">\n");
    for pane in &column.panes {
        render_pane(out, pane);
    }
    out.push_str("</div>\n");
}

fn render_grid(out: &mut String, grid: &Grid) {
    let _ = writeln!(
        out,
        "<div class=\"grid\" style=\"grid-template-columns: repeat({}, max-content);\">",
        grid.ncols
    );
    for pane in &grid.panes {
        out.push_str("<div class=\"cell\">\n");
        render_pane(out, pane);
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
}

/// Headings (`#` to `######`) and plain paragraphs
fn render_markdown(out: &mut String, text: &str) {
    out.push_str("<div class=\"markdown\">\n");
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let level = line.chars().take_while(|c| *c == '#').count();
        let rest = &line[level..];
        if (1..=6).contains(&level) && rest.starts_with(' ') {
            let _ = writeln!(out, "<h{0}>{1}</h{0}>", level, escape(rest.trim()));
        } else {
            let _ = writeln!(out, "<p>{}</p>", escape(line));
        }
    }
    out.push_str("</div>\n");
}

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{ChartKind, RenderedChart};
    use crate::dashboard::{Column, Grid, Pane, TabLocation, Tabs};

    fn chart(title: &str) -> RenderedChart {
        RenderedChart {
            kind: ChartKind::Line,
            title: title.to_string(),
            svg: "<svg></svg>".to_string(),
            width: 600,
            height: 400,
        }
    }

    #[test]
    fn test_markdown_headings() {
        let mut out = String::new();
        render_markdown(
            &mut out,
            "# Intel Financial Data Dashboard\n\n## Income Statement Metrics\nplain & simple\n#hashtag",
        );
        assert!(out.contains("<h1>Intel Financial Data Dashboard</h1>"));
        assert!(out.contains("<h2>Income Statement Metrics</h2>"));
        assert!(out.contains("<p>plain &amp; simple</p>"));
        assert!(out.contains("<p>#hashtag</p>"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("Metric '<x>' & \"y\""),
            "Metric &#39;&lt;x&gt;&#39; &amp; &quot;y&quot;"
        );
    }

    #[test]
    fn test_page_structure() {
        let tabs = Tabs::new(TabLocation::Left)
            .with_tab(
                "Financial Overview",
                Column::new()
                    .push(Pane::markdown("# Intel Financial Data Dashboard"))
                    .push(chart("Total Revenue Over Time")),
            )
            .with_tab(
                "Key Metrics",
                Grid::new(2)
                    .push(chart("EPS Over Time"))
                    .push(Pane::missing_metric("capitalExpenditures")),
            );

        let page = render_page(&tabs, "Intel Financial Data Dashboard");

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("class=\"tabs loc-left\""));
        assert_eq!(page.matches("<section class=\"tab-body").count(), 2);
        assert_eq!(page.matches("data:image/svg+xml;base64,").count(), 2);
        assert!(page.contains("<section class=\"tab-body active\" id=\"tab-0\">"));
        assert!(page.contains("repeat(2, max-content)"));
        assert!(page.contains("Metric &#39;capitalExpenditures&#39; not found in data."));
        assert!(page.contains(">Key Metrics</button>"));
        assert_eq!(page.matches("<figure class=\"chart chart-line\">").count(), 2);
    }

    #[test]
    fn test_tab_location_classes() {
        for (loc, class) in [
            (TabLocation::Above, "class=\"tabs loc-above\""),
            (TabLocation::Right, "class=\"tabs loc-right\""),
            (TabLocation::Below, "class=\"tabs loc-below\""),
        ] {
            let page = render_page(&Tabs::new(loc), "t");
            assert!(page.contains(class));
        }
    }
}
