//! Pretty-printing of rendered statements for diagnostics.

use crate::{ast::select::Select, dialect::Dialect, renderer::render_inline};
use sqlformat::{FormatOptions, Indent, QueryParams};

/// Renders `select` with literal values and lays it out over multiple
/// lines. The result is for logs only.
pub fn to_debug_string(select: &Select, dialect: &dyn Dialect) -> String {
    format_sql(&render_inline(select, dialect))
}

pub fn format_sql(sql: &str) -> String {
    let options = FormatOptions {
        indent: Indent::Spaces(4),
        uppercase: Some(true),
        ..Default::default()
    };
    sqlformat::format(sql, &QueryParams::None, &options)
}
