//! Raw-SQL passthrough: composite-format templates with positional
//! placeholders spliced against argument fragments.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::expr::Expr;
use super::fragment::{Fragment, render};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\d+)\}").expect("placeholder regex"));

/// Splice `{N}` placeholders with the corresponding argument expressions. A
/// template that does not parse cleanly (stray braces, out-of-range index)
/// degrades to a single literal fragment of the whole expression's runtime
/// string form, with the arguments it does reference rendered in place.
pub(super) fn splice(template: &str, args: &[Expr]) -> Vec<Fragment> {
    if !well_formed(template, args.len()) {
        trace!(template, "unparseable raw template; degrading to one literal fragment");
        return vec![Fragment::Sql(degraded(template, args))];
    }
    let mut fragments = Vec::new();
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() > last {
            fragments.push(Fragment::Sql(template[last..whole.start()].to_string()));
        }
        // Index validity was checked by well_formed.
        let index: usize = captures[1].parse().unwrap_or(0);
        fragments.push(Fragment::Expr(args[index].clone()));
        last = whole.end();
    }
    if last < template.len() {
        fragments.push(Fragment::Sql(template[last..].to_string()));
    }
    fragments
}

/// Fallback string form: in-range placeholders take their argument's rendered
/// text, everything else stays verbatim.
fn degraded(template: &str, args: &[Expr]) -> String {
    let mut out = String::new();
    let mut last = 0;
    for captures in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        out.push_str(&template[last..whole.start()]);
        match captures[1].parse::<usize>() {
            Ok(index) if index < args.len() => {
                out.push_str(&render(&[Fragment::Expr(args[index].clone())]));
            }
            _ => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&template[last..]);
    out
}

/// Every brace must belong to an in-range `{N}` placeholder.
fn well_formed(template: &str, arg_count: usize) -> bool {
    let mut stripped = template.to_string();
    for captures in PLACEHOLDER.captures_iter(template) {
        match captures[1].parse::<usize>() {
            Ok(index) if index < arg_count => {}
            _ => return false,
        }
        stripped = stripped.replacen(&captures[0], "", 1);
    }
    !stripped.contains('{') && !stripped.contains('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlValue;

    #[test]
    fn splices_placeholders_in_order() {
        let args = vec![Expr::column("a"), Expr::value(SqlValue::Int(7))];
        let fragments = splice("{0} > {1}", &args);
        assert_eq!(
            fragments,
            vec![
                Fragment::Expr(Expr::column("a")),
                Fragment::Sql(" > ".into()),
                Fragment::Expr(Expr::value(SqlValue::Int(7))),
            ]
        );
    }

    #[test]
    fn out_of_range_index_degrades_to_literal() {
        // In-range arguments still render inside the fallback literal.
        let fragments = splice("{0} > {3}", &[Expr::column("a")]);
        assert_eq!(fragments, vec![Fragment::Sql("a > {3}".into())]);

        let fragments = splice(
            "COALESCE({0}, {2})",
            &[Expr::column("a"), Expr::value(SqlValue::Text("x".into()))],
        );
        assert_eq!(fragments, vec![Fragment::Sql("COALESCE(a, {2})".into())]);
    }

    #[test]
    fn stray_brace_degrades_to_literal() {
        let fragments = splice("json -> '{key}'", &[Expr::column("a")]);
        assert_eq!(fragments, vec![Fragment::Sql("json -> '{key}'".into())]);
    }

    #[test]
    fn repeated_placeholder_is_spliced_each_time() {
        let fragments = splice("{0} + {0}", &[Expr::column("a")]);
        assert_eq!(
            fragments,
            vec![
                Fragment::Expr(Expr::column("a")),
                Fragment::Sql(" + ".into()),
                Fragment::Expr(Expr::column("a")),
            ]
        );
    }
}
