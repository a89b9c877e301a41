//! Query option model and translation to a vendor-safe query string.
//!
//! The backend rejects some field identifiers unless they are wrapped
//! in double quotes, and misparses several standard percent-escapes.
//! Every select list and filter expression is rendered through the
//! same quoting pipeline, and the encoded query string goes through an
//! explicit repair table before it is sent.

use regex_lite::Regex;
use url::form_urlencoded;

use crate::consts::{
    COUNT, DEQUOTE, EXPAND, FILTER, FORMAT, ODATA_EDIT_LINK, ODATA_ETAG, ODATA_ID,
    ODATA_NAVIGATION_LINK, ODATA_READ_LINK, ORDERBY, QUOTE, QUOTED, SELECT, SKIP, TOP, TRUE,
};
use crate::params::RawParams;

/// Percent-escapes the backend cannot parse, and what to put back.
/// Applied to the encoded query string as a single ordered pass.
const ENCODING_REPAIRS: &[(&str, &str)] = &[
    ("%22", "\""), // %22 can stop the backend from seeing the field name
    ("%24", "$"),  // %24 is sometimes not recognised as $
    ("%28", "("),  // %28 hides bracketed expressions
    ("%29", ")"),  // %29 hides bracketed expressions
    ("%2C", ","),  // %2C stops the backend from seeing parameter lists
    ("%2F", "/"),  // %2F hides table identifiers
    ("%3D", "="),  // %3D can stop the backend from seeing equal signs
    ("+", "%20"),  // + for spaces causes issues; spell spaces out
];

/// Comparison and boolean operators that follow a field name inside a
/// filter expression.
const FILTER_OPERATORS: &str = "eq|ne|gt|ge|lt|le|and|or";

/// Every OData query knob plus the client-side extraction flags.
///
/// `select` and `filter` always hold the already-quoted rendering; the
/// quoting pipeline in [`QueryOptions::apply_arguments`] is idempotent,
/// so re-applying it never doubles quotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Comma-joined list of field names.
    pub select: String,
    /// Boolean expression string.
    pub filter: String,
    /// Maximum row count.
    pub top: String,
    /// Rows to skip.
    pub skip: String,
    /// Request a total row count (`"true"` to enable).
    pub count: String,
    /// Sort specification.
    pub order_by: String,
    /// Response format; defaults to `json`.
    pub format: String,
    /// Navigation expansion.
    pub expand: String,
    /// Default field-quoting mode; on unless explicitly disabled.
    pub quoted: bool,
    /// Extraction flag for `@odata.editLink`.
    pub edit_link: String,
    /// Extraction flag for `@odata.id`.
    pub id: String,
    /// Extraction flag for `@odata.readLink`.
    pub read_link: String,
    /// Extraction flag for `@odata.etag`.
    pub etag: String,
    /// Extraction flag for `@odata.navigationLink`.
    pub navigation_link: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            select: String::new(),
            filter: String::new(),
            top: String::new(),
            skip: String::new(),
            count: String::new(),
            order_by: String::new(),
            format: String::new(),
            expand: String::new(),
            quoted: true,
            edit_link: String::new(),
            id: String::new(),
            read_link: String::new(),
            etag: String::new(),
            navigation_link: String::new(),
        }
    }
}

impl QueryOptions {
    /// Translate raw parameters into query options, merging a
    /// caller-imposed default filter with the caller-supplied one and
    /// running the select list and filter through the quoting pipeline.
    pub fn apply_arguments(mut self, default_filter: &str, values: &RawParams) -> Self {
        // Quoting mode defaults to on.
        self.quoted = if values.has(QUOTED) {
            values.get(QUOTED) == TRUE
        } else {
            true
        };

        let raw_select = values.get(SELECT);
        self.select = if self.quoted && !raw_select.is_empty() {
            quote_comma_delimited(raw_select)
        } else {
            raw_select.to_string()
        };

        // Quote only the identifiers named in the quote list, skipping
        // ones already quoted.
        if values.has(QUOTE) && !self.select.is_empty() {
            let quote = values.get_all(QUOTE);
            let quoted: Vec<String> = self
                .select
                .split(',')
                .map(|field| {
                    if !is_double_quoted(field) && quote.contains(&field) {
                        format!("\"{field}\"")
                    } else {
                        field.to_string()
                    }
                })
                .collect();
            self.select = quoted.join(",");
        }

        self.count = values.get(COUNT).to_string();
        self.top = values.get(TOP).to_string();
        self.skip = values.get(SKIP).to_string();
        self.order_by = values.get(ORDERBY).to_string();

        self.expand = values.get(EXPAND).to_string();
        self.edit_link = values.get(ODATA_EDIT_LINK).to_string();
        self.navigation_link = values.get(ODATA_NAVIGATION_LINK).to_string();
        self.etag = values.get(ODATA_ETAG).to_string();
        self.id = values.get(ODATA_ID).to_string();
        self.read_link = values.get(ODATA_READ_LINK).to_string();

        self.filter = merge_filter(default_filter, values.get(FILTER));
        if !self.filter.is_empty() && values.has(QUOTE) {
            self.filter = quote_filter_fields(&self.filter, &values.get_all(QUOTE));
        }

        // Remove quotes from identifiers the backend rejects when
        // quoted, wherever they appear.
        for field in values.get_all(DEQUOTE) {
            let quoted = format!("\"{field}\"");
            self.select = self.select.replace(&quoted, field);
            self.filter = self.filter.replace(&quoted, field);
        }

        let format = values.get(FORMAT);
        self.format = if format.is_empty() {
            "json".to_string()
        } else {
            format.to_string()
        };

        self
    }

    /// Serialize to a URL query string, then reverse the encodings the
    /// backend cannot parse. Only the standard OData keys are sent; the
    /// extraction flags and quoting controls are client-side only.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in [
            (SELECT, &self.select),
            (FILTER, &self.filter),
            (TOP, &self.top),
            (SKIP, &self.skip),
            (COUNT, &self.count),
            (ORDERBY, &self.order_by),
            (FORMAT, &self.format),
            (EXPAND, &self.expand),
        ] {
            if !value.is_empty() {
                serializer.append_pair(key, value);
            }
        }

        let mut encoded = serializer.finish();
        for (pattern, replacement) in ENCODING_REPAIRS {
            encoded = encoded.replace(pattern, replacement);
        }
        encoded
    }

    /// The select list split into individual (possibly quoted) names.
    pub fn fields(&self) -> Vec<String> {
        self.select.split(',').map(str::to_string).collect()
    }

    /// The select list plus the protocol metadata tags whose
    /// extraction flags are enabled.
    pub fn fields_with_metadata_tags(&self) -> Vec<String> {
        let mut fields = self.fields();
        for (flag, tag) in [
            (&self.id, "@odata.id"),
            (&self.edit_link, "@odata.editLink"),
            (&self.etag, "@odata.etag"),
            (&self.navigation_link, "@odata.navigationLink"),
            (&self.read_link, "@odata.readLink"),
        ] {
            if flag == TRUE {
                fields.push(tag.to_string());
            }
        }
        fields
    }
}

/// Merge a caller-imposed default filter with a caller-supplied one.
/// Equal strings collapse to a single copy; two different non-empty
/// filters combine as `(D) and (F)`.
pub fn merge_filter(default_filter: &str, filter: &str) -> String {
    match (default_filter.is_empty(), filter.is_empty()) {
        (true, true) => String::new(),
        (true, false) => filter.to_string(),
        (false, true) => default_filter.to_string(),
        (false, false) => {
            if default_filter == filter {
                default_filter.to_string()
            } else {
                format!("({default_filter}) and ({filter})")
            }
        }
    }
}

/// Whether the first and last characters are double quotes.
fn is_double_quoted(field: &str) -> bool {
    field.len() >= 2 && field.starts_with('"') && field.ends_with('"')
}

/// Turn a comma-delimited list into a canonical double-quoted list:
/// `1,"2", 3,""4""` becomes `"1","2","3","4"`.
pub(crate) fn quote_comma_delimited(input: &str) -> String {
    input
        .split(',')
        .map(|part| format!("\"{}\"", part.trim_matches(|c: char| c == '"' || c == ' ')))
        .collect::<Vec<_>>()
        .join(",")
}

/// Wrap every occurrence of a listed field name that is immediately
/// followed by a comparison or boolean operator in double quotes.
/// Already-quoted occurrences are normalized, not doubled, so the pass
/// is idempotent. Whitespace runs collapse to single spaces.
pub(crate) fn quote_filter_fields(query: &str, fields: &[&str]) -> String {
    if fields.is_empty() {
        return query.to_string();
    }

    let pattern = fields
        .iter()
        .map(|f| escape_literal(f))
        .collect::<Vec<_>>()
        .join("|");
    let regex = Regex::new(&format!(
        r#"(?i)"?\b({pattern})\b"?\s*({FILTER_OPERATORS})\b"#
    ))
    .expect("filter-field pattern is valid");

    let quoted = regex.replace_all(query, |caps: &regex_lite::Captures| {
        format!("\"{}\" {}", &caps[1], &caps[2])
    });

    collapse_spaces(&quoted)
}

/// Backslash-escape everything but identifier characters so field
/// names can be spliced into a regex alternation.
fn escape_literal(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        if !c.is_ascii_alphanumeric() && c != '_' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn collapse_spaces(input: &str) -> String {
    let mut out = input.to_string();
    while out.contains("  ") {
        out = out.replace("  ", " ");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_filter_table() {
        assert_eq!(merge_filter("", ""), "");
        assert_eq!(merge_filter("", "b eq 2"), "b eq 2");
        assert_eq!(merge_filter("a eq 1", ""), "a eq 1");
        assert_eq!(
            merge_filter("a eq 1", "b eq 2"),
            "(a eq 1) and (b eq 2)"
        );
    }

    #[test]
    fn test_merge_filter_equal_strings_collapse() {
        assert_eq!(merge_filter("a eq 1", "a eq 1"), "a eq 1");
    }

    #[test]
    fn test_quote_comma_delimited_canonicalizes() {
        assert_eq!(
            quote_comma_delimited(r#"1,"2",3, 4,""5"""#),
            r#""1","2","3","4","5""#
        );
    }

    #[test]
    fn test_quote_comma_delimited_idempotent() {
        let once = quote_comma_delimited("name,uuid");
        assert_eq!(quote_comma_delimited(&once), once);
    }

    #[test]
    fn test_apply_arguments_quotes_select_by_default() {
        let params: RawParams = [(SELECT, "name,uuid")].into_iter().collect();
        let options = QueryOptions::default().apply_arguments("", &params);

        assert!(options.quoted);
        assert_eq!(options.select, r#""name","uuid""#);
        assert_eq!(options.format, "json");
    }

    #[test]
    fn test_apply_arguments_quoting_disabled() {
        let params: RawParams = [(SELECT, "name,uuid"), (QUOTED, "false")]
            .into_iter()
            .collect();
        let options = QueryOptions::default().apply_arguments("", &params);

        assert!(!options.quoted);
        assert_eq!(options.select, "name,uuid");
    }

    #[test]
    fn test_quote_list_only_quotes_named_fields() {
        let mut params = RawParams::new();
        params.set(SELECT, "name,uuid,ROWID");
        params.set(QUOTED, "false");
        params.append(QUOTE, "uuid");
        let options = QueryOptions::default().apply_arguments("", &params);

        assert_eq!(options.select, r#"name,"uuid",ROWID"#);
    }

    #[test]
    fn test_quote_list_skips_already_quoted() {
        let mut params = RawParams::new();
        params.set(SELECT, r#""uuid",name"#);
        params.set(QUOTED, "false");
        params.append(QUOTE, "uuid");
        let options = QueryOptions::default().apply_arguments("", &params);

        assert_eq!(options.select, r#""uuid",name"#);
    }

    #[test]
    fn test_dequote_strips_named_fields() {
        let mut params = RawParams::new();
        params.set(SELECT, "name,ROWID");
        params.append(DEQUOTE, "ROWID");
        let options = QueryOptions::default().apply_arguments("", &params);

        assert_eq!(options.select, r#""name",ROWID"#);
    }

    #[test]
    fn test_quote_dequote_idempotence() {
        // Dequote(Quote(s, [x]), [x]) == Dequote(s, [x])
        let quoted_then_dequoted = {
            let mut params = RawParams::new();
            params.set(SELECT, "x,y");
            params.set(QUOTED, "false");
            params.append(QUOTE, "x");
            params.append(DEQUOTE, "x");
            QueryOptions::default().apply_arguments("", &params).select
        };
        let dequoted_only = {
            let mut params = RawParams::new();
            params.set(SELECT, "x,y");
            params.set(QUOTED, "false");
            params.append(DEQUOTE, "x");
            QueryOptions::default().apply_arguments("", &params).select
        };
        assert_eq!(quoted_then_dequoted, dequoted_only);
    }

    #[test]
    fn test_filter_merge_via_apply_arguments() {
        let params: RawParams = [(FILTER, "b eq 2")].into_iter().collect();
        let options = QueryOptions::default().apply_arguments("a eq 1", &params);
        assert_eq!(options.filter, "(a eq 1) and (b eq 2)");
    }

    #[test]
    fn test_quote_filter_fields_before_operators() {
        let quoted = quote_filter_fields("name eq 'x' and total gt 5", &["name", "total"]);
        assert_eq!(quoted, r#""name" eq 'x' and "total" gt 5"#);
    }

    #[test]
    fn test_quote_filter_fields_idempotent() {
        let once = quote_filter_fields("name eq 'x'", &["name"]);
        let twice = quote_filter_fields(&once, &["name"]);
        assert_eq!(once, twice);
        assert_eq!(once, r#""name" eq 'x'"#);
    }

    #[test]
    fn test_quote_filter_fields_inside_parens() {
        let quoted = quote_filter_fields("(age ge 21) or (age le 3)", &["age"]);
        assert_eq!(quoted, r#"("age" ge 21) or ("age" le 3)"#);
    }

    #[test]
    fn test_quote_filter_fields_leaves_non_fields_alone() {
        let quoted = quote_filter_fields("name eq 'age'", &["age"]);
        // 'age' is a value here, not a field followed by an operator.
        assert_eq!(quoted, "name eq 'age'");
    }

    #[test]
    fn test_filter_whitespace_collapses() {
        let quoted = quote_filter_fields("name   eq    'x'", &["name"]);
        assert_eq!(quoted, r#""name" eq 'x'"#);
    }

    #[test]
    fn test_to_query_string_repairs_encodings() {
        let options = QueryOptions {
            filter: r#"(a eq "b,c")"#.to_string(),
            format: "json".to_string(),
            ..QueryOptions::default()
        };
        let encoded = options.to_query_string();

        assert_eq!(encoded, r#"$filter=(a%20eq%20"b,c")&$format=json"#);
        for escaped in ["%22", "%24", "%28", "%29", "%2C", "%2F", "%3D", "+"] {
            assert!(!encoded.contains(escaped), "{escaped} left in {encoded}");
        }
    }

    #[test]
    fn test_to_query_string_skips_empty_options() {
        let options = QueryOptions::default();
        assert_eq!(options.to_query_string(), "");
    }

    #[test]
    fn test_to_query_string_omits_client_side_flags() {
        let options = QueryOptions {
            top: "10".to_string(),
            edit_link: "true".to_string(),
            etag: "true".to_string(),
            ..QueryOptions::default()
        };
        let encoded = options.to_query_string();
        assert_eq!(encoded, "$top=10");
    }

    #[test]
    fn test_fields_with_metadata_tags() {
        let options = QueryOptions {
            select: r#""name","uuid""#.to_string(),
            edit_link: "true".to_string(),
            id: "true".to_string(),
            ..QueryOptions::default()
        };
        let fields = options.fields_with_metadata_tags();
        assert_eq!(
            fields,
            vec![
                r#""name""#.to_string(),
                r#""uuid""#.to_string(),
                "@odata.id".to_string(),
                "@odata.editLink".to_string(),
            ]
        );
    }

    #[test]
    fn test_extraction_flags_copied_verbatim() {
        let mut params = RawParams::new();
        params.set(ODATA_EDIT_LINK, "true");
        params.set(ODATA_ETAG, "true");
        params.set(TOP, "25");
        params.set(SKIP, "50");
        params.set(COUNT, "true");
        let options = QueryOptions::default().apply_arguments("", &params);

        assert_eq!(options.edit_link, "true");
        assert_eq!(options.etag, "true");
        assert_eq!(options.top, "25");
        assert_eq!(options.skip, "50");
        assert_eq!(options.count, "true");
    }
}
