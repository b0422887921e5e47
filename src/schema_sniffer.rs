//! Locates the manifest field that holds file paths.

use serde_json::Value;

use crate::manifest::Manifest;

/// Field names recognised as path fields, highest priority first
pub const PATH_FIELD_NAMES: [&str; 6] = ["path", "filepath", "file_path", "location", "uri", "url"];

/// Find the path field of a manifest.
///
/// Names are checked first (exact, case-sensitive, in [`PATH_FIELD_NAMES`]
/// order). Failing that, the first field whose sampled value is a string
/// containing `/` or `\` wins. Tables sample the first non-null value of each
/// column; lists and mappings sample their first record.
pub fn find_path_field(manifest: &Manifest) -> Option<String> {
    let fields = manifest.field_names();

    if let Some(name) = PATH_FIELD_NAMES
        .iter()
        .find(|name| fields.iter().any(|field| field == *name))
    {
        return Some(name.to_string());
    }

    match manifest {
        Manifest::Table(table) => table
            .columns()
            .iter()
            .find(|column| table.first_present(column).is_some_and(looks_like_path))
            .cloned(),
        _ => manifest
            .sample_record()?
            .iter()
            .find(|(_, value)| looks_like_path(value))
            .map(|(key, _)| key.clone()),
    }
}

fn looks_like_path(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|text| text.contains('/') || text.contains('\\'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::Table;
    use serde_json::json;

    fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Manifest {
        Manifest::Table(Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        ))
    }

    #[test]
    fn test_name_heuristic_precedes_content() {
        let manifest = table(
            &["key", "path"],
            vec![vec![json!("a/b/c.wav"), json!("no-slash")]],
        );

        assert_eq!(find_path_field(&manifest).as_deref(), Some("path"));
    }

    #[test]
    fn test_name_priority_order() {
        let manifest = table(&["url", "location"], vec![]);

        assert_eq!(find_path_field(&manifest).as_deref(), Some("location"));
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let manifest = table(&["Path", "other"], vec![vec![json!("x"), json!("y")]]);

        assert_eq!(find_path_field(&manifest), None);
    }

    #[test]
    fn test_content_heuristic_skips_nulls_and_non_text() {
        let manifest = table(
            &["size", "object"],
            vec![
                vec![json!(12), Value::Null],
                vec![json!(13), json!("C:\\audio\\x.wav")],
            ],
        );

        assert_eq!(find_path_field(&manifest).as_deref(), Some("object"));
    }

    #[test]
    fn test_list_uses_first_record() {
        let manifest = Manifest::List(vec![
            json!({"name": "a", "key": "bucket/a.wav"}),
            json!({"name": "b/c", "key": "bucket/b.wav"}),
        ]);

        assert_eq!(find_path_field(&manifest).as_deref(), Some("key"));
    }

    #[test]
    fn test_mapping_uses_first_nested_record() {
        let manifest = Manifest::Mapping(
            json!({"t1": {"uri": "gs://b/t1.wav", "name": "t1"}})
                .as_object()
                .cloned()
                .unwrap(),
        );

        assert_eq!(find_path_field(&manifest).as_deref(), Some("uri"));
    }

    #[test]
    fn test_nothing_discoverable() {
        assert_eq!(
            find_path_field(&table(&["a", "b"], vec![vec![json!("x"), json!("y")]])),
            None
        );
        assert_eq!(find_path_field(&Manifest::List(vec![])), None);
        assert_eq!(
            find_path_field(&Manifest::Mapping(
                json!({"k": "flat value"}).as_object().cloned().unwrap()
            )),
            None
        );
    }
}
