use estate_core::models::PropertyFilter;

/// Prefix shared by every property listing key
pub const PROPERTY_NAMESPACE: &str = "properties:";

/// `%` and `:` are escaped so a value can never forge another pair.
fn escape_component(value: &str) -> String {
    value.replace('%', "%25").replace(':', "%3A")
}

/// Deterministic key for a set of filter pairs.
///
/// Empty values are dropped and the remaining `name:value` pairs are sorted,
/// so the same filters always map to the same key regardless of order. With
/// no filters the key is `{namespace}all`.
pub fn namespaced_key(namespace: &str, pairs: &[(&str, String)]) -> String {
    let mut parts: Vec<String> = pairs
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("{}:{}", name, escape_component(value)))
        .collect();

    if parts.is_empty() {
        return format!("{}all", namespace);
    }

    parts.sort();
    format!("{}{}", namespace, parts.join(":"))
}

pub fn property_list_key(filter: &PropertyFilter) -> String {
    namespaced_key(PROPERTY_NAMESPACE, &filter.to_pairs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_maps_to_all() {
        assert_eq!(property_list_key(&PropertyFilter::default()), "properties:all");
        assert_eq!(
            namespaced_key(PROPERTY_NAMESPACE, &[("typeId", String::new())]),
            "properties:all"
        );
    }

    #[test]
    fn test_pairs_are_sorted() {
        let a = namespaced_key(
            PROPERTY_NAMESPACE,
            &[("typeId", "2".to_string()), ("categoryId", "5".to_string())],
        );
        let b = namespaced_key(
            PROPERTY_NAMESPACE,
            &[("categoryId", "5".to_string()), ("typeId", "2".to_string())],
        );
        assert_eq!(a, b);
        assert_eq!(a, "properties:categoryId:5:typeId:2");
    }

    #[test]
    fn test_values_cannot_collide_with_other_filters() {
        let forged = namespaced_key(
            PROPERTY_NAMESPACE,
            &[("description", "x:typeId:3".to_string())],
        );
        let real = namespaced_key(
            PROPERTY_NAMESPACE,
            &[("description", "x".to_string()), ("typeId", "3".to_string())],
        );
        assert_ne!(forged, real);
        assert!(forged.starts_with(PROPERTY_NAMESPACE));
    }
}
