//! Utility functions for GraphQL execution

use graphql_parser::query::{
    Directive, Field, FragmentDefinition, Selection, TypeCondition, Value as GqlValue,
};
use indexmap::IndexMap;
use serde_json::Number;
use std::collections::{HashMap, HashSet};

use crate::core::resolver::ResolverArgs;
use crate::core::value::InputValue;

/// Fragment definitions of a document, by name
pub type Fragments<'d, 'q> = HashMap<&'d str, &'d FragmentDefinition<'q, String>>;

/// Key a field is written under in the response
pub fn response_key<'d>(field: &'d Field<'_, String>) -> &'d str {
    field.alias.as_deref().unwrap_or(field.name.as_str())
}

/// Flatten a selection set into the fields to execute
///
/// Inline fragments and fragment spreads are expanded when their type
/// condition matches `type_name` (or when the type is unknown), and
/// `@skip` / `@include` are honoured.
pub fn collect_fields<'d, 'q>(
    selections: &'d [Selection<'q, String>],
    fragments: &Fragments<'d, 'q>,
    variables: &IndexMap<String, InputValue>,
    type_name: Option<&str>,
) -> Vec<&'d Field<'q, String>> {
    let mut fields = Vec::new();
    let mut visited = HashSet::new();
    collect_into(
        selections,
        fragments,
        variables,
        type_name,
        &mut visited,
        &mut fields,
    );
    fields
}

fn collect_into<'d, 'q>(
    selections: &'d [Selection<'q, String>],
    fragments: &Fragments<'d, 'q>,
    variables: &IndexMap<String, InputValue>,
    type_name: Option<&str>,
    visited: &mut HashSet<&'d str>,
    out: &mut Vec<&'d Field<'q, String>>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if should_include(&field.directives, variables) {
                    out.push(field);
                }
            }
            Selection::InlineFragment(fragment) => {
                if !should_include(&fragment.directives, variables)
                    || !type_applies(fragment.type_condition.as_ref(), type_name)
                {
                    continue;
                }
                collect_into(
                    &fragment.selection_set.items,
                    fragments,
                    variables,
                    type_name,
                    visited,
                    out,
                );
            }
            Selection::FragmentSpread(spread) => {
                let name = spread.fragment_name.as_str();
                if !should_include(&spread.directives, variables) || !visited.insert(name) {
                    continue;
                }
                if let Some(&definition) = fragments.get(name)
                    && type_applies(Some(&definition.type_condition), type_name)
                {
                    collect_into(
                        &definition.selection_set.items,
                        fragments,
                        variables,
                        type_name,
                        visited,
                        out,
                    );
                }
            }
        }
    }
}

fn type_applies(condition: Option<&TypeCondition<'_, String>>, type_name: Option<&str>) -> bool {
    match (condition, type_name) {
        (Some(TypeCondition::On(on)), Some(type_name)) => on == type_name,
        _ => true,
    }
}

/// Evaluate `@skip(if:)` and `@include(if:)`
pub fn should_include(
    directives: &[Directive<'_, String>],
    variables: &IndexMap<String, InputValue>,
) -> bool {
    for directive in directives {
        let condition = directive
            .arguments
            .iter()
            .find(|(name, _)| name == "if")
            .and_then(|(_, value)| value_to_input(value, variables).as_bool());

        match (directive.name.as_str(), condition) {
            ("skip", Some(true)) | ("include", Some(false)) => return false,
            _ => {}
        }
    }
    true
}

/// Convert a GraphQL literal to an input value, substituting variables
pub fn value_to_input(
    value: &GqlValue<'_, String>,
    variables: &IndexMap<String, InputValue>,
) -> InputValue {
    match value {
        GqlValue::Null => InputValue::Null,
        GqlValue::Int(i) => i
            .as_i64()
            .map(|i| InputValue::Number(i.into()))
            .unwrap_or(InputValue::Null),
        GqlValue::Float(f) => Number::from_f64(*f)
            .map(InputValue::Number)
            .unwrap_or(InputValue::Null),
        GqlValue::String(s) => InputValue::String(s.clone()),
        GqlValue::Boolean(b) => InputValue::Boolean(*b),
        GqlValue::Enum(e) => InputValue::String(e.clone()),
        GqlValue::List(list) => {
            InputValue::List(list.iter().map(|v| value_to_input(v, variables)).collect())
        }
        GqlValue::Object(obj) => InputValue::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), value_to_input(v, variables)))
                .collect(),
        ),
        GqlValue::Variable(name) => variables.get(name).cloned().unwrap_or(InputValue::Null),
    }
}

/// Build the arguments of a field
pub fn field_arguments(
    field: &Field<'_, String>,
    variables: &IndexMap<String, InputValue>,
) -> ResolverArgs {
    ResolverArgs::new(
        field
            .arguments
            .iter()
            .map(|(name, value)| (name.clone(), value_to_input(value, variables)))
            .collect(),
    )
}

/// Convert camelCase to snake_case
pub fn camel_to_snake(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_parser::query::{Definition, OperationDefinition, parse_query};
    use serde_json::json;

    fn vars(value: serde_json::Value) -> IndexMap<String, InputValue> {
        match InputValue::from(value) {
            InputValue::Object(map) => map,
            _ => IndexMap::new(),
        }
    }

    fn field_names(query: &str, variables: &IndexMap<String, InputValue>) -> Vec<String> {
        let doc = parse_query::<String>(query).unwrap();
        let mut fragments: Fragments = HashMap::new();
        let mut selection_set = None;
        for definition in &doc.definitions {
            match definition {
                Definition::Fragment(f) => {
                    fragments.insert(f.name.as_str(), f);
                }
                Definition::Operation(OperationDefinition::Mutation(m)) => {
                    selection_set = Some(&m.selection_set);
                }
                Definition::Operation(OperationDefinition::SelectionSet(s)) => {
                    selection_set = Some(s);
                }
                _ => {}
            }
        }

        collect_fields(
            &selection_set.unwrap().items,
            &fragments,
            variables,
            Some("Mutation"),
        )
        .into_iter()
        .map(|f| response_key(f).to_string())
        .collect()
    }

    #[test]
    fn test_aliases_and_fragments() {
        let names = field_names(
            r#"
            mutation {
              first: singleUpload(file: null) { id }
              ... on Mutation { multipleUpload(files: []) { id } }
              ... on Query { ignored }
              ...Extra
            }
            fragment Extra on Mutation { extra }
            "#,
            &IndexMap::new(),
        );
        assert_eq!(names, vec!["first", "multipleUpload", "extra"]);
    }

    #[test]
    fn test_skip_and_include() {
        let variables = vars(json!({ "yes": true, "no": false }));
        let names = field_names(
            "{ a @skip(if: true) b @include(if: $no) c @include(if: $yes) d @skip(if: $missing) }",
            &variables,
        );
        assert_eq!(names, vec!["c", "d"]);
    }

    #[test]
    fn test_fragment_cycles_terminate() {
        let names = field_names(
            "{ ...A } fragment A on Mutation { a ...B } fragment B on Mutation { b ...A }",
            &IndexMap::new(),
        );
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_value_to_input_substitutes_variables() {
        let doc = parse_query::<String>(
            r#"{ f(a: 1, b: 2.5, c: "s", d: ENUM, e: [$v, null], g: { h: $v }) }"#,
        )
        .unwrap();
        let Definition::Operation(OperationDefinition::SelectionSet(set)) = &doc.definitions[0]
        else {
            panic!("expected a selection set");
        };
        let Selection::Field(field) = &set.items[0] else {
            panic!("expected a field");
        };

        let args = field_arguments(field, &vars(json!({ "v": "from variables" })));
        let rendered: serde_json::Map<String, serde_json::Value> =
            args.iter().map(|(k, v)| (k.to_string(), v.to_json())).collect();
        assert_eq!(
            serde_json::Value::Object(rendered),
            json!({
                "a": 1, "b": 2.5, "c": "s", "d": "ENUM",
                "e": ["from variables", null],
                "g": { "h": "from variables" }
            })
        );
    }

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("fileName"), "file_name");
        assert_eq!(camel_to_snake("id"), "id");
    }
}
