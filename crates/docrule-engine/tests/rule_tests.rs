//! End-to-end tests: rule text in, placeholder value out.

use docrule_engine::{compile, evaluate, validate, CompileError, RuleEngine, Snippets, Value};
use serde_json::json;

fn eval(rule: &str, data: serde_json::Value) -> Value {
    let compiled = compile(rule).unwrap_or_else(|e| panic!("{} should compile: {}", rule, e));
    evaluate(&compiled, &Value::from(data), None)
}

fn relatives() -> serde_json::Value {
    json!([{"Relation": "Father"}, {"Relation": "Mother"}, {"Relation": "Pet"}])
}

// ============================================================================
// Reference scenarios
// ============================================================================

mod scenarios {
    use super::*;

    #[test]
    fn test_field_on_mapping() {
        assert_eq!(eval(r#"field("Name")"#, json!({"Name": "Test"})), Value::from("Test"));
    }

    #[test]
    fn test_concat_fields() {
        assert_eq!(
            eval(
                r#"concat(field("First"), field("Last"))"#,
                json!({"First": "Ein", "Last": "horn"})
            ),
            Value::from("Einhorn")
        );
    }

    #[test]
    fn test_is_on_mapping() {
        assert_eq!(
            eval(r#"is("Relation", "Father")"#, json!({"Relation": "Father"})),
            Value::from(true)
        );
    }

    #[test]
    fn test_filter_relatives() {
        assert_eq!(
            eval(r#"filter(is("Relation", "Pet"))"#, relatives()),
            Value::from(json!([{"Relation": "Pet"}]))
        );
    }

    #[test]
    fn test_field_broadcasts_over_list() {
        assert_eq!(
            eval(r#"field("Relation")"#, relatives()),
            Value::from(json!(["Father", "Mother", "Pet"]))
        );
    }

    #[test]
    fn test_field_then_join() {
        assert_eq!(
            eval(r#"field("Relation")|join("; ")"#, relatives()),
            Value::from("Father; Mother; Pet")
        );
    }

    #[test]
    fn test_format_date_list() {
        assert_eq!(
            eval("formatDate", json!(["2024-04-02", "invalid", "", null])),
            Value::from(json!(["02.04.2024", null, null, null]))
        );
    }

    #[test]
    fn test_if_with_format_broadcasts() {
        assert_eq!(
            eval(
                r#"if(is("Relation","Father"), format("{} is more", field("Relation")), "No")"#,
                json!([{"Relation": "Father"}])
            ),
            Value::from(json!(["Father is more"]))
        );
    }

    #[test]
    fn test_set_len_eq() {
        assert_eq!(
            eval("set | len | eq(1)", json!(["COL1A1", "COL1A1"])),
            Value::from(true)
        );
        assert_eq!(
            eval("set | len | eq(1)", json!(["COL1A1", "COL1A2"])),
            Value::from(false)
        );
    }

    #[test]
    fn test_sort_numbers() {
        assert_eq!(eval("sort", json!([5, 4, 2, 3])), Value::from(json!([2, 3, 4, 5])));
        assert_eq!(
            eval(r#"sort("desc")"#, json!([5, 4, 2, 3])),
            Value::from(json!([5, 4, 3, 2]))
        );
    }
}

// ============================================================================
// Report-style rules
// ============================================================================

mod report_rules {
    use super::*;

    fn case() -> serde_json::Value {
        json!({
            "Name": "Anna Beispiel",
            "Gender": "Female",
            "Birthdate": "2019-07-14",
            "Relatives": [
                {"Name": "Ben", "Relation": "Sibling", "Affected": true},
                {"Name": "Clara", "Relation": "Mother", "Affected": false},
                {"Name": "Dirk", "Relation": "Father"}
            ],
            "Findings": [
                {"Gene": "COL1A1", "Zygosity": "Heterozygous", "ACMG Classification": "Pathogenic (V)"},
                {"Gene": "FBN1", "Zygosity": "Homozygous", "ACMG Classification": 3}
            ]
        })
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            eval(
                r#"format("{} ({}), geb. {}", field("Name"), field("Gender") | translateGender, field("Birthdate") | formatDate)"#,
                case()
            ),
            Value::from("Anna Beispiel (weiblich), geb. 14.07.2019")
        );
    }

    #[test]
    fn test_family_in_pedigree_order() {
        assert_eq!(
            eval(
                r#"field("Relatives") | sort("asc", "Relation", "relation") | format("{Name} ({})", field("Relation") | translate("relation")) | join"#,
                case()
            ),
            Value::from("Clara (Mutter), Dirk (Vater), Ben (Geschwister)")
        );
    }

    #[test]
    fn test_affected_relatives() {
        assert_eq!(
            eval(
                r#"field("Relatives") | filter(field("Affected")) | field("Name") | join"#,
                case()
            ),
            Value::from("Ben")
        );
        assert_eq!(
            eval(r#"field("Relatives") | any(field("Affected"))"#, case()),
            Value::from(true)
        );
        assert_eq!(
            eval(r#"field("Relatives") | all(field("Affected"))"#, case()),
            Value::from(false)
        );
    }

    #[test]
    fn test_findings_table_cells() {
        assert_eq!(
            eval(
                r#"field("Findings") | format("{Gene}: {}", field("ACMG Classification") | translate("acmg")) | join("\n")"#,
                case()
            ),
            Value::from("COL1A1: pathogen (Klasse 5)\nFBN1: unklare Signifikanz (Klasse 3)")
        );
    }

    #[test]
    fn test_zygosity_translated() {
        assert_eq!(
            eval(r#"field("Findings") | field("Zygosity") | translate | join"#, case()),
            Value::from("heterozygot, homozygot")
        );
    }

    #[test]
    fn test_bare_translate_keeps_numbers() {
        let data = json!({"Relatives": [1, 2, 3]});
        assert_eq!(eval(r#"field("Relatives") | len | translate"#, data.clone()), Value::from(3));
        assert_eq!(
            eval(r#"field("Relatives") | len | translate("acmg")"#, data),
            Value::from("unklare Signifikanz (Klasse 3)")
        );
    }

    #[test]
    fn test_missing_values_defaulted() {
        assert_eq!(
            eval(r#"field("Consanguinity", "unbekannt")"#, case()),
            Value::from("unbekannt")
        );
        assert_eq!(
            eval(r#"field("Relatives") | field("Affected") | default("k.A.") | join"#, case()),
            Value::from("true, false, k.A.")
        );
    }

    #[test]
    fn test_concat_and_first() {
        assert_eq!(
            eval(
                r#"concat(field("Findings") | first | field("Gene"), " / ", field("Findings") | len)"#,
                case()
            ),
            Value::from("COL1A1 / 2")
        );
    }

    #[test]
    fn test_and_or_if() {
        assert_eq!(
            eval(
                r#"if(and(field("Relatives") | any(is("Relation", "Mother")), field("Relatives") | any(is("Relation", "Father"))), "Trio", "Single")"#,
                case()
            ),
            Value::from("Trio")
        );
        assert_eq!(
            eval(r#"if(or(field("Missing"), field("Other")), "yes")"#, case()),
            Value::from("")
        );
    }

    #[test]
    fn test_snippet_with_engine() {
        let mut snippets = Snippets::new();
        snippets.insert(
            "befund".to_string(),
            "Bei {Name} wurde eine Variante nachgewiesen.".to_string(),
        );
        let engine = RuleEngine::new();
        let value = engine
            .evaluate(r#"snippet("befund")"#, &Value::from(case()), Some(&snippets))
            .unwrap();
        assert_eq!(value, Value::from("Bei Anna Beispiel wurde eine Variante nachgewiesen."));

        let missing = engine.evaluate(r#"snippet("befund")"#, &Value::from(case()), None).unwrap();
        assert_eq!(missing, Value::from(""));
    }
}

// ============================================================================
// Compile errors
// ============================================================================

mod compile_errors {
    use super::*;

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            validate(r#"fild("Name")"#),
            Err(CompileError::UnknownFunction { ref name, position: 0 }) if name == "fild"
        ));
    }

    #[test]
    fn test_syntax_error_has_position() {
        match validate(r#"field("Name"" | join"#) {
            Err(CompileError::Syntax(err)) => assert_eq!(err.position(), Some(12)),
            other => panic!("Expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_arity() {
        assert!(matches!(
            validate("is"),
            Err(CompileError::Arity { function: "is", found: 0, .. })
        ));
        assert!(matches!(
            validate(r#"field("a", "b", "c")"#),
            Err(CompileError::Arity { function: "field", found: 3, .. })
        ));
    }

    #[test]
    fn test_invalid_literal_arguments() {
        for rule in [
            r#"sort("sideways")"#,
            r#"translate("colour")"#,
            r#"format("{")"#,
            r#"formatDate("%Q")"#,
            r#"filter("Pet")"#,
        ] {
            assert!(
                matches!(validate(rule), Err(CompileError::Argument { .. })),
                "{} should be rejected",
                rule
            );
        }
    }

    #[test]
    fn test_error_messages_are_readable() {
        let err = validate(r#"join(field("a") |)"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "rule syntax error: syntax error at position 17: expected function name but found ')'"
        );
    }
}

// ============================================================================
// Properties
// ============================================================================

mod properties {
    use super::*;
    use docrule_engine::EvalContext;

    fn samples() -> Vec<serde_json::Value> {
        vec![
            json!(null),
            json!("Father"),
            json!(7),
            json!({"Relation": "Father", "Name": "Dirk"}),
            json!({}),
            relatives(),
            json!([]),
            json!([null, "x", {"Relation": "Mother"}, [1, 2]]),
        ]
    }

    const RULES: &[&str] = &[
        r#"field("Relation")"#,
        r#"field("Relation", "none") | join"#,
        "first",
        r#"concat(field("Name"), "-")"#,
        r#"format("{}|{Name}", field("Relation"))"#,
        "formatDate",
        "translate",
        "translateGender",
        r#"is("Relation", "Father")"#,
        "eq(7)",
        r#"not(field("Relation"))"#,
        r#"and(field("Relation"), field("Name"))"#,
        r#"or(field("Relation"), field("Name"))"#,
        r#"any(is("Relation", "Pet"))"#,
        r#"all(field("Relation"))"#,
        r#"filter(field("Relation"))"#,
        r#"sort("desc", "Relation", "relation")"#,
        r#"join(" / ")"#,
        r#"if(field("Relation"), "y", "n")"#,
        r#"snippet("missing")"#,
        "set | len",
        r#"default("d")"#,
    ];

    #[test]
    fn test_evaluation_is_deterministic() {
        for rule in RULES {
            let compiled = compile(rule).unwrap();
            for data in samples() {
                let data = Value::from(data);
                assert_eq!(
                    compiled.evaluate(&data, None),
                    compiled.evaluate(&data, None),
                    "{} on {:?}",
                    rule,
                    data
                );
            }
        }
    }

    #[test]
    fn test_null_input_yields_defaults() {
        let ctx = EvalContext::default();
        let empty = || Value::List(Vec::new());
        let expected = [
            Value::Null,
            Value::from("none"),
            Value::Null,
            Value::from("-"),
            Value::from("|"),
            Value::Null,
            Value::Null,
            Value::from("Unbekannt"),
            Value::from(false),
            Value::from(false),
            Value::from(true),
            Value::from(false),
            Value::from(false),
            Value::from(false),
            Value::from(true),
            empty(),
            empty(),
            Value::from(""),
            Value::from("n"),
            Value::Null,
            Value::from(0),
            Value::from("d"),
        ];
        assert_eq!(RULES.len(), expected.len());
        for (rule, expected) in RULES.iter().zip(expected) {
            let compiled = compile(rule).unwrap();
            assert_eq!(compiled.apply(&Value::Null, &ctx), expected, "{}", rule);
        }
    }

    #[test]
    fn test_every_input_shape_evaluates() {
        for rule in RULES {
            let compiled = compile(rule).unwrap();
            for data in samples() {
                let result = compiled.evaluate(&Value::from(data), None);
                assert!(!result.is_null(), "{} produced a raw null", rule);
            }
        }
    }

    #[test]
    fn test_broadcasting_builtins_map_elementwise() {
        let ctx = EvalContext::default();
        let list: Vec<_> = samples().into_iter().filter(|item| !item.is_array()).collect();
        let list_value = Value::from(serde_json::Value::Array(list.clone()));
        for rule in [
            r#"field("Relation", "x")"#,
            "translateGender",
            r#"is("Relation", "Father")"#,
            r#"default("d")"#,
            r#"concat(field("Name"), "!")"#,
            r#"or(field("Relation"), eq("Father"))"#,
            r#"format("{}|{Name}", field("Relation"))"#,
            "formatDate",
        ] {
            let compiled = compile(rule).unwrap();
            let expected: Vec<Value> = list
                .iter()
                .map(|item| compiled.apply(&Value::from(item.clone()), &ctx))
                .collect();
            assert_eq!(compiled.apply(&list_value, &ctx), Value::List(expected), "{}", rule);
        }
    }

    #[test]
    fn test_field_default_is_null_safe() {
        let compiled = compile(r#"field("Relation", "fallback")"#).unwrap();
        for data in [json!(null), json!(3), json!({}), json!({"Relation": null})] {
            assert_eq!(
                compiled.apply(&Value::from(data), &EvalContext::default()),
                Value::from("fallback")
            );
        }
    }

    #[test]
    fn test_pipe_is_associative() {
        let ctx = EvalContext::default();
        let cases = [
            (r#"field("Relation")"#, "set", "len"),
            ("sort", r#"join("; ")"#, "translate"),
            (r#"filter(field("Relation"))"#, r#"field("Relation")"#, "first"),
        ];
        for (a, b, c) in cases {
            let whole = compile(&format!("{} | {} | {}", a, b, c)).unwrap();
            let (a, b, c) = (compile(a).unwrap(), compile(b).unwrap(), compile(c).unwrap());
            for data in samples() {
                let data = Value::from(data);
                let left = c.apply(&b.apply(&a.apply(&data, &ctx), &ctx), &ctx);
                assert_eq!(whole.apply(&data, &ctx), left, "{}", whole.source());
            }
        }
    }

    #[test]
    fn test_cached_and_uncached_agree() {
        let cached = RuleEngine::with_config(
            docrule_engine::EngineConfig::builder()
                .with_cache(docrule_engine::CacheConfig::default())
                .build(),
        );
        let plain = RuleEngine::new();
        for rule in RULES {
            for data in samples() {
                let data = Value::from(data);
                assert_eq!(
                    cached.evaluate(rule, &data, None).unwrap(),
                    plain.evaluate(rule, &data, None).unwrap()
                );
            }
        }
    }
}
