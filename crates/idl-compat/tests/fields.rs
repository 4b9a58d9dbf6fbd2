//! Field and type rules, run at every position a field can occupy.

mod common;

use common::{codes, no_field, single_field, Site, Snapshots};

const SITES: [Site; 3] = [Site::Reply, Site::Param, Site::CommandType];

const MODE_ENUM: &str = "enums:
  Mode:
    type: string
    values:
      kA: a
      kB: b
";

const INNER_STRUCT: &str = "  Inner:
    fields:
      x: int
";

/// Codes emitted when field `f` changes from `old` to `new`, per site.
fn at_sites(old: &str, new: &str) -> Vec<Vec<&'static str>> {
    at_sites_with(old, new, "", "")
}

fn at_sites_with(old: &str, new: &str, decls: &str, structs: &str) -> Vec<Vec<&'static str>> {
    SITES
        .iter()
        .map(|&site| {
            let snapshots = Snapshots::new();
            snapshots.foo(
                &single_field(site, old, decls, structs),
                &single_field(site, new, decls, structs),
            );
            codes(&snapshots.check())
        })
        .collect()
}

/// Codes emitted when field `f` is added with declaration `new`, per site.
fn added_at_sites(new: &str, review: bool) -> Vec<Vec<&'static str>> {
    SITES
        .iter()
        .map(|&site| {
            let snapshots = Snapshots::new();
            snapshots.foo(&no_field(site), &single_field(site, new, "", ""));
            let report = if review {
                snapshots.check_with_review()
            } else {
                snapshots.check()
            };
            codes(&report)
        })
        .collect()
}

#[test]
fn stable_field_becomes_unstable() {
    assert_eq!(
        at_sites("{type: int, stability: stable}", "{type: int, stability: unstable}"),
        vec![vec!["ID0004"], vec!["ID0030"], vec!["ID0021"]]
    );
}

#[test]
fn stable_field_removed() {
    let found: Vec<_> = SITES
        .iter()
        .map(|&site| {
            let snapshots = Snapshots::new();
            snapshots.foo(
                &single_field(site, "{type: int, stability: stable}", "", ""),
                &no_field(site),
            );
            codes(&snapshots.check())
        })
        .collect();
    assert_eq!(found, vec![vec!["ID0006"], vec!["ID0028"], vec!["ID0019"]]);
}

#[test]
fn unstable_field_removed_is_compatible() {
    for site in SITES {
        let snapshots = Snapshots::new();
        snapshots.foo(
            &single_field(site, "{type: int, stability: unstable}", "", ""),
            &no_field(site),
        );
        assert!(snapshots.check().is_compatible(), "{:?}", site);
    }
}

#[test]
fn legacy_unstable_flag_is_honored() {
    let snapshots = Snapshots::new();
    snapshots.foo(
        &single_field(Site::Reply, "{type: int, unstable: true}", "", ""),
        &no_field(Site::Reply),
    );
    assert!(snapshots.check().is_compatible());
}

#[test]
fn added_field_without_stability() {
    assert_eq!(
        added_at_sites("{type: int, optional: true}", false),
        vec![vec!["ID0077"], vec!["ID0078"], vec!["ID0079"]]
    );
}

#[test]
fn stability_declaration_dropped() {
    assert_eq!(
        at_sites("{type: int, stability: stable}", "int"),
        vec![vec!["ID0077"], vec!["ID0078"], vec!["ID0079"]]
    );
}

#[test]
fn added_required_field() {
    assert_eq!(
        added_at_sites("{type: int, stability: stable}", false),
        vec![vec![], vec!["ID0029"], vec!["ID0046"]]
    );
}

#[test]
fn added_field_with_default_is_not_required() {
    assert_eq!(
        added_at_sites("{type: int, default: 5, stability: stable}", false),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn reply_field_becomes_optional() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: int, optional: true, stability: stable}"
        ),
        vec![vec!["ID0005"], vec![], vec![]]
    );
}

#[test]
fn optional_input_becomes_required() {
    assert_eq!(
        at_sites(
            "{type: int, optional: true, stability: stable}",
            "{type: int, stability: stable}"
        ),
        vec![vec![], vec!["ID0032"], vec!["ID0020"]]
    );
}

#[test]
fn optional_bool_counts_as_optional() {
    assert_eq!(
        at_sites(
            "{type: optionalBool, stability: stable}",
            "{type: bool, stability: stable}"
        ),
        vec![vec![], vec!["ID0032"], vec!["ID0020"]]
    );
}

#[test]
fn unstable_input_becomes_stable_while_required() {
    assert_eq!(
        at_sites("{type: int, stability: unstable}", "{type: int, stability: stable}"),
        vec![vec![], vec!["ID0031"], vec!["ID0045"]]
    );
}

#[test]
fn validator_added() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: int, stability: stable, validator: {gte: 0}}"
        ),
        vec![vec!["ID0040"], vec!["ID0041"], vec!["ID0043"]]
    );
}

#[test]
fn validator_changed() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable, validator: {gte: 0}}",
            "{type: int, stability: stable, validator: {gte: 1}}"
        ),
        vec![vec!["ID0057"], vec!["ID0042"], vec!["ID0044"]]
    );
}

#[test]
fn validator_removed_is_compatible() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable, validator: {gte: 0}}",
            "{type: int, stability: stable}"
        ),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn scalar_becomes_enum() {
    assert_eq!(
        at_sites_with(
            "{type: string, stability: stable}",
            "{type: Mode, stability: stable}",
            MODE_ENUM,
            ""
        ),
        vec![vec!["ID0011"], vec!["ID0037"], vec!["ID0024"]]
    );
}

#[test]
fn struct_becomes_scalar() {
    assert_eq!(
        at_sites_with(
            "{type: Inner, stability: stable}",
            "{type: int, stability: stable}",
            "",
            INNER_STRUCT
        ),
        vec![vec!["ID0007"], vec!["ID0035"], vec!["ID0022"]]
    );
}

#[test]
fn enum_becomes_scalar() {
    assert_eq!(
        at_sites_with(
            "{type: Mode, stability: stable}",
            "{type: string, stability: stable}",
            MODE_ENUM,
            ""
        ),
        vec![vec!["ID0008"], vec!["ID0036"], vec!["ID0023"]]
    );
}

#[test]
fn new_type_does_not_resolve() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: missingType, stability: stable}"
        ),
        vec![vec!["ID0012"], vec!["ID0038"], vec!["ID0016"]]
    );
}

#[test]
fn serialization_types_widen() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: safeInt64, stability: stable}"
        ),
        vec![vec!["ID0013"], vec![], vec![]]
    );
}

#[test]
fn serialization_types_narrow() {
    assert_eq!(
        at_sites(
            "{type: safeInt64, stability: stable}",
            "{type: int, stability: stable}"
        ),
        vec![vec![], vec!["ID0039"], vec!["ID0015"]]
    );
}

#[test]
fn unstable_field_type_change_is_exempt() {
    assert_eq!(
        at_sites(
            "{type: int, stability: unstable}",
            "{type: string, stability: unstable}"
        ),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn nested_struct_fields_are_compared() {
    let snapshots = Snapshots::new();
    snapshots.foo(
        &single_field(Site::Reply, "{type: Inner, stability: stable}", "", INNER_STRUCT),
        &single_field(
            Site::Reply,
            "{type: Inner, stability: stable}",
            "",
            "  Inner:\n    fields: {}\n",
        ),
    );
    assert_eq!(codes(&snapshots.check()), vec!["ID0006"]);
}

#[test]
fn any_dropped_from_old_type() {
    let found = at_sites(
        "{type: IDLAnyType, stability: stable}",
        "{type: int, stability: stable}",
    );
    assert_eq!(found, vec![vec!["ID0009"], vec!["ID0033"], vec!["ID0017"]]);
}

#[test]
fn any_added_to_new_type() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: IDLAnyType, stability: stable}"
        ),
        vec![vec!["ID0010"], vec!["ID0034"], vec!["ID0018"]]
    );
}

#[test]
fn any_outside_allow_list() {
    assert_eq!(
        at_sites(
            "{type: IDLAnyType, stability: stable}",
            "{type: IDLAnyType, stability: stable}"
        ),
        vec![vec!["ID0047"], vec!["ID0048"], vec!["ID0049"]]
    );
}

#[test]
fn new_field_with_any_outside_allow_list() {
    assert_eq!(
        added_at_sites("{type: IDLAnyType, optional: true, stability: stable}", false),
        vec![vec!["ID0047"], vec!["ID0048"], vec!["ID0049"]]
    );
}

#[test]
fn allowed_any_requires_identical_codecs() {
    let found: Vec<_> = SITES
        .iter()
        .map(|&site| {
            let snapshots = Snapshots::new();
            snapshots.foo(
                &single_field(site, "{type: IDLAnyType, stability: stable}", "", ""),
                &single_field(site, "{type: IDLAnyTypeOwned, stability: stable}", "", ""),
            );
            codes(&snapshots.check_allowing_any(&["foo-reply-f", "foo-param-f", "foo"]))
        })
        .collect();
    assert_eq!(
        found,
        vec![
            vec!["ID0052", "ID0073", "ID0076"],
            vec!["ID0051", "ID0072", "ID0075"],
            vec!["ID0050", "ID0071", "ID0074"],
        ]
    );
}

#[test]
fn allowed_any_with_identical_codecs_is_compatible() {
    let snapshots = Snapshots::new();
    let field = "{type: IDLAnyType, stability: stable}";
    snapshots.foo(
        &single_field(Site::Param, field, "", ""),
        &single_field(Site::Param, field, "", ""),
    );
    assert!(snapshots.check_allowing_any(&["foo-param-f"]).is_compatible());
}

#[test]
fn scalar_becomes_variant() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: {variant: [int, string]}, stability: stable}"
        ),
        vec![vec!["ID0026"], vec![], vec![]]
    );
}

#[test]
fn variant_becomes_scalar() {
    assert_eq!(
        at_sites(
            "{type: {variant: [int, string]}, stability: stable}",
            "{type: int, stability: stable}"
        ),
        vec![vec![], vec!["ID0054"], vec!["ID0053"]]
    );
}

#[test]
fn variant_loses_member() {
    assert_eq!(
        at_sites(
            "{type: {variant: [int, string]}, stability: stable}",
            "{type: {variant: [int]}, stability: stable}"
        ),
        vec![vec![], vec!["ID0056"], vec!["ID0055"]]
    );
}

#[test]
fn variant_gains_member() {
    assert_eq!(
        at_sites(
            "{type: {variant: [int, string]}, stability: stable}",
            "{type: {variant: [int, string, double]}, stability: stable}"
        ),
        vec![vec!["ID0027"], vec![], vec![]]
    );
}

#[test]
fn unstable_variant_gains_member() {
    assert_eq!(
        at_sites(
            "{type: {variant: [int, string]}, stability: unstable}",
            "{type: {variant: [int, string, double]}, stability: unstable}"
        ),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn unstable_variant_loses_member() {
    assert_eq!(
        at_sites(
            "{type: {variant: [int, string]}, stability: unstable}",
            "{type: {variant: [int]}, stability: unstable}"
        ),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn unstable_variant_loses_struct_member() {
    assert_eq!(
        at_sites_with(
            "{type: {variant: [int, Inner]}, stability: unstable}",
            "{type: {variant: [int]}, stability: unstable}",
            "",
            INNER_STRUCT
        ),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn variant_loses_struct_member() {
    assert_eq!(
        at_sites_with(
            "{type: {variant: [int, Inner]}, stability: stable}",
            "{type: {variant: [int]}, stability: stable}",
            "",
            INNER_STRUCT
        ),
        vec![vec![], vec!["ID0056"], vec!["ID0055"]]
    );
}

#[test]
fn object_may_become_object_owned_in_inputs() {
    assert_eq!(
        at_sites(
            "{type: {variant: [string, object]}, stability: stable}",
            "{type: {variant: [string, object_owned]}, stability: stable}"
        ),
        vec![vec!["ID0027"], vec![], vec![]]
    );
}

#[test]
fn scalar_becomes_array() {
    assert_eq!(
        at_sites(
            "{type: int, stability: stable}",
            "{type: \"array<int>\", stability: stable}"
        ),
        vec![vec!["ID0061"], vec!["ID0061"], vec!["ID0061"]]
    );
}

#[test]
fn chained_type_added_to_reply() {
    let decls = "types:\n  ChainedType:\n    bson_serialization_type: object\n    cpp_type: \"mongo::ChainedType\"\n";
    let old = single_field(Site::Reply, "int", decls, "");
    let new = old.replace(
        "  FooReply:\n    fields:",
        "  FooReply:\n    chained_types:\n      ChainedType: chainedType\n    fields:",
    );
    let snapshots = Snapshots::new();
    snapshots.foo(&old, &new);
    assert_eq!(codes(&snapshots.check()), vec!["ID0080"]);
}

#[test]
fn chained_type_removed_from_inputs() {
    let decls = "types:\n  ChainedType:\n    bson_serialization_type: object\n    cpp_type: \"mongo::ChainedType\"\n";
    let chain = "\n    chained_types:\n      ChainedType: chainedType";

    let param_new = single_field(Site::Param, "int", decls, "");
    let param_old = param_new.replace(
        "    reply_type: FooReply",
        &format!("    reply_type: FooReply{}", chain),
    );
    let params = Snapshots::new();
    params.foo(&param_old, &param_new);
    assert_eq!(codes(&params.check()), vec!["ID0082"]);

    let type_new = single_field(Site::CommandType, "int", decls, "");
    let type_old = type_new.replace("  FooType:", &format!("  FooType:{}", chain));
    let command_type = Snapshots::new();
    command_type.foo(&type_old, &type_new);
    assert_eq!(codes(&command_type.check()), vec!["ID0081"]);
}

#[test]
fn chained_struct_fields_are_compared() {
    let base = |fields: &str| format!("  Base:\n    fields:{}\n", fields);
    let old = single_field(
        Site::Reply,
        "int",
        "",
        &base("\n      comment: {type: string, stability: stable}"),
    )
    .replace(
        "  FooReply:\n    fields:",
        "  FooReply:\n    chained_structs:\n      Base: base\n    fields:",
    );
    let new = old.replace("\n      comment: {type: string, stability: stable}", " {}");

    let snapshots = Snapshots::new();
    snapshots.foo(&old, &new);
    assert_eq!(codes(&snapshots.check()), vec!["ID0006"]);
}

#[test]
fn stabilized_field_needs_review() {
    assert_eq!(
        SITES
            .iter()
            .map(|&site| {
                let snapshots = Snapshots::new();
                snapshots.foo(
                    &single_field(site, "{type: int, optional: true, stability: unstable}", "", ""),
                    &single_field(site, "{type: int, optional: true, stability: stable}", "", ""),
                );
                (
                    codes(&snapshots.check()),
                    codes(&snapshots.check_with_review()),
                )
            })
            .collect::<Vec<_>>(),
        vec![
            (vec![], vec!["ID0083"]),
            (vec![], vec!["ID0084"]),
            (vec![], vec!["ID0085"]),
        ]
    );
}

#[test]
fn field_added_as_stable_needs_review() {
    assert_eq!(
        added_at_sites("{type: int, optional: true, stability: stable}", true),
        vec![vec!["ID0086"], vec!["ID0087"], vec!["ID0088"]]
    );
    assert_eq!(
        added_at_sites("{type: int, optional: true, stability: stable}", false),
        vec![Vec::<&str>::new(), vec![], vec![]]
    );
}

#[test]
fn internal_stability_behaves_as_unstable() {
    let snapshots = Snapshots::new();
    snapshots.foo(
        &single_field(Site::Param, "{type: int, stability: internal}", "", ""),
        &no_field(Site::Param),
    );
    assert!(snapshots.check().is_compatible());
}

#[test]
fn permitted_parameter_removal() {
    let fixture = |fields: &str| {
        common::idl(&format!(
            r#"
structs:
  EndSessionsReply:
    fields: {{}}

commands:
  endSessions:
    command_name: endSessions
    api_version: "1"
    namespace: ignored
    reply_type: EndSessionsReply{}
"#,
            fields
        ))
    };
    let snapshots = Snapshots::new();
    snapshots.foo(
        &fixture("\n    fields:\n      stmtId: {type: int, optional: true}"),
        &fixture(""),
    );
    assert!(snapshots.check().is_compatible());
}
