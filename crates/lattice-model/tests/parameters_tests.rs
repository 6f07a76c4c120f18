use lattice_common::Interner;
use lattice_model::{
    ContextualTypeKey, Parameter, ParameterFlags, ParameterKind, Parameters, TypeInterner, TypeKey,
};

fn param(names: &mut Interner, types: &TypeInterner, name: &str, ty: &str) -> Parameter {
    let key = TypeKey::new(types.named(names.intern(ty)));
    Parameter::value(names.intern(name), ContextualTypeKey::plain(key))
}

#[test]
fn parameters_order_is_deterministic_and_structural() {
    let mut names = Interner::new();
    let types = TypeInterner::new();

    let a = Parameters::of([
        param(&mut names, &types, "first", "A"),
        param(&mut names, &types, "second", "B"),
    ]);
    let b = Parameters::of([
        param(&mut names, &types, "first", "A"),
        param(&mut names, &types, "second", "B"),
    ]);
    let reordered = Parameters::of([
        param(&mut names, &types, "second", "B"),
        param(&mut names, &types, "first", "A"),
    ]);

    assert_eq!(a, b);
    // Declaration order is part of the identity.
    assert_ne!(a, reordered);
}

#[test]
fn comparator_puts_instance_before_receiver_before_values() {
    let mut names = Interner::new();
    let types = TypeInterner::new();

    let mut instance = param(&mut names, &types, "this", "Owner");
    instance.kind = ParameterKind::Instance;
    let mut receiver = param(&mut names, &types, "recv", "Ext");
    receiver.kind = ParameterKind::ExtensionReceiver;

    let params = Parameters {
        instance: Some(instance),
        extension_receiver: Some(receiver),
        value_parameters: [param(&mut names, &types, "v", "V")].into_iter().collect(),
    };
    let kinds: Vec<ParameterKind> = params.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ParameterKind::Instance,
            ParameterKind::ExtensionReceiver,
            ParameterKind::Value
        ]
    );
}

#[test]
fn graph_instance_flags_are_preserved() {
    let mut names = Interner::new();
    let types = TypeInterner::new();
    let p = param(&mut names, &types, "config", "Config").with_flags(ParameterFlags {
        is_binds_instance: true,
        ..ParameterFlags::default()
    });
    assert!(p.flags.is_binds_instance);
    assert!(!p.flags.is_assisted);
    // Bound instances still count as graph dependencies for signature
    // purposes; only assisted parameters are call-site supplied.
    let params = Parameters::of([p]);
    assert_eq!(params.graph_dependencies().count(), 1);
}

#[test]
fn defaulted_parameter_keeps_key_and_flag_in_sync() {
    let mut names = Interner::new();
    let types = TypeInterner::new();
    let key = TypeKey::new(types.named(names.intern("Config")));
    let p = Parameter::value(
        names.intern("config"),
        ContextualTypeKey::plain(key).with_default(),
    )
    .with_flags(ParameterFlags::default());
    assert!(p.flags.has_default);
    assert!(p.contextual_key.has_default);
}
