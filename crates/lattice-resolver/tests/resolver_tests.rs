use lattice_common::Interner;
use lattice_common::diagnostics::diagnostic_codes;
use lattice_model::{
    Accessor, Binding, ContextualTypeKey, DeclarationId, DeclarationInfo, DeclarationKind,
    DeclarationStore, GraphDeclaration, MultibindingKind, Parameter, Parameters, Scope,
    TypeInterner, TypeKey,
};
use lattice_resolver::errors::ResolutionErrorKind;
use lattice_resolver::{BindingGraph, GraphResolver};
use smallvec::SmallVec;

struct Fixture {
    names: Interner,
    types: TypeInterner,
    decls: DeclarationStore,
}

impl Fixture {
    fn new() -> Self {
        Self {
            names: Interner::new(),
            types: TypeInterner::new(),
            decls: DeclarationStore::new(),
        }
    }

    fn key(&mut self, name: &str) -> TypeKey {
        TypeKey::new(self.types.named(self.names.intern(name)))
    }

    fn graph(&mut self, name: &str, primary_scope: Option<Scope>) -> GraphDeclaration {
        let declaration = self.decls.register(DeclarationInfo {
            name: self.names.intern(name),
            kind: DeclarationKind::Graph,
        });
        GraphDeclaration {
            declaration,
            primary_scope,
            additional_scopes: SmallVec::new(),
            excludes: SmallVec::new(),
            accessors: Vec::new(),
            providers: Vec::new(),
            bound_instances: Vec::new(),
            extended_parents: SmallVec::new(),
        }
    }

    fn accessor(&mut self, name: &str, key: ContextualTypeKey) -> Accessor {
        Accessor {
            name: self.names.intern(name),
            key,
        }
    }

    /// Constructor binding for `key` with one value parameter per
    /// dependency.
    fn constructor(
        &mut self,
        class_name: &str,
        key: &TypeKey,
        dependencies: Vec<ContextualTypeKey>,
        scope: Option<Scope>,
    ) -> Binding {
        let class = self.decls.register(DeclarationInfo {
            name: self.names.intern(class_name),
            kind: DeclarationKind::Class,
        });
        let parameters = Parameters::of(dependencies.into_iter().enumerate().map(|(i, dep)| {
            Parameter::value(self.names.intern(&format!("p{i}")), dep)
        }));
        Binding::ConstructorInjected {
            class,
            type_key: key.clone(),
            parameters,
            scope,
        }
    }
}

#[test]
fn plan_is_post_ordered_and_deterministic() {
    let mut fx = Fixture::new();
    let repo = fx.key("Repo");
    let service = fx.key("Service");
    let view = fx.key("View");

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.Repo", &repo, vec![], None))
        .unwrap();
    graph
        .put(fx.constructor(
            "app.Service",
            &service,
            vec![ContextualTypeKey::plain(repo.clone())],
            None,
        ))
        .unwrap();
    graph
        .put(fx.constructor(
            "app.View",
            &view,
            vec![ContextualTypeKey::plain(service.clone())],
            None,
        ))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("view", ContextualTypeKey::plain(view.clone()))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert!(plan.position(&repo).unwrap() < plan.position(&service).unwrap());
    assert!(plan.position(&service).unwrap() < plan.position(&view).unwrap());

    // Resolving the same graph again yields a byte-identical plan.
    let again = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    let first = serde_json::to_string(&plan.summary(&fx.types, &fx.names)).unwrap();
    let second = serde_json::to_string(&again.summary(&fx.types, &fx.names)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn scoped_binding_is_constructed_once_with_one_slot() {
    let mut fx = Fixture::new();
    let app = Scope::marker(fx.names.intern("AppScope"));
    let session = fx.key("Session");
    let left = fx.key("LeftView");
    let right = fx.key("RightView");

    let mut graph_decl = fx.graph("app.AppGraph", Some(app.clone()));
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.Session", &session, vec![], Some(app)))
        .unwrap();
    for (name, key) in [("app.LeftView", &left), ("app.RightView", &right)] {
        graph
            .put(fx.constructor(
                name,
                key,
                vec![ContextualTypeKey::plain(session.clone())],
                None,
            ))
            .unwrap();
    }
    graph.seal();
    graph_decl.accessors = vec![
        fx.accessor("left", ContextualTypeKey::plain(left)),
        fx.accessor("right", ContextualTypeKey::plain(right)),
    ];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    let session_entries = plan
        .iter()
        .filter(|entry| entry.type_key == session)
        .count();
    assert_eq!(session_entries, 1);
    assert_eq!(plan.singleton_slots.get(&session), Some(&0));
    assert_eq!(plan.singleton_slots.len(), 1);
}

#[test]
fn unscoped_bindings_get_no_singleton_slot() {
    let mut fx = Fixture::new();
    let widget = fx.key("Widget");
    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.Widget", &widget, vec![], None))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("widget", ContextualTypeKey::plain(widget))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert_eq!(plan.len(), 1);
    assert!(plan.singleton_slots.is_empty());
}

#[test]
fn eager_cycle_fails_and_provider_edge_breaks_it() {
    let mut fx = Fixture::new();
    let a = fx.key("A");
    let b = fx.key("B");

    // A -> B -> A, all eager.
    let mut graph_decl = fx.graph("app.CycleGraph", None);
    let mut eager = BindingGraph::new(graph_decl.declaration);
    eager
        .put(fx.constructor("app.A", &a, vec![ContextualTypeKey::plain(b.clone())], None))
        .unwrap();
    eager
        .put(fx.constructor("app.B", &b, vec![ContextualTypeKey::plain(a.clone())], None))
        .unwrap();
    eager.seal();
    graph_decl.accessors = vec![fx.accessor("a", ContextualTypeKey::plain(a.clone()))];

    let err = GraphResolver::new(&eager, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::DEPENDENCY_CYCLE);
    match &err.kind {
        ResolutionErrorKind::DependencyCycle { cycle } => {
            assert_eq!(cycle.as_slice(), &[a.clone(), b.clone(), a.clone()]);
        }
        other => panic!("expected a cycle, got {other:?}"),
    }

    // Same shape with B -> Provider<A>: resolvable.
    let graph_decl = {
        let mut decl = fx.graph("app.DeferredGraph", None);
        decl.accessors = vec![fx.accessor("a", ContextualTypeKey::plain(a.clone()))];
        decl
    };
    let mut deferred = BindingGraph::new(graph_decl.declaration);
    deferred
        .put(fx.constructor(
            "app.A2",
            &a,
            vec![ContextualTypeKey::plain(b.clone())],
            None,
        ))
        .unwrap();
    deferred
        .put(fx.constructor(
            "app.B2",
            &b,
            vec![ContextualTypeKey::provider(a.clone())],
            None,
        ))
        .unwrap();
    deferred.seal();

    let plan = GraphResolver::new(&deferred, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    // The deferred consumer is placed before the binding it defers on.
    assert!(plan.position(&b).unwrap() < plan.position(&a).unwrap());
}

#[test]
fn eager_self_cycle_is_always_an_error() {
    let mut fx = Fixture::new();
    let a = fx.key("A");
    let mut graph_decl = fx.graph("app.SelfGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.A", &a, vec![ContextualTypeKey::plain(a.clone())], None))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("a", ContextualTypeKey::plain(a))];

    let err = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::DEPENDENCY_CYCLE);
}

#[test]
fn lazy_self_cycle_is_permitted() {
    let mut fx = Fixture::new();
    let cache = fx.key("Cache");
    let mut graph_decl = fx.graph("app.LazyGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor(
            "app.Cache",
            &cache,
            vec![ContextualTypeKey::lazy(cache.clone())],
            None,
        ))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("cache", ContextualTypeKey::plain(cache.clone()))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert_eq!(plan.position(&cache), Some(0));
}

#[test]
fn qualified_request_never_matches_an_unqualified_binding() {
    let mut fx = Fixture::new();
    let iface_ty = fx.types.named(fx.names.intern("ContributedInterface"));
    let unqualified = TypeKey::new(iface_ty);
    let named = lattice_model::Qualifier(
        lattice_model::Annotation::marker(fx.names.intern("Named")).with_argument(
            fx.names.intern("value"),
            lattice_model::AnnotationValue::Str(fx.names.intern("named")),
        ),
    );
    let qualified = TypeKey::qualified(iface_ty, named);

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.Impl", &unqualified, vec![], None))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("iface", ContextualTypeKey::plain(qualified))];

    let err = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::MISSING_BINDING);
}

#[test]
fn scope_rejection_and_additional_scope_admission() {
    let mut fx = Fixture::new();
    let app = Scope::marker(fx.names.intern("AppScope"));
    let logged_in = Scope::marker(fx.names.intern("LoggedInScope"));
    let session = fx.key("Session");

    let binding = fx.constructor("app.Session", &session, vec![], Some(logged_in.clone()));

    let mut graph_decl = fx.graph("app.AppGraph", Some(app.clone()));
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph.put(binding.clone()).unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("session", ContextualTypeKey::plain(session.clone()))];

    let err = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap_err();
    assert_eq!(err.code(), diagnostic_codes::INCOMPATIBLE_SCOPE);

    // Declaring the scope as an additional scope admits the binding.
    let mut wider_decl = fx.graph("app.WiderGraph", Some(app));
    wider_decl.additional_scopes.push(logged_in);
    wider_decl.accessors = vec![fx.accessor("session", ContextualTypeKey::plain(session.clone()))];
    let mut wider = BindingGraph::new(wider_decl.declaration);
    wider.put(binding).unwrap();
    wider.seal();

    let plan = GraphResolver::new(&wider, &wider_decl)
        .resolve(&wider_decl.accessors)
        .unwrap();
    assert!(plan.singleton_slots.contains_key(&session));
}

#[test]
fn parent_graph_satisfies_a_missing_local_binding() {
    let mut fx = Fixture::new();
    let config = fx.key("Config");

    let parent_decl = fx.graph("app.ParentGraph", None);
    let mut parent = BindingGraph::new(parent_decl.declaration);
    parent
        .put(fx.constructor("app.Config", &config, vec![], None))
        .unwrap();
    parent.seal();

    let mut child_decl = fx.graph("app.ChildGraph", None);
    child_decl.accessors = vec![fx.accessor("config", ContextualTypeKey::plain(config.clone()))];
    let mut child = BindingGraph::new(child_decl.declaration);
    child.seal();

    let plan = GraphResolver::with_parents(
        &child,
        &child_decl,
        vec![(parent_decl.declaration, &parent)],
    )
    .resolve(&child_decl.accessors)
    .unwrap();

    assert_eq!(plan.len(), 1);
    assert!(matches!(
        &plan.entries[0].binding,
        Binding::GraphDependency { graph, .. } if *graph == parent_decl.declaration
    ));
}

#[test]
fn defaulted_request_resolves_to_absent() {
    let mut fx = Fixture::new();
    let greeting = fx.key("Greeting");
    let widget = fx.key("Widget");

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor(
            "app.Widget",
            &widget,
            vec![ContextualTypeKey::plain(greeting.clone()).with_default()],
            None,
        ))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("widget", ContextualTypeKey::plain(widget.clone()))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert!(matches!(
        &plan.entries[plan.position(&greeting).unwrap()].binding,
        Binding::Absent { .. }
    ));
    assert!(plan.position(&greeting).unwrap() < plan.position(&widget).unwrap());
}

#[test]
fn multibinding_container_collects_elements_in_discovery_order() {
    let mut fx = Fixture::new();
    let plugin = fx.types.named(fx.names.intern("Plugin"));
    let container = TypeKey::new(fx.types.generic(fx.names.intern("Set"), [plugin]));
    let first = fx.key("FirstPlugin");
    let second = fx.key("SecondPlugin");

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    let first_binding = fx.constructor("app.FirstPlugin", &first, vec![], None);
    let second_binding = fx.constructor("app.SecondPlugin", &second, vec![], None);
    graph
        .contribute(container.clone(), MultibindingKind::Set, None, first_binding)
        .unwrap();
    graph
        .contribute(
            container.clone(),
            MultibindingKind::Set,
            None,
            second_binding,
        )
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("plugins", ContextualTypeKey::plain(container.clone()))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.entries[0].type_key, first);
    assert_eq!(plan.entries[1].type_key, second);
    match &plan.entries[2].binding {
        Binding::Multibinding { kind, elements, .. } => {
            assert_eq!(*kind, MultibindingKind::Set);
            assert_eq!(elements.as_slice(), &[first, second]);
        }
        other => panic!("expected the collect binding, got {other:?}"),
    }
}

#[test]
fn missing_binding_diagnostic_carries_the_request_chain() {
    let mut fx = Fixture::new();
    let service = fx.key("Service");
    let repo = fx.key("Repo");

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor(
            "app.Service",
            &service,
            vec![ContextualTypeKey::plain(repo)],
            None,
        ))
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("service", ContextualTypeKey::plain(service))];

    let err = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap_err();
    assert_eq!(err.stack.len(), 2);

    let diagnostic = err.into_diagnostic(&fx.decls, &fx.names, &fx.types);
    assert_eq!(diagnostic.code, diagnostic_codes::MISSING_BINDING);
    assert_eq!(
        diagnostic.message_text,
        "No binding found for 'Repo'. Requested by 'Service'."
    );
    assert_eq!(diagnostic.related_information.len(), 2);
    assert_eq!(diagnostic.related_information[0].origin, "app.AppGraph");
    assert_eq!(
        diagnostic.related_information[0].message_text,
        "requires 'Service'"
    );
    assert_eq!(diagnostic.related_information[1].origin, "Service");
    assert_eq!(
        diagnostic.related_information[1].message_text,
        "requires 'Repo'"
    );
}

#[test]
fn alias_is_emitted_after_its_target() {
    let mut fx = Fixture::new();
    let iface = fx.key("Iface");
    let impl_key = fx.key("Impl");
    let origin = fx.decls.register(DeclarationInfo {
        name: fx.names.intern("app.Impl"),
        kind: DeclarationKind::Class,
    });

    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(fx.constructor("app.Impl", &impl_key, vec![], None))
        .unwrap();
    graph
        .put(Binding::Alias {
            type_key: iface.clone(),
            target: impl_key.clone(),
            origin,
        })
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("iface", ContextualTypeKey::plain(iface.clone()))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert!(plan.position(&impl_key).unwrap() < plan.position(&iface).unwrap());
}

#[test]
fn bound_instances_resolve_without_dependencies() {
    let mut fx = Fixture::new();
    let token = fx.key("AuthToken");
    let mut graph_decl = fx.graph("app.AppGraph", None);
    let mut graph = BindingGraph::new(graph_decl.declaration);
    graph
        .put(Binding::BoundInstance {
            origin: graph_decl.declaration,
            parameter_name: fx.names.intern("authToken"),
            type_key: token.clone(),
        })
        .unwrap();
    graph.seal();
    graph_decl.accessors = vec![fx.accessor("token", ContextualTypeKey::plain(token))];

    let plan = GraphResolver::new(&graph, &graph_decl)
        .resolve(&graph_decl.accessors)
        .unwrap();
    assert_eq!(plan.len(), 1);
    assert!(matches!(
        &plan.entries[0].binding,
        Binding::BoundInstance { .. }
    ));
}
