use indexmap::IndexMap;
use serde_yaml::Value;
use tosca::{EntityKind, Topology};

const SCHEMA: &str = include_str!("../fixtures/schema.yaml");
const WORDPRESS: &str = include_str!("../fixtures/wordpress_topology.yaml");
const COMPUTE_ONLY: &str = include_str!("../fixtures/compute_only_topology.yaml");

fn schema() -> Value {
    serde_yaml::from_str(SCHEMA).unwrap()
}

fn load(document: &str) -> Topology {
    let schema = schema();
    let raw: Value = serde_yaml::from_str(document).unwrap();
    Topology::load(&schema, &raw).unwrap()
}

#[test]
fn inheritance_merge_is_a_superset_and_child_wins() {
    let hierarchy = {
        let mut h = tosca::TypeHierarchy::new();
        h.load_schema(&schema()).unwrap();
        h
    };
    let compute = hierarchy.get("tosca.nodes.Compute", Some(EntityKind::Nodes), true).unwrap();
    let node = compute.as_node().unwrap();
    assert!(node.properties.contains_key("num_cpus"));
    assert!(node.properties.contains_key("instance_ip"));

    let wordpress_iface = hierarchy
        .get("tosca.interfaces.WordPressLifecycle", Some(EntityKind::Interfaces), true)
        .unwrap();
    let iface = wordpress_iface.as_interface().unwrap();
    // inherited from Standard
    assert!(iface.operations.contains_key("create"));
    // declared on WordPressLifecycle itself
    assert!(iface.operations.contains_key("configure"));
}

#[test]
fn name_resolution_is_symmetric() {
    let mut hierarchy = tosca::TypeHierarchy::new();
    hierarchy.load_schema(&schema()).unwrap();
    let by_qualified = hierarchy.get("tosca.nodes.Compute", None, true).unwrap();
    let by_short = hierarchy.get("Compute", None, false).unwrap();
    assert_eq!(by_qualified.tosca_name, by_short.tosca_name);
}

#[test]
fn cyclic_derivation_is_rejected() {
    let raw: Value = serde_yaml::from_str(
        "tosca.nodes.A:\n  derived_from: tosca.nodes.B\ntosca.nodes.B:\n  derived_from: tosca.nodes.A\n",
    )
    .unwrap();
    let mut hierarchy = tosca::TypeHierarchy::new();
    let err = hierarchy.load_schema(&raw).unwrap_err();
    assert!(matches!(err, tosca::SchemaError::CyclicDerivation { .. }));
}

#[test]
fn loading_the_same_document_twice_is_idempotent() {
    let topology_a = load(WORDPRESS);
    let topology_b = load(WORDPRESS);
    assert_eq!(topology_a.tosca_version(), topology_b.tosca_version());
    let a = topology_a.get_template("wordpress").unwrap().unwrap();
    let b = topology_b.get_template("wordpress").unwrap().unwrap();
    assert_eq!(a.property("admin_user").unwrap().value().unwrap(), b.property("admin_user").unwrap().value().unwrap());
}

#[test]
fn input_binding_is_observed_by_get_input_and_by_deferred_properties() {
    let topology = load(WORDPRESS);
    let mut values = IndexMap::new();
    values.insert("admin_password".to_string(), Value::from("hunter2"));
    topology.bind_inputs(&values).unwrap();

    assert_eq!(topology.get_input("admin_password").unwrap().value(), Some(Value::from("hunter2")));

    let wordpress = topology.get_template("wordpress").unwrap().unwrap();
    let admin_password = wordpress.property("admin_password").unwrap().value().unwrap();
    assert_eq!(admin_password, Some(Value::from("hunter2")));
}

#[test]
fn binding_an_input_twice_is_rejected() {
    let topology = load(WORDPRESS);
    let mut values = IndexMap::new();
    values.insert("admin_password".to_string(), Value::from("hunter2"));
    topology.bind_inputs(&values).unwrap();
    let err = topology.bind_inputs(&values).unwrap_err();
    assert!(matches!(err, tosca::TopologyError::InputAlreadyBound { .. }));
}

#[test]
fn reference_resolution_reaches_across_templates() {
    let topology = load(WORDPRESS);
    let wordpress = topology.get_template("wordpress").unwrap().unwrap();
    let configure = wordpress.interfaces().unwrap().into_iter().find(|op| op.name() == "configure").unwrap();
    let db_password = configure.property("db_password").unwrap().value().unwrap();
    assert_eq!(db_password, Some(Value::from("secret")));

    let mysql_database = topology.get_template("mysql_database").unwrap().unwrap();
    let endpoint = mysql_database.capability("database_endpoint").unwrap().unwrap();
    let port = endpoint.property("port").unwrap().value().unwrap();
    assert_eq!(port, Some(Value::from(3107)));
}

#[test]
fn requirement_binding_pairs_slots_with_targets_and_relation_classes() {
    let topology = load(WORDPRESS);
    let wordpress = topology.get_template("wordpress").unwrap().unwrap();
    let requirements = wordpress.requirements().unwrap();

    let host = requirements.iter().find(|r| r.name() == "host").unwrap();
    assert_eq!(host.target().unwrap().unwrap().name(), "webserver");
    assert_eq!(host.type_descriptor().short_name(), "HostedOn");

    let database_endpoint = requirements.iter().find(|r| r.name() == "database_endpoint").unwrap();
    assert_eq!(database_endpoint.target().unwrap().unwrap().name(), "mysql_database");
    assert_eq!(database_endpoint.type_descriptor().short_name(), "ConnectsTo");

    let dependency = requirements.iter().find(|r| r.name() == "dependency").unwrap();
    assert!(dependency.target().unwrap().is_none());
}

#[test]
fn deferred_output_is_undefined_until_the_template_property_is_set() {
    let schema = schema();
    let raw: Value = serde_yaml::from_str(COMPUTE_ONLY).unwrap();
    let topology = Topology::load(&schema, &raw).unwrap();

    let my_server = topology.get_template("my_server").unwrap().unwrap();
    let num_cpus = my_server.property("num_cpus").unwrap().value().unwrap();
    assert_eq!(num_cpus, Some(Value::from(4)));

    assert_eq!(topology.get_output("instance_ip").unwrap().value().unwrap(), None);

    topology.set_node_property("my_server", "instance_ip", Value::from("192.168.1.10"));
    assert_eq!(
        topology.get_output("instance_ip").unwrap().value().unwrap(),
        Some(Value::from("192.168.1.10"))
    );
}

#[test]
fn wordpress_validates_cleanly_on_the_canonical_document() {
    let topology = load(WORDPRESS);
    let wordpress = topology.get_template("wordpress").unwrap().unwrap();
    assert_eq!(wordpress.validate(), Vec::<String>::new());
}

#[test]
fn get_ref_property_from_an_output_position_is_rejected() {
    let topology = load(WORDPRESS);
    let err = topology.get_output("wordpress_db_password").unwrap().value().unwrap_err();
    assert!(matches!(err, tosca::ResolveError::UnknownSlot { .. }));
}

#[test]
fn get_property_succeeds_from_an_output_position() {
    let topology = load(WORDPRESS);
    let value = topology.get_output("database_name").unwrap().value().unwrap();
    assert_eq!(value, Some(Value::from("wordpress")));
}
