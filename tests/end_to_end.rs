use robdd::{apply, compose, exist, ite, make_set, nodecount, not, pathcount, replace, satcount, satone, Manager, Operator, ReplacePairs, VariableId};

fn var(m: &mut Manager, i: usize) -> robdd::NodeId {
    m.ithvar(VariableId::from(i)).unwrap()
}

#[test]
fn scenario_and_shares_the_smaller_subtree() {
    // setvarnum(5); a=ithvar(0); b=ithvar(1); c=apply(a,b,and);
    // var(c)==0, var(low(c))==5 (terminal), var(high(c))==1, low(c)==0.
    let mut m = Manager::with_config(robdd::ManagerConfig::default().with_node_num(1000).with_cache_size(100));
    m.set_varnum(5).unwrap();
    let a = var(&mut m, 0);
    let b = var(&mut m, 1);
    let c = apply(&mut m, Operator::And, a, b).unwrap();
    assert_eq!(m.var(c).unwrap(), VariableId::from(0usize));
    assert_eq!(m.low(c).unwrap(), robdd::NodeId::FALSE);
    let high = m.high(c).unwrap();
    assert_eq!(m.var(high).unwrap(), VariableId::from(1usize));
}

#[test]
fn scenario_xor_of_two_variables_over_three() {
    let mut m = Manager::new();
    m.set_varnum(3).unwrap();
    let f = var(&mut m, 0);
    let g = var(&mut m, 1);
    let r = apply(&mut m, Operator::Xor, f, g).unwrap();
    assert_eq!(satcount(&mut m, r).unwrap(), 4.0);
}

#[test]
fn scenario_pathcount_and_nodecount_of_a_shared_structure() {
    let mut m = Manager::new();
    m.set_varnum(4).unwrap();
    let v0 = var(&mut m, 0);
    let v1 = var(&mut m, 1);
    let v2 = var(&mut m, 2);
    let v3 = var(&mut m, 3);
    let and01 = apply(&mut m, Operator::And, v0, v1).unwrap();
    let or23 = apply(&mut m, Operator::Or, v2, v3).unwrap();
    let r = apply(&mut m, Operator::And, and01, or23).unwrap();
    assert_eq!(pathcount(&mut m, r).unwrap(), 2.0);
    assert_eq!(nodecount(&m, r).unwrap(), 4);
}

#[test]
fn scenario_exist_over_two_variables_is_tautology() {
    let mut m = Manager::new();
    m.set_varnum(3).unwrap();
    let cube = make_set(&mut m, &[VariableId::from(0usize), VariableId::from(2usize)]).unwrap();
    let v0 = var(&mut m, 0);
    let v2 = var(&mut m, 2);
    let r = apply(&mut m, Operator::Or, v0, v2).unwrap();
    assert_eq!(exist(&mut m, r, cube).unwrap(), robdd::NodeId::TRUE);
}

#[test]
fn scenario_satone_is_consistent_with_its_source() {
    let mut m = Manager::new();
    m.set_varnum(2).unwrap();
    let v0 = var(&mut m, 0);
    let v1 = var(&mut m, 1);
    let r = apply(&mut m, Operator::Biimp, v0, v1).unwrap();
    let s = satone(&mut m, r).unwrap();
    let not_r = not(&mut m, r).unwrap();
    assert_eq!(apply(&mut m, Operator::And, s, not_r).unwrap(), robdd::NodeId::FALSE);
    assert_ne!(s, robdd::NodeId::FALSE);
}

#[test]
fn scenario_replace_moves_a_variable_to_a_new_level() {
    let mut m = Manager::new();
    m.set_varnum(4).unwrap();
    let f = var(&mut m, 0);
    let v2 = VariableId::from(2usize);
    let pairs = ReplacePairs::new(&m, &[(VariableId::from(0usize), v2)]).unwrap();
    let r = replace(&mut m, f, &pairs).unwrap();
    assert_eq!(m.var(r).unwrap(), v2);
}

#[test]
fn law_apply_self_is_idempotent_or_resolves_to_constants() {
    let mut m = Manager::new();
    m.set_varnum(1).unwrap();
    let r = var(&mut m, 0);
    assert_eq!(apply(&mut m, Operator::And, r, r).unwrap(), r);
    assert_eq!(apply(&mut m, Operator::Or, r, r).unwrap(), r);
    assert_eq!(apply(&mut m, Operator::Xor, r, r).unwrap(), robdd::NodeId::FALSE);
    assert_eq!(apply(&mut m, Operator::Biimp, r, r).unwrap(), robdd::NodeId::TRUE);
}

#[test]
fn law_ite_with_constant_branches_matches_identity_and_negation() {
    let mut m = Manager::new();
    m.set_varnum(1).unwrap();
    let f = var(&mut m, 0);
    assert_eq!(ite(&mut m, f, robdd::NodeId::TRUE, robdd::NodeId::FALSE).unwrap(), f);
    assert_eq!(ite(&mut m, f, robdd::NodeId::FALSE, robdd::NodeId::TRUE).unwrap(), not(&mut m, f).unwrap());
}

#[test]
fn law_compose_with_its_own_variable_is_identity() {
    let mut m = Manager::new();
    m.set_varnum(2).unwrap();
    let v0 = var(&mut m, 0);
    let v1 = var(&mut m, 1);
    let r = apply(&mut m, Operator::And, v0, v1).unwrap();
    let composed = compose(&mut m, r, VariableId::from(0usize), v0).unwrap();
    assert_eq!(composed, r);
}

#[test]
fn law_satcount_of_constants_and_single_variable() {
    let mut m = Manager::new();
    m.set_varnum(3).unwrap();
    assert_eq!(satcount(&mut m, robdd::NodeId::FALSE).unwrap(), 0.0);
    assert_eq!(satcount(&mut m, robdd::NodeId::TRUE).unwrap(), 8.0);
    let v0 = var(&mut m, 0);
    assert_eq!(satcount(&mut m, v0).unwrap(), 4.0);
}
