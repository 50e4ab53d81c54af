//! Integration tests for solving circuit construction kit circuits.

use std::cell::RefCell;
use std::rc::Rc;

use approx::assert_relative_eq;
use cck_core::circuit::CircuitEvent;
use cck_core::solver::DEFAULT_MIN_RESISTANCE;
use cck_core::{
    solve, BranchId, CckError, Circuit, CircuitSolver, JunctionId, SolveOutcome, SolverConfig,
};

/// Sum of currents entering each junction minus currents leaving it.
fn kcl_residuals(circuit: &Circuit) -> Vec<(JunctionId, f64)> {
    circuit
        .junctions()
        .map(|j| {
            let net: f64 = circuit
                .branches_at(j.id())
                .map(|b| if b.end() == j.id() { b.current() } else { -b.current() })
                .sum();
            (j.id(), net)
        })
        .collect()
}

/// KCL holds to 1e-9 of the largest current, plus the resolution of a
/// node voltage divided by the smallest resistance a branch can have.
fn assert_kcl(circuit: &Circuit) {
    let max_current = circuit.branches().fold(0.0f64, |m, b| m.max(b.current().abs()));
    let max_voltage = circuit.junctions().fold(0.0f64, |m, j| m.max(j.voltage().abs()));
    let tolerance =
        1e-9 * max_current + 64.0 * f64::EPSILON * max_voltage / DEFAULT_MIN_RESISTANCE;
    for (junction, net) in kcl_residuals(circuit) {
        assert!(
            net.abs() <= tolerance,
            "KCL violated at {}: net current {}",
            junction,
            net
        );
    }
}

fn current(circuit: &Circuit, id: BranchId) -> f64 {
    circuit.branch(id).unwrap().current()
}

fn voltage_drop(circuit: &Circuit, id: BranchId) -> f64 {
    circuit.branch(id).unwrap().voltage_drop()
}

/// Test a single battery driving a single resistor:
///
/// ```text
///     neg ---[ V = 9V ]--- pos
///      |                    |
///      +------[ 3 ohm ]-----+
/// ```
///
/// Expected: I = 3A, flowing out of the battery's positive terminal.
#[test]
fn test_single_loop_ohms_law() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 9.0).unwrap();
    let resistor = c.add_resistor(pos, neg, 3.0).unwrap();

    let report = solve(&mut c).unwrap();
    assert_eq!(report.outcome, SolveOutcome::Solved);

    assert_relative_eq!(current(&c, battery), 3.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, resistor), 3.0, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, resistor), 9.0, max_relative = 1e-9);
    assert_relative_eq!(c.voltage_between(pos, neg).unwrap(), 9.0, max_relative = 1e-9);
    assert_kcl(&c);
}

/// Locks in the battery source-current sign: a discharging battery reports
/// a positive current (negative to positive terminal inside the battery)
/// and a negative voltage drop.
#[test]
fn test_battery_current_sign_regression() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 9.0).unwrap();
    // Resistor oriented against the loop direction
    let resistor = c.add_resistor(neg, pos, 3.0).unwrap();

    solve(&mut c).unwrap();

    assert!(current(&c, battery) > 0.0);
    assert_relative_eq!(current(&c, battery), 3.0, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, battery), -9.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, resistor), -3.0, max_relative = 1e-9);
    assert!(c.branch(battery).unwrap().power() < 0.0);
    assert!(c.branch(resistor).unwrap().power() > 0.0);

    // Flipping the battery flips every sign
    c.reverse_branch(battery).unwrap();
    solve(&mut c).unwrap();
    assert_relative_eq!(current(&c, battery), 3.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, resistor), 3.0, max_relative = 1e-9);
}

#[test]
fn test_degenerate_circuit_is_cleared() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 9.0).unwrap();
    let resistor = c.add_resistor(pos, neg, 3.0).unwrap();
    solve(&mut c).unwrap();
    assert!(current(&c, battery) != 0.0);

    c.remove_branch(resistor).unwrap();
    let report = solve(&mut c).unwrap();
    assert_eq!(report.outcome, SolveOutcome::Degenerate);
    assert_eq!(current(&c, battery), 0.0);
    assert_eq!(voltage_drop(&c, battery), 0.0);
    assert_eq!(c.junction_voltage(pos), Some(0.0));

    let mut empty = Circuit::new();
    assert_eq!(solve(&mut empty).unwrap().outcome, SolveOutcome::Degenerate);
}

#[test]
fn test_solve_is_idempotent() {
    let mut c = Circuit::new();
    let j: Vec<JunctionId> = (0..4).map(|_| c.add_junction()).collect();
    c.add_battery(j[0], j[1], 6.0).unwrap();
    c.add_resistor(j[1], j[2], 47.0).unwrap();
    c.add_resistor(j[2], j[3], 22.0).unwrap();
    c.add_resistor(j[2], j[0], 100.0).unwrap();
    c.add_wire(j[3], j[0]).unwrap();

    solve(&mut c).unwrap();
    let first: Vec<(f64, f64)> = c.branches().map(|b| (b.voltage_drop(), b.current())).collect();
    solve(&mut c).unwrap();
    let second: Vec<(f64, f64)> = c.branches().map(|b| (b.voltage_drop(), b.current())).collect();
    assert_eq!(first, second);
}

/// Two resistors in series across a battery:
///
/// ```text
///     neg ---[ V = 12V ]--- pos ---[ R1 = 100 ]--- mid ---[ R2 = 200 ]--- neg
/// ```
///
/// Expected: I = 40mA, drop across R1 = 4V.
#[test]
fn test_series_resistors() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let mid = c.add_junction();
    let battery = c.add_battery(neg, pos, 12.0).unwrap();
    let r1 = c.add_resistor(pos, mid, 100.0).unwrap();
    let r2 = c.add_resistor(mid, neg, 200.0).unwrap();

    solve(&mut c).unwrap();

    assert_relative_eq!(current(&c, battery), 0.04, max_relative = 1e-9);
    assert_relative_eq!(current(&c, r1), 0.04, max_relative = 1e-9);
    assert_relative_eq!(current(&c, r2), 0.04, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, r1), 4.0, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, r2), 8.0, max_relative = 1e-9);
    assert_kcl(&c);
}

/// Two resistors in parallel across a battery.
///
/// Expected: total I = V * (1/R1 + 1/R2), branch currents V / Ri.
#[test]
fn test_parallel_resistors() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 10.0).unwrap();
    let r1 = c.add_resistor(pos, neg, 10.0).unwrap();
    let r2 = c.add_resistor(pos, neg, 40.0).unwrap();

    solve(&mut c).unwrap();

    assert_relative_eq!(current(&c, battery), 1.25, max_relative = 1e-9);
    assert_relative_eq!(current(&c, r1), 1.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, r2), 0.25, max_relative = 1e-9);
    assert_kcl(&c);
}

/// Unbalanced Wheatstone bridge with a galvanometer resistor across the
/// middle; checks KCL at every junction of a non-trivial mesh.
#[test]
fn test_bridge_satisfies_kcl() {
    let mut c = Circuit::new();
    let bottom = c.add_junction();
    let top = c.add_junction();
    let left = c.add_junction();
    let right = c.add_junction();
    c.add_battery(bottom, top, 5.0).unwrap();
    c.add_resistor(top, left, 100.0).unwrap();
    c.add_resistor(top, right, 220.0).unwrap();
    c.add_resistor(left, bottom, 330.0).unwrap();
    c.add_resistor(right, bottom, 150.0).unwrap();
    let galvanometer = c.add_resistor(left, right, 50.0).unwrap();

    solve(&mut c).unwrap();

    assert_kcl(&c);
    assert!(current(&c, galvanometer).abs() > 1e-6);
    // Reference is the lowest-index junction
    assert_eq!(c.junction_voltage(bottom), Some(0.0));
    assert_relative_eq!(c.junction_voltage(top).unwrap(), 5.0, max_relative = 1e-9);
}

#[test]
fn test_balanced_bridge_has_no_middle_current() {
    let mut c = Circuit::new();
    let bottom = c.add_junction();
    let top = c.add_junction();
    let left = c.add_junction();
    let right = c.add_junction();
    c.add_battery(bottom, top, 5.0).unwrap();
    c.add_resistor(top, left, 100.0).unwrap();
    c.add_resistor(top, right, 200.0).unwrap();
    c.add_resistor(left, bottom, 300.0).unwrap();
    c.add_resistor(right, bottom, 600.0).unwrap();
    let middle = c.add_resistor(left, right, 50.0).unwrap();

    solve(&mut c).unwrap();
    assert!(current(&c, middle).abs() < 1e-12);
}

/// Two loops with no connection between them, each with its own battery.
#[test]
fn test_disconnected_loops_solve_independently() {
    let mut c = Circuit::new();
    let a_neg = c.add_junction();
    let b_neg = c.add_junction();
    let a_pos = c.add_junction();
    let b_pos = c.add_junction();
    let a_bat = c.add_battery(a_neg, a_pos, 9.0).unwrap();
    let a_res = c.add_resistor(a_pos, a_neg, 3.0).unwrap();
    let b_bat = c.add_battery(b_neg, b_pos, 1.5).unwrap();
    let b_res = c.add_resistor(b_pos, b_neg, 0.5).unwrap();

    let report = solve(&mut c).unwrap();
    assert_eq!(report.components, 2);

    assert_relative_eq!(current(&c, a_bat), 3.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, a_res), 3.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, b_bat), 3.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, b_res), 3.0, max_relative = 1e-9);
    assert_eq!(c.junction_voltage(a_neg), Some(0.0));
    assert_eq!(c.junction_voltage(b_neg), Some(0.0));
    assert_kcl(&c);
}

#[test]
fn test_dangling_branches_carry_no_current() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let stub = c.add_junction();
    let floating_a = c.add_junction();
    let floating_b = c.add_junction();
    let battery = c.add_battery(neg, pos, 9.0).unwrap();
    let dangling = c.add_resistor(pos, stub, 10.0).unwrap();
    let island = c.add_resistor(floating_a, floating_b, 10.0).unwrap();

    solve(&mut c).unwrap();
    assert!(current(&c, battery).abs() < 1e-12);
    assert!(current(&c, dangling).abs() < 1e-12);
    assert!(current(&c, island).abs() < 1e-12);
    assert_relative_eq!(c.junction_voltage(stub).unwrap(), 9.0, max_relative = 1e-12);
}

#[test]
fn test_short_across_battery_clamps_to_floor() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 1.5).unwrap();
    let short = c.add_resistor(pos, neg, 1e-12).unwrap();

    solve(&mut c).unwrap();

    let i = current(&c, short);
    assert!(i.is_finite());
    assert_relative_eq!(i, 1.5 / 1e-4, max_relative = 1e-9);
    assert_relative_eq!(current(&c, battery), i, max_relative = 1e-9);

    // A plain wire behaves the same way
    c.replace_component(short, cck_core::Resistor::wire()).unwrap();
    solve(&mut c).unwrap();
    assert!(current(&c, short).is_finite());
}

#[test]
fn test_conflicting_batteries_are_singular() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let b1 = c.add_battery(neg, pos, 1.5).unwrap();
    let r = c.add_resistor(pos, neg, 3.0).unwrap();
    solve(&mut c).unwrap();
    let before_r = current(&c, r);
    let before_b1 = current(&c, b1);

    let events = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&events);
    c.subscribe(Box::new(move |_: &CircuitEvent, _: &Circuit| {
        *sink.borrow_mut() += 1;
    }));

    c.add_battery(neg, pos, 3.0).unwrap();
    assert_eq!(solve(&mut c), Err(CckError::SingularMatrix));

    // Previous state stays in place, nothing is NaN, nobody was notified
    assert_eq!(current(&c, r), before_r);
    assert_eq!(current(&c, b1), before_b1);
    assert_relative_eq!(before_r, 0.5, max_relative = 1e-9);
    assert!(c.branches().all(|b| b.current().is_finite() && b.voltage_drop().is_finite()));
    assert_eq!(*events.borrow(), 0);
}

#[test]
fn test_internal_resistance_lowers_terminal_voltage() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 10.0).unwrap();
    c.set_internal_resistance(battery, 1.0).unwrap();
    let load = c.add_resistor(pos, neg, 4.0).unwrap();

    solve(&mut c).unwrap();

    assert_relative_eq!(current(&c, battery), 2.0, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, load), 8.0, max_relative = 1e-9);
    assert_relative_eq!(voltage_drop(&c, battery), -8.0, max_relative = 1e-9);
}

#[test]
fn test_internal_resistance_allows_parallel_batteries() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let b1 = c.add_battery(neg, pos, 3.0).unwrap();
    let b2 = c.add_battery(neg, pos, 1.0).unwrap();
    c.set_internal_resistance(b1, 1.0).unwrap();
    c.set_internal_resistance(b2, 1.0).unwrap();

    solve(&mut c).unwrap();

    // The stronger battery charges the weaker one
    assert_relative_eq!(current(&c, b1), 1.0, max_relative = 1e-9);
    assert_relative_eq!(current(&c, b2), -1.0, max_relative = 1e-9);
    assert_relative_eq!(c.voltage_between(pos, neg).unwrap(), 2.0, max_relative = 1e-9);
    assert_kcl(&c);
}

#[test]
fn test_open_switch_breaks_loop() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let gap = c.add_junction();
    let battery = c.add_battery(neg, pos, 9.0).unwrap();
    let resistor = c.add_resistor(pos, gap, 3.0).unwrap();
    let switch = c.add_switch(gap, neg, false).unwrap();

    solve(&mut c).unwrap();
    assert!(current(&c, battery).abs() < 1e-12);
    assert!(current(&c, resistor).abs() < 1e-12);
    assert_eq!(current(&c, switch), 0.0);
    assert_relative_eq!(voltage_drop(&c, switch), 9.0, max_relative = 1e-12);

    c.set_switch_closed(switch, true).unwrap();
    solve(&mut c).unwrap();
    let expected = 9.0 / (3.0 + SolverConfig::default().min_resistance);
    assert_relative_eq!(current(&c, switch), expected, max_relative = 1e-9);
    assert_kcl(&c);
}

#[test]
fn test_extreme_resistance_range() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let mid = c.add_junction();
    let battery = c.add_battery(neg, pos, 100.0).unwrap();
    c.add_resistor(pos, mid, 1e7).unwrap();
    let wire = c.add_wire(mid, neg).unwrap();

    solve(&mut c).unwrap();
    assert_relative_eq!(current(&c, battery), 100.0 / (1e7 + 1e-4), max_relative = 1e-9);
    assert_relative_eq!(current(&c, wire), current(&c, battery), max_relative = 1e-9);
}

/// A battery with a large internal resistance feeding megohm resistors:
///
/// ```text
///     neg ---[ 10V, r ]--- pos
///      |                    |
///      +--[ 10M ]-- mid --[ 10M ]--+
/// ```
///
/// Expected: I = 10 / (r + 20M) for every r, never a singular system.
#[test]
fn test_high_internal_resistance_with_megohm_load() {
    for r_int in [1e6, 2e6, 1e7] {
        let mut c = Circuit::new();
        let neg = c.add_junction();
        let pos = c.add_junction();
        let mid = c.add_junction();
        let battery = c.add_battery(neg, pos, 10.0).unwrap();
        c.set_internal_resistance(battery, r_int).unwrap();
        let r1 = c.add_resistor(pos, mid, 1e7).unwrap();
        let r2 = c.add_resistor(mid, neg, 1e7).unwrap();

        let report = solve(&mut c).unwrap();
        assert_eq!(report.outcome, SolveOutcome::Solved);

        let expected = 10.0 / (r_int + 2e7);
        assert_relative_eq!(current(&c, battery), expected, max_relative = 1e-9);
        assert_relative_eq!(current(&c, r1), expected, max_relative = 1e-9);
        assert_relative_eq!(current(&c, r2), expected, max_relative = 1e-9);
        assert_relative_eq!(
            voltage_drop(&c, battery),
            -(10.0 - r_int * expected),
            max_relative = 1e-9
        );
        assert_kcl(&c);
    }
}

/// The same high-resistance battery shorted by a wire, with a megohm
/// divider across the short.
#[test]
fn test_high_internal_resistance_shorted_by_wire() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let mid = c.add_junction();
    let battery = c.add_battery(neg, pos, 10.0).unwrap();
    c.set_internal_resistance(battery, 1e7).unwrap();
    c.add_wire(pos, neg).unwrap();
    c.add_resistor(pos, mid, 1e7).unwrap();
    c.add_resistor(mid, neg, 1e7).unwrap();

    solve(&mut c).unwrap();

    let r_parallel = 1.0 / (1.0 / DEFAULT_MIN_RESISTANCE + 1.0 / 2e7);
    assert_relative_eq!(
        current(&c, battery),
        10.0 / (1e7 + r_parallel),
        max_relative = 1e-9
    );
    assert_kcl(&c);
}

/// Twenty wires in series on the high side of a 10 Mohm resistor. The
/// wire junctions sit near 10 V while each wire drops about 1e-10 V, so
/// wire currents are limited by the resolution of the node voltages.
#[test]
fn test_wire_chain_with_high_resistance() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 10.0).unwrap();

    let mut last = pos;
    for _ in 0..20 {
        let next = c.add_junction();
        c.add_wire(last, next).unwrap();
        last = next;
    }
    let resistor = c.add_resistor(last, neg, 1e7).unwrap();

    solve(&mut c).unwrap();

    let expected = 10.0 / (1e7 + 20.0 * DEFAULT_MIN_RESISTANCE);
    assert_relative_eq!(current(&c, resistor), expected, max_relative = 1e-9);
    assert_relative_eq!(current(&c, battery), expected, max_relative = 1e-3);
    assert_kcl(&c);
}

#[test]
fn test_overflowing_solution_keeps_previous_state() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    let battery = c.add_battery(neg, pos, 1e305).unwrap();
    let wire = c.add_wire(pos, neg).unwrap();

    assert!(matches!(
        solve(&mut c),
        Err(CckError::NumericalOverflow { .. })
    ));
    assert_eq!(current(&c, battery), 0.0);
    assert_eq!(current(&c, wire), 0.0);
    assert_eq!(c.junction_voltage(pos), Some(0.0));
}

#[test]
fn test_one_event_per_solve() {
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    c.add_battery(neg, pos, 6.0).unwrap();
    let bulb = c.add_bulb(pos, neg).unwrap();

    let events: Rc<RefCell<Vec<CircuitEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    c.subscribe(Box::new(move |event: &CircuitEvent, circuit: &Circuit| {
        // Every branch is already consistent when the event arrives
        for change in event.changes() {
            let b = circuit.branch(change.branch).unwrap();
            assert_eq!(b.current(), change.current);
        }
        sink.borrow_mut().push(event.clone());
    }));

    solve(&mut c).unwrap();
    assert_eq!(events.borrow().len(), 1);
    assert_eq!(events.borrow()[0].changes().len(), 2);

    solve(&mut c).unwrap();
    assert_eq!(events.borrow().len(), 2);
    assert!(events.borrow()[1].changes().is_empty());

    // Default bulb is 10 ohm: P = V^2 / R
    assert_relative_eq!(c.branch(bulb).unwrap().power(), 3.6, max_relative = 1e-9);

    c.remove_branch(bulb).unwrap();
    solve(&mut c).unwrap();
    assert!(matches!(events.borrow()[2], CircuitEvent::Cleared { .. }));
}

#[test]
fn test_custom_floor() {
    let solver = CircuitSolver::with_config(SolverConfig::new().with_min_resistance(0.01)).unwrap();
    let mut c = Circuit::new();
    let neg = c.add_junction();
    let pos = c.add_junction();
    c.add_battery(neg, pos, 1.0).unwrap();
    let wire = c.add_wire(pos, neg).unwrap();

    solver.solve(&mut c).unwrap();
    assert_relative_eq!(current(&c, wire), 100.0, max_relative = 1e-9);
}
