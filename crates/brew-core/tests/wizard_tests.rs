use brew_core::{
    ReservationFlow, ReservationStep, ShopConfig, SlotTime, StepValidator, ValidationError,
    WizardStep,
};
use brew_test_utils::{fixed_now, run_simulator, sample_details, today, SimulatorConfig};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Action {
    Next,
    Back,
    GoTo(u8),
    PickTime,
    Details,
    Party(u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Next),
        Just(Action::Back),
        (1u8..=4).prop_map(Action::GoTo),
        Just(Action::PickTime),
        Just(Action::Details),
        (1u8..=12).prop_map(Action::Party),
    ]
}

#[test]
fn test_no_time_reports_select_a_time() {
    let mut flow = ReservationFlow::new(&ShopConfig::default(), today());
    let err = flow.next().unwrap_err();
    assert_eq!(err, ValidationError::TimeRequired);
    assert_eq!(err.to_string(), "Please select a time");
    assert_eq!(flow.step(), ReservationStep::DateTime);
}

#[test]
fn test_session_simulator_holds_invariants() {
    for seed in [1, 7, 42] {
        let report = run_simulator(SimulatorConfig {
            seed,
            total_commands: 1_500,
            ..SimulatorConfig::default()
        });
        assert!(report.passed(), "{}", report.generate_text());
        assert!(report.stats.rejected > 0);
        assert!(report.stats.accepted > report.stats.rejected);
    }
}

proptest! {
    #[test]
    fn prop_forward_moves_only_through_open_gates(actions in prop::collection::vec(action(), 1..40)) {
        let mut flow = ReservationFlow::new(&ShopConfig::default(), today());
        for action in actions {
            let before_state = flow.state().clone();
            let before = flow.step();
            match action {
                Action::Next => { let _ = flow.next(); }
                Action::Back => { flow.back(); }
                Action::GoTo(n) => {
                    let _ = flow.go_to(ReservationStep::from_number(n).unwrap());
                }
                Action::PickTime => {
                    let _ = flow.select_time(SlotTime::new(12, 30).unwrap(), fixed_now(), &brew_core::AlwaysAvailable);
                }
                Action::Details => flow.update_details(sample_details()),
                Action::Party(n) => { let _ = flow.choose_party_size(n); }
            }
            let after = flow.step();
            if after.number() > before.number() {
                for n in before.number()..after.number() {
                    let step = ReservationStep::from_number(n).unwrap();
                    prop_assert!(before_state.validate_step(step).is_ok());
                }
            }
            if before_state.time.is_none() && after.number() > 1 && before.number() == 1 {
                prop_assert!(false, "left date & time step without a time");
            }
        }
    }

    #[test]
    fn prop_back_is_always_allowed(steps in 1u8..=4) {
        let mut flow = ReservationFlow::new(&ShopConfig::default(), today());
        flow.select_time(SlotTime::new(15, 0).unwrap(), fixed_now(), &brew_core::AlwaysAvailable).unwrap();
        flow.update_details(sample_details());
        let target = ReservationStep::from_number(steps).unwrap();
        flow.go_to(target).unwrap();
        prop_assert_eq!(flow.step(), target);
        let tally = flow.indicator().iter().filter(|m| m.reached).count();
        prop_assert_eq!(tally, usize::from(steps));
        flow.go_to(ReservationStep::DateTime).unwrap();
        prop_assert_eq!(flow.step(), ReservationStep::DateTime);
    }
}
