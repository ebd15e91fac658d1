use std::time::Duration;

use order_ticket::draft::OrderDraft;
use order_ticket::model::account::AccountSnapshot;
use order_ticket::model::quote::{FeedCategory, Instrument, MarketSnapshot, PricedPair};
use order_ticket::sizing::{margin_for, PositionSizer, SizingOutcome};
use order_ticket::solvency::{evaluate, RejectionReasonCode, SolvencyInputs};

const EPS: f64 = 1e-9;

fn market() -> MarketSnapshot {
    MarketSnapshot::new(
        Instrument::new("EUR/USD", FeedCategory::Forex),
        Some(PricedPair::new(1.0840, 1.0850)),
    )
}

#[test]
/// Verifies the worked sizing example:
/// balance 1000 at 1:30 starts at 33.33 margin and one increase adds 10.
fn one_increase_from_full_ceiling_at_thirty_to_one() {
    let account = AccountSnapshot::new(1000.0, 0.0);
    let mut draft = OrderDraft::new(&account, 30, Duration::from_secs(3));
    assert!((draft.quantity() - 1000.0).abs() < EPS);
    assert!((draft.margin() - 33.333_333_333).abs() < 1e-6);

    assert!(draft.increase_quantity(&account).is_none());
    assert!((draft.quantity() - 1010.0).abs() < EPS);
    assert!((draft.margin() - 33.666_666_667).abs() < 1e-6);
    assert!(draft.feedback().is_none());
}

#[test]
/// Verifies repeated increases stop exactly when margin would pass the
/// ceiling, leaving the last accepted quantity in place.
fn repeated_increases_stop_at_the_ceiling() {
    let account = AccountSnapshot::new(100.0, 0.0);
    let mut draft = OrderDraft::new(&account, 10, Duration::from_secs(3));
    assert!((draft.quantity() - 100.0).abs() < EPS);

    let mut accepted = 0;
    let rejection = loop {
        match draft.increase_quantity(&account) {
            None => accepted += 1,
            Some(clear) => break clear,
        }
        assert!(accepted < 10_000, "increase never rejected");
    };

    assert_eq!(accepted, 900);
    assert!((draft.quantity() - 1000.0).abs() < EPS);
    assert!((draft.margin() - 100.0).abs() < EPS);
    assert_eq!(
        draft.feedback_slot().error(),
        Some("Insufficient balance for this trade size")
    );
    assert_eq!(rejection.delay, Duration::from_secs(3));

    assert!(draft.expire_feedback(rejection.generation));
    assert!(draft.feedback().is_none());
}

#[test]
fn margin_tracks_quantity_over_leverage_after_every_update() {
    let ceiling = 250.0;
    let mut sizer = PositionSizer::new(50.0, 5);
    for step in 0..40 {
        match step % 4 {
            0 => {
                sizer.increase(ceiling);
            }
            1 => sizer.set_leverage(1 + (step as u32 % 7)),
            2 => {
                sizer.decrease(ceiling);
            }
            _ => {
                sizer.enter_quantity(&format!("{}", step * 13), ceiling);
            }
        }
        let expected = margin_for(sizer.quantity(), sizer.leverage());
        assert!(
            (sizer.margin() - expected).abs() < EPS,
            "step {} margin {} expected {}",
            step,
            sizer.margin(),
            expected
        );
    }
}

#[test]
fn increase_never_leaves_margin_above_ceiling() {
    for leverage in [1, 2, 5, 30, 100] {
        let ceiling = 80.0;
        let mut sizer = PositionSizer::new(ceiling, leverage);
        for _ in 0..20_000 {
            if let SizingOutcome::Rejected { margin, .. } = sizer.increase(ceiling) {
                assert!(margin > ceiling);
                break;
            }
        }
        assert!(sizer.margin() <= ceiling + EPS, "leverage {}", leverage);
    }
}

#[test]
fn decrease_refused_once_quantity_is_one_step() {
    let ceiling = 500.0;
    let mut sizer = PositionSizer::new(20.0, 10);
    let mut outcomes = Vec::new();
    for _ in 0..5 {
        outcomes.push(sizer.decrease(ceiling));
    }
    assert!((sizer.quantity() - 5.0).abs() < EPS);
    assert_eq!(
        outcomes,
        vec![
            SizingOutcome::Committed,
            SizingOutcome::Committed,
            SizingOutcome::Committed,
            SizingOutcome::Unchanged,
            SizingOutcome::Unchanged,
        ]
    );
}

#[test]
fn manual_quantity_above_ceiling_clamps_silently() {
    let account = AccountSnapshot::new(200.0, 50.0);
    let mut draft = OrderDraft::new(&account, 10, Duration::from_secs(3));
    assert_eq!(draft.enter_quantity("9999", &account), SizingOutcome::Clamped);
    assert!((draft.quantity() - 250.0).abs() < EPS);
    assert!((draft.margin() - 25.0).abs() < EPS);
    assert!(draft.feedback().is_none());
}

#[test]
/// Verifies cash balance gating:
/// any non-positive balance disables submit regardless of credit or margin.
fn non_positive_balance_always_disables_submit() {
    let market = market();
    for (balance, credit) in [(0.0, 0.0), (0.0, 1_000.0), (-5.0, 10_000.0)] {
        let account = AccountSnapshot::new(balance, credit);
        let draft = OrderDraft::new(&account, 30, Duration::from_secs(3));
        assert!(!draft.submit_enabled(&account, &market), "balance {}", balance);

        let decision = evaluate(&SolvencyInputs {
            loading: false,
            submitting: false,
            margin: 0.0,
            account,
        });
        assert!(!decision.approved);
        assert_eq!(
            decision.reason_code,
            Some(RejectionReasonCode::NonPositiveBalance)
        );
    }
}

#[test]
fn leverage_change_rescales_margin_without_touching_quantity() {
    let account = AccountSnapshot::new(600.0, 0.0);
    let mut draft = OrderDraft::new(&account, 30, Duration::from_secs(3));
    draft.set_leverage(60);
    assert!((draft.quantity() - 600.0).abs() < EPS);
    assert!((draft.margin() - 10.0).abs() < EPS);
    draft.set_leverage(0);
    assert_eq!(draft.leverage(), 1);
    assert!((draft.margin() - 600.0).abs() < EPS);
}
